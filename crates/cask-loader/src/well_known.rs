//! Keys of the default content every game built on the engine ships with.

/// Sprite keys.
pub mod sprites {
    pub const MOUSE_CURSOR: &str = "UI/Cursor";
    pub const STARTUP_LOGO: &str = "UI/Logo";
    pub const BUTTON: &str = "UI/Button";
    pub const BUTTON_HIGHLIGHTED: &str = "UI/ButtonHighlighted";
    pub const NARROW_BUTTON: &str = "UI/NarrowButton";
    pub const NARROW_BUTTON_HIGHLIGHTED: &str = "UI/NarrowButtonHighlighted";
    pub const TEXT_BOX: &str = "UI/Menu";
    pub const SLIDER_BAR: &str = "UI/SliderBar";
    pub const SLIDER_HANDLE: &str = "UI/BlueSliderDown";
    pub const BAR_BACKGROUND: &str = "UI/BarBackground";
    pub const TEXT_ENTRY_BOX: &str = "UI/TextEntryBox";
    pub const EMPTY_PANEL: &str = "UI/EmptyPanelBackground";
    pub const MENU: &str = "UI/Menu";
    pub const POINT_LIGHT_MASK: &str = "PointLightMask";
    pub const AMBIENT_LIGHT_MASK: &str = "AmbientLightMask";
}

/// Font keys.
pub mod fonts {
    pub const DEFAULT: &str = "DefaultSpriteFont";
}

/// Document keys. These keep their extension.
pub mod documents {
    pub const OPTIONS: &str = "Options/Options.xml";
    pub const EMPTY_GAME_OBJECT: &str = "GameObjects/Empty.xml";
}

#[cfg(test)]
mod tests {
    use super::*;
    use cask_types::CacheKey;

    #[test]
    fn well_known_keys_are_already_normalized() {
        for raw in [
            sprites::MOUSE_CURSOR,
            sprites::SLIDER_HANDLE,
            fonts::DEFAULT,
            documents::OPTIONS,
            documents::EMPTY_GAME_OBJECT,
        ] {
            assert_eq!(CacheKey::new(raw).unwrap().as_str(), raw);
        }
    }
}
