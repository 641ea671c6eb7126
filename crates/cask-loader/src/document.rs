//! The closed set of structured document kinds.
//!
//! Every concrete document type implements [`DataDocument`], which ties it to
//! a [`DocumentKind`] (and so to the root element of its markup) and lets the
//! type-erased [`Document`] be narrowed back to the concrete type.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Discriminant of a [`Document`], one per concrete document type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentKind {
    Screen,
    Options,
    GameObject,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Screen,
        DocumentKind::Options,
        DocumentKind::GameObject,
    ];

    /// Root element name used in the markup.
    pub fn tag(&self) -> &'static str {
        match self {
            DocumentKind::Screen => "ScreenData",
            DocumentKind::Options => "OptionsData",
            DocumentKind::GameObject => "GameObjectData",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Behaviour shared by every concrete document type.
pub trait DataDocument:
    Serialize + DeserializeOwned + Default + Clone + fmt::Debug + Send + Sync + 'static
{
    const KIND: DocumentKind;

    /// Narrow a type-erased document. `None` if it holds another kind.
    fn from_document(document: &Document) -> Option<&Self>;

    fn into_document(self) -> Document;
}

/// A type-erased document as held by the document cache.
#[derive(Clone, Debug, PartialEq)]
pub enum Document {
    Screen(ScreenData),
    Options(OptionsData),
    GameObject(GameObjectData),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Screen(_) => DocumentKind::Screen,
            Document::Options(_) => DocumentKind::Options,
            Document::GameObject(_) => DocumentKind::GameObject,
        }
    }

    /// Narrow to `T`, if this document holds that kind.
    pub fn downcast_ref<T: DataDocument>(&self) -> Option<&T> {
        T::from_document(self)
    }
}

/// An ordered list field. Each entry is written as an `<Item>` element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemList {
    #[serde(rename = "Item", default)]
    pub items: Vec<String>,
}

impl ItemList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ItemList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Basic data for a screen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ScreenData {
    /// Sprite key of the background image. Empty for no image.
    pub background_texture_asset: String,
    /// Songs played while the screen is active, in order.
    pub music: ItemList,
}

/// Player-adjustable settings, stored at `Options/Options.xml`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OptionsData {
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub fullscreen: bool,
}

impl Default for OptionsData {
    fn default() -> Self {
        Self {
            music_volume: 1.0,
            sfx_volume: 1.0,
            fullscreen: false,
        }
    }
}

/// Template for a game object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct GameObjectData {
    /// Sprite key of the object's texture.
    pub texture_asset: String,
    pub tags: ItemList,
}

impl DataDocument for ScreenData {
    const KIND: DocumentKind = DocumentKind::Screen;

    fn from_document(document: &Document) -> Option<&Self> {
        match document {
            Document::Screen(d) => Some(d),
            _ => None,
        }
    }

    fn into_document(self) -> Document {
        Document::Screen(self)
    }
}

impl DataDocument for OptionsData {
    const KIND: DocumentKind = DocumentKind::Options;

    fn from_document(document: &Document) -> Option<&Self> {
        match document {
            Document::Options(d) => Some(d),
            _ => None,
        }
    }

    fn into_document(self) -> Document {
        Document::Options(self)
    }
}

impl DataDocument for GameObjectData {
    const KIND: DocumentKind = DocumentKind::GameObject;

    fn from_document(document: &Document) -> Option<&Self> {
        match document {
            Document::GameObject(d) => Some(d),
            _ => None,
        }
    }

    fn into_document(self) -> Document {
        Document::GameObject(self)
    }
}
