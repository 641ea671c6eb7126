use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The closed set of binary resource kinds.
///
/// Each kind has its own directory under the content root and its own cache
/// in the asset store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Font,
    Sprite,
    Effect,
}

impl AssetKind {
    /// All kinds, in preload order.
    pub const ALL: [AssetKind; 3] = [AssetKind::Font, AssetKind::Sprite, AssetKind::Effect];

    pub fn name(&self) -> &'static str {
        match self {
            AssetKind::Font => "font",
            AssetKind::Sprite => "sprite",
            AssetKind::Effect => "effect",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "font" | "fonts" => Ok(AssetKind::Font),
            "sprite" | "sprites" => Ok(AssetKind::Sprite),
            "effect" | "effects" => Ok(AssetKind::Effect),
            _ => Err(TypeError::UnknownKind(s.to_string())),
        }
    }
}
