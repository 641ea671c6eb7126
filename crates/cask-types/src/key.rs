//! Cache key derivation.
//!
//! A cache key is the path of a file relative to its kind's root directory:
//!
//! - Components are joined with `/` regardless of the host separator, and
//!   `\` in caller-supplied keys is read as a separator too, so
//!   `UI\Cursor` and `UI/Cursor` address the same entry.
//! - Empty and `.` components are dropped.
//! - `..`, absolute roots and drive prefixes are rejected.
//! - Binary kinds strip their file extension (`UI/Cursor.bin` -> `UI/Cursor`);
//!   documents keep it (`Screens/Menu.xml`).

use std::borrow::Borrow;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Normalized relative path addressing one cached entry.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheKey(String);

impl CacheKey {
    /// Parse and normalize a caller-supplied key.
    ///
    /// ```
    /// use cask_types::CacheKey;
    ///
    /// assert_eq!(CacheKey::new("UI\\Cursor").unwrap().as_str(), "UI/Cursor");
    /// assert_eq!(CacheKey::new("./Screens//Menu.xml").unwrap().as_str(), "Screens/Menu.xml");
    /// assert!(CacheKey::new("../secrets").is_err());
    /// assert!(CacheKey::new("").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, TypeError> {
        let mut parts = Vec::new();
        for part in raw.split(['/', '\\']) {
            match part {
                "" | "." => continue,
                ".." => return Err(invalid(raw, "must not contain '..'")),
                p if p.contains(':') => return Err(invalid(raw, "must not contain a drive prefix")),
                p => parts.push(p),
            }
        }
        if parts.is_empty() {
            return Err(invalid(raw, "key must not be empty"));
        }
        Ok(Self(parts.join("/")))
    }

    /// Derive a key from a path relative to a kind's root directory.
    ///
    /// When `strip_extension` is set and the file name ends with that
    /// extension (ASCII case-insensitive), the extension is removed.
    pub fn from_relative_path(
        relative: &Path,
        strip_extension: Option<&str>,
    ) -> Result<Self, TypeError> {
        let display = relative.to_string_lossy();
        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(os) => {
                    let part = os
                        .to_str()
                        .ok_or_else(|| invalid(&display, "path is not valid UTF-8"))?;
                    parts.push(part.to_string());
                }
                Component::CurDir => continue,
                _ => return Err(invalid(&display, "path must be relative and inside its root")),
            }
        }

        if let (Some(ext), Some(last)) = (strip_extension, parts.last_mut()) {
            strip_suffix_ignore_case(last, ext);
        }

        Self::new(&parts.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as a host path relative to its kind's root.
    pub fn to_relative_path(&self) -> PathBuf {
        self.0.split('/').collect()
    }

    /// The key as a host path with `extension` appended to the file name.
    pub fn to_path_with_extension(&self, extension: &str) -> PathBuf {
        if extension.is_empty() {
            return self.to_relative_path();
        }
        let mut path = self.to_relative_path();
        let file = format!(
            "{}.{}",
            path.file_name().map(|f| f.to_string_lossy()).unwrap_or_default(),
            extension
        );
        path.set_file_name(file);
        path
    }
}

fn strip_suffix_ignore_case(name: &mut String, extension: &str) {
    let suffix = format!(".{}", extension.to_ascii_lowercase());
    if name.len() > suffix.len() && name.to_ascii_lowercase().ends_with(&suffix) {
        let cut = name.len() - suffix.len();
        name.truncate(cut);
    }
}

fn invalid(key: &str, reason: &str) -> TypeError {
    TypeError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({:?})", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CacheKey {
    type Error = TypeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl TryFrom<&str> for CacheKey {
    type Error = TypeError;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
