//! Foundation types for cask.
//!
//! This crate provides the identifiers and layout description shared by every
//! other cask crate. It performs no I/O.
//!
//! # Key Types
//!
//! - [`CacheKey`] -- Normalized relative path addressing one cached entry
//! - [`AssetKind`] -- The closed set of binary resource kinds (font, sprite, effect)
//! - [`Fingerprint`] -- BLAKE3 digest of a resource's raw bytes
//! - [`ContentLayout`] -- Content root plus per-kind directory and extension names

pub mod error;
pub mod fingerprint;
pub mod key;
pub mod kind;
pub mod layout;

pub use error::TypeError;
pub use fingerprint::Fingerprint;
pub use key::CacheKey;
pub use kind::AssetKind;
pub use layout::ContentLayout;
