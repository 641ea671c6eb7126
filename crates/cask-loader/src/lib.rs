//! Stateless content loading for cask.
//!
//! The loader performs disk I/O and (de)serialization for one kind of content
//! at a time. It never caches; the stores in `cask-store` build on it.
//!
//! # Key Types
//!
//! - [`Loader`] -- Loads binary resources and documents, saves documents,
//!   discovers files under each kind's root
//! - [`ContentSource`] -- The filesystem seam ([`DiskSource`], [`CountingSource`])
//! - [`Resource`] -- A decoded binary resource (font, sprite, effect)
//! - [`Document`] / [`DataDocument`] -- The closed set of structured document kinds
//!
//! # Document Markup
//!
//! Documents are stored as XML. The root element names the document kind,
//! fields are PascalCase elements, and ordered list fields wrap each entry in
//! an `<Item>` element:
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <ScreenData>
//!   <BackgroundTextureAsset>UI/Menu</BackgroundTextureAsset>
//!   <Music><Item>Title</Item><Item>Credits</Item></Music>
//! </ScreenData>
//! ```

pub mod codec;
pub mod document;
pub mod error;
pub mod loader;
pub mod resource;
pub mod source;
pub mod well_known;

pub use codec::CodecError;
pub use document::{
    DataDocument, Document, DocumentKind, GameObjectData, ItemList, OptionsData, ScreenData,
};
pub use error::{LoaderError, LoaderResult};
pub use loader::{Discovered, Loader};
pub use resource::Resource;
pub use source::{ContentSource, CountingSource, DiskSource, SourceStats};
