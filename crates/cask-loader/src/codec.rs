//! XML encoding of documents.
//!
//! The root element carries the document kind, so a file can be decoded
//! without knowing its type up front ([`decode_any`]) and a typed decode can
//! detect that a file holds some other kind ([`decode`]).

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::document::{
    DataDocument, Document, DocumentKind, GameObjectData, OptionsData, ScreenData,
};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Errors from reading or writing document markup.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed markup: {0}")]
    Xml(String),

    #[error("markup has no root element")]
    MissingRoot,

    #[error("unknown document kind <{0}>")]
    UnknownKind(String),

    #[error("expected <{}> document, found <{found}>", expected.tag())]
    KindMismatch {
        expected: DocumentKind,
        found: String,
    },
}

/// Serialize a document, root element named after its kind.
pub fn encode<T: DataDocument>(document: &T) -> Result<String, CodecError> {
    let body = quick_xml::se::to_string_with_root(T::KIND.tag(), document)
        .map_err(|e| CodecError::Xml(e.to_string()))?;
    Ok(format!("{XML_DECLARATION}{body}\n"))
}

/// Name of the first element in `text`.
pub fn root_tag(text: &str) -> Result<String, CodecError> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(CodecError::MissingRoot),
            Ok(_) => continue,
            Err(e) => return Err(CodecError::Xml(e.to_string())),
        }
    }
}

/// Deserialize a document of a known kind.
pub fn decode<T: DataDocument>(text: &str) -> Result<T, CodecError> {
    let found = root_tag(text)?;
    if found != T::KIND.tag() {
        return Err(CodecError::KindMismatch {
            expected: T::KIND,
            found,
        });
    }
    quick_xml::de::from_str(text).map_err(|e| CodecError::Xml(e.to_string()))
}

/// Deserialize a document of whichever kind its root element names.
pub fn decode_any(text: &str) -> Result<Document, CodecError> {
    let tag = root_tag(text)?;
    let kind = DocumentKind::from_tag(&tag).ok_or(CodecError::UnknownKind(tag))?;
    Ok(match kind {
        DocumentKind::Screen => decode::<ScreenData>(text)?.into_document(),
        DocumentKind::Options => decode::<OptionsData>(text)?.into_document(),
        DocumentKind::GameObject => decode::<GameObjectData>(text)?.into_document(),
    })
}
