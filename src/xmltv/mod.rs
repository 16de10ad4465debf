//! XMLTV document handling: tolerant parsing into an owned tree and pretty
//! serialization back to bytes

pub mod document;
pub mod encoding;
pub mod parser;
pub mod sanitize;
pub mod writer;

pub use document::{XmlElement, XmlNode};
pub use parser::{parse_tolerant, ParsedDocument};
pub use writer::write_document;

/// Root element of an XMLTV document
pub const TV_ELEMENT: &str = "tv";
pub const CHANNEL_ELEMENT: &str = "channel";
pub const PROGRAMME_ELEMENT: &str = "programme";
/// Identifier attribute of `channel`
pub const CHANNEL_ID_ATTR: &str = "id";
/// Channel reference attribute of `programme`
pub const PROGRAMME_CHANNEL_ATTR: &str = "channel";
pub const GENERATOR_NAME_ATTR: &str = "generator-info-name";
pub const GENERATOR_URL_ATTR: &str = "generator-info-url";
