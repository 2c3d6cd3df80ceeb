//! The JSON side of the token bridge: a streaming pull parser and a compact
//! text generator.
pub use crate::json::reader::JsonReader;
pub use crate::json::writer::JsonWriter;

pub mod reader;
pub mod writer;
