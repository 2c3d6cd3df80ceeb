//! The Smile side of the token bridge: a pull-based reader and an event-based
//! writer over the Smile binary format.
pub use crate::smile::reader::SmileReader;
pub use crate::smile::writer::SmileWriter;

pub mod reader;
mod string_cache;
pub mod writer;

/// Configuration for the Smile codec.
///
/// Built once at startup and passed by shared reference into both the reader
/// and writer factories; never mutated afterward.
pub struct SmileOptions {
    pub(crate) shared_properties: bool,
    pub(crate) shared_strings: bool,
    pub(crate) raw_binary: bool,
    pub(crate) write_header: bool,
    pub(crate) write_end_marker: bool,
    pub(crate) require_header: bool,
}

impl Default for SmileOptions {
    /// The Smile format defaults: shared property names on, everything else
    /// off, header on.
    fn default() -> Self {
        SmileOptions {
            shared_properties: true,
            shared_strings: false,
            raw_binary: false,
            write_header: true,
            write_end_marker: false,
            require_header: false,
        }
    }
}

impl SmileOptions {
    /// Creates the default options.
    pub fn new() -> Self {
        SmileOptions::default()
    }

    /// Enables deduplication of repeated map key strings.
    ///
    /// Defaults to `true`.
    pub fn shared_properties(&mut self, shared_properties: bool) -> &mut Self {
        self.shared_properties = shared_properties;
        self
    }

    /// Enables deduplication of repeated value strings.
    ///
    /// Defaults to `false`.
    pub fn shared_strings(&mut self, shared_strings: bool) -> &mut Self {
        self.shared_strings = shared_strings;
        self
    }

    /// Enables the transmission of binary data in "raw" form.
    ///
    /// This format is more performant and space efficient, but Smile framing tokens may be present in the encoded
    /// binary data.
    ///
    /// Defaults to `false`.
    pub fn raw_binary(&mut self, raw_binary: bool) -> &mut Self {
        self.raw_binary = raw_binary;
        self
    }

    /// Enables writing the `:)\n` format header when encoding.
    ///
    /// Defaults to `true`.
    pub fn write_header(&mut self, write_header: bool) -> &mut Self {
        self.write_header = write_header;
        self
    }

    /// Enables writing the `0xff` end-of-stream marker when the writer is closed.
    ///
    /// Defaults to `false`.
    pub fn write_end_marker(&mut self, write_end_marker: bool) -> &mut Self {
        self.write_end_marker = write_end_marker;
        self
    }

    /// Requires input to start with a format header when decoding.
    ///
    /// When disabled, headerless input is decoded with the Smile
    /// specification's default feature flags.
    ///
    /// Defaults to `false`.
    pub fn require_header(&mut self, require_header: bool) -> &mut Self {
        self.require_header = require_header;
        self
    }
}
