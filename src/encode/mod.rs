//! Encoder hand-off.
//!
//! Sinks consume rendered frames in timeline order. The core never touches the filesystem;
//! writing files is the job of sinks such as [`png::PngSequenceSink`].

/// PNG image-sequence sink.
pub(crate) mod png;
/// Generic frame sink trait and the in-memory sink.
pub(crate) mod sink;
