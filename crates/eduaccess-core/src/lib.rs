//! eduaccess-core — Pure types and text processing.
//!
//! No async runtime, no network I/O, no platform dependencies.

pub mod braille;
pub mod filename;
pub mod ssml;
pub mod types;
pub mod wav;
