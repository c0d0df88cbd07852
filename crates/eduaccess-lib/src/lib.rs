//! eduaccess-lib — EduAccess service engine.
//!
//! Azure speech and vision clients, document extraction, ffmpeg media
//! conversion, scoped upload storage and the HTTP API. Depends on
//! eduaccess-core for pure types and text processing.

pub mod config;
pub mod error;
pub mod extract;
pub mod media;
pub mod pipeline;
pub mod server;
pub mod speech;
pub mod state;
pub mod upload;
pub mod vision;

// Re-export eduaccess-core for convenience
pub use eduaccess_core;
