//! Streaming infrastructure
//!
//! - Encoder: ffmpeg argument construction
//! - Pidfile: on-disk record of the active stream
//! - Process: signalling and detaching the encoder
//! - Manager: start/stop/status of the single stream

pub mod encoder;
pub mod manager;
pub mod pidfile;
pub mod process;

pub use manager::{StartedStream, StreamError, StreamManager};
pub use pidfile::PidFile;
