//! Integration tests for rtsp-streamer
//!
//! Tests are organized by component:
//! - cli_test: argument parsing, validation, JSON output
//! - config_test: config file loading and saving
//! - library_test: downloads (mockito) and library listing
//! - stream_test: stream start/stop/status against a stand-in encoder

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
