// LogLens - lib.rs
//
// Library entry point, exposing every layer for the CLI host, integration
// tests and page bindings.

pub mod app;
pub mod core;
pub mod platform;
pub mod ui;
pub mod util;
