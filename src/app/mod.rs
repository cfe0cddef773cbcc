// LogLens - app/mod.rs
//
// Application layer: host boundary, enhancement orchestration, persistence
// and messaging.
// Dependencies: core, ui, platform.

pub mod debounce;
pub mod enhancer;
pub mod host;
pub mod memory;
pub mod messaging;
pub mod page;
pub mod store;
