// LogLens - core/mod.rs
//
// Core business logic layer: the run model and the pure text transforms.
// Must NOT depend on: ui, platform, app, or any I/O.

pub mod detect;
pub mod highlight;
pub mod markup;
pub mod model;
pub mod search;
pub mod sgr;
pub mod stats;
