// LogLens - ui/mod.rs
//
// UI layer: markup and styling for everything LogLens injects.
// Dependencies: core (read-only models).
// Must NOT depend on: app, platform, direct I/O.

pub mod controls;
pub mod theme;
