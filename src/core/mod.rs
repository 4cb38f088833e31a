// AlertSleuth - core/mod.rs
//
// Core business logic layer: load, filter, present, export.
// Must NOT depend on: ui, platform, app.

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod present;
