// AlertSleuth - platform/mod.rs
//
// Platform abstraction layer: config files, data directories, workbook fetch.
// Dependencies: standard library, directories, ureq, core model types.
// Must NOT depend on: app, ui.

pub mod config;
pub mod fetch;
