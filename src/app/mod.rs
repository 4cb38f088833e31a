// AlertSleuth - app/mod.rs
//
// Application layer: session dataset, background loading, state management.
// Dependencies: core layer, platform fetch/config.
// Must NOT depend on: ui.

pub mod dataset;
pub mod load;
pub mod state;
