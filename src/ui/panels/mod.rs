// AlertSleuth - ui/panels/mod.rs

pub mod about;
pub mod filters;
pub mod results;
