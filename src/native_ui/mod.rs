//! Native egui-based UI for the account viewer

mod app;
mod dialog;
mod theme;

pub use app::{run, RunOutcome};
