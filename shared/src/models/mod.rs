//! Domain models for the farmer performance engine

mod history;
mod performance;

pub use history::*;
pub use performance::*;
