//! Farmer performance scoring and tiering engine
//!
//! Pure computation shared by the backend service and the browser (via WASM).
//! Nothing in this crate performs I/O.

pub mod models;
pub mod scoring;
pub mod types;
pub mod validation;

pub use models::*;
pub use scoring::*;
pub use types::*;
pub use validation::*;
