// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::{error, model};

// === MODULE DEFINITION ===
pub mod module;
pub use module::Submissions;

// === INTERNAL MODULES ===
// Exposed for integration tests; other crates should go through `module` and `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
