pub mod error;
pub mod model;

pub use error::SinkError;
pub use model::{FormValue, SubmissionForm, SubmissionRecord};
