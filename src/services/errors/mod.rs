pub mod reporter;
pub mod types;

pub use reporter::{handle_panic, not_found, report_errors};
pub use types::{ApiError, ErrorResponse, FailureReport};
