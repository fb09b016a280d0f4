pub mod error;

pub use error::{ApiError, GENERIC_ERROR_MESSAGE};
