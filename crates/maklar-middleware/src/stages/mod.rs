//! Pipeline stages.

mod error_normalization;
mod request_id;
mod validation;

pub use error_normalization::ErrorNormalizationMiddleware;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
pub use validation::RequestValidationMiddleware;
