pub mod response;

pub use response::{ErrorPayload, error_response};
