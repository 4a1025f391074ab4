pub mod dates;
pub mod error;
pub mod json_array;
pub mod types;
pub mod validated;

pub use error::{AppError, handler_404, internal_error};
pub use json_array::PlainListJson;
pub use validated::ValidatedJson;
