//! Domain model (values, handlers, errors, ids).

pub mod errors;
pub mod handler;
pub mod ids;
pub mod value;

pub use errors::{ErrorKind, INVALID_ARGUMENT_COUNT, INVALID_ARGUMENT_TYPES, RegistryError, TaskError};
pub use handler::CompletionHandler;
pub use ids::TaskId;
pub use value::HostValue;
