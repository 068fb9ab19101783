pub use errors::{ServiceError, ServiceResult};

pub mod errors;
pub mod import_export;
pub mod questions;
pub mod users;
