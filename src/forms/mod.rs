pub mod import_export;
pub mod questions;
pub mod users;
