pub mod app;
pub mod config;
pub mod error;
pub mod fetch;
pub mod notify;
pub mod records;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AppError, Result};
