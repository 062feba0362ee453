pub mod client;
pub mod transport;

pub use client::{ApiClient, ApiError};
