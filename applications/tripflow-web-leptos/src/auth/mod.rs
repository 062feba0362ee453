//! OTP login, token storage and structural token decoding.

pub mod claims;
pub mod service;
pub mod storage;

pub use claims::{Role, SessionUser};
pub use service::AuthService;
