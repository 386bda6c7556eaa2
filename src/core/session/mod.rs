// Core session module - opaque token issue/verify/revoke.

pub mod session_models;
pub mod session_service;

pub use session_models::*;
pub use session_service::*;
