//! Domain models for Tenantgate Core

pub mod claims;
pub mod document;
pub mod session;
pub mod tenant;
pub mod user;

pub use claims::*;
pub use document::*;
pub use session::*;
pub use tenant::*;
pub use user::*;
