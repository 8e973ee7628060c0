//! Business logic layer

pub mod claims;
pub mod document;
pub mod session;
pub mod user;

pub use claims::{ClaimsService, ClaimsSyncOutcome};
pub use document::{CreatedDocument, DocumentService};
pub use session::SessionService;
pub use user::{CreatedUser, UserService};
