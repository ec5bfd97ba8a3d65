//! Shared items related to user account control

mod capabilities;
mod errors;
mod responses;
mod role;

pub use capabilities::{Capabilities, Capability};
pub use errors::{AuthError, LoginParseError, UnknownRole};
pub use responses::{parse_login_response, LoginSession};
pub use role::Role;
