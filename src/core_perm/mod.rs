// Per-user capability model checked before every command runs.

pub mod authorizer;
pub mod error;
pub mod permission;

#[cfg(test)]
mod test_permission;

pub use authorizer::{authorize, required_capability, requires_login};
pub use error::{AuthorizationError, PermissionError};
pub use permission::{Capability, Permissions};
