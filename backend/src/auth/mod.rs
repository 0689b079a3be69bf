//! Authentication glue for the profile API.
//!
//! Credentials are verified upstream; this module only turns the forwarded
//! identity into a loaded user record.

pub mod middleware;

pub use middleware::{CurrentUser, USER_ID_HEADER};
