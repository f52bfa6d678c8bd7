//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_ORGANIZER: &str = "organizer";
pub const ROLE_DONOR: &str = "donor";
