//! Authorization policy: ordered path rules and the role hierarchy.

pub mod authorization;
pub mod hierarchy;
pub mod pattern;

pub use authorization::{AuthorizationPolicy, PathRule, RoleRequirement};
pub use hierarchy::RoleHierarchy;
pub use pattern::{PathPattern, is_normalized};
