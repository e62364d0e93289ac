//! Path-based authorization configuration.
//!
//! Rules are evaluated in declaration order and the first matching rule
//! wins. Paths that match no rule require an authenticated principal.
//!
//! ```toml
//! [authorization]
//! hierarchy = "ROLE_C > ROLE_B\nROLE_B > ROLE_A"
//!
//! [[authorization.rules]]
//! patterns = ["/", "/login"]
//! access = "permit_all"
//!
//! [[authorization.rules]]
//! patterns = ["/my/**"]
//! access = { has_any_role = ["ADMIN", "USER"] }
//! ```

use serde::{Deserialize, Serialize};

/// Authorization rules and role hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// Role hierarchy declarations, one `superior > inferior` chain per line.
    #[serde(default = "default_hierarchy")]
    pub hierarchy: String,
    /// Ordered path rules.
    #[serde(default = "flat_rules")]
    pub rules: Vec<PathRuleConfig>,
}

impl AuthorizationConfig {
    /// The deployed per-path rule table.
    pub fn flat() -> Self {
        Self {
            hierarchy: default_hierarchy(),
            rules: flat_rules(),
        }
    }

    /// The hierarchy-driven variant: `/` needs A, `/manager` B, `/admin` C.
    pub fn hierarchical() -> Self {
        Self {
            hierarchy: default_hierarchy(),
            rules: vec![
                PathRuleConfig::new(&["/login", "/loginProc"], AccessRule::PermitAll),
                PathRuleConfig::new(&["/"], AccessRule::HasAnyRole(vec!["A".to_string()])),
                PathRuleConfig::new(
                    &["/manager"],
                    AccessRule::HasAnyRole(vec!["B".to_string()]),
                ),
                PathRuleConfig::new(&["/admin"], AccessRule::HasAnyRole(vec!["C".to_string()])),
                PathRuleConfig::new(&["/**"], AccessRule::Authenticated),
            ],
        }
    }
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self::flat()
    }
}

/// A single ordered authorization rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRuleConfig {
    /// Ant-style path patterns (`*` one segment, `**` any number of segments).
    pub patterns: Vec<String>,
    /// HTTP methods the rule applies to. Empty means every method.
    #[serde(default)]
    pub methods: Vec<String>,
    /// Access required for matching requests.
    pub access: AccessRule,
}

impl PathRuleConfig {
    /// Creates a rule that applies to every method.
    pub fn new(patterns: &[&str], access: AccessRule) -> Self {
        Self {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            methods: Vec::new(),
            access,
        }
    }
}

/// Access required by a path rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRule {
    /// Anyone, authenticated or not.
    PermitAll,
    /// Any authenticated principal.
    Authenticated,
    /// The role or any role above it in the hierarchy.
    HasRole(String),
    /// Any of the listed roles, after hierarchy expansion.
    HasAnyRole(Vec<String>),
}

fn default_hierarchy() -> String {
    "ROLE_C > ROLE_B\nROLE_B > ROLE_A".to_string()
}

fn flat_rules() -> Vec<PathRuleConfig> {
    vec![
        PathRuleConfig::new(
            &["/", "/login", "/loginProc", "/join", "/joinProc"],
            AccessRule::PermitAll,
        ),
        PathRuleConfig::new(&["/admin"], AccessRule::HasRole("ADMIN".to_string())),
        PathRuleConfig::new(
            &["/my/**"],
            AccessRule::HasAnyRole(vec!["ADMIN".to_string(), "USER".to_string()]),
        ),
        PathRuleConfig::new(&["/**"], AccessRule::Authenticated),
    ]
}
