//! Path-to-requirement mapping and the role check.

use std::collections::BTreeSet;

use tracing::debug;

use formgate_core::config::{AccessRule, AuthorizationConfig, PathRuleConfig};
use formgate_core::error::AppError;
use formgate_core::result::AppResult;
use formgate_entity::user::Role;

use super::hierarchy::RoleHierarchy;
use super::pattern::PathPattern;

/// What a request must present to reach a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// No session needed.
    Public,
    /// Any authenticated principal.
    Authenticated,
    /// One of these roles, after hierarchy expansion of the principal's role.
    AnyOf(BTreeSet<Role>),
    /// This role or any role above it.
    RoleOrAbove(Role),
}

impl RoleRequirement {
    /// Whether the requirement can be met without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Requirement for paths no rule matches.
static UNMATCHED: RoleRequirement = RoleRequirement::Authenticated;

/// One ordered entry of the rule list.
#[derive(Debug, Clone)]
pub struct PathRule {
    /// Patterns, any of which selects the rule.
    patterns: Vec<PathPattern>,
    /// Upper-case methods; empty means every method.
    methods: Vec<String>,
    /// Requirement for matching requests.
    requirement: RoleRequirement,
}

impl PathRule {
    /// Creates a rule for every method.
    pub fn new(patterns: Vec<PathPattern>, requirement: RoleRequirement) -> Self {
        Self {
            patterns,
            methods: Vec::new(),
            requirement,
        }
    }

    /// Restricts the rule to the given methods.
    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.as_ref().to_ascii_uppercase())
            .collect();
        self
    }

    fn from_config(config: &PathRuleConfig) -> AppResult<Self> {
        let patterns = config
            .patterns
            .iter()
            .map(|p| PathPattern::parse(p))
            .collect::<AppResult<Vec<_>>>()?;

        if patterns.is_empty() {
            return Err(AppError::configuration(
                "Authorization rule must list at least one pattern",
            ));
        }

        let requirement = match &config.access {
            AccessRule::PermitAll => RoleRequirement::Public,
            AccessRule::Authenticated => RoleRequirement::Authenticated,
            AccessRule::HasRole(role) => RoleRequirement::RoleOrAbove(config_role(role)?),
            AccessRule::HasAnyRole(roles) => {
                if roles.is_empty() {
                    return Err(AppError::configuration(
                        "has_any_role must list at least one role",
                    ));
                }
                RoleRequirement::AnyOf(
                    roles
                        .iter()
                        .map(|r| config_role(r))
                        .collect::<AppResult<_>>()?,
                )
            }
        };

        Ok(Self::new(patterns, requirement).with_methods(&config.methods))
    }

    fn applies_to(&self, method: &str, path: &str) -> bool {
        (self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method)))
            && self.patterns.iter().any(|p| p.matches(path))
    }
}

/// Ordered path rules plus the role hierarchy. Immutable after startup.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    /// First match wins.
    rules: Vec<PathRule>,
    /// Role implications.
    hierarchy: RoleHierarchy,
}

impl AuthorizationPolicy {
    /// Creates a policy from prebuilt rules.
    pub fn new(rules: Vec<PathRule>, hierarchy: RoleHierarchy) -> Self {
        Self { rules, hierarchy }
    }

    /// Compiles the configured rules and hierarchy.
    pub fn from_config(config: &AuthorizationConfig) -> AppResult<Self> {
        let hierarchy = RoleHierarchy::parse(&config.hierarchy)?;
        let rules = config
            .rules
            .iter()
            .map(PathRule::from_config)
            .collect::<AppResult<Vec<_>>>()?;

        debug!(rules = rules.len(), "Authorization policy compiled");
        Ok(Self::new(rules, hierarchy))
    }

    /// The requirement of the first rule matching the request.
    ///
    /// Paths no rule matches require authentication.
    pub fn required_role(&self, method: &str, path: &str) -> &RoleRequirement {
        self.rules
            .iter()
            .find(|rule| rule.applies_to(method, path))
            .map(|rule| &rule.requirement)
            .unwrap_or(&UNMATCHED)
    }

    /// Whether a principal holding `role` meets `requirement`.
    pub fn is_satisfied_by(&self, requirement: &RoleRequirement, role: &Role) -> bool {
        match requirement {
            RoleRequirement::Public | RoleRequirement::Authenticated => true,
            RoleRequirement::RoleOrAbove(target) => self.hierarchy.implies(role, target),
            RoleRequirement::AnyOf(roles) => {
                let effective = self.hierarchy.effective_roles(role);
                !effective.is_disjoint(roles)
            }
        }
    }

    /// The role hierarchy in effect.
    pub fn hierarchy(&self) -> &RoleHierarchy {
        &self.hierarchy
    }
}

fn config_role(name: &str) -> AppResult<Role> {
    Role::new(name)
        .map_err(|e| AppError::configuration(format!("Authorization rule role: {}", e.message)))
}
