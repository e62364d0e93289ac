//! Role hierarchy: a partial order over role tags.

use std::collections::{BTreeSet, HashMap};

use formgate_core::error::AppError;
use formgate_core::result::AppResult;
use formgate_entity::user::Role;

/// Which roles each role implies, closed transitively.
///
/// Parsed from lines of the form `ROLE_C > ROLE_B`; a line may chain
/// several roles (`C > B > A`). Every role implies itself. Cycles are
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct RoleHierarchy {
    /// Role to every role strictly below it.
    implied: HashMap<Role, BTreeSet<Role>>,
}

impl RoleHierarchy {
    /// A hierarchy with no implications.
    pub fn flat() -> Self {
        Self::default()
    }

    /// Parses a hierarchy declaration.
    pub fn parse(declaration: &str) -> AppResult<Self> {
        let mut direct: HashMap<Role, BTreeSet<Role>> = HashMap::new();

        for line in declaration.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let roles = line
                .split('>')
                .map(|name| {
                    Role::new(name).map_err(|e| {
                        AppError::configuration(format!(
                            "Invalid role hierarchy line '{line}': {}",
                            e.message
                        ))
                    })
                })
                .collect::<AppResult<Vec<_>>>()?;

            if roles.len() < 2 {
                return Err(AppError::configuration(format!(
                    "Invalid role hierarchy line '{line}': expected 'SUPERIOR > INFERIOR'"
                )));
            }

            for pair in roles.windows(2) {
                direct
                    .entry(pair[0].clone())
                    .or_default()
                    .insert(pair[1].clone());
            }
        }

        let mut implied = HashMap::with_capacity(direct.len());
        for role in direct.keys() {
            let reachable = reachable_from(role, &direct);
            if reachable.contains(role) {
                return Err(AppError::configuration(format!(
                    "Role hierarchy contains a cycle through {role}"
                )));
            }
            implied.insert(role.clone(), reachable);
        }

        Ok(Self { implied })
    }

    /// The role plus every role it implies.
    pub fn effective_roles(&self, role: &Role) -> BTreeSet<Role> {
        let mut roles = self.implied.get(role).cloned().unwrap_or_default();
        roles.insert(role.clone());
        roles
    }

    /// Whether `held` is `required` or ranks above it.
    pub fn implies(&self, held: &Role, required: &Role) -> bool {
        held == required
            || self
                .implied
                .get(held)
                .is_some_and(|below| below.contains(required))
    }
}

fn reachable_from(start: &Role, direct: &HashMap<Role, BTreeSet<Role>>) -> BTreeSet<Role> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<&Role> = direct.get(start).into_iter().flatten().collect();

    while let Some(role) = stack.pop() {
        if seen.insert(role.clone()) {
            stack.extend(direct.get(role).into_iter().flatten());
        }
    }

    seen
}
