use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ELEVATED_ROLES: [&str; 2] = ["ORG_ADMIN", "SECURITY"];

/// Roles allowed to register their own presence at a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub elevated_roles: BTreeSet<String>,
}

impl EvaluationConfig {
    pub fn with_roles<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            elevated_roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self::with_roles(DEFAULT_ELEVATED_ROLES)
    }
}
