use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Authenticated identity performing a mutation, supplied by the surrounding
/// auth layer. The engine records it in the change log and trusts it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub username: String,
    pub role: String,
}

impl Actor {
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
        }
    }

    /// Every mutating operation requires a usable actor; audit entries are
    /// mandatory, not best-effort.
    pub fn require(&self) -> EngineResult<&str> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(EngineError::MissingActor);
        }
        Ok(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_blank_username() {
        assert!(matches!(
            Actor::new("  ", "agent").require(),
            Err(EngineError::MissingActor)
        ));
        assert_eq!(Actor::new("priya", "team_leader").require().unwrap(), "priya");
    }
}
