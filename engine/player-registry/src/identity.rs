use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::{last_name, normalize_position, normalize_team};

/// Identity key for a player: last name, position and team
///
/// Two rows that share a normalized name but differ in identity key are
/// different players that the name-based join will merge anyway. The key is a
/// plain composite string so it is stable across runs and platforms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Build a key from an already-normalized name plus raw position and team.
    pub fn new(normalized_name: &str, position: &str, team: &str) -> Self {
        let composite_key = format!(
            "{}|{}|{}",
            last_name(normalized_name).to_uppercase(),
            normalize_position(position),
            normalize_team(team)
        );
        Self(composite_key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Position component of the key
    pub fn position(&self) -> &str {
        self.0.split('|').nth(1).unwrap_or("")
    }

    /// Team component of the key (empty when the team was unknown)
    pub fn team(&self) -> &str {
        self.0.split('|').nth(2).unwrap_or("")
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_is_deterministic() {
        let a = IdentityKey::new("Josh Allen", "qb", "buf");
        let b = IdentityKey::new("Josh Allen", "QB", "BUF");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "ALLEN|QB|BUF");
    }

    #[test]
    fn test_identity_key_components() {
        let key = IdentityKey::new("Mike Williams", "WR", "");
        assert_eq!(key.position(), "WR");
        assert_eq!(key.team(), "");
        assert_eq!(key.to_string(), "WILLIAMS|WR|");
    }

    #[test]
    fn test_same_name_different_player() {
        let receiver = IdentityKey::new("Josh Allen", "WR", "JAX");
        let quarterback = IdentityKey::new("Josh Allen", "QB", "BUF");
        assert_ne!(receiver, quarterback);
    }
}
