use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::IdentityKey;

/// One observed player identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// Normalized join name (e.g., "Odell Beckham")
    pub name: String,

    /// Position (e.g., "QB", "RB", "WR", "TE")
    pub position: String,

    /// Team abbreviation, empty when no source reported one
    pub team: String,

    /// Last name + position + team
    pub identity_key: IdentityKey,
}

impl PlayerIdentity {
    pub fn new(name: String, position: &str, team: &str) -> Self {
        let identity_key = IdentityKey::new(&name, position, team);
        Self {
            position: identity_key.position().to_string(),
            team: identity_key.team().to_string(),
            name,
            identity_key,
        }
    }
}

/// A normalized name shared by players with different identity keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub name: String,
    pub identities: Vec<IdentityKey>,
}

impl fmt::Display for NameCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.identities.iter().map(IdentityKey::as_str).collect();
        write!(f, "'{}' maps to {} identities: {}", self.name, keys.len(), keys.join(", "))
    }
}

/// Errors that can occur while registering or resolving players
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Name normalized to nothing (blank or punctuation only)
    EmptyName(String),

    /// Player not found in registry
    PlayerNotFound(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::EmptyName(raw) => {
                write!(f, "Player name '{raw}' is empty after normalization")
            }
            RegistryError::PlayerNotFound(name) => {
                write!(f, "Player '{name}' not found in registry")
            }
        }
    }
}

impl std::error::Error for RegistryError {}
