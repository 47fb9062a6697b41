use crate::normalize::{normalize_player_name, normalize_position, normalize_team};
use crate::types::{NameCollision, PlayerIdentity, RegistryError};
use std::collections::BTreeMap;
use tracing::debug;

/// Player Registry - Tracks every identity observed under each join name
///
/// The aggregation pipeline joins sources on the normalized name alone. The
/// registry remembers the (position, team) identities seen for each name so
/// the pipeline can report names that merged more than one real player.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    /// Map from normalized name to the identities observed under it
    identities_by_name: BTreeMap<String, Vec<PlayerIdentity>>,
}

impl PlayerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one source row and return its normalized join name.
    ///
    /// A row with an unknown team is folded into an existing identity at the
    /// same position, and a later row that knows the team fills it in.
    pub fn register(
        &mut self,
        raw_name: &str,
        position: &str,
        team: Option<&str>,
    ) -> Result<String, RegistryError> {
        let name = normalize_player_name(raw_name);
        if name.is_empty() {
            return Err(RegistryError::EmptyName(raw_name.to_string()));
        }

        let position = normalize_position(position);
        let team = team.map(normalize_team).unwrap_or_default();
        let entries = self.identities_by_name.entry(name.clone()).or_default();

        let existing = entries.iter_mut().find(|identity| {
            identity.position == position
                && (identity.team == team || identity.team.is_empty() || team.is_empty())
        });

        match existing {
            Some(identity) => {
                if identity.team.is_empty() && !team.is_empty() {
                    *identity = PlayerIdentity::new(name.clone(), &position, &team);
                }
            }
            None => {
                if !entries.is_empty() {
                    debug!("New identity for '{}': {} {}", name, position, team);
                }
                entries.push(PlayerIdentity::new(name.clone(), &position, &team));
            }
        }

        Ok(name)
    }

    /// Get the first identity registered under a normalized name
    pub fn get_by_name(&self, name: &str) -> Result<&PlayerIdentity, RegistryError> {
        self.identities_for(name)
            .first()
            .ok_or_else(|| RegistryError::PlayerNotFound(name.to_string()))
    }

    /// All identities registered under a normalized name
    pub fn identities_for(&self, name: &str) -> &[PlayerIdentity] {
        self.identities_by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names that merged more than one identity, in name order
    pub fn collisions(&self) -> Vec<NameCollision> {
        self.identities_by_name
            .iter()
            .filter(|(_, identities)| identities.len() > 1)
            .map(|(name, identities)| NameCollision {
                name: name.clone(),
                identities: identities.iter().map(|i| i.identity_key.clone()).collect(),
            })
            .collect()
    }

    /// Number of distinct normalized names
    pub fn name_count(&self) -> usize {
        self.identities_by_name.len()
    }

    /// Number of distinct identities across all names
    pub fn identity_count(&self) -> usize {
        self.identities_by_name.values().map(Vec::len).sum()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.identities_by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_normalizes_name() {
        let mut registry = PlayerRegistry::new();
        let name = registry.register("Odell Beckham Jr.", "WR", Some("MIA")).unwrap();

        assert_eq!(name, "Odell Beckham");
        assert_eq!(registry.name_count(), 1);
        assert!(!registry.is_empty());

        let identity = registry.get_by_name("Odell Beckham").unwrap();
        assert_eq!(identity.identity_key.as_str(), "BECKHAM|WR|MIA");
    }

    #[test]
    fn test_same_player_across_sources() {
        let mut registry = PlayerRegistry::new();
        registry.register("Patrick Mahomes II", "QB", Some("KC")).unwrap();
        registry.register("Patrick Mahomes", "qb", Some("kc")).unwrap();

        assert_eq!(registry.identity_count(), 1);
        assert!(registry.collisions().is_empty());
    }

    #[test]
    fn test_missing_team_is_filled_in() {
        let mut registry = PlayerRegistry::new();
        registry.register("Bijan Robinson", "RB", None).unwrap();
        registry.register("Bijan Robinson", "RB", Some("ATL")).unwrap();

        assert_eq!(registry.identity_count(), 1);
        assert_eq!(registry.get_by_name("Bijan Robinson").unwrap().team, "ATL");
    }

    #[test]
    fn test_collision_reported() {
        let mut registry = PlayerRegistry::new();
        registry.register("Josh Allen", "QB", Some("BUF")).unwrap();
        registry.register("Josh Allen", "DE", Some("JAX")).unwrap();
        registry.register("Mike Williams", "WR", Some("NYJ")).unwrap();

        let collisions = registry.collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].name, "Josh Allen");
        assert_eq!(collisions[0].identities.len(), 2);
        assert!(collisions[0].to_string().contains("ALLEN|DE|JAX"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = PlayerRegistry::new();
        let err = registry.register(" . ", "QB", None).unwrap_err();
        assert_eq!(err, RegistryError::EmptyName(" . ".to_string()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_missing_player() {
        let registry = PlayerRegistry::new();
        assert!(matches!(
            registry.get_by_name("Nobody Here"),
            Err(RegistryError::PlayerNotFound(_))
        ));
        assert!(registry.identities_for("Nobody Here").is_empty());
    }
}
