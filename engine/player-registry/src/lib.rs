//! Player Registry - Resolves player identity across projection sources
//!
//! Every projection and ADP source spells player names a little differently.
//! This crate turns raw display names into the normalized join key used by the
//! aggregation pipeline, derives a stronger identity key (last name, position,
//! team) to spot names that collapse onto the same key, and offers a fuzzy
//! fallback matcher for names that fail to join exactly.

pub mod identity;
pub mod matcher;
pub mod normalize;
pub mod registry;
pub mod types;

pub use identity::IdentityKey;
pub use matcher::NameMatcher;
pub use normalize::{normalize_player_name, normalize_position, normalize_team};
pub use registry::PlayerRegistry;
pub use types::{NameCollision, PlayerIdentity, RegistryError};
