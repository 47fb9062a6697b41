//! Name normalization used as the cross-source join key.
//!
//! The rule is deliberately simple: drop ASCII punctuation, then keep the
//! first two whitespace-separated tokens. That collapses suffixes such as
//! "Jr.", "Sr." or "II" so "Odell Beckham Jr." and "Odell Beckham" join.
//!
//! Known collision behavior:
//! - names with three or more tokens lose everything after the second token,
//!   so "Amon-Ra St. Brown" and "Amon-Ra St. Pierre" both become "AmonRa St";
//! - initials lose their periods, so "D.J. Moore" and "DJ Moore" join;
//! - hyphens and apostrophes are dropped too, so "Ja'Marr Chase" joins
//!   "JaMarr Chase" and "Amon-Ra" becomes "AmonRa".

/// Number of leading name tokens kept in a normalized name
pub const NAME_TOKENS: usize = 2;

/// Normalize a raw display name into the join key shared by all sources.
pub fn normalize_player_name(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !c.is_ascii_punctuation()).collect();

    cleaned.split_whitespace().take(NAME_TOKENS).collect::<Vec<_>>().join(" ")
}

/// Normalize a position label ("rb " -> "RB").
pub fn normalize_position(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize a team abbreviation ("kc" -> "KC").
pub fn normalize_team(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Last token of an already-normalized name.
pub fn last_name(normalized: &str) -> &str {
    normalized.split_whitespace().last().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes_collapse() {
        assert_eq!(normalize_player_name("Odell Beckham Jr."), "Odell Beckham");
        assert_eq!(normalize_player_name("Patrick Mahomes II"), "Patrick Mahomes");
        assert_eq!(normalize_player_name("Marvin Harrison Jr"), "Marvin Harrison");
        assert_eq!(normalize_player_name("Kenneth Walker, III"), "Kenneth Walker");
    }

    #[test]
    fn test_initials_and_whitespace() {
        assert_eq!(normalize_player_name("D.J. Moore"), "DJ Moore");
        assert_eq!(normalize_player_name("  DJ   Moore "), "DJ Moore");
        assert_eq!(normalize_player_name("C.J. Stroud"), normalize_player_name("CJ Stroud"));
    }

    #[test]
    fn test_multi_part_names_over_collapse() {
        // Documented limitation: everything past the second token is dropped.
        assert_eq!(normalize_player_name("Amon-Ra St. Brown"), "AmonRa St");
        assert_eq!(
            normalize_player_name("Amon-Ra St. Brown"),
            normalize_player_name("Amon-Ra St. Pierre")
        );
    }

    #[test]
    fn test_all_punctuation_stripped() {
        assert_eq!(normalize_player_name("Ja'Marr Chase"), "JaMarr Chase");
        assert_eq!(normalize_player_name("Ja'Marr Chase"), normalize_player_name("JaMarr Chase"));
        assert_eq!(normalize_player_name("Jaxon Smith-Njigba"), "Jaxon SmithNjigba");
        assert_eq!(normalize_player_name("De'Von Achane!"), "DeVon Achane");
    }

    #[test]
    fn test_degenerate_names() {
        assert_eq!(normalize_player_name(""), "");
        assert_eq!(normalize_player_name("..."), "");
        assert_eq!(normalize_player_name("Cher"), "Cher");
    }

    #[test]
    fn test_position_team_and_last_name() {
        assert_eq!(normalize_position(" wr"), "WR");
        assert_eq!(normalize_team("kc "), "KC");
        assert_eq!(last_name("Josh Allen"), "Allen");
        assert_eq!(last_name(""), "");
    }
}
