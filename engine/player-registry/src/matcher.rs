use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Default minimum Skim score for a fuzzy name match
pub const DEFAULT_MIN_SCORE: i64 = 60;

/// Fuzzy fallback for names that fail to join exactly
///
/// Used only after exact matching, e.g. "Gabe Davis" in an ADP table against
/// "Gabriel Davis" in the projections.
pub struct NameMatcher {
    matcher: SkimMatcherV2,
    min_score: i64,
}

impl NameMatcher {
    pub fn new(min_score: i64) -> Self {
        Self { matcher: SkimMatcherV2::default(), min_score }
    }

    /// Score of `query` against one candidate name, if it matches at all.
    pub fn score(&self, candidate: &str, query: &str) -> Option<i64> {
        self.matcher.fuzzy_match(candidate, query)
    }

    /// Best candidate scoring strictly above the minimum score.
    ///
    /// Ties keep the earliest candidate, so callers that iterate candidates in
    /// a fixed order get a deterministic answer.
    pub fn best_match<'a, I>(&self, query: &str, candidates: I) -> Option<(&'a str, i64)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<(&'a str, i64)> = None;

        for candidate in candidates {
            let Some(score) = self.score(candidate, query) else { continue };
            if score <= self.min_score {
                continue;
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        best
    }
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nickname_matches_full_name() {
        let matcher = NameMatcher::default();
        let candidates = ["Gabriel Davis", "Zay Flowers"];

        let (name, score) = matcher.best_match("Gabe Davis", candidates).unwrap();
        assert_eq!(name, "Gabriel Davis");
        assert!(score > DEFAULT_MIN_SCORE);
    }

    #[test]
    fn test_no_match_below_threshold() {
        let matcher = NameMatcher::default();
        assert!(matcher.best_match("Zay Flowers", ["Gabriel Davis"]).is_none());
        assert!(matcher.best_match("Zay Flowers", Vec::<&str>::new()).is_none());
    }

    #[test]
    fn test_exact_name_scores_highest() {
        let matcher = NameMatcher::new(0);
        let candidates = ["Mike Williams", "Mike Evans"];

        let (name, _) = matcher.best_match("Mike Williams", candidates).unwrap();
        assert_eq!(name, "Mike Williams");
    }
}
