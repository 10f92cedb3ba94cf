//! # Resource Matcher
//!
//! Filters a listing with a predicate and classifies the outcome.

/// Outcome of matching a listing against a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult<T> {
    /// Nothing matched
    None,
    /// Exactly one candidate matched
    Unique(T),
    /// More than one candidate matched; callers must not pick one
    Ambiguous(Vec<T>),
}

/// Label for a [`MatchResult`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    None,
    Unique,
    Ambiguous,
}

impl MatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOutcome::None => "none",
            MatchOutcome::Unique => "unique",
            MatchOutcome::Ambiguous => "ambiguous",
        }
    }
}

impl<T> MatchResult<T> {
    /// Classify an already filtered set of matches
    pub fn from_matches(mut matches: Vec<T>) -> Self {
        match matches.len() {
            0 => MatchResult::None,
            1 => match matches.pop() {
                Some(only) => MatchResult::Unique(only),
                None => MatchResult::None,
            },
            _ => MatchResult::Ambiguous(matches),
        }
    }

    /// Number of matching candidates
    pub fn len(&self) -> usize {
        match self {
            MatchResult::None => 0,
            MatchResult::Unique(_) => 1,
            MatchResult::Ambiguous(all) => all.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MatchResult::None)
    }

    pub fn outcome(&self) -> MatchOutcome {
        match self {
            MatchResult::None => MatchOutcome::None,
            MatchResult::Unique(_) => MatchOutcome::Unique,
            MatchResult::Ambiguous(_) => MatchOutcome::Ambiguous,
        }
    }
}

/// Keep every candidate satisfying `predicate`, in listing order, and classify the result
pub fn match_candidates<T, I, P>(candidates: I, mut predicate: P) -> MatchResult<T>
where
    I: IntoIterator<Item = T>,
    P: FnMut(&T) -> bool,
{
    MatchResult::from_matches(
        candidates
            .into_iter()
            .filter(|candidate| predicate(candidate))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_candidates_none() {
        let result = match_candidates(vec![1, 3, 5], |n| n % 2 == 0);
        assert_eq!(result, MatchResult::None);
        assert!(result.is_empty());
        assert_eq!(result.outcome(), MatchOutcome::None);
    }

    #[test]
    fn test_match_candidates_unique() {
        let result = match_candidates(vec![1, 2, 3], |n| n % 2 == 0);
        assert_eq!(result, MatchResult::Unique(2));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_match_candidates_ambiguous_keeps_listing_order() {
        let result = match_candidates(vec![4, 1, 2, 3], |n| n % 2 == 0);
        assert_eq!(result, MatchResult::Ambiguous(vec![4, 2]));
        assert_eq!(result.len(), 2);
        assert_eq!(result.outcome().as_str(), "ambiguous");
    }

    #[test]
    fn test_outcome_independent_of_listing_order() {
        let forward = vec!["a", "b", "a"];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(
            match_candidates(forward, |s| *s == "a").outcome(),
            match_candidates(reversed, |s| *s == "a").outcome()
        );
    }
}
