// Fuzzy matching of spreadsheet row descriptions against candidate tasks

/// Minimum score for a row/candidate pairing to be accepted
pub const MATCH_THRESHOLD: u8 = 40;

/// Best candidate for a row description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Position of the candidate in the slice it was chosen from
    pub index: usize,
    /// Similarity on a 0-100 scale
    pub score: u8,
}

/// Partial-substring similarity on a 0-100 scale.
///
/// The shorter string is compared against every window of the same length in
/// the longer one and the best window wins, so a string fully contained in
/// the other scores 100. Comparison is by characters and case-sensitive;
/// callers lower-case both sides first.
pub fn partial_ratio(s1: &str, s2: &str) -> u8 {
    let (shorter, longer) = if s1.chars().count() <= s2.chars().count() {
        (s1, s2)
    } else {
        (s2, s1)
    };

    let short_chars: Vec<char> = shorter.chars().collect();
    let long_chars: Vec<char> = longer.chars().collect();
    let short_len = short_chars.len();

    if short_len == 0 {
        return 0;
    }

    let mut best = 0.0_f64;
    for start in 0..=(long_chars.len() - short_len) {
        let window: String = long_chars[start..start + short_len].iter().collect();
        let similarity = strsim::normalized_levenshtein(shorter, &window);
        if similarity > best {
            best = similarity;
            if best >= 1.0 {
                break;
            }
        }
    }

    (best * 100.0).round() as u8
}

/// Whether a score clears the acceptance threshold
pub fn is_accepted(score: u8, threshold: u8) -> bool {
    score >= threshold
}

/// Pick the candidate most similar to `query`.
///
/// Only a strictly higher score replaces the current best, so ties resolve to
/// the earliest candidate. Candidates scoring 0 are never chosen. The caller
/// decides acceptance with [`is_accepted`].
pub fn best_match(query: &str, candidates: &[&str]) -> Option<FuzzyMatch> {
    let mut best: Option<FuzzyMatch> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let score = partial_ratio(query, candidate);
        if score > best.map_or(0, |b| b.score) {
            best = Some(FuzzyMatch { index, score });
        }
    }

    best
}
