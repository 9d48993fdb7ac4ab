//! Subsequence fuzzy matching.
//!
//! Every character of the pattern must appear in the candidate, in order,
//! compared case-insensitively. Matches are scored so that contiguous runs,
//! matches at word starts and matches near the start of the candidate rank
//! higher, and every unmatched candidate character costs a point.

const FIRST_CHAR_MATCH_BONUS: i32 = 10;
const SEPARATOR_MATCH_BONUS: i32 = 20;
const CAMEL_CASE_MATCH_BONUS: i32 = 20;
const ADJACENT_MATCH_BONUS: i32 = 5;
const UNMATCHED_LEADING_CHAR_PENALTY: i32 = -5;
const MAX_UNMATCHED_LEADING_CHAR_PENALTY: i32 = -15;

/// A candidate that matched the pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Position of the candidate in the input slice.
    pub index: usize,
    /// Match score, higher is better.
    pub score: i32,
    /// Character positions in the candidate that matched the pattern.
    pub matched: Vec<usize>,
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '_' | '-' | '.' | '/' | '\\' | ',')
}

fn eq_fold(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn match_positions(pattern: &[char], candidate: &[char]) -> Option<(i32, Vec<usize>)> {
    let mut score = 0;
    let mut matched = Vec::with_capacity(pattern.len());
    let mut next = 0;

    for (i, &c) in candidate.iter().enumerate() {
        if next == pattern.len() {
            break;
        }
        if !eq_fold(c, pattern[next]) {
            continue;
        }

        if i == 0 {
            score += FIRST_CHAR_MATCH_BONUS;
        } else {
            let prev = candidate[i - 1];
            if is_separator(prev) {
                score += SEPARATOR_MATCH_BONUS;
            } else if prev.is_lowercase() && c.is_uppercase() {
                score += CAMEL_CASE_MATCH_BONUS;
            }
        }

        match matched.last() {
            Some(&last) if last + 1 == i => score += ADJACENT_MATCH_BONUS,
            None => {
                let leading = (i as i32) * UNMATCHED_LEADING_CHAR_PENALTY;
                score += leading.max(MAX_UNMATCHED_LEADING_CHAR_PENALTY);
            }
            _ => {}
        }

        matched.push(i);
        next += 1;
    }

    if next < pattern.len() {
        return None;
    }

    score -= (candidate.len() - matched.len()) as i32;
    Some((score, matched))
}

/// Score `pattern` against a single candidate, or `None` when it does not match.
pub fn score(pattern: &str, candidate: &str) -> Option<i32> {
    let pattern: Vec<char> = pattern.chars().collect();
    if pattern.is_empty() {
        return None;
    }
    let candidate: Vec<char> = candidate.chars().collect();
    match_positions(&pattern, &candidate).map(|(score, _)| score)
}

/// Match `pattern` against every candidate, best first.
///
/// The sort is stable, so candidates with equal scores keep their input order.
pub fn find<S: AsRef<str>>(pattern: &str, candidates: &[S]) -> Vec<FuzzyMatch> {
    let pattern: Vec<char> = pattern.chars().collect();
    if pattern.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<FuzzyMatch> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            let chars: Vec<char> = candidate.as_ref().chars().collect();
            match_positions(&pattern, &chars).map(|(score, matched)| FuzzyMatch {
                index,
                score,
                matched,
            })
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}
