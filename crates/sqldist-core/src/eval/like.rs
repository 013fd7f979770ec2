//! LIKE distance: edit distance between a text and a pattern where `%`
//! matches any run at no cost and `_` matches any single character.
//! The distance is zero exactly when the text matches the pattern.

use crate::value::casefold;

const ANY_RUN: char = '%';
const ANY_CHAR: char = '_';

/// Minimum number of single-character edits that make `text` match `pattern`.
#[must_use]
pub fn like_distance(text: &str, pattern: &str, case_insensitive: bool) -> usize {
    let (text, pattern) = if case_insensitive {
        (casefold(text), casefold(pattern))
    } else {
        (text.to_string(), pattern.to_string())
    };
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    // prev[i] = cost of matching text[..i] against the pattern prefix so far
    let mut prev: Vec<usize> = (0..=text.len()).collect();
    let mut curr = vec![0usize; text.len() + 1];

    for &p in &pattern {
        curr[0] = if p == ANY_RUN { prev[0] } else { prev[0] + 1 };

        for i in 1..=text.len() {
            curr[i] = match p {
                ANY_RUN => prev[i].min(curr[i - 1]),
                _ => {
                    let step = usize::from(p != ANY_CHAR && p != text[i - 1]);
                    (prev[i - 1] + step)
                        .min(prev[i] + 1)
                        .min(curr[i - 1] + 1)
                }
            };
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[text.len()]
}

///
/// TESTS
///
