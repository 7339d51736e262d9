//! Word-cloud aggregation and ranking.
//!
//! Turns a profile's submission history into a ranked list of words, each
//! tagged with a size bucket for display.
//!
//! # Algorithm
//!
//! 1. Every submission contributes its three words, lowercased, to a
//!    frequency count. Original casing is discarded.
//! 2. Words are ranked by count, highest first. Equal counts keep
//!    first-seen order: the word whose first occurrence comes earliest in
//!    the input (submission order, then word 1 to word 3) ranks higher.
//! 3. The top count is the reference (`max_count`, 1 for empty input).
//! 4. Each word gets `bucket = clamp(ceil(count / max_count * 4), 1, 4)`.
//!
//! ```
//! use threewords_core::word_cloud::{build_word_cloud, ThreeWords};
//!
//! struct S(&'static str, &'static str, &'static str);
//!
//! impl ThreeWords for S {
//!     fn words(&self) -> [&str; 3] {
//!         [self.0, self.1, self.2]
//!     }
//! }
//!
//! let cloud = build_word_cloud(&[S("Cat", "Dog", "Cat"), S("cat", "Bird", "Dog")]);
//! let ranked: Vec<_> = cloud.iter().map(|e| (e.word.as_str(), e.count, e.bucket)).collect();
//! assert_eq!(ranked, [("cat", 3, 4), ("dog", 2, 3), ("bird", 1, 2)]);
//! ```

use std::collections::HashMap;

use serde::Serialize;

/// Number of size buckets.
pub const BUCKET_COUNT: u32 = 4;

/// Anything that carries three submitted words.
pub trait ThreeWords {
    /// The three words in submission order.
    fn words(&self) -> [&str; 3];
}

impl ThreeWords for [&str; 3] {
    fn words(&self) -> [&str; 3] {
        *self
    }
}

impl ThreeWords for (&str, &str, &str) {
    fn words(&self) -> [&str; 3] {
        [self.0, self.1, self.2]
    }
}

/// One ranked word in the cloud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloudEntry {
    /// Lowercase form of the word.
    pub word: String,
    /// Number of times the word was submitted.
    pub count: u32,
    /// Relative size class in `1..=4`, 4 being the most frequent.
    pub bucket: u32,
}

impl CloudEntry {
    /// "1 time" / "N times", for hover titles.
    #[must_use]
    pub fn times_label(&self) -> String {
        if self.count == 1 {
            "1 time".to_string()
        } else {
            format!("{} times", self.count)
        }
    }
}

/// Build the ranked, bucketed word cloud for a submission history.
///
/// Returns an empty list for an empty history.
#[must_use]
pub fn build_word_cloud<S: ThreeWords>(submissions: &[S]) -> Vec<CloudEntry> {
    // (count, first-seen index) per lowercase word
    let mut tally: HashMap<String, (u32, usize)> = HashMap::new();
    let mut seen = 0_usize;

    for submission in submissions {
        for word in submission.words() {
            let entry = tally.entry(word.to_lowercase()).or_insert((0, seen));
            entry.0 += 1;
            seen += 1;
        }
    }

    let mut ranked: Vec<(String, u32, usize)> = tally
        .into_iter()
        .map(|(word, (count, first_seen))| (word, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let max_count = ranked.first().map_or(1, |(_, count, _)| *count);

    ranked
        .into_iter()
        .map(|(word, count, _)| CloudEntry {
            word,
            count,
            bucket: bucket_for(count, max_count),
        })
        .collect()
}

/// `clamp(ceil(count / max_count * 4), 1, 4)` in integer arithmetic.
#[must_use]
pub fn bucket_for(count: u32, max_count: u32) -> u32 {
    let max_count = max_count.max(1);
    let scaled = (u64::from(count) * u64::from(BUCKET_COUNT)).div_ceil(u64::from(max_count));
    u32::try_from(scaled)
        .unwrap_or(BUCKET_COUNT)
        .clamp(1, BUCKET_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(cloud: &[CloudEntry]) -> Vec<(&str, u32, u32)> {
        cloud
            .iter()
            .map(|e| (e.word.as_str(), e.count, e.bucket))
            .collect()
    }

    #[test]
    fn test_case_folded_counts() {
        let cloud = build_word_cloud(&[("Cat", "Dog", "Cat"), ("cat", "Bird", "Dog")]);
        assert_eq!(
            ranked(&cloud),
            [("cat", 3, 4), ("dog", 2, 3), ("bird", 1, 2)]
        );
    }

    #[test]
    fn test_empty_history() {
        let empty: [[&str; 3]; 0] = [];
        assert!(build_word_cloud(&empty).is_empty());
    }

    #[test]
    fn test_counts_are_non_increasing() {
        let cloud = build_word_cloud(&[
            ["a", "b", "c"],
            ["c", "d", "c"],
            ["b", "e", "f"],
            ["c", "b", "a"],
        ]);
        for pair in cloud.windows(2) {
            if let [first, second] = pair {
                assert!(first.count >= second.count);
            }
        }
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let cloud = build_word_cloud(&[["zebra", "apple", "mango"], ["Mango", "apple", "zebra"]]);
        let words: Vec<_> = cloud.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, ["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_tie_break_is_stable_across_calls() {
        let history = [["x", "y", "z"], ["q", "r", "s"]];
        assert_eq!(build_word_cloud(&history), build_word_cloud(&history));
        let words: Vec<_> = build_word_cloud(&history)
            .into_iter()
            .map(|e| e.word)
            .collect();
        assert_eq!(words, ["x", "y", "z", "q", "r", "s"]);
    }

    #[test]
    fn test_single_word_is_top_bucket() {
        let cloud = build_word_cloud(&[["solo", "solo", "solo"]]);
        assert_eq!(ranked(&cloud), [("solo", 3, 4)]);
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket_for(10, 10), 4);
        assert_eq!(bucket_for(8, 10), 4); // 3.2 -> 4
        assert_eq!(bucket_for(5, 10), 2); // 2.0 -> 2
        assert_eq!(bucket_for(6, 10), 3); // 2.4 -> 3
        assert_eq!(bucket_for(1, 10), 1); // 0.4 -> 1
        assert_eq!(bucket_for(1, 100), 1); // floor at 1
        assert_eq!(bucket_for(1, 3), 2);
    }

    #[test]
    fn test_bucket_with_zero_max_is_clamped() {
        assert_eq!(bucket_for(0, 0), 1);
    }

    #[test]
    fn test_times_label() {
        let one = CloudEntry {
            word: "kind".to_string(),
            count: 1,
            bucket: 4,
        };
        assert_eq!(one.times_label(), "1 time");

        let many = CloudEntry { count: 5, ..one };
        assert_eq!(many.times_label(), "5 times");
    }
}
