//! Reading time estimation

use super::post::ContentBlock;
use super::richtext;

/// Average reading speed used for estimates
pub const WORDS_PER_MINUTE: usize = 200;

/// Count whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words in every heading plus the plain-text form of every body
pub fn total_words(blocks: &[ContentBlock]) -> usize {
    blocks
        .iter()
        .map(|block| count_words(&block.heading) + count_words(&richtext::as_text(&block.body)))
        .sum()
}

/// Estimated reading time in whole minutes, rounded up
///
/// An empty post reads in zero minutes.
pub fn reading_time(blocks: &[ContentBlock]) -> usize {
    total_words(blocks).div_ceil(WORDS_PER_MINUTE)
}
