//! Heuristic segmentation of Arabic text into hadith candidates.
//!
//! A candidate is the span from a transmission phrase (`حدثنا`, `أخبرنا`,
//! `عن`, `قال رسول الله`) up to the first full stop or Arabic comma.
//! Narrator names are the first token after a narrator phrase, accepted
//! only when the name run is followed by another link of the chain
//! (`عن`, `قال`, `أن`) or by the end of the candidate. Matching ignores
//! Arabic diacritics. Recall and precision are approximate.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Optional harakat, shadda, sukun, dagger alif and tatweel after a letter.
const MARKS: &str = "[\u{0640}\u{064B}-\u{065F}\u{0670}]*";

const HADITH_PHRASES: &[&str] = &["حدثنا", "أخبرنا", "عن", "قال رسول الله"];
const NARRATOR_PHRASES: &[&str] = &["حدثنا", "عن", "أخبرنا"];
const CHAIN_CONTINUATIONS: &[&str] = &["عن", "قال", "أن"];

/// Tokens allowed after the narrator token before the chain continues.
const MAX_TRAILING_NAME_TOKENS: usize = 2;

static HADITH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    HADITH_PHRASES
        .iter()
        .map(|phrase| {
            Regex::new(&format!(r"(?s){}.*?[.،]", phrase_pattern(phrase)))
                .expect("hadith phrase pattern is valid")
        })
        .collect()
});

static NARRATOR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NARRATOR_PHRASES
        .iter()
        .map(|phrase| {
            Regex::new(&format!(r"{}\s+", phrase_pattern(phrase)))
                .expect("narrator phrase pattern is valid")
        })
        .collect()
});

static CHAIN_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = CHAIN_CONTINUATIONS
        .iter()
        .map(|phrase| phrase_pattern(phrase))
        .collect();
    Regex::new(&format!(r"^\s+(?:{})", alternatives.join("|")))
        .expect("chain continuation pattern is valid")
});

/// Builds a pattern for `phrase` that tolerates diacritics after every letter.
fn phrase_pattern(phrase: &str) -> String {
    let mut pattern = String::new();
    for (index, word) in phrase.split(' ').enumerate() {
        if index > 0 {
            pattern.push_str(r"\s+");
        }
        let mut buf = [0u8; 4];
        for letter in word.chars() {
            pattern.push_str(&regex::escape(letter.encode_utf8(&mut buf)));
            pattern.push_str(MARKS);
        }
    }
    pattern
}

/// A span of text that looks like one hadith.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadithCandidate {
    pub text: String,
    pub narrators: Vec<String>,
    /// 1-based ordinal within the result list.
    pub position: usize,
    /// Length in characters.
    pub length: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HadithSegmenter;

impl HadithSegmenter {
    pub fn new() -> Self {
        Self
    }

    pub fn segment(&self, text: &str) -> Vec<HadithCandidate> {
        self.find_spans(text)
            .into_iter()
            .enumerate()
            .map(|(index, span)| self.candidate(index + 1, span))
            .collect()
    }

    /// Candidate spans in pattern order, trimmed, with exact repeats dropped.
    pub fn find_spans<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut seen = HashSet::new();
        let mut spans = Vec::new();

        for pattern in HADITH_PATTERNS.iter() {
            for found in pattern.find_iter(text) {
                let span = found.as_str().trim();
                if seen.insert(span) {
                    spans.push(span);
                }
            }
        }

        spans
    }

    pub fn candidate(&self, position: usize, span: &str) -> HadithCandidate {
        HadithCandidate {
            text: span.to_string(),
            narrators: self.narrators(span),
            position,
            length: span.chars().count(),
        }
    }

    pub fn narrators(&self, span: &str) -> Vec<String> {
        let mut narrators: Vec<String> = Vec::new();

        for pattern in NARRATOR_PATTERNS.iter() {
            let mut cursor = 0;
            while let Some(phrase) = pattern.find_at(span, cursor) {
                match name_run(span, phrase.end()) {
                    Some((name, end)) => {
                        if !narrators.iter().any(|n| n == name) {
                            narrators.push(name.to_string());
                        }
                        cursor = end;
                    }
                    None => cursor = next_boundary(span, phrase.start()),
                }
                if cursor >= span.len() {
                    break;
                }
            }
        }

        narrators
    }
}

/// Reads the narrator token at `start` plus up to two trailing tokens and
/// returns the token with the end of the longest run that is followed by
/// a chain continuation or the end of the text. The continuation itself
/// is not consumed.
fn name_run(text: &str, start: usize) -> Option<(&str, usize)> {
    let first_end = token_end(text, start)?;
    let mut ends = vec![first_end];
    let mut cursor = first_end;

    for _ in 0..MAX_TRAILING_NAME_TOKENS {
        let token_start = skip_whitespace(text, cursor);
        if token_start == cursor {
            break;
        }
        match token_end(text, token_start) {
            Some(end) => {
                ends.push(end);
                cursor = end;
            }
            None => break,
        }
    }

    ends.into_iter()
        .rev()
        .find(|&end| continues_chain(&text[end..]))
        .map(|end| (&text[start..first_end], end))
}

fn continues_chain(rest: &str) -> bool {
    rest.is_empty() || rest == "\n" || CHAIN_CONTINUATION.is_match(rest)
}

fn token_end(text: &str, start: usize) -> Option<usize> {
    let end = text[start..]
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(offset, _)| start + offset)
        .unwrap_or(text.len());
    (end > start).then_some(end)
}

fn skip_whitespace(text: &str, start: usize) -> usize {
    text[start..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map(|(offset, _)| start + offset)
        .unwrap_or(text.len())
}

fn next_boundary(text: &str, index: usize) -> usize {
    text[index..]
        .chars()
        .next()
        .map(|c| index + c.len_utf8())
        .unwrap_or(text.len())
}
