//! Answer validation.
//!
//! [`is_invalid`] classifies an answer as gibberish before it reaches the
//! backend. [`InvalidAnswerGuard`] counts consecutive invalid answers; once
//! the threshold is reached the session is force-ended.

use serde::{Deserialize, Serialize};

/// Consecutive invalid answers that end a session.
pub const DEFAULT_INVALID_THRESHOLD: u32 = 3;

fn is_symbol(c: char) -> bool {
    !(c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Longest run of consecutive chars satisfying `pred`.
fn longest_run(chars: &[char], pred: impl Fn(char) -> bool) -> usize {
    let mut best = 0;
    let mut current = 0;
    for &c in chars {
        if pred(c) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

/// A char other than a newline repeated four or more times in a row.
fn has_repeated_char(chars: &[char]) -> bool {
    let mut run = 0;
    let mut prev: Option<char> = None;
    for &c in chars {
        if c != '\n' && prev == Some(c) {
            run += 1;
            if run >= 4 {
                return true;
            }
        } else {
            run = 1;
        }
        prev = Some(c);
    }
    false
}

/// True if some maximal word token consists of two or more letters only.
fn has_word(chars: &[char]) -> bool {
    chars
        .split(|c| !is_word_char(*c))
        .any(|token| token.len() >= 2 && token.iter().all(|c| c.is_ascii_lowercase()))
}

/// Classifies an answer as invalid (gibberish, symbols, digits only, too short).
pub fn is_invalid(text: &str) -> bool {
    let s = text.trim().to_lowercase();
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    if len < 3 {
        return true;
    }

    let alpha = chars.iter().filter(|c| c.is_ascii_lowercase()).count();
    let digits = chars.iter().filter(|c| c.is_ascii_digit()).count();
    let symbols = chars.iter().filter(|c| is_symbol(**c)).count();
    let vowels = chars.iter().filter(|c| is_vowel(**c)).count();

    let alpha_ratio = alpha as f64 / len as f64;
    let symbol_ratio = symbols as f64 / len as f64;
    let vowel_ratio = if alpha > 0 {
        vowels as f64 / alpha as f64
    } else {
        0.0
    };

    if symbol_ratio > 0.20 {
        return true;
    }
    if alpha_ratio < 0.4 && digits > alpha {
        return true;
    }
    if len < 10 && symbols > 0 {
        return true;
    }

    if alpha > 10 {
        if vowel_ratio < 0.20 {
            return true;
        }
        let consonant_cluster = longest_run(&chars, |c| {
            !(is_vowel(c) || c.is_whitespace() || c.is_ascii_digit())
        });
        if consonant_cluster >= 6 {
            return true;
        }
    }

    if has_repeated_char(&chars) {
        return true;
    }
    if longest_run(&chars, is_symbol) >= 3 {
        return true;
    }
    if !has_word(&chars) && len > 3 {
        return true;
    }

    false
}

/// Counter of consecutive invalid answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidAnswerGuard {
    attempts: u32,
    threshold: u32,
}

impl Default for InvalidAnswerGuard {
    fn default() -> Self {
        Self::new(DEFAULT_INVALID_THRESHOLD)
    }
}

impl InvalidAnswerGuard {
    /// Creates a guard. The threshold is clamped to at least 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            attempts: 0,
            threshold: threshold.max(1),
        }
    }

    /// Restores a guard with a persisted attempt count.
    pub fn with_attempts(threshold: u32, attempts: u32) -> Self {
        Self {
            attempts,
            ..Self::new(threshold)
        }
    }

    pub fn increment(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold.max(1);
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_inputs_are_invalid() {
        for text in ["", " ", "a", "ok", "  hi  ", "\t\n"] {
            assert!(is_invalid(text), "expected invalid: {:?}", text);
        }
    }

    #[test]
    fn test_repeated_chars_are_invalid() {
        for text in ["aaaa", "zzzzzzzz", "1111", "....", "mmmmm"] {
            assert!(is_invalid(text), "expected invalid: {:?}", text);
        }
    }

    #[test]
    fn test_reference_examples() {
        assert!(!is_invalid("I think my biggest strength is problem solving"));
        assert!(is_invalid("asdkfjh23!!@@##"));
    }

    #[test]
    fn test_ordinary_answers_are_valid() {
        for text in [
            "Yes",
            "I led a team of five engineers.",
            "My experience with Rust is about 3 years",
            "I would start by clarifying the requirements, then sketch a design.",
        ] {
            assert!(!is_invalid(text), "expected valid: {:?}", text);
        }
    }

    #[test]
    fn test_mostly_digits_is_invalid() {
        assert!(is_invalid("1234567 89"));
    }

    #[test]
    fn test_short_with_symbol_is_invalid() {
        assert!(is_invalid("yes!"));
        assert!(!is_invalid("yes sure"));
    }

    #[test]
    fn test_consonant_gibberish_is_invalid() {
        assert!(is_invalid("bcdfghjklm qwrtps"));
        assert!(is_invalid("strengths rhythms xyz"));
    }

    #[test]
    fn test_symbol_runs_are_invalid() {
        assert!(is_invalid("I am very good at this ?!?"));
    }

    #[test]
    fn test_no_words_is_invalid() {
        assert!(is_invalid("a1 b2 c3 d4"));
    }

    #[test]
    fn test_guard_counts_to_threshold() {
        let mut guard = InvalidAnswerGuard::default();
        assert_eq!(guard.increment(), 1);
        assert_eq!(guard.increment(), 2);
        assert!(!guard.is_exhausted());
        guard.increment();
        assert!(guard.is_exhausted());
        guard.reset();
        assert_eq!(guard.attempts(), 0);
    }

    #[test]
    fn test_guard_threshold_minimum_is_one() {
        let mut guard = InvalidAnswerGuard::new(0);
        assert_eq!(guard.threshold(), 1);
        guard.set_threshold(0);
        assert_eq!(guard.threshold(), 1);
        guard.increment();
        assert!(guard.is_exhausted());
    }

    #[test]
    fn test_guard_restores_attempts() {
        let guard = InvalidAnswerGuard::with_attempts(3, 2);
        assert_eq!(guard.attempts(), 2);
        assert!(!guard.is_exhausted());
    }
}
