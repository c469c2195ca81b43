use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Desk number assumed when only a letter is configured
pub const DEFAULT_DESK_NUMBER: &str = "5.09";

lazy_static! {
    static ref LETTER_PATTERN: Regex = Regex::new(r"^[A-Da-d]$").unwrap();
    static ref NUMBER_PATTERN: Regex = Regex::new(r"^5\.\d{2}$").unwrap();
}

/// A preferred desk, e.g. `"5.09 D"`, used to pick a card in the "my spaces" widget.
///
/// The letter is the label printed first on the desk card; the number is the
/// desk identifier that appears somewhere in the card text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeskDescriptor {
    letter: Option<char>,
    number: String,
}

impl DeskDescriptor {
    /// Parse a desk specification.
    ///
    /// Accepts a letter (`A`-`D`), a number (`5.NN`), or both in any order,
    /// optionally preceded by the word `Desk`. Returns `None` for empty or
    /// malformed input.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut letter = None;
        let mut number = None;

        for token in spec.split_whitespace() {
            if token.eq_ignore_ascii_case("desk") {
                continue;
            }

            if LETTER_PATTERN.is_match(token) {
                if letter.is_some() {
                    return None;
                }
                letter = token.chars().next().map(|c| c.to_ascii_uppercase());
            } else if NUMBER_PATTERN.is_match(token) {
                if number.is_some() {
                    return None;
                }
                number = Some(token.to_string());
            } else {
                return None;
            }
        }

        match (letter, number) {
            (None, None) => None,
            (letter, Some(number)) => Some(Self { letter, number }),
            (Some(letter), None) => Some(Self {
                letter: Some(letter),
                number: DEFAULT_DESK_NUMBER.to_string(),
            }),
        }
    }

    pub fn letter(&self) -> Option<char> {
        self.letter
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    /// Check whether a desk card's visible text describes this desk.
    ///
    /// The card's first token must be the desk letter (when one is set) and
    /// the text must contain the desk number.
    pub fn matches_card(&self, card_text: &str) -> bool {
        if let Some(letter) = self.letter {
            let first = card_text.split_whitespace().next().unwrap_or("");
            let mut chars = first.chars();
            let is_letter = matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if c.eq_ignore_ascii_case(&letter)
            );
            if !is_letter {
                return false;
            }
        }

        card_text.contains(&self.number)
    }
}

impl fmt::Display for DeskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.letter {
            Some(letter) => write!(f, "{} {}", self.number, letter),
            None => write!(f, "{}", self.number),
        }
    }
}
