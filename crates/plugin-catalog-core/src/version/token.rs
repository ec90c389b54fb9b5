//! Version string tokenization
//!
//! Free-form version strings ("2023.1.2-EAP", "1.0-beta2") are split into
//! weighted tokens so they order the way the IDE platform orders them.

use std::cmp::Ordering;
use std::fmt;

/// Weight of a single letter from an unrecognised alphabetic run
pub const LETTER_WEIGHT: u32 = 90;

/// Weight of a numeric run
pub const NUMBER_WEIGHT: u32 = 100;

/// Qualifier words and their weights. Lower weight sorts earlier.
pub const QUALIFIERS: &[(&str, u32)] = &[
    ("snap", 10),
    ("snapshot", 10),
    ("m", 20),
    ("eap", 25),
    ("pre", 25),
    ("preview", 25),
    ("alpha", 30),
    ("a", 30),
    ("beta", 40),
    ("betta", 40),
    ("b", 40),
    ("rc", 50),
    ("sp", 70),
    ("rel", 80),
    ("release", 80),
    ("r", 80),
    ("final", 80),
];

/// Look up the weight of a (lower-cased) qualifier word
pub fn qualifier_weight(word: &str) -> Option<u32> {
    QUALIFIERS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, weight)| *weight)
}

/// Non-negative integer of any width, kept as its decimal digits
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ordinal(String);

impl Ordinal {
    /// From a run of ASCII digits. Leading zeros are dropped.
    pub fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0".to_string())
        } else {
            Self(trimmed.to_string())
        }
    }
}

impl From<u64> for Ordinal {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Ord for Ordinal {
    // Canonical digit strings: more digits means a larger value.
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Ordinal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One comparable unit of a version string
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionToken {
    pub weight: u32,
    pub ordinal: Ordinal,
}

impl VersionToken {
    pub fn new(weight: u32, ordinal: impl Into<Ordinal>) -> Self {
        Self {
            weight,
            ordinal: ordinal.into(),
        }
    }
}

/// Canonical comparable form of a version string.
///
/// Ordering is lexicographic over `(weight, ordinal)`; when one sequence is
/// a prefix of the other, the shorter one sorts first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenSequence(Vec<VersionToken>);

impl TokenSequence {
    pub fn tokens(&self) -> &[VersionToken] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<VersionToken>> for TokenSequence {
    fn from(tokens: Vec<VersionToken>) -> Self {
        Self(tokens)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Digit,
    Letter,
    Other,
}

fn classify(c: char) -> CharClass {
    if c.is_ascii_digit() {
        CharClass::Digit
    } else if c.is_alphabetic() {
        CharClass::Letter
    } else {
        CharClass::Other
    }
}

/// Split into maximal digit/letter runs, lower-cased. Other characters only
/// act as boundaries.
fn split_chunks(raw: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut block = String::new();
    let mut prev = None;

    for c in raw.chars() {
        let class = classify(c);

        if prev != Some(class) && !block.is_empty() {
            chunks.push(std::mem::take(&mut block).to_lowercase());
        }

        if class != CharClass::Other {
            block.push(c);
        }

        prev = Some(class);
    }

    if !block.is_empty() {
        chunks.push(block.to_lowercase());
    }

    chunks
}

/// Tokenize a version string. Never fails: unrecognised characters are dropped.
pub fn tokenize(raw: &str) -> TokenSequence {
    let mut tokens = Vec::new();

    for chunk in split_chunks(raw) {
        if let Some(weight) = qualifier_weight(&chunk) {
            tokens.push(VersionToken::new(weight, 0));
        } else if chunk.chars().all(char::is_alphabetic) {
            tokens.extend(chunk.chars().map(|c| {
                let ordinal = u64::from(c as u32).saturating_sub(96);
                VersionToken::new(LETTER_WEIGHT, ordinal)
            }));
        } else if chunk.chars().all(|c| c.is_ascii_digit()) {
            let ordinal = Ordinal::from_digits(&chunk);
            tokens.push(VersionToken::new(NUMBER_WEIGHT, ordinal));
        }
    }

    TokenSequence(tokens)
}

/// Return whichever version is newer.
///
/// `a` missing or equal to `b` yields `b`; `b` missing yields `a`. On equal
/// token sequences `b` wins.
pub fn pick_newest<'a>(a: Option<&'a str>, b: Option<&'a str>) -> Option<&'a str> {
    let a = match a {
        None => return b,
        Some(a) if Some(a) == b => return b,
        Some(a) => a,
    };
    let Some(b) = b else {
        return Some(a);
    };

    if tokenize(a) <= tokenize(b) {
        Some(b)
    } else {
        Some(a)
    }
}
