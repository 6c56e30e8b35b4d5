//! Bag-of-words category counts against a sentiment lexicon
//!
//! The lexicon is an ordinary value: build it (or load it from JSON) and hand
//! it to [`LexiconVectorizer::new`]. Category order follows the source.

use crate::error::Result;
use regex::Regex;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

const MIN_TOKEN_CHARS: usize = 2;
const MAX_TOKEN_CHARS: usize = 15;

static ALPHABETIC: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct Category {
    name: String,
    words: HashSet<String>,
}

/// Ordered word categories (e.g. Negative, Positive, Uncertainty, ...).
/// Words are stored lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    categories: Vec<Category>,
}

impl Lexicon {
    pub fn new<I, N, W, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = (N, W)>,
        N: Into<String>,
        W: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lexicon = Lexicon::default();
        for (name, words) in categories {
            lexicon.set_category(name.into(), words.into_iter().map(|w| w.as_ref().to_lowercase()).collect());
        }
        lexicon
    }

    /// Parse `{"Category": ["word", ...], ...}`
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    // A repeated category replaces the earlier word list in place
    fn set_category(&mut self, name: String, words: HashSet<String>) {
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.words = words,
            None => self.categories.push(Category { name, words }),
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn contains(&self, category: &str, word: &str) -> bool {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .is_some_and(|c| c.words.contains(word))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl<'de> Deserialize<'de> for Lexicon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LexiconVisitor;

        impl<'de> Visitor<'de> for LexiconVisitor {
            type Value = Lexicon;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category names to word lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Lexicon, A::Error> {
                let mut lexicon = Lexicon::default();
                while let Some((name, words)) = map.next_entry::<String, Vec<String>>()? {
                    lexicon.set_category(name, words.iter().map(|w| w.to_lowercase()).collect());
                }
                Ok(lexicon)
            }
        }

        deserializer.deserialize_map(LexiconVisitor)
    }
}

/// Options for [`LexiconVectorizer::vectorize`]
#[derive(Debug, Clone, Copy)]
pub struct VectorizeOptions {
    /// Lowercase and tokenize the text; otherwise split on whitespace only
    pub preprocess: bool,
    /// Divide each count by the number of tokens
    pub normalize: bool,
}

impl Default for VectorizeOptions {
    fn default() -> Self {
        Self {
            preprocess: true,
            normalize: false,
        }
    }
}

/// Per-category values, in lexicon order
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CategoryCounts {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

impl CategoryCounts {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .position(|c| c == category)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.categories
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Counts how many tokens of a document fall into each lexicon category
#[derive(Debug, Clone)]
pub struct LexiconVectorizer {
    lexicon: Lexicon,
}

impl LexiconVectorizer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn vectorize(&self, document: &str, options: VectorizeOptions) -> CategoryCounts {
        let tokens: Vec<String> = if options.preprocess {
            tokenize(document)
        } else {
            document.split_whitespace().map(str::to_string).collect()
        };
        self.vectorize_tokens(&tokens, options.normalize)
    }

    /// Count pre-tokenized input. An empty token list normalizes to zeros.
    pub fn vectorize_tokens<S: AsRef<str>>(&self, tokens: &[S], normalize: bool) -> CategoryCounts {
        let categories: Vec<String> = self.lexicon.categories().map(str::to_string).collect();

        let values = self
            .lexicon
            .categories
            .iter()
            .map(|category| {
                let hits = tokens
                    .iter()
                    .filter(|t| {
                        let token: &str = t.as_ref();
                        category.words.contains(token)
                    })
                    .count() as f64;
                if normalize && !tokens.is_empty() {
                    hits / tokens.len() as f64
                } else {
                    hits
                }
            })
            .collect();

        CategoryCounts { categories, values }
    }
}

/// Lowercase alphabetic tokens of 2 to 15 characters, skipping ones that
/// start with an underscore
pub fn tokenize(text: &str) -> Vec<String> {
    let re = ALPHABETIC.get_or_init(|| Regex::new(r"[^\W\d]+").expect("valid token pattern"));
    let lower = text.to_lowercase();

    re.find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|t| {
            let n = t.chars().count();
            (MIN_TOKEN_CHARS..=MAX_TOKEN_CHARS).contains(&n) && !t.starts_with('_')
        })
        .map(str::to_string)
        .collect()
}
