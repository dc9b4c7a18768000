//! Episode selector parsing and resolution.
//!
//! A selector is a comma separated list of tokens:
//!
//! - `all` (or an empty selector): every thread
//! - `N`: threads containing episode `N`
//! - `A..B`: the run of threads between the ones containing `max(A, B)` and
//!   `min(A, B)`, using two or more dots as the separator
//!
//! Tokens are unioned in order of appearance; a thread appears at most once.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

use super::thread::Thread;

static RANGE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}").expect("range separator pattern is valid"));

/// Errors from parsing or resolving a selector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectorError {
    #[error("Invalid selector token: '{0}'")]
    InvalidToken(String),

    #[error("No thread contains range boundary episode {episode}")]
    BoundaryNotFound { episode: f64 },
}

/// A single parsed selector token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectorToken {
    All,
    Episode(f64),
    Range { lo: f64, hi: f64 },
}

/// A parsed selector, reusable against any thread list.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSelector {
    tokens: Vec<SelectorToken>,
}

impl EpisodeSelector {
    /// Selector matching every thread.
    pub fn all() -> Self {
        Self {
            tokens: vec![SelectorToken::All],
        }
    }

    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }

        let tokens = input
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(parse_token)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tokens })
    }

    pub fn tokens(&self) -> &[SelectorToken] {
        &self.tokens
    }

    /// Whether the selector is just `all`.
    pub fn is_all(&self) -> bool {
        self.tokens == [SelectorToken::All]
    }

    /// Resolve against `threads`, which must be sorted newest first.
    pub fn resolve<'a>(&self, threads: &'a [Thread]) -> Result<Vec<&'a Thread>, SelectorError> {
        if self.is_all() {
            return Ok(threads.iter().collect());
        }

        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        let mut push = |thread: &'a Thread| {
            if seen.insert(thread.id()) {
                selected.push(thread);
            }
        };

        for token in &self.tokens {
            match *token {
                SelectorToken::All => threads.iter().for_each(&mut push),
                SelectorToken::Episode(episode) => threads
                    .iter()
                    .filter(|thread| thread.contains_episode(episode))
                    .for_each(&mut push),
                SelectorToken::Range { lo, hi } => {
                    let head = find_boundary(threads, hi)?;
                    let tail = find_boundary(threads, lo)?;
                    let (start, end) = (head.min(tail), head.max(tail));
                    threads[start..=end].iter().for_each(&mut push);
                }
            }
        }

        Ok(selected)
    }
}

impl FromStr for EpisodeSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Default for EpisodeSelector {
    fn default() -> Self {
        Self::all()
    }
}

fn parse_token(token: &str) -> Result<SelectorToken, SelectorError> {
    if token.eq_ignore_ascii_case("all") {
        return Ok(SelectorToken::All);
    }

    let bounds: Vec<&str> = RANGE_SEPARATOR.split(token).collect();
    match bounds.as_slice() {
        [single] => Ok(SelectorToken::Episode(parse_number(single, token)?)),
        [a, b] => {
            let a = parse_number(a, token)?;
            let b = parse_number(b, token)?;
            Ok(SelectorToken::Range {
                lo: a.min(b),
                hi: a.max(b),
            })
        }
        _ => Err(SelectorError::InvalidToken(token.to_string())),
    }
}

fn parse_number(raw: &str, token: &str) -> Result<f64, SelectorError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| SelectorError::InvalidToken(token.to_string()))
}

fn find_boundary(threads: &[Thread], episode: f64) -> Result<usize, SelectorError> {
    threads
        .iter()
        .position(|thread| thread.contains_episode(episode))
        .ok_or(SelectorError::BoundaryNotFound { episode })
}
