//! Bisect matching.
//!
//! An external driver runs the program many times, each time with a
//! different pattern, and watches for the failure. Every instrumented check
//! asks the matcher whether its outcome should be forced. The matcher is a
//! pure function of `(pattern, setting, call site)`, so a given run is
//! reproducible.
//!
//! # Pattern syntax
//!
//! The reserved `bisect` key carries a directive:
//!
//! ```text
//! directive := [ '!' ] setting ':' rule
//! rule      := [ 'q' ] [ 'v' ] body
//! body      := 'y' | 'n' | term+
//! term      := [ '+' | '-' ] selector
//! selector  := N | N '..' M | 'x' HEX | 'b' BIN | '@' TEXT | 'y'
//! ```
//!
//! `N` and `N..M` select ordinal sites, `xHEX` and `bBIN` select sites whose
//! hash ends in the given bits, `@TEXT` selects sites whose label contains
//! `TEXT`. Terms are read right to left and the first one that matches
//! decides. A body starting with `-` subtracts from the set of all sites.
//!
//! Selected sites are forced to `true`, or to `false` when the directive
//! starts with `!`. Everything else is left to the organic value.
//!
//! ```
//! use rundebug_core::{CallSite, Outcome, should_force};
//!
//! let pattern = "buggy:+3+4";
//! let forced: Vec<u64> = (1..=10)
//!     .filter(|&n| should_force(pattern, "buggy", &CallSite::ordinal(n)) == Outcome::ForceTrue)
//!     .collect();
//! assert_eq!(forced, vec![3, 4]);
//! ```

use crate::error::BisectError;
use rundebug_config::is_valid_key;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::str::FromStr;

/// What a bisect directive says about one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    ForceTrue,
    ForceFalse,
    NoOpinion,
}

impl Outcome {
    /// Combine with the value the check would have produced on its own.
    pub fn apply(self, organic: bool) -> bool {
        match self {
            Outcome::ForceTrue => true,
            Outcome::ForceFalse => false,
            Outcome::NoOpinion => organic,
        }
    }

    pub fn is_forced(self) -> bool {
        self != Outcome::NoOpinion
    }
}

/// Identity of one check in consuming code.
///
/// The id is derived from the label alone, so the same site gets the same id
/// in every run of the program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    id: u64,
    ordinal: Option<u64>,
    label: Cow<'static, str>,
}

impl CallSite {
    /// The `n`th check, counting from 1.
    pub fn ordinal(n: u64) -> Self {
        let mut site = Self::named(format!("#{}", n));
        site.ordinal = Some(n);
        site
    }

    /// A check identified by its source location.
    pub fn location(file: &str, line: u32) -> Self {
        Self::named(format!("{}:{}", file, line))
    }

    /// The location of the code calling this function.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::location(location.file(), location.line())
    }

    /// A check identified by an arbitrary label.
    pub fn named(label: impl Into<Cow<'static, str>>) -> Self {
        let label = label.into();
        Self {
            id: hash_label(&label),
            ordinal: None,
            label,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn ordinal_index(&self) -> Option<u64> {
        self.ordinal
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The line a bisect driver scans for, e.g. `[bisect-match 0x00ab...]`.
    pub fn marker(&self) -> String {
        format!("[bisect-match {:#018x}]", self.id)
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.marker(), self.label)
    }
}

fn hash_label(label: &str) -> u64 {
    let digest = Sha256::digest(label.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    All,
    Ordinal { start: u64, end: u64 },
    Suffix { mask: u64, bits: u64 },
    Label(String),
}

impl Selector {
    fn matches(&self, site: &CallSite) -> bool {
        match self {
            Selector::All => true,
            Selector::Ordinal { start, end } => site
                .ordinal
                .is_some_and(|n| (*start..=*end).contains(&n)),
            Selector::Suffix { mask, bits } => site.id & mask == *bits,
            Selector::Label(text) => site.label.contains(text.as_str()),
        }
    }

    fn parse(term: &str) -> Result<Self, BisectError> {
        let invalid = || BisectError::InvalidTerm(term.to_string());

        if term == "y" {
            return Ok(Selector::All);
        }
        if let Some(text) = term.strip_prefix('@') {
            if text.is_empty() {
                return Err(invalid());
            }
            return Ok(Selector::Label(text.to_string()));
        }
        if let Some(hex) = term.strip_prefix('x') {
            return Self::suffix(term, hex, 16, 4);
        }
        if let Some(bin) = term.strip_prefix('b') {
            return Self::suffix(term, bin, 2, 1);
        }
        if term.starts_with(|c: char| c.is_ascii_digit()) {
            return Self::ordinal(term);
        }
        Err(invalid())
    }

    fn suffix(term: &str, digits: &str, radix: u32, width: u32) -> Result<Self, BisectError> {
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(BisectError::InvalidTerm(term.to_string()));
        }
        let bits_len = digits.len() as u32 * width;
        if bits_len > 64 {
            return Err(BisectError::SuffixTooLong(term.to_string()));
        }
        let bits = u64::from_str_radix(digits, radix)
            .map_err(|_| BisectError::InvalidTerm(term.to_string()))?;
        let mask = if bits_len == 64 {
            u64::MAX
        } else {
            (1u64 << bits_len) - 1
        };
        Ok(Selector::Suffix { mask, bits })
    }

    fn ordinal(term: &str) -> Result<Self, BisectError> {
        let range = || BisectError::InvalidRange(term.to_string());
        let number = |s: &str| -> Result<u64, BisectError> {
            if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
                return Err(BisectError::InvalidTerm(term.to_string()));
            }
            s.parse().map_err(|_| range())
        };

        let (start, end) = match term.split_once("..") {
            Some((start, end)) => (number(start)?, number(end)?),
            None => {
                let n = number(term)?;
                (n, n)
            }
        };
        if start == 0 || end < start {
            return Err(range());
        }
        Ok(Selector::Ordinal { start, end })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    select: bool,
    selector: Selector,
}

/// The site-selection part of a pattern.
///
/// Used on its own after `#` in an inline setting value (`buggy=1#+x3`), and
/// after `:` in a directive under the reserved key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    terms: Vec<Term>,
    verbose: bool,
    quiet: bool,
}

impl Rule {
    pub fn parse(pattern: &str) -> Result<Self, BisectError> {
        let mut rest = pattern;
        let mut quiet = false;
        let mut verbose = false;

        if let Some(r) = rest.strip_prefix('q') {
            quiet = true;
            rest = r;
        }
        while let Some(r) = rest.strip_prefix('v') {
            verbose = true;
            quiet = false;
            rest = r;
        }
        if rest.is_empty() {
            return Err(BisectError::Empty);
        }

        let terms = match rest {
            "y" => vec![Term {
                select: true,
                selector: Selector::All,
            }],
            "n" => Vec::new(),
            _ => Self::parse_terms(rest)?,
        };

        Ok(Self {
            terms,
            verbose,
            quiet,
        })
    }

    fn parse_terms(body: &str) -> Result<Vec<Term>, BisectError> {
        let mut terms = Vec::new();
        if body.starts_with('-') {
            terms.push(Term {
                select: true,
                selector: Selector::All,
            });
        }

        let mut rest = body;
        while !rest.is_empty() {
            let (select, after_sign) = match rest.as_bytes()[0] {
                b'+' => (true, &rest[1..]),
                b'-' => (false, &rest[1..]),
                _ if terms.is_empty() => (true, rest),
                _ => return Err(BisectError::InvalidTerm(rest.to_string())),
            };
            let end = after_sign.find(['+', '-']).unwrap_or(after_sign.len());
            let (term, tail) = after_sign.split_at(end);
            if term.is_empty() {
                return Err(BisectError::InvalidTerm(body.to_string()));
            }
            terms.push(Term {
                select,
                selector: Selector::parse(term)?,
            });
            rest = tail;
        }
        Ok(terms)
    }

    /// Whether the rule selects `site`.
    pub fn matches(&self, site: &CallSite) -> bool {
        self.terms
            .iter()
            .rev()
            .find(|term| term.selector.matches(site))
            .is_some_and(|term| term.select)
    }

    /// Whether a caller should print `site`'s marker.
    pub fn should_report(&self, site: &CallSite) -> bool {
        !self.quiet && (self.verbose || self.matches(site))
    }
}

impl FromStr for Rule {
    type Err = BisectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A parsed value of the reserved bisect key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    setting: String,
    force: bool,
    rule: Rule,
}

impl Directive {
    pub fn parse(pattern: &str) -> Result<Self, BisectError> {
        if pattern.is_empty() {
            return Err(BisectError::Empty);
        }
        let (force, rest) = match pattern.strip_prefix('!') {
            Some(rest) => (false, rest),
            None => (true, pattern),
        };
        let (setting, rule) = rest
            .split_once(':')
            .ok_or_else(|| BisectError::MissingSetting(pattern.to_string()))?;
        if setting.is_empty() || !is_valid_key(setting) {
            return Err(BisectError::MissingSetting(pattern.to_string()));
        }

        Ok(Self {
            setting: setting.to_string(),
            force,
            rule: Rule::parse(rule)?,
        })
    }

    /// Setting the directive targets.
    pub fn setting(&self) -> &str {
        &self.setting
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn decide(&self, setting: &str, site: &CallSite) -> Outcome {
        if setting != self.setting || !self.rule.matches(site) {
            return Outcome::NoOpinion;
        }
        if self.force {
            Outcome::ForceTrue
        } else {
            Outcome::ForceFalse
        }
    }

    pub fn should_report(&self, setting: &str, site: &CallSite) -> bool {
        setting == self.setting && self.rule.should_report(site)
    }
}

impl FromStr for Directive {
    type Err = BisectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Decide one check. Patterns that do not parse force nothing.
pub fn should_force(pattern: &str, setting: &str, site: &CallSite) -> Outcome {
    Directive::parse(pattern).map_or(Outcome::NoOpinion, |directive| {
        directive.decide(setting, site)
    })
}
