//! A single named setting.

use crate::bisect::{CallSite, Directive, Outcome, Rule, should_force};
use crate::error::{FlagError, Result};
use crate::parse::lookup;
use rundebug_config::{DEFAULT_BISECT_KEY, SettingsSource, is_valid_key, strip_internal};
use rundebug_log::trace;
use std::borrow::Borrow;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A named, string-valued runtime setting.
///
/// The value is looked up in a fresh snapshot of the settings source on every
/// read. The non-default counter is only ever advanced by the consumer, via
/// [`Setting::inc_non_default`], when it actually honors a non-default value.
pub struct Setting {
    full_name: String,
    internal: bool,
    bisect_key: String,
    non_default: AtomicU64,
    source: Arc<dyn SettingsSource>,
}

impl Setting {
    /// Create a setting read from `source`.
    ///
    /// A leading `#` marks the setting as internal: it is looked up without
    /// the `#` but never exported as a metric. Only an internal name may be
    /// empty.
    pub fn new(name: impl Into<String>, source: Arc<dyn SettingsSource>) -> Result<Self> {
        let full_name = name.into();
        let (key, internal) = strip_internal(&full_name);
        if !is_valid_key(key) || (key.is_empty() && !internal) {
            return Err(FlagError::InvalidName(full_name));
        }

        Ok(Self {
            internal,
            full_name,
            bisect_key: DEFAULT_BISECT_KEY.to_string(),
            non_default: AtomicU64::new(0),
            source,
        })
    }

    pub(crate) fn with_bisect_key(mut self, key: impl Into<String>) -> Self {
        self.bisect_key = key.into();
        self
    }

    /// The key looked up in the settings string.
    pub fn name(&self) -> &str {
        strip_internal(&self.full_name).0
    }

    /// The name as registered, including any `#` marker.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Current value, or `""` when unset.
    ///
    /// The calling line is the call site for inline bisect rules.
    #[track_caller]
    pub fn value(&self) -> String {
        let caller = Location::caller();
        let settings = self.source.snapshot();
        self.resolve(&settings, || CallSite::location(caller.file(), caller.line()))
            .to_string()
    }

    /// Current value as seen from `site`.
    ///
    /// For a value of the form `text#RULE`, sites selected by `RULE` see
    /// `text` and all others see the default `""`. A rule that does not parse
    /// is ignored and every site sees `text`.
    pub fn value_at(&self, site: &CallSite) -> String {
        let settings = self.source.snapshot();
        self.resolve(&settings, || site).to_string()
    }

    /// Evaluate a boolean check at the calling line.
    ///
    /// See [`Setting::check_at`].
    #[track_caller]
    pub fn check(&self, organic: impl FnOnce(&str) -> bool) -> bool {
        self.check_at(&CallSite::caller(), organic)
    }

    /// Evaluate `organic` on the value seen from `site`, then apply the
    /// directive under the bisect key, if any. Both come from one snapshot.
    pub fn check_at(&self, site: &CallSite, organic: impl FnOnce(&str) -> bool) -> bool {
        let settings = self.source.snapshot();
        let decided = organic(self.resolve(&settings, || site));
        let outcome = self.outcome_in(&settings, site);
        if outcome.is_forced() {
            trace!(
                target: "rundebug::bisect",
                "{} forced {:?} at {}",
                self.name(),
                outcome,
                site
            );
        }
        outcome.apply(decided)
    }

    /// The bisect decision for `site` under the current settings.
    pub fn outcome_at(&self, site: &CallSite) -> Outcome {
        let settings = self.source.snapshot();
        self.outcome_in(&settings, site)
    }

    /// Whether `site`'s marker should be printed for a bisect driver.
    ///
    /// Either the directive under the bisect key or an inline rule can ask
    /// for it. Patterns that do not parse report nothing.
    pub fn should_report(&self, site: &CallSite) -> bool {
        let settings = self.source.snapshot();
        let directive = lookup(&settings, &self.bisect_key)
            .and_then(|pattern| Directive::parse(pattern).ok())
            .is_some_and(|d| d.should_report(self.name(), site));
        let inline = self
            .raw(&settings)
            .split_once('#')
            .and_then(|(_, rule)| Rule::parse(rule).ok())
            .is_some_and(|rule| rule.should_report(site));
        directive || inline
    }

    /// Record one use of a non-default value.
    pub fn inc_non_default(&self) {
        self.non_default.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of recorded non-default uses.
    pub fn non_default_count(&self) -> u64 {
        self.non_default.load(Ordering::Relaxed)
    }

    fn raw<'a>(&self, settings: &'a str) -> &'a str {
        lookup(settings, self.name()).unwrap_or("")
    }

    /// The site is only built when the value carries an inline rule.
    fn resolve<'a, S: Borrow<CallSite>>(
        &self,
        settings: &'a str,
        site: impl FnOnce() -> S,
    ) -> &'a str {
        let raw = self.raw(settings);
        match raw.split_once('#') {
            Some((text, rule)) => match Rule::parse(rule) {
                Ok(rule) if !rule.matches(site().borrow()) => "",
                _ => text,
            },
            None => raw,
        }
    }

    fn outcome_in(&self, settings: &str, site: &CallSite) -> Outcome {
        lookup(settings, &self.bisect_key)
            .map_or(Outcome::NoOpinion, |pattern| should_force(pattern, self.name(), site))
    }
}

impl fmt::Debug for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("name", &self.full_name)
            .field("non_default", &self.non_default_count())
            .finish()
    }
}

/// `name=value`, with any inline bisect rule removed.
impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings = self.source.snapshot();
        let raw = self.raw(&settings);
        let text = raw.split_once('#').map_or(raw, |(text, _)| text);
        write!(f, "{}={}", self.name(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rundebug_config::StaticSource;

    fn setting(name: &str, settings: &str) -> (Setting, Arc<StaticSource>) {
        let source = Arc::new(StaticSource::new(settings));
        let setting = Setting::new(name, source.clone()).unwrap();
        (setting, source)
    }

    #[test]
    fn test_value_rereads_source() {
        let (foo, source) = setting("#foo", "foo=bar");
        assert_eq!(foo.value(), "bar");

        source.set("foo=baz");
        assert_eq!(foo.value(), "baz");

        source.clear();
        assert_eq!(foo.value(), "");
    }

    #[test]
    fn test_value_table() {
        let cases = [
            ("", "#", ""),
            ("", "#foo", ""),
            ("foo=bar", "#foo", "bar"),
            ("foo=bar,after=x", "#foo", "bar"),
            ("before=x,foo=bar,after=x", "#foo", "bar"),
            ("before=x,foo=bar", "#foo", "bar"),
            (",,,foo=bar,,,", "#foo", "bar"),
            ("foodecoy=wrong,foo=bar", "#foo", "bar"),
            ("foo=", "#foo", ""),
            ("foo", "#foo", ""),
            (",foo", "#foo", ""),
            ("foo=bar,baz", "#loooooooong", ""),
        ];

        for (settings, name, want) in cases {
            let (s, _) = setting(name, settings);
            assert_eq!(s.value(), want, "{:?} in {:?}", name, settings);
        }
    }

    #[test]
    fn test_names() {
        let (internal, _) = setting("#buggy", "");
        assert_eq!(internal.name(), "buggy");
        assert_eq!(internal.full_name(), "#buggy");
        assert!(internal.is_internal());

        let (public, _) = setting("http2client", "");
        assert_eq!(public.name(), "http2client");
        assert!(!public.is_internal());
    }

    #[test]
    fn test_invalid_names_rejected() {
        let source: Arc<dyn SettingsSource> = Arc::new(StaticSource::default());
        for name in ["a,b", "a=b", "a#b", "##a", ""] {
            assert!(matches!(
                Setting::new(name, source.clone()),
                Err(FlagError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn test_empty_internal_name_allowed() {
        let (s, _) = setting("#", "");
        assert_eq!(s.name(), "");
        assert!(s.is_internal());
    }

    #[test]
    fn test_counter() {
        let (s, _) = setting("http2client", "");
        assert_eq!(s.non_default_count(), 0);
        s.inc_non_default();
        s.inc_non_default();
        s.inc_non_default();
        assert_eq!(s.non_default_count(), 3);
    }

    #[test]
    fn test_value_does_not_count() {
        let (s, _) = setting("http2client", "http2client=0");
        assert_eq!(s.value(), "0");
        assert_eq!(s.non_default_count(), 0);
    }

    #[test]
    fn test_inline_rule_selects_sites() {
        let (s, _) = setting("#buggy", "buggy=1#+2+5");
        let seen: Vec<String> = (1..=6).map(|n| s.value_at(&CallSite::ordinal(n))).collect();
        assert_eq!(seen, vec!["", "1", "", "", "1", ""]);
    }

    #[test]
    fn test_inline_rule_matches_calling_file() {
        let (s, source) = setting("#buggy", "buggy=1#@setting.rs");
        assert_eq!(s.value(), "1");

        source.set("buggy=1#@elsewhere.rs");
        assert_eq!(s.value(), "");

        source.set("buggy=1");
        assert_eq!(s.value(), "1");
    }

    #[test]
    fn test_inline_rule_invalid_fails_open() {
        let (s, _) = setting("#buggy", "buggy=1#what");
        assert_eq!(s.value_at(&CallSite::ordinal(1)), "1");
        assert_eq!(s.value(), "1");
    }

    #[test]
    fn test_check_applies_directive() {
        let (s, source) = setting("#buggy", "bisect=buggy:3..4");
        let hits: Vec<u64> = (1..=10)
            .filter(|&n| s.check_at(&CallSite::ordinal(n), |v| v == "1"))
            .collect();
        assert_eq!(hits, vec![3, 4]);

        source.set("buggy=1,bisect=!buggy:3..4");
        let hits: Vec<u64> = (1..=10)
            .filter(|&n| s.check_at(&CallSite::ordinal(n), |v| v == "1"))
            .collect();
        assert_eq!(hits, vec![1, 2, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_check_ignores_directive_for_other_setting() {
        let (s, _) = setting("#buggy", "buggy=1,bisect=!other:y");
        assert!(s.check(|v| v == "1"));
        assert_eq!(s.outcome_at(&CallSite::ordinal(1)), Outcome::NoOpinion);
    }

    #[test]
    fn test_custom_bisect_key() {
        let source = Arc::new(StaticSource::new("godebug-bisect=buggy:y"));
        let s = Setting::new("buggy", source)
            .unwrap()
            .with_bisect_key("godebug-bisect");
        assert_eq!(s.outcome_at(&CallSite::ordinal(9)), Outcome::ForceTrue);
    }

    #[test]
    fn test_should_report() {
        let (s, source) = setting("#buggy", "bisect=buggy:+2");
        assert!(s.should_report(&CallSite::ordinal(2)));
        assert!(!s.should_report(&CallSite::ordinal(3)));

        source.set("bisect=buggy:v+2");
        assert!(s.should_report(&CallSite::ordinal(3)));

        source.set("bisect=buggy:q+2");
        assert!(!s.should_report(&CallSite::ordinal(2)));

        source.set("buggy=1#+4");
        assert!(s.should_report(&CallSite::ordinal(4)));
        assert!(!s.should_report(&CallSite::ordinal(2)));

        source.set("bisect=other:y,buggy=1#what");
        assert!(!s.should_report(&CallSite::ordinal(1)));
    }

    #[test]
    fn test_display_strips_rule() {
        let (s, _) = setting("#buggy", "buggy=1#+3");
        assert_eq!(s.to_string(), "buggy=1");
        assert!(format!("{:?}", s).contains("#buggy"));
    }
}
