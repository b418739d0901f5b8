//! Settings-string lookup.
//!
//! A settings string is a comma-separated list of `key=value` tokens. Empty
//! tokens are skipped, a token without `=` is a key with an empty value, and
//! when a key repeats the first occurrence wins.

use std::collections::HashSet;

/// Find the value of `name` in `settings`.
///
/// Returns `None` when no token has exactly `name` as its key. Only the text
/// before the first `=` is compared, so `foo` never matches `foodecoy=x`.
///
/// # Examples
///
/// ```
/// use rundebug_core::lookup;
///
/// assert_eq!(lookup("foodecoy=wrong,foo=bar", "foo"), Some("bar"));
/// assert_eq!(lookup(",,,foo=bar,,,", "foo"), Some("bar"));
/// assert_eq!(lookup("foo", "foo"), Some(""));
/// assert_eq!(lookup("", "foo"), None);
/// ```
pub fn lookup<'a>(settings: &'a str, name: &str) -> Option<&'a str> {
    tokens(settings).find_map(|(key, value)| (key == name).then_some(value))
}

/// Every `(key, value)` pair in order, keeping only the first occurrence of
/// each key.
pub fn entries(settings: &str) -> impl Iterator<Item = (&str, &str)> {
    let mut seen = HashSet::new();
    tokens(settings).filter(move |(key, _)| seen.insert(*key))
}

fn tokens(settings: &str) -> impl Iterator<Item = (&str, &str)> {
    settings
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| token.split_once('=').unwrap_or((token, "")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_table() {
        let long = "loooooooong".repeat(64);
        let cases: &[(&str, &str, Option<&str>)] = &[
            ("", "", None),
            ("", "foo", None),
            ("foo=bar", "foo", Some("bar")),
            ("foo=bar,after=x", "foo", Some("bar")),
            ("before=x,foo=bar,after=x", "foo", Some("bar")),
            ("before=x,foo=bar", "foo", Some("bar")),
            (",,,foo=bar,,,", "foo", Some("bar")),
            ("foodecoy=wrong,foo=bar", "foo", Some("bar")),
            ("foo=", "foo", Some("")),
            ("foo", "foo", Some("")),
            (",foo", "foo", Some("")),
            ("foo=bar,baz", "loooooooong", None),
            ("foo=bar,baz", long.as_str(), None),
        ];

        for (settings, name, want) in cases {
            assert_eq!(
                lookup(settings, name),
                *want,
                "lookup({:?}, {:?})",
                settings,
                name
            );
        }
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(lookup("foo=1,foo=2", "foo"), Some("1"));
        assert_eq!(lookup("foo,foo=2", "foo"), Some(""));
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        assert_eq!(lookup("foo=a=b", "foo"), Some("a=b"));
        assert_eq!(lookup("foo=1#+3+4", "foo"), Some("1#+3+4"));
    }

    #[test]
    fn test_prefix_of_name_does_not_match() {
        assert_eq!(lookup("fo=x", "foo"), None);
        assert_eq!(lookup("foo=x", "fo"), None);
    }

    #[test]
    fn test_entries_deduplicates() {
        let got: Vec<_> = entries(",a=1,b,,a=2,c=3,b=4").collect();
        assert_eq!(got, vec![("a", "1"), ("b", ""), ("c", "3")]);
    }

    #[test]
    fn test_entries_empty() {
        assert_eq!(entries("").count(), 0);
        assert_eq!(entries(",,,").count(), 0);
    }
}
