//! Check command - parse a bisect pattern and show the sites it selects.
//!
//! Evaluates ordinal sites `1..=n` and any labelled sites, exactly as a
//! running program would see them.

use colored::Colorize;
use rundebug_core::{CallSite, Directive, Outcome, Rule};

use crate::error::{CliError, CliResult};

/// Check command options.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub pattern: String,
    pub inline: bool,
    pub setting: Option<String>,
    pub sites: u64,
    pub labels: Vec<String>,
}

/// Outcome for every evaluated site, in evaluation order.
pub fn evaluate(options: &CheckOptions) -> CliResult<Vec<(CallSite, Outcome, bool)>> {
    let sites = (1..=options.sites)
        .map(CallSite::ordinal)
        .chain(options.labels.iter().cloned().map(CallSite::named));

    if options.inline {
        let rule = Rule::parse(&options.pattern)?;
        return Ok(sites
            .map(|site| {
                let outcome = if rule.matches(&site) {
                    Outcome::ForceTrue
                } else {
                    Outcome::NoOpinion
                };
                let report = rule.should_report(&site);
                (site, outcome, report)
            })
            .collect());
    }

    let directive = Directive::parse(&options.pattern)?;
    let setting = options
        .setting
        .clone()
        .unwrap_or_else(|| directive.setting().to_string());
    Ok(sites
        .map(|site| {
            let outcome = directive.decide(&setting, &site);
            let report = directive.should_report(&setting, &site);
            (site, outcome, report)
        })
        .collect())
}

pub fn run(options: &CheckOptions) -> CliResult<()> {
    if options.sites == 0 && options.labels.is_empty() {
        return Err(CliError::InvalidPattern(
            "no sites to evaluate".to_string(),
        ));
    }

    let results = evaluate(options)?;
    let forced = results.iter().filter(|(_, o, _)| o.is_forced()).count();

    for (site, outcome, report) in &results {
        let status = match outcome {
            Outcome::ForceTrue => "force on ".green().bold(),
            Outcome::ForceFalse => "force off".red().bold(),
            Outcome::NoOpinion => "-        ".dimmed(),
        };
        if *report {
            println!("  {}  {}", status, site);
        } else {
            println!("  {}  {}", status, site.label());
        }
    }

    println!();
    println!(
        "  {} {} of {} sites forced",
        "✓".green(),
        forced,
        results.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pattern: &str) -> CheckOptions {
        CheckOptions {
            pattern: pattern.to_string(),
            inline: false,
            setting: None,
            sites: 10,
            labels: Vec::new(),
        }
    }

    fn forced(options: &CheckOptions) -> Vec<String> {
        evaluate(options)
            .unwrap()
            .into_iter()
            .filter(|(_, o, _)| o.is_forced())
            .map(|(site, _, _)| site.label().to_string())
            .collect()
    }

    #[test]
    fn test_directive_sites() {
        assert_eq!(forced(&options("buggy:+3+4")), vec!["#3", "#4"]);
    }

    #[test]
    fn test_other_setting_forces_nothing() {
        let mut opts = options("buggy:y");
        opts.setting = Some("other".to_string());
        assert!(forced(&opts).is_empty());
    }

    #[test]
    fn test_inline_rule_and_labels() {
        let mut opts = options("@bug");
        opts.inline = true;
        opts.sites = 2;
        opts.labels = vec!["main.rs:10 bug".to_string(), "main.rs:11".to_string()];
        assert_eq!(forced(&opts), vec!["main.rs:10 bug"]);
    }

    #[test]
    fn test_negated_directive_forces_off() {
        let results = evaluate(&options("!buggy:5")).unwrap();
        assert_eq!(results[4].1, Outcome::ForceFalse);
        assert!(results[4].2);
        assert_eq!(results[0].1, Outcome::NoOpinion);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            evaluate(&options("buggy")),
            Err(CliError::InvalidPattern(_))
        ));
    }
}
