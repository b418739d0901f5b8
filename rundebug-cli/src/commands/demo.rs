//! Demo command - a tiny program with a buggy internal setting.
//!
//! Each iteration consults `#buggy` at four lines. Two of them (labelled
//! `bug`) misbehave when the setting reads `1`. Running this under a bisect
//! driver with `bisect=buggy:...` patterns narrows the failure down to those
//! lines; matched sites are announced on stdout with their markers.

use colored::Colorize;
use rundebug_core::{CallSite, Setting};
use std::collections::HashSet;
use std::panic::Location;

use super::Context;
use crate::error::{CliError, CliResult};

/// Name of the demo setting. Internal, so it never shows up in metrics.
pub const SETTING: &str = "#buggy";

struct Program<'a> {
    buggy: &'a Setting,
    reported: HashSet<u64>,
    failures: Vec<String>,
    quiet: bool,
}

impl Program<'_> {
    /// Consult the setting at the calling line.
    #[track_caller]
    fn check(&mut self, bug: bool) {
        let location = Location::caller();
        let label = if bug {
            format!("{}:{} bug", location.file(), location.line())
        } else {
            format!("{}:{}", location.file(), location.line())
        };
        let site = CallSite::named(label);

        if self.buggy.should_report(&site) && self.reported.insert(site.id()) {
            println!("{}", site);
        }

        if self.buggy.check_at(&site, |v| v == "1") {
            self.buggy.inc_non_default();
            if bug && !self.failures.iter().any(|f| f == site.label()) {
                if !self.quiet {
                    eprintln!("  {} misbehaved at {}", "✗".red(), site.label());
                }
                self.failures.push(site.label().to_string());
            }
        }
    }
}

pub fn run(ctx: &Context, iterations: u32, quiet: bool) -> CliResult<()> {
    let buggy = ctx.registry.register(SETTING)?;
    let mut program = Program {
        buggy: &buggy,
        reported: HashSet::new(),
        failures: Vec::new(),
        quiet,
    };

    for _ in 0..iterations {
        program.check(false);
        program.check(false);
        program.check(true);
        program.check(true);
    }

    if program.failures.is_empty() {
        if !quiet {
            println!(
                "  {} {} iterations completed ({} non-default uses)",
                "✓".green(),
                iterations,
                buggy.non_default_count()
            );
        }
        Ok(())
    } else {
        Err(CliError::Bug(program.failures.join(", ")))
    }
}
