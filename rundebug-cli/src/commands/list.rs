//! List command - show every entry of the settings string.

use colored::Colorize;
use rundebug_core::entries;
use serde::Serialize;

use super::Context;
use crate::error::CliResult;

#[derive(Serialize)]
struct Entry<'a> {
    name: &'a str,
    value: &'a str,
}

pub fn run(ctx: &Context, json: bool) -> CliResult<()> {
    let snapshot = ctx.registry.snapshot();
    let listed: Vec<(&str, &str)> = entries(&snapshot).collect();

    if json {
        let listed: Vec<Entry<'_>> = listed
            .iter()
            .map(|&(name, value)| Entry { name, value })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    if listed.is_empty() {
        println!("  {} {} is empty", "○".yellow(), ctx.config.env_var.bold());
        return Ok(());
    }

    for (name, value) in listed {
        if name == ctx.registry.bisect_key() {
            println!("{}={}  {}", name.magenta(), value, "(bisect)".dimmed());
        } else {
            println!("{}={}", name.cyan(), value);
        }
    }
    Ok(())
}
