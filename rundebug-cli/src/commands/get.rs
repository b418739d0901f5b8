//! Get command - print the current value of settings.

use colored::Colorize;
use serde::Serialize;

use super::Context;
use crate::error::CliResult;

/// How values are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Pairs,
    Raw,
    Json,
}

impl Output {
    pub fn new(raw: bool, json: bool) -> Self {
        if json {
            Output::Json
        } else if raw {
            Output::Raw
        } else {
            Output::Pairs
        }
    }
}

#[derive(Serialize)]
struct Entry<'a> {
    name: &'a str,
    value: String,
    internal: bool,
}

pub fn run(ctx: &Context, names: &[String], output: Output) -> CliResult<()> {
    let settings = names
        .iter()
        .map(|name| ctx.registry.register(name.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    match output {
        Output::Json => {
            let entries: Vec<Entry<'_>> = settings
                .iter()
                .map(|s| Entry {
                    name: s.name(),
                    value: s.value(),
                    internal: s.is_internal(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Output::Raw => {
            for s in &settings {
                println!("{}", s.value());
            }
        }
        Output::Pairs => {
            for s in &settings {
                let value = s.value();
                if value.is_empty() {
                    println!("{}={}", s.name().cyan(), "(unset)".dimmed());
                } else {
                    println!("{}={}", s.name().cyan(), value);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_selection() {
        assert_eq!(Output::new(false, false), Output::Pairs);
        assert_eq!(Output::new(true, false), Output::Raw);
        assert_eq!(Output::new(false, true), Output::Json);
    }
}
