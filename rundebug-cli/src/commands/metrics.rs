//! Metrics command - export the non-default counters.

use rundebug_metrics::{NonDefaultCollector, Snapshot, export_metrics_from_registry, prometheus};

use super::Context;
use crate::error::CliResult;

/// Export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
    Prometheus,
}

pub fn render(ctx: &Context, register: &[String], format: Format) -> CliResult<String> {
    for name in register {
        ctx.registry.register(name.as_str())?;
    }

    Ok(match format {
        Format::Text => Snapshot::capture(&ctx.registry).to_string(),
        Format::Json => Snapshot::capture(&ctx.registry).to_json()? + "\n",
        Format::Prometheus => {
            let registry = prometheus::Registry::new();
            NonDefaultCollector::new(ctx.registry.clone())?.register_with(&registry)?;
            export_metrics_from_registry(&registry)
        }
    })
}

pub fn run(ctx: &Context, register: &[String], format: Format) -> CliResult<()> {
    print!("{}", render(ctx, register, format)?);
    Ok(())
}
