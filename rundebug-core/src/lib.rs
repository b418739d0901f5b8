//! Runtime debug settings
//!
//! Flat string settings read from a single comma-separated settings string
//! (by default the `RUNDEBUG` environment variable), with per-setting
//! non-default counters and a bisect protocol for locating the check that
//! causes a behavior change.
//!
//! # Features
//!
//! - **Lookup** - `key=value` entries, first match wins, exact keys only
//! - **Counters** - atomic non-default use counters exported to a metrics sink
//! - **Bisect** - force individual call sites on or off from the settings string
//!
//! # Quick Start
//!
//! ```
//! use rundebug_core::*;
//! use rundebug_config::StaticSource;
//! use std::sync::Arc;
//!
//! let source = Arc::new(StaticSource::new("http2client=0,after=x"));
//! let registry = Registry::new(source);
//!
//! let http2 = registry.register("http2client").unwrap();
//! if http2.value() == "0" {
//!     // Honor the non-default behavior and record it.
//!     http2.inc_non_default();
//! }
//!
//! let samples = registry.samples();
//! assert_eq!(samples[0].name, "/rundebug/non-default-behavior/http2client:events");
//! assert_eq!(samples[0].value, 1);
//! ```
//!
//! # Bisect
//!
//! ```
//! use rundebug_core::*;
//! use rundebug_config::StaticSource;
//! use std::sync::Arc;
//!
//! let source = Arc::new(StaticSource::new("bisect=buggy:+3+4"));
//! let buggy = Setting::new("#buggy", source).unwrap();
//!
//! let forced: Vec<u64> = (1..=10)
//!     .filter(|&n| buggy.check_at(&CallSite::ordinal(n), |v| v == "1"))
//!     .collect();
//! assert_eq!(forced, vec![3, 4]);
//! ```

pub mod bisect;
pub mod error;
pub mod parse;
pub mod registry;
pub mod setting;
pub mod sink;

pub use bisect::{CallSite, Directive, Outcome, Rule, should_force};
pub use error::{BisectError, FlagError, Result};
pub use parse::{entries, lookup};
pub use registry::Registry;
pub use setting::Setting;
pub use sink::{MetricsSink, Sample};
