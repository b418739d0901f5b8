//! Logging for the rundebug crates
//!
//! A small stderr logger controlled by environment variables. The settings
//! crates log registration, export and bisect decisions through these macros;
//! they never log the contents of a malformed settings string.
//!
//! # Usage
//!
//! ```rust
//! use rundebug_log::{debug, info, trace};
//!
//! debug!("registered setting {}", "http2client");
//! info!(target: "rundebug::registry", "exported {} counters", 3);
//! trace!("lookup miss");
//! ```
//!
//! # Environment Variables
//!
//! - `RUNDEBUG_LOG_DEBUG=1` - Shorthand for `RUNDEBUG_LOG_LEVEL=debug`
//! - `RUNDEBUG_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `RUNDEBUG_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `RUNDEBUG_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `RUNDEBUG_LOG_COLOR=1|0` - Enable/disable colors (`color` feature)
//!
//! The environment is read the first time anything asks for the level, so
//! library users get the configured output without calling [`init`].

use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// Nothing is logged at or above this level.
    Off = 5,
}

const LEVELS: [Level; 6] = [
    Level::Trace,
    Level::Debug,
    Level::Info,
    Level::Warn,
    Level::Error,
    Level::Off,
];

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(raw: u8) -> Self {
        LEVELS.get(raw as usize).copied().unwrap_or(Level::Off)
    }

    #[cfg(feature = "color")]
    fn paint(self, text: &str) -> String {
        use colored::Colorize;
        match self {
            Level::Trace => text.magenta().to_string(),
            Level::Debug => text.blue().to_string(),
            Level::Info => text.green().to_string(),
            Level::Warn => text.yellow().to_string(),
            Level::Error => text.red().bold().to_string(),
            Level::Off => text.to_string(),
        }
    }

    #[cfg(not(feature = "color"))]
    fn paint(self, text: &str) -> String {
        text.to_string()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// An unrecognized level or format name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized log option {:?}", self.0)
    }
}

impl std::error::Error for ParseError {}

impl FromStr for Level {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "off" | "none" => Ok(Level::Off),
            _ => Err(ParseError(s.to_string())),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `2024-01-01 12:00:00.000 DEBUG [target] message`
    Pretty,
    /// `12:00:00 D target: message`
    Compact,
    /// One JSON object per line
    Json,
}

impl FromStr for Format {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Format::Pretty),
            "compact" => Ok(Format::Compact),
            "json" => Ok(Format::Json),
            _ => Err(ParseError(s.to_string())),
        }
    }
}

/// Logging configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Warn,
            format: Format::Compact,
            color: false,
            timestamps: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl LogConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug_default = if env_flag("RUNDEBUG_LOG_DEBUG").unwrap_or(false) {
            Level::Debug
        } else {
            defaults.level
        };

        Self {
            level: env_parse("RUNDEBUG_LOG_LEVEL").unwrap_or(debug_default),
            format: env_parse("RUNDEBUG_LOG_FORMAT").unwrap_or(defaults.format),
            color: env_flag("RUNDEBUG_LOG_COLOR")
                .unwrap_or_else(|| env::var_os("NO_COLOR").is_none() && env::var_os("TERM").is_some()),
            timestamps: env_flag("RUNDEBUG_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
        }
    }

    /// Render one log line, without the trailing newline.
    pub fn render(&self, color: bool, level: Level, target: &str, message: &str) -> String {
        let tag = |text: &str| {
            if color {
                level.paint(text)
            } else {
                text.to_string()
            }
        };

        match self.format {
            Format::Json => render_json(level, target, message),
            Format::Pretty => {
                let mut line = String::new();
                if self.timestamps {
                    line.push_str(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
                }
                line.push_str(&tag(&format!("{:5}", level)));
                if !target.is_empty() {
                    line.push_str(&format!(" [{}]", target));
                }
                line.push(' ');
                line.push_str(message);
                line
            }
            Format::Compact => {
                let mut line = String::new();
                if self.timestamps {
                    line.push_str(&chrono::Local::now().format("%H:%M:%S ").to_string());
                }
                line.push_str(&tag(&level.as_str()[..1]));
                if !target.is_empty() {
                    line.push_str(&format!(" {}:", target));
                }
                line.push(' ');
                line.push_str(message);
                line
            }
        }
    }
}

#[cfg(feature = "json")]
fn render_json(level: Level, target: &str, message: &str) -> String {
    serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "level": level.as_str(),
        "target": target,
        "message": message,
    })
    .to_string()
}

#[cfg(not(feature = "json"))]
fn render_json(level: Level, target: &str, message: &str) -> String {
    format!("{} {}: {}", level.as_str(), target, message)
}

static LEVEL: AtomicU8 = AtomicU8::new(Level::Warn as u8);
static COLOR: AtomicBool = AtomicBool::new(false);

static CONFIG: Lazy<LogConfig> = Lazy::new(|| {
    let config = LogConfig::from_env();
    LEVEL.store(config.level as u8, Ordering::SeqCst);
    COLOR.store(config.color, Ordering::SeqCst);
    config
});

/// Read the environment now rather than on first use.
pub fn init() {
    Lazy::force(&CONFIG);
}

/// The configuration read from the environment.
pub fn config() -> &'static LogConfig {
    &CONFIG
}

#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    init();
    level != Level::Off && level as u8 >= LEVEL.load(Ordering::Relaxed)
}

#[inline]
pub fn is_debug_enabled() -> bool {
    is_level_enabled(Level::Debug)
}

pub fn current_level() -> Level {
    init();
    Level::from_u8(LEVEL.load(Ordering::Relaxed))
}

/// Override the level for the rest of the process.
pub fn set_level(level: Level) {
    init();
    LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Turn debug output on, or back off to the configured level (at least `Info`).
pub fn set_debug(enabled: bool) {
    if enabled {
        if current_level() > Level::Debug {
            set_level(Level::Debug);
        }
    } else if current_level() <= Level::Debug {
        set_level(config().level.max(Level::Info));
    }
}

pub fn set_color(enabled: bool) {
    init();
    COLOR.store(enabled, Ordering::SeqCst);
}

pub fn color_enabled() -> bool {
    init();
    COLOR.load(Ordering::Relaxed)
}

#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    if !is_level_enabled(level) {
        return;
    }
    let line = config().render(color_enabled(), level, target, message);
    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::is_level_enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::__log!($level, target: module_path!(), $($arg)+)
    };
}

/// Log at trace level.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Trace, $($arg)+) };
}

/// Log at debug level.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Debug, $($arg)+) };
}

/// Log at info level.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Error, $($arg)+) };
}
