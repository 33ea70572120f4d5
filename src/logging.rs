//! Runtime configuration of the diagnostics channel.
//!
//! Registry events are emitted through `tracing` at these levels:
//!
//! | level   | events                                           |
//! |---------|--------------------------------------------------|
//! | `error` | unknown handles, leaks at teardown, misuse       |
//! | `info`  | setup and teardown                               |
//! | `debug` | storage growth, each unfreed block at teardown   |
//! | `trace` | every allocate, resize and release               |

use std::io::{self, IsTerminal};

use tracing_subscriber::{
  EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
  util::TryInitError,
};

/// Selects the numeric debug level (0..=3).
pub const DEBUG_VAR: &str = "RBLOCKS_DEBUG";
/// An `EnvFilter` directive; takes precedence over [`DEBUG_VAR`].
pub const FILTER_VAR: &str = "RBLOCKS_LOG";

/// How much of the registry's activity to report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
  #[default]
  Error,
  Info,
  Debug,
  /// Every allocator call.
  System,
}

impl Verbosity {
  pub fn from_debug_level(level: u8) -> Self {
    match level {
      0 => Self::Error,
      1 => Self::Info,
      2 => Self::Debug,
      _ => Self::System,
    }
  }

  pub fn level_filter(self) -> LevelFilter {
    match self {
      Self::Error => LevelFilter::ERROR,
      Self::Info => LevelFilter::INFO,
      Self::Debug => LevelFilter::DEBUG,
      Self::System => LevelFilter::TRACE,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
  pub verbosity: Verbosity,
  pub filter: Option<String>,
  pub ansi: bool,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      verbosity: Verbosity::default(),
      filter: None,
      ansi: io::stderr().is_terminal(),
    }
  }
}

impl LogConfig {
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Builds a config from `lookup`, which resolves variable names.
  ///
  /// An unparsable debug level is treated as 0.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let verbosity = lookup(DEBUG_VAR)
      .and_then(|level| level.trim().parse::<u8>().ok())
      .map(Verbosity::from_debug_level)
      .unwrap_or_default();

    let filter = lookup(FILTER_VAR).filter(|directive| !directive.trim().is_empty());

    let ansi = lookup("NO_COLOR").is_none() && io::stderr().is_terminal();

    Self {
      verbosity,
      filter,
      ansi,
    }
  }

  /// The filter directive if it parses, otherwise the verbosity level.
  pub fn env_filter(&self) -> EnvFilter {
    self
      .filter
      .as_deref()
      .and_then(|directive| EnvFilter::try_new(directive).ok())
      .unwrap_or_else(|| EnvFilter::new(self.verbosity.level_filter().to_string()))
  }

  /// Installs a global stderr subscriber.
  pub fn init(&self) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
      .with(self.env_filter())
      .with(
        tracing_subscriber::fmt::layer()
          .with_writer(io::stderr)
          .with_ansi(self.ansi)
          .with_target(true)
          .with_file(true)
          .with_line_number(true),
      )
      .try_init()
  }
}
