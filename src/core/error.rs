//! Error types for netbox-impact with contextual messages and exit codes
//!
//! Every error maps to an exit code and, where we can offer one, a help line
//! that points the user at the fix.

use crate::forms::FormErrors;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for netbox-impact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (network, I/O, NetBox API)
  System = 2,
  /// Validation failure (bad selection, unknown device or circuit)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for netbox-impact
#[derive(Debug)]
pub enum ImpactError {
  /// Configuration errors
  Config(ConfigError),

  /// Topology store errors (snapshot files, NetBox API)
  Store(StoreError),

  /// The device selection form rejected its input
  Validation(FormErrors),

  /// A selected device vanished between validation and resolution
  DeviceNotFound { id: u64 },

  /// A circuit referenced by a score request does not exist
  CircuitNotFound { id: u64 },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ImpactError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ImpactError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ImpactError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ImpactError::Message { message, context, help } => ImpactError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ImpactError::Store(StoreError::Read { path, reason }) => ImpactError::Store(StoreError::Read {
        path,
        reason: format!("{}: {}", ctx_str, reason),
      }),
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ImpactError::Config(_) => ExitCode::User,
      ImpactError::Store(_) => ExitCode::System,
      ImpactError::Validation(_) => ExitCode::Validation,
      ImpactError::DeviceNotFound { .. } => ExitCode::Validation,
      ImpactError::CircuitNotFound { .. } => ExitCode::Validation,
      ImpactError::Io(_) => ExitCode::System,
      ImpactError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ImpactError::Config(e) => e.help_message(),
      ImpactError::Store(e) => e.help_message(),
      ImpactError::Validation(_) => Some("List selectable devices with `netbox-impact devices`.".to_string()),
      ImpactError::DeviceNotFound { .. } => {
        Some("The topology changed since the selection was made. Re-run the analysis.".to_string())
      }
      ImpactError::CircuitNotFound { .. } => Some("Check the circuit ids against your topology source.".to_string()),
      ImpactError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ImpactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ImpactError::Config(e) => write!(f, "{}", e),
      ImpactError::Store(e) => write!(f, "{}", e),
      ImpactError::Validation(e) => write!(f, "Invalid device selection:\n{}", e),
      ImpactError::DeviceNotFound { id } => write!(f, "Device {} not found in topology", id),
      ImpactError::CircuitNotFound { id } => write!(f, "Circuit {} not found in topology", id),
      ImpactError::Io(e) => write!(f, "I/O error: {}", e),
      ImpactError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ImpactError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ImpactError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ImpactError {
  fn from(err: io::Error) -> Self {
    ImpactError::Io(err)
  }
}

impl From<String> for ImpactError {
  fn from(msg: String) -> Self {
    ImpactError::message(msg)
  }
}

impl From<&str> for ImpactError {
  fn from(msg: &str) -> Self {
    ImpactError::message(msg)
  }
}

impl From<FormErrors> for ImpactError {
  fn from(err: FormErrors) -> Self {
    ImpactError::Validation(err)
  }
}

impl From<ConfigError> for ImpactError {
  fn from(err: ConfigError) -> Self {
    ImpactError::Config(err)
  }
}

impl From<StoreError> for ImpactError {
  fn from(err: StoreError) -> Self {
    ImpactError::Store(err)
  }
}

impl From<toml_edit::de::Error> for ImpactError {
  fn from(err: toml_edit::de::Error) -> Self {
    ImpactError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ImpactError {
  fn from(err: serde_json::Error) -> Self {
    ImpactError::message(format!("JSON error: {}", err))
  }
}

impl From<reqwest::Error> for ImpactError {
  fn from(err: reqwest::Error) -> Self {
    ImpactError::Store(StoreError::Transport {
      url: err.url().map(|u| u.to_string()).unwrap_or_default(),
      reason: err.to_string(),
    })
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicitly requested config file does not exist
  NotFound { path: PathBuf },

  /// A field holds a value we cannot use
  InvalidValue { field: String, reason: String },

  /// Neither a snapshot nor a NetBox URL was given
  NoTopologySource,
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Pass --config with an existing file, or drop the flag.".to_string()),
      ConfigError::NoTopologySource => Some(
        "Pass --snapshot <FILE>, or --netbox-url <URL> (or set [netbox] url in impact.toml).".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => {
        write!(f, "Configuration file not found: {}", path.display())
      }
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid value for '{}': {}", field, reason)
      }
      ConfigError::NoTopologySource => {
        write!(f, "No topology source configured")
      }
    }
  }
}

/// Topology store errors
#[derive(Debug)]
pub enum StoreError {
  /// Snapshot file could not be read or parsed
  Read { path: PathBuf, reason: String },

  /// NetBox answered with a non-success status
  Status { url: String, status: u16 },

  /// Request never completed (DNS, TLS, timeout)
  Transport { url: String, reason: String },

  /// Response body did not match the expected shape
  Decode { url: String, reason: String },
}

impl StoreError {
  fn help_message(&self) -> Option<String> {
    match self {
      StoreError::Status { status: 401 | 403, .. } => {
        Some("Check the API token (--netbox-token or NETBOX_TOKEN) and its permissions.".to_string())
      }
      StoreError::Status { status: 404, .. } => Some("Check that --netbox-url points at the NetBox root.".to_string()),
      StoreError::Transport { .. } => {
        Some("Is NetBox reachable? Raise [netbox] timeout_secs for slow instances.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for StoreError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StoreError::Read { path, reason } => {
        write!(f, "Failed to load snapshot {}: {}", path.display(), reason)
      }
      StoreError::Status { url, status } => {
        write!(f, "Failed to fetch {}: status {}", url, status)
      }
      StoreError::Transport { url, reason } => {
        write!(f, "Request to {} failed: {}", url, reason)
      }
      StoreError::Decode { url, reason } => {
        write!(f, "Unexpected response from {}: {}", url, reason)
      }
    }
  }
}

/// Result type alias for netbox-impact
pub type ImpactResult<T> = Result<T, ImpactError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ImpactResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ImpactResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ImpactError>,
{
  fn context(self, ctx: impl Into<String>) -> ImpactResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ImpactResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ImpactError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
