//! Configuration: built-in defaults, the YAML config file and flags.
//!
//! Precedence is flags (and `REDIS_CONNECT`) over `~/.config/redpaste.yml`
//! over built-in defaults. The result is resolved once into a [`CliConfig`]
//! before any command runs.

use crate::error::{CliError, CliResult};
use clap::Args;
use redpaste_sync_engine::{SyncConfig, DEFAULT_KEY};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Name of the config file under `~/.config`.
pub const CONFIG_FILE_NAME: &str = "redpaste.yml";

/// Contents of the YAML config file.
///
/// Values are kept as strings, the same way they are accepted on the
/// command line. Missing keys take the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileConfig {
    /// Connection string for the redis server.
    pub redis_connect: String,
    /// Key holding the record.
    pub redis_key: String,
    /// Expiry applied on every write (`0` = never).
    pub ttl: String,
    /// How often `watch` looks for a changed key.
    pub watch_interval: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            redis_connect: String::new(),
            redis_key: DEFAULT_KEY.to_string(),
            ttl: "0".to_string(),
            watch_interval: "2s".to_string(),
        }
    }
}

impl FileConfig {
    /// Returns `~/.config/redpaste.yml`.
    pub fn default_path() -> CliResult<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".config").join(CONFIG_FILE_NAME))
            .ok_or_else(|| CliError::Config("unable to determine home directory".into()))
    }

    /// Loads the config file, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> CliResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(CliError::io(format!("unable to read {}", path.display()), e)),
        };

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(&contents).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Writes the config file, creating `~/.config` if needed.
    ///
    /// The file may hold credentials, so it is created readable by the owner
    /// only on unix.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CliError::io(format!("unable to create {}", parent.display()), e)
            })?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(|e| CliError::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let context = || format!("unable to write {}", path.display());
        let mut file = options
            .open(path)
            .map_err(|e| CliError::io(context(), e))?;
        file.write_all(yaml.as_bytes())
            .map_err(|e| CliError::io(context(), e))?;
        Ok(())
    }
}

/// Settings that can be given on the command line.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Connection string for the redis server to use
    #[arg(global = true, long, env = "REDIS_CONNECT", hide_env_values = true)]
    pub redis_connect: Option<String>,

    /// Key to write the data to
    #[arg(global = true, short = 'k', long)]
    pub redis_key: Option<String>,

    /// When to expire the key (0=never)
    #[arg(global = true, long)]
    pub ttl: Option<String>,

    /// How often to look for a changed key
    #[arg(global = true, long)]
    pub watch_interval: Option<String>,

    /// Timeout for connecting to and talking to redis (0=none)
    #[arg(global = true, long)]
    pub redis_timeout: Option<String>,
}

/// The effective configuration handed to the commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Connection string for the redis server.
    pub redis_connect: String,
    /// Redis connect and I/O timeout.
    pub redis_timeout: Option<Duration>,
    /// Engine configuration.
    pub sync: SyncConfig,
}

impl CliConfig {
    /// Merges `overrides` over `file` and validates the result.
    pub fn resolve(file: FileConfig, overrides: &ConfigOverrides) -> CliResult<Self> {
        let pick = |flag: &Option<String>, file: String| flag.clone().unwrap_or(file);

        let redis_connect = pick(&overrides.redis_connect, file.redis_connect);
        if redis_connect.trim().is_empty() {
            return Err(CliError::Config(
                "you need to specify a redis connection string".into(),
            ));
        }

        let ttl = parse_duration("ttl", &pick(&overrides.ttl, file.ttl))?;
        let watch_interval = parse_duration(
            "watch-interval",
            &pick(&overrides.watch_interval, file.watch_interval),
        )?;
        let redis_timeout = overrides
            .redis_timeout
            .as_deref()
            .map(|value| parse_duration("redis-timeout", value))
            .transpose()?
            .filter(|timeout| !timeout.is_zero());

        let sync = SyncConfig::new(pick(&overrides.redis_key, file.redis_key))
            .with_ttl(ttl)
            .with_watch_interval(watch_interval);
        sync.validate()?;

        Ok(Self {
            redis_connect,
            redis_timeout,
            sync,
        })
    }
}

/// Parses a duration such as `0`, `500ms`, `2s`, `5m`, `1h` or `1m30s`.
pub fn parse_duration(setting: &'static str, value: &str) -> CliResult<Duration> {
    let invalid = |reason| CliError::InvalidDuration {
        setting,
        value: value.to_string(),
        reason,
    };

    let text = value.trim().to_lowercase();
    if text.is_empty() {
        return Err(invalid("empty value"));
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut rest = text.as_str();
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| invalid("missing unit (ms, s, m or h)"))?;
        if digits == 0 {
            return Err(invalid("expected a number"));
        }
        let amount: u64 = rest[..digits]
            .parse()
            .map_err(|_| invalid("number out of range"))?;
        rest = &rest[digits..];

        let (unit, millis) = if rest.starts_with("ms") {
            ("ms", 1)
        } else if rest.starts_with('s') {
            ("s", 1_000)
        } else if rest.starts_with('m') {
            ("m", 60_000)
        } else if rest.starts_with('h') {
            ("h", 3_600_000)
        } else {
            return Err(invalid("unknown unit (expected ms, s, m or h)"));
        };
        rest = &rest[unit.len()..];

        let part = amount
            .checked_mul(millis)
            .ok_or_else(|| invalid("number out of range"))?;
        total = total
            .checked_add(Duration::from_millis(part))
            .ok_or_else(|| invalid("number out of range"))?;
    }
    Ok(total)
}
