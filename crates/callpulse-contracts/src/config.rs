//! Engine configuration.
//!
//! One explicit `EngineConfig` is built at startup and handed to every
//! component; nothing reads the environment. It is usually loaded from TOML:
//!
//! ```toml
//! lookback_window_secs = 43200
//! sla_threshold_default_secs = 20
//! ringing_status = true
//!
//! [[precedence]]
//! id = "connect"
//! pattern = "CONNECT"
//! kind = "connect"
//! ```
//!
//! When `precedence` is omitted the built-in table from
//! [`default_precedence`] is used.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{CallpulseError, CallpulseResult},
    event::EventKind,
};

/// One classification rule: a raw code containing `pattern` (ignoring case)
/// maps to `kind`, unless the match lies inside one of the `unless` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Stable identifier used in logs.
    pub id: String,
    pub pattern: String,
    pub kind: EventKind,
    /// Longer tokens that contain `pattern` but must not trigger this rule,
    /// e.g. `UNPAUSE` for the `PAUSE` rule.
    #[serde(default)]
    pub unless: Vec<String>,
}

impl ClassificationRule {
    pub fn new(id: &str, pattern: &str, kind: EventKind) -> Self {
        Self {
            id: id.to_string(),
            pattern: pattern.to_string(),
            kind,
            unless: Vec::new(),
        }
    }

    pub fn unless(mut self, token: &str) -> Self {
        self.unless.push(token.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How far back "current state" queries scan. Required, must be > 0.
    pub lookback_window_secs: u64,

    /// SLA threshold used when a metrics query does not supply one.
    #[serde(default = "default_sla_threshold")]
    pub sla_threshold_default_secs: u32,

    /// `true` reports ring events as `ringing`; `false` reproduces the older
    /// mapping that shows them as `offline`.
    #[serde(default = "default_ringing_status")]
    pub ringing_status: bool,

    /// Ordered classification table. First match wins.
    #[serde(default = "default_precedence")]
    pub precedence: Vec<ClassificationRule>,
}

impl EngineConfig {
    /// Default configuration with the given lookback window.
    pub fn with_lookback(lookback_window_secs: u64) -> Self {
        Self {
            lookback_window_secs,
            sla_threshold_default_secs: default_sla_threshold(),
            ringing_status: default_ringing_status(),
            precedence: default_precedence(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> CallpulseResult<Self> {
        let config: EngineConfig = toml::from_str(s).map_err(|e| CallpulseError::ConfigError {
            reason: format!("failed to parse engine TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CallpulseResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CallpulseError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> CallpulseResult<()> {
        if self.lookback_window_secs == 0 {
            return Err(CallpulseError::ConfigError {
                reason: "lookback_window_secs must be greater than zero".to_string(),
            });
        }
        self.lookback()?;
        if self.sla_threshold_default_secs == 0 {
            return Err(CallpulseError::ConfigError {
                reason: "sla_threshold_default_secs must be greater than zero".to_string(),
            });
        }
        if let Some(rule) = self.precedence.iter().find(|r| r.pattern.trim().is_empty()) {
            return Err(CallpulseError::ConfigError {
                reason: format!("precedence rule '{}' has an empty pattern", rule.id),
            });
        }
        Ok(())
    }

    /// The lookback as a duration; values chrono cannot represent are a
    /// configuration error.
    pub fn lookback(&self) -> CallpulseResult<chrono::Duration> {
        i64::try_from(self.lookback_window_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| CallpulseError::ConfigError {
                reason: format!(
                    "lookback_window_secs {} is out of range",
                    self.lookback_window_secs
                ),
            })
    }
}

fn default_sla_threshold() -> u32 {
    20
}

fn default_ringing_status() -> bool {
    true
}

/// The built-in classification table.
///
/// Family order: connect/complete/transfer (busy), pause, unpause and login
/// (available), ring, then logout and call-only codes. Within a family the
/// more specific token comes first.
pub fn default_precedence() -> Vec<ClassificationRule> {
    use EventKind::*;
    vec![
        ClassificationRule::new("complete-agent", "COMPLETEAGENT", CompleteAgent),
        ClassificationRule::new("complete-caller", "COMPLETECALLER", CompleteCaller),
        ClassificationRule::new("connect", "CONNECT", Connect),
        ClassificationRule::new("transfer", "TRANSFER", Transfer),
        ClassificationRule::new("pause", "PAUSE", Pause).unless("UNPAUSE"),
        ClassificationRule::new("unpause", "UNPAUSE", Unpause),
        ClassificationRule::new("add-member", "ADDMEMBER", Login),
        ClassificationRule::new("agent-login", "LOGIN", Login),
        ClassificationRule::new("ring-no-answer", "RINGNOANSWER", RingNoAnswer),
        ClassificationRule::new("ring-canceled", "RINGCANCEL", RingCanceled),
        ClassificationRule::new("remove-member", "REMOVEMEMBER", Logout),
        ClassificationRule::new("agent-logoff", "LOGOFF", Logout),
        ClassificationRule::new("logout", "LOGOUT", Logout),
        ClassificationRule::new("enter-queue", "ENTERQUEUE", EnterQueue),
        ClassificationRule::new("abandon", "ABANDON", Abandon),
        ClassificationRule::new("exit-timeout", "EXITWITHTIMEOUT", ExitWithTimeout),
        ClassificationRule::new("exit-empty", "EXITEMPTY", ExitWithTimeout),
        ClassificationRule::new("exit-key", "EXITWITHKEY", ExitWithKey),
    ]
}
