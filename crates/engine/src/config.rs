//! Engine configuration.
//!
//! Sources, later wins:
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `PODSHIP_*` environment variables

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use podship_core::Price;
use podship_inventory::AgingPolicy;
use podship_notify::AlertSettings;
use podship_observability::LogConfig;
use podship_vendor::{ClientSettings, OrderMode, VendorCredentials};

const ENV_PREFIX: &str = "PODSHIP_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    pub endpoint: String,
    pub user_id: String,
    pub password: String,
    /// Send orders in `TEST` mode so the vendor does not ship them.
    pub do_not_ship: bool,
    /// `None` or zero disables the shipping cost cap.
    pub max_shipping_cost: Option<Price>,
    pub timeout_secs: u64,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://kunaki.com/XMLService.ASP".to_string(),
            user_id: String::new(),
            password: String::new(),
            do_not_ship: false,
            max_shipping_cost: None,
            timeout_secs: 30,
        }
    }
}

impl core::fmt::Debug for VendorConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VendorConfig")
            .field("endpoint", &self.endpoint)
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .field("do_not_ship", &self.do_not_ship)
            .field("max_shipping_cost", &self.max_shipping_cost)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl VendorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Run the daily inventory aging sweep.
    pub check_inventory: bool,
    /// Log at debug level, including wire payloads.
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub alert_after_days: u32,
    pub expire_after_days: u32,
    /// Bound on optimistic write retries for the shared inventory blob.
    pub max_commit_attempts: u32,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        let policy = AgingPolicy::default();
        Self {
            alert_after_days: policy.alert_after_days,
            expire_after_days: policy.expire_after_days,
            max_commit_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub vendor: VendorConfig,
    pub features: FeatureFlags,
    pub alerts: AlertSettings,
    pub inventory: InventoryConfig,
    pub logging: LogConfig,
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Defaults or `path`, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env(|key| std::env::var(key).ok())
    }

    /// Apply `PODSHIP_*` overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = EnvOverrides { lookup: &lookup };

        env.string("VENDOR_ENDPOINT", &mut self.vendor.endpoint);
        env.string("VENDOR_USER_ID", &mut self.vendor.user_id);
        env.string("VENDOR_PASSWORD", &mut self.vendor.password);
        env.flag("VENDOR_DO_NOT_SHIP", &mut self.vendor.do_not_ship)?;
        if let Some(raw) = env.get("VENDOR_MAX_SHIPPING_COST") {
            self.vendor.max_shipping_cost = if raw.trim().is_empty() {
                None
            } else {
                Some(Price::parse(&raw).map_err(|_| env.invalid("VENDOR_MAX_SHIPPING_COST", &raw))?)
            };
        }
        env.number("VENDOR_TIMEOUT_SECS", &mut self.vendor.timeout_secs)?;

        env.flag("FEATURES_CHECK_INVENTORY", &mut self.features.check_inventory)?;
        env.flag("FEATURES_DEBUG", &mut self.features.debug)?;

        env.flag("ALERTS_ENABLED", &mut self.alerts.enabled)?;
        env.string("ALERTS_ADMIN_EMAIL", &mut self.alerts.admin_email);
        env.string("ALERTS_SITE_ADMIN_EMAIL", &mut self.alerts.site_admin_email);
        env.string("ALERTS_SITE_TITLE", &mut self.alerts.site_title);
        env.string("ALERTS_FROM_EMAIL", &mut self.alerts.from_email);
        env.string("ALERTS_SUBJECT_PREFIX", &mut self.alerts.subject_prefix);

        env.number("INVENTORY_ALERT_AFTER_DAYS", &mut self.inventory.alert_after_days)?;
        env.number("INVENTORY_EXPIRE_AFTER_DAYS", &mut self.inventory.expire_after_days)?;
        env.number("INVENTORY_MAX_COMMIT_ATTEMPTS", &mut self.inventory.max_commit_attempts)?;

        env.string("LOG_LEVEL", &mut self.logging.level);
        env.flag("LOG_JSON", &mut self.logging.json)?;

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.vendor.timeout_secs == 0 {
            return Err(ConfigError::Inconsistent("vendor.timeout_secs must be at least 1".to_string()));
        }
        if self.inventory.alert_after_days > self.inventory.expire_after_days {
            return Err(ConfigError::Inconsistent(format!(
                "inventory.alert_after_days ({}) is after inventory.expire_after_days ({})",
                self.inventory.alert_after_days, self.inventory.expire_after_days
            )));
        }
        Ok(())
    }

    /// Both vendor credentials are present.
    pub fn is_configured(&self) -> bool {
        self.credentials().is_complete()
    }

    pub fn credentials(&self) -> VendorCredentials {
        VendorCredentials::new(self.vendor.user_id.trim(), self.vendor.password.trim())
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::new(self.credentials(), OrderMode::from_do_not_ship(self.vendor.do_not_ship))
            .with_max_shipping_cost(self.vendor.max_shipping_cost)
    }

    pub fn aging_policy(&self) -> AgingPolicy {
        AgingPolicy {
            alert_after_days: self.inventory.alert_after_days,
            expire_after_days: self.inventory.expire_after_days,
        }
    }

    /// Logging settings with the debug feature folded in.
    pub fn log_config(&self) -> LogConfig {
        self.logging.clone().with_debug(self.features.debug)
    }
}

struct EnvOverrides<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl EnvOverrides<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(&format!("{ENV_PREFIX}{key}"))
    }

    fn invalid(&self, key: &str, value: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: format!("{ENV_PREFIX}{key}"),
            value: value.to_string(),
        }
    }

    fn string(&self, key: &str, target: &mut String) {
        if let Some(value) = self.get(key) {
            *target = value;
        }
    }

    fn flag(&self, key: &str, target: &mut bool) -> Result<(), ConfigError> {
        if let Some(raw) = self.get(key) {
            *target = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => return Err(self.invalid(key, &raw)),
            };
        }
        Ok(())
    }

    fn number<N: core::str::FromStr>(&self, key: &str, target: &mut N) -> Result<(), ConfigError> {
        if let Some(raw) = self.get(key) {
            *target = raw.trim().parse().map_err(|_| self.invalid(key, &raw))?;
        }
        Ok(())
    }
}
