use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use parkfinder_core::{Meters, TariffTable, tariff::TariffFile};
use serde::Deserialize;

/// Server settings. Every key is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub log_level: String,
    pub default_radius_m: Meters,
    pub max_radius_m: Meters,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    /// Replaces the built-in St. Gallen table
    pub tariff_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            default_radius_m: 500.0,
            max_radius_m: 3000.0,
            request_timeout_secs: 10,
            max_concurrent_requests: 64,
            tariff_file: None,
        }
    }
}

impl ServerConfig {
    /// Reads the config file when one is given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml(&text).with_context(|| format!("in {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.max_radius_m.is_finite() && self.max_radius_m > 0.0) {
            bail!("max_radius_m must be positive, got {}", self.max_radius_m);
        }
        if !(0.0..=self.max_radius_m).contains(&self.default_radius_m) {
            bail!(
                "default_radius_m must lie in [0, {}], got {}",
                self.max_radius_m,
                self.default_radius_m
            );
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        if self.max_concurrent_requests == 0 {
            bail!("max_concurrent_requests must be at least 1");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Radius for one request: the default when absent, clamped to the
    /// configured maximum.
    pub fn effective_radius(&self, requested: Option<Meters>) -> Meters {
        requested
            .filter(|r| r.is_finite())
            .unwrap_or(self.default_radius_m)
            .clamp(0.0, self.max_radius_m)
    }

    pub fn tariff_table(&self) -> anyhow::Result<TariffTable> {
        let Some(path) = &self.tariff_file else {
            return Ok(TariffTable::st_gallen());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading tariff file {}", path.display()))?;
        let file: TariffFile = toml::from_str(&text)
            .with_context(|| format!("parsing tariff file {}", path.display()))?;
        let table = file.into_table()?;
        tracing::info!(
            facilities = table.len(),
            path = %path.display(),
            "loaded tariff table"
        );
        Ok(table)
    }
}
