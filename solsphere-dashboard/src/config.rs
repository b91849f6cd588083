use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub api_base_url: String,
    pub listen: SocketAddr,
    /// Substitue le jeu de démonstration quand le backend ne répond pas
    pub placeholder_on_failure: bool,
    pub request_timeout_secs: u64,
    pub refresh: RefreshIntervals,
}

/// Intervalles de rafraîchissement par vue (politique, pas logique du moteur)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RefreshIntervals {
    pub dashboard_secs: u64,
    pub machines_secs: u64,
    pub reports_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            listen: SocketAddr::from(([0, 0, 0, 0], 8080)),
            placeholder_on_failure: true,
            request_timeout_secs: 10,
            refresh: RefreshIntervals::default(),
        }
    }
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            dashboard_secs: 30,
            machines_secs: 60,
            reports_secs: 300,
        }
    }
}

impl RefreshIntervals {
    pub fn dashboard(&self) -> Duration {
        Duration::from_secs(self.dashboard_secs.max(1))
    }

    pub fn machines(&self) -> Duration {
        Duration::from_secs(self.machines_secs.max(1))
    }

    pub fn reports(&self) -> Duration {
        Duration::from_secs(self.reports_secs.max(1))
    }
}

impl DashboardConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Les variables d'environnement priment sur le fichier
    fn apply_env(mut self) -> Self {
        if let Ok(url) = std::env::var("SOLSPHERE_API_BASE_URL") {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        self
    }
}

pub async fn load_config() -> DashboardConfig {
    let path = std::env::var("SOLSPHERE_DASHBOARD_CONFIG").unwrap_or_else(|_| "dashboard.yaml".into());
    load_config_from(&path).await.apply_env()
}

pub async fn load_config_from(path: impl AsRef<Path>) -> DashboardConfig {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "no config file, using defaults");
        return DashboardConfig::default();
    }

    let txt = fs::read_to_string(path).await.unwrap_or_default();
    if txt.trim().is_empty() {
        return DashboardConfig::default();
    }
    serde_yaml::from_str(&txt).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "invalid config, using defaults");
        DashboardConfig::default()
    })
}
