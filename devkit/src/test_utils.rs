/*!
Test Harness pour le dashboard Solsphere

Facilite l'écriture de tests d'intégration avec:
- Logging de test initialisé une seule fois
- Backend stub démarré et pré-rempli avec la flotte de référence
- Attente bornée sur les requêtes reçues par le stub
*/

use crate::backend_stub::StubBackend;
use crate::fixtures::sample_fleet;
use anyhow::Result;
use solsphere_core::Machine;
use std::time::{Duration, Instant};
use time::macros::datetime;
use time::OffsetDateTime;

/// Instant de référence des fixtures, fixe pour des statuts reproductibles
pub const FIXTURE_NOW: OffsetDateTime = datetime!(2024-05-01 12:00:00 UTC);

pub struct TestHarness {
    pub backend: StubBackend,
    pub now: OffsetDateTime,
    pub fleet: Vec<Machine>,
}

impl TestHarness {
    /// Stub démarré avec la flotte de référence à `FIXTURE_NOW`
    pub async fn new() -> Result<Self> {
        Self::with_fleet(sample_fleet(FIXTURE_NOW), FIXTURE_NOW).await
    }

    pub async fn with_fleet(fleet: Vec<Machine>, now: OffsetDateTime) -> Result<Self> {
        init_logging();
        let backend = StubBackend::start().await?;
        backend.set_machines(&fleet)?;
        log::info!("📚 harness ready with {} machines", fleet.len());
        Ok(Self { backend, now, fleet })
    }

    pub fn base_url(&self) -> String {
        self.backend.base_url()
    }

    /// Attend que `path` ait reçu au moins `count` requêtes
    pub async fn wait_for_hits(&self, path: &str, count: usize, timeout_ms: u64) -> Result<()> {
        let start = Instant::now();
        while start.elapsed() < Duration::from_millis(timeout_ms) {
            if self.backend.hits(path) >= count {
                log::info!("✅ {} reached {} hits", path, count);
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        anyhow::bail!(
            "timeout waiting for {} hits on {} (got {})",
            count,
            path,
            self.backend.hits(path)
        )
    }
}

/// Logging env_logger pour les tests, idempotent
pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_harness_preloads_fleet() {
        let harness = TestHarness::new().await.unwrap();
        assert_eq!(harness.fleet.len(), 5);

        let url = format!("{}/api/machines", harness.base_url());
        let body: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        assert_eq!(body.as_array().unwrap().len(), 5);
        harness.wait_for_hits("/api/machines", 1, 1000).await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_hits_times_out() {
        let harness = TestHarness::new().await.unwrap();
        assert!(harness.wait_for_hits("/api/machines", 1, 50).await.is_err());
    }
}
