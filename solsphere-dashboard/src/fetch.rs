/**
 * FETCH BACKEND - Collaborateur de chargement des données de flotte
 *
 * RÔLE : Récupère l'inventaire machines et le snapshot de conformité depuis
 * l'API backend, puis les remet au store sous forme de `Loaded<T>`.
 *
 * FONCTIONNEMENT :
 * - Client reqwest avec timeout, base URL configurable
 * - Les deux requêtes d'un cycle partent en parallèle (tokio::join!)
 * - En cas d'échec : marqueur d'erreur + jeu placeholder si autorisé,
 *   sinon l'erreur remonte et le store garde son dernier snapshot
 */

use crate::placeholder;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use solsphere_core::{ComplianceSnapshot, Loaded, Machine};
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, error, warn};

pub const MACHINES_ERROR: &str = "Failed to fetch machines";
pub const DASHBOARD_ERROR: &str = "Failed to fetch dashboard data";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid backend url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("http client setup failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },
    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid payload from {url}: {source}")]
    Decode { url: String, source: reqwest::Error },
}

/// Forme renvoyée par `/api/dashboard/compliance` : `{dimension: {compliant, total}}`
#[derive(Debug, Deserialize)]
struct ComplianceOverview {
    disk_encryption: DimensionCount,
    os_updates: DimensionCount,
    antivirus: DimensionCount,
    sleep_settings: DimensionCount,
}

#[derive(Debug, Deserialize)]
struct DimensionCount {
    compliant: u64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompliancePayload {
    Overview(ComplianceOverview),
    Flat(ComplianceSnapshot),
}

impl From<CompliancePayload> for ComplianceSnapshot {
    fn from(payload: CompliancePayload) -> Self {
        match payload {
            CompliancePayload::Overview(o) => ComplianceSnapshot::new(
                o.disk_encryption.compliant,
                o.os_updates.compliant,
                o.antivirus.compliant,
                o.sleep_settings.compliant,
            ),
            CompliancePayload::Flat(snapshot) => snapshot,
        }
    }
}

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl {
                url: base_url.to_string(),
                reason: "not a base url".into(),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET + décodage JSON ; `Ok(None)` sur 404
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, FetchError> {
        debug!(%url, "GET");
        let response = self.http.get(url.clone()).send().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status });
        }

        let body = response.json::<T>().await.map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;
        Ok(Some(body))
    }

    async fn get_required<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let label = url.to_string();
        self.get_json(url).await?.ok_or(FetchError::Status {
            url: label,
            status: StatusCode::NOT_FOUND,
        })
    }

    pub async fn fetch_machines(&self) -> Result<Vec<Machine>, FetchError> {
        self.get_required(self.endpoint(&["api", "machines"])).await
    }

    pub async fn fetch_machine(&self, machine_id: &str) -> Result<Option<Machine>, FetchError> {
        self.get_json(self.endpoint(&["api", "machines", machine_id])).await
    }

    pub async fn fetch_compliance(&self) -> Result<ComplianceSnapshot, FetchError> {
        let payload: CompliancePayload = self
            .get_required(self.endpoint(&["api", "dashboard", "compliance"]))
            .await?;
        Ok(payload.into())
    }
}

/// Applique la politique de repli sur les deux sources du backend
#[derive(Clone)]
pub struct FleetLoader {
    client: BackendClient,
    placeholder_on_failure: bool,
}

impl FleetLoader {
    pub fn new(client: BackendClient, placeholder_on_failure: bool) -> Self {
        Self { client, placeholder_on_failure }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub async fn load_machines(&self, now: OffsetDateTime) -> Result<Loaded<Vec<Machine>>, FetchError> {
        match self.client.fetch_machines().await {
            Ok(machines) => Ok(Loaded::live(machines, now)),
            Err(e) => {
                error!(error = %e, "{}", MACHINES_ERROR);
                if self.placeholder_on_failure {
                    warn!("serving placeholder machines");
                    Ok(Loaded::placeholder(placeholder::fleet(now), MACHINES_ERROR, now))
                } else {
                    Err(e)
                }
            }
        }
    }

    pub async fn load_compliance(&self, now: OffsetDateTime) -> Result<Loaded<ComplianceSnapshot>, FetchError> {
        match self.client.fetch_compliance().await {
            Ok(snapshot) => Ok(Loaded::live(snapshot, now)),
            Err(e) => {
                error!(error = %e, "{}", DASHBOARD_ERROR);
                if self.placeholder_on_failure {
                    warn!("serving placeholder compliance");
                    Ok(Loaded::placeholder(placeholder::compliance(now), DASHBOARD_ERROR, now))
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Les deux chargements en parallèle, résultats indépendants
    pub async fn load_all(
        &self,
        now: OffsetDateTime,
    ) -> (
        Result<Loaded<Vec<Machine>>, FetchError>,
        Result<Loaded<ComplianceSnapshot>, FetchError>,
    ) {
        tokio::join!(self.load_machines(now), self.load_compliance(now))
    }
}
