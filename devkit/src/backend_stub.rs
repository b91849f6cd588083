/*!
Backend stub pour tester le dashboard sans API réelle

Sert les mêmes routes que le backend (`/api/machines`,
`/api/machines/{id}`, `/api/dashboard/compliance`) sur un port éphémère.
Les payloads sont modifiables à chaud, le stub peut échouer à la demande
et compte les requêtes reçues par chemin.
*/

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use solsphere_core::{ComplianceSnapshot, Machine};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Clone)]
struct StubState {
    machines: Arc<Mutex<Value>>,
    compliance: Arc<Mutex<Value>>,
    failing: Arc<AtomicBool>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl StubState {
    fn record(&self, uri: &Uri) -> bool {
        *self.hits.lock().entry(uri.path().to_string()).or_insert(0) += 1;
        self.failing.load(Ordering::SeqCst)
    }
}

pub struct StubBackend {
    addr: SocketAddr,
    state: StubState,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Démarre le stub sur 127.0.0.1 avec une flotte vide
    pub async fn start() -> Result<Self> {
        let state = StubState {
            machines: Arc::new(Mutex::new(json!([]))),
            compliance: Arc::new(Mutex::new(overview_payload(&ComplianceSnapshot::default(), 0))),
            failing: Arc::new(AtomicBool::new(false)),
            hits: Arc::new(Mutex::new(HashMap::new())),
        };

        let app = Router::new()
            .route("/api/machines", get(list_machines))
            .route("/api/machines/{id}", get(get_machine))
            .route("/api/dashboard/compliance", get(get_compliance))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::error!("stub backend stopped: {}", e);
            }
        });

        log::info!("🧪 stub backend listening on http://{}", addr);
        Ok(Self { addr, state, server })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Remplace la flotte servie ; la conformité imbriquée suit la flotte
    pub fn set_machines(&self, machines: &[Machine]) -> Result<()> {
        let payload = serde_json::to_value(machines)?;
        *self.state.machines.lock() = payload;
        self.set_compliance(&ComplianceSnapshot::from_machines(machines), machines.len() as u64);
        Ok(())
    }

    /// Payload machines brut, pour les formes que `Machine` ne produit pas
    pub fn set_machines_json(&self, payload: Value) {
        *self.state.machines.lock() = payload;
    }

    /// Forme imbriquée `{dimension: {compliant, total}}` du backend
    pub fn set_compliance(&self, snapshot: &ComplianceSnapshot, total: u64) {
        *self.state.compliance.lock() = overview_payload(snapshot, total);
    }

    pub fn set_compliance_json(&self, payload: Value) {
        *self.state.compliance.lock() = payload;
    }

    /// Toutes les routes répondent 500 tant que `failing` est vrai
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    pub fn hits(&self, path: &str) -> usize {
        self.state.hits.lock().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.state.hits.lock().values().sum()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn overview_payload(snapshot: &ComplianceSnapshot, total: u64) -> Value {
    json!({
        "disk_encryption": {"compliant": snapshot.disk_encryption, "total": total},
        "os_updates": {"compliant": snapshot.os_updates, "total": total},
        "antivirus": {"compliant": snapshot.antivirus, "total": total},
        "sleep_settings": {"compliant": snapshot.sleep_settings, "total": total},
    })
}

async fn list_machines(State(state): State<StubState>, uri: Uri) -> Result<Json<Value>, StatusCode> {
    if state.record(&uri) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(state.machines.lock().clone()))
}

async fn get_machine(
    State(state): State<StubState>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<Json<Value>, StatusCode> {
    if state.record(&uri) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let machines = state.machines.lock();
    machines
        .as_array()
        .and_then(|list| list.iter().find(|m| m["machine_id"] == id.as_str()))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_compliance(State(state): State<StubState>, uri: Uri) -> Result<Json<Value>, StatusCode> {
    if state.record(&uri) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(state.compliance.lock().clone()))
}
