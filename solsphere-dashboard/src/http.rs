/**
 * API VUES DASHBOARD - Surface JSON au-dessus du FleetStore
 *
 * RÔLE :
 * Expose les vues dérivées (liste filtrée, résumé par statut, conformité,
 * statistiques, export CSV) à la couche de présentation.
 *
 * FONCTIONNEMENT :
 * - Serveur Axum, routes en lecture seule sauf /filters
 * - Chaque requête recalcule la vue avec l'heure courante (pas de cache)
 * - /filters est le seul chemin de mutation du FilterState
 */

use crate::refresh::{DashboardHealth, RefreshTracker};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use solsphere_core::{
    classify, export_csv, os_distribution, ComplianceSnapshot, DataSource, DerivedStatus, FilterDimension,
    FilterState, FleetStats, FleetStore, Machine, OsShare, StatusCounts,
};
use time::OffsetDateTime;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub store: FleetStore,
    pub tracker: RefreshTracker,
    /// Horloge des vues, remplaçable en test
    pub now: fn() -> OffsetDateTime,
}

impl AppState {
    pub fn new(store: FleetStore, tracker: RefreshTracker) -> Self {
        Self { store, tracker, now: OffsetDateTime::now_utc }
    }
}

#[derive(Debug, Serialize)]
pub struct MachineView {
    #[serde(flatten)]
    pub machine: Machine,
    pub status: DerivedStatus,
}

impl MachineView {
    fn new(machine: Machine, now: OffsetDateTime) -> Self {
        let status = classify(&machine, now);
        Self { machine, status }
    }
}

#[derive(Debug, Serialize)]
pub struct ComplianceView {
    pub snapshot: ComplianceSnapshot,
    pub percentage: u8,
    pub source: DataSource,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsView {
    pub stats: FleetStats,
    pub healthy_rate: f64,
    pub compliance_percentage: u8,
    pub os_distribution: Vec<OsShare>,
    pub source: DataSource,
    pub error: Option<String>,
}

/// Surcharges ponctuelles du filtre courant, dimension par dimension
#[derive(Debug, Default, Deserialize)]
struct MachinesQuery {
    os: Option<String>,
    status: Option<String>,
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetFilter {
    dimension: FilterDimension,
    #[serde(default)]
    value: String,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/machines", get(get_machines))
        .route("/machines/{id}", get(get_machine))
        .route("/summary", get(get_summary))
        .route("/compliance", get(get_compliance))
        .route("/stats", get(get_stats))
        .route("/filters", get(get_filters).post(set_filter).delete(clear_filters))
        .route("/export/machines", get(export_machines))
        .with_state(app_state)
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<DashboardHealth> {
    Json(app.tracker.get_health(&app.store))
}

// GET /machines?os=&status=&search=
async fn get_machines(State(app): State<AppState>, Query(query): Query<MachinesQuery>) -> Json<Vec<MachineView>> {
    let now = (app.now)();
    let mut filter = app.store.filters();
    for (dimension, value) in [
        (FilterDimension::Os, query.os),
        (FilterDimension::Status, query.status),
        (FilterDimension::Search, query.search),
    ] {
        if let Some(value) = value {
            filter = filter.with_filter(dimension, value);
        }
    }

    let list = app
        .store
        .filtered_with(&filter, now)
        .into_iter()
        .map(|m| MachineView::new(m, now))
        .collect();
    Json(list)
}

// GET /machines/{id}
async fn get_machine(State(app): State<AppState>, Path(id): Path<String>) -> Result<Json<MachineView>, StatusCode> {
    let Some(machine) = app.store.machine(&id) else {
        return Err(StatusCode::NOT_FOUND);
    };
    Ok(Json(MachineView::new(machine, (app.now)())))
}

// GET /summary
async fn get_summary(State(app): State<AppState>) -> Json<StatusCounts> {
    Json(app.store.summary((app.now)()))
}

// GET /compliance
async fn get_compliance(State(app): State<AppState>) -> Json<ComplianceView> {
    let compliance = app.store.compliance();
    Json(ComplianceView {
        snapshot: compliance.data,
        percentage: app.store.compliance_percentage(),
        source: compliance.source,
        error: compliance.error.clone(),
    })
}

// GET /stats
async fn get_stats(State(app): State<AppState>) -> Json<StatsView> {
    let now = (app.now)();
    let machines = app.store.machines();
    let compliance = app.store.compliance();
    let stats = FleetStats::from_counts(&app.store.summary(now));

    // une source placeholder sur l'une des deux données suffit à marquer la vue
    let source = if machines.source.is_placeholder() || compliance.source.is_placeholder() {
        DataSource::Placeholder
    } else {
        DataSource::Live
    };

    Json(StatsView {
        stats,
        healthy_rate: stats.healthy_rate(),
        compliance_percentage: app.store.compliance_percentage(),
        os_distribution: os_distribution(&machines.data),
        source,
        error: compliance.error.clone().or_else(|| machines.error.clone()),
    })
}

// GET /filters
async fn get_filters(State(app): State<AppState>) -> Json<FilterState> {
    Json(app.store.filters())
}

// POST /filters {"dimension": "os", "value": "linux"}
async fn set_filter(State(app): State<AppState>, Json(body): Json<SetFilter>) -> Json<FilterState> {
    info!(dimension = %body.dimension, value = %body.value, "filter changed");
    Json(app.store.set_filter(body.dimension, body.value))
}

// DELETE /filters
async fn clear_filters(State(app): State<AppState>) -> Json<FilterState> {
    app.store.clear_filters();
    Json(app.store.filters())
}

// GET /export/machines
async fn export_machines(State(app): State<AppState>) -> Result<impl IntoResponse, StatusCode> {
    let machines = app.store.machines();
    match export_csv(&machines.data, (app.now)()) {
        Ok(csv) => Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv)),
        Err(e) => {
            error!(error = %e, "csv export failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
