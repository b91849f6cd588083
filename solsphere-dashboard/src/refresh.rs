use crate::config::RefreshIntervals;
use crate::fetch::FleetLoader;
use serde::Serialize;
use solsphere_core::{compute_percentage, os_distribution, DataSource, FleetStats, FleetStore};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{info, warn};

const MACHINES: &str = "machines";
const DASHBOARD: &str = "dashboard";

#[derive(Debug, Serialize)]
pub struct DashboardHealth {
    pub uptime_seconds: u64,
    pub machines_tracked: usize,
    pub machines_source: DataSource,
    pub compliance_source: DataSource,
    pub refreshes: u32,
    pub fetch_failures: u32,
    pub last_error: Option<String>,
}

/// Suivi des cycles de refresh, partagé entre les boucles et l'API
#[derive(Clone)]
pub struct RefreshTracker {
    start_time: Instant,
    refreshes: Arc<AtomicU32>,
    failures: Arc<AtomicU32>,
    /// Erreurs encore actives, une par source, la plus récente en dernier
    errors: Arc<parking_lot::Mutex<Vec<(&'static str, String)>>>,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            refreshes: Arc::new(AtomicU32::new(0)),
            failures: Arc::new(AtomicU32::new(0)),
            errors: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    pub fn mark_refreshed(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn mark_failed(&self, source: &'static str, error: impl Into<String>) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        let mut errors = self.errors.lock();
        errors.retain(|(s, _)| *s != source);
        errors.push((source, error.into()));
    }

    /// Un fetch réussi efface l'erreur de sa source
    pub fn clear_error(&self, source: &'static str) {
        self.errors.lock().retain(|(s, _)| *s != source);
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors.lock().last().map(|(_, e)| e.clone())
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn get_health(&self, store: &FleetStore) -> DashboardHealth {
        let machines = store.machines();
        DashboardHealth {
            uptime_seconds: self.start_time.elapsed().as_secs(),
            machines_tracked: machines.data.len(),
            machines_source: machines.source,
            compliance_source: store.compliance().source,
            refreshes: self.refreshes.load(Ordering::Relaxed),
            fetch_failures: self.failures(),
            last_error: self.last_error(),
        }
    }
}

impl Default for RefreshTracker {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn refresh_machines(loader: &FleetLoader, store: &FleetStore, tracker: &RefreshTracker) {
    let now = OffsetDateTime::now_utc();
    match loader.load_machines(now).await {
        Ok(loaded) => {
            match &loaded.error {
                Some(error) => tracker.mark_failed(MACHINES, error.clone()),
                None => tracker.clear_error(MACHINES),
            }
            info!(count = loaded.data.len(), source = %loaded.source, "[machines] collection refreshed");
            store.replace_machines(loaded);
            tracker.mark_refreshed();
        }
        Err(e) => {
            // pas de placeholder : on garde le dernier snapshot
            warn!(error = %e, "[machines] keeping previous collection");
            tracker.mark_failed(MACHINES, e.to_string());
        }
    }
}

pub async fn refresh_compliance(loader: &FleetLoader, store: &FleetStore, tracker: &RefreshTracker) {
    let now = OffsetDateTime::now_utc();
    match loader.load_compliance(now).await {
        Ok(loaded) => {
            match &loaded.error {
                Some(error) => tracker.mark_failed(DASHBOARD, error.clone()),
                None => tracker.clear_error(DASHBOARD),
            }
            info!(
                percentage = compute_percentage(&loaded.data),
                source = %loaded.source,
                "[dashboard] compliance refreshed"
            );
            store.replace_compliance(loaded);
            tracker.mark_refreshed();
        }
        Err(e) => {
            warn!(error = %e, "[dashboard] keeping previous compliance snapshot");
            tracker.mark_failed(DASHBOARD, e.to_string());
        }
    }
}

/// Chargement initial : les deux sources en parallèle
pub async fn refresh_all(loader: &FleetLoader, store: &FleetStore, tracker: &RefreshTracker) {
    tokio::join!(
        refresh_machines(loader, store, tracker),
        refresh_compliance(loader, store, tracker)
    );
}

/// Résumé périodique des rapports dans les logs
pub fn log_report(store: &FleetStore) {
    let now = OffsetDateTime::now_utc();
    let machines = store.machines();
    let stats = FleetStats::from_counts(&store.summary(now));
    let top_os = os_distribution(&machines.data)
        .into_iter()
        .next()
        .map(|share| share.name)
        .unwrap_or_default();
    info!(
        total = stats.total_machines,
        healthy = stats.healthy_machines,
        warning = stats.warning_machines,
        critical = stats.critical_machines,
        offline = stats.offline_machines,
        compliance = store.compliance_percentage(),
        top_os = %top_os,
        "[reports] fleet report"
    );
}

fn spawn_every<F, Fut>(period: Duration, mut job: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // le premier tick est immédiat, le chargement initial est déjà fait
        interval.tick().await;
        loop {
            interval.tick().await;
            job().await;
        }
    })
}

/// Démarre les boucles de rafraîchissement (dashboard, machines, rapports)
pub fn spawn_refresh_loops(
    loader: FleetLoader,
    store: FleetStore,
    tracker: RefreshTracker,
    intervals: &RefreshIntervals,
) -> Vec<JoinHandle<()>> {
    info!(
        dashboard = intervals.dashboard_secs,
        machines = intervals.machines_secs,
        reports = intervals.reports_secs,
        "starting refresh loops"
    );

    let machines = {
        let (loader, store, tracker) = (loader.clone(), store.clone(), tracker.clone());
        spawn_every(intervals.machines(), move || {
            let (loader, store, tracker) = (loader.clone(), store.clone(), tracker.clone());
            async move { refresh_machines(&loader, &store, &tracker).await }
        })
    };

    let dashboard = {
        let (store, tracker) = (store.clone(), tracker.clone());
        spawn_every(intervals.dashboard(), move || {
            let (loader, store, tracker) = (loader.clone(), store.clone(), tracker.clone());
            async move { refresh_compliance(&loader, &store, &tracker).await }
        })
    };

    let reports = spawn_every(intervals.reports(), move || {
        let store = store.clone();
        async move { log_report(&store) }
    });

    vec![machines, dashboard, reports]
}
