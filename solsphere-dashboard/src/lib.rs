/*!
 * SOLSPHERE DASHBOARD - Couche fetch / refresh / vues
 *
 * Charge la flotte depuis le backend, la garde dans un `FleetStore`
 * rafraîchi périodiquement et expose les vues dérivées en HTTP.
 */

pub mod config;
pub mod fetch;
pub mod http;
pub mod placeholder;
pub mod refresh;

pub use config::{load_config, load_config_from, DashboardConfig, RefreshIntervals};
pub use fetch::{BackendClient, FetchError, FleetLoader, DASHBOARD_ERROR, MACHINES_ERROR};
pub use http::{build_router, AppState};
pub use refresh::{refresh_all, spawn_refresh_loops, DashboardHealth, RefreshTracker};
