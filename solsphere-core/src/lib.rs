/*!
# Solsphere Core - Moteur de dérivation de la santé de flotte

Logique pure, synchrone et sans effet de bord au-dessus de données déjà en
mémoire :
- classification santé d'une machine (`healthy`, `warning`, `critical`, `offline`)
- agrégation de la conformité en un pourcentage unique
- filtres composés (OS, statut, recherche) sur la collection
- store de flotte remplacé en bloc à chaque refresh

Le temps courant est toujours un paramètre explicite.
*/

pub mod compliance;
pub mod error;
pub mod filters;
pub mod models;
pub mod report;
pub mod source;
pub mod status;
pub mod store;
pub mod timestamp;

pub use compliance::{compute_percentage, ComplianceDimension, ComplianceSnapshot};
pub use error::CoreError;
pub use filters::{filtered_view, FilterDimension, FilterState};
pub use models::{Issue, Machine, Severity};
pub use report::{export_csv, os_distribution, FleetStats, OsShare};
pub use source::DataSource;
pub use status::{classify, summarize_by_status, DerivedStatus, StatusCounts, OFFLINE_AFTER};
pub use store::{FleetStore, Loaded};
