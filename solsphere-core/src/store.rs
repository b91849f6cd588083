/**
 * FLEET STORE - Collection de machines interrogeable + état des filtres
 *
 * RÔLE : Détient le dernier inventaire et le dernier snapshot de conformité
 * livrés par le fetch, ainsi que le FilterState courant.
 *
 * FONCTIONNEMENT :
 * - Chaque refresh remplace la collection entière (pas de fusion incrémentale)
 * - Le remplacement est un échange d'Arc : un lecteur qui tient l'ancien
 *   snapshot continue de voir une vue cohérente
 * - Toutes les vues (filtres, résumé, pourcentage) sont recalculées à chaque
 *   lecture avec le `now` fourni par l'appelant
 */

use crate::compliance::{compute_percentage, ComplianceSnapshot};
use crate::filters::{filtered_view, FilterDimension, FilterState};
use crate::models::Machine;
use crate::source::DataSource;
use crate::status::{summarize_by_status, StatusCounts};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::debug;

/// Résultat d'un cycle de fetch tel que remis au store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loaded<T> {
    pub data: T,
    pub source: DataSource,
    /// Marqueur d'erreur du fetch, présent même si un placeholder a été substitué
    pub error: Option<String>,
    #[serde(serialize_with = "crate::timestamp::serialize_option")]
    pub loaded_at: Option<OffsetDateTime>,
}

impl<T> Loaded<T> {
    pub fn live(data: T, loaded_at: OffsetDateTime) -> Self {
        Self { data, source: DataSource::Live, error: None, loaded_at: Some(loaded_at) }
    }

    pub fn placeholder(data: T, error: impl Into<String>, loaded_at: OffsetDateTime) -> Self {
        Self {
            data,
            source: DataSource::Placeholder,
            error: Some(error.into()),
            loaded_at: Some(loaded_at),
        }
    }
}

impl<T: Default> Loaded<T> {
    pub fn empty() -> Self {
        Self { data: T::default(), source: DataSource::Live, error: None, loaded_at: None }
    }
}

/// Cellule partagée entre les boucles de refresh et les lecteurs
type Slot<T> = Arc<Mutex<T>>;

fn slot<T>(value: T) -> Slot<T> {
    Arc::new(Mutex::new(value))
}

#[derive(Clone)]
pub struct FleetStore {
    machines: Slot<Arc<Loaded<Vec<Machine>>>>,
    compliance: Slot<Arc<Loaded<ComplianceSnapshot>>>,
    filters: Slot<FilterState>,
}

impl FleetStore {
    pub fn new() -> Self {
        Self {
            machines: slot(Arc::new(Loaded::empty())),
            compliance: slot(Arc::new(Loaded::empty())),
            filters: slot(FilterState::new()),
        }
    }

    /// Snapshot courant de l'inventaire
    pub fn machines(&self) -> Arc<Loaded<Vec<Machine>>> {
        self.machines.lock().clone()
    }

    pub fn compliance(&self) -> Arc<Loaded<ComplianceSnapshot>> {
        self.compliance.lock().clone()
    }

    /// Vrai dès qu'un premier inventaire a été chargé
    pub fn is_populated(&self) -> bool {
        self.machines.lock().loaded_at.is_some()
    }

    pub fn replace_machines(&self, loaded: Loaded<Vec<Machine>>) {
        debug!(count = loaded.data.len(), source = %loaded.source, "replacing machine collection");
        *self.machines.lock() = Arc::new(loaded);
    }

    pub fn replace_compliance(&self, loaded: Loaded<ComplianceSnapshot>) {
        debug!(source = %loaded.source, "replacing compliance snapshot");
        *self.compliance.lock() = Arc::new(loaded);
    }

    pub fn filters(&self) -> FilterState {
        self.filters.lock().clone()
    }

    /// Change une seule dimension et retourne le nouvel état
    pub fn set_filter(&self, dimension: FilterDimension, value: impl Into<String>) -> FilterState {
        let mut guard = self.filters.lock();
        let next = guard.clone().with_filter(dimension, value);
        *guard = next.clone();
        next
    }

    pub fn clear_filters(&self) {
        let mut guard = self.filters.lock();
        *guard = guard.cleared();
    }

    /// Vue filtrée avec le FilterState courant
    pub fn filtered(&self, now: OffsetDateTime) -> Vec<Machine> {
        self.filtered_with(&self.filters(), now)
    }

    pub fn filtered_with(&self, filter: &FilterState, now: OffsetDateTime) -> Vec<Machine> {
        let snapshot = self.machines();
        filtered_view(&snapshot.data, filter, now).into_iter().cloned().collect()
    }

    pub fn summary(&self, now: OffsetDateTime) -> StatusCounts {
        summarize_by_status(&self.machines().data, now)
    }

    pub fn compliance_percentage(&self) -> u8 {
        compute_percentage(&self.compliance().data)
    }

    pub fn machine(&self, machine_id: &str) -> Option<Machine> {
        self.machines().data.iter().find(|m| m.machine_id == machine_id).cloned()
    }
}

impl Default for FleetStore {
    fn default() -> Self {
        Self::new()
    }
}
