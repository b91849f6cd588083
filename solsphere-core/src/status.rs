//! Classification santé des machines.
//!
//! Le statut n'est jamais stocké : il est dérivé de `(last_check_in, issues)`
//! et d'un `now` explicite à chaque lecture. Deux lectures à des instants
//! différents peuvent donc diverger sans que l'enregistrement change.

use crate::error::CoreError;
use crate::models::Machine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// Au-delà de ce délai sans check-in, une machine est considérée offline
pub const OFFLINE_AFTER: Duration = Duration::hours(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivedStatus {
    Healthy,
    Warning,
    Critical,
    Offline,
}

impl DerivedStatus {
    pub const ALL: [DerivedStatus; 4] = [
        DerivedStatus::Healthy,
        DerivedStatus::Warning,
        DerivedStatus::Critical,
        DerivedStatus::Offline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DerivedStatus::Healthy => "healthy",
            DerivedStatus::Warning => "warning",
            DerivedStatus::Critical => "critical",
            DerivedStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DerivedStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DerivedStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// Classe une machine, première règle applicable gagnante :
/// offline, puis critical, puis warning, sinon healthy.
///
/// Une machine qui n'a jamais fait de check-in n'est jamais offline : elle
/// est classée sur ses seuls problèmes.
pub fn classify(machine: &Machine, now: OffsetDateTime) -> DerivedStatus {
    if let Some(last) = machine.last_check_in {
        if now - last > OFFLINE_AFTER {
            return DerivedStatus::Offline;
        }
    }

    if machine.has_critical_issue() {
        DerivedStatus::Critical
    } else if !machine.issues.is_empty() {
        DerivedStatus::Warning
    } else {
        DerivedStatus::Healthy
    }
}

/// Compteurs par statut, les quatre catégories toujours présentes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    pub offline: usize,
}

impl StatusCounts {
    pub fn get(&self, status: DerivedStatus) -> usize {
        match status {
            DerivedStatus::Healthy => self.healthy,
            DerivedStatus::Warning => self.warning,
            DerivedStatus::Critical => self.critical,
            DerivedStatus::Offline => self.offline,
        }
    }

    fn bump(&mut self, status: DerivedStatus) {
        match status {
            DerivedStatus::Healthy => self.healthy += 1,
            DerivedStatus::Warning => self.warning += 1,
            DerivedStatus::Critical => self.critical += 1,
            DerivedStatus::Offline => self.offline += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.healthy + self.warning + self.critical + self.offline
    }

    pub fn iter(&self) -> impl Iterator<Item = (DerivedStatus, usize)> + '_ {
        DerivedStatus::ALL.into_iter().map(move |status| (status, self.get(status)))
    }
}

pub fn summarize_by_status(machines: &[Machine], now: OffsetDateTime) -> StatusCounts {
    machines.iter().fold(StatusCounts::default(), |mut counts, machine| {
        counts.bump(classify(machine, now));
        counts
    })
}
