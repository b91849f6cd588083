//! Filtres composés sur la collection de machines.
//!
//! Un [`FilterState`] est une simple valeur : changer une dimension produit
//! une nouvelle valeur au lieu de muter un état partagé. Une chaîne vide
//! signifie « pas de contrainte » sur la dimension.

use crate::error::CoreError;
use crate::models::Machine;
use crate::status::classify;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDimension {
    Os,
    Status,
    Search,
}

impl FilterDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterDimension::Os => "os",
            FilterDimension::Status => "status",
            FilterDimension::Search => "search",
        }
    }
}

impl fmt::Display for FilterDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterDimension {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "os" => Ok(FilterDimension::Os),
            "status" => Ok(FilterDimension::Status),
            "search" => Ok(FilterDimension::Search),
            other => Err(CoreError::UnknownDimension(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub search: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace une seule dimension, les deux autres restent intactes
    pub fn with_filter(mut self, dimension: FilterDimension, value: impl Into<String>) -> Self {
        *self.slot_mut(dimension) = value.into();
        self
    }

    /// Toutes les dimensions remises à vide d'un coup
    pub fn cleared(&self) -> Self {
        Self::default()
    }

    pub fn get(&self, dimension: FilterDimension) -> &str {
        match dimension {
            FilterDimension::Os => &self.os,
            FilterDimension::Status => &self.status,
            FilterDimension::Search => &self.search,
        }
    }

    fn slot_mut(&mut self, dimension: FilterDimension) -> &mut String {
        match dimension {
            FilterDimension::Os => &mut self.os,
            FilterDimension::Status => &mut self.status,
            FilterDimension::Search => &mut self.search,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.os.is_empty() && self.status.is_empty() && self.search.is_empty()
    }

    /// Vrai si la machine satisfait toutes les dimensions actives
    pub fn matches(&self, machine: &Machine, now: OffsetDateTime) -> bool {
        if !self.os.is_empty() && !contains_ignore_case(&machine.operating_system, &self.os) {
            return false;
        }

        // égalité exacte sur le statut dérivé, pas de sous-chaîne
        if !self.status.is_empty() && classify(machine, now).as_str() != self.status {
            return false;
        }

        if !self.search.is_empty()
            && !contains_ignore_case(&machine.hostname, &self.search)
            && !contains_ignore_case(&machine.machine_id, &self.search)
        {
            return false;
        }

        true
    }
}

/// Sous-séquence des machines qui passent le filtre, ordre d'origine conservé
pub fn filtered_view<'a>(machines: &'a [Machine], filter: &FilterState, now: OffsetDateTime) -> Vec<&'a Machine> {
    machines.iter().filter(|machine| filter.matches(machine, now)).collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Issue;
    use crate::status::DerivedStatus;
    use time::macros::datetime;
    use time::Duration;

    const NOW: OffsetDateTime = datetime!(2024-05-01 12:00:00 UTC);

    fn fleet() -> Vec<Machine> {
        let mut win = Machine::new("WIN-ABC123", "accounting-01", "Windows 11");
        win.last_check_in = Some(NOW - Duration::minutes(5));
        win.issues = vec![Issue::critical()];

        let mut mac = Machine::new("MAC-DEF456", "design-02", "macOS Sonoma");
        mac.last_check_in = Some(NOW - Duration::minutes(15));
        mac.issues = vec![Issue::warning()];

        let mut lin = Machine::new("LIN-GHI789", "build-linux-03", "Ubuntu Linux 22.04");
        lin.last_check_in = Some(NOW);

        let mut old = Machine::new("LIN-JKL012", "legacy-04", "Debian Linux");
        old.last_check_in = Some(NOW - Duration::hours(3));

        let mut win10 = Machine::new("WIN-MNO345", "reception-05", "Windows 10");
        win10.last_check_in = Some(NOW - Duration::minutes(1));
        win10.issues = vec![Issue::warning(), Issue::critical()];

        vec![win, mac, lin, old, win10]
    }

    fn ids(view: &[&Machine]) -> Vec<String> {
        view.iter().map(|m| m.machine_id.clone()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let machines = fleet();
        let view = filtered_view(&machines, &FilterState::new(), NOW);
        assert_eq!(view.len(), machines.len());
        assert!(view.iter().zip(machines.iter()).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_os_filter_case_insensitive_substring() {
        let machines = fleet();
        let filter = FilterState::new().with_filter(FilterDimension::Os, "LINUX");
        assert_eq!(ids(&filtered_view(&machines, &filter, NOW)), vec!["LIN-GHI789", "LIN-JKL012"]);
    }

    #[test]
    fn test_status_filter_matches_classification_in_order() {
        let machines = fleet();
        let filter = FilterState::new().with_filter(FilterDimension::Status, "critical");
        let view = filtered_view(&machines, &filter, NOW);
        assert_eq!(ids(&view), vec!["WIN-ABC123", "WIN-MNO345"]);
        assert!(view.iter().all(|m| classify(m, NOW) == DerivedStatus::Critical));

        let expected: Vec<&Machine> = machines
            .iter()
            .filter(|m| classify(m, NOW) == DerivedStatus::Critical)
            .collect();
        assert_eq!(view, expected);
    }

    #[test]
    fn test_status_filter_is_exact() {
        let machines = fleet();
        let filter = FilterState::new().with_filter(FilterDimension::Status, "crit");
        assert!(filtered_view(&machines, &filter, NOW).is_empty());
        let filter = FilterState::new().with_filter(FilterDimension::Status, "Critical");
        assert!(filtered_view(&machines, &filter, NOW).is_empty());
    }

    #[test]
    fn test_status_filter_uses_given_now() {
        let machines = fleet();
        let filter = FilterState::new().with_filter(FilterDimension::Status, "offline");
        assert_eq!(ids(&filtered_view(&machines, &filter, NOW)), vec!["LIN-JKL012"]);
        // deux heures plus tard, tout le monde est offline
        assert_eq!(filtered_view(&machines, &filter, NOW + Duration::hours(2)).len(), machines.len());
    }

    #[test]
    fn test_search_matches_machine_id_ignoring_case() {
        let machines = fleet();
        let filter = FilterState::new().with_filter(FilterDimension::Search, "WIN-ABC123");
        assert_eq!(ids(&filtered_view(&machines, &filter, NOW)), vec!["WIN-ABC123"]);
        let filter = FilterState::new().with_filter(FilterDimension::Search, "win-abc123");
        assert_eq!(ids(&filtered_view(&machines, &filter, NOW)), vec!["WIN-ABC123"]);
    }

    #[test]
    fn test_search_matches_hostname_or_id() {
        let machines = fleet();
        let filter = FilterState::new().with_filter(FilterDimension::Search, "design");
        assert_eq!(ids(&filtered_view(&machines, &filter, NOW)), vec!["MAC-DEF456"]);
        let filter = FilterState::new().with_filter(FilterDimension::Search, "lin");
        // "build-linux-03" par hostname, "LIN-JKL012" par identifiant
        assert_eq!(ids(&filtered_view(&machines, &filter, NOW)), vec!["LIN-GHI789", "LIN-JKL012"]);
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let machines = fleet();
        let filter = FilterState::new()
            .with_filter(FilterDimension::Os, "windows")
            .with_filter(FilterDimension::Status, "critical")
            .with_filter(FilterDimension::Search, "reception");
        assert_eq!(ids(&filtered_view(&machines, &filter, NOW)), vec!["WIN-MNO345"]);
    }

    #[test]
    fn test_cleared_returns_full_collection() {
        let machines = fleet();
        let filter = FilterState::new()
            .with_filter(FilterDimension::Os, "macos")
            .with_filter(FilterDimension::Search, "zzz");
        assert!(filtered_view(&machines, &filter, NOW).is_empty());

        let cleared = filter.cleared();
        assert!(cleared.is_empty());
        assert_eq!(filtered_view(&machines, &cleared, NOW).len(), machines.len());
    }

    #[test]
    fn test_with_filter_leaves_other_dimensions() {
        let filter = FilterState::new().with_filter(FilterDimension::Search, "abc");
        let filter = filter
            .with_filter(FilterDimension::Os, "linux")
            .with_filter(FilterDimension::Status, "healthy");
        assert_eq!(filter.get(FilterDimension::Search), "abc");
        assert_eq!(filter.os, "linux");
        assert_eq!(filter.status, "healthy");
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("os".parse::<FilterDimension>().unwrap(), FilterDimension::Os);
        assert!(matches!("owner".parse::<FilterDimension>(), Err(CoreError::UnknownDimension(_))));
    }
}
