//! Rapports du dashboard dérivés de la flotte : statistiques, répartition
//! par OS et export CSV.

use crate::error::CoreError;
use crate::models::Machine;
use crate::status::{classify, StatusCounts};
use serde::Serialize;
use std::collections::HashMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FleetStats {
    pub total_machines: usize,
    pub healthy_machines: usize,
    pub warning_machines: usize,
    pub critical_machines: usize,
    pub offline_machines: usize,
}

impl FleetStats {
    pub fn from_counts(counts: &StatusCounts) -> Self {
        Self {
            total_machines: counts.total(),
            healthy_machines: counts.healthy,
            warning_machines: counts.warning,
            critical_machines: counts.critical,
            offline_machines: counts.offline,
        }
    }

    /// Part de machines saines, arrondie à deux décimales (0 si flotte vide)
    pub fn healthy_rate(&self) -> f64 {
        if self.total_machines == 0 {
            return 0.0;
        }
        let rate = self.healthy_machines as f64 / self.total_machines as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsShare {
    pub name: String,
    pub count: usize,
    pub percentage: u8,
}

/// Répartition par système d'exploitation, du plus représenté au moins représenté
pub fn os_distribution(machines: &[Machine]) -> Vec<OsShare> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for machine in machines {
        *counts.entry(machine.operating_system.as_str()).or_insert(0) += 1;
    }

    let total = machines.len();
    let mut shares: Vec<OsShare> = counts
        .into_iter()
        .map(|(name, count)| OsShare {
            name: name.to_string(),
            count,
            percentage: (count as f64 / total as f64 * 100.0).round() as u8,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    shares
}

const CSV_HEADER: [&str; 9] = [
    "Machine ID",
    "Hostname",
    "OS",
    "Status",
    "Last Check-in",
    "Disk Encrypted",
    "OS Updated",
    "Antivirus Active",
    "Sleep Compliant",
];

/// Export CSV de l'inventaire, statut dérivé au moment `now`
pub fn export_csv(machines: &[Machine], now: OffsetDateTime) -> Result<String, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for machine in machines {
        let last_check_in = match machine.last_check_in {
            Some(ts) => ts.format(&Rfc3339).unwrap_or_default(),
            None => String::new(),
        };
        writer.write_record([
            machine.machine_id.as_str(),
            machine.hostname.as_str(),
            machine.operating_system.as_str(),
            classify(machine, now).as_str(),
            last_check_in.as_str(),
            bool_cell(machine.disk_encrypted),
            bool_cell(machine.os_up_to_date),
            bool_cell(machine.antivirus_active),
            bool_cell(machine.sleep_settings_compliant),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

fn bool_cell(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
