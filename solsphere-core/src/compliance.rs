//! Agrégation de la conformité.

use crate::models::Machine;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComplianceDimension {
    DiskEncryption,
    OsUpdates,
    Antivirus,
    SleepSettings,
}

impl ComplianceDimension {
    pub const ALL: [ComplianceDimension; 4] = [
        ComplianceDimension::DiskEncryption,
        ComplianceDimension::OsUpdates,
        ComplianceDimension::Antivirus,
        ComplianceDimension::SleepSettings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceDimension::DiskEncryption => "diskEncryption",
            ComplianceDimension::OsUpdates => "osUpdates",
            ComplianceDimension::Antivirus => "antivirus",
            ComplianceDimension::SleepSettings => "sleepSettings",
        }
    }

    /// La machine est-elle conforme sur cette dimension ?
    pub fn is_compliant(self, machine: &Machine) -> bool {
        match self {
            ComplianceDimension::DiskEncryption => machine.disk_encrypted,
            ComplianceDimension::OsUpdates => machine.os_up_to_date,
            ComplianceDimension::Antivirus => machine.antivirus_active,
            ComplianceDimension::SleepSettings => machine.sleep_settings_compliant,
        }
    }
}

impl fmt::Display for ComplianceDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nombre de machines conformes par dimension, remplacé en bloc à chaque refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSnapshot {
    #[serde(alias = "disk_encryption")]
    pub disk_encryption: u64,
    #[serde(alias = "os_updates")]
    pub os_updates: u64,
    pub antivirus: u64,
    #[serde(alias = "sleep_settings")]
    pub sleep_settings: u64,
}

impl ComplianceSnapshot {
    pub fn new(disk_encryption: u64, os_updates: u64, antivirus: u64, sleep_settings: u64) -> Self {
        Self { disk_encryption, os_updates, antivirus, sleep_settings }
    }

    pub fn count(&self, dimension: ComplianceDimension) -> u64 {
        match dimension {
            ComplianceDimension::DiskEncryption => self.disk_encryption,
            ComplianceDimension::OsUpdates => self.os_updates,
            ComplianceDimension::Antivirus => self.antivirus,
            ComplianceDimension::SleepSettings => self.sleep_settings,
        }
    }

    pub fn total(&self) -> u128 {
        ComplianceDimension::ALL
            .into_iter()
            .map(|d| u128::from(self.count(d)))
            .sum()
    }

    /// Compte les machines conformes sur chaque dimension
    pub fn from_machines(machines: &[Machine]) -> Self {
        let tally = |dimension: ComplianceDimension| {
            machines.iter().filter(|m| dimension.is_compliant(m)).count() as u64
        };
        Self {
            disk_encryption: tally(ComplianceDimension::DiskEncryption),
            os_updates: tally(ComplianceDimension::OsUpdates),
            antivirus: tally(ComplianceDimension::Antivirus),
            sleep_settings: tally(ComplianceDimension::SleepSettings),
        }
    }
}

/// Pourcentage global de conformité, entier dans [0, 100].
///
/// Le numérateur ne prend que le chiffrement disque et l'antivirus alors que
/// le dénominateur somme les quatre dimensions. Comportement conservé tel
/// quel en attendant une clarification produit.
pub fn compute_percentage(snapshot: &ComplianceSnapshot) -> u8 {
    let total = snapshot.total();
    if total == 0 {
        return 0;
    }
    let compliant = u128::from(snapshot.disk_encryption) + u128::from(snapshot.antivirus);
    let ratio = compliant as f64 / total as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
