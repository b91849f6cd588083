//! Jeu de démonstration servi quand le backend est injoignable.
//!
//! Les check-ins sont relatifs à `now` : la flotte de démo montre toujours
//! au moins une machine par statut.

use solsphere_core::{ComplianceSnapshot, Issue, Machine, Severity};
use time::{Duration, OffsetDateTime};

struct Demo {
    id: &'static str,
    hostname: &'static str,
    os: &'static str,
    checked_in_minutes_ago: Option<i64>,
    issue: Option<(Severity, &'static str)>,
    compliance: [bool; 4],
}

const DEMO_FLEET: [Demo; 6] = [
    Demo {
        id: "WIN-ABC123",
        hostname: "accounting-01",
        os: "Windows 11",
        checked_in_minutes_ago: Some(5),
        issue: None,
        compliance: [true, true, true, true],
    },
    Demo {
        id: "MAC-DEF456",
        hostname: "design-02",
        os: "macOS",
        checked_in_minutes_ago: Some(15),
        issue: Some((Severity::Warning, "Disk encryption disabled")),
        compliance: [false, true, true, true],
    },
    Demo {
        id: "LIN-GHI789",
        hostname: "build-03",
        os: "Linux",
        checked_in_minutes_ago: Some(30),
        issue: None,
        compliance: [true, true, true, false],
    },
    Demo {
        id: "WIN-JKL012",
        hostname: "reception-04",
        os: "Windows 10",
        checked_in_minutes_ago: Some(2),
        issue: Some((Severity::Critical, "Antivirus not running")),
        compliance: [true, false, false, true],
    },
    Demo {
        id: "LIN-MNO345",
        hostname: "legacy-05",
        os: "Linux",
        checked_in_minutes_ago: Some(180),
        issue: None,
        compliance: [false, false, true, false],
    },
    Demo {
        id: "MAC-PQR678",
        hostname: "new-hire-06",
        os: "macOS",
        checked_in_minutes_ago: None,
        issue: None,
        compliance: [false, false, false, false],
    },
];

pub fn fleet(now: OffsetDateTime) -> Vec<Machine> {
    DEMO_FLEET
        .iter()
        .map(|demo| {
            let mut machine = Machine::new(demo.id, demo.hostname, demo.os);
            machine.last_check_in = demo.checked_in_minutes_ago.map(|m| now - Duration::minutes(m));
            if let Some((severity, message)) = &demo.issue {
                machine.issues.push(Issue::new(severity.clone()).with_message(*message));
            }
            let [disk, updates, antivirus, sleep] = demo.compliance;
            machine.disk_encrypted = disk;
            machine.os_up_to_date = updates;
            machine.antivirus_active = antivirus;
            machine.sleep_settings_compliant = sleep;
            machine
        })
        .collect()
}

pub fn compliance(now: OffsetDateTime) -> ComplianceSnapshot {
    ComplianceSnapshot::from_machines(&fleet(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solsphere_core::{summarize_by_status, StatusCounts};
    use time::macros::datetime;

    #[test]
    fn test_demo_fleet_covers_every_status() {
        let now = datetime!(2024-05-01 12:00:00 UTC);
        let counts = summarize_by_status(&fleet(now), now);
        assert_eq!(counts, StatusCounts { healthy: 3, warning: 1, critical: 1, offline: 1 });
    }

    #[test]
    fn test_compliance_matches_fleet() {
        let now = datetime!(2024-05-01 12:00:00 UTC);
        assert_eq!(compliance(now), ComplianceSnapshot::new(3, 3, 4, 3));
    }
}
