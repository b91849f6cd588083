/*!
Fixtures machines pour les tests

`MachineBuilder` évite de répéter les dix champs de télémétrie ; les
check-ins sont toujours exprimés relativement à un `now` fourni.
*/

use solsphere_core::{Issue, Machine, Severity};
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone)]
pub struct MachineBuilder {
    machine: Machine,
}

impl MachineBuilder {
    pub fn new(machine_id: &str) -> Self {
        let hostname = machine_id.to_lowercase();
        Self { machine: Machine::new(machine_id, hostname, "Linux") }
    }

    pub fn hostname(mut self, hostname: &str) -> Self {
        self.machine.hostname = hostname.to_string();
        self
    }

    pub fn os(mut self, operating_system: &str) -> Self {
        self.machine.operating_system = operating_system.to_string();
        self
    }

    pub fn checked_in_at(mut self, at: OffsetDateTime) -> Self {
        self.machine.last_check_in = Some(at);
        self
    }

    pub fn checked_in_ago(self, now: OffsetDateTime, ago: Duration) -> Self {
        self.checked_in_at(now - ago)
    }

    pub fn never_checked_in(mut self) -> Self {
        self.machine.last_check_in = None;
        self
    }

    pub fn issue(mut self, severity: Severity, message: &str) -> Self {
        self.machine.issues.push(Issue::new(severity).with_message(message));
        self
    }

    pub fn critical(self, message: &str) -> Self {
        self.issue(Severity::Critical, message)
    }

    pub fn warning(self, message: &str) -> Self {
        self.issue(Severity::Warning, message)
    }

    /// Drapeaux de conformité dans l'ordre disque, mises à jour, antivirus, veille
    pub fn compliance(mut self, disk: bool, updates: bool, antivirus: bool, sleep: bool) -> Self {
        self.machine.disk_encrypted = disk;
        self.machine.os_up_to_date = updates;
        self.machine.antivirus_active = antivirus;
        self.machine.sleep_settings_compliant = sleep;
        self
    }

    pub fn fully_compliant(self) -> Self {
        self.compliance(true, true, true, true)
    }

    pub fn build(self) -> Machine {
        self.machine
    }
}

/// Flotte de référence : 2 healthy, 1 warning, 1 critical, 1 offline
pub fn sample_fleet(now: OffsetDateTime) -> Vec<Machine> {
    vec![
        MachineBuilder::new("WIN-ABC123")
            .hostname("accounting-01")
            .os("Windows 11")
            .checked_in_ago(now, Duration::minutes(5))
            .fully_compliant()
            .build(),
        MachineBuilder::new("MAC-DEF456")
            .hostname("design-02")
            .os("macOS Sonoma")
            .checked_in_ago(now, Duration::minutes(20))
            .warning("Disk encryption disabled")
            .compliance(false, true, true, true)
            .build(),
        MachineBuilder::new("LIN-GHI789")
            .hostname("build-linux-03")
            .os("Ubuntu Linux 22.04")
            .checked_in_ago(now, Duration::minutes(2))
            .critical("Antivirus not running")
            .compliance(true, true, false, true)
            .build(),
        MachineBuilder::new("LIN-JKL012")
            .hostname("legacy-04")
            .os("Debian Linux")
            .checked_in_ago(now, Duration::hours(3))
            .compliance(false, false, true, false)
            .build(),
        MachineBuilder::new("WIN-MNO345")
            .hostname("reception-05")
            .os("Windows 10")
            .checked_in_ago(now, Duration::minutes(45))
            .fully_compliant()
            .build(),
    ]
}
