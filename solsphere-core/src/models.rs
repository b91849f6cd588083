use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Snapshot en lecture seule d'une machine telle que fournie par le backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub machine_id: String,
    pub hostname: String,
    pub operating_system: String,
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        serialize_with = "crate::timestamp::serialize_option"
    )]
    pub last_check_in: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub issues: Vec<Issue>,

    // Télémétrie complémentaire, sans effet sur la classification
    #[serde(default)]
    pub os_version: Option<String>,
    #[serde(default)]
    pub disk_encrypted: bool,
    #[serde(default)]
    pub os_up_to_date: bool,
    #[serde(default)]
    pub antivirus_active: bool,
    #[serde(default)]
    pub sleep_settings_compliant: bool,
    #[serde(default)]
    pub cpu_usage: Option<u8>,
    #[serde(default)]
    pub memory_usage: Option<u8>,
    #[serde(default)]
    pub disk_usage: Option<u8>,
    #[serde(default)]
    pub network_status: Option<String>,
}

impl Machine {
    pub fn new(machine_id: impl Into<String>, hostname: impl Into<String>, operating_system: impl Into<String>) -> Self {
        Self {
            machine_id: machine_id.into(),
            hostname: hostname.into(),
            operating_system: operating_system.into(),
            last_check_in: None,
            issues: Vec::new(),
            os_version: None,
            disk_encrypted: false,
            os_up_to_date: false,
            antivirus_active: false,
            sleep_settings_compliant: false,
            cpu_usage: None,
            memory_usage: None,
            disk_usage: None,
            network_status: None,
        }
    }

    pub fn has_critical_issue(&self) -> bool {
        self.issues.iter().any(|issue| issue.severity.is_critical())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Absente ou `null` : sévérité vide, donc non critique
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity: Severity,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(
        default,
        deserialize_with = "crate::timestamp::deserialize_option",
        serialize_with = "crate::timestamp::serialize_option"
    )]
    pub timestamp: Option<OffsetDateTime>,
    #[serde(default)]
    pub resolved: bool,
}

impl Issue {
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            id: None,
            message: None,
            details: None,
            timestamp: None,
            resolved: false,
        }
    }

    pub fn critical() -> Self {
        Self::new(Severity::Critical)
    }

    pub fn warning() -> Self {
        Self::new(Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Sévérité d'un problème remonté par la télémétrie
///
/// Seul `critical` a un sens particulier pour la classification ; toute
/// autre valeur est conservée telle quelle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Other(String),
}

impl Severity {
    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Critical)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Other(s) => s,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Other(String::new())
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.as_str() {
            "critical" => Severity::Critical,
            "warning" => Severity::Warning,
            "info" => Severity::Info,
            _ => Severity::Other(value),
        }
    }
}

impl From<&str> for Severity {
    fn from(value: &str) -> Self {
        Severity::from(value.to_string())
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_deserialize_backend_machine() {
        let json = r#"{
            "machine_id": "WIN-ABC123",
            "hostname": "accounting-01",
            "operating_system": "Windows",
            "os_version": "10.0.22631",
            "disk_encrypted": true,
            "last_check_in": "2024-05-01T10:00:00",
            "issues": [{"id": "1", "severity": "critical", "message": "Disk almost full"}],
            "created_at": "2024-01-01T00:00:00",
            "updated_at": "2024-05-01T10:00:00"
        }"#;
        let machine: Machine = serde_json::from_str(json).unwrap();
        assert_eq!(machine.machine_id, "WIN-ABC123");
        assert_eq!(machine.last_check_in, Some(datetime!(2024-05-01 10:00:00 UTC)));
        assert!(machine.disk_encrypted);
        assert!(!machine.antivirus_active);
        assert_eq!(machine.issues.len(), 1);
        assert!(machine.has_critical_issue());
    }

    #[test]
    fn test_missing_optional_fields() {
        let json = r#"{"machine_id": "m1", "hostname": "h1", "operating_system": "Linux", "issues": null, "last_check_in": null}"#;
        let machine: Machine = serde_json::from_str(json).unwrap();
        assert!(machine.issues.is_empty());
        assert!(machine.last_check_in.is_none());

        let json = r#"{"machine_id": "m2", "hostname": "h2", "operating_system": "macOS"}"#;
        let machine: Machine = serde_json::from_str(json).unwrap();
        assert!(machine.issues.is_empty());
        assert!(machine.last_check_in.is_none());
    }

    #[test]
    fn test_unknown_severity_preserved() {
        let issue: Issue = serde_json::from_str(r#"{"severity": "notice"}"#).unwrap();
        assert_eq!(issue.severity, Severity::Other("notice".into()));
        assert!(!issue.severity.is_critical());
        assert_eq!(serde_json::to_value(&issue.severity).unwrap(), "notice");
    }

    #[test]
    fn test_issue_without_severity_is_not_critical() {
        let json = r#"[
            {"machine_id": "m1", "hostname": "h1", "operating_system": "Linux",
             "issues": [{"type": "os_updates", "message": "Updates pending"}]},
            {"machine_id": "m2", "hostname": "h2", "operating_system": "Linux",
             "issues": [{"severity": null}]}
        ]"#;
        let machines: Vec<Machine> = serde_json::from_str(json).unwrap();
        assert_eq!(machines.len(), 2);
        assert_eq!(machines[0].issues[0].severity, Severity::default());
        assert_eq!(machines[0].issues[0].message.as_deref(), Some("Updates pending"));
        assert!(!machines[0].has_critical_issue());
        assert!(!machines[1].has_critical_issue());
    }
}
