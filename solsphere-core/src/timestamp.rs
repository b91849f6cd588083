//! Lecture tolérante des horodatages de check-in.
//!
//! Le backend émet du RFC 3339 ou de l'ISO-8601 naïf (sans offset), lu
//! comme UTC. Une valeur illisible devient `None` : un enregistrement
//! abîmé ne fait jamais échouer tout un fetch.

use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

/// Parse un horodatage backend, `None` si illisible
pub fn parse(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(ts);
    }
    // naive "2024-05-01T10:00:00[.ffffff]" -> UTC
    OffsetDateTime::parse(&format!("{raw}Z"), &Rfc3339).ok()
}

pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let parsed = parse(&s);
        if parsed.is_none() {
            warn!(value = %s, "unparseable check-in timestamp, treating as absent");
        }
        parsed
    }))
}

pub fn serialize_option<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => {
            let txt = ts.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
            serializer.serialize_some(&txt)
        }
        None => serializer.serialize_none(),
    }
}
