use serde::{Deserialize, Serialize};
use std::fmt;

/// Provenance des données confiées au moteur
///
/// `Placeholder` signale un jeu de démonstration substitué après un échec de
/// fetch ; le moteur le traite exactement comme des données réelles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Live,
    Placeholder,
}

impl DataSource {
    pub fn is_placeholder(self) -> bool {
        matches!(self, DataSource::Placeholder)
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Live => f.write_str("live"),
            DataSource::Placeholder => f.write_str("placeholder"),
        }
    }
}
