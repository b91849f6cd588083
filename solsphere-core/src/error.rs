use thiserror::Error;

/// Erreurs du moteur de dérivation
///
/// Les fonctions de classification et de filtrage sont totales : seules les
/// conversions depuis du texte libre et l'export CSV peuvent échouer.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown status: {0}")]
    UnknownStatus(String),
    #[error("unknown filter dimension: {0}")]
    UnknownDimension(String),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
