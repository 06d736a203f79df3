#![forbid(unsafe_code)]

//! Error taxonomy for the localization engine.
//!
//! Only two things are fatal: a missing or malformed localization index.
//! Per-file problems during a load are swallowed (and surfaced through the
//! missing-data report when auditing is on), and safe-mode lookups never
//! return an error at all.

use thiserror::Error;

use crate::assets::AssetError;

pub type Result<T> = std::result::Result<T, GlossaError>;

#[derive(Debug, Error)]
pub enum GlossaError {
    /// The localization index resource could not be loaded. Fatal.
    #[error("could not load localization index '{path}': {source}")]
    ManifestLoad {
        path: String,
        #[source]
        source: AssetError,
    },

    /// The localization index was loaded but could not be parsed. Fatal.
    #[error("malformed localization index: {0}")]
    ManifestParse(String),

    /// A delimited cell was opened with a double quote that never closes.
    #[error("unterminated quoted cell in delimited data")]
    UnterminatedQuote,

    /// Lookup was made against a context (table id) that was never loaded.
    /// Surfaced only by unsafe lookups; safe lookups degrade instead.
    #[error("no localization context named '{context}'")]
    ContextNotFound { context: String },

    /// `init` or a group switch was requested while a load is in flight.
    #[error("a locale load is already in flight")]
    LoadInProgress,

    /// A lookup or group switch was requested before any `init` call.
    #[error("the localization engine has not been initialized")]
    NotInitialized,

    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[cfg(test)]
mod tests {
    use super::GlossaError;

    #[test]
    fn context_not_found_names_the_context() {
        let error = GlossaError::ContextNotFound {
            context: "menus".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "no localization context named 'menus'"
        );
    }

    #[test]
    fn manifest_parse_carries_reason() {
        let error = GlossaError::ManifestParse("missing <data> root".to_string());
        assert!(error.to_string().contains("missing <data> root"));
    }
}
