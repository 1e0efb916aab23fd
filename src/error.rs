// =============================================================================
// error.rs - Erreurs de la loupe
// error.rs - Magnifier errors
// =============================================================================

use crate::hotkey::HotkeyError;

/// Erreurs produites par la loupe
/// Errors produced by the magnifier
///
/// Les erreurs de configuration et de service arrêtent le démarrage ;
/// les erreurs de commande sont ignorées au tick suivant.
/// Configuration and service errors abort startup;
/// command errors are dropped and retried on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum MagnifierError {
    /// Paramètres invalides détectés à la construction
    /// Invalid parameters detected at construction
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invalid hotkey: {0}")]
    Hotkey(#[from] HotkeyError),

    /// Le service de loupe n'a pas pu démarrer
    /// The magnification service could not start
    #[error("magnification service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Une commande envoyée au service a échoué (non fatal)
    /// A command sent to the service failed (non-fatal)
    #[error("{command} failed: {reason}")]
    CommandFailed {
        command: &'static str,
        reason: String,
    },

    #[error("tick source error: {0}")]
    TickSource(String),

    #[error("cursor position unavailable: {0}")]
    PointerQuery(String),

    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}

impl MagnifierError {
    /// Vrai si l'erreur doit arrêter le processus
    /// True if the error must stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Hotkey(_) | Self::ServiceUnavailable(_)
        )
    }
}

pub type Result<T, E = MagnifierError> = std::result::Result<T, E>;
