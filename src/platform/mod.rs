// =============================================================================
// platform/mod.rs - Services propres à chaque système
// platform/mod.rs - Per-OS services
// =============================================================================

use crate::config::RunOptions;
use crate::error::{MagnifierError, Result};
use crate::service::DisplayGeometry;
use crate::transform::TransformEngine;

/// Implémentation Windows (API Magnification)
/// Windows implementation (Magnification API)
#[cfg(target_os = "windows")]
pub mod windows;

/// Autres systèmes : pas de primitive de loupe plein écran
/// Other systems: no full-screen magnification primitive
#[cfg(not(target_os = "windows"))]
pub mod unsupported;

// =============================================================================
// FONCTIONS PUBLIQUES
// PUBLIC FUNCTIONS
// =============================================================================

/// Taille de l'écran principal
/// Primary screen size
pub fn screen_size() -> Result<DisplayGeometry> {
    #[cfg(target_os = "windows")]
    {
        windows::screen_size()
    }

    #[cfg(not(target_os = "windows"))]
    {
        unsupported::screen_size()
    }
}

/// Lance la loupe jusqu'à la demande de sortie
/// Runs the magnifier until exit is requested
pub fn run(options: &RunOptions) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        windows::run(options)
    }

    #[cfg(not(target_os = "windows"))]
    {
        unsupported::run(options)
    }
}

// =============================================================================
// DÉMARRAGE ET BOUCLE
// STARTUP AND LOOP
// =============================================================================

/// Vérifie les options pour cet écran avant de prendre la moindre ressource
/// Checks the options against this screen before acquiring any resource
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub(crate) fn validate(options: &RunOptions, geometry: DisplayGeometry) -> Result<()> {
    TransformEngine::new(&options.magnifier, geometry).map(drop)
}

/// Retour de `GetMessage` : > 0 message, 0 WM_QUIT, -1 échec
/// `GetMessage` result: > 0 message, 0 WM_QUIT, -1 failure
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Pump {
    Message,
    Quit,
    Failed,
}

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub(crate) fn pump(ret: i32) -> Pump {
    match ret {
        0 => Pump::Quit,
        r if r < 0 => Pump::Failed,
        _ => Pump::Message,
    }
}

/// Affiche une erreur fatale à l'utilisateur (boîte de dialogue sous Windows)
/// Shows a fatal error to the user (message box on Windows)
pub fn report_fatal(error: &MagnifierError) {
    #[cfg(target_os = "windows")]
    {
        windows::report_fatal(error)
    }

    #[cfg(not(target_os = "windows"))]
    {
        let _ = error; // stderr suffit / stderr is enough
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::MagnifierConfig;
    use crate::hotkey::Hotkey;

    fn options(dead_zone: u32) -> RunOptions {
        RunOptions {
            magnifier: MagnifierConfig::new(2.0, dead_zone).unwrap(),
            hotkey: "M-1".parse::<Hotkey>().unwrap(),
            tick_interval: Duration::from_millis(8),
            cooldown: Duration::ZERO,
        }
    }

    #[test]
    fn test_validate_rejects_dead_zone_before_startup() {
        let geometry = DisplayGeometry::new(1920, 1080).unwrap();
        assert!(validate(&options(200), geometry).is_ok());
        assert!(matches!(
            validate(&options(540), geometry),
            Err(MagnifierError::Configuration(_))
        ));
    }

    #[test]
    fn test_pump_distinguishes_failure_from_quit() {
        assert_eq!(pump(1), Pump::Message);
        assert_eq!(pump(0), Pump::Quit);
        assert_eq!(pump(-1), Pump::Failed);
    }
}
