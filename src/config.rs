//! Configuration de la loupe et constantes par défaut
//! Magnifier configuration and default constants
//!
//! Rien n'est lu ni écrit sur disque : les valeurs viennent de la ligne de
//! commande et sont figées une fois la loupe construite.
//! Nothing is read from or written to disk: values come from the command line
//! and are frozen once the magnifier is built.

use std::time::Duration;

use serde::Serialize;

use crate::error::{MagnifierError, Result};
use crate::hotkey::Hotkey;

/// Facteur de zoom par défaut
/// Default zoom factor
pub const DEFAULT_ZOOM_LEVEL: f64 = 1.5;

/// Marge (en pixels) près des bords où le mouvement du curseur est bloqué
/// Margin (in pixels) near the edges where cursor motion is clamped
pub const DEFAULT_DEAD_ZONE: u32 = 200;

/// Intervalle entre deux rafraîchissements (~ une image à 120 Hz)
/// Interval between two refreshes (~ one frame at 120 Hz)
pub const DEFAULT_TICK_MS: u64 = 8;

/// Raccourci par défaut : Alt+1
/// Default hotkey: Alt+1
pub const DEFAULT_HOTKEY: &str = "M-1";

/// Variable d'environnement du filtre de journalisation
/// Environment variable holding the log filter
pub const LOG_ENV: &str = "MAGNI_LOG";

/// Zoom appliqué lorsque la loupe est désactivée
/// Zoom applied when magnification is turned off
pub const UNMAGNIFIED_ZOOM: f64 = 1.0;

/// Paramètres immuables de la loupe
/// Immutable magnifier parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MagnifierConfig {
    /// Facteur de zoom, strictement supérieur à 1.0
    /// Zoom factor, strictly greater than 1.0
    zoom_level: f64,

    /// Zone morte en pixels
    /// Dead zone in pixels
    dead_zone: u32,

    /// Redirige la souris vers la zone agrandie (nécessite uiAccess)
    /// Redirects pointer input into the magnified area (requires uiAccess)
    redirect_input: bool,
}

impl MagnifierConfig {
    /// Crée une configuration après validation du zoom
    /// Creates a configuration after validating the zoom
    ///
    /// La zone morte dépend de la taille de l'écran ; elle est validée par
    /// [`crate::transform::TransformEngine::new`].
    /// The dead zone depends on the screen size; it is validated by
    /// [`crate::transform::TransformEngine::new`].
    pub fn new(zoom_level: f64, dead_zone: u32) -> Result<Self> {
        if !zoom_level.is_finite() || zoom_level <= UNMAGNIFIED_ZOOM {
            return Err(MagnifierError::Configuration(format!(
                "zoom level must be a finite number greater than 1.0, got {zoom_level}"
            )));
        }

        Ok(Self {
            zoom_level,
            dead_zone,
            redirect_input: true,
        })
    }

    pub fn with_input_redirect(mut self, redirect_input: bool) -> Self {
        self.redirect_input = redirect_input;
        self
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn dead_zone(&self) -> u32 {
        self.dead_zone
    }

    pub fn redirect_input(&self) -> bool {
        self.redirect_input
    }
}

impl Default for MagnifierConfig {
    fn default() -> Self {
        Self {
            zoom_level: DEFAULT_ZOOM_LEVEL,
            dead_zone: DEFAULT_DEAD_ZONE,
            redirect_input: true,
        }
    }
}

/// Tout ce qu'il faut pour lancer la loupe
/// Everything needed to launch the magnifier
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub magnifier: MagnifierConfig,
    pub hotkey: Hotkey,
    pub tick_interval: Duration,
    pub cooldown: Duration,
}
