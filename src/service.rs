// =============================================================================
// service.rs - Services externes utilisés par le contrôleur
// service.rs - External services used by the controller
// =============================================================================
//
// Le contrôleur ne connaît que ces traits ; chaque plateforme les implémente.
// The controller only knows these traits; each platform implements them.

use std::time::Duration;

use serde::Serialize;

use crate::error::{MagnifierError, Result};

// =============================================================================
// GÉOMÉTRIE
// GEOMETRY
// =============================================================================

/// Taille de l'écran principal, lue une fois au démarrage
/// Primary screen size, read once at startup
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayGeometry {
    pub width: i32,
    pub height: i32,
}

impl DisplayGeometry {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(MagnifierError::Configuration(format!(
                "display size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

/// Coin supérieur gauche de la vue agrandie
/// Top-left corner of the magnified view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ViewportOrigin {
    pub x: i32,
    pub y: i32,
}

/// Rectangle en coordonnées écran (bords droit/bas exclus)
/// Rectangle in screen coordinates (right/bottom edges exclusive)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

// =============================================================================
// TRAITS
// =============================================================================

/// Primitive de loupe plein écran fournie par le système
/// Full-screen magnification primitive provided by the OS
///
/// L'implémentation acquiert le service à sa création et le libère dans
/// `Drop` ; il n'existe pas de réinitialisation manuelle.
/// Implementations acquire the service when created and release it in
/// `Drop`; there is no manual re-initialization path.
pub trait MagnificationService {
    /// Applique le zoom et l'origine de la vue
    /// Applies zoom and view origin
    fn set_fullscreen_transform(&mut self, zoom: f64, x: i32, y: i32) -> Result<()>;

    /// Fait correspondre `source` (non agrandi) à `destination` pour la souris
    /// Maps `source` (unmagnified) onto `destination` for pointer input
    fn set_input_transform(
        &mut self,
        enabled: bool,
        source: ScreenRect,
        destination: ScreenRect,
    ) -> Result<()>;
}

/// Position du curseur en coordonnées écran
/// Cursor position in screen coordinates
pub trait PointerSource {
    fn cursor_position(&mut self) -> Result<(i32, i32)>;
}

/// Minuterie périodique qui produit les ticks
/// Periodic timer producing the ticks
///
/// Les ticks peuvent être fusionnés par le système si la boucle est occupée.
/// Ticks may be coalesced by the OS while the loop is busy.
pub trait TickSource {
    fn start(&mut self, interval: Duration) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_rejects_empty_screen() {
        assert!(DisplayGeometry::new(0, 1080).is_err());
        assert!(DisplayGeometry::new(1920, -1).is_err());
        assert_eq!(
            DisplayGeometry::new(1920, 1080).unwrap(),
            DisplayGeometry { width: 1920, height: 1080 }
        );
    }

    #[test]
    fn test_rect_size() {
        let rect = ScreenRect { left: 10, top: 20, right: 970, bottom: 560 };
        assert_eq!(rect.width(), 960);
        assert_eq!(rect.height(), 540);
    }
}
