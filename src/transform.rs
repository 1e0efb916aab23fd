//! =============================================================================
//! TRANSFORM.RS - Position du curseur -> origine de la vue agrandie
//! TRANSFORM.RS - Cursor position -> magnified view origin
//! =============================================================================
//!
//! La vue agrandie couvre `largeur / zoom` pixels. Quand le curseur touche le
//! bord de l'écran, c'est le bord visible de la vue qui doit toucher le bord,
//! pas son coin supérieur gauche. On applique donc une fonction affine par axe,
//! bornée à `[0, max]`, avec une zone morte près des bords.
//!
//! The magnified view spans `width / zoom` pixels. When the cursor reaches the
//! screen edge, the visible edge of the view must reach it too, not its
//! top-left corner. Each axis is an affine map clamped to `[0, max]`, with a
//! dead zone near the edges.
//!
//! ```text
//! mul = size * (1 - 1/zoom) / (size - 2 * dead_zone)
//! sub = mul * dead_zone
//! max = floor(size * (1 - 1/zoom))
//! origin = clamp(round(p * mul - sub), 0, max)
//! ```

use serde::Serialize;

use crate::config::MagnifierConfig;
use crate::error::{MagnifierError, Result};
use crate::service::{DisplayGeometry, ScreenRect, ViewportOrigin};

// =============================================================================
// COEFFICIENTS
// =============================================================================

/// Coefficients précalculés pour un axe
/// Precomputed coefficients for one axis
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AxisCoefficients {
    /// Pente / Slope
    pub mul: f64,
    /// Décalage soustrait / Subtracted offset
    pub sub: f64,
    /// Origine maximale / Maximum origin
    pub max: i32,
}

impl AxisCoefficients {
    fn new(size: i32, zoom: f64, dead_zone: u32, axis: &str) -> Result<Self> {
        let span = i64::from(size) - 2 * i64::from(dead_zone);
        if span <= 0 {
            return Err(MagnifierError::Configuration(format!(
                "dead zone of {dead_zone}px leaves no room on the {axis} axis ({size}px)"
            )));
        }

        let scrollable = f64::from(size) * (1.0 - 1.0 / zoom);
        let mul = scrollable / span as f64;

        Ok(Self {
            mul,
            sub: mul * f64::from(dead_zone),
            max: scrollable.floor() as i32,
        })
    }

    #[inline]
    fn apply(&self, position: i32) -> i32 {
        let value = (f64::from(position) * self.mul - self.sub).round();
        if value <= 0.0 {
            0
        } else if value >= f64::from(self.max) {
            self.max
        } else {
            value as i32
        }
    }
}

/// Instantané sérialisable des deux axes
/// Serializable snapshot of both axes
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coefficients {
    pub x: AxisCoefficients,
    pub y: AxisCoefficients,
}

// =============================================================================
// MOTEUR
// ENGINE
// =============================================================================

/// Moteur de transformation : pur, sans état hors de sa configuration
/// Transform engine: pure, no state beyond its configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformEngine {
    zoom: f64,
    geometry: DisplayGeometry,
    coefficients: Coefficients,
}

impl TransformEngine {
    /// Précalcule les coefficients ; rejette une zone morte qui couvre l'écran
    /// Precomputes the coefficients; rejects a dead zone covering the screen
    pub fn new(config: &MagnifierConfig, geometry: DisplayGeometry) -> Result<Self> {
        let zoom = config.zoom_level();
        let dead_zone = config.dead_zone();

        let x = AxisCoefficients::new(geometry.width, zoom, dead_zone, "horizontal")?;
        let y = AxisCoefficients::new(geometry.height, zoom, dead_zone, "vertical")?;

        Ok(Self {
            zoom,
            geometry,
            coefficients: Coefficients { x, y },
        })
    }

    pub fn transform_x(&self, x: i32) -> i32 {
        self.coefficients.x.apply(x)
    }

    pub fn transform_y(&self, y: i32) -> i32 {
        self.coefficients.y.apply(y)
    }

    /// Origine de la vue pour une position de curseur
    /// View origin for a cursor position
    pub fn transform(&self, x: i32, y: i32) -> ViewportOrigin {
        ViewportOrigin {
            x: self.transform_x(x),
            y: self.transform_y(y),
        }
    }

    /// Zone non agrandie capturée : `taille / zoom` à partir de l'origine
    /// Captured unmagnified region: `size / zoom` from the origin
    pub fn source_rect(&self, origin: ViewportOrigin) -> ScreenRect {
        ScreenRect {
            left: origin.x,
            top: origin.y,
            right: origin.x + (f64::from(self.geometry.width) / self.zoom) as i32,
            bottom: origin.y + (f64::from(self.geometry.height) / self.zoom) as i32,
        }
    }

    /// Écran complet / Full screen
    pub fn destination_rect(&self) -> ScreenRect {
        ScreenRect {
            left: 0,
            top: 0,
            right: self.geometry.width,
            bottom: self.geometry.height,
        }
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    pub fn geometry(&self) -> DisplayGeometry {
        self.geometry
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }
}

// =============================================================================
// TESTS
// =============================================================================
