// =============================================================================
// cli.rs - Ligne de commande
// cli.rs - Command line
// =============================================================================

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::config::{
    MagnifierConfig, RunOptions, DEFAULT_DEAD_ZONE, DEFAULT_HOTKEY, DEFAULT_TICK_MS,
    DEFAULT_ZOOM_LEVEL,
};
use crate::error::Result;
use crate::hotkey::Hotkey;
use crate::platform;
use crate::service::{DisplayGeometry, ScreenRect, ViewportOrigin};
use crate::transform::{Coefficients, TransformEngine};

#[derive(Parser, Debug)]
#[command(
    name = "magni",
    version,
    about = "Full-screen magnifier that follows the cursor, toggled by a global hotkey"
)]
pub struct Cli {
    /// Facteur de zoom (> 1.0) / Zoom factor (> 1.0)
    #[arg(long, global = true, env = "MAGNI_ZOOM", default_value_t = DEFAULT_ZOOM_LEVEL)]
    pub zoom: f64,

    /// Zone morte près des bords, en pixels / Dead zone near the edges, in pixels
    #[arg(long, global = true, env = "MAGNI_DEAD_ZONE", default_value_t = DEFAULT_DEAD_ZONE)]
    pub dead_zone: u32,

    /// Raccourci, p. ex. "M-1" ou "C-S-F10" / Hotkey, e.g. "M-1" or "C-S-F10"
    #[arg(long, global = true, env = "MAGNI_HOTKEY", default_value = DEFAULT_HOTKEY)]
    pub hotkey: Hotkey,

    /// Intervalle de rafraîchissement / Refresh interval (ms)
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_TICK_MS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub tick_ms: u64,

    /// Délai minimal entre deux bascules / Minimum delay between two toggles (ms)
    #[arg(long, global = true, default_value_t = 0)]
    pub cooldown_ms: u64,

    /// Ne pas rediriger la souris (utile sans uiAccess) / Don't redirect pointer input
    #[arg(long, global = true)]
    pub no_input_redirect: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lance la loupe (par défaut) / Runs the magnifier (default)
    Run,
    /// Affiche les coefficients en JSON / Prints the coefficients as JSON
    Describe(DescribeArgs),
}

#[derive(Args, Debug, Default)]
pub struct DescribeArgs {
    /// Largeur d'écran (sinon l'écran courant) / Screen width (else the current screen)
    #[arg(long, requires = "height")]
    pub width: Option<i32>,

    #[arg(long, requires = "width")]
    pub height: Option<i32>,

    /// Position du curseur à transformer / Cursor position to transform
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub at: Option<Vec<i32>>,
}

impl Cli {
    /// Valide les options ; le zoom invalide échoue ici
    /// Validates the options; an invalid zoom fails here
    pub fn options(&self) -> Result<RunOptions> {
        let magnifier = MagnifierConfig::new(self.zoom, self.dead_zone)?
            .with_input_redirect(!self.no_input_redirect);

        Ok(RunOptions {
            magnifier,
            hotkey: self.hotkey,
            tick_interval: Duration::from_millis(self.tick_ms),
            cooldown: Duration::from_millis(self.cooldown_ms),
        })
    }
}

// =============================================================================
// DESCRIBE
// =============================================================================

/// Rapport imprimé par `magni describe`
/// Report printed by `magni describe`
#[derive(Debug, Serialize)]
pub struct Report {
    pub config: MagnifierConfig,
    pub geometry: DisplayGeometry,
    pub coefficients: Coefficients,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<PointerReport>,
}

#[derive(Debug, Serialize)]
pub struct PointerReport {
    pub x: i32,
    pub y: i32,
    pub origin: ViewportOrigin,
    pub source: ScreenRect,
}

pub fn describe(options: &RunOptions, args: &DescribeArgs) -> Result<Report> {
    let geometry = match (args.width, args.height) {
        (Some(width), Some(height)) => DisplayGeometry::new(width, height)?,
        _ => platform::screen_size()?,
    };
    let engine = TransformEngine::new(&options.magnifier, geometry)?;

    let pointer = match args.at.as_deref() {
        Some(&[x, y]) => {
            let origin = engine.transform(x, y);
            Some(PointerReport {
                x,
                y,
                origin,
                source: engine.source_rect(origin),
            })
        }
        _ => None,
    };

    Ok(Report {
        config: options.magnifier,
        geometry,
        coefficients: engine.coefficients(),
        pointer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MagnifierError;
    use crate::hotkey::Modifiers;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("magni").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        let options = cli.options().unwrap();

        assert!(cli.command.is_none());
        assert_eq!(options.magnifier, MagnifierConfig::default());
        assert_eq!(options.hotkey.modifiers, Modifiers::ALT);
        assert_eq!(options.tick_interval, Duration::from_millis(8));
        assert_eq!(options.cooldown, Duration::ZERO);
    }

    #[test]
    fn test_flags_after_subcommand() {
        let cli = parse(&["describe", "--zoom", "2", "--width", "1920", "--height", "1080"]);
        assert_eq!(cli.zoom, 2.0);
        assert!(matches!(cli.command, Some(Command::Describe(_))));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_hotkey = Cli::try_parse_from(["magni", "--hotkey", "Q-1"]);
        assert!(bad_hotkey.is_err());

        let zero_tick = Cli::try_parse_from(["magni", "--tick-ms", "0"]);
        assert!(zero_tick.is_err());

        let unit_zoom = parse(&["--zoom", "1.0"]);
        assert!(matches!(unit_zoom.options(), Err(MagnifierError::Configuration(_))));
    }

    #[test]
    fn test_describe_report() {
        let cli = parse(&[
            "--zoom", "2", "describe", "--width", "1920", "--height", "1080", "--at", "1920", "0",
        ]);
        let Some(Command::Describe(args)) = &cli.command else {
            panic!("expected describe");
        };

        let report = describe(&cli.options().unwrap(), args).unwrap();
        assert_eq!(report.coefficients.x.max, 960);

        let pointer = report.pointer.unwrap();
        assert_eq!(pointer.origin, ViewportOrigin { x: 960, y: 0 });
        assert_eq!(pointer.source.right, 1920);
    }

    #[test]
    fn test_describe_rejects_dead_zone_at_half_width() {
        let options = parse(&["--dead-zone", "960"]).options().unwrap();
        let args = DescribeArgs {
            width: Some(1920),
            height: Some(1080),
            at: None,
        };
        assert!(matches!(
            describe(&options, &args),
            Err(MagnifierError::Configuration(_))
        ));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let options = parse(&["--zoom", "2", "--dead-zone", "0"]).options().unwrap();
        let args = DescribeArgs {
            width: Some(800),
            height: Some(600),
            at: None,
        };
        let json = serde_json::to_value(describe(&options, &args).unwrap()).unwrap();

        assert_eq!(json["geometry"]["width"], 800);
        assert_eq!(json["coefficients"]["x"]["max"], 400);
        assert_eq!(json["config"]["zoom_level"], 2.0);
        assert!(json.get("pointer").is_none());
    }
}
