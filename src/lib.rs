//! =============================================================================
//! Magni - Loupe plein écran qui suit le curseur
//! Magni - Full-screen magnifier that follows the cursor
//! =============================================================================
//!
//! Un raccourci global active ou désactive la loupe. Tant qu'elle est active,
//! une minuterie (~8 ms) lit la position du curseur, la convertit en origine
//! de vue agrandie et l'envoie au service de loupe du système.
//!
//! A global hotkey turns magnification on or off. While it is on, a timer
//! (~8 ms) reads the cursor position, converts it into a magnified view origin
//! and sends it to the OS magnification service.
//!
//! # Modules
//! - [`transform`] : position du curseur -> origine de la vue / cursor position -> view origin
//! - [`controller`] : états Inactive/Active et travail par tick / Inactive/Active states and per-tick work
//! - [`event`] : événements et répartiteur / events and dispatcher
//! - [`platform`] : services Windows / Windows services

// =============================================================================
// MODULES
// =============================================================================

/// Ligne de commande
/// Command line
pub mod cli;

/// Configuration et constantes
/// Configuration and constants
pub mod config;

/// Contrôleur de la loupe
/// Magnification controller
pub mod controller;

pub mod error;

/// Événements et répartiteur
/// Events and dispatcher
pub mod event;

/// Analyse des raccourcis
/// Hotkey parsing
pub mod hotkey;

/// Implémentations propres au système
/// OS-specific implementations
pub mod platform;

/// Traits des services externes et types géométriques
/// External service traits and geometry types
pub mod service;

/// Moteur de transformation
/// Transform engine
pub mod transform;

pub use config::{MagnifierConfig, RunOptions};
pub use controller::{MagnificationController, MagnifierState};
pub use error::{MagnifierError, Result};
pub use event::{Dispatcher, Event, Flow};
pub use hotkey::Hotkey;
pub use service::{DisplayGeometry, ScreenRect, ViewportOrigin};
pub use transform::TransformEngine;
