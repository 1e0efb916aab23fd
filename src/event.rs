// =============================================================================
// event.rs - Événements et répartiteur
// event.rs - Events and dispatcher
// =============================================================================
//
// La boucle de messages de la plateforme traduit ses messages en `Event` et
// les passe un par un au `Dispatcher`, qui possède le contrôleur.
// The platform message loop translates its messages into `Event` and hands
// them one by one to the `Dispatcher`, which owns the controller.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::controller::MagnificationController;
use crate::service::{MagnificationService, PointerSource, TickSource};

/// Événement livré par la boucle de la plateforme
/// Event delivered by the platform loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Raccourci pressé / Hotkey pressed
    Toggle,
    /// Minuterie périodique / Periodic timer
    Tick,
    /// Demande de sortie (icône de notification) / Exit request (tray icon)
    ExitRequested,
}

/// Suite à donner à la boucle
/// What the loop should do next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Contexte unique partagé par tous les gestionnaires
/// Single context shared by every handler
pub struct Dispatcher<S, P, T>
where
    S: MagnificationService,
    P: PointerSource,
    T: TickSource,
{
    controller: MagnificationController<S, P, T>,
    cooldown: Duration,
    last_toggle: Option<Instant>,
}

impl<S, P, T> Dispatcher<S, P, T>
where
    S: MagnificationService,
    P: PointerSource,
    T: TickSource,
{
    pub fn new(controller: MagnificationController<S, P, T>) -> Self {
        Self {
            controller,
            cooldown: Duration::ZERO,
            last_toggle: None,
        }
    }

    /// Ignore les bascules trop rapprochées (0 = désactivé)
    /// Ignores toggles that come too close together (0 = disabled)
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn controller(&self) -> &MagnificationController<S, P, T> {
        &self.controller
    }

    /// Traite un événement jusqu'au bout ; aucune erreur ne remonte
    /// Handles one event to completion; no error escapes
    pub fn handle(&mut self, event: Event, now: Instant) -> Flow {
        match event {
            Event::Toggle => {
                if self.cooling_down(now) {
                    debug!("toggle ignored during cooldown");
                    return Flow::Continue;
                }

                // Une bascule ratée ne consomme pas le délai
                // A failed toggle does not consume the cooldown
                match self.controller.toggle() {
                    Ok(state) => {
                        self.last_toggle = Some(now);
                        debug!(?state, "toggled");
                    }
                    Err(err) if err.is_fatal() => error!(%err, "toggle failed"),
                    Err(err) => warn!(%err, "toggle failed"),
                }
                Flow::Continue
            }
            Event::Tick => {
                self.controller.tick();
                Flow::Continue
            }
            Event::ExitRequested => {
                info!("exit requested");
                Flow::Exit
            }
        }
    }

    fn cooling_down(&self, now: Instant) -> bool {
        match self.last_toggle {
            Some(last) => now.saturating_duration_since(last) < self.cooldown,
            None => false,
        }
    }

    /// Rend le contrôleur (sa destruction libère le service)
    /// Returns the controller (dropping it releases the service)
    pub fn into_controller(self) -> MagnificationController<S, P, T> {
        self.controller
    }
}
