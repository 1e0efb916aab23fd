// =============================================================================
// controller.rs - Contrôleur de la loupe
// controller.rs - Magnification controller
// =============================================================================
//
// Deux états : Inactive (initial) et Active. `toggle` change d'état et
// démarre/arrête les ticks ; `tick` suit le curseur tant que la loupe est active.
// Two states: Inactive (initial) and Active. `toggle` flips the state and
// starts/stops the ticks; `tick` follows the cursor while active.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{MagnifierConfig, DEFAULT_TICK_MS, UNMAGNIFIED_ZOOM};
use crate::error::{MagnifierError, Result};
use crate::service::{
    DisplayGeometry, MagnificationService, PointerSource, ScreenRect, TickSource, ViewportOrigin,
};
use crate::transform::TransformEngine;

/// État de la loupe
/// Magnifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MagnifierState {
    #[default]
    Inactive,
    Active,
}

/// Contrôleur : possède la configuration, le moteur et les services
/// Controller: owns the configuration, the engine and the services
///
/// Le service de loupe est libéré quand le contrôleur est détruit.
/// The magnification service is released when the controller is dropped.
pub struct MagnificationController<S, P, T>
where
    S: MagnificationService,
    P: PointerSource,
    T: TickSource,
{
    config: MagnifierConfig,
    engine: TransformEngine,
    tick_interval: Duration,
    state: MagnifierState,
    service: S,
    pointer: P,
    ticks: T,
}

impl<S, P, T> MagnificationController<S, P, T>
where
    S: MagnificationService,
    P: PointerSource,
    T: TickSource,
{
    /// Construit le contrôleur ; une configuration invalide échoue ici
    /// Builds the controller; an invalid configuration fails here
    pub fn new(
        config: MagnifierConfig,
        geometry: DisplayGeometry,
        service: S,
        pointer: P,
        ticks: T,
    ) -> Result<Self> {
        let engine = TransformEngine::new(&config, geometry)?;
        info!(
            zoom = config.zoom_level(),
            dead_zone = config.dead_zone(),
            width = geometry.width,
            height = geometry.height,
            "magnifier ready"
        );

        Ok(Self {
            config,
            engine,
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            state: MagnifierState::Inactive,
            service,
            pointer,
            ticks,
        })
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn state(&self) -> MagnifierState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == MagnifierState::Active
    }

    pub fn config(&self) -> &MagnifierConfig {
        &self.config
    }

    pub fn engine(&self) -> &TransformEngine {
        &self.engine
    }

    // -------------------------------------------------------------------------
    // TOGGLE
    // -------------------------------------------------------------------------

    /// Bascule entre Inactive et Active
    /// Switches between Inactive and Active
    ///
    /// Activation : le drapeau passe à Active, puis les ticks démarrent.
    /// Désactivation : les ticks s'arrêtent, puis le drapeau repasse à
    /// Inactive, puis la loupe est remise à zéro (toujours envoyé).
    ///
    /// Activation: the flag goes Active, then ticks start.
    /// Deactivation: ticks stop, then the flag goes Inactive, then the
    /// magnification is reset (always sent).
    pub fn toggle(&mut self) -> Result<MagnifierState> {
        match self.state {
            MagnifierState::Inactive => self.activate()?,
            MagnifierState::Active => self.deactivate(),
        }
        Ok(self.state)
    }

    fn activate(&mut self) -> Result<()> {
        self.state = MagnifierState::Active;

        if let Err(err) = self.ticks.start(self.tick_interval) {
            self.state = MagnifierState::Inactive;
            return Err(err);
        }

        info!(interval_ms = self.tick_interval.as_millis() as u64, "magnification on");
        Ok(())
    }

    fn deactivate(&mut self) {
        if let Err(err) = self.ticks.stop() {
            // Un tick en retard sera ignoré par `tick` lui-même
            // A late tick is ignored by `tick` itself
            warn!(%err, "failed to stop tick source");
        }
        self.state = MagnifierState::Inactive;
        self.unmagnify();
        info!("magnification off");
    }

    fn unmagnify(&mut self) {
        if let Err(err) = self.service.set_fullscreen_transform(UNMAGNIFIED_ZOOM, 0, 0) {
            warn!(%err, "failed to reset magnification");
        }

        if self.config.redirect_input() {
            let screen = self.engine.destination_rect();
            if let Err(err) = self.service.set_input_transform(false, screen, screen) {
                warn!(%err, "failed to disable input redirection");
            }
        }
    }

    // -------------------------------------------------------------------------
    // TICK
    // -------------------------------------------------------------------------

    /// Recentre la vue sur le curseur ; sans effet si la loupe est inactive
    /// Recenters the view on the cursor; no effect while inactive
    ///
    /// Les échecs sont journalisés et corrigés au tick suivant.
    /// Failures are logged and corrected on the next tick.
    pub fn tick(&mut self) {
        if self.state != MagnifierState::Active {
            return;
        }

        let (x, y) = match self.pointer.cursor_position() {
            Ok(position) => position,
            Err(err) => {
                warn!(%err, "skipping tick");
                return;
            }
        };

        let origin = self.engine.transform(x, y);
        debug!(x, y, origin_x = origin.x, origin_y = origin.y, "tick");

        for err in self.apply(origin).into_iter().flatten() {
            warn!(%err, "magnification command failed");
        }
    }

    /// Envoie (a) zoom + origine puis (b) la redirection de la souris
    /// Sends (a) zoom + origin then (b) pointer redirection
    fn apply(&mut self, origin: ViewportOrigin) -> [Option<MagnifierError>; 2] {
        let zoom = self.engine.zoom();
        let fullscreen = self
            .service
            .set_fullscreen_transform(zoom, origin.x, origin.y)
            .err();

        let input = if self.config.redirect_input() {
            let source: ScreenRect = self.engine.source_rect(origin);
            let destination = self.engine.destination_rect();
            self.service
                .set_input_transform(true, source, destination)
                .err()
        } else {
            None
        };

        [fullscreen, input]
    }
}

impl<S, P, T> Drop for MagnificationController<S, P, T>
where
    S: MagnificationService,
    P: PointerSource,
    T: TickSource,
{
    fn drop(&mut self) {
        // Ne pas laisser l'écran agrandi en quittant
        // Don't leave the screen magnified on exit
        if self.is_active() {
            self.deactivate();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Appel enregistré par les faux services
    /// Call recorded by the fake services
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Call {
        Fullscreen(f64, i32, i32),
        Input(bool, ScreenRect, ScreenRect),
        Start(Duration),
        Stop,
    }

    pub(crate) type Log = Rc<RefCell<Vec<Call>>>;

    pub(crate) struct FakeService {
        pub log: Log,
        pub fail: bool,
    }

    impl MagnificationService for FakeService {
        fn set_fullscreen_transform(&mut self, zoom: f64, x: i32, y: i32) -> Result<()> {
            self.log.borrow_mut().push(Call::Fullscreen(zoom, x, y));
            if self.fail {
                return Err(MagnifierError::CommandFailed {
                    command: "set_fullscreen_transform",
                    reason: "fake".into(),
                });
            }
            Ok(())
        }

        fn set_input_transform(
            &mut self,
            enabled: bool,
            source: ScreenRect,
            destination: ScreenRect,
        ) -> Result<()> {
            self.log
                .borrow_mut()
                .push(Call::Input(enabled, source, destination));
            Ok(())
        }
    }

    pub(crate) struct FakePointer {
        pub position: Rc<RefCell<Option<(i32, i32)>>>,
    }

    impl PointerSource for FakePointer {
        fn cursor_position(&mut self) -> Result<(i32, i32)> {
            self.position
                .borrow()
                .ok_or_else(|| MagnifierError::PointerQuery("fake".into()))
        }
    }

    pub(crate) struct FakeTicks {
        pub log: Log,
        pub fail_start: Rc<Cell<bool>>,
    }

    impl TickSource for FakeTicks {
        fn start(&mut self, interval: Duration) -> Result<()> {
            if self.fail_start.get() {
                return Err(MagnifierError::TickSource("fake".into()));
            }
            self.log.borrow_mut().push(Call::Start(interval));
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.log.borrow_mut().push(Call::Stop);
            Ok(())
        }
    }

    pub(crate) type Fake = MagnificationController<FakeService, FakePointer, FakeTicks>;

    pub(crate) struct Harness {
        pub log: Log,
        pub position: Rc<RefCell<Option<(i32, i32)>>>,
        /// Partagé avec `FakeTicks` : modifiable après construction
        /// Shared with `FakeTicks`: can be flipped after construction
        pub fail_start: Rc<Cell<bool>>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                log: Rc::new(RefCell::new(Vec::new())),
                position: Rc::new(RefCell::new(Some((960, 540)))),
                fail_start: Rc::new(Cell::new(false)),
            }
        }

        pub fn controller(&self, config: MagnifierConfig) -> Fake {
            self.build(config, false, false)
        }

        pub fn build(&self, config: MagnifierConfig, fail_service: bool, fail_start: bool) -> Fake {
            self.fail_start.set(fail_start);
            MagnificationController::new(
                config,
                DisplayGeometry::new(1920, 1080).unwrap(),
                FakeService { log: self.log.clone(), fail: fail_service },
                FakePointer { position: self.position.clone() },
                FakeTicks { log: self.log.clone(), fail_start: self.fail_start.clone() },
            )
            .unwrap()
        }

        pub fn calls(&self) -> Vec<Call> {
            self.log.borrow().clone()
        }

        pub fn clear(&self) {
            self.log.borrow_mut().clear();
        }
    }

    fn config() -> MagnifierConfig {
        MagnifierConfig::new(2.0, 200).unwrap()
    }

    const SCREEN: ScreenRect = ScreenRect { left: 0, top: 0, right: 1920, bottom: 1080 };

    #[test]
    fn test_starts_inactive() {
        let harness = Harness::new();
        let controller = harness.controller(config());
        assert_eq!(controller.state(), MagnifierState::Inactive);
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_rejects_invalid_dead_zone_at_construction() {
        let harness = Harness::new();
        let result = MagnificationController::new(
            MagnifierConfig::new(2.0, 960).unwrap(),
            DisplayGeometry::new(1920, 1080).unwrap(),
            FakeService { log: harness.log.clone(), fail: false },
            FakePointer { position: harness.position.clone() },
            FakeTicks { log: harness.log.clone(), fail_start: harness.fail_start.clone() },
        );
        assert!(matches!(result, Err(MagnifierError::Configuration(_))));
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_tick_is_noop_when_inactive() {
        let harness = Harness::new();
        let mut controller = harness.controller(config());
        controller.tick();
        controller.tick();
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_activation_starts_ticks_without_magnifying() {
        let harness = Harness::new();
        let mut controller = harness.controller(config());

        assert_eq!(controller.toggle().unwrap(), MagnifierState::Active);
        assert_eq!(harness.calls(), vec![Call::Start(Duration::from_millis(8))]);
    }

    #[test]
    fn test_tick_sends_fullscreen_then_input_transform() {
        let harness = Harness::new();
        let mut controller = harness.controller(config());
        controller.toggle().unwrap();
        harness.clear();

        controller.tick();

        // Curseur au centre (960, 540) => origine (480, 270)
        // Cursor at the center (960, 540) => origin (480, 270)
        let source = ScreenRect { left: 480, top: 270, right: 1440, bottom: 810 };
        assert_eq!(
            harness.calls(),
            vec![Call::Fullscreen(2.0, 480, 270), Call::Input(true, source, SCREEN)]
        );
    }

    #[test]
    fn test_tick_without_input_redirect() {
        let harness = Harness::new();
        let mut controller = harness.controller(config().with_input_redirect(false));
        controller.toggle().unwrap();
        harness.clear();

        controller.tick();
        assert_eq!(harness.calls(), vec![Call::Fullscreen(2.0, 480, 270)]);
    }

    #[test]
    fn test_toggle_twice_unmagnifies_once() {
        let harness = Harness::new();
        let mut controller = harness.controller(config());

        controller.toggle().unwrap();
        assert_eq!(controller.toggle().unwrap(), MagnifierState::Inactive);

        let calls = harness.calls();
        let resets: Vec<_> = calls
            .iter()
            .filter(|call| matches!(call, Call::Fullscreen(..)))
            .collect();
        assert_eq!(resets, vec![&Call::Fullscreen(1.0, 0, 0)]);

        // Les ticks s'arrêtent avant la remise à zéro
        // Ticks stop before the reset
        assert_eq!(calls[1], Call::Stop);
        assert_eq!(calls[2], Call::Fullscreen(1.0, 0, 0));
        assert_eq!(calls[3], Call::Input(false, SCREEN, SCREEN));
    }

    #[test]
    fn test_late_tick_after_deactivation_is_ignored() {
        let harness = Harness::new();
        let mut controller = harness.controller(config());
        controller.toggle().unwrap();
        controller.toggle().unwrap();
        harness.clear();

        controller.tick();
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_failed_start_stays_inactive() {
        let harness = Harness::new();
        let mut controller = harness.build(config(), false, true);

        assert!(matches!(controller.toggle(), Err(MagnifierError::TickSource(_))));
        assert_eq!(controller.state(), MagnifierState::Inactive);

        controller.tick();
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_command_failure_is_swallowed() {
        let harness = Harness::new();
        let mut controller = harness.build(config(), true, false);
        controller.toggle().unwrap();
        harness.clear();

        controller.tick();
        controller.tick();

        // La redirection est tentée même si le zoom a échoué
        // Redirection is attempted even if the zoom failed
        assert_eq!(harness.calls().len(), 4);
        assert!(controller.is_active());
    }

    #[test]
    fn test_pointer_failure_skips_tick() {
        let harness = Harness::new();
        let mut controller = harness.controller(config());
        controller.toggle().unwrap();
        harness.clear();

        *harness.position.borrow_mut() = None;
        controller.tick();
        assert!(harness.calls().is_empty());

        *harness.position.borrow_mut() = Some((0, 0));
        controller.tick();
        assert_eq!(harness.calls()[0], Call::Fullscreen(2.0, 0, 0));
    }

    #[test]
    fn test_drop_resets_active_magnifier() {
        let harness = Harness::new();
        {
            let mut controller = harness.controller(config());
            controller.toggle().unwrap();
            harness.clear();
        }
        assert_eq!(harness.calls()[0], Call::Stop);
        assert_eq!(harness.calls()[1], Call::Fullscreen(1.0, 0, 0));
    }

    #[test]
    fn test_drop_inactive_sends_nothing() {
        let harness = Harness::new();
        drop(harness.controller(config()));
        assert!(harness.calls().is_empty());
    }
}
