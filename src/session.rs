// session.rs - Zoom Session Lifecycle
//
// A session is one start-to-stop zoom interaction. The controller owns the
// live session together with every resource it needs (surfaces, redraw
// driver, exit-key listener) and releases them all together on stop.
//
// State machine:
//   Idle --start--> Active --exit key / stop--> Idle

use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info};
use winit::keyboard::KeyCode;

use crate::constants::{frame, hud};
use crate::geometry::{hud_rect, Rect};
use crate::hud::Hud;
use crate::zoom::{ScrollDelta, ZoomController};

/// The live zoom interaction, lent to the capture loop, zoom controller and
/// HUD by reference
#[derive(Debug, Clone)]
pub struct Session {
    zoom: ZoomController,
    hud: Hud,
    surface_bounds: Rect,
    hud_bounds: Rect,
    show_crosshair: bool,
}

impl Session {
    pub fn new(request: &SessionRequest) -> Self {
        let zoom = ZoomController::new(request.zoom_level);
        let hud_bounds = hud_rect(
            request.screen,
            hud::WIDTH as f64,
            hud::HEIGHT as f64,
            hud::TOP_MARGIN as f64,
        );
        Self {
            hud: Hud::new(zoom.level()),
            zoom,
            surface_bounds: request.screen,
            hud_bounds,
            show_crosshair: request.show_crosshair,
        }
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom.level()
    }

    /// Bounds of the full-screen overlay surface in desktop points
    pub fn surface_bounds(&self) -> Rect {
        self.surface_bounds
    }

    /// Bounds of the HUD pill surface in desktop points
    pub fn hud_bounds(&self) -> Rect {
        self.hud_bounds
    }

    pub fn show_crosshair(&self) -> bool {
        self.show_crosshair
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn hud_mut(&mut self) -> &mut Hud {
        &mut self.hud
    }

    /// Feed one scroll event through the zoom controller and tell the HUD
    /// when the level actually changed
    pub fn apply_scroll(&mut self, delta: ScrollDelta) -> Option<f64> {
        let changed = self.zoom.apply_scroll(delta.vertical_points())?;
        self.hud.zoom_level_changed(changed);
        Some(changed)
    }
}

/// Parameters for starting a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionRequest {
    /// Requested initial zoom; clamped into the session range on start
    pub zoom_level: f64,
    /// Screen the overlay covers, in desktop points
    pub screen: Rect,
    pub show_crosshair: bool,
}

/// Fixed-cadence redraw deadline
#[derive(Debug, Clone)]
pub struct RedrawDriver {
    interval: Duration,
    next: Instant,
}

impl RedrawDriver {
    /// First tick is due immediately
    pub fn start(now: Instant, interval: Duration) -> Self {
        Self { interval, next: now }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// True when a tick is due; schedules the next one. Missed ticks are
    /// dropped rather than replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }
}

/// Key-press listener filtered to the key that ends the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitKeyListener {
    key: KeyCode,
}

impl ExitKeyListener {
    pub fn new(key: KeyCode) -> Self {
        Self { key }
    }

    pub fn matches(&self, key: KeyCode) -> bool {
        self.key == key
    }
}

/// Platform services the controller drives
pub trait SessionPlatform {
    /// The full-screen overlay of one session
    type Overlay;
    /// The overlay together with the HUD stacked above it
    type Surfaces;

    /// Create the overlay surface and give it keyboard focus
    fn open_overlay(&mut self, session: &Session) -> Result<Self::Overlay>;

    /// Create the HUD surface in front of `overlay`. The controller orders
    /// nothing after this, so the HUD stays the topmost surface.
    fn open_hud(&mut self, session: &Session, overlay: Self::Overlay) -> Result<Self::Surfaces>;

    /// Tear down both surfaces
    fn close_surfaces(&mut self, surfaces: Self::Surfaces);

    fn set_pointer_visible(&mut self, surfaces: &Self::Surfaces, visible: bool);
}

/// Everything owned by an active session
pub struct ActiveSession<S> {
    pub session: Session,
    pub surfaces: S,
    driver: Option<RedrawDriver>,
    exit_listener: Option<ExitKeyListener>,
}

impl<S> ActiveSession<S> {
    pub fn exit_listener(&self) -> Option<&ExitKeyListener> {
        self.exit_listener.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already running; nothing was created
    AlreadyActive,
}

/// Owns at most one session and its resources
pub struct SessionController<S> {
    active: Option<ActiveSession<S>>,
    exit_key: KeyCode,
    frame_interval: Duration,
}

impl<S> Default for SessionController<S> {
    fn default() -> Self {
        Self::new(KeyCode::Escape, frame::interval())
    }
}

impl<S> SessionController<S> {
    pub fn new(exit_key: KeyCode, frame_interval: Duration) -> Self {
        Self {
            active: None,
            exit_key,
            frame_interval,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveSession<S>> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut ActiveSession<S>> {
        self.active.as_mut()
    }

    /// Idle -> Active. A second start while active is a no-op.
    pub fn start<P>(&mut self, platform: &mut P, request: SessionRequest, now: Instant) -> Result<StartOutcome>
    where
        P: SessionPlatform<Surfaces = S>,
    {
        if self.active.is_some() {
            debug!("Start ignored, a zoom session is already active");
            return Ok(StartOutcome::AlreadyActive);
        }

        let session = Session::new(&request);
        let overlay = platform.open_overlay(&session)?;
        let surfaces = platform.open_hud(&session, overlay)?;
        platform.set_pointer_visible(&surfaces, false);
        let driver = RedrawDriver::start(now, self.frame_interval);
        let exit_listener = ExitKeyListener::new(self.exit_key);

        info!(
            "Zoom session started at {:.1}x (requested {:.2})",
            session.zoom_level(),
            request.zoom_level
        );

        self.active = Some(ActiveSession {
            session,
            surfaces,
            driver: Some(driver),
            exit_listener: Some(exit_listener),
        });
        Ok(StartOutcome::Started)
    }

    /// Active -> Idle. Returns false when there was nothing to stop.
    pub fn stop<P>(&mut self, platform: &mut P) -> bool
    where
        P: SessionPlatform<Surfaces = S>,
    {
        let Some(mut active) = self.active.take() else {
            debug!("Stop ignored, no zoom session is active");
            return false;
        };

        active.exit_listener = None;
        debug!("Exit key listener removed");
        active.driver = None;
        debug!("Redraw driver stopped");
        platform.set_pointer_visible(&active.surfaces, true);

        let ActiveSession { session, surfaces, .. } = active;
        platform.close_surfaces(surfaces);

        info!("Zoom session ended at {:.1}x", session.zoom_level());
        true
    }

    /// Route a key press. Returns true when it ended the session.
    pub fn handle_key<P>(&mut self, platform: &mut P, key: KeyCode) -> bool
    where
        P: SessionPlatform<Surfaces = S>,
    {
        let is_exit = self
            .active
            .as_ref()
            .and_then(|active| active.exit_listener.as_ref())
            .is_some_and(|listener| listener.matches(key));

        if is_exit {
            info!("Exit key pressed");
            self.stop(platform)
        } else {
            false
        }
    }

    /// Route a scroll event to the active session's zoom controller
    pub fn handle_scroll(&mut self, delta: ScrollDelta) -> Option<f64> {
        let active = self.active.as_mut()?;
        let changed = active.session.apply_scroll(delta);
        if let Some(level) = changed {
            debug!("Zoom level changed to {:.2}", level);
        }
        changed
    }

    /// True when a redraw tick is due
    pub fn poll_redraw(&mut self, now: Instant) -> bool {
        self.active
            .as_mut()
            .and_then(|active| active.driver.as_mut())
            .is_some_and(|driver| driver.poll(now))
    }

    /// When the event loop should wake for the next tick
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active
            .as_ref()
            .and_then(|active| active.driver.as_ref())
            .map(RedrawDriver::deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::zoom::{SESSION_MAX, SESSION_MIN};

    #[derive(Debug, PartialEq)]
    enum Call {
        OpenOverlay(u32),
        OpenHud(u32),
        Close(u32),
        PointerVisible(bool),
    }

    #[derive(Default)]
    struct FakePlatform {
        calls: Vec<Call>,
        next_id: u32,
        fail_open: bool,
        fail_hud: bool,
    }

    impl SessionPlatform for FakePlatform {
        type Overlay = u32;
        type Surfaces = u32;

        fn open_overlay(&mut self, _session: &Session) -> Result<u32> {
            if self.fail_open {
                anyhow::bail!("window creation failed");
            }
            self.next_id += 1;
            self.calls.push(Call::OpenOverlay(self.next_id));
            Ok(self.next_id)
        }

        fn open_hud(&mut self, _session: &Session, overlay: u32) -> Result<u32> {
            if self.fail_hud {
                anyhow::bail!("HUD creation failed");
            }
            self.calls.push(Call::OpenHud(overlay));
            Ok(overlay)
        }

        fn close_surfaces(&mut self, surfaces: u32) {
            self.calls.push(Call::Close(surfaces));
        }

        fn set_pointer_visible(&mut self, _surfaces: &u32, visible: bool) {
            self.calls.push(Call::PointerVisible(visible));
        }
    }

    fn request(zoom_level: f64) -> SessionRequest {
        SessionRequest {
            zoom_level,
            screen: Rect::new(0.0, 0.0, 1920.0, 1080.0),
            show_crosshair: true,
        }
    }

    fn controller() -> SessionController<u32> {
        SessionController::new(KeyCode::Escape, Duration::from_millis(16))
    }

    #[test]
    fn test_start_opens_surfaces_then_hides_pointer() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();

        let outcome = controller.start(&mut platform, request(2.0), Instant::now()).unwrap();

        assert_eq!(outcome, StartOutcome::Started);
        assert_eq!(controller.state(), SessionState::Active);
        assert_eq!(
            platform.calls,
            vec![Call::OpenOverlay(1), Call::OpenHud(1), Call::PointerVisible(false)]
        );
        let active = controller.active().unwrap();
        assert!(active.exit_listener().is_some());
        assert!(active.session.show_crosshair());
        assert_eq!(active.session.hud_bounds(), Rect::new(820.0, 20.0, 280.0, 44.0));
    }

    #[test]
    fn test_hud_is_the_last_surface_opened() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();
        controller.start(&mut platform, request(2.0), Instant::now()).unwrap();

        // Overlay first, HUD after it, and no surface is opened or raised later
        let hud_at = platform
            .calls
            .iter()
            .position(|c| matches!(c, Call::OpenHud(_)))
            .unwrap();
        let overlay_at = platform
            .calls
            .iter()
            .position(|c| matches!(c, Call::OpenOverlay(_)))
            .unwrap();
        assert!(overlay_at < hud_at);
        assert!(platform.calls[hud_at + 1..]
            .iter()
            .all(|c| matches!(c, Call::PointerVisible(_))));
    }

    #[test]
    fn test_failed_hud_stays_idle() {
        let mut platform = FakePlatform {
            fail_hud: true,
            ..Default::default()
        };
        let mut controller = controller();

        assert!(controller.start(&mut platform, request(2.0), Instant::now()).is_err());
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(platform.calls, vec![Call::OpenOverlay(1)]);
    }

    #[test]
    fn test_second_start_is_a_no_op() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();
        let now = Instant::now();

        controller.start(&mut platform, request(2.0), now).unwrap();
        let outcome = controller.start(&mut platform, request(4.0), now).unwrap();

        assert_eq!(outcome, StartOutcome::AlreadyActive);
        let opens = platform.calls.iter().filter(|c| matches!(c, Call::OpenOverlay(_))).count();
        assert_eq!(opens, 1);
        assert_eq!(controller.active().unwrap().session.zoom_level(), 2.0);
    }

    #[test]
    fn test_stop_while_idle_is_safe() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();
        assert!(!controller.stop(&mut platform));
        assert!(platform.calls.is_empty());
        assert_eq!(controller.next_deadline(), None);
    }

    #[test]
    fn test_stop_restores_pointer_before_teardown() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();
        controller.start(&mut platform, request(2.0), Instant::now()).unwrap();

        assert!(controller.stop(&mut platform));

        assert_eq!(
            platform.calls,
            vec![
                Call::OpenOverlay(1),
                Call::OpenHud(1),
                Call::PointerVisible(false),
                Call::PointerVisible(true),
                Call::Close(1),
            ]
        );
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(!controller.poll_redraw(Instant::now()));
    }

    #[test]
    fn test_exit_key_stops_exactly_once() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();
        controller.start(&mut platform, request(2.0), Instant::now()).unwrap();

        assert!(!controller.handle_key(&mut platform, KeyCode::Space));
        assert!(controller.is_active());

        assert!(controller.handle_key(&mut platform, KeyCode::Escape));
        assert!(!controller.handle_key(&mut platform, KeyCode::Escape));

        let closes = platform.calls.iter().filter(|c| matches!(c, Call::Close(_))).count();
        assert_eq!(closes, 1);
        assert!(controller.active().is_none());
    }

    #[test]
    fn test_new_session_after_exit_gets_fresh_listener() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();
        let now = Instant::now();

        controller.start(&mut platform, request(2.0), now).unwrap();
        controller.handle_key(&mut platform, KeyCode::Escape);
        controller.start(&mut platform, request(3.0), now).unwrap();

        assert!(controller.active().unwrap().exit_listener().is_some());
        assert!(controller.handle_key(&mut platform, KeyCode::Escape));
        assert_eq!(platform.calls.last(), Some(&Call::Close(2)));
    }

    #[test]
    fn test_failed_open_stays_idle() {
        let mut platform = FakePlatform {
            fail_open: true,
            ..Default::default()
        };
        let mut controller = controller();

        assert!(controller.start(&mut platform, request(2.0), Instant::now()).is_err());
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(platform.calls.is_empty());
    }

    #[test]
    fn test_initial_zoom_is_clamped_at_session_boundary() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();
        controller.start(&mut platform, request(1.0), Instant::now()).unwrap();
        assert_eq!(controller.active().unwrap().session.zoom_level(), SESSION_MIN);

        controller.stop(&mut platform);
        controller.start(&mut platform, request(25.0), Instant::now()).unwrap();
        assert_eq!(controller.active().unwrap().session.zoom_level(), SESSION_MAX);
    }

    #[test]
    fn test_scroll_notifies_hud_once() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();
        controller.start(&mut platform, request(2.0), Instant::now()).unwrap();

        let changed = controller.handle_scroll(ScrollDelta::Points(100.0)).unwrap();
        assert!((changed - 5.0).abs() < 1e-9);

        let session = &controller.active().unwrap().session;
        assert_eq!(session.hud().notifications(), 1);
        assert!((session.hud().zoom_level() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_scroll_at_limit_does_not_notify() {
        let mut platform = FakePlatform::default();
        let mut controller = controller();
        controller.start(&mut platform, request(10.0), Instant::now()).unwrap();

        assert_eq!(controller.handle_scroll(ScrollDelta::Lines(3.0)), None);
        assert_eq!(controller.active().unwrap().session.hud().notifications(), 0);
    }

    #[test]
    fn test_scroll_while_idle_is_ignored() {
        let mut controller = controller();
        assert_eq!(controller.handle_scroll(ScrollDelta::Points(50.0)), None);
    }

    #[test]
    fn test_redraw_driver_ticks_on_cadence() {
        let start = Instant::now();
        let interval = Duration::from_millis(16);
        let mut driver = RedrawDriver::start(start, interval);

        assert!(driver.poll(start));
        assert!(!driver.poll(start + Duration::from_millis(5)));
        assert!(driver.poll(start + interval));
        assert_eq!(driver.deadline(), start + interval * 2);
    }

    #[test]
    fn test_redraw_driver_drops_missed_ticks() {
        let start = Instant::now();
        let interval = Duration::from_millis(16);
        let mut driver = RedrawDriver::start(start, interval);

        let late = start + Duration::from_millis(100);
        assert!(driver.poll(late));
        assert_eq!(driver.deadline(), late + interval);
        assert!(!driver.poll(late + Duration::from_millis(1)));
    }
}
