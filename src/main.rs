// main.rs - ZoomIt Application Entry Point
//
// Orchestrates the application. It manages:
// 1. The idle menu bar icon and the preferences it edits
// 2. Zoom sessions: the full-screen overlay and the HUD pill
// 3. The redraw loop that captures around the pointer every tick

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};
use muda::MenuEvent;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event::{ElementState, MouseScrollDelta, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId, WindowLevel};

use zoomit::app::{AppState, Preferences};
use zoomit::capture::{create_capture_engine, CaptureEngine};
use zoomit::crosshair::Crosshair;
use zoomit::geometry::Rect;
use zoomit::magnifier::capture_tick;
use zoomit::platform;
use zoomit::pointer::{PointerSource, SystemPointer};
use zoomit::session::{Session, SessionController, SessionPlatform, SessionRequest, StartOutcome};
use zoomit::zoom::ScrollDelta;

mod renderer;
mod ui;

use renderer::FrameRenderer;
use ui::onboarding::{self, OnboardingOutcome};
use ui::{SystemTray, TrayCommand, TrayState};

/// A menu bar screen magnifier
#[derive(Parser, Debug)]
#[command(name = "zoomit", version, about)]
struct Cli {
    /// Start a zoom session at this level right away
    #[arg(long, value_name = "LEVEL")]
    zoom: Option<f64>,

    /// Show the first run walkthrough again
    #[arg(long)]
    reset_onboarding: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Events delivered to the event loop from outside winit
#[derive(Debug)]
pub enum UserEvent {
    Menu(MenuEvent),
}

/// The full-screen overlay window and its renderer
struct OverlaySurface {
    window: Arc<Window>,
    renderer: FrameRenderer,
    /// Device pixels per point on the session's screen, rounded up
    pixel_scale: u32,
}

/// The overlay and HUD windows of one session with their renderers
struct ZoomSurfaces {
    overlay: OverlaySurface,
    hud: Arc<Window>,
    hud_renderer: FrameRenderer,
}

/// Creates session surfaces on the running event loop
struct WinitPlatform<'a> {
    event_loop: &'a ActiveEventLoop,
}

impl WinitPlatform<'_> {
    fn create_window(&self, title: &str, bounds: Rect, transparent: bool, active: bool) -> Result<Arc<Window>> {
        let attributes = Window::default_attributes()
            .with_title(title)
            .with_decorations(false)
            .with_resizable(false)
            .with_transparent(transparent)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_position(LogicalPosition::new(bounds.x, bounds.y))
            .with_inner_size(LogicalSize::new(bounds.width, bounds.height))
            .with_content_protected(true)
            .with_active(active);

        let window = self
            .event_loop
            .create_window(attributes)
            .with_context(|| format!("Failed to create {} window", title))?;
        Ok(Arc::new(window))
    }
}

impl SessionPlatform for WinitPlatform<'_> {
    type Overlay = OverlaySurface;
    type Surfaces = ZoomSurfaces;

    fn open_overlay(&mut self, session: &Session) -> Result<OverlaySurface> {
        let window = self.create_window("ZoomIt", session.surface_bounds(), false, true)?;
        let pixel_scale = window.scale_factor().ceil().max(1.0) as u32;
        let mut renderer = FrameRenderer::new(window.clone(), false)?;

        if session.show_crosshair() {
            let crosshair = Crosshair::new(pixel_scale);
            renderer.set_overlay(Some(crosshair.image()));
        }

        // Both windows share a level, so focus has to land before the HUD exists
        window.focus_window();
        Ok(OverlaySurface {
            window,
            renderer,
            pixel_scale,
        })
    }

    fn open_hud(&mut self, session: &Session, overlay: OverlaySurface) -> Result<ZoomSurfaces> {
        let hud = self.create_window("ZoomIt HUD", session.hud_bounds(), true, false)?;
        if let Err(e) = hud.set_cursor_hittest(false) {
            warn!("HUD window will intercept clicks: {}", e);
        }
        let hud_renderer = FrameRenderer::new(hud.clone(), true)?;

        info!(
            "Session surfaces opened: overlay {:?}, HUD {:?}, scale {}",
            session.surface_bounds(),
            session.hud_bounds(),
            overlay.pixel_scale
        );

        Ok(ZoomSurfaces {
            overlay,
            hud,
            hud_renderer,
        })
    }

    fn close_surfaces(&mut self, surfaces: ZoomSurfaces) {
        surfaces.hud.set_visible(false);
        surfaces.overlay.window.set_visible(false);
        drop(surfaces);
        debug!("Session surfaces closed");
    }

    fn set_pointer_visible(&mut self, surfaces: &ZoomSurfaces, visible: bool) {
        surfaces.overlay.window.set_cursor_visible(visible);
    }
}

/// Main application state
struct ZoomItApp {
    cli: Cli,
    state: AppState,
    controller: SessionController<ZoomSurfaces>,
    /// Created on first use so a missing permission only hurts when zooming
    capture: Option<Box<dyn CaptureEngine>>,
    pointer: SystemPointer,
    tray: Option<SystemTray>,
    proxy: EventLoopProxy<UserEvent>,
}

impl ZoomItApp {
    fn new(cli: Cli, state: AppState, proxy: EventLoopProxy<UserEvent>) -> Self {
        Self {
            cli,
            state,
            controller: SessionController::default(),
            capture: None,
            pointer: SystemPointer::new(),
            tray: None,
            proxy,
        }
    }

    /// One-time setup once the event loop is running
    fn init(&mut self, event_loop: &ActiveEventLoop) {
        match SystemTray::new(&self.tray_state(), self.proxy.clone()) {
            Ok(tray) => self.tray = Some(tray),
            Err(e) => error!("Failed to create menu bar icon: {:#}", e),
        }

        if !self.state.preferences.has_completed_onboarding {
            let outcome = onboarding::run();
            if outcome == OnboardingOutcome::Confirmed {
                self.state.set_onboarding_completed(true);
            }
        }

        if let Some(level) = self.cli.zoom {
            self.start_session(event_loop, level);
        }
    }

    fn tray_state(&self) -> TrayState {
        let Preferences {
            default_zoom_level,
            show_crosshair,
            launch_at_login,
            ..
        } = self.state.preferences;
        TrayState {
            default_zoom_level,
            show_crosshair,
            launch_at_login,
            session_active: self.controller.is_active(),
        }
    }

    fn sync_tray(&mut self) {
        let state = self.tray_state();
        if let Some(tray) = &mut self.tray {
            tray.sync(&state);
        }
    }

    fn capture_engine(&mut self) -> Result<&mut Box<dyn CaptureEngine>> {
        if self.capture.is_none() {
            let engine = create_capture_engine().context("Failed to initialize screen capture")?;
            info!("Capture engine initialized for {:?}", engine.screen_bounds());
            self.capture = Some(engine);
        }
        self.capture
            .as_mut()
            .context("Capture engine unavailable")
    }

    fn start_session(&mut self, event_loop: &ActiveEventLoop, zoom_level: f64) {
        let screen = match self.capture_engine() {
            Ok(engine) => engine.screen_bounds(),
            Err(e) => {
                error!("Cannot start zoom: {:#}", e);
                return;
            }
        };

        let request = SessionRequest {
            zoom_level,
            screen,
            show_crosshair: self.state.preferences.show_crosshair,
        };

        let mut platform = WinitPlatform { event_loop };
        match self.controller.start(&mut platform, request, Instant::now()) {
            Ok(StartOutcome::Started) => {
                self.redraw_tick();
                self.sync_tray();
            }
            Ok(StartOutcome::AlreadyActive) => {}
            Err(e) => error!("Failed to start zoom session: {:#}", e),
        }
    }

    fn stop_session(&mut self, event_loop: &ActiveEventLoop) {
        let mut platform = WinitPlatform { event_loop };
        if self.controller.stop(&mut platform) {
            self.sync_tray();
        }
    }

    /// Capture around the pointer and present both surfaces
    fn redraw_tick(&mut self) {
        let pointer = self.pointer.position();
        let Some(active) = self.controller.active_mut() else {
            return;
        };

        if let Some(engine) = self.capture.as_deref_mut() {
            if let Some(frame) = capture_tick(&active.session, pointer, engine) {
                active.surfaces.overlay.renderer.upload_base(&frame.image);
            }
        }
        if let Err(e) = active.surfaces.overlay.renderer.render() {
            warn!("Overlay render failed: {:#}", e);
        }

        if active.session.hud_mut().take_redraw() {
            let image = active.session.hud().render(active.surfaces.overlay.pixel_scale);
            active.surfaces.hud_renderer.upload_base(&image);
            if let Err(e) = active.surfaces.hud_renderer.render() {
                warn!("HUD render failed: {:#}", e);
            }
        }
    }

    fn handle_command(&mut self, event_loop: &ActiveEventLoop, command: TrayCommand) {
        debug!("Menu command: {:?}", command);
        match command {
            TrayCommand::StartZoom => {
                let level = self.state.default_zoom_level();
                self.start_session(event_loop, level);
            }
            TrayCommand::SetDefaultZoom(level) => {
                let stored = self.state.set_default_zoom_level(level);
                info!("Default zoom level set to {:.1}x", stored);
            }
            TrayCommand::ToggleCrosshair => {
                let shown = self.state.toggle_crosshair();
                info!("Crosshair {}", if shown { "enabled" } else { "disabled" });
            }
            TrayCommand::ToggleLaunchAtLogin => {
                let enabled = !self.state.preferences.launch_at_login;
                match platform::set_launch_at_login(enabled) {
                    Ok(()) => self.state.set_launch_at_login(enabled),
                    Err(e) => error!("Failed to update launch at login: {:#}", e),
                }
            }
            TrayCommand::OpenPermissionSettings => {
                if let Err(e) = platform::open_screen_recording_settings() {
                    error!("Failed to open screen recording settings: {:#}", e);
                }
            }
            TrayCommand::Quit => {
                info!("Quit requested");
                self.stop_session(event_loop);
                event_loop.exit();
                return;
            }
        }
        self.sync_tray();
    }

    fn is_overlay(&self, window_id: WindowId) -> bool {
        self.controller
            .active()
            .is_some_and(|active| active.surfaces.overlay.window.id() == window_id)
    }
}

impl ApplicationHandler<UserEvent> for ZoomItApp {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        if cause == StartCause::Init {
            self.init(event_loop);
        }
    }

    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        debug!("Application resumed");
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Menu(event) => {
                let command = self.tray.as_ref().and_then(|tray| tray.command_for(&event));
                if let Some(command) = command {
                    self.handle_command(event_loop, command);
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    let mut platform = WinitPlatform { event_loop };
                    if self.controller.handle_key(&mut platform, code) {
                        self.sync_tray();
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => ScrollDelta::Lines(y as f64),
                    MouseScrollDelta::PixelDelta(position) => {
                        let scale = self
                            .controller
                            .active()
                            .map_or(1.0, |active| active.surfaces.overlay.window.scale_factor());
                        ScrollDelta::Points(position.y / scale)
                    }
                };
                self.controller.handle_scroll(delta);
            }
            WindowEvent::CloseRequested if self.is_overlay(window_id) => {
                self.stop_session(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(active) = self.controller.active_mut() {
                    let surfaces = &mut active.surfaces;
                    if surfaces.overlay.window.id() == window_id {
                        surfaces.overlay.renderer.resize(size.width, size.height);
                    } else if surfaces.hud.id() == window_id {
                        surfaces.hud_renderer.resize(size.width, size.height);
                        active.session.hud_mut().invalidate();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(active) = self.controller.active_mut() {
                    let surfaces = &mut active.surfaces;
                    let result = if surfaces.overlay.window.id() == window_id {
                        surfaces.overlay.renderer.render()
                    } else if surfaces.hud.id() == window_id {
                        surfaces.hud_renderer.render()
                    } else {
                        Ok(())
                    };
                    if let Err(e) = result {
                        warn!("Redraw failed: {:#}", e);
                    }
                }
            }
            _ => {}
        }
    }

    /// Drive the redraw ticks while a session is active, sleep otherwise
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.controller.poll_redraw(Instant::now()) {
            self.redraw_tick();
        }

        match self.controller.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        self.stop_session(event_loop);
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => "info,wgpu_core=warn,wgpu_hal=warn,naga=warn",
        1 => "debug,wgpu_core=warn,wgpu_hal=warn,naga=warn",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn build_event_loop() -> Result<EventLoop<UserEvent>> {
    #[allow(unused_mut)]
    let mut builder = EventLoop::<UserEvent>::with_user_event();

    // Menu bar only, no Dock icon
    #[cfg(target_os = "macos")]
    {
        use winit::platform::macos::{ActivationPolicy, EventLoopBuilderExtMacOS};
        builder.with_activation_policy(ActivationPolicy::Accessory);
    }

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("ZoomIt {} starting", env!("CARGO_PKG_VERSION"));

    let settings_path = Preferences::default_path();
    debug!("Settings file: {:?}", settings_path);
    let mut state = AppState::load(settings_path);
    if cli.reset_onboarding {
        state.set_onboarding_completed(false);
    }

    let event_loop = build_event_loop()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = ZoomItApp::new(cli, state, event_loop.create_proxy());
    event_loop.run_app(&mut app)?;

    info!("ZoomIt shutting down");
    Ok(())
}
