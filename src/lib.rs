//! ZoomIt - Screen Magnifier Library
//!
//! Platform-independent core of the magnifier: zoom math, the session state
//! machine, the per-tick capture step and the HUD and crosshair rasterizers.
//! Windows, GPU rendering and the menu bar live in the binary.

pub mod app;
pub mod capture;
pub mod constants;
pub mod crosshair;
pub mod font;
pub mod geometry;
pub mod hud;
pub mod magnifier;
pub mod paint;
pub mod platform;
pub mod pointer;
pub mod session;
pub mod zoom;

// Re-export commonly used types
pub use capture::{CaptureEngine, CaptureFrame, CaptureRect};
pub use session::{Session, SessionController, SessionRequest, SessionState};
pub use zoom::{ScrollDelta, ZoomController};
