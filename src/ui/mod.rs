// ui/mod.rs - Idle User Interface
//
// The menu bar icon and the first run walkthrough. Session surfaces are
// plain winit windows drawn by the renderer.

pub mod onboarding;
mod tray;

pub use tray::{SystemTray, TrayCommand, TrayState};
