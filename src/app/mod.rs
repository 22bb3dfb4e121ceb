// app/mod.rs - Application State and Configuration
//
// Platform-independent state of the idle application: persisted
// preferences and the operations the tray menu performs on them.

mod settings;
mod state;

pub use settings::Preferences;
pub use state::AppState;
