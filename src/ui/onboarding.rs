// ui/onboarding.rs - First Run Permission Walkthrough
//
// Two native dialogs: the first explains why screen recording permission is
// needed and offers to open the settings pane, the second waits for the user
// to confirm they granted it.

use log::{info, warn};
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use zoomit::platform;

const OPEN_SETTINGS: &str = "Open Settings";
const LATER: &str = "Later";
const DONE: &str = "I've done it";

/// How the walkthrough ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingOutcome {
    /// The user went through the settings step and confirmed
    Confirmed,
    /// The user dismissed the first dialog
    Skipped,
}

/// Show the walkthrough. Blocks until the user answers.
pub fn run() -> OnboardingOutcome {
    info!("Showing first run walkthrough");

    let answer = MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title("Welcome to ZoomIt")
        .set_description(
            "ZoomIt magnifies the area around your pointer. To see your screen it needs \
             Screen Recording permission.\n\nOpen System Settings, enable ZoomIt under \
             Privacy & Security > Screen Recording, then come back here.",
        )
        .set_buttons(MessageButtons::OkCancelCustom(OPEN_SETTINGS.to_string(), LATER.to_string()))
        .show();

    if !accepted(&answer, OPEN_SETTINGS) {
        info!("Walkthrough skipped");
        return OnboardingOutcome::Skipped;
    }

    if let Err(e) = platform::open_screen_recording_settings() {
        warn!("Failed to open screen recording settings: {:#}", e);
    }

    MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title("Grant Screen Recording")
        .set_description(
            "Turn on ZoomIt in the Screen Recording list. macOS may ask to restart the app \
             before the permission takes effect.\n\nStart zooming from the magnifier icon \
             in the menu bar.",
        )
        .set_buttons(MessageButtons::OkCustom(DONE.to_string()))
        .show();

    info!("Walkthrough confirmed");
    OnboardingOutcome::Confirmed
}

/// Backends differ in whether a custom label or plain Ok comes back
fn accepted(answer: &MessageDialogResult, label: &str) -> bool {
    match answer {
        MessageDialogResult::Ok | MessageDialogResult::Yes => true,
        MessageDialogResult::Custom(text) => text == label,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted() {
        assert!(accepted(&MessageDialogResult::Custom(OPEN_SETTINGS.to_string()), OPEN_SETTINGS));
        assert!(accepted(&MessageDialogResult::Ok, OPEN_SETTINGS));
        assert!(!accepted(&MessageDialogResult::Custom(LATER.to_string()), OPEN_SETTINGS));
        assert!(!accepted(&MessageDialogResult::Cancel, OPEN_SETTINGS));
    }
}
