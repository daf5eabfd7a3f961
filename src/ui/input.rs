//! Keyboard input handling for the TUI.
//!
//! The trigger key starts a discovery cycle; while one is in flight the
//! key is simply ignored, so cycles never overlap.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::App;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('f') | KeyCode::Enter => app.start_discovery(),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    use crate::app::DiscoveryPhase;
    use crate::config::AppConfig;

    fn offline_app() -> App {
        let mut config = AppConfig::default();
        config.locator_endpoint = String::new();
        config.asset_manifest = Vec::new();
        App::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_quit_keys() {
        let mut app = offline_app();
        assert!(handle_input(&mut app, KeyEvent::from(KeyCode::Char('q'))));
        assert!(handle_input(&mut app, KeyEvent::from(KeyCode::Esc)));
        assert!(!handle_input(&mut app, KeyEvent::from(KeyCode::Char('x'))));
    }

    #[tokio::test]
    async fn test_trigger_key_starts_discovery() {
        let mut app = offline_app();
        assert!(!handle_input(&mut app, KeyEvent::from(KeyCode::Char('f'))));
        assert_eq!(app.phase, DiscoveryPhase::RequestingLocation);
    }
}
