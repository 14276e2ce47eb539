use chrono::NaiveDateTime;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;
use tracing::{info, warn};

use crate::{
    config::{get_theme, Config, Theme},
    controller::{Controller, EditOp, Field},
    notify::notify,
};

// ============================================================================
// Clock Sample
// ============================================================================

/// Wall-clock and monotonic readings taken together once per loop pass.
#[derive(Clone, Copy, Debug)]
pub struct Now {
    pub wall: NaiveDateTime,
    pub instant: Instant,
}

impl Now {
    pub fn current() -> Self {
        Self {
            wall: chrono::Local::now().naive_local(),
            instant: Instant::now(),
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum View {
    Timer,
    Help,
}

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub controller: Controller,
    pub focus: Field,
    pub alert: Option<String>,
    pub current_view: View,
    pub theme: Theme,
    pub theme_name: String,
    pub quick_hours: Vec<u32>,
    pub animation_frame: u8,
    completion_title: String,
    completion_body: String,
    sound_enabled: bool,
    notifications_enabled: bool,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            controller: Controller::default(),
            focus: Field::Start,
            alert: None,
            current_view: View::Timer,
            theme: get_theme(&config.theme),
            quick_hours: config.quick_set_hours(),
            theme_name: config.theme,
            animation_frame: 0,
            completion_title: config.completion_title,
            completion_body: config.completion_body,
            sound_enabled: config.sound_enabled,
            notifications_enabled: config.notifications_enabled,
        }
    }

    pub fn status_color(&self) -> ratatui::style::Color {
        if self.controller.is_completed() {
            self.theme.completed_color
        } else {
            self.theme.running_color
        }
    }

    pub fn completion_title(&self) -> &str {
        &self.completion_title
    }

    pub fn completion_body(&self) -> &str {
        &self.completion_body
    }

    /// Start/stop button. Validation failures become a blocking alert.
    pub fn toggle(&mut self, now: Now) {
        if self.controller.is_running() {
            self.controller.stop();
            return;
        }

        if let Err(e) = self.controller.start(now.wall, now.instant) {
            warn!("start rejected: {}", e);
            self.alert = Some(e.to_string());
        }
    }

    /// Quick-set from a configured slot. A window that can't be
    /// represented becomes an alert, like a rejected start.
    pub fn quick_set(&mut self, slot: usize, now: Now) {
        let Some(&hours) = self.quick_hours.get(slot) else { return };
        if let Err(e) = self.controller.quick_set(hours, now.wall) {
            self.alert = Some(e.to_string());
        }
    }

    pub fn update(&mut self, now: Now) {
        if self.controller.poll(now.instant, now.wall) {
            self.on_completed();
        }
        self.animation_frame = self.animation_frame.wrapping_add(1) % 20;
    }

    fn on_completed(&mut self) {
        info!("notifying completion");
        if self.notifications_enabled || self.sound_enabled {
            notify(
                &self.completion_title,
                &self.completion_body,
                self.notifications_enabled,
                self.sound_enabled,
            );
        }
    }
}

// ============================================================================
// Event Handlers
// ============================================================================

/// Applies one key press. Returns `true` when the app should quit.
pub fn handle_input(key: KeyEvent, app: &mut AppState, now: Now) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    // Alerts block everything until acknowledged
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.alert = None;
        }
        return false;
    }

    if app.current_view == View::Help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.current_view = View::Timer;
        }
        return false;
    }

    handle_timer_view(key, app, now)
}

fn handle_timer_view(key: KeyEvent, app: &mut AppState, now: Now) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => app.current_view = View::Help,
        // Plain, Ctrl+ and Alt+Enter all toggle; terminals disagree on which reach us
        KeyCode::Enter => app.toggle(now),
        KeyCode::Esc => {
            if app.controller.is_running() || app.controller.is_completed() {
                app.controller.stop();
            }
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.focus = app.focus.next();
        }
        KeyCode::F(n) if n >= 1 => app.quick_set(usize::from(n - 1), now),
        KeyCode::Backspace => {
            app.controller.edit(app.focus, EditOp::Backspace);
        }
        KeyCode::Delete => {
            app.controller.edit(app.focus, EditOp::Clear);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.controller.edit(app.focus, EditOp::Clear);
        }
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            app.controller.edit(app.focus, EditOp::Insert(c));
        }
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{controller::TimerState, error::ValidationError};
    use std::time::Duration;

    fn quiet_config() -> Config {
        Config {
            sound_enabled: false,
            notifications_enabled: false,
            ..Config::default()
        }
    }

    fn now_at(s: &str) -> Now {
        Now {
            wall: NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap(),
            instant: Instant::now(),
        }
    }

    fn press(app: &mut AppState, code: KeyCode, now: Now) -> bool {
        handle_input(KeyEvent::new(code, KeyModifiers::NONE), app, now)
    }

    fn type_str(app: &mut AppState, s: &str, now: Now) {
        for c in s.chars() {
            press(app, KeyCode::Char(c), now);
        }
    }

    #[test]
    fn typed_window_starts_and_stops_with_enter() {
        let mut app = AppState::new(quiet_config());
        let now = now_at("2024-01-01T00:30:00");

        type_str(&mut app, "2024-01-01T00:00", now);
        press(&mut app, KeyCode::Tab, now);
        type_str(&mut app, "2024-01-01T01:00", now);
        press(&mut app, KeyCode::Enter, now);

        assert!(app.controller.is_running());
        assert_eq!(app.controller.progress(), 50.0);

        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.controller.state(), &TimerState::Idle);
    }

    #[test]
    fn ctrl_enter_toggles_too() {
        let mut app = AppState::new(quiet_config());
        let now = now_at("2024-01-01T00:00:00");
        app.controller.quick_set(1, now.wall).unwrap();

        handle_input(KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL), &mut app, now);
        assert!(app.controller.is_running());
        handle_input(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT), &mut app, now);
        assert!(!app.controller.is_running());
    }

    #[test]
    fn escape_stops_only_when_running() {
        let mut app = AppState::new(quiet_config());
        let now = now_at("2024-01-01T00:00:00");

        assert!(!press(&mut app, KeyCode::Esc, now));
        assert_eq!(app.controller.state(), &TimerState::Idle);

        app.controller.quick_set(2, now.wall).unwrap();
        press(&mut app, KeyCode::Enter, now);
        press(&mut app, KeyCode::Esc, now);
        assert_eq!(app.controller.state(), &TimerState::Idle);
        assert!(app.controller.remaining().is_none());
    }

    #[test]
    fn invalid_start_raises_blocking_alert() {
        let mut app = AppState::new(quiet_config());
        let now = now_at("2024-01-01T00:00:00");

        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.alert, Some(ValidationError::MissingTime.to_string()));
        assert_eq!(app.controller.state(), &TimerState::Idle);

        // Keys other than acknowledge are swallowed while the alert is up
        press(&mut app, KeyCode::Char('2'), now);
        press(&mut app, KeyCode::F(1), now);
        assert_eq!(app.controller.input(Field::Start), "");
        assert!(app.alert.is_some());

        press(&mut app, KeyCode::Esc, now);
        assert!(app.alert.is_none());
    }

    #[test]
    fn inverted_window_alert_mentions_order() {
        let mut app = AppState::new(quiet_config());
        let now = now_at("2024-01-01T00:00:00");
        app.controller.set_input(Field::Start, "2024-01-01T05:00");
        app.controller.set_input(Field::End, "2024-01-01T04:00");

        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.alert, Some(ValidationError::EndNotAfterStart.to_string()));
        assert!(!app.controller.is_running());
    }

    #[test]
    fn function_keys_map_to_quick_set_slots() {
        let mut app = AppState::new(quiet_config());
        let now = now_at("2024-06-10T09:15:30");

        press(&mut app, KeyCode::F(3), now);
        assert_eq!(app.controller.input(Field::Start), "2024-06-10T09:15");
        assert_eq!(app.controller.input(Field::End), "2024-06-10T13:15");

        // Slots past the configured list do nothing
        press(&mut app, KeyCode::F(9), now);
        assert_eq!(app.controller.input(Field::End), "2024-06-10T13:15");
    }

    #[test]
    fn unrepresentable_quick_set_raises_alert() {
        let mut app = AppState::new(Config {
            quick_set_hours: vec![u32::MAX],
            ..quiet_config()
        });
        let now = now_at("2024-06-10T09:00:00");
        app.controller.set_input(Field::Start, "2024-06-10T08:00");

        press(&mut app, KeyCode::F(1), now);
        assert_eq!(
            app.alert,
            Some(ValidationError::WindowOutOfRange { hours: u32::MAX }.to_string())
        );
        assert_eq!(app.controller.input(Field::Start), "2024-06-10T08:00");
        assert_eq!(app.controller.input(Field::End), "");

        press(&mut app, KeyCode::Enter, now);
        assert!(app.alert.is_none());
        assert!(!app.controller.is_running());
    }

    #[test]
    fn quick_set_ignored_while_running() {
        let mut app = AppState::new(quiet_config());
        let now = now_at("2024-06-10T09:00:00");
        press(&mut app, KeyCode::F(1), now);
        press(&mut app, KeyCode::Enter, now);

        press(&mut app, KeyCode::F(4), now);
        assert_eq!(app.controller.input(Field::End), "2024-06-10T10:00");
    }

    #[test]
    fn editing_keys_target_focused_field() {
        let mut app = AppState::new(quiet_config());
        let now = now_at("2024-01-01T00:00:00");

        press(&mut app, KeyCode::Down, now);
        assert_eq!(app.focus, Field::End);
        type_str(&mut app, "2024x", now);
        assert_eq!(app.controller.input(Field::End), "2024");

        press(&mut app, KeyCode::Backspace, now);
        assert_eq!(app.controller.input(Field::End), "202");

        handle_input(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL), &mut app, now);
        assert_eq!(app.controller.input(Field::End), "");
        assert_eq!(app.controller.input(Field::Start), "");
    }

    #[test]
    fn update_completes_countdown_on_schedule() {
        let mut app = AppState::new(quiet_config());
        let start = now_at("2024-01-01T00:00:00");
        app.controller.set_input(Field::Start, "2024-01-01T00:00");
        app.controller.set_input(Field::End, "2024-01-01T00:00:02");
        press(&mut app, KeyCode::Enter, start);

        app.update(Now {
            wall: start.wall + chrono::Duration::seconds(1),
            instant: start.instant + Duration::from_secs(1),
        });
        assert!(app.controller.is_running());

        app.update(Now {
            wall: start.wall + chrono::Duration::seconds(2),
            instant: start.instant + Duration::from_secs(2),
        });
        assert!(app.controller.is_completed());
        assert_eq!(app.status_color(), app.theme.completed_color);
    }

    #[test]
    fn help_view_toggles_and_q_quits() {
        let mut app = AppState::new(quiet_config());
        let now = now_at("2024-01-01T00:00:00");

        press(&mut app, KeyCode::Char('?'), now);
        assert_eq!(app.current_view, View::Help);
        assert!(!press(&mut app, KeyCode::Char('q'), now));
        assert_eq!(app.current_view, View::Timer);

        assert!(press(&mut app, KeyCode::Char('q'), now));
        assert!(handle_input(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app,
            now
        ));
    }
}
