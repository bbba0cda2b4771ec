use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use crossterm::event::{self, KeyCode, KeyModifiers};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::alarm;
use crate::config::{self, Config};
use crate::session_log::{self, DATE_FMT, RangeSummary, SessionLog};
use crate::timer::{Status, TimerEngine, TimerEvent, TimerKind};

// ============================================================================
// View State
// ============================================================================

#[derive(PartialEq, Clone, Copy)]
pub enum View {
    Timer,
    Settings,
    History,
    Help,
}

#[derive(PartialEq, Clone, Copy)]
pub enum SettingsField {
    FocusShort,
    FocusLong,
    BreakShort,
    BreakLong,
    Alarm,
}

impl SettingsField {
    pub fn next(self) -> Self {
        match self {
            Self::FocusShort => Self::FocusLong,
            Self::FocusLong => Self::BreakShort,
            Self::BreakShort => Self::BreakLong,
            Self::BreakLong => Self::Alarm,
            Self::Alarm => Self::FocusShort,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::FocusShort => Self::Alarm,
            Self::FocusLong => Self::FocusShort,
            Self::BreakShort => Self::FocusLong,
            Self::BreakLong => Self::BreakShort,
            Self::Alarm => Self::BreakLong,
        }
    }

    fn duration_index(self) -> Option<usize> {
        match self {
            Self::FocusShort => Some(0),
            Self::FocusLong => Some(1),
            Self::BreakShort => Some(2),
            Self::BreakLong => Some(3),
            Self::Alarm => None,
        }
    }
}

/// Settings edits live in these buffers until every field validates;
/// only then do the config and the file mutate.
pub struct SettingsForm {
    pub inputs: [String; 4],
    pub alarm_choices: Vec<String>,
    pub alarm_index: usize,
    pub field: SettingsField,
    pub editing: bool,
    pub error: Option<String>,
}

impl SettingsForm {
    fn from_config(config: &Config, alarm_choices: Vec<String>) -> Self {
        let inputs = TimerKind::ALL.map(|kind| config.timer.minutes(kind).to_string());
        let alarm_index = alarm_choices
            .iter()
            .position(|name| *name == config.alarm)
            .unwrap_or(0);
        Self {
            inputs,
            alarm_choices,
            alarm_index,
            field: SettingsField::FocusShort,
            editing: false,
            error: None,
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum HistoryRange {
    Last7,
    Last30,
    Custom,
}

#[derive(PartialEq, Clone, Copy)]
pub enum CustomField {
    Start,
    End,
}

pub struct HistoryState {
    pub range: HistoryRange,
    pub summary: RangeSummary,
    pub start_input: String,
    pub end_input: String,
    pub custom_field: CustomField,
    pub error: Option<String>,
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub engine: TimerEngine,
    pub config: Config,
    pub config_path: PathBuf,
    pub log: SessionLog,
    pub sounds_dir: PathBuf,
    pub sound_enabled: bool,
    pub view: View,
    pub settings: SettingsForm,
    pub history: HistoryState,
    /// One-line feedback shown under the timer (log failures, rejections).
    pub status: Option<String>,
    /// Completion notification sink; the default shows a desktop
    /// notification. Not gated by `sound_enabled`.
    notify: Box<dyn FnMut(TimerKind)>,
}

impl App {
    pub fn new(
        config: Config,
        config_path: PathBuf,
        log: SessionLog,
        sounds_dir: PathBuf,
        sound_enabled: bool,
    ) -> Self {
        let kind = TimerKind::FocusShort;
        let engine = TimerEngine::new(kind, Duration::from_secs(config.timer.minutes(kind) * 60));
        let settings = SettingsForm::from_config(&config, alarm::available_alarms(&sounds_dir));
        let today = Local::now().date_naive();
        let history = HistoryState {
            range: HistoryRange::Last7,
            summary: RangeSummary::default(),
            start_input: today.format(DATE_FMT).to_string(),
            end_input: today.format(DATE_FMT).to_string(),
            custom_field: CustomField::Start,
            error: None,
        };
        Self {
            engine,
            config,
            config_path,
            log,
            sounds_dir,
            sound_enabled,
            view: View::Timer,
            settings,
            history,
            status: None,
            notify: Box::new(alarm::notify_complete),
        }
    }

    /// Periodic update from the event loop; drives the countdown and
    /// handles completions.
    pub fn update(&mut self, now: Instant) {
        self.engine.tick(now);
        while let Some(event) = self.engine.poll_event() {
            if let TimerEvent::Completed { kind, configured } = event {
                self.on_completed(kind, configured);
            }
        }
    }

    /// Completion: log focus sessions (errors surface in the status line),
    /// then alarm and notification, both fire-and-forget.
    fn on_completed(&mut self, kind: TimerKind, configured: Duration) {
        if kind.is_focus() {
            let stamp = Local::now().naive_local();
            if let Err(err) = self.log.append(stamp, configured.as_secs()) {
                self.status = Some(format!("⚠ session not logged: {err}"));
            } else {
                self.status = Some(format!("logged {} min focus session", configured.as_secs() / 60));
            }
        }
        if self.sound_enabled {
            alarm::play(&self.sounds_dir, &self.config.alarm);
        }
        (self.notify)(kind);
    }

    fn select_kind(&mut self, kind: TimerKind) {
        let duration = Duration::from_secs(self.config.timer.minutes(kind) * 60);
        if self.engine.configure(kind, duration) {
            self.status = None;
        } else {
            self.status = Some("stop the timer before switching type".into());
        }
    }

    fn toggle_start_pause(&mut self, now: Instant) {
        match self.engine.status() {
            Status::Running => {
                self.engine.pause(now);
            }
            Status::Idle | Status::Paused => {
                self.engine.start(now);
                self.status = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    fn open_settings(&mut self) {
        self.settings =
            SettingsForm::from_config(&self.config, alarm::available_alarms(&self.sounds_dir));
        self.view = View::Settings;
    }

    /// Validate every field, then apply and persist wholesale. Nothing
    /// mutates when any field is invalid.
    fn save_settings(&mut self) {
        let mut minutes = [0u64; 4];
        for (i, kind) in TimerKind::ALL.iter().enumerate() {
            match config::parse_minutes(&self.settings.inputs[i]) {
                Ok(m) => minutes[i] = m,
                Err(msg) => {
                    self.settings.error = Some(format!("{}: {msg}", kind.label()));
                    return;
                }
            }
        }

        for (i, kind) in TimerKind::ALL.iter().enumerate() {
            self.config.timer.set_minutes(*kind, minutes[i]);
        }
        if let Some(name) = self.settings.alarm_choices.get(self.settings.alarm_index) {
            self.config.alarm = name.clone();
        }

        if let Err(err) = self.config.save(&self.config_path) {
            self.settings.error = Some(format!("save failed: {err}"));
            return;
        }

        // Pick up the new duration for the selected type, idle timers only.
        let kind = self.engine.kind();
        let duration = Duration::from_secs(self.config.timer.minutes(kind) * 60);
        self.engine.configure(kind, duration);

        self.settings.error = None;
        self.status = Some("settings saved".into());
        self.view = View::Timer;
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    fn open_history(&mut self) {
        self.history.range = HistoryRange::Last7;
        self.history.error = None;
        self.refresh_history();
        self.view = View::History;
    }

    fn refresh_history(&mut self) {
        let today = Local::now().date_naive();
        let (start, end) = match self.history.range {
            HistoryRange::Last7 => (today - ChronoDuration::days(6), today),
            HistoryRange::Last30 => (today - ChronoDuration::days(29), today),
            HistoryRange::Custom => {
                let start = match NaiveDate::parse_from_str(&self.history.start_input, DATE_FMT) {
                    Ok(d) => d,
                    Err(_) => {
                        self.history.error =
                            Some(format!("'{}' is not DD/MM/YYYY", self.history.start_input));
                        return;
                    }
                };
                let end = match NaiveDate::parse_from_str(&self.history.end_input, DATE_FMT) {
                    Ok(d) => d,
                    Err(_) => {
                        self.history.error =
                            Some(format!("'{}' is not DD/MM/YYYY", self.history.end_input));
                        return;
                    }
                };
                (start, end)
            }
        };

        match self.log.load_records() {
            Ok(records) => {
                let totals = session_log::daily_totals(&records);
                self.history.summary = session_log::aggregate(&totals, start, end);
                self.history.error = None;
            }
            Err(err) => {
                self.history.error = Some(format!("could not read log: {err}"));
            }
        }
    }
}

// ============================================================================
// Input Handling
// ============================================================================

/// Returns true when the app should quit.
pub fn handle_input(key: event::KeyEvent, app: &mut App, now: Instant) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    match app.view {
        View::Timer => handle_timer_view(key, app, now),
        View::Settings => handle_settings_view(key, app),
        View::History => handle_history_view(key, app),
        View::Help => {
            app.view = View::Timer;
            false
        }
    }
}

fn handle_timer_view(key: event::KeyEvent, app: &mut App, now: Instant) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char(' ') => app.toggle_start_pause(now),
        KeyCode::Char('x') => {
            app.engine.stop();
        }
        KeyCode::Char('1') => app.select_kind(TimerKind::FocusShort),
        KeyCode::Char('2') => app.select_kind(TimerKind::FocusLong),
        KeyCode::Char('3') => app.select_kind(TimerKind::BreakShort),
        KeyCode::Char('4') => app.select_kind(TimerKind::BreakLong),
        KeyCode::Char('d') => app.open_settings(),
        KeyCode::Char('s') => app.open_history(),
        KeyCode::Char('h') | KeyCode::Char('?') => app.view = View::Help,
        _ => {}
    }
    false
}

fn handle_settings_view(key: event::KeyEvent, app: &mut App) -> bool {
    if app.settings.editing {
        let Some(idx) = app.settings.field.duration_index() else {
            app.settings.editing = false;
            return false;
        };
        match key.code {
            KeyCode::Char(c) => app.settings.inputs[idx].push(c),
            KeyCode::Backspace => {
                app.settings.inputs[idx].pop();
            }
            KeyCode::Enter | KeyCode::Esc => app.settings.editing = false,
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            // Discard buffered edits.
            app.view = View::Timer;
        }
        KeyCode::Down | KeyCode::Char('j') => app.settings.field = app.settings.field.next(),
        KeyCode::Up | KeyCode::Char('k') => app.settings.field = app.settings.field.prev(),
        KeyCode::Enter | KeyCode::Char('e') => {
            if app.settings.field.duration_index().is_some() {
                app.settings.editing = true;
            }
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if app.settings.field == SettingsField::Alarm && !app.settings.alarm_choices.is_empty()
            {
                let len = app.settings.alarm_choices.len();
                app.settings.alarm_index = (app.settings.alarm_index + len - 1) % len;
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if app.settings.field == SettingsField::Alarm && !app.settings.alarm_choices.is_empty()
            {
                app.settings.alarm_index =
                    (app.settings.alarm_index + 1) % app.settings.alarm_choices.len();
            }
        }
        KeyCode::Char('s') => app.save_settings(),
        _ => {}
    }
    false
}

fn handle_history_view(key: event::KeyEvent, app: &mut App) -> bool {
    if app.history.range == HistoryRange::Custom {
        let input = match app.history.custom_field {
            CustomField::Start => &mut app.history.start_input,
            CustomField::End => &mut app.history.end_input,
        };
        match key.code {
            KeyCode::Char(c @ ('0'..='9' | '/')) => {
                input.push(c);
                return false;
            }
            KeyCode::Backspace => {
                input.pop();
                return false;
            }
            KeyCode::Tab => {
                app.history.custom_field = match app.history.custom_field {
                    CustomField::Start => CustomField::End,
                    CustomField::End => CustomField::Start,
                };
                return false;
            }
            KeyCode::Enter => {
                app.refresh_history();
                return false;
            }
            _ => {}
        }
    }

    // Preset keys stay off the digits so they keep working while a custom
    // date field is capturing input.
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.view = View::Timer,
        KeyCode::Char('w') => {
            app.history.range = HistoryRange::Last7;
            app.refresh_history();
        }
        KeyCode::Char('m') => {
            app.history.range = HistoryRange::Last30;
            app.refresh_history();
        }
        KeyCode::Char('c') => {
            app.history.range = HistoryRange::Custom;
            app.history.custom_field = CustomField::Start;
        }
        _ => {}
    }
    false
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_app(dir: &std::path::Path) -> App {
        let mut app = App::new(
            Config::default(),
            dir.join("config.json"),
            SessionLog::new(dir.join("log.csv")),
            dir.join("sounds"),
            false,
        );
        app.notify = Box::new(|_| {});
        app
    }

    #[test]
    fn focus_completion_appends_to_log() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        let t0 = Instant::now();

        app.engine.start(t0);
        app.update(t0 + Duration::from_secs(25 * 60));

        let records = app.log.load_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].duration_secs, 1500);
    }

    #[test]
    fn break_completion_is_never_logged() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        let t0 = Instant::now();

        app.engine.configure(TimerKind::BreakShort, Duration::from_secs(5 * 60));
        app.engine.start(t0);
        app.update(t0 + Duration::from_secs(5 * 60));

        assert!(app.log.load_records().unwrap().is_empty());
    }

    #[test]
    fn stopped_run_leaves_no_record() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        let t0 = Instant::now();

        app.engine.start(t0);
        app.engine.pause(t0 + Duration::from_secs(10 * 60));
        app.engine.start(t0 + Duration::from_secs(11 * 60));
        app.engine.stop();
        app.update(t0 + Duration::from_secs(60 * 60));

        assert!(app.log.load_records().unwrap().is_empty());
        assert_eq!(app.engine.display(t0), (25, 0));
    }

    #[test]
    fn invalid_settings_leave_config_untouched() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.settings.inputs[0] = "0".into();
        app.settings.inputs[1] = "45".into();
        app.save_settings();

        assert!(app.settings.error.is_some());
        assert_eq!(app.config.timer.focus_short, 25);
        assert_eq!(app.config.timer.focus_long, 50);
        assert!(!app.config_path.exists());
    }

    #[test]
    fn valid_settings_persist_and_reconfigure_idle_engine() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());

        app.settings.inputs = ["30".into(), "55".into(), "10".into(), "20".into()];
        app.save_settings();

        assert!(app.settings.error.is_none());
        assert_eq!(app.config.timer.focus_short, 30);
        assert_eq!(
            Config::load(&app.config_path).unwrap().timer.focus_short,
            30
        );
        assert_eq!(app.engine.configured(), Duration::from_secs(30 * 60));
    }

    #[test]
    fn history_presets_work_while_custom_field_captures_digits() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        let t0 = Instant::now();
        let press = |app: &mut App, code: KeyCode| {
            handle_input(event::KeyEvent::new(code, KeyModifiers::NONE), app, t0);
        };

        app.view = View::History;
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.history.range, HistoryRange::Custom);

        // Digits go to the focused date field, not the preset keys.
        app.history.start_input.clear();
        press(&mut app, KeyCode::Char('7'));
        assert_eq!(app.history.start_input, "7");
        assert_eq!(app.history.range, HistoryRange::Custom);

        // Preset keys still switch ranges from inside Custom.
        press(&mut app, KeyCode::Char('m'));
        assert_eq!(app.history.range, HistoryRange::Last30);
        press(&mut app, KeyCode::Char('w'));
        assert_eq!(app.history.range, HistoryRange::Last7);
    }

    #[test]
    fn completion_notifies_even_with_sound_disabled() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        assert!(!app.sound_enabled);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        app.notify = Box::new(move |kind| sink.borrow_mut().push(kind));

        let t0 = Instant::now();
        app.engine
            .configure(TimerKind::BreakShort, Duration::from_secs(5 * 60));
        app.engine.start(t0);
        app.update(t0 + Duration::from_secs(5 * 60));

        assert_eq!(*seen.borrow(), vec![TimerKind::BreakShort]);
    }

    #[test]
    fn switching_type_while_running_is_rejected() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        let t0 = Instant::now();

        app.engine.start(t0);
        app.select_kind(TimerKind::BreakLong);

        assert_eq!(app.engine.kind(), TimerKind::FocusShort);
        assert!(app.status.is_some());
    }
}
