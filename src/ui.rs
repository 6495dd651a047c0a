use crate::app::{update, AppMsg, Effect};
use crate::model::{parse_selection, validate_app_config, AppConfig, ResponseField, SubmissionForm};
use crate::services::api_client::{spawn_fetch_code, spawn_submit, ApiClient};
use crate::services::encoder::spawn_encode_file;
use crate::services::response::render_summary;
use crate::widgets::chrome::centered_rect;
use crate::widgets::form::draw_form;
use crate::widgets::header::draw_header;
use crate::widgets::result_viewer::draw_result;
use crate::widgets::status_bar::draw_footer_combined;
use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::fs;
use std::io::Stdout;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tui_textarea::TextArea;

const CONFIG_FILE: &str = "bfhl-tui.yaml";

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) form: SubmissionForm,
    pub(crate) focus: Focus,
    pub(crate) editing: bool,
    pub(crate) json_area: TextArea<'static>,
    // Path buffer while the file row is being edited
    pub(crate) file_input: String,
    pub(crate) option_cursor: usize,
    pub(crate) tick: u64,
    pub(crate) status_text: Option<String>,
    pub(crate) toast: Option<Toast>,
    pub(crate) theme: crate::theme::Theme,
    pub(crate) show_debug: bool,
    // Debug log (rendered in bottom debug pane)
    pub(crate) debug_log: VecDeque<String>,
    client: Option<ApiClient>,
    tx: Option<Sender<LoadMsg>>,
    rx: Option<Receiver<LoadMsg>>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    #[default]
    Json,
    File,
    Submit,
    Options,
    Get,
}

impl AppState {
    pub(crate) fn new(config: AppConfig) -> Result<Self> {
        let client = ApiClient::new(&config.base_url)?;
        let (tx, rx) = mpsc::channel::<LoadMsg>();
        let mut json_area = TextArea::default();
        json_area.set_placeholder_text(config.json_placeholder.clone());
        Ok(Self {
            config,
            client: Some(client),
            tx: Some(tx),
            rx: Some(rx),
            json_area,
            ..Default::default()
        })
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

fn show_toast(state: &mut AppState, text: impl Into<String>, level: ToastLevel, seconds: u64) {
    let ticks = seconds.saturating_mul(5); // ~200ms tick
    state.toast = Some(Toast {
        text: text.into(),
        level,
        expires_at_tick: state.tick.saturating_add(ticks),
    });
}

// Async loading support
pub(crate) enum LoadOutcome {
    Encoded(String),
    Response(JsonValue),
    OperationCode(Option<String>),
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum LoadKind {
    FileEncode { seq: u64 },
    Submit,
    FetchCode,
}

pub(crate) struct LoadMsg {
    pub(crate) kind: LoadKind,
    pub(crate) outcome: Result<LoadOutcome, String>,
}

const UNEXPECTED_OUTCOME: &str = "unexpected load outcome";

impl LoadMsg {
    fn into_app_msg(self) -> AppMsg {
        match self.kind {
            LoadKind::FileEncode { seq } => AppMsg::FileEncoded {
                seq,
                outcome: self.outcome.and_then(|o| match o {
                    LoadOutcome::Encoded(text) => Ok(text),
                    _ => Err(UNEXPECTED_OUTCOME.into()),
                }),
            },
            LoadKind::Submit => AppMsg::Submitted {
                outcome: self.outcome.and_then(|o| match o {
                    LoadOutcome::Response(v) => Ok(v),
                    _ => Err(UNEXPECTED_OUTCOME.into()),
                }),
            },
            LoadKind::FetchCode => AppMsg::FetchedCode {
                outcome: self.outcome.and_then(|o| match o {
                    LoadOutcome::OperationCode(code) => Ok(code),
                    _ => Err(UNEXPECTED_OUTCOME.into()),
                }),
            },
        }
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::EncodeFile { seq, source } => {
                if let Some(tx) = state.tx.clone() {
                    spawn_encode_file(source, seq, tx);
                }
            }
            Effect::SubmitPayload { payload } => {
                if let (Some(client), Some(tx)) = (state.client.clone(), state.tx.clone()) {
                    info!(endpoint = %client.endpoint(), "submit dispatched");
                    spawn_submit(client, payload, tx);
                } else {
                    state.dbg("submit: no client configured");
                }
            }
            Effect::FetchOperationCode => {
                if let (Some(client), Some(tx)) = (state.client.clone(), state.tx.clone()) {
                    info!(endpoint = %client.endpoint(), "operation code fetch dispatched");
                    spawn_fetch_code(client, tx);
                } else {
                    state.dbg("fetch: no client configured");
                }
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => show_toast(state, text, level, seconds),
        }
    }
}

pub(crate) fn dispatch(state: &mut AppState, msg: AppMsg) {
    let effects = update(state, msg);
    run_effects(state, effects);
    clamp_focus(state);
}

// Pump worker results into the controller
fn drain_loads(state: &mut AppState) {
    let mut drained: Vec<LoadMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
    }
    for msg in drained {
        dispatch(state, msg.into_app_msg());
    }
}

// -------- Focus ---------------------------------------------------------------
pub(crate) fn focus_order(form: &SubmissionForm) -> Vec<Focus> {
    let mut order = vec![Focus::Json, Focus::File, Focus::Submit];
    if form.has_response() {
        order.push(Focus::Options);
        if form.can_fetch_code() {
            order.push(Focus::Get);
        }
    }
    order
}

fn move_focus(state: &mut AppState, delta: isize) {
    let order = focus_order(&state.form);
    let idx = order.iter().position(|f| *f == state.focus).unwrap_or(0) as isize;
    let next = (idx + delta).rem_euclid(order.len() as isize) as usize;
    state.focus = order[next];
}

// Keep focus on a visible control after the form changes shape
fn clamp_focus(state: &mut AppState) {
    let order = focus_order(&state.form);
    if !order.contains(&state.focus) {
        state.focus = *order.last().unwrap_or(&Focus::Json);
        state.editing = false;
    }
}

// -------- Keys ----------------------------------------------------------------
/// Handle one key press; returns true when the app should quit.
pub(crate) fn handle_key(state: &mut AppState, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return true;
    }
    if state.editing {
        match state.focus {
            Focus::Json => edit_json_key(state, key),
            Focus::File => edit_file_key(state, key),
            Focus::Options => options_key(state, key),
            Focus::Submit | Focus::Get => state.editing = false,
        }
        return false;
    }
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('y') if ctrl => copy_summary(state),
        KeyCode::Char('s') => dispatch(state, AppMsg::Submit),
        KeyCode::Tab | KeyCode::Down => move_focus(state, 1),
        KeyCode::BackTab | KeyCode::Up => move_focus(state, -1),
        KeyCode::F(12) => state.show_debug = !state.show_debug,
        KeyCode::Enter | KeyCode::Char(' ') => activate(state),
        _ => {}
    }
    false
}

fn activate(state: &mut AppState) {
    match state.focus {
        Focus::Json | Focus::Options => state.editing = true,
        Focus::File => {
            state.file_input = state.form.file.clone().unwrap_or_default();
            state.editing = true;
        }
        Focus::Submit => dispatch(state, AppMsg::Submit),
        Focus::Get => dispatch(state, AppMsg::FetchCode),
    }
}

fn edit_json_key(state: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => state.editing = false,
        KeyCode::Char('s') if ctrl => state.editing = false,
        _ => {
            if state.json_area.input(key) {
                let text = state.json_area.lines().join("\n");
                dispatch(state, AppMsg::EditJson(text));
            }
        }
    }
}

fn edit_file_key(state: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => state.editing = false,
        KeyCode::Enter => {
            state.editing = false;
            let input = state.file_input.clone();
            dispatch(state, AppMsg::SelectFile(input));
        }
        KeyCode::Backspace => {
            state.file_input.pop();
        }
        KeyCode::Char('u') if ctrl => state.file_input.clear(),
        KeyCode::Char(c) if !ctrl => state.file_input.push(c),
        _ => {}
    }
}

fn options_key(state: &mut AppState, key: KeyEvent) {
    let last = ResponseField::ALL.len() - 1;
    match key.code {
        KeyCode::Up => state.option_cursor = state.option_cursor.saturating_sub(1),
        KeyCode::Down => state.option_cursor = (state.option_cursor + 1).min(last),
        KeyCode::Char(' ') => {
            let field = ResponseField::ALL[state.option_cursor.min(last)];
            dispatch(state, AppMsg::ToggleOption(field));
        }
        KeyCode::Enter | KeyCode::Esc => state.editing = false,
        _ => {}
    }
}

fn copy_summary(state: &mut AppState) {
    let Some(text) = render_summary(state.form.api_response.as_ref(), &state.form.selected)
    else {
        show_toast(state, "Nothing to copy", ToastLevel::Info, 2);
        return;
    };
    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text)) {
        Ok(()) => show_toast(state, "Copied to clipboard!", ToastLevel::Success, 2),
        Err(e) => {
            warn!("clipboard unavailable: {e}");
            state.dbg(format!("clipboard: {e}"));
            show_toast(state, "Clipboard unavailable", ToastLevel::Error, 3);
        }
    }
}

fn help_text(state: &AppState) -> &'static str {
    if state.editing {
        match state.focus {
            Focus::Json => "Type JSON • Esc/Ctrl+S done",
            Focus::File => "Path or data: URI • Enter select • Esc cancel • Ctrl+U clear",
            Focus::Options => "↑/↓ move • Space toggle • Enter/Esc close",
            Focus::Submit | Focus::Get => "",
        }
    } else {
        "Tab/↑↓ move • Enter activate • s submit • Ctrl+Y copy • F12 debug • q quit"
    }
}

// -------- Config ---------------------------------------------------------------
// First match wins: explicit path, ./, ./.tui/, ~/.tui/
fn discover_config(explicit: Option<PathBuf>, cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    // An explicit path is returned even if missing so the read error surfaces
    if let Some(p) = explicit {
        return Some(p);
    }
    let mut candidates = vec![cwd.join(CONFIG_FILE), cwd.join(".tui").join(CONFIG_FILE)];
    if let Some(home) = home {
        candidates.push(home.join(".tui").join(CONFIG_FILE));
    }
    candidates.into_iter().find(|p| p.exists())
}

fn find_config_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(PathBuf::from);
    discover_config(
        std::env::var("BFHL_TUI_CONFIG").ok().map(PathBuf::from),
        &cwd,
        home.as_deref(),
    )
}

/// Build the config from an optional YAML file plus the base URL override.
pub(crate) fn config_from(path: Option<&Path>, env_url: Option<String>) -> Result<AppConfig> {
    let mut cfg = match path {
        Some(p) => {
            let s = fs::read_to_string(p).with_context(|| format!("reading {p:?}"))?;
            serde_yaml::from_str::<AppConfig>(&s).with_context(|| format!("parsing {p:?}"))?
        }
        None => AppConfig::default(),
    };
    if let Some(url) = env_url.filter(|u| !u.trim().is_empty()) {
        cfg.base_url = url;
    }
    validate_app_config(&cfg).map_err(|e| anyhow!(e))?;
    Ok(cfg)
}

pub(crate) fn load_config() -> Result<AppConfig> {
    config_from(
        find_config_path().as_deref(),
        std::env::var("BFHL_TUI_BASE_URL").ok(),
    )
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

// -------- Run loop -------------------------------------------------------------
pub fn run() -> Result<()> {
    let cfg = load_config()?;
    let log = crate::services::logging::init(&cfg);
    let mut state = AppState::new(cfg)?;
    match log {
        Ok(path) => state.dbg(format!("log: {}", path.display())),
        Err(e) => state.dbg(format!("log: disabled ({e:#})")),
    }
    info!(base_url = %state.config.base_url, "starting");
    if env_flag("BFHL_TUI_HEADLESS") {
        return run_headless(&mut state);
    }
    // Setup terminal (interactive)
    enable_raw_mode()?;
    let mut terminal = restore_on_error(enter_terminal, || {
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })?;
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    let res: Result<()> = loop {
        if let Err(e) = terminal.draw(|f| ui(f, &mut state)) {
            break Err(e.into());
        }
        drain_loads(&mut state);
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if handle_key(&mut state, key) {
                        break Ok(());
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    };
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("exiting");
    res
}

fn enter_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

// Run `setup`; if it fails, undo partial terminal changes before returning the error
fn restore_on_error<T>(setup: impl FnOnce() -> Result<T>, restore: impl FnOnce()) -> Result<T> {
    setup().map_err(|e| {
        restore();
        e
    })
}

fn smoke_summary(state: &AppState, submitted: bool) -> JsonValue {
    serde_json::json!({
        "ok": state.form.error.is_none(),
        "error": state.form.error,
        "submitted": submitted,
        "response_present": state.form.has_response(),
        "summary": render_summary(state.form.api_response.as_ref(), &state.form.selected),
        "operation_code": state.form.operation_code,
        "file_b64_len": state.form.file_b64.len(),
    })
}

// Headless smoke mode: drive the form from env vars against a TestBackend
fn run_headless(state: &mut AppState) -> Result<()> {
    let ticks: u64 = std::env::var("BFHL_TUI_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(25);
    let summary_wanted = env_flag("BFHL_TUI_SMOKE_SUMMARY");
    let fetch_wanted = env_flag("BFHL_TUI_FETCH_CODE");
    let selection = std::env::var("BFHL_TUI_SELECT")
        .ok()
        .map(|s| parse_selection(&s));
    let json_input = std::env::var("BFHL_TUI_JSON").ok();
    if let Some(text) = &json_input {
        state.json_area.insert_str(text);
        dispatch(state, AppMsg::EditJson(text.clone()));
    }
    if let Ok(file) = std::env::var("BFHL_TUI_FILE") {
        dispatch(state, AppMsg::SelectFile(file));
    }
    let backend = ratatui::backend::TestBackend::new(100, 32);
    let mut terminal = Terminal::new(backend)?;
    let tick_rate = Duration::from_millis(200);
    let mut submitted = false;
    let mut selection_applied = false;
    let mut fetched = false;
    for _ in 0..ticks {
        terminal.draw(|f| ui(f, state))?;
        drain_loads(state);
        if json_input.is_some() && !submitted && !state.form.encoding {
            dispatch(state, AppMsg::Submit);
            submitted = true;
        }
        if submitted && state.form.submits_in_flight == 0 && state.form.has_response() {
            if !selection_applied {
                if let Some(sel) = selection.clone() {
                    dispatch(state, AppMsg::SetSelection(sel));
                }
                selection_applied = true;
            }
            if fetch_wanted && !fetched && state.form.can_fetch_code() {
                dispatch(state, AppMsg::FetchCode);
                fetched = true;
            }
        }
        state.tick = state.tick.wrapping_add(1);
        std::thread::sleep(tick_rate);
    }
    if summary_wanted {
        println!("{}", smoke_summary(state, submitted));
    }
    Ok(())
}

// -------- Drawing --------------------------------------------------------------
fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }
    let screen = f.area();
    f.render_widget(Block::default().style(state.theme.base()), screen);

    let debug_h = if state.show_debug { 8 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(8),
            Constraint::Length(debug_h),
            Constraint::Length(1),
        ])
        .split(screen);
    draw_header(f, rows[0], state);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    draw_form(f, body[0], state);
    draw_result(f, body[1], state);
    if state.show_debug {
        draw_debug(f, rows[2], state);
    }
    draw_footer_combined(f, rows[3], state, help_text(state));

    // Overlay the JSON editor while it is active
    if state.editing && state.focus == Focus::Json {
        state.json_area.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(state.theme.border(true))
                .title("Enter JSON • Esc/Ctrl+S done"),
        );
        let rect = centered_rect(80, 70, screen);
        f.render_widget(Clear, rect);
        f.render_widget(&state.json_area, rect);
    }
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            "Debug",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ));
    // Take last `area.height` lines
    let h = area.height as usize;
    let start = state.debug_log.len().saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(st: &mut AppState, text: &str) {
        for c in text.chars() {
            assert!(!handle_key(st, press(KeyCode::Char(c))));
        }
    }

    #[test]
    fn focus_cycles_over_visible_controls() {
        let mut st = AppState::default();
        assert_eq!(focus_order(&st.form), vec![Focus::Json, Focus::File, Focus::Submit]);
        handle_key(&mut st, press(KeyCode::Tab));
        handle_key(&mut st, press(KeyCode::Tab));
        assert_eq!(st.focus, Focus::Submit);
        handle_key(&mut st, press(KeyCode::Tab));
        assert_eq!(st.focus, Focus::Json);
        handle_key(&mut st, press(KeyCode::BackTab));
        assert_eq!(st.focus, Focus::Submit);

        st.form.api_response = Some(json!({}));
        st.form.selected.insert(ResponseField::Numbers);
        assert_eq!(focus_order(&st.form).last(), Some(&Focus::Get));
    }

    #[test]
    fn typing_json_updates_input_and_clears_error() {
        let mut st = AppState::default();
        st.form.error = Some("Invalid JSON format".into());
        handle_key(&mut st, press(KeyCode::Enter));
        assert!(st.editing);
        type_text(&mut st, r#"{"a":1}"#);
        assert_eq!(st.form.raw_input, r#"{"a":1}"#);
        assert!(st.form.error.is_none());
        handle_key(&mut st, press(KeyCode::Esc));
        assert!(!st.editing);
    }

    #[test]
    fn submit_with_invalid_json_sets_error() {
        let mut st = AppState::default();
        st.form.raw_input = "{bad".into();
        st.focus = Focus::Submit;
        handle_key(&mut st, press(KeyCode::Enter));
        assert_eq!(st.form.error.as_deref(), Some("Invalid JSON format"));
        assert_eq!(st.form.submits_in_flight, 0);
    }

    #[test]
    fn file_row_edits_and_selects_path() {
        let mut st = AppState::default();
        st.focus = Focus::File;
        handle_key(&mut st, press(KeyCode::Enter));
        type_text(&mut st, "pic.pngx");
        handle_key(&mut st, press(KeyCode::Backspace));
        handle_key(&mut st, press(KeyCode::Enter));
        assert!(!st.editing);
        assert_eq!(st.form.file.as_deref(), Some("pic.png"));
        assert!(st.form.encoding);
        assert_eq!(st.form.file_seq, 1);
    }

    #[test]
    fn options_toggle_and_focus_recovers_when_get_disappears() {
        let mut st = AppState::default();
        st.form.api_response = Some(json!({"numbers": ["1"]}));
        st.focus = Focus::Options;
        handle_key(&mut st, press(KeyCode::Enter));
        handle_key(&mut st, press(KeyCode::Down));
        handle_key(&mut st, press(KeyCode::Char(' ')));
        assert!(st.form.selected.contains(&ResponseField::Numbers));
        handle_key(&mut st, press(KeyCode::Esc));
        handle_key(&mut st, press(KeyCode::Tab));
        assert_eq!(st.focus, Focus::Get);

        // Deselecting hides GET, focus falls back to the options list
        st.focus = Focus::Options;
        handle_key(&mut st, press(KeyCode::Enter));
        handle_key(&mut st, press(KeyCode::Char(' ')));
        assert!(st.form.selected.is_empty());
        st.focus = Focus::Get;
        dispatch(&mut st, AppMsg::SetSelection(Default::default()));
        assert_eq!(st.focus, Focus::Options);
    }

    #[test]
    fn quit_keys() {
        let mut st = AppState::default();
        assert!(handle_key(&mut st, ctrl('c')));
        assert!(handle_key(&mut st, press(KeyCode::Char('q'))));
        st.editing = true;
        assert!(!handle_key(&mut st, press(KeyCode::Char('q'))));
    }

    #[test]
    fn load_messages_map_to_controller_messages() {
        let msg = LoadMsg {
            kind: LoadKind::Submit,
            outcome: Ok(LoadOutcome::Encoded("x".into())),
        };
        match msg.into_app_msg() {
            AppMsg::Submitted { outcome } => assert!(outcome.is_err()),
            _ => panic!("expected Submitted"),
        }
        let msg = LoadMsg {
            kind: LoadKind::FetchCode,
            outcome: Ok(LoadOutcome::OperationCode(Some("1".into()))),
        };
        match msg.into_app_msg() {
            AppMsg::FetchedCode { outcome } => assert_eq!(outcome.unwrap().as_deref(), Some("1")),
            _ => panic!("expected FetchedCode"),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bfhl-cfg-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn config_discovery_order() {
        let root = scratch_dir("discover");
        let cwd = root.join("work");
        let home = root.join("home");
        fs::create_dir_all(cwd.join(".tui")).unwrap();
        fs::create_dir_all(home.join(".tui")).unwrap();
        assert_eq!(discover_config(None, &cwd, Some(&home)), None);

        let home_cfg = home.join(".tui").join(CONFIG_FILE);
        fs::write(&home_cfg, "title: home\n").unwrap();
        assert_eq!(discover_config(None, &cwd, Some(&home)), Some(home_cfg));

        let dot_tui = cwd.join(".tui").join(CONFIG_FILE);
        fs::write(&dot_tui, "title: dot\n").unwrap();
        assert_eq!(discover_config(None, &cwd, Some(&home)), Some(dot_tui));

        let local = cwd.join(CONFIG_FILE);
        fs::write(&local, "title: local\n").unwrap();
        assert_eq!(discover_config(None, &cwd, Some(&home)), Some(local));

        // An explicit path wins even when it does not exist
        let explicit = root.join("missing.yaml");
        assert_eq!(
            discover_config(Some(explicit.clone()), &cwd, Some(&home)),
            Some(explicit)
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn config_file_values_and_base_url_override() {
        let dir = scratch_dir("override");
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, "base_url: http://localhost:3000\ntitle: Lab form\n").unwrap();

        let cfg = config_from(Some(&path), None).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:3000");
        assert_eq!(cfg.title, "Lab form");

        let cfg = config_from(Some(&path), Some("https://api.example.com".into())).unwrap();
        assert_eq!(cfg.base_url, "https://api.example.com");
        assert_eq!(cfg.title, "Lab form");

        // Blank override is ignored
        let cfg = config_from(Some(&path), Some("  ".into())).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:3000");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn config_errors_are_fatal() {
        let dir = scratch_dir("errors");
        let path = dir.join(CONFIG_FILE);
        fs::write(&path, "base_url: [unclosed\n").unwrap();
        let err = config_from(Some(&path), None).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));

        let err = config_from(Some(&dir.join("absent.yaml")), None).unwrap_err();
        assert!(format!("{err:#}").contains("reading"));

        assert!(config_from(None, Some("ftp://nope".into())).is_err());
        assert_eq!(
            config_from(None, None).unwrap().base_url,
            AppConfig::default().base_url
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_terminal_setup_restores() {
        let mut restored = false;
        let res: Result<()> = restore_on_error(|| Err(anyhow!("no tty")), || restored = true);
        assert!(res.is_err());
        assert!(restored);

        let mut restored = false;
        let res = restore_on_error(|| Ok(7), || restored = true);
        assert_eq!(res.unwrap(), 7);
        assert!(!restored);
    }

    #[test]
    fn smoke_summary_reports_form_outcome() {
        let mut st = AppState::default();
        st.form.api_response = Some(json!({"alphabets": ["A"], "numbers": ["1"]}));
        st.form.selected.insert(ResponseField::Numbers);
        st.form.operation_code = Some("1".into());
        st.form.file_b64 = "Zm9v".into();
        assert_eq!(
            smoke_summary(&st, true),
            json!({
                "ok": true,
                "error": null,
                "submitted": true,
                "response_present": true,
                "summary": "Numbers: 1",
                "operation_code": "1",
                "file_b64_len": 4,
            })
        );

        let mut st = AppState::default();
        st.form.error = Some("Invalid JSON format".into());
        let v = smoke_summary(&st, false);
        assert_eq!(v["ok"], json!(false));
        assert_eq!(v["summary"], JsonValue::Null);
        assert_eq!(v["response_present"], json!(false));
    }

    #[test]
    fn full_screen_renders_without_panic() {
        let mut st = AppState::default();
        st.show_debug = true;
        st.dbg("hello");
        st.editing = true;
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, &mut st)).unwrap();
    }
}
