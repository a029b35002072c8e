// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use jobtrack_app::{
    AppCommand, AppEvent, AppMode, AppState, ApplicationFormInput, ApplicationRecord, ColumnKey,
    ColumnModel, DateStyle, Detail, FetchError, FetchState, FetchTracker, FormField, GridView,
    JobId, NOT_FOUND_MESSAGE, NormalizationError, Normalized, RawRecord, RequestId, Route,
    UserId, build_grid, normalize, normalize_all, parse_job_id, resolve,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use serde_json::Value;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const SELECT_COLUMN_WIDTH: u16 = 3;
const CHECKED: &str = "[x]";
const UNCHECKED: &str = "[ ]";

/// The app's only view of storage.
pub trait AppRuntime {
    fn fetch_records(&mut self, user_id: UserId) -> Result<Vec<RawRecord>>;
    fn fetch_record(&mut self, user_id: UserId, job_id: JobId) -> Result<Option<RawRecord>>;
    fn create_record(&mut self, user_id: UserId, payload: &Value) -> Result<JobId>;

    /// Runs `fetch_records` and posts the outcome tagged with `request`.
    /// Runtimes that can load off the UI thread override this.
    fn spawn_fetch(
        &mut self,
        request: RequestId,
        user_id: UserId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self
            .fetch_records(user_id)
            .map_err(|error| FetchError::new(format!("{error:#}")));
        tx.send(InternalEvent::RecordsLoaded { request, result })
            .map_err(|_| anyhow::anyhow!("fetch event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    RecordsLoaded {
        request: RequestId,
        result: Result<Vec<RawRecord>, FetchError>,
    },
}

/// Presentation choices fixed for the lifetime of the app.
#[derive(Debug, Clone, Default)]
pub struct ViewSettings {
    pub columns: ColumnModel,
    pub date_style: DateStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum DetailState {
    #[default]
    Idle,
    Resolved(Detail),
    Malformed(NormalizationError),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormUiState {
    input: ApplicationFormInput,
    field_index: usize,
}

impl FormUiState {
    fn blank() -> Self {
        Self {
            input: ApplicationFormInput::blank(),
            field_index: 0,
        }
    }

    fn field(&self) -> FormField {
        FormField::ALL
            .get(self.field_index)
            .copied()
            .unwrap_or(FormField::Position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListCommand {
    MoveRow(isize),
    MoveColumn(isize),
    FirstRow,
    LastRow,
    ToggleSelection,
    Activate,
    CycleSort,
    ClearSort,
    Refresh,
    OpenForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GridHit {
    SelectAll,
    Header(usize),
    Row { row: usize, column: Option<usize> },
}

#[derive(Debug, Default)]
struct ViewData {
    settings: ViewSettings,
    tracker: FetchTracker,
    records: FetchState<Vec<ApplicationRecord>>,
    rejected: Vec<NormalizationError>,
    selected_row: usize,
    selected_col: usize,
    detail: DetailState,
    form: Option<FormUiState>,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn new(settings: ViewSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    settings: ViewSettings,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(settings);
    let (internal_tx, internal_rx) = mpsc::channel();

    start_view(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size().context("read terminal size")?;
                    let screen = Rect::new(0, 0, size.width, size.height);
                    handle_mouse_event(
                        state,
                        runtime,
                        &mut view_data,
                        &internal_tx,
                        mouse,
                        screen,
                    );
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn start_view<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    request_records(state, runtime, view_data, internal_tx);
    if matches!(state.route, Route::JobDescription(_)) {
        load_detail(state, runtime, view_data);
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::RecordsLoaded { request, result } => {
                apply_records_loaded(state, view_data, tx, request, result);
            }
        }
    }
}

fn request_records<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let request = view_data.tracker.begin();
    view_data.records = FetchState::Loading { request };
    tracing::debug!(%request, user_id = %state.user_id, "fetch issued");

    if let Err(error) = runtime.spawn_fetch(request, state.user_id, internal_tx.clone()) {
        let error = FetchError::new(format!("{error:#}"));
        tracing::warn!(%request, "fetch could not start: {error}");
        view_data
            .tracker
            .complete(&mut view_data.records, request, Err(error.clone()));
        emit_status(state, view_data, internal_tx, format!("load failed: {error}"));
    }
}

fn apply_records_loaded(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    request: RequestId,
    result: Result<Vec<RawRecord>, FetchError>,
) {
    if !view_data.tracker.is_latest(request) {
        tracing::debug!(%request, "discarding stale fetch completion");
        return;
    }

    let raws = match result {
        Ok(raws) => raws,
        Err(error) => {
            tracing::warn!(%request, "fetch failed: {error}");
            view_data
                .tracker
                .complete(&mut view_data.records, request, Err(error));
            view_data.rejected.clear();
            return;
        }
    };

    let Normalized { records, rejected } = normalize_all(&raws);
    for error in &rejected {
        tracing::warn!(
            record_id = %error.record_id,
            field = error.field.as_str(),
            "skipping malformed record: {error}"
        );
    }
    tracing::debug!(
        %request,
        shown = records.len(),
        skipped = rejected.len(),
        "fetch completed"
    );

    state.selection.retain_present(&records);
    view_data
        .tracker
        .complete(&mut view_data.records, request, Ok(records));
    let skipped = rejected.len();
    view_data.rejected = rejected;
    clamp_cursor(state, view_data);

    if skipped > 0 {
        let noun = if skipped == 1 { "record" } else { "records" };
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("skipped {skipped} malformed {noun}; see the log for details"),
        );
    }
}

fn load_detail<R: AppRuntime>(state: &AppState, runtime: &mut R, view_data: &mut ViewData) {
    let Route::JobDescription(segment) = &state.route else {
        view_data.detail = DetailState::Idle;
        return;
    };

    view_data.detail = match parse_job_id(segment) {
        None => DetailState::Resolved(Detail::NotFound),
        Some(job_id) => match runtime.fetch_record(state.user_id, job_id) {
            Err(error) => {
                tracing::warn!(%job_id, "detail load failed: {error:#}");
                DetailState::Failed(format!("{error:#}"))
            }
            Ok(None) => DetailState::Resolved(Detail::NotFound),
            Ok(Some(raw)) => match normalize(&raw) {
                Ok(record) => DetailState::Resolved(resolve(segment, &[record])),
                Err(error) => {
                    tracing::warn!(%job_id, "detail record is malformed: {error}");
                    DetailState::Malformed(error)
                }
            },
        },
    };
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    for event in &events {
        if let AppEvent::RouteChanged(route) = event {
            match route {
                Route::JobTracker => {
                    view_data.detail = DetailState::Idle;
                    request_records(state, runtime, view_data, internal_tx);
                }
                Route::JobDescription(_) => load_detail(state, runtime, view_data),
            }
        }
    }
    sync_form_ui_state(state, view_data);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn sync_form_ui_state(state: &AppState, view_data: &mut ViewData) {
    match state.mode {
        AppMode::Form => {
            if view_data.form.is_none() {
                view_data.form = Some(FormUiState::blank());
            }
        }
        AppMode::Nav => view_data.form = None,
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if state.mode == AppMode::Form {
        handle_form_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if key.code == KeyCode::Char('?') {
        view_data.help_visible = true;
        return false;
    }

    match state.route {
        Route::JobTracker => handle_list_key(state, runtime, view_data, internal_tx, key),
        Route::JobDescription(_) => match key.code {
            KeyCode::Esc | KeyCode::Char('b') => {
                dispatch_and_refresh(state, runtime, view_data, AppCommand::Back, internal_tx);
            }
            KeyCode::Char('r') => load_detail(state, runtime, view_data),
            _ => {}
        },
    }
    false
}

fn list_command_for_key(key: KeyEvent) -> Option<ListCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(ListCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(ListCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(ListCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(ListCommand::MoveColumn(1)),
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(ListCommand::FirstRow),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Some(ListCommand::LastRow),
        (KeyCode::Char(' '), _) => Some(ListCommand::ToggleSelection),
        (KeyCode::Enter, _) => Some(ListCommand::Activate),
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(ListCommand::CycleSort),
        (KeyCode::Char('S'), _) => Some(ListCommand::ClearSort),
        (KeyCode::Char('r'), KeyModifiers::NONE) => Some(ListCommand::Refresh),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(ListCommand::OpenForm),
        _ => None,
    }
}

fn handle_list_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(command) = list_command_for_key(key) else {
        return;
    };
    let grid = current_grid(state, view_data);
    let row_count = grid.as_ref().map_or(0, |grid| grid.rows.len());

    match command {
        ListCommand::MoveRow(delta) => {
            view_data.selected_row = step(view_data.selected_row, delta, row_count);
        }
        ListCommand::MoveColumn(delta) => {
            let columns = view_data.settings.columns.column_count();
            view_data.selected_col = step(view_data.selected_col, delta, columns);
        }
        ListCommand::FirstRow => view_data.selected_row = 0,
        ListCommand::LastRow => view_data.selected_row = row_count.saturating_sub(1),
        ListCommand::ToggleSelection => {
            if let Some(row) = grid.as_ref().and_then(|grid| grid.row(view_data.selected_row)) {
                state.dispatch(AppCommand::ToggleSelection(row.id));
            }
        }
        ListCommand::Activate => {
            if let Some(row) = grid.as_ref().and_then(|grid| grid.row(view_data.selected_row)) {
                let target = row.target.clone();
                dispatch_and_refresh(
                    state,
                    runtime,
                    view_data,
                    AppCommand::Navigate(target),
                    internal_tx,
                );
            }
        }
        ListCommand::CycleSort => {
            if grid.is_none() {
                return;
            }
            let Some(column) = focused_column(view_data) else {
                return;
            };
            dispatch_and_refresh(
                state,
                runtime,
                view_data,
                AppCommand::CycleSort(column),
                internal_tx,
            );
        }
        ListCommand::ClearSort => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::ClearSort, internal_tx);
        }
        ListCommand::Refresh => request_records(state, runtime, view_data, internal_tx),
        ListCommand::OpenForm => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::OpenForm, internal_tx);
        }
    }
}

fn handle_mouse_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
    screen: Rect,
) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left)
        || state.mode != AppMode::Nav
        || state.route != Route::JobTracker
        || view_data.help_visible
    {
        return;
    }
    let Some(grid) = current_grid(state, view_data) else {
        return;
    };
    let body = screen_layout(screen)[1];

    match grid_hit(&grid, body, mouse.column, mouse.row) {
        None => {}
        Some(GridHit::SelectAll) => {
            // Clear the page when it is fully selected, otherwise fill it.
            let ids = grid
                .rows
                .iter()
                .filter(|row| row.selected == grid.all_selected)
                .map(|row| row.id)
                .collect::<Vec<_>>();
            for id in ids {
                state.dispatch(AppCommand::ToggleSelection(id));
            }
        }
        Some(GridHit::Header(column)) => {
            view_data.selected_col = column;
            if let Some(header) = grid.headers.get(column)
                && header.sortable
            {
                dispatch_and_refresh(
                    state,
                    runtime,
                    view_data,
                    AppCommand::CycleSort(header.key),
                    internal_tx,
                );
            }
        }
        Some(GridHit::Row { row, column }) => {
            view_data.selected_row = row;
            let Some(grid_row) = grid.row(row) else {
                return;
            };
            match column {
                None => {
                    state.dispatch(AppCommand::ToggleSelection(grid_row.id));
                }
                Some(column) => {
                    view_data.selected_col = column;
                    dispatch_and_refresh(
                        state,
                        runtime,
                        view_data,
                        AppCommand::Navigate(grid_row.target.clone()),
                        internal_tx,
                    );
                }
            }
        }
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    sync_form_ui_state(state, view_data);
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            dispatch_and_refresh(state, runtime, view_data, AppCommand::ExitToNav, internal_tx);
            emit_status(state, view_data, internal_tx, "form cancelled");
        }
        (KeyCode::Enter, _) => submit_form(state, runtime, view_data, internal_tx),
        (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::Down, _) => move_form_field(view_data, 1),
        (KeyCode::BackTab, _) | (KeyCode::Up, _) => move_form_field(view_data, -1),
        (code, modifiers) => {
            let Some(form) = view_data.form.as_mut() else {
                return;
            };
            let field = form.field();
            if field.is_choice() {
                match code {
                    KeyCode::Left => form.input.cycle_status(-1),
                    KeyCode::Right | KeyCode::Char(' ') => form.input.cycle_status(1),
                    _ => {}
                }
                return;
            }
            match code {
                KeyCode::Backspace => {
                    form.input.value_mut(field).pop();
                }
                KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                    form.input.value_mut(field).push(ch);
                }
                _ => {}
            }
        }
    }
}

fn move_form_field(view_data: &mut ViewData, delta: isize) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let len = FormField::ALL.len() as isize;
    form.field_index = (form.field_index as isize + delta).rem_euclid(len) as usize;
}

fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let payload = match form.input.to_payload() {
        Ok(payload) => payload,
        Err(error) => {
            if let Some(index) = FormField::ALL.iter().position(|field| *field == error.field) {
                form.field_index = index;
            }
            emit_status(state, view_data, internal_tx, error.to_string());
            return;
        }
    };

    match runtime.create_record(state.user_id, &payload) {
        Ok(job_id) => {
            tracing::info!(%job_id, user_id = %state.user_id, "job application created");
            dispatch_and_refresh(state, runtime, view_data, AppCommand::ExitToNav, internal_tx);
            emit_status(state, view_data, internal_tx, format!("saved job {job_id}"));
            request_records(state, runtime, view_data, internal_tx);
        }
        Err(error) => {
            tracing::error!("saving job application failed: {error:#}");
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("save failed: {error:#}"),
            );
        }
    }
}

fn current_grid(state: &AppState, view_data: &ViewData) -> Option<GridView> {
    let records = view_data.records.ready()?;
    Some(build_grid(
        records,
        &view_data.settings.columns,
        &state.sort,
        &state.selection,
        view_data.settings.date_style,
    ))
}

fn focused_column(view_data: &ViewData) -> Option<ColumnKey> {
    view_data
        .settings
        .columns
        .columns()
        .get(view_data.selected_col)
        .map(|column| column.key)
}

fn clamp_cursor(state: &AppState, view_data: &mut ViewData) {
    let rows = current_grid(state, view_data).map_or(0, |grid| grid.rows.len());
    view_data.selected_row = view_data.selected_row.min(rows.saturating_sub(1));
    let columns = view_data.settings.columns.column_count();
    view_data.selected_col = view_data.selected_col.min(columns.saturating_sub(1));
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    next.min(len - 1)
}

fn screen_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(area)
}

fn column_constraints(data_columns: usize) -> Vec<Constraint> {
    let mut widths = Vec::with_capacity(data_columns + 1);
    widths.push(Constraint::Length(SELECT_COLUMN_WIDTH));
    widths.extend(std::iter::repeat_n(Constraint::Fill(1), data_columns));
    widths
}

/// Maps a terminal cell inside the list body to the grid part drawn there.
fn grid_hit(grid: &GridView, body: Rect, x: u16, y: u16) -> Option<GridHit> {
    let inner = Block::default().borders(Borders::ALL).inner(body);
    if x < inner.x || x >= inner.right() || y < inner.y || y >= inner.bottom() {
        return None;
    }

    let header_line = Rect { height: 1, ..inner };
    let columns = Layout::horizontal(column_constraints(grid.headers.len()))
        .spacing(1)
        .split(header_line);
    let column = columns
        .iter()
        .position(|area| x >= area.x && x < area.right())?;

    if y == inner.y {
        return Some(match column {
            0 => GridHit::SelectAll,
            column => GridHit::Header(column - 1),
        });
    }

    let row = usize::from(y - inner.y - 1);
    if row >= grid.rows.len() {
        return None;
    }
    Some(GridHit::Row {
        row,
        column: column.checked_sub(1),
    })
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = screen_layout(frame.area());

    let breadcrumb = Paragraph::new(render_breadcrumb_text(state))
        .block(Block::default().title("jobtrack").borders(Borders::ALL));
    frame.render_widget(breadcrumb, layout[0]);

    match &state.route {
        Route::JobTracker => render_list(frame, layout[1], state, view_data),
        Route::JobDescription(segment) => {
            let detail = Paragraph::new(render_detail_text(&view_data.detail, &view_data.settings))
                .wrap(Wrap { trim: false })
                .block(
                    Block::default()
                        .title(format!("job {segment}"))
                        .borders(Borders::ALL),
                );
            frame.render_widget(detail, layout[1]);
        }
    }

    let status = status_text(state, view_data);
    let status_widget = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let Some(form) = &view_data.form {
        let area = centered_rect(60, 60, frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_form_overlay_text(form)).block(
            Block::default()
                .title("new application")
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(overlay, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_breadcrumb_text(state: &AppState) -> String {
    format!("{} | user {}", state.route.path(), state.user_id)
}

fn render_list(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    if let Some(text) = list_placeholder_text(&view_data.records) {
        let style = if view_data.records.error().is_some() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let placeholder = Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: false })
            .block(Block::default().title("applications").borders(Borders::ALL));
        frame.render_widget(placeholder, area);
        return;
    }
    let Some(grid) = current_grid(state, view_data) else {
        return;
    };
    render_table(frame, area, &grid, state, view_data);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    grid: &GridView,
    state: &AppState,
    view_data: &ViewData,
) {
    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let select_all = if grid.all_selected { CHECKED } else { UNCHECKED };
    let mut header_cells = vec![Cell::from(select_all).style(header_style)];
    header_cells.extend(
        grid.headers
            .iter()
            .map(|header| Cell::from(header.title()).style(header_style)),
    );
    let header = Row::new(header_cells);

    let rows = grid.rows.iter().enumerate().map(|(row_index, row)| {
        let selected_row = row_index == view_data.selected_row;
        let row_style = if selected_row {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mark = if row.selected { CHECKED } else { UNCHECKED };
        let mut cells = vec![Cell::from(mark).style(row_style)];
        cells.extend(row.cells.iter().enumerate().map(|(column_index, text)| {
            let style = if selected_row && column_index == view_data.selected_col {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                row_style
            };
            Cell::from(text.as_str()).style(style)
        }));
        Row::new(cells)
    });

    let table = Table::new(rows, column_constraints(grid.headers.len()))
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(grid, state, view_data))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn table_title(grid: &GridView, state: &AppState, view_data: &ViewData) -> String {
    let mut title = format!("applications | showing {} of {}", grid.rows.len(), grid.total);
    if !state.selection.is_empty() {
        title.push_str(&format!(" | {} selected", state.selection.len()));
    }
    if !view_data.rejected.is_empty() {
        title.push_str(&format!(" | {} skipped", view_data.rejected.len()));
    }
    title
}

fn list_placeholder_text(records: &FetchState<Vec<ApplicationRecord>>) -> Option<String> {
    match records {
        FetchState::Idle | FetchState::Loading { .. } => Some("Loading applications...".to_owned()),
        FetchState::Failed(error) => Some(format!(
            "Could not load applications: {error}\n\npress r to retry"
        )),
        FetchState::Ready(records) if records.is_empty() => {
            Some("No applications yet. Press a to add one.".to_owned())
        }
        FetchState::Ready(_) => None,
    }
}

fn render_detail_text(detail: &DetailState, settings: &ViewSettings) -> String {
    let record = match detail {
        DetailState::Idle => return "Loading...".to_owned(),
        DetailState::Resolved(Detail::NotFound) => {
            return format!("{NOT_FOUND_MESSAGE}\n\nesc back to the list");
        }
        DetailState::Malformed(error) => {
            return format!("This record cannot be shown.\n{error}\n\nesc back to the list");
        }
        DetailState::Failed(message) => {
            return format!("Could not load the job: {message}\n\npress r to retry");
        }
        DetailState::Resolved(Detail::Found(record)) => record,
    };

    let style = settings.date_style;
    let columns = &settings.columns;
    let mut lines = vec![
        format!("Position:    {}", record.position),
        format!("Company:     {}", record.company),
        format!("Status:      {}", record.status),
        format!(
            "Applied on:  {}",
            columns.display(ColumnKey::ApplicationDate, record, style)
        ),
        format!(
            "Interview:   {}",
            columns.display(ColumnKey::InterviewDate, record, style)
        ),
        format!("Country:     {}", record.country),
        format!("Expectation: {}", record.expectation),
        String::new(),
        "Description:".to_owned(),
    ];
    if record.description.trim().is_empty() {
        lines.push("(none)".to_owned());
    } else {
        lines.push(record.description.clone());
    }
    lines.push(String::new());
    lines.push(format!(
        "Last saved {}",
        style.format_timestamp(record.saved_at)
    ));
    lines.join("\n")
}

fn render_form_overlay_text(form: &FormUiState) -> String {
    let mut lines = Vec::with_capacity(FormField::ALL.len() + 2);
    for (index, field) in FormField::ALL.iter().copied().enumerate() {
        let marker = if index == form.field_index { ">" } else { " " };
        let value = form.input.value(field);
        let shown = if field.is_choice() {
            format!("< {value} >")
        } else if value.is_empty() {
            match field {
                FormField::ApplicationDate => "YYYY-MM-DD".to_owned(),
                FormField::InterviewDate => "YYYY-MM-DD (optional)".to_owned(),
                _ => String::new(),
            }
        } else {
            value.to_owned()
        };
        lines.push(format!("{marker} {:<19}{shown}", format!("{}:", field.label())));
    }
    lines.push(String::new());
    lines.push("tab/shift+tab field | left/right status | enter save | esc cancel".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ? help\n\
list: j/k rows | h/l columns | g/G first/last | enter or click open\n\
list: space or click [ ] select | s or header click sort | S clear sort\n\
list: a add application | r refresh\n\
detail: esc/b back | r reload\n\
form: tab/shift+tab field | left/right status | enter save | esc cancel"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Form => "FORM",
    };
    let default = match (&view_data.form, &state.route) {
        (Some(form), _) => format!(
            "field {}/{} {} | enter save | esc cancel",
            form.field_index + 1,
            FormField::ALL.len(),
            form.field().label()
        ),
        (None, Route::JobTracker) => {
            "j/k/h/l g/G | enter open | space select | s/S sort | a add | r refresh | ? | ctrl+q"
                .to_owned()
        }
        (None, Route::JobDescription(_)) => "esc/b back | r reload | ? | ctrl+q".to_owned(),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, DetailState, GridHit, InternalEvent, ViewData, ViewSettings, current_grid,
        grid_hit, handle_key_event, handle_mouse_event, list_placeholder_text, render,
        render_detail_text, render_form_overlay_text, screen_layout, start_view, status_text,
        table_title,
    };
    use anyhow::Result;
    use crossterm::event::{
        KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use jobtrack_app::{
        AppMode, AppState, ColumnKey, Detail, FetchError, FetchState, JobId, PAGE_SIZE, RawRecord,
        Route, SortDirection, UserId,
    };
    use jobtrack_testkit::{ApplicationFaker, fixture_datetime, raw_record};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;
    use serde_json::{Value, json};
    use std::sync::mpsc;
    use time::macros::datetime;

    #[derive(Debug, Default)]
    struct TestRuntime {
        records: Vec<RawRecord>,
        fetch_error: Option<String>,
        fetch_count: usize,
        detail_count: usize,
        created: Vec<Value>,
    }

    impl TestRuntime {
        fn with_applications(count: usize) -> Self {
            let mut faker = ApplicationFaker::new(17);
            let records = faker
                .applications(count)
                .iter()
                .enumerate()
                .map(|(index, application)| raw_record(index as i64 + 1, application))
                .collect();
            Self {
                records,
                ..Self::default()
            }
        }
    }

    impl AppRuntime for TestRuntime {
        fn fetch_records(&mut self, user_id: UserId) -> Result<Vec<RawRecord>> {
            self.fetch_count += 1;
            if let Some(message) = &self.fetch_error {
                anyhow::bail!("{message}");
            }
            Ok(self
                .records
                .iter()
                .filter(|record| record.owner_id == user_id)
                .cloned()
                .collect())
        }

        fn fetch_record(&mut self, user_id: UserId, job_id: JobId) -> Result<Option<RawRecord>> {
            self.detail_count += 1;
            Ok(self
                .records
                .iter()
                .find(|record| record.owner_id == user_id && record.id == job_id)
                .cloned())
        }

        fn create_record(&mut self, user_id: UserId, payload: &Value) -> Result<JobId> {
            let id = JobId::new(self.records.len() as i64 + 1);
            self.created.push(payload.clone());
            self.records.insert(
                0,
                RawRecord {
                    id,
                    owner_id: user_id,
                    payload: payload.clone(),
                    created_at: fixture_datetime(),
                },
            );
            Ok(id)
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn chars(text: &str) -> Vec<KeyEvent> {
        text.chars().map(|ch| key(KeyCode::Char(ch))).collect()
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn internal_channel() -> (mpsc::Sender<InternalEvent>, mpsc::Receiver<InternalEvent>) {
        mpsc::channel()
    }

    fn pump_internal(
        state: &mut AppState,
        view_data: &mut ViewData,
        tx: &mpsc::Sender<InternalEvent>,
        rx: &mpsc::Receiver<InternalEvent>,
    ) {
        super::process_internal_events(state, view_data, tx, rx);
    }

    fn run_key_script(
        state: &mut AppState,
        runtime: &mut TestRuntime,
        view_data: &mut ViewData,
        tx: &mpsc::Sender<InternalEvent>,
        rx: &mpsc::Receiver<InternalEvent>,
        keys: &[KeyEvent],
    ) {
        for key in keys {
            let _ = handle_key_event(state, runtime, view_data, tx, *key);
            pump_internal(state, view_data, tx, rx);
        }
    }

    fn started(
        runtime: &mut TestRuntime,
    ) -> (
        AppState,
        ViewData,
        mpsc::Sender<InternalEvent>,
        mpsc::Receiver<InternalEvent>,
    ) {
        let mut state = AppState::default();
        let mut view_data = ViewData::new(ViewSettings::default());
        let (tx, rx) = internal_channel();
        start_view(&mut state, runtime, &mut view_data, &tx);
        pump_internal(&mut state, &mut view_data, &tx, &rx);
        (state, view_data, tx, rx)
    }

    #[test]
    fn startup_fetch_renders_first_page_only() {
        let mut runtime = TestRuntime::with_applications(15);
        let (state, view_data, _tx, _rx) = started(&mut runtime);

        assert_eq!(runtime.fetch_count, 1);
        let grid = current_grid(&state, &view_data).expect("records are ready");
        assert_eq!(grid.rows.len(), PAGE_SIZE);
        assert_eq!(grid.total, 15);
        assert_eq!(grid.rows[0].id, JobId::new(1));
        assert_eq!(
            table_title(&grid, &state, &view_data),
            "applications | showing 10 of 15"
        );
    }

    #[test]
    fn loading_state_shows_placeholder_until_completion_arrives() {
        let mut runtime = TestRuntime::with_applications(3);
        let mut state = AppState::default();
        let mut view_data = ViewData::new(ViewSettings::default());
        let (tx, rx) = internal_channel();

        start_view(&mut state, &mut runtime, &mut view_data, &tx);
        assert!(view_data.records.is_loading());
        assert_eq!(
            list_placeholder_text(&view_data.records).as_deref(),
            Some("Loading applications...")
        );

        pump_internal(&mut state, &mut view_data, &tx, &rx);
        assert_eq!(list_placeholder_text(&view_data.records), None);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut state = AppState::default();
        let mut view_data = ViewData::new(ViewSettings::default());
        let (tx, rx) = internal_channel();
        let mut faker = ApplicationFaker::new(4);

        let first = view_data.tracker.begin();
        let second = view_data.tracker.begin();
        view_data.records = FetchState::Loading { request: second };

        let fresh = raw_record(7, &faker.application());
        tx.send(InternalEvent::RecordsLoaded {
            request: second,
            result: Ok(vec![fresh]),
        })
        .expect("send fresh");
        tx.send(InternalEvent::RecordsLoaded {
            request: first,
            result: Ok(vec![
                raw_record(1, &faker.application()),
                raw_record(2, &faker.application()),
            ]),
        })
        .expect("send stale");
        pump_internal(&mut state, &mut view_data, &tx, &rx);

        let records = view_data.records.ready().expect("fresh result applied");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, JobId::new(7));
    }

    #[test]
    fn fetch_failure_shows_retry_and_refresh_recovers() {
        let mut runtime = TestRuntime::with_applications(4);
        runtime.fetch_error = Some("database is locked".to_owned());
        let (mut state, mut view_data, tx, rx) = started(&mut runtime);

        assert_eq!(
            view_data.records.error(),
            Some(&FetchError::new("database is locked"))
        );
        let text = list_placeholder_text(&view_data.records).expect("error panel");
        assert!(text.contains("database is locked"));
        assert!(text.contains("press r to retry"));

        runtime.fetch_error = None;
        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('r'))],
        );
        assert_eq!(runtime.fetch_count, 2);
        assert_eq!(view_data.records.ready().map(Vec::len), Some(4));
    }

    #[test]
    fn malformed_records_are_skipped_with_a_warning() {
        let mut runtime = TestRuntime::with_applications(3);
        runtime.records[1].payload = json!({"company": "Nameless"});
        let (state, view_data, _tx, _rx) = started(&mut runtime);

        assert_eq!(view_data.records.ready().map(Vec::len), Some(2));
        assert_eq!(view_data.rejected.len(), 1);
        assert_eq!(view_data.rejected[0].record_id, JobId::new(2));
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("skipped 1 malformed record"))
        );
    }

    #[test]
    fn sort_key_cycles_the_focused_column() {
        let mut runtime = TestRuntime::with_applications(5);
        let (mut state, mut view_data, tx, rx) = started(&mut runtime);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('l')), key(KeyCode::Char('s'))],
        );
        assert_eq!(
            state.sort.direction_for(ColumnKey::Company),
            Some(SortDirection::Asc)
        );
        assert_eq!(
            state.status_line.as_deref(),
            Some("sorted by company asc")
        );

        let grid = current_grid(&state, &view_data).expect("grid");
        let companies = grid
            .rows
            .iter()
            .map(|row| row.cells[1].to_ascii_lowercase())
            .collect::<Vec<_>>();
        let mut sorted = companies.clone();
        sorted.sort();
        assert_eq!(companies, sorted);
        assert_eq!(grid.headers[1].title(), "Company ↑");

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('S'))],
        );
        assert!(state.sort.is_empty());
    }

    #[test]
    fn space_toggles_selection_of_the_cursor_row() {
        let mut runtime = TestRuntime::with_applications(3);
        let (mut state, mut view_data, tx, rx) = started(&mut runtime);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('j')), key(KeyCode::Char(' '))],
        );
        assert!(state.selection.contains(JobId::new(2)));
        let grid = current_grid(&state, &view_data).expect("grid");
        assert!(grid.rows[1].selected);
        assert!(table_title(&grid, &state, &view_data).ends_with("| 1 selected"));
    }

    #[test]
    fn enter_opens_detail_and_escape_returns_to_list() {
        let mut runtime = TestRuntime::with_applications(3);
        let (mut state, mut view_data, tx, rx) = started(&mut runtime);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('G')), key(KeyCode::Enter)],
        );
        assert_eq!(state.route, Route::JobDescription("3".to_owned()));
        let DetailState::Resolved(Detail::Found(record)) = &view_data.detail else {
            panic!("expected a resolved record, got {:?}", view_data.detail);
        };
        assert_eq!(record.id, JobId::new(3));

        let text = render_detail_text(&view_data.detail, &view_data.settings);
        assert!(text.contains(&record.position));
        assert!(text.contains("Last saved 2025-07-30 at 14:00"));

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Esc)],
        );
        assert_eq!(state.route, Route::JobTracker);
        assert_eq!(view_data.detail, DetailState::Idle);
        assert_eq!(runtime.fetch_count, 2);
    }

    #[test]
    fn unknown_and_unparsable_detail_routes_show_not_found() {
        let mut runtime = TestRuntime::with_applications(2);

        let mut state = AppState {
            route: Route::JobDescription("999".to_owned()),
            ..AppState::default()
        };
        let mut view_data = ViewData::new(ViewSettings::default());
        let (tx, _rx) = internal_channel();
        start_view(&mut state, &mut runtime, &mut view_data, &tx);
        assert_eq!(view_data.detail, DetailState::Resolved(Detail::NotFound));
        assert!(
            render_detail_text(&view_data.detail, &view_data.settings).starts_with("Job not found.")
        );
        assert_eq!(runtime.detail_count, 1);

        state.route = Route::JobDescription("abc".to_owned());
        start_view(&mut state, &mut runtime, &mut view_data, &tx);
        assert_eq!(view_data.detail, DetailState::Resolved(Detail::NotFound));
        assert_eq!(runtime.detail_count, 1, "no lookup for a non-numeric id");
    }

    #[test]
    fn detail_of_malformed_record_reports_the_field() {
        let mut runtime = TestRuntime::with_applications(2);
        runtime.records[0].payload = json!({"position": 42});
        let mut state = AppState {
            route: Route::JobDescription("1".to_owned()),
            ..AppState::default()
        };
        let mut view_data = ViewData::new(ViewSettings::default());
        let (tx, _rx) = internal_channel();
        start_view(&mut state, &mut runtime, &mut view_data, &tx);

        assert!(matches!(view_data.detail, DetailState::Malformed(_)));
        let text = render_detail_text(&view_data.detail, &view_data.settings);
        assert!(text.contains("record 1: field `position`"));
    }

    #[test]
    fn detail_is_scoped_to_current_user() {
        let mut runtime = TestRuntime::with_applications(2);
        let mut state = AppState {
            user_id: UserId::new(2),
            route: Route::JobDescription("1".to_owned()),
            ..AppState::default()
        };
        let mut view_data = ViewData::new(ViewSettings::default());
        let (tx, _rx) = internal_channel();
        start_view(&mut state, &mut runtime, &mut view_data, &tx);
        assert_eq!(view_data.detail, DetailState::Resolved(Detail::NotFound));
    }

    #[test]
    fn form_submit_creates_record_and_refetches() {
        let mut runtime = TestRuntime::with_applications(2);
        let (mut state, mut view_data, tx, rx) = started(&mut runtime);

        let mut keys = vec![key(KeyCode::Char('a'))];
        keys.extend(chars("Staff Engineer"));
        keys.push(key(KeyCode::Tab));
        keys.extend(chars("Coho Labs"));
        keys.push(key(KeyCode::Tab));
        keys.push(key(KeyCode::Right));
        keys.push(key(KeyCode::Tab));
        keys.extend(chars("2025-06-02"));
        keys.push(key(KeyCode::Tab));
        keys.extend(chars("2025-06-20"));
        keys.push(key(KeyCode::Enter));
        run_key_script(&mut state, &mut runtime, &mut view_data, &tx, &rx, &keys);

        assert_eq!(state.mode, AppMode::Nav);
        assert!(view_data.form.is_none());
        assert_eq!(runtime.created.len(), 1);
        assert_eq!(runtime.created[0]["status"], "Interviewed");
        assert_eq!(runtime.created[0]["applicationDate"], "2025-06-02");
        assert_eq!(runtime.created[0]["interviewDate"], "2025-06-20");
        assert_eq!(runtime.fetch_count, 2);

        let records = view_data.records.ready().expect("refetched");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].position, "Staff Engineer");
        assert_eq!(state.status_line.as_deref(), Some("saved job 3"));
    }

    #[test]
    fn invalid_form_stays_open_on_the_failing_field() {
        let mut runtime = TestRuntime::with_applications(1);
        let (mut state, mut view_data, tx, rx) = started(&mut runtime);

        let mut keys = vec![key(KeyCode::Char('a'))];
        keys.extend(chars("Analyst"));
        keys.push(key(KeyCode::Enter));
        run_key_script(&mut state, &mut runtime, &mut view_data, &tx, &rx, &keys);

        assert_eq!(state.mode, AppMode::Form);
        assert!(runtime.created.is_empty());
        let form = view_data.form.as_ref().expect("form still open");
        assert_eq!(form.field_index, 3);
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.starts_with("Application date: required"))
        );
        let overlay = render_form_overlay_text(form);
        assert!(overlay.contains("Analyst"));
        assert!(overlay.contains("> Application date:"));

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Esc)],
        );
        assert_eq!(state.mode, AppMode::Nav);
        assert!(view_data.form.is_none());
    }

    #[test]
    fn grid_hit_maps_header_and_rows() {
        let mut runtime = TestRuntime::with_applications(3);
        let (state, view_data, _tx, _rx) = started(&mut runtime);
        let grid = current_grid(&state, &view_data).expect("grid");
        let body = Rect::new(0, 3, 100, 20);

        assert_eq!(grid_hit(&grid, body, 1, 4), Some(GridHit::SelectAll));
        assert_eq!(grid_hit(&grid, body, 6, 4), Some(GridHit::Header(0)));
        assert_eq!(
            grid_hit(&grid, body, 1, 5),
            Some(GridHit::Row {
                row: 0,
                column: None
            })
        );
        assert_eq!(
            grid_hit(&grid, body, 6, 7),
            Some(GridHit::Row {
                row: 2,
                column: Some(0)
            })
        );
        assert_eq!(grid_hit(&grid, body, 6, 8), None, "below the last row");
        assert_eq!(grid_hit(&grid, body, 0, 4), None, "on the border");
    }

    #[test]
    fn mouse_clicks_sort_select_and_open() {
        let mut runtime = TestRuntime::with_applications(3);
        let (mut state, mut view_data, tx, _rx) = started(&mut runtime);
        let screen = Rect::new(0, 0, 100, 30);
        let body = screen_layout(screen)[1];
        let header_y = body.y + 1;

        handle_mouse_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            click(6, header_y),
            screen,
        );
        assert_eq!(
            state.sort.direction_for(ColumnKey::Position),
            Some(SortDirection::Asc)
        );

        handle_mouse_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            click(1, header_y),
            screen,
        );
        assert_eq!(state.selection.len(), 3);
        handle_mouse_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            click(1, header_y),
            screen,
        );
        assert!(state.selection.is_empty());

        let target = current_grid(&state, &view_data).expect("grid").rows[1]
            .target
            .clone();
        handle_mouse_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            click(6, header_y + 2),
            screen,
        );
        assert_eq!(state.route, target);
        assert!(matches!(
            view_data.detail,
            DetailState::Resolved(Detail::Found(_))
        ));
    }

    #[test]
    fn status_line_clears_only_for_the_latest_token() {
        let mut runtime = TestRuntime::with_applications(2);
        let (mut state, mut view_data, tx, rx) = started(&mut runtime);

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('s'))],
        );
        assert!(state.status_line.is_some());
        let token = view_data.status_token;

        tx.send(InternalEvent::ClearStatus { token: token - 1 })
            .expect("send stale clear");
        pump_internal(&mut state, &mut view_data, &tx, &rx);
        assert!(state.status_line.is_some());

        tx.send(InternalEvent::ClearStatus { token })
            .expect("send clear");
        pump_internal(&mut state, &mut view_data, &tx, &rx);
        assert_eq!(state.status_line, None);
    }

    #[test]
    fn status_text_shows_mode_and_hints() {
        let mut runtime = TestRuntime::with_applications(1);
        let (mut state, mut view_data, tx, rx) = started(&mut runtime);

        let text = status_text(&state, &view_data);
        assert!(text.starts_with("NAV | "));
        assert!(text.contains("s/S sort"));

        run_key_script(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &rx,
            &[key(KeyCode::Char('a'))],
        );
        let text = status_text(&state, &view_data);
        assert!(text.starts_with("FORM | field 1/8 Position"));

        view_data.help_visible = true;
        assert!(status_text(&state, &view_data).is_empty());
    }

    #[test]
    fn newer_saved_at_renders_in_configured_style() {
        let mut runtime = TestRuntime::with_applications(1);
        runtime.records[0].created_at = datetime!(2024-01-15 09:05 UTC);
        let mut state = AppState {
            route: Route::JobDescription("1".to_owned()),
            ..AppState::default()
        };
        let settings = ViewSettings {
            date_style: jobtrack_app::DateStyle::Us,
            ..ViewSettings::default()
        };
        let mut view_data = ViewData::new(settings);
        let (tx, _rx) = internal_channel();
        start_view(&mut state, &mut runtime, &mut view_data, &tx);

        let text = render_detail_text(&view_data.detail, &view_data.settings);
        assert!(text.contains("Last saved 01/15/2024 at 09:05"), "{text}");
    }

    #[test]
    fn render_draws_table_into_buffer() -> Result<()> {
        let mut runtime = TestRuntime::with_applications(12);
        let (state, view_data, _tx, _rx) = started(&mut runtime);

        let mut terminal = Terminal::new(TestBackend::new(120, 30))?;
        terminal.draw(|frame| render(frame, &state, &view_data))?;
        let screen = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(screen.contains("/job-tracker | user 1"));
        assert!(screen.contains("showing 10 of 12"));
        assert!(screen.contains("Position"));
        assert!(screen.contains("NAV |"));
        Ok(())
    }
}
