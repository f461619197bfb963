use crate::api_client::{
    validate_source_name, AddTextResponse, ApiResult, ContextBackend, HealthResponse, HttpBackend,
    SourceDescriptor, SourceStats,
};
use crate::capture::{CaptureAction, CaptureEvent, SelectionCapture};
use crate::composer::ComposedContext;
use crate::config::SettingsStore;
use crate::orchestrator::{
    Query, SearchOrchestrator, SearchOutcome, SearchScope, SourceCatalog,
};
use crate::panel_state::{BusyTicket, PanelEffect, PanelLifecycle, PanelTab};
use crate::session::SearchSession;
use crate::utils::app_paths::AppPaths;
use anyhow::Result;
use arboard::Clipboard;
use chrono::{Local, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};
use tui_input::{backend::crossterm::EventHandler, Input};

/// Completions reported back to the event loop by spawned operations.
/// Busy-state completions carry the lifecycle ticket they were issued.
#[derive(Debug)]
pub enum AppEvent {
    Health(ApiResult<HealthResponse>),
    SourcesLoaded(ApiResult<Vec<SourceDescriptor>>),
    SearchDone {
        ticket: BusyTicket,
        result: ApiResult<SearchOutcome>,
    },
    SaveDone {
        ticket: BusyTicket,
        result: ApiResult<AddTextResponse>,
    },
    SourceCreated {
        name: String,
        result: ApiResult<()>,
    },
    SourceDeleted {
        name: String,
        result: ApiResult<()>,
    },
    StatsLoaded(ApiResult<SourceStats>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Focus {
    Input,
    Sources,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// Transient, auto-dismissing status notice.
#[derive(Debug)]
struct Notice {
    text: String,
    level: NoticeLevel,
    expires: Instant,
}

const SELECTION_DEBOUNCE: Duration = Duration::from_millis(100);

pub struct TuiApp {
    runtime: Handle,
    tx: UnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,

    settings: SettingsStore,
    lifecycle: PanelLifecycle,
    capture: SelectionCapture,
    session: SearchSession,
    catalog: SourceCatalog,

    query_input: Input,
    new_source_input: Input,
    focus: Focus,
    /// 0 = all sources, n = catalog index n-1
    scope_index: usize,
    sources_state: ListState,
    results_state: ListState,

    health: Option<HealthResponse>,
    notice: Option<Notice>,
    confirm_delete: Option<String>,
    busy_label: &'static str,
}

impl TuiApp {
    pub fn new(settings: SettingsStore, runtime: Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        let mut app = Self {
            runtime,
            tx,
            rx,
            settings,
            lifecycle: PanelLifecycle::new(),
            capture: SelectionCapture::new(SELECTION_DEBOUNCE),
            session: SearchSession::new(),
            catalog: SourceCatalog::new(),
            query_input: Input::default(),
            new_source_input: Input::default(),
            focus: Focus::Input,
            scope_index: 0,
            sources_state: ListState::default(),
            results_state: ListState::default(),
            health: None,
            notice: None,
            confirm_delete: None,
            busy_label: "Working",
        };
        let last_tab = app.settings.current().panel.last_tab;
        app.lifecycle.user_open(last_tab);
        app.focus = match last_tab {
            PanelTab::Search => Focus::Input,
            PanelTab::Add => Focus::Sources,
        };
        app.sources_state.select(Some(0));
        app
    }

    /// Fresh backend for one operation, built from the settings as
    /// they are right now. A base URL changed mid-session applies to
    /// the next operation, never retroactively.
    fn backend(&self) -> Arc<dyn ContextBackend> {
        let base_url = self.settings.current().server.base_url;
        Arc::new(HttpBackend::new(&base_url))
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        self.refresh_health();
        self.refresh_sources();

        loop {
            terminal.draw(|f| self.ui(f))?;

            self.drain_completions();
            if let Some(action) = self.capture.poll() {
                self.apply_capture(action);
            }
            self.expire_notice();

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Paste(text) => {
                        self.capture.handle(CaptureEvent::Selected(text));
                    }
                    _ => {}
                }
            }

            if !self.lifecycle.is_open() {
                break;
            }
        }
        Ok(())
    }

    // --- async operation launches -----------------------------------

    fn refresh_health(&self) {
        let backend = self.backend();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.health().await;
            let _ = tx.send(AppEvent::Health(result));
        });
    }

    fn refresh_sources(&self) {
        let backend = self.backend();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.list_sources().await;
            let _ = tx.send(AppEvent::SourcesLoaded(result));
        });
    }

    fn submit_search(&mut self) {
        if self.lifecycle.is_busy() {
            return;
        }

        let defaults = self.settings.current().search;
        let query = match Query::new(
            self.query_input.value(),
            self.current_scope(),
            defaults.limit,
            defaults.min_score,
        ) {
            Ok(query) => query,
            Err(e) => {
                self.show_notice(e.to_string(), NoticeLevel::Error);
                return;
            }
        };

        let Some(ticket) = self.lifecycle.begin_busy() else {
            return;
        };
        self.busy_label = "Searching";

        let backend = self.backend();
        let known = self.catalog.sources().to_vec();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let orchestrator = SearchOrchestrator::new(backend);
            let result = orchestrator.execute(&query, &known).await;
            // Sent on every exit path; the completion clears busy.
            let _ = tx.send(AppEvent::SearchDone { ticket, result });
        });
    }

    fn submit_save(&mut self) {
        if self.lifecycle.is_busy() {
            return;
        }
        let Some(text) = self.lifecycle.pending_text().map(String::from) else {
            self.show_notice(
                "Nothing captured yet - paste a selection first".to_string(),
                NoticeLevel::Warn,
            );
            return;
        };
        let Some(target) = self.highlighted_source().map(|s| s.name.clone()) else {
            self.show_notice("Pick a target source first".to_string(), NoticeLevel::Warn);
            return;
        };

        let Some(ticket) = self.lifecycle.begin_busy() else {
            return;
        };
        self.busy_label = "Saving";

        let mut metadata = serde_json::Map::new();
        metadata.insert("origin".to_string(), "context-cli".into());
        metadata.insert("captured_at".to_string(), Utc::now().to_rfc3339().into());

        let backend = self.backend();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.add_text(&target, &text, metadata).await;
            let _ = tx.send(AppEvent::SaveDone { ticket, result });
        });
    }

    fn submit_create_source(&mut self) {
        let name = self.new_source_input.value().trim().to_string();

        // Local pre-checks: bad names and cached duplicates never
        // reach the network.
        if let Err(e) = validate_source_name(&name) {
            self.show_notice(e.to_string(), NoticeLevel::Error);
            return;
        }
        if let Err(e) = self.catalog.ensure_absent(&name) {
            self.show_notice(e.to_string(), NoticeLevel::Error);
            return;
        }

        let backend = self.backend();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.create_source(&name).await;
            let _ = tx.send(AppEvent::SourceCreated { name, result });
        });
    }

    fn submit_delete_source(&mut self, name: String) {
        let backend = self.backend();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.delete_source(&name).await;
            let _ = tx.send(AppEvent::SourceDeleted { name, result });
        });
    }

    fn request_stats(&mut self) {
        let Some(source) = self.highlighted_source().map(|s| s.name.clone()) else {
            return;
        };
        let backend = self.backend();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = backend.source_stats(&source).await;
            let _ = tx.send(AppEvent::StatsLoaded(result));
        });
    }

    // --- completion handling ----------------------------------------

    fn drain_completions(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.apply_completion(event);
        }
    }

    fn apply_completion(&mut self, event: AppEvent) {
        match event {
            AppEvent::Health(result) => match result {
                Ok(health) => self.health = Some(health),
                Err(e) => {
                    // Display-only; the panel works without a banner.
                    warn!("Health check failed: {}", e);
                    self.health = None;
                }
            },
            AppEvent::SourcesLoaded(result) => match result {
                Ok(sources) => {
                    self.catalog.replace(sources);
                    self.clamp_source_cursor();
                }
                Err(e) => self.show_notice(e.to_string(), NoticeLevel::Error),
            },
            AppEvent::SearchDone { ticket, result } => {
                if !self.lifecycle.finish_busy(ticket) {
                    // Panel closed while the search was in flight; the
                    // response must not touch anything.
                    info!("Dropping stale search completion");
                    return;
                }
                match result {
                    Ok(outcome) => {
                        let summary = if outcome.failed_sources > 0 {
                            self.show_notice(
                                format!(
                                    "{} results ({} of {} sources failed)",
                                    outcome.results.len(),
                                    outcome.failed_sources,
                                    outcome.sources_searched
                                ),
                                NoticeLevel::Warn,
                            );
                            None
                        } else {
                            Some(format!(
                                "{} results from {} sources",
                                outcome.results.len(),
                                outcome.sources_searched
                            ))
                        };
                        if let Some(text) = summary {
                            self.show_notice(text, NoticeLevel::Info);
                        }
                        self.session.install(outcome);
                        self.results_state
                            .select(if self.session.is_empty() { None } else { Some(0) });
                        self.focus = Focus::Results;
                    }
                    Err(e) => self.show_notice(e.to_string(), NoticeLevel::Error),
                }
            }
            AppEvent::SaveDone { ticket, result } => {
                if !self.lifecycle.finish_busy(ticket) {
                    info!("Dropping stale save completion");
                    return;
                }
                match result {
                    Ok(response) => {
                        self.show_notice(
                            format!("Saved to '{}'", response.database_name),
                            NoticeLevel::Info,
                        );
                        self.lifecycle.selection_cleared();
                        self.refresh_sources();
                    }
                    Err(e) => self.show_notice(e.to_string(), NoticeLevel::Error),
                }
            }
            AppEvent::SourceCreated { name, result } => match result {
                Ok(()) => {
                    // Register immediately so a repeat create is caught
                    // locally before the next full refresh lands.
                    self.catalog.insert(SourceDescriptor {
                        name: name.clone(),
                        document_count: 0,
                        created_at: String::new(),
                        vector_size: 0,
                    });
                    self.new_source_input = Input::default();
                    self.show_notice(format!("Created source '{}'", name), NoticeLevel::Info);
                    self.refresh_sources();
                }
                Err(e) => self.show_notice(e.to_string(), NoticeLevel::Error),
            },
            AppEvent::SourceDeleted { name, result } => match result {
                Ok(()) => {
                    self.catalog.remove(&name);
                    self.clamp_source_cursor();
                    self.show_notice(format!("Deleted source '{}'", name), NoticeLevel::Info);
                    self.refresh_sources();
                }
                Err(e) => self.show_notice(e.to_string(), NoticeLevel::Error),
            },
            AppEvent::StatsLoaded(result) => match result {
                Ok(stats) => self.show_notice(
                    format!(
                        "{}: {} documents, {}-dim vectors, {} distance",
                        stats.name, stats.document_count, stats.vector_size, stats.distance_metric
                    ),
                    NoticeLevel::Info,
                ),
                Err(e) => self.show_notice(e.to_string(), NoticeLevel::Error),
            },
        }
    }

    fn apply_capture(&mut self, action: CaptureAction) {
        match action {
            CaptureAction::Captured(text) => {
                let last_tab = self.settings.current().panel.last_tab;
                if self.lifecycle.selection_captured(&text, last_tab) {
                    self.show_notice("Selection captured".to_string(), NoticeLevel::Info);
                }
            }
            CaptureAction::Cleared => self.lifecycle.selection_cleared(),
        }
    }

    // --- key handling -----------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) {
        // The confirm modal swallows everything until resolved.
        if let Some(name) = self.confirm_delete.clone() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_delete = None;
                    self.submit_delete_source(name);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_delete = None;
                }
                _ => {}
            }
            return;
        }

        if self.lifecycle.is_minimized() {
            match key.code {
                KeyCode::Char('m') => self.lifecycle.minimize_toggle(),
                KeyCode::Esc => self.lifecycle.user_close(),
                _ => {}
            }
            return;
        }

        // While busy only close and minimize stay live; everything
        // else waits for the completion.
        if self.lifecycle.is_busy() {
            match key.code {
                KeyCode::Esc => self.lifecycle.user_close(),
                KeyCode::Char('m') => self.lifecycle.minimize_toggle(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.lifecycle.user_close();
                return;
            }
            KeyCode::Tab => {
                let next = match self.lifecycle.tab() {
                    Some(PanelTab::Add) => PanelTab::Search,
                    _ => PanelTab::Add,
                };
                self.apply_tab_switch(next);
                return;
            }
            _ => {}
        }

        match self.lifecycle.tab() {
            Some(PanelTab::Search) => self.handle_search_tab_key(key),
            Some(PanelTab::Add) => self.handle_add_tab_key(key),
            None => {}
        }
    }

    fn handle_search_tab_key(&mut self, key: KeyEvent) {
        match self.focus {
            Focus::Input => match key.code {
                KeyCode::Enter => self.submit_search(),
                KeyCode::Down => {
                    if !self.session.is_empty() {
                        self.focus = Focus::Results;
                    }
                }
                KeyCode::Left if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.cycle_scope(-1)
                }
                KeyCode::Right if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.cycle_scope(1)
                }
                _ => {
                    self.query_input.handle_event(&Event::Key(key));
                }
            },
            Focus::Results => match key.code {
                KeyCode::Up => {
                    if self.selected_result() == Some(0) {
                        self.focus = Focus::Input;
                    } else {
                        self.move_result_cursor(-1);
                    }
                }
                KeyCode::Down => self.move_result_cursor(1),
                KeyCode::Char('k') => self.move_result_cursor(-1),
                KeyCode::Char('j') => self.move_result_cursor(1),
                KeyCode::Char(' ') => {
                    if let Some(index) = self.selected_result() {
                        self.session.toggle(index);
                    }
                }
                KeyCode::Char('a') => self.session.select_all(),
                KeyCode::Char('c') => self.session.clear_selection(),
                KeyCode::Char('y') => self.copy_composed(),
                KeyCode::Char('e') => self.export_composed(),
                KeyCode::Char('m') => self.lifecycle.minimize_toggle(),
                KeyCode::Char('/') => self.focus = Focus::Input,
                KeyCode::Left => self.focus = Focus::Sources,
                _ => {}
            },
            Focus::Sources => match key.code {
                KeyCode::Up => self.move_source_cursor(-1),
                KeyCode::Down => self.move_source_cursor(1),
                KeyCode::Enter | KeyCode::Right => {
                    self.scope_index = self.sources_state.selected().unwrap_or(0);
                    self.focus = Focus::Input;
                }
                KeyCode::Char('d') => {
                    if let Some(source) = self.highlighted_source() {
                        // Destructive: always confirm before dispatch.
                        self.confirm_delete = Some(source.name.clone());
                    }
                }
                KeyCode::Char('i') => self.request_stats(),
                KeyCode::Char('r') => self.refresh_sources(),
                KeyCode::Char('m') => self.lifecycle.minimize_toggle(),
                _ => {}
            },
        }
    }

    fn handle_add_tab_key(&mut self, key: KeyEvent) {
        match self.focus {
            Focus::Input => match key.code {
                KeyCode::Enter => self.submit_create_source(),
                KeyCode::Up | KeyCode::Down => self.focus = Focus::Sources,
                _ => {
                    self.new_source_input.handle_event(&Event::Key(key));
                }
            },
            _ => match key.code {
                KeyCode::Up => self.move_source_cursor(-1),
                KeyCode::Down => self.move_source_cursor(1),
                KeyCode::Enter => self.submit_save(),
                KeyCode::Char('n') => self.focus = Focus::Input,
                KeyCode::Char('d') => {
                    if let Some(source) = self.highlighted_source() {
                        self.confirm_delete = Some(source.name.clone());
                    }
                }
                KeyCode::Char('i') => self.request_stats(),
                KeyCode::Char('r') => self.refresh_sources(),
                KeyCode::Char('m') => self.lifecycle.minimize_toggle(),
                KeyCode::Delete => self.lifecycle.selection_cleared(),
                _ => {}
            },
        }
    }

    fn apply_tab_switch(&mut self, tab: PanelTab) {
        for effect in self.lifecycle.switch_tab(tab) {
            match effect {
                PanelEffect::PersistTab(tab) => {
                    if let Err(e) = self.settings.update(|s| s.panel.last_tab = tab) {
                        warn!("Could not persist tab: {}", e);
                    }
                }
                PanelEffect::ReloadSources(_) => self.refresh_sources(),
            }
        }
        self.focus = match tab {
            PanelTab::Search => Focus::Input,
            PanelTab::Add => Focus::Sources,
        };
    }

    // --- selection/compose actions ----------------------------------

    fn copy_composed(&mut self) {
        let composed = self.compose_checked();
        let Some(composed) = composed else { return };
        match Clipboard::new().and_then(|mut c| c.set_text(composed.rendered.clone())) {
            Ok(()) => self.show_notice(
                format!("Copied {} entries to clipboard", composed.entries.len()),
                NoticeLevel::Info,
            ),
            Err(e) => self.show_notice(format!("Clipboard error: {}", e), NoticeLevel::Error),
        }
    }

    fn export_composed(&mut self) {
        let composed = self.compose_checked();
        let Some(composed) = composed else { return };
        let result = AppPaths::export_dir()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .and_then(|dir| {
                let filename = format!("context_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
                let path = dir.join(filename);
                fs::write(&path, &composed.rendered)?;
                Ok(path)
            });
        match result {
            Ok(path) => self.show_notice(
                format!("Exported {} entries to {}", composed.entries.len(), path.display()),
                NoticeLevel::Info,
            ),
            Err(e) => self.show_notice(format!("Export failed: {}", e), NoticeLevel::Error),
        }
    }

    fn compose_checked(&mut self) -> Option<ComposedContext> {
        if self.session.selection().is_empty() {
            self.show_notice(
                "No results selected - toggle with Space first".to_string(),
                NoticeLevel::Warn,
            );
            return None;
        }
        Some(self.session.compose())
    }

    // --- cursor/scope helpers ---------------------------------------

    fn current_scope(&self) -> SearchScope {
        if self.scope_index == 0 {
            SearchScope::AllSources
        } else {
            self.catalog
                .get(self.scope_index - 1)
                .map(|s| SearchScope::Source(s.name.clone()))
                .unwrap_or(SearchScope::AllSources)
        }
    }

    fn cycle_scope(&mut self, step: isize) {
        let entries = self.catalog.len() as isize + 1;
        let current = self.scope_index as isize;
        self.scope_index = (current + step).rem_euclid(entries) as usize;
    }

    /// The source under the cursor in the source list; `None` on the
    /// "All sources" row.
    fn highlighted_source(&self) -> Option<&SourceDescriptor> {
        let row = self.sources_state.selected().unwrap_or(0);
        if row == 0 {
            None
        } else {
            self.catalog.get(row - 1)
        }
    }

    fn move_source_cursor(&mut self, step: isize) {
        let rows = self.catalog.len() as isize + 1;
        let current = self.sources_state.selected().unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(rows);
        self.sources_state.select(Some(next as usize));
    }

    fn move_result_cursor(&mut self, step: isize) {
        if self.session.is_empty() {
            return;
        }
        let rows = self.session.len() as isize;
        let current = self.results_state.selected().unwrap_or(0) as isize;
        let next = (current + step).clamp(0, rows - 1);
        self.results_state.select(Some(next as usize));
    }

    fn selected_result(&self) -> Option<usize> {
        self.results_state.selected()
    }

    fn clamp_source_cursor(&mut self) {
        let rows = self.catalog.len() + 1;
        if self.sources_state.selected().unwrap_or(0) >= rows {
            self.sources_state.select(Some(rows.saturating_sub(1)));
        }
        if self.scope_index >= rows {
            self.scope_index = 0;
        }
    }

    // --- notices ----------------------------------------------------

    fn show_notice(&mut self, text: String, level: NoticeLevel) {
        let timeout = self.settings.current().panel.notice_timeout_ms;
        self.notice = Some(Notice {
            text,
            level,
            expires: Instant::now() + Duration::from_millis(timeout),
        });
    }

    fn expire_notice(&mut self) {
        if self.notice.as_ref().is_some_and(|n| Instant::now() >= n.expires) {
            self.notice = None;
        }
    }

    // --- rendering --------------------------------------------------

    fn ui(&mut self, f: &mut Frame) {
        if self.lifecycle.is_minimized() {
            let bar = Paragraph::new(" context-cli (minimized) - press m to restore ")
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(bar, Rect { height: 1, ..f.area() });
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_tabs(f, chunks[1]);
        match self.lifecycle.tab() {
            Some(PanelTab::Search) => self.render_search_tab(f, chunks[2]),
            _ => self.render_add_tab(f, chunks[2]),
        }
        self.render_status(f, chunks[3]);

        if self.lifecycle.is_busy() {
            self.render_busy_overlay(f, chunks[2]);
        }
        if let Some(name) = &self.confirm_delete {
            render_confirm_modal(f, f.area(), name);
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let header = match &self.health {
            Some(health) => Line::from(vec![
                Span::styled(
                    " Context DB ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    "server {} · {} · {} sources",
                    health.version, health.embedding_model, health.databases_count
                )),
            ]),
            None => Line::from(vec![
                Span::styled(
                    " Context DB ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::styled("server unreachable", Style::default().fg(Color::Red)),
            ]),
        };
        f.render_widget(Paragraph::new(header), area);
    }

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let selected = match self.lifecycle.tab() {
            Some(PanelTab::Search) => 1,
            _ => 0,
        };
        let tabs = Tabs::new(vec![Line::from("Add"), Line::from("Search")])
            .select(selected)
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::BOTTOM));
        f.render_widget(tabs, area);
    }

    fn render_search_tab(&mut self, f: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
            .split(area);

        self.render_source_list(f, columns[0], "Scope");

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(1)])
            .split(columns[1]);

        let scope_label = match self.current_scope() {
            SearchScope::AllSources => "all sources".to_string(),
            SearchScope::Source(name) => name,
        };
        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Query ({}) ", scope_label))
            .border_style(self.focus_style(Focus::Input));
        let input = Paragraph::new(self.query_input.value()).block(input_block);
        f.render_widget(input, right[0]);
        if self.focus == Focus::Input {
            let cursor_x = right[0].x + 1 + self.query_input.visual_cursor() as u16;
            f.set_cursor_position((cursor_x.min(right[0].right().saturating_sub(2)), right[0].y + 1));
        }

        let items: Vec<ListItem> = self
            .session
            .results()
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let marker = if self.session.selection().is_selected(i) {
                    Span::styled("[x] ", Style::default().fg(Color::Green))
                } else {
                    Span::raw("[ ] ")
                };
                let score = Span::styled(
                    format!("{:>3.0}% ", result.score * 100.0),
                    Style::default().fg(Color::Yellow),
                );
                let source = Span::styled(
                    format!("{} ", result.source),
                    Style::default().fg(Color::DarkGray),
                );
                let text = Span::raw(result.text.replace('\n', " "));
                ListItem::new(Line::from(vec![marker, score, source, text]))
            })
            .collect();

        let count = self.session.selection().count();
        let title = if self.session.is_empty() {
            " Results ".to_string()
        } else {
            format!(" Results ({} selected) ", count)
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(self.focus_style(Focus::Results)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(list, right[1], &mut self.results_state);
    }

    fn render_add_tab(&mut self, f: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
            .split(area);

        self.render_source_list(f, columns[0], "Save to");

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(columns[1]);

        let preview_text = self
            .lifecycle
            .pending_text()
            .unwrap_or("Paste text into the terminal to capture it here.");
        let preview = Paragraph::new(preview_text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(" Captured text "));
        f.render_widget(preview, right[0]);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .title(" New source name (Enter to create) ")
            .border_style(self.focus_style(Focus::Input));
        let input = Paragraph::new(self.new_source_input.value()).block(input_block);
        f.render_widget(input, right[1]);
        if self.focus == Focus::Input {
            let cursor_x = right[1].x + 1 + self.new_source_input.visual_cursor() as u16;
            f.set_cursor_position((cursor_x.min(right[1].right().saturating_sub(2)), right[1].y + 1));
        }
    }

    fn render_source_list(&mut self, f: &mut Frame, area: Rect, title: &str) {
        let mut items = vec![ListItem::new(Line::from(Span::styled(
            "All sources",
            Style::default().add_modifier(Modifier::ITALIC),
        )))];
        items.extend(self.catalog.sources().iter().map(|source| {
            ListItem::new(Line::from(format!(
                "{} ({})",
                source.name, source.document_count
            )))
        }));

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", title))
                    .border_style(self.focus_style(Focus::Sources)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(list, area, &mut self.sources_state);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let line = match &self.notice {
            Some(notice) => {
                let color = match notice.level {
                    NoticeLevel::Info => Color::Green,
                    NoticeLevel::Warn => Color::Yellow,
                    NoticeLevel::Error => Color::Red,
                };
                Line::from(Span::styled(format!(" {}", notice.text), Style::default().fg(color)))
            }
            None => {
                let hints = match self.lifecycle.tab() {
                    Some(PanelTab::Search) => {
                        " Enter search · Space toggle · a all · c clear · y copy · e export · Tab switch · Esc close "
                    }
                    _ => " Enter save · n new source · d delete · Tab switch · Esc close ",
                };
                Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
            }
        };
        f.render_widget(Paragraph::new(line), area);
    }

    fn render_busy_overlay(&self, f: &mut Frame, area: Rect) {
        let popup = centered_rect(area, 24, 3);
        f.render_widget(Clear, popup);
        let text = Paragraph::new(format!("{}...", self.busy_label))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            );
        f.render_widget(text, popup);
    }

    fn focus_style(&self, focus: Focus) -> Style {
        if self.focus == focus && !self.lifecycle.is_busy() {
            Style::default().fg(Color::Cyan)
        } else if self.lifecycle.is_busy() {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        }
    }
}

fn render_confirm_modal(f: &mut Frame, area: Rect, name: &str) {
    let popup = centered_rect(area, 50, 5);
    f.render_widget(Clear, popup);
    let text = Paragraph::new(vec![
        Line::from(format!("Delete source '{}'?", name)),
        Line::from(""),
        Line::from(Span::styled(
            "This cannot be undone. y to delete, n to keep.",
            Style::default().fg(Color::Red),
        )),
    ])
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title(" Confirm delete "));
    f.render_widget(text, popup);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
