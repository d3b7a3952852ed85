//! Application state management for the IPO terminal
//!
//! This module contains the main application state, handling keyboard input,
//! data loading through the cache manager, the freshness clock wiring, and
//! state transitions between the tracker, tools, and academy views.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent};
use tracing::warn;

use crate::academy::Quiz;
use crate::cache::{CacheError, CacheManager, Store};
use crate::cli::{StartupConfig, ViewArg};
use crate::data::{recently_listed, IpoRecord, IpoStatus};
use crate::freshness::{FreshnessClock, FreshnessState};
use crate::tools::Tool;

/// Store key holding the favorited record ids
const FAVORITES_KEY: &str = "ipo_favorites";

/// Store key holding the theme preference
const THEME_KEY: &str = "theme";

/// Top-level screen the application is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The IPO tracker dashboard
    Tracker,
    /// The financial calculators
    Tools,
    /// The IPO academy and quiz
    Academy,
}

/// Color scheme preference, persisted across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    /// The persisted representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    fn from_str(s: &str) -> Option<Theme> {
        match s.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    fn toggled(&self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Tab filter in the tracker view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Open,
    Upcoming,
    Closed,
    Listed,
    Favorites,
}

impl Tab {
    /// Returns a slice containing all tabs in display order.
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Open,
            Tab::Upcoming,
            Tab::Closed,
            Tab::Listed,
            Tab::Favorites,
        ]
    }

    /// Returns the display label for the tab.
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Open => "Live Now",
            Tab::Upcoming => "Upcoming",
            Tab::Closed => "Recently Closed",
            Tab::Listed => "Performance",
            Tab::Favorites => "Saved",
        }
    }

    fn next(&self) -> Tab {
        let tabs = Tab::all();
        let index = tabs.iter().position(|t| t == self).unwrap_or(0);
        tabs[(index + 1) % tabs.len()]
    }
}

/// Input state of the calculators screen
///
/// Fields are adjusted with left/right keys; each calculator exposes its
/// own ordered field list.
#[derive(Debug, Clone)]
pub struct ToolsState {
    /// Calculator currently shown
    pub tool: Tool,
    /// Index of the focused input field
    pub field: usize,
    // SIP
    pub sip_monthly: f64,
    pub sip_rate: f64,
    pub sip_years: u32,
    // Stock average rows of (price, quantity)
    pub avg_rows: Vec<(f64, f64)>,
    // Allotment probability
    pub offered_shares: f64,
    pub applied_shares: f64,
    // CAGR
    pub cagr_initial: f64,
    pub cagr_final: f64,
    pub cagr_years: f64,
    // Capital gains
    pub cg_buy: f64,
    pub cg_sell: f64,
    pub cg_qty: f64,
    pub cg_days: u32,
    // Graham number
    pub graham_eps: f64,
    pub graham_bvps: f64,
}

impl Default for ToolsState {
    fn default() -> Self {
        Self {
            tool: Tool::Sip,
            field: 0,
            sip_monthly: 5000.0,
            sip_rate: 12.0,
            sip_years: 10,
            avg_rows: vec![(100.0, 10.0), (80.0, 10.0)],
            offered_shares: 100_000.0,
            applied_shares: 500_000.0,
            cagr_initial: 100_000.0,
            cagr_final: 200_000.0,
            cagr_years: 5.0,
            cg_buy: 100.0,
            cg_sell: 150.0,
            cg_qty: 100.0,
            cg_days: 400,
            graham_eps: 10.0,
            graham_bvps: 20.0,
        }
    }
}

impl ToolsState {
    /// Number of adjustable fields for the current calculator.
    pub fn field_count(&self) -> usize {
        match self.tool {
            Tool::Sip => 3,
            Tool::StockAverage => self.avg_rows.len() * 2,
            Tool::Allotment => 2,
            Tool::Cagr => 3,
            Tool::CapitalGains => 4,
            Tool::Graham => 2,
        }
    }

    /// Switches calculators, resetting field focus.
    pub fn select_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.field = 0;
    }

    fn move_field_up(&mut self) {
        if self.field > 0 {
            self.field -= 1;
        }
    }

    fn move_field_down(&mut self) {
        if self.field + 1 < self.field_count() {
            self.field += 1;
        }
    }

    /// Adjusts the focused field by one step in the given direction.
    pub fn adjust(&mut self, dir: f64) {
        match self.tool {
            Tool::Sip => match self.field {
                0 => self.sip_monthly = (self.sip_monthly + dir * 500.0).clamp(500.0, 100_000.0),
                1 => self.sip_rate = (self.sip_rate + dir * 0.5).clamp(1.0, 30.0),
                _ => {
                    self.sip_years =
                        (self.sip_years as i64 + dir as i64).clamp(1, 40) as u32
                }
            },
            Tool::StockAverage => {
                let row = self.field / 2;
                if let Some((price, qty)) = self.avg_rows.get_mut(row) {
                    if self.field % 2 == 0 {
                        *price = (*price + dir * 5.0).max(0.0);
                    } else {
                        *qty = (*qty + dir * 5.0).max(0.0);
                    }
                }
            }
            Tool::Allotment => match self.field {
                0 => self.offered_shares = (self.offered_shares + dir * 10_000.0).max(0.0),
                _ => self.applied_shares = (self.applied_shares + dir * 10_000.0).max(0.0),
            },
            Tool::Cagr => match self.field {
                0 => self.cagr_initial = (self.cagr_initial + dir * 1000.0).max(1000.0),
                1 => self.cagr_final = (self.cagr_final + dir * 1000.0).max(0.0),
                _ => self.cagr_years = (self.cagr_years + dir).clamp(1.0, 50.0),
            },
            Tool::CapitalGains => match self.field {
                0 => self.cg_buy = (self.cg_buy + dir * 5.0).max(0.0),
                1 => self.cg_sell = (self.cg_sell + dir * 5.0).max(0.0),
                2 => self.cg_qty = (self.cg_qty + dir * 10.0).max(0.0),
                _ => self.cg_days = (self.cg_days as i64 + dir as i64 * 30).clamp(0, 3650) as u32,
            },
            Tool::Graham => match self.field {
                0 => self.graham_eps = (self.graham_eps + dir).max(0.0),
                _ => self.graham_bvps = (self.graham_bvps + dir * 5.0).max(0.0),
            },
        }
    }

    /// Adds a purchase row to the stock average calculator.
    pub fn add_row(&mut self) {
        if self.tool == Tool::StockAverage {
            self.avg_rows.push((0.0, 0.0));
            self.field = (self.avg_rows.len() - 1) * 2;
        }
    }

    /// Removes the focused purchase row, keeping at least one.
    pub fn remove_row(&mut self) {
        if self.tool == Tool::StockAverage && self.avg_rows.len() > 1 {
            let row = (self.field / 2).min(self.avg_rows.len() - 1);
            self.avg_rows.remove(row);
            self.field = self.field.min(self.field_count().saturating_sub(1));
        }
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Current top-level view
    pub view: View,
    /// Initial skeleton state while the first load is in flight
    pub is_loading: bool,
    /// A refresh (manual, silent, or initial) is in flight
    pub is_refreshing: bool,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// The current IPO snapshot as returned by the cache manager
    pub ipos: Vec<IpoRecord>,
    /// Active tracker tab
    pub active_tab: Tab,
    /// Index of the selected card within the filtered list
    pub selected_index: usize,
    /// Current name filter
    pub search_query: String,
    /// Whether keystrokes are captured by the search box
    pub search_active: bool,
    /// Favorited record ids, persisted
    pub favorites: Vec<String>,
    /// Theme preference, persisted
    pub theme: Theme,
    /// Dismissible degradation banner
    pub banner: Option<String>,
    /// True when any shown record is served from a non-live source
    pub data_stale: bool,
    /// Live feed disabled (no key or --offline); degraded data is the
    /// expected mode, so no banner announces it
    pub offline: bool,
    /// Authoritative snapshot timestamp, re-read after every refresh
    pub last_updated_ms: Option<i64>,
    /// Countdown state machine
    pub clock: FreshnessClock,
    /// Analyst insight for a record: (record id, text)
    pub insight: Option<(String, String)>,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Calculator inputs
    pub tools: ToolsState,
    /// Quiz progress, present while a quiz is running
    pub quiz: Option<Quiz>,
    /// Selected module in the academy list
    pub academy_index: usize,
    refresh_requested: bool,
    auto_refresh_due: bool,
    insight_requested: bool,
    listed: Vec<IpoRecord>,
    manager: CacheManager,
    store: Store,
}

impl App {
    /// Creates the application over an existing manager and store,
    /// applying the startup configuration.
    pub fn new(manager: CacheManager, store: Store, config: &StartupConfig) -> Self {
        let favorites = store
            .get(FAVORITES_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        let theme = store
            .get(THEME_KEY)
            .and_then(|raw| Theme::from_str(&raw))
            .unwrap_or(Theme::Dark);
        let view = match config.initial_view {
            ViewArg::Tracker => View::Tracker,
            ViewArg::Tools => View::Tools,
            ViewArg::Academy => View::Academy,
        };
        let last_updated_ms = manager.last_updated_ms();

        Self {
            view,
            is_loading: true,
            is_refreshing: false,
            should_quit: false,
            ipos: Vec::new(),
            active_tab: Tab::Open,
            selected_index: 0,
            search_query: String::new(),
            search_active: false,
            favorites,
            theme,
            banner: None,
            data_stale: false,
            offline: config.offline,
            last_updated_ms,
            clock: FreshnessClock::new(),
            insight: None,
            show_help: false,
            tools: ToolsState::default(),
            quiz: None,
            academy_index: 0,
            refresh_requested: false,
            auto_refresh_due: false,
            insight_requested: false,
            listed: recently_listed(),
            manager,
            store,
        }
    }

    /// Loads the IPO list through the cache manager.
    ///
    /// `silent` keeps the skeleton hidden (clock-driven refreshes);
    /// `force_refresh` bypasses the freshness check (manual refresh key).
    /// The snapshot timestamp is re-read from the store afterwards so the
    /// clock observes whatever a success or fallback actually persisted.
    pub async fn load_ipos(&mut self, silent: bool, force_refresh: bool) {
        if !silent {
            self.is_loading = true;
        }
        self.is_refreshing = true;
        self.banner = None;

        match self.manager.get_ipos(force_refresh).await {
            Ok(records) => {
                self.data_stale = !records.iter().all(|r| r.is_live);
                // A not-live Ok means the ladder degraded behind the scenes
                if self.data_stale && !self.offline {
                    self.banner =
                        Some("Terminal connection weak. Showing latest snapshots.".to_string());
                }
                self.ipos = records;
            }
            Err(err) => {
                let message = match &err {
                    CacheError::RateLimited { .. } => {
                        "Live data is resting. Using latest cached info."
                    }
                    CacheError::AuthMismatch { .. } => {
                        "API Key mismatch. Please re-select your key."
                    }
                };
                self.banner = Some(message.to_string());
                self.ipos = err.into_fallback();
                self.data_stale = true;
            }
        }

        self.last_updated_ms = self
            .manager
            .last_updated_ms()
            .or_else(|| Some(Utc::now().timestamp_millis()));
        self.clamp_selection();
        self.is_loading = false;
        self.is_refreshing = false;
    }

    /// Fetches (or clears) the analyst insight for the selected record.
    pub async fn load_insight(&mut self) {
        let Some(record) = self.selected_record().cloned() else {
            return;
        };
        let text = self.manager.get_insight(&record).await;
        self.insight = Some((record.id, text));
    }

    /// Advances the freshness clock; queues a silent refresh when the
    /// window has just elapsed.
    pub fn maybe_tick(&mut self, now_ms: i64) {
        let wants_live = self.view == View::Tracker;
        if self
            .clock
            .maybe_tick(now_ms, self.last_updated_ms, self.is_refreshing, wants_live)
        {
            self.auto_refresh_due = true;
        }
    }

    /// Current countdown readout for the header.
    pub fn freshness(&self) -> FreshnessState {
        self.clock.state()
    }

    /// Takes the pending manual-refresh request, if any.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    /// Takes the pending clock-driven refresh, if any.
    pub fn take_auto_refresh(&mut self) -> bool {
        std::mem::take(&mut self.auto_refresh_due)
    }

    /// Takes the pending insight request, if any.
    pub fn take_insight_request(&mut self) -> bool {
        std::mem::take(&mut self.insight_requested)
    }

    /// Records visible under the active tab and search filter.
    pub fn filtered_ipos(&self) -> Vec<&IpoRecord> {
        let query = self.search_query.to_lowercase();
        let matches_search =
            |r: &IpoRecord| query.is_empty() || r.name.to_lowercase().contains(&query);

        // The Performance tab is backed by the static post-listing dataset
        if self.active_tab == Tab::Listed {
            return self.listed.iter().filter(|r| matches_search(r)).collect();
        }

        self.ipos
            .iter()
            .filter(|r| match self.active_tab {
                Tab::Favorites => self.favorites.contains(&r.id),
                Tab::Open => r.status == IpoStatus::Open,
                Tab::Upcoming => r.status == IpoStatus::Upcoming,
                Tab::Closed => r.status == IpoStatus::Closed,
                Tab::Listed => unreachable!(),
            })
            .filter(|r| matches_search(r))
            .collect()
    }

    /// The record under the cursor, if any.
    pub fn selected_record(&self) -> Option<&IpoRecord> {
        self.filtered_ipos().get(self.selected_index).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_ipos().len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }

    fn set_tab(&mut self, tab: Tab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.selected_index = 0;
            self.insight = None;
        }
    }

    fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.insight = None;
        }
    }

    fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.filtered_ipos().len() {
            self.selected_index += 1;
            self.insight = None;
        }
    }

    fn toggle_favorite(&mut self) {
        let Some(id) = self.selected_record().map(|r| r.id.clone()) else {
            return;
        };
        if let Some(pos) = self.favorites.iter().position(|f| *f == id) {
            self.favorites.remove(pos);
        } else {
            self.favorites.push(id);
        }
        match serde_json::to_string(&self.favorites) {
            Ok(json) => {
                if let Err(err) = self.store.set(FAVORITES_KEY, &json) {
                    warn!(%err, "failed to persist favorites");
                }
            }
            Err(err) => warn!(%err, "failed to serialize favorites"),
        }
        // Dropping the last favorite can shrink the Saved tab under the cursor
        self.clamp_selection();
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(err) = self.store.set(THEME_KEY, self.theme.as_str()) {
            warn!(%err, "failed to persist theme");
        }
    }

    fn toggle_insight(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        if self.insight.as_ref().map(|(id, _)| id.as_str()) == Some(record.id.as_str()) {
            self.insight = None;
        } else {
            self.insight_requested = true;
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (from any view; `Esc` steps back first)
    /// - `↑/k`, `↓/j`: Move selection / field focus
    /// - `Tab`, `1`-`5`: Switch tracker tabs
    /// - `/`: Search, `f`: favorite, `i`: insight, `r`: force refresh
    /// - `c` / `a` / `d`: Tools, Academy, Dashboard
    /// - `t`: Theme, `x`: dismiss banner, `?`: help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        // Search capture intercepts typing in the tracker
        if self.search_active {
            match key_event.code {
                KeyCode::Esc => {
                    self.search_active = false;
                    self.search_query.clear();
                    self.clamp_selection();
                }
                KeyCode::Enter => {
                    self.search_active = false;
                }
                KeyCode::Backspace => {
                    self.search_query.pop();
                    self.clamp_selection();
                }
                KeyCode::Char(c) => {
                    self.search_query.push(c);
                    self.clamp_selection();
                }
                _ => {}
            }
            return;
        }

        match self.view {
            View::Tracker => self.handle_tracker_key(key_event),
            View::Tools => self.handle_tools_key(key_event),
            View::Academy => self.handle_academy_key(key_event),
        }
    }

    fn handle_tracker_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if !self.search_query.is_empty() {
                    self.search_query.clear();
                    self.clamp_selection();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection_down();
            }
            KeyCode::Tab => {
                self.set_tab(self.active_tab.next());
            }
            KeyCode::Char('1') => self.set_tab(Tab::Open),
            KeyCode::Char('2') => self.set_tab(Tab::Upcoming),
            KeyCode::Char('3') => self.set_tab(Tab::Closed),
            KeyCode::Char('4') => self.set_tab(Tab::Listed),
            KeyCode::Char('5') => self.set_tab(Tab::Favorites),
            KeyCode::Char('/') => {
                self.search_active = true;
            }
            KeyCode::Char('f') => {
                self.toggle_favorite();
            }
            KeyCode::Char('i') => {
                self.toggle_insight();
            }
            KeyCode::Char('r') => {
                self.refresh_requested = true;
            }
            KeyCode::Char('x') => {
                self.banner = None;
            }
            KeyCode::Char('c') => {
                self.view = View::Tools;
            }
            KeyCode::Char('a') => {
                self.view = View::Academy;
            }
            KeyCode::Char('t') => {
                self.toggle_theme();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn handle_tools_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc | KeyCode::Char('d') => {
                self.view = View::Tracker;
            }
            KeyCode::Char('1') => self.tools.select_tool(Tool::Sip),
            KeyCode::Char('2') => self.tools.select_tool(Tool::StockAverage),
            KeyCode::Char('3') => self.tools.select_tool(Tool::Allotment),
            KeyCode::Char('4') => self.tools.select_tool(Tool::Cagr),
            KeyCode::Char('5') => self.tools.select_tool(Tool::CapitalGains),
            KeyCode::Char('6') => self.tools.select_tool(Tool::Graham),
            KeyCode::Up | KeyCode::Char('k') => {
                self.tools.move_field_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.tools.move_field_down();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.tools.adjust(-1.0);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.tools.adjust(1.0);
            }
            KeyCode::Char('n') | KeyCode::Char('+') => {
                self.tools.add_row();
            }
            KeyCode::Char('x') | KeyCode::Char('-') => {
                self.tools.remove_row();
            }
            KeyCode::Char('t') => {
                self.toggle_theme();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn handle_academy_key(&mut self, key_event: KeyEvent) {
        // Quiz mode captures its own keys
        if let Some(quiz) = self.quiz.as_mut() {
            match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.quiz = None;
                }
                KeyCode::Char(c @ '1'..='4') => {
                    let choice = (c as usize) - ('1' as usize);
                    quiz.answer(choice);
                }
                KeyCode::Enter | KeyCode::Char('n') => {
                    quiz.advance();
                }
                KeyCode::Char('s') => {
                    if quiz.finished {
                        self.quiz = Some(Quiz::new());
                    }
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc | KeyCode::Char('d') => {
                self.view = View::Tracker;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.academy_index > 0 {
                    self.academy_index -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.academy_index + 1 < crate::academy::all_modules().len() {
                    self.academy_index += 1;
                }
            }
            KeyCode::Char('s') => {
                self.quiz = Some(Quiz::new());
            }
            KeyCode::Char('t') => {
                self.toggle_theme();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }
}
