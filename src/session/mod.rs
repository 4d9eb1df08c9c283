//! The search widget's state machine.
//!
//! A [`SearchSession`] is owned by the hosting component and driven through its
//! `on_*` handlers. Handlers never perform side effects themselves; they return the
//! [`Effect`]s the host should apply, in order. Deferred work (the loading grace
//! period, the blur delay and the pause between index batches) is requested with
//! [`Effect::Schedule`] and comes back through [`SearchSession::on_timer`]. Every
//! deferred action re-checks the state it depends on when it fires, so a timer that
//! has become moot is a silent no-op.

mod input;
mod results;

pub use input::{CursorDirection, KeyIntent, PageKeystroke};
pub use results::{Highlighted, ResultRow};

use crate::catalog::{Catalog, CatalogFetch, CatalogSource};
use crate::config::SearchConfig;
use crate::error::CatalogError;
use crate::search::{BuildStatus, FieldBoosts, IndexBuilder, MatchMode, Query, SearchIndex};
use results::Highlighter;
use std::{fmt, sync::Arc, time::Duration};

/// Lifecycle of index availability.
///
/// Starts at `Idle` and never returns to it. `Failure` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failure,
}

impl LoadingState {
    /// Class name the widget carries while in this state.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for LoadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Deferred work the session asks the host to schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Show the loading indicator if loading is still in progress.
    LoadingGrace,
    /// Index the next batch of records.
    BuildBatch,
    /// Act on a focus loss that happened in focus session `generation`.
    DeferredBlur { generation: u64 },
}

/// A side effect requested by the session.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Replace the rendered result list.
    RenderResults(Vec<ResultRow>),
    /// Mark the row at this position as current, or clear the mark.
    HighlightRow(Option<usize>),
    /// Swap the widget's loading class.
    SetLoadingClass {
        previous: LoadingState,
        current: LoadingState,
    },
    /// Toggle the widget's focus class.
    SetFocusClass(bool),
    /// Overwrite the visible text of the search input.
    SetInputText(String),
    /// Follow a result link.
    NavigateTo(String),
    /// Blur the search input.
    ReleaseInputFocus,
    /// Focus the search input.
    FocusInput,
    /// Prevent the default action of the keystroke being handled.
    SuppressDefault,
    /// Run the catalog fetch and report back through [`SearchSession::on_catalog_loaded`].
    FetchCatalog(Arc<dyn CatalogFetch>),
    /// Call [`SearchSession::on_timer`] with `timer` after `delay`.
    Schedule { timer: Timer, delay: Duration },
}

pub type Effects = Vec<Effect>;

/// Search widget state: loading, focus, query and cursor.
#[derive(Debug)]
pub struct SearchSession {
    config: SearchConfig,
    source: CatalogSource,
    loading: LoadingState,
    /// Loading class currently shown by the host
    shown_loading: LoadingState,
    query: String,
    has_focus: bool,
    /// Bumped on every focus gain; stale blur timers compare against it
    focus_generation: u64,
    result_clicked: bool,
    /// Whether the current keystroke's keypress should be suppressed
    prevent_press: bool,
    cursor: Option<usize>,
    rows: Vec<ResultRow>,
    catalog: Option<Arc<Catalog>>,
    builder: Option<IndexBuilder>,
    index: Option<SearchIndex>,
    index_queries: u64,
    effects: Effects,
}

impl SearchSession {
    /// Create a session. Nothing is loaded until the input first gains focus.
    pub fn new(config: SearchConfig, source: impl Into<CatalogSource>) -> Self {
        Self {
            config,
            source: source.into(),
            loading: LoadingState::Idle,
            shown_loading: LoadingState::Idle,
            query: String::new(),
            has_focus: false,
            focus_generation: 0,
            result_clicked: false,
            prevent_press: false,
            cursor: None,
            rows: Vec::new(),
            catalog: None,
            builder: None,
            index: None,
            index_queries: 0,
            effects: Vec::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn loading_state(&self) -> LoadingState {
        self.loading
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Rows from the most recent evaluation.
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Number of queries run against the index so far.
    pub fn index_queries(&self) -> u64 {
        self.index_queries
    }

    /// The built index, once the session is ready.
    pub fn index(&self) -> Option<&SearchIndex> {
        self.index.as_ref()
    }

    // --- Inbound events ---

    pub fn on_focus_gained(&mut self) -> Effects {
        self.focus_generation += 1;
        self.set_has_focus(true);
        self.ensure_index_loading();
        self.take_effects()
    }

    /// The input lost focus. Acted on after the blur delay, unless a result is being clicked.
    pub fn on_focus_lost(&mut self) -> Effects {
        if self.result_clicked {
            tracing::debug!("Focus lost while a result is pressed, deferring to the click");
            self.result_clicked = false;
        } else {
            self.effects.push(Effect::Schedule {
                timer: Timer::DeferredBlur {
                    generation: self.focus_generation,
                },
                delay: self.config.blur_delay(),
            });
        }
        self.take_effects()
    }

    pub fn on_query_changed(&mut self, text: &str) -> Effects {
        self.set_query(text);
        self.take_effects()
    }

    /// A key went down in the search input.
    ///
    /// The four handled keys suppress their default action and the keypress that
    /// follows; any other key clears that suppression.
    pub fn on_key_down(&mut self, intent: Option<KeyIntent>) -> Effects {
        match intent {
            Some(intent) => {
                self.prevent_press = true;
                self.effects.push(Effect::SuppressDefault);
                self.apply_key_intent(intent);
            }
            None => self.prevent_press = false,
        }
        self.take_effects()
    }

    /// The keypress following a keydown.
    pub fn on_key_press(&mut self) -> Effects {
        if self.prevent_press {
            self.effects.push(Effect::SuppressDefault);
        }
        self.take_effects()
    }

    /// Run a key intent without the keystroke bookkeeping.
    pub fn on_key_intent(&mut self, intent: KeyIntent) -> Effects {
        self.apply_key_intent(intent);
        self.take_effects()
    }

    /// A key went down anywhere on the page.
    pub fn on_page_key(&mut self, keystroke: PageKeystroke) -> Effects {
        if !keystroke.has_modifier() && !self.has_focus && keystroke.is_printable() {
            self.effects.push(Effect::FocusInput);
        }
        self.take_effects()
    }

    pub fn on_result_press_start(&mut self) -> Effects {
        self.result_clicked = true;
        self.take_effects()
    }

    pub fn on_result_press_end(&mut self) -> Effects {
        self.result_clicked = false;
        self.set_has_focus(false);
        self.take_effects()
    }

    /// Result of an [`Effect::FetchCatalog`] request.
    pub fn on_catalog_loaded(&mut self, result: Result<Catalog, CatalogError>) -> Effects {
        if self.loading != LoadingState::Loading || self.catalog.is_some() {
            tracing::warn!("Ignoring catalog delivered in state {}", self.loading);
            return self.take_effects();
        }

        match result {
            Ok(catalog) => {
                tracing::info!("Catalog loaded ({} records)", catalog.len());
                self.start_build(Arc::new(catalog));
            }
            Err(e) => {
                tracing::warn!("Search disabled, catalog unavailable: {}", e);
                self.set_loading_state(LoadingState::Failure);
            }
        }
        self.take_effects()
    }

    pub fn on_timer(&mut self, timer: Timer) -> Effects {
        match timer {
            Timer::LoadingGrace => {
                if self.loading == LoadingState::Loading && self.shown_loading != self.loading {
                    self.show_loading_class();
                }
            }
            Timer::BuildBatch => {
                if self.builder.is_some() {
                    self.run_batch();
                }
            }
            Timer::DeferredBlur { generation } => {
                if generation == self.focus_generation && !self.result_clicked {
                    self.set_has_focus(false);
                } else {
                    tracing::trace!("Dropping stale blur from focus session {}", generation);
                }
            }
        }
        self.take_effects()
    }

    // --- Operations ---

    /// Start loading the index the first time it is needed.
    pub fn ensure_index_loading(&mut self) {
        if self.loading != LoadingState::Idle {
            return;
        }
        self.set_loading_state(LoadingState::Loading);
        self.effects.push(Effect::Schedule {
            timer: Timer::LoadingGrace,
            delay: self.config.loading_grace(),
        });

        match self.source.clone() {
            CatalogSource::Resident(catalog) => self.start_build(catalog),
            CatalogSource::Fetch(fetch) => {
                tracing::info!("Fetching search catalog");
                self.effects.push(Effect::FetchCatalog(fetch));
            }
        }
    }

    /// Set the query and re-evaluate it, even if it did not change.
    pub fn set_query(&mut self, raw: &str) {
        self.query = raw.trim().to_string();
        self.update_results();
    }

    /// Move the cursor one row, clamping at both ends.
    pub fn move_cursor(&mut self, direction: CursorDirection) {
        let Some(last) = self.rows.len().checked_sub(1) else {
            return;
        };
        let next = match (self.cursor, direction) {
            (None, CursorDirection::Next) => 0,
            (None, CursorDirection::Previous) => last,
            (Some(current), CursorDirection::Next) if current < last => current + 1,
            (Some(current), CursorDirection::Previous) if current > 0 => current - 1,
            _ => return,
        };
        self.cursor = Some(next);
        self.effects.push(Effect::HighlightRow(Some(next)));
    }

    /// Navigate to the highlighted row, or the first row if none is highlighted.
    pub fn activate_current(&mut self) {
        let target = self.cursor.unwrap_or(0);
        if let Some(row) = self.rows.get(target) {
            tracing::debug!("Activating result {} ({})", row.id, row.href);
            self.effects.push(Effect::NavigateTo(row.href.clone()));
            self.effects.push(Effect::ReleaseInputFocus);
        }
    }

    /// Drain effects queued by the operations above.
    ///
    /// The `on_*` handlers drain for you; call this after invoking an operation directly.
    pub fn take_effects(&mut self) -> Effects {
        std::mem::take(&mut self.effects)
    }

    // --- Internals ---

    fn apply_key_intent(&mut self, intent: KeyIntent) {
        match intent {
            KeyIntent::Enter => self.activate_current(),
            KeyIntent::Escape => self.effects.push(Effect::ReleaseInputFocus),
            KeyIntent::Up => self.move_cursor(CursorDirection::Previous),
            KeyIntent::Down => self.move_cursor(CursorDirection::Next),
        }
    }

    fn set_loading_state(&mut self, value: LoadingState) {
        if self.loading == value {
            return;
        }
        tracing::info!("Search loading state: {} -> {}", self.loading, value);
        self.loading = value;

        // Loading is only shown once the grace period has passed
        if value != LoadingState::Loading {
            self.show_loading_class();
        }

        if value == LoadingState::Ready {
            self.update_results();
        }
    }

    fn show_loading_class(&mut self) {
        self.effects.push(Effect::SetLoadingClass {
            previous: self.shown_loading,
            current: self.loading,
        });
        self.shown_loading = self.loading;
    }

    fn set_has_focus(&mut self, value: bool) {
        if self.has_focus == value {
            return;
        }
        self.has_focus = value;
        self.effects.push(Effect::SetFocusClass(value));

        if value {
            self.set_query("");
            self.effects.push(Effect::SetInputText(String::new()));
        } else {
            self.effects.push(Effect::SetInputText(self.query.clone()));
        }
    }

    fn start_build(&mut self, catalog: Arc<Catalog>) {
        let boosts = FieldBoosts {
            name: self.config.name_boost,
            parent: self.config.parent_boost,
        };
        self.builder = Some(IndexBuilder::new(
            Arc::clone(&catalog),
            self.config.batch_size,
            boosts,
        ));
        self.catalog = Some(catalog);
        self.run_batch();
    }

    fn run_batch(&mut self) {
        let Some(builder) = self.builder.as_mut() else {
            return;
        };

        match builder.build_next_batch() {
            BuildStatus::More { .. } => self.effects.push(Effect::Schedule {
                timer: Timer::BuildBatch,
                delay: self.config.batch_delay(),
            }),
            BuildStatus::Done => {
                self.index = self.builder.take().and_then(IndexBuilder::finish);
                self.set_loading_state(LoadingState::Ready);
            }
        }
    }

    /// Evaluate the current query and render the outcome.
    fn update_results(&mut self) {
        self.rows.clear();
        self.cursor = None;

        if self.loading == LoadingState::Ready
            && !self.query.is_empty()
            && let (Some(index), Some(catalog)) = (&self.index, &self.catalog)
        {
            let query = Query::parse(&self.query);
            let mut hits = index.search(&query, MatchMode::Contains);
            self.index_queries += 1;

            if hits.is_empty() {
                tracing::debug!("No matches for '{}', retrying fuzzy", self.query);
                hits = index.search(
                    &query,
                    MatchMode::Fuzzy {
                        distance: self.config.fuzzy_distance,
                    },
                );
                self.index_queries += 1;
            }

            let highlighter = Highlighter::new(&self.query);
            self.rows = hits
                .iter()
                .take(self.config.max_results)
                .filter_map(|hit| {
                    let Some(record) = catalog.get(hit.id) else {
                        tracing::warn!("Dropping result {}: not in the catalog", hit.id);
                        return None;
                    };
                    Some(highlighter.row(
                        record,
                        &self.config.base_url,
                        catalog.kind_label(record.kind),
                    ))
                })
                .collect();

            tracing::debug!("Query '{}' rendered {} rows", self.query, self.rows.len());
        }

        self.effects.push(Effect::RenderResults(self.rows.clone()));
    }
}
