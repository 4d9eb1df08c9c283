//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `scenario_catalog`: the two-record `Widget` / `Widget.render` catalog
//! - `numbered_catalog(n)`: `n` records named `Entry0..Entry{n-1}`, every third one
//!   nested under a `Module{k}` parent
//!
//! # Driving a session without a runtime
//!
//! [`finish_build`] fires pending [`Timer::BuildBatch`] requests until the index is
//! complete, returning every other effect in order. Loading-grace and blur timers
//! are left for the test to fire explicitly.
//!
//! # Driving a runtime
//!
//! [`RecordingHost`] records every host call as a [`HostCall`] so tests can assert on
//! the sequence once the loop has shut down.

#![allow(dead_code)] // Helpers used across different integration test crates

use docsearch::catalog::CatalogFetch;
use docsearch::session::{Effect, Effects, Timer};
use docsearch::{
    Catalog, CatalogError, CatalogRecord, Host, LoadingState, ResultRow, SearchConfig,
    SearchSession,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use rstest::fixture;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn record(id: u32, name: &str, parent: Option<&str>) -> CatalogRecord {
    CatalogRecord {
        id,
        kind: if parent.is_some() { 2048 } else { 128 },
        name: name.to_string(),
        url: format!("{}.html", name.to_lowercase()),
        classes: if parent.is_some() {
            "tsd-kind-method".to_string()
        } else {
            "tsd-kind-class".to_string()
        },
        parent: parent.map(str::to_string),
    }
}

/// The catalog from the widget's reference scenario.
#[fixture]
pub fn scenario_catalog() -> Catalog {
    let rows = vec![
        CatalogRecord {
            id: 1,
            kind: 0,
            name: "Widget".to_string(),
            url: "a.html".to_string(),
            classes: "tsd-kind-class".to_string(),
            parent: None,
        },
        CatalogRecord {
            id: 2,
            kind: 1,
            name: "render".to_string(),
            url: "b.html".to_string(),
            classes: "tsd-kind-method".to_string(),
            parent: Some("Widget".to_string()),
        },
    ];
    let kinds = HashMap::from([(0, "Class".to_string()), (1, "Method".to_string())]);
    Catalog::new(rows, kinds).expect("scenario catalog is valid")
}

/// `n` records with distinct names. Ids start at 1000 so they never match positions.
pub fn numbered_catalog(n: u32) -> Catalog {
    let rows = (0..n)
        .map(|i| {
            let parent = (i % 3 == 0).then(|| format!("Module{}", i / 10));
            record(1000 + i, &format!("Entry{}", i), parent.as_deref())
        })
        .collect();
    Catalog::new(rows, HashMap::new()).expect("numbered catalog is valid")
}

/// A session over a resident catalog with default settings.
pub fn resident_session(catalog: Catalog) -> SearchSession {
    docsearch::logging::init_for_tests();
    SearchSession::new(SearchConfig::default(), catalog)
}

/// Fire pending build batches until none remain; return all other effects.
pub fn finish_build(session: &mut SearchSession, mut effects: Effects) -> Effects {
    let mut out = Vec::new();
    loop {
        let mut pending = false;
        for effect in effects {
            match effect {
                Effect::Schedule {
                    timer: Timer::BuildBatch,
                    ..
                } => pending = true,
                other => out.push(other),
            }
        }
        if !pending {
            return out;
        }
        effects = session.on_timer(Timer::BuildBatch);
    }
}

/// Focus a resident session and build its whole index.
pub fn ready_session(catalog: Catalog) -> SearchSession {
    let mut session = resident_session(catalog);
    let effects = session.on_focus_gained();
    finish_build(&mut session, effects);
    assert_eq!(session.loading_state(), LoadingState::Ready);
    session
}

/// The rows of the last `RenderResults` effect, if any.
pub fn last_render(effects: &[Effect]) -> Option<&[ResultRow]> {
    effects.iter().rev().find_map(|effect| match effect {
        Effect::RenderResults(rows) => Some(rows.as_slice()),
        _ => None,
    })
}

/// Ids of the rows in a render.
pub fn ids(rows: &[ResultRow]) -> Vec<u32> {
    rows.iter().map(|row| row.id).collect()
}

/// A fetch that resolves after `delay` with a fixed outcome and counts its calls.
#[derive(Clone)]
pub struct StubFetch {
    outcome: Arc<dyn Fn() -> Result<Catalog, CatalogError> + Send + Sync>,
    delay: Duration,
    pub calls: Arc<AtomicUsize>,
}

impl StubFetch {
    pub fn ok(make: impl Fn() -> Catalog + Send + Sync + 'static, delay: Duration) -> Self {
        Self {
            outcome: Arc::new(move || Ok(make())),
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(delay: Duration) -> Self {
        Self {
            outcome: Arc::new(|| Err(CatalogError::Unavailable("connection refused".to_string()))),
            delay,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CatalogFetch for StubFetch {
    fn fetch(&self) -> BoxFuture<'static, Result<Catalog, CatalogError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = Arc::clone(&self.outcome);
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            outcome()
        }
        .boxed()
    }
}

/// One call made on a [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Render(Vec<u32>),
    Highlight(Option<usize>),
    LoadingClass(LoadingState, LoadingState),
    FocusClass(bool),
    InputText(String),
    Navigate(String),
    ReleaseFocus,
    FocusInput,
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub calls: Vec<HostCall>,
    pub last_rows: Vec<ResultRow>,
}

impl RecordingHost {
    pub fn loading_classes(&self) -> Vec<(LoadingState, LoadingState)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::LoadingClass(previous, current) => Some((*previous, *current)),
                _ => None,
            })
            .collect()
    }

    pub fn focus_classes(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::FocusClass(focused) => Some(*focused),
                _ => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn render_results(&mut self, rows: &[ResultRow]) {
        self.calls
            .push(HostCall::Render(rows.iter().map(|row| row.id).collect()));
        self.last_rows = rows.to_vec();
    }

    fn highlight_row(&mut self, row: Option<usize>) {
        self.calls.push(HostCall::Highlight(row));
    }

    fn set_widget_loading_class(&mut self, previous: LoadingState, current: LoadingState) {
        self.calls.push(HostCall::LoadingClass(previous, current));
    }

    fn set_focus_class(&mut self, focused: bool) {
        self.calls.push(HostCall::FocusClass(focused));
    }

    fn set_input_text(&mut self, text: &str) {
        self.calls.push(HostCall::InputText(text.to_string()));
    }

    fn navigate_to(&mut self, url: &str) {
        self.calls.push(HostCall::Navigate(url.to_string()));
    }

    fn release_input_focus(&mut self) {
        self.calls.push(HostCall::ReleaseFocus);
    }

    fn focus_input(&mut self) {
        self.calls.push(HostCall::FocusInput);
    }
}
