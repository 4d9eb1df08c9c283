//! Event loop that drives a [`SearchSession`] on a tokio runtime.
//!
//! The loop owns the session and processes one message at a time, so the session
//! never needs locking. Host events arrive through a [`WidgetHandle`]; timers and
//! catalog fetches run as spawned tasks that post their outcome back onto the same
//! queue. Index batches are therefore interleaved with keystrokes and focus
//! changes instead of blocking them.

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::session::{
    Effect, Effects, KeyIntent, LoadingState, PageKeystroke, ResultRow, SearchSession, Timer,
};
use tokio::sync::mpsc;

/// Outbound side of the widget: what the environment must be able to do.
pub trait Host: Send {
    fn render_results(&mut self, rows: &[ResultRow]);
    fn highlight_row(&mut self, row: Option<usize>);
    fn set_widget_loading_class(&mut self, previous: LoadingState, current: LoadingState);
    fn set_focus_class(&mut self, focused: bool);
    fn set_input_text(&mut self, text: &str);
    fn navigate_to(&mut self, url: &str);
    fn release_input_focus(&mut self);
    fn focus_input(&mut self);

    /// Called while a handled keystroke is being processed. Hosts that resolve
    /// default actions synchronously suppress them here.
    fn suppress_default(&mut self) {}
}

/// Inbound events from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    FocusGained,
    FocusLost,
    QueryChanged(String),
    KeyDown(Option<KeyIntent>),
    KeyPress,
    PageKey(PageKeystroke),
    ResultPressStart,
    ResultPressEnd,
    /// Stop the loop and hand the session back.
    Shutdown,
}

#[derive(Debug)]
enum Message {
    Event(WidgetEvent),
    Timer(Timer),
    CatalogLoaded(Result<Catalog, CatalogError>),
}

/// Cloneable sender for widget events.
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl WidgetHandle {
    /// Queue an event. Returns `false` once the loop has stopped.
    pub fn send(&self, event: WidgetEvent) -> bool {
        self.tx.send(Message::Event(event)).is_ok()
    }
}

/// Owns a session and a host, and runs until [`WidgetEvent::Shutdown`].
pub struct WidgetRuntime<H> {
    session: SearchSession,
    host: H,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl<H: Host> WidgetRuntime<H> {
    pub fn new(session: SearchSession, host: H) -> (Self, WidgetHandle) {
        Self::new_with(session, |_| host)
    }

    /// Like [`new`](Self::new), for hosts that feed events back into the widget
    /// (a blur request that surfaces as a focus-lost event, for instance).
    pub fn new_with(
        session: SearchSession,
        make_host: impl FnOnce(WidgetHandle) -> H,
    ) -> (Self, WidgetHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = WidgetHandle { tx: tx.clone() };
        let host = make_host(handle.clone());
        (
            Self {
                session,
                host,
                tx,
                rx,
            },
            handle,
        )
    }

    /// Process messages until shutdown, then return the session and host.
    pub async fn run(mut self) -> (SearchSession, H) {
        tracing::debug!("Search widget loop started");

        while let Some(message) = self.rx.recv().await {
            let effects = match message {
                Message::Event(WidgetEvent::Shutdown) => break,
                Message::Event(event) => self.handle_event(event),
                Message::Timer(timer) => self.session.on_timer(timer),
                Message::CatalogLoaded(result) => self.session.on_catalog_loaded(result),
            };
            self.dispatch(effects);
        }

        tracing::debug!("Search widget loop stopped");
        (self.session, self.host)
    }

    fn handle_event(&mut self, event: WidgetEvent) -> Effects {
        tracing::trace!("Widget event: {:?}", event);
        match event {
            WidgetEvent::FocusGained => self.session.on_focus_gained(),
            WidgetEvent::FocusLost => self.session.on_focus_lost(),
            WidgetEvent::QueryChanged(text) => self.session.on_query_changed(&text),
            WidgetEvent::KeyDown(intent) => self.session.on_key_down(intent),
            WidgetEvent::KeyPress => self.session.on_key_press(),
            WidgetEvent::PageKey(keystroke) => self.session.on_page_key(keystroke),
            WidgetEvent::ResultPressStart => self.session.on_result_press_start(),
            WidgetEvent::ResultPressEnd => self.session.on_result_press_end(),
            WidgetEvent::Shutdown => Vec::new(),
        }
    }

    fn dispatch(&mut self, effects: Effects) {
        for effect in effects {
            match effect {
                Effect::RenderResults(rows) => self.host.render_results(&rows),
                Effect::HighlightRow(row) => self.host.highlight_row(row),
                Effect::SetLoadingClass { previous, current } => {
                    self.host.set_widget_loading_class(previous, current);
                }
                Effect::SetFocusClass(focused) => self.host.set_focus_class(focused),
                Effect::SetInputText(text) => self.host.set_input_text(&text),
                Effect::NavigateTo(url) => self.host.navigate_to(&url),
                Effect::ReleaseInputFocus => self.host.release_input_focus(),
                Effect::FocusInput => self.host.focus_input(),
                Effect::SuppressDefault => self.host.suppress_default(),
                Effect::FetchCatalog(fetch) => {
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = fetch.fetch().await;
                        let _ = tx.send(Message::CatalogLoaded(result));
                    });
                }
                Effect::Schedule { timer, delay } => {
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(Message::Timer(timer));
                    });
                }
            }
        }
    }
}
