use anyhow::Context;
use clap::Parser;
use docsearch::cli::Cli;
use docsearch::session::{Highlighted, KeyIntent, LoadingState, ResultRow};
use docsearch::{
    CatalogSource, FileCatalog, Host, SearchConfig, SearchSession, WidgetEvent, WidgetHandle,
    WidgetRuntime,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Terminal stand-in for the page: prints results, and turns focus requests back
/// into focus events the way a browser would.
struct TerminalHost {
    handle: WidgetHandle,
    html: bool,
}

impl Host for TerminalHost {
    fn render_results(&mut self, rows: &[ResultRow]) {
        for (position, row) in rows.iter().enumerate() {
            if self.html {
                println!("{}", row.to_html());
            } else {
                println!("{:>3}. {}  ({})", position + 1, plain_label(row), row.href);
            }
        }
        if rows.is_empty() {
            println!("(no results)");
        }
    }

    fn highlight_row(&mut self, row: Option<usize>) {
        if let Some(row) = row {
            println!("> {}", row + 1);
        }
    }

    fn set_widget_loading_class(&mut self, previous: LoadingState, current: LoadingState) {
        tracing::info!("Search index: {} -> {}", previous, current);
    }

    fn set_focus_class(&mut self, focused: bool) {
        tracing::debug!("Focus: {}", focused);
    }

    fn set_input_text(&mut self, text: &str) {
        tracing::debug!("Input text: {:?}", text);
    }

    fn navigate_to(&mut self, url: &str) {
        println!("-> {}", url);
    }

    fn release_input_focus(&mut self) {
        self.handle.send(WidgetEvent::FocusLost);
    }

    fn focus_input(&mut self) {
        self.handle.send(WidgetEvent::FocusGained);
    }
}

/// `parent.name` with the emphasized spans in brackets.
fn plain_label(row: &ResultRow) -> String {
    let mut label = String::new();
    if let Some(parent) = &row.parent {
        push_highlighted(&mut label, parent);
        label.push('.');
    }
    push_highlighted(&mut label, &row.name);
    label
}

fn push_highlighted(label: &mut String, highlighted: &Highlighted) {
    for (segment, emphasized) in highlighted.segments() {
        if emphasized {
            label.push('[');
            label.push_str(segment);
            label.push(']');
        } else {
            label.push_str(segment);
        }
    }
}

/// Map an input line to a widget event. Lines starting with `:` are commands.
fn parse_line(line: &str) -> Option<WidgetEvent> {
    match line.trim_end() {
        ":focus" => Some(WidgetEvent::FocusGained),
        ":blur" => Some(WidgetEvent::FocusLost),
        ":up" => Some(WidgetEvent::KeyDown(Some(KeyIntent::Up))),
        ":down" => Some(WidgetEvent::KeyDown(Some(KeyIntent::Down))),
        ":enter" => Some(WidgetEvent::KeyDown(Some(KeyIntent::Enter))),
        ":esc" => Some(WidgetEvent::KeyDown(Some(KeyIntent::Escape))),
        ":quit" => Some(WidgetEvent::Shutdown),
        command if command.starts_with(':') => None,
        text => Some(WidgetEvent::QueryChanged(text.to_string())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    docsearch::logging::init(cli.log_format);

    let mut config = match &cli.config {
        Some(path) => {
            let source = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            SearchConfig::from_toml_str(&source)?
        }
        None => SearchConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let source = CatalogSource::Fetch(Arc::new(FileCatalog::new(&cli.catalog)));
    let session = SearchSession::new(config, source);

    let (runtime, handle) = WidgetRuntime::new_with(session, |handle| TerminalHost {
        handle,
        html: cli.html,
    });
    let widget = tokio::spawn(runtime.run());

    // The terminal has a single "input", so it starts out focused.
    handle.send(WidgetEvent::FocusGained);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let Some(event) = parse_line(&line) else {
            eprintln!("Unknown command: {}", line.trim());
            continue;
        };
        let shutdown = event == WidgetEvent::Shutdown;
        if !handle.send(event) || shutdown {
            break;
        }
    }

    handle.send(WidgetEvent::Shutdown);
    let (session, _host) = widget.await.context("Search widget loop panicked")?;
    tracing::debug!(
        "Session ended in state {} after {} index queries",
        session.loading_state(),
        session.index_queries()
    );
    Ok(())
}
