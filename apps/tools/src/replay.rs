use std::{fmt::Write as _, fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use shared::{
    domain::{Todo, View},
    protocol::{decode_event_lines, StoreEvent},
};
use store::{Clock, Store, SystemClock, TodoState};
use tracing::{info, warn};

#[derive(Debug, Default, Clone)]
pub struct ReplayOptions {
    pub seed: bool,
    pub view: Option<View>,
    pub search: Option<String>,
}

/// Applies the event script at `path` to a fresh session and returns the
/// final snapshot. `view` and `search` are dispatched after the script.
pub fn replay_file(path: &Path, options: &ReplayOptions) -> Result<Arc<TodoState>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read event script '{}'", path.display()))?;
    let events = decode_event_lines(&raw)
        .with_context(|| format!("failed to decode event script '{}'", path.display()))?;
    Ok(replay_events(events, options, Arc::new(SystemClock)))
}

pub fn replay_events(
    events: Vec<StoreEvent>,
    options: &ReplayOptions,
    clock: Arc<dyn Clock>,
) -> Arc<TodoState> {
    let mut store = if options.seed {
        Store::seeded(clock)
    } else {
        Store::with_clock(TodoState::empty(), clock)
    };

    let count = events.len();
    store.dispatch_all(events);

    if let Some(view) = options.view {
        let state = store.dispatch(StoreEvent::SetView { view });
        if state.view() != view {
            warn!(%view, "requested view does not exist, keeping {}", state.view());
        }
    }
    if let Some(query) = &options.search {
        store.dispatch(StoreEvent::SetSearchQuery {
            query: query.clone(),
        });
    }

    info!(events = count, revision = store.revision(), "replay finished");
    store.snapshot()
}

pub fn render_text(state: &TodoState) -> String {
    let mut out = String::new();
    let _ = write!(out, "View: {}", state.view());
    if !state.search_query().is_empty() {
        let _ = write!(out, " (search: \"{}\")", state.search_query());
    }
    out.push('\n');

    let visible = state.visible_todos();
    for todo in &visible.incomplete {
        render_todo(&mut out, todo);
    }
    if !visible.completed.is_empty() {
        out.push_str("Completed\n");
        for todo in &visible.completed {
            render_todo(&mut out, todo);
        }
    }
    if visible.is_empty() {
        out.push_str("(no tasks)\n");
    }

    let progress = state.progress();
    let _ = writeln!(
        out,
        "Progress: {}/{} ({:.0}%)",
        progress.completed,
        progress.total,
        progress.percentage()
    );
    let _ = writeln!(out, "Unread notifications: {}", state.unread_count());
    out
}

fn render_todo(out: &mut String, todo: &Todo) {
    let mark = if todo.completed { "x" } else { " " };
    let _ = write!(out, "[{mark}] {} {}", todo.id, todo.title);
    if todo.important {
        out.push_str(" *");
    }
    if let Some(due_date) = todo.due_date {
        let _ = write!(out, " (due {})", due_date.format("%Y-%m-%d"));
    }
    if !todo.steps.is_empty() {
        let done = todo.steps.iter().filter(|step| step.completed).count();
        let _ = write!(out, " [{done}/{} steps]", todo.steps.len());
    }
    out.push('\n');
}

#[cfg(test)]
#[path = "tests/replay_tests.rs"]
mod tests;
