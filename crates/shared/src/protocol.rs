use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{
    domain::{ListId, NotificationId, StepId, Todo, TodoId, UserPatch, View},
    error::EventDecodeError,
};

/// Tags of every event this build understands.
pub const EVENT_KINDS: [&str; 26] = [
    "add_todo",
    "toggle_todo",
    "toggle_important",
    "delete_todo",
    "update_todo",
    "select_todo",
    "add_step",
    "toggle_step",
    "delete_step",
    "set_due_date",
    "set_reminder",
    "update_notes",
    "set_view",
    "set_search_query",
    "toggle_dark_mode",
    "toggle_grid_view",
    "toggle_sidebar",
    "update_user",
    "add_list",
    "delete_list",
    "toggle_calendar",
    "toggle_notifications",
    "add_notification",
    "mark_notification_read",
    "clear_notifications",
    "refresh",
];

/// User intent submitted to the store. Every variant is total: applying it
/// to any state yields a consistent state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StoreEvent {
    AddTodo {
        title: String,
        /// Quick due date picked in the new-task form.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        due_date: Option<DateTime<Utc>>,
    },
    ToggleTodo {
        todo_id: TodoId,
    },
    ToggleImportant {
        todo_id: TodoId,
    },
    DeleteTodo {
        todo_id: TodoId,
    },
    UpdateTodo {
        todo: Todo,
    },
    SelectTodo {
        #[serde(default)]
        todo_id: Option<TodoId>,
    },
    AddStep {
        todo_id: TodoId,
        title: String,
    },
    ToggleStep {
        todo_id: TodoId,
        step_id: StepId,
    },
    DeleteStep {
        todo_id: TodoId,
        step_id: StepId,
    },
    SetDueDate {
        todo_id: TodoId,
        date: DateTime<Utc>,
    },
    SetReminder {
        todo_id: TodoId,
        date: DateTime<Utc>,
    },
    UpdateNotes {
        todo_id: TodoId,
        notes: String,
    },
    SetView {
        view: View,
    },
    SetSearchQuery {
        query: String,
    },
    ToggleDarkMode,
    ToggleGridView,
    ToggleSidebar,
    UpdateUser {
        patch: UserPatch,
    },
    AddList {
        name: String,
        color: String,
    },
    DeleteList {
        list_id: ListId,
    },
    ToggleCalendar,
    ToggleNotifications,
    AddNotification {
        title: String,
        message: String,
    },
    MarkNotificationRead {
        notification_id: NotificationId,
    },
    ClearNotifications,
    Refresh,
    /// Any tag this build does not know about, whatever its payload.
    Unknown,
}

impl Serialize for StoreEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StoreEvent::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for StoreEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if let Some(kind) = value.get("type").and_then(Value::as_str) {
            if !EVENT_KINDS.contains(&kind) {
                return Ok(StoreEvent::Unknown);
            }
        }
        StoreEvent::deserialize(value).map_err(de::Error::custom)
    }
}

impl StoreEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreEvent::AddTodo { .. } => "add_todo",
            StoreEvent::ToggleTodo { .. } => "toggle_todo",
            StoreEvent::ToggleImportant { .. } => "toggle_important",
            StoreEvent::DeleteTodo { .. } => "delete_todo",
            StoreEvent::UpdateTodo { .. } => "update_todo",
            StoreEvent::SelectTodo { .. } => "select_todo",
            StoreEvent::AddStep { .. } => "add_step",
            StoreEvent::ToggleStep { .. } => "toggle_step",
            StoreEvent::DeleteStep { .. } => "delete_step",
            StoreEvent::SetDueDate { .. } => "set_due_date",
            StoreEvent::SetReminder { .. } => "set_reminder",
            StoreEvent::UpdateNotes { .. } => "update_notes",
            StoreEvent::SetView { .. } => "set_view",
            StoreEvent::SetSearchQuery { .. } => "set_search_query",
            StoreEvent::ToggleDarkMode => "toggle_dark_mode",
            StoreEvent::ToggleGridView => "toggle_grid_view",
            StoreEvent::ToggleSidebar => "toggle_sidebar",
            StoreEvent::UpdateUser { .. } => "update_user",
            StoreEvent::AddList { .. } => "add_list",
            StoreEvent::DeleteList { .. } => "delete_list",
            StoreEvent::ToggleCalendar => "toggle_calendar",
            StoreEvent::ToggleNotifications => "toggle_notifications",
            StoreEvent::AddNotification { .. } => "add_notification",
            StoreEvent::MarkNotificationRead { .. } => "mark_notification_read",
            StoreEvent::ClearNotifications => "clear_notifications",
            StoreEvent::Refresh => "refresh",
            StoreEvent::Unknown => "unknown",
        }
    }
}

/// Decodes a JSON-lines event script. Blank lines and lines starting with
/// `#` are skipped; line numbers in errors are 1-based.
pub fn decode_event_lines(raw: &str) -> Result<Vec<StoreEvent>, EventDecodeError> {
    let mut events = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str::<StoreEvent>(line).map_err(|source| {
            EventDecodeError::Malformed {
                line: index + 1,
                source,
            }
        })?;
        events.push(event);
    }
    Ok(events)
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
