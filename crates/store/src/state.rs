use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{
        CustomList, ListId, Notification, NotificationId, Step, StepId, Todo, TodoId, User,
        UserId, View,
    },
    protocol::StoreEvent,
};
use thiserror::Error;
use tracing::debug;

const SEED_PHOTO_URL: &str = "https://images.unsplash.com/photo-1494790108377-be9c29b29330?q=80&w=100&h=100&auto=format&fit=crop";

const SEED_TODOS: [(&str, bool, bool); 9] = [
    ("Buy groceries", false, false),
    ("Finish project report", false, true),
    ("Call the bank", false, false),
    ("Schedule dentist appointment", false, false),
    ("Plan weekend trip", false, false),
    ("Read a book", true, false),
    ("Clean the house", true, false),
    ("Prepare presentation", true, false),
    ("Update blog", true, false),
];

/// Reason an event left the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("title must not be blank")]
    BlankTitle,
    #[error("todo {0} does not exist")]
    UnknownTodo(TodoId),
    #[error("step {step_id} does not exist on todo {todo_id}")]
    UnknownStep { todo_id: TodoId, step_id: StepId },
    #[error("list {0} does not exist")]
    UnknownList(ListId),
    #[error("notification {0} does not exist")]
    UnknownNotification(NotificationId),
    #[error("todo {0} carries duplicate step ids")]
    DuplicateStepIds(TodoId),
    #[error("{0} id space exhausted")]
    IdsExhausted(&'static str),
    #[error("event type is not recognized")]
    UnknownEvent,
}

/// Per-collection id sequences. Values only ever grow, so an id handed out
/// once is never handed out again, even after the entity is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdCounters {
    todo: u64,
    step: u64,
    list: u64,
    notification: u64,
}

impl IdCounters {
    fn next_todo(&mut self) -> Result<TodoId, Rejection> {
        take(&mut self.todo, "todo").map(TodoId)
    }

    fn next_step(&mut self) -> Result<StepId, Rejection> {
        take(&mut self.step, "step").map(StepId)
    }

    fn next_list(&mut self) -> Result<ListId, Rejection> {
        take(&mut self.list, "list").map(ListId)
    }

    fn next_notification(&mut self) -> Result<NotificationId, Rejection> {
        take(&mut self.notification, "notification").map(NotificationId)
    }

    /// Moves the step sequence past an externally supplied id. `u64::MAX`
    /// can never be followed, so it is refused.
    fn observe_step(&mut self, step_id: StepId) -> Result<(), Rejection> {
        let after = step_id
            .0
            .checked_add(1)
            .ok_or(Rejection::IdsExhausted("step"))?;
        self.step = self.step.max(after);
        Ok(())
    }
}

/// Hands out the current value and advances the counter. The last value of
/// the range is never handed out, so the counter always has a successor.
fn take(counter: &mut u64, kind: &'static str) -> Result<u64, Rejection> {
    let id = *counter;
    *counter = id.checked_add(1).ok_or(Rejection::IdsExhausted(kind))?;
    Ok(id)
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            todo: 1,
            step: 1,
            list: 1,
            notification: 1,
        }
    }
}

/// Complete session state. Values are never edited in place by the store:
/// every transition produces a new `TodoState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoState {
    todos: Vec<Todo>,
    selected: Option<TodoId>,
    view: View,
    search_query: String,
    dark_mode: bool,
    grid_view: bool,
    sidebar_open: bool,
    show_calendar: bool,
    show_notifications: bool,
    user: User,
    custom_lists: Vec<CustomList>,
    notifications: Vec<Notification>,
    next_ids: IdCounters,
}

impl TodoState {
    /// The fixed session seed: nine sample tasks, one profile and two
    /// unread notifications stamped with `now`.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let mut state = Self::empty();
        for (index, (title, completed, important)) in SEED_TODOS.into_iter().enumerate() {
            let mut todo = Todo::new(TodoId(index as u64 + 1), title);
            todo.completed = completed;
            todo.important = important;
            state.todos.push(todo);
        }

        for (index, (title, message)) in [
            ("Task Completed", "You completed \"Read a book\""),
            ("New Task Due", "Task \"Buy groceries\" is due today"),
        ]
        .into_iter()
        .enumerate()
        {
            state.notifications.push(Notification {
                id: NotificationId(index as u64 + 1),
                title: title.to_string(),
                message: message.to_string(),
                read: false,
                created_at: now,
            });
        }

        state.next_ids.todo = state.todos.len() as u64 + 1;
        state.next_ids.notification = state.notifications.len() as u64 + 1;
        state
    }

    /// Seed profile and default flags, but no tasks or notifications.
    pub fn empty() -> Self {
        Self {
            todos: Vec::new(),
            selected: None,
            view: View::default(),
            search_query: String::new(),
            dark_mode: false,
            grid_view: false,
            sidebar_open: true,
            show_calendar: false,
            show_notifications: false,
            user: User {
                id: UserId(1),
                name: "ABCD".to_string(),
                photo_url: Some(SEED_PHOTO_URL.to_string()),
            },
            custom_lists: Vec::new(),
            notifications: Vec::new(),
            next_ids: IdCounters::default(),
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn todo(&self, todo_id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == todo_id)
    }

    pub fn selected_id(&self) -> Option<TodoId> {
        self.selected
    }

    /// The selected task, resolved against the current collection so it can
    /// never be stale.
    pub fn selected_todo(&self) -> Option<&Todo> {
        self.selected.and_then(|todo_id| self.todo(todo_id))
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn is_dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn is_grid_view(&self) -> bool {
        self.grid_view
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn show_calendar(&self) -> bool {
        self.show_calendar
    }

    pub fn show_notifications(&self) -> bool {
        self.show_notifications
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn custom_lists(&self) -> &[CustomList] {
        &self.custom_lists
    }

    pub fn list(&self, list_id: ListId) -> Option<&CustomList> {
        self.custom_lists.iter().find(|list| list.id == list_id)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn next_ids(&self) -> &IdCounters {
        &self.next_ids
    }

    /// Applies `event` using the wall clock for creation timestamps.
    pub fn apply(&self, event: StoreEvent) -> TodoState {
        self.apply_at(event, Utc::now())
    }

    /// Applies `event` with `now` as the creation timestamp. Rejected events
    /// return an unchanged copy of `self`.
    pub fn apply_at(&self, event: StoreEvent, now: DateTime<Utc>) -> TodoState {
        let kind = event.kind();
        match self.try_apply_at(event, now) {
            Ok(next) => {
                debug!(event = kind, "state transition applied");
                next
            }
            Err(rejection) => {
                debug!(event = kind, %rejection, "event ignored");
                self.clone()
            }
        }
    }

    /// Like [`TodoState::apply_at`] but reports why an event was ignored.
    pub fn try_apply_at(
        &self,
        event: StoreEvent,
        now: DateTime<Utc>,
    ) -> Result<TodoState, Rejection> {
        let mut next = self.clone();
        next.transition(event, now)?;
        Ok(next)
    }

    fn todo_mut(&mut self, todo_id: TodoId) -> Result<&mut Todo, Rejection> {
        self.todos
            .iter_mut()
            .find(|todo| todo.id == todo_id)
            .ok_or(Rejection::UnknownTodo(todo_id))
    }

    fn step_mut(&mut self, todo_id: TodoId, step_id: StepId) -> Result<&mut Step, Rejection> {
        self.todo_mut(todo_id)?
            .steps
            .iter_mut()
            .find(|step| step.id == step_id)
            .ok_or(Rejection::UnknownStep { todo_id, step_id })
    }

    fn ensure_list(&self, list_id: ListId) -> Result<(), Rejection> {
        match self.list(list_id) {
            Some(_) => Ok(()),
            None => Err(Rejection::UnknownList(list_id)),
        }
    }

    fn drop_dangling_selection(&mut self) {
        if self.selected.is_some() && self.selected_todo().is_none() {
            self.selected = None;
        }
    }

    fn transition(&mut self, event: StoreEvent, now: DateTime<Utc>) -> Result<(), Rejection> {
        match event {
            StoreEvent::AddTodo { title, due_date } => {
                let title = non_blank(&title)?;
                let mut todo = Todo::new(self.next_ids.next_todo()?, title);
                todo.due_date = due_date;
                self.todos.push(todo);
            }
            StoreEvent::ToggleTodo { todo_id } => {
                let todo = self.todo_mut(todo_id)?;
                todo.completed = !todo.completed;
            }
            StoreEvent::ToggleImportant { todo_id } => {
                let todo = self.todo_mut(todo_id)?;
                todo.important = !todo.important;
            }
            StoreEvent::DeleteTodo { todo_id } => {
                let index = self
                    .todos
                    .iter()
                    .position(|todo| todo.id == todo_id)
                    .ok_or(Rejection::UnknownTodo(todo_id))?;
                self.todos.remove(index);
                self.drop_dangling_selection();
            }
            StoreEvent::UpdateTodo { todo } => {
                let todo_id = todo.id;
                self.todo_mut(todo_id)?;
                if let Some(list_id) = todo.list_id {
                    self.ensure_list(list_id)?;
                }
                let mut seen = HashSet::with_capacity(todo.steps.len());
                if !todo.steps.iter().all(|step| seen.insert(step.id)) {
                    return Err(Rejection::DuplicateStepIds(todo_id));
                }
                for step in &todo.steps {
                    self.next_ids.observe_step(step.id)?;
                }
                *self.todo_mut(todo_id)? = todo;
            }
            StoreEvent::SelectTodo { todo_id } => {
                if let Some(todo_id) = todo_id {
                    self.todo_mut(todo_id)?;
                }
                self.selected = todo_id;
            }
            StoreEvent::AddStep { todo_id, title } => {
                let title = non_blank(&title)?;
                self.todo_mut(todo_id)?;
                let step = Step {
                    id: self.next_ids.next_step()?,
                    title,
                    completed: false,
                };
                self.todo_mut(todo_id)?.steps.push(step);
            }
            StoreEvent::ToggleStep { todo_id, step_id } => {
                let step = self.step_mut(todo_id, step_id)?;
                step.completed = !step.completed;
            }
            StoreEvent::DeleteStep { todo_id, step_id } => {
                let todo = self.todo_mut(todo_id)?;
                let index = todo
                    .steps
                    .iter()
                    .position(|step| step.id == step_id)
                    .ok_or(Rejection::UnknownStep { todo_id, step_id })?;
                todo.steps.remove(index);
            }
            StoreEvent::SetDueDate { todo_id, date } => {
                self.todo_mut(todo_id)?.due_date = Some(date);
            }
            StoreEvent::SetReminder { todo_id, date } => {
                self.todo_mut(todo_id)?.reminder = Some(date);
            }
            StoreEvent::UpdateNotes { todo_id, notes } => {
                self.todo_mut(todo_id)?.notes = Some(notes);
            }
            StoreEvent::SetView { view } => {
                if let View::List(list_id) = view {
                    self.ensure_list(list_id)?;
                }
                self.view = view;
                self.selected = None;
            }
            StoreEvent::SetSearchQuery { query } => {
                self.search_query = query;
            }
            StoreEvent::ToggleDarkMode => self.dark_mode = !self.dark_mode,
            StoreEvent::ToggleGridView => self.grid_view = !self.grid_view,
            StoreEvent::ToggleSidebar => self.sidebar_open = !self.sidebar_open,
            StoreEvent::UpdateUser { patch } => self.user.merge(patch),
            StoreEvent::AddList { name, color } => {
                let name = non_blank(&name)?;
                let list_id = self.next_ids.next_list()?;
                self.custom_lists.push(CustomList {
                    id: list_id,
                    name,
                    color,
                });
            }
            StoreEvent::DeleteList { list_id } => {
                self.ensure_list(list_id)?;
                self.custom_lists.retain(|list| list.id != list_id);
                self.todos.retain(|todo| todo.list_id != Some(list_id));
                self.drop_dangling_selection();
                if self.view == View::List(list_id) {
                    self.view = View::default();
                    self.selected = None;
                }
            }
            StoreEvent::ToggleCalendar => {
                self.show_calendar = !self.show_calendar;
                self.show_notifications = false;
            }
            StoreEvent::ToggleNotifications => {
                self.show_notifications = !self.show_notifications;
                self.show_calendar = false;
            }
            StoreEvent::AddNotification { title, message } => {
                let notification = Notification {
                    id: self.next_ids.next_notification()?,
                    title,
                    message,
                    read: false,
                    created_at: now,
                };
                self.notifications.insert(0, notification);
            }
            StoreEvent::MarkNotificationRead { notification_id } => {
                self.notifications
                    .iter_mut()
                    .find(|notification| notification.id == notification_id)
                    .ok_or(Rejection::UnknownNotification(notification_id))?
                    .read = true;
            }
            StoreEvent::ClearNotifications => self.notifications.clear(),
            StoreEvent::Refresh => {}
            StoreEvent::Unknown => return Err(Rejection::UnknownEvent),
        }
        Ok(())
    }
}

fn non_blank(raw: &str) -> Result<String, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Rejection::BlankTitle);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
