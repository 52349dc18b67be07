//! Read-only projections over a [`TodoState`] used by presentation code.

use chrono::NaiveDate;
use shared::domain::{CustomList, Todo, View};

use crate::state::TodoState;

/// Tasks that pass the active view and search filter, split for display.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct VisibleTodos<'a> {
    pub incomplete: Vec<&'a Todo>,
    pub completed: Vec<&'a Todo>,
}

impl<'a> VisibleTodos<'a> {
    pub fn len(&self) -> usize {
        self.incomplete.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Incomplete group first, then completed, each in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Todo> + '_ {
        self.incomplete
            .iter()
            .chain(self.completed.iter())
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
}

impl Progress {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Whether `todo` belongs to `view`, ignoring the search filter.
pub fn matches_view(todo: &Todo, view: View) -> bool {
    match view {
        View::All | View::Assigned => true,
        View::Today => !todo.completed,
        View::Important => todo.important,
        View::Planned => todo.due_date.is_some(),
        View::List(list_id) => todo.list_id == Some(list_id),
    }
}

/// Case-insensitive substring match on the title; an empty query matches.
pub fn matches_search(todo: &Todo, query: &str) -> bool {
    query.is_empty() || todo.title.to_lowercase().contains(&query.to_lowercase())
}

impl TodoState {
    pub fn visible_todos(&self) -> VisibleTodos<'_> {
        let query = self.search_query();
        let view = self.view();
        let (completed, incomplete): (Vec<&Todo>, Vec<&Todo>) = self
            .todos()
            .iter()
            .filter(|todo| matches_search(todo, query) && matches_view(todo, view))
            .partition(|todo| todo.completed);
        VisibleTodos {
            incomplete,
            completed,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            total: self.todos().len(),
            completed: self.todos().iter().filter(|todo| todo.completed).count(),
        }
    }

    pub fn unread_count(&self) -> usize {
        self.notifications()
            .iter()
            .filter(|notification| !notification.read)
            .count()
    }

    pub fn todos_with_due_date(&self) -> impl Iterator<Item = &Todo> + '_ {
        self.todos().iter().filter(|todo| todo.due_date.is_some())
    }

    /// Tasks due on `day`, compared on the UTC calendar date.
    pub fn due_on(&self, day: NaiveDate) -> Vec<&Todo> {
        self.todos_with_due_date()
            .filter(|todo| {
                todo.due_date
                    .is_some_and(|due_date| due_date.date_naive() == day)
            })
            .collect()
    }

    /// Number of tasks filed under each custom list, in list order.
    pub fn list_counts(&self) -> Vec<(&CustomList, usize)> {
        self.custom_lists()
            .iter()
            .map(|list| {
                let count = self
                    .todos()
                    .iter()
                    .filter(|todo| todo.list_id == Some(list.id))
                    .count();
                (list, count)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
