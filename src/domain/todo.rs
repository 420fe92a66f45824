use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A personal to-do item on the operator's dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl TodoItem {
    pub fn new(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            completed: false,
            created_at: now,
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Returns a copy of `todos` with the completion of item `id` flipped.
///
/// Unknown ids leave the list unchanged. Order is preserved.
pub fn toggle_completion(todos: &[TodoItem], id: &str) -> Vec<TodoItem> {
    todos
        .iter()
        .map(|todo| {
            let mut todo = todo.clone();
            if todo.id == id {
                todo.toggle();
            }
            todo
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todos() -> Vec<TodoItem> {
        let now = Utc::now();
        vec![
            TodoItem {
                id: "1".to_string(),
                text: "Call Acme about invoice".to_string(),
                completed: false,
                created_at: now,
            },
            TodoItem {
                id: "2".to_string(),
                text: "Review open tickets".to_string(),
                completed: true,
                created_at: now,
            },
        ]
    }

    #[test]
    fn test_toggle_flips_only_matching_item() {
        let original = todos();
        let toggled = toggle_completion(&original, "1");

        assert!(toggled[0].completed);
        assert_eq!(toggled[1], original[1]);
    }

    #[test]
    fn test_toggle_twice_restores_original() {
        let original = todos();
        let twice = toggle_completion(&toggle_completion(&original, "2"), "2");
        assert_eq!(twice, original);
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let original = todos();
        assert_eq!(toggle_completion(&original, "missing"), original);
    }

    #[test]
    fn test_new_todo_starts_incomplete() {
        let todo = TodoItem::new("Chase supplier", Utc::now());
        assert!(!todo.completed);
        assert!(!todo.id.is_empty());
    }
}
