//! Request-body validation for plan creation.
//!
//! Bodies arrive as raw JSON so that every rule can be checked and reported
//! together, including type mismatches serde would stop at. [`validate_plan`]
//! returns the messages; [`parse_create`] turns a valid body into a typed
//! [`CreatePlanInput`].

use std::fmt;

use serde_json::{Map, Value};

use crate::models::{CreatePlanInput, NoteInput, TodoInput};

pub const TITLE_MAX_CHARS: usize = 200;
pub const TODO_TEXT_MAX_CHARS: usize = 150;
pub const NOTE_TEXT_MAX_CHARS: usize = 300;

/// Every rule violation found in a plan body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check a candidate plan body. An empty result means the body is valid.
///
/// Rules are independent: all violations are collected, none short-circuit.
pub fn validate_plan(body: &Value) -> Vec<String> {
    let Some(obj) = body.as_object() else {
        return vec!["Plan must be a JSON object".to_string()];
    };

    let mut errors = Vec::new();

    match obj.get("title") {
        None | Some(Value::Null) => {}
        Some(Value::String(title)) if title.chars().count() <= TITLE_MAX_CHARS => {}
        Some(_) => errors.push(format!(
            "Title must be a string with max {} characters",
            TITLE_MAX_CHARS
        )),
    }

    let todo_count = match obj.get("todos") {
        Some(Value::Array(todos)) => {
            for (idx, todo) in todos.iter().enumerate() {
                check_text(todo, "Todo", idx, TODO_TEXT_MAX_CHARS, &mut errors);
                if let Some(completed) = todo.get("completed") {
                    if !completed.is_boolean() {
                        errors.push(format!("Todo {} completed must be boolean", idx));
                    }
                }
            }
            todos.len()
        }
        _ => {
            errors.push("Todos must be an array".to_string());
            0
        }
    };

    let note_count = match obj.get("notes") {
        Some(Value::Array(notes)) => {
            for (idx, note) in notes.iter().enumerate() {
                check_text(note, "Note", idx, NOTE_TEXT_MAX_CHARS, &mut errors);
            }
            notes.len()
        }
        _ => {
            errors.push("Notes must be an array".to_string());
            0
        }
    };

    if todo_count == 0 && note_count == 0 {
        errors.push("Plan must have at least one todo or note".to_string());
    }

    errors
}

fn check_text(item: &Value, kind: &str, idx: usize, max: usize, errors: &mut Vec<String>) {
    match item.get("text") {
        Some(Value::String(text)) => {
            if text.trim().is_empty() {
                errors.push(format!("{} {} must have non-empty text", kind, idx));
            }
            if text.chars().count() > max {
                errors.push(format!("{} {} text must be max {} characters", kind, idx, max));
            }
        }
        _ => errors.push(format!("{} {} must have non-empty text", kind, idx)),
    }
}

/// Validate a create body and normalise it into a [`CreatePlanInput`].
///
/// Only `text` (and `completed`, defaulting to `false`) survive from each
/// item; client ids and any other fields are dropped. An empty title becomes
/// `None`.
pub fn parse_create(body: &Value) -> Result<CreatePlanInput, ValidationErrors> {
    let errors = validate_plan(body);
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    // validate_plan guarantees an object with `todos`/`notes` arrays of items
    // holding string texts.
    let empty = Map::new();
    let obj = body.as_object().unwrap_or(&empty);

    let title = obj
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
        .map(str::to_string);

    let todos = items(obj, "todos")
        .map(|todo| TodoInput {
            id: None,
            text: text_of(todo),
            completed: todo.get("completed").and_then(Value::as_bool).unwrap_or(false),
        })
        .collect();

    let notes = items(obj, "notes")
        .map(|note| NoteInput {
            id: None,
            text: text_of(note),
        })
        .collect();

    Ok(CreatePlanInput {
        title,
        todos,
        notes,
    })
}

fn items<'a>(obj: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Value> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn text_of(item: &Value) -> String {
    item.get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_plan_with_one_todo() {
        let body = json!({ "title": "Groceries", "todos": [{ "text": "Milk" }], "notes": [] });
        assert!(validate_plan(&body).is_empty());
    }

    #[test]
    fn rejects_plan_without_items() {
        let errors = validate_plan(&json!({ "todos": [], "notes": [] }));
        assert_eq!(errors, vec!["Plan must have at least one todo or note"]);
    }

    #[test]
    fn missing_lists_are_reported_and_count_as_empty() {
        let errors = validate_plan(&json!({ "title": "Trip" }));
        assert_eq!(
            errors,
            vec![
                "Todos must be an array",
                "Notes must be an array",
                "Plan must have at least one todo or note",
            ]
        );
    }

    #[test]
    fn rejects_non_object_body() {
        assert_eq!(validate_plan(&json!([1, 2])), vec!["Plan must be a JSON object"]);
    }

    #[test]
    fn collects_every_violation() {
        let long_title = "t".repeat(TITLE_MAX_CHARS + 1);
        let body = json!({
            "title": long_title,
            "todos": [
                { "text": "   " },
                { "text": "ok", "completed": "yes" },
                { "text": "x".repeat(TODO_TEXT_MAX_CHARS + 1) },
            ],
            "notes": [{ "text": "n".repeat(NOTE_TEXT_MAX_CHARS + 1) }, {}],
        });

        let errors = validate_plan(&body);
        assert_eq!(
            errors,
            vec![
                "Title must be a string with max 200 characters",
                "Todo 0 must have non-empty text",
                "Todo 1 completed must be boolean",
                "Todo 2 text must be max 150 characters",
                "Note 0 text must be max 300 characters",
                "Note 1 must have non-empty text",
            ]
        );
    }

    #[test]
    fn length_limits_count_characters_not_bytes() {
        let body = json!({ "todos": [{ "text": "é".repeat(TODO_TEXT_MAX_CHARS) }], "notes": [] });
        assert!(validate_plan(&body).is_empty());
    }

    #[test]
    fn non_string_title_is_rejected() {
        let errors = validate_plan(&json!({ "title": 5, "notes": [{ "text": "a" }], "todos": [] }));
        assert_eq!(errors, vec!["Title must be a string with max 200 characters"]);
    }

    #[test]
    fn null_completed_is_not_boolean() {
        let errors = validate_plan(&json!({ "todos": [{ "text": "a", "completed": null }], "notes": [] }));
        assert_eq!(errors, vec!["Todo 0 completed must be boolean"]);
    }

    #[test]
    fn parse_create_normalises_items() {
        let body = json!({
            "title": "",
            "todos": [{ "_id": "abc", "text": "Milk", "extra": 1 }, { "text": "Eggs", "completed": true }],
            "notes": [{ "id": 3, "text": "Cheap ones" }],
        });

        let input = parse_create(&body).unwrap();
        assert_eq!(input.title, None);
        assert_eq!(input.todos.len(), 2);
        assert!(!input.todos[0].completed);
        assert!(input.todos[1].completed);
        assert!(input.todos.iter().all(|t| t.id.is_none()));
        assert_eq!(input.notes[0].text, "Cheap ones");
        assert!(input.notes[0].id.is_none());
    }

    #[test]
    fn parse_create_joins_messages() {
        let err = parse_create(&json!({ "todos": [], "notes": [] })).unwrap_err();
        assert_eq!(err.to_string(), "Plan must have at least one todo or note");

        let err = parse_create(&json!({ "todos": [{}], "notes": "nope" })).unwrap_err();
        assert_eq!(err.to_string(), "Todo 0 must have non-empty text; Notes must be an array");
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn over_long_text_is_rejected_not_truncated() {
        let text = "x".repeat(NOTE_TEXT_MAX_CHARS + 5);
        let err = parse_create(&json!({ "todos": [], "notes": [{ "text": text }] })).unwrap_err();
        assert_eq!(err.into_messages(), vec!["Note 0 text must be max 300 characters"]);
    }
}
