use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::ItemId;

/// A plan grouping todos and notes.
///
/// Plans are stored as whole documents: the nested `todos` and `notes` live
/// inside the plan and are deleted with it. Insertion order of both lists is
/// preserved for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    pub title: Option<String>,
    pub todos: Vec<Todo>,
    pub notes: Vec<Note>,
    /// Set once when the plan is created and never changed afterwards.
    pub creation_date: DateTime<Utc>,
}

/// A checkable task item nested in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique within the owning plan.
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A free-text annotation nested in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique within the owning plan.
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A todo as submitted by a client.
///
/// `id` is only meaningful on update, where a persisted id that matches an
/// existing todo keeps that todo's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub text: String,
    #[serde(default, deserialize_with = "truthy")]
    pub completed: bool,
}

/// A note as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub text: String,
}

impl TodoInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            completed: false,
        }
    }
}

impl NoteInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }
}

/// Input for creating a new plan.
///
/// Built by [`crate::validation::parse_create`] on the server, so by the time
/// the store sees it every rule has already been checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePlanInput {
    pub title: Option<String>,
    pub todos: Vec<TodoInput>,
    pub notes: Vec<NoteInput>,
}

/// Input for updating an existing plan.
///
/// Each present field fully replaces the stored one; absent fields are left
/// alone. `title` distinguishes "absent" (`None`) from "cleared"
/// (`Some(None)`, sent as `null` or `""`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePlanInput {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub todos: Option<Vec<TodoInput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<NoteInput>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Coerce any JSON value to a flag: `null`, `false`, `0`, and `""` are false,
/// everything else is true.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    })
}

/// Response body for a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedPlan {
    pub message: String,
    pub id: Uuid,
}

impl DeletedPlan {
    pub fn new(id: Uuid) -> Self {
        Self {
            message: "Plan deleted".to_string(),
            id,
        }
    }
}

/// Resolve submitted todos against the ones already stored.
///
/// A todo carrying the persisted id of an existing todo keeps that id and its
/// `created_at`; anything else (pending id, unknown id, no id, or an id
/// already claimed earlier in the list) is treated as new.
pub fn resolve_todos(inputs: Vec<TodoInput>, existing: &[Todo], now: DateTime<Utc>) -> Vec<Todo> {
    let mut claimed = HashSet::new();
    inputs
        .into_iter()
        .map(|input| {
            let kept = input
                .id
                .and_then(|id| id.persisted())
                .and_then(|id| existing.iter().find(|t| t.id == id))
                .filter(|t| claimed.insert(t.id));
            match kept {
                Some(todo) => Todo {
                    id: todo.id,
                    text: input.text,
                    completed: input.completed,
                    created_at: todo.created_at,
                },
                None => Todo {
                    id: Uuid::new_v4(),
                    text: input.text,
                    completed: input.completed,
                    created_at: now,
                },
            }
        })
        .collect()
}

/// Resolve submitted notes against the ones already stored. Same rules as
/// [`resolve_todos`].
pub fn resolve_notes(inputs: Vec<NoteInput>, existing: &[Note], now: DateTime<Utc>) -> Vec<Note> {
    let mut claimed = HashSet::new();
    inputs
        .into_iter()
        .map(|input| {
            let kept = input
                .id
                .and_then(|id| id.persisted())
                .and_then(|id| existing.iter().find(|n| n.id == id))
                .filter(|n| claimed.insert(n.id));
            match kept {
                Some(note) => Note {
                    id: note.id,
                    text: input.text,
                    created_at: note.created_at,
                },
                None => Note {
                    id: Uuid::new_v4(),
                    text: input.text,
                    created_at: now,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn todo_input_coerces_completed() {
        let cases = [
            (json!(null), false),
            (json!(true), true),
            (json!(0), false),
            (json!(1), true),
            (json!(""), false),
            (json!("yes"), true),
            (json!([]), true),
        ];
        for (completed, expected) in cases {
            let input: TodoInput =
                serde_json::from_value(json!({ "text": "a", "completed": completed })).unwrap();
            assert_eq!(input.completed, expected, "completed: {}", completed);
        }

        let input: TodoInput = serde_json::from_value(json!({ "text": "a" })).unwrap();
        assert!(!input.completed);
    }

    fn stored_todo(text: &str, at: DateTime<Utc>) -> Todo {
        Todo {
            id: Uuid::new_v4(),
            text: text.to_string(),
            completed: false,
            created_at: at,
        }
    }

    #[test]
    fn plan_serializes_with_camel_case_fields() {
        let plan = Plan {
            id: Uuid::new_v4(),
            title: None,
            todos: vec![],
            notes: vec![],
            creation_date: Utc::now(),
        };
        let value = serde_json::to_value(&plan).unwrap();
        assert!(value.get("creationDate").is_some());
        assert!(value.get("creation_date").is_none());
        assert_eq!(value["title"], json!(null));
    }

    #[test]
    fn update_input_distinguishes_absent_and_null_title() {
        let absent: UpdatePlanInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.title, None);

        let cleared: UpdatePlanInput = serde_json::from_value(json!({ "title": null })).unwrap();
        assert_eq!(cleared.title, Some(None));

        let set: UpdatePlanInput = serde_json::from_value(json!({ "title": "Trip" })).unwrap();
        assert_eq!(set.title, Some(Some("Trip".to_string())));
    }

    #[test]
    fn update_input_ignores_extra_plan_fields() {
        let input: UpdatePlanInput = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "creationDate": "2026-01-01T00:00:00Z",
            "todos": [{ "text": "Milk", "completed": true, "createdAt": "x" }]
        }))
        .unwrap();
        let todos = input.todos.unwrap();
        assert_eq!(todos.len(), 1);
        assert!(todos[0].completed);
        assert!(input.notes.is_none());
    }

    #[test]
    fn resolve_todos_keeps_identity_of_known_items() {
        let earlier = Utc::now() - Duration::hours(1);
        let now = Utc::now();
        let milk = stored_todo("Milk", earlier);

        let resolved = resolve_todos(
            vec![
                TodoInput {
                    id: Some(ItemId::Persisted(milk.id)),
                    text: "Oat milk".to_string(),
                    completed: true,
                },
                TodoInput {
                    id: Some(ItemId::Pending(7)),
                    text: "Bread".to_string(),
                    completed: false,
                },
            ],
            &[milk.clone()],
            now,
        );

        assert_eq!(resolved[0].id, milk.id);
        assert_eq!(resolved[0].created_at, earlier);
        assert_eq!(resolved[0].text, "Oat milk");
        assert!(resolved[0].completed);
        assert_ne!(resolved[1].id, milk.id);
        assert_eq!(resolved[1].created_at, now);
    }

    #[test]
    fn resolve_todos_never_reuses_an_id_twice() {
        let milk = stored_todo("Milk", Utc::now());
        let duplicate = TodoInput {
            id: Some(ItemId::Persisted(milk.id)),
            text: "Milk".to_string(),
            completed: false,
        };

        let resolved = resolve_todos(vec![duplicate.clone(), duplicate], &[milk.clone()], Utc::now());

        assert_eq!(resolved[0].id, milk.id);
        assert_ne!(resolved[1].id, milk.id);
    }

    #[test]
    fn resolve_notes_treats_unknown_ids_as_new() {
        let now = Utc::now();
        let resolved = resolve_notes(
            vec![NoteInput {
                id: Some(ItemId::Persisted(Uuid::new_v4())),
                text: "Call mum".to_string(),
            }],
            &[],
            now,
        );
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].created_at, now);
    }
}
