use thiserror::Error;

use crate::models::{CreatePlanInput, ItemId, NoteInput, TodoInput};
use crate::validation::{NOTE_TEXT_MAX_CHARS, TODO_TEXT_MAX_CHARS};

/// Longest title the creation form accepts while typing.
pub const TITLE_INPUT_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Please add at least one todo or note")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftTodo {
    pub id: ItemId,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftNote {
    pub id: ItemId,
    pub text: String,
}

/// Local state of the plan creation form.
///
/// Items live only here, under `Pending` ids, until the whole plan is sent in
/// a single create call.
#[derive(Debug, Default)]
pub struct PlanDraft {
    title: String,
    todo_text: String,
    note_text: String,
    todos: Vec<DraftTodo>,
    notes: Vec<DraftNote>,
    last_local_id: u64,
}

fn cap_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

impl PlanDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn todo_text(&self) -> &str {
        &self.todo_text
    }

    pub fn note_text(&self) -> &str {
        &self.note_text
    }

    pub fn todos(&self) -> &[DraftTodo] {
        &self.todos
    }

    pub fn notes(&self) -> &[DraftNote] {
        &self.notes
    }

    pub fn set_title(&mut self, input: &str) {
        self.title = cap_chars(input, TITLE_INPUT_MAX_CHARS);
    }

    pub fn set_todo_text(&mut self, input: &str) {
        self.todo_text = cap_chars(input, TODO_TEXT_MAX_CHARS);
    }

    pub fn set_note_text(&mut self, input: &str) {
        self.note_text = cap_chars(input, NOTE_TEXT_MAX_CHARS);
    }

    fn next_id(&mut self) -> ItemId {
        self.last_local_id += 1;
        ItemId::Pending(self.last_local_id)
    }

    /// Append the typed todo, trimmed. Blank input is ignored and kept as-is.
    pub fn add_todo(&mut self) -> Option<ItemId> {
        let text = self.todo_text.trim().to_string();
        if text.is_empty() {
            return None;
        }
        let id = self.next_id();
        self.todos.push(DraftTodo {
            id,
            text,
            completed: false,
        });
        self.todo_text.clear();
        Some(id)
    }

    /// Append the typed note, trimmed. Blank input is ignored and kept as-is.
    pub fn add_note(&mut self) -> Option<ItemId> {
        let text = self.note_text.trim().to_string();
        if text.is_empty() {
            return None;
        }
        let id = self.next_id();
        self.notes.push(DraftNote { id, text });
        self.note_text.clear();
        Some(id)
    }

    pub fn remove_todo(&mut self, id: ItemId) -> bool {
        let before = self.todos.len();
        self.todos.retain(|t| t.id != id);
        self.todos.len() != before
    }

    pub fn toggle_todo(&mut self, id: ItemId) -> bool {
        match self.todos.iter_mut().find(|t| t.id == id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                true
            }
            None => false,
        }
    }

    pub fn remove_note(&mut self, id: ItemId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }

    /// Saving is enabled once the draft holds at least one item.
    pub fn can_save(&self) -> bool {
        !self.todos.is_empty() || !self.notes.is_empty()
    }

    /// The create payload for this draft. Local ids are not sent.
    pub fn to_create_input(&self) -> Result<CreatePlanInput, DraftError> {
        if !self.can_save() {
            return Err(DraftError::Empty);
        }

        let title = self.title.trim();
        Ok(CreatePlanInput {
            title: (!title.is_empty()).then(|| title.to_string()),
            todos: self
                .todos
                .iter()
                .map(|t| TodoInput {
                    id: None,
                    text: t.text.clone(),
                    completed: t.completed,
                })
                .collect(),
            notes: self
                .notes
                .iter()
                .map(|n| NoteInput::new(n.text.clone()))
                .collect(),
        })
    }

    /// Clear the form, as when the modal closes.
    pub fn reset(&mut self) {
        *self = Self {
            last_local_id: self.last_local_id,
            ..Self::default()
        };
    }
}
