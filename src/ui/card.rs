use std::collections::HashMap;
use std::fmt::Display;

use uuid::Uuid;

use crate::client::PlanClient;
use crate::models::{ItemId, NoteInput, Plan, Todo, TodoInput, UpdatePlanInput};

/// Number of todos and notes a card shows before collapsing the rest.
pub const PREVIEW_ITEMS: usize = 2;

pub const TOGGLE_FAILED: &str = "Failed to update todo status";

/// Where a todo's optimistic toggle stands.
///
/// `Idle → Pending → Committed | RolledBack`; a new toggle starts over from
/// whichever settled state the todo is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    #[default]
    Idle,
    Pending,
    Committed,
    RolledBack,
}

#[derive(Debug)]
struct InFlight {
    todo_id: Uuid,
    snapshot: Vec<Todo>,
}

/// A plan as displayed in the grid, with optimistic todo toggling.
#[derive(Debug)]
pub struct PlanCard {
    plan: Plan,
    states: HashMap<Uuid, ToggleState>,
    in_flight: Option<InFlight>,
    error: Option<String>,
}

impl PlanCard {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            states: HashMap::new(),
            in_flight: None,
            error: None,
        }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn id(&self) -> Uuid {
        self.plan.id
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a toggle is waiting for the server; checkboxes are disabled.
    pub fn is_updating(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn toggle_state(&self, todo_id: Uuid) -> ToggleState {
        self.states.get(&todo_id).copied().unwrap_or_default()
    }

    /// Flip a todo locally and return the full-plan update to send.
    ///
    /// Returns `None` without touching anything if another toggle is still in
    /// flight or the todo is not on this plan.
    pub fn begin_toggle(&mut self, todo_id: Uuid) -> Option<UpdatePlanInput> {
        if self.in_flight.is_some() {
            return None;
        }
        let snapshot = self.plan.todos.clone();
        let todo = self.plan.todos.iter_mut().find(|t| t.id == todo_id)?;
        todo.completed = !todo.completed;

        self.in_flight = Some(InFlight { todo_id, snapshot });
        self.states.insert(todo_id, ToggleState::Pending);
        self.error = None;

        Some(self.update_payload())
    }

    fn update_payload(&self) -> UpdatePlanInput {
        UpdatePlanInput {
            title: Some(self.plan.title.clone()),
            todos: Some(
                self.plan
                    .todos
                    .iter()
                    .map(|t| TodoInput {
                        id: Some(ItemId::Persisted(t.id)),
                        text: t.text.clone(),
                        completed: t.completed,
                    })
                    .collect(),
            ),
            notes: Some(
                self.plan
                    .notes
                    .iter()
                    .map(|n| NoteInput {
                        id: Some(ItemId::Persisted(n.id)),
                        text: n.text.clone(),
                    })
                    .collect(),
            ),
        }
    }

    /// Settle the in-flight toggle with the server's answer.
    ///
    /// Success adopts the returned plan; failure restores the todos as they
    /// were before the toggle. Without a toggle in flight this is a no-op
    /// that reports `Idle`.
    pub fn settle<E: Display>(&mut self, outcome: Result<Plan, E>) -> ToggleState {
        let Some(InFlight { todo_id, snapshot }) = self.in_flight.take() else {
            return ToggleState::Idle;
        };

        let state = match outcome {
            Ok(plan) => {
                self.plan = plan;
                ToggleState::Committed
            }
            Err(e) => {
                tracing::warn!(plan_id = %self.plan.id, %todo_id, "Todo toggle failed: {}", e);
                self.plan.todos = snapshot;
                self.error = Some(TOGGLE_FAILED.to_string());
                ToggleState::RolledBack
            }
        };
        self.states.insert(todo_id, state);
        state
    }

    /// Run a whole toggle against the server: flip, send, then commit or
    /// roll back. Returns `None` if the toggle could not start.
    pub async fn toggle_todo(&mut self, client: &PlanClient, todo_id: Uuid) -> Option<ToggleState> {
        let payload = self.begin_toggle(todo_id)?;
        let outcome = client.update_plan(self.plan.id, &payload).await;
        Some(self.settle(outcome))
    }

    // ============================================================
    // Display helpers
    // ============================================================

    pub fn visible_todos(&self) -> &[Todo] {
        let end = self.plan.todos.len().min(PREVIEW_ITEMS);
        &self.plan.todos[..end]
    }

    pub fn hidden_todo_count(&self) -> usize {
        self.plan.todos.len().saturating_sub(PREVIEW_ITEMS)
    }

    /// First notes joined for the one-line preview, `None` when there are none.
    pub fn notes_preview(&self) -> Option<String> {
        let preview = self
            .plan
            .notes
            .iter()
            .take(PREVIEW_ITEMS)
            .map(|n| n.text.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        (!preview.is_empty()).then_some(preview)
    }

    pub fn hidden_note_count(&self) -> usize {
        self.plan.notes.len().saturating_sub(PREVIEW_ITEMS)
    }

    /// Creation date as shown on the card, e.g. `Oct 19, 2026, 02:30 PM`.
    pub fn formatted_date(&self) -> String {
        self.plan
            .creation_date
            .format("%b %-d, %Y, %I:%M %p")
            .to_string()
    }
}
