use uuid::Uuid;

use super::{DraftError, PlanDraft, PlanGrid};
use crate::client::PlanClient;
use crate::models::CreatePlanInput;

pub const LOAD_FAILED: &str = "Failed to load plans. Please try again.";
pub const CREATE_FAILED: &str = "Failed to create plan. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete plan. Please try again.";

/// Application-level state: the plan grid plus loading flags and the error
/// banner.
///
/// Every call clears the previous banner first. A failed call sets the banner
/// and leaves the grid as it was.
#[derive(Debug)]
pub struct Board {
    grid: PlanGrid,
    initial_loading: bool,
    saving: bool,
    error: Option<String>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            grid: PlanGrid::default(),
            initial_loading: true,
            saving: false,
            error: None,
        }
    }
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self) -> &PlanGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut PlanGrid {
        &mut self.grid
    }

    /// True until the first load finishes, successfully or not.
    pub fn is_initial_loading(&self) -> bool {
        self.initial_loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self, client: &PlanClient) -> bool {
        self.error = None;
        let loaded = match client.list_plans().await {
            Ok(plans) => {
                self.grid = PlanGrid::from_plans(plans);
                true
            }
            Err(e) => {
                tracing::error!("Loading plans failed: {}", e);
                self.error = Some(LOAD_FAILED.to_string());
                false
            }
        };
        self.initial_loading = false;
        loaded
    }

    pub async fn create(&mut self, client: &PlanClient, input: &CreatePlanInput) -> bool {
        self.error = None;
        self.saving = true;
        let created = match client.create_plan(input).await {
            Ok(plan) => {
                self.grid.prepend(plan);
                true
            }
            Err(e) => {
                tracing::error!("Creating plan failed: {}", e);
                self.error = Some(CREATE_FAILED.to_string());
                false
            }
        };
        self.saving = false;
        created
    }

    /// Create a plan from the form. The draft is cleared only once the
    /// server has accepted the plan.
    pub async fn submit_draft(
        &mut self,
        client: &PlanClient,
        draft: &mut PlanDraft,
    ) -> Result<bool, DraftError> {
        let input = draft.to_create_input()?;
        let created = self.create(client, &input).await;
        if created {
            draft.reset();
        }
        Ok(created)
    }

    pub async fn delete(&mut self, client: &PlanClient, id: Uuid) -> bool {
        self.error = None;
        match client.delete_plan(id).await {
            Ok(_) => {
                self.grid.remove(id);
                true
            }
            Err(e) => {
                tracing::error!(plan_id = %id, "Deleting plan failed: {}", e);
                self.error = Some(DELETE_FAILED.to_string());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_initial_loading_without_error() {
        let board = Board::new();
        assert!(board.is_initial_loading());
        assert!(!board.is_saving());
        assert!(board.error().is_none());
        assert!(board.grid().is_empty());
    }
}
