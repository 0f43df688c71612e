use uuid::Uuid;

use super::PlanCard;
use crate::models::Plan;

/// The list of plan cards, in the order the plans were given.
#[derive(Debug, Default)]
pub struct PlanGrid {
    cards: Vec<PlanCard>,
}

impl PlanGrid {
    pub fn from_plans(plans: Vec<Plan>) -> Self {
        Self {
            cards: plans.into_iter().map(PlanCard::new).collect(),
        }
    }

    pub fn cards(&self) -> &[PlanCard] {
        &self.cards
    }

    pub fn card_mut(&mut self, id: Uuid) -> Option<&mut PlanCard> {
        self.cards.iter_mut().find(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Newly created plans go first, matching the server's newest-first order.
    pub fn prepend(&mut self, plan: Plan) {
        self.cards.insert(0, PlanCard::new(plan));
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.id() != id);
        self.cards.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plan(title: &str) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            title: Some(title.to_string()),
            todos: vec![],
            notes: vec![],
            creation_date: Utc::now(),
        }
    }

    #[test]
    fn keeps_given_order_and_prepends_new_plans() {
        let mut grid = PlanGrid::from_plans(vec![plan("b"), plan("a")]);
        grid.prepend(plan("c"));

        let titles: Vec<_> = grid
            .cards()
            .iter()
            .map(|c| c.plan().title.clone().unwrap())
            .collect();
        assert_eq!(titles, vec!["c", "b", "a"]);
    }

    #[test]
    fn remove_reports_whether_a_card_went_away() {
        let target = plan("x");
        let id = target.id;
        let mut grid = PlanGrid::from_plans(vec![target]);

        assert!(grid.card_mut(id).is_some());
        assert!(grid.remove(id));
        assert!(!grid.remove(id));
        assert!(grid.is_empty());
    }
}
