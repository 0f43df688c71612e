//! Domain models for planboard.
//!
//! - [`Plan`]: the persisted document, holding ordered [`Todo`]s and [`Note`]s.
//! - [`ItemId`]: client-side identity of a nested item, either pending (local
//!   only) or persisted (assigned by the store).
//! - Input types ([`CreatePlanInput`], [`UpdatePlanInput`]) describe request
//!   bodies; [`DeletedPlan`] is the delete response.

mod item_id;
mod plan;

pub use item_id::*;
pub use plan::*;
