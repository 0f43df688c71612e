//! Client-side state behind the plan board UI.
//!
//! - [`PlanDraft`]: the creation form, holding items locally until one create call.
//! - [`PlanCard`]: a displayed plan with optimistic todo toggling.
//! - [`PlanGrid`]: the ordered list of cards.
//! - [`Board`]: the grid plus loading flags and the error banner.
//!
//! Rendering is left to whatever front end drives these types.

mod board;
mod card;
mod draft;
mod grid;

pub use board::*;
pub use card::*;
pub use draft::*;
pub use grid::*;
