//! Components of a menu intake session.
//!
//! These are the plain domain values the wizard edits and the row builder reads,
//! independent of the CSV wire format.

pub mod allergen_policy;
pub mod menu_item;
pub mod narrative;
