//! # Tonosama Core
//!
//! Core business logic for the Tonosama multilingual menu builder.
//!
//! This crate contains the session model and the export pipeline:
//! - Menu items, owner narrative and allergen policy
//! - The fixed-schema row builder and the export assembler
//! - The seven-step wizard driven through injected collaborators
//! - YAML intake documents for unattended runs
//!
//! **No UI concerns**: prompting, rendering and process setup belong in the binaries.

pub mod collaborators;
pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod intake;
pub mod mock;
pub mod plans;
pub mod questionnaire;
pub mod row;
pub mod wizard;

pub use collaborators::{Collaborators, ExtractedItem, PaymentStatus};
pub use components::allergen_policy::AllergenPolicy;
pub use components::menu_item::{Category, ItemId, MenuItem};
pub use components::narrative::OwnerNarrative;
pub use config::{CoreConfig, Vocabulary};
pub use error::{ErrorClass, MenuError, MenuResult};
pub use export::{ExportAssembler, ExportSink, Table};
pub use intake::{run_intake, Intake, IntakeData};
pub use plans::{PlanId, PLANS};
pub use row::{Row, RowBuilder};
pub use wizard::{ItemEdit, WizardController, WizardState, WizardStep};
