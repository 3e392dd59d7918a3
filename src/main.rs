use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tonosama_core::config::{export_dir_from_env_value, vocabulary_from_env_values};
use tonosama_core::{run_intake, Collaborators, CoreConfig, Intake, WizardController};
use tonosama_files::ExportStore;

const DEFAULT_INTAKE: &str = "intake.yaml";

/// Batch runner for the Tonosama menu wizard
///
/// Replays one intake document through the wizard with the offline collaborators and stores
/// the resulting CSV export.
///
/// # Environment Variables
/// - `TONOSAMA_INTAKE`: intake document (default: "intake.yaml")
/// - `TONOSAMA_EXPORT_DIR`: export directory (default: "exports")
/// - `TONOSAMA_ALLERGENS`: comma-separated allergen vocabulary
/// - `TONOSAMA_LANGUAGES`: comma-separated language vocabulary
/// - `TONOSAMA_SOURCE_LANGUAGE`: language the menu is written in
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tonosama=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let vocabulary = vocabulary_from_env_values(
        std::env::var("TONOSAMA_ALLERGENS").ok(),
        std::env::var("TONOSAMA_LANGUAGES").ok(),
        std::env::var("TONOSAMA_SOURCE_LANGUAGE").ok(),
    )
    .context("invalid vocabulary configuration")?;
    let export_dir = export_dir_from_env_value(std::env::var("TONOSAMA_EXPORT_DIR").ok());
    let cfg = Arc::new(CoreConfig::new(export_dir, vocabulary));

    let intake_path = std::env::var("TONOSAMA_INTAKE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_INTAKE));
    let intake = Intake::load(&intake_path)
        .with_context(|| format!("failed to load intake {}", intake_path.display()))?;
    let base_dir = intake_path.parent().unwrap_or(Path::new("."));

    tracing::info!(
        intake = %intake_path.display(),
        export_dir = %cfg.export_dir().display(),
        languages = cfg.vocabulary().languages().len(),
        allergens = cfg.vocabulary().allergens().len(),
        "starting menu run"
    );

    let store = ExportStore::new(cfg.export_dir())?;
    let mut wizard = WizardController::new(Arc::clone(&cfg), Collaborators::mock());

    let metadata = run_intake(&mut wizard, &intake, base_dir, &store)
        .with_context(|| format!("wizard stopped at step {}", wizard.step()))?;

    tracing::info!(
        file = %metadata.file_name,
        rows = metadata.row_count,
        hash = %metadata.hash,
        "menu export written"
    );

    Ok(())
}
