use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tonosama_core::config::{export_dir_from_env_value, vocabulary_from_env_values};
use tonosama_core::questionnaire::SECTIONS;
use tonosama_core::{
    run_intake, Collaborators, CoreConfig, Intake, RowBuilder, WizardController, PLANS,
};
use tonosama_files::ExportStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tonosama")]
#[command(about = "Tonosama multilingual menu builder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the export header row
    Headers {
        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// List service plans
    Plans,
    /// List the owner questionnaire
    Questions,
    /// Write an example intake document
    Init {
        /// Destination file
        #[arg(default_value = "intake.yaml")]
        path: PathBuf,
    },
    /// Run an intake document through the wizard and store the export
    Export {
        /// Intake document (YAML)
        intake: PathBuf,
        /// Export directory (defaults to TONOSAMA_EXPORT_DIR or ./exports)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn load_config(out: Option<PathBuf>) -> Result<CoreConfig, Box<dyn std::error::Error>> {
    let vocabulary = vocabulary_from_env_values(
        std::env::var("TONOSAMA_ALLERGENS").ok(),
        std::env::var("TONOSAMA_LANGUAGES").ok(),
        std::env::var("TONOSAMA_SOURCE_LANGUAGE").ok(),
    )?;
    let export_dir =
        out.unwrap_or_else(|| export_dir_from_env_value(std::env::var("TONOSAMA_EXPORT_DIR").ok()));
    Ok(CoreConfig::new(export_dir, vocabulary))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tonosama=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Headers { json }) => {
            let cfg = load_config(None)?;
            let headers = RowBuilder::new(cfg.vocabulary()).headers();
            if json {
                println!("{}", serde_json::to_string_pretty(&headers)?);
            } else {
                for (index, header) in headers.iter().enumerate() {
                    println!("{:>3}  {}", index + 1, header);
                }
            }
        }
        Some(Commands::Plans) => {
            for plan in &PLANS {
                let marker = if plan.recommended { " (おすすめ)" } else { "" };
                let languages = plan
                    .language_limit
                    .map_or_else(|| "all".to_string(), |n| n.to_string());
                println!("{}: {}{}", plan.id, plan.name, marker);
                println!("    {} / languages: {}", plan.description, languages);
                for feature in plan.features {
                    println!("    - {}", feature);
                }
            }
        }
        Some(Commands::Questions) => {
            for section in SECTIONS {
                println!("{}", section.title);
                for question in section.questions {
                    println!("  {:<26} {}", question.key.as_str(), question.label);
                }
            }
        }
        Some(Commands::Init { path }) => {
            if path.exists() {
                return Err(format!("{} already exists", path.display()).into());
            }
            std::fs::write(&path, Intake::template()?)?;
            println!("Wrote intake template to {}", path.display());
        }
        Some(Commands::Export { intake, out }) => {
            let cfg = Arc::new(load_config(out)?);
            let data = Intake::load(&intake)?;
            let base_dir = intake
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));

            let store = ExportStore::new(cfg.export_dir())?;
            let mut wizard = WizardController::new(Arc::clone(&cfg), Collaborators::mock());
            match run_intake(&mut wizard, &data, &base_dir, &store) {
                Ok(metadata) => println!(
                    "Exported {} rows to {}",
                    metadata.row_count,
                    store.export_dir().join(&metadata.file_name).display()
                ),
                Err(e) => {
                    eprintln!(
                        "Export stopped at step {} ({:?}): {}",
                        wizard.step(),
                        e.class(),
                        e
                    );
                    return Err(e.into());
                }
            }
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
