//! vocabgen CLI tool
//!
//! Command-line interface for generating vocabulary artifacts with vocabgen-core.
//!
//! ## Commands
//!
//! - `generate`: One-shot generation, skipped when artifacts are newer than every input
//! - `watch --config <yaml>`: Generate, then regenerate whenever an input or the configuration
//!   changes, until Ctrl-C
//!
//! `generate` takes either a YAML configuration (`--config`) or the inputs directly
//! (`--input-resources ... --output-directory <dir>`).

use clap::{Parser, Subcommand};
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::channel,
        Arc,
    },
    time::Duration,
};
use vocabgen_core::{
    artifact::JsonRenderer,
    config::{ConfigProvider, GeneratorConfig, StaticConfigProvider, YamlConfigProvider},
    event::GenerationEvent,
    orchestrator::{ArtifactOrchestrator, GenerationOutcome},
    watch::VocabWatcher,
    VocabError,
};

#[derive(Parser)]
#[command(name = "vocabgen")]
#[command(author, version, about = "Generates source artifacts from RDF vocabularies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate artifacts once
    Generate {
        /// YAML generator configuration
        #[arg(short, long, conflicts_with = "input_resources")]
        config: Option<PathBuf>,

        /// Vocabulary resources (file paths or URLs) merged into one vocabulary
        #[arg(short, long, num_args = 1..)]
        input_resources: Vec<String>,

        /// Resource whose subjects select and override the emitted terms
        #[arg(short, long, requires = "input_resources")]
        term_selection_resource: Option<String>,

        /// Where artifacts and the staleness marker are written
        #[arg(short, long, default_value = "Generated")]
        output_directory: PathBuf,

        /// Directory for local snapshots of online vocabularies
        #[arg(long)]
        store_local_copy: Option<PathBuf>,

        /// Regenerate even if artifacts are up to date
        #[arg(short, long)]
        force: bool,
    },

    /// Generate, then regenerate on every change until interrupted
    Watch {
        /// YAML generator configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Also re-check online resources every N seconds
        #[arg(long)]
        poll_secs: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            input_resources,
            term_selection_resource,
            output_directory,
            store_local_copy,
            force,
        } => {
            let provider: Arc<dyn ConfigProvider> = match config {
                Some(path) => Arc::new(YamlConfigProvider::new(path)),
                None if input_resources.is_empty() => {
                    return Err(VocabError::Config(
                        "either --config or --input-resources is required".to_string(),
                    )
                    .into());
                }
                None => {
                    let mut config = GeneratorConfig::for_resources(
                        input_resources,
                        term_selection_resource,
                        output_directory,
                    );
                    config.local_copy_directory = store_local_copy;
                    Arc::new(StaticConfigProvider(config))
                }
            };
            let mut orchestrator =
                ArtifactOrchestrator::from_provider(provider, Arc::new(JsonRenderer))?;
            if force {
                orchestrator.set_force(true);
            }

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            match runtime.block_on(orchestrator.generate())? {
                GenerationOutcome::Skipped => {
                    println!("Artifacts are up to date (use --force to regenerate)");
                }
                GenerationOutcome::Generated(report) => {
                    for vocab in report.vocabularies.iter() {
                        println!(
                            "{} ({}): {} classes, {} properties, {} literals, {} constants",
                            vocab.prefix,
                            vocab.namespace,
                            vocab.classes,
                            vocab.properties,
                            vocab.literals,
                            vocab.constants
                        );
                    }
                    for path in report.artifacts.iter() {
                        println!("  wrote {}", path.display());
                    }
                }
            }
            Ok(())
        }

        Commands::Watch { config, poll_secs } => {
            let provider = Arc::new(YamlConfigProvider::new(config.clone()));
            let orchestrator =
                ArtifactOrchestrator::from_provider(provider, Arc::new(JsonRenderer))?;

            let (tx, rx) = channel::<GenerationEvent>();
            let event_handle = std::thread::spawn(move || {
                for event in rx {
                    match event {
                        GenerationEvent::Skipped => println!("Artifacts are up to date"),
                        GenerationEvent::Generated(report) => {
                            println!("Generated {} artifacts", report.artifacts.len())
                        }
                        GenerationEvent::Failed { error, failures } => {
                            eprintln!("Generation failed ({failures} so far): {error}")
                        }
                        GenerationEvent::Unwatched(_) => break,
                    }
                }
            });

            let mut watcher = VocabWatcher::new(orchestrator, tx)?;
            if let Some(secs) = poll_secs {
                watcher = watcher.with_poll_interval(Duration::from_secs(secs));
            }
            watcher.watch()?;

            println!(
                "Watching {} for changes. Press Ctrl-C to stop.",
                config.display()
            );

            let running = Arc::new(AtomicBool::new(true));
            let r = running.clone();
            ctrlc::set_handler(move || {
                println!("\nShutting down...");
                r.store(false, Ordering::SeqCst);
            })?;

            while running.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(100));
            }

            watcher.unwatch()?;
            drop(watcher);
            if event_handle.join().is_err() {
                eprintln!("Warning: event printer thread panicked");
            }
            println!("Shutdown complete");
            Ok(())
        }
    }
}
