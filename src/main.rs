//! Polis RAG command line
//!
//! Thin presentation layer over [`RagSession`]: parses arguments, loads the
//! configuration, and renders typed errors as per-language messages.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use polis_rag::core::config::default_config_path;
use polis_rag::extract::{ExtractionError, SourceDocument};
use polis_rag::logging::LoggingSystem;
use polis_rag::{
    AppConfig, Language, ModelError, PolisError, RagError, RagSession, TaskKind,
    TrustAcknowledgement, VectorError,
};

#[derive(Debug, Parser)]
#[command(name = "polis", version, about = "Analyse German political documents with a local model")]
struct Cli {
    /// Configuration file (json, toml or yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Response language (de or en)
    #[arg(long, global = true)]
    language: Option<Language>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the configured model is installed
    Check,

    /// Build the vector index from documents
    Ingest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Ask a question about the ingested documents
    Ask {
        question: String,

        /// Load the persisted index even if the config does not allow it
        #[arg(long)]
        trust_index: bool,
    },

    /// Recommend parties for a personal profile
    Recommend(ProfileArgs),

    /// Interactive chat under a role-specific system prompt
    Chat {
        /// party or doc
        #[arg(long, default_value = "party")]
        task: TaskKind,

        /// Role description; omit for a plain chat
        #[arg(long, default_value = "")]
        role: String,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct ProfileArgs {
    /// Profile text
    #[arg(long)]
    profile: Option<String>,

    /// File containing the profile text
    #[arg(long)]
    profile_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => return report(&e, cli.language.unwrap_or_default()),
    };
    let language = cli.language.unwrap_or(config.language.default);

    // Held for the process lifetime so the file writer flushes on exit
    let _logging = match LoggingSystem::init(&config.logging) {
        Ok(logging) => logging,
        Err(e) => return report(&e.into(), language),
    };
    tracing::debug!(command = ?cli.command, %language, "Starting polis");

    match run(cli.command, config, cli.language).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e, language),
    }
}

/// Explicit path, else the default location if a file exists there, else
/// defaults plus environment overrides
fn load_config(path: Option<PathBuf>) -> polis_rag::Result<AppConfig> {
    let path = path.or_else(|| {
        let path = default_config_path();
        path.exists().then_some(path)
    });
    Ok(AppConfig::load(path.as_deref())?)
}

async fn run(
    command: Command,
    config: AppConfig,
    language: Option<Language>,
) -> polis_rag::Result<()> {
    let supported_types = config.documents.supported_file_types.clone();
    let mut session = RagSession::from_config(config)?;

    match command {
        Command::Check => {
            session.check_model().await?;
            println!("{} is available", session.config().model.model);
        }

        Command::Ingest { files } => {
            let mut documents = Vec::with_capacity(files.len());
            for path in &files {
                documents.push(SourceDocument::from_path(path, &supported_types).await?);
            }

            let handle = session.ingest(&documents).await?;
            println!(
                "Processed {} document(s) into {} chunks ({})",
                documents.len(),
                handle.len(),
                session.config().index.path.display()
            );
        }

        Command::Ask {
            question,
            trust_index,
        } => {
            let trust = trust_index.then(TrustAcknowledgement::accept_deserialization_risk);
            session.resume(trust).await?;

            let answer = session.answer_doc_question(&question, language).await?;
            println!("{}", answer.text);
        }

        Command::Recommend(args) => {
            let profile = match (args.profile, args.profile_file) {
                (Some(profile), _) => profile,
                (None, Some(path)) => tokio::fs::read_to_string(&path).await.map_err(|e| {
                    ExtractionError::ReadFailed {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                })?,
                (None, None) => String::new(),
            };

            let answer = session.recommend_party(&profile, language).await?;
            println!("{}", answer);
        }

        Command::Chat { task, role } => {
            let chat = session.role_chat(task, &role, language)?;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            loop {
                print!("> ");
                std::io::stdout().flush()?;

                let Some(line) = lines.next_line().await? else {
                    break;
                };
                let line = line.trim();
                if matches!(line, "quit" | "exit" | "q") {
                    break;
                }
                if line.is_empty() {
                    continue;
                }

                // A failed turn is reported and the chat goes on
                match chat.send(line).await {
                    Ok(reply) => println!("{}\n", reply),
                    Err(e) => eprintln!("{}\n", render_error(&e, chat.language())),
                }
            }
        }
    }

    Ok(())
}

fn report(error: &PolisError, language: Language) -> ExitCode {
    let message = match (error, language) {
        (PolisError::Rag(e), _) => render_error(e, language),
        (other, Language::De) => format!("Fehler: {}", other),
        (other, Language::En) => format!("Error: {}", other),
    };
    eprintln!("{}", message);
    ExitCode::FAILURE
}

fn render_error(error: &RagError, language: Language) -> String {
    match (error, language) {
        (RagError::Model(e), _) => render_model_error(e, language),

        (RagError::DocumentsNotProcessed, Language::De)
        | (RagError::Index(VectorError::IndexNotFound { .. }), Language::De) => {
            "Bitte verarbeiten Sie zuerst Dokumente (polis ingest).".to_string()
        }
        (RagError::DocumentsNotProcessed, Language::En)
        | (RagError::Index(VectorError::IndexNotFound { .. }), Language::En) => {
            "Please process documents first (polis ingest).".to_string()
        }

        (RagError::Index(VectorError::LoadNotAcknowledged { path }), Language::De) => format!(
            "Der Index in {} wird nur mit --trust-index oder index.allow_dangerous_deserialization geladen.",
            path.display()
        ),
        (RagError::Index(VectorError::LoadNotAcknowledged { path }), Language::En) => format!(
            "The index in {} is only loaded with --trust-index or index.allow_dangerous_deserialization.",
            path.display()
        ),

        (RagError::EmptyInput { field }, Language::De) => {
            format!("Bitte geben Sie einen Text ein ({}).", field)
        }
        (RagError::EmptyInput { field }, Language::En) => {
            format!("Please enter some text ({}).", field)
        }

        (other, Language::De) => format!("Fehler: {}", other),
        (other, Language::En) => format!("Error: {}", other),
    }
}

fn render_model_error(error: &ModelError, language: Language) -> String {
    match (error, language) {
        (
            ModelError::NotAvailable {
                model,
                install_command,
            },
            Language::De,
        ) => format!(
            "Fehler: {} nicht gefunden. Bitte führen Sie zuerst '{}' aus.",
            model, install_command
        ),
        (
            ModelError::NotAvailable {
                model,
                install_command,
            },
            Language::En,
        ) => format!(
            "Error: {} not found. Please run '{}' first.",
            model, install_command
        ),

        (ModelError::Timeout { elapsed, .. }, Language::De) => format!(
            "Zeitüberschreitung: Das Modell hat nach {:.1} Sekunden nicht geantwortet.",
            elapsed.as_secs_f64()
        ),
        (ModelError::Timeout { elapsed, .. }, Language::En) => format!(
            "Timeout: the model did not answer within {:.1} seconds.",
            elapsed.as_secs_f64()
        ),

        (ModelError::Backend { stderr, .. }, Language::De) => format!("Modellfehler: {}", stderr),
        (ModelError::Backend { stderr, .. }, Language::En) => format!("Model error: {}", stderr),

        (ModelError::Invocation { reason }, Language::De) => {
            format!("Fehler beim Aufruf des Modells: {}", reason)
        }
        (ModelError::Invocation { reason }, Language::En) => {
            format!("Failed to invoke the model: {}", reason)
        }
    }
}
