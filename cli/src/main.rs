//! CLI entrypoint for Detect Auto
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{bail, Context, Result};
use clap::Parser;
use detect_application::{
    BackendApi, CredentialStore, DiagnoseUseCase, SessionService, TranscriptLogger,
};
use detect_infrastructure::{
    ConfigLoader, FileConfig, FileCredentialStore, HttpBackendApi, JsonlTranscriptLogger,
    WsDiagnosticStream,
};
use detect_presentation::{ChatRepl, Cli, Command, ConsoleFormatter};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow::anyhow!("could not load configuration: {}", e))?;
    config.validate()?;

    // === Dependency Injection ===
    let token_path =
        FileCredentialStore::default_path().context("could not resolve a data directory")?;
    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(token_path));

    let base_url = Url::parse(&config.backend.base_url).context("invalid backend.base_url")?;
    let api: Arc<dyn BackendApi> = Arc::new(HttpBackendApi::new(
        base_url,
        Arc::clone(&credentials),
        Duration::from_secs(config.backend.timeout_secs),
    )?);

    match cli.command {
        Command::Register { email, password } => {
            let password = resolve_password(password)?;
            let profile = api.register(&email, &password).await?;
            println!("{}", ConsoleFormatter::format_profile(&profile));
            println!("Account created. Log in with `detect-auto login {}`.", email);
        }

        Command::Login { email, password } => {
            let password = resolve_password(password)?;
            api.login(&email, &password).await?;
            println!("Logged in as {}.", email);
        }

        Command::Logout => {
            api.logout().await;
            println!("Logged out.");
        }

        Command::Me => {
            let profile = api.me().await?;
            println!("{}", ConsoleFormatter::format_profile(&profile));
        }

        Command::Sessions { id, json } => {
            let sessions = SessionService::new(api);
            match id {
                Some(id) => {
                    let detail = sessions.session_detail(id).await?;
                    if json {
                        println!("{}", ConsoleFormatter::format_json(&detail));
                    } else {
                        println!("{}", ConsoleFormatter::format_session_detail(&detail));
                    }
                }
                None => {
                    let list = sessions.list_sessions().await?;
                    if json {
                        println!("{}", ConsoleFormatter::format_json(&list));
                    } else {
                        println!("{}", ConsoleFormatter::format_sessions(&list));
                    }
                }
            }
        }

        Command::Parts { session } => {
            let sessions = SessionService::new(api);
            let parts = sessions.predict_parts(session).await?;
            println!("{}", ConsoleFormatter::format_parts(&parts));
        }

        Command::Summary { session, notes } => {
            let sessions = SessionService::new(api);
            let summary = sessions.summarize_order(session, notes.as_deref()).await?;
            println!("{}", ConsoleFormatter::format_summary(&summary));
        }

        Command::Chat { session, input } => {
            run_chat(cli.quiet, config, api, credentials, session, input).await?;
        }
    }

    Ok(())
}

async fn run_chat(
    quiet: bool,
    config: FileConfig,
    api: Arc<dyn BackendApi>,
    credentials: Arc<dyn CredentialStore>,
    session: Option<i64>,
    input: Option<String>,
) -> Result<()> {
    let sessions = SessionService::new(Arc::clone(&api));

    // Resume an existing session (seeding the transcript with its stored
    // diagnosis) or create a fresh one.
    let (session_id, initial_diagnosis) = match session {
        Some(id) => {
            let detail = sessions.session_detail(id).await?;
            let diagnosis = detail
                .diagnostic_results
                .last()
                .map(|result| result.output_text.clone());
            (id, diagnosis)
        }
        None => {
            let created = sessions.create_session(input.as_deref()).await?;
            (created.id, None)
        }
    };
    info!(session_id, "starting diagnostic chat");

    let ws_url = Url::parse(&config.backend.ws_url()).context("invalid backend.ws_url")?;
    let stream = Arc::new(WsDiagnosticStream::new(ws_url, credentials));

    let mut diagnose = DiagnoseUseCase::new(stream);
    if let Some(diagnosis) = initial_diagnosis {
        diagnose = diagnose.with_initial_diagnosis(diagnosis);
    }
    if let Some(dir) = &config.log.transcript_dir {
        let path = dir.join(JsonlTranscriptLogger::session_file_name(session_id));
        if let Some(logger) = JsonlTranscriptLogger::new(&path) {
            info!(path = %logger.path().display(), "transcript log enabled");
            diagnose = diagnose.with_transcript_logger(Arc::new(logger) as Arc<dyn TranscriptLogger>);
        }
    }

    let mut repl = ChatRepl::new(diagnose, sessions, session_id).with_progress(!quiet);
    repl.run().await?;
    Ok(())
}

/// Use the provided password or prompt for one on stdin.
fn resolve_password(provided: Option<String>) -> Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("password cannot be empty");
    }
    Ok(password)
}
