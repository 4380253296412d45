use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use greenroom::capture::{FileSource, Recorder};
use greenroom::flow::{FlowOutcome, FlowPhase, InterviewFlow, InterviewScript};
use greenroom::http::{create_router, AppState, IngestLimits};
use greenroom::store::SessionStore;
use greenroom::transcribe::GeminiTranscriber;
use greenroom::upload::{HttpBackend, InterviewBackend, RetryPolicy, TokioSleeper, Uploader};
use greenroom::Config;

#[derive(Parser)]
#[command(name = "greenroom")]
#[command(about = "Timed interview capture, upload, and transcription")]
struct Cli {
    /// Path to the configuration file (extension optional)
    #[arg(short, long, default_value = "config/greenroom")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interview ingest server
    Serve,

    /// Run a terminal interview session against a server
    Interview {
        /// Participant display name
        #[arg(short, long)]
        name: String,

        /// Base URL of the interview server
        #[arg(short, long, default_value = "http://localhost:3000")]
        server: String,

        /// Media file replayed as the camera feed
        #[arg(short, long)]
        media: String,

        /// Question script file, one question per line
        #[arg(short, long)]
        questions: Option<String>,

        /// Access token (defaults to the configured one)
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => serve(&cli.config).await,
        Command::Interview {
            name,
            server,
            media,
            questions,
            token,
        } => {
            interview(
                &cli.config,
                &name,
                &server,
                &media,
                questions.as_deref(),
                token,
            )
            .await
        }
    }
}

async fn serve(config_path: &str) -> Result<()> {
    let cfg = Config::load(config_path)?;

    info!("{} starting", cfg.service.name);

    let uploads_root = shellexpand::tilde(&cfg.storage.uploads_root).into_owned();
    let store = Arc::new(SessionStore::open(uploads_root).await?);

    if cfg.transcription.api_key.is_empty() {
        warn!("Transcription API key not set; transcripts will carry a fallback message");
    }
    let transcriber = Arc::new(GeminiTranscriber::new(
        cfg.transcription.api_url.clone(),
        cfg.transcription.api_key.clone(),
        cfg.interview.media_type.clone(),
    ));

    let state = AppState::new(
        store,
        transcriber,
        cfg.interview.token.clone(),
        IngestLimits {
            media_type: cfg.interview.media_type.clone(),
            max_bytes: cfg.interview.max_upload_bytes,
        },
    );

    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn interview(
    config_path: &str,
    name: &str,
    server: &str,
    media: &str,
    questions: Option<&str>,
    token: Option<String>,
) -> Result<()> {
    let cfg = Config::load(config_path)?;
    let token = token.unwrap_or_else(|| cfg.interview.token.clone());

    let script = match questions {
        Some(path) => InterviewScript::from_file(path).await?,
        None => match &cfg.interview.questions {
            Some(list) => InterviewScript::new(list.clone()),
            None => InterviewScript::default(),
        },
    };

    let media_path = shellexpand::tilde(media).into_owned();
    let source = FileSource::open(&media_path, &cfg.interview.media_type).await?;
    let recorder = Recorder::new(Box::new(source));

    let backend: Arc<dyn InterviewBackend> = Arc::new(HttpBackend::new(server, &token)?);
    let uploader = Uploader::new(
        backend.clone(),
        RetryPolicy::default(),
        Arc::new(TokioSleeper),
    );

    let mut flow = InterviewFlow::begin(backend, uploader, recorder, script, name).await?;

    println!("Session started: {}", flow.session_key());
    println!("{} questions to answer.", flow.total_questions());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !flow.is_finished() {
        if flow.phase() == FlowPhase::Ready {
            if let Some(question) = flow.current_question() {
                println!();
                println!(
                    "Question {}/{}: {}",
                    flow.current_index(),
                    flow.total_questions(),
                    question
                );
            }
        }

        print!("[Enter] {} ", flow.action_label());
        std::io::stdout().flush()?;
        if lines.next_line().await?.is_none() {
            anyhow::bail!("stdin closed before the interview finished");
        }

        match flow.advance().await? {
            FlowOutcome::RecordingStarted { .. } => println!("Recording..."),
            FlowOutcome::RecordingStopped { bytes, .. } => {
                println!("Recording stopped ({} bytes). Ready to upload.", bytes);
            }
            FlowOutcome::AnswerAccepted { index, transcript } => {
                println!("Q{} saved.", index);
                println!("Transcript: {}", transcript);
            }
            FlowOutcome::UploadFailed {
                attempts, message, ..
            } => {
                println!("Upload failed after {} attempts: {}", attempts, message);
                println!("Press Enter to try this question's upload again.");
            }
            FlowOutcome::InterviewComplete { index, transcript } => {
                println!("Q{} saved.", index);
                println!("Transcript: {}", transcript);
            }
        }
    }

    if let Err(e) = flow.finalize().await {
        warn!("Session finish call failed: {}", e);
        println!("Could not confirm the session finish with the server; your answers are already saved.");
    }

    println!();
    println!(
        "Interview complete. {} answers recorded.",
        flow.answers().len()
    );
    for answer in flow.answers() {
        println!();
        println!("Q{}: {}", answer.index, answer.question);
        println!("{}", answer.transcript);
    }

    Ok(())
}
