use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ChatSession, DocumentRegistry, PdfFile, QaClient, SessionEvent, SubmitOutcome,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::TryRecvError},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, Settings};
use render::{render_chunk, render_documents, render_event, render_upload};

#[derive(Parser, Debug)]
#[command(name = "finqa", about = "Ask questions about uploaded financial statements")]
struct Cli {
    /// Backend origin, e.g. http://localhost:8000
    #[arg(long)]
    api_base_url: Option<String>,
    /// Give up on a request after this many seconds (0 or unset waits forever)
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive conversation (default)
    Chat,
    /// Ask a single question and print the answer with its sources
    Ask { question: String },
    /// Upload a PDF for ingestion
    Upload { path: PathBuf },
    /// List uploaded documents
    Documents,
    /// List ingested chunks
    Chunks {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Check that the backend is reachable
    Status,
}

const UPLOAD_USAGE: &str = "Usage: /upload <path-to-pdf>";

#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Quit,
    Documents,
    UploadUsage,
    Upload(PathBuf),
    Question(String),
}

fn parse_chat_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    match trimmed {
        "/quit" | "/exit" => ChatInput::Quit,
        "/docs" => ChatInput::Documents,
        "/upload" => ChatInput::UploadUsage,
        _ => match trimmed.strip_prefix("/upload ") {
            Some(path) => ChatInput::Upload(PathBuf::from(path.trim())),
            None => ChatInput::Question(line.to_string()),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.api_base_url {
        settings.api_base_url = Some(url);
    }
    if let Some(secs) = cli.timeout_secs {
        settings.request_timeout_secs = Some(secs);
    }
    init_tracing(&settings);

    let client = build_client(&settings)?;
    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(client).await,
        Command::Ask { question } => run_ask(client, &question).await,
        Command::Upload { path } => {
            let mut registry = DocumentRegistry::new();
            upload_and_refresh(&client, &mut registry, &path)
                .await
                .context("Upload gagal")
        }
        Command::Documents => {
            let mut registry = DocumentRegistry::new();
            println!("{}", render_documents(registry.refresh(&client).await));
            Ok(())
        }
        Command::Chunks { limit } => {
            let chunks = client.list_chunks().await.context("failed to list chunks")?;
            println!("{} chunks", chunks.total_count);
            for chunk in chunks.chunks.iter().take(limit) {
                println!("{}", render_chunk(chunk));
            }
            Ok(())
        }
        Command::Status => {
            let status = client.status().await.context("backend is unreachable")?;
            println!("{}", status.message);
            Ok(())
        }
    }
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(settings: &Settings) -> Result<QaClient> {
    let base_url = settings.base_url()?;
    let client = match settings.request_timeout() {
        Some(timeout) => QaClient::with_timeout(base_url, timeout)
            .context("failed to build http client")?,
        None => QaClient::new(base_url),
    };

    match client.base_url() {
        Some(base_url) => info!(base_url, "using backend"),
        None => warn!("no api base url configured; chat and upload will fail"),
    }
    Ok(client)
}

async fn run_chat(client: QaClient) -> Result<()> {
    let mut registry = DocumentRegistry::new();
    println!("{}", render_documents(registry.refresh(&client).await));

    let session = ChatSession::new(Arc::new(client.clone()));
    let mut events = session.subscribe_events();
    println!("💬 Chat with Document (/docs, /upload <path>, /quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_chat_input(&line) {
            ChatInput::Quit => break,
            ChatInput::Documents => {
                println!("{}", render_documents(registry.refresh(&client).await));
            }
            ChatInput::UploadUsage => println!("{UPLOAD_USAGE}"),
            ChatInput::Upload(path) => {
                if let Err(err) = upload_and_refresh(&client, &mut registry, &path).await {
                    eprintln!("Upload gagal: {err:#}");
                }
            }
            ChatInput::Question(text) => {
                session.set_input(text).await;
                submit_and_render(&session, &mut events).await;
            }
        }
    }

    info!(turns = session.transcript().await.len(), "chat session ended");
    Ok(())
}

async fn run_ask(client: QaClient, question: &str) -> Result<()> {
    let session = ChatSession::new(Arc::new(client));
    let mut events = session.subscribe_events();
    session.set_input(question).await;
    match submit_and_render(&session, &mut events).await {
        SubmitOutcome::Answered(_) => Ok(()),
        SubmitOutcome::Failed(_) => anyhow::bail!("no answer for '{question}'"),
        SubmitOutcome::Ignored(reason) => anyhow::bail!("question not sent: {reason}"),
    }
}

/// Submits the input buffer while printing session events as they arrive, so the
/// loading indicator shows up before the answer.
async fn submit_and_render(
    session: &ChatSession,
    events: &mut broadcast::Receiver<SessionEvent>,
) -> SubmitOutcome {
    let submit = session.submit_input();
    tokio::pin!(submit);

    let outcome = loop {
        tokio::select! {
            outcome = &mut submit => break outcome,
            Ok(event) = events.recv() => print_event(&event),
        }
    };

    loop {
        match events.try_recv() {
            Ok(event) => print_event(&event),
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "missed session events"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    outcome
}

fn print_event(event: &SessionEvent) {
    if let Some(text) = render_event(event) {
        println!("{text}");
    }
}

async fn upload_and_refresh(
    client: &QaClient,
    registry: &mut DocumentRegistry,
    path: &Path,
) -> Result<()> {
    let file = read_pdf(path).await?;
    let uploaded = client.upload_pdf(file).await?;
    println!("{}", render_upload(&uploaded));
    println!("{}", render_documents(registry.refresh(client).await));
    Ok(())
}

async fn read_pdf(path: &Path) -> Result<PdfFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(PdfFile::new(filename, mime_type, bytes))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
