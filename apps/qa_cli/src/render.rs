//! Terminal formatting for transcript turns, documents and chunks.

use client_core::{
    citation::{render_sources_block, truncate_excerpt},
    SessionEvent, Turn, TurnKind, TurnState,
};
use shared::protocol::{ChunkInfo, DocumentInfo, UploadResponse};

pub const LOADING_INDICATOR: &str = "⏳ Loading...";
const NO_DOCUMENTS: &str = "No documents uploaded yet.";

pub fn render_turn(turn: &Turn) -> String {
    match &turn.kind {
        TurnKind::User { content } => format!("> {content}"),
        TurnKind::Assistant { content, citations } => match render_sources_block(citations) {
            Some(sources) => format!("{content}\n{sources}"),
            None => content.clone(),
        },
        TurnKind::Error { content } => content.clone(),
    }
}

/// What the interactive loop prints for a session event. The user's own turn is
/// not echoed back since it is already on screen.
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::StateChanged(TurnState::Pending) => Some(LOADING_INDICATOR.to_string()),
        SessionEvent::StateChanged(TurnState::Idle) => None,
        SessionEvent::TurnAppended(turn) => match turn.kind {
            TurnKind::User { .. } => None,
            TurnKind::Assistant { .. } | TurnKind::Error { .. } => Some(render_turn(turn)),
        },
    }
}

pub fn render_documents(documents: &[DocumentInfo]) -> String {
    if documents.is_empty() {
        return NO_DOCUMENTS.to_string();
    }

    documents
        .iter()
        .map(render_document)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_document(document: &DocumentInfo) -> String {
    let uploaded = document
        .uploaded_at()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| document.upload_date.clone());
    format!(
        "{}\n  Uploaded: {uploaded}\n  Status: {}",
        document.filename, document.status
    )
}

pub fn render_upload(uploaded: &UploadResponse) -> String {
    format!(
        "{} {} ({} chunks, {:.1}s)",
        uploaded.message, uploaded.filename, uploaded.chunks_count, uploaded.processing_time
    )
}

pub fn render_chunk(chunk: &ChunkInfo) -> String {
    format!(
        "[{}] page {}: {}",
        chunk.id,
        chunk.page,
        truncate_excerpt(&chunk.content)
    )
}
