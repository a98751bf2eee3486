use shared::protocol::DocumentInfo;
use tracing::warn;

use crate::QaClient;

/// Fetches the document list, treating any failure as "no documents".
pub async fn fetch_documents(client: &QaClient) -> Vec<DocumentInfo> {
    match client.list_documents().await {
        Ok(documents) => documents,
        Err(error) => {
            warn!(%error, "failed to fetch documents");
            Vec::new()
        }
    }
}

/// Last known document list. Populated on start and after each successful upload.
#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    documents: Vec<DocumentInfo>,
    loaded: bool,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh(&mut self, client: &QaClient) -> &[DocumentInfo] {
        self.documents = fetch_documents(client).await;
        self.loaded = true;
        &self.documents
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn documents(&self) -> &[DocumentInfo] {
        &self.documents
    }

    pub fn get(&self, filename: &str) -> Option<&DocumentInfo> {
        self.documents.iter().find(|doc| doc.filename == filename)
    }
}
