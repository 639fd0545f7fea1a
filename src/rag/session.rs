//! RAG session: ingestion, retrieval and the two answer flows

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use super::error::{RagError, RagResult};
use crate::chunker::Chunker;
use crate::core::{AppConfig, Language};
use crate::embeddings::{self, Embedder};
use crate::extract::{DocumentExtractor, SourceDocument, TextExtractor};
use crate::gateway::{LanguageModel, ModelGateway};
use crate::prompt::{PromptBuilder, TaskKind};
use crate::vector::{IndexHandle, ScoredChunk, TrustAcknowledgement, VectorError, VectorIndex};

/// Answer to a document question plus the chunks it was grounded on
#[derive(Debug, Clone)]
pub struct DocAnswer {
    pub text: String,
    pub sources: Vec<ScoredChunk>,
}

/// One ingestion workflow and the questions asked against it.
///
/// Whether documents have been processed is the presence of an index handle,
/// so there is no separate flag to get out of sync.
pub struct RagSession {
    config: AppConfig,
    chunker: Chunker,
    index: VectorIndex,
    prompts: PromptBuilder,
    model: Arc<dyn LanguageModel>,
    extractor: Arc<dyn TextExtractor>,
    handle: Option<IndexHandle>,
}

impl RagSession {
    /// Wire a session from explicit collaborators
    pub fn new(
        config: AppConfig,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn LanguageModel>,
        extractor: Arc<dyn TextExtractor>,
    ) -> RagResult<Self> {
        config.validate()?;

        Ok(Self {
            chunker: Chunker::from_config(&config.chunking)?,
            index: VectorIndex::from_config(&config.index, embedder),
            prompts: PromptBuilder::new(config.prompts.clone()),
            model,
            extractor,
            handle: None,
            config,
        })
    }

    /// Wire a session with the configured embedder, the CLI backend and the
    /// PDF/text extractor
    pub fn from_config(config: AppConfig) -> RagResult<Self> {
        let embedder = embeddings::from_config(&config.embedding)?;
        let model: Arc<dyn LanguageModel> = Arc::new(ModelGateway::new(config.model.clone()));
        Self::new(config, embedder, model, Arc::new(DocumentExtractor::new()))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Whether questions can be answered
    pub fn documents_processed(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&IndexHandle> {
        self.handle.as_ref()
    }

    /// Extract, concatenate, chunk and index `documents`, replacing any
    /// previous index. On failure the previous handle stays in place.
    pub async fn ingest(&mut self, documents: &[SourceDocument]) -> RagResult<IndexHandle> {
        if documents.is_empty() {
            return Err(RagError::NoDocuments);
        }

        let start = Instant::now();
        let mut corpus = String::new();
        for document in documents {
            corpus.push_str(&self.extractor.extract_text(document).await?);
        }

        let chunks = self.chunker.split(&corpus);
        if chunks.iter().all(|c| c.trim().is_empty()) {
            return Err(RagError::NoContent);
        }

        let handle = self.index.build(&chunks).await?;
        self.handle = Some(handle.clone());

        info!(
            documents = documents.len(),
            chars = corpus.chars().count(),
            chunks = handle.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Documents processed"
        );

        Ok(handle)
    }

    /// Load the persisted index instead of ingesting.
    ///
    /// Uses `trust` when given, otherwise the `index.allow_dangerous_deserialization`
    /// setting; with neither the load is refused.
    pub async fn resume(&mut self, trust: Option<TrustAcknowledgement>) -> RagResult<IndexHandle> {
        let trust = match trust {
            Some(trust) => trust,
            None if self.config.index.allow_dangerous_deserialization => {
                TrustAcknowledgement::accept_deserialization_risk()
            }
            None => {
                return Err(VectorError::LoadNotAcknowledged {
                    path: self.index.path().to_path_buf(),
                }
                .into())
            }
        };

        let handle = self.index.load(trust).await?;
        self.handle = Some(handle.clone());
        Ok(handle)
    }

    /// Answer `question` from the top-k retrieved chunks
    pub async fn answer_doc_question(
        &self,
        question: &str,
        language: Option<Language>,
    ) -> RagResult<DocAnswer> {
        let handle = self.handle.as_ref().ok_or(RagError::DocumentsNotProcessed)?;
        let language = self.config.language.resolve(language)?;
        if question.trim().is_empty() {
            return Err(RagError::EmptyInput { field: "question" });
        }

        let sources = self
            .index
            .search(handle, question, self.config.index.retrieval_k)
            .await?;
        let context = sources
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        debug!(
            retrieved = sources.len(),
            context_chars = context.chars().count(),
            "Retrieved context"
        );

        let prompt = self.prompts.doc_question_prompt(&context, question, language)?;
        let text = self.model.ask(&prompt, None, language).await?;

        Ok(DocAnswer { text, sources })
    }

    /// Recommend parties for a free-text profile. Never touches the index.
    pub async fn recommend_party(
        &self,
        profile: &str,
        language: Option<Language>,
    ) -> RagResult<String> {
        let language = self.config.language.resolve(language)?;
        if profile.trim().is_empty() {
            return Err(RagError::EmptyInput { field: "profile" });
        }

        let prompt = self.prompts.party_recommendation_prompt(profile, language)?;
        Ok(self.model.ask(&prompt, None, language).await?)
    }

    /// Start a role-play chat. An empty role description gives a plain chat.
    pub fn role_chat(
        &self,
        task: TaskKind,
        role_description: &str,
        language: Option<Language>,
    ) -> RagResult<RoleChat> {
        let language = self.config.language.resolve(language)?;
        let system_prompt = if role_description.trim().is_empty() {
            None
        } else {
            Some(
                self.prompts
                    .system_prompt(task, role_description, language)?,
            )
        };

        Ok(RoleChat {
            model: Arc::clone(&self.model),
            system_prompt,
            language,
        })
    }

    /// Fails with `ModelError::NotAvailable` unless the configured model is
    /// installed and reachable
    pub async fn check_model(&self) -> RagResult<()> {
        Ok(self.model.ensure_available().await?)
    }
}

/// Chat bound to one system prompt and language
pub struct RoleChat {
    model: Arc<dyn LanguageModel>,
    system_prompt: Option<String>,
    language: Language,
}

impl RoleChat {
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub async fn send(&self, prompt: &str) -> RagResult<String> {
        if prompt.trim().is_empty() {
            return Err(RagError::EmptyInput { field: "prompt" });
        }
        Ok(self
            .model
            .ask(prompt, self.system_prompt.as_deref(), self.language)
            .await?)
    }
}
