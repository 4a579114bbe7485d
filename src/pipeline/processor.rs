//! Document pipeline: one processing invocation end to end.
//!
//! Every call builds its results fresh and hands them to the caller; the
//! only shared state is the read-mostly classifier artifact loaded at
//! construction. Injected capabilities may be absent, in which case the
//! stages that need them degrade instead of failing the document.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classify::{
    generate_overview, ClassificationResult, ClassifierError, DocumentClassifier,
};
use super::extraction::{extract_layout, ExtractionResult, LayoutElements, OcrEngine};
use super::keyvalue::{KeyValueEngine, KeyValueResult};
use super::qa::{suggested_questions, QaEngine, QaResult};
use super::redact::{RedactionEngine, RedactionOptions, RedactionResult};
use super::tables::{TableEngine, TableRecord};
use super::PipelineError;
use crate::capabilities::{ExtractiveQa, NerBackend, OcrBackend, PdfRenderer, Summarizer};
use crate::document::{normalize, DocumentInput};

/// Injected capability set. Every slot is optional; absence degrades the
/// dependent stage rather than failing the pipeline.
#[derive(Default)]
pub struct PipelineCapabilities {
    pub ocr: Option<Arc<dyn OcrBackend>>,
    pub pdf: Option<Arc<dyn PdfRenderer>>,
    pub summarizer: Option<Arc<dyn Summarizer>>,
    pub extractive_qa: Option<Arc<dyn ExtractiveQa>>,
    pub ner: Option<Arc<dyn NerBackend>>,
}

/// Everything one processing invocation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub document_id: Uuid,
    pub name: String,
    pub extraction: ExtractionResult,
    pub tables: Vec<TableRecord>,
    pub key_values: KeyValueResult,
    pub layout: LayoutElements,
    pub classification: ClassificationResult,
    pub overview: String,
    pub suggested_questions: Vec<String>,
    pub processed_at: DateTime<Utc>,
}

pub struct DocumentPipeline {
    extraction: OcrEngine,
    tables: TableEngine,
    keyvalue: KeyValueEngine,
    classifier: DocumentClassifier,
    redaction: RedactionEngine,
    qa: QaEngine,
    pdf: Option<Arc<dyn PdfRenderer>>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl DocumentPipeline {
    /// Pipeline with the heuristic classifier.
    pub fn new(capabilities: PipelineCapabilities) -> Self {
        Self::build(capabilities, DocumentClassifier::heuristic())
    }

    /// Pipeline with the trained classifier, loading or fitting the
    /// artifact at `artifact`.
    pub fn with_trained_classifier(
        capabilities: PipelineCapabilities,
        artifact: &Path,
    ) -> Result<Self, ClassifierError> {
        Ok(Self::build(
            capabilities,
            DocumentClassifier::trained(artifact)?,
        ))
    }

    /// Trained pipeline with the artifact at its default location under
    /// the application data directory. Falls back to heuristic mode when
    /// the artifact cannot be loaded or fit.
    pub fn with_default_trained_classifier(capabilities: PipelineCapabilities) -> Self {
        let classifier =
            match DocumentClassifier::trained(&crate::config::classifier_artifact_path()) {
                Ok(classifier) => classifier,
                Err(e) => {
                    tracing::warn!(error = %e, "Trained classifier unavailable, using heuristic mode");
                    DocumentClassifier::heuristic()
                }
            };
        Self::build(capabilities, classifier)
    }

    fn build(capabilities: PipelineCapabilities, classifier: DocumentClassifier) -> Self {
        Self {
            extraction: OcrEngine::new(capabilities.ocr.clone()),
            tables: TableEngine::new(capabilities.ocr),
            keyvalue: KeyValueEngine::new(),
            classifier,
            redaction: RedactionEngine::new(capabilities.ner.clone()),
            qa: QaEngine::new(capabilities.extractive_qa, capabilities.ner),
            pdf: capabilities.pdf,
            summarizer: capabilities.summarizer,
        }
    }

    /// Run the full pipeline over one document.
    pub fn process(&self, input: &DocumentInput) -> Result<DocumentAnalysis, PipelineError> {
        let document_id = Uuid::new_v4();
        tracing::info!(document_id = %document_id, name = %input.name, "Processing document");

        let pages = normalize(input, self.pdf.as_deref())?;
        let extraction = self.extraction.extract_document(document_id, &pages);
        let tables = self.tables.extract(&pages);
        let key_values = self
            .keyvalue
            .extract(&extraction.full_text, &extraction.tokens);
        let layout = extract_layout(&extraction.full_text);
        let classification = self.classifier.classify(&extraction.full_text);
        let overview = generate_overview(
            &extraction.full_text,
            &classification.doc_type,
            self.summarizer.as_deref(),
        );
        let suggested_questions = suggested_questions(&classification.doc_type);

        Ok(DocumentAnalysis {
            document_id,
            name: input.name.clone(),
            extraction,
            tables,
            key_values,
            layout,
            classification,
            overview,
            suggested_questions,
            processed_at: Utc::now(),
        })
    }

    /// Redact sensitive data from text.
    pub fn redact(&self, text: &str, options: &RedactionOptions) -> RedactionResult {
        self.redaction.redact(text, options)
    }

    /// Answer a question against document text and its extracted pairs.
    pub fn answer(&self, question: &str, text: &str, key_values: &KeyValueResult) -> QaResult {
        self.qa.answer(question, text, key_values)
    }
}
