//! Prompts sent to the chat-completion model, from free text or a PDF.

use std::sync::Arc;

use adapters::llm::ChatCompletion;
use adapters::pdf::PdfTextExtractor;
use adapters::AdapterError;
use bytes::Bytes;
use serde::Serialize;

use super::validation::validate_required;
use crate::errors::Result;

const SCHEMA_PROMPT: &str = "Generate a comprehensive database schema, including tables, relationships, and data types for below data. Ensure that the schema is optimized for efficient querying and data retrieval: ";
const UNIT_TEST_PROMPT: &str = "Create unit test code for below data in javascript. Write test cases that cover different scenarios, including valid and invalid input, authentication failures, and edge cases: ";
const CONTROLLER_PROMPT: &str = "Develop a controller code for below data in javascript. Ensure that the controller follows best practices for security and handles various error scenarios gracefully: ";
const COMBINED_PROMPT: &str = "Please generate Database schema, Unit test code & Controller code for below data: ";

/// Template for the requested output kind; unknown kinds ask for everything.
pub fn prompt_for(kind: &str) -> &'static str {
    match kind {
        "1" => SCHEMA_PROMPT,
        "2" => UNIT_TEST_PROMPT,
        "3" => CONTROLLER_PROMPT,
        _ => COMBINED_PROMPT,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PdfAnswer {
    pub pdf_text: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TextAnswer {
    pub input: String,
    pub answer: String,
}

pub struct AssistantService {
    llm: Arc<dyn ChatCompletion>,
    pdf: Arc<dyn PdfTextExtractor>,
}

impl AssistantService {
    pub fn new(llm: Arc<dyn ChatCompletion>, pdf: Arc<dyn PdfTextExtractor>) -> Self {
        Self { llm, pdf }
    }

    #[tracing::instrument(skip_all, fields(kind = %kind, bytes = pdf.len()))]
    pub async fn submit_pdf(&self, pdf: Bytes, kind: &str) -> Result<PdfAnswer> {
        let extractor = self.pdf.clone();
        let pdf_text = tokio::task::spawn_blocking(move || extractor.extract(&pdf))
            .await
            .map_err(|err| AdapterError::Pdf(err.to_string()))??;

        let prompt = format!("{} {}", prompt_for(kind), pdf_text);
        let answer = self.llm.complete(&prompt).await?;
        Ok(PdfAnswer { pdf_text, answer })
    }

    #[tracing::instrument(skip_all, fields(chars = text.len()))]
    pub async fn submit_text(&self, text: String) -> Result<TextAnswer> {
        validate_required(&text, "text")?;
        let answer = self.llm.complete(&text).await?;
        Ok(TextAnswer {
            input: text,
            answer,
        })
    }
}
