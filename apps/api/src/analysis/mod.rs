// Resume analysis: file text extraction, the analyzer seam, and the HTTP handler.
// All LLM calls go through llm_client.

pub mod analyzer;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod resume_text;
