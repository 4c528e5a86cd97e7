// Three-card readings: request validation, prompt assembly, narrative extraction.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod prompts;
pub mod service;
