//! Prompt domain
//!
//! Templates for the prompts each phase and tier sends to the engine.

mod template;

pub use template::PromptTemplate;
