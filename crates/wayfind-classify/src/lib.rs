//! Query understanding: free text → [`wayfind_core::ClassifiedQuery`].
//!
//! Two-stage pipeline. The primary path asks an LLM collaborator for a
//! structured classification; the deterministic rule engine is both the
//! fallback when the LLM is unavailable or unparsable and a trusted
//! override when the post-classification sanity pass disagrees. Every
//! result is tagged with the stage that produced it.

pub mod classifier;
pub mod error;
pub mod llm;
pub mod normalize;
pub mod prompt;
pub mod rules;

pub use classifier::QueryClassifier;
pub use error::ClassifyError;
pub use llm::{GenerateOptions, LlmClient, TextGenerator};
