pub mod artifact_store;
pub mod extractor;
pub mod llm_service;

pub use artifact_store::{sanitize_base_name, ArtifactStore, DEFAULT_BASE_NAME};
pub use extractor::{DocumentKind, TextExtractor};
pub use llm_service::{build_prompt, GenerationPort, LlmService};
