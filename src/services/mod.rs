pub mod history_vault;
pub mod html_writer;
pub mod llm_service;
pub mod paper_assembler;
pub mod renderer;
pub mod request_builder;
pub mod variant_generator;

pub use history_vault::HistoryVault;
pub use llm_service::{classify_provider_error, ContentGenerator, LlmService};
pub use paper_assembler::{assemble, assemble_from_str};
pub use renderer::{render_view, PaperView, RenderMode, TextDirection};
pub use request_builder::{build_request, GenerationRequest, MediaPart};
pub use variant_generator::{shuffle_sections, VariantGenerator, DEFAULT_SET_LABELS};
