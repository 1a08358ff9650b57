pub mod loaders;
pub mod paper;
pub mod question;
pub mod settings;
pub mod source;

pub use loaders::{load_settings, load_settings_or_default};
pub use paper::{Paper, Section};
pub use question::{CognitiveLevel, Question, QuestionPatch, QuestionType};
pub use settings::{Difficulty, GeneratorSettings, SchemaProfile};
pub use source::{encode_data_url, SourceFile, SUPPORTED_MIME_TYPES};
