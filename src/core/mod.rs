pub mod engine;
pub mod llm;
pub mod pipeline;
pub mod prompts;

pub use crate::domain::model::{DraftOutput, DraftReport, PromptJob};
pub use crate::domain::ports::{ConfigProvider, DraftPipeline, ModelClient, Storage};
pub use crate::utils::error::Result;
