pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use app::session::{Session, SessionControl};
pub use config::{cli::LocalStorage, toml_config::TomlConfig, OutputSettings};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use core::{
    engine::DraftEngine,
    llm::OpenAiClient,
    pipeline::{GenerationPipeline, RefinementPipeline},
};
pub use domain::model::{ArtifactKind, CloudProvider, GenerationRequest, ServiceCatalog};
pub use utils::error::{DraftError, Result};
