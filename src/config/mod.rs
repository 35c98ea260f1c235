pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{CloudProvider, GenerationRequest};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "tf-drafter")]
#[command(about = "Draft Terraform configurations with a hosted language model")]
pub struct CliConfig {
    /// Path to an optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate provider, variables, main, backend and outputs files
    Generate(GenerateArgs),
    /// Revise existing Terraform files from free-text feedback
    Refine(RefineArgs),
    /// Print the prompts that `generate` would send, without calling the model
    Prompt(SelectionArgs),
    /// List the known services per provider
    Services {
        #[arg(long)]
        provider: Option<CloudProvider>,
    },
    /// Line-oriented session: pick provider and service, generate, refine
    Interactive(InteractiveArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// AWS, Azure or GCP
    #[arg(long)]
    pub provider: CloudProvider,

    /// A catalogue service or any custom service name
    #[arg(long)]
    pub service: String,

    /// Also request a reusable module structure
    #[arg(long)]
    pub modules: bool,

    /// Also request OPA Rego policies
    #[arg(long)]
    pub policies: bool,
}

#[cfg(feature = "cli")]
impl SelectionArgs {
    pub fn to_request(&self) -> crate::utils::error::Result<GenerationRequest> {
        Ok(GenerationRequest::new(self.provider, self.service.clone())?
            .with_modules(self.modules)
            .with_policies(self.policies))
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[arg(long)]
    pub output: Option<String>,

    /// Also write every generated file into terraform_bundle.zip
    #[arg(long)]
    pub zip: bool,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct RefineArgs {
    #[arg(long)]
    pub feedback: String,

    /// Existing file to revise; repeat for several files
    #[arg(long = "file", required = true)]
    pub files: Vec<String>,

    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, default_value = "1")]
    pub iteration: u32,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct InteractiveArgs {
    #[arg(long)]
    pub output: Option<String>,

    #[arg(long)]
    pub zip: bool,
}

/// Where and how generated artifacts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub output_path: String,
    pub write_zip: bool,
}

impl OutputSettings {
    pub fn new(output_path: impl Into<String>, write_zip: bool) -> Self {
        Self {
            output_path: output_path.into(),
            write_zip,
        }
    }
}

impl ConfigProvider for OutputSettings {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn write_zip(&self) -> bool {
        self.write_zip
    }
}
