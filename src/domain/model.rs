use crate::utils::error::{DraftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Aws,
    Azure,
    Gcp,
}

impl CloudProvider {
    pub const ALL: [CloudProvider; 3] = [CloudProvider::Aws, CloudProvider::Azure, CloudProvider::Gcp];

    pub fn display_name(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "AWS",
            CloudProvider::Azure => "Azure",
            CloudProvider::Gcp => "GCP",
        }
    }

    pub fn default_services(&self) -> &'static [&'static str] {
        match self {
            CloudProvider::Aws => &["EC2", "S3", "RDS", "EKS", "Load Balancer", "Firewall"],
            CloudProvider::Azure => &[
                "Virtual Machines",
                "AKS",
                "Blob Storage",
                "SQL Database",
                "Firewall",
            ],
            CloudProvider::Gcp => &[
                "Compute Engine",
                "GKE",
                "Cloud Storage",
                "Cloud SQL",
                "Firewall",
            ],
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for CloudProvider {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" | "amazon" => Ok(CloudProvider::Aws),
            "azure" | "microsoft" => Ok(CloudProvider::Azure),
            "gcp" | "google" => Ok(CloudProvider::Gcp),
            other => Err(DraftError::ValidationError {
                message: format!("Unknown cloud provider '{}'. Choose AWS, Azure or GCP", other),
            }),
        }
    }
}

/// Default services per provider plus custom ones added during a session.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    custom: HashMap<CloudProvider, Vec<String>>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the trimmed name when it was added, `None` for a duplicate.
    pub fn add_custom(&mut self, provider: CloudProvider, name: &str) -> Result<Option<String>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DraftError::ValidationError {
                message: "Custom service name cannot be empty".to_string(),
            });
        }

        if self.contains(provider, name) {
            return Ok(None);
        }

        self.custom
            .entry(provider)
            .or_default()
            .push(name.to_string());
        Ok(Some(name.to_string()))
    }

    pub fn contains(&self, provider: CloudProvider, name: &str) -> bool {
        self.services(provider)
            .iter()
            .any(|s| s.eq_ignore_ascii_case(name.trim()))
    }

    pub fn services(&self, provider: CloudProvider) -> Vec<String> {
        let mut services: Vec<String> = provider
            .default_services()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(custom) = self.custom.get(&provider) {
            services.extend(custom.iter().cloned());
        }
        services
    }

    pub fn custom_services(&self, provider: CloudProvider) -> &[String] {
        self.custom.get(&provider).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub provider: CloudProvider,
    pub service: String,
    pub include_modules: bool,
    pub include_policies: bool,
}

impl GenerationRequest {
    pub fn new(provider: CloudProvider, service: impl Into<String>) -> Result<Self> {
        let service = service.into().trim().to_string();
        if service.is_empty() {
            return Err(DraftError::ValidationError {
                message: "Please select a cloud provider and service before generating"
                    .to_string(),
            });
        }
        Ok(Self {
            provider,
            service,
            include_modules: false,
            include_policies: false,
        })
    }

    pub fn with_modules(mut self, include: bool) -> Self {
        self.include_modules = include;
        self
    }

    pub fn with_policies(mut self, include: bool) -> Self {
        self.include_policies = include;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Provider,
    Variables,
    Main,
    Backend,
    Outputs,
    Modules,
    RegoPolicies,
    Instructions,
}

impl ArtifactKind {
    /// Always requested, in this order.
    pub const CORE: [ArtifactKind; 5] = [
        ArtifactKind::Provider,
        ArtifactKind::Variables,
        ArtifactKind::Main,
        ArtifactKind::Backend,
        ArtifactKind::Outputs,
    ];

    pub const ALL: [ArtifactKind; 8] = [
        ArtifactKind::Provider,
        ArtifactKind::Variables,
        ArtifactKind::Main,
        ArtifactKind::Backend,
        ArtifactKind::Outputs,
        ArtifactKind::Modules,
        ArtifactKind::RegoPolicies,
        ArtifactKind::Instructions,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ArtifactKind::Provider => "provider",
            ArtifactKind::Variables => "variables",
            ArtifactKind::Main => "main",
            ArtifactKind::Backend => "backend",
            ArtifactKind::Outputs => "outputs",
            ArtifactKind::Modules => "modules",
            ArtifactKind::RegoPolicies => "rego_policies",
            ArtifactKind::Instructions => "instructions",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Provider => "provider.tf",
            ArtifactKind::Variables => "variables.tf",
            ArtifactKind::Main => "main.tf",
            ArtifactKind::Backend => "backend.tf",
            ArtifactKind::Outputs => "outputs.tf",
            ArtifactKind::Modules => "modules.tf",
            ArtifactKind::RegoPolicies => "policies.rego",
            ArtifactKind::Instructions => "instructions.md",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::RegoPolicies => "rego",
            ArtifactKind::Instructions => "md",
            _ => "tf",
        }
    }

    pub fn language(&self) -> &'static str {
        match self {
            ArtifactKind::RegoPolicies => "rego",
            ArtifactKind::Instructions => "markdown",
            _ => "hcl",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    pub kind: ArtifactKind,
    pub content: String,
}

impl GeneratedFile {
    pub fn file_name(&self) -> &'static str {
        self.kind.file_name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFailure {
    pub kind: ArtifactKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedBundle {
    pub files: Vec<GeneratedFile>,
    pub failures: Vec<ArtifactFailure>,
}

impl GeneratedBundle {
    pub fn get(&self, kind: ArtifactKind) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinedConfiguration {
    pub iteration: u32,
    pub feedback: String,
    pub content: String,
}

impl RefinedConfiguration {
    pub fn file_name(&self) -> String {
        format!("refined_v{}.tf", self.iteration)
    }
}

/// What a pipeline produced, before it is written out.
#[derive(Debug, Clone)]
pub enum DraftOutput {
    Bundle(GeneratedBundle),
    Refined(RefinedConfiguration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobTarget {
    Artifact(ArtifactKind),
    Refinement { iteration: u32 },
}

impl fmt::Display for JobTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobTarget::Artifact(kind) => write!(f, "{}", kind),
            JobTarget::Refinement { iteration } => write!(f, "refinement #{}", iteration),
        }
    }
}

/// One prompt to send to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptJob {
    pub target: JobTarget,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct DraftReport {
    pub output: DraftOutput,
    pub written: Vec<String>,
}
