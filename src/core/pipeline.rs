use crate::core::prompts::{build_generation_plan, refinement_prompt};
use crate::core::{ConfigProvider, DraftPipeline, ModelClient, Storage};
use crate::domain::model::{
    ArtifactFailure, CloudProvider, DraftOutput, DraftReport, GeneratedBundle, GeneratedFile,
    GenerationRequest, JobTarget, PromptJob, RefinedConfiguration,
};
use crate::utils::error::{DraftError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const BUNDLE_ARCHIVE: &str = "terraform_bundle.zip";

#[derive(Debug, Serialize)]
struct BundleManifest<'a> {
    generated_at: DateTime<Utc>,
    provider: CloudProvider,
    service: &'a str,
    model: &'a str,
    files: Vec<&'a str>,
    failures: &'a [ArtifactFailure],
}

pub struct GenerationPipeline<S: Storage, C: ConfigProvider, M: ModelClient> {
    request: GenerationRequest,
    storage: S,
    config: C,
    model: Arc<M>,
}

impl<S: Storage, C: ConfigProvider, M: ModelClient> GenerationPipeline<S, C, M> {
    pub fn new(request: GenerationRequest, storage: S, config: C, model: Arc<M>) -> Self {
        Self {
            request,
            storage,
            config,
            model,
        }
    }

    fn build_archive(&self, bundle: &GeneratedBundle) -> Result<Vec<u8>> {
        let manifest = BundleManifest {
            generated_at: Utc::now(),
            provider: self.request.provider,
            service: &self.request.service,
            model: self.model.model_name(),
            files: bundle.files.iter().map(|f| f.file_name()).collect(),
            failures: &bundle.failures,
        };

        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        for file in &bundle.files {
            zip.start_file(file.file_name(), SimpleFileOptions::default())?;
            zip.write_all(file.content.as_bytes())?;
        }

        zip.start_file("manifest.json", SimpleFileOptions::default())?;
        zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, M: ModelClient> DraftPipeline for GenerationPipeline<S, C, M> {
    async fn plan(&self) -> Result<Vec<PromptJob>> {
        let jobs = build_generation_plan(&self.request);
        tracing::debug!(
            "Planned {} prompts for {} on {}",
            jobs.len(),
            self.request.service,
            self.request.provider
        );
        Ok(jobs)
    }

    async fn invoke(&self, jobs: Vec<PromptJob>) -> Result<DraftOutput> {
        let mut bundle = GeneratedBundle::default();
        let attempted = jobs.len();

        for job in jobs {
            let kind = match job.target {
                JobTarget::Artifact(kind) => kind,
                JobTarget::Refinement { .. } => continue,
            };

            tracing::info!("Requesting {}", kind.file_name());
            match self.model.complete(&job.prompt).await {
                Ok(content) => bundle.files.push(GeneratedFile { kind, content }),
                Err(e) => {
                    tracing::error!("Error generating {}: {}", kind.file_name(), e);
                    bundle.failures.push(ArtifactFailure {
                        kind,
                        message: e.to_string(),
                    });
                }
            }
        }

        if bundle.is_empty() && attempted > 0 {
            return Err(DraftError::GenerationFailedError { failed: attempted });
        }

        Ok(DraftOutput::Bundle(bundle))
    }

    async fn load(&self, output: DraftOutput) -> Result<DraftReport> {
        let bundle = match output {
            DraftOutput::Bundle(bundle) => bundle,
            DraftOutput::Refined(_) => {
                return Err(DraftError::ValidationError {
                    message: "Generation pipeline received a refinement result".to_string(),
                })
            }
        };

        let mut written = Vec::new();
        for file in &bundle.files {
            self.storage
                .write_file(file.file_name(), file.content.as_bytes())
                .await?;
            written.push(format!("{}/{}", self.config.output_path(), file.file_name()));
        }

        if self.config.write_zip() {
            let zip_data = self.build_archive(&bundle)?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(BUNDLE_ARCHIVE, &zip_data).await?;
            written.push(format!("{}/{}", self.config.output_path(), BUNDLE_ARCHIVE));
        }

        Ok(DraftReport {
            output: DraftOutput::Bundle(bundle),
            written,
        })
    }
}

pub struct RefinementPipeline<S: Storage, C: ConfigProvider, M: ModelClient> {
    feedback: String,
    existing: String,
    iteration: u32,
    storage: S,
    config: C,
    model: Arc<M>,
}

impl<S: Storage, C: ConfigProvider, M: ModelClient> RefinementPipeline<S, C, M> {
    pub fn new(
        feedback: impl Into<String>,
        existing: impl Into<String>,
        iteration: u32,
        storage: S,
        config: C,
        model: Arc<M>,
    ) -> Self {
        Self {
            feedback: feedback.into(),
            existing: existing.into(),
            iteration,
            storage,
            config,
            model,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, M: ModelClient> DraftPipeline for RefinementPipeline<S, C, M> {
    async fn plan(&self) -> Result<Vec<PromptJob>> {
        if self.feedback.trim().is_empty() {
            return Err(DraftError::ValidationError {
                message: "Refinement feedback cannot be empty".to_string(),
            });
        }
        if self.existing.trim().is_empty() {
            return Err(DraftError::ValidationError {
                message: "Nothing to refine yet, generate a configuration first".to_string(),
            });
        }

        Ok(vec![PromptJob {
            target: JobTarget::Refinement {
                iteration: self.iteration,
            },
            prompt: refinement_prompt(&self.feedback, &self.existing),
        }])
    }

    async fn invoke(&self, jobs: Vec<PromptJob>) -> Result<DraftOutput> {
        let job = jobs
            .into_iter()
            .next()
            .ok_or_else(|| DraftError::ValidationError {
                message: "No refinement prompt was planned".to_string(),
            })?;

        tracing::info!("Requesting {}", job.target);
        let content = self.model.complete(&job.prompt).await?;

        Ok(DraftOutput::Refined(RefinedConfiguration {
            iteration: self.iteration,
            feedback: self.feedback.trim().to_string(),
            content,
        }))
    }

    async fn load(&self, output: DraftOutput) -> Result<DraftReport> {
        let refined = match output {
            DraftOutput::Refined(refined) => refined,
            DraftOutput::Bundle(_) => {
                return Err(DraftError::ValidationError {
                    message: "Refinement pipeline received a generation result".to_string(),
                })
            }
        };

        let file_name = refined.file_name();
        self.storage
            .write_file(&file_name, refined.content.as_bytes())
            .await?;

        Ok(DraftReport {
            written: vec![format!("{}/{}", self.config.output_path(), file_name)],
            output: DraftOutput::Refined(refined),
        })
    }
}
