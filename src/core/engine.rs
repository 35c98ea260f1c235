use crate::core::DraftPipeline;
use crate::domain::model::{DraftOutput, DraftReport};
use crate::utils::error::Result;

/// Runs a pipeline's plan, invoke and load steps in order.
pub struct DraftEngine<P: DraftPipeline> {
    pipeline: P,
}

impl<P: DraftPipeline> DraftEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<DraftReport> {
        tracing::info!("Assembling prompts...");
        let jobs = self.pipeline.plan().await?;
        tracing::info!("Assembled {} prompt(s)", jobs.len());

        tracing::info!("Calling the model...");
        let output = self.pipeline.invoke(jobs).await?;
        if let DraftOutput::Bundle(bundle) = &output {
            tracing::info!(
                "Received {} file(s), {} failed",
                bundle.files.len(),
                bundle.failures.len()
            );
        }

        tracing::info!("Writing files...");
        let report = self.pipeline.load(output).await?;
        for path in &report.written {
            tracing::debug!("Wrote {}", path);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputSettings;
    use crate::core::pipeline::tests::{MockStorage, ScriptedModel};
    use crate::core::pipeline::{GenerationPipeline, RefinementPipeline};
    use crate::domain::model::{CloudProvider, GenerationRequest};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_engine_runs_generation_end_to_end() {
        let storage = MockStorage::new();
        let request = GenerationRequest::new(CloudProvider::Gcp, "Cloud SQL").unwrap();
        let engine = DraftEngine::new(GenerationPipeline::new(
            request,
            storage.clone(),
            OutputSettings::new("drafts", false),
            Arc::new(ScriptedModel::new()),
        ));

        let report = engine.run().await.unwrap();

        assert_eq!(report.written.first().map(String::as_str), Some("drafts/provider.tf"));
        assert_eq!(report.written.last().map(String::as_str), Some("drafts/instructions.md"));
        assert!(storage.get_file("variables.tf").await.is_some());
    }

    #[tokio::test]
    async fn test_engine_stops_before_model_on_plan_error() {
        let model = Arc::new(ScriptedModel::new());
        let engine = DraftEngine::new(RefinementPipeline::new(
            "",
            "main",
            1,
            MockStorage::new(),
            OutputSettings::new("drafts", false),
            model.clone(),
        ));

        assert!(engine.run().await.is_err());
        assert_eq!(model.calls(), 0);
    }
}
