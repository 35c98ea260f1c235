use crate::domain::model::{DraftOutput, DraftReport, PromptJob};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn write_zip(&self) -> bool;
}

/// A hosted text-generation model: prompt in, text out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[async_trait]
pub trait DraftPipeline: Send + Sync {
    async fn plan(&self) -> Result<Vec<PromptJob>>;
    async fn invoke(&self, jobs: Vec<PromptJob>) -> Result<DraftOutput>;
    async fn load(&self, output: DraftOutput) -> Result<DraftReport>;
}
