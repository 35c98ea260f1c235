use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tf_drafter::core::DraftOutput;
use tf_drafter::{
    ArtifactKind, CloudProvider, DraftEngine, DraftError, GenerationPipeline, GenerationRequest,
    LocalStorage, OpenAiClient, OutputSettings, RefinementPipeline, TomlConfig,
};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 40, "completion_tokens": 20, "total_tokens": 60}
    })
}

fn client_for(server: &MockServer) -> Arc<OpenAiClient> {
    Arc::new(
        OpenAiClient::new("sk-integration", "gpt-4o", server.base_url(), Duration::from_secs(5))
            .unwrap(),
    )
}

#[tokio::test]
async fn test_end_to_end_generation_with_mock_model() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let main_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("`main.tf` file for EKS on AWS");
        then.status(200)
            .json_body(completion("resource \"aws_eks_cluster\" \"this\" {\n  name = var.cluster_name\n}"));
    });
    let other_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer sk-integration");
        then.status(200).json_body(completion("# drafted"));
    });

    let request = GenerationRequest::new(CloudProvider::Aws, "EKS")
        .unwrap()
        .with_modules(true)
        .with_policies(true);
    let engine = DraftEngine::new(GenerationPipeline::new(
        request,
        LocalStorage::new(output_path.clone()),
        OutputSettings::new(output_path.clone(), true),
        client_for(&server),
    ));

    let report = engine.run().await.unwrap();

    main_mock.assert_hits(1);
    other_mock.assert_hits(7);

    let main_tf = std::fs::read_to_string(temp_dir.path().join("main.tf")).unwrap();
    assert!(main_tf.contains("aws_eks_cluster"));
    for name in ["provider.tf", "variables.tf", "backend.tf", "outputs.tf", "modules.tf", "policies.rego", "instructions.md"] {
        assert!(temp_dir.path().join(name).exists(), "{} was not written", name);
    }

    let zip_path = temp_dir.path().join("terraform_bundle.zip");
    assert!(zip_path.exists());
    let archive = zip::ZipArchive::new(std::fs::File::open(zip_path).unwrap()).unwrap();
    assert_eq!(archive.len(), 9);

    assert_eq!(report.written.len(), 9);
}

#[tokio::test]
async fn test_generation_survives_single_api_failure() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("`outputs.tf`");
        then.status(500).body("internal error");
    });
    let ok = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(completion("# ok"));
    });

    let request = GenerationRequest::new(CloudProvider::Azure, "AKS").unwrap();
    let engine = DraftEngine::new(GenerationPipeline::new(
        request,
        LocalStorage::new(output_path.clone()),
        OutputSettings::new(output_path, false),
        client_for(&server),
    ));

    let report = engine.run().await.unwrap();

    failing.assert_hits(1);
    ok.assert_hits(5);
    let DraftOutput::Bundle(bundle) = report.output else {
        panic!("expected a generated bundle");
    };
    assert_eq!(bundle.failures.len(), 1);
    assert_eq!(bundle.failures[0].kind, ArtifactKind::Outputs);
    assert!(!temp_dir.path().join("outputs.tf").exists());
    assert!(temp_dir.path().join("main.tf").exists());
}

#[tokio::test]
async fn test_generation_fails_when_api_is_down() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(503);
    });

    let request = GenerationRequest::new(CloudProvider::Gcp, "Cloud Storage").unwrap();
    let engine = DraftEngine::new(GenerationPipeline::new(
        request,
        LocalStorage::new(output_path.clone()),
        OutputSettings::new(output_path, false),
        client_for(&server),
    ));

    let err = engine.run().await.unwrap_err();

    api_mock.assert_hits(6);
    assert!(matches!(err, DraftError::GenerationFailedError { failed: 6 }));
    assert_eq!(
        err.user_friendly_message(),
        "Error generating configuration. The model API call failed."
    );
    assert!(std::fs::read_dir(temp_dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_refinement_round_trip_writes_revision() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_string_lossy().into_owned();
    let existing = "# File: main.tf\nresource \"aws_s3_bucket\" \"logs\" {\n  bucket = var.bucket\n}";

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .body_contains("Feedback: enable versioning")
            .body_contains("aws_s3_bucket");
        then.status(200).json_body(completion(
            "resource \"aws_s3_bucket_versioning\" \"logs\" {\n  bucket = aws_s3_bucket.logs.id\n}",
        ));
    });

    let engine = DraftEngine::new(RefinementPipeline::new(
        "enable versioning",
        existing,
        3,
        LocalStorage::new(output_path.clone()),
        OutputSettings::new(output_path, false),
        client_for(&server),
    ));

    let report = engine.run().await?;

    api_mock.assert();
    let refined = std::fs::read_to_string(temp_dir.path().join("refined_v3.tf"))?;
    assert!(refined.contains("aws_s3_bucket_versioning"));
    assert!(report.written[0].ends_with("refined_v3.tf"));
    Ok(())
}

#[tokio::test]
async fn test_missing_credential_sends_no_request() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(completion("# unreachable"));
    });

    std::env::remove_var("TF_DRAFTER_IT_MISSING_KEY");
    let config = TomlConfig::from_toml_str(&format!(
        "[model]\nbase_url = \"{}\"\napi_key_env = \"TF_DRAFTER_IT_MISSING_KEY\"\n",
        server.base_url()
    ))
    .unwrap();

    let err = OpenAiClient::from_config(&config).err().unwrap();

    assert!(matches!(err, DraftError::MissingConfigError { ref field } if field == "TF_DRAFTER_IT_MISSING_KEY"));
    assert_eq!(err.category(), tf_drafter::utils::error::ErrorCategory::Configuration);
    api_mock.assert_hits(0);
}
