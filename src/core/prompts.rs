//! Prompt assembly. Everything here is a pure function of its inputs.

use crate::domain::model::{
    ArtifactKind, CloudProvider, GeneratedBundle, GenerationRequest, JobTarget, PromptJob,
};

/// Instruction text asking the model for a single artifact.
pub fn artifact_prompt(kind: ArtifactKind, provider: CloudProvider, service: &str) -> String {
    let lines: Vec<String> = match kind {
        ArtifactKind::Provider => vec![
            format!("Create a Terraform `provider.tf` file for {service} on {provider}."),
            "Follow provider best practices and keep the region and authentication details configurable.".to_string(),
        ],
        ArtifactKind::Variables => vec![
            format!("Create a Terraform `variables.tf` file for {service} on {provider}."),
            "Include the key variables such as region, instance type and scaling settings.".to_string(),
            "Use consistent naming and give every variable a meaningful description.".to_string(),
            "Do NOT include any resource blocks here.".to_string(),
        ],
        ArtifactKind::Main => vec![
            format!("Create a Terraform `main.tf` file for {service} on {provider}."),
            "Reference variables declared in `variables.tf` instead of defining them here.".to_string(),
            "Leave out the provider block; it lives in `provider.tf`.".to_string(),
            "Write clear resource blocks with tags, encryption settings and IAM roles.".to_string(),
            "Keep the configuration modular, secure and scalable.".to_string(),
        ],
        ArtifactKind::Backend => vec![
            format!("Create a Terraform `backend.tf` file for {service} on {provider}."),
            format!("Configure remote state storage with locking, {}.", backend_hint(provider)),
            "Keep the state secure and protect its integrity.".to_string(),
        ],
        ArtifactKind::Outputs => vec![
            format!("Create a Terraform `outputs.tf` file for {service} on {provider}."),
            "Define useful outputs such as `public_ip`, `instance_id` or `service_url` for downstream integrations.".to_string(),
        ],
        ArtifactKind::Modules => vec![
            format!("Create a Terraform module structure for {service} on {provider}."),
            "Include reusable module files: `main.tf`, `variables.tf` and `outputs.tf`.".to_string(),
            "Design the module for scalability and maintainability.".to_string(),
        ],
        ArtifactKind::RegoPolicies => vec![
            format!("Create OPA (Open Policy Agent) Rego policies for {service} on {provider}."),
            "The policies should enforce security, data protection and sensible resource usage.".to_string(),
            "Include sample rules for IAM roles, resource tagging and encryption enforcement.".to_string(),
        ],
        ArtifactKind::Instructions => vec![
            format!("Provide clear instructions for deploying the generated Terraform files for {service} on {provider}."),
            "Include the steps for `terraform init`, `terraform plan` and `terraform apply`.".to_string(),
            "Add guidance for securing state files and setting up the backend.".to_string(),
        ],
    };

    lines.join("\n")
}

fn backend_hint(provider: CloudProvider) -> &'static str {
    match provider {
        CloudProvider::Aws => "for example an S3 bucket with a DynamoDB table for state locking",
        CloudProvider::Azure => "for example an Azure Storage account container with blob lease locking",
        CloudProvider::Gcp => "for example a Cloud Storage bucket with object versioning",
    }
}

/// Ordered prompt jobs for one generation run.
///
/// Core files come first, then modules and policies when requested, and the
/// deployment instructions last.
pub fn build_generation_plan(request: &GenerationRequest) -> Vec<PromptJob> {
    let mut kinds: Vec<ArtifactKind> = ArtifactKind::CORE.to_vec();
    if request.include_modules {
        kinds.push(ArtifactKind::Modules);
    }
    if request.include_policies {
        kinds.push(ArtifactKind::RegoPolicies);
    }
    kinds.push(ArtifactKind::Instructions);

    kinds
        .into_iter()
        .map(|kind| PromptJob {
            target: JobTarget::Artifact(kind),
            prompt: artifact_prompt(kind, request.provider, &request.service),
        })
        .collect()
}

/// Prompt asking the model to revise `existing` according to `feedback`.
pub fn refinement_prompt(feedback: &str, existing: &str) -> String {
    format!(
        "Refine the following Terraform configuration based on this user feedback:\n\
         \n\
         Feedback: {feedback}\n\
         \n\
         Configuration:\n\
         {existing}\n\
         \n\
         Keep the output structured, clean and easy to read.\n\
         Define variables only in `variables.tf` and reference them from `main.tf`.\n\
         Keep the provider block separate in `provider.tf`.\n\
         Improve security, efficiency and maintainability.\n\
         Output only the updated configuration.",
        feedback = feedback.trim(),
        existing = existing.trim_end(),
    )
}

/// Joins the generated files into one text, each under a `# File:` header.
pub fn combine_bundle(bundle: &GeneratedBundle) -> String {
    bundle
        .files
        .iter()
        .map(|file| format!("# File: {}\n{}", file.file_name(), file.content.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Same layout as [`combine_bundle`] for files read from disk.
pub fn combine_named(files: &[(String, String)]) -> String {
    files
        .iter()
        .map(|(name, content)| format!("# File: {}\n{}", name, content.trim_end()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
