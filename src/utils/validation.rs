//! Checks for configuration values and command-line input.

use crate::domain::model::ArtifactKind;
use crate::utils::error::{DraftError, Result};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Terraform inputs accepted by `refine` besides the generated artifact types.
const EXTRA_REFINE_EXTENSIONS: [&str; 2] = ["tfvars", "hcl"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> DraftError {
    DraftError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// The Chat Completions path is appended to this URL, so it must be a plain
/// http(s) origin or prefix without query or fragment.
pub fn validate_base_url(field: &str, base_url: &str) -> Result<()> {
    let url = Url::parse(base_url)
        .map_err(|e| invalid(field, base_url, format!("Invalid URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            base_url,
            format!("Model endpoints are served over http or https, not {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, base_url, "URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(field, base_url, "Base URL cannot carry a query or fragment"));
    }
    Ok(())
}

/// OpenAI accepts sampling temperatures from 0.0 to 2.0.
pub fn validate_temperature(field: &str, temperature: f64) -> Result<()> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(invalid(field, temperature, "Temperature must be between 0.0 and 2.0"));
    }
    Ok(())
}

pub fn validate_output_dir(field: &str, dir: &str) -> Result<()> {
    if dir.trim().is_empty() {
        return Err(invalid(field, dir, "Output directory cannot be empty"));
    }
    if dir.contains('\0') {
        return Err(invalid(field, dir, "Path contains null bytes"));
    }
    if Path::new(dir).is_file() {
        return Err(invalid(field, dir, "Output directory is an existing file"));
    }
    Ok(())
}

pub fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

/// Files given to `refine` must be Terraform, Rego or Markdown and must have
/// distinct names, since they are resent under `# File: <name>` headers.
pub fn validate_refine_files(field: &str, files: &[String]) -> Result<()> {
    if files.is_empty() {
        return Err(invalid(field, "", "At least one file is required"));
    }

    let mut allowed: Vec<&str> = ArtifactKind::ALL.iter().map(|k| k.extension()).collect();
    allowed.extend(EXTRA_REFINE_EXTENSIONS);
    allowed.dedup();

    let mut seen = HashSet::new();
    for file in files {
        let path = Path::new(file);
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        if !allowed.contains(&extension) {
            return Err(invalid(
                field,
                file,
                format!("Expected one of: {}", allowed.join(", ")),
            ));
        }

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or(file);
        if !seen.insert(name.to_string()) {
            return Err(invalid(field, file, format!("{} is given more than once", name)));
        }
    }
    Ok(())
}
