use crate::core::PromptJob;
use crate::domain::model::{CloudProvider, GeneratedBundle, RefinedConfiguration, ServiceCatalog};
use crate::utils::error::Result;
use std::io::Write;

pub fn render_bundle(bundle: &GeneratedBundle, out: &mut dyn Write) -> Result<()> {
    for file in &bundle.files {
        writeln!(out, "📄 {} ({})", file.file_name(), file.kind.language())?;
        writeln!(out, "{}", file.content)?;
        writeln!(out)?;
    }

    for failure in &bundle.failures {
        writeln!(
            out,
            "❌ Error generating {}. The model API call failed.",
            failure.kind.file_name()
        )?;
    }
    Ok(())
}

pub fn render_refined(refined: &RefinedConfiguration, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "📄 {} (refinement #{})", refined.file_name(), refined.iteration)?;
    writeln!(out, "{}", refined.content)?;
    writeln!(out)?;
    Ok(())
}

pub fn render_written(paths: &[String], out: &mut dyn Write) -> Result<()> {
    for path in paths {
        writeln!(out, "📥 Saved {}", path)?;
    }
    Ok(())
}

pub fn render_prompts(jobs: &[PromptJob], out: &mut dyn Write) -> Result<()> {
    for job in jobs {
        writeln!(out, "── {} ──", job.target)?;
        writeln!(out, "{}", job.prompt)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Catalogue listing; `selected` is marked with `*`.
pub fn render_services(
    catalog: &ServiceCatalog,
    provider: CloudProvider,
    selected: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "{} services:", provider)?;
    for service in catalog.services(provider) {
        let marker = if selected == Some(service.as_str()) { "*" } else { " " };
        writeln!(out, " {} {}", marker, service)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ArtifactFailure, ArtifactKind, GeneratedFile};

    #[test]
    fn test_failures_render_generic_message() {
        let bundle = GeneratedBundle {
            files: vec![GeneratedFile {
                kind: ArtifactKind::Main,
                content: "resource \"google_sql_database_instance\" \"db\" {}".to_string(),
            }],
            failures: vec![ArtifactFailure {
                kind: ArtifactKind::Outputs,
                message: "Model API returned 500: secret upstream detail".to_string(),
            }],
        };

        let mut out = Vec::new();
        render_bundle(&bundle, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("📄 main.tf (hcl)"));
        assert!(text.contains("Error generating outputs.tf"));
        assert!(!text.contains("secret upstream detail"));
    }

    #[test]
    fn test_services_marks_selection() {
        let mut out = Vec::new();
        render_services(&ServiceCatalog::new(), CloudProvider::Gcp, Some("GKE"), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("GCP services:"));
        assert!(text.contains(" * GKE"));
        assert!(text.contains("   Cloud SQL"));
    }
}
