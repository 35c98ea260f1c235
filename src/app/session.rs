//! Line-oriented interactive session.
//!
//! Keeps the ephemeral state of one drafting session: the selected provider
//! and service, the module and policy flags, custom services, and the latest
//! configuration text that refinement works from. Nothing outlives the
//! session.

use crate::app::render;
use crate::config::OutputSettings;
use crate::core::engine::DraftEngine;
use crate::core::pipeline::{GenerationPipeline, RefinementPipeline};
use crate::core::prompts::combine_bundle;
use crate::core::{ModelClient, Storage};
use crate::domain::model::{CloudProvider, DraftOutput, GenerationRequest, ServiceCatalog};
use crate::utils::error::{DraftError, Result};
use std::io::Write;
use std::sync::Arc;

pub const HELP: &str = "\
Commands:
  provider <aws|azure|gcp>   choose the cloud provider
  service <name>             choose a service from the list
  add-service <name>         add a custom service for the current provider
  services                   list services for the current provider
  modules <on|off>           include a Terraform module structure
  policies <on|off>          include OPA Rego policies
  generate                   generate the configuration
  refine <feedback>          refine the latest configuration
  show                       show the current selection
  help                       show this help
  quit                       leave the session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionControl {
    Continue,
    Quit,
}

pub struct Session<S: Storage + Clone, M: ModelClient> {
    provider: CloudProvider,
    service: Option<String>,
    include_modules: bool,
    include_policies: bool,
    catalog: ServiceCatalog,
    storage: S,
    output: OutputSettings,
    model: Arc<M>,
    current_configuration: Option<String>,
    refinement_iteration: u32,
}

impl<S: Storage + Clone, M: ModelClient> Session<S, M> {
    pub fn new(catalog: ServiceCatalog, storage: S, output: OutputSettings, model: Arc<M>) -> Self {
        let provider = CloudProvider::Aws;
        let service = catalog.services(provider).into_iter().next();
        Self {
            provider,
            service,
            include_modules: false,
            include_policies: false,
            catalog,
            storage,
            output,
            model,
            current_configuration: None,
            refinement_iteration: 0,
        }
    }

    pub fn provider(&self) -> CloudProvider {
        self.provider
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn refinement_iteration(&self) -> u32 {
        self.refinement_iteration
    }

    pub fn current_configuration(&self) -> Option<&str> {
        self.current_configuration.as_deref()
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Handles one input line. Command output is buffered and copied to
    /// `out` afterwards, so input, model and storage errors are all reported
    /// there and the session continues. Only writing to `out` can fail.
    pub async fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> Result<SessionControl> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(SessionControl::Continue);
        }

        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let mut reply = Vec::new();
        let result = match command.to_ascii_lowercase().as_str() {
            "quit" | "exit" => return Ok(SessionControl::Quit),
            "help" => writeln!(reply, "{}", HELP).map_err(DraftError::from),
            "provider" => self.select_provider(argument, &mut reply),
            "service" => self.select_service(argument, &mut reply),
            "add-service" => self.add_service(argument, &mut reply),
            "services" => render::render_services(
                &self.catalog,
                self.provider,
                self.service.as_deref(),
                &mut reply,
            ),
            "modules" => parse_switch(argument).and_then(|on| {
                self.include_modules = on;
                writeln!(reply, "Terraform modules: {}", on_off(on)).map_err(DraftError::from)
            }),
            "policies" => parse_switch(argument).and_then(|on| {
                self.include_policies = on;
                writeln!(reply, "OPA Rego policies: {}", on_off(on)).map_err(DraftError::from)
            }),
            "show" => self.show(&mut reply),
            "generate" => self.generate(&mut reply).await,
            "refine" => self.refine(argument, &mut reply).await,
            other => Err(DraftError::ValidationError {
                message: format!("Unknown command '{}'. Type `help` for the list", other),
            }),
        };

        out.write_all(&reply)?;
        if let Err(e) = result {
            tracing::error!("{} (category: {:?})", e, e.category());
            writeln!(out, "❌ {}", e.user_friendly_message())?;
        }
        Ok(SessionControl::Continue)
    }

    fn select_provider(&mut self, argument: &str, out: &mut dyn Write) -> Result<()> {
        let provider: CloudProvider = argument.parse()?;
        self.provider = provider;
        self.service = self.catalog.services(provider).into_iter().next();
        writeln!(
            out,
            "Provider set to {} (service: {})",
            provider,
            self.service.as_deref().unwrap_or("none")
        )?;
        Ok(())
    }

    fn select_service(&mut self, argument: &str, out: &mut dyn Write) -> Result<()> {
        let chosen = self
            .catalog
            .services(self.provider)
            .into_iter()
            .find(|s| s.eq_ignore_ascii_case(argument.trim()))
            .ok_or_else(|| DraftError::ValidationError {
                message: format!(
                    "'{}' is not a known {} service. Use `add-service` to add it",
                    argument.trim(),
                    self.provider
                ),
            })?;
        writeln!(out, "Service set to {}", chosen)?;
        self.service = Some(chosen);
        Ok(())
    }

    fn add_service(&mut self, argument: &str, out: &mut dyn Write) -> Result<()> {
        match self.catalog.add_custom(self.provider, argument)? {
            Some(name) => writeln!(
                out,
                "✅ {} added successfully to {} services!",
                name, self.provider
            )?,
            None => writeln!(
                out,
                "{} is already in the {} services",
                argument.trim(),
                self.provider
            )?,
        }
        Ok(())
    }

    fn show(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Provider:  {}", self.provider)?;
        writeln!(out, "Service:   {}", self.service.as_deref().unwrap_or("none"))?;
        writeln!(out, "Modules:   {}", on_off(self.include_modules))?;
        writeln!(out, "Policies:  {}", on_off(self.include_policies))?;
        writeln!(out, "Refinements: {}", self.refinement_iteration)?;
        Ok(())
    }

    async fn generate(&mut self, out: &mut dyn Write) -> Result<()> {
        let service = self.service.clone().unwrap_or_default();
        let request = GenerationRequest::new(self.provider, service)?
            .with_modules(self.include_modules)
            .with_policies(self.include_policies);

        self.refinement_iteration = 0;
        let engine = DraftEngine::new(GenerationPipeline::new(
            request,
            self.storage.clone(),
            self.output.clone(),
            self.model.clone(),
        ));
        let report = engine.run().await?;

        if let DraftOutput::Bundle(bundle) = &report.output {
            render::render_bundle(bundle, out)?;
            self.current_configuration = Some(combine_bundle(bundle));
        }
        render::render_written(&report.written, out)?;
        writeln!(out, "✅ Terraform configuration generated successfully!")?;
        Ok(())
    }

    async fn refine(&mut self, feedback: &str, out: &mut dyn Write) -> Result<()> {
        let existing = self
            .current_configuration
            .clone()
            .ok_or_else(|| DraftError::ValidationError {
                message: "Nothing to refine yet, run `generate` first".to_string(),
            })?;

        let iteration = self.refinement_iteration + 1;
        let engine = DraftEngine::new(RefinementPipeline::new(
            feedback,
            existing,
            iteration,
            self.storage.clone(),
            self.output.clone(),
            self.model.clone(),
        ));
        let report = engine.run().await?;

        if let DraftOutput::Refined(refined) = &report.output {
            render::render_refined(refined, out)?;
            self.current_configuration = Some(refined.content.clone());
        }
        self.refinement_iteration = iteration;
        render::render_written(&report.written, out)?;
        Ok(())
    }
}

fn parse_switch(argument: &str) -> Result<bool> {
    match argument.trim().to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(DraftError::ValidationError {
            message: format!("Expected on or off, got '{}'", other),
        }),
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
