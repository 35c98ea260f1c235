use clap::Parser;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tf_drafter::app::{render, session::HELP};
use tf_drafter::config::{Command, GenerateArgs, InteractiveArgs, RefineArgs};
use tf_drafter::core::prompts::{build_generation_plan, combine_named};
use tf_drafter::core::{DraftOutput, Storage};
use tf_drafter::utils::{logger, validation, validation::Validate};
use tf_drafter::{
    CliConfig, CloudProvider, DraftEngine, DraftError, GenerationPipeline, LocalStorage,
    OpenAiClient, OutputSettings, RefinementPipeline, Result, Session, SessionControl, TomlConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();
    dotenv::dotenv().ok();

    let config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => TomlConfig::default(),
    };

    if config.logging.json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting tf-drafter");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli, config).await {
        tracing::error!(
            "❌ tf-drafter failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }
}

async fn run(cli: CliConfig, config: TomlConfig) -> Result<()> {
    config.validate()?;
    let catalog = config.catalog()?;
    let mut stdout = std::io::stdout();

    match cli.command {
        Command::Services { provider } => {
            let providers = match provider {
                Some(provider) => vec![provider],
                None => CloudProvider::ALL.to_vec(),
            };
            for provider in providers {
                render::render_services(&catalog, provider, None, &mut stdout)?;
            }
            Ok(())
        }
        Command::Prompt(selection) => {
            let request = selection.to_request()?;
            render::render_prompts(&build_generation_plan(&request), &mut stdout)
        }
        Command::Generate(args) => generate(args, &config, &mut stdout).await,
        Command::Refine(args) => refine(args, &config, &mut stdout).await,
        Command::Interactive(args) => interactive(args, &config, catalog).await,
    }
}

fn output_settings(output: Option<String>, zip: bool, config: &TomlConfig) -> Result<OutputSettings> {
    let path = output.unwrap_or_else(|| config.output.directory.clone());
    validation::validate_output_dir("output", &path)?;
    Ok(OutputSettings::new(path, zip || config.output.zip))
}

async fn generate(args: GenerateArgs, config: &TomlConfig, out: &mut dyn Write) -> Result<()> {
    let model = Arc::new(OpenAiClient::from_config(config)?);
    let request = args.selection.to_request()?;
    let output = output_settings(args.output, args.zip, config)?;

    tracing::info!(
        "Generating Terraform for {} on {} with {}",
        request.service,
        request.provider,
        config.model.model
    );
    let storage = LocalStorage::new(output.output_path.clone());
    let engine = DraftEngine::new(GenerationPipeline::new(request, storage, output, model));
    let report = engine.run().await?;

    if let DraftOutput::Bundle(bundle) = &report.output {
        render::render_bundle(bundle, out)?;
    }
    render::render_written(&report.written, out)?;
    writeln!(out, "✅ Terraform configuration generated successfully!")?;
    Ok(())
}

async fn refine(args: RefineArgs, config: &TomlConfig, out: &mut dyn Write) -> Result<()> {
    let model = Arc::new(OpenAiClient::from_config(config)?);
    validation::validate_text("feedback", &args.feedback)?;
    validation::validate_refine_files("file", &args.files)?;

    let reader = LocalStorage::new(".");
    let mut existing = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let data = reader.read_file(file).await?;
        let name = Path::new(file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file.as_str())
            .to_string();
        existing.push((name, String::from_utf8_lossy(&data).into_owned()));
    }

    let output = output_settings(args.output, false, config)?;
    let storage = LocalStorage::new(output.output_path.clone());
    let engine = DraftEngine::new(RefinementPipeline::new(
        args.feedback,
        combine_named(&existing),
        args.iteration,
        storage,
        output,
        model,
    ));
    let report = engine.run().await?;

    if let DraftOutput::Refined(refined) = &report.output {
        render::render_refined(refined, out)?;
    }
    render::render_written(&report.written, out)?;
    Ok(())
}

async fn interactive(
    args: InteractiveArgs,
    config: &TomlConfig,
    catalog: tf_drafter::ServiceCatalog,
) -> Result<()> {
    let model = Arc::new(OpenAiClient::from_config(config)?);
    let output = output_settings(args.output, args.zip, config)?;
    let storage = LocalStorage::new(output.output_path.clone());
    let mut session = Session::new(catalog, storage, output, model);

    let mut stdout = std::io::stdout();
    writeln!(stdout, "🚀 Terraform drafting session")?;
    writeln!(stdout, "{}", HELP)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(stdout, "{}/{}> ", session.provider(), session.service().unwrap_or("-"))?;
        stdout.flush()?;

        let Some(line) = lines.next_line().await.map_err(DraftError::from)? else {
            break;
        };
        if session.handle_line(&line, &mut stdout).await? == SessionControl::Quit {
            break;
        }
    }

    tracing::info!("Session ended after {} refinement(s)", session.refinement_iteration());
    Ok(())
}
