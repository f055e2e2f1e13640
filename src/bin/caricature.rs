//! CLI for turning a photo into a caricature.

use anyhow::Context;
use caricature::{
    make_caricature, InputFidelity, OpenAiEditProvider, OpenAiEditProviderBuilder, OutputSize,
    DEFAULT_INPUT, DEFAULT_OUTPUT,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "caricature")]
#[command(about = "Turn a portrait photo into a colored-pencil caricature (OpenAI image edits)")]
#[command(version)]
struct Cli {
    /// Input photo (any format the image decoder supports)
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Output size as WxH
    #[arg(short, long, default_value = "1024x1024")]
    size: OutputSize,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// How closely to preserve the input likeness
    #[arg(long, value_enum, default_value = "high")]
    fidelity: FidelityArg,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FidelityArg {
    High,
    Low,
}

impl From<FidelityArg> for InputFidelity {
    fn from(arg: FidelityArg) -> Self {
        match arg {
            FidelityArg::High => InputFidelity::High,
            FidelityArg::Low => InputFidelity::Low,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Loaded first so RUST_LOG may come from .env as well.
    let dotenv = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(_) => tracing::debug!("no .env file found, using process environment"),
    }

    let cli = Cli::parse();
    let json_output = cli.json;

    match run(cli, OpenAiEditProviderBuilder::from_env()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "caricature generation failed");
            if json_output {
                let result = serde_json::json!({ "success": false, "error": format!("{e:#}") });
                println!("{result}");
            } else {
                eprintln!("Failed to create caricature: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn build_provider(
    cli: &Cli,
    builder: OpenAiEditProviderBuilder,
) -> anyhow::Result<OpenAiEditProvider> {
    let mut builder = builder.input_fidelity(cli.fidelity.into());
    if let Some(model) = &cli.model {
        builder = builder.model(model);
    }
    if let Some(secs) = cli.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

async fn run(cli: Cli, builder: OpenAiEditProviderBuilder) -> anyhow::Result<()> {
    // Fail on a missing key before touching the input.
    let provider =
        build_provider(&cli, builder).context("failed to configure the OpenAI client")?;

    let path = make_caricature(&provider, &cli.input, &cli.output, cli.size)
        .await
        .with_context(|| format!("failed to caricature {}", cli.input.display()))?;

    if cli.json {
        let result = serde_json::json!({
            "success": true,
            "input": cli.input.display().to_string(),
            "output": path.display().to_string(),
            "size": cli.size.to_string(),
            "model": provider.model(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Caricature created: {}", path.display());
    }

    Ok(())
}
