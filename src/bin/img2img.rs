//! CLI for img2img - edit a local image with a hosted Foundry model.

use clap::{Parser, ValueEnum};
use img2img::{
    materialize, EditClientBuilder, EditError, EditModel, EditRequest, EnvResolver,
    FoundryConfig, InputResolver, InteractiveResolver, RunOverrides,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "img2img")]
#[command(about = "Edit a local image with a hosted AI Foundry model (gpt or flux)")]
#[command(version)]
struct Cli {
    /// Model to use
    #[arg(short, long, value_enum)]
    model: Option<ModelArg>,

    /// Path to the input image
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Edit instruction
    #[arg(short, long)]
    prompt: Option<String>,

    /// Directory generated images are written to
    #[arg(long, default_value = "generated")]
    output_dir: PathBuf,

    /// Resolve inputs from flags and environment only, never prompting
    #[arg(long)]
    non_interactive: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Gpt,
    Flux,
}

impl From<ModelArg> for EditModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Gpt => EditModel::Gpt,
            ModelArg::Flux => EditModel::Flux,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env file just means the system environment is used as-is.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => Ok(()),
        Err(EditError::Aborted) => {
            println!("Aborted by user.");
            Ok(())
        }
        Err(err) if err.is_fatal() => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
        Err(err) => {
            // Diagnostics only; the run ends normally.
            eprintln!("error: {err}");
            if let Some(raw) = err.raw_response() {
                eprintln!("{raw}");
            }
            Ok(())
        }
    }
}

async fn run(cli: Cli) -> img2img::Result<()> {
    let config = FoundryConfig::from_env();

    let overrides = RunOverrides {
        model: cli.model.map(Into::into),
        image: cli.image,
        prompt: cli.prompt,
    };
    let plan = if cli.non_interactive {
        EnvResolver::new(overrides).resolve(&config)?
    } else {
        InteractiveResolver::new(overrides).resolve(&config)?
    };

    let client = EditClientBuilder::from_config(&config).build()?;
    println!("Using {} model.", client.deployment_for(plan.model)?);

    let request = EditRequest::from_file(&plan.prompt, &plan.image_path)?;

    println!(
        "Sending request for image {} with prompt: {} ...",
        plan.image_path.display(),
        plan.prompt
    );
    let outcome = client.submit(plan.model, &request).await?;
    println!("Request completed in {:.3}s", outcome.elapsed.as_secs_f64());

    let artifacts = materialize(&outcome.raw, plan.model, &plan.prompt, &cli.output_dir)?;

    if cli.json {
        let result = serde_json::json!({
            "success": true,
            "model": plan.model.to_string(),
            "deployment": outcome.deployment,
            "elapsed_ms": outcome.elapsed.as_millis() as u64,
            "outputs": artifacts
                .iter()
                .map(|a| a.path.display().to_string())
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for artifact in &artifacts {
            println!("Image saved to: '{}'", artifact.path.display());
        }
    }

    Ok(())
}
