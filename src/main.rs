//! Model Studio CLI - chat, code and image generation over OpenRouter

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use model_studio::{
    api::OpenRouterClient,
    config::Config,
    registry::{Category, ModelRegistry},
    session::{JobState, SessionController, Studio, SubmitRejected},
    tui::InteractiveShell,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

#[derive(Parser)]
#[command(name = "model-studio")]
#[command(about = "Pick a hosted model and chat, generate code or create images")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Config file (default: platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// OpenRouter API key for this run (falls back to OPENROUTER_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available models
    Models,

    /// Send a single request and print the result
    Ask {
        /// Model id (default: configured model)
        #[arg(short, long)]
        model: Option<String>,

        /// Target language for code models
        #[arg(long)]
        language: Option<String>,

        /// Write the result to a file (downloads images)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Message, code request or image prompt
        input: String,
    },

    /// Interactive shell (default)
    Interactive,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Initialize configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Show {
        /// Print the built-in defaults instead
        #[arg(long)]
        defaults: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., studio.default_model, chat.include_history)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    match cli.command {
        Some(Commands::Models) => list_models(),
        Some(Commands::Ask {
            model,
            language,
            output,
            input,
        }) => {
            let config = Config::load_from(&config_path)?;
            run_ask(&config, cli.api_key, model, language, output, &input).await?;
        }
        Some(Commands::Interactive) | None => {
            let config = Config::load_from(&config_path)?;
            run_interactive(&config, cli.api_key).await?;
        }
        Some(Commands::Config(cmd)) => run_config_command(cmd, &config_path)?,
    }

    Ok(())
}

/// API key from the flag, then the environment. Never read from the config file.
fn resolve_api_key(flag: Option<String>) -> Option<String> {
    flag.or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|key| !key.trim().is_empty())
}

fn build_studio(config: &Config, api_key: Option<String>) -> Studio {
    let mut studio = Studio::from_config(config);
    if let Some(key) = resolve_api_key(api_key) {
        studio.set_credential(key);
    }
    studio
}

fn list_models() {
    let registry = ModelRegistry::new();
    for category in Category::all() {
        println!("{}:", category);
        for model in registry.by_category(category) {
            println!("  {:<24} {:<20} {}", model.id, model.display_name, model.description);
        }
        println!();
    }
}

async fn run_ask(
    config: &Config,
    api_key: Option<String>,
    model: Option<String>,
    language: Option<String>,
    output: Option<PathBuf>,
    input: &str,
) -> Result<()> {
    let mut studio = build_studio(config, api_key);
    if let Some(model) = model {
        studio.select_model(&model)?;
    }
    if let Some(language) = language {
        studio.set_language(&language)?;
    }
    let client = OpenRouterClient::new(config.timeout())?;

    info!(model = studio.selected_id(), "Sending one-shot request");
    let state = studio.submit(&client, input).await.map_err(|e| match e {
        SubmitRejected::MissingCredential => anyhow::anyhow!(
            "No API key set. Pass --api-key or export {}",
            API_KEY_ENV
        ),
        other => anyhow::anyhow!(other),
    })?;

    if state != JobState::Succeeded {
        let msg = studio.active_state().error().unwrap_or("Request failed");
        bail!("{}", msg);
    }

    match studio.category() {
        Category::Chat => {
            let reply = studio
                .chat()
                .transcript()
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            emit_text(&reply, output.as_deref())?;
            if let Some(usage) = studio.chat().last_usage() {
                info!(
                    prompt = usage.prompt_tokens,
                    completion = usage.completion_tokens,
                    "Token usage"
                );
            }
        }
        Category::Code => {
            let code = studio.code().result().map(|r| r.code.clone()).unwrap_or_default();
            emit_text(&code, output.as_deref())?;
        }
        Category::Image => {
            let url = studio.image().result().map(|r| r.url.clone()).unwrap_or_default();
            println!("{}", url);
            if let Some(path) = output {
                let bytes = client
                    .download(&url)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                tokio::fs::write(&path, bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Saved image to {}", path.display());
            }
        }
    }

    Ok(())
}

fn emit_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Saved to {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

async fn run_interactive(config: &Config, api_key: Option<String>) -> Result<()> {
    let studio = build_studio(config, api_key);
    let client = OpenRouterClient::new(config.timeout())?;
    let mut shell = InteractiveShell::new(studio, client);
    shell.run().await
}

fn run_config_command(cmd: ConfigCommands, path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => config_init(path, force)?,
        ConfigCommands::Show { defaults } => {
            if defaults {
                println!("{}", Config::example());
            } else {
                config_show(path)?;
            }
        }
        ConfigCommands::Set { key, value } => config_set(path, &key, &value)?,
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}

fn config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(path)?;

    println!("Configuration file created at: {}", path.display());
    println!();
    println!("The API key is never stored in this file. Provide it with:");
    println!("  export {}=your_openrouter_key", API_KEY_ENV);
    println!("or with /key inside the interactive shell.");

    Ok(())
}

fn config_show(path: &Path) -> Result<()> {
    let config = Config::load_from(path)?;
    println!("{}", toml::to_string_pretty(&config)?);

    println!("--- Environment Variables ---");
    for var in [API_KEY_ENV, "OPENROUTER_BASE_URL", "MODEL_STUDIO_MODEL"] {
        let status = if std::env::var(var).is_ok() { "set" } else { "not set" };
        println!("{}: {}", var, status);
    }

    Ok(())
}

fn config_set(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config = Config::read_file(path)?;
    config
        .set(key, value)
        .with_context(|| format!("Could not set {}", key))?;
    config.save_to(path)?;
    println!("Set {} = {}", key, value);
    Ok(())
}
