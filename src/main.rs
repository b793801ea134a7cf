use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use websolute::events::Role;
use websolute::{
    logging, prompts, store, tui, AssistantGateway, Config, ConversationController, ConversationStore, Message,
    RejectReason, Submission,
};

#[derive(Parser)]
#[command(name = "websolute")]
#[command(version)]
#[command(about = "Chat with the WEBSOLUTE AI crypto market assistant", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.websolute/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the model identifier
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Send one message and print the conversation
    Ask { text: String },
    /// Write a default config file
    Init,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_from(&path)?;
    if let Some(model) = &cli.model {
        config.gateway.model = model.clone();
    }
    Ok(config)
}

fn build_controller(config: &Config) -> Result<ConversationController> {
    if !config.has_api_key() {
        warn!(env = %config.gateway.api_key_env, "no API key configured, requests will fail");
    }
    let gateway = AssistantGateway::gemini(config).context("Failed to create assistant gateway")?;
    Ok(ConversationController::new(ConversationStore::shared(), Arc::new(gateway)))
}

fn print_message(message: &Message) {
    let author = match message.role {
        Role::User => "You",
        Role::Model => prompts::APP_TITLE,
    };
    if message.is_report {
        println!("[{}] {} · {}", message.timestamp, author, prompts::REPORT_TITLE);
    } else {
        println!("[{}] {}", message.timestamp, author);
    }
    for line in message.text.lines() {
        println!("  {}", line);
    }
    println!();
}

async fn ask(config: &Config, text: &str) -> Result<()> {
    let controller = build_controller(config)?;

    match controller.submit(text) {
        Submission::Rejected(RejectReason::EmptyInput) => bail!("Message must not be empty"),
        Submission::Rejected(RejectReason::Pending) => bail!("Another request is still pending"),
        accepted => accepted.finished().await,
    }

    for message in store::lock(controller.store()).messages() {
        print_message(message);
    }
    Ok(())
}

fn init(cli: &Cli) -> Result<()> {
    let path = cli.config.clone().unwrap_or_else(Config::default_path);
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }

    Config::default().save_to(&path)?;
    println!("Wrote default config to {}", path.display());
    println!("Set GEMINI_API_KEY or add api_key to the file before chatting.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None | Some(Commands::Chat) => {
            let config = load_config(&cli)?;
            logging::init_file(&config.log_file)?;
            let controller = build_controller(&config)?;
            tui::run(controller, config.ui.clone()).await
        }
        Some(Commands::Ask { text }) => {
            logging::init_stderr()?;
            let config = load_config(&cli)?;
            ask(&config, text).await
        }
        Some(Commands::Init) => init(&cli),
    }
}
