mod logging;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context};
use chat_core::{error_code, ChatModel, ChatParams, Config, MODEL_CATALOG};
use clap::{Parser, Subcommand};
use colored::Colorize;
use spark_llm::{ChatSession, LLMError, SparkClient};

#[derive(Parser)]
#[command(name = "spark-chat")]
#[command(about = "Chat with Spark models from the terminal")]
#[command(version)]
struct Cli {
    /// Model to use, by catalog number (see `spark-chat models`)
    #[arg(long, short)]
    model: Option<usize>,

    /// Sampling temperature, in (0, 1]
    #[arg(long)]
    temperature: Option<f32>,

    /// Number of sampling candidates, in [1, 6]
    #[arg(long)]
    top_k: Option<u8>,

    /// Seconds to wait for a complete answer, 0 waits forever
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat
    Chat,
    /// Send a single question and print the answer
    Send {
        /// Question text
        message: String,
    },
    /// List available models
    Models,
}

/// Input line in interactive mode.
#[derive(Debug, PartialEq)]
enum ChatInput<'a> {
    Quit,
    Empty,
    Models,
    SwitchModel(Option<usize>),
    History,
    Clear,
    Help,
    Question(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return ChatInput::Quit;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Question(line);
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "models" => ChatInput::Models,
        "model" => ChatInput::SwitchModel(parts.next().and_then(|n| n.parse().ok())),
        "history" => ChatInput::History,
        "clear" => ChatInput::Clear,
        "quit" | "exit" => ChatInput::Quit,
        _ => ChatInput::Help,
    }
}

fn describe_error(err: &LLMError) -> String {
    match err {
        LLMError::Protocol { code, .. } => format!("Service error {}", error_code::render(*code)),
        LLMError::Timeout(limit) => format!("No complete answer within {}s", limit.as_secs()),
        LLMError::SessionBusy => "Still waiting for the previous answer".to_string(),
        other => other.to_string(),
    }
}

fn resolve_model(config: &Config) -> anyhow::Result<&'static ChatModel> {
    match config.model {
        Some(index) => ChatModel::by_index(index).ok_or_else(|| {
            anyhow!(
                "Unknown model {index}, choose 1-{} (see `spark-chat models`)",
                MODEL_CATALOG.len()
            )
        }),
        None => Ok(ChatModel::default_model()),
    }
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(model) = cli.model {
        config.model = Some(model);
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = temperature;
    }
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
}

fn build_session(config: &Config) -> anyhow::Result<ChatSession> {
    let client = SparkClient::from_config(config).context(
        "Spark credentials are required: set SPARK_APP_ID, SPARK_API_KEY and SPARK_API_SECRET \
         or add them to ~/.spark/config.json",
    )?;
    let session = ChatSession::new(Arc::new(client));
    Ok(match config.timeout() {
        Some(limit) => session.with_timeout(limit),
        None => session.without_timeout(),
    })
}

fn print_models(current: &ChatModel) {
    for (i, model) in MODEL_CATALOG.iter().enumerate() {
        let line = format!(
            "{}. {} ({}, {} tokens)",
            i + 1,
            model.name,
            model.domain,
            model.max_tokens
        );
        if model == current {
            println!("{} {}", "*".green(), line.green());
        } else {
            println!("  {}", line);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let mut config = Config::new();
    apply_cli_overrides(&mut config, &cli);
    log::debug!("Effective config: {:?}", config);

    let model = resolve_model(&config)?;

    match cli.command {
        Commands::Models => {
            print_models(model);
            Ok(())
        }
        Commands::Send { message } => {
            let params = config.params()?;
            let session = build_session(&config)?;
            send_message(&session, model, &params, &message).await
        }
        Commands::Chat => {
            let params = config.params()?;
            let session = build_session(&config)?;
            run_interactive_chat(&session, model, &params).await
        }
    }
}

async fn send_message(
    session: &ChatSession,
    model: &ChatModel,
    params: &ChatParams,
    message: &str,
) -> anyhow::Result<()> {
    let start = Instant::now();
    match session.ask(model, params, message).await {
        Ok(answer) => {
            log::debug!("Answer received in {:?}", start.elapsed());
            println!("{}", answer);
            Ok(())
        }
        Err(e) => Err(anyhow!(describe_error(&e))),
    }
}

async fn run_interactive_chat(
    session: &ChatSession,
    model: &'static ChatModel,
    params: &ChatParams,
) -> anyhow::Result<()> {
    let mut model = model;

    println!("{}", "Spark Chat".cyan().bold());
    println!("{}", format!("Model: {}", model.name).dimmed());
    println!(
        "{}",
        "Type /models, /model <n>, /history, /clear, or 'exit' to leave".dimmed()
    );
    println!();

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match parse_input(&input) {
            ChatInput::Quit => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            ChatInput::Empty => continue,
            ChatInput::Models => print_models(model),
            ChatInput::SwitchModel(index) => match index.and_then(ChatModel::by_index) {
                Some(next) => {
                    model = next;
                    println!("{}", format!("Switched to {}", model.name).dimmed());
                }
                None => println!(
                    "{}",
                    format!("Usage: /model <1-{}>", MODEL_CATALOG.len()).red()
                ),
            },
            ChatInput::History => {
                let history = session.history().await;
                if history.is_empty() {
                    println!("{}", "(empty)".dimmed());
                }
                for message in history.iter() {
                    println!("{} {}", format!("{}:", message.role).bold(), message.content);
                }
            }
            ChatInput::Clear => match session.clear_history().await {
                Ok(()) => println!("{}", "History cleared".dimmed()),
                Err(e) => println!("{}", describe_error(&e).red()),
            },
            ChatInput::Help => println!(
                "{}",
                "Commands: /models, /model <n>, /history, /clear, /quit".dimmed()
            ),
            ChatInput::Question(question) => {
                println!("{}", format!("{}:", model.name).green().bold());
                match session.ask(model, params, question).await {
                    Ok(answer) => println!("{}", answer),
                    Err(e) => println!("{}", describe_error(&e).red()),
                }
                println!();
            }
        }
    }

    Ok(())
}
