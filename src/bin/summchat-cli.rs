//! `summchat-cli` — terminal chat client for a running summchat server.
//!
//! History is kept in `{work_dir}/chat_history.json` and replayed on start;
//! logs go to `{work_dir}/summchat-cli.log`.
//!
//! # Usage
//!
//! ```text
//! summchat-cli [OPTIONS]
//!
//! Commands (typed at the prompt):
//!   /clear         clear the chat history (asks for confirmation)
//!   /model <key>   switch model
//!   /models        list the models the server has loaded
//!   /help          show commands
//!   /quit          exit
//!
//! A line ending in `\` continues on the next line; start a message with
//! `//` to send text that begins with a slash.
//! ```

use std::io::Write as _;
use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use summchat::chat::session::Turn;
use summchat::chat::{ChatSession, GenerateClient, HistoryStore};
use summchat::error::AppError;
use summchat::logger::LogTarget;
use summchat::{config, logger};

type Input = Lines<BufReader<Stdin>>;

/// Client log file, under `work_dir`.
const LOG_FILE: &str = "summchat-cli.log";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let config = config::load(args.config_path.as_deref())?;

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    let log_file = config.work_dir.join(LOG_FILE);
    logger::init(effective_log_level, args.log_level.is_some(), &LogTarget::File(log_file))?;

    let server_url = args.server.unwrap_or_else(|| config.client.server_url.clone());
    let history_path = args.history.unwrap_or_else(|| config.client.history_file.clone());
    let model = args.model.unwrap_or_else(|| config.client_model().to_string());

    info!(%server_url, history = %history_path.display(), %model, "client starting");

    let history = HistoryStore::open(history_path);
    let client = GenerateClient::new(server_url, config.client.timeout_seconds)?;
    let mut session = ChatSession::new(history, client, model, std::io::stdout());

    println!("─────────────────────────────────────────────");
    println!(" summchat  ({})  /help for commands, Ctrl-C to quit", session.client().base_url());
    println!("─────────────────────────────────────────────");
    session.load()?;

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrlc_token.cancel();
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt(&format!("[{}] > ", session.model()));

        let input = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            input = read_message(&mut lines) => input,
        };
        let input = match input {
            Ok(Some(input)) => input,
            Ok(None) => {
                debug!("stdin closed");
                break;
            }
            Err(e) => {
                warn!("stdin read error: {e}");
                break;
            }
        };

        let message = match classify(&input) {
            Line::Command(command) => {
                match run_command(command, &mut session, &mut lines).await? {
                    Flow::Continue => continue,
                    Flow::Quit => break,
                }
            }
            Line::Message(message) => message,
        };

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            turn = session.send(message) => match turn {
                Ok(Some(Turn::Failed(error))) => debug!(%error, "turn failed"),
                Ok(_) => {}
                // History write failures are reported like a failed request.
                Err(e) => {
                    warn!(error = %e, "turn could not be completed");
                    println!("Error: {e}");
                }
            },
        }
    }

    println!();
    info!("client exiting");
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

/// What one input line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// `/name args`, without the slash.
    Command(&'a str),
    Message(&'a str),
}

/// `/…` is a command; `//…` sends the text with one leading slash removed.
fn classify(input: &str) -> Line<'_> {
    let trimmed = input.trim();
    if trimmed.starts_with("//") {
        Line::Message(&trimmed[1..])
    } else if let Some(command) = trimmed.strip_prefix('/') {
        Line::Command(command)
    } else {
        Line::Message(trimmed)
    }
}

async fn run_command(
    command: &str,
    session: &mut ChatSession<std::io::Stdout>,
    lines: &mut Input,
) -> Result<Flow, AppError> {
    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "quit" | "exit" => return Ok(Flow::Quit),
        "help" => print_commands(),
        "clear" => {
            prompt("Are you sure you want to clear all chat history? This action cannot be undone. [y/N] ");
            let answer = lines.next_line().await?.unwrap_or_default();
            if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                if let Err(e) = session.clear() {
                    warn!(error = %e, "clearing history failed");
                    println!("Error: {e}");
                }
            } else {
                println!("cancelled");
            }
        }
        "models" => match session.client().models().await {
            Ok(list) => {
                for m in &list.models {
                    let mark = if *m == list.default { " (default)" } else { "" };
                    let current = if m == session.model() { "* " } else { "  " };
                    println!("{current}{m}{mark}");
                }
            }
            Err(e) => println!("Error: {e}"),
        },
        "model" => match parts.next() {
            None => println!("current model: {}", session.model()),
            Some(key) => {
                match session.client().models().await {
                    Ok(list) if !list.models.iter().any(|m| m == key) => {
                        println!("unknown model '{key}'; available: {}", list.models.join(", "));
                        return Ok(Flow::Continue);
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "could not verify model with server"),
                }
                session.set_model(key);
                println!("model set to {key}");
            }
        },
        other => println!("unknown command '/{other}' — try /help"),
    }
    Ok(Flow::Continue)
}

/// Read one message; a trailing `\` joins the next line with a newline.
async fn read_message(lines: &mut Input) -> std::io::Result<Option<String>> {
    let mut message = String::new();
    loop {
        let Some(line) = lines.next_line().await? else {
            return Ok(if message.is_empty() { None } else { Some(message) });
        };
        match line.strip_suffix('\\') {
            Some(head) => {
                message.push_str(head);
                message.push('\n');
                prompt("… ");
            }
            None => {
                message.push_str(&line);
                return Ok(Some(message));
            }
        }
    }
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

fn print_commands() {
    println!("commands:");
    println!("  /clear         clear the chat history");
    println!("  /model <key>   switch model (no key: show current)");
    println!("  /models        list models loaded on the server");
    println!("  /help          show this help");
    println!("  /quit          exit");
    println!("end a line with \\ to continue the message on the next line");
    println!("start with // to send a message that begins with /");
}

// ── CLI arg parsing ────────────────────────────────────────────────────────

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    server: Option<String>,
    model: Option<String>,
    history: Option<PathBuf>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut server = None;
    let mut model = None;
    let mut history = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        let mut value = |name: &str| {
            iter.next().unwrap_or_else(|| {
                eprintln!("error: {name} requires an argument");
                std::process::exit(1);
            })
        };

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: summchat-cli [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: config/default.toml)");
                println!("  -s, --server <URL>         Server base URL (overrides [client] server_url)");
                println!("  -m, --model <KEY>          Model key to start with");
                println!("      --history <PATH>       History file (default: {{work_dir}}/chat_history.json)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                println!();
                print_commands();
                std::process::exit(0);
            }
            "-f" | "--config" => config_path = Some(value("-f/--config")),
            "-s" | "--server" => server = Some(value("-s/--server")),
            "-m" | "--model" => model = Some(value("-m/--model")),
            "--history" => history = Some(config::expand_home(&value("--history"))),
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => {}
        }
    }

    CliArgs { log_level: logger::level_for_verbosity(verbosity), config_path, server, model, history }
}
