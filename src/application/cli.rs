#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendName;
use crate::domain::models::SessionOptions;
use crate::domain::services::format_model_list;
use crate::domain::services::help_text;
use crate::domain::services::ChatSession;
use crate::domain::services::ModelRegistry;
use crate::infrastructure::backends::BackendManager;

/// Everything the chat REPL needs to start.
pub struct Launch {
    pub config: Config,
    pub pick_model: bool,
    pub history: Option<path::PathBuf>,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = ConfigKey::ConfigFile.default_value();
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn print_models(config: &Config, json: bool) -> Result<()> {
    let backend = BackendManager::get(config);
    let models = ModelRegistry::new(Arc::new(backend)).list_models().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        println!("{}", format_model_list(&models, &config.model));
    }

    return Ok(());
}

/// Sends one message through a fresh session and returns the reply.
async fn ask(config: &Config, text: &str) -> Result<String> {
    let backend = BackendManager::get(config);
    let mut session = ChatSession::new(
        Arc::new(backend),
        SessionOptions {
            max_length: config.max_message_length,
            disabled: config.disabled,
            initial_messages: vec![],
        },
    );

    if let Err(err) = session.send(text, &config.model).await {
        bail!(err);
    }

    let state = session.snapshot();
    if let Some(err) = state.last_error {
        bail!(err);
    }

    return Ok(state
        .messages
        .last()
        .map(|reply| return reply.content.to_string())
        .unwrap_or_default());
}

fn subcommand_ask() -> Command {
    return Command::new("ask")
        .about("Sends a single message to the selected model and prints the reply.")
        .arg(
            Arg::new("message")
                .help("The message to send.")
                .num_args(1)
                .required(true),
        );
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start a new chat session. This is the default when no command is given.")
        .arg(
            Arg::new("pick-model")
                .long("pick-model")
                .help("Choose the model from a list before the chat starts.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("history")
                .long("history")
                .value_name("FILE")
                .num_args(1)
                .help("JSON file of messages to start the chat with instead of the greeting."),
        );
}

fn subcommand_models() -> Command {
    return Command::new("models")
        .about("Lists the models available for chat. Falls back to a built-in list when the service can't be reached.")
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the models as JSON.")
                .action(ArgAction::SetTrue),
        );
}

fn arg_config(key: ConfigKey, help: &str) -> Arg {
    let mut help = help.to_string();
    let default_value = key.default_value();
    if !default_value.is_empty() {
        help = format!("{help} [default: {default_value}]");
    }

    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(key.env_var())
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nBuilt: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_BUILD_TIMESTAMP")
    );

    return Command::new("aichatbox")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_ask())
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_models())
        .arg(
            arg_config(
                ConfigKey::Backend,
                "The chat service to send messages to.",
            )
            .short('b')
            .value_parser(PossibleValuesParser::new(BackendName::VARIANTS)),
        )
        .arg(
            arg_config(ConfigKey::Model, "The model to chat with at startup.").short('m'),
        )
        .arg(
            arg_config(
                ConfigKey::ConfigFile,
                "Path to configuration file",
            )
            .short('c'),
        )
        .arg(arg_config(
            ConfigKey::GraphqlURL,
            "GraphQL endpoint when using the graphql backend.",
        ))
        .arg(arg_config(
            ConfigKey::RestURL,
            "Base URL when using the rest backend.",
        ))
        .arg(arg_config(
            ConfigKey::RestToken,
            "Bearer token sent when using the rest backend.",
        ))
        .arg(
            arg_config(
                ConfigKey::MockMode,
                "Answer locally with simulated replies instead of calling any backend. Only `true` turns it on.",
            ),
        )
        .arg(arg_config(
            ConfigKey::MaxMessageLength,
            "Longest message, in characters, that can be sent.",
        ))
        .arg(
            arg_config(
                ConfigKey::Disabled,
                "Open the chat read-only. Messages can't be sent.",
            )
            .value_parser(PossibleValuesParser::new(["true", "false"])),
        )
        .arg(
            arg_config(
                ConfigKey::ShowTimestamps,
                "Show the time each message was sent.",
            )
            .value_parser(PossibleValuesParser::new(["true", "false"])),
        )
        .arg(arg_config(
            ConfigKey::Placeholder,
            "Hint shown in the input prompt.",
        ))
        .arg(arg_config(ConfigKey::AppName, "Name shown in the chat header."))
        .arg(arg_config(
            ConfigKey::AppVersion,
            "Version shown in the chat header.",
        ));
}

async fn load_config(matches: &ArgMatches, subcmd_matches: Option<&ArgMatches>) -> Result<Config> {
    let mut all_matches = vec![matches];
    if let Some(subcmd_matches) = subcmd_matches {
        all_matches.push(subcmd_matches);
    }

    return Config::load(build(), all_matches).await;
}

/// Handles every command that doesn't open a chat. Returns what the chat
/// needs when one should be started.
pub async fn parse() -> Result<Option<Launch>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("ask", subcmd_matches)) => {
            let config = load_config(&matches, Some(subcmd_matches)).await?;
            let text = subcmd_matches
                .get_one::<String>("message")
                .cloned()
                .unwrap_or_default();
            println!("{}", ask(&config, &text).await?);
            return Ok(None);
        }
        Some(("chat", subcmd_matches)) => {
            let config = load_config(&matches, Some(subcmd_matches)).await?;
            return Ok(Some(Launch {
                config,
                pick_model: subcmd_matches.get_flag("pick-model"),
                history: subcmd_matches
                    .get_one::<String>("history")
                    .map(path::PathBuf::from),
            }));
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", ConfigKey::ConfigFile.default_value());
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("models", subcmd_matches)) => {
            let config = load_config(&matches, Some(subcmd_matches)).await?;
            print_models(&config, subcmd_matches.get_flag("json")).await?;
            return Ok(None);
        }
        _ => {
            let config = load_config(&matches, None).await?;
            return Ok(Some(Launch {
                config,
                pick_model: false,
                history: None,
            }));
        }
    }
}
