use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
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
use crate::domain::services::help_text;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if !config_file_path.parent().unwrap().exists() {
        fs::create_dir_all(config_file_path.parent().unwrap()).await?;
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    let config_path_display = config_file_path.as_os_str().to_str().unwrap();
    println!("Created default config file at {config_path_display}");
    return Ok(());
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

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Medley")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Medley with environment variable RUST_LOG=medley")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_user_id() -> Arg {
    return Arg::new(ConfigKey::UserID.to_string())
        .short('u')
        .long(ConfigKey::UserID.to_string())
        .env("MEDLEY_USER_ID")
        .num_args(1)
        .help("The user id owning the question history in the realtime store.");
}

fn arg_models() -> Arg {
    return Arg::new(ConfigKey::Models.to_string())
        .short('m')
        .long(ConfigKey::Models.to_string())
        .env("MEDLEY_MODELS")
        .num_args(1)
        .help(format!(
            "Comma separated list of model keys to send prompts to. [default: {}]",
            Config::default(ConfigKey::Models)
        ));
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start chatting with every configured model at once.")
        .arg(arg_user_id())
        .arg(arg_models());
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
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
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("medley")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(arg_user_id())
        .arg(arg_models())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("MEDLEY_CONFIG_FILE")
                .num_args(1)
                .help(format!(
                    "Path to configuration file [default: {}]",
                    Config::default(ConfigKey::ConfigFile)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ServiceURL.to_string())
                .long(ConfigKey::ServiceURL.to_string())
                .env("MEDLEY_SERVICE_URL")
                .num_args(1)
                .help(format!(
                    "URL of the service that fans prompts out to models and judges answers. [default: {}]",
                    Config::default(ConfigKey::ServiceURL)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StoreURL.to_string())
                .long(ConfigKey::StoreURL.to_string())
                .env("MEDLEY_STORE_URL")
                .num_args(1)
                .help(format!(
                    "URL of the realtime store holding question history and responses. [default: {}]",
                    Config::default(ConfigKey::StoreURL)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::AuthToken.to_string())
                .long(ConfigKey::AuthToken.to_string())
                .env("MEDLEY_AUTH_TOKEN")
                .num_args(1)
                .help("Bearer token passed to the analysis endpoint and realtime store reads.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("MEDLEY_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!(
                    "Time to wait in milliseconds before giving up on one-shot requests. [default: {}]",
                    Config::default(ConfigKey::RequestTimeout)
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::WatchLimit.to_string())
                .long(ConfigKey::WatchLimit.to_string())
                .env("MEDLEY_WATCH_LIMIT")
                .num_args(1)
                .help(format!(
                    "Maximum number of messages watched for live updates at once. [default: {}]",
                    Config::default(ConfigKey::WatchLimit)
                ))
                .global(true),
        );
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = dirs::cache_dir().unwrap().join("medley/debug.log");
                    println!("{}", log_path.to_str().unwrap());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
