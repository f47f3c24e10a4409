// Duudl CLI - availability polls from the terminal

mod clipboard;
mod commands;
mod exit_codes;
mod logging;
mod tui;
mod util;
mod worker;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use duudl_client::ClientError;
use exit_codes::{client_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "duudl")]
#[command(about = "Answer availability polls from the terminal")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Poll service base URL (overrides the saved login and settings)
    #[arg(long, global = true, env = "DUUDL_SERVER")]
    server: Option<String>,

    /// Settings file (default: <config_dir>/duudl/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with the shared password and pick the participant you answer as
    #[command(after_help = "\
Examples:
  duudl login --participant 3
  DUUDL_PASSWORD=secret duudl --server https://duudl.example login --participant 3")]
    Login {
        /// Shared service password (prompted when omitted)
        #[arg(long, env = "DUUDL_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Participant id to act as
        #[arg(long)]
        participant: i64,
    },

    /// Forget the saved login
    Logout,

    /// Print a poll's grid
    Show {
        /// Poll token (the last part of the share link)
        token: String,

        /// Table only, no summary line
        #[arg(long, conflicts_with = "json")]
        plain: bool,

        /// Full poll state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Advance your answer for a day: unset, yes, no, inconvenient, unset
    Toggle {
        token: String,
        /// Day as YYYY-MM-DD
        day: String,
    },

    /// Set your comment for a day (empty text clears it)
    Comment {
        token: String,
        /// Day as YYYY-MM-DD
        day: String,
        text: String,
    },

    /// Set any participant's answer (organizer override)
    #[command(name = "admin-set")]
    AdminSet {
        token: String,

        /// Participant whose answer to set
        #[arg(long)]
        participant: i64,

        /// Day as YYYY-MM-DD
        day: String,

        /// yes, no, inconvenient or unset
        value: String,
    },

    /// List the polls on the service
    List {
        /// Tokens and titles as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a poll and print its share link
    #[command(after_help = "\
Examples:
  duudl create --title \"Sykkeltur\" 2026-02-03 2026-02-04")]
    Create {
        /// Poll title
        #[arg(long)]
        title: String,

        /// Longer description shown under the title
        #[arg(long, default_value = "")]
        description: String,

        /// Days as YYYY-MM-DD
        #[arg(required = true)]
        days: Vec<String>,
    },

    /// Delete a poll and all its answers
    Delete {
        token: String,
    },

    /// Print the share link for a poll
    Link {
        token: String,

        /// Also copy it to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Open the interactive grid
    Open {
        token: String,

        /// Interaction mode (default from settings)
        #[arg(long, value_enum)]
        input: Option<InputArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum InputArg {
    Auto,
    Pointer,
    Touch,
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The interactive grid owns the terminal, so its logs go to a file.
    if matches!(cli.command, Commands::Open { .. }) {
        let path = logging::log_file_path();
        if let Err(e) = logging::init_file(&path) {
            eprintln!("warning: logging disabled: {}", e);
        }
    } else {
        logging::init_stderr();
    }

    let ctx = commands::Context::new(cli.server, cli.config);

    let result = match cli.command {
        Commands::Login { password, participant } => commands::cmd_login(&ctx, password, participant),
        Commands::Logout => commands::cmd_logout(),
        Commands::Show { token, plain, json } => commands::cmd_show(&ctx, &token, plain, json),
        Commands::Toggle { token, day } => commands::cmd_toggle(&ctx, &token, &day),
        Commands::Comment { token, day, text } => commands::cmd_comment(&ctx, &token, &day, &text),
        Commands::AdminSet { token, participant, day, value } => {
            commands::cmd_admin_set(&ctx, &token, participant, &day, &value)
        }
        Commands::List { json } => commands::cmd_list(&ctx, json),
        Commands::Create { title, description, days } => {
            commands::cmd_create(&ctx, &title, &description, &days)
        }
        Commands::Delete { token } => commands::cmd_delete(&ctx, &token),
        Commands::Link { token, copy } => commands::cmd_link(&ctx, &token, copy),
        Commands::Open { token, input } => {
            let input = input.map(|i| match i {
                InputArg::Auto => duudl_config::InputModeSetting::Auto,
                InputArg::Pointer => duudl_config::InputModeSetting::Pointer,
                InputArg::Touch => duudl_config::InputModeSetting::Touch,
            });
            commands::cmd_open(&ctx, &token, input)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        let hint = match &err {
            ClientError::NotFound(_) => Some("check the poll token (the part after /d/ in the share link)".to_string()),
            ClientError::Network(_) => Some("is the poll service running? see --server".to_string()),
            _ => None,
        };
        Self { code: client_exit_code(&err), message: err.to_string(), hint }
    }
}
