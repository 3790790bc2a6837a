mod completion;
mod dispatch;
mod render;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gamever_core::{ErrorKind, GameverError};
use tracing_subscriber::EnvFilter;

use crate::completion::CliCompletionShell;
use crate::dispatch::run_cli;

const LOG_ENV: &str = "GAMEVER_LOG";

#[derive(Parser, Debug)]
#[command(name = "gamever")]
#[command(about = "Install, select and launch versions of first-go-game", long_about = None)]
struct Cli {
    /// Release API root, for mirrors and testing.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Overrides the settings directory (also read from GAMEVER_CONFIG_DIR).
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List releases published upstream.
    Releases,
    /// Download a release into the local store.
    Install {
        release: String,
        /// Local name for the installed copy; defaults to the release name.
        #[arg(long)]
        name: Option<String>,
    },
    /// List installed versions.
    List {
        /// Also show interrupted installs.
        #[arg(long)]
        all: bool,
    },
    Select {
        name: String,
    },
    Rename {
        old: String,
        new: String,
    },
    Delete {
        name: String,
        #[arg(long)]
        yes: bool,
    },
    /// Run the selected version.
    Launch {
        #[arg(long)]
        mode: Option<String>,
        #[arg(long = "arg")]
        argument: Option<String>,
    },
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print selection changes until Enter is pressed.
    Watch,
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    Show,
    SetDownloadDir { path: PathBuf },
    ResetDownloadDir,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = error_kind(&err);
            match kind {
                Some(kind) => eprintln!("error ({}): {err:#}", kind.as_str()),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::from(exit_code_for(kind))
        }
    }
}

fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<GameverError>())
        .map(GameverError::kind)
}

fn exit_code_for(kind: Option<ErrorKind>) -> u8 {
    match kind {
        None => 1,
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::Network) => 3,
        Some(ErrorKind::Io) => 4,
        Some(ErrorKind::Conflict) => 5,
        Some(ErrorKind::NotFound) => 6,
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
