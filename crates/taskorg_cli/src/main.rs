//! Command-line front end for the task organizer store.
//!
//! Each subcommand is dispatched through the same request router an HTTP
//! transport would use, and the response body is printed to stdout.

use clap::{Parser, Subcommand};
use log::error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use taskorg_api::{ApiConfig, ApiRequest, ApiResponse, Method, TaskOrgApi};

#[derive(Parser, Debug)]
#[command(
    name = "taskorg",
    version,
    about = "taskorg: category and group task store",
    long_about = None
)]
struct Cli {
    /// SQLite database path (overrides TASKORG_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides TASKORG_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log directory; logs go to stderr when unset (overrides TASKORG_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report liveness.
    Health,
    /// Print the full snapshot.
    Show,
    /// Replace the whole collection with a JSON snapshot.
    #[command(
        after_help = "EXAMPLES:\n    taskorg replace snapshot.json\n    echo '{\"standard\":[],\"groups\":[]}' | taskorg replace"
    )]
    Replace {
        /// Snapshot file, or `-` for stdin.
        #[arg(default_value = "-")]
        file: String,
    },
    /// Delete every category, group and task.
    Clear,
}

impl Cli {
    fn config(&self) -> ApiConfig {
        let mut config = ApiConfig::from_env();
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();

    if let Err(err) = taskorg_core::init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("taskorg: logging disabled: {err}");
    }

    let request = match build_request(&cli.command) {
        Ok(request) => request,
        Err(err) => {
            error!("event=cli_input module=cli status=error error={}", err);
            eprintln!("taskorg: failed to read snapshot: {err}");
            return ExitCode::FAILURE;
        }
    };

    let response = TaskOrgApi::new(config).dispatch(&request);
    report(&response)
}

fn build_request(command: &Commands) -> io::Result<ApiRequest> {
    let request = match command {
        Commands::Health => ApiRequest::new(Method::Get, "/health"),
        Commands::Show => ApiRequest::new(Method::Get, "/data"),
        Commands::Replace { file } => {
            ApiRequest::new(Method::Put, "/data").with_body(read_input(file)?)
        }
        Commands::Clear => ApiRequest::new(Method::Delete, "/data"),
    };
    Ok(request)
}

fn read_input(file: &str) -> io::Result<String> {
    if file == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        fs::read_to_string(file)
    }
}

fn report(response: &ApiResponse) -> ExitCode {
    if let Some(body) = &response.body {
        if response.is_success() {
            println!("{body}");
        } else {
            eprintln!("{body}");
        }
    }
    if response.status >= 400 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
