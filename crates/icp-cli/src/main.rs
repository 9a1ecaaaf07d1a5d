use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use icp_core::session::Difficulty;

mod bootstrap;
mod commands;
mod logging;
mod repl;
mod terminal;

use bootstrap::{AppBootstrap, BootstrapOptions};

#[derive(Parser)]
#[command(name = "icp")]
#[command(about = "Interview Coach Prep - practice interviews from the terminal", long_about = None)]
struct Cli {
    /// Directory holding settings.toml and client_state.toml
    #[arg(long, global = true, env = "ICP_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Backend base URL (overrides settings.toml and ICP_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keep client state in memory; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true, env = "ICP_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Show log output on the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interview, or continue the unfinished one
    Interview {
        /// Beginner, Intermediate or Advanced
        #[arg(short, long, default_value = "Intermediate")]
        difficulty: Difficulty,

        /// Number of questions (the server may clamp it)
        #[arg(short, long)]
        questions: Option<u32>,

        /// Role to tailor the questions to, instead of the stored profile
        #[arg(long)]
        job_title: Option<String>,
    },
    /// Continue the unfinished interview
    Resume,
    /// Show how many interviews are left today
    Limits,
    /// Sign in with a bearer token issued by the web app
    Login {
        token: String,
    },
    /// Sign out and remove all local data
    Logout,
    /// Show account, cached session and preferences
    Status,
    /// Store the resume analysis used to tailor questions
    Profile {
        #[arg(long)]
        job_title: Option<String>,

        /// JSON file with the resume analysis
        #[arg(long)]
        feedback_file: Option<PathBuf>,

        /// Remove the stored profile
        #[arg(long, conflicts_with_all = ["job_title", "feedback_file"])]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.log_dir.as_deref(), cli.verbose)?;

    let app = AppBootstrap::new(BootstrapOptions {
        config_dir: cli.config_dir,
        api_url: cli.api_url,
        ephemeral: cli.ephemeral,
    })
    .await?;

    match cli.command {
        Commands::Interview {
            difficulty,
            questions,
            job_title,
        } => commands::interview::start(&app, difficulty, questions, job_title).await?,
        Commands::Resume => commands::interview::resume(&app).await?,
        Commands::Limits => commands::account::limits(&app).await?,
        Commands::Login { token } => commands::account::login(&app, &token).await?,
        Commands::Logout => commands::account::logout(&app).await?,
        Commands::Status => commands::account::status(&app).await?,
        Commands::Profile {
            job_title,
            feedback_file,
            clear,
        } => commands::profile::update(&app, job_title, feedback_file.as_deref(), clear).await?,
    }

    Ok(())
}
