use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use lectern::auth::{CredentialCache, SignIn};
use lectern::catalog::VideoId;
use lectern::config::Overrides;
use lectern::config::progress::LearningRecords;
use lectern::{AppState, Config, app};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    remote: Remote,

    #[command(subcommand)]
    command: Commands,
}

/// Per-invocation overrides of the saved configuration
#[derive(Args)]
struct Remote {
    /// Project holding the catalog
    #[arg(long, global = true, env = "LECTERN_PROJECT_ID")]
    project_id: Option<String>,

    /// Web API key of the project
    #[arg(long, global = true, env = "LECTERN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Firestore emulator host:port
    #[arg(long, global = true, env = "FIRESTORE_EMULATOR_HOST")]
    firestore_emulator: Option<String>,

    /// Auth emulator host:port
    #[arg(long, global = true, env = "FIREBASE_AUTH_EMULATOR_HOST")]
    auth_emulator: Option<String>,
}

impl From<Remote> for Overrides {
    fn from(remote: Remote) -> Self {
        Overrides {
            project_id: remote.project_id,
            api_key: remote.api_key,
            firestore_emulator: remote.firestore_emulator,
            auth_emulator: remote.auth_emulator,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List videos with your progress
    Catalog {
        /// Only show videos whose title or description contains this text
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Show a video and take its quiz
    Watch {
        /// Identifier of the video
        video_id: String,
    },
    /// Show locally stored quiz results
    Progress,
    /// Sign in and manage videos and quizzes
    Admin {
        /// Account email; omit to resume the saved session
        #[arg(short, long)]
        email: Option<String>,

        /// Account password; prompted for when not set
        #[arg(long, env = "LECTERN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the saved admin session
    SignOut,
    /// Show or update the saved configuration
    Config {
        /// Write the given --project-id, --api-key and emulator settings to disk
        #[arg(long)]
        save: bool,
    },
}

fn sign_in_request(email: Option<String>, password: Option<String>) -> Result<SignIn> {
    let Some(email) = email else {
        return Ok(SignIn::RefreshToken(CredentialCache::refresh_token()?));
    };

    let password = match password {
        Some(password) => password,
        None => {
            eprint!("Password for {}: ", email);
            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        bail!("A password is required to sign in");
    }
    Ok(SignIn::Password { email, password })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectern=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Config { save } => {
            config.merge(cli.remote.into());
            if save {
                config.save()?;
                println!("Saved {}", Config::config_path()?.display());
            }
            println!("project_id:         {}", config.project_id);
            println!(
                "api_key:            {}",
                if config.api_key.is_empty() { "(not set)" } else { "(set)" }
            );
            println!("firestore_emulator: {}", config.firestore_emulator.as_deref().unwrap_or("-"));
            println!("auth_emulator:      {}", config.auth_emulator.as_deref().unwrap_or("-"));
        }
        Commands::Progress => app::run_progress(&LearningRecords::load()),
        Commands::SignOut => {
            CredentialCache::clear()?;
            println!("Signed out.");
        }
        command => {
            config.merge(cli.remote.into());
            let mut state = AppState::connect(config)?;

            match command {
                Commands::Catalog { search } => app::run_catalog(&state, &search).await?,
                Commands::Watch { video_id } => app::run_watch(&mut state, &VideoId::new(video_id)).await?,
                Commands::Admin { email, password } => {
                    let request = sign_in_request(email, password)?;
                    app::run_admin(&mut state, request).await?;
                }
                Commands::Config { .. } | Commands::Progress | Commands::SignOut => {}
            }
        }
    }

    Ok(())
}
