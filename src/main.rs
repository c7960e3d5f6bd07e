// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand};
use photobooth::config::BoothConfig;
use photobooth::constants::{APP_DIR_NAME, relay};
use photobooth::errors::AppResult;
use photobooth::relay::{RelayConfig, SmtpConfig, parse_address_list};
use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Three-shot photobooth with polaroid strips and email delivery")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Booth config file (default: ~/.config/photobooth/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the booth in the terminal (default)
    Booth(BoothArgs),

    /// List available cameras
    List,

    /// Compose a strip from up to three image files
    Compose {
        /// Images in slot order
        #[arg(required = true, num_args = 1..=3)]
        images: Vec<PathBuf>,

        /// Output file path (default: ~/Pictures/Photobooth/photostrip_TIMESTAMP.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Email an existing strip through the relay
    Send {
        /// Recipient address
        #[arg(short, long)]
        email: String,

        /// Strip image to attach
        strip: PathBuf,

        /// Relay base URL (default: from config)
        #[arg(long)]
        relay_url: Option<String>,
    },

    /// Run the mail relay service
    Relay(RelayArgs),
}

#[derive(Args, Default)]
struct BoothArgs {
    /// Camera index to use (from 'photobooth list')
    #[arg(short, long)]
    camera: Option<usize>,

    /// Use a generated test pattern instead of a camera
    #[arg(long)]
    synthetic: bool,

    /// Relay base URL
    #[arg(long)]
    relay_url: Option<String>,

    /// Directory for downloaded strips
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Custom template artwork
    #[arg(long)]
    template: Option<PathBuf>,
}

#[derive(Args)]
struct RelayArgs {
    /// Listen address
    #[arg(long, env = "RELAY_ADDR", default_value = relay::DEFAULT_ADDR)]
    addr: SocketAddr,

    /// SMTP server host
    #[arg(long, env = "SMTP_HOST")]
    smtp_host: Option<String>,

    /// SMTP server port
    #[arg(long, env = "SMTP_PORT", default_value_t = relay::DEFAULT_SMTP_PORT)]
    smtp_port: u16,

    /// "true" for implicit TLS, anything else for STARTTLS
    #[arg(long, env = "SMTP_SECURE", default_value = "false")]
    smtp_secure: String,

    /// SMTP login user
    #[arg(long, env = "SMTP_USER")]
    smtp_user: Option<String>,

    /// SMTP login password
    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    smtp_pass: Option<String>,

    /// Sender address (default: the SMTP user)
    #[arg(long, env = "SMTP_FROM")]
    smtp_from: Option<String>,

    /// Comma-separated CC addresses
    #[arg(long, env = "MAIL_CC", default_value = "")]
    mail_cc: String,

    /// Comma-separated BCC addresses
    #[arg(long, env = "MAIL_BCC", default_value = "")]
    mail_bcc: String,

    /// Mail subject
    #[arg(long, env = "MAIL_SUBJECT", default_value = relay::DEFAULT_SUBJECT)]
    subject: String,
}

impl From<RelayArgs> for RelayConfig {
    fn from(args: RelayArgs) -> Self {
        RelayConfig {
            addr: args.addr,
            smtp: SmtpConfig {
                host: args.smtp_host,
                port: args.smtp_port,
                secure: args.smtp_secure == "true",
                user: args.smtp_user,
                password: args.smtp_pass,
                from: args.smtp_from,
                cc: parse_address_list(&args.mail_cc),
                bcc: parse_address_list(&args.mail_bcc),
                subject: args.subject,
                ..SmtpConfig::default()
            },
        }
    }
}

fn env_filter() -> EnvFilter {
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_level(true)
        .init();
}

/// Log to a file so the terminal UI stays intact; falls back to no logging
/// when the file cannot be created
fn init_file_logging() -> Option<PathBuf> {
    let dir = dirs::state_dir()
        .or_else(dirs::cache_dir)?
        .join(APP_DIR_NAME);
    std::fs::create_dir_all(&dir).ok()?;
    let path = dir.join("booth.log");
    let file = File::options().create(true).append(true).open(&path).ok()?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Some(path)
}

fn load_config(path: Option<&PathBuf>) -> BoothConfig {
    match path {
        Some(path) => BoothConfig::load_from(path),
        None => BoothConfig::load(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Booth(BoothArgs::default()));

    if matches!(command, Commands::Booth(_)) {
        if let Some(path) = init_file_logging() {
            eprintln!("Logging to {}", path.display());
        }
    } else {
        init_logging();
    }

    let config = load_config(cli.config.as_ref());
    run(command, config)?;
    Ok(())
}

fn run(command: Commands, mut config: BoothConfig) -> AppResult<()> {
    match command {
        Commands::Booth(args) => {
            if let Some(camera) = args.camera {
                config.camera_index = camera;
            }
            if let Some(url) = args.relay_url {
                config.relay_url = url;
            }
            if let Some(dir) = args.output_dir {
                config.output_dir = Some(dir);
            }
            if let Some(template) = args.template {
                config.template_path = Some(template);
            }
            photobooth::terminal::run(config, args.synthetic)
        }
        Commands::List => cli::list_cameras(),
        Commands::Compose { images, output } => cli::compose(&images, output, &config),
        Commands::Send {
            email,
            strip,
            relay_url,
        } => {
            let relay_url = relay_url.unwrap_or_else(|| config.relay_url.clone());
            cli::send(&email, &strip, &relay_url, &config)
        }
        Commands::Relay(args) => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(photobooth::relay::serve(args.into()))?;
            Ok(())
        }
    }
}
