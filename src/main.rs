//! pdfnav - inspect link destinations and navigation URIs of PDF documents
//!
//! Documents are read in their JSON object form.

mod commands;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pdflink::config::PlatformProfile;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "pdfnav")]
#[command(author, version, about = "Resolve PDF links and navigation URIs", long_about = None)]
struct Cli {
    /// Settings file to use instead of the per-user one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path conventions for file links
    #[arg(short, long, global = true, value_enum)]
    platform: Option<Platform>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the links of a document
    Links {
        file: PathBuf,
        /// Only this page (1-indexed)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
    },
    /// Resolve a named destination
    Decode {
        file: PathBuf,
        name: String,
        /// Print the decoded destination as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rewrite navigation URIs in canonical form
    Normalize {
        #[arg(required = true)]
        uris: Vec<String>,
    },
    /// List embedded files
    Files {
        file: PathBuf,
        /// Extract the files into this directory
        #[arg(short = 'E', long)]
        extract: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Platform {
    Posix,
    Windows,
}

impl From<Platform> for PlatformProfile {
    fn from(p: Platform) -> Self {
        match p {
            Platform::Posix => Self::Posix,
            Platform::Windows => Self::Windows,
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> Result<()> {
    human_panic::setup_panic!();
    init_tracing();

    let cli = Cli::parse();
    let mut options = settings::load_options(cli.config.as_deref());
    if let Some(platform) = cli.platform {
        options.platform = platform.into();
    }
    tracing::debug!(?options, "link options");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Links { file, page } => {
            let doc = commands::load_document(&file)?;
            commands::links(&mut out, &doc, options, page)?;
        }
        Command::Decode { file, name, json } => {
            let doc = commands::load_document(&file)?;
            commands::decode(&mut out, &doc, options, &name, json)?;
        }
        Command::Normalize { uris } => commands::normalize(&mut out, &uris)?,
        Command::Files { file, extract } => {
            let doc = commands::load_document(&file)?;
            commands::files(&mut out, &doc, extract.as_deref())?;
        }
    }
    out.flush()?;
    Ok(())
}
