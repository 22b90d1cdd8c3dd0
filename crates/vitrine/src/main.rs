//! Vitrine CLI - multi-tenant website builder.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

use commands::edit::EditAction;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(about = "Build client websites from predefined site models")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to vitrine.toml config file
    #[arg(short, long, default_value = "vitrine.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create vitrine.toml and an empty site store
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// List available site models
    Models {
        /// Only models of this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Create a client site from a site model
    New {
        /// Site model id
        model: String,

        /// Client id the site belongs to
        client_id: String,

        /// Site name
        #[arg(short, long)]
        name: Option<String>,

        /// Replace an existing site
        #[arg(long)]
        force: bool,
    },

    /// Edit a stored site
    Edit {
        client_id: String,

        #[command(subcommand)]
        action: EditAction,
    },

    /// Set a site's logo from an image file
    Logo { client_id: String, file: PathBuf },

    /// Render every site to static HTML
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Serve sites, previews and the editing API
    Serve {
        /// Port to listen on (defaults to config or 7777)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open browser on start
        #[arg(long)]
        open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes)?;
        }
        Commands::Models { category } => {
            commands::models::run(category.as_deref())?;
        }
        Commands::New {
            model,
            client_id,
            name,
            force,
        } => {
            let config = config::load_config(&cli.config)?;
            commands::new::run(&config, &model, &client_id, name, force)?;
        }
        Commands::Edit { client_id, action } => {
            let config = config::load_config(&cli.config)?;
            commands::edit::run(&config, &client_id, action)?;
        }
        Commands::Logo { client_id, file } => {
            let config = config::load_config(&cli.config)?;
            commands::logo::run(&config, &client_id, &file)?;
        }
        Commands::Build { output, no_minify } => {
            let config = config::load_config(&cli.config)?;
            let minify = if no_minify { Some(false) } else { None };
            commands::build::run(&config, output, minify)?;
        }
        Commands::Serve { port, open } => {
            let config = config::load_config(&cli.config)?;
            commands::serve::run(config, port, open).await?;
        }
    }

    Ok(())
}
