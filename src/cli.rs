// CLI module - command-line argument parsing and handlers
//
// Running `philo` with no subcommand starts the chat UI. Subcommands manage
// the config file and the stored credential, then exit:
// - config --show: Display effective configuration
// - config --path: Show config file path
// - config --reset: Regenerate config file with defaults
// - config --edit: Open config file in $EDITOR
// - key --path: Show credential file path
// - key --forget: Delete the stored API key

use crate::config::{Config, VERSION};
use crate::credential::{self, CredentialStore};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

/// philo - chat with a remote completion endpoint from the terminal
#[derive(Debug, Parser)]
#[command(name = "philo")]
#[command(version = VERSION)]
#[command(about = "Terminal chat client for OpenRouter-style completion endpoints", long_about = None)]
pub struct Cli {
    /// Model identifier for this run (overrides config and PHILO_MODEL)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Provider preference, highest first; repeat for several
    #[arg(long = "provider", global = true)]
    pub providers: Vec<String>,

    /// Directory for downloaded conversations
    #[arg(long, global = true)]
    pub export_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,
    },

    /// Manage the stored API key
    Key {
        /// Show credential file path
        #[arg(long)]
        path: bool,

        /// Delete the stored API key
        #[arg(long)]
        forget: bool,
    },
}

impl Cli {
    /// Apply per-run flags on top of the loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if !self.providers.is_empty() {
            config.provider_order = self.providers.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = dir.clone();
        }
    }
}

/// Run a management subcommand
pub fn run_command(cli: &Cli, command: &Commands) -> Result<()> {
    match *command {
        Commands::Config {
            show,
            path,
            reset,
            edit,
        } => {
            if path {
                handle_config_path()
            } else if show {
                handle_config_show(cli)
            } else if reset {
                handle_config_reset()
            } else if edit {
                handle_config_edit()
            } else {
                println!("Usage: philo config [--show|--path|--reset|--edit]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --path    Show config file path");
                println!("  --reset   Reset config file to defaults");
                println!("  --edit    Open config file in $EDITOR");
                Ok(())
            }
        }
        Commands::Key { path, forget } => {
            if path {
                handle_key_path()
            } else if forget {
                handle_key_forget()
            } else {
                println!("Usage: philo key [--path|--forget]");
                println!();
                println!("Options:");
                println!("  --path    Show credential file path");
                println!("  --forget  Delete the stored API key");
                Ok(())
            }
        }
    }
}

fn config_path() -> Result<PathBuf> {
    Config::config_path().context("Could not determine config path")
}

fn credential_store() -> Result<CredentialStore> {
    CredentialStore::default_location().context("Could not determine credential path")
}

fn handle_config_path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}

fn handle_config_show(cli: &Cli) -> Result<()> {
    let mut config = Config::load()?;
    cli.apply_overrides(&mut config);

    println!("# Effective configuration (flags > env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    let path = config_path()?;
    if path.exists() {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: defaults (no config file)");
    }

    // Never print the key itself
    let stored = credential_store()?.load()?;
    let from_env = std::env::var(credential::API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty());
    match (from_env, stored) {
        (Some(key), _) => println!(
            "# API key: {} (from {})",
            credential::fingerprint(&key),
            credential::API_KEY_ENV
        ),
        (None, Some(key)) => println!("# API key: {} (stored)", credential::fingerprint(&key)),
        (None, None) => println!("# API key: not set"),
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = config_path()?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    // Write the default config (using Config's single source of truth)
    Config::default()
        .save()
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            // Platform-specific fallback
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status().with_context(|| {
        format!(
            "Failed to launch editor '{}' (set $EDITOR to your preferred editor)",
            editor
        )
    })?;

    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

fn handle_key_path() -> Result<()> {
    println!("{}", credential_store()?.path().display());
    Ok(())
}

fn handle_key_forget() -> Result<()> {
    let store = credential_store()?;
    if store.forget()? {
        println!("Removed stored API key: {}", store.path().display());
    } else {
        println!("No stored API key at {}", store.path().display());
    }
    Ok(())
}
