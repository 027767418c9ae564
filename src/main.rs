use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use formbridge::config::Config;
use formbridge::errors::{normalize, normalize_namespaced, NamespacedServerErrors, ServerFieldError};
use formbridge::legacy::decode_post_fields;
use formbridge::logging::init_tracing;

/// Inspect server error payloads and no-JS POST bodies.
#[derive(Debug, Parser)]
#[command(name = "formbridge", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize a JSON error list read from stdin
    Normalize {
        /// Input is a namespace -> payload map for forms with formsets
        #[arg(long)]
        namespaced: bool,
    },
    /// Decode name=value POST fields into the nested form input shape
    DecodePost {
        /// Config file supplying the formset row cap
        #[arg(long)]
        config: Option<PathBuf>,
        /// Fields as name=value
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Validate a TOML config file and print the effective settings
    CheckConfig { path: PathBuf },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Normalize { namespaced } => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            let output = if namespaced {
                let collection: BTreeMap<String, NamespacedServerErrors> =
                    serde_json::from_str(&raw).context("Invalid namespaced error payload")?;
                serde_json::to_string_pretty(&normalize_namespaced(&collection))?
            } else {
                let errors: Vec<ServerFieldError> =
                    serde_json::from_str(&raw).context("Invalid error list")?;
                serde_json::to_string_pretty(&normalize(&errors))?
            };
            println!("{output}");
        }
        Command::DecodePost { config, fields } => {
            let config = match config {
                Some(path) => Config::load_from(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => Config::default(),
            };
            let pairs = fields
                .iter()
                .map(|field| match field.split_once('=') {
                    Some((name, value)) => Ok((name.to_string(), value.to_string())),
                    None => bail!("Expected name=value, got '{field}'"),
                })
                .collect::<Result<Vec<_>>>()?;
            let data = decode_post_fields(&pairs, config.formsets.absolute_max)?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::CheckConfig { path } => {
            let config = Config::load_from(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
