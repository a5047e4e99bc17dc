//! `solrq`: compile criteria query documents into Solr request parameters.

mod logging;
mod settings;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use solrq_query::escape::{escape_criteria_value, escape_query_chars};
use solrq_query::{Query, QueryCompiler};
use std::io::Read;
use std::path::PathBuf;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "solrq", version, about = "Solr criteria compiler")]
struct Cli {
    /// Settings file (toml, json or yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON query document
    Compile {
        /// Query document; stdin when omitted or `-`
        input: Option<PathBuf>,

        /// Domain type used for field name mapping
        #[arg(short, long)]
        domain: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Params)]
        format: OutputFormat,
    },
    /// Escape a literal value for embedding in a query
    Escape {
        value: String,

        /// Escape `*` too and never quote
        #[arg(long)]
        all: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One `name=value` line per parameter
    Params,
    /// URL-encoded query string
    Url,
    /// JSON object, repeated names as arrays
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    logging::init_logging(&settings.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Compile {
            input,
            domain,
            format,
        } => {
            let compiler = QueryCompiler::new(settings.compiler)
                .map_err(|e| anyhow::anyhow!("Invalid compiler configuration: {e}"))?;
            let query = read_query(input.as_deref())?;
            let compiled = compiler
                .compile_for(&query, domain.as_deref())
                .context("Failed to compile query")?;
            let params = compiled.params();

            match format {
                OutputFormat::Params => {
                    for (name, value) in params.iter() {
                        println!("{name}={value}");
                    }
                }
                OutputFormat::Url => println!("{}", params.to_query_string()),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&params.to_json())?)
                }
            }
        }
        Commands::Escape { value, all } => {
            if all {
                println!("{}", escape_query_chars(&value));
            } else {
                println!("{}", escape_criteria_value(&value));
            }
        }
    }

    Ok(())
}

fn read_query(input: Option<&std::path::Path>) -> anyhow::Result<Query> {
    let raw = match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read query from stdin")?;
            buffer
        }
    };
    tracing::debug!(bytes = raw.len(), "Query document read");
    serde_json::from_str(&raw).context("Invalid query document")
}
