use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cloudenv::CloudEnv;
use colored::Colorize;
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Parser)]
#[command(name = "cloudenv")]
#[command(about = "Resolve and inspect values declared in a cloudenv mapping document", long_about = None)]
#[command(version)]
struct Cli {
    /// Mapping document, relative to the base directory
    #[arg(
        short,
        long,
        global = true,
        env = "CLOUDENV_MAPPINGS",
        default_value = "server/config/mappings.json"
    )]
    mappings: PathBuf,

    /// Directory that mapping and `file:` paths are resolved against
    /// (defaults to the working directory)
    #[arg(long, global = true, env = "CLOUDENV_BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Log every search pattern attempt
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved value of one or more names
    Get {
        /// Mapping names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List every resolved name
    Dump {
        /// Print one JSON object of name -> value
        #[arg(long)]
        json: bool,
    },

    /// Extract one service's credentials from a resolved flat credentials object
    Credentials {
        /// Service tag, e.g. watson
        #[arg(short, long)]
        tag: String,
        /// Service label, e.g. conversation
        #[arg(short, long)]
        label: String,
        /// Mapping name holding the credentials object
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let result = load(&cli).and_then(|env| match &cli.command {
        Commands::Get { names } => cmd_get(&env, names),
        Commands::Dump { json } => cmd_dump(&env, *json),
        Commands::Credentials { tag, label, name } => cmd_credentials(&env, tag, label, name),
    });

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load(cli: &Cli) -> Result<CloudEnv, String> {
    let mut env = CloudEnv::new();
    if let Some(dir) = &cli.base_dir {
        env = env.with_base_dir(dir);
    }

    let path = env.initialize(&cli.mappings).map_err(|e| e.to_string())?;
    debug!(
        path = %path.display(),
        base_dir = %env.base_dir().display(),
        resolved = env.len(),
        "mapping document loaded"
    );
    Ok(env)
}

fn cmd_get(env: &CloudEnv, names: &[String]) -> Result<(), String> {
    let mut missing = Vec::new();
    for name in names {
        match env.get_string(name) {
            Some(value) => println!("{value}"),
            None => missing.push(name.as_str()),
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(format!("not resolved: {}", missing.join(", ")))
    }
}

fn cmd_dump(env: &CloudEnv, json: bool) -> Result<(), String> {
    let names = env.names();

    if json {
        let dump: Map<String, Value> = names
            .into_iter()
            .map(|name| {
                let value = env.get_dictionary(&name);
                (name, value)
            })
            .collect();
        let text = serde_json::to_string_pretty(&Value::Object(dump))
            .map_err(|e| format!("Failed to serialize: {e}"))?;
        println!("{text}");
        return Ok(());
    }

    println!("{}", "Resolved values:".bold());
    if names.is_empty() {
        println!("  (none)");
    }
    for name in names {
        let value = env.get_string(&name).unwrap_or_default();
        println!("  {} = {}", name.cyan(), value);
    }
    Ok(())
}

fn cmd_credentials(env: &CloudEnv, tag: &str, label: &str, name: &str) -> Result<(), String> {
    let credentials = env
        .get_string(name)
        .ok_or_else(|| format!("'{name}' is not resolved"))?;

    let filtered = cloudenv::get_credentials_for_service(tag, label, &credentials);
    if filtered.is_empty() {
        return Err(format!("no credentials for {tag}_{label}_* in '{name}'"));
    }
    for (key, value) in filtered {
        println!("{} = {}", key.cyan(), value);
    }
    Ok(())
}
