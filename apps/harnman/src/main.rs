use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use harnman_resolver::{CommandKind, CommandResolver, ShellRunner};
use harnman_store::ConfigStore;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "harnman")]
#[command(about = "Manage fuzzing harness configurations.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all available harnesses.
    List {
        /// Output the list as a JSON array.
        #[arg(long)]
        json: bool,
    },

    /// Print the fuzzing command for a harness.
    FuzzCmd {
        name: String,
        /// Print the stored string without expanding $(...) substitutions.
        #[arg(long)]
        raw: bool,
    },

    /// Print the build command for a harness.
    BuildCmd {
        name: String,
        /// Print the stored string without expanding $(...) substitutions.
        #[arg(long)]
        raw: bool,
    },

    /// Print the coverage collection command for a harness.
    CovCmd {
        name: String,
        /// Print the stored string without expanding $(...) substitutions.
        #[arg(long)]
        raw: bool,
    },

    /// Create a new harness configuration.
    Add {
        name: String,
        /// JSON file with the initial document ("-" for stdin). Defaults to
        /// an empty object.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Print a whole harness configuration.
    Show { name: String },

    /// Print one field of a harness configuration.
    Get { name: String, field: String },

    /// Set one field of a harness configuration.
    Set {
        name: String,
        field: String,
        value: String,
        /// Parse VALUE as JSON instead of storing it as a string.
        #[arg(long)]
        json: bool,
    },

    /// Remove one field from a harness configuration.
    Unset { name: String, field: String },

    /// Delete a harness configuration.
    Rm { name: String },

    /// Rename a harness configuration.
    Mv { old: String, new: String },

    /// Validate a harness configuration against a JSON Schema.
    Validate {
        name: String,
        /// Path to the JSON Schema document.
        #[arg(long)]
        schema: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Invoked with no subcommand: print help and succeed.
    let Some(cmd) = cli.cmd else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // The configuration directory is read from the environment exactly once,
    // here, and handed to the store explicitly.
    let config_dir =
        std::env::var("HARNMAN_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let store = ConfigStore::new(config_dir);

    match cmd {
        Command::List { json } => {
            let names = store.list()?;
            if json {
                println!("{}", serde_json::to_string(&names)?);
            } else if names.is_empty() {
                println!("No harnesses found.");
            } else {
                println!("{}", names.join("\n"));
            }
        }

        Command::FuzzCmd { name, raw } => print_command(&store, &name, CommandKind::Fuzz, raw)?,
        Command::BuildCmd { name, raw } => print_command(&store, &name, CommandKind::Build, raw)?,
        Command::CovCmd { name, raw } => print_command(&store, &name, CommandKind::Coverage, raw)?,

        Command::Add { name, file } => {
            let doc = match file {
                Some(path) => read_document(&path)?,
                None => Value::Object(serde_json::Map::new()),
            };
            store.add(&name, &doc)?;
        }

        Command::Show { name } => {
            let doc = store.load(&name)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }

        Command::Get { name, field } => {
            let value = store.read_field(&name, &field)?;
            println!("{}", render_value(&value));
        }

        Command::Set {
            name,
            field,
            value,
            json,
        } => {
            let value = if json {
                serde_json::from_str(&value)
                    .with_context(|| format!("parsing value '{value}' as JSON"))?
            } else {
                Value::String(value)
            };
            store.update_field(&name, &field, value)?;
        }

        Command::Unset { name, field } => {
            store.delete_field(&name, &field)?;
        }

        Command::Rm { name } => store.delete(&name)?,

        Command::Mv { old, new } => store.rename(&old, &new)?,

        Command::Validate { name, schema } => {
            harnman_schema::validate_harness(&store, &name, &schema)?;
            println!("OK");
        }
    }

    Ok(())
}

fn print_command(store: &ConfigStore, name: &str, kind: CommandKind, raw: bool) -> Result<()> {
    let resolver = CommandResolver::new(store, &ShellRunner);
    let cmd = if raw {
        resolver.raw_command(name, kind)?
    } else {
        resolver.command(name, kind)?
    };
    println!("{cmd}");
    Ok(())
}

fn read_document(path: &Path) -> Result<Value> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))?
    };
    serde_json::from_str(&text).context("parsing document as JSON")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
