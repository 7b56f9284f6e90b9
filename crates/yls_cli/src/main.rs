use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value as JsonValue;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use yls_core::core_api::{Engine, Session};
use yls_core::{CodecConfig, FieldPath, persist, transport};
use yls_render::{
    render_fields_json, render_fields_text, render_json_summary, render_tables_text,
    render_text_summary, render_validation_json,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// JSON codec configuration file.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a summary of the save.
    Show {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List editable fields with their current values.
    Fields {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print one cell exactly as stored, e.g. `Channel/1/Subscribers`.
    Get {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(value_name = "FIELD")]
        field: FieldPath,
    },
    /// Apply one or more edits and save.
    Set {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(value_name = "FIELD=VALUE", required = true, value_parser = parse_assignment)]
        edits: Vec<(FieldPath, String)>,
        /// Write here instead of replacing SAVE.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Copy the file being replaced to `<FILE>.backup` first.
        #[arg(long)]
        backup: bool,
    },
    /// List tables and their row counts.
    Tables {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
    },
    /// Check that the save has the tables the game requires.
    Validate {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Unwrap a save container into its table text.
    Decode {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Wrap table text back into a save container.
    Encode {
        #[arg(value_name = "TEXT")]
        path: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn parse_assignment(raw: &str) -> Result<(FieldPath, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got {raw:?}"))?;
    let field = field.parse::<FieldPath>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn load_config(path: Option<&Path>) -> CodecConfig {
    let Some(path) = path else {
        return CodecConfig::default();
    };
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config {}: {e}", path.display());
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing config {}: {e}", path.display());
        process::exit(1);
    })
}

fn open_session(engine: &Engine, path: &Path) -> Session {
    engine.open_path(path).unwrap_or_else(|e| {
        eprintln!("Error loading save file: {}", path.display());
        eprintln!("  {e}");
        process::exit(1);
    })
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    debug!(command = ?cli.command, "running command");
    let engine = Engine::with_config(load_config(cli.config.as_deref()));

    match cli.command {
        Command::Show { path, json } => {
            let session = open_session(&engine, &path);
            if json {
                print_json(&render_json_summary(&session));
            } else {
                print!("{}", render_text_summary(&session));
            }
        }
        Command::Fields { path, json } => {
            let session = open_session(&engine, &path);
            if json {
                print_json(&render_fields_json(&session));
            } else {
                print!("{}", render_fields_text(&session));
            }
        }
        Command::Get { path, field } => {
            let session = open_session(&engine, &path);
            match session.document().scalar(&field) {
                Some(scalar) => println!("{}", scalar.text()),
                None => {
                    eprintln!("Field {field} does not exist in {}", path.display());
                    process::exit(1);
                }
            }
        }
        Command::Set {
            path,
            edits,
            output,
            backup,
        } => {
            let mut session = open_session(&engine, &path);
            for (field, value) in &edits {
                session.set_from_str(field, value).unwrap_or_else(|e| {
                    eprintln!("Error applying edit {field}={value}: {e}");
                    process::exit(1);
                });
            }

            let out_path = output.unwrap_or(path);
            if backup && out_path.exists() {
                let backup_path = persist::backup(&out_path).unwrap_or_else(|e| {
                    eprintln!("Error creating backup: {e}");
                    process::exit(1);
                });
                eprintln!("Backup written to {}", backup_path.display());
            }
            session.save(&out_path).unwrap_or_else(|e| {
                eprintln!("Error writing {}: {e}", out_path.display());
                process::exit(1);
            });
            eprintln!("Applied {} edit(s) to {}", edits.len(), out_path.display());
        }
        Command::Tables { path } => {
            let session = open_session(&engine, &path);
            print!("{}", render_tables_text(&session));
        }
        Command::Validate { path, json } => {
            let session = open_session(&engine, &path);
            let issues = session.validate();
            if json {
                print_json(&render_validation_json(&session));
            } else if issues.is_empty() {
                println!("OK: all required tables present");
            } else {
                for issue in &issues {
                    println!("{}", issue.message);
                }
            }
            if !issues.is_empty() {
                process::exit(1);
            }
        }
        Command::Decode { path, output } => {
            let container = read_input(&path);
            let raw = transport::decode(&container).unwrap_or_else(|e| {
                eprintln!("Error decoding {}: {e}", path.display());
                process::exit(1);
            });
            write_output(&output, &raw);
        }
        Command::Encode { path, output } => {
            let raw = read_input(&path);
            let container = transport::encode(&raw).unwrap_or_else(|e| {
                eprintln!("Error encoding {}: {e}", path.display());
                process::exit(1);
            });
            write_output(&output, &container);
        }
    }
}

fn read_input(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    })
}

fn write_output(path: &Path, bytes: &[u8]) {
    persist::write_atomic(path, bytes).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", path.display());
        process::exit(1);
    });
}
