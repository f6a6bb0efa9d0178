//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod chat;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::chat::{analyze_file, run_chat, ChatOptions};
use crate::core::config::Config;

#[derive(Parser)]
#[command(name = "neuvo")]
#[command(about = "A terminal chat client for a campus student-advisor service")]
#[command(
    long_about = "Neuvo is a terminal chat client that connects to a student-advisor backend \
for real-time, streamed answers with source citations.\n\n\
Configuration:\n\
  Use 'neuvo set server-url <url>' to point at your advisor backend.\n\
  Flags override config; config overrides built-in defaults.\n\n\
Controls:\n\
  Type              Enter your question and press Enter\n\
  Ctrl+C            Interrupt the answer currently streaming\n\n\
Commands:\n\
  /upload <file>    Analyze a document and print the generated checklist\n\
  /log [filename]   Enable transcript logging, or toggle pause/resume\n\
  /status           Show transcript logging status\n\
  /quit             Exit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Advisor backend base URL
    #[arg(short, long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short, long, global = true)]
    pub log: Option<String>,

    /// Do not print source citations after answers
    #[arg(long, global = true)]
    pub no_sources: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Upload a document for analysis and print the generated checklist
    Analyze {
        /// File to analyze
        file: PathBuf,
    },
    /// Show current configuration
    Show,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        value: String,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load()?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let options = ChatOptions {
                server_url: args
                    .server
                    .unwrap_or_else(|| config.server_url().to_string()),
                show_sources: !args.no_sources && config.show_sources(),
                log_file: args.log.or_else(|| config.log_file.clone()),
            };
            run_chat(options).await
        }
        Commands::Analyze { file } => {
            let server_url = args
                .server
                .unwrap_or_else(|| config.server_url().to_string());
            analyze_file(&server_url, &file).await
        }
        Commands::Show => {
            config.print_all();
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "server-url" => {
                    config.server_url = Some(value.clone());
                    config.save()?;
                    println!("Set server-url to: {value}");
                }
                "show-sources" => match value.as_str() {
                    "on" | "true" => {
                        config.show_sources = Some(true);
                        config.save()?;
                        println!("Set show-sources to: on");
                    }
                    "off" | "false" => {
                        config.show_sources = Some(false);
                        config.save()?;
                        println!("Set show-sources to: off");
                    }
                    _ => {
                        eprintln!("show-sources accepts: on, off");
                        std::process::exit(1);
                    }
                },
                "log-file" => {
                    config.log_file = Some(value.clone());
                    config.save()?;
                    println!("Set log-file to: {value}");
                }
                _ => {
                    eprintln!("Unknown config key: {key}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "server-url" => {
                    config.server_url = None;
                    config.save()?;
                    println!("Unset server-url");
                }
                "show-sources" => {
                    config.show_sources = None;
                    config.save()?;
                    println!("Unset show-sources");
                }
                "log-file" => {
                    config.log_file = None;
                    config.save()?;
                    println!("Unset log-file");
                }
                _ => {
                    eprintln!("Unknown config key: {key}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
    }
}
