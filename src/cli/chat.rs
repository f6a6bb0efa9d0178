//! The interactive chat loop: the observer side of the streaming core.
//!
//! Reads questions from stdin, spawns one stream per question, and prints
//! each snapshot's new suffix as it arrives. Ctrl+C during an answer
//! cancels that stream and keeps whatever was already printed.

use std::error::Error;
use std::io::Write as _;
use std::path::Path;

use tokio::io::AsyncBufReadExt;
use tokio_util::sync::CancellationToken;

use crate::api::documents::analyze_document;
use crate::api::DocumentAnalysis;
use crate::core::chat_stream::{ChatStreamService, StreamParams, StreamUpdate};
use crate::core::message::{Conversation, Message};
use crate::utils::logging::LoggingState;

pub struct ChatOptions {
    pub server_url: String,
    pub show_sources: bool,
    pub log_file: Option<String>,
}

pub async fn run_chat(options: ChatOptions) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::new();
    let (service, mut rx) = ChatStreamService::new();
    let mut conversation = Conversation::new();
    let mut logging = LoggingState::new(options.log_file)?;
    let mut stream_counter: u64 = 0;

    println!("Advisor backend: {}", options.server_url);
    println!("Ask a question. /upload <file> analyzes a document, /quit exits.");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(command) = input.strip_prefix('/') {
            let mut parts = command.splitn(2, char::is_whitespace);
            let name = parts.next().unwrap_or("");
            let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

            match name {
                "quit" | "exit" => break,
                "upload" => match arg {
                    Some(path) => {
                        if let Err(err) = upload_and_report(
                            &client,
                            &options.server_url,
                            Path::new(path),
                            &mut conversation,
                            &logging,
                        )
                        .await
                        {
                            println!("Upload failed: {err}");
                        }
                    }
                    None => println!("Usage: /upload <file>"),
                },
                "log" => {
                    let result = match arg {
                        Some(path) => logging.set_log_file(path.to_string()),
                        None => logging.toggle_logging(),
                    };
                    match result {
                        Ok(status) => println!("{status}"),
                        Err(err) => println!("{err}"),
                    }
                }
                "status" => {
                    println!("Logging: {}", logging.get_status_string());
                }
                _ => println!("Unknown command: /{name}"),
            }
            continue;
        }

        // History travels without the new question; the question goes in
        // the request's own query field.
        let history = conversation.history();
        conversation.push_user(input);
        logging.log_turn("You", input)?;

        stream_counter += 1;
        let stream_id = stream_counter;
        let cancel_token = CancellationToken::new();
        service.spawn_stream(StreamParams {
            client: client.clone(),
            server_url: options.server_url.clone(),
            query: input.to_string(),
            history,
            cancel_token: cancel_token.clone(),
            stream_id,
        });

        let mut printed_len = 0;
        let mut assistant_started = false;

        loop {
            tokio::select! {
                received = rx.recv() => {
                    let Some((update, id)) = received else { break };
                    if id != stream_id {
                        // Leftover from a cancelled stream; drop it.
                        continue;
                    }
                    match update {
                        StreamUpdate::Snapshot(snapshot) => {
                            print!("{}", snapshot.content.get(printed_len..).unwrap_or_default());
                            std::io::stdout().flush()?;
                            printed_len = snapshot.content.len();
                            if assistant_started {
                                conversation.update_streaming(snapshot);
                            } else {
                                conversation.push(snapshot);
                                assistant_started = true;
                            }
                        }
                        StreamUpdate::Completed(_) => {
                            println!();
                            if let Some(last) = conversation.messages().last() {
                                if last.role.is_assistant() {
                                    if options.show_sources && last.has_citations() {
                                        print_sources(last);
                                    }
                                    logging.log_turn("Advisor", &last.content)?;
                                }
                            }
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    cancel_token.cancel();
                    println!();
                    println!("(answer interrupted)");
                    break;
                }
            }
        }
    }

    Ok(())
}

fn print_sources(message: &Message) {
    println!("Sources:");
    for citation in &message.citations {
        println!("  - {} <{}>", citation.source, citation.url);
    }
}

async fn upload_and_report(
    client: &reqwest::Client,
    server_url: &str,
    path: &Path,
    conversation: &mut Conversation,
    logging: &LoggingState,
) -> Result<(), Box<dyn Error>> {
    let filename = file_name_of(path);
    let bytes = tokio::fs::read(path).await?;

    println!("Analyzing {filename}...");
    let analysis = analyze_document(client, server_url, &filename, bytes).await?;
    print_analysis(&analysis);

    // Document analyses join the transcript at the same append point as
    // streamed answers.
    let note = format!("Analyzed {filename}. See the generated checklist below.");
    conversation.push(Message::assistant(note.clone()));
    logging.log_turn("Advisor", &note)?;
    Ok(())
}

/// One-shot analysis for the `analyze` subcommand.
pub async fn analyze_file(server_url: &str, path: &Path) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::new();
    let filename = file_name_of(path);
    let bytes = tokio::fs::read(path).await?;
    let analysis = analyze_document(&client, server_url, &filename, bytes).await?;
    print_analysis(&analysis);
    Ok(())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "uploaded_file".to_string())
}

fn print_analysis(analysis: &DocumentAnalysis) {
    if let Some(summary) = &analysis.summary {
        println!("{summary}");
    }
    if !analysis.checklist.is_empty() {
        println!("Checklist:");
        for item in &analysis.checklist {
            match item.urgency.as_deref() {
                Some(urgency) => println!("  [ ] {} ({urgency})", item.title),
                None => println!("  [ ] {}", item.title),
            }
            if !item.description.is_empty() {
                println!("      {}", item.description);
            }
        }
    }
    if let Some(risks) = &analysis.risks {
        println!("Risks: {risks}");
    }
}
