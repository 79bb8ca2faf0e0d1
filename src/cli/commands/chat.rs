//! Interactive chat command.
//!
//! Questions are answered against the currently loaded video. `/load` builds a fresh
//! session and swaps it in once it is ready; the previous session keeps serving until then.

use super::{load_session, run_preflight, with_model};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Loader;
use crate::rag::RagSession;
use crate::transcript::Language;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// A line of user input in the chat loop.
#[derive(Debug, PartialEq)]
enum ChatInput<'a> {
    Empty,
    Exit,
    Help,
    Load(&'a str),
    Language(&'a str),
    Summarize,
    Question(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatInput::Empty;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return ChatInput::Exit;
        }

        let Some(command) = line.strip_prefix('/') else {
            return ChatInput::Question(line);
        };
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match name {
            "load" if !arg.is_empty() => ChatInput::Load(arg),
            "lang" if !arg.is_empty() => ChatInput::Language(arg),
            "summary" | "summarize" => ChatInput::Summarize,
            "exit" | "quit" => ChatInput::Exit,
            _ => ChatInput::Help,
        }
    }
}

fn print_help() {
    Output::list_item("/load <video>   load a YouTube URL/ID or transcript file");
    Output::list_item("/lang <code>    caption language for the next /load (en, hi, hi-auto, en-auto)");
    Output::list_item("/summary        summarize the loaded video");
    Output::list_item("exit            leave the chat");
}

/// Run the interactive chat command.
pub async fn run_chat(
    video: Option<String>,
    model: Option<String>,
    mut language: Language,
    settings: Settings,
) -> Result<()> {
    if let Some(video) = &video {
        run_preflight(Operation::Ask, &settings, video)?;
    }

    let loader = Loader::new(with_model(settings, model))?;

    let mut session: Option<RagSession> = None;
    if let Some(video) = &video {
        session = load_session(&loader, video, language).await.ok();
    }

    println!("\n{}", style("Tubechat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about the loaded video, '/load <video>' to switch, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        match ChatInput::parse(&input) {
            ChatInput::Empty => continue,
            ChatInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ChatInput::Help => print_help(),
            ChatInput::Language(code) => match code.parse::<Language>() {
                Ok(lang) => {
                    language = lang;
                    Output::info(&format!("Caption language set to {}.", language));
                }
                Err(e) => Output::error(&e),
            },
            ChatInput::Load(target) => {
                // A failed load keeps the previous session.
                if let Ok(fresh) = load_session(&loader, target, language).await {
                    session = Some(fresh);
                }
            }
            ChatInput::Summarize => {
                let Some(current) = &session else {
                    Output::warning("No video loaded. Use /load <video> first.");
                    continue;
                };
                let spinner = Output::spinner("Summarizing...");
                let result = current.summarize().await;
                spinner.finish_and_clear();
                reply(result);
            }
            ChatInput::Question(question) => {
                let Some(current) = &session else {
                    Output::warning("No video loaded. Use /load <video> first.");
                    continue;
                };
                let spinner = Output::spinner("Thinking...");
                let result = current.answer(question).await;
                spinner.finish_and_clear();
                reply(result);
            }
        }
    }

    Ok(())
}

fn reply(result: crate::error::Result<String>) {
    match result {
        Ok(answer) => println!("\n{} {}\n", style("Tubechat:").cyan().bold(), answer.trim()),
        Err(e) => Output::error(&format!("Error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(ChatInput::parse("   \n"), ChatInput::Empty);
        assert_eq!(ChatInput::parse("QUIT\n"), ChatInput::Exit);
        assert_eq!(
            ChatInput::parse("/load https://youtu.be/dQw4w9WgXcQ\n"),
            ChatInput::Load("https://youtu.be/dQw4w9WgXcQ")
        );
        assert_eq!(ChatInput::parse("/lang hi-auto"), ChatInput::Language("hi-auto"));
        assert_eq!(ChatInput::parse("/summary"), ChatInput::Summarize);
        assert_eq!(ChatInput::parse("/load"), ChatInput::Help);
        assert_eq!(
            ChatInput::parse("What is /load for?"),
            ChatInput::Question("What is /load for?")
        );
    }
}
