//! REPL (Read-Eval-Print Loop) for the interactive diagnostic chat

use crate::ConsoleFormatter;
use crate::StreamProgress;
use colored::Colorize;
use detect_application::{DiagnoseUseCase, ReplyOutcome, SessionService};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::io::Write;

/// Interactive diagnostic chat REPL
pub struct ChatRepl {
    diagnose: DiagnoseUseCase,
    sessions: SessionService,
    session_id: i64,
    show_progress: bool,
}

impl ChatRepl {
    /// Create a new ChatRepl bound to one diagnostic session
    pub fn new(diagnose: DiagnoseUseCase, sessions: SessionService, session_id: i64) -> Self {
        Self {
            diagnose,
            sessions,
            session_id,
            show_progress: true,
        }
    }

    /// Set whether to show the streaming spinner
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = dirs::data_dir().map(|p| p.join("detect-auto").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        if let Err(e) = self.diagnose.connect(self.session_id).await {
            eprintln!("{}", format!("Error: {}", e).red());
            return Ok(());
        }

        self.print_welcome();

        // A resumed session starts with its stored diagnosis
        if let Some(turn) = self.diagnose.transcript().last() {
            println!("{} {}", "Assistant:".green().bold(), turn.content);
            println!();
        }

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(line).await {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        self.diagnose.close().await;

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          Detect Auto - Diagnostics          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Session: {}", self.session_id);
        println!();
        println!("Describe the problem with the vehicle, or use a command:");
        println!("  /parts    - Predict replacement parts");
        println!("  /summary  - Generate a repair-order summary");
        println!("  /history  - Show this conversation");
        println!("  /help     - Show all commands");
        println!("  /quit     - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&self, cmd: &str) -> bool {
        let (name, rest) = match cmd.split_once(' ') {
            Some((name, rest)) => (name, rest.trim()),
            None => (cmd, ""),
        };

        match name {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                println!();
                println!("Commands:");
                println!("  /parts            - Predict replacement parts for this session");
                println!("  /summary [notes]  - Generate a repair-order summary");
                println!("  /history          - Show this conversation");
                println!("  /help, /h, /?     - Show this help");
                println!("  /quit, /exit, /q  - Exit chat");
                println!();
                false
            }
            "/history" => {
                println!();
                for turn in self.diagnose.transcript().turns() {
                    let label = match turn.role {
                        detect_domain::Role::User => "You:".bold(),
                        detect_domain::Role::Assistant => "Assistant:".green().bold(),
                    };
                    println!("{} {}", label, turn.content);
                }
                println!();
                false
            }
            "/parts" => {
                match self.sessions.predict_parts(self.session_id).await {
                    Ok(parts) => println!("\n{}", ConsoleFormatter::format_parts(&parts)),
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
                false
            }
            "/summary" => {
                let notes = (!rest.is_empty()).then_some(rest);
                match self.sessions.summarize_order(self.session_id, notes).await {
                    Ok(summary) => println!("\n{}", ConsoleFormatter::format_summary(&summary)),
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
                false
            }
            _ => {
                println!("Unknown command: {}", name);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_message(&mut self, text: &str) {
        if let Err(e) = self.diagnose.send_message(text).await {
            eprintln!("{}", format!("Error: {}", e).red());
            return;
        }

        let spinner = self
            .show_progress
            .then(|| StreamProgress::start("Diagnosing..."));
        let mut streamed = false;
        let mut shown = String::new();

        let outcome = self
            .diagnose
            .next_reply(|chunk| {
                if !streamed {
                    if let Some(s) = &spinner {
                        s.clear();
                    }
                    print!("{} ", "Assistant:".green().bold());
                    streamed = true;
                }
                print!("{}", chunk);
                shown.push_str(chunk);
                let _ = std::io::stdout().flush();
            })
            .await;

        if let Some(s) = &spinner {
            s.clear();
        }

        match outcome {
            Ok(ReplyOutcome::Completed(reply)) => {
                if streamed {
                    println!();
                    // The completion payload is authoritative; re-render it
                    // when the streamed chunks said something else.
                    if let Some(corrected) = corrected_reply(&shown, &reply) {
                        println!("{} {}", "Assistant:".green().bold(), corrected);
                    }
                } else {
                    println!("{} {}", "Assistant:".green().bold(), reply);
                }
            }
            Ok(ReplyOutcome::Failed(message)) => {
                if streamed {
                    println!();
                }
                eprintln!("{}", format!("Error: {}", message).red());
            }
            Err(e) => {
                if streamed {
                    println!();
                }
                eprintln!("{}", format!("Error: {}", e).red());
            }
        }
        println!();
    }
}

/// The completion text to re-render, when it differs from what was already
/// streamed to the terminal.
fn corrected_reply<'a>(shown: &str, reply: &'a str) -> Option<&'a str> {
    (reply != shown).then_some(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_completion_is_not_reprinted() {
        assert_eq!(corrected_reply("Check the plugs.", "Check the plugs."), None);
    }

    #[test]
    fn diverging_completion_is_reprinted() {
        assert_eq!(
            corrected_reply("Check the plugs", "Check the spark plugs."),
            Some("Check the spark plugs.")
        );
    }
}
