//! Command-line interface definition

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// AI-assisted vehicle diagnostics from the terminal
#[derive(Parser, Debug)]
#[command(name = "detect-auto", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to an explicit config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress spinners and decorative output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register {
        /// Email address
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and store the bearer token
    Login {
        /// Email address
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Invalidate and forget the stored token
    Logout,

    /// Show the authenticated user's profile
    Me,

    /// List diagnostic sessions, or show one in full
    Sessions {
        /// Show one session with its results, parts, and summary
        #[arg(long)]
        id: Option<i64>,
        /// Print raw JSON instead of formatted output
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive diagnostic chat
    Chat {
        /// Resume an existing session instead of creating one
        #[arg(long)]
        session: Option<i64>,
        /// Initial complaint to seed a new session with
        input: Option<String>,
    },

    /// Predict replacement parts for a session
    Parts {
        /// Session to predict parts for
        #[arg(long)]
        session: i64,
    },

    /// Generate a repair-order summary for a session
    Summary {
        /// Session to summarize
        #[arg(long)]
        session: i64,
        /// Technician notes to include
        #[arg(long)]
        notes: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chat_with_session_and_input() {
        let cli = Cli::parse_from(["detect-auto", "chat", "--session", "7", "engine knocking"]);
        match cli.command {
            Command::Chat { session, input } => {
                assert_eq!(session, Some(7));
                assert_eq!(input.as_deref(), Some("engine knocking"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn verbosity_flags_accumulate() {
        let cli = Cli::parse_from(["detect-auto", "-vv", "me"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn summary_takes_optional_notes() {
        let cli = Cli::parse_from([
            "detect-auto",
            "summary",
            "--session",
            "3",
            "--notes",
            "customer approved",
        ]);
        match cli.command {
            Command::Summary { session, notes } => {
                assert_eq!(session, 3);
                assert_eq!(notes.as_deref(), Some("customer approved"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
