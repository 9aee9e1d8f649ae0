//! CLI commands for menudispatch using clap.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{load_settings, load_settings_from, Settings};
use crate::core::{Dispatch, Sender};
use crate::session::Session;

/// menudispatch - open menus through positional commands.
#[derive(Parser)]
#[command(name = "menudispatch")]
#[command(version = "0.1.0")]
#[command(about = "Bind command arguments and open menus against an in-memory host", long_about = None)]
pub struct Commands {
    /// Settings file (defaults to ~/.menudispatch/settings.json)
    #[arg(long, global = true, env = "MENUDISPATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ad-hoc open: [-p:<identity>] <menu> [target] [args...]
    Open {
        /// Who types the command ("console" or an identity name)
        #[arg(long = "as", default_value = "console")]
        sender: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Run a registered menu command by name or alias
    Run {
        #[arg(long = "as")]
        sender: String,

        /// Command key, bare or namespaced
        label: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Tab-complete the ad-hoc open command
    Complete {
        #[arg(long = "as", default_value = "console")]
        sender: String,

        /// Arguments typed so far, starting with "open"; the last is partial
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// List command table keys after registration
    Commands,
}

impl Commands {
    /// Run the command.
    pub fn run(&self) -> Result<()> {
        let settings = self.settings()?;
        let mut session = Session::start(&settings).context("failed to start session")?;

        let result = match &self.command {
            Command::Open { sender, tokens } => cmd_open(&session, sender, tokens),
            Command::Run {
                sender,
                label,
                tokens,
            } => cmd_run(&session, sender, label, tokens),
            Command::Complete { sender, tokens } => cmd_complete(&session, sender, tokens),
            Command::Commands => cmd_commands(&session),
        };

        session.shutdown()?;
        result
    }

    fn settings(&self) -> Result<Settings> {
        let settings = match &self.config {
            Some(path) => load_settings_from(path)?,
            None => load_settings()?,
        };
        Ok(settings)
    }
}

fn parse_sender(name: &str) -> Sender {
    if name.eq_ignore_ascii_case("console") {
        Sender::Console
    } else {
        Sender::actor(name)
    }
}

fn print_outcome(session: &Session, outcome: &Dispatch) {
    for message in session.sink.drain() {
        println!("[to {}] {}", message.to, message.text);
    }

    match outcome {
        Dispatch::Opened {
            menu,
            viewer,
            placeholder,
            arguments,
        } => {
            println!("Opened menu '{}' for {}", menu, viewer);
            if let Some(p) = placeholder {
                println!("  placeholders from: {}", p);
            }
            if let Some(args) = arguments {
                for (name, value) in args.iter() {
                    println!("  {} = {:?}", name, value);
                }
            }
        }
        Dispatch::Rejected(notice) => {
            tracing::debug!("Rejected: {:?}", notice);
            println!("Not opened ({})", notice.key());
        }
    }
}

// Command implementations

fn cmd_open(session: &Session, sender: &str, tokens: &[String]) -> Result<()> {
    let outcome = session.open(&parse_sender(sender), tokens);
    print_outcome(session, &outcome);
    Ok(())
}

fn cmd_run(session: &Session, sender: &str, label: &str, tokens: &[String]) -> Result<()> {
    let outcome = session.run(&parse_sender(sender), label, tokens)?;
    print_outcome(session, &outcome);
    Ok(())
}

fn cmd_complete(session: &Session, sender: &str, tokens: &[String]) -> Result<()> {
    match session.complete(&parse_sender(sender), tokens) {
        Some(suggestions) => {
            for suggestion in suggestions {
                println!("{}", suggestion);
            }
        }
        None => println!("(no suggestions)"),
    }
    Ok(())
}

fn cmd_commands(session: &Session) -> Result<()> {
    let Some(registry) = session.registry() else {
        println!("Menu commands are not registered.");
        return Ok(());
    };

    println!("Namespace: {}", registry.fallback_prefix());
    for key in session.command_keys()? {
        let menu = registry
            .table()
            .lookup(&key)
            .map(|c| c.menu_name().to_string())
            .unwrap_or_default();
        println!("  {:<30} -> {}", key, menu);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sender() {
        assert_eq!(parse_sender("CONSOLE"), Sender::Console);
        assert_eq!(parse_sender("Steve"), Sender::actor("Steve"));
    }

    #[test]
    fn test_cli_parses_flag_tokens() {
        let cli = Commands::parse_from([
            "menudispatch",
            "open",
            "--as",
            "Steve",
            "-p:Alex",
            "shop",
            "diamond",
        ]);
        match cli.command {
            Command::Open { sender, tokens } => {
                assert_eq!(sender, "Steve");
                assert_eq!(tokens, vec!["-p:Alex", "shop", "diamond"]);
            }
            _ => panic!("expected open"),
        }
    }

    #[test]
    fn test_cli_run_with_config() {
        let cli = Commands::parse_from([
            "menudispatch",
            "--config",
            "/tmp/menus.json",
            "run",
            "--as",
            "Alex",
            "store",
            "apple",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/menus.json")));
        assert!(matches!(cli.command, Command::Run { ref label, .. } if label == "store"));
    }
}
