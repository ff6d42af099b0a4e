// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::cmd_dav::CmdDav;
use crate::cmd_push::CmdPush;
use crate::config::DAVSYNC_CONFIG_ENV;

const APP_NAME: &str = "davsync";
const LOG_ENV: &str = "DAVSYNC_LOG";

/// Run the davsync command-line interface.
pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    match Cli::parse() {
        Ok(cli) => {
            if let Err(e) = cli.run().await {
                println!("{} {}", "Error:".red(), e);
            }
        }
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // a subscriber may already be installed by an embedding host
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Keep files in sync with a WebDAV server whenever they are saved.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(format!(
                        "\
Path to the configuration file. Defaults to ${DAVSYNC_CONFIG_ENV}, then to davsync.toml in the \
first workspace root. The settings are read from its [webdavsync] table."
                    ))
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .subcommand(CmdPush::command())
            .subcommand(CmdDav::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(&matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(&matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let command = match matches.subcommand() {
            Some((CmdPush::NAME, matches)) => Commands::Push(CmdPush::from(matches)),
            Some((CmdDav::NAME, matches)) => Commands::Dav(CmdDav::from(matches)),
            _ => return Err("No command given".into()),
        };

        let config = matches.get_one("config").cloned();
        Ok(Cli { config, command })
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Upload files as if they had just been saved
    Push(CmdPush),

    /// Run a single `WebDAV` request
    Dav(CmdDav),
}

impl Commands {
    /// Run the command with the given configuration
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        match self {
            Commands::Push(a) => a.run(config).await,
            Commands::Dav(a) => a.run(config).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd_dav::DavAction;

    #[test]
    fn test_parse_config() {
        let cli = Cli::try_parse_from(vec!["test", "-c", "/tmp/davsync.toml", "push", "a.txt"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/davsync.toml")));
        assert!(matches!(cli.command, Commands::Push(_)));
    }

    #[test]
    fn test_parse_requires_command() {
        assert!(Cli::try_parse_from(vec!["test"]).is_err());
    }

    #[test]
    fn test_parse_push() {
        let args = vec!["test", "push", "-r", "/ws/a", "--root", "/ws/b", "-j", "3", "x", "y"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Push(cmd) => {
                assert_eq!(cmd.roots, vec![PathBuf::from("/ws/a"), PathBuf::from("/ws/b")]);
                assert_eq!(cmd.files, vec![PathBuf::from("x"), PathBuf::from("y")]);
                assert_eq!(cmd.jobs, 3);
            }
            Commands::Dav(_) => panic!("Expected Push command"),
        }
    }

    #[test]
    fn test_parse_push_defaults() {
        let cli = Cli::try_parse_from(vec!["test", "push", "a.txt"]).unwrap();
        match cli.command {
            Commands::Push(cmd) => {
                assert!(cmd.roots.is_empty());
                assert_eq!(cmd.jobs, 1);
            }
            Commands::Dav(_) => panic!("Expected Push command"),
        }
    }

    #[test]
    fn test_parse_push_requires_files_and_workers() {
        assert!(Cli::try_parse_from(vec!["test", "push"]).is_err());
        assert!(Cli::try_parse_from(vec!["test", "push", "-j", "0", "a.txt"]).is_err());
    }

    #[test]
    fn test_parse_dav_ls() {
        let cli = Cli::try_parse_from(vec!["test", "dav", "ls"]).unwrap();
        match cli.command {
            Commands::Dav(cmd) => assert_eq!(
                cmd.action,
                DavAction::List {
                    path: String::new()
                }
            ),
            Commands::Push(_) => panic!("Expected Dav command"),
        }
    }

    #[test]
    fn test_parse_dav_put() {
        let cli = Cli::try_parse_from(vec!["test", "dav", "put", "notes.md"]).unwrap();
        match cli.command {
            Commands::Dav(cmd) => assert_eq!(
                cmd.action,
                DavAction::Put {
                    local: PathBuf::from("notes.md"),
                    remote: None,
                }
            ),
            Commands::Push(_) => panic!("Expected Dav command"),
        }
    }

    #[test]
    fn test_parse_dav_mv() {
        let cli = Cli::try_parse_from(vec!["test", "dav", "mv", "a", "b"]).unwrap();
        match cli.command {
            Commands::Dav(cmd) => assert_eq!(
                cmd.action,
                DavAction::Move {
                    src: "a".to_string(),
                    dst: "b".to_string(),
                }
            ),
            Commands::Push(_) => panic!("Expected Dav command"),
        }
    }
}
