//! [`Args`] definitions.

use clap::{Parser, Subcommand};

/// Client of the learning-plan service.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// [`Command`] to perform.
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

/// Command to perform.
#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Registers a new user.
    Register {
        /// Name of the new user.
        username: String,

        /// Password of the new user (at least 6 characters).
        #[arg(short, long)]
        password: String,
    },

    /// Logs in, remembering the session.
    Login {
        /// Name of the user.
        username: String,

        /// Password of the user.
        #[arg(short, long)]
        password: String,
    },

    /// Forgets the current session.
    Logout,

    /// Prints the current user.
    Whoami,

    /// Generates a learning plan for an interest.
    Generate {
        /// Field to learn about.
        interest: String,
    },

    /// Generates a learning plan and saves it as a ticket.
    Save {
        /// Field to learn about, used as the ticket topic.
        interest: String,
    },

    /// Lists saved tickets.
    Tickets,

    /// Prints a saved ticket with its resources.
    Show {
        /// ID of the ticket.
        id: u64,
    },

    /// Flips the completion status of a saved ticket.
    Toggle {
        /// ID of the ticket.
        id: u64,
    },
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::{Args, Command};

    #[test]
    fn parses_subcommands() {
        let args =
            Args::try_parse_from(["app", "login", "alice", "-p", "secret"])
                .unwrap();

        assert_eq!(args.config, "config.toml");
        assert!(matches!(
            args.command,
            Command::Login { username, password }
                if username == "alice" && password == "secret",
        ));

        let args =
            Args::try_parse_from(["app", "-c", "dev.toml", "toggle", "3"])
                .unwrap();
        assert_eq!(args.config, "dev.toml");
        assert!(matches!(args.command, Command::Toggle { id: 3 }));
    }

    #[test]
    fn requires_subcommand() {
        assert!(Args::try_parse_from(["app"]).is_err());
    }
}
