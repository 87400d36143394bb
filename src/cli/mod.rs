//! CLI entry point for convex-deck.

pub mod app;
pub mod auth;
pub mod browse;
pub mod errors;
pub mod logs;

use clap::{Parser, Subcommand};

use crate::api::FunctionKind;
use crate::logs::{FunctionType, LogStatus};

/// Convex Deck CLI
#[derive(Parser, Debug)]
#[command(name = "convex-deck", version, about = "Browse and operate Convex projects")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// Show or change the selected team / project / deployment
    Context(ContextArgs),
    /// List teams
    Teams,
    /// List projects of the selected team
    Projects,
    /// List deployments of the selected project
    Deployments,
    /// Run a function on the selected deployment
    Run(RunArgs),
    /// List tables of the selected deployment
    Tables,
    /// Page through a table's documents
    Documents(DocumentsArgs),
    /// Tail function logs of the selected deployment
    Logs(LogsArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands for login, status, and logout.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in with the device-code flow
    Login,
    /// Show authentication status
    Status,
    /// Sign out and forget the selection
    Logout,
}

#[derive(Parser, Debug)]
pub struct ContextArgs {
    #[command(subcommand)]
    pub command: Option<ContextCommands>,
}

#[derive(Subcommand, Debug)]
pub enum ContextCommands {
    /// Print the current selection
    Show,
    /// Select a team (clears project and deployment)
    Team { id: String },
    /// Select a project (clears deployment)
    Project { id: String },
    /// Select a deployment
    Deployment { name: String },
    /// Drop the innermost selection
    Back,
    /// Clear the whole selection
    Clear,
}

/// Arguments for `convex-deck run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Function path, e.g. `messages:send`
    pub path: String,

    /// Function kind (query, mutation, action)
    #[arg(short, long, default_value = "query")]
    pub kind: FunctionKind,

    /// Arguments as a JSON object
    #[arg(short, long, default_value = "{}")]
    pub args: String,
}

/// Arguments for `convex-deck documents`.
#[derive(Parser, Debug)]
pub struct DocumentsArgs {
    pub table: String,

    /// Page size
    #[arg(short, long, default_value = "25")]
    pub limit: usize,

    /// Continue from a previous page
    #[arg(long)]
    pub cursor: Option<String>,
}

/// Arguments for `convex-deck logs`.
#[derive(Parser, Debug)]
pub struct LogsArgs {
    /// Only functions whose path contains this text
    #[arg(short, long)]
    pub function: Option<String>,

    /// Only this function type (query, mutation, action, httpaction)
    #[arg(short = 't', long = "type")]
    pub function_type: Option<FunctionType>,

    /// Only this status (success, failure)
    #[arg(short, long)]
    pub status: Option<LogStatus>,

    /// Only this request id
    #[arg(short, long)]
    pub request: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_auth_login() {
        let cli = Cli::try_parse_from(["convex-deck", "auth", "login"]).unwrap();
        match cli.command {
            Commands::Auth(auth) => assert!(matches!(auth.command, AuthCommands::Login)),
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn parse_context_team() {
        let cli = Cli::try_parse_from(["convex-deck", "context", "team", "42"]).unwrap();
        match cli.command {
            Commands::Context(ContextArgs {
                command: Some(ContextCommands::Team { id }),
            }) => assert_eq!(id, "42"),
            other => panic!("expected Context team, got {other:?}"),
        }
    }

    #[test]
    fn parse_bare_context_shows() {
        let cli = Cli::try_parse_from(["convex-deck", "context"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Context(ContextArgs { command: None })
        ));
    }

    #[test]
    fn parse_run_with_defaults() {
        let cli = Cli::try_parse_from(["convex-deck", "run", "messages:list"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.path, "messages:list");
                assert_eq!(args.kind, FunctionKind::Query);
                assert_eq!(args.args, "{}");
            }
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn parse_run_mutation_with_args() {
        let cli = Cli::try_parse_from([
            "convex-deck",
            "run",
            "messages:send",
            "--kind",
            "mutation",
            "--args",
            r#"{"body":"hi"}"#,
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.kind, FunctionKind::Mutation);
                assert_eq!(args.args, r#"{"body":"hi"}"#);
            }
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn parse_logs_filters() {
        let cli = Cli::try_parse_from([
            "convex-deck",
            "logs",
            "--function",
            "messages",
            "--status",
            "failure",
            "--type",
            "mutation",
        ])
        .unwrap();
        match cli.command {
            Commands::Logs(args) => {
                assert_eq!(args.function.as_deref(), Some("messages"));
                assert_eq!(args.status, Some(LogStatus::Failure));
                assert_eq!(args.function_type, Some(FunctionType::Mutation));
                assert!(args.request.is_none());
            }
            other => panic!("expected Logs, got {other:?}"),
        }
    }

    #[test]
    fn parse_unknown_kind_is_error() {
        assert!(Cli::try_parse_from(["convex-deck", "run", "x:y", "--kind", "cron"]).is_err());
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["convex-deck"]).is_err());
    }
}
