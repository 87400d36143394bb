//! convex-deck binary entry point.

use clap::Parser;
use convex_deck::cli::app::App;
use convex_deck::cli::errors::format_error_help;
use convex_deck::cli::{auth, browse, logs, AuthCommands, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let app = App::from_env();
    let result = match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login => auth::handle_login(&app).await,
            AuthCommands::Status => auth::handle_status(&app).await,
            AuthCommands::Logout => auth::handle_logout(&app).await,
        },
        Commands::Context(args) => browse::handle_context(&app, args.command),
        Commands::Teams => browse::handle_teams(&app).await,
        Commands::Projects => browse::handle_projects(&app).await,
        Commands::Deployments => browse::handle_deployments(&app).await,
        Commands::Run(args) => browse::handle_run(&app, args).await,
        Commands::Tables => browse::handle_tables(&app).await,
        Commands::Documents(args) => browse::handle_documents(&app, args).await,
        Commands::Logs(args) => logs::handle_logs(&app, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error_help(&e));
        std::process::exit(1);
    }
}
