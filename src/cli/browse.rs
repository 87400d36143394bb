//! Handlers for navigation, listing and deployment commands.

use super::app::App;
use super::{ContextCommands, DocumentsArgs, RunArgs};
use crate::api::FunctionOutcome;
use crate::error::{DeckError, Result};
use crate::navigation::{NavigationCommand, SelectedContext};

pub fn print_context(context: &SelectedContext) {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    println!("team:       {}", show(&context.team_id));
    println!("project:    {}", show(&context.project_id));
    println!("deployment: {}", show(&context.deployment_name));
}

/// Handle `convex-deck context ...`.
pub fn handle_context(app: &App, command: Option<ContextCommands>) -> Result<()> {
    let mut navigator = app.navigator()?;
    let command = match command.unwrap_or(ContextCommands::Show) {
        ContextCommands::Show => {
            print_context(navigator.context());
            return Ok(());
        }
        ContextCommands::Team { id } => NavigationCommand::SelectTeam(id),
        ContextCommands::Project { id } => NavigationCommand::SelectProject(id),
        ContextCommands::Deployment { name } => NavigationCommand::SelectDeployment(name),
        ContextCommands::Back => NavigationCommand::Back,
        ContextCommands::Clear => NavigationCommand::Reset,
    };
    print_context(navigator.dispatch(command)?);
    Ok(())
}

pub async fn handle_teams(app: &App) -> Result<()> {
    let selected = app.navigator()?.context().team_id.clone();
    for team in app.dashboard()?.list_teams().await? {
        let marker = if selected.as_deref() == Some(team.id.as_str()) { "*" } else { " " };
        println!("{marker} {:<10} {:<24} {}", team.id, team.slug, team.name);
    }
    Ok(())
}

pub async fn handle_projects(app: &App) -> Result<()> {
    let navigator = app.navigator()?;
    let team_id = navigator.context().require_team()?;
    let selected = navigator.context().project_id.as_deref();
    for project in app.dashboard()?.list_projects(team_id).await? {
        let marker = if selected == Some(project.id.as_str()) { "*" } else { " " };
        println!("{marker} {:<10} {:<24} {}", project.id, project.slug, project.name);
    }
    Ok(())
}

pub async fn handle_deployments(app: &App) -> Result<()> {
    let navigator = app.navigator()?;
    let project_id = navigator.context().require_project()?;
    let selected = navigator.context().deployment_name.as_deref();
    for deployment in app.dashboard()?.list_deployments(project_id).await? {
        let marker = if selected == Some(deployment.name.as_str()) { "*" } else { " " };
        let preview = deployment.preview_identifier.unwrap_or_default();
        println!(
            "{marker} {:<32} {:<8} {preview}",
            deployment.name,
            deployment.deployment_type.to_string()
        );
    }
    Ok(())
}

/// Handle `convex-deck run`.
pub async fn handle_run(app: &App, args: RunArgs) -> Result<()> {
    let function_args: serde_json::Value = serde_json::from_str(&args.args)
        .map_err(|e| DeckError::InvalidArgument(format!("--args is not valid JSON: {e}")))?;
    if !function_args.is_object() {
        return Err(DeckError::InvalidArgument(
            "--args must be a JSON object".to_string(),
        ));
    }

    let client = app.deployment_client().await?;
    let outcome = client
        .run_function(args.kind, &args.path, function_args)
        .await?;
    for line in outcome.log_lines() {
        eprintln!("  {line}");
    }
    match outcome {
        FunctionOutcome::Success { value, .. } => {
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        FunctionOutcome::Failure { message, .. } => {
            eprintln!("❌ {message}");
        }
    }
    Ok(())
}

pub async fn handle_tables(app: &App) -> Result<()> {
    for table in app.deployment_client().await?.list_tables().await? {
        println!("{table}");
    }
    Ok(())
}

/// Handle `convex-deck documents`.
pub async fn handle_documents(app: &App, args: DocumentsArgs) -> Result<()> {
    if args.limit == 0 {
        return Err(DeckError::InvalidArgument(
            "--limit must be at least 1".to_string(),
        ));
    }
    let page = app
        .deployment_client()
        .await?
        .list_documents(&args.table, args.cursor.as_deref(), args.limit)
        .await?;
    for document in &page.page {
        println!("{document}");
    }
    match (page.is_done, page.continue_cursor) {
        (false, Some(cursor)) => eprintln!("… more: --cursor {cursor}"),
        _ => eprintln!("({} documents, end of table)", page.page.len()),
    }
    Ok(())
}
