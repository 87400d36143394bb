//! CLI auth command handlers for login, status, and logout.

use tokio_util::sync::CancellationToken;

use super::app::App;
use crate::error::Result;

/// Handle `convex-deck auth login`.
pub async fn handle_login(app: &App) -> Result<()> {
    let auth = app.auth_client();
    if let Some(session) = auth.current_session()? {
        println!("✅ Already signed in ({})", describe_expiry(&session));
        println!("   Run `convex-deck auth logout` first to switch accounts.");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let result = auth
        .login(
            |authz| {
                println!("🔗 Visit: {}", authz.browser_uri());
                println!("📋 Enter code: {}", authz.user_code);
                println!("⏳ Waiting for authorization...");
            },
            &cancel,
        )
        .await?;

    match result {
        Some(session) => println!("✅ Signed in ({})", describe_expiry(&session)),
        None => println!("⚠️  Sign-in cancelled"),
    }
    Ok(())
}

/// Handle `convex-deck auth status`.
pub async fn handle_status(app: &App) -> Result<()> {
    match app.auth_client().current_session()? {
        Some(session) => println!("✅ Signed in ({})", describe_expiry(&session)),
        None => println!("❌ Not signed in. Run: convex-deck auth login"),
    }
    let navigator = app.navigator()?;
    if !navigator.context().is_empty() {
        super::browse::print_context(navigator.context());
    }
    Ok(())
}

/// Handle `convex-deck auth logout`.
pub async fn handle_logout(app: &App) -> Result<()> {
    app.auth_client().sign_out()?;
    println!("✅ Signed out");
    Ok(())
}

fn describe_expiry(session: &crate::auth::Session) -> String {
    match session.expires_at {
        Some(at) => format!("expires {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => "no expiry".to_string(),
    }
}
