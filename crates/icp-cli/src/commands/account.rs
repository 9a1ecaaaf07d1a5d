use anyhow::{Context, Result};
use colored::Colorize;

use crate::bootstrap::AppBootstrap;
use crate::terminal::format_clock;

pub async fn login(app: &AppBootstrap, token: &str) -> Result<()> {
    let claims = app
        .auth
        .set_token(token.trim().to_string())
        .await
        .context("The token could not be read")?;

    let who = match (&claims.name, &claims.email) {
        (Some(name), Some(email)) => format!("{} <{}>", name, email),
        (Some(name), None) => name.clone(),
        (None, Some(email)) => email.clone(),
        (None, None) => "unknown user".to_string(),
    };
    println!("{}", format!("Signed in as {}", who).bright_green());
    if let Some(secs) = app.auth.remaining_secs() {
        println!(
            "{}",
            format!("Token expires in {}", format_clock(secs)).bright_black()
        );
    }
    if !claims.has_analyzed {
        println!(
            "{}",
            "No resume analysis on file yet. Run `icp profile --job-title <TITLE>` before interviewing."
                .bright_black()
        );
    }
    Ok(())
}

pub async fn logout(app: &AppBootstrap) -> Result<()> {
    app.controller.logout().await?;
    println!("{}", "Signed out. Local data was removed.".bright_green());
    Ok(())
}

pub async fn limits(app: &AppBootstrap) -> Result<()> {
    app.require_sign_in().await?;
    let quota = app
        .controller
        .refresh_quota()
        .await
        .context("Failed to fetch interview limits")?;

    let line = format!(
        "{} of {} interviews left today",
        quota.remaining, quota.limit
    );
    if quota.has_remaining() {
        println!("{}", line.bright_green());
    } else {
        println!("{}", line.yellow());
    }
    Ok(())
}

/// Shows the account, the cached session and device preferences.
///
/// Reads local state only, apart from a best-effort quota fetch, so a
/// cached session is never restored or discarded here.
pub async fn status(app: &AppBootstrap) -> Result<()> {
    let claims = app.auth.init().await?;
    let state = app.repository.get_state().await?;

    match claims {
        Some(claims) => {
            let name = claims
                .name
                .or(claims.email)
                .unwrap_or_else(|| "signed in".to_string());
            println!("{}", format!("Account: {}", name).bright_green());
            if let Some(secs) = app.auth.remaining_secs() {
                println!("Token expires in {}", format_clock(secs));
            }
            match app.controller.refresh_quota().await {
                Ok(quota) => println!(
                    "Interviews left today: {} of {}",
                    quota.remaining, quota.limit
                ),
                Err(e) => println!("{}", format!("Interviews left today: unknown ({})", e).yellow()),
            }
        }
        None => println!("{}", "Not signed in".yellow()),
    }

    match &state.session_id {
        Some(id) => {
            println!("Unfinished interview: {}", id);
            if let Some(secs) = state.remaining_time_secs {
                println!("  Time left: {}", format_clock(secs));
            }
            if state.invalid_attempts > 0 {
                println!("  Invalid answers so far: {}", state.invalid_attempts);
            }
        }
        None => println!("No unfinished interview"),
    }

    if let Some(title) = state
        .resume_profile
        .as_ref()
        .and_then(|profile| profile.job_title.as_deref())
    {
        println!("Preparing for: {}", title);
    }

    println!(
        "{}",
        format!(
            "Speaker: {}  Microphone: {}  Camera: {}  Voice: {}",
            on_off(state.speaker_enabled),
            on_off(state.mic_enabled),
            on_off(state.camera_enabled),
            state.voice_gender
        )
        .bright_black()
    );
    if let Ok(dir) = app.paths.config_dir() {
        println!("{}", format!("Config: {}", dir.display()).bright_black());
    }
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
