use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use icp_core::state::{ClientState, ResumeProfile};

use crate::bootstrap::AppBootstrap;

/// Stores (or clears) the resume analysis sent along with new interviews.
///
/// The feedback file must contain JSON; it is forwarded to the backend
/// verbatim.
pub async fn update(
    app: &AppBootstrap,
    job_title: Option<String>,
    feedback_file: Option<&Path>,
    clear: bool,
) -> Result<()> {
    if clear {
        app.repository
            .update(Box::new(|state: &mut ClientState| state.resume_profile = None))
            .await?;
        println!("{}", "Resume profile cleared.".bright_green());
        return Ok(());
    }

    let resume_feedback = match feedback_file {
        Some(path) => Some(read_feedback(path)?),
        None => None,
    };
    if job_title.is_none() && resume_feedback.is_none() {
        anyhow::bail!("Nothing to update. Pass --job-title and/or --feedback-file.");
    }

    let job_title = job_title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let state = app
        .repository
        .update(Box::new(move |state: &mut ClientState| {
            let profile = state.resume_profile.get_or_insert_with(ResumeProfile::default);
            if job_title.is_some() {
                profile.job_title = job_title;
            }
            if resume_feedback.is_some() {
                profile.resume_feedback = resume_feedback;
            }
        }))
        .await?;
    if let Some(profile) = &state.resume_profile {
        print_profile(profile);
    }
    Ok(())
}

fn read_feedback(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str::<serde_json::Value>(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(raw.trim().to_string())
}

fn print_profile(profile: &ResumeProfile) {
    println!("{}", "Resume profile saved.".bright_green());
    if let Some(title) = &profile.job_title {
        println!("  Job title: {}", title);
    }
    if let Some(feedback) = &profile.resume_feedback {
        println!("  Resume analysis: {} bytes", feedback.len());
    }
}
