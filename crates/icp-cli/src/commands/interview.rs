use anyhow::Result;
use colored::Colorize;

use icp_core::error::{Guidance, IcpError};
use icp_core::session::Difficulty;
use icp_core::state::ResumeProfile;

use crate::bootstrap::AppBootstrap;
use crate::repl;
use crate::terminal::{format_clock, print_turn};

/// Starts a new interview, or re-enters the one an earlier run left behind.
pub async fn start(
    app: &AppBootstrap,
    difficulty: Difficulty,
    questions: Option<u32>,
    job_title: Option<String>,
) -> Result<()> {
    app.initialize().await?;
    // Subscribe first so the opening question is rendered by the loop.
    let events = app.controller.subscribe();

    if app.controller.phase().await.holds_session() {
        println!(
            "{}",
            "You have an unfinished interview. Picking it up where you left off.".bright_green()
        );
        print_progress(app).await;
    } else {
        let questions = questions.unwrap_or(app.settings.default_questions);
        let job_context = job_title.map(|title| ResumeProfile {
            job_title: Some(title),
            resume_feedback: None,
        });

        println!(
            "{}",
            format!("Starting a {} interview ({} questions)...", difficulty, questions)
                .bright_black()
        );
        if let Err(e) = app.controller.start(difficulty, questions, job_context).await {
            return explain_start_failure(e);
        }
    }

    repl::run(app.controller.clone(), app.prompt.clone(), events).await
}

/// Continues an interrupted interview, if there is one.
pub async fn resume(app: &AppBootstrap) -> Result<()> {
    app.require_sign_in().await?;
    app.initialize().await?;
    let events = app.controller.subscribe();

    if !app.controller.phase().await.holds_session() {
        println!("{}", "There is no unfinished interview to resume.".yellow());
        return Ok(());
    }

    print_progress(app).await;
    repl::run(app.controller.clone(), app.prompt.clone(), events).await
}

async fn print_progress(app: &AppBootstrap) {
    let view = app.controller.snapshot().await;
    for turn in &view.transcript {
        print_turn(turn);
    }
    if let Some(progress) = view.progress_label() {
        println!("{}", progress.bright_black());
    }
    if let Some(secs) = view.remaining_secs {
        println!("{}", format!("Time left: {}", format_clock(secs)).bright_black());
    }
}

fn explain_start_failure(error: IcpError) -> Result<()> {
    let Some(guidance) = error.guidance() else {
        return Err(anyhow::Error::new(error).context("Failed to start the interview"));
    };

    println!("{}", guidance.to_string().yellow());
    let hint = match guidance {
        Guidance::SignIn => Some("Run `icp login <TOKEN>` to sign in."),
        Guidance::QuotaExhausted => Some("Run `icp limits` to check your remaining attempts."),
        Guidance::UploadResume { .. } => {
            Some("Run `icp profile --job-title <TITLE>` to set the role you are preparing for.")
        }
        Guidance::EmptyAnswer => None,
    };
    if let Some(hint) = hint {
        println!("{}", hint.bright_black());
    }
    Ok(())
}
