//! The interactive interview loop.
//!
//! rustyline runs on its own thread and forwards lines over a channel. The
//! async side multiplexes those lines with controller events, so transcript
//! updates and timer prompts show up while the user is typing.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};

use icp_application::{EndOutcome, InterviewController, SubmitOutcome};
use icp_core::session::{ControllerEvent, EndReason, SessionPhase};
use icp_core::state::VoiceGender;

use crate::terminal::{TerminalPrompt, format_clock, print_error, print_turn};

const COMMANDS: &[&str] = &[
    "/help", "/send", "/end", "/mic", "/speaker", "/camera", "/voice", "/status", "/resume",
    "/logout", "/quit",
];

const HELP: &str = "\
Type your answer and press Enter to send it.
  /send              send the current draft (speech input)
  /end               end the interview and get your score
  /mic               start or stop speech capture
  /speaker on|off    read questions aloud
  /camera on|off     presence monitoring
  /voice female|male interviewer voice
  /status            progress and time left
  /resume            continue a paused interview
  /logout            sign out and wipe local data
  /quit              leave; the interview can be resumed later";

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone, Default)]
struct CliHelper;

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Runs the loop until the interview finishes or the user leaves.
pub async fn run(
    controller: Arc<InterviewController>,
    prompt: Arc<TerminalPrompt>,
    mut events: broadcast::Receiver<ControllerEvent>,
) -> Result<()> {
    let (line_tx, mut lines) = mpsc::unbounded_channel::<String>();
    spawn_reader(line_tx);

    println!("{}", "=== Interview ===".bright_magenta().bold());
    println!("{}", "Type '/help' for commands.".bright_black());
    println!();

    let mut printer = EventPrinter::default();
    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                };
                if prompt.answer(&line) {
                    continue;
                }
                if dispatch(&controller, line.trim()).await == Flow::Quit {
                    break;
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if printer.render(event) == Flow::Quit {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Repl] Dropped {} controller events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

fn spawn_reader(lines: mpsc::UnboundedSender<String>) {
    std::thread::spawn(move || {
        let mut rl = match Editor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("{}", format!("Error: {:?}", e).red());
                return;
            }
        };
        rl.set_helper(Some(CliHelper));

        loop {
            match rl.readline(">> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line.as_str());
                    if lines.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type '/quit' to leave.".yellow());
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("{}", format!("Error: {:?}", err).red());
                    break;
                }
            }
        }
    });
}

async fn dispatch(controller: &Arc<InterviewController>, line: &str) -> Flow {
    controller.note_interaction().await;

    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    if !command.starts_with('/') {
        let controller = controller.clone();
        let answer = line.to_string();
        tokio::spawn(async move {
            report_submit(controller.submit_answer(&answer).await);
        });
        return Flow::Continue;
    }

    match command {
        "/help" => println!("{}", HELP.bright_black()),
        "/send" => {
            let controller = controller.clone();
            tokio::spawn(async move {
                report_submit(controller.submit_draft().await);
            });
        }
        "/end" => {
            let controller = controller.clone();
            tokio::spawn(async move {
                match controller.end_interview(EndReason::UserRequested).await {
                    Ok(EndOutcome::Cancelled) => {
                        println!("{}", "Continuing the interview.".bright_black());
                    }
                    Ok(EndOutcome::Ended(_)) => {}
                    Err(e) => print_error(&e),
                }
            });
        }
        "/mic" => match controller.toggle_mic().await {
            Ok(true) => {}
            Ok(false) => println!("{}", "Microphone off.".bright_black()),
            Err(e) => print_error(&e),
        },
        "/speaker" => match parse_switch(arg) {
            Some(on) => controller.set_speaker_enabled(on).await,
            None => println!("{}", "Usage: /speaker on|off".yellow()),
        },
        "/camera" => match parse_switch(arg) {
            Some(on) => controller.set_camera_enabled(on).await,
            None => println!("{}", "Usage: /camera on|off".yellow()),
        },
        "/voice" => match arg.parse::<VoiceGender>() {
            Ok(gender) => {
                controller.set_voice_gender(gender).await;
                println!("{}", format!("Interviewer voice: {}", gender).bright_black());
            }
            Err(_) => println!("{}", "Usage: /voice female|male".yellow()),
        },
        "/status" => {
            let view = controller.snapshot().await;
            if let Some(progress) = view.progress_label() {
                println!("{}", progress.bright_black());
            }
            if let Some(secs) = view.remaining_secs {
                println!("{}", format!("Time left: {}", format_clock(secs)).bright_black());
            }
            println!(
                "{}",
                format!(
                    "Invalid answers: {}/{}",
                    view.invalid_attempts, view.invalid_threshold
                )
                .bright_black()
            );
        }
        "/resume" => {
            let controller = controller.clone();
            tokio::spawn(async move {
                match controller.resume().await {
                    Ok(true) => {}
                    Ok(false) => println!("{}", "The interview could not be resumed.".yellow()),
                    Err(e) => print_error(&e),
                }
            });
        }
        "/logout" => {
            if let Err(e) = controller.logout().await {
                print_error(&e);
            }
            println!("{}", "Signed out.".bright_green());
            return Flow::Quit;
        }
        "/quit" | "/exit" => {
            if controller.phase().await.holds_session() {
                println!(
                    "{}",
                    "Your interview is saved. Run `icp resume` to continue.".bright_green()
                );
            } else {
                println!("{}", "Goodbye!".bright_green());
            }
            return Flow::Quit;
        }
        _ => println!("{}", "Unknown command. Type '/help'.".bright_black()),
    }
    Flow::Continue
}

fn report_submit(outcome: icp_core::Result<SubmitOutcome>) {
    match outcome {
        Ok(SubmitOutcome::Rejected {
            attempts,
            threshold,
        }) => {
            println!(
                "{}",
                format!("Invalid answer {}/{}", attempts, threshold).yellow()
            );
        }
        Ok(_) => {}
        Err(e) => print_error(&e),
    }
}

fn parse_switch(arg: &str) -> Option<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Minute marks plus the last 30 and 10 seconds.
fn should_announce(remaining_secs: u64) -> bool {
    remaining_secs > 0
        && (remaining_secs % 300 == 0 || matches!(remaining_secs, 60 | 30 | 10))
}

pub fn print_result(readiness_score: Option<u8>, feedback: &str) {
    println!();
    println!("{}", "=== Interview Complete ===".bright_magenta().bold());
    let score = match readiness_score {
        Some(score) => format!("{}/100", score),
        None => "N/A".to_string(),
    };
    println!("{}", format!("Readiness Score: {}", score).bright_green().bold());
    for line in feedback.lines() {
        println!("{}", line.bright_blue());
    }
    println!();
}

#[derive(Default)]
struct EventPrinter {
    recording: bool,
}

impl EventPrinter {
    fn render(&mut self, event: ControllerEvent) -> Flow {
        match event {
            ControllerEvent::TurnAppended { turn } => print_turn(&turn),
            ControllerEvent::TranscriptReplaced { turns } => turns.iter().for_each(print_turn),
            ControllerEvent::TurnRetracted => {
                println!(
                    "{}",
                    "Answer not sent. It is back in your draft; type /send to retry."
                        .bright_black()
                );
            }
            ControllerEvent::DraftChanged { draft } => {
                if self.recording && !draft.is_empty() {
                    println!("{}", format!("\u{2026} {}", draft).bright_black());
                }
            }
            ControllerEvent::Recording { recording } => {
                self.recording = recording;
                if recording {
                    println!(
                        "{}",
                        "Listening. Type /send when done, /mic to stop.".bright_black()
                    );
                }
            }
            ControllerEvent::Presence { face_detected } => {
                if !face_detected {
                    println!("{}", "Face not detected.".yellow());
                }
            }
            ControllerEvent::InterviewClock { remaining_secs } => {
                if should_announce(remaining_secs) {
                    println!(
                        "{}",
                        format!("{} left", format_clock(remaining_secs)).bright_black()
                    );
                }
            }
            ControllerEvent::AuthClock { remaining_secs } => {
                if remaining_secs == 60 {
                    println!("{}", "Your sign-in expires in one minute.".yellow());
                }
            }
            ControllerEvent::PhaseChanged { phase } => match phase {
                SessionPhase::Paused(reason) => {
                    println!("{}", format!("{}. Type /resume to continue.", reason).yellow());
                }
                SessionPhase::Idle => {
                    println!("{}", "The interview was closed.".yellow());
                    return Flow::Quit;
                }
                _ => {}
            },
            ControllerEvent::Finished {
                readiness_score,
                feedback,
            } => {
                print_result(readiness_score, &feedback);
                return Flow::Quit;
            }
            // Notices are printed by the prompt.
            ControllerEvent::Notice { .. }
            | ControllerEvent::Speaking { .. }
            | ControllerEvent::QuotaChanged { .. } => {}
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icp_core::session::{EndKind, PauseReason, Turn};

    #[test]
    fn test_finished_event_ends_the_loop() {
        let mut printer = EventPrinter::default();
        let flow = printer.render(ControllerEvent::Finished {
            readiness_score: Some(72),
            feedback: "Solid answers.".to_string(),
        });
        assert_eq!(flow, Flow::Quit);
    }

    #[test]
    fn test_pause_and_turns_keep_the_loop_running() {
        let mut printer = EventPrinter::default();
        assert_eq!(
            printer.render(ControllerEvent::PhaseChanged {
                phase: SessionPhase::Paused(PauseReason::Inactivity),
            }),
            Flow::Continue
        );
        assert_eq!(
            printer.render(ControllerEvent::TurnAppended {
                turn: Turn::ai("Tell me about yourself."),
            }),
            Flow::Continue
        );
        assert_eq!(
            printer.render(ControllerEvent::PhaseChanged {
                phase: SessionPhase::Ended(EndKind::Normal),
            }),
            Flow::Continue
        );
    }

    #[test]
    fn test_sign_out_ends_the_loop() {
        let mut printer = EventPrinter::default();
        let flow = printer.render(ControllerEvent::PhaseChanged {
            phase: SessionPhase::Idle,
        });
        assert_eq!(flow, Flow::Quit);
    }

    #[test]
    fn test_recording_state_is_tracked() {
        let mut printer = EventPrinter::default();
        printer.render(ControllerEvent::Recording { recording: true });
        assert!(printer.recording);
        printer.render(ControllerEvent::Recording { recording: false });
        assert!(!printer.recording);
    }

    #[test]
    fn test_clock_announcements() {
        assert!(should_announce(600));
        assert!(should_announce(60));
        assert!(should_announce(10));
        assert!(!should_announce(0));
        assert!(!should_announce(59));
        assert!(!should_announce(119));
    }

    #[test]
    fn test_parse_switch() {
        assert_eq!(parse_switch("ON"), Some(true));
        assert_eq!(parse_switch("off"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }
}
