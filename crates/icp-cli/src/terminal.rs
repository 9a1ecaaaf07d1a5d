//! Terminal rendering of prompts, notices and transcript turns.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use colored::Colorize;
use tokio::sync::oneshot;

use icp_core::error::IcpError;
use icp_core::prompt::{ConfirmPrompt, Notice, NoticeLevel, PromptAnswer, UserPrompt};
use icp_core::session::{Role, Turn};

struct PendingAnswer {
    id: u64,
    reply: oneshot::Sender<PromptAnswer>,
}

/// A [`UserPrompt`] that asks yes/no questions on the terminal.
///
/// The REPL owns stdin, so a confirmation does not read input itself: it
/// parks a reply slot and the REPL routes the next typed line into it
/// through [`TerminalPrompt::answer`].
#[derive(Default)]
pub struct TerminalPrompt {
    pending: Mutex<Option<PendingAnswer>>,
    next_id: AtomicU64,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands `line` to the open confirmation. Returns `false` when nothing
    /// is waiting for an answer.
    pub fn answer(&self, line: &str) -> bool {
        let Some(pending) = self.slot().take() else {
            return false;
        };
        let answer = if is_affirmative(line) {
            PromptAnswer::Confirmed
        } else {
            PromptAnswer::Declined
        };
        // The asker may have timed out in the meantime.
        let _ = pending.reply.send(answer);
        true
    }

    #[cfg(test)]
    fn is_waiting(&self) -> bool {
        self.slot().is_some()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<PendingAnswer>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Clears the reply slot when a confirmation is abandoned, so a late line
/// is not taken as the answer to a prompt nobody awaits.
struct ClearOnDrop<'a> {
    prompt: &'a TerminalPrompt,
    id: u64,
}

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        let mut slot = self.prompt.slot();
        if slot.as_ref().is_some_and(|pending| pending.id == self.id) {
            *slot = None;
        }
    }
}

#[async_trait]
impl UserPrompt for TerminalPrompt {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> PromptAnswer {
        let (reply, answer) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        // A newer prompt supersedes an older one; the older one reads as declined.
        *self.slot() = Some(PendingAnswer { id, reply });
        let _guard = ClearOnDrop { prompt: self, id };

        println!();
        println!("{}", prompt.title.bright_yellow().bold());
        println!("{}", prompt.message.yellow());
        println!(
            "{}",
            format!(
                "[y] {}  [n] {}",
                prompt.confirm_label, prompt.cancel_label
            )
            .bright_black()
        );

        answer.await.unwrap_or(PromptAnswer::Declined)
    }

    fn notify(&self, notice: &Notice) {
        println!("{}", render_notice(notice));
    }
}

pub fn is_affirmative(line: &str) -> bool {
    matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "ok" | "continue"
    )
}

pub fn render_notice(notice: &Notice) -> String {
    let line = format!("[{}] {}", notice.title, notice.message);
    match notice.level {
        NoticeLevel::Info => line.bright_green().to_string(),
        NoticeLevel::Warning => line.yellow().to_string(),
        NoticeLevel::Error => line.red().to_string(),
    }
}

pub fn print_turn(turn: &Turn) {
    match turn.role {
        Role::Ai => {
            println!("{}", "[Interviewer]".bright_magenta());
            for line in turn.text.lines() {
                println!("{}", line.bright_blue());
            }
            println!();
        }
        Role::User => {
            println!("{}", format!("> {}", turn.text).green());
        }
    }
}

/// Prints an error, using the friendly wording for local precondition
/// failures.
pub fn print_error(error: &IcpError) {
    match error.guidance() {
        Some(guidance) => println!("{}", guidance.to_string().yellow()),
        None => eprintln!("{}", format!("Error: {}", error).red()),
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_answer_without_prompt_is_not_consumed() {
        let prompt = TerminalPrompt::new();
        assert!(!prompt.is_waiting());
        assert!(!prompt.answer("yes"));
    }

    #[tokio::test]
    async fn test_typed_line_answers_open_prompt() {
        let prompt = Arc::new(TerminalPrompt::new());
        let asker = prompt.clone();
        let handle =
            tokio::spawn(async move { asker.confirm(&ConfirmPrompt::end_interview()).await });

        while !prompt.is_waiting() {
            tokio::task::yield_now().await;
        }
        assert!(prompt.answer(" Y "));
        assert_eq!(handle.await.unwrap(), PromptAnswer::Confirmed);
        assert!(!prompt.is_waiting());
    }

    #[tokio::test]
    async fn test_anything_but_yes_declines() {
        let prompt = Arc::new(TerminalPrompt::new());
        let asker = prompt.clone();
        let handle = tokio::spawn(async move { asker.confirm(&ConfirmPrompt::inactivity()).await });

        while !prompt.is_waiting() {
            tokio::task::yield_now().await;
        }
        assert!(prompt.answer("pause"));
        assert_eq!(handle.await.unwrap(), PromptAnswer::Declined);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_prompt_releases_the_slot() {
        let prompt = TerminalPrompt::new();
        let outcome = tokio::time::timeout(
            Duration::from_secs(10),
            prompt.confirm(&ConfirmPrompt::presence()),
        )
        .await;

        assert!(outcome.is_err());
        assert!(!prompt.is_waiting());
        assert!(!prompt.answer("yes"));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(1200), "20:00");
    }
}
