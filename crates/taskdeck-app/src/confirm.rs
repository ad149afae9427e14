//! Confirmation capability for destructive actions.
//!
//! Screens ask before deleting. The implementation is injected into
//! [`AppState`](crate::state::AppState) so tests and non-interactive runs can
//! answer without a terminal.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};

use tokio::runtime::RuntimeFlavor;
use tracing::{debug, warn};

use crate::config::ConfirmPolicy;

/// Synchronous yes/no prompt
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    /// Ask the user; `true` means proceed
    fn confirm(&self, message: &str) -> bool;
}

/// Boxed confirmation capability as stored in app state
pub type BoxedConfirm = Box<dyn Confirm + Send + Sync>;

/// Fixed answer, no prompt
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, message: &str) -> bool {
        debug!("Auto-answering {:?} with {}", message, self.0);
        self.0
    }
}

/// Prompts on the controlling terminal.
///
/// stdin carries console commands, so the answer is read from `/dev/tty`.
/// Without a terminal the action is declined.
///
/// The prompt runs inside `handler::update`, so the engine processes no
/// other message until it is answered. On a multi-threaded runtime the read
/// happens under `block_in_place`: gateway calls already in flight and the
/// signal handler keep running, and their completions queue up until the
/// answer arrives.
#[derive(Debug, Clone, Copy, Default)]
pub struct TtyConfirm;

impl Confirm for TtyConfirm {
    fn confirm(&self, message: &str) -> bool {
        run_blocking(|| prompt_tty(message))
    }
}

/// Run a blocking read, handing the worker's other tasks off first when the
/// runtime allows it
fn run_blocking<R>(read: impl FnOnce() -> R) -> R {
    let multi_thread = tokio::runtime::Handle::try_current()
        .is_ok_and(|rt| rt.runtime_flavor() == RuntimeFlavor::MultiThread);
    if multi_thread {
        tokio::task::block_in_place(read)
    } else {
        read()
    }
}

fn prompt_tty(message: &str) -> bool {
    let tty = match OpenOptions::new().read(true).open("/dev/tty") {
        Ok(tty) => tty,
        Err(e) => {
            warn!("No terminal for confirmation, declining: {}", e);
            return false;
        }
    };

    let mut stderr = std::io::stderr();
    let _ = write!(stderr, "{} [y/N] ", message);
    let _ = stderr.flush();

    let mut answer = String::new();
    if let Err(e) = BufReader::new(tty).read_line(&mut answer) {
        warn!("Failed to read confirmation: {}", e);
        return false;
    }
    is_yes(&answer)
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Build the confirmation capability for a configured policy
pub fn from_policy(policy: ConfirmPolicy) -> BoxedConfirm {
    match policy {
        ConfirmPolicy::Ask => Box::new(TtyConfirm),
        ConfirmPolicy::Always => Box::new(AutoConfirm(true)),
        ConfirmPolicy::Never => Box::new(AutoConfirm(false)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_confirm() {
        assert!(AutoConfirm(true).confirm("Delete?"));
        assert!(!AutoConfirm(false).confirm("Delete?"));
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_policy_never_declines() {
        assert!(!from_policy(ConfirmPolicy::Never).confirm("Delete?"));
        assert!(from_policy(ConfirmPolicy::Always).confirm("Delete?"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_blocking_read_lets_spawned_tasks_run() {
        let (tx, rx) = std::sync::mpsc::channel();
        tokio::spawn(async move {
            let _ = tx.send("settled");
        });

        let got = run_blocking(|| rx.recv_timeout(std::time::Duration::from_secs(2)));
        assert_eq!(got, Ok("settled"));
    }

    #[tokio::test]
    async fn test_blocking_read_on_current_thread_runtime() {
        assert_eq!(run_blocking(|| 7), 7);
    }
}
