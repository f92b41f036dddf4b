//! Interactive terminal prompting.
//!
//! All user input flows through the `InteractivePrompter` trait so tests can
//! script responses. A validator is a pure function over the trimmed candidate
//! string; on rejection the prompt repeats with the rejection reason, so
//! callers only ever see input that passed validation.

use std::io::{self, BufRead, Write};

/// Pure validation function applied to a trimmed input candidate.
///
/// Returns the rejection reason when the candidate is not acceptable.
pub type Validator = fn(&str) -> Result<(), String>;

/// Blocking line input with validation, plus a non-echoed variant for secrets.
#[async_trait::async_trait]
pub trait InteractivePrompter: Send + Sync {
    /// Prompt for a line of input, re-prompting until `validator` accepts it.
    async fn request_input(&self, prompt: &str, validator: Validator) -> io::Result<String>;

    /// Prompt for secret input with terminal echo suppressed.
    async fn request_input_secure(&self, prompt: &str, validator: Validator) -> io::Result<String>;
}

/// Prompter reading from the controlling terminal
pub struct TerminalPrompter;

#[async_trait::async_trait]
impl InteractivePrompter for TerminalPrompter {
    async fn request_input(&self, prompt: &str, validator: Validator) -> io::Result<String> {
        loop {
            let line = read_terminal_line(prompt).await?;
            let candidate = line.trim().to_string();
            match validator(&candidate) {
                Ok(()) => return Ok(candidate),
                Err(reason) => eprintln!("{reason}"),
            }
        }
    }

    async fn request_input_secure(&self, prompt: &str, validator: Validator) -> io::Result<String> {
        let prompt = format!("{prompt}: ");
        loop {
            let owned_prompt = prompt.clone();
            let secret = tokio::task::spawn_blocking(move || {
                rpassword::prompt_password(owned_prompt)
            })
            .await
            .map_err(io::Error::other)??;

            match validator(secret.trim()) {
                Ok(()) => return Ok(secret),
                Err(reason) => eprintln!("{reason}"),
            }
        }
    }
}

/// Print the prompt and read one line from stdin without blocking the runtime.
async fn read_terminal_line(prompt: &str) -> io::Result<String> {
    let prompt = format!("{prompt}: ");
    tokio::task::spawn_blocking(move || {
        let mut stdout = io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for a response",
            ));
        }
        Ok(line)
    })
    .await
    .map_err(io::Error::other)?
}

/// Trim whitespace and strip a single pair of surrounding double quotes.
pub fn normalize_response(response: &str) -> &str {
    let trimmed = response.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// Validators shared by the wallet lifecycle prompts.
pub mod validators {
    use super::normalize_response;

    /// Rejects empty input.
    pub fn non_empty(candidate: &str) -> Result<(), String> {
        if candidate.trim().is_empty() {
            Err("input cannot be empty, try again".to_string())
        } else {
            Ok(())
        }
    }

    /// Accepts only a literal `OK`, case-insensitively, after normalization.
    pub fn backup_acknowledgment(candidate: &str) -> Result<(), String> {
        if normalize_response(candidate).eq_ignore_ascii_case("ok") {
            Ok(())
        } else {
            Err("invalid response, try again".to_string())
        }
    }

    /// Accepts an empty response, `y`, or `n`, case-insensitively.
    pub fn yes_or_no(candidate: &str) -> Result<(), String> {
        let normalized = normalize_response(candidate);
        if normalized.is_empty()
            || normalized.eq_ignore_ascii_case("y")
            || normalized.eq_ignore_ascii_case("n")
        {
            Ok(())
        } else {
            Err("invalid option, try again".to_string())
        }
    }
}
