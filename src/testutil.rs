//! Shared test doubles for the middleware and prompter seams.

use crate::middleware::{MiddlewareError, SyncProgressListener, WalletMiddleware};
use crate::prompt::{InteractivePrompter, Validator};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

/// How a mock sync attempt should play out.
#[derive(Debug, Clone, Copy)]
pub enum SyncScript {
    /// Start, then report a successful terminal event.
    Succeed,
    /// Refuse to start; no listener events are emitted.
    FailToStart(&'static str),
    /// Start, then report a failed terminal event.
    EndWithError(&'static str),
    /// Start and never report a terminal event.
    Never,
}

/// Scriptable wallet middleware with a call log.
pub struct MockMiddleware {
    exists: Result<bool, String>,
    open_error: Option<String>,
    create_error: Option<String>,
    seed: String,
    sync: SyncScript,
    net: String,
    calls: Mutex<Vec<String>>,
}

impl Default for MockMiddleware {
    fn default() -> Self {
        Self {
            exists: Ok(true),
            open_error: None,
            create_error: None,
            seed: "witch collapse practice feed shame open despair creek road again ice least"
                .to_string(),
            sync: SyncScript::Succeed,
            net: "testnet".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockMiddleware {
    pub fn with_exists(mut self, exists: bool) -> Self {
        self.exists = Ok(exists);
        self
    }

    pub fn with_exists_error(mut self, message: &str) -> Self {
        self.exists = Err(message.to_string());
        self
    }

    pub fn with_open_error(mut self, message: &str) -> Self {
        self.open_error = Some(message.to_string());
        self
    }

    pub fn with_create_error(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    pub fn with_sync(mut self, script: SyncScript) -> Self {
        self.sync = script;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, name: &str) -> bool {
        self.calls().iter().any(|call| call == name)
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait::async_trait]
impl WalletMiddleware for MockMiddleware {
    async fn wallet_exists(&self) -> Result<bool, MiddlewareError> {
        self.record("wallet_exists");
        self.exists.clone().map_err(MiddlewareError::Daemon)
    }

    async fn open_wallet(&self) -> Result<(), MiddlewareError> {
        self.record("open_wallet");
        match &self.open_error {
            Some(message) => Err(MiddlewareError::Daemon(message.clone())),
            None => Ok(()),
        }
    }

    async fn generate_seed(&self) -> Result<String, MiddlewareError> {
        self.record("generate_seed");
        Ok(self.seed.clone())
    }

    async fn create_wallet(&self, _passphrase: &str, _seed: &str) -> Result<(), MiddlewareError> {
        self.record("create_wallet");
        match &self.create_error {
            Some(message) => Err(MiddlewareError::Daemon(message.clone())),
            None => Ok(()),
        }
    }

    async fn sync_blockchain(
        &self,
        listener: Arc<dyn SyncProgressListener>,
        _rescan: bool,
    ) -> Result<(), MiddlewareError> {
        self.record("sync_blockchain");
        match self.sync {
            SyncScript::FailToStart(message) => Err(MiddlewareError::Daemon(message.to_string())),
            SyncScript::Succeed => {
                listener.sync_started();
                listener.headers_fetched(100);
                listener.sync_ended(Ok(()));
                Ok(())
            }
            SyncScript::EndWithError(message) => {
                listener.sync_started();
                listener.sync_ended(Err(MiddlewareError::Daemon(message.to_string())));
                Ok(())
            }
            SyncScript::Never => {
                listener.sync_started();
                futures::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    async fn close_wallet(&self) {
        self.record("close_wallet");
    }

    fn net_type(&self) -> &str {
        &self.net
    }
}

/// Prompter that replays scripted responses, applying validators the way the
/// terminal prompter does: rejected responses are logged and the next
/// scripted response is tried.
pub struct ScriptedPrompter {
    responses: Mutex<VecDeque<String>>,
    rejections: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompter {
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.to_string()).collect()),
            rejections: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reasons given for rejected responses, in order.
    pub fn rejection_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.rejections)
    }

    /// The next raw scripted response whose trimmed form passes `validator`.
    fn next_accepted(&self, prompt: &str, validator: Validator) -> io::Result<String> {
        loop {
            let next = self.responses.lock().unwrap().pop_front().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("no scripted response for prompt: {prompt}"),
                )
            })?;
            match validator(next.trim()) {
                Ok(()) => return Ok(next),
                Err(reason) => self.rejections.lock().unwrap().push(reason),
            }
        }
    }
}

#[async_trait::async_trait]
impl InteractivePrompter for ScriptedPrompter {
    async fn request_input(&self, prompt: &str, validator: Validator) -> io::Result<String> {
        self.next_accepted(prompt, validator)
            .map(|raw| raw.trim().to_string())
    }

    async fn request_input_secure(&self, prompt: &str, validator: Validator) -> io::Result<String> {
        // The terminal prompter hands back the secret untrimmed; the mock
        // must round-trip whitespace the same way.
        self.next_accepted(prompt, validator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::validators;

    #[tokio::test]
    async fn secure_input_preserves_surrounding_whitespace() {
        let prompter = ScriptedPrompter::new(&["  hunter2  "]);

        let secret = prompter
            .request_input_secure("passphrase", validators::non_empty)
            .await
            .unwrap();
        assert_eq!(secret, "  hunter2  ");
    }

    #[tokio::test]
    async fn plain_input_is_trimmed() {
        let prompter = ScriptedPrompter::new(&["  y  "]);

        let answer = prompter
            .request_input("create?", validators::yes_or_no)
            .await
            .unwrap();
        assert_eq!(answer, "y");
    }
}
