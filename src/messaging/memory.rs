use std::sync::Mutex;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::{BackendError, BackendResult};
use crate::messaging::backend::{MessagingBackend, TokenListener, TokenReceived};
use crate::util::{FaultQueue, ListenerSet};

const TOKEN_LENGTH: usize = 64;

/// Issues random registration tokens and notifies token listeners.
#[derive(Default)]
pub struct MemoryMessaging {
    token: Mutex<Option<String>>,
    listeners: ListenerSet<dyn Fn(&TokenReceived) + Send + Sync>,
    faults: FaultQueue,
}

impl MemoryMessaging {
    /// Replaces the current token and notifies listeners.
    pub fn rotate_token(&self) -> String {
        let token = generate_token();
        *self
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.clone());
        self.notify(&token);
        token
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn inject_fault(&self, error: BackendError) {
        self.faults.push(error);
    }

    fn notify(&self, token: &str) {
        let event = TokenReceived {
            token: token.to_string(),
        };
        for listener in self.listeners.snapshot() {
            listener(&event);
        }
    }
}

#[async_trait]
impl MessagingBackend for MemoryMessaging {
    async fn get_token(&self) -> BackendResult<String> {
        self.faults.check()?;
        let issued = {
            let mut current = self
                .token
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(token) = current.as_ref() {
                return Ok(token.clone());
            }
            let token = generate_token();
            *current = Some(token.clone());
            token
        };
        self.notify(&issued);
        Ok(issued)
    }

    fn add_token_listener(&self, listener: TokenListener) {
        self.listeners.add(listener);
    }

    fn remove_token_listener(&self, listener: &TokenListener) -> bool {
        self.listeners.remove(listener)
    }
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(TOKEN_LENGTH)
        .collect()
}
