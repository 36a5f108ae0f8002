use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackendResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenReceived {
    pub token: String,
}

pub type TokenListener = Arc<dyn Fn(&TokenReceived) + Send + Sync>;

#[async_trait]
pub trait MessagingBackend: Send + Sync {
    /// Returns the registration token, issuing one on first use.
    async fn get_token(&self) -> BackendResult<String>;

    /// Called whenever a token is issued or rotated.
    fn add_token_listener(&self, listener: TokenListener);

    fn remove_token_listener(&self, listener: &TokenListener) -> bool;
}
