use crate::config::Area;
use crate::extension::FirebaseExtension;
use crate::messaging::backend::TokenListener;
use crate::result::FirebaseResult;

impl FirebaseExtension {
    pub fn add_token_received_listener(&self, listener: TokenListener) {
        self.messaging.add_token_listener(listener);
    }

    /// Returns whether `listener` was registered.
    pub fn remove_token_received_listener(&self, listener: &TokenListener) -> bool {
        self.messaging.remove_token_listener(listener)
    }

    pub async fn get_token(&self) -> FirebaseResult<String> {
        let outcome = self.messaging.get_token().await;
        self.settle(Area::Messaging, "get_token", "", outcome)
    }
}
