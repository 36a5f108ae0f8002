use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider_id: String,
}

/// Third-party credential exchanged for a backend session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    Facebook {
        access_token: String,
    },
    Google {
        id_token: String,
        access_token: Option<String>,
    },
}

impl Credential {
    pub fn provider_id(&self) -> &'static str {
        match self {
            Credential::Facebook { .. } => "facebook.com",
            Credential::Google { .. } => "google.com",
        }
    }

    /// Token identifying the federated account.
    pub fn token(&self) -> &str {
        match self {
            Credential::Facebook { access_token } => access_token,
            Credential::Google { id_token, .. } => id_token,
        }
    }
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    fn current_user(&self) -> Option<User>;

    async fn delete_current_user(&self) -> BackendResult<()>;

    async fn sign_in_with_credential(&self, credential: Credential) -> BackendResult<User>;

    async fn sign_in_with_custom_token(&self, token: &str) -> BackendResult<User>;

    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<User>;

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<User>;

    fn sign_out(&self) -> BackendResult<()>;
}
