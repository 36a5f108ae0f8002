use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::auth::backend::{AuthBackend, Credential, User};
use crate::error::{
    already_exists, invalid_argument, not_found, unauthenticated, BackendError, BackendResult,
};
use crate::util::FaultQueue;

const MIN_PASSWORD_LENGTH: usize = 6;
const UID_LENGTH: usize = 28;

#[derive(Debug)]
struct Account {
    uid: String,
    password: String,
}

#[derive(Debug, Default)]
struct AuthState {
    users: BTreeMap<String, User>,
    accounts: BTreeMap<String, Account>,
    custom_tokens: BTreeMap<String, String>,
    federated: BTreeMap<(String, String), String>,
    current: Option<String>,
}

/// Session and account table kept in memory.
#[derive(Debug, Default)]
pub struct MemoryAuth {
    state: Mutex<AuthState>,
    faults: FaultQueue,
}

impl MemoryAuth {
    /// Makes `token` valid for custom-token sign-in as `uid`.
    pub fn register_custom_token(&self, token: impl Into<String>, uid: impl Into<String>) {
        self.state().custom_tokens.insert(token.into(), uid.into());
    }

    pub fn users(&self) -> Vec<User> {
        self.state().users.values().cloned().collect()
    }

    pub fn inject_fault(&self, error: BackendError) {
        self.faults.push(error);
    }

    fn state(&self) -> MutexGuard<'_, AuthState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AuthBackend for MemoryAuth {
    fn current_user(&self) -> Option<User> {
        let state = self.state();
        state
            .current
            .as_ref()
            .and_then(|uid| state.users.get(uid))
            .cloned()
    }

    async fn delete_current_user(&self) -> BackendResult<()> {
        self.faults.check()?;
        let mut state = self.state();
        let uid = state
            .current
            .take()
            .ok_or_else(|| unauthenticated("No user is signed in"))?;
        state.users.remove(&uid);
        state.accounts.retain(|_, account| account.uid != uid);
        state.federated.retain(|_, linked| *linked != uid);
        Ok(())
    }

    async fn sign_in_with_credential(&self, credential: Credential) -> BackendResult<User> {
        self.faults.check()?;
        if credential.token().is_empty() {
            return Err(invalid_argument("Credential token must not be empty"));
        }
        let mut state = self.state();
        let key = (
            credential.provider_id().to_string(),
            credential.token().to_string(),
        );
        let existing = state.federated.get(&key).cloned();
        let uid = match existing {
            Some(uid) => uid,
            None => {
                let uid = generate_uid();
                state.federated.insert(key, uid.clone());
                uid
            }
        };
        Ok(sign_in_as(&mut state, &uid, credential.provider_id(), None))
    }

    async fn sign_in_with_custom_token(&self, token: &str) -> BackendResult<User> {
        self.faults.check()?;
        let mut state = self.state();
        let uid = state
            .custom_tokens
            .get(token)
            .cloned()
            .ok_or_else(|| invalid_argument("The custom token format is incorrect"))?;
        Ok(sign_in_as(&mut state, &uid, "custom", None))
    }

    async fn create_user_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<User> {
        self.faults.check()?;
        validate_email(email)?;
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(invalid_argument(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        let mut state = self.state();
        if state.accounts.contains_key(email) {
            return Err(already_exists(format!(
                "The email address {email} is already in use"
            )));
        }
        let uid = generate_uid();
        state.accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        Ok(sign_in_as(&mut state, &uid, "password", Some(email)))
    }

    async fn sign_in_with_email_and_password(
        &self,
        email: &str,
        password: &str,
    ) -> BackendResult<User> {
        self.faults.check()?;
        validate_email(email)?;
        let mut state = self.state();
        let account = state
            .accounts
            .get(email)
            .ok_or_else(|| not_found(format!("No user record for {email}")))?;
        if account.password != password {
            return Err(unauthenticated("The password is invalid"));
        }
        let uid = account.uid.clone();
        Ok(sign_in_as(&mut state, &uid, "password", Some(email)))
    }

    fn sign_out(&self) -> BackendResult<()> {
        self.faults.check()?;
        self.state().current = None;
        Ok(())
    }
}

fn sign_in_as(state: &mut AuthState, uid: &str, provider_id: &str, email: Option<&str>) -> User {
    let user = state
        .users
        .entry(uid.to_string())
        .or_insert_with(|| User {
            uid: uid.to_string(),
            email: email.map(str::to_string),
            display_name: None,
            provider_id: provider_id.to_string(),
        })
        .clone();
    state.current = Some(uid.to_string());
    user
}

fn validate_email(email: &str) -> BackendResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(invalid_argument(format!(
            "The email address '{email}' is badly formatted"
        ))),
    }
}

fn generate_uid() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(UID_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendErrorCode;

    #[tokio::test]
    async fn sign_up_signs_in_new_user() {
        let auth = MemoryAuth::default();
        let user = auth
            .create_user_with_email_and_password("alice@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(user.uid.len(), UID_LENGTH);
        assert_eq!(auth.current_user(), Some(user));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let auth = MemoryAuth::default();
        auth.create_user_with_email_and_password("bob@example.com", "secret1")
            .await
            .unwrap();
        let err = auth
            .create_user_with_email_and_password("bob@example.com", "secret2")
            .await
            .unwrap_err();
        assert_eq!(err.code, BackendErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthenticated() {
        let auth = MemoryAuth::default();
        auth.create_user_with_email_and_password("carol@example.com", "secret1")
            .await
            .unwrap();
        auth.sign_out().unwrap();
        let err = auth
            .sign_in_with_email_and_password("carol@example.com", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.code, BackendErrorCode::Unauthenticated);
        assert!(auth.current_user().is_none());
    }

    #[tokio::test]
    async fn federated_token_maps_to_stable_uid() {
        let auth = MemoryAuth::default();
        let credential = Credential::Facebook {
            access_token: "fb-token".into(),
        };
        let first = auth.sign_in_with_credential(credential.clone()).await.unwrap();
        auth.sign_out().unwrap();
        let second = auth.sign_in_with_credential(credential).await.unwrap();
        assert_eq!(first.uid, second.uid);
        assert_eq!(second.provider_id, "facebook.com");
    }

    #[tokio::test]
    async fn delete_removes_account() {
        let auth = MemoryAuth::default();
        auth.create_user_with_email_and_password("dave@example.com", "secret1")
            .await
            .unwrap();
        auth.delete_current_user().await.unwrap();
        assert!(auth.users().is_empty());
        let err = auth
            .sign_in_with_email_and_password("dave@example.com", "secret1")
            .await
            .unwrap_err();
        assert_eq!(err.code, BackendErrorCode::NotFound);
    }
}
