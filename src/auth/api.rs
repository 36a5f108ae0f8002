use crate::auth::backend::Credential;
use crate::config::Area;
use crate::extension::FirebaseExtension;
use crate::result::FirebaseResult;

impl FirebaseExtension {
    /// Uid of the signed-in user, if any.
    pub fn uid(&self) -> Option<String> {
        self.auth.current_user().map(|user| user.uid)
    }

    pub fn signed_in(&self) -> bool {
        self.auth.current_user().is_some()
    }

    /// Deletes the signed-in user's account. Fails when nobody is signed in.
    pub async fn delete_user(&self) -> FirebaseResult {
        let outcome = self.auth.delete_current_user().await;
        self.settle(Area::Auth, "delete_user", "", outcome)
    }

    /// Exchanges a Facebook access token obtained by the host for a session.
    /// An empty token fails without contacting the backend.
    pub async fn facebook_sign_in(&self, access_token: &str) -> FirebaseResult {
        if access_token.is_empty() {
            return FirebaseResult::failure();
        }
        let credential = Credential::Facebook {
            access_token: access_token.to_string(),
        };
        let outcome = self.auth.sign_in_with_credential(credential).await;
        self.settle(Area::Auth, "facebook_sign_in", "", outcome)
            .map(|_| ())
    }

    /// Exchanges a Google id token obtained by the host for a session.
    pub async fn google_sign_in(&self, id_token: &str) -> FirebaseResult {
        if id_token.is_empty() {
            return FirebaseResult::failure();
        }
        let credential = Credential::Google {
            id_token: id_token.to_string(),
            access_token: None,
        };
        let outcome = self.auth.sign_in_with_credential(credential).await;
        self.settle(Area::Auth, "google_sign_in", "", outcome)
            .map(|_| ())
    }

    /// Signs in with a custom token minted by the host's Kakao bridge.
    pub async fn kakao_sign_in(&self, custom_token: &str) -> FirebaseResult {
        if custom_token.is_empty() {
            return FirebaseResult::failure();
        }
        let outcome = self.auth.sign_in_with_custom_token(custom_token).await;
        self.settle(Area::Auth, "kakao_sign_in", "", outcome)
            .map(|_| ())
    }

    pub fn sign_out(&self) -> FirebaseResult {
        let outcome = self.auth.sign_out();
        self.settle(Area::Auth, "sign_out", "", outcome)
    }

    pub async fn custom_sign_up(&self, email: &str, password: &str) -> FirebaseResult {
        let outcome = self
            .auth
            .create_user_with_email_and_password(email, password)
            .await;
        self.settle(Area::Auth, "custom_sign_up", email, outcome)
            .map(|_| ())
    }

    /// Attempts an email/password sign-in and reports whether a user is
    /// signed in afterwards. A failed attempt leaves an earlier session intact.
    pub async fn custom_sign_in(&self, email: &str, password: &str) -> bool {
        if let Err(err) = self
            .auth
            .sign_in_with_email_and_password(email, password)
            .await
        {
            self.report(Area::Auth, "custom_sign_in", email, &err);
        }
        self.signed_in()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::internal_error;
    use crate::test_support::memory_extension;

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let (_backends, extension) = memory_extension();
        assert!(!extension.signed_in());
        assert!(extension
            .custom_sign_up("alice@example.com", "hunter22")
            .await
            .completed_successfully());
        let uid = extension.uid().expect("signed in after sign up");

        assert!(extension.sign_out().completed_successfully());
        assert_eq!(extension.uid(), None);

        assert!(extension.custom_sign_in("alice@example.com", "hunter22").await);
        assert_eq!(extension.uid(), Some(uid));
    }

    #[tokio::test]
    async fn failed_sign_in_reports_current_state() {
        let (_backends, extension) = memory_extension();
        assert!(!extension.custom_sign_in("ghost@example.com", "whatever").await);

        extension
            .custom_sign_up("bob@example.com", "secret1")
            .await;
        assert!(extension.custom_sign_in("ghost@example.com", "whatever").await);
    }

    #[tokio::test]
    async fn empty_third_party_tokens_fail_without_backend_call() {
        let (backends, extension) = memory_extension();
        backends.auth.inject_fault(internal_error("must stay queued"));

        assert!(!extension.facebook_sign_in("").await.completed_successfully());
        assert!(!extension.google_sign_in("").await.completed_successfully());
        assert!(!extension.kakao_sign_in("").await.completed_successfully());

        // the queued fault is still waiting for the first real call
        assert!(!extension
            .custom_sign_up("frank@example.com", "secret1")
            .await
            .completed_successfully());
        assert!(extension
            .custom_sign_up("frank@example.com", "secret1")
            .await
            .completed_successfully());
    }

    #[tokio::test]
    async fn third_party_sign_ins() {
        let (backends, extension) = memory_extension();
        assert!(extension
            .facebook_sign_in("fb-access")
            .await
            .completed_successfully());
        assert!(extension.signed_in());

        assert!(extension
            .google_sign_in("google-id")
            .await
            .completed_successfully());
        assert_ne!(extension.uid(), None);

        backends.auth.register_custom_token("kakao-minted", "kakao:1234");
        assert!(extension
            .kakao_sign_in("kakao-minted")
            .await
            .completed_successfully());
        assert_eq!(extension.uid().as_deref(), Some("kakao:1234"));

        assert!(!extension
            .kakao_sign_in("unknown-token")
            .await
            .completed_successfully());
    }

    #[tokio::test]
    async fn delete_user_signs_out() {
        let (backends, extension) = memory_extension();
        extension.custom_sign_up("eve@example.com", "secret1").await;
        assert!(extension.delete_user().await.completed_successfully());
        assert!(!extension.signed_in());
        assert!(backends.auth.users().is_empty());
    }
}
