use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use firebase_extension::app::DependencyStatus;
use firebase_extension::config::{Area, BenignFaults, ExtensionSettings};
use firebase_extension::error::{
    internal_error, not_found, object_not_found, permission_denied, unavailable, BackendErrorCode,
};
use firebase_extension::messaging::{TokenListener, TokenReceived};
use firebase_extension::{FirebaseExtension, FirebaseResult, MemoryBackends, UNSPECIFIED_ERROR_CODE};
use serde_json::{json, Map};

fn facade() -> (MemoryBackends, FirebaseExtension) {
    let backends = MemoryBackends::default();
    let extension = backends.builder().build().expect("all backends configured");
    (backends, extension)
}

fn assert_failed<T>(result: &FirebaseResult<T>) {
    assert!(!result.completed_successfully());
    assert_eq!(result.error_code(), UNSPECIFIED_ERROR_CODE);
    assert!(result.value().is_none());
}

#[test]
fn result_constructors_set_flag_and_payload() {
    let failed: FirebaseResult = FirebaseResult::new(false);
    assert_failed(&failed);

    let coded: FirebaseResult = FirebaseResult::with_error_code(17);
    assert!(!coded.completed_successfully());
    assert_eq!(coded.error_code(), 17);

    let success = FirebaseResult::success(5u8);
    assert!(success.completed_successfully());
    assert_eq!(success.value(), Some(&5));

    let flagged = FirebaseResult::with_value(false, "partial");
    assert!(!flagged.completed_successfully());
    assert_eq!(flagged.value(), Some(&"partial"));

    let empty: FirebaseResult<String> = FirebaseResult::new(true);
    assert!(empty.completed_successfully());
    assert!(empty.value().is_none());
}

#[tokio::test]
async fn storage_not_found_is_an_empty_success_for_every_read() {
    let (backends, extension) = facade();
    for _ in 0..6 {
        backends.storage.inject_fault(object_not_found("saves/slot"));
    }

    assert!(extension.delete_file("saves/slot").await.completed_successfully());
    assert!(extension
        .download_bytes("saves/slot", Some(1024))
        .await
        .value()
        .is_none());
    let target = std::env::temp_dir().join("firebase-extension-not-found.bin");
    assert!(extension
        .download_file("saves/slot", &target)
        .await
        .completed_successfully());
    assert!(extension
        .download_metadata("saves/slot")
        .await
        .completed_successfully());
    assert!(extension
        .download_stream("saves/slot")
        .await
        .completed_successfully());
    assert!(extension.download_url("saves/slot").await.completed_successfully());
}

#[tokio::test]
async fn faults_in_every_area_become_failures() {
    let (backends, extension) = facade();

    backends.app.inject_fault(unavailable("play services"));
    assert_failed(&extension.initialize().await);

    backends.analytics.inject_fault(internal_error("queue full"));
    assert_failed(&extension.log_event("level_up").await);

    backends.auth.inject_fault(permission_denied("disabled"));
    assert_failed(&extension.custom_sign_up("ann@example.com", "hunter22").await);

    backends.database.inject_fault(not_found("offline"));
    assert_failed(&extension.get_count("players").await);

    backends.functions.inject_fault(unavailable("cold start"));
    assert_failed(&extension.call("claim", Map::new()).await);

    backends.messaging.inject_fault(unavailable("no network"));
    assert_failed(&extension.get_token().await);

    backends.storage.inject_fault(permission_denied("rules"));
    assert_failed(&extension.download_url("saves/slot").await);
}

#[tokio::test]
async fn allow_list_is_configurable() {
    let backends = MemoryBackends::default();
    let settings = ExtensionSettings {
        log_faults: false,
        benign_faults: BenignFaults::none().allow(Area::Database, BackendErrorCode::NotFound),
        ..Default::default()
    };
    let extension = backends.builder().settings(settings).build().unwrap();

    backends.database.inject_fault(not_found("gone"));
    let count = extension.get_count("players").await;
    assert!(count.completed_successfully());
    assert!(count.value().is_none());

    backends.storage.inject_fault(object_not_found("saves/slot"));
    assert_failed(&extension.download_bytes("saves/slot", None).await);
}

#[tokio::test]
async fn settings_file_configures_the_facade() {
    let path = std::env::temp_dir().join(format!(
        "firebase-extension-settings-{}.json",
        std::process::id()
    ));
    std::fs::write(
        &path,
        json!({ "logFaults": false, "persistenceEnabled": true }).to_string(),
    )
    .unwrap();

    let settings = ExtensionSettings::from_json_file(&path).unwrap();
    let backends = MemoryBackends::default();
    let extension = backends.builder().settings(settings).build().unwrap();
    assert!(!extension.settings().log_faults);
    assert!(backends.database.persistence_enabled());

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn startup_reports_dependency_status() {
    let (backends, extension) = facade();
    assert_eq!(
        extension.initialize().await.into_value(),
        Some(DependencyStatus::Available)
    );

    backends
        .app
        .set_status(DependencyStatus::UnavailableUpdateRequired);
    let status = extension.initialize().await;
    assert!(status.completed_successfully());
    assert!(!status.value().unwrap().is_available());
}

#[tokio::test]
async fn token_listeners_see_issued_tokens() {
    let (backends, extension) = facade();
    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    let listener: TokenListener = Arc::new(move |event: &TokenReceived| {
        assert!(!event.token.is_empty());
        counter.fetch_add(1, Ordering::SeqCst);
    });

    extension.add_token_received_listener(listener.clone());
    let token = extension.get_token().await.into_value().unwrap();
    assert_eq!(extension.get_token().await.into_value(), Some(token));
    assert_eq!(notified.load(Ordering::SeqCst), 1);

    assert!(extension.remove_token_received_listener(&listener));
    backends.messaging.rotate_token();
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn email_session_lifecycle() {
    let (_backends, extension) = facade();
    assert!(!extension.signed_in());

    assert!(extension
        .custom_sign_up("ann@example.com", "hunter22")
        .await
        .completed_successfully());
    let uid = extension.uid().expect("signed in after sign-up");

    assert!(extension.sign_out().completed_successfully());
    assert!(!extension.custom_sign_in("ann@example.com", "wrong-pass").await);
    assert!(extension.custom_sign_in("ann@example.com", "hunter22").await);
    assert_eq!(extension.uid(), Some(uid));

    assert!(extension.delete_user().await.completed_successfully());
    assert!(!extension.signed_in());
}

#[tokio::test]
async fn third_party_sign_in_with_empty_token_fails() {
    let (_backends, extension) = facade();
    assert_failed(&extension.facebook_sign_in("").await);
    assert_failed(&extension.google_sign_in("").await);
    assert_failed(&extension.kakao_sign_in("").await);
    assert!(extension.facebook_sign_in("fb-token").await.completed_successfully());
    assert!(extension.signed_in());
}
