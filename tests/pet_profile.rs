mod common;

use std::sync::Arc;

use pawsport::prelude::*;
use pawsport_api::{AlwaysFail, ApiClient, ApiOptions};
use pawsport_domain::{FieldError, Pet};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{dashboard, json_of, noddy, noddy_with};

fn api_for(server: &MockServer) -> ApiClient {
    let options = ApiOptions::default().with_simulate_failures(false);
    ApiClient::new_with_options(&server.uri(), options).unwrap()
}

/// `GET /pets/7` answers `first` once, then `after`.
async fn mount_reads(server: &MockServer, first: &Pet, after: &Pet) {
    Mock::given(method("GET"))
        .and(path("/pets/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json_of(first)))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pets/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json_of(after)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_save_weight_success() {
    let server = MockServer::start().await;
    let saved = noddy_with(|p| p.weight_kg = 26.75);
    mount_reads(&server, &noddy(), &saved).await;
    Mock::given(method("PATCH"))
        .and(path("/pets/7"))
        .and(body_partial_json(json!({ "weightKg": 26.75, "name": "Noddy" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json_of(&saved)))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard(Arc::new(api_for(&server)));
    let profile = dashboard.pet_profile(7);
    let pet = assert_ok!(profile.open().await);
    assert_eq!(pet.weight_label(), "15.4 kg");

    assert_ok!(profile.begin_edit().await);
    assert_eq!(profile.state().await, EditState::Editing);
    assert_ok!(profile.set_field(PetField::WeightKg, "26.75").await);
    assert!(profile.can_save().await);

    let pet = assert_ok!(profile.save().await);
    assert_eq!(pet.weight_label(), "26.75 kg");
    assert_eq!(profile.pet().await.unwrap().weight_label(), "26.75 kg");
    assert_eq!(profile.state().await, EditState::Viewing);
    assert!(profile.draft().await.is_none());

    let toasts = dashboard.toasts().list().await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Success);
    assert_eq!(toasts[0].message, "Pet profile updated successfully");
    dashboard.shutdown().await;
}

#[tokio::test]
async fn test_save_weight_server_failure_rolls_back() {
    let server = MockServer::start().await;
    mount_reads(&server, &noddy(), &noddy()).await;
    Mock::given(method("PATCH"))
        .and(path("/pets/7"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Database unavailable" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard(Arc::new(api_for(&server)));
    let profile = dashboard.pet_profile(7);
    assert_ok!(profile.open().await);
    assert_ok!(profile.begin_edit().await);
    assert_ok!(profile.set_field(PetField::WeightKg, "26.75").await);

    let err = assert_err!(profile.save().await);
    assert!(matches!(err, Error::Api(_)));

    assert_eq!(profile.pet().await.unwrap().weight_label(), "15.4 kg");
    assert_eq!(profile.state().await, EditState::Editing);
    assert_eq!(profile.draft().await.unwrap().weight_kg, Some(26.75));

    let toasts = dashboard.toasts().list().await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert_eq!(toasts[0].message, "Database unavailable");
    dashboard.shutdown().await;
}

#[tokio::test]
async fn test_simulated_failure_never_reaches_server() {
    let server = MockServer::start().await;
    mount_reads(&server, &noddy(), &noddy()).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let api = api_for(&server).with_failure_policy(Arc::new(AlwaysFail));
    let dashboard = dashboard(Arc::new(api));
    let profile = dashboard.pet_profile(7);
    assert_ok!(profile.open().await);
    assert_ok!(profile.begin_edit().await);
    assert_ok!(profile.set_field(PetField::WeightKg, "26.75").await);

    assert_err!(profile.save().await);
    assert_eq!(profile.pet().await.unwrap().weight_kg, 15.4);
    assert_eq!(profile.state().await, EditState::Editing);

    let toasts = dashboard.toasts().list().await;
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert!(toasts[0].message.starts_with("Simulated server failure"));

    // The retained draft can be retried once the backend recovers.
    assert_eq!(profile.draft().await.unwrap().weight_kg, Some(26.75));
    dashboard.shutdown().await;
}

#[tokio::test]
async fn test_invalid_draft_is_not_sent() {
    let server = MockServer::start().await;
    mount_reads(&server, &noddy(), &noddy()).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard(Arc::new(api_for(&server)));
    let profile = dashboard.pet_profile(7);
    assert_ok!(profile.open().await);
    assert_ok!(profile.begin_edit().await);
    assert_ok!(profile.set_field(PetField::WeightKg, "250").await);
    assert_ok!(profile.set_field(PetField::Breed, "   ").await);

    assert!(!profile.can_save().await);
    // Nothing is flagged until a save is attempted.
    assert!(profile.visible_errors().await.is_empty());

    match profile.save().await {
        Err(Error::Validation(errors)) => {
            assert_eq!(errors.len(), 2);
            assert_eq!(errors.get(PetField::Breed), Some(FieldError::Required));
        }
        other => panic!("Expected validation error, got {:?}", other.map(|p| p.id)),
    }

    let visible = profile.visible_errors().await;
    assert_eq!(
        visible.message(PetField::WeightKg).as_deref(),
        Some("Weight must be between 0 and 200")
    );
    assert_eq!(profile.state().await, EditState::Editing);
    assert_eq!(profile.pet().await.unwrap(), noddy());

    let toasts = dashboard.toasts().list().await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, "Please fix validation errors before saving");
    dashboard.shutdown().await;
}

#[tokio::test]
async fn test_cancel_discards_draft() {
    let server = MockServer::start().await;
    mount_reads(&server, &noddy(), &noddy()).await;

    let dashboard = dashboard(Arc::new(api_for(&server)));
    let profile = dashboard.pet_profile(7);
    assert_ok!(profile.open().await);
    assert_ok!(profile.begin_edit().await);
    assert_ok!(profile.toggle_attribute("Barks").await);
    assert!(profile.draft().await.unwrap().has_attribute("Barks"));

    assert_ok!(profile.cancel_edit().await);
    assert_eq!(profile.state().await, EditState::Viewing);
    assert!(profile.draft().await.is_none());
    assert!(matches!(
        profile.set_field(PetField::Name, "Rex").await,
        Err(Error::NotEditing)
    ));
    assert_eq!(profile.pet().await.unwrap(), noddy());
    assert!(dashboard.toasts().list().await.is_empty());
}

#[tokio::test]
async fn test_status_toggle_sends_only_status() {
    let server = MockServer::start().await;
    let inactive = noddy_with(|p| p.status = Status::Inactive);
    mount_reads(&server, &noddy(), &inactive).await;
    Mock::given(method("PATCH"))
        .and(path("/pets/7"))
        .and(body_json(json!({ "status": "Inactive" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json_of(&inactive)))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard(Arc::new(api_for(&server)));
    let profile = dashboard.pet_profile(7);
    assert_ok!(profile.open().await);

    let pet = assert_ok!(profile.change_status(Status::Inactive).await);
    assert_eq!(pet.status, Status::Inactive);
    assert_eq!(profile.state().await, EditState::Viewing);
    assert_eq!(profile.pet().await.unwrap().status, Status::Inactive);
    dashboard.shutdown().await;
}

#[tokio::test]
async fn test_status_toggle_failure_rolls_back() {
    let server = MockServer::start().await;
    mount_reads(&server, &noddy(), &noddy()).await;
    Mock::given(method("PATCH"))
        .and(path("/pets/7"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard(Arc::new(api_for(&server)));
    let profile = dashboard.pet_profile(7);
    assert_ok!(profile.open().await);

    assert_err!(profile.change_status(Status::Inactive).await);
    assert_eq!(profile.pet().await.unwrap().status, Status::Active);
    assert_eq!(profile.state().await, EditState::Viewing);

    let toasts = dashboard.toasts().list().await;
    assert_eq!(toasts[0].message, "Service Unavailable");
    dashboard.shutdown().await;
}

#[tokio::test]
async fn test_status_toggle_refused_while_editing() {
    let server = MockServer::start().await;
    mount_reads(&server, &noddy(), &noddy()).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard(Arc::new(api_for(&server)));
    let profile = dashboard.pet_profile(7);
    assert_ok!(profile.open().await);
    assert_ok!(profile.begin_edit().await);

    let err = assert_err!(profile.change_status(Status::Inactive).await);
    assert!(matches!(err, Error::EditInProgress));
    assert_eq!(profile.state().await, EditState::Editing);
}

#[tokio::test]
async fn test_edit_before_load_fails() {
    let server = MockServer::start().await;
    let dashboard = dashboard(Arc::new(api_for(&server)));
    let profile = dashboard.pet_profile(7);

    let err = assert_err!(profile.begin_edit().await);
    assert!(matches!(err, Error::NotLoaded(7)));
    assert_eq!(profile.state().await, EditState::Viewing);
}

#[tokio::test]
async fn test_age_uses_injected_clock() {
    let server = MockServer::start().await;
    let puppy = noddy_with(|p| p.dob = "2024-11-15".into());
    mount_reads(&server, &puppy, &puppy).await;

    let dashboard = dashboard(Arc::new(api_for(&server)));
    let profile = dashboard.pet_profile(7);
    assert_ok!(profile.open().await);
    assert_eq!(profile.age().await.unwrap().to_string(), "1 yrs, 2 mos");
}
