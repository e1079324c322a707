//! End-to-end run against a mock backend over HTTP

mod common;

use std::sync::Arc;

use common::VAPID_KEY;
use pushcoord::prelude::*;
use pushcoord::{CoordinatorBuilder, LifecycleState, RetryPolicy, StaticToken};
use pushcoord_platform_adapter_memory::{MemoryPlatform, MemoryState};
use pushcoord_state_adapter_fs::StateAdapterFs;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_backend(server: &MockServer) {
	Mock::given(method("GET"))
		.and(path("/notifications/vapid-public-key"))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "publicKey": VAPID_KEY })))
		.expect(1)
		.mount(server)
		.await;
	Mock::given(method("POST"))
		.and(path("/notifications/register-web"))
		.and(header("authorization", "Bearer tok"))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
		.expect(1)
		.mount(server)
		.await;
	Mock::given(method("POST"))
		.and(path("/notifications/unregister-web"))
		.and(header("authorization", "Bearer tok"))
		.respond_with(ResponseTemplate::new(200))
		.expect(1)
		.mount(server)
		.await;
}

#[tokio::test]
async fn test_subscribe_and_unsubscribe_over_http() {
	let server = MockServer::start().await;
	mount_backend(&server).await;
	let temp_dir = TempDir::new().expect("Failed to create temp directory");

	let platform = Arc::new(MemoryPlatform::new());
	platform.set_permission(PermissionState::Granted);
	let coordinator = CoordinatorBuilder::new()
		.base_url(server.uri())
		.platform(platform.clone())
		.auth(Arc::new(StaticToken::new("tok")))
		.state_adapter(Arc::new(StateAdapterFs::new(temp_dir.path()).await.unwrap()))
		.retry(RetryPolicy::new((5, 20), 2, 2))
		.build()
		.unwrap();

	let sub = coordinator.subscribe().await.unwrap();
	assert_eq!(coordinator.state(), LifecycleState::Active);

	let requests = server.received_requests().await.unwrap();
	let register = requests.iter().find(|r| r.url.path() == "/notifications/register-web").unwrap();
	let body: serde_json::Value = serde_json::from_slice(&register.body).unwrap();
	assert_eq!(body["subscription"]["endpoint"], &*sub.endpoint);
	assert_eq!(body["channel"], "webpush");
	assert!(body["subscription"]["keys"]["p256dh"].is_string());

	coordinator.unsubscribe().await.unwrap();
	assert_eq!(coordinator.state(), LifecycleState::Revoked);
	assert!(platform.live_channel("/").is_none());

	let requests = server.received_requests().await.unwrap();
	let unregister = requests.iter().find(|r| r.url.path() == "/notifications/unregister-web").unwrap();
	let body: serde_json::Value = serde_json::from_slice(&unregister.body).unwrap();
	assert_eq!(body, serde_json::json!({ "endpoint": &*sub.endpoint }));
}

#[tokio::test]
async fn test_backend_outage_leaves_pending_channel() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/notifications/vapid-public-key"))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "publicKey": VAPID_KEY })))
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/notifications/register-web"))
		.respond_with(ResponseTemplate::new(503))
		.up_to_n_times(3)
		.expect(3)
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/notifications/register-web"))
		.respond_with(ResponseTemplate::new(204))
		.expect(1)
		.mount(&server)
		.await;

	let platform = Arc::new(MemoryPlatform::new());
	platform.set_permission(PermissionState::Granted);
	let coordinator = CoordinatorBuilder::new()
		.base_url(server.uri())
		.platform(platform.clone())
		.auth(Arc::new(StaticToken::new("tok")))
		.state_adapter(Arc::new(MemoryState::new()))
		.retry(RetryPolicy::new((5, 20), 2, 2))
		.build()
		.unwrap();

	let res = coordinator.subscribe().await;
	assert!(matches!(
		res,
		Err(Error::RegistrationRejected(RejectReason::RetriesExhausted { attempts: 3, .. }))
	));
	assert_eq!(coordinator.state(), LifecycleState::Error(ErrorKind::RegistrationRejected));

	coordinator.retry_registration().await.unwrap();
	assert_eq!(coordinator.state(), LifecycleState::Active);
	assert_eq!(platform.channels_created(), 1);
}

#[tokio::test]
async fn test_empty_backend_key_is_malformed() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/notifications/vapid-public-key"))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "publicKey": "" })))
		.expect(1)
		.mount(&server)
		.await;

	let platform = Arc::new(MemoryPlatform::new());
	platform.set_permission(PermissionState::Granted);
	let coordinator = CoordinatorBuilder::new()
		.base_url(server.uri())
		.platform(platform.clone())
		.auth(Arc::new(StaticToken::new("tok")))
		.state_adapter(Arc::new(MemoryState::new()))
		.build()
		.unwrap();

	assert!(matches!(coordinator.subscribe().await, Err(Error::MalformedKey(_))));
	assert_eq!(coordinator.state(), LifecycleState::Error(ErrorKind::MalformedKey));
	assert_eq!(platform.channels_created(), 0);
}

// vim: ts=4
