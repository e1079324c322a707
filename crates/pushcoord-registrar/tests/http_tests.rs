//! Wire-level tests of the registry client against a mock backend

use std::sync::Arc;
use std::time::Duration;

use pushcoord_core::RetryPolicy;
use pushcoord_registrar::{BackendRegistrar, HttpRegistry};
use pushcoord_types::auth::StaticToken;
use pushcoord_types::prelude::*;
use pushcoord_types::registry_adapter::RegistryAdapter;
use pushcoord_types::types::{Credential, RegistrationRequest, Subscription};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VAPID_KEY: &str =
	"BA1Hxzyi1RUM1b5wjxsn7nGxAszw2u61m164i3MrAIxHF6YK5h4SDYic-dRuU_RCPCfA5aq9ojSwk5Y2EmClBPs";

fn subscription() -> Subscription {
	Subscription {
		endpoint: "https://push.example.net/send/00000000000000a1".into(),
		channel: ChannelKind::WebPush,
		credential: Credential::Keys { p256dh: "BPk".into(), auth: "au".into() },
		created_at: Timestamp(1_700_000_000),
		expiration_time: None,
	}
}

fn request() -> RegistrationRequest {
	RegistrationRequest { subscription: subscription(), auth_token: "tok".into() }
}

fn registry(server: &MockServer) -> HttpRegistry {
	HttpRegistry::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

/// Real time, so the backoffs are kept tiny
fn fast_registrar(server: &MockServer) -> BackendRegistrar {
	BackendRegistrar::new(
		Arc::new(registry(server)),
		Arc::new(StaticToken::new("tok")),
		RetryPolicy::new((5, 20), 2, 2),
	)
}

#[tokio::test]
async fn test_register_posts_browser_subscription() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/notifications/register-web"))
		.and(header("authorization", "Bearer tok"))
		.and(body_json(serde_json::json!({
			"subscription": {
				"endpoint": "https://push.example.net/send/00000000000000a1",
				"expirationTime": null,
				"keys": { "p256dh": "BPk", "auth": "au" }
			},
			"channel": "webpush"
		})))
		.respond_with(ResponseTemplate::new(201))
		.expect(1)
		.mount(&server)
		.await;

	registry(&server).register(&request()).await.unwrap();
}

#[tokio::test]
async fn test_unregister_posts_endpoint() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/notifications/unregister-web"))
		.and(header("authorization", "Bearer tok"))
		.and(body_json(serde_json::json!({
			"endpoint": "https://push.example.net/send/00000000000000a1"
		})))
		.respond_with(ResponseTemplate::new(204))
		.expect(1)
		.mount(&server)
		.await;

	fast_registrar(&server)
		.unregister("https://push.example.net/send/00000000000000a1")
		.await
		.unwrap();
}

#[tokio::test]
async fn test_status_classification() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/notifications/register-web"))
		.and(header("authorization", "Bearer expired"))
		.respond_with(ResponseTemplate::new(401))
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/notifications/register-web"))
		.and(header("authorization", "Bearer tok"))
		.respond_with(ResponseTemplate::new(422).set_body_string("invalid subscription"))
		.mount(&server)
		.await;

	let client = registry(&server);
	let expired = RegistrationRequest { subscription: subscription(), auth_token: "expired".into() };
	assert!(matches!(client.register(&expired).await, Err(Error::Unauthenticated)));
	assert!(matches!(
		client.register(&request()).await,
		Err(Error::RegistrationRejected(RejectReason::Status(422)))
	));
}

#[tokio::test]
async fn test_register_retries_server_errors() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/notifications/register-web"))
		.respond_with(ResponseTemplate::new(503))
		.up_to_n_times(2)
		.expect(2)
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/notifications/register-web"))
		.respond_with(ResponseTemplate::new(200))
		.expect(1)
		.mount(&server)
		.await;

	fast_registrar(&server).register(&request()).await.unwrap();
}

#[tokio::test]
async fn test_register_exhausts_retries() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/notifications/register-web"))
		.respond_with(ResponseTemplate::new(500))
		.expect(3)
		.mount(&server)
		.await;

	let res = fast_registrar(&server).register(&request()).await;
	assert!(matches!(
		res,
		Err(Error::RegistrationRejected(RejectReason::RetriesExhausted { attempts: 3, .. }))
	));
}

#[tokio::test]
async fn test_fetch_vapid_key() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/notifications/vapid-public-key"))
		.and(header("authorization", "Bearer tok"))
		.respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "publicKey": VAPID_KEY })))
		.expect(1)
		.mount(&server)
		.await;

	let key = fast_registrar(&server).fetch_vapid_key().await.unwrap();
	assert!(key.is_uncompressed_p256());
	assert_eq!(key.encode(), VAPID_KEY);
}

#[tokio::test]
async fn test_fetch_vapid_key_legacy_field() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/notifications/vapid-public-key"))
		.respond_with(
			ResponseTemplate::new(200).set_body_json(serde_json::json!({ "vapidPublicKey": VAPID_KEY })),
		)
		.mount(&server)
		.await;

	let key = registry(&server).fetch_vapid_key(None).await.unwrap();
	assert_eq!(&*key, VAPID_KEY);
}

#[tokio::test]
async fn test_unreachable_backend_is_transient() {
	// Nothing listens on the discard port
	let client = HttpRegistry::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
	assert!(matches!(client.register(&request()).await, Err(Error::NetworkTransient(_))));
}

// vim: ts=4
