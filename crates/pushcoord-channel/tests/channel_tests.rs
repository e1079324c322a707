//! Channel subscriber tests against the memory platform

use std::sync::Arc;
use std::time::Duration;

use pushcoord_channel::{ChannelSubscriber, WebPushSubscriber, WorkerOpts, FCM_ENDPOINT_BASE};
use pushcoord_core::{CapabilityDetector, VapidKey};
use pushcoord_platform_adapter_memory::{MemoryCloudMessaging, MemoryPlatform};
use pushcoord_types::messaging_adapter::CloudMessagingAdapter;
use pushcoord_types::platform_adapter::PushPlatform;
use pushcoord_types::prelude::*;
use pushcoord_types::types::Credential;

fn key() -> VapidKey {
	VapidKey::from_bytes(vec![4u8; 65])
}

fn granted_platform() -> Arc<MemoryPlatform> {
	let platform = Arc::new(MemoryPlatform::new());
	platform.set_permission(PermissionState::Granted);
	platform
}

fn web_push(platform: &Arc<MemoryPlatform>) -> WebPushSubscriber {
	WebPushSubscriber::new(platform.clone(), WorkerOpts::default())
}

#[tokio::test]
async fn test_web_push_subscribe() {
	let platform = granted_platform();
	let sub = web_push(&platform).subscribe(&key()).await.unwrap();

	assert_eq!(sub.channel, ChannelKind::WebPush);
	assert!(!sub.endpoint.is_empty());
	assert!(matches!(sub.credential, Credential::Keys { .. }));
	assert_eq!(platform.channels_created(), 1);
	assert_eq!(
		platform.calls(),
		vec!["platform.register_worker /sw.js".to_string(), "platform.subscribe".to_string()]
	);
}

#[tokio::test]
async fn test_web_push_reuses_live_channel() {
	let platform = granted_platform();
	let subscriber = web_push(&platform);
	let first = subscriber.subscribe(&key()).await.unwrap();
	let second = subscriber.subscribe(&key()).await.unwrap();

	assert_eq!(first.endpoint, second.endpoint);
	assert_eq!(first.credential, second.credential);
	assert_eq!(platform.channels_created(), 1);
	// The second call never reached the push manager
	assert_eq!(platform.calls().iter().filter(|c| *c == "platform.subscribe").count(), 1);
}

#[tokio::test]
async fn test_web_push_worker_rejected() {
	let platform = granted_platform();
	platform.reject_worker("script evaluation failed");
	let res = web_push(&platform).subscribe(&key()).await;
	assert!(matches!(res, Err(Error::WorkerRegistrationFailed(_))));
	assert_eq!(platform.channels_created(), 0);
}

#[tokio::test]
async fn test_web_push_channel_declined_after_permission() {
	let platform = granted_platform();
	platform.decline_channel(true);
	let res = web_push(&platform).subscribe(&key()).await;
	assert!(matches!(res, Err(Error::PushChannelDenied)));
}

#[tokio::test(start_paused = true)]
async fn test_web_push_activation_timeout() {
	let platform = granted_platform();
	platform.stall_activation(true);
	let opts = WorkerOpts { step_timeout: Duration::from_secs(15), ..WorkerOpts::default() };
	let res = WebPushSubscriber::new(platform.clone(), opts).subscribe(&key()).await;
	assert!(matches!(res, Err(Error::Timeout("worker activation"))));
}

#[tokio::test]
async fn test_web_push_current_and_unsubscribe() {
	let platform = granted_platform();
	let subscriber = web_push(&platform);
	assert!(subscriber.current().await.unwrap().is_none());

	let sub = subscriber.subscribe(&key()).await.unwrap();
	let current = subscriber.current().await.unwrap().unwrap();
	assert_eq!(current.endpoint, sub.endpoint);

	assert!(subscriber.unsubscribe().await.unwrap());
	assert!(subscriber.current().await.unwrap().is_none());
	assert!(!subscriber.unsubscribe().await.unwrap());
}

#[tokio::test]
async fn test_select_falls_back_to_web_push() {
	let platform = granted_platform();
	let messaging = Arc::new(MemoryCloudMessaging::new());
	messaging.set_supported(false);
	let messaging: Arc<dyn CloudMessagingAdapter> = messaging;
	let platform: Arc<dyn PushPlatform> = platform;

	let detection = CapabilityDetector::new(platform.clone(), Some(messaging.clone())).detect();
	let subscriber = ChannelSubscriber::select(
		&detection,
		ChannelKind::Fcm,
		platform,
		Some(messaging),
		WorkerOpts::default(),
	);
	assert_eq!(subscriber.kind(), ChannelKind::WebPush);
}

#[tokio::test]
async fn test_cloud_message_subscribe() {
	let platform = granted_platform();
	let messaging = Arc::new(MemoryCloudMessaging::new());
	let detection =
		CapabilityDetector::new(platform.clone(), Some(messaging.clone() as Arc<dyn CloudMessagingAdapter>))
			.detect();
	let subscriber = ChannelSubscriber::select(
		&detection,
		ChannelKind::Fcm,
		platform.clone(),
		Some(messaging.clone()),
		WorkerOpts::default(),
	);
	assert_eq!(subscriber.kind(), ChannelKind::Fcm);

	let sub = subscriber.subscribe(&key()).await.unwrap();
	assert_eq!(sub.channel, ChannelKind::Fcm);
	assert_eq!(&*sub.endpoint, &*format!("{}token-1", FCM_ENDPOINT_BASE));
	assert_eq!(sub.credential, Credential::Token { token: "token-1".into() });

	// Same token on the second call, and no raw push channel was opened
	let again = subscriber.subscribe(&key()).await.unwrap();
	assert_eq!(again.endpoint, sub.endpoint);
	assert_eq!(messaging.tokens_issued(), 1);
	assert_eq!(platform.channels_created(), 0);

	assert!(subscriber.unsubscribe().await.unwrap());
	assert!(subscriber.current().await.unwrap().is_none());
}

#[tokio::test]
async fn test_cloud_message_failures_stay_distinct() {
	let platform = granted_platform();
	let messaging = Arc::new(MemoryCloudMessaging::new());
	let detection = CapabilityDetector::new(
		platform.clone(),
		Some(messaging.clone() as Arc<dyn CloudMessagingAdapter>),
	)
	.detect();
	let subscriber = ChannelSubscriber::select(
		&detection,
		ChannelKind::Fcm,
		platform,
		Some(messaging.clone()),
		WorkerOpts::default(),
	);

	messaging.set_outage(true);
	assert!(matches!(subscriber.subscribe(&key()).await, Err(Error::NetworkTransient(_))));

	messaging.set_outage(false);
	messaging.refuse_tokens(true);
	assert!(matches!(subscriber.subscribe(&key()).await, Err(Error::PushChannelDenied)));

	messaging.set_supported(false);
	assert!(matches!(subscriber.subscribe(&key()).await, Err(Error::Unsupported)));
}

// vim: ts=4
