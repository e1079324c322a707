//! HTTP registry client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::time::Duration;

use crate::prelude::*;
use pushcoord_types::registry_adapter::{classify_status, RegistryAdapter};
use pushcoord_types::types::{Credential, RegistrationRequest, Subscription};

pub const VAPID_KEY_PATH: &str = "notifications/vapid-public-key";
pub const REGISTER_PATH: &str = "notifications/register-web";
pub const UNREGISTER_PATH: &str = "notifications/unregister-web";

/// Request body for registering a subscription
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
	pub subscription: BrowserSubscription<'a>,
	pub channel: ChannelKind,
	/// Cloud-messaging token, absent for raw web push
	pub token: Option<&'a str>,
}

/// Subscription in the browser's `PushSubscription.toJSON()` shape
#[derive(Debug, Serialize)]
pub struct BrowserSubscription<'a> {
	pub endpoint: &'a str,
	/// Unix timestamp in milliseconds
	#[serde(rename = "expirationTime")]
	pub expiration_time: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub keys: Option<BrowserSubscriptionKeys<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BrowserSubscriptionKeys<'a> {
	pub p256dh: &'a str,
	pub auth: &'a str,
}

impl<'a> RegisterBody<'a> {
	pub fn new(sub: &'a Subscription) -> Self {
		let (keys, token) = match &sub.credential {
			Credential::Keys { p256dh, auth } => {
				(Some(BrowserSubscriptionKeys { p256dh, auth }), None)
			}
			Credential::Token { token } => (None, Some(&**token)),
		};
		RegisterBody {
			subscription: BrowserSubscription {
				endpoint: &sub.endpoint,
				expiration_time: sub.expiration_time.map(|ts| ts.0.saturating_mul(1000)),
				keys,
			},
			channel: sub.channel,
			token,
		}
	}
}

#[derive(Debug, Serialize)]
pub struct UnregisterBody<'a> {
	pub endpoint: &'a str,
}

#[derive(Debug, Deserialize)]
struct VapidKeyResponse {
	#[serde(rename = "publicKey", alias = "vapidPublicKey")]
	public_key: Box<str>,
}

#[derive(Debug, Clone)]
pub struct HttpRegistry {
	client: reqwest::Client,
	base: url::Url,
}

impl HttpRegistry {
	pub fn new(base_url: &str, request_timeout: Duration) -> PcResult<Self> {
		// A base without a trailing slash would lose its last path segment on join
		let base = if base_url.ends_with('/') {
			url::Url::parse(base_url)
		} else {
			url::Url::parse(&format!("{}/", base_url))
		}
		.map_err(|e| Error::Parse(format!("invalid base URL {}: {}", base_url, e)))?;

		let client = reqwest::Client::builder().timeout(request_timeout).build()?;
		Ok(Self { client, base })
	}

	pub fn base_url(&self) -> &url::Url {
		&self.base
	}

	fn url(&self, path: &str) -> PcResult<url::Url> {
		self.base.join(path).map_err(|e| Error::Parse(format!("invalid path {}: {}", path, e)))
	}

	async fn check(response: reqwest::Response) -> PcResult<reqwest::Response> {
		let status = response.status().as_u16();
		if let Err(err) = classify_status(status) {
			let body = response.text().await.unwrap_or_default();
			debug!(status, body = %body, "Registry answered with an error");
			return Err(err);
		}
		Ok(response)
	}
}

#[async_trait]
impl RegistryAdapter for HttpRegistry {
	async fn fetch_vapid_key(&self, auth_token: Option<&str>) -> PcResult<Box<str>> {
		let mut request = self.client.get(self.url(VAPID_KEY_PATH)?);
		if let Some(token) = auth_token {
			request = request.bearer_auth(token);
		}
		let response = Self::check(request.send().await?).await?;
		let body: VapidKeyResponse = response.json().await?;
		Ok(body.public_key)
	}

	async fn register(&self, req: &RegistrationRequest) -> PcResult<()> {
		let response = self
			.client
			.post(self.url(REGISTER_PATH)?)
			.bearer_auth(&req.auth_token)
			.json(&RegisterBody::new(&req.subscription))
			.send()
			.await?;
		Self::check(response).await?;
		Ok(())
	}

	async fn unregister(&self, endpoint: &str, auth_token: &str) -> PcResult<()> {
		let response = self
			.client
			.post(self.url(UNREGISTER_PATH)?)
			.bearer_auth(auth_token)
			.json(&UnregisterBody { endpoint })
			.send()
			.await?;
		Self::check(response).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn web_push_sub() -> Subscription {
		Subscription {
			endpoint: "https://push.example.net/send/1".into(),
			channel: ChannelKind::WebPush,
			credential: Credential::Keys { p256dh: "BPk".into(), auth: "au".into() },
			created_at: Timestamp(1_700_000_000),
			expiration_time: Some(Timestamp(1_800_000_000)),
		}
	}

	#[test]
	fn test_register_body_web_push() {
		let sub = web_push_sub();
		let json = serde_json::to_value(RegisterBody::new(&sub)).unwrap();
		assert_eq!(
			json,
			serde_json::json!({
				"subscription": {
					"endpoint": "https://push.example.net/send/1",
					"expirationTime": 1_800_000_000_000_i64,
					"keys": { "p256dh": "BPk", "auth": "au" }
				},
				"channel": "webpush"
			})
		);
	}

	#[test]
	fn test_register_body_cloud_message() {
		let sub = Subscription {
			endpoint: "https://fcm.googleapis.com/fcm/send/token-1".into(),
			channel: ChannelKind::Fcm,
			credential: Credential::Token { token: "token-1".into() },
			created_at: Timestamp(1_700_000_000),
			expiration_time: None,
		};
		let json = serde_json::to_value(RegisterBody::new(&sub)).unwrap();
		assert_eq!(json["channel"], "fcm");
		assert_eq!(json["token"], "token-1");
		assert!(json["subscription"].get("keys").is_none());
		assert!(json["subscription"]["expirationTime"].is_null());
	}

	#[test]
	fn test_base_url_keeps_path() {
		let registry = HttpRegistry::new("https://api.example.com/v2", Duration::from_secs(1)).unwrap();
		assert_eq!(
			registry.url(REGISTER_PATH).unwrap().as_str(),
			"https://api.example.com/v2/notifications/register-web"
		);
	}
}

// vim: ts=4
