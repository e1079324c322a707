//! Bearer token source for backend calls
//!
//! Passed to the coordinator at construction instead of being read from
//! ambient storage, so a logout simply drops the coordinator.

use async_trait::async_trait;
use std::fmt::Debug;

#[async_trait]
pub trait AuthTokenProvider: Debug + Send + Sync {
	/// The current bearer token, or `None` when the user is signed out
	async fn token(&self) -> Option<Box<str>>;
}

/// A token fixed for the lifetime of the session
#[derive(Clone)]
pub struct StaticToken(Option<Box<str>>);

impl StaticToken {
	pub fn new(token: impl Into<Box<str>>) -> Self {
		Self(Some(token.into()))
	}

	pub fn signed_out() -> Self {
		Self(None)
	}
}

// Never print the token itself
impl Debug for StaticToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("StaticToken").field(&self.0.as_ref().map(|_| "***")).finish()
	}
}

#[async_trait]
impl AuthTokenProvider for StaticToken {
	async fn token(&self) -> Option<Box<str>> {
		self.0.clone()
	}
}

// vim: ts=4
