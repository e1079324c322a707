//! Push channel negotiation
//!
//! Two delivery substrates produce the same `Subscription` contract:
//!
//! - raw web push: the push manager issues an endpoint and ECDH keys
//! - cloud messaging: a provider issues an opaque device token
//!
//! Both are variants of [`ChannelSubscriber`]; the lifecycle manager holds
//! exactly one and never branches on which.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod cloud_message;
pub mod subscriber;
pub mod webpush;

mod prelude;

pub use cloud_message::{CloudMessageSubscriber, FCM_ENDPOINT_BASE};
pub use subscriber::ChannelSubscriber;
pub use webpush::{WebPushSubscriber, WorkerOpts};

// vim: ts=4
