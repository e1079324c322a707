//! Push notification subscription coordinator
//!
//! Detects platform capability, asks for permission, opens a push channel
//! (raw web push or a cloud-messaging token) and keeps exactly one canonical
//! subscription registered with the backend. The UI layer reads
//! [`CoordinatorSnapshot`]s and calls the operations on [`Coordinator`].
//!
//! ```ignore
//! let coordinator = CoordinatorBuilder::new()
//! 	.opts(CoordinatorOpts::from_env()?)
//! 	.platform(platform)
//! 	.auth(Arc::new(StaticToken::new(token)))
//! 	.state_adapter(state)
//! 	.build()?;
//! coordinator.restore().await?;
//! if coordinator.request_permission().await? == PermissionState::Granted {
//! 	coordinator.subscribe().await?;
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod lifecycle;
pub mod logging;
pub mod prelude;
pub mod state;

pub use builder::CoordinatorBuilder;
pub use lifecycle::Coordinator;
pub use logging::init_tracing;
pub use state::{CoordinatorSnapshot, LifecycleState};

pub use pushcoord_core::{CoordinatorOpts, Detection, RetryPolicy, VapidKey};
pub use pushcoord_types::auth::{AuthTokenProvider, StaticToken};
pub use pushcoord_types::types::{DismissalRecord, Subscription};
pub use pushcoord_types::{error, messaging_adapter, platform_adapter, registry_adapter, state_adapter, types};

// vim: ts=4
