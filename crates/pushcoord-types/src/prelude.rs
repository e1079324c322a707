pub use crate::error::{Error, ErrorKind, PcResult, RejectReason};
pub use crate::types::{ChannelKind, PermissionState, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
