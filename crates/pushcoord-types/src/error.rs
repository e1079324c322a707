//! Error types
//!
//! Every failure of the coordinator is one of these variants. None of them is
//! fatal to the host: the lifecycle manager records the kind in its `Error`
//! state and stays callable.

use serde::Serialize;
use std::fmt;

pub type PcResult<T> = std::result::Result<T, Error>;

/// Why the backend refused a registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
	/// Non-auth 4xx answer, never retried
	Status(u16),
	/// Transient failures on every allowed attempt
	RetriesExhausted { attempts: u16, last_error: String },
}

impl fmt::Display for RejectReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RejectReason::Status(status) => write!(f, "HTTP {}", status),
			RejectReason::RetriesExhausted { attempts, last_error } => {
				write!(f, "gave up after {} attempts: {}", attempts, last_error)
			}
		}
	}
}

#[derive(Debug)]
pub enum Error {
	/// A required platform primitive is missing
	Unsupported,
	/// The user (or the platform settings) refused notification permission
	PermissionDenied,
	/// The platform rejected the background worker
	WorkerRegistrationFailed(String),
	/// The user declined the push channel even though permission was granted
	PushChannelDenied,
	/// The VAPID public key is not valid base64url
	MalformedKey(String),
	/// No bearer token available, or the backend refused it
	Unauthenticated,
	RegistrationRejected(RejectReason),
	/// Retried internally by the registrar, surfaced only outside the retry loop
	NetworkTransient(String),
	/// A platform step did not finish in time
	Timeout(&'static str),
	/// The coordinator was shut down while the operation was waiting
	Cancelled,

	// externals
	Io(std::io::Error),
	Parse(String),
	Internal(String),
}

impl Error {
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::Unsupported => ErrorKind::Unsupported,
			Error::PermissionDenied => ErrorKind::PermissionDenied,
			Error::WorkerRegistrationFailed(_) => ErrorKind::WorkerRegistrationFailed,
			Error::PushChannelDenied => ErrorKind::PushChannelDenied,
			Error::MalformedKey(_) => ErrorKind::MalformedKey,
			Error::Unauthenticated => ErrorKind::Unauthenticated,
			Error::RegistrationRejected(_) => ErrorKind::RegistrationRejected,
			Error::NetworkTransient(_) => ErrorKind::NetworkTransient,
			Error::Timeout(_) => ErrorKind::Timeout,
			Error::Cancelled => ErrorKind::Cancelled,
			Error::Io(_) | Error::Parse(_) | Error::Internal(_) => ErrorKind::Internal,
		}
	}

	/// Whether the registrar may retry the failed call
	pub fn is_transient(&self) -> bool {
		matches!(self, Error::NetworkTransient(_))
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::Unsupported => write!(f, "push notifications are not supported here"),
			Error::PermissionDenied => write!(f, "notification permission denied"),
			Error::WorkerRegistrationFailed(msg) => {
				write!(f, "background worker registration failed: {}", msg)
			}
			Error::PushChannelDenied => write!(f, "push channel creation was declined"),
			Error::MalformedKey(msg) => write!(f, "malformed VAPID key: {}", msg),
			Error::Unauthenticated => write!(f, "missing or rejected bearer token"),
			Error::RegistrationRejected(reason) => write!(f, "registration rejected: {}", reason),
			Error::NetworkTransient(msg) => write!(f, "transient network error: {}", msg),
			Error::Timeout(step) => write!(f, "timed out during {}", step),
			Error::Cancelled => write!(f, "operation cancelled"),
			Error::Io(e) => write!(f, "io error: {}", e),
			Error::Parse(msg) => write!(f, "parse error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		// Anything that never produced a status is a connectivity problem
		if err.is_decode() || err.is_builder() {
			Self::Parse(err.to_string())
		} else {
			Self::NetworkTransient(err.to_string())
		}
	}
}

// ErrorKind //
//***********//
/// Payload-free error classification, kept in the lifecycle `Error` state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
	Unsupported,
	PermissionDenied,
	WorkerRegistrationFailed,
	PushChannelDenied,
	MalformedKey,
	Unauthenticated,
	RegistrationRejected,
	NetworkTransient,
	Timeout,
	Cancelled,
	Internal,
}

impl ErrorKind {
	/// Stable code for the UI layer
	pub fn code(self) -> &'static str {
		match self {
			ErrorKind::Unsupported => "E-PUSH-UNSUPPORTED",
			ErrorKind::PermissionDenied => "E-PUSH-PERMISSION",
			ErrorKind::WorkerRegistrationFailed => "E-PUSH-WORKER",
			ErrorKind::PushChannelDenied => "E-PUSH-CHANNEL",
			ErrorKind::MalformedKey => "E-PUSH-KEY",
			ErrorKind::Unauthenticated => "E-PUSH-AUTH",
			ErrorKind::RegistrationRejected => "E-PUSH-REJECTED",
			ErrorKind::NetworkTransient => "E-PUSH-NETWORK",
			ErrorKind::Timeout => "E-PUSH-TIMEOUT",
			ErrorKind::Cancelled => "E-PUSH-CANCELLED",
			ErrorKind::Internal => "E-INTERNAL",
		}
	}
}

impl fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.code())
	}
}


// vim: ts=4
