//! VAPID public key codec
//!
//! The backend hands out the application server key as URL-safe base64
//! without padding; the push manager wants raw bytes. Decoding pads with `=`
//! up to a multiple of four, maps `-` to `+` and `_` to `/`, then runs a
//! standard base64 decode.

use base64::{
	alphabet,
	engine::general_purpose::{GeneralPurpose, PAD, URL_SAFE_NO_PAD},
	Engine,
};

use crate::prelude::*;

/// Standard alphabet, padded, tolerant of non-zero trailing bits like `atob`
const STANDARD_LENIENT: GeneralPurpose =
	GeneralPurpose::new(&alphabet::STANDARD, PAD.with_decode_allow_trailing_bits(true));

/// Decoded VAPID public key. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct VapidKey(Box<[u8]>);

impl VapidKey {
	/// Decodes a base64url string into key bytes
	pub fn decode(base64url: &str) -> PcResult<Self> {
		let normalized = normalize(base64url)?;
		let bytes = STANDARD_LENIENT
			.decode(normalized.as_bytes())
			.map_err(|e| Error::MalformedKey(e.to_string()))?;
		Ok(VapidKey(bytes.into_boxed_slice()))
	}

	pub fn from_bytes(bytes: impl Into<Box<[u8]>>) -> Self {
		VapidKey(bytes.into())
	}

	/// Unpadded base64url form, as served by the backend
	pub fn encode(&self) -> String {
		URL_SAFE_NO_PAD.encode(&self.0)
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Whether this looks like an uncompressed P-256 point (65 bytes, 0x04 prefix)
	pub fn is_uncompressed_p256(&self) -> bool {
		self.0.len() == 65 && self.0.first() == Some(&0x04)
	}
}

impl std::fmt::Debug for VapidKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "VapidKey({})", self.encode())
	}
}

/// Pads and converts a base64url string to the standard alphabet
fn normalize(base64url: &str) -> PcResult<String> {
	let body = base64url.trim_end_matches('=');
	let pad_len = base64url.len() - body.len();

	if let Some((pos, c)) =
		body.char_indices().find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
	{
		return Err(Error::MalformedKey(format!("invalid character {:?} at offset {}", c, pos)));
	}

	let padding = (4 - body.len() % 4) % 4;
	// One leftover symbol can never encode a whole byte
	if padding == 3 || (pad_len > 0 && pad_len != padding) {
		return Err(Error::MalformedKey(format!("invalid length {}", base64url.len())));
	}

	let mut normalized = String::with_capacity(body.len() + padding);
	normalized.extend(body.chars().map(|c| match c {
		'-' => '+',
		'_' => '/',
		c => c,
	}));
	normalized.extend(std::iter::repeat_n('=', padding));

	if normalized.len() % 4 != 0 {
		return Err(Error::MalformedKey(format!("invalid length {}", base64url.len())));
	}
	Ok(normalized)
}


// vim: ts=4
