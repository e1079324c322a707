//! Log output for hosts that have no subscriber of their own

/// Installs a fmt subscriber filtered by `RUST_LOG`. A second call, or a host
/// that already installed a subscriber, is left alone.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.try_init();
}

// vim: ts=4
