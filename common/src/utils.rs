// Common Crate - utils.rs
// common/src/utils.rs
use rand::{rngs::OsRng, RngCore};
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::HubError;

/// Number of random bytes behind a session identity
pub const IDENTITY_BYTES: usize = 32;

/// Setup tracing for consistent logging across the relay.
/// `RUST_LOG` overrides the default `info` level.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Generate an unpredictable, hex-encoded session identity from the OS CSPRNG
pub fn generate_identity() -> Result<String, HubError> {
    generate_identity_with(&mut OsRng)
}

pub fn generate_identity_with<R: RngCore>(rng: &mut R) -> Result<String, HubError> {
    let mut bytes = [0u8; IDENTITY_BYTES];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}
