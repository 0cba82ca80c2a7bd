//! Compact, URL-safe codes that carry a whole profile.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use tracing::warn;

use crate::errors::{PlanError, Result};

use super::Profile;

/// Serializes `profile` as compact JSON and encodes it as unpadded URL-safe base64.
pub fn encode(profile: &Profile) -> Result<String> {
    let json = serde_json::to_vec(profile)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

pub fn decode(code: &str) -> Result<Profile> {
    let bytes = URL_SAFE_NO_PAD
        .decode(code.trim())
        .map_err(|err| PlanError::ShareCode(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| PlanError::ShareCode(err.to_string()))
}

/// Like [`decode`], but a corrupt code falls back to the default profile.
pub fn decode_or_default(code: &str) -> Profile {
    match decode(code) {
        Ok(profile) => profile,
        Err(err) => {
            warn!(error = %err, "could not open share code, using the default profile");
            Profile::default()
        }
    }
}
