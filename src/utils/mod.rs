use std::path::Path;

use log::debug;
use sha2::{Digest, Sha256};

use crate::error::{AnalyzerError, Result};

/// SHA-256 of `bytes` as lowercase hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Read a file and fingerprint its contents
pub fn read_with_fingerprint(path: &Path) -> Result<(String, String)> {
    let bytes = std::fs::read(path).map_err(|e| AnalyzerError::io(path, e))?;
    let fingerprint = sha256_hex(&bytes);
    debug!("Fingerprint of {}: {}", path.display(), fingerprint);

    let text = String::from_utf8(bytes).map_err(|e| {
        AnalyzerError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    Ok((text, fingerprint))
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// `successes / total`, rounded; `None` when there is nothing to divide
pub fn success_rate(successes: usize, total: usize, places: u32) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(round_to(successes as f64 / total as f64, places))
}
