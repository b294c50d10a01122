//! Secret-key loading for keyed digests: `scheme:data` specs, decoded once before the pipeline starts.
//!
//! Schemes: `binary:<file path>` (raw file bytes), `base64:<text>`, `hex:<text>`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::info;
use std::path::Path;

use crate::error::KeyError;
use crate::utils::config::PackagePaths;

/// Decode key material `data` according to `scheme`.
pub fn decode(scheme: &str, data: &str) -> Result<Vec<u8>, KeyError> {
    match scheme {
        "binary" => std::fs::read(data).map_err(|source| KeyError::Read {
            path: data.into(),
            source,
        }),
        "base64" => STANDARD
            .decode(data.trim())
            .map_err(|e| KeyError::Decode {
                scheme: "base64",
                reason: e.to_string(),
            }),
        "hex" => hex::decode(data.trim()).map_err(|e| KeyError::Decode {
            scheme: "hex",
            reason: e.to_string(),
        }),
        other => Err(KeyError::UnknownScheme(other.to_string())),
    }
}

/// Split `scheme:data` at the first `:` and decode.
pub fn parse_key_spec(spec: &str) -> Result<Vec<u8>, KeyError> {
    match spec.split_once(':') {
        Some((scheme, data)) => decode(scheme, data),
        None => Err(KeyError::MissingScheme),
    }
}

fn non_empty_env() -> Option<String> {
    std::env::var(PackagePaths::get().key_env_var())
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Key spec from the environment (`TREESUM_KEY`), then from a `.env` file in `dir`.
pub fn key_spec_from_env(dir: &Path) -> Option<String> {
    if let Some(s) = non_empty_env() {
        info!("Key spec found in environment");
        return Some(s);
    }
    let env_path = dir.join(".env");
    if env_path.is_file() {
        let _ = dotenvy::from_path(&env_path);
        if let Some(s) = non_empty_env() {
            info!("Key spec found in {}", env_path.display());
            return Some(s);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = &[0x00, 0x01, 0xfe, 0xff, b'k', b'e', b'y'];

    #[test]
    fn test_hex_decode() {
        assert_eq!(decode("hex", &hex::encode(KEY)).unwrap(), KEY);
        assert_eq!(decode("hex", "0001FEFF6b6579\n").unwrap(), KEY);
    }

    #[test]
    fn test_base64_decode() {
        assert_eq!(decode("base64", &STANDARD.encode(KEY)).unwrap(), KEY);
    }

    #[test]
    fn test_binary_decode_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secret.bin");
        std::fs::write(&path, KEY).unwrap();
        assert_eq!(decode("binary", path.to_str().unwrap()).unwrap(), KEY);
    }

    #[test]
    fn test_binary_missing_file() {
        let err = decode("binary", "/definitely/not/here.key").unwrap_err();
        assert!(matches!(err, KeyError::Read { .. }));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            decode("hex", "abc").unwrap_err(),
            KeyError::Decode { scheme: "hex", .. }
        ));
        assert!(matches!(
            decode("base64", "!!not base64!!").unwrap_err(),
            KeyError::Decode {
                scheme: "base64",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_scheme() {
        assert!(matches!(
            decode("rot13", "abc").unwrap_err(),
            KeyError::UnknownScheme(ref s) if s == "rot13"
        ));
    }

    #[test]
    fn test_parse_key_spec() {
        assert_eq!(parse_key_spec("hex:6b6579").unwrap(), b"key");
        assert_eq!(parse_key_spec("base64:a2V5").unwrap(), b"key");
        // Only the first ':' separates scheme from data.
        assert!(matches!(
            parse_key_spec("hex:6b:65").unwrap_err(),
            KeyError::Decode { scheme: "hex", .. }
        ));
    }

    #[test]
    fn test_missing_scheme_does_not_echo_key() {
        let secret = "00112233445566778899aabbccddeeff";
        let err = parse_key_spec(secret).unwrap_err();
        assert!(matches!(err, KeyError::MissingScheme));
        assert!(!err.to_string().contains(secret));
    }
}
