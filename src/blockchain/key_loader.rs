//! Secret key loading and validation.
//!
//! The key arrives as a JSON array of 64 integers (the format written by
//! `solana-keygen`). Parsing is strict: anything that is not an array of
//! integers is `MalformedConfig`, a wrong element count is
//! `InvalidKeyLength`, and an element outside 0..=255 is `ByteOutOfRange`.
//!
//! # Security
//! - The raw value is never logged or echoed in errors
//! - Parsed bytes live in a `SecretBox` and are zeroized on drop

use std::env::VarError;

use secrecy::{ExposeSecret, SecretBox};

use crate::blockchain::types::{TransferError, TransferResult, SECRET_KEY_LEN};

/// Exactly 64 bytes of signing key material.
pub struct SecretKeyMaterial(SecretBox<[u8; SECRET_KEY_LEN]>);

impl SecretKeyMaterial {
    /// Parse a raw configuration string.
    pub fn parse(raw: &str) -> TransferResult<Self> {
        let values: Vec<i64> = serde_json::from_str(raw.trim())
            .map_err(|e| TransferError::MalformedConfig(describe_json_error(&e)))?;

        if values.len() != SECRET_KEY_LEN {
            return Err(TransferError::InvalidKeyLength {
                expected: SECRET_KEY_LEN,
                actual: values.len(),
            });
        }

        let mut bytes = Box::new([0u8; SECRET_KEY_LEN]);
        for (index, value) in values.iter().enumerate() {
            bytes[index] = u8::try_from(*value).map_err(|_| TransferError::ByteOutOfRange {
                index,
                value: *value,
            })?;
        }

        Ok(Self(SecretBox::new(bytes)))
    }

    /// Read and parse the key from environment variable `var`.
    ///
    /// An unset variable is `MissingKey`; a set but non-UTF-8 value is
    /// `MalformedConfig`.
    pub fn from_env(var: &str) -> TransferResult<Self> {
        match std::env::var(var) {
            Ok(raw) => Self::parse(&raw),
            Err(VarError::NotPresent) => Self::from_lookup(var, None),
            Err(VarError::NotUnicode(_)) => Err(TransferError::MalformedConfig(format!(
                "{} is not valid UTF-8",
                var
            ))),
        }
    }

    /// Parse an already-looked-up value, treating `None` as a missing variable.
    pub fn from_lookup(var: &str, raw: Option<&str>) -> TransferResult<Self> {
        match raw {
            Some(raw) => Self::parse(raw),
            None => Err(TransferError::MissingKey {
                var: var.to_string(),
            }),
        }
    }

    pub(crate) fn expose(&self) -> &[u8; SECRET_KEY_LEN] {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for SecretKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKeyMaterial([REDACTED])")
    }
}

/// serde_json messages quote the offending input; keep only the category
/// and position so key bytes never reach an error message.
fn describe_json_error(e: &serde_json::Error) -> String {
    let kind = match e.classify() {
        serde_json::error::Category::Io => "I/O error",
        serde_json::error::Category::Syntax => "invalid JSON",
        serde_json::error::Category::Data => "expected an array of integers",
        serde_json::error::Category::Eof => "unexpected end of input",
    };
    format!("{} at line {} column {}", kind, e.line(), e.column())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_array(len: usize, value: i64) -> String {
        let items: Vec<String> = (0..len).map(|_| value.to_string()).collect();
        format!("[{}]", items.join(","))
    }

    #[test]
    fn test_parse_valid_key() {
        let raw: Vec<String> = (0..64).map(|i| i.to_string()).collect();
        let key = SecretKeyMaterial::parse(&format!(" [{}]\n", raw.join(", "))).unwrap();
        assert_eq!(key.expose()[0], 0);
        assert_eq!(key.expose()[63], 63);
    }

    #[test]
    fn test_wrong_lengths() {
        for len in [0usize, 1, 32, 63, 65, 128] {
            let err = SecretKeyMaterial::parse(&json_array(len, 7)).unwrap_err();
            assert_eq!(
                err,
                TransferError::InvalidKeyLength {
                    expected: 64,
                    actual: len
                },
                "length {}",
                len
            );
        }
    }

    #[test]
    fn test_malformed_json() {
        for raw in ["", "not json", "[1,2,", "{\"key\": 1}", "\"[1,2,3]\"", "[1.5, 2]", "[\"a\"]", "null"] {
            let err = SecretKeyMaterial::parse(raw).unwrap_err();
            assert!(
                matches!(err, TransferError::MalformedConfig(_)),
                "{:?} gave {:?}",
                raw,
                err
            );
        }
    }

    #[test]
    fn test_byte_out_of_range() {
        let mut values = vec![1i64; 64];
        values[10] = 256;
        let err = SecretKeyMaterial::parse(&serde_json::to_string(&values).unwrap()).unwrap_err();
        assert_eq!(err, TransferError::ByteOutOfRange { index: 10, value: 256 });

        let err = SecretKeyMaterial::parse(&json_array(64, -1)).unwrap_err();
        assert_eq!(err, TransferError::ByteOutOfRange { index: 0, value: -1 });
    }

    #[test]
    fn test_error_does_not_echo_input() {
        let err = SecretKeyMaterial::parse("[12,34,secret]").unwrap_err();
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn test_missing_variable() {
        let err = SecretKeyMaterial::from_env("DEVNET_TRANSFER_TEST_UNSET_KEY").unwrap_err();
        assert_eq!(
            err,
            TransferError::MissingKey {
                var: "DEVNET_TRANSFER_TEST_UNSET_KEY".to_string()
            }
        );
        assert!(matches!(
            SecretKeyMaterial::from_lookup("PRIVATE_KEY", None),
            Err(TransferError::MissingKey { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_variable_is_malformed_not_missing() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let var = "DEVNET_TRANSFER_TEST_NON_UTF8_KEY";
        std::env::set_var(var, OsString::from_vec(vec![0x5b, 0xff, 0x5d]));
        let err = SecretKeyMaterial::from_env(var).unwrap_err();
        std::env::remove_var(var);

        assert!(matches!(err, TransferError::MalformedConfig(_)), "{:?}", err);
        assert!(!err.to_string().contains("not set"));
    }

    #[test]
    fn test_set_variable_is_parsed() {
        let var = "DEVNET_TRANSFER_TEST_SET_KEY";
        std::env::set_var(var, json_array(3, 1));
        let err = SecretKeyMaterial::from_env(var).unwrap_err();
        std::env::remove_var(var);

        assert_eq!(err, TransferError::InvalidKeyLength { expected: 64, actual: 3 });
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = SecretKeyMaterial::parse(&json_array(64, 42)).unwrap();
        let debug = format!("{:?}", key);
        assert_eq!(debug, "SecretKeyMaterial([REDACTED])");
    }
}
