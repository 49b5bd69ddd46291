#![no_main]

use ec2auth::transport::{MASK, format_json};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let formatted = format_json(data);
    match serde_json::from_slice::<serde_json::Value>(data) {
        Err(_) => {
            debug_assert!(formatted.error.is_some());
            debug_assert_eq!(formatted.text, String::from_utf8_lossy(data));
            debug_assert_eq!(formatted.raw.as_deref(), Some(data));
        }
        Ok(value) => {
            debug_assert!(formatted.error.is_none());
            let password = value
                .pointer("/auth/passwordCredentials/password")
                .and_then(|password| password.as_str());
            if let Some(password) = password {
                if password != MASK && !password.is_empty() {
                    let masked: serde_json::Value =
                        serde_json::from_str(&formatted.text).unwrap_or_default();
                    debug_assert_eq!(
                        masked.pointer("/auth/passwordCredentials/password"),
                        Some(&serde_json::Value::String(MASK.to_owned()))
                    );
                }
            }
        }
    }
});
