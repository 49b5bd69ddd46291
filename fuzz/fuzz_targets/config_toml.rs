#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(args) = ec2auth::fuzzing::apply_config_from_toml(input) {
            debug_assert!(!args.timeout.is_zero());
            debug_assert!(!args.connect_timeout.is_zero());
            if let Some(budget) = args.retry_budget {
                debug_assert!(!budget.is_zero());
            }
        }
    }
});
