#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors and validation errors are both fine; panics are not.
    if let Ok(cfg) = flowdip_config::load_toml(data)
        && cfg.validate().is_ok()
    {
        // A validated table must always convert into usable core tolerances.
        let tol = flowdip_core::Tolerances::from(&cfg.tolerances);
        assert!(tol.validate().is_ok());
    }
    // The trace parser sees the same bytes as a flowmeter export.
    let _ = flowdip_config::parse_trace(data.as_bytes(), b';');
});
