#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(schema) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = jsonschema_predicate::validator_for(&schema);
        let _ = jsonschema_predicate::options()
            .with_options(jsonschema_predicate::Options::strict())
            .inspect(&schema);
    }
});
