#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&[u8], &[u8])| {
    let (schema, instance) = data;
    if let Ok(schema) = serde_json::from_slice::<serde_json::Value>(schema) {
        if let Ok(instance) = serde_json::from_slice::<serde_json::Value>(instance) {
            if let Ok(predicate) = jsonschema_predicate::validator_for(&schema) {
                let _ = predicate.is_valid(&instance);
                let _ = predicate.evaluate(None);
            }
        }
    }
});
