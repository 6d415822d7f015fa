//! Fixture-driven conformance tests.
//!
//! Every file under `tests/suite/<draft>/` follows the JSON-Schema-Test-Suite
//! layout: a list of cases, each with a schema and instances marked valid or
//! invalid. Schemas are compiled with every strictness option enabled and with
//! local references inlined. Keywords next to `$ref` apply from draft 2020-12 on.

use std::fs;
use std::path::Path;

use jsonschema_predicate::{KeywordTable, Options, Resolver};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct Case {
    description: String,
    schema: Value,
    tests: Vec<Test>,
}

#[derive(Debug, Deserialize)]
struct Test {
    description: String,
    data: Value,
    valid: bool,
}

fn run_suite(draft: &str, keywords: &KeywordTable, resolver: Resolver) {
    let suite_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("suite")
        .join(draft);
    let options = jsonschema_predicate::options()
        .with_keywords(keywords.clone())
        .with_options(Options::strict())
        .with_resolver(resolver);

    let mut entries: Vec<_> = fs::read_dir(&suite_path)
        .expect("Failed to read suite directory")
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort_by_key(std::fs::DirEntry::path);
    assert!(!entries.is_empty(), "No fixtures in {}", suite_path.display());

    let mut passed = 0;
    let mut failures: Vec<String> = Vec::new();

    for entry in entries {
        let filepath = entry.path();
        let filename = filepath
            .file_name()
            .and_then(|name| name.to_str())
            .expect("UTF-8 file name")
            .to_string();
        let content = fs::read_to_string(&filepath)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", filepath.display()));
        let cases: Vec<Case> = serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", filepath.display()));

        for case in &cases {
            let predicate = match options.build(&case.schema) {
                Ok(predicate) => predicate,
                Err(error) => {
                    failures.push(format!(
                        "FAILED to build schema for {filename} / {}: {error}",
                        case.description
                    ));
                    continue;
                }
            };
            for test in &case.tests {
                if predicate.is_valid(&test.data) == test.valid {
                    passed += 1;
                } else {
                    failures.push(format!(
                        "FAILED: {filename} / {} / {}\nInstance: {}\nExpected valid: {}\nCompiled: {predicate}",
                        case.description, test.description, test.data, test.valid
                    ));
                }
            }
        }
    }

    assert!(
        failures.is_empty(),
        "\n{} test(s) failed ({passed} passed):\n\n{}",
        failures.len(),
        failures.join("\n\n")
    );
}

#[test]
fn draft6() {
    run_suite("draft6", &KeywordTable::draft6(), Resolver::new());
}

#[test]
fn draft2020() {
    run_suite(
        "draft2020",
        &KeywordTable::draft2020(),
        Resolver::new().with_sibling_keywords(true),
    );
}
