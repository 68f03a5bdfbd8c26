//! Case-file validation suite
//!
//! Uses libtest-mimic to generate one test per JSON file in `tests/cases/`.
//! Each case holds a resource, an optional preset and the exact list of
//! issues (key, severity, location) the validator must report, in order.
//!
//! ```bash
//! # Run all cases
//! cargo test -p tessera-validator --test fixture_suite
//!
//! # Filter by name
//! cargo test -p tessera-validator --test fixture_suite -- bundle
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use libtest_mimic::{Arguments, Failed, Trial};
use serde::Deserialize;
use serde_json::Value;
use tessera_models::AnyResource;
use tessera_validator::{Preset, Validator, ValidatorConfig};

#[derive(Debug, Deserialize)]
struct Case {
    #[serde(default)]
    description: String,
    #[serde(default)]
    preset: Option<Preset>,
    resource: Value,
    expect: Expectation,
}

#[derive(Debug, Deserialize)]
struct Expectation {
    valid: bool,
    #[serde(default)]
    issues: Vec<ExpectedIssue>,
}

#[derive(Debug, Deserialize, PartialEq)]
struct ExpectedIssue {
    key: String,
    severity: String,
    location: String,
}

// ---------------------------------------------------------------------------
// Case loading
// ---------------------------------------------------------------------------

fn cases_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/cases")
}

fn case_files() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(cases_dir())
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

fn make_trial(path: PathBuf) -> Trial {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("case")
        .to_string();
    Trial::test(name, move || run_case(&path))
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

fn run_case(path: &Path) -> Result<(), Failed> {
    let text = fs::read_to_string(path).map_err(|e| format!("could not read case: {e}"))?;
    let case: Case = serde_json::from_str(&text).map_err(|e| format!("malformed case: {e}"))?;

    let config = match case.preset {
        Some(preset) => ValidatorConfig::preset(preset),
        None => ValidatorConfig::default(),
    };
    let validator = Validator::from_config(&config).map_err(|e| format!("bad config: {e}"))?;
    let resource =
        AnyResource::from_json(&case.resource).map_err(|e| format!("resource did not decode: {e}"))?;
    let outcome = validator.validate(&resource);

    let actual: Vec<ExpectedIssue> = outcome
        .issues
        .iter()
        .map(|issue| ExpectedIssue {
            key: issue.key.to_string(),
            severity: issue.severity.to_string().to_lowercase(),
            location: issue.location.clone().unwrap_or_default(),
        })
        .collect();

    if actual == case.expect.issues && outcome.valid == case.expect.valid {
        return Ok(());
    }

    let mut msg = format!(
        "{}\n  expected valid={} with {} issue(s), got valid={} with {}:",
        case.description,
        case.expect.valid,
        case.expect.issues.len(),
        outcome.valid,
        outcome.issues.len(),
    );
    for (i, issue) in outcome.issues.iter().enumerate() {
        msg.push_str(&format!("\n  [{i}] {issue}"));
    }
    Err(msg.into())
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let args = Arguments::from_args();
    let trials: Vec<Trial> = case_files().into_iter().map(make_trial).collect();
    eprintln!("Case suite: {} case file(s)", trials.len());
    libtest_mimic::run(&args, trials).exit();
}
