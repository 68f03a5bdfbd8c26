//! FHIR Validator - configuration, plan and rule-driven execution
//!
//! # Architecture
//!
//! The validator separates configuration, planning, and execution:
//!
//! ```text
//! ValidatorConfig (declarative) → ValidationPlan (executable) → Validator (reusable)
//! ```
//!
//! ## Phase 1: Declarative Configuration
//!
//! Define validation behavior via [`ValidatorConfig`]:
//! - Which checks run (cardinality, bindings, choice types, invariants)
//! - Rule suppression, level overrides and best-practice handling
//! - Preset-based or fully custom
//! - Serializable (YAML/JSON)
//!
//! ## Phase 2: Compiled Validation Plan
//!
//! Configuration compiles into a [`ValidationPlan`], rejecting settings that
//! could never produce a useful run.
//!
//! ## Phase 3: Reusable Validator & Stateless Execution
//!
//! [`Validator`] owns the plan, a [`RuleSet`] and a resource registry:
//! - Reusable across many validations and threads
//! - Each `validate()` call walks the value tree once with a short-lived run
//! - Returns a structured [`ValidationOutcome`]
//!
//! # Example
//!
//! ```rust
//! use tessera_models::{DateTime, Period, Primitive};
//! use tessera_validator::{Validator, ValidatorConfig};
//!
//! let period = Period {
//!     start: DateTime::parse("2020-01-02").map(Primitive::new),
//!     end: DateTime::parse("2020-01-01").map(Primitive::new),
//!     ..Default::default()
//! };
//!
//! let validator = Validator::from_config(&ValidatorConfig::default()).unwrap();
//! let outcome = validator.validate_element(&period);
//! assert!(!outcome.valid);
//! assert_eq!(outcome.issues[0].key, "per-1");
//! assert_eq!(outcome.issues[0].location.as_deref(), Some("Period"));
//! ```

use serde::{Deserialize, Serialize};
use tessera_models::DecodeOptions;

mod error;
mod location;
mod plan;
pub mod rules;
pub mod terminology;
mod validator;

pub use error::{ConfigError, ValidationError};
pub use location::LocationContext;
pub use plan::{InvariantsPlan, ReportPlan, Step, StepKind, ValidationPlan};
pub use rules::{CustomValidator, Rule, RuleSet};
pub use validator::{IssueCode, IssueSeverity, ValidationIssue, ValidationOutcome, Validator};

// ============================================================================
// Core Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub structure: StructureConfig,
    #[serde(default)]
    pub bindings: BindingsConfig,
    #[serde(default)]
    pub choices: ChoicesConfig,
    #[serde(default)]
    pub constraints: ConstraintsConfig,
    #[serde(default)]
    pub decode: DecodeOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    Ingestion,
    Authoring,
    Server,
    Publication,
}

/// On/off switch shared by the manifest-driven checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CheckMode {
    Off,
    #[default]
    On,
}

// ============================================================================
// Execution Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecConfig {
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,
}

fn default_max_issues() -> usize {
    1000
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_issues: 1000,
        }
    }
}

// ============================================================================
// Report Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_include_warnings")]
    pub include_warnings: bool,
    #[serde(default)]
    pub include_information: bool,
}

fn default_include_warnings() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_warnings: true,
            include_information: false,
        }
    }
}

// ============================================================================
// Structure / Bindings / Choices Config
// ============================================================================

/// Minimum cardinality of declared properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureConfig {
    #[serde(default)]
    pub mode: CheckMode,
}

/// Coded values against their required value sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingsConfig {
    #[serde(default)]
    pub mode: CheckMode,
}

/// Choice values against the type list of their property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoicesConfig {
    #[serde(default)]
    pub mode: CheckMode,
}

// ============================================================================
// Constraints Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintsConfig {
    #[serde(default)]
    pub mode: ConstraintsMode,
    #[serde(default)]
    pub best_practice: BestPracticeMode,
    #[serde(default)]
    pub suppress: Vec<ConstraintId>,
    #[serde(default)]
    pub level_overrides: Vec<ConstraintLevelOverride>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConstraintsMode {
    Off,
    /// Declarative rules only, no custom validators.
    InvariantsOnly,
    #[default]
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BestPracticeMode {
    #[default]
    Ignore,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstraintId(pub String);

impl From<&str> for ConstraintId {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintLevelOverride {
    pub id: ConstraintId,
    pub level: IssueLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueLevel {
    Error,
    Warning,
    Information,
}

impl Default for ConstraintsConfig {
    fn default() -> Self {
        Self {
            mode: ConstraintsMode::Full,
            best_practice: BestPracticeMode::Ignore,
            suppress: Vec::new(),
            level_overrides: Vec::new(),
        }
    }
}

// ============================================================================
// ValidatorConfig Implementation
// ============================================================================

impl ValidatorConfig {
    pub fn preset(p: Preset) -> Self {
        let mut cfg = Self::defaults();
        cfg.preset = Some(p);

        match p {
            Preset::Ingestion => {
                cfg.structure.mode = CheckMode::On;
                cfg.choices.mode = CheckMode::On;
                cfg.bindings.mode = CheckMode::Off;
                cfg.constraints.mode = ConstraintsMode::Off;
            }
            Preset::Authoring => {
                cfg.constraints.mode = ConstraintsMode::Full;
                cfg.constraints.best_practice = BestPracticeMode::Warn;
                cfg.report.include_information = true;
            }
            Preset::Server => {
                cfg.constraints.mode = ConstraintsMode::Full;
                cfg.decode.unknown_fields = tessera_models::UnknownFieldPolicy::Warn;
            }
            Preset::Publication => {
                cfg.constraints.mode = ConstraintsMode::Full;
                cfg.constraints.best_practice = BestPracticeMode::Error;
                cfg.decode = DecodeOptions::strict();
            }
        }

        cfg
    }

    pub fn defaults() -> Self {
        Self {
            preset: None,
            report: ReportConfig::default(),
            exec: ExecConfig::default(),
            structure: StructureConfig::default(),
            bindings: BindingsConfig::default(),
            choices: ChoicesConfig::default(),
            constraints: ConstraintsConfig::default(),
            decode: DecodeOptions::default(),
        }
    }

    pub fn compile(&self) -> Result<ValidationPlan, ConfigError> {
        if self.exec.max_issues == 0 {
            return Err(ConfigError::InvalidConfig(
                "exec.max_issues must be at least 1".to_string(),
            ));
        }

        let mut steps = Vec::new();

        if self.structure.mode == CheckMode::On {
            steps.push(Step::Cardinality);
        }
        if self.bindings.mode == CheckMode::On {
            steps.push(Step::Bindings);
        }
        if self.choices.mode == CheckMode::On {
            steps.push(Step::Choices);
        }
        if self.constraints.mode != ConstraintsMode::Off {
            steps.push(Step::Invariants(InvariantsPlan::from(&self.constraints)));
        }

        if steps.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "no validation steps enabled".to_string(),
            ));
        }

        Ok(ValidationPlan {
            steps,
            fail_fast: self.exec.fail_fast,
            max_issues: self.exec.max_issues,
            report: ReportPlan::from(&self.report),
            decode: self.decode,
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn builder() -> ValidatorConfigBuilder {
        ValidatorConfigBuilder::default()
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

// ============================================================================
// Builder Pattern
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct ValidatorConfigBuilder {
    cfg: Option<ValidatorConfig>,
}

impl ValidatorConfigBuilder {
    pub fn preset(mut self, p: Preset) -> Self {
        self.cfg = Some(ValidatorConfig::preset(p));
        self
    }

    pub fn structure_mode(mut self, mode: CheckMode) -> Self {
        self.cfg().structure.mode = mode;
        self
    }

    pub fn bindings_mode(mut self, mode: CheckMode) -> Self {
        self.cfg().bindings.mode = mode;
        self
    }

    pub fn choices_mode(mut self, mode: CheckMode) -> Self {
        self.cfg().choices.mode = mode;
        self
    }

    pub fn constraints_mode(mut self, mode: ConstraintsMode) -> Self {
        self.cfg().constraints.mode = mode;
        self
    }

    pub fn best_practice(mut self, mode: BestPracticeMode) -> Self {
        self.cfg().constraints.best_practice = mode;
        self
    }

    pub fn suppress(mut self, key: &str) -> Self {
        self.cfg().constraints.suppress.push(ConstraintId::from(key));
        self
    }

    pub fn override_level(mut self, key: &str, level: IssueLevel) -> Self {
        self.cfg()
            .constraints
            .level_overrides
            .push(ConstraintLevelOverride {
                id: ConstraintId::from(key),
                level,
            });
        self
    }

    pub fn include_warnings(mut self, include: bool) -> Self {
        self.cfg().report.include_warnings = include;
        self
    }

    pub fn include_information(mut self, include: bool) -> Self {
        self.cfg().report.include_information = include;
        self
    }

    pub fn decode_options(mut self, options: DecodeOptions) -> Self {
        self.cfg().decode = options;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.cfg().exec.fail_fast = fail_fast;
        self
    }

    pub fn max_issues(mut self, max: usize) -> Self {
        self.cfg().exec.max_issues = max;
        self
    }

    pub fn build(self) -> ValidatorConfig {
        self.cfg.unwrap_or_default()
    }

    fn cfg(&mut self) -> &mut ValidatorConfig {
        self.cfg.get_or_insert_with(ValidatorConfig::defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_ingestion() {
        let cfg = ValidatorConfig::preset(Preset::Ingestion);
        assert_eq!(cfg.structure.mode, CheckMode::On);
        assert_eq!(cfg.bindings.mode, CheckMode::Off);
        assert_eq!(cfg.constraints.mode, ConstraintsMode::Off);

        let plan = cfg.compile().unwrap();
        assert!(plan.has(StepKind::Cardinality));
        assert!(!plan.has(StepKind::Invariants));
        assert!(plan.invariants().is_none());
    }

    #[test]
    fn test_builder() {
        let cfg = ValidatorConfig::builder()
            .preset(Preset::Server)
            .bindings_mode(CheckMode::Off)
            .suppress("dom-6")
            .fail_fast(true)
            .build();

        assert_eq!(cfg.preset, Some(Preset::Server));
        assert_eq!(cfg.bindings.mode, CheckMode::Off);
        assert_eq!(cfg.constraints.suppress, vec![ConstraintId::from("dom-6")]);
        assert!(cfg.exec.fail_fast);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let cfg = ValidatorConfig::preset(Preset::Publication);
        let yaml = cfg.to_yaml().unwrap();
        let parsed = ValidatorConfig::from_yaml(&yaml).unwrap();
        assert_eq!(cfg.preset, parsed.preset);
        assert_eq!(cfg.constraints.best_practice, parsed.constraints.best_practice);
        assert_eq!(cfg.decode, parsed.decode);
    }

    #[test]
    fn test_yaml_sections_default() {
        let cfg = ValidatorConfig::from_yaml(
            "exec:\n  fail_fast: true\nconstraints:\n  suppress: [per-1]\n",
        )
        .unwrap();
        assert!(cfg.exec.fail_fast);
        assert_eq!(cfg.exec.max_issues, 1000);
        assert_eq!(cfg.structure.mode, CheckMode::On);
        assert_eq!(cfg.constraints.mode, ConstraintsMode::Full);
        assert_eq!(cfg.constraints.suppress, vec![ConstraintId::from("per-1")]);
    }

    #[test]
    fn test_compile_validation() {
        let cfg = ValidatorConfig::builder().max_issues(0).build();
        assert!(matches!(cfg.compile(), Err(ConfigError::InvalidConfig(_))));

        let cfg = ValidatorConfig::builder()
            .structure_mode(CheckMode::Off)
            .bindings_mode(CheckMode::Off)
            .choices_mode(CheckMode::Off)
            .constraints_mode(ConstraintsMode::Off)
            .build();
        assert!(matches!(cfg.compile(), Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ValidatorConfig::from_yaml("exec: [").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
