use crate::location::LocationContext;
use crate::plan::{StepKind, ValidationPlan};
use crate::rules::RuleSet;
use crate::{ConfigError, ValidationError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tessera_models::codec::{DecodeMode, PropertyDef};
use tessera_models::{
    AnyResource, DynamicValue, FhirString, OperationOutcome, OperationOutcomeIssue,
    ResourceRegistry, Structure, Visit, Visitor,
};

/// Reusable validator - owns plan, rule set and resource registry
#[derive(Debug, Clone)]
pub struct Validator {
    plan: ValidationPlan,
    rules: Arc<RuleSet>,
    registry: Arc<ResourceRegistry>,
}

impl Validator {
    pub fn new(plan: ValidationPlan) -> Self {
        Self {
            plan,
            rules: Arc::new(RuleSet::standard()),
            registry: Arc::new(ResourceRegistry::standard()),
        }
    }

    pub fn from_config(config: &crate::ValidatorConfig) -> Result<Self, ConfigError> {
        let plan = config.compile()?;
        Ok(Self::new(plan))
    }

    /// Registry used by [`Validator::validate_json`].
    pub fn with_registry(mut self, registry: Arc<ResourceRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_rules(mut self, rules: Arc<RuleSet>) -> Self {
        self.rules = rules;
        self
    }

    pub fn plan(&self) -> &ValidationPlan {
        &self.plan
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn validate(&self, resource: &AnyResource) -> ValidationOutcome {
        let resource_type = resource.resource_type().to_string();
        if resource.is_unknown() {
            tracing::debug!(%resource_type, "resource has no declared shape, nothing to check");
        }
        self.run(resource.as_visit(), resource_type)
    }

    /// Validates a standalone element, with locations rooted at its type name.
    pub fn validate_element<T: Structure>(&self, element: &T) -> ValidationOutcome {
        self.run(element, T::TYPE_NAME.to_string())
    }

    /// Decodes with the configured registry and options, then validates. A
    /// structural decode failure becomes a single fatal issue.
    pub fn validate_json(&self, value: &Value) -> ValidationOutcome {
        match self.registry.decode(value, self.plan.decode) {
            Ok(resource) => self.validate(&resource),
            Err(err) => {
                let resource_type = value
                    .get("resourceType")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                tracing::debug!(error = %err, "decode failed before validation");
                ValidationOutcome::from_issues(
                    resource_type,
                    vec![ValidationIssue::new(
                        IssueSeverity::Fatal,
                        IssueCode::Structure,
                        "structure",
                        err.to_string(),
                    )],
                )
            }
        }
    }

    pub fn validate_batch(&self, resources: &[AnyResource]) -> Vec<ValidationOutcome> {
        resources.iter().map(|r| self.validate(r)).collect()
    }

    fn run(&self, root: &dyn Visit, root_name: String) -> ValidationOutcome {
        let mut run = ValidationRun::new(&self.plan, &self.rules, root_name.clone());
        run.node(root);
        let outcome = ValidationOutcome::from_issues(Some(root_name), run.issues);
        tracing::debug!(
            resource_type = outcome.resource_type.as_deref().unwrap_or("-"),
            errors = outcome.error_count(),
            warnings = outcome.warning_count(),
            stopped_early = run.stopped,
            "validation finished"
        );
        outcome
    }
}

/// Short-lived state of one validation: the location stack and the issues
/// found so far.
struct ValidationRun<'v> {
    plan: &'v ValidationPlan,
    rules: &'v RuleSet,
    location: LocationContext,
    issues: Vec<ValidationIssue>,
    stopped: bool,
}

impl<'v> ValidationRun<'v> {
    fn new(plan: &'v ValidationPlan, rules: &'v RuleSet, root: String) -> Self {
        Self {
            plan,
            rules,
            location: LocationContext::new(root),
            issues: Vec::new(),
            stopped: false,
        }
    }

    fn push(&mut self, issue: ValidationIssue) {
        if self.stopped || !self.plan.report.keeps(issue.severity) {
            return;
        }
        let is_error = issue.is_error();
        self.issues.push(issue);
        if (self.plan.fail_fast && is_error) || self.issues.len() >= self.plan.max_issues {
            self.stopped = true;
        }
    }

    fn child_path(&self, def: &PropertyDef) -> String {
        match def.mode {
            DecodeMode::Choice => self.location.child(&format!("{}[x]", def.name)),
            _ => self.location.child(def.name),
        }
    }
}

impl<'a, 'v> Visitor<'a> for ValidationRun<'v> {
    fn enter(&mut self, name: &str, index: Option<usize>) {
        self.location.push(name, index);
    }

    fn leave(&mut self) {
        self.location.pop();
    }

    fn node(&mut self, node: &'a dyn Visit) {
        if self.stopped {
            return;
        }
        if let Some(invariants) = self.plan.invariants() {
            let mut found = Vec::new();
            self.rules.apply(node, &self.location, invariants, &mut found);
            for issue in found {
                self.push(issue);
            }
        }
        if !self.stopped {
            node.walk(self);
        }
    }

    fn cardinality(&mut self, def: &'static PropertyDef, count: usize) {
        if self.stopped || !self.plan.has(StepKind::Cardinality) {
            return;
        }
        let min = def.cardinality.min();
        if count < min {
            let path = self.child_path(def);
            self.push(
                ValidationIssue::error(
                    IssueCode::Required,
                    "required",
                    format!("{path}: minimum required = {min}, but only found {count}"),
                )
                .with_location(path),
            );
        }
    }

    fn code(&mut self, def: &'static PropertyDef, code: &'a str) {
        if self.stopped || !self.plan.has(StepKind::Bindings) {
            return;
        }
        let Some(value_set) = def.binding else {
            return;
        };
        if !value_set.contains(code) {
            self.push(
                ValidationIssue::error(
                    IssueCode::CodeInvalid,
                    "code-invalid",
                    format!(
                        "The value '{code}' is not in the required value set {}",
                        value_set.url
                    ),
                )
                .with_location(self.location.path()),
            );
        }
    }

    fn choice(&mut self, def: &'static PropertyDef, value: &'a DynamicValue) {
        if self.stopped || !self.plan.has(StepKind::Choices) {
            return;
        }
        let tag = value.tag();
        if !def.accepts(tag) {
            let allowed = def
                .choices
                .iter()
                .map(|t| t.code())
                .collect::<Vec<_>>()
                .join(", ");
            self.push(
                ValidationIssue::error(
                    IssueCode::Structure,
                    "choice-type",
                    format!("Type '{tag}' is not allowed for {}[x]; expected one of {allowed}", def.name),
                )
                .with_location(self.location.path()),
            );
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub resource_type: Option<String>,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn success(resource_type: Option<String>) -> Self {
        Self {
            resource_type,
            valid: true,
            issues: Vec::new(),
        }
    }

    pub fn from_issues(resource_type: Option<String>, issues: Vec<ValidationIssue>) -> Self {
        Self {
            resource_type,
            valid: !issues.iter().any(ValidationIssue::is_error),
            issues,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count()
    }

    /// Issues with the given rule key.
    pub fn with_key<'s>(&'s self, key: &'s str) -> impl Iterator<Item = &'s ValidationIssue> + 's {
        self.issues.iter().filter(move |i| i.key == key)
    }

    /// Fails with every error-severity message combined, in visitation order.
    pub fn ensure_valid(&self) -> Result<(), ValidationError> {
        let messages: Vec<String> = self.errors().map(ToString::to_string).collect();
        if messages.is_empty() {
            return Ok(());
        }
        Err(ValidationError::Combined {
            count: messages.len(),
            message: messages.join("; "),
        })
    }

    /// Fails with the first error-severity issue.
    pub fn first_error(&self) -> Result<(), ValidationError> {
        match self.errors().next() {
            Some(issue) => Err(ValidationError::Issue(issue.clone())),
            None => Ok(()),
        }
    }

    /// Typed `OperationOutcome`; an outcome with no issues reports a single
    /// informational entry since the resource requires at least one.
    pub fn to_operation_outcome(&self) -> OperationOutcome {
        let mut issue: Vec<OperationOutcomeIssue> =
            self.issues.iter().map(ValidationIssue::to_outcome_issue).collect();
        if issue.is_empty() {
            issue.push(OperationOutcomeIssue::new(
                "information",
                "informational",
                "No issues detected during validation",
            ));
        }
        OperationOutcome {
            issue,
            ..Default::default()
        }
    }
}

/// Individual validation issue
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    /// Stable identifier of the check that raised the issue (`per-1`,
    /// `required`, `code-invalid`).
    pub key: &'static str,
    pub diagnostics: String,
    pub location: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        severity: IssueSeverity,
        code: IssueCode,
        key: &'static str,
        diagnostics: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            key,
            diagnostics: diagnostics.into(),
            location: None,
        }
    }

    pub fn error(code: IssueCode, key: &'static str, diagnostics: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, code, key, diagnostics)
    }

    pub fn warning(code: IssueCode, key: &'static str, diagnostics: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Warning, code, key, diagnostics)
    }

    pub fn information(code: IssueCode, key: &'static str, diagnostics: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Information, code, key, diagnostics)
    }

    pub fn with_location(mut self, location: String) -> Self {
        self.location = Some(location);
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, IssueSeverity::Error | IssueSeverity::Fatal)
    }

    fn to_outcome_issue(&self) -> OperationOutcomeIssue {
        let mut issue = OperationOutcomeIssue::new(
            &self.severity.to_string().to_lowercase(),
            &self.code.to_string(),
            self.diagnostics.clone(),
        );
        if let Some(location) = &self.location {
            issue.location.push(FhirString::from(location.as_str()));
            issue.expression.push(FhirString::from(location.as_str()));
        }
        issue
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity,
            self.key,
            self.location.as_deref().unwrap_or("-"),
            self.diagnostics
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => write!(f, "Fatal"),
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
            Self::Information => write!(f, "Information"),
        }
    }
}

/// FHIR issue-type codes raised by this validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueCode {
    Invalid,
    Structure,
    Required,
    Value,
    Invariant,
    CodeInvalid,
    BusinessRule,
    Informational,
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Invalid => "invalid",
            Self::Structure => "structure",
            Self::Required => "required",
            Self::Value => "value",
            Self::Invariant => "invariant",
            Self::CodeInvalid => "code-invalid",
            Self::BusinessRule => "business-rule",
            Self::Informational => "informational",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Preset, ValidatorConfig};
    use serde_json::json;
    use tessera_models::{Period, Quantity, Ratio};

    fn validator() -> Validator {
        Validator::from_config(&ValidatorConfig::default()).unwrap()
    }

    #[test]
    fn numerator_without_denominator_is_one_error() {
        let ratio = Ratio {
            numerator: Some(Quantity::default()),
            ..Default::default()
        };
        let outcome = validator().validate_element(&ratio);
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].key, "rat-1");
        assert_eq!(outcome.issues[0].severity, IssueSeverity::Error);
        assert!(outcome.issues[0].diagnostics.contains("denominator"));
    }

    #[test]
    fn clean_element_is_valid() {
        let outcome = validator().validate_element(&Period::default());
        assert!(outcome.valid);
        assert!(outcome.issues.is_empty());
        assert!(outcome.ensure_valid().is_ok());
        assert!(outcome.first_error().is_ok());
    }

    #[test]
    fn decode_failures_become_fatal_issues() {
        let outcome = validator().validate_json(&json!({
            "resourceType": "Patient",
            "birthDate": "1990-13-01"
        }));
        assert!(!outcome.valid);
        assert_eq!(outcome.resource_type.as_deref(), Some("Patient"));
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(outcome.issues[0].severity, IssueSeverity::Fatal);
        assert!(outcome.issues[0].diagnostics.contains("Patient.birthDate"));
    }

    #[test]
    fn empty_outcome_exports_an_informational_issue() {
        let outcome = ValidationOutcome::success(Some("Patient".into()));
        let exported = outcome.to_operation_outcome();
        assert_eq!(exported.issue.len(), 1);
        assert_eq!(exported.issue[0].severity_str(), Some("information"));
    }

    #[test]
    fn issue_display_names_key_and_location() {
        let issue = ValidationIssue::error(IssueCode::Invariant, "per-1", "bad period")
            .with_location("Period".into());
        assert_eq!(issue.to_string(), "Error [per-1] Period: bad period");
    }

    #[test]
    fn preset_validators_compile() {
        for preset in [Preset::Ingestion, Preset::Authoring, Preset::Server, Preset::Publication] {
            assert!(Validator::from_config(&ValidatorConfig::preset(preset)).is_ok());
        }
    }
}
