use crate::{
    BestPracticeMode, ConstraintsConfig, ConstraintsMode, IssueLevel, ReportConfig,
};
use tessera_models::DecodeOptions;

use crate::validator::IssueSeverity;

/// Compiled validation plan - list of steps to execute
#[derive(Debug, Clone)]
pub struct ValidationPlan {
    pub steps: Vec<Step>,
    pub fail_fast: bool,
    pub max_issues: usize,
    pub report: ReportPlan,
    /// Options used when the validator decodes raw JSON itself.
    pub decode: DecodeOptions,
}

#[derive(Debug, Clone)]
pub enum Step {
    /// Minimum cardinality of every declared property.
    Cardinality,
    /// Coded values against their closed value sets.
    Bindings,
    /// Choice values against the types their property accepts.
    Choices,
    /// Per-shape rules registered in the rule set.
    Invariants(InvariantsPlan),
}

impl ValidationPlan {
    pub fn has(&self, step: StepKind) -> bool {
        self.steps.iter().any(|s| s.kind() == step)
    }

    pub fn invariants(&self) -> Option<&InvariantsPlan> {
        self.steps.iter().find_map(|step| match step {
            Step::Invariants(plan) => Some(plan),
            _ => None,
        })
    }
}

/// Discriminant of [`Step`], for membership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Cardinality,
    Bindings,
    Choices,
    Invariants,
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Cardinality => StepKind::Cardinality,
            Step::Bindings => StepKind::Bindings,
            Step::Choices => StepKind::Choices,
            Step::Invariants(_) => StepKind::Invariants,
        }
    }
}

// ============================================================================
// Step Plans
// ============================================================================

#[derive(Debug, Clone)]
pub struct InvariantsPlan {
    pub mode: ConstraintsMode,
    pub best_practice: BestPracticeMode,
    pub suppress: Vec<crate::ConstraintId>,
    pub level_overrides: Vec<crate::ConstraintLevelOverride>,
}

impl From<&ConstraintsConfig> for InvariantsPlan {
    fn from(cfg: &ConstraintsConfig) -> Self {
        Self {
            mode: cfg.mode,
            best_practice: cfg.best_practice,
            suppress: cfg.suppress.clone(),
            level_overrides: cfg.level_overrides.clone(),
        }
    }
}

impl InvariantsPlan {
    /// Whether custom validators run in addition to declarative rules.
    pub fn runs_custom(&self) -> bool {
        self.mode == ConstraintsMode::Full
    }

    /// Severity a failed rule is reported with, or `None` when it is dropped.
    ///
    /// Suppression wins, then an explicit level override, then the
    /// best-practice mode, then the rule's declared severity.
    pub fn effective_severity(
        &self,
        key: &str,
        declared: IssueSeverity,
        is_best_practice: bool,
    ) -> Option<IssueSeverity> {
        if self.suppress.iter().any(|id| id.0 == key) {
            return None;
        }

        if let Some(level) = self
            .level_overrides
            .iter()
            .find(|o| o.id.0 == key)
            .map(|o| o.level)
        {
            return Some(match level {
                IssueLevel::Error => IssueSeverity::Error,
                IssueLevel::Warning => IssueSeverity::Warning,
                IssueLevel::Information => IssueSeverity::Information,
            });
        }

        if is_best_practice {
            return match self.best_practice {
                BestPracticeMode::Ignore => None,
                BestPracticeMode::Warn => Some(IssueSeverity::Warning),
                BestPracticeMode::Error => Some(IssueSeverity::Error),
            };
        }

        Some(declared)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportPlan {
    pub include_warnings: bool,
    pub include_information: bool,
}

impl From<&ReportConfig> for ReportPlan {
    fn from(cfg: &ReportConfig) -> Self {
        Self {
            include_warnings: cfg.include_warnings,
            include_information: cfg.include_information,
        }
    }
}

impl ReportPlan {
    pub fn keeps(&self, severity: IssueSeverity) -> bool {
        match severity {
            IssueSeverity::Warning => self.include_warnings,
            IssueSeverity::Information => self.include_information,
            IssueSeverity::Fatal | IssueSeverity::Error => true,
        }
    }
}
