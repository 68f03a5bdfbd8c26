//! Per-shape validation rules.
//!
//! A [`RuleSet`] maps a concrete Rust type to its declarative [`Rule`]s and
//! custom validators. The validation run looks up every node it visits by
//! type and applies what it finds, so a shape with no entry costs one hash
//! lookup.

use crate::location::LocationContext;
use crate::plan::InvariantsPlan;
use crate::validator::{IssueCode, IssueSeverity, ValidationIssue};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use tessera_models::Visit;

mod datatypes;
mod resources;

/// Check that reports below the node it runs on, such as one issue per
/// offending list entry.
pub type CustomValidator<T> = fn(&T, &LocationContext, &mut Vec<ValidationIssue>);

/// A cross-field invariant: `check` returns `true` when the node conforms.
pub struct Rule<T> {
    pub key: &'static str,
    pub severity: IssueSeverity,
    pub human: &'static str,
    pub check: fn(&T) -> bool,
    pub best_practice: bool,
}

impl<T> Rule<T> {
    pub fn error(key: &'static str, human: &'static str, check: fn(&T) -> bool) -> Self {
        Self {
            key,
            severity: IssueSeverity::Error,
            human,
            check,
            best_practice: false,
        }
    }

    pub fn warning(key: &'static str, human: &'static str, check: fn(&T) -> bool) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            ..Self::error(key, human, check)
        }
    }

    /// Marks the rule as a guideline whose severity follows the configured
    /// best-practice mode.
    pub fn best_practice(mut self) -> Self {
        self.best_practice = true;
        self
    }

    pub fn message(&self) -> String {
        let prefix = if self.best_practice {
            "[Best Practice] "
        } else {
            ""
        };
        format!("{}Constraint '{}' failed: {}", prefix, self.key, self.human)
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("key", &self.key)
            .field("severity", &self.severity)
            .field("best_practice", &self.best_practice)
            .finish_non_exhaustive()
    }
}

trait ShapeRules: Send + Sync {
    fn apply(
        &self,
        node: &dyn Any,
        location: &LocationContext,
        plan: &InvariantsPlan,
        out: &mut Vec<ValidationIssue>,
    );

    fn keys(&self) -> Vec<&'static str>;
}

struct TypedRules<T> {
    rules: Vec<Rule<T>>,
    custom: Vec<CustomValidator<T>>,
}

impl<T: 'static> ShapeRules for TypedRules<T> {
    fn apply(
        &self,
        node: &dyn Any,
        location: &LocationContext,
        plan: &InvariantsPlan,
        out: &mut Vec<ValidationIssue>,
    ) {
        let Some(node) = node.downcast_ref::<T>() else {
            return;
        };

        for rule in &self.rules {
            if (rule.check)(node) {
                continue;
            }
            let Some(severity) = plan.effective_severity(rule.key, rule.severity, rule.best_practice)
            else {
                continue;
            };
            out.push(
                ValidationIssue::new(severity, IssueCode::Invariant, rule.key, rule.message())
                    .with_location(location.path()),
            );
        }

        if !plan.runs_custom() {
            return;
        }
        let mut found = Vec::new();
        for validator in &self.custom {
            validator(node, location, &mut found);
        }
        for mut issue in found {
            if let Some(severity) = plan.effective_severity(issue.key, issue.severity, false) {
                issue.severity = severity;
                out.push(issue);
            }
        }
    }

    fn keys(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.key).collect()
    }
}

/// Dispatch table from concrete shape type to its rules.
#[derive(Default)]
pub struct RuleSet {
    shapes: HashMap<TypeId, Vec<Box<dyn ShapeRules>>>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("shapes", &self.shapes.len())
            .field("rules", &self.rule_count())
            .finish()
    }
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rules for every declared datatype and resource.
    pub fn standard() -> Self {
        let mut set = Self::empty();
        datatypes::register(&mut set);
        resources::register(&mut set);
        set
    }

    pub fn add<T: Visit>(&mut self, rules: Vec<Rule<T>>) -> &mut Self {
        self.insert(TypedRules {
            rules,
            custom: Vec::new(),
        })
    }

    pub fn add_custom<T: Visit>(&mut self, validator: CustomValidator<T>) -> &mut Self {
        self.insert(TypedRules {
            rules: Vec::new(),
            custom: vec![validator],
        })
    }

    fn insert<T: Visit>(&mut self, rules: TypedRules<T>) -> &mut Self {
        self.shapes
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Box::new(rules));
        self
    }

    /// Keys of the declarative rules registered for `T`.
    pub fn keys_for<T: Visit>(&self) -> Vec<&'static str> {
        self.shapes
            .get(&TypeId::of::<T>())
            .map(|entries| entries.iter().flat_map(|e| e.keys()).collect())
            .unwrap_or_default()
    }

    pub fn rule_count(&self) -> usize {
        self.shapes
            .values()
            .flatten()
            .map(|entry| entry.keys().len())
            .sum()
    }

    /// Applies the rules registered for the node's concrete type. Returns
    /// whether any were found.
    pub(crate) fn apply(
        &self,
        node: &dyn Visit,
        location: &LocationContext,
        plan: &InvariantsPlan,
        out: &mut Vec<ValidationIssue>,
    ) -> bool {
        let any = node.as_any();
        let Some(entries) = self.shapes.get(&any.type_id()) else {
            return false;
        };
        tracing::trace!(
            type_name = node.type_name(),
            location = %location,
            entries = entries.len(),
            "dispatching rules"
        );
        for entry in entries {
            entry.apply(any, location, plan, out);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BestPracticeMode, ConstraintsConfig};
    use tessera_models::{Period, Quantity, Ratio};

    fn plan(best_practice: BestPracticeMode) -> InvariantsPlan {
        InvariantsPlan::from(&ConstraintsConfig {
            best_practice,
            ..Default::default()
        })
    }

    #[test]
    fn standard_set_covers_datatypes_and_resources() {
        let rules = RuleSet::standard();
        assert_eq!(rules.keys_for::<Period>(), vec!["per-1"]);
        assert_eq!(rules.keys_for::<Ratio>(), vec!["rat-1"]);
        assert!(rules.keys_for::<tessera_models::Patient>().contains(&"dom-6"));
        assert!(rules.rule_count() > 30);
    }

    #[test]
    fn dispatch_is_keyed_by_concrete_type() {
        let mut rules = RuleSet::empty();
        rules.add::<Quantity>(vec![Rule::error("qty-x", "never holds", |_| false)]);

        let location = LocationContext::new("Quantity");
        let mut out = Vec::new();
        assert!(!rules.apply(&Period::default(), &location, &plan(BestPracticeMode::Ignore), &mut out));
        assert!(out.is_empty());

        assert!(rules.apply(&Quantity::default(), &location, &plan(BestPracticeMode::Ignore), &mut out));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].diagnostics, "Constraint 'qty-x' failed: never holds");
    }

    #[test]
    fn best_practice_follows_the_mode() {
        let mut rules = RuleSet::empty();
        rules.add::<Period>(vec![Rule::error("bp-1", "guideline", |_| false).best_practice()]);
        let location = LocationContext::new("Period");

        let mut out = Vec::new();
        rules.apply(&Period::default(), &location, &plan(BestPracticeMode::Ignore), &mut out);
        assert!(out.is_empty());

        rules.apply(&Period::default(), &location, &plan(BestPracticeMode::Warn), &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].severity, IssueSeverity::Warning);
        assert!(out[0].diagnostics.starts_with("[Best Practice] "));
    }
}
