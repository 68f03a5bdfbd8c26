//! Invariants of the general-purpose datatypes.

use super::{Rule, RuleSet};
use rust_decimal::Decimal;
use tessera_models::{
    Attachment, ContactPoint, Extension, Identifier, Period, Quantity, Range, Ratio, TimingRepeat,
};

pub(super) fn register(set: &mut RuleSet) {
    set.add::<Period>(vec![Rule::error(
        "per-1",
        "If present, start SHALL have a lower value than end",
        period_ordered,
    )]);
    set.add::<Ratio>(vec![Rule::error(
        "rat-1",
        "Numerator and denominator SHALL both be present, or both are absent. If both are absent, there SHALL be some extension present",
        ratio_complete,
    )]);
    set.add::<Range>(vec![Rule::error(
        "rng-2",
        "If present, low SHALL have a lower value than high",
        range_ordered,
    )]);
    set.add::<Quantity>(vec![Rule::error(
        "qty-3",
        "If a code for the unit is present, the system SHALL also be present",
        |q: &Quantity| q.code.is_none() || q.system.is_some(),
    )]);
    set.add::<Identifier>(vec![Rule::error(
        "idf-assigner",
        "An assigner reference that declares a type SHALL point to an Organization",
        assigner_is_organization,
    )]);
    set.add::<Attachment>(vec![Rule::error(
        "att-1",
        "If the Attachment has data, it SHALL have a contentType",
        |a: &Attachment| a.data.is_none() || a.content_type.is_some(),
    )]);
    set.add::<ContactPoint>(vec![Rule::error(
        "cpt-2",
        "A system is required if a value is provided.",
        |c: &ContactPoint| c.value.is_none() || c.system.is_some(),
    )]);
    set.add::<Extension>(vec![Rule::error(
        "ext-1",
        "Must have either extensions or value[x], not both",
        |e: &Extension| e.extension.is_empty() == e.value.is_some(),
    )]);
    set.add::<TimingRepeat>(vec![
        Rule::error(
            "tim-1",
            "if there's a duration, there needs to be duration units",
            |r: &TimingRepeat| r.duration.is_none() || r.duration_unit.is_some(),
        ),
        Rule::error(
            "tim-2",
            "if there's a period, there needs to be period units",
            |r: &TimingRepeat| r.period.is_none() || r.period_unit.is_some(),
        ),
        Rule::error(
            "tim-4",
            "duration SHALL be a non-negative value",
            |r: &TimingRepeat| non_negative(r.duration.as_ref().and_then(|p| p.value)),
        ),
        Rule::error(
            "tim-5",
            "period SHALL be a non-negative value",
            |r: &TimingRepeat| non_negative(r.period.as_ref().and_then(|p| p.value)),
        ),
    ]);
}

/// Partial dates compare by the instants they cover: the period only fails
/// when every instant of `start` lies after every instant of `end`.
fn period_ordered(period: &Period) -> bool {
    let start = period.start.as_ref().and_then(|p| p.value());
    let end = period.end.as_ref().and_then(|p| p.value());
    match (start, end) {
        (Some(start), Some(end)) => start.lower_bound() <= end.upper_bound(),
        _ => true,
    }
}

fn ratio_complete(ratio: &Ratio) -> bool {
    let balanced = ratio.numerator.is_some() == ratio.denominator.is_some();
    balanced && (ratio.numerator.is_some() || !ratio.extension.is_empty())
}

fn range_ordered(range: &Range) -> bool {
    let low = range.low.as_ref().and_then(Quantity::decimal);
    let high = range.high.as_ref().and_then(Quantity::decimal);
    match (low, high) {
        (Some(low), Some(high)) => low <= high,
        _ => true,
    }
}

fn assigner_is_organization(identifier: &Identifier) -> bool {
    identifier
        .assigner
        .as_ref()
        .and_then(|assigner| assigner.target_type())
        .map_or(true, |target| target == "Organization")
}

fn non_negative(value: Option<Decimal>) -> bool {
    value.map_or(true, |v| v.is_zero() || v.is_sign_positive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_models::{DateTime, DynamicValue, Primitive, Reference};

    fn period(start: &str, end: &str) -> Period {
        Period {
            start: DateTime::parse(start).map(Primitive::new),
            end: DateTime::parse(end).map(Primitive::new),
            ..Default::default()
        }
    }

    #[test]
    fn periods_compare_by_covered_instants() {
        assert!(!period_ordered(&period("2020-01-02", "2020-01-01")));
        assert!(period_ordered(&period("2020-01-01", "2020-01-01")));
        assert!(period_ordered(&period("2020-01-15", "2020-01")));
        assert!(period_ordered(&Period::default()));
    }

    #[test]
    fn ratio_needs_both_sides_or_an_extension() {
        let numerator_only = Ratio {
            numerator: Some(Quantity::default()),
            ..Default::default()
        };
        assert!(!ratio_complete(&numerator_only));
        assert!(!ratio_complete(&Ratio::default()));

        let extended = Ratio {
            extension: vec![Extension::new(
                "http://example.org/why",
                DynamicValue::String(Primitive::from("not measured")),
            )],
            ..Default::default()
        };
        assert!(ratio_complete(&extended));
    }

    #[test]
    fn assigner_type_must_be_organization() {
        let mut identifier = Identifier::new("http://example.org/mrn", "123");
        assert!(assigner_is_organization(&identifier));

        identifier.assigner = Some(Box::new(Reference::to("Practitioner", "p1")));
        assert!(!assigner_is_organization(&identifier));

        identifier.assigner = Some(Box::new(Reference::to("Organization", "o1")));
        assert!(assigner_is_organization(&identifier));
    }
}
