//! Exclusion Properties
//!
//! Randomised exclusion toggles over a field group and a form: the aggregate
//! value and validity always match the currently included members.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use formwork::prelude::*;
use formwork_testkit::strategies::arb_validity;
use proptest::prelude::*;

/// A field whose only validator always reports `validity`.
fn field_with(name: &str, validity: Validity) -> ExcludableField<i64> {
    let verdict = validity.is_valid();
    ExcludableField::new(
        FieldConfig::new(name, 0i64).with_validation(
            SuiteConfig::new().with_validator(Validator::new(move |_: &i64| verdict)),
        ),
    )
    .unwrap()
}

fn expected_validity(validities: &[Validity], excluded: &[bool]) -> Validity {
    Validity::reduce(
        validities
            .iter()
            .zip(excluded)
            .filter(|(_, excluded)| !**excluded)
            .map(|(validity, _)| *validity),
    )
}

proptest! {
    /// Group value keys and validity follow every exclusion toggle
    #[test]
    fn group_follows_exclusion_toggles(
        validities in prop::collection::vec(
            arb_validity().prop_filter("sync validators are never pending", |v| !v.is_pending()),
            1..6,
        ),
        toggles in prop::collection::vec((0usize..6, any::<bool>()), 0..24),
    ) {
        let fields: Vec<_> = validities
            .iter()
            .enumerate()
            .map(|(i, validity)| field_with(&format!("f{i}"), *validity))
            .collect();
        let group = FieldGroup::new(FieldGroupConfig::new(
            "group",
            fields.iter().map(FormFieldExt::as_form_field).collect(),
        ))
        .unwrap();

        let mut excluded = vec![false; fields.len()];
        for (index, exclude) in toggles {
            let index = index % fields.len();
            fields[index].set_exclude(exclude);
            excluded[index] = exclude;

            let state = group.state();
            let expected_names: BTreeSet<String> = excluded
                .iter()
                .enumerate()
                .filter(|(_, excluded)| !**excluded)
                .map(|(i, _)| format!("f{i}"))
                .collect();
            prop_assert_eq!(&state.included_member_names, &expected_names);
            prop_assert_eq!(
                state.value.keys().cloned().collect::<BTreeSet<_>>(),
                expected_names
            );
            prop_assert_eq!(state.validity, expected_validity(&validities, &excluded));
        }
    }

    /// Transient fields move form validity but never its value
    #[test]
    fn transient_fields_never_contribute_value(
        validities in prop::collection::vec(
            arb_validity().prop_filter("sync validators are never pending", |v| !v.is_pending()),
            1..5,
        ),
        excluded in prop::collection::vec(any::<bool>(), 5),
    ) {
        let fields: Vec<_> = validities
            .iter()
            .enumerate()
            .map(|(i, validity)| field_with(&format!("t{i}"), *validity))
            .collect();
        let form = Form::new(fields.iter().fold(FormConfig::new("form"), |config, field| {
            config.with_transient_field(field.as_form_field())
        }))
        .unwrap();

        for (field, exclude) in fields.iter().zip(&excluded) {
            field.set_exclude(*exclude);
        }

        let state = form.state();
        prop_assert!(state.value.is_empty());
        prop_assert_eq!(
            state.validity,
            expected_validity(&validities, &excluded[..fields.len()])
        );
    }
}
