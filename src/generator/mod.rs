//! # Combinatorial Case Generator
//!
//! Every parameter carries a valid/invalid partition of example values. The
//! generator walks all 2^N class selections in ascending mask order and, for
//! each one, emits the cross-product of the selected example collections in
//! odometer order (last parameter varies fastest). Bit `p` of a mask selects
//! the class of parameter `p`, so mask 1 switches only parameter 0 to its
//! invalid class.
//!
//! A case is expected to pass only when every parameter came from its valid
//! class, i.e. only under mask 0.

mod mask;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mask::{ClassMask, EquivalenceClass};

/// Upper bound on parameters per generation call. 2^20 masks is already far
/// more requests than any live run should issue.
pub const MAX_PARAMETERS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("invalid input: at least one parameter spec is required")]
    NoParameters,

    #[error("invalid input: expected {declared} parameter specs, got {supplied}")]
    CountMismatch { declared: usize, supplied: usize },

    #[error("invalid input: parameter {position} has an empty {class} class")]
    EmptyClass {
        position: usize,
        class: EquivalenceClass,
    },

    #[error("invalid input: {count} parameters exceed the limit of {max}")]
    TooManyParameters { count: usize, max: usize },
}

/// Valid and invalid representatives for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec<T> {
    pub valid: Vec<T>,
    pub invalid: Vec<T>,
}

impl<T> ParameterSpec<T> {
    pub fn new(valid: Vec<T>, invalid: Vec<T>) -> Self {
        Self { valid, invalid }
    }

    pub fn class(&self, class: EquivalenceClass) -> &[T] {
        match class {
            EquivalenceClass::Valid => &self.valid,
            EquivalenceClass::Invalid => &self.invalid,
        }
    }
}

/// One fully instantiated combination of parameter values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcreteCase<T> {
    pub values: Vec<T>,
    pub expected: bool,
    pub mask: ClassMask,
}

/// Generate every case for `specs`. See the module docs for ordering.
pub fn generate<T: Clone>(specs: &[ParameterSpec<T>]) -> Result<Vec<ConcreteCase<T>>, InvalidInput> {
    validate(specs)?;

    let mut cases = Vec::new();
    for mask in masks(specs.len()) {
        let selected = select(specs, mask);
        let expected = mask.is_all_valid();
        cross_product(&selected, |values| {
            cases.push(ConcreteCase {
                values,
                expected,
                mask,
            });
        });
    }

    Ok(cases)
}

/// Like [`generate`], but also rejects a spec list whose length differs from
/// the caller's declared parameter count.
pub fn generate_declared<T: Clone>(
    declared: usize,
    specs: &[ParameterSpec<T>],
) -> Result<Vec<ConcreteCase<T>>, InvalidInput> {
    if specs.len() != declared {
        return Err(InvalidInput::CountMismatch {
            declared,
            supplied: specs.len(),
        });
    }
    generate(specs)
}

/// Number of cases [`generate`] would return, without building them.
pub fn case_count<T>(specs: &[ParameterSpec<T>]) -> Result<usize, InvalidInput> {
    validate(specs)?;

    Ok(masks(specs.len())
        .map(|mask| {
            select(specs, mask)
                .iter()
                .fold(1usize, |acc, collection| acc.saturating_mul(collection.len()))
        })
        .fold(0usize, usize::saturating_add))
}

fn validate<T>(specs: &[ParameterSpec<T>]) -> Result<(), InvalidInput> {
    if specs.is_empty() {
        return Err(InvalidInput::NoParameters);
    }
    if specs.len() > MAX_PARAMETERS {
        return Err(InvalidInput::TooManyParameters {
            count: specs.len(),
            max: MAX_PARAMETERS,
        });
    }

    for (position, spec) in specs.iter().enumerate() {
        for class in [EquivalenceClass::Valid, EquivalenceClass::Invalid] {
            if spec.class(class).is_empty() {
                return Err(InvalidInput::EmptyClass { position, class });
            }
        }
    }

    Ok(())
}

fn masks(width: usize) -> impl Iterator<Item = ClassMask> {
    (0..1u64 << width).map(move |bits| ClassMask::new(bits, width))
}

fn select<T>(specs: &[ParameterSpec<T>], mask: ClassMask) -> Vec<&[T]> {
    specs
        .iter()
        .enumerate()
        .map(|(position, spec)| spec.class(mask.class_of(position)))
        .collect()
}

fn cross_product<T: Clone>(collections: &[&[T]], mut emit: impl FnMut(Vec<T>)) {
    let mut indexes = vec![0usize; collections.len()];

    loop {
        emit(
            indexes
                .iter()
                .zip(collections)
                .map(|(&index, collection)| collection[index].clone())
                .collect(),
        );

        if !advance(&mut indexes, collections) {
            break;
        }
    }
}

/// Odometer step. Returns false once every position has wrapped.
fn advance<T>(indexes: &mut [usize], collections: &[&[T]]) -> bool {
    for position in (0..indexes.len()).rev() {
        indexes[position] += 1;
        if indexes[position] < collections[position].len() {
            return true;
        }
        indexes[position] = 0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn spec(valid: &[&'static str], invalid: &[&'static str]) -> ParameterSpec<&'static str> {
        ParameterSpec::new(valid.to_vec(), invalid.to_vec())
    }

    fn flatten(cases: &[ConcreteCase<&'static str>]) -> Vec<(Vec<&'static str>, bool)> {
        cases
            .iter()
            .map(|case| (case.values.clone(), case.expected))
            .collect()
    }

    #[test]
    fn single_parameter_yields_one_case_per_class() {
        let cases = generate(&[spec(&["a"], &["b"])]).unwrap();
        assert_eq!(flatten(&cases), vec![(vec!["a"], true), (vec!["b"], false)]);
    }

    #[test]
    fn two_parameters_follow_mask_then_odometer_order() {
        let specs = [spec(&["U1"], &["U1x", "U1y"]), spec(&["P1"], &["P1x"])];
        let cases = generate(&specs).unwrap();

        assert_eq!(
            flatten(&cases),
            vec![
                (vec!["U1", "P1"], true),
                (vec!["U1x", "P1"], false),
                (vec!["U1y", "P1"], false),
                (vec!["U1", "P1x"], false),
                (vec!["U1x", "P1x"], false),
                (vec!["U1y", "P1x"], false),
            ]
        );
        let labels: Vec<String> = cases.iter().map(|case| case.mask.to_string()).collect();
        assert_eq!(labels, ["00", "10", "10", "01", "11", "11"]);
        assert_eq!(case_count(&specs).unwrap(), 6);
    }

    #[test]
    fn mask_one_switches_only_the_first_parameter() {
        let specs = [spec(&["U1"], &["U1x", "U1y"]), spec(&["P1"], &["P1x"])];
        let under_one: Vec<Vec<&str>> = generate(&specs)
            .unwrap()
            .into_iter()
            .filter(|case| case.mask.bits() == 1)
            .map(|case| case.values)
            .collect();
        assert_eq!(under_one, vec![vec!["U1x", "P1"], vec!["U1y", "P1"]]);
    }

    #[test]
    fn last_parameter_varies_fastest_within_a_mask() {
        let specs = [spec(&["a1", "a2"], &["x"]), spec(&["b1", "b2", "b3"], &["y"])];
        let cases = generate(&specs).unwrap();
        let all_valid: Vec<Vec<&str>> = cases
            .iter()
            .filter(|case| case.expected)
            .map(|case| case.values.clone())
            .collect();

        assert_eq!(
            all_valid,
            vec![
                vec!["a1", "b1"],
                vec!["a1", "b2"],
                vec!["a1", "b3"],
                vec!["a2", "b1"],
                vec!["a2", "b2"],
                vec!["a2", "b3"],
            ]
        );
    }

    #[test]
    fn uneven_class_sizes_are_not_truncated() {
        let cases = generate(&[spec(&["v"], &["i1", "i2", "i3"])]).unwrap();
        assert_eq!(cases.len(), 4);
        assert_eq!(cases.iter().filter(|case| !case.expected).count(), 3);
    }

    #[test]
    fn rejects_empty_spec_list() {
        let specs: [ParameterSpec<&str>; 0] = [];
        assert_eq!(generate(&specs), Err(InvalidInput::NoParameters));
        assert_eq!(case_count(&specs), Err(InvalidInput::NoParameters));
    }

    #[test]
    fn rejects_empty_valid_class() {
        let err = generate(&[spec(&["a"], &["b"]), spec(&[], &["c"])]).unwrap_err();
        assert_eq!(
            err,
            InvalidInput::EmptyClass {
                position: 1,
                class: EquivalenceClass::Valid
            }
        );
    }

    #[test]
    fn rejects_empty_invalid_class() {
        let err = generate(&[spec(&["a"], &[])]).unwrap_err();
        assert_eq!(
            err,
            InvalidInput::EmptyClass {
                position: 0,
                class: EquivalenceClass::Invalid
            }
        );
        assert_eq!(err.to_string(), "invalid input: parameter 0 has an empty invalid class");
    }

    #[test]
    fn rejects_declared_count_mismatch() {
        let err = generate_declared(3, &[spec(&["a"], &["b"])]).unwrap_err();
        assert_eq!(
            err,
            InvalidInput::CountMismatch {
                declared: 3,
                supplied: 1
            }
        );
        assert_eq!(generate_declared(1, &[spec(&["a"], &["b"])]).unwrap().len(), 2);
    }

    #[test]
    fn rejects_too_many_parameters() {
        let specs = vec![spec(&["a"], &["b"]); MAX_PARAMETERS + 1];
        assert!(matches!(
            generate(&specs),
            Err(InvalidInput::TooManyParameters { .. })
        ));
    }

    fn specs_strategy() -> impl Strategy<Value = Vec<ParameterSpec<u8>>> {
        prop::collection::vec(
            (
                prop::collection::vec(any::<u8>(), 1..4),
                prop::collection::vec(any::<u8>(), 1..4),
            )
                .prop_map(|(valid, invalid)| ParameterSpec::new(valid, invalid)),
            1..5,
        )
    }

    fn expected_count(specs: &[ParameterSpec<u8>]) -> usize {
        (0..1u64 << specs.len())
            .map(|bits| {
                specs
                    .iter()
                    .enumerate()
                    .map(|(p, spec)| {
                        if (bits >> p) & 1 == 0 {
                            spec.valid.len()
                        } else {
                            spec.invalid.len()
                        }
                    })
                    .product::<usize>()
            })
            .sum()
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

        #[test]
        fn count_matches_sum_of_products(specs in specs_strategy()) {
            let cases = generate(&specs).unwrap();
            prop_assert_eq!(cases.len(), expected_count(&specs));
            prop_assert_eq!(case_count(&specs).unwrap(), cases.len());
        }

        #[test]
        fn expected_only_under_zero_mask(specs in specs_strategy()) {
            for case in generate(&specs).unwrap() {
                prop_assert_eq!(case.expected, case.mask.bits() == 0);
                for (position, value) in case.values.iter().enumerate() {
                    let class = case.mask.class_of(position);
                    prop_assert!(specs[position].class(class).contains(value));
                }
            }
        }

        #[test]
        fn masks_never_go_backwards(specs in specs_strategy()) {
            let cases = generate(&specs).unwrap();
            prop_assert!(cases.windows(2).all(|pair| pair[0].mask.bits() <= pair[1].mask.bits()));
            prop_assert_eq!(cases.first().map(|case| case.mask.bits()), Some(0));
            prop_assert_eq!(
                cases.last().map(|case| case.mask.bits()),
                Some((1u64 << specs.len()) - 1)
            );
        }

        #[test]
        fn generation_is_repeatable(specs in specs_strategy()) {
            prop_assert_eq!(generate(&specs).unwrap(), generate(&specs).unwrap());
        }
    }
}
