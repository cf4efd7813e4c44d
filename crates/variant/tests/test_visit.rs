//! Visitation across one, two and three variants
//!
//! Every combination of live alternatives must reach the visitor with
//! exactly the matching concrete types.

use std::any::type_name;

use tagged_variant::{Variant, Visitor, visit, visit_mut};

type Left = (u8, i64, String);
type Right = (bool, f64);

/// Reports the concrete types it was called with.
struct TypeNames;

impl<A> Visitor<&A> for TypeNames {
    type Output = Vec<&'static str>;
    fn visit(self, _: &A) -> Self::Output {
        vec![type_name::<A>()]
    }
}

impl<A, B> Visitor<(&A, &B)> for TypeNames {
    type Output = Vec<&'static str>;
    fn visit(self, _: (&A, &B)) -> Self::Output {
        vec![type_name::<A>(), type_name::<B>()]
    }
}

impl<A, B, C> Visitor<(&A, &B, &C)> for TypeNames {
    type Output = Vec<&'static str>;
    fn visit(self, _: (&A, &B, &C)) -> Self::Output {
        vec![type_name::<A>(), type_name::<B>(), type_name::<C>()]
    }
}

fn lefts() -> Vec<(Variant<Left>, &'static str)> {
    vec![
        (Variant::with_type::<u8, _>(1), type_name::<u8>()),
        (Variant::new(2i64), type_name::<i64>()),
        (Variant::new("three"), type_name::<String>()),
    ]
}

fn rights() -> Vec<(Variant<Right>, &'static str)> {
    vec![
        (Variant::with_type::<bool, _>(true), type_name::<bool>()),
        (Variant::with_type::<f64, _>(0.5), type_name::<f64>()),
    ]
}

#[test]
fn test_unary_visit_every_alternative() {
    for (v, expected) in lefts() {
        assert_eq!(visit(TypeNames, &v), Ok(vec![expected]));
        assert_eq!(v.visit(TypeNames), Ok(vec![expected]));
    }
}

#[test]
fn test_binary_visit_covers_all_combinations() {
    let mut calls = 0;
    for (a, a_name) in lefts() {
        for (b, b_name) in rights() {
            assert_eq!(visit(TypeNames, (&a, &b)), Ok(vec![a_name, b_name]));
            assert_eq!(visit(TypeNames, (&b, &a)), Ok(vec![b_name, a_name]));
            calls += 1;
        }
    }
    assert_eq!(calls, 3 * 2);
}

#[test]
fn test_ternary_visit_covers_all_combinations() {
    let mut calls = 0;
    for (a, a_name) in lefts() {
        for (b, b_name) in rights() {
            for (c, c_name) in lefts() {
                assert_eq!(
                    visit(TypeNames, (&a, &b, &c)),
                    Ok(vec![a_name, b_name, c_name])
                );
                calls += 1;
            }
        }
    }
    assert_eq!(calls, 3 * 2 * 3);
}

/// Adds two numbers of either numeric alternative.
struct Add;

impl Visitor<(&i64, &i64)> for Add {
    type Output = Variant<(i64, f64)>;
    fn visit(self, (a, b): (&i64, &i64)) -> Self::Output {
        Variant::new(a + b)
    }
}

impl Visitor<(&i64, &f64)> for Add {
    type Output = Variant<(i64, f64)>;
    fn visit(self, (a, b): (&i64, &f64)) -> Self::Output {
        Variant::new(*a as f64 + b)
    }
}

impl Visitor<(&f64, &i64)> for Add {
    type Output = Variant<(i64, f64)>;
    fn visit(self, (a, b): (&f64, &i64)) -> Self::Output {
        Variant::new(a + *b as f64)
    }
}

impl Visitor<(&f64, &f64)> for Add {
    type Output = Variant<(i64, f64)>;
    fn visit(self, (a, b): (&f64, &f64)) -> Self::Output {
        Variant::new(a + b)
    }
}

#[test]
fn test_binary_visit_uses_values() {
    let two = Variant::<(i64, f64)>::new(2i64);
    let half = Variant::<(i64, f64)>::new(0.5f64);

    assert_eq!(visit(Add, (&two, &two)), Ok(Variant::new(4i64)));
    assert_eq!(visit(Add, (&two, &half)), Ok(Variant::new(2.5f64)));
    assert_eq!(visit(Add, (&half, &two)), Ok(Variant::new(2.5f64)));
    assert_eq!(visit(Add, (&half, &half)), Ok(Variant::new(1.0f64)));
}

/// Clears whichever collection is live and reports its old length.
struct Drain;

impl Visitor<&mut String> for Drain {
    type Output = usize;
    fn visit(self, value: &mut String) -> usize {
        let len = value.len();
        value.clear();
        len
    }
}

impl Visitor<&mut Vec<u8>> for Drain {
    type Output = usize;
    fn visit(self, value: &mut Vec<u8>) -> usize {
        let len = value.len();
        value.clear();
        len
    }
}

#[test]
fn test_visit_mut_modifies_live_value() {
    let mut v = Variant::<(String, Vec<u8>)>::with_type::<String, _>("four".to_string());
    assert_eq!(visit_mut(Drain, &mut v), Ok(4));
    assert_eq!(v.get::<0>().map(String::as_str), Ok(""));

    let mut w = Variant::<(String, Vec<u8>)>::new(vec![1u8, 2]);
    assert_eq!(w.visit_mut(Drain), Ok(2));
    assert_eq!(w.get::<1>().map(Vec::len), Ok(0));
}

#[test]
fn test_visitor_state_moves_into_call() {
    let prefix = String::from("value: ");
    let v = Variant::<(i64,)>::new(9i64);
    let out = v.visit(move |x: &i64| format!("{prefix}{x}"));
    assert_eq!(out.as_deref(), Ok("value: 9"));
}
