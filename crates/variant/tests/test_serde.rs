//! Serialization through serde_json and bincode
#![cfg(feature = "serde")]

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::{Deserialize, Serialize};
use tagged_variant::Variant;

type Token = Variant<(i64, f64, String)>;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Instruction {
    name: String,
    operands: Vec<Token>,
}

fn sample() -> Instruction {
    Instruction {
        name: "push".to_string(),
        operands: vec![Token::new(1i64), Token::new(2.5f64), Token::new("label")],
    }
}

#[test]
fn test_json_encodes_index_and_value() {
    let json = serde_json::to_string(&sample()).unwrap();
    assert_eq!(
        json,
        r#"{"name":"push","operands":[[0,1],[1,2.5],[2,"label"]]}"#
    );
}

#[test]
fn test_json_round_trip_in_struct() {
    let json = serde_json::to_string(&sample()).unwrap();
    let back: Instruction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sample());
}

#[test]
fn test_bincode_layout_is_index_then_value() {
    let v = Variant::<(u16, u64)>::new(7u64);
    let bytes = bincode::serialize(&v).unwrap();
    assert_eq!(bytes, [1, 0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_bincode_round_trip() {
    let bytes = bincode::serialize(&sample()).unwrap();
    let back: Instruction = bincode::deserialize(&bytes).unwrap();
    assert_eq!(back, sample());
}

#[test]
fn test_valueless_does_not_serialize() {
    let mut v = Token::new(0i64);
    let _ = catch_unwind(AssertUnwindSafe(|| {
        v.emplace_with::<2, _>(|| panic!("constructor failed"));
    }));
    assert!(v.is_valueless());

    let err = serde_json::to_string(&v).unwrap_err();
    assert!(err.to_string().contains("valueless"), "{err}");
    assert!(bincode::serialize(&v).is_err());
}

#[test]
fn test_bad_index_rejected() {
    let result = serde_json::from_str::<Token>(r#"[3, 1]"#);
    assert!(result.is_err());

    let mut bytes = bincode::serialize(&Token::new(5i64)).unwrap();
    bytes[0] = 9;
    assert!(bincode::deserialize::<Token>(&bytes).is_err());
}

#[test]
fn test_wrong_value_type_rejected() {
    assert!(serde_json::from_str::<Token>(r#"[0, "not an int"]"#).is_err());
}
