//! Property test strategies for Formwork types

use proptest::prelude::*;
use serde_json::{json, Value};

// Re-export proptest for convenience
pub use proptest;

use formwork_core::{MemberState, Validity};

pub fn arb_validity() -> impl Strategy<Value = Validity> {
    prop_oneof![
        Just(Validity::Invalid),
        Just(Validity::Pending),
        Just(Validity::Valid),
    ]
}

/// Small JSON scalars, enough to tell member values apart.
pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

pub fn arb_member_state() -> impl Strategy<Value = MemberState> {
    (arb_value(), arb_validity(), any::<bool>())
        .prop_map(|(value, validity, exclude)| MemberState::new(value, validity, exclude))
}
