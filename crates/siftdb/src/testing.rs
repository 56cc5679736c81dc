//! Shared fixtures and generators for the crate's unit tests.

use crate::{
    Model,
    condition::Condition,
    modification::Modification,
    path::FieldPath,
    value::{Bytes, Float64, Value},
};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Profile
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Model)]
pub(crate) struct Profile {
    pub(crate) age: i64,
    pub(crate) bio: String,
}

///
/// User
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Model)]
pub(crate) struct User {
    pub(crate) name: String,
    pub(crate) age: i64,
    pub(crate) active: bool,
    pub(crate) score: Float64,
    pub(crate) flags: u64,
    pub(crate) nickname: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) attrs: BTreeMap<String, i64>,
    pub(crate) profile: Option<Profile>,
}

impl User {
    pub(crate) fn sample() -> Self {
        Self {
            name: "ada".to_string(),
            age: 36,
            active: true,
            score: Float64::try_new(4.5).expect("finite"),
            flags: 0b0110,
            nickname: None,
            tags: vec!["admin".to_string(), "ops".to_string()],
            attrs: BTreeMap::from([("logins".to_string(), 12)]),
            profile: Some(Profile {
                age: 36,
                bio: "mathematician".to_string(),
            }),
        }
    }
}

pub(crate) fn arb_path() -> impl Strategy<Value = FieldPath> {
    proptest::collection::vec(("[a-c]{1,2}", any::<bool>()), 1..3).prop_map(|segments| {
        segments
            .into_iter()
            .fold(FieldPath::root(), |acc, (name, unwrap)| {
                let acc = acc.child(name);
                if unwrap { acc.some() } else { acc }
            })
    })
}

pub(crate) fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-4_i64..=4).prop_map(Value::from),
        (0_u64..=4).prop_map(Value::from),
        (-2.0_f64..=2.0).prop_map(|raw| Value::Float(Float64::saturating(raw))),
        "[a-c]{0,3}".prop_map(Value::from),
        proptest::collection::vec(any::<u8>(), 0..3).prop_map(|raw| Value::from(Bytes::new(raw))),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            proptest::collection::btree_map("[a-c]{1,2}", inner, 0..4).prop_map(Value::Map),
        ]
    })
}

pub(crate) fn arb_condition() -> impl Strategy<Value = Condition> {
    let leaf = prop_oneof![
        Just(Condition::Always),
        Just(Condition::Never),
        prop_oneof![
            arb_value().prop_map(Condition::Equal),
            arb_value().prop_map(Condition::NotEqual),
            arb_value().prop_map(Condition::GreaterThan),
            arb_value().prop_map(Condition::LessThan),
            arb_value().prop_map(Condition::GreaterOrEqual),
            arb_value().prop_map(Condition::LessOrEqual),
        ],
        prop_oneof![
            proptest::collection::vec(arb_value(), 0..3).prop_map(Condition::Inside),
            proptest::collection::vec(arb_value(), 0..3).prop_map(Condition::NotInside),
        ],
        ("[a-c]{0,2}", any::<bool>()).prop_map(|(substring, ignore_case)| {
            Condition::StringContains {
                substring,
                ignore_case,
            }
        }),
        prop_oneof![
            (0_u64..=8).prop_map(Condition::AllClear),
            (0_u64..=8).prop_map(Condition::AllSet),
            (0_u64..=8).prop_map(Condition::AnyClear),
            (0_u64..=8).prop_map(Condition::AnySet),
        ],
        prop_oneof![
            (0_u64..=4).prop_map(Condition::SizesEquals),
            "[a-c]{1,2}".prop_map(Condition::ContainsKey),
        ],
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Condition::And),
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Condition::Or),
            inner.clone().prop_map(Condition::not),
            inner.clone().prop_map(Condition::all_elements),
            inner.clone().prop_map(Condition::any_element),
            (arb_path(), inner).prop_map(|(path, condition)| Condition::on_field(path, condition)),
        ]
    })
}

fn arb_element_condition() -> impl Strategy<Value = Condition> {
    prop_oneof![
        Just(Condition::Always),
        Just(Condition::Never),
        arb_value().prop_map(Condition::Equal),
        arb_value().prop_map(Condition::GreaterThan),
        arb_value().prop_map(Condition::LessThan),
    ]
}

pub(crate) fn arb_modification() -> impl Strategy<Value = Modification> {
    let leaf = prop_oneof![
        arb_value().prop_map(Modification::Assign),
        prop_oneof![
            arb_value().prop_map(Modification::Increment),
            arb_value().prop_map(Modification::Multiply),
            arb_value().prop_map(Modification::CoerceAtMost),
            arb_value().prop_map(Modification::CoerceAtLeast),
        ],
        "[a-c]{0,2}".prop_map(Modification::AppendString),
        prop_oneof![
            proptest::collection::vec(arb_value(), 0..3).prop_map(Modification::ListAppend),
            proptest::collection::vec(arb_value(), 0..3).prop_map(Modification::ListRemoveAll),
            Just(Modification::ListDropFirst),
            Just(Modification::ListDropLast),
        ],
        arb_element_condition().prop_map(Modification::ListRemoveMatching),
        prop_oneof![
            proptest::collection::btree_map("[a-c]{1,2}", arb_value(), 0..3)
                .prop_map(Modification::MapPutAll),
            proptest::collection::vec("[a-c]{1,2}", 0..3).prop_map(Modification::MapRemoveKeys),
        ],
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..3).prop_map(Modification::Chain),
            inner.clone().prop_map(Modification::list_per_element),
            proptest::collection::btree_map("[a-c]{1,2}", inner.clone(), 0..3)
                .prop_map(Modification::MapModifyByKey),
            (arb_path(), inner)
                .prop_map(|(path, modification)| Modification::on_field(path, modification)),
        ]
    })
}
