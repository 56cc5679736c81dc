use crate::{
    condition::Condition,
    modification::Modification,
    path::FieldPath,
    testing::{arb_modification, arb_value},
    value::{Float64, Value},
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn path(text: &str) -> FieldPath {
    text.parse().unwrap()
}

fn record(entries: Vec<(&str, Value)>) -> Value {
    Value::Map(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect::<BTreeMap<_, _>>(),
    )
}

#[test]
fn assign_replaces_any_focus() {
    let assign = Modification::assign("fresh");
    assert_eq!(assign.apply_value(Value::Int(3)), Value::Text("fresh".into()));
    assert_eq!(assign.apply_value(Value::Null), Value::Text("fresh".into()));
}

#[test]
fn arithmetic_saturates_at_family_bounds() {
    let bump = Modification::increment(1_i64);
    assert_eq!(bump.apply_value(Value::Int(i64::MAX)), Value::Int(i64::MAX));
    assert_eq!(
        Modification::increment(-1_i64).apply_value(Value::Int(i64::MIN)),
        Value::Int(i64::MIN)
    );
    assert_eq!(
        Modification::increment(1_u64).apply_value(Value::Uint(u64::MAX)),
        Value::Uint(u64::MAX)
    );
    assert_eq!(
        Modification::multiply(2_i64).apply_value(Value::Int(i64::MAX)),
        Value::Int(i64::MAX)
    );

    let huge = Float64::try_new(1.0e308).expect("finite");
    assert_eq!(
        Modification::multiply(huge).apply_value(Value::Float(huge)),
        Value::Float(Float64::MAX)
    );
    assert_eq!(
        Modification::increment(Float64::try_new(-1.0e308).expect("finite"))
            .apply_value(Value::Float(Float64::MIN)),
        Value::Float(Float64::MIN)
    );
}

#[test]
fn arithmetic_requires_matching_family() {
    assert_eq!(
        Modification::increment(1_u64).apply_value(Value::Int(5)),
        Value::Int(5)
    );
    assert_eq!(
        Modification::increment(1_i64).apply_value(Value::Uint(5)),
        Value::Uint(5)
    );
    assert_eq!(
        Modification::multiply(2_i64).apply_value(Value::Text("5".into())),
        Value::Text("5".into())
    );
    assert_eq!(
        Modification::increment(1_i64).apply_value(Value::Null),
        Value::Null
    );
}

#[test]
fn coercions_clamp_within_one_family() {
    let cap = Modification::coerce_at_most(100_i64);
    assert_eq!(cap.apply_value(Value::Int(101)), Value::Int(100));
    assert_eq!(cap.apply_value(Value::Int(100)), Value::Int(100));
    assert_eq!(cap.apply_value(Value::Int(99)), Value::Int(99));
    // Unordered pairs are left alone.
    assert_eq!(cap.apply_value(Value::Uint(200)), Value::Uint(200));
    assert_eq!(cap.apply_value(Value::Text("z".into())), Value::Text("z".into()));

    let floor = Modification::coerce_at_least(0_i64);
    assert_eq!(floor.apply_value(Value::Int(-3)), Value::Int(0));
    assert_eq!(floor.apply_value(Value::Int(3)), Value::Int(3));
}

#[test]
fn increment_then_clamp_holds_the_cap() {
    let modification = Modification::Chain(vec![
        Modification::on_field(path("count"), Modification::increment(1_i64)),
        Modification::on_field(path("count"), Modification::coerce_at_most(100_i64)),
    ]);
    let before = record(vec![("count", Value::Int(100))]);
    let after = record(vec![("count", Value::Int(100))]);

    assert_eq!(modification.apply_value(before.clone()), after);
    assert_eq!(modification.simplify().apply_value(before), after);
}

#[test]
fn append_string_is_text_only() {
    let shout = Modification::append_string("!");
    assert_eq!(shout.apply_value(Value::Text("hi".into())), Value::Text("hi!".into()));
    assert_eq!(shout.apply_value(Value::Int(1)), Value::Int(1));
}

#[test]
fn list_edits() {
    let list = |items: Vec<i64>| Value::List(items.into_iter().map(Value::from).collect());

    assert_eq!(
        Modification::list_append(vec![3_i64, 4]).apply_value(list(vec![1, 2])),
        list(vec![1, 2, 3, 4])
    );
    assert_eq!(
        Modification::list_remove_matching(Condition::greater_than(2_i64))
            .apply_value(list(vec![1, 2, 3, 4])),
        list(vec![1, 2])
    );
    assert_eq!(
        Modification::list_remove_all(vec![2_i64]).apply_value(list(vec![1, 2, 3, 2])),
        list(vec![1, 3])
    );
    assert_eq!(
        Modification::ListDropFirst.apply_value(list(vec![1, 2])),
        list(vec![2])
    );
    assert_eq!(Modification::ListDropFirst.apply_value(list(vec![])), list(vec![]));
    assert_eq!(Modification::ListDropLast.apply_value(list(vec![1])), list(vec![]));

    // Per-element steps skip elements they do not fit.
    let mixed = Value::List(vec![Value::Int(1), Value::Text("x".into())]);
    assert_eq!(
        Modification::list_per_element(Modification::increment(10_i64)).apply_value(mixed),
        Value::List(vec![Value::Int(11), Value::Text("x".into())])
    );

    assert_eq!(
        Modification::list_append(vec![1_i64]).apply_value(Value::Int(9)),
        Value::Int(9)
    );
}

#[test]
fn map_edits() {
    let before = record(vec![("a", Value::Int(1)), ("b", Value::Int(2))]);

    assert_eq!(
        Modification::map_put_all(vec![("a", Value::Int(9)), ("c", Value::Int(3))])
            .apply_value(before.clone()),
        record(vec![("a", Value::Int(9)), ("b", Value::Int(2)), ("c", Value::Int(3))])
    );

    // Only existing keys are rewritten.
    assert_eq!(
        Modification::map_modify_by_key(vec![
            ("a".to_string(), Modification::increment(1_i64)),
            ("z".to_string(), Modification::assign(0_i64)),
        ])
        .apply_value(before.clone()),
        record(vec![("a", Value::Int(2)), ("b", Value::Int(2))])
    );

    assert_eq!(
        Modification::map_remove_keys(vec!["b", "zz"]).apply_value(before),
        record(vec![("a", Value::Int(1))])
    );

    assert_eq!(
        Modification::map_remove_keys(vec!["b"]).apply_value(Value::Int(7)),
        Value::Int(7)
    );
}

#[test]
fn projection_walks_and_never_creates() {
    let before = record(vec![
        ("name", Value::Text("ada".into())),
        (
            "profile",
            record(vec![("age", Value::Int(30))]),
        ),
    ]);

    let bumped = Modification::on_field(path("profile.age"), Modification::increment(1_i64))
        .apply_value(before.clone());
    assert_eq!(
        bumped,
        record(vec![
            ("name", Value::Text("ada".into())),
            ("profile", record(vec![("age", Value::Int(31))])),
        ])
    );

    // Missing fields are not created.
    assert_eq!(
        Modification::on_field(path("missing.x"), Modification::assign(1_i64))
            .apply_value(before.clone()),
        before
    );

    // Walking through a scalar goes nowhere.
    assert_eq!(
        Modification::on_field(path("name.x"), Modification::assign(1_i64))
            .apply_value(before.clone()),
        before
    );

    assert_eq!(
        Modification::on_field(path("x"), Modification::assign(1_i64)).apply_value(Value::Int(3)),
        Value::Int(3)
    );
}

#[test]
fn unwrap_skips_null_focus() {
    let shout = Modification::on_field(path("nickname?"), Modification::append_string("!"));

    let unset = record(vec![("nickname", Value::Null)]);
    assert_eq!(shout.apply_value(unset.clone()), unset);

    let set = record(vec![("nickname", Value::Text("ada".into()))]);
    assert_eq!(
        shout.apply_value(set),
        record(vec![("nickname", Value::Text("ada!".into()))])
    );
}

#[test]
fn identity_steps_dissolve() {
    let chain = Modification::Chain(vec![
        Modification::increment(0_i64),
        Modification::multiply(1_u64),
        Modification::append_string(""),
        Modification::list_append(Vec::<Value>::new()),
        Modification::list_remove_all(Vec::<Value>::new()),
        Modification::map_put_all(Vec::<(String, Value)>::new()),
        Modification::map_remove_keys(Vec::<String>::new()),
    ]);
    assert_eq!(chain.simplify(), Modification::identity());
    assert_eq!(Modification::increment(0_i64).simplify(), Modification::identity());
    assert!(Modification::identity().is_identity());
}

#[test]
fn assignment_erases_history_and_folds_the_tail() {
    let chain = Modification::Chain(vec![
        Modification::increment(5_i64),
        Modification::assign(1_i64),
        Modification::increment(2_i64),
    ]);
    assert_eq!(chain.simplify(), Modification::assign(3_i64));

    // Assignments under a projection only pin a subtree, not the focus.
    let scoped = Modification::Chain(vec![
        Modification::on_field(path("a"), Modification::assign(1_i64)),
        Modification::on_field(path("b"), Modification::assign(2_i64)),
    ]);
    assert_eq!(scoped.simplify(), scoped);
}

#[test]
fn projection_simplification() {
    assert_eq!(
        Modification::on_field(path("a"), Modification::identity()).simplify(),
        Modification::identity()
    );
    assert_eq!(
        Modification::on_field(
            path("profile"),
            Modification::on_field(path("age"), Modification::increment(1_i64)),
        )
        .simplify(),
        Modification::on_field(path("profile.age"), Modification::increment(1_i64))
    );
    assert_eq!(
        Modification::on_field(FieldPath::root(), Modification::append_string("!")).simplify(),
        Modification::append_string("!")
    );
}

#[test]
fn adjacent_same_field_steps_merge() {
    let merged = Modification::Chain(vec![
        Modification::on_field(path("count"), Modification::increment(1_i64)),
        Modification::on_field(path("count"), Modification::coerce_at_most(100_i64)),
    ])
    .simplify();
    assert_eq!(
        merged,
        Modification::on_field(
            path("count"),
            Modification::Chain(vec![
                Modification::increment(1_i64),
                Modification::coerce_at_most(100_i64),
            ]),
        )
    );

    // An unwrapping final segment can be nulled by the first step, which
    // blocks the second walk; those stay separate.
    let guarded = Modification::Chain(vec![
        Modification::on_field(path("nickname?"), Modification::assign(Value::Null)),
        Modification::on_field(path("nickname?"), Modification::append_string("!")),
    ]);
    assert_eq!(guarded.simplify(), guarded);
}

#[test]
fn increments_do_not_fold() {
    // Saturating arithmetic does not commute with adding the amounts, so
    // two increments stay two steps.
    let chain = Modification::Chain(vec![
        Modification::increment(1_i64),
        Modification::increment(1_i64),
    ]);
    assert_eq!(chain.simplify(), chain);
}

#[test]
fn container_specific_identities() {
    assert_eq!(
        Modification::list_per_element(Modification::identity()).simplify(),
        Modification::identity()
    );
    assert_eq!(
        Modification::map_modify_by_key(vec![("a".to_string(), Modification::increment(0_i64))])
            .simplify(),
        Modification::identity()
    );
    assert_eq!(
        Modification::list_remove_matching(Condition::inside(Vec::<i64>::new())).simplify(),
        Modification::identity()
    );

    // Removing everything is not the identity.
    let sweep = Modification::list_remove_matching(Condition::Always);
    assert_eq!(sweep.simplify(), sweep);
}

#[test]
fn touched_paths_cover_written_fields() {
    assert!(Modification::identity().touched_paths().is_empty());
    assert_eq!(
        Modification::assign(1_i64).touched_paths(),
        vec![FieldPath::root()]
    );

    let chain = Modification::Chain(vec![
        Modification::on_field(path("profile.age"), Modification::increment(1_i64)),
        Modification::on_field(path("tags"), Modification::ListDropFirst),
        Modification::on_field(path("profile.age"), Modification::multiply(2_i64)),
    ]);
    assert_eq!(chain.touched_paths(), vec![path("profile.age"), path("tags")]);

    let nested = Modification::on_field(
        path("profile"),
        Modification::on_field(path("age"), Modification::increment(1_i64)),
    );
    assert_eq!(nested.touched_paths(), vec![path("profile.age")]);
}

proptest! {
    #[test]
    fn simplification_preserves_application(
        modification in arb_modification(),
        value in arb_value(),
    ) {
        prop_assert_eq!(
            modification.simplify().apply_value(value.clone()),
            modification.apply_value(value)
        );
    }

    #[test]
    fn simplification_is_idempotent(modification in arb_modification()) {
        let simplified = modification.simplify();
        prop_assert_eq!(simplified.simplify(), simplified.clone());
    }

    #[test]
    fn wire_round_trip(modification in arb_modification()) {
        let json = serde_json::to_string(&modification).unwrap();
        let back: Modification = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, modification);
    }

    #[test]
    fn chains_apply_left_to_right_associatively(
        a in arb_modification(),
        b in arb_modification(),
        c in arb_modification(),
        value in arb_value(),
    ) {
        let nest_right = Modification::Chain(vec![
            a.clone(),
            Modification::Chain(vec![b.clone(), c.clone()]),
        ]);
        let nest_left = Modification::Chain(vec![Modification::Chain(vec![a, b]), c]);
        prop_assert_eq!(
            nest_right.apply_value(value.clone()),
            nest_left.apply_value(value)
        );
    }
}
