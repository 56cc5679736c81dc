use crate::{condition::Condition, path::FieldPath, value::strict_order_cmp};
use std::cmp::Ordering;

///
/// Simplification
///
/// Rewrites a condition into a smaller equivalent one. Every rule preserves
/// [`Condition::matches_value`] on all inputs, including unresolved paths and
/// ill-typed comparisons, so simplifying before evaluation or before handing
/// an expression to a backend is always safe.
///

impl Condition {
    /// Simplify to a fixed point.
    #[must_use]
    pub fn simplify(&self) -> Self {
        let mut current = self.clone();
        loop {
            let next = current.simplify_pass();
            if next == current {
                return next;
            }
            current = next;
        }
    }

    /// One bottom-up rewrite pass.
    fn simplify_pass(&self) -> Self {
        match self {
            Self::And(children) => simplify_and(children),
            Self::Or(children) => simplify_or(children),

            Self::Not(inner) => match inner.simplify_pass() {
                Self::Always => Self::Never,
                Self::Never => Self::Always,
                Self::Not(child) => *child,
                // Total leaves flip into their complements. Partial leaves
                // (ordering, string, bitmask) do not: they are false on
                // values outside their domain, so negation is not the
                // complement leaf.
                Self::Equal(value) => Self::NotEqual(value),
                Self::NotEqual(value) => Self::Equal(value),
                Self::Inside(values) => Self::NotInside(values),
                Self::NotInside(values) => Self::Inside(values),
                other => Self::Not(Box::new(other)),
            },

            Self::OnField { path, condition } => match condition.simplify_pass() {
                // An unresolved path and a never-matching focus agree on
                // false, so the collapse is exact.
                Self::Never => Self::Never,
                inner if path.is_root() => inner,
                Self::OnField {
                    path: tail,
                    condition: inner,
                } => Self::OnField {
                    path: path.join(&tail),
                    condition: inner,
                },
                inner => Self::OnField {
                    path: path.clone(),
                    condition: Box::new(inner),
                },
            },

            Self::Inside(values) => match values.as_slice() {
                [] => Self::Never,
                [value] => Self::Equal(value.clone()),
                _ => self.clone(),
            },
            Self::NotInside(values) => match values.as_slice() {
                [] => Self::Always,
                [value] => Self::NotEqual(value.clone()),
                _ => self.clone(),
            },

            Self::AnyElement(inner) => match inner.simplify_pass() {
                Self::Never => Self::Never,
                inner => Self::AnyElement(Box::new(inner)),
            },
            // AllElements(Never) stays: it matches exactly the empty list,
            // which no other single node expresses.
            Self::AllElements(inner) => Self::AllElements(Box::new(inner.simplify_pass())),

            leaf => leaf.clone(),
        }
    }
}

fn simplify_and(children: &[Condition]) -> Condition {
    let mut out: Vec<Condition> = Vec::new();
    for child in children {
        match child.simplify_pass() {
            Condition::Always => {}
            Condition::Never => return Condition::Never,
            Condition::And(grand) => {
                for grandchild in grand {
                    if !push_conjunct(&mut out, grandchild) {
                        return Condition::Never;
                    }
                }
            }
            other => {
                if !push_conjunct(&mut out, other) {
                    return Condition::Never;
                }
            }
        }
    }
    unwrap_group(out, Condition::Always, Condition::And)
}

fn simplify_or(children: &[Condition]) -> Condition {
    let mut out: Vec<Condition> = Vec::new();
    for child in children {
        match child.simplify_pass() {
            Condition::Never => {}
            Condition::Always => return Condition::Always,
            Condition::Or(grand) => {
                for grandchild in grand {
                    if !out.contains(&grandchild) {
                        out.push(grandchild);
                    }
                }
            }
            other => {
                if !out.contains(&other) {
                    out.push(other);
                }
            }
        }
    }
    unwrap_group(out, Condition::Never, Condition::Or)
}

/// Collapse an empty group to its neutral element and a singleton to its
/// only child, preserving child order otherwise.
fn unwrap_group(
    mut out: Vec<Condition>,
    empty: Condition,
    wrap: fn(Vec<Condition>) -> Condition,
) -> Condition {
    match out.len() {
        0 => empty,
        1 => out.remove(0),
        _ => wrap(out),
    }
}

/// Add a conjunct, deduplicating and merging comparison bounds over the same
/// focus. Returns false when the conjunction became unsatisfiable.
fn push_conjunct(out: &mut Vec<Condition>, candidate: Condition) -> bool {
    if out.contains(&candidate) {
        return true;
    }

    if let Some((candidate_path, candidate_leaf)) = comparison_parts(&candidate) {
        for index in 0..out.len() {
            let outcome = match comparison_parts(&out[index]) {
                Some((existing_path, existing_leaf)) if existing_path == candidate_path => {
                    merge_bounds(existing_leaf, candidate_leaf)
                }
                _ => Merge::Keep,
            };
            match outcome {
                Merge::Keep => {}
                Merge::Contradiction => return false,
                Merge::One(leaf) => {
                    let path = candidate_path.cloned();
                    out[index] = wrap_on_path(path, leaf);
                    return true;
                }
            }
        }
    }

    out.push(candidate);
    true
}

/// Split a conjunct into its focus path and comparison leaf, when it is one.
fn comparison_parts(condition: &Condition) -> Option<(Option<&FieldPath>, &Condition)> {
    match condition {
        Condition::OnField { path, condition } if is_comparison(condition) => {
            Some((Some(path), condition))
        }
        leaf if is_comparison(leaf) => Some((None, leaf)),
        _ => None,
    }
}

const fn is_comparison(condition: &Condition) -> bool {
    matches!(
        condition,
        Condition::Equal(_)
            | Condition::NotEqual(_)
            | Condition::GreaterThan(_)
            | Condition::LessThan(_)
            | Condition::GreaterOrEqual(_)
            | Condition::LessOrEqual(_)
    )
}

fn wrap_on_path(path: Option<FieldPath>, leaf: Condition) -> Condition {
    match path {
        Some(path) => Condition::OnField {
            path,
            condition: Box::new(leaf),
        },
        None => leaf,
    }
}

enum Merge {
    /// Both conjuncts collapse into one.
    One(Condition),
    /// The conjunction can never hold.
    Contradiction,
    /// Not mergeable, keep both.
    Keep,
}

/// Merge two comparison leaves over the same focus under conjunction.
///
/// Literals from different order families compare as unordered; those pairs
/// are kept untouched rather than guessed at.
#[allow(clippy::too_many_lines)]
fn merge_bounds(left: &Condition, right: &Condition) -> Merge {
    use Condition::{Equal, GreaterOrEqual, GreaterThan, LessOrEqual, LessThan, NotEqual};

    match (left, right) {
        (Equal(a), Equal(b)) => {
            if a == b {
                Merge::One(Equal(a.clone()))
            } else {
                Merge::Contradiction
            }
        }

        (Equal(a), NotEqual(b)) | (NotEqual(b), Equal(a)) => {
            if a == b {
                Merge::Contradiction
            } else {
                Merge::One(Equal(a.clone()))
            }
        }

        (Equal(a), GreaterThan(b)) | (GreaterThan(b), Equal(a)) => {
            match strict_order_cmp(a, b) {
                Some(Ordering::Greater) => Merge::One(Equal(a.clone())),
                Some(Ordering::Less | Ordering::Equal) => Merge::Contradiction,
                None => Merge::Keep,
            }
        }
        (Equal(a), GreaterOrEqual(b)) | (GreaterOrEqual(b), Equal(a)) => {
            match strict_order_cmp(a, b) {
                Some(Ordering::Greater | Ordering::Equal) => Merge::One(Equal(a.clone())),
                Some(Ordering::Less) => Merge::Contradiction,
                None => Merge::Keep,
            }
        }
        (Equal(a), LessThan(b)) | (LessThan(b), Equal(a)) => match strict_order_cmp(a, b) {
            Some(Ordering::Less) => Merge::One(Equal(a.clone())),
            Some(Ordering::Greater | Ordering::Equal) => Merge::Contradiction,
            None => Merge::Keep,
        },
        (Equal(a), LessOrEqual(b)) | (LessOrEqual(b), Equal(a)) => {
            match strict_order_cmp(a, b) {
                Some(Ordering::Less | Ordering::Equal) => Merge::One(Equal(a.clone())),
                Some(Ordering::Greater) => Merge::Contradiction,
                None => Merge::Keep,
            }
        }

        // Two lower bounds keep the tighter one.
        (GreaterThan(a), GreaterThan(b)) => match strict_order_cmp(a, b) {
            Some(Ordering::Greater | Ordering::Equal) => Merge::One(GreaterThan(a.clone())),
            Some(Ordering::Less) => Merge::One(GreaterThan(b.clone())),
            None => Merge::Keep,
        },
        (GreaterThan(a), GreaterOrEqual(b)) | (GreaterOrEqual(b), GreaterThan(a)) => {
            match strict_order_cmp(a, b) {
                Some(Ordering::Greater | Ordering::Equal) => Merge::One(GreaterThan(a.clone())),
                Some(Ordering::Less) => Merge::One(GreaterOrEqual(b.clone())),
                None => Merge::Keep,
            }
        }
        (GreaterOrEqual(a), GreaterOrEqual(b)) => match strict_order_cmp(a, b) {
            Some(Ordering::Greater | Ordering::Equal) => Merge::One(GreaterOrEqual(a.clone())),
            Some(Ordering::Less) => Merge::One(GreaterOrEqual(b.clone())),
            None => Merge::Keep,
        },

        // Two upper bounds keep the tighter one.
        (LessThan(a), LessThan(b)) => match strict_order_cmp(a, b) {
            Some(Ordering::Less | Ordering::Equal) => Merge::One(LessThan(a.clone())),
            Some(Ordering::Greater) => Merge::One(LessThan(b.clone())),
            None => Merge::Keep,
        },
        (LessThan(a), LessOrEqual(b)) | (LessOrEqual(b), LessThan(a)) => {
            match strict_order_cmp(a, b) {
                Some(Ordering::Less | Ordering::Equal) => Merge::One(LessThan(a.clone())),
                Some(Ordering::Greater) => Merge::One(LessOrEqual(b.clone())),
                None => Merge::Keep,
            }
        }
        (LessOrEqual(a), LessOrEqual(b)) => match strict_order_cmp(a, b) {
            Some(Ordering::Less | Ordering::Equal) => Merge::One(LessOrEqual(a.clone())),
            Some(Ordering::Greater) => Merge::One(LessOrEqual(b.clone())),
            None => Merge::Keep,
        },

        // A lower and an upper bound only interact when they cross.
        (GreaterThan(a), LessThan(b))
        | (LessThan(b), GreaterThan(a))
        | (GreaterThan(a), LessOrEqual(b))
        | (LessOrEqual(b), GreaterThan(a))
        | (GreaterOrEqual(a), LessThan(b))
        | (LessThan(b), GreaterOrEqual(a)) => match strict_order_cmp(a, b) {
            Some(Ordering::Less) | None => Merge::Keep,
            Some(Ordering::Greater | Ordering::Equal) => Merge::Contradiction,
        },
        (GreaterOrEqual(a), LessOrEqual(b)) | (LessOrEqual(b), GreaterOrEqual(a)) => {
            match strict_order_cmp(a, b) {
                Some(Ordering::Less) | None => Merge::Keep,
                Some(Ordering::Equal) => Merge::One(Equal(a.clone())),
                Some(Ordering::Greater) => Merge::Contradiction,
            }
        }

        _ => Merge::Keep,
    }
}
