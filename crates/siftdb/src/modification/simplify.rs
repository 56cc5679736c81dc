use crate::{condition::Condition, modification::Modification};
use std::collections::BTreeMap;

///
/// Simplification
///
/// Rewrites a modification into a smaller equivalent one. Every rule
/// preserves [`Modification::apply_value`] on all inputs, so a simplified
/// modification can stand in for the original anywhere, including in
/// persisted payloads. The canonical no-op is the empty chain.
///

impl Modification {
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
            Self::Chain(steps) => simplify_chain(steps),

            Self::OnField { path, modification } => match modification.simplify_pass() {
                inner if inner.is_identity() => Self::identity(),
                inner if path.is_root() => inner,
                Self::OnField {
                    path: tail,
                    modification: inner,
                } => Self::OnField {
                    path: path.join(&tail),
                    modification: inner,
                },
                inner => Self::OnField {
                    path: path.clone(),
                    modification: Box::new(inner),
                },
            },

            Self::ListPerElement(each) => match each.simplify_pass() {
                inner if inner.is_identity() => Self::identity(),
                inner => Self::ListPerElement(Box::new(inner)),
            },

            Self::ListRemoveMatching(condition) => match condition.simplify() {
                Condition::Never => Self::identity(),
                condition => Self::ListRemoveMatching(condition),
            },

            Self::MapModifyByKey(entries) => {
                let entries: BTreeMap<String, Self> = entries
                    .iter()
                    .map(|(key, step)| (key.clone(), step.simplify_pass()))
                    .filter(|(_, step)| !step.is_identity())
                    .collect();
                if entries.is_empty() {
                    Self::identity()
                } else {
                    Self::MapModifyByKey(entries)
                }
            }

            leaf if is_leaf_noop(leaf) => Self::identity(),
            leaf => leaf.clone(),
        }
    }
}

/// Leaf steps that leave every possible focus unchanged.
fn is_leaf_noop(step: &Modification) -> bool {
    match step {
        Modification::Increment(amount) => amount.is_zero(),
        Modification::Multiply(factor) => factor.is_one(),
        Modification::AppendString(suffix) => suffix.is_empty(),
        Modification::ListAppend(items) | Modification::ListRemoveAll(items) => items.is_empty(),
        Modification::MapPutAll(entries) => entries.is_empty(),
        Modification::MapRemoveKeys(keys) => keys.is_empty(),
        _ => false,
    }
}

fn simplify_chain(steps: &[Modification]) -> Modification {
    let mut flat: Vec<Modification> = Vec::new();
    for step in steps {
        match step.simplify_pass() {
            Modification::Chain(inner) => flat.extend(inner),
            step => flat.push(step),
        }
    }

    // A bare assignment pins the focus exactly: earlier steps are dead and
    // later ones fold into the literal.
    if let Some(index) = flat
        .iter()
        .rposition(|step| matches!(step, Modification::Assign(_)))
        && (index > 0 || flat.len() > index + 1)
        && let Modification::Assign(literal) = &flat[index]
    {
        let folded = flat[index + 1..]
            .iter()
            .fold(literal.clone(), |current, step| step.apply_value(current));
        return Modification::Assign(folded);
    }

    let mut out: Vec<Modification> = Vec::new();
    for step in flat {
        match step {
            Modification::OnField { path, modification } => {
                let leftover = match out.last_mut() {
                    // Two walks down the same path apply both steps to the
                    // same focus, unless the final segment unwraps: the
                    // first step may null the focus and block the second
                    // walk, so unwrapping paths stay separate.
                    Some(Modification::OnField {
                        path: last_path,
                        modification: last_inner,
                    }) if *last_path == path
                        && path.segments().last().is_none_or(|segment| !segment.unwrap) =>
                    {
                        let previous =
                            std::mem::replace(last_inner.as_mut(), Modification::identity());
                        **last_inner = previous.then(*modification);
                        None
                    }
                    _ => Some((path, modification)),
                };
                if let Some((path, modification)) = leftover {
                    out.push(Modification::OnField { path, modification });
                }
            }
            other => out.push(other),
        }
    }

    match out.len() {
        1 => out.remove(0),
        _ => Modification::Chain(out),
    }
}
