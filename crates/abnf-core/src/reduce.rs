//! The reducer framework: a post-parse walk that turns rule-result
//! subtrees into caller-typed domain values.
//!
//! [`reduce_into`] walks an [`Atom`] tree bottom-up. At a rule-result node
//! with a registered callback, the callback receives a [`ReduceContext`]
//! exposing the rule-result's inner payload and decides for itself how (and
//! whether) to recurse further — the walk does not force uniform recursion
//! on a callback's behalf, since different rules shape their children
//! differently. Terminals and rule-results without a callback pass through
//! unchanged as [`ReducedValue::Atom`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::atom::{Atom, AtomKind};

/// The result of reducing one atom: either an unreduced atom (a terminal, or
/// a rule-result whose rule has no callback), a type-erased domain value a
/// callback produced, or a sequence of either.
pub enum ReducedValue {
    Atom(Atom),
    Scalar(Box<dyn Any>),
    Seq(Vec<ReducedValue>),
}

impl ReducedValue {
    pub fn scalar<T: 'static>(value: T) -> ReducedValue {
        ReducedValue::Scalar(Box::new(value))
    }

    /// Downcasts a `Scalar` to `T`. Panics (a reducer-shape bug, per the
    /// error model) if this is not a `Scalar<T>`.
    pub fn into_scalar<T: 'static>(self) -> T {
        match self {
            ReducedValue::Scalar(value) => match value.downcast::<T>() {
                Ok(value) => *value,
                Err(_) => panic!("reduce error: scalar was not of the expected type"),
            },
            other => panic!("reduce error: expected a scalar value but found {other:?}"),
        }
    }

    pub fn as_seq(&self) -> Option<&[ReducedValue]> {
        match self {
            ReducedValue::Seq(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Debug for ReducedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReducedValue::Atom(atom) => f.debug_tuple("Atom").field(atom).finish(),
            ReducedValue::Scalar(_) => write!(f, "Scalar(..)"),
            ReducedValue::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
        }
    }
}

type ReducerFn = dyn Fn(&ReduceContext) -> ReducedValue;

/// A table from rule name (lowercase) to the callback that turns its
/// rule-result subtrees into domain values.
#[derive(Clone, Default)]
pub struct ReducerMap {
    callbacks: HashMap<String, Rc<ReducerFn>>,
}

impl ReducerMap {
    pub fn new() -> ReducerMap {
        ReducerMap::default()
    }

    pub fn register(&mut self, rule_name: &str, callback: impl Fn(&ReduceContext) -> ReducedValue + 'static) {
        self.callbacks.insert(rule_name.to_lowercase(), Rc::new(callback));
    }

    fn get(&self, rule_name: &str) -> Option<&Rc<ReducerFn>> {
        self.callbacks.get(&rule_name.to_lowercase())
    }
}

/// A read-only positional view over a list atom's children, for reducers
/// that need `nth`-style access rather than a full iteration.
pub struct PositionalList<'a>(&'a [Atom]);

impl<'a> PositionalList<'a> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Atom> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&'a Atom> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&'a Atom> {
        self.0.last()
    }
}

/// Exposed to a reducer callback invoked for a rule-result node: `inner` is
/// that node's payload (not the rule-result atom itself).
pub struct ReduceContext<'a> {
    inner: &'a Atom,
    reducers: &'a ReducerMap,
}

impl<'a> ReduceContext<'a> {
    pub fn inner(&self) -> &'a Atom {
        self.inner
    }

    /// Views `inner` as a list of atoms. Panics if `inner` is not a list —
    /// a shape a reducer callback did not expect is a programmer bug.
    pub fn list(&self) -> &'a [Atom] {
        self.inner
            .as_list()
            .unwrap_or_else(|| panic!("reduce error: expected a list atom but found {:?}", self.inner.kind()))
    }

    pub fn list_as_list(&self) -> PositionalList<'a> {
        PositionalList(self.list())
    }

    /// Flattens `inner` and concatenates every terminal code point found,
    /// in order, into one string.
    pub fn list_as_string(&self) -> String {
        let mut out = String::new();
        collect_code_points(self.inner, &mut out);
        out
    }

    /// Recursively reduces `atom` (typically one of `self`'s children) using
    /// the same reducer map.
    pub fn reduce(&self, atom: &Atom) -> ReducedValue {
        reduce_into(atom, self.reducers)
    }

    pub fn flatten(&self, value: ReducedValue) -> ReducedValue {
        flatten(value)
    }

    pub fn is_nil(&self, value: &ReducedValue) -> bool {
        is_nil(value)
    }

    /// Calls `f` once per element if `value` is a sequence, once on `value`
    /// otherwise; nil elements (and a nil `value` itself) are skipped.
    pub fn iterate(&self, value: ReducedValue, mut f: impl FnMut(ReducedValue)) {
        match value {
            ReducedValue::Seq(items) => {
                for item in items {
                    if !is_nil(&item) {
                        f(item);
                    }
                }
            }
            other => {
                if !is_nil(&other) {
                    f(other);
                }
            }
        }
    }

    /// The first direct rule-result child of `inner` named `name`
    /// (case-insensitive); does not search nested lists or options.
    pub fn find_within(&self, name: &str) -> Option<Atom> {
        find_within(self.inner, name)
    }

    pub fn reduce_as_int(&self, atoms: &[Atom]) -> i64 {
        reduce_as_int(atoms)
    }

    pub fn reduce_as_hex(&self, atoms: &[Atom]) -> u8 {
        reduce_as_hex(atoms)
    }
}

fn collect_code_points(atom: &Atom, out: &mut String) {
    match atom.kind() {
        AtomKind::Terminal { code_point, .. } => out.push(*code_point),
        AtomKind::List(children) => {
            for child in children {
                collect_code_points(child, out);
            }
        }
        AtomKind::Option { inner: Some(inner), .. } => collect_code_points(inner, out),
        AtomKind::Option { inner: None, .. } => {}
        AtomKind::RuleResult { inner, .. } => collect_code_points(inner, out),
    }
}

fn find_within(atom: &Atom, name: &str) -> Option<Atom> {
    match atom.kind() {
        AtomKind::RuleResult { name: found, .. } if found.eq_ignore_ascii_case(name) => Some(atom.clone()),
        AtomKind::List(children) => children.iter().find_map(|child| match child.kind() {
            AtomKind::RuleResult { name: found, .. } if found.eq_ignore_ascii_case(name) => Some(child.clone()),
            _ => None,
        }),
        _ => None,
    }
}

fn atoms_as_string(atoms: &[Atom]) -> String {
    atoms
        .iter()
        .map(|atom| {
            atom.code_point()
                .unwrap_or_else(|| panic!("reduce error: expected a terminal atom but found {:?}", atom.kind()))
        })
        .collect()
}

pub fn reduce_as_int(atoms: &[Atom]) -> i64 {
    let text = atoms_as_string(atoms);
    text.parse()
        .unwrap_or_else(|_| panic!("reduce error: could not parse {text:?} as a base-10 integer"))
}

/// Parses the concatenated atoms as a base-16 byte value.
pub fn reduce_as_hex(atoms: &[Atom]) -> u8 {
    let text = atoms_as_string(atoms);
    u8::from_str_radix(&text, 16)
        .unwrap_or_else(|_| panic!("reduce error: could not parse {text:?} as a base-16 byte value"))
}

pub fn is_nil(value: &ReducedValue) -> bool {
    match value {
        ReducedValue::Atom(atom) => atom.is_nil(),
        ReducedValue::Seq(items) => items.is_empty(),
        ReducedValue::Scalar(_) => false,
    }
}

/// Recursively flattens nested sequences into one flat sequence, preserving
/// order. A list atom not yet reduced by any callback is descended into as
/// well, since a reducer may call `flatten` before reducing further.
pub fn flatten(value: ReducedValue) -> ReducedValue {
    let mut out = Vec::new();
    flatten_into(value, &mut out);
    ReducedValue::Seq(out)
}

fn flatten_into(value: ReducedValue, out: &mut Vec<ReducedValue>) {
    match value {
        ReducedValue::Seq(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        ReducedValue::Atom(atom) => {
            if let Some(children) = atom.as_list() {
                for child in children {
                    flatten_into(ReducedValue::Atom(child.clone()), out);
                }
            } else {
                out.push(ReducedValue::Atom(atom));
            }
        }
        scalar @ ReducedValue::Scalar(_) => out.push(scalar),
    }
}

/// Walks `atom` bottom-up, invoking `reducers`' callbacks at named
/// rule-result nodes and passing everything else through unchanged.
pub fn reduce_into(atom: &Atom, reducers: &ReducerMap) -> ReducedValue {
    match atom.kind() {
        AtomKind::RuleResult { name, inner } => match reducers.get(name) {
            Some(callback) => {
                let ctx = ReduceContext { inner, reducers };
                callback(&ctx)
            }
            None => ReducedValue::Atom(atom.clone()),
        },
        AtomKind::List(children) => ReducedValue::Seq(children.iter().map(|child| reduce_into(child, reducers)).collect()),
        _ => ReducedValue::Atom(atom.clone()),
    }
}

#[cfg(test)]
mod reduce_tests {
    use super::*;
    use crate::atom::TerminalKind;
    use crate::rules::{core_rules, kickoff};

    fn reduced_shape_eq(a: &ReducedValue, b: &ReducedValue) -> bool {
        match (a, b) {
            (ReducedValue::Atom(x), ReducedValue::Atom(y)) => x.code_point() == y.code_point() && x.is_nil() == y.is_nil(),
            (ReducedValue::Seq(xs), ReducedValue::Seq(ys)) => {
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| reduced_shape_eq(x, y))
            }
            _ => false,
        }
    }

    #[test]
    fn list_as_string_flattens_alt_and_star() {
        // Scenario 8: rulename = ALPHA *( ALPHA / DIGIT / "-" ), input "a-b1".
        let mut rules = core_rules();
        rules.insert(
            "rulename",
            Rc::new(crate::combinators::Cat::new(vec![
                Box::new(crate::terminals::Alpha),
                Box::new(crate::combinators::Repeat::star(Box::new(crate::combinators::Alt::new(vec![
                    crate::combinators::Branch::new(Box::new(crate::terminals::Alpha)),
                    crate::combinators::Branch::new(Box::new(crate::terminals::Digit)),
                    crate::combinators::Branch::new(Box::new(crate::combinators::Lit('-'))),
                ])))),
            ])),
        );
        let (atom, _) = kickoff(crate::cursor::cursor_from("a-b1"), &rules, "rulename").unwrap();

        let mut reducers = ReducerMap::new();
        reducers.register("rulename", |ctx| ReducedValue::scalar(ctx.list_as_string()));

        let reduced = reduce_into(&atom, &reducers);
        assert_eq!(reduced.into_scalar::<String>(), "a-b1");
    }

    #[test]
    fn unreduced_terminal_passes_through_as_atom() {
        let rules = core_rules();
        let (atom, _) = kickoff(crate::cursor::cursor_from("A"), &rules, "alpha").unwrap();
        let reduced = reduce_into(&atom, &ReducerMap::new());
        match reduced {
            ReducedValue::Atom(a) => {
                let (name, inner) = a.as_rule_result().unwrap();
                assert_eq!(name, "alpha");
                assert_eq!(inner.as_terminal().unwrap().0, TerminalKind::Alpha);
            }
            _ => panic!("expected an unreduced rule-result atom"),
        }
    }

    #[test]
    fn flatten_is_idempotent() {
        // P4: flatten(flatten(v)) == flatten(v).
        let a = Atom::terminal(TerminalKind::Digit, '1');
        let b = Atom::terminal(TerminalKind::Digit, '2');
        let nested = Atom::list(vec![Atom::list(vec![a.clone()]), Atom::list(vec![b.clone()])]);
        let once = flatten(ReducedValue::Atom(nested));
        let twice = flatten(once_clone(&once));
        assert!(reduced_shape_eq(&once, &twice));
    }

    fn once_clone(value: &ReducedValue) -> ReducedValue {
        match value {
            ReducedValue::Atom(atom) => ReducedValue::Atom(atom.clone()),
            ReducedValue::Seq(items) => ReducedValue::Seq(items.iter().map(once_clone).collect()),
            ReducedValue::Scalar(_) => panic!("test does not exercise scalar flattening"),
        }
    }

    #[test]
    fn reduce_as_int_parses_flattened_digits() {
        // Scenario 6: digits = DIGIT (Ref digits)? over "123" yields 123.
        let rules = core_rules();
        let (atom, _) = kickoff(crate::cursor::cursor_from("1"), &rules, "digit").unwrap();
        let one = atom.as_rule_result().unwrap().1.clone();
        let (_, two_atom) = kickoff(crate::cursor::cursor_from("2"), &rules, "digit").unwrap();
        let two = two_atom.as_rule_result().unwrap().1.clone();
        let (_, three_atom) = kickoff(crate::cursor::cursor_from("3"), &rules, "digit").unwrap();
        let three = three_atom.as_rule_result().unwrap().1.clone();
        assert_eq!(reduce_as_int(&[one, two, three]), 123);
    }

    #[test]
    fn reduce_as_hex_parses_as_byte() {
        let atoms = vec![Atom::terminal(TerminalKind::Char, '0'), Atom::terminal(TerminalKind::Char, 'D')];
        assert_eq!(reduce_as_hex(&atoms), 0x0D);
    }

    #[test]
    fn find_within_locates_direct_named_child_only() {
        let inner = Atom::rule_result("target", Atom::terminal(TerminalKind::Alpha, 'A'));
        let list = Atom::list(vec![Atom::terminal(TerminalKind::Digit, '1'), inner.clone()]);
        let found = find_within(&list, "target").unwrap();
        assert_eq!(found.as_rule_result().unwrap().0, "target");
    }

    #[test]
    fn is_nil_true_for_empty_seq_and_absent_option() {
        assert!(is_nil(&ReducedValue::Seq(vec![])));
        assert!(is_nil(&ReducedValue::Atom(Atom::option_absent())));
        assert!(!is_nil(&ReducedValue::scalar(0_i64)));
    }
}
