//! End-to-end scenarios, each built from the public API the way a caller
//! outside this crate would use it: construct a rule map, `kickoff` a start
//! rule against a cursor, inspect the resulting atom tree (or reduce it).

use std::collections::HashMap;
use std::rc::Rc;

use crate::combinators::{Alt, Branch, Cat, Lit, Opt, Ref, Repeat};
use crate::consumer::{Consumer, Failure};
use crate::cursor::cursor_from;
use crate::reduce::{reduce_into, ReducedValue, ReducerMap};
use crate::rules::{core_rules, kickoff, make_rules, RuleMap};
use crate::terminals::{Alpha, Digit};

fn rules_with(name: &str, consumer: impl Consumer + 'static) -> RuleMap {
    let mut user: HashMap<String, Rc<dyn Consumer>> = HashMap::new();
    user.insert(name.to_string(), Rc::new(consumer));
    make_rules(user)
}

/// Scenario 1: single ALPHA.
#[test]
fn scenario_1_single_alpha() {
    let rules = core_rules();
    let (atom, cursor) = kickoff(cursor_from("A"), &rules, "alpha").expect("ALPHA matches 'A'");
    let (name, inner) = atom.as_rule_result().expect("kickoff wraps in a rule-result");
    assert_eq!(name, "alpha");
    assert_eq!(inner.as_terminal().unwrap().1, 'A');
    assert_eq!(cursor.pos(), 0);
}

/// Scenario 2: longest-weight alternation. "AB" against ALPHA / Cat(ALPHA, ALPHA)
/// prefers the two-ALPHA branch, since Cat carries the higher structural weight.
#[test]
fn scenario_2_weighted_alternation_prefers_richer_branch() {
    let root = Alt::new(vec![
        Branch::new(Box::new(Alpha)),
        Branch::new(Box::new(Cat::new(vec![Box::new(Alpha), Box::new(Alpha)]))),
    ]);
    let rules = rules_with("root", root);
    let (atom, cursor) = kickoff(cursor_from("AB"), &rules, "root").unwrap();
    let inner = atom.as_rule_result().unwrap().1;
    assert_eq!(inner.as_list().unwrap().len(), 2);
    assert_eq!(cursor.pos(), 1);
}

/// Scenario 3: Star greed. "ABC1" against Star(ALPHA) consumes three ALPHAs
/// and stops at the digit.
#[test]
fn scenario_3_star_is_greedy() {
    let rules = rules_with("root", Repeat::star(Box::new(Alpha)));
    let (atom, cursor) = kickoff(cursor_from("ABC1"), &rules, "root").unwrap();
    let inner = atom.as_rule_result().unwrap().1;
    assert_eq!(inner.as_list().unwrap().len(), 3);
    assert_eq!(cursor.pos(), 2);
}

/// Scenario 4: Plus underflow. "1" against Plus(ALPHA) fails at position 1
/// without moving the cursor.
#[test]
fn scenario_4_plus_underflow_fails_without_advancing() {
    let rules = rules_with("root", Repeat::plus(Box::new(Alpha)));
    let cursor = cursor_from("1");
    let before = cursor.pos();
    let err = kickoff(cursor, &rules, "root").unwrap_err();
    match err {
        Failure::Parse(err) => assert_eq!(err.position(), 1),
        Failure::Fatal(_) => panic!("expected a parse error, not a fatal one"),
    }
    assert_eq!(cursor_from("1").pos(), before);
}

/// Scenario 5: optional absent. "" against Opt(ALPHA) succeeds with an
/// absent option and no input consumed.
#[test]
fn scenario_5_optional_absent_succeeds() {
    let rules = rules_with("root", Opt::new(Box::new(Alpha)));
    let (atom, cursor) = kickoff(cursor_from(""), &rules, "root").unwrap();
    let inner = atom.as_rule_result().unwrap().1;
    let (present, opt_inner) = inner.as_option().unwrap();
    assert!(!present);
    assert!(opt_inner.is_none());
    assert_eq!(cursor.pos(), -1);
}

/// Scenario 6: right-recursive reference cycle. `digits = DIGIT (digits)?`
/// over "123" nests three rule-results deep; flattening and reducing the
/// digit atoms as an integer yields 123.
#[test]
fn scenario_6_right_recursive_reference_reduces_to_123() {
    let digits = Cat::new(vec![Box::new(Digit), Box::new(Opt::new(Box::new(Ref::new("digits"))))]);
    let rules = rules_with("digits", digits);
    let (atom, cursor) = kickoff(cursor_from("123"), &rules, "digits").unwrap();
    assert_eq!(cursor.pos(), 2);

    fn collect_digits(atom: &crate::atom::Atom, out: &mut Vec<crate::atom::Atom>) {
        match atom.kind() {
            crate::atom::AtomKind::Terminal { .. } => out.push(atom.clone()),
            crate::atom::AtomKind::List(children) => {
                for child in children {
                    collect_digits(child, out);
                }
            }
            crate::atom::AtomKind::Option { inner: Some(inner), .. } => collect_digits(inner, out),
            crate::atom::AtomKind::Option { inner: None, .. } => {}
            crate::atom::AtomKind::RuleResult { inner, .. } => collect_digits(inner, out),
        }
    }

    let mut digit_atoms = Vec::new();
    collect_digits(&atom, &mut digit_atoms);
    assert_eq!(crate::reduce::reduce_as_int(&digit_atoms), 123);
}

/// Scenario 7: unknown rule. `Ref("nope")` fails at position 1.
#[test]
fn scenario_7_unknown_rule_reference_fails() {
    let rules = rules_with("root", Ref::new("nope"));
    let err = kickoff(cursor_from("x"), &rules, "root").unwrap_err();
    match err {
        Failure::Parse(err) => {
            assert_eq!(err.position(), 1);
            assert_eq!(err.message(), "unknown rule 'nope'");
        }
        Failure::Fatal(_) => panic!("expected a parse error"),
    }
}

/// Scenario 8: reducer round-trip on `rulename = ALPHA *( ALPHA / DIGIT / "-" )`
/// over "a-b1", reduced by `list_as_string` to the flattened literal string.
#[test]
fn scenario_8_reducer_round_trip_on_rulename() {
    let rulename = Cat::new(vec![
        Box::new(Alpha),
        Box::new(Repeat::star(Box::new(Alt::new(vec![
            Branch::new(Box::new(Alpha)),
            Branch::new(Box::new(Digit)),
            Branch::new(Box::new(Lit('-'))),
        ])))),
    ]);
    let rules = rules_with("rulename", rulename);
    let (atom, _) = kickoff(cursor_from("a-b1"), &rules, "rulename").unwrap();

    let mut reducers = ReducerMap::new();
    reducers.register("rulename", |ctx| ReducedValue::scalar(ctx.list_as_string()));

    let reduced = reduce_into(&atom, &reducers);
    assert_eq!(reduced.into_scalar::<String>(), "a-b1");
}

/// `LWSP` over a multi-line folded header value (space, then a CRLF-folded
/// continuation line) consumes every byte of the whitespace run.
#[test]
fn lwsp_consumes_a_folded_continuation_line() {
    let rules = core_rules();
    let input = indoc::indoc! {"
        \u{20}\r
        \u{20}"};
    let (_, cursor) = kickoff(cursor_from(input), &rules, "lwsp").unwrap();
    assert_eq!(cursor.pos() as usize, input.chars().count() - 1);
}
