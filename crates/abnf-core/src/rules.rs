//! The rule map: a runtime table from rule name to consumer, and the
//! `kickoff` entry point that evaluates a named start rule against a cursor.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::atom::Atom;
use crate::consumer::{Consumer, Failure, ParseState};
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::terminals::{Alpha, Bit, Char, Cr, Ctl, Digit, Dquote, Htab, Lf, Octet, Sp, Vchar};

use crate::combinators::{Alt, Branch, Cat, Repeat};

/// An immutable, case-insensitively-keyed table from rule name to consumer.
/// Keys are always stored in their canonical (lowercase) form; lookups fold
/// the queried name to lowercase before indexing.
///
/// Construction is the only mutating phase: once handed to [`kickoff`] (or
/// threaded through a descent via [`ParseState`]), a `RuleMap` is read-only,
/// which is what lets independent parses over distinct inputs run
/// concurrently without any synchronization between them.
#[derive(Clone, Default)]
pub struct RuleMap {
    entries: IndexMap<String, Rc<dyn Consumer>>,
}

impl RuleMap {
    pub fn new() -> RuleMap {
        RuleMap::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, consumer: Rc<dyn Consumer>) {
        self.entries.insert(name.into().to_lowercase(), consumer);
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Consumer>> {
        self.entries.get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn extend_with(&mut self, other: RuleMap) {
        for (name, consumer) in other.entries {
            self.entries.insert(name, consumer);
        }
    }
}

/// The RFC 5234 core rules, always present under their canonical lowercase
/// names: `alpha, bit, char, cr, lf, crlf, ctl, digit, dquote, htab, octet,
/// sp, vchar, hexdig, wsp, lwsp`.
pub fn core_rules() -> RuleMap {
    let mut rules = RuleMap::new();
    rules.insert("alpha", Rc::new(Alpha));
    rules.insert("bit", Rc::new(Bit));
    rules.insert("char", Rc::new(Char));
    rules.insert("cr", Rc::new(Cr));
    rules.insert("lf", Rc::new(Lf));
    rules.insert("ctl", Rc::new(Ctl));
    rules.insert("digit", Rc::new(Digit));
    rules.insert("dquote", Rc::new(Dquote));
    rules.insert("htab", Rc::new(Htab));
    rules.insert("octet", Rc::new(Octet));
    rules.insert("sp", Rc::new(Sp));
    rules.insert("vchar", Rc::new(Vchar));

    // CRLF = CR LF
    rules.insert("crlf", Rc::new(Cat::new(vec![Box::new(Cr), Box::new(Lf)])));

    // HEXDIG = DIGIT / "A" / "B" / "C" / "D" / "E" / "F"
    rules.insert(
        "hexdig",
        Rc::new(Alt::new(vec![
            Branch::new(Box::new(Digit)),
            Branch::new(Box::new(crate::combinators::Lit('A'))),
            Branch::new(Box::new(crate::combinators::Lit('B'))),
            Branch::new(Box::new(crate::combinators::Lit('C'))),
            Branch::new(Box::new(crate::combinators::Lit('D'))),
            Branch::new(Box::new(crate::combinators::Lit('E'))),
            Branch::new(Box::new(crate::combinators::Lit('F'))),
        ])),
    );

    // WSP = SP / HTAB
    rules.insert(
        "wsp",
        Rc::new(Alt::new(vec![Branch::new(Box::new(Sp)), Branch::new(Box::new(Htab))])),
    );

    // LWSP = *(WSP / CRLF WSP)
    rules.insert(
        "lwsp",
        Rc::new(Repeat::star(Box::new(Alt::new(vec![
            Branch::new(Box::new(Alt::new(vec![Branch::new(Box::new(Sp)), Branch::new(Box::new(Htab))]))),
            Branch::new(Box::new(Cat::new(vec![
                Box::new(Cat::new(vec![Box::new(Cr), Box::new(Lf)])),
                Box::new(Alt::new(vec![Branch::new(Box::new(Sp)), Branch::new(Box::new(Htab))])),
            ]))),
        ])))),
    );

    rules
}

/// Merges `user_map` over [`core_rules`]; user entries win on name conflict.
pub fn make_rules(user_map: std::collections::HashMap<String, Rc<dyn Consumer>>) -> RuleMap {
    let mut rules = core_rules();
    for (name, consumer) in user_map {
        rules.insert(name, consumer);
    }
    rules
}

/// Merges one [`RuleMap`] over another; `overrides` wins on name conflict.
/// A convenience for bootstrap loaders that already hold a `RuleMap` of
/// user-defined rules rather than a bare `HashMap`.
pub fn merge_rules(mut base: RuleMap, overrides: RuleMap) -> RuleMap {
    base.extend_with(overrides);
    base
}

/// Evaluates `start_rule` against `cursor` under `rules`, exactly as a
/// `Ref(start_rule)` would: on success the result is a rule-result atom
/// named `start_rule` wrapping whatever the rule's consumer produced.
///
/// Uses [`crate::consumer::DEFAULT_RECURSION_LIMIT`] as the `Ref` recursion
/// guard's depth bound; see [`kickoff_with_recursion_limit`] to raise or
/// disable it for grammars that legitimately recurse deeper.
pub fn kickoff(cursor: Cursor, rules: &RuleMap, start_rule: &str) -> Result<(Atom, Cursor), Failure> {
    kickoff_with_recursion_limit(cursor, rules, start_rule, crate::consumer::DEFAULT_RECURSION_LIMIT)
}

/// Like [`kickoff`], but with an explicit `Ref` recursion depth bound rather
/// than [`crate::consumer::DEFAULT_RECURSION_LIMIT`]. Pass `usize::MAX` to
/// effectively disable the guard for a grammar known to recurse deeply but
/// not left-recursively — per spec §4.9 the engine does not detect left
/// recursion either way, so a genuinely left-recursive grammar run this way
/// diverges rather than failing fatally, exactly as spec describes.
pub fn kickoff_with_recursion_limit(
    cursor: Cursor,
    rules: &RuleMap,
    start_rule: &str,
    recursion_limit: usize,
) -> Result<(Atom, Cursor), Failure> {
    let canonical = start_rule.to_lowercase();
    log::debug!("kickoff: start rule '{canonical}' over {} code points", cursor.len());
    let Some(consumer) = rules.get(&canonical) else {
        return Err(ParseError::at(&cursor, format!("unknown rule '{canonical}'")).into());
    };
    let state = ParseState::new(Rc::new(rules.clone())).with_recursion_limit(recursion_limit);
    let (inner, next) = consumer.try_consume(&cursor, &state)?;
    Ok((Atom::rule_result(canonical, inner), next))
}
