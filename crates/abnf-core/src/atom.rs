//! The generic parse tree.
//!
//! An [`Atom`] is a closed sum type: one variant per kind of node the engine
//! can produce. Every atom but the root carries a weak back-reference to its
//! parent, set exactly once at construction and never touched again —
//! parents never own their children's siblings or vice versa, so the tree's
//! only owning edges run root-to-leaf.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// One of the twelve RFC 5234 core terminals. Most carry no payload beyond
/// their identity; the consumed code point is available via
/// [`Atom::code_point`] regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalKind {
    Alpha,
    Bit,
    Char,
    Cr,
    Lf,
    Ctl,
    Digit,
    Dquote,
    Htab,
    Octet,
    Sp,
    Vchar,
}

impl TerminalKind {
    pub fn name(self) -> &'static str {
        match self {
            TerminalKind::Alpha => "ALPHA",
            TerminalKind::Bit => "BIT",
            TerminalKind::Char => "CHAR",
            TerminalKind::Cr => "CR",
            TerminalKind::Lf => "LF",
            TerminalKind::Ctl => "CTL",
            TerminalKind::Digit => "DIGIT",
            TerminalKind::Dquote => "DQUOTE",
            TerminalKind::Htab => "HTAB",
            TerminalKind::Octet => "OCTET",
            TerminalKind::Sp => "SP",
            TerminalKind::Vchar => "VCHAR",
        }
    }
}

impl fmt::Display for TerminalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The payload of an [`Atom`], minus its parent link.
#[derive(Debug, Clone)]
pub enum AtomKind {
    /// A single consumed code point recognized by a core terminal.
    Terminal { kind: TerminalKind, code_point: char },
    /// The ordered result of a concatenation or repetition.
    List(Vec<Atom>),
    /// The result of `Opt`: `present` mirrors whether `inner` is `Some`.
    Option { present: bool, inner: Option<Atom> },
    /// The result of evaluating a named reference: `name` is the rule name
    /// (lowercase), `inner` is whatever the target consumer produced.
    RuleResult { name: String, inner: Atom },
}

struct AtomNode {
    kind: AtomKind,
    parent: RefCell<Weak<AtomNode>>,
}

/// A node of the parse tree. Cheap to clone (an `Rc` bump); the tree itself
/// is built bottom-up by consumers and never mutated in place once returned.
#[derive(Clone)]
pub struct Atom(Rc<AtomNode>);

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Atom").field(&self.0.kind).finish()
    }
}

impl Atom {
    fn new(kind: AtomKind) -> Atom {
        Atom(Rc::new(AtomNode {
            kind,
            parent: RefCell::new(Weak::new()),
        }))
    }

    /// Sets `self`'s parent link. Consumers call this once, immediately
    /// after assembling a composite atom from already-built children.
    fn adopt(&self, parent: &Atom) {
        *self.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
    }

    pub fn kind(&self) -> &AtomKind {
        &self.0.kind
    }

    /// The parent atom, if any. `None` at the tree root or if this atom has
    /// not yet been attached to a composite (both are legal: a freshly built
    /// terminal atom has no parent until its consumer wraps it).
    pub fn parent(&self) -> Option<Atom> {
        self.0.parent.borrow().upgrade().map(Atom)
    }

    pub fn terminal(kind: TerminalKind, code_point: char) -> Atom {
        Atom::new(AtomKind::Terminal { kind, code_point })
    }

    /// Builds a list atom from already-constructed children, linking each
    /// child's parent to the new node.
    pub fn list(children: Vec<Atom>) -> Atom {
        let node = Atom::new(AtomKind::List(children));
        if let AtomKind::List(children) = &node.0.kind {
            for child in children {
                child.adopt(&node);
            }
        }
        node
    }

    pub fn option_present(inner: Atom) -> Atom {
        let node = Atom::new(AtomKind::Option {
            present: true,
            inner: Some(inner),
        });
        if let AtomKind::Option { inner: Some(inner), .. } = &node.0.kind {
            inner.adopt(&node);
        }
        node
    }

    pub fn option_absent() -> Atom {
        Atom::new(AtomKind::Option {
            present: false,
            inner: None,
        })
    }

    pub fn rule_result(name: impl Into<String>, inner: Atom) -> Atom {
        let node = Atom::new(AtomKind::RuleResult {
            name: name.into(),
            inner,
        });
        if let AtomKind::RuleResult { inner, .. } = &node.0.kind {
            inner.adopt(&node);
        }
        node
    }

    /// The code point this atom was built from, if it is (or directly
    /// wraps, through any number of rule-results) a terminal.
    pub fn code_point(&self) -> Option<char> {
        match &self.0.kind {
            AtomKind::Terminal { code_point, .. } => Some(*code_point),
            AtomKind::RuleResult { inner, .. } => inner.code_point(),
            _ => None,
        }
    }

    pub fn as_terminal(&self) -> Option<(TerminalKind, char)> {
        match &self.0.kind {
            AtomKind::Terminal { kind, code_point } => Some((*kind, *code_point)),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Atom]> {
        match &self.0.kind {
            AtomKind::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_option(&self) -> Option<(bool, Option<&Atom>)> {
        match &self.0.kind {
            AtomKind::Option { present, inner } => Some((*present, inner.as_ref())),
            _ => None,
        }
    }

    /// `(name, inner)` if this atom is a rule-result.
    pub fn as_rule_result(&self) -> Option<(&str, &Atom)> {
        match &self.0.kind {
            AtomKind::RuleResult { name, inner } => Some((name.as_str(), inner)),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        match &self.0.kind {
            AtomKind::List(items) => items.is_empty(),
            AtomKind::Option { present, .. } => !present,
            _ => false,
        }
    }
}

#[cfg(test)]
mod atom_tests {
    use super::*;

    #[test]
    fn list_sets_parent_on_children() {
        let leaf = Atom::terminal(TerminalKind::Alpha, 'A');
        let parent = Atom::list(vec![leaf.clone()]);
        let linked = parent.as_list().unwrap()[0].parent().unwrap();
        assert!(Rc::ptr_eq(&linked.0, &parent.0));
        let _ = leaf;
    }

    #[test]
    fn option_absent_has_no_inner() {
        let opt = Atom::option_absent();
        let (present, inner) = opt.as_option().unwrap();
        assert!(!present);
        assert!(inner.is_none());
        assert!(opt.is_nil());
    }

    #[test]
    fn rule_result_exposes_name_and_inner() {
        let leaf = Atom::terminal(TerminalKind::Digit, '7');
        let rr = Atom::rule_result("digit", leaf);
        let (name, inner) = rr.as_rule_result().unwrap();
        assert_eq!(name, "digit");
        assert_eq!(inner.code_point(), Some('7'));
    }

    #[test]
    fn code_point_passes_through_rule_result() {
        let leaf = Atom::terminal(TerminalKind::Alpha, 'Z');
        let rr = Atom::rule_result("alpha", leaf);
        assert_eq!(rr.code_point(), Some('Z'));
    }

    #[test]
    fn empty_list_is_nil() {
        assert!(Atom::list(vec![]).is_nil());
    }
}
