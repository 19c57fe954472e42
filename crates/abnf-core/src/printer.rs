//! A diagnostic dump of the generic parse tree, independent of any reducer.

use std::fmt::Write as _;

use crate::atom::{Atom, AtomKind};

/// Renders `atom` as an indented tree, one node per line.
pub fn print_tree(atom: &Atom) -> String {
    let mut out = String::new();
    write_node(atom, 0, &mut out);
    out
}

fn write_node(atom: &Atom, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match atom.kind() {
        AtomKind::Terminal { kind, code_point } => {
            let _ = writeln!(out, "{indent}{kind} {code_point:?}");
        }
        AtomKind::List(children) => {
            let _ = writeln!(out, "{indent}List ({} children)", children.len());
            for child in children {
                write_node(child, depth + 1, out);
            }
        }
        AtomKind::Option { present, inner } => {
            let _ = writeln!(out, "{indent}Option (present={present})");
            if let Some(inner) = inner {
                write_node(inner, depth + 1, out);
            }
        }
        AtomKind::RuleResult { name, inner } => {
            let _ = writeln!(out, "{indent}{name}");
            write_node(inner, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod printer_tests {
    use super::*;
    use crate::rules::{core_rules, kickoff};

    #[test]
    fn prints_rule_result_and_terminal_kind() {
        let rules = core_rules();
        let (atom, _) = kickoff(crate::cursor::cursor_from("A"), &rules, "alpha").unwrap();
        let rendered = print_tree(&atom);
        assert!(rendered.starts_with("alpha\n"));
        assert!(rendered.contains("ALPHA 'A'"));
    }

    #[test]
    fn prints_list_child_count() {
        let rules = core_rules();
        let (atom, _) = kickoff(crate::cursor::cursor_from("\r\n"), &rules, "crlf").unwrap();
        let rendered = print_tree(&atom);
        assert!(rendered.contains("List (2 children)"));
    }
}
