//! Combinator consumers: literal, string, concatenation, weighted
//! alternation, optional, repetition, numeric ranges, and named reference.
//!
//! Every combinator here is a plain struct implementing [`Consumer`]; none
//! of them know anything about ABNF's own grammar — they are the runtime
//! primitives a bootstrap loader wires together after parsing a grammar.

use crate::atom::Atom;
use crate::consumer::{ConsumeResult, Consumer, Failure, ParseState};
use crate::cursor::Cursor;
use crate::error::ParseError;

/// Weight `Alt` and `Cat` carry by default, matching the convention that
/// only they are "structurally rich" enough to prefer over a bare terminal
/// or reference (which default to the trait's weight of 0).
const STRUCTURAL_WEIGHT: i32 = 1;

/// Matches one code point equal to `r`.
#[derive(Debug, Clone, Copy)]
pub struct Lit(pub char);

impl Consumer for Lit {
    fn name(&self) -> &str {
        "Lit"
    }

    fn string(&self) -> String {
        format!("{:?}", self.0)
    }

    fn try_consume(&self, cursor: &Cursor, _state: &ParseState) -> ConsumeResult {
        match cursor.peek() {
            Some(cp) if cp == self.0 => {
                let mut next = cursor.dup();
                next.consume();
                Ok((Atom::terminal(crate::atom::TerminalKind::Char, cp), next))
            }
            Some(cp) => Err(ParseError::at(cursor, format!("expected '{}' but found '{cp}'", self.0)).into()),
            None => Err(ParseError::at(cursor, format!("expected '{}' but found end of input", self.0)).into()),
        }
    }
}

/// A fixed string: sugar for a concatenation of [`Lit`]s. Per ABNF, quoted
/// literals are case-insensitive; the string is folded to lowercase at
/// construction and matching is done case-insensitively.
#[derive(Debug, Clone)]
pub struct Str {
    folded: String,
}

impl Str {
    pub fn new(s: impl Into<String>) -> Str {
        Str {
            folded: s.into().to_lowercase(),
        }
    }
}

impl Consumer for Str {
    fn name(&self) -> &str {
        "Str"
    }

    fn string(&self) -> String {
        format!("{:?}", self.folded)
    }

    fn weight(&self) -> i32 {
        STRUCTURAL_WEIGHT
    }

    fn try_consume(&self, cursor: &Cursor, _state: &ParseState) -> ConsumeResult {
        let mut working = cursor.dup();
        let mut matched = Vec::with_capacity(self.folded.chars().count());
        for expected in self.folded.chars() {
            match working.peek() {
                Some(cp) if cp.to_lowercase().eq(expected.to_lowercase()) => {
                    matched.push(Atom::terminal(crate::atom::TerminalKind::Char, cp));
                    working.consume();
                }
                Some(cp) => {
                    return Err(ParseError::at(&working, format!("expected '{expected}' but found '{cp}'")).into())
                }
                None => {
                    return Err(
                        ParseError::at(&working, format!("expected '{expected}' but found end of input")).into(),
                    )
                }
            }
        }
        Ok((Atom::list(matched), working))
    }
}

/// Sequential composition: fails whole if any child fails, otherwise
/// collects every child's atom into a list and advances past all of them.
pub struct Cat {
    children: Vec<Box<dyn Consumer>>,
}

impl Cat {
    pub fn new(children: Vec<Box<dyn Consumer>>) -> Cat {
        Cat { children }
    }
}

impl Consumer for Cat {
    fn name(&self) -> &str {
        "Cat"
    }

    fn string(&self) -> String {
        let parts: Vec<String> = self.children.iter().map(|c| c.string()).collect();
        format!("({})", parts.join(" "))
    }

    fn weight(&self) -> i32 {
        STRUCTURAL_WEIGHT
    }

    fn try_consume(&self, cursor: &Cursor, state: &ParseState) -> ConsumeResult {
        state.check_cancelled()?;
        let mut working = cursor.dup();
        let mut results = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let (atom, next) = child.try_consume(&working, state)?;
            working.merge(&next);
            results.push(atom);
        }
        Ok((Atom::list(results), working))
    }
}

/// A single alternation branch, optionally carrying a weight override for
/// disambiguation beyond the default (`Alt`/`Cat` at 1, everything else at
/// 0).
pub struct Branch {
    consumer: Box<dyn Consumer>,
    weight_override: Option<i32>,
}

impl Branch {
    pub fn new(consumer: Box<dyn Consumer>) -> Branch {
        Branch {
            consumer,
            weight_override: None,
        }
    }

    pub fn weighted(consumer: Box<dyn Consumer>, weight: i32) -> Branch {
        Branch {
            consumer,
            weight_override: Some(weight),
        }
    }

    fn weight(&self) -> i32 {
        self.weight_override.unwrap_or_else(|| self.consumer.weight())
    }
}

/// Weighted alternation. Tries every branch from an independent snapshot;
/// among the branches that succeed, picks the one with the greatest weight
/// (ties broken by declaration order — a stable sort preserves this
/// automatically). If none succeed, fails with a composite error whose
/// sub-errors are every branch's failure, reporting the furthest one.
pub struct Alt {
    branches: Vec<Branch>,
}

impl Alt {
    pub fn new(branches: Vec<Branch>) -> Alt {
        Alt { branches }
    }
}

impl Consumer for Alt {
    fn name(&self) -> &str {
        "Alt"
    }

    fn string(&self) -> String {
        let parts: Vec<String> = self.branches.iter().map(|b| b.consumer.string()).collect();
        format!("({})", parts.join(" / "))
    }

    fn weight(&self) -> i32 {
        STRUCTURAL_WEIGHT
    }

    fn try_consume(&self, cursor: &Cursor, state: &ParseState) -> ConsumeResult {
        let mut successes: Vec<(usize, &Branch, Atom, Cursor)> = Vec::new();
        let mut sub_errors = Vec::new();

        for (index, branch) in self.branches.iter().enumerate() {
            state.check_cancelled()?;
            let snapshot = cursor.dup();
            match branch.consumer.try_consume(&snapshot, state) {
                Ok((atom, next)) => successes.push((index, branch, atom, next)),
                Err(Failure::Fatal(err)) => return Err(Failure::Fatal(err)),
                Err(Failure::Parse(err)) => sub_errors.push(err),
            }
        }

        if successes.is_empty() {
            let composite = ParseError::at(cursor, "no alternative matched").adopt_all(sub_errors);
            let furthest = composite.furthest().clone();
            return Err(furthest.into());
        }

        // Stable sort by descending weight; `successes` is already in
        // declaration order, so equal weights keep that order (P3).
        successes.sort_by(|a, b| b.1.weight().cmp(&a.1.weight()));
        let (_, _, atom, next) = successes.into_iter().next().unwrap();
        Ok((atom, next))
    }
}

/// Runs the child on a snapshot; success wraps as `present=true`, failure
/// swallows the child's error and yields `present=false` without consuming.
pub struct Opt {
    child: Box<dyn Consumer>,
}

impl Opt {
    pub fn new(child: Box<dyn Consumer>) -> Opt {
        Opt { child }
    }
}

impl Consumer for Opt {
    fn name(&self) -> &str {
        "Opt"
    }

    fn string(&self) -> String {
        format!("[{}]", self.child.string())
    }

    fn try_consume(&self, cursor: &Cursor, state: &ParseState) -> ConsumeResult {
        match self.child.try_consume(cursor, state) {
            Ok((atom, next)) => Ok((Atom::option_present(atom), next)),
            Err(Failure::Fatal(err)) => Err(Failure::Fatal(err)),
            Err(Failure::Parse(_)) => Ok((Atom::option_absent(), cursor.dup())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RepeatMode {
    Plus,
    Star,
    Min(usize),
    MinMax(usize, usize),
}

impl RepeatMode {
    fn min(self) -> usize {
        match self {
            RepeatMode::Plus => 1,
            RepeatMode::Star => 0,
            RepeatMode::Min(n) => n,
            RepeatMode::MinMax(n, _) => n,
        }
    }

    fn max(self) -> Option<usize> {
        match self {
            RepeatMode::Plus | RepeatMode::Star | RepeatMode::Min(_) => None,
            RepeatMode::MinMax(_, m) => Some(m),
        }
    }
}

/// Greedy repetition, unifying the four ABNF repeat profiles (`1*`, `*`,
/// `n*`, `n*m`) behind one engine: the only thing that differs between them
/// is the accepted `(min, max)` range.
pub struct Repeat {
    mode: RepeatMode,
    child: Box<dyn Consumer>,
}

impl Repeat {
    pub fn plus(child: Box<dyn Consumer>) -> Repeat {
        Repeat {
            mode: RepeatMode::Plus,
            child,
        }
    }

    pub fn star(child: Box<dyn Consumer>) -> Repeat {
        Repeat {
            mode: RepeatMode::Star,
            child,
        }
    }

    pub fn min(n: usize, child: Box<dyn Consumer>) -> Repeat {
        Repeat {
            mode: RepeatMode::Min(n),
            child,
        }
    }

    pub fn min_max(n: usize, m: usize, child: Box<dyn Consumer>) -> Repeat {
        Repeat {
            mode: RepeatMode::MinMax(n, m),
            child,
        }
    }
}

impl Consumer for Repeat {
    fn name(&self) -> &str {
        "Repeat"
    }

    fn string(&self) -> String {
        let bounds = match self.mode {
            RepeatMode::Plus => "1*".to_string(),
            RepeatMode::Star => "*".to_string(),
            RepeatMode::Min(n) => format!("{n}*"),
            RepeatMode::MinMax(n, m) => format!("{n}*{m}"),
        };
        format!("{bounds}{}", self.child.string())
    }

    fn try_consume(&self, cursor: &Cursor, state: &ParseState) -> ConsumeResult {
        let mut working = cursor.dup();
        let mut matches = Vec::new();
        let max = self.mode.max();
        let mut last_error = None;

        loop {
            if max.is_some_and(|m| matches.len() >= m) {
                break;
            }
            state.check_cancelled()?;
            match self.child.try_consume(&working, state) {
                Ok((atom, next)) => {
                    working.merge(&next);
                    matches.push(atom);
                }
                Err(Failure::Fatal(err)) => return Err(Failure::Fatal(err)),
                Err(Failure::Parse(err)) => {
                    last_error = Some(err);
                    break;
                }
            }
        }

        let k = matches.len();
        let satisfied = k >= self.mode.min() && self.mode.max().is_none_or(|m| k <= m);
        if satisfied {
            Ok((Atom::list(matches), working))
        } else {
            Err(last_error
                .unwrap_or_else(|| ParseError::at(cursor, "repetition did not reach its minimum"))
                .into())
        }
    }
}

/// Matches one code point whose (Unicode scalar) value equals `v`. ABNF's
/// `%d` numeric terminals name code points by value, not by digit-ness, so
/// this checks `cp as u32 == v` rather than parsing `cp` as a digit.
#[derive(Debug, Clone, Copy)]
pub struct Dec(pub u32);

impl Consumer for Dec {
    fn name(&self) -> &str {
        "Dec"
    }

    fn string(&self) -> String {
        format!("%d{}", self.0)
    }

    fn try_consume(&self, cursor: &Cursor, _state: &ParseState) -> ConsumeResult {
        match cursor.peek() {
            Some(cp) if cp as u32 == self.0 => {
                let mut next = cursor.dup();
                next.consume();
                Ok((Atom::terminal(crate::atom::TerminalKind::Char, cp), next))
            }
            _ => Err(ParseError::at(cursor, format!("expected code point {}", self.0)).into()),
        }
    }
}

/// Matches one code point whose decimal value lies in `[a, b]`.
#[derive(Debug, Clone, Copy)]
pub struct DecRange(pub u32, pub u32);

impl Consumer for DecRange {
    fn name(&self) -> &str {
        "DecRange"
    }

    fn string(&self) -> String {
        format!("%d{}-{}", self.0, self.1)
    }

    fn try_consume(&self, cursor: &Cursor, _state: &ParseState) -> ConsumeResult {
        match cursor.peek() {
            Some(cp) if (self.0..=self.1).contains(&(cp as u32)) => {
                let mut next = cursor.dup();
                next.consume();
                Ok((Atom::terminal(crate::atom::TerminalKind::Char, cp), next))
            }
            _ => Err(ParseError::at(cursor, format!("expected code point in {}-{}", self.0, self.1)).into()),
        }
    }
}

/// Matches one code point whose value equals `v`, given in hex.
#[derive(Debug, Clone, Copy)]
pub struct Hex(pub u32);

impl Consumer for Hex {
    fn name(&self) -> &str {
        "Hex"
    }

    fn string(&self) -> String {
        format!("%x{:X}", self.0)
    }

    fn try_consume(&self, cursor: &Cursor, _state: &ParseState) -> ConsumeResult {
        match cursor.peek() {
            Some(cp) if cp as u32 == self.0 => {
                let mut next = cursor.dup();
                next.consume();
                Ok((Atom::terminal(crate::atom::TerminalKind::Char, cp), next))
            }
            _ => Err(ParseError::at(cursor, format!("expected code point 0x{:X}", self.0)).into()),
        }
    }
}

/// Matches one code point whose value lies in `[a, b]`, given in hex.
#[derive(Debug, Clone, Copy)]
pub struct HexRange(pub u32, pub u32);

impl Consumer for HexRange {
    fn name(&self) -> &str {
        "HexRange"
    }

    fn string(&self) -> String {
        format!("%x{:X}-{:X}", self.0, self.1)
    }

    fn try_consume(&self, cursor: &Cursor, _state: &ParseState) -> ConsumeResult {
        match cursor.peek() {
            Some(cp) if (self.0..=self.1).contains(&(cp as u32)) => {
                let mut next = cursor.dup();
                next.consume();
                Ok((Atom::terminal(crate::atom::TerminalKind::Char, cp), next))
            }
            _ => Err(ParseError::at(cursor, format!("expected code point in 0x{:X}-0x{:X}", self.0, self.1)).into()),
        }
    }
}

/// A fixed sequence of decimal-valued code points: `%d13.10` style numeric
/// value sequences, sugar for `Cat(Dec(13), Dec(10))`.
pub struct DecSeq {
    cat: Cat,
}

impl DecSeq {
    pub fn new(values: Vec<u32>) -> DecSeq {
        let children: Vec<Box<dyn Consumer>> = values.into_iter().map(|v| Box::new(Dec(v)) as Box<dyn Consumer>).collect();
        DecSeq { cat: Cat::new(children) }
    }
}

impl Consumer for DecSeq {
    fn name(&self) -> &str {
        "DecSeq"
    }

    fn string(&self) -> String {
        self.cat.string()
    }

    fn weight(&self) -> i32 {
        self.cat.weight()
    }

    fn try_consume(&self, cursor: &Cursor, state: &ParseState) -> ConsumeResult {
        self.cat.try_consume(cursor, state)
    }
}

/// A fixed sequence of hex-valued code points: `%x0D.0A` style, sugar for
/// `Cat(Hex(0x0D), Hex(0x0A))`.
pub struct HexSeq {
    cat: Cat,
}

impl HexSeq {
    pub fn new(values: Vec<u32>) -> HexSeq {
        let children: Vec<Box<dyn Consumer>> = values.into_iter().map(|v| Box::new(Hex(v)) as Box<dyn Consumer>).collect();
        HexSeq { cat: Cat::new(children) }
    }
}

impl Consumer for HexSeq {
    fn name(&self) -> &str {
        "HexSeq"
    }

    fn string(&self) -> String {
        self.cat.string()
    }

    fn weight(&self) -> i32 {
        self.cat.weight()
    }

    fn try_consume(&self, cursor: &Cursor, state: &ParseState) -> ConsumeResult {
        self.cat.try_consume(cursor, state)
    }
}

/// A named reference: looks `name` up (case-insensitively; canonical form is
/// lowercase) in the ambient rule map, evaluates the target, and wraps a
/// success in a rule-result atom carrying `name`.
pub struct Ref {
    name: String,
}

impl Ref {
    pub fn new(name: impl Into<String>) -> Ref {
        Ref {
            name: name.into().to_lowercase(),
        }
    }
}

impl Consumer for Ref {
    fn name(&self) -> &str {
        "Ref"
    }

    fn string(&self) -> String {
        self.name.clone()
    }

    fn try_consume(&self, cursor: &Cursor, state: &ParseState) -> ConsumeResult {
        let Some(target) = state.rules().get(&self.name) else {
            return Err(ParseError::at(cursor, format!("unknown rule '{}'", self.name)).into());
        };
        let _guard = state.enter_recursion()?;
        let (inner, next) = target.try_consume(cursor, state)?;
        Ok((Atom::rule_result(self.name.clone(), inner), next))
    }
}
