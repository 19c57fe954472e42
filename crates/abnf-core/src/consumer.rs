//! The consumer contract and the state threaded through a descent.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::atom::Atom;
use crate::cursor::Cursor;
use crate::error::ParseError;
use crate::rules::RuleMap;
use crate::Error as FatalError;

/// A failure a consumer can raise: either an ordinary, recoverable
/// [`ParseError`] that alternation or `Opt` may absorb, or a [`FatalError`]
/// that aborts the whole parse — no amount of backtracking can recover from
/// cancellation or a blown recursion budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Parse(ParseError),
    Fatal(FatalError),
}

impl From<ParseError> for Failure {
    fn from(err: ParseError) -> Failure {
        Failure::Parse(err)
    }
}

impl From<FatalError> for Failure {
    fn from(err: FatalError) -> Failure {
        Failure::Fatal(err)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Parse(err) => write!(f, "{err}"),
            Failure::Fatal(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Failure {}

/// A consumer's result: the atom it built plus the cursor advanced past
/// whatever it consumed. Returning a fresh cursor rather than mutating the
/// caller's in place is what makes the backtracking golden rule automatic —
/// a failed `try_consume` simply never hands back a cursor, so there is
/// nothing for the caller to merge.
pub type ConsumeResult = Result<(Atom, Cursor), Failure>;

/// A cooperative, shareable cancellation flag. Consumers poll it between
/// child invocations; nothing about the engine itself spawns threads, but
/// the token is `Send + Sync` so a caller running a parse on a worker thread
/// can cancel it from elsewhere.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Default depth at which `Ref` recursion is judged runaway (almost always a
/// left-recursive grammar, since the engine has no other way to detect one).
///
/// Spec §4.9 is explicit that the engine does not detect left recursion and
/// simply diverges; this guard exists only to fail predictably instead of
/// overflowing the stack, so the default is set well above any depth a
/// legitimate, merely-deep *right*-recursive grammar would reach (e.g. one
/// rule-result per list element over a several-hundred-element input).
/// Callers with deeper legitimate recursion, or who would rather let a
/// left-recursive grammar diverge than hit this guard at all, can raise or
/// disable it via [`kickoff_with_recursion_limit`](crate::rules::kickoff_with_recursion_limit)
/// or [`ParseState::with_recursion_limit`].
pub const DEFAULT_RECURSION_LIMIT: usize = 8192;

/// Everything threaded ambiently through the descent besides the cursor
/// itself: the rule map, the cancellation token, and the recursion depth
/// counter that `Ref` uses to bail out of runaway left recursion.
pub struct ParseState {
    rules: Rc<RuleMap>,
    cancellation: CancellationToken,
    recursion_limit: usize,
    depth: Cell<usize>,
}

impl ParseState {
    pub fn new(rules: Rc<RuleMap>) -> ParseState {
        ParseState {
            rules,
            cancellation: CancellationToken::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            depth: Cell::new(0),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> ParseState {
        self.cancellation = token;
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> ParseState {
        self.recursion_limit = limit;
        self
    }

    pub fn rules(&self) -> &RuleMap {
        &self.rules
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Polled by consumers between child invocations (per alternation
    /// branch, per repetition iteration).
    pub fn check_cancelled(&self) -> Result<(), Failure> {
        if self.cancellation.is_cancelled() {
            Err(Failure::Fatal(FatalError::Cancelled))
        } else {
            Ok(())
        }
    }

    /// Called by `Ref` before descending into a named rule. Returns a guard
    /// that restores the previous depth on drop, so a failed or successful
    /// branch always pays back what it borrowed.
    pub fn enter_recursion(&self) -> Result<RecursionGuard<'_>, Failure> {
        let depth = self.depth.get() + 1;
        if depth > self.recursion_limit {
            log::error!("recursion limit ({}) exceeded; likely a left-recursive grammar", self.recursion_limit);
            return Err(Failure::Fatal(FatalError::RecursionLimitExceeded));
        }
        self.depth.set(depth);
        Ok(RecursionGuard { state: self })
    }
}

/// Decrements the recursion depth when a `Ref` invocation (successful or
/// not) goes out of scope.
pub struct RecursionGuard<'a> {
    state: &'a ParseState,
}

impl Drop for RecursionGuard<'_> {
    fn drop(&mut self) {
        self.state.depth.set(self.state.depth.get() - 1);
    }
}

/// One grammar construct: a terminal, a literal, a concatenation, an
/// alternation, ... Every consumer shares this contract.
///
/// Golden rule of backtracking: a consumer that may fail must operate on a
/// *duplicated* cursor ([`Cursor::dup`]) and merge back into the caller's
/// only on success ([`Cursor::merge`]). Never mutate the caller's cursor on
/// failure.
pub trait Consumer {
    /// A short, human-readable name for diagnostics (e.g. `"ALPHA"`,
    /// `"Cat"`).
    fn name(&self) -> &str;

    /// The ABNF surface syntax this consumer corresponds to, for tree
    /// printing and error messages.
    fn string(&self) -> String;

    /// Alternation's tie-breaking hint. Higher wins; ties fall back to
    /// declaration order. `Alt` and `Cat` are weight 1; everything else
    /// defaults to 0.
    fn weight(&self) -> i32 {
        0
    }

    fn try_consume(&self, cursor: &Cursor, state: &ParseState) -> ConsumeResult;
}
