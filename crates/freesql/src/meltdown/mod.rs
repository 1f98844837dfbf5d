//! Meltdown: removal of tokens left dangling by omitted predicates.
//!
//! Composing `WHERE name = ? AND age > ?` with an absent `name` leaves
//! `WHERE <dead> AND age > ?`. Meltdown turns that into `WHERE age > ?`, and
//! more generally deletes:
//!
//! - nullable expressions and [`Token::Omitted`];
//! - `AND`/`OR` lacking a live operand on either side, `NOT` lacking one on its
//!   right;
//! - bracket pairs with no live content;
//! - `WHERE`/`HAVING` whose predicate region is left empty.
//!
//! The pass is a single left-to-right scan over an explicit stack of bracket
//! scopes. Operators are kept *pending* until a live operand confirms them; an
//! operator, keyword or closing bracket arriving first kills them instead.
//! When two binary operators end up adjacent (`a AND <dead> OR c`), the later
//! one survives: `a OR c`.
//!
//! Meltdown is idempotent, and a sequence that is all dead melts to an empty
//! one without error.

use crate::error::{FreeSqlError, FreeSqlResult};
use crate::token::{Bracket, Token};


/// State of one bracket level.
#[derive(Debug, Default)]
struct Scope {
    /// Position of the opening bracket; `None` for the outermost scope.
    open: Option<usize>,
    /// A live operand is available as left operand of a binary operator.
    has_operand: bool,
    /// Any live non-operator token was seen.
    has_content: bool,
    /// Operators waiting for a right operand.
    pending: Vec<usize>,
    /// `WHERE`/`HAVING` waiting for its first live operand.
    pending_lead: Option<usize>,
}

impl Scope {
    fn group(open: usize) -> Self {
        Self {
            open: Some(open),
            ..Self::default()
        }
    }

    fn operand(&mut self) {
        self.pending.clear();
        self.pending_lead = None;
        self.has_operand = true;
        self.has_content = true;
    }

    fn kill_pending(&mut self, live: &mut [bool]) {
        for i in self.pending.drain(..) {
            live[i] = false;
        }
    }

    fn kill_lead(&mut self, live: &mut [bool]) {
        if let Some(i) = self.pending_lead.take() {
            live[i] = false;
        }
    }
}

/// Compute which tokens survive meltdown.
///
/// Fails only on unbalanced brackets.
pub fn live_mask(tokens: &[Token]) -> FreeSqlResult<Vec<bool>> {
    let mut live = vec![true; tokens.len()];
    let mut scopes = vec![Scope::default()];

    for (i, token) in tokens.iter().enumerate() {
        if token.is_dead() {
            live[i] = false;
            continue;
        }

        match token {
            Token::Operator(op) => {
                let scope = current(&mut scopes);
                if op.is_binary() {
                    scope.kill_pending(&mut live);
                    if scope.has_operand {
                        scope.pending.push(i);
                    } else {
                        live[i] = false;
                    }
                } else {
                    scope.pending.push(i);
                }
            }
            Token::Keyword(keyword) => {
                let scope = current(&mut scopes);
                scope.kill_pending(&mut live);
                scope.kill_lead(&mut live);
                scope.has_operand = false;
                if keyword.is_predicate_lead() {
                    scope.pending_lead = Some(i);
                } else {
                    scope.has_content = true;
                }
            }
            Token::Bracket(Bracket::Open) => scopes.push(Scope::group(i)),
            Token::Bracket(Bracket::Close) => {
                if scopes.len() == 1 {
                    return Err(FreeSqlError::state(format!(
                        "unmatched ')' at token {i}"
                    )));
                }
                let mut scope = scopes.pop().unwrap_or_default();
                scope.kill_pending(&mut live);
                scope.kill_lead(&mut live);

                if scope.has_content {
                    current(&mut scopes).operand();
                } else {
                    if let Some(open) = scope.open {
                        live[open] = false;
                    }
                    live[i] = false;
                }
            }
            _ => current(&mut scopes).operand(),
        }
    }

    if scopes.len() > 1 {
        let open = scopes.last().and_then(|s| s.open).unwrap_or_default();
        return Err(FreeSqlError::state(format!(
            "unclosed '(' at token {open}"
        )));
    }

    let root = current(&mut scopes);
    root.kill_pending(&mut live);
    root.kill_lead(&mut live);

    Ok(live)
}

/// Return the surviving tokens in their original order.
pub fn meltdown(tokens: &[Token]) -> FreeSqlResult<Vec<Token>> {
    let live = live_mask(tokens)?;
    let melted: Vec<Token> = tokens
        .iter()
        .zip(&live)
        .filter(|(_, keep)| **keep)
        .map(|(t, _)| t.clone())
        .collect();

    let removed = tokens.len() - melted.len();
    if removed > 0 {
        tracing::debug!(
            target: "freesql",
            kept = melted.len(),
            removed,
            "meltdown removed dead tokens"
        );
    }

    Ok(melted)
}

fn current(scopes: &mut [Scope]) -> &mut Scope {
    // The outermost scope is never popped.
    let last = scopes.len() - 1;
    &mut scopes[last]
}
