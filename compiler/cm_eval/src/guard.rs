//! Guard evaluation.
//!
//! A guard runs only after its clause's pattern matched, with that clause's
//! tentative bindings in scope. A falsy guard is a fail-clause signal; a
//! raising guard aborts the statement.

use cm_ir::{Bindings, GuardRef, ObjectModel};

use crate::errors::MatchError;

/// Evaluate `guard` against `bindings`. A clause without a guard passes.
pub fn check_guard<H: ObjectModel + ?Sized>(
    host: &mut H,
    guard: Option<GuardRef>,
    bindings: &Bindings<H::Value>,
) -> Result<bool, MatchError> {
    let Some(guard) = guard else {
        return Ok(true);
    };
    let passed = host.eval_guard(guard, bindings)?;
    tracing::trace!(?guard, passed, "guard evaluated");
    Ok(passed)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
