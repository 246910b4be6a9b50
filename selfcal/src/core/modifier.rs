//! Composable command modifiers and the driver that folds them into argv.

use tracing::debug;

use crate::core::command::Command;
use crate::core::render::{RenderError, render};

/// A rewrite of a command plus the invocation prefix it requires.
///
/// Implementations must be total: a modifier that does not apply to a given
/// command returns `(vec![], command.clone())`. `apply` never mutates shared
/// state, so one modifier can serve any number of render calls.
pub trait Modifier {
    /// Application priority. Lower values are applied first and their prefix
    /// ends up outermost.
    fn order(&self) -> i32;

    /// Return `(prefix_tokens, rewritten_command)`.
    fn apply(&self, command: &Command) -> (Vec<String>, Command);

    /// Short label used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Render `command` after applying `modifiers` in ascending `order()`.
///
/// The caller's list order does not matter; ties keep their relative order.
/// Each modifier sees the command as rewritten by every lower-order modifier,
/// and its prefix is placed after theirs.
pub fn render_with_modifiers(
    command: &Command,
    modifiers: &[&dyn Modifier],
) -> Result<Vec<String>, RenderError> {
    let mut ordered = modifiers.to_vec();
    ordered.sort_by_key(|modifier| modifier.order());

    let mut tokens = Vec::new();
    let mut current = command.clone();
    for modifier in ordered {
        let (prefix, rewritten) = modifier.apply(&current);
        debug!(
            modifier = modifier.name(),
            order = modifier.order(),
            prefix_len = prefix.len(),
            "applied modifier"
        );
        tokens.extend(prefix);
        current = rewritten;
    }
    tokens.extend(render(&current)?);
    Ok(tokens)
}
