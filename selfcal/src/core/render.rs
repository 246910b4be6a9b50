//! Deterministic serialization of a [`Command`] to argv tokens.

use thiserror::Error;

use crate::core::command::Command;
use crate::core::scalar::ScalarValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The same key is both a flag and an option, so its meaning is ambiguous.
    #[error("key '{key}' is used both as a flag and as an option")]
    AmbiguousKey { key: String },
}

/// Render `command` as `<EXECUTABLE> <FLAGS> <OPTIONS> <POSITIONAL_ARGS>`.
///
/// Flags and option keys come out in lexicographic order; positional
/// arguments keep their original order.
pub fn render(command: &Command) -> Result<Vec<String>, RenderError> {
    if let Some(key) = command
        .flags()
        .iter()
        .find(|flag| command.options().contains_key(*flag))
    {
        return Err(RenderError::AmbiguousKey { key: key.clone() });
    }

    let syntax = command.syntax();
    let mut tokens = vec![command.executable().to_string()];
    tokens.extend(command.flags().iter().cloned());
    for (key, value) in command.options() {
        tokens.extend(syntax.render_option(key, value));
    }
    tokens.extend(command.positional_args().iter().map(ScalarValue::render));
    Ok(tokens)
}
