//! Typed model of a single tool invocation.
//!
//! A [`Command`] is a value: builders consume and return it, modifiers clone
//! it before rewriting. Flags and options live in ordered collections, so
//! equality ignores insertion order and iteration is already sorted.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::scalar::ScalarValue;

/// Option syntax understood by the wrapped tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// `-key v1 v2 ...`, one token per value element (WSClean).
    Imaging,
    /// `key=value` or `key=[v1,v2,...]` as a single token (DP3).
    Calibration,
}

impl Syntax {
    /// Render one option as argv tokens.
    pub fn render_option(self, key: &str, value: &OptionValue) -> Vec<String> {
        match self {
            Syntax::Imaging => {
                let mut tokens = vec![key.to_string()];
                tokens.extend(value.scalars().map(ScalarValue::render));
                tokens
            }
            Syntax::Calibration => {
                let rendered = match value {
                    OptionValue::Scalar(scalar) => scalar.render(),
                    OptionValue::List(items) => {
                        let csv: Vec<String> = items.iter().map(ScalarValue::render).collect();
                        format!("[{}]", csv.join(","))
                    }
                };
                vec![format!("{key}={rendered}")]
            }
        }
    }
}

/// Value attached to an option key.
// `List` is tried first when deserializing: a one-element array would
// otherwise also match the `{"path": ...}` scalar form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    List(Vec<ScalarValue>),
    Scalar(ScalarValue),
}

impl OptionValue {
    pub fn scalars(&self) -> impl Iterator<Item = &ScalarValue> {
        let items: &[ScalarValue] = match self {
            OptionValue::Scalar(scalar) => std::slice::from_ref(scalar),
            OptionValue::List(items) => items,
        };
        items.iter()
    }

    fn map_scalars(self, f: &mut impl FnMut(ScalarValue) -> ScalarValue) -> Self {
        match self {
            OptionValue::Scalar(scalar) => OptionValue::Scalar(f(scalar)),
            OptionValue::List(items) => OptionValue::List(items.into_iter().map(f).collect()),
        }
    }
}

macro_rules! option_value_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for OptionValue {
                fn from(value: $ty) -> Self {
                    OptionValue::Scalar(value.into())
                }
            }
        )*
    };
}

option_value_from_scalar!(&str, String, bool, i32, i64, u32, f64, PathBuf, &Path);

impl From<ScalarValue> for OptionValue {
    fn from(value: ScalarValue) -> Self {
        OptionValue::Scalar(value)
    }
}

impl<T: Into<ScalarValue>> From<Vec<T>> for OptionValue {
    fn from(items: Vec<T>) -> Self {
        OptionValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ScalarValue>, const N: usize> From<[T; N]> for OptionValue {
    fn from(items: [T; N]) -> Self {
        OptionValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<ScalarValue>, B: Into<ScalarValue>> From<(A, B)> for OptionValue {
    fn from((a, b): (A, B)) -> Self {
        OptionValue::List(vec![a.into(), b.into()])
    }
}

/// One tool invocation: executable, flags, options and positional arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Command {
    syntax: Syntax,
    executable: String,
    #[serde(default)]
    positional_args: Vec<ScalarValue>,
    #[serde(default)]
    flags: BTreeSet<String>,
    #[serde(default)]
    options: BTreeMap<String, OptionValue>,
}

impl Command {
    pub fn new(syntax: Syntax, executable: impl Into<String>) -> Self {
        Self {
            syntax,
            executable: executable.into(),
            positional_args: Vec::new(),
            flags: BTreeSet::new(),
            options: BTreeMap::new(),
        }
    }

    /// Imaging-style command (`-key v1 v2`).
    pub fn imaging(executable: impl Into<String>) -> Self {
        Self::new(Syntax::Imaging, executable)
    }

    /// Calibration-style command (`key=value`).
    pub fn calibration(executable: impl Into<String>) -> Self {
        Self::new(Syntax::Calibration, executable)
    }

    /// Append a positional argument. Positional order is preserved on render.
    pub fn arg(mut self, value: impl Into<ScalarValue>) -> Self {
        self.positional_args.push(value.into());
        self
    }

    pub fn args<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ScalarValue>,
    {
        self.positional_args
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Add a presence-only switch. Adding the same flag twice is a no-op.
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Set an option, replacing any previous value for `key`.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Rewrite every scalar (positional arguments first, then option values in
    /// key order). Flags are untouched.
    pub fn map_scalars(mut self, mut f: impl FnMut(ScalarValue) -> ScalarValue) -> Self {
        self.positional_args = self
            .positional_args
            .into_iter()
            .map(&mut f)
            .collect();
        self.options = self
            .options
            .into_iter()
            .map(|(key, value)| (key, value.map_scalars(&mut f)))
            .collect();
        self
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn positional_args(&self) -> &[ScalarValue] {
        &self.positional_args
    }

    /// Flags in lexicographic order.
    pub fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    /// Options in lexicographic key order.
    pub fn options(&self) -> &BTreeMap<String, OptionValue> {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_flag_and_option_insertion_order() {
        let a = Command::imaging("wsclean")
            .flag("-multiscale")
            .flag("-join-channels")
            .option("-niter", 42)
            .option("-name", "final");
        let b = Command::imaging("wsclean")
            .flag("-join-channels")
            .flag("-multiscale")
            .option("-name", "final")
            .option("-niter", 42);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_respects_positional_order() {
        let a = Command::imaging("wsclean").arg(Path::new("/a.ms")).arg(Path::new("/b.ms"));
        let b = Command::imaging("wsclean").arg(Path::new("/b.ms")).arg(Path::new("/a.ms"));
        assert_ne!(a, b);
    }

    #[test]
    fn equality_distinguishes_syntax() {
        assert_ne!(Command::imaging("tool"), Command::calibration("tool"));
    }

    #[test]
    fn imaging_option_emits_key_then_each_value() {
        let tokens = Syntax::Imaging.render_option("-size", &OptionValue::from((8192, 4096)));
        assert_eq!(tokens, vec!["-size", "8192", "4096"]);
    }

    #[test]
    fn calibration_option_emits_single_token() {
        let list = OptionValue::from(vec![PathBuf::from("/a.ms"), PathBuf::from("/b.ms")]);
        assert_eq!(
            Syntax::Calibration.render_option("msin", &list),
            vec!["msin=[/a.ms,/b.ms]"]
        );
        assert_eq!(
            Syntax::Calibration.render_option("gaincal.applysolution", &true.into()),
            vec!["gaincal.applysolution=true"]
        );
        let empty = OptionValue::List(Vec::new());
        assert_eq!(Syntax::Calibration.render_option("steps", &empty), vec!["steps=[]"]);
    }

    #[test]
    fn option_replaces_previous_value() {
        let cmd = Command::imaging("wsclean")
            .option("-niter", 1)
            .option("-niter", 2);
        assert_eq!(cmd.options().get("-niter"), Some(&OptionValue::from(2)));
    }

    #[test]
    fn map_scalars_visits_positionals_and_option_lists() {
        let cmd = Command::calibration("DP3")
            .option("msin", vec![PathBuf::from("/a.ms"), PathBuf::from("/b.ms")])
            .option("steps", Vec::<String>::new())
            .arg(Path::new("/c.ms"));
        let mut seen = Vec::new();
        let _ = cmd.map_scalars(|scalar| {
            seen.push(scalar.render());
            scalar
        });
        assert_eq!(seen, vec!["/c.ms", "/a.ms", "/b.ms"]);
    }

    #[test]
    fn command_parses_from_json_description() {
        let raw = r#"{
            "syntax": "calibration",
            "executable": "DP3",
            "options": {
                "msin": [{"path": "/a.ms"}, {"path": "/b.ms"}],
                "msout": {"path": "/out.ms"},
                "steps": []
            }
        }"#;
        let parsed: Command = serde_json::from_str(raw).expect("parse command");
        let expected = Command::calibration("DP3")
            .option("msin", vec![PathBuf::from("/a.ms"), PathBuf::from("/b.ms")])
            .option("msout", PathBuf::from("/out.ms"))
            .option("steps", Vec::<String>::new());
        assert_eq!(parsed, expected);
    }
}
