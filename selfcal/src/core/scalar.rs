//! Scalar argument values and their canonical string rendering.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single argument value.
///
/// Paths are tracked as their own variant so that modifiers can find them
/// structurally instead of guessing from string shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalarRepr", into = "ScalarRepr")]
pub enum ScalarValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    Path(PathBuf),
}

impl ScalarValue {
    /// Canonical rendering used for both positional arguments and option values.
    pub fn render(&self) -> String {
        match self {
            ScalarValue::Str(value) => value.clone(),
            ScalarValue::Bool(value) => value.to_string(),
            ScalarValue::Int(value) => value.to_string(),
            ScalarValue::Float(value) => render_float(*value),
            ScalarValue::Path(path) => render_path(path),
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ScalarValue::Path(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Plain decimal, never exponent form. Integral values keep a trailing `.0`.
/// Non-finite values render as `NaN`, `inf` and `-inf`.
fn render_float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Render a path with forward slashes, dropping `.` segments and repeated
/// separators. `..` is kept: normalization never touches the filesystem.
pub fn render_path(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            Component::CurDir => {}
            Component::ParentDir => push_segment(&mut out, ".."),
            Component::Normal(segment) => push_segment(&mut out, &segment.to_string_lossy()),
        }
    }
    if out.is_empty() {
        out.push('.');
    }
    out
}

fn push_segment(out: &mut String, segment: &str) {
    if !out.is_empty() && !out.ends_with('/') {
        out.push('/');
    }
    out.push_str(segment);
}

/// On-disk form of a scalar: JSON/TOML primitives, with paths spelled as
/// `{"path": "..."}` so they stay distinguishable from plain strings.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ScalarRepr {
    Bool(bool),
    Int(i64),
    Unsigned(u64),
    Float(f64),
    Path { path: PathBuf },
    Str(String),
}

impl TryFrom<ScalarRepr> for ScalarValue {
    type Error = String;

    fn try_from(repr: ScalarRepr) -> Result<Self, Self::Error> {
        Ok(match repr {
            ScalarRepr::Bool(value) => ScalarValue::Bool(value),
            ScalarRepr::Int(value) => ScalarValue::Int(value),
            ScalarRepr::Unsigned(value) => {
                return Err(format!("integer {value} is out of range for a signed 64-bit value"));
            }
            ScalarRepr::Float(value) => ScalarValue::Float(value),
            ScalarRepr::Path { path } => ScalarValue::Path(path),
            ScalarRepr::Str(value) => ScalarValue::Str(value),
        })
    }
}

impl From<ScalarValue> for ScalarRepr {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Bool(value) => ScalarRepr::Bool(value),
            ScalarValue::Int(value) => ScalarRepr::Int(value),
            ScalarValue::Float(value) => ScalarRepr::Float(value),
            ScalarValue::Path(path) => ScalarRepr::Path { path },
            ScalarValue::Str(value) => ScalarRepr::Str(value),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Str(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Str(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int(i64::from(value))
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int(value)
    }
}

impl From<u32> for ScalarValue {
    fn from(value: u32) -> Self {
        ScalarValue::Int(i64::from(value))
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<PathBuf> for ScalarValue {
    fn from(value: PathBuf) -> Self {
        ScalarValue::Path(value)
    }
}

impl From<&Path> for ScalarValue {
    fn from(value: &Path) -> Self {
        ScalarValue::Path(value.to_path_buf())
    }
}
