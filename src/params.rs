use crate::event::InputTag;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use winnow::ascii::{float, space0, space1, till_line_ending};
use winnow::combinator::{alt, delimited, opt, preceded, separated, terminated};
use winnow::token::{one_of, take_till, take_while};
use winnow::Parser;

/// A configuration value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<&str>> for Value {
    fn from(list: Vec<&str>) -> Self {
        Value::List(list.into_iter().map(String::from).collect())
    }
}

/// Types that can be read out of a [`Value`].
pub trait FromValue: Sized {
    /// Name used in error messages.
    const TYPE_NAME: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "double";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for Vec<String> {
    const TYPE_NAME: &'static str = "vstring";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(list) => Some(list.clone()),
            _ => None,
        }
    }
}

impl FromValue for InputTag {
    const TYPE_NAME: &'static str = "InputTag";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(InputTag::from(s.as_str())),
            _ => None,
        }
    }
}

/// Errors detected while reading a module configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required parameter `{0}`")]
    Missing(String),
    #[error("parameter `{name}` is not of type {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
    },
    #[error("invalid value for parameter `{name}`: {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    value: Value,
    tracked: bool,
}

/// Named configuration options of a module.
///
/// Parameters are either tracked (they define the module's behavior and are
/// required) or untracked (optional, read with a default).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSet {
    inner: BTreeMap<String, Entry>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }
    /// Adds a tracked parameter. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.insert_entry(name.into(), value.into(), true)
    }
    /// Adds an untracked parameter. Returns the previous value, if any.
    pub fn insert_untracked(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.insert_entry(name.into(), value.into(), false)
    }
    fn insert_entry(&mut self, name: String, value: Value, tracked: bool) -> Option<Value> {
        self.inner
            .insert(name, Entry { value, tracked })
            .map(|entry| entry.value)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }
    /// Reads a tracked parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use simana::params::{ConfigError, ParameterSet};
    ///
    /// let mut pset = ParameterSet::new();
    /// pset.insert("ptCut", 2.0);
    ///
    /// assert_eq!(pset.get::<f64>("ptCut"), Ok(2.0));
    /// assert!(matches!(pset.get::<bool>("ptCut"), Err(ConfigError::WrongType { .. })));
    /// assert!(matches!(pset.get::<f64>("EnergyMax"), Err(ConfigError::Missing(_))));
    /// ```
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ConfigError> {
        match self.inner.get(name) {
            Some(entry) if entry.tracked => convert(name, &entry.value),
            _ => Err(ConfigError::Missing(name.to_owned())),
        }
    }
    /// Reads an untracked parameter, falling back to `default` if it is not
    /// set.
    pub fn get_untracked_or<T: FromValue>(
        &self,
        name: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        match self.inner.get(name) {
            Some(entry) if !entry.tracked => convert(name, &entry.value),
            _ => Ok(default),
        }
    }
}

fn convert<T: FromValue>(name: &str, value: &Value) -> Result<T, ConfigError> {
    T::from_value(value).ok_or_else(|| ConfigError::WrongType {
        name: name.to_owned(),
        expected: T::TYPE_NAME,
    })
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| c.is_ascii_alphanumeric() || c == '_'),
    )
        .take()
        .parse_next(input)
}

fn string_literal(input: &mut &str) -> winnow::Result<String> {
    delimited('"', take_till(0.., '"'), '"')
        .map(String::from)
        .parse_next(input)
}

fn list(input: &mut &str) -> winnow::Result<Vec<String>> {
    delimited(
        ('[', space0),
        separated(0.., string_literal, (space0, ',', space0)),
        (space0, ']'),
    )
    .parse_next(input)
}

fn value(input: &mut &str) -> winnow::Result<Value> {
    alt((
        "true".value(Value::Bool(true)),
        "false".value(Value::Bool(false)),
        string_literal.map(Value::String),
        list.map(Value::List),
        float.map(Value::Number),
    ))
    .parse_next(input)
}

// `[untracked] name = value [# comment]`
fn entry(input: &mut &str) -> winnow::Result<(String, Entry)> {
    let _ = space0.parse_next(input)?;
    let tracked = opt(terminated("untracked", space1))
        .map(|prefix| prefix.is_none())
        .parse_next(input)?;
    let name = identifier.parse_next(input)?;
    let value = preceded((space0, '=', space0), value).parse_next(input)?;
    let _ = (space0, opt(('#', till_line_ending))).parse_next(input)?;

    Ok((name.to_owned(), Entry { value, tracked }))
}

/// The error type returned when parsing a [`ParameterSet`] fails.
#[derive(Debug)]
pub struct ParseError {
    message: &'static str,
    input: String,
    span: std::ops::Range<usize>,
}

impl ParseError {
    fn new(message: &'static str, input: &str, span: std::ops::Range<usize>) -> Self {
        Self {
            message,
            input: input.to_string(),
            span,
        }
    }
    /// Byte range of the offending text in the parsed input.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.span.clone()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snippet = annotate_snippets::Snippet::source(&self.input)
            .fold(true)
            .annotation(annotate_snippets::Level::Error.span(self.span.clone()));
        let message = annotate_snippets::Level::Error
            .title(self.message)
            .snippet(snippet);
        let renderer = annotate_snippets::Renderer::plain();
        let rendered = renderer.render(message);
        rendered.fmt(f)
    }
}

impl std::error::Error for ParseError {}

impl std::str::FromStr for ParameterSet {
    type Err = ParseError;

    /// Parse a [`ParameterSet`] from its text form: one `name = value` per
    /// line, optionally prefixed by `untracked`. Blank lines and lines
    /// starting with `#` are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use simana::params::ParameterSet;
    /// # use std::str::FromStr;
    /// let pset = ParameterSet::from_str(
    ///     r#"
    /// ## heavy-ion summary
    /// generators = ["generator", "hiSignal"]
    /// ptCut = 2.0
    /// DoGetData = false
    /// untracked moduleLabelTk = "g4SimHits"
    /// "#,
    /// )?;
    /// assert_eq!(pset.get::<f64>("ptCut")?, 2.0);
    /// assert_eq!(
    ///     pset.get_untracked_or("moduleLabelTk", String::new())?,
    ///     "g4SimHits"
    /// );
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut pset = Self::new();

        let mut start = 0;
        for line in input.split_inclusive('\n') {
            let line_start = start;
            start += line.len();

            let content = line.trim_end_matches(&['\n', '\r'][..]);
            let trimmed = content.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let line_end = line_start + content.len();

            let (name, entry) = entry.parse(content).map_err(|error| {
                let offset = line_start + error.offset();
                let span = if offset < line_end {
                    offset..line_end
                } else {
                    line_start..line_end
                };
                ParseError::new("invalid parameter starting here", input, span)
            })?;
            if pset.inner.contains_key(&name) {
                return Err(ParseError::new(
                    "duplicate parameter",
                    input,
                    line_start..line_end,
                ));
            }
            pset.inner.insert(name, entry);
        }

        Ok(pset)
    }
}
