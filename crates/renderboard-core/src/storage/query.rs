use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::lenient;

/// Per-field condition. Only equality and set membership are supported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Eq(Value),
    In(Vec<Value>),
}

impl Condition {
    pub fn matches(&self, v: Option<&Value>) -> bool {
        match self {
            Condition::Eq(expected) => v == Some(expected),
            Condition::In(options) => v.is_some_and(|v| options.contains(v)),
        }
    }
}

/// Dotted field path → condition. All conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filter {
    conditions: BTreeMap<String, Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(path.into(), Condition::Eq(value.into()));
        self
    }

    pub fn is_in<V: Into<Value>>(
        mut self,
        path: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions.insert(path.into(), Condition::In(values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// In-memory evaluation, for stores that cannot push the filter down.
    pub fn matches(&self, doc: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(path, cond)| cond.matches(lenient::get_path(doc, path)))
    }
}

/// Allow-list of dotted field paths. An empty projection keeps whole documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    paths: Vec<String>,
}

impl Projection {
    pub fn new<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Copies the allow-listed paths into a fresh document, preserving nesting.
    pub fn apply(&self, doc: &Value) -> Value {
        if self.paths.is_empty() {
            return doc.clone();
        }
        let mut out = Value::Object(Map::new());
        for path in &self.paths {
            if let Some(v) = lenient::get_path(doc, path) {
                insert_path(&mut out, path, v.clone());
            }
        }
        out
    }
}

fn insert_path(out: &mut Value, path: &str, v: Value) {
    let mut cur = out;
    let mut keys = path.split('.').peekable();
    while let Some(key) = keys.next() {
        let Value::Object(map) = cur else {
            return;
        };
        if keys.peek().is_none() {
            map.insert(key.to_string(), v);
            return;
        }
        cur = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    /// Zero disables the deadline.
    pub max_time: Duration,
    pub limit: Option<u32>,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            max_time: Duration::from_millis(crate::constants::DEFAULT_MAX_TIME_MS),
            limit: None,
        }
    }
}
