//! Decoded records: ordered parameter lists with renamed duplicates.

use std::collections::HashMap;

use enum_as_inner::EnumAsInner;
use itertools::Itertools;

/// A decoded parameter value.
///
/// `Num` covers codes, unsigned and signed integers and single bytes;
/// `Records` covers triplet lists, control-sequence lists and repeating
/// groups.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Value {
    Num(i64),
    Bytes(Vec<u8>),
    Text(String),
    Records(Vec<Record>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Num(x) => write!(f, "{}", x),
            Value::Text(x) => write!(f, "{}", x),
            Value::Bytes(x) => write!(f, "[{}]", x.iter().format(", ")),
            Value::Records(x) => write!(f, "<{} record(s)>", x.len()),
        }
    }
}

/// Tracks how many times each base parameter name has been used in a
/// record, so recurring names become `name-2`, `name-3`, ...
pub(crate) type NameCounters = HashMap<&'static str, u32>;

/// An ordered mapping from parameter name to decoded value.
///
/// Insertion order is the wire order of the parameters.  Non-fatal
/// exceptions collected in lenient mode ride along as `(code, message)`
/// pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    params: Vec<(String, Value)>,
    exceptions: Vec<(u8, String)>,
}

impl Record {
    pub fn new() -> Record {
        Record::default()
    }

    /// The value stored under `name`, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn num(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_num().copied()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_text().map(|s| s.as_str())
    }

    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name)?.as_bytes().map(|b| b.as_slice())
    }

    pub fn records(&self, name: &str) -> Option<&[Record]> {
        self.get(name)?.as_records().map(|r| r.as_slice())
    }

    /// Parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Non-fatal exceptions recorded while this record was parsed in
    /// lenient mode, as (MO:DCA code, message) pairs.
    pub fn exceptions(&self) -> &[(u8, String)] {
        &self.exceptions
    }

    pub(crate) fn push_exception(&mut self, code: u8, message: String) {
        self.exceptions.push((code, message));
    }

    /// Append a synthetic parameter (`SFLength`, `Tlength`, ...) without
    /// renaming.
    pub(crate) fn push(&mut self, name: &str, value: Value) {
        self.params.push((String::from(name), value));
    }

    /// Append a parameter, renaming it `name-2`, `name-3`, ... if the base
    /// name is already present.  Returns the name used.
    pub(crate) fn push_unique(
        &mut self,
        name: &'static str,
        value: Value,
        counters: &mut NameCounters,
    ) -> String {
        let unique_name = if !self.contains(name) {
            counters.insert(name, 1);
            String::from(name)
        } else {
            let count = counters.entry(name).or_insert(1);
            *count += 1;
            format!("{}-{}", name, count)
        };
        self.params.push((unique_name.clone(), value));
        unique_name
    }
}
