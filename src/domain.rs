//! Row representation shared by every pipeline stage.

use std::fmt;

/// A field value. `None` is an absent value (a JSON `null`), `Some("")` an empty one.
pub type FieldValue = Option<String>;

/// Ordered sequence of records; insertion order is source row order.
pub type Dataset = Vec<Record>;

/// One row of ingested data as an ordered field-name to value mapping.
///
/// Field names are unique within a record. Inserting a name that is already
/// present overwrites its value in place. Equality is structural and ignores
/// field order.
#[derive(Debug, Clone, Default, Eq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Insert or overwrite a field, returning the previous value if the name existed.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Value for `name`. The outer `Option` is field presence.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut FieldValue> {
        self.fields.iter_mut().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `name` is present with a non-empty value.
    pub fn has_value(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Some(v)) if !v.is_empty())
    }

    /// Order-independent view of the record, used as a hash key for deduplication.
    pub(crate) fn canonical_key(&self) -> Vec<(&str, Option<&str>)> {
        let mut key: Vec<_> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_deref()))
            .collect();
        key.sort_unstable();
        key
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .fields
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|ov| ov == v))
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match v {
                Some(v) => write!(f, "{k}={v}")?,
                None => write!(f, "{k}=null")?,
            }
        }
        write!(f, "}}")
    }
}

/// Build a record from `(name, text)` pairs. Handy for tests and fixtures.
pub fn record_of<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Record {
    pairs
        .into_iter()
        .map(|(k, v)| (k, Some(v.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut record = record_of([("a", "1"), ("b", "2")]);
        let previous = record.insert("a", Some("3".to_string()));

        assert_eq!(previous, Some(Some("1".to_string())));
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.get("a"), Some(&Some("3".to_string())));
    }

    #[test]
    fn test_equality_ignores_field_order() {
        let left = record_of([("name", "Ann"), ("age", "30")]);
        let right = record_of([("age", "30"), ("name", "Ann")]);
        assert_eq!(left, right);
        assert_eq!(left.canonical_key(), right.canonical_key());
    }

    #[test]
    fn test_equality_distinguishes_null_and_empty() {
        let mut null_age = record_of([("name", "Bob")]);
        null_age.insert("age", None);
        let empty_age = record_of([("name", "Bob"), ("age", "")]);
        assert_ne!(null_age, empty_age);
    }

    #[test]
    fn test_equality_requires_same_names() {
        let narrow = record_of([("name", "Ann")]);
        let wide = record_of([("name", "Ann"), ("age", "30")]);
        assert_ne!(narrow, wide);
        assert_ne!(wide, narrow);
    }

    #[test]
    fn test_has_value() {
        let mut record = record_of([("name", "Ann"), ("age", "")]);
        record.insert("city", None);
        assert!(record.has_value("name"));
        assert!(!record.has_value("age"));
        assert!(!record.has_value("city"));
        assert!(!record.has_value("missing"));
    }

    #[test]
    fn test_display() {
        let mut record = record_of([("name", "Ann")]);
        record.insert("age", None);
        assert_eq!(record.to_string(), "{name=Ann, age=null}");
    }
}
