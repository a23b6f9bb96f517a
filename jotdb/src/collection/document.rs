use im::OrdMap;
use smallvec::SmallVec;

use crate::collection::RecordId;
use crate::common::{Value, FIELD_CREATED_AT, FIELD_ID, FIELD_UPDATED_AT};
use crate::errors::{ErrorKind, JotError, JotResult};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};

type FieldVec = SmallVec<[String; 8]>;

/// Represents a schemaless record in a jotdb collection.
///
/// A jotdb document is composed of key-value pairs. The key is always a
/// [String] and the value is a [Value]. Keys are kept in a deterministic order,
/// so serialization and iteration are stable across runs.
///
/// Below fields are reserved and managed by the collection store:
///
/// * `id` - The unique identifier of the record, assigned at insert time. It
///   cannot be set manually.
/// * `created_at` - Timestamp set once at insert.
/// * `updated_at` - Timestamp refreshed on every update.
///
/// ## Lock-Free Design
///
/// This struct uses `im::OrdMap` (a persistent ordered map) for lock-free operation:
/// - O(1) cloning via internal Arc sharing
/// - Mutations create new maps via structural sharing
/// - Each mutated document is completely independent
#[derive(Clone, PartialEq, Default)]
pub struct Document {
    /// Persistent ordered map: O(1) clone via internal Arc, O(log n) mutations
    data: OrdMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = Document::new();
    /// assert!(doc.is_empty());
    /// assert_eq!(doc.size(), 0);
    /// ```
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    /// Checks if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of fields in the document.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified key in this document.
    ///
    /// This method inserts a key-value pair into the document. If the key already
    /// exists, its value is updated.
    ///
    /// # Arguments
    ///
    /// * `key` - The field name. Cannot be empty.
    /// * `value` - The value to associate with the key. Can be any type that
    ///   implements `Into<Value>` (primitives, strings, documents, arrays, etc.).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * The key is empty
    /// * The key is the reserved `id` field, which is assigned by the store
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("name", "Alice")?;
    /// doc.put("age", 30i64)?;
    /// assert_eq!(doc.size(), 2);
    /// ```
    pub fn put<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) -> JotResult<()> {
        let key = key.into();
        // key cannot be empty
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(JotError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        if key == FIELD_ID {
            log::error!("Record id is an auto generated field and cannot be set manually");
            return Err(JotError::new(
                "Record id is an auto generated field and cannot be set manually",
                ErrorKind::InvalidOperation,
            ));
        }

        self.data.insert(key, value.into());
        Ok(())
    }

    /// Inserts a field without the reserved-field guard. Used by the collection
    /// store to stamp `id` and by deserialization.
    pub(crate) fn put_unchecked<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), value.into());
    }

    /// Returns the [Value] associated with the specified key, or [Value::Null]
    /// if this document contains no mapping for the key.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = doc!{ name: "Alice", age: 30 };
    /// assert_eq!(doc.get("name"), Value::String("Alice".to_string()));
    /// assert!(doc.get("missing").is_null());
    /// ```
    pub fn get(&self, key: &str) -> Value {
        self.data.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Checks whether the document contains the specified field.
    pub fn has_field(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes the field with the specified key from the document, if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Merges another document into this one with shallow field overwrite.
    ///
    /// Every field of `other` replaces the corresponding field of this document;
    /// fields absent from `other` are left untouched. The reserved `id` field is
    /// never overwritten, so a record keeps its identity across updates. Partial
    /// field removal is not supported; use [Document::remove] for that.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.iter() {
            if key == FIELD_ID {
                continue;
            }
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Returns the record id of this document.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidId] if the document has not been inserted yet
    /// or the stored id is not a valid [RecordId].
    pub fn id(&self) -> JotResult<RecordId> {
        match self.get(FIELD_ID) {
            Value::String(id) => RecordId::parse(&id),
            _ => {
                log::error!("Document has no id; it has not been inserted into a collection");
                Err(JotError::new(
                    "Document has no id; it has not been inserted into a collection",
                    ErrorKind::InvalidId,
                ))
            }
        }
    }

    /// Returns the `created_at` timestamp, if the record has been inserted.
    pub fn created_at(&self) -> Option<String> {
        match self.get(FIELD_CREATED_AT) {
            Value::String(ts) => Some(ts),
            _ => None,
        }
    }

    /// Returns the `updated_at` timestamp, if the record has been inserted.
    pub fn updated_at(&self) -> Option<String> {
        match self.get(FIELD_UPDATED_AT) {
            Value::String(ts) => Some(ts),
            _ => None,
        }
    }

    /// Returns all field names of the document.
    pub fn fields(&self) -> FieldVec {
        self.data.keys().cloned().collect()
    }

    /// Iterates over the fields of the document in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{{}}"),
        }
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.data.len()))?;
        for (key, value) in self.data.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Document, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut document = Document::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            document.put_unchecked(key, value);
        }
        Ok(document)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Document, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Strips surrounding quotes from macro keys so both `name` and `"name"` work.
pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a jotdb Document with JSON-like syntax.
///
/// # Examples
///
/// ```rust
/// use jotdb::doc;
///
/// // Empty document
/// let empty = doc!{};
///
/// // Simple key-value pairs
/// let simple = doc!{
///     name: "Alice",
///     age: 30,
///     active: true,
/// };
///
/// // Nested documents and arrays
/// let nested = doc!{
///     title: "how to cook",
///     trigger_questions: ["what ingredients do I need"],
///     author: { username: "alice" },
/// };
/// ```
#[macro_export]
macro_rules! doc {
    // match an empty document (with braces for backward compat)
    ({}) => {
        $crate::collection::Document::new()
    };

    // match an empty document (new syntax)
    () => {
        $crate::collection::Document::new()
    };

    // match a document with key value pairs (old syntax with outer braces)
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    // match a document with key value pairs (new syntax without outer braces)
    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! doc_value {
    // match a nested document
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    // match an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    // match an expression (variable, function call, literals, etc.)
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
