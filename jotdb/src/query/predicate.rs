use crate::collection::Document;
use crate::common::Value;
use crate::errors::{ErrorKind, JotError, JotResult};
use std::fmt::{Display, Formatter};

/// A conjunctive field-equality predicate for querying a collection.
///
/// A predicate matches a document when every listed field compares equal to
/// the given value. Comparison is loose: numeric strings compare equal to
/// numbers, so `pred!{ user_id: "42" }` matches a record storing `42`.
///
/// Predicates are built with the chaining [Predicate::field] method or the
/// [pred!](crate::pred) macro. An empty predicate matches every document.
///
/// # Examples
///
/// ```ignore
/// let active_by_user = Predicate::new()
///     .field("user_id", user_id)
///     .field("is_active", true);
/// let results = posts.find(&active_by_user)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    fields: Vec<(String, Value)>,
    error: Option<JotError>,
}

impl Predicate {
    /// Creates an empty predicate that matches every document.
    pub fn new() -> Self {
        Predicate {
            fields: Vec::new(),
            error: None,
        }
    }

    /// Adds a field-equality condition to the predicate.
    ///
    /// Invalid input (an empty field name) is captured and reported when the
    /// predicate is evaluated, so chained construction stays fluent.
    pub fn field<T: Into<Value>>(mut self, name: impl Into<String>, value: T) -> Self {
        let name = name.into();
        if name.is_empty() && self.error.is_none() {
            self.error = Some(JotError::new(
                "Predicate field name cannot be empty",
                ErrorKind::ValidationError,
            ));
            return self;
        }
        self.fields.push((name, value.into()));
        self
    }

    /// Returns true if the predicate has no conditions.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Surfaces any construction error captured during chaining.
    pub fn validate(&self) -> JotResult<()> {
        match &self.error {
            Some(err) => {
                log::error!("Invalid predicate: {}", err);
                Err(JotError::new_with_cause(
                    "Invalid predicate",
                    ErrorKind::ValidationError,
                    err.clone(),
                ))
            }
            None => Ok(()),
        }
    }

    /// Evaluates the predicate against a document. A document missing one of
    /// the predicate's fields never matches.
    pub fn matches(&self, document: &Document) -> bool {
        self.fields
            .iter()
            .all(|(name, value)| document.has_field(name) && document.get(name).loose_eq(value))
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            write!(f, "{} == {}", name, value)?;
        }
        write!(f, ")")
    }
}

/// Creates a [Predicate](crate::query::Predicate) with JSON-like syntax.
///
/// # Examples
///
/// ```ignore
/// let p = pred!{ user_id: "5f3a2b1c", is_active: true };
/// assert!(p.matches(&doc));
/// ```
#[macro_export]
macro_rules! pred {
    () => {
        $crate::query::Predicate::new()
    };

    ($($key:tt : $value:expr),* $(,)?) => {
        {
            let mut predicate = $crate::query::Predicate::new();
            $(
                predicate = predicate.field(
                    $crate::collection::normalize(stringify!($key)),
                    $value,
                );
            )*
            predicate
        }
    };
}
