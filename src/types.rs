//! The formula type lattice.
//!
//! Every node of a checked expression carries a [`FormulaType`]. Two members
//! are special:
//!
//! - [`FormulaType::Untyped`] stands for a value whose type is not known yet
//!   (for example a field the schema could not type). It passes every argument
//!   rule.
//! - [`FormulaType::Error`] marks a subtree that failed to type without being
//!   fatal, such as a reference to a deleted field. It absorbs: a call with an
//!   error-typed argument is itself error-typed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound on decimal places a number type can carry.
pub const NUMBER_MAX_DECIMAL_PLACES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaType {
    Untyped,
    Error { message: String },
    Text,
    Number { decimal_places: u32 },
    Boolean,
    Date { include_time: bool },
    Duration,
    Link,
    /// A list value held by a single field (e.g. a multiple select).
    Array { element: Box<FormulaType> },
    /// The many values reached by following a link field. Only aggregate
    /// functions accept these.
    Lookup { element: Box<FormulaType> },
}

impl FormulaType {
    pub fn error(message: impl Into<String>) -> Self {
        FormulaType::Error {
            message: message.into(),
        }
    }

    pub fn number(decimal_places: u32) -> Self {
        FormulaType::Number {
            decimal_places: decimal_places.min(NUMBER_MAX_DECIMAL_PLACES),
        }
    }

    pub fn date() -> Self {
        FormulaType::Date {
            include_time: false,
        }
    }

    pub fn date_time() -> Self {
        FormulaType::Date { include_time: true }
    }

    pub fn array(element: FormulaType) -> Self {
        FormulaType::Array {
            element: Box::new(element),
        }
    }

    /// Wraps `element` as the result of a lookup. Error and untyped values
    /// stay as they are, and an existing lookup is not wrapped twice.
    pub fn lookup(element: FormulaType) -> Self {
        match element {
            FormulaType::Untyped | FormulaType::Error { .. } | FormulaType::Lookup { .. } => {
                element
            }
            other => FormulaType::Lookup {
                element: Box::new(other),
            },
        }
    }

    /// The concrete kind, or `None` for untyped and error types.
    pub fn kind(&self) -> Option<TypeKind> {
        Some(match self {
            FormulaType::Untyped | FormulaType::Error { .. } => return None,
            FormulaType::Text => TypeKind::Text,
            FormulaType::Number { .. } => TypeKind::Number,
            FormulaType::Boolean => TypeKind::Boolean,
            FormulaType::Date { .. } => TypeKind::Date,
            FormulaType::Duration => TypeKind::Duration,
            FormulaType::Link => TypeKind::Link,
            FormulaType::Array { .. } => TypeKind::Array,
            FormulaType::Lookup { .. } => TypeKind::Lookup,
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FormulaType::Error { .. })
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, FormulaType::Untyped)
    }

    pub fn decimal_places(&self) -> Option<u32> {
        match self {
            FormulaType::Number { decimal_places } => Some(*decimal_places),
            _ => None,
        }
    }

    /// Element type of an array or lookup.
    pub fn element(&self) -> Option<&FormulaType> {
        match self {
            FormulaType::Array { element } | FormulaType::Lookup { element } => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for FormulaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaType::Untyped => write!(f, "untyped"),
            FormulaType::Error { .. } => write!(f, "invalid"),
            FormulaType::Array { element } => write!(f, "array of {}", element),
            FormulaType::Lookup { element } => write!(f, "lookup of {}", element),
            other => match other.kind() {
                Some(kind) => write!(f, "{}", kind),
                None => Ok(()),
            },
        }
    }
}

/// Parameter-free discriminant of a [`FormulaType`], used by argument rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Text,
    Number,
    Boolean,
    Date,
    Duration,
    Link,
    Array,
    Lookup,
}

impl TypeKind {
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Text => "text",
            TypeKind::Number => "number",
            TypeKind::Boolean => "boolean",
            TypeKind::Date => "date",
            TypeKind::Duration => "duration",
            TypeKind::Link => "link",
            TypeKind::Array => "array",
            TypeKind::Lookup => "lookup",
        }
    }

    /// Kinds allowed as the second operand when `self` is the first operand
    /// of an operation with the given relation.
    pub fn related(self, relation: Relation) -> &'static [TypeKind] {
        use Relation::*;
        use TypeKind::*;

        match (self, relation) {
            (Text, Comparable) => &[Text, Number, Boolean, Date, Link],
            (Text, LimitComparable) => &[Text, Link],
            (Text, Addable) => &[Text],

            (Number, Comparable) => &[Number, Text],
            (Number, LimitComparable | Addable | Subtractable | Dividable) => &[Number],
            (Number, Multipliable) => &[Number, Duration],

            (Boolean, Comparable) => &[Boolean, Text],

            (Date, Comparable) => &[Date, Text],
            (Date, LimitComparable) => &[Date],
            (Date, Addable) => &[Duration],
            (Date, Subtractable) => &[Date, Duration],

            (Duration, Comparable | LimitComparable | Subtractable) => &[Duration],
            (Duration, Addable) => &[Duration, Date],
            (Duration, Multipliable | Dividable) => &[Number],

            (Link, Comparable) => &[Link, Text],

            _ => &[],
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the second operand of a binary operation relates to the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Addable,
    Subtractable,
    Multipliable,
    Dividable,
    /// `=` and `!=`
    Comparable,
    /// `<`, `>`, `<=`, `>=`
    LimitComparable,
}

/// What an argument position would have accepted, reported in type errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "expected", content = "kinds", rename_all = "snake_case")]
pub enum ExpectedType {
    /// Any single value; lookups must be aggregated first.
    Value,
    OneOf(Vec<TypeKind>),
    /// A lookup whose elements are one of these kinds (any kind when empty).
    LookupOf(Vec<TypeKind>),
}

fn join_kinds(kinds: &[TypeKind]) -> String {
    kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(",")
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedType::Value => write!(
                f,
                "only a single value can be used here, wrap lookups in an aggregate function such as sum"
            ),
            ExpectedType::OneOf(kinds) if kinds.is_empty() => {
                write!(f, "there are no possible types usable here")
            }
            ExpectedType::OneOf(kinds) => write!(
                f,
                "the only usable types for this argument are {}",
                join_kinds(kinds)
            ),
            ExpectedType::LookupOf(kinds) if kinds.is_empty() => {
                write!(f, "this argument must be a lookup")
            }
            ExpectedType::LookupOf(kinds) => {
                write!(f, "this argument must be a lookup of {}", join_kinds(kinds))
            }
        }
    }
}
