use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::FormulaType;

/// Annotation of a tree that has not been type checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Untyped;

/// A type checked expression.
pub type TypedExpr = Expr<FormulaType>;

/// Expression AST.
///
/// Operators do not appear here: the builder turns them into
/// [`Expr::FunctionCall`] with the canonical function name. Every node carries
/// an annotation of type `A`, which is [`Untyped`] straight out of the builder
/// and [`FormulaType`] after type checking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr<A = Untyped> {
    /// Unescaped string literal
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// "it's"
    /// ```
    StringLiteral { value: String, formula_type: A },

    /// Whole number literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -7
    /// ```
    IntegerLiteral { value: i64, formula_type: A },

    /// Decimal literal. The scale is kept as written, so `1.50` has two
    /// decimal places.
    DecimalLiteral { value: Decimal, formula_type: A },

    /// `true` or `false`
    BooleanLiteral { value: bool, formula_type: A },

    /// A field of the current row, or of linked rows when `via_field_name` is
    /// set.
    ///
    /// # Examples
    /// ```text
    /// field('price')            → field_name "price", via None
    /// lookup('orders', 'total') → field_name "total", via Some("orders")
    /// ```
    FieldReference {
        field_name: String,
        via_field_name: Option<String>,
        formula_type: A,
    },

    /// Call of a registered function by its lowercase name.
    FunctionCall {
        function: String,
        args: Vec<Expr<A>>,
        formula_type: A,
    },
}

impl<A> Expr<A> {
    pub fn formula_type(&self) -> &A {
        match self {
            Expr::StringLiteral { formula_type, .. }
            | Expr::IntegerLiteral { formula_type, .. }
            | Expr::DecimalLiteral { formula_type, .. }
            | Expr::BooleanLiteral { formula_type, .. }
            | Expr::FieldReference { formula_type, .. }
            | Expr::FunctionCall { formula_type, .. } => formula_type,
        }
    }

    /// Direct sub-expressions.
    pub fn children(&self) -> &[Expr<A>] {
        match self {
            Expr::FunctionCall { args, .. } => args,
            _ => &[],
        }
    }

    /// A copy of this tree with every annotation dropped.
    pub fn to_untyped(&self) -> Expr<Untyped> {
        match self {
            Expr::StringLiteral { value, .. } => Expr::string(value.clone()),
            Expr::IntegerLiteral { value, .. } => Expr::integer(*value),
            Expr::DecimalLiteral { value, .. } => Expr::decimal(*value),
            Expr::BooleanLiteral { value, .. } => Expr::boolean(*value),
            Expr::FieldReference {
                field_name,
                via_field_name,
                ..
            } => Expr::FieldReference {
                field_name: field_name.clone(),
                via_field_name: via_field_name.clone(),
                formula_type: Untyped,
            },
            Expr::FunctionCall { function, args, .. } => {
                Expr::call(function.clone(), args.iter().map(Expr::to_untyped).collect())
            }
        }
    }
}

impl Expr<Untyped> {
    pub fn string(value: impl Into<String>) -> Self {
        Expr::StringLiteral {
            value: value.into(),
            formula_type: Untyped,
        }
    }

    pub fn integer(value: i64) -> Self {
        Expr::IntegerLiteral {
            value,
            formula_type: Untyped,
        }
    }

    pub fn decimal(value: Decimal) -> Self {
        Expr::DecimalLiteral {
            value,
            formula_type: Untyped,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Expr::BooleanLiteral {
            value,
            formula_type: Untyped,
        }
    }

    /// `field('name')`
    pub fn field(name: impl Into<String>) -> Self {
        Expr::FieldReference {
            field_name: name.into(),
            via_field_name: None,
            formula_type: Untyped,
        }
    }

    /// `lookup('via', 'target')`
    pub fn lookup(via: impl Into<String>, target: impl Into<String>) -> Self {
        Expr::FieldReference {
            field_name: target.into(),
            via_field_name: Some(via.into()),
            formula_type: Untyped,
        }
    }

    pub fn call(function: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::FunctionCall {
            function: function.into(),
            args,
            formula_type: Untyped,
        }
    }
}
