//! Formula source output for expressions.
//!
//! Renders an [`Expr`] back into formula text that parses to an equal
//! expression. Two formats are available:
//!
//! - **Compact** via [`to_formula()`] - one line, no spaces
//! - **Pretty** via [`to_formula_pretty()`] - calls with nested calls are split
//!   over lines with 2-space indentation
//!
//! Operators are printed as the function calls they stand for, so `1 + 2`
//! comes back as `add(1,2)`.
//!
//! Strings are single-quoted unless the value only survives in double quotes.
//! A value neither quote style can hold fails with
//! [`FormulaError::UnprintableString`].
//!
//! # Examples
//!
//! ```
//! use formula_lang::Expr;
//! use formula_lang::output::{to_formula, to_formula_pretty};
//!
//! let expr = Expr::call("not", vec![Expr::call("isblank", vec![Expr::field("name")])]);
//!
//! assert_eq!(to_formula(&expr).unwrap(), "not(isblank(field('name')))");
//! assert_eq!(to_formula_pretty(&expr).unwrap(), "not(\n  isblank(field('name'))\n)");
//! ```

use crate::{
    ast::{Expr, QuoteStyle},
    error::{FormulaError, Result},
};

pub struct FormulaPrinter {
    pretty: bool,
}

impl FormulaPrinter {
    pub fn new(pretty: bool) -> Self {
        FormulaPrinter { pretty }
    }

    pub fn print<A>(&self, expr: &Expr<A>) -> Result<String> {
        self.print_expr(expr, 0)
    }

    fn print_expr<A>(&self, expr: &Expr<A>, indent: usize) -> Result<String> {
        Ok(match expr {
            Expr::StringLiteral { value, .. } => quote(value)?,
            Expr::IntegerLiteral { value, .. } => value.to_string(),
            Expr::DecimalLiteral { value, .. } => value.to_string(),
            Expr::BooleanLiteral { value, .. } => value.to_string(),
            Expr::FieldReference {
                field_name,
                via_field_name: None,
                ..
            } => format!("field({})", quote(field_name)?),
            Expr::FieldReference {
                field_name,
                via_field_name: Some(via),
                ..
            } => format!(
                "lookup({},{}{})",
                quote(via)?,
                self.space(),
                quote(field_name)?
            ),
            Expr::FunctionCall { function, args, .. } => {
                self.print_call(function, args, indent)?
            }
        })
    }

    fn print_call<A>(&self, function: &str, args: &[Expr<A>], indent: usize) -> Result<String> {
        let flat = args
            .iter()
            .all(|arg| !matches!(arg, Expr::FunctionCall { .. }));

        if !self.pretty || flat {
            let items = args
                .iter()
                .map(|arg| self.print_expr(arg, indent))
                .collect::<Result<Vec<_>>>()?;
            return Ok(format!(
                "{}({})",
                function,
                items.join(&format!(",{}", self.space()))
            ));
        }

        let mut result = format!("{}(\n", function);
        let items = args
            .iter()
            .map(|arg| {
                Ok(format!(
                    "{}{}",
                    self.indent(indent + 1),
                    self.print_expr(arg, indent + 1)?
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        result.push_str(&items.join(",\n"));
        result.push('\n');
        result.push_str(&self.indent(indent));
        result.push(')');
        Ok(result)
    }

    fn space(&self) -> &'static str {
        if self.pretty { " " } else { "" }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

/// Whether `value` survives a trip through `quote` characters: the escaped
/// text must lex as one literal body and unescape back to `value`.
fn fits(value: &str, quote: QuoteStyle) -> bool {
    let q = quote.char();
    let raw = escape_string(value, quote);
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if chars.next().is_none() {
                return false;
            }
        } else if c == q {
            return false;
        }
    }
    raw.replace(&format!("\\{}", q), &q.to_string()) == value
}

/// `value` as a literal, preferring single quotes.
pub fn quote(value: &str) -> Result<String> {
    [QuoteStyle::Single, QuoteStyle::Double]
        .into_iter()
        .find(|style| fits(value, *style))
        .map(|style| {
            let q = style.char();
            format!("{q}{}{q}", escape_string(value, style))
        })
        .ok_or_else(|| FormulaError::UnprintableString {
            value: value.to_string(),
        })
}

/// Escapes every occurrence of the quote character with a backslash.
pub fn escape_string(value: &str, quote: QuoteStyle) -> String {
    let q = quote.char();
    value.replace(q, &format!("\\{}", q))
}

/// Compact formula text.
pub fn to_formula<A>(expr: &Expr<A>) -> Result<String> {
    FormulaPrinter::new(false).print(expr)
}

/// Formula text with nested calls split over indented lines.
pub fn to_formula_pretty<A>(expr: &Expr<A>) -> Result<String> {
    FormulaPrinter::new(true).print(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_single_quotes() {
        assert_eq!(to_formula(&Expr::string("it's")).unwrap(), r"'it\'s'");
    }

    #[test]
    fn test_backslash_before_quote_switches_style() {
        assert_eq!(quote(r"x\'y").unwrap(), r#""x\'y""#);
        assert_eq!(quote(r#"say "hi" \'x\'"#).unwrap(), r#""say \"hi\" \'x\'""#);
        assert_eq!(quote(r"a\nb").unwrap(), r"'a\nb'");
        assert_eq!(quote(r"a\\").unwrap(), r"'a\\'");
        assert_eq!(quote(r"\\'").unwrap(), r"'\\\''");
    }

    #[test]
    fn test_unprintable_values() {
        assert_eq!(
            quote(r#"\'\""#).unwrap_err(),
            FormulaError::UnprintableString {
                value: r#"\'\""#.to_string()
            }
        );
        assert!(quote(r"ends\").is_err());
        assert!(to_formula(&Expr::field(r"a\")).is_err());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(
            to_formula(&Expr::lookup("orders", "total")).unwrap(),
            "lookup('orders','total')"
        );
        assert_eq!(
            to_formula_pretty(&Expr::lookup("orders", "total")).unwrap(),
            "lookup('orders', 'total')"
        );
    }

    #[test]
    fn test_pretty_keeps_flat_calls_on_one_line() {
        let expr = Expr::call("add", vec![Expr::integer(1), Expr::integer(2)]);
        assert_eq!(to_formula_pretty(&expr).unwrap(), "add(1, 2)");
    }

    #[test]
    fn test_pretty_nested() {
        let expr = Expr::call(
            "concat",
            vec![
                Expr::call("upper", vec![Expr::field("a")]),
                Expr::string("-"),
            ],
        );
        assert_eq!(
            to_formula_pretty(&expr).unwrap(),
            "concat(\n  upper(field('a')),\n  '-'\n)"
        );
    }
}
