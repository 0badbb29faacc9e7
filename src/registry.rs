//! Function registry: the table of callable functions, their arity and typing
//! rules.
//!
//! A registry is built once and only read afterwards. Callers pass it by
//! reference into the builder and the type checker, so tests and embedders
//! can compile against a custom catalogue.

use std::{collections::HashMap, fmt};

use serde::Serialize;

use crate::types::{ExpectedType, FormulaType, Relation, TypeKind};

/// Number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgCount {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl ArgCount {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            ArgCount::Exactly(n) => count == n,
            ArgCount::AtLeast(min) => count >= min,
            ArgCount::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

fn arguments(n: usize) -> &'static str {
    if n == 1 { "argument" } else { "arguments" }
}

impl fmt::Display for ArgCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ArgCount::Exactly(0) => write!(f, "no arguments"),
            ArgCount::Exactly(n) => write!(f, "exactly {} {}", n, arguments(n)),
            ArgCount::AtLeast(n) => write!(f, "at least {} {}", n, arguments(n)),
            ArgCount::Between(min, max) => write!(f, "between {} and {} arguments", min, max),
        }
    }
}

/// Type rule for one argument position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgRule {
    /// Any single value. Lookups are rejected.
    Any,
    OneOf(&'static [TypeKind]),
    /// A lookup whose element kind is listed; an empty list accepts any lookup.
    LookupOf(&'static [TypeKind]),
    /// Allowed kinds follow from the first argument's type.
    Operand(Relation),
}

impl ArgRule {
    /// Checks `actual` against this rule. `first` is the type of argument 0.
    pub fn check(&self, actual: &FormulaType, first: Option<&FormulaType>) -> Result<(), ExpectedType> {
        let Some(kind) = actual.kind() else {
            return Ok(());
        };

        match *self {
            ArgRule::Any if kind == TypeKind::Lookup => Err(ExpectedType::Value),
            ArgRule::Any => Ok(()),
            ArgRule::OneOf(kinds) if kinds.contains(&kind) => Ok(()),
            ArgRule::OneOf(kinds) => Err(ExpectedType::OneOf(kinds.to_vec())),
            ArgRule::LookupOf(kinds) => match actual {
                FormulaType::Lookup { element } => match element.kind() {
                    Some(inner) if !kinds.is_empty() && !kinds.contains(&inner) => {
                        Err(ExpectedType::LookupOf(kinds.to_vec()))
                    }
                    _ => Ok(()),
                },
                _ => Err(ExpectedType::LookupOf(kinds.to_vec())),
            },
            ArgRule::Operand(relation) => {
                let Some(first_kind) = first.and_then(FormulaType::kind) else {
                    return Ok(());
                };
                let allowed = first_kind.related(relation);
                if allowed.contains(&kind) {
                    Ok(())
                } else {
                    Err(ExpectedType::OneOf(allowed.to_vec()))
                }
            }
        }
    }
}

/// Computes a call's type from its (already validated) argument types.
#[derive(Debug, Clone)]
pub enum ReturnRule {
    Fixed(FormulaType),
    SameAsArg(usize),
    /// Element type of the lookup or array at this position.
    ElementOf(usize),
    /// A number with as many decimal places as the most precise argument.
    MaxDecimalPlaces,
    Computed(fn(&[FormulaType]) -> FormulaType),
}

impl ReturnRule {
    pub fn resolve(&self, args: &[FormulaType]) -> FormulaType {
        match self {
            ReturnRule::Fixed(ty) => ty.clone(),
            ReturnRule::SameAsArg(i) => args.get(*i).cloned().unwrap_or(FormulaType::Untyped),
            ReturnRule::ElementOf(i) => args
                .get(*i)
                .and_then(FormulaType::element)
                .cloned()
                .unwrap_or(FormulaType::Untyped),
            ReturnRule::MaxDecimalPlaces => max_decimal_places(args),
            ReturnRule::Computed(compute) => compute(args),
        }
    }
}

/// Number type with the largest decimal places among `args`, or untyped if
/// any argument is untyped.
pub fn max_decimal_places(args: &[FormulaType]) -> FormulaType {
    if args.iter().any(FormulaType::is_untyped) {
        return FormulaType::Untyped;
    }
    let places = args
        .iter()
        .filter_map(FormulaType::decimal_places)
        .max()
        .unwrap_or(0);
    FormulaType::number(places)
}

/// Grouping used by the function listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Operator,
    Logical,
    Text,
    Number,
    Date,
    Link,
    Aggregate,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Operator,
        Category::Logical,
        Category::Text,
        Category::Number,
        Category::Date,
        Category::Link,
        Category::Aggregate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Operator => "operator",
            Category::Logical => "logical",
            Category::Text => "text",
            Category::Number => "number",
            Category::Date => "date",
            Category::Link => "link",
            Category::Aggregate => "aggregate",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.name() == name || format!("{}s", c.name()) == name)
    }
}

/// A callable function.
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    /// Lowercase canonical name.
    pub name: String,
    /// Infix lexeme when the function backs an operator (`+` for `add`).
    pub operator: Option<&'static str>,
    pub category: Category,
    pub description: &'static str,
    pub arg_count: ArgCount,
    /// Rule per position; positions past the end reuse the last rule.
    pub arg_rules: Vec<ArgRule>,
    pub returns: ReturnRule,
    /// Consumes lookups and produces a single value.
    pub is_aggregate: bool,
    /// Result changes with time even when no field changes (`now`, `today`).
    pub needs_periodic_update: bool,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, arg_count: ArgCount, returns: ReturnRule) -> Self {
        FunctionDefinition {
            name: name.into().to_lowercase(),
            operator: None,
            category: Category::Logical,
            description: "",
            arg_count,
            arg_rules: Vec::new(),
            returns,
            is_aggregate: false,
            needs_periodic_update: false,
        }
    }

    pub fn args(mut self, rules: &[ArgRule]) -> Self {
        self.arg_rules = rules.to_vec();
        self
    }

    pub fn operator(mut self, lexeme: &'static str) -> Self {
        self.operator = Some(lexeme);
        self.category = Category::Operator;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn aggregate(mut self) -> Self {
        self.is_aggregate = true;
        self.category = Category::Aggregate;
        self
    }

    pub fn periodic(mut self) -> Self {
        self.needs_periodic_update = true;
        self
    }

    /// Rule for the argument at `index`. Functions without rules accept any
    /// single value.
    pub fn arg_rule(&self, index: usize) -> ArgRule {
        self.arg_rules
            .get(index)
            .or(self.arg_rules.last())
            .copied()
            .unwrap_or(ArgRule::Any)
    }

    /// Validates argument types in order, stopping at the first mismatch.
    /// Error-typed arguments are skipped; the caller handles absorption.
    pub fn check_args(&self, args: &[FormulaType]) -> Result<(), (usize, ExpectedType)> {
        let first = args.first();
        args.iter()
            .enumerate()
            .filter(|(_, ty)| !ty.is_error())
            .try_for_each(|(i, ty)| self.arg_rule(i).check(ty, first).map_err(|e| (i, e)))
    }

    pub fn return_type(&self, args: &[FormulaType]) -> FormulaType {
        self.returns.resolve(args)
    }

    /// How the function is written in a formula, e.g. `upper(..)` or `a + b`.
    pub fn usage(&self) -> String {
        match self.operator {
            Some(op) => format!("a {} b", op),
            None => match self.arg_count {
                ArgCount::Exactly(0) => format!("{}()", self.name),
                ArgCount::Exactly(n) => {
                    let params = (1..=n).map(|i| format!("arg{}", i)).collect::<Vec<_>>();
                    format!("{}({})", self.name, params.join(", "))
                }
                ArgCount::AtLeast(n) | ArgCount::Between(n, _) => {
                    let mut params = (1..=n).map(|i| format!("arg{}", i)).collect::<Vec<_>>();
                    params.push("...".to_string());
                    format!("{}({})", self.name, params.join(", "))
                }
            },
        }
    }
}

/// Immutable lookup table from lowercase name to definition.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDefinition>,
}

impl FunctionRegistry {
    /// Builds a registry from `definitions`. A later definition replaces an
    /// earlier one with the same name.
    pub fn new(definitions: impl IntoIterator<Item = FunctionDefinition>) -> Self {
        let functions = definitions
            .into_iter()
            .map(|def| (def.name.clone(), def))
            .collect();
        FunctionRegistry { functions }
    }

    /// Registry holding the built-in catalogue.
    pub fn standard() -> Self {
        Self::new(crate::functions::builtin_definitions())
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name).or_else(|| self.functions.get(&name.to_lowercase()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// All definitions, sorted by name.
    pub fn definitions(&self) -> Vec<&FunctionDefinition> {
        let mut defs: Vec<_> = self.functions.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper() -> FunctionDefinition {
        FunctionDefinition::new("UPPER", ArgCount::Exactly(1), ReturnRule::Fixed(FormulaType::Text))
            .args(&[ArgRule::OneOf(&[TypeKind::Text])])
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::new([upper()]);
        assert!(registry.contains("upper"));
        assert!(registry.contains("UpPeR"));
        assert!(!registry.contains("lower"));
    }

    #[test]
    fn test_arg_count_display() {
        assert_eq!(ArgCount::Exactly(1).to_string(), "exactly 1 argument");
        assert_eq!(ArgCount::Exactly(2).to_string(), "exactly 2 arguments");
        assert_eq!(ArgCount::AtLeast(2).to_string(), "at least 2 arguments");
        assert!(ArgCount::Between(1, 3).accepts(3));
        assert!(!ArgCount::Between(1, 3).accepts(0));
    }

    #[test]
    fn test_last_rule_repeats() {
        let def = FunctionDefinition::new("and", ArgCount::AtLeast(2), ReturnRule::Fixed(FormulaType::Boolean))
            .args(&[ArgRule::OneOf(&[TypeKind::Boolean])]);
        assert_eq!(def.arg_rule(5), ArgRule::OneOf(&[TypeKind::Boolean]));
    }

    #[test]
    fn test_check_args_reports_first_mismatch() {
        let def = upper();
        let err = def.check_args(&[FormulaType::number(0)]).unwrap_err();
        assert_eq!(err, (0, ExpectedType::OneOf(vec![TypeKind::Text])));
        assert!(def.check_args(&[FormulaType::Untyped]).is_ok());
        assert!(def.check_args(&[FormulaType::error("gone")]).is_ok());
    }

    #[test]
    fn test_operand_rule_follows_first_argument() {
        let rule = ArgRule::Operand(Relation::Addable);
        assert!(rule.check(&FormulaType::Duration, Some(&FormulaType::date())).is_ok());
        assert!(rule.check(&FormulaType::Text, Some(&FormulaType::number(0))).is_err());
        assert!(rule.check(&FormulaType::Text, Some(&FormulaType::Untyped)).is_ok());
    }

    #[test]
    fn test_any_rejects_lookups() {
        let lookup = FormulaType::lookup(FormulaType::Text);
        assert_eq!(ArgRule::Any.check(&lookup, Some(&lookup)), Err(ExpectedType::Value));
        assert!(ArgRule::LookupOf(&[]).check(&lookup, Some(&lookup)).is_ok());
        assert!(ArgRule::LookupOf(&[TypeKind::Number]).check(&lookup, Some(&lookup)).is_err());
    }

    #[test]
    fn test_max_decimal_places() {
        let args = [FormulaType::number(1), FormulaType::number(3)];
        assert_eq!(max_decimal_places(&args), FormulaType::number(3));
        assert_eq!(max_decimal_places(&[FormulaType::Untyped]), FormulaType::Untyped);
    }
}
