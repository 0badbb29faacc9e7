//! Built-in function catalogue.

use once_cell::sync::Lazy;

use crate::{
    registry::{
        ArgCount::{self, AtLeast, Exactly},
        ArgRule::{self, Any, LookupOf, OneOf, Operand},
        Category, FunctionDefinition, FunctionRegistry,
        ReturnRule::{self, Computed, ElementOf, Fixed, MaxDecimalPlaces, SameAsArg},
        max_decimal_places,
    },
    types::{FormulaType, NUMBER_MAX_DECIMAL_PLACES, Relation, TypeKind},
};

const TEXT: &[TypeKind] = &[TypeKind::Text];
const NUMBER: &[TypeKind] = &[TypeKind::Number];
const BOOLEAN: &[TypeKind] = &[TypeKind::Boolean];
const DATE: &[TypeKind] = &[TypeKind::Date];
const DURATION: &[TypeKind] = &[TypeKind::Duration];
const LINK: &[TypeKind] = &[TypeKind::Link];
const NUMERIC: &[TypeKind] = &[TypeKind::Number, TypeKind::Duration];
const ORDERED: &[TypeKind] = &[
    TypeKind::Text,
    TypeKind::Number,
    TypeKind::Date,
    TypeKind::Duration,
    TypeKind::Link,
];

static STANDARD: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::standard);

/// Shared registry holding [`builtin_definitions`].
pub fn standard_registry() -> &'static FunctionRegistry {
    &STANDARD
}

/// Every built-in function, operators included.
pub fn builtin_definitions() -> Vec<FunctionDefinition> {
    let mut defs = operators();
    defs.extend(logical());
    defs.extend(text());
    defs.extend(number());
    defs.extend(date());
    defs.extend(link());
    defs.extend(aggregates());
    defs
}

fn def(
    name: &'static str,
    category: Category,
    arg_count: ArgCount,
    args: &[ArgRule],
    returns: ReturnRule,
    description: &'static str,
) -> FunctionDefinition {
    FunctionDefinition::new(name, arg_count, returns)
        .category(category)
        .args(args)
        .describe(description)
}

fn operator(
    name: &'static str,
    lexeme: &'static str,
    args: &[ArgRule],
    returns: ReturnRule,
    description: &'static str,
) -> FunctionDefinition {
    FunctionDefinition::new(name, Exactly(2), returns)
        .operator(lexeme)
        .args(args)
        .describe(description)
}

fn operators() -> Vec<FunctionDefinition> {
    let compare = [Any, Operand(Relation::Comparable)];
    let limit = [OneOf(ORDERED), Operand(Relation::LimitComparable)];
    let boolean = Fixed(FormulaType::Boolean);

    vec![
        operator(
            "add",
            "+",
            &[
                OneOf(&[TypeKind::Text, TypeKind::Number, TypeKind::Date, TypeKind::Duration]),
                Operand(Relation::Addable),
            ],
            Computed(add_type),
            "Adds numbers, joins text or shifts a date by a duration.",
        ),
        operator(
            "minus",
            "-",
            &[
                OneOf(&[TypeKind::Number, TypeKind::Date, TypeKind::Duration]),
                Operand(Relation::Subtractable),
            ],
            Computed(minus_type),
            "Subtracts numbers, or dates and durations.",
        ),
        operator(
            "multiply",
            "*",
            &[OneOf(NUMERIC), Operand(Relation::Multipliable)],
            Computed(multiply_type),
            "Multiplies two numbers, or a duration by a number.",
        ),
        operator(
            "divide",
            "/",
            &[OneOf(NUMERIC), Operand(Relation::Dividable)],
            Computed(divide_type),
            "Divides a number or duration by a number.",
        ),
        operator("equal", "=", &compare, boolean.clone(), "True when both sides are equal."),
        operator("not_equal", "!=", &compare, boolean.clone(), "True when the sides differ."),
        operator("greater_than", ">", &limit, boolean.clone(), "Strictly greater comparison."),
        operator("less_than", "<", &limit, boolean.clone(), "Strictly smaller comparison."),
        operator(
            "greater_than_or_equal",
            ">=",
            &limit,
            boolean.clone(),
            "Greater or equal comparison.",
        ),
        operator(
            "less_than_or_equal",
            "<=",
            &limit,
            boolean.clone(),
            "Smaller or equal comparison.",
        ),
        operator("and", "&&", &[OneOf(BOOLEAN)], boolean.clone(), "True when both are true."),
        operator("or", "||", &[OneOf(BOOLEAN)], boolean, "True when either is true."),
    ]
}

fn logical() -> Vec<FunctionDefinition> {
    let c = Category::Logical;
    vec![
        def(
            "if",
            c,
            Exactly(3),
            &[OneOf(BOOLEAN), Any, Any],
            Computed(if_type),
            "Returns the second argument when the condition holds, else the third.",
        ),
        def("not", c, Exactly(1), &[OneOf(BOOLEAN)], Fixed(FormulaType::Boolean), "Negates a boolean."),
        def("isblank", c, Exactly(1), &[Any], Fixed(FormulaType::Boolean), "True when the value is empty."),
        def("is_null", c, Exactly(1), &[Any], Fixed(FormulaType::Boolean), "True when the value is missing."),
    ]
}

fn text() -> Vec<FunctionDefinition> {
    let c = Category::Text;
    let text = || Fixed(FormulaType::Text);
    let whole = || Fixed(FormulaType::number(0));
    vec![
        def("concat", c, AtLeast(2), &[Any], text(), "Joins the text form of every argument."),
        def("upper", c, Exactly(1), &[OneOf(TEXT)], text(), "Converts text to upper case."),
        def("lower", c, Exactly(1), &[OneOf(TEXT)], text(), "Converts text to lower case."),
        def("totext", c, Exactly(1), &[Any], text(), "Converts any value to text."),
        def("t", c, Exactly(1), &[Any], text(), "Returns text values and blank for anything else."),
        def("length", c, Exactly(1), &[OneOf(TEXT)], whole(), "Number of characters."),
        def("reverse", c, Exactly(1), &[OneOf(TEXT)], text(), "Reverses the characters."),
        def("trim", c, Exactly(1), &[OneOf(TEXT)], text(), "Strips surrounding whitespace."),
        def(
            "replace",
            c,
            Exactly(3),
            &[OneOf(TEXT)],
            text(),
            "Replaces every occurrence of the second argument with the third.",
        ),
        def("search", c, Exactly(2), &[OneOf(TEXT)], whole(), "Position of the second text in the first, or 0."),
        def("contains", c, Exactly(2), &[OneOf(TEXT)], Fixed(FormulaType::Boolean), "True when the first text contains the second."),
        def("left", c, Exactly(2), &[OneOf(TEXT), OneOf(NUMBER)], text(), "First n characters."),
        def("right", c, Exactly(2), &[OneOf(TEXT), OneOf(NUMBER)], text(), "Last n characters."),
        def(
            "split_part",
            c,
            Exactly(3),
            &[OneOf(TEXT), OneOf(TEXT), OneOf(NUMBER)],
            text(),
            "The nth part of the text after splitting on a delimiter.",
        ),
        def(
            "tonumber",
            c,
            Exactly(1),
            &[OneOf(TEXT)],
            Fixed(FormulaType::number(NUMBER_MAX_DECIMAL_PLACES)),
            "Parses text into a number.",
        ),
    ]
}

fn number() -> Vec<FunctionDefinition> {
    let c = Category::Number;
    let whole = || Fixed(FormulaType::number(0));
    let precise = || Fixed(FormulaType::number(NUMBER_MAX_DECIMAL_PLACES));
    vec![
        def("abs", c, Exactly(1), &[OneOf(NUMBER)], SameAsArg(0), "Absolute value."),
        def("ceil", c, Exactly(1), &[OneOf(NUMBER)], whole(), "Rounds up to a whole number."),
        def("floor", c, Exactly(1), &[OneOf(NUMBER)], whole(), "Rounds down to a whole number."),
        def("trunc", c, Exactly(1), &[OneOf(NUMBER)], whole(), "Drops the fractional part."),
        def("sign", c, Exactly(1), &[OneOf(NUMBER)], whole(), "-1, 0 or 1 depending on the sign."),
        def("round", c, Exactly(2), &[OneOf(NUMBER)], SameAsArg(0), "Rounds to the given number of decimal places."),
        def("sqrt", c, Exactly(1), &[OneOf(NUMBER)], precise(), "Square root."),
        def("power", c, Exactly(2), &[OneOf(NUMBER)], precise(), "Raises the first number to the second."),
        def("mod", c, Exactly(2), &[OneOf(NUMBER)], MaxDecimalPlaces, "Remainder of dividing the first by the second."),
        def("greatest", c, Exactly(2), &[OneOf(NUMBER)], MaxDecimalPlaces, "The larger of two numbers."),
        def("least", c, Exactly(2), &[OneOf(NUMBER)], MaxDecimalPlaces, "The smaller of two numbers."),
        def("even", c, Exactly(1), &[OneOf(NUMBER)], Fixed(FormulaType::Boolean), "True for even numbers."),
        def("odd", c, Exactly(1), &[OneOf(NUMBER)], Fixed(FormulaType::Boolean), "True for odd numbers."),
    ]
}

fn date() -> Vec<FunctionDefinition> {
    let c = Category::Date;
    let whole = || Fixed(FormulaType::number(0));
    vec![
        def("now", c, Exactly(0), &[], Fixed(FormulaType::date_time()), "The current date and time.").periodic(),
        def("today", c, Exactly(0), &[], Fixed(FormulaType::date()), "The current date.").periodic(),
        def(
            "todate",
            c,
            Exactly(2),
            &[OneOf(TEXT)],
            Fixed(FormulaType::date()),
            "Parses text into a date using the given format.",
        ),
        def("day", c, Exactly(1), &[OneOf(DATE)], whole(), "Day of the month."),
        def("month", c, Exactly(1), &[OneOf(DATE)], whole(), "Month of the year."),
        def("year", c, Exactly(1), &[OneOf(DATE)], whole(), "The year."),
        def(
            "date_diff",
            c,
            Exactly(3),
            &[OneOf(TEXT), OneOf(DATE), OneOf(DATE)],
            whole(),
            "Difference between two dates in the given unit.",
        ),
        def(
            "date_interval",
            c,
            Exactly(1),
            &[OneOf(TEXT)],
            Fixed(FormulaType::Duration),
            "Parses text such as '1 day' into a duration.",
        ),
        def(
            "datetime_format",
            c,
            Exactly(2),
            &[OneOf(DATE), OneOf(TEXT)],
            Fixed(FormulaType::Text),
            "Formats a date with the given pattern.",
        ),
        def("toseconds", c, Exactly(1), &[OneOf(DURATION)], whole(), "Number of seconds in a duration."),
        def(
            "toduration",
            c,
            Exactly(1),
            &[OneOf(NUMBER)],
            Fixed(FormulaType::Duration),
            "Duration of the given number of seconds.",
        ),
    ]
}

fn link() -> Vec<FunctionDefinition> {
    let c = Category::Link;
    vec![
        def("link", c, Exactly(1), &[OneOf(TEXT)], Fixed(FormulaType::Link), "A clickable link to the url."),
        def("button", c, Exactly(2), &[OneOf(TEXT)], Fixed(FormulaType::Link), "A button with a url and a label."),
        def("get_link_label", c, Exactly(1), &[OneOf(LINK)], Fixed(FormulaType::Text), "The label of a link."),
        def("get_link_url", c, Exactly(1), &[OneOf(LINK)], Fixed(FormulaType::Text), "The url of a link."),
    ]
}

fn agg(
    name: &'static str,
    args: &[ArgRule],
    returns: ReturnRule,
    description: &'static str,
) -> FunctionDefinition {
    FunctionDefinition::new(name, Exactly(args.len()), returns)
        .args(args)
        .describe(description)
        .aggregate()
}

fn aggregates() -> Vec<FunctionDefinition> {
    vec![
        agg("sum", &[LookupOf(NUMERIC)], ElementOf(0), "Sum of the looked up values."),
        agg("avg", &[LookupOf(NUMERIC)], ElementOf(0), "Average of the looked up values."),
        agg("min", &[LookupOf(ORDERED)], ElementOf(0), "Smallest looked up value."),
        agg("max", &[LookupOf(ORDERED)], ElementOf(0), "Largest looked up value."),
        agg("count", &[LookupOf(&[])], Fixed(FormulaType::number(0)), "Number of looked up values."),
        agg("join", &[LookupOf(TEXT), OneOf(TEXT)], Fixed(FormulaType::Text), "Joins looked up text with a delimiter."),
        agg("any", &[LookupOf(BOOLEAN)], Fixed(FormulaType::Boolean), "True when any looked up value is true."),
        agg("every", &[LookupOf(BOOLEAN)], Fixed(FormulaType::Boolean), "True when all looked up values are true."),
        agg(
            "filter",
            &[LookupOf(&[]), LookupOf(BOOLEAN)],
            SameAsArg(0),
            "Keeps the looked up values whose matching condition is true.",
        ),
        agg("array_agg", &[LookupOf(&[])], Computed(array_agg_type), "Collects looked up values into a list."),
    ]
}

fn add_type(args: &[FormulaType]) -> FormulaType {
    use FormulaType::*;
    match args {
        [Untyped, _] | [_, Untyped] => Untyped,
        [Text, _] => Text,
        [Number { .. }, Number { .. }] => max_decimal_places(args),
        [Date { .. }, Duration] => args[0].clone(),
        [Duration, Date { .. }] => args[1].clone(),
        [Duration, Duration] => Duration,
        _ => Untyped,
    }
}

fn minus_type(args: &[FormulaType]) -> FormulaType {
    use FormulaType::*;
    match args {
        [Untyped, _] | [_, Untyped] => Untyped,
        [Number { .. }, Number { .. }] => max_decimal_places(args),
        [Date { .. }, Date { .. }] => Duration,
        [Date { .. }, Duration] => args[0].clone(),
        [Duration, Duration] => Duration,
        _ => Untyped,
    }
}

fn multiply_type(args: &[FormulaType]) -> FormulaType {
    use FormulaType::*;
    match args {
        [Untyped, _] | [_, Untyped] => Untyped,
        [Number { .. }, Number { .. }] => max_decimal_places(args),
        [Number { .. }, Duration] | [Duration, Number { .. }] => Duration,
        _ => Untyped,
    }
}

fn divide_type(args: &[FormulaType]) -> FormulaType {
    use FormulaType::*;
    match args {
        [Untyped, _] | [_, Untyped] => Untyped,
        [Number { .. }, Number { .. }] => FormulaType::number(NUMBER_MAX_DECIMAL_PLACES),
        [Duration, Number { .. }] => Duration,
        _ => Untyped,
    }
}

/// Matching branches keep their type; numbers widen to the larger precision;
/// anything else falls back to text.
fn if_type(args: &[FormulaType]) -> FormulaType {
    match args {
        [_, then, other] if then.is_untyped() || other.is_untyped() => FormulaType::Untyped,
        [_, then @ FormulaType::Number { .. }, other @ FormulaType::Number { .. }] => {
            max_decimal_places(&[then.clone(), other.clone()])
        }
        [_, then, other] if then.kind() == other.kind() => then.clone(),
        [_, _, _] => FormulaType::Text,
        _ => FormulaType::Untyped,
    }
}

fn array_agg_type(args: &[FormulaType]) -> FormulaType {
    match args.first().and_then(FormulaType::element) {
        Some(element) => FormulaType::array(element.clone()),
        None => FormulaType::Untyped,
    }
}
