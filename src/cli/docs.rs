//! Documentation content for the formula CLI

use super::CliError;
use crate::registry::{Category, FunctionDefinition, FunctionRegistry};

/// Get the docs overview (topic listing)
pub fn get_docs_overview() -> &'static str {
    r#"FORMULA DOCUMENTATION

Formulas compute a value for every row of a table from the row's fields.
They are built from literals, field references, operators and function calls.

DOCUMENTATION TOPICS

  syntax            Literals, field references, lookups and comments
  operators         Infix operators and the functions they stand for
  types             The type system and how types combine
  logical           if, not, isblank, ...
  text              upper, concat, replace, ...
  number            round, abs, power, ...
  date              today, date_diff, datetime_format, ...
  link              link, button, ...
  aggregate         sum, count, join, ... over lookups

QUICK REFERENCE

  'text' "text"             String literals
  42  1.50  -3              Numbers
  true  false               Booleans
  field('name')             Field of the current row
  lookup('link', 'name')    Field of every linked row
  upper(field('name'))      Function call
  /* ... */  // ...         Comments

Run 'formula doc <topic>' for a topic, or 'formula doc <function>' for one
function.
"#
}

/// Get documentation for a topic, category or function
pub fn get_topic(registry: &FunctionRegistry, name: &str) -> Result<String, CliError> {
    match name.to_lowercase().as_str() {
        "syntax" => return Ok(SYNTAX_DOC.to_string()),
        "types" | "type" => return Ok(TYPES_DOC.to_string()),
        _ => {}
    }

    if let Some(category) = Category::from_name(name) {
        return Ok(category_listing(registry, category));
    }

    registry
        .get(name)
        .map(function_doc)
        .ok_or_else(|| CliError::UnknownTopic(name.to_string()))
}

fn category_listing(registry: &FunctionRegistry, category: Category) -> String {
    let definitions: Vec<_> = registry
        .definitions()
        .into_iter()
        .filter(|def| def.category == category)
        .collect();

    let width = definitions
        .iter()
        .map(|def| usage(def).len())
        .max()
        .unwrap_or(0);

    let mut out = format!("{} FUNCTIONS\n\n", category.name().to_uppercase());
    for def in definitions {
        out.push_str(&format!(
            "  {:width$}  {}\n",
            usage(def),
            def.description,
            width = width
        ));
    }
    out
}

fn usage(def: &FunctionDefinition) -> String {
    match def.operator {
        Some(op) => format!("{:<3} {}", op, def.name),
        None => def.usage(),
    }
}

fn function_doc(def: &FunctionDefinition) -> String {
    let mut out = format!("{}\n\n  {}\n\n", def.usage(), def.description);
    out.push_str(&format!("  Category:   {}\n", def.category.name()));
    out.push_str(&format!("  Arguments:  {}\n", def.arg_count));
    if let Some(op) = def.operator {
        out.push_str(&format!("  Operator:   {} (a {} b is {}(a, b))\n", op, op, def.name));
    }
    if def.is_aggregate {
        out.push_str("  Aggregates lookups into a single value.\n");
    }
    if def.needs_periodic_update {
        out.push_str("  The result changes over time.\n");
    }
    out
}

const SYNTAX_DOC: &str = r#"SYNTAX - Formula Notation

LITERALS
  'text'  "text"
    Strings use single or double quotes. Escape the quote in use with a
    backslash: 'it\'s', "say \"hi\"". Other backslashes are kept as written.

  42  -7  1.50
    Whole numbers and decimals. A decimal keeps its written precision, so
    1.50 is a number with 2 decimal places.

  true  false
    Booleans, in any case.

FIELD REFERENCES
  field('name')
    The value of a field in the current row.

  lookup('link field', 'target field')
    The target field of every row linked through the link field. A lookup
    holds many values, so it has to be passed to an aggregate function such
    as sum or count.

  field_by_id(42)
    No longer supported. Reference fields by name.

FUNCTION CALLS
  name(arg, ...)
    Function names are case-insensitive: UPPER('a') is upper('a').

COMMENTS
  /* block */  // to end of line
"#;

const TYPES_DOC: &str = r#"TYPES - How Values Combine

TYPES
  text        'abc', upper(...), concat(...)
  number      Carries its decimal places: 1 has 0, 1.25 has 2
  boolean     true, comparisons, and(...)
  date        today(), todate(...); now() includes the time
  duration    date_interval('1 day'), date - date
  link        link('https://...'), button(...)
  array       A list held by one field, e.g. a link field
  lookup      The values reached through lookup('link', 'field')

ARITHMETIC
  number + number      number with the larger decimal places
  text + text          text
  date + duration      date
  date - date          duration
  number / number      number with 10 decimal places

COMPARISONS
  =  !=          Text compares with anything except lookups
  <  >  <=  >=   Text, number, date, duration and link values; both sides
                 must have matching types (text also accepts links)

ERRORS
  A reference to a deleted field makes the formula invalid without stopping
  the check. Passing a value of the wrong type to a function is an error.
"#;
