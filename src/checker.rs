use tracing::{debug, trace};

use crate::{
    ast::{Expr, TypedExpr},
    config::Limits,
    error::{FormulaError, Result},
    registry::FunctionRegistry,
    schema::{FieldResolution, FieldSchema},
    types::FormulaType,
};

/// Assigns a [`FormulaType`] to every node of an expression.
///
/// Field references that cannot be resolved are typed as
/// [`FormulaType::Error`] so the rest of the formula can still be checked.
/// Any call whose argument has the wrong type fails the whole check with
/// [`FormulaError::InvalidArgumentType`].
pub struct TypeChecker<'a> {
    registry: &'a FunctionRegistry,
    schema: &'a dyn FieldSchema,
    limits: Limits,
}

impl<'a> TypeChecker<'a> {
    pub fn new(registry: &'a FunctionRegistry, schema: &'a dyn FieldSchema) -> Self {
        TypeChecker {
            registry,
            schema,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Type checks an expression.
    ///
    /// Existing annotations are ignored, so a typed tree can be checked again
    /// and yields the same types.
    ///
    /// # Arguments
    ///
    /// * `expr` - An untyped or typed expression
    ///
    /// # Returns
    ///
    /// A copy of `expr` with every node annotated.
    ///
    /// # Examples
    ///
    /// ```
    /// use formula_lang::{Expr, FormulaType, TypeChecker, functions::standard_registry};
    /// use formula_lang::schema::StaticSchema;
    ///
    /// let schema = StaticSchema::new().with_field("price", FormulaType::number(2));
    /// let checker = TypeChecker::new(standard_registry(), &schema);
    ///
    /// let expr = Expr::call("multiply", vec![Expr::field("price"), Expr::integer(3)]);
    /// let typed = checker.check(&expr).unwrap();
    /// assert_eq!(typed.formula_type(), &FormulaType::number(2));
    /// ```
    pub fn check<A>(&self, expr: &Expr<A>) -> Result<TypedExpr> {
        let typed = self.check_node(expr, 0)?;
        debug!(formula_type = %typed.formula_type(), "type checked formula");
        Ok(typed)
    }

    fn check_node<A>(&self, expr: &Expr<A>, depth: usize) -> Result<TypedExpr> {
        if depth > self.limits.max_depth {
            return Err(FormulaError::FormulaTooLarge);
        }

        Ok(match expr {
            Expr::StringLiteral { value, .. } => Expr::StringLiteral {
                value: value.clone(),
                formula_type: FormulaType::Text,
            },
            Expr::IntegerLiteral { value, .. } => Expr::IntegerLiteral {
                value: *value,
                formula_type: FormulaType::number(0),
            },
            Expr::DecimalLiteral { value, .. } => Expr::DecimalLiteral {
                value: *value,
                formula_type: FormulaType::number(value.scale()),
            },
            Expr::BooleanLiteral { value, .. } => Expr::BooleanLiteral {
                value: *value,
                formula_type: FormulaType::Boolean,
            },
            Expr::FieldReference {
                field_name,
                via_field_name,
                ..
            } => Expr::FieldReference {
                field_name: field_name.clone(),
                via_field_name: via_field_name.clone(),
                formula_type: self.field_type(field_name, via_field_name.as_deref()),
            },
            Expr::FunctionCall { function, args, .. } => {
                return self.check_call(function, args, depth);
            }
        })
    }

    fn field_type(&self, field_name: &str, via_field_name: Option<&str>) -> FormulaType {
        match (self.schema.resolve(field_name, via_field_name), via_field_name) {
            (FieldResolution::Found(ty), None) => ty,
            (FieldResolution::Found(ty), Some(_)) => FormulaType::lookup(ty),
            (FieldResolution::NotFound, None) => {
                debug!(field = field_name, "reference to unknown field");
                FormulaType::error(format!(
                    "references the deleted or unknown field {}",
                    field_name
                ))
            }
            (FieldResolution::NotFound, Some(via)) => {
                debug!(field = field_name, via, "lookup of unknown field");
                FormulaType::error(format!(
                    "references the deleted or unknown field {} through {}",
                    field_name, via
                ))
            }
            (FieldResolution::NotALink, _) => {
                FormulaType::error("first lookup function argument must be a link row field")
            }
        }
    }

    fn check_call<A>(&self, function: &str, args: &[Expr<A>], depth: usize) -> Result<TypedExpr> {
        let definition =
            self.registry
                .get(function)
                .ok_or_else(|| FormulaError::UnknownFunction {
                    name: function.to_lowercase(),
                })?;

        if !definition.arg_count.accepts(args.len()) {
            return Err(FormulaError::InvalidArgumentCount {
                function: definition.name.clone(),
                expected: definition.arg_count,
                actual: args.len(),
            });
        }

        let args = args
            .iter()
            .map(|arg| self.check_node(arg, depth + 1))
            .collect::<Result<Vec<_>>>()?;
        let arg_types: Vec<FormulaType> =
            args.iter().map(|arg| arg.formula_type().clone()).collect();

        definition
            .check_args(&arg_types)
            .map_err(|(index, expected)| FormulaError::InvalidArgumentType {
                function: definition.name.clone(),
                argument_index: index,
                expected,
                actual: arg_types[index].clone(),
            })?;

        let formula_type = match arg_types.iter().find(|ty| ty.is_error()) {
            Some(error) => error.clone(),
            None => definition.return_type(&arg_types),
        };
        trace!(function = %definition.name, %formula_type, "typed call");

        Ok(Expr::FunctionCall {
            function: definition.name.clone(),
            args,
            formula_type,
        })
    }
}

/// Type checks `expr` with default limits.
pub fn check<A>(
    expr: &Expr<A>,
    registry: &FunctionRegistry,
    schema: &dyn FieldSchema,
) -> Result<TypedExpr> {
    TypeChecker::new(registry, schema).check(expr)
}
