//! Expression trees of compiled subroutines.
use core::fmt;

use serde_json::{Number, Value};

use crate::{
    compiler::{Program, SubroutineId},
    context::{Context, EvaluationContext},
    ext::{cmp, numeric},
    externals::{Hoisted, Refine, StandardValidator},
    keywords::{
        additional_properties, contains, dependencies, enum_, format::Format, items,
        min_length::length, pattern_properties, prefix_items, properties, unevaluated_items,
        unevaluated_properties, unique_items, Family,
    },
    reducer::{verdict, Rule},
    regex::Pattern,
    types::JsonTypeSet,
};

/// A compiled predicate over one value.
///
/// Keyword expressions hold for values outside their runtime category; the dispatcher wraps
/// them in [`Expr::Guard`] unless `type` already rules such values out.
pub(crate) enum Expr {
    True,
    False,
    /// Values of another family pass without evaluating the inner expression.
    Guard(Family, Box<Expr>),
    And(Vec<Expr>),
    Type(JsonTypeSet),
    Const(Value),
    Enum(Vec<Value>),
    Minimum(Number),
    Maximum(Number),
    ExclusiveMinimum(Number),
    ExclusiveMaximum(Number),
    MultipleOf(Number),
    MinLength(u64),
    MaxLength(u64),
    Pattern(Hoisted<Pattern>),
    Format(Format),
    MinItems(u64),
    MaxItems(u64),
    UniqueItems,
    Contains {
        schema: Box<Expr>,
        min: u64,
        max: Option<u64>,
    },
    PrefixItems(Vec<Expr>),
    /// Every element from `skip` on.
    Items {
        skip: usize,
        schema: Box<Expr>,
    },
    MinProperties(u64),
    MaxProperties(u64),
    Required(Vec<String>),
    /// Declared property schemas; `required` names are known to be present.
    Properties {
        schemas: Vec<(String, Expr)>,
        required: Vec<String>,
    },
    PatternProperties(Vec<(Hoisted<Pattern>, Expr)>),
    AdditionalProperties {
        properties: Vec<String>,
        patterns: Vec<Hoisted<Pattern>>,
        schema: Box<Expr>,
    },
    /// `additionalProperties: false` when every declared property is also required.
    PropertyCount(usize),
    PropertyNames(Box<Expr>),
    DependentRequired(Vec<(String, Vec<String>)>),
    DependentSchemas(Vec<(String, Expr)>),
    Reference(SubroutineId),
    If {
        condition: Box<Expr>,
        then: Option<Box<Expr>>,
        otherwise: Option<Box<Expr>>,
    },
    Not(Box<Expr>),
    AllOf(Vec<Expr>),
    AnyOf(Vec<Expr>),
    OneOf(Vec<Expr>),
    UnevaluatedItems(Box<Expr>),
    UnevaluatedProperties(Box<Expr>),
    Refine(Vec<Hoisted<dyn Refine>>),
    Standard(Hoisted<dyn StandardValidator>),
    /// A reference that did not resolve.
    Unresolved(String),
    /// A keyword that can never hold, e.g. an invalid pattern.
    Unsatisfiable(String),
}

impl Expr {
    /// Conjunction with `true` operands dropped.
    pub(crate) fn all(exprs: Vec<Expr>) -> Expr {
        let mut exprs: Vec<Expr> = exprs
            .into_iter()
            .filter(|expr| !matches!(expr, Expr::True))
            .collect();
        if exprs.iter().any(|expr| matches!(expr, Expr::False)) {
            return Expr::False;
        }
        match exprs.len() {
            0 => Expr::True,
            1 => exprs.pop().unwrap_or(Expr::True),
            _ => Expr::And(exprs),
        }
    }

    #[allow(clippy::too_many_lines)]
    pub(crate) fn eval<'i>(
        &self,
        program: &Program,
        ctx: &mut EvaluationContext<'i>,
        instance: &'i Value,
    ) -> bool {
        let tracking = ctx.tracking();
        // Nested values get their own evaluated locations.
        let child = |expr: &Expr, value: &Value| {
            expr.eval(program, &mut EvaluationContext::new(tracking), value)
        };
        match (self, instance) {
            (Expr::True, _) => true,
            (Expr::False | Expr::Unresolved(_) | Expr::Unsatisfiable(_), _) => false,
            (Expr::Guard(family, inner), _) => {
                !family.admits(instance) || inner.eval(program, ctx, instance)
            }
            (Expr::And(exprs), _) => exprs.iter().all(|expr| expr.eval(program, ctx, instance)),
            (Expr::Type(types), _) => types.matches(instance),
            (Expr::Const(expected), _) => cmp::equal(expected, instance),
            (Expr::Enum(options), _) => enum_::is_member(options, instance),
            (Expr::Minimum(limit), Value::Number(item)) => numeric::ge(item, limit),
            (Expr::Maximum(limit), Value::Number(item)) => numeric::le(item, limit),
            (Expr::ExclusiveMinimum(limit), Value::Number(item)) => numeric::gt(item, limit),
            (Expr::ExclusiveMaximum(limit), Value::Number(item)) => numeric::lt(item, limit),
            (Expr::MultipleOf(multiple_of), Value::Number(item)) => {
                numeric::is_multiple_of(item, multiple_of)
            }
            (Expr::MinLength(limit), Value::String(item)) => length(item) >= *limit,
            (Expr::MaxLength(limit), Value::String(item)) => length(item) <= *limit,
            (Expr::Pattern(pattern), Value::String(item)) => pattern.value.is_match(item),
            (Expr::Format(format), Value::String(item)) => format.is_valid(item),
            (Expr::MinItems(limit), Value::Array(items)) => (items.len() as u64) >= *limit,
            (Expr::MaxItems(limit), Value::Array(items)) => (items.len() as u64) <= *limit,
            (Expr::UniqueItems, Value::Array(items)) => unique_items::is_unique(items),
            (Expr::Contains { schema, min, max }, Value::Array(items)) => {
                contains::evaluate(ctx, items, *min, *max, |item| child(schema, item))
            }
            (Expr::PrefixItems(schemas), Value::Array(items)) => {
                prefix_items::evaluate(ctx, items, schemas, |schema, item| child(schema, item))
            }
            (Expr::Items { skip, schema }, Value::Array(items)) => {
                items::evaluate_tail(ctx, items, *skip, |item| child(schema, item))
            }
            (Expr::MinProperties(limit), Value::Object(object)) => {
                (object.len() as u64) >= *limit
            }
            (Expr::MaxProperties(limit), Value::Object(object)) => {
                (object.len() as u64) <= *limit
            }
            (Expr::Required(names), Value::Object(object)) => {
                names.iter().all(|name| object.contains_key(name))
            }
            (Expr::Properties { schemas, .. }, Value::Object(object)) => properties::evaluate(
                ctx,
                object,
                schemas.iter().map(|(name, schema)| (name.as_str(), schema)),
                |schema, value| child(schema, value),
            ),
            (Expr::PatternProperties(patterns), Value::Object(object)) => {
                pattern_properties::evaluate(ctx, object, patterns, |schema, value| {
                    child(schema, value)
                })
            }
            (
                Expr::AdditionalProperties {
                    properties,
                    patterns,
                    schema,
                },
                Value::Object(object),
            ) => additional_properties::evaluate(
                ctx,
                object,
                |key| properties.iter().any(|name| name == key),
                patterns,
                |value| child(schema, value),
            ),
            (Expr::PropertyCount(count), Value::Object(object)) => object.len() == *count,
            (Expr::PropertyNames(schema), Value::Object(object)) => object
                .keys()
                .all(|key| child(schema, &Value::String(key.clone()))),
            (Expr::DependentRequired(dependencies), Value::Object(object)) => {
                dependencies.iter().all(|(property, required)| {
                    !object.contains_key(property)
                        || required.iter().all(|name| object.contains_key(name))
                })
            }
            (Expr::DependentSchemas(schemas), Value::Object(object)) => {
                dependencies::evaluate_schemas(
                    ctx,
                    object,
                    schemas.iter().map(|(name, schema)| (name.as_str(), schema)),
                    |schema, fork| schema.eval(program, fork, instance),
                )
            }
            (Expr::Reference(id), _) => {
                let mut fork = ctx.fork();
                let valid = program.call(*id, &mut fork, instance);
                if valid {
                    ctx.merge(fork);
                }
                valid
            }
            (
                Expr::If {
                    condition,
                    then,
                    otherwise,
                },
                _,
            ) => {
                let mut evaluated = ctx.fork();
                let holds = condition.eval(program, &mut evaluated, instance);
                let mut taken = ctx.fork();
                let valid = match if holds { then } else { otherwise } {
                    Some(branch) => branch.eval(program, &mut taken, instance),
                    None => true,
                };
                if valid {
                    if holds {
                        ctx.merge(evaluated);
                    }
                    ctx.merge(taken);
                }
                valid
            }
            (Expr::Not(schema), _) => compose(
                program,
                ctx,
                std::slice::from_ref(schema.as_ref()),
                Rule::Not,
                instance,
            ),
            (Expr::AllOf(branches), _) => compose(program, ctx, branches, Rule::All, instance),
            (Expr::AnyOf(branches), _) => compose(program, ctx, branches, Rule::Any, instance),
            (Expr::OneOf(branches), _) => compose(program, ctx, branches, Rule::One, instance),
            (Expr::UnevaluatedItems(schema), Value::Array(items)) => {
                unevaluated_items::evaluate(ctx, items, |item| child(schema, item))
            }
            (Expr::UnevaluatedProperties(schema), Value::Object(object)) => {
                unevaluated_properties::evaluate(ctx, object, |value| child(schema, value))
            }
            (Expr::Refine(refinements), _) => refinements
                .iter()
                .all(|refinement| refinement.value.refine(instance)),
            (Expr::Standard(validator), _) => validator.value.validate(instance).is_ok(),
            // Keywords of another family
            _ => true,
        }
    }

    /// Pseudo-source of the expression applied to the value bound at `depth`.
    pub(crate) fn render<'a>(&'a self, externals: &'a str, depth: usize) -> Render<'a> {
        Render {
            expr: self,
            externals,
            depth,
        }
    }
}

fn compose<'i>(
    program: &Program,
    ctx: &mut EvaluationContext<'i>,
    branches: &[Expr],
    rule: Rule,
    instance: &'i Value,
) -> bool {
    verdict(ctx, branches, rule, |_, branch, ctx| {
        branch.eval(program, ctx, instance)
    })
}

pub(crate) struct Render<'a> {
    expr: &'a Expr,
    externals: &'a str,
    depth: usize,
}

struct Variable(usize);

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            f.write_str("value")
        } else {
            write!(f, "value_{}", self.0)
        }
    }
}

impl Render<'_> {
    fn nested<'b>(&'b self, expr: &'b Expr) -> Render<'b> {
        expr.render(self.externals, self.depth + 1)
    }

    fn same<'b>(&'b self, expr: &'b Expr) -> Render<'b> {
        expr.render(self.externals, self.depth)
    }

    fn join(&self, f: &mut fmt::Formatter<'_>, exprs: &[Expr], separator: &str) -> fmt::Result {
        for (idx, expr) in exprs.iter().enumerate() {
            if idx > 0 {
                f.write_str(separator)?;
            }
            write!(f, "{}", self.same(expr))?;
        }
        Ok(())
    }
}

fn json_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

impl fmt::Display for Render<'_> {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = Variable(self.depth);
        let item = Variable(self.depth + 1);
        let externals = self.externals;
        match self.expr {
            Expr::True => f.write_str("true"),
            Expr::False => f.write_str("false"),
            Expr::Guard(family, inner) => {
                write!(f, "(!is_{}({value}) || {})", family.as_str(), self.same(inner))
            }
            Expr::And(exprs) => {
                f.write_str("(")?;
                self.join(f, exprs, " && ")?;
                f.write_str(")")
            }
            Expr::Type(types) => {
                f.write_str("(")?;
                for (idx, ty) in types.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" || ")?;
                    }
                    write!(f, "is_{}({value})", ty.as_str())?;
                }
                if types.is_empty() {
                    f.write_str("false")?;
                }
                f.write_str(")")
            }
            Expr::Const(expected) => write!(f, "deep_equal({value}, {expected})"),
            Expr::Enum(options) => write!(f, "{}.some((option) => deep_equal({value}, option))", Value::Array(options.clone())),
            Expr::Minimum(limit) => write!(f, "{value} >= {limit}"),
            Expr::Maximum(limit) => write!(f, "{value} <= {limit}"),
            Expr::ExclusiveMinimum(limit) => write!(f, "{value} > {limit}"),
            Expr::ExclusiveMaximum(limit) => write!(f, "{value} < {limit}"),
            Expr::MultipleOf(multiple_of) => write!(f, "is_multiple_of({value}, {multiple_of})"),
            Expr::MinLength(limit) => write!(f, "length({value}) >= {limit}"),
            Expr::MaxLength(limit) => write!(f, "length({value}) <= {limit}"),
            Expr::Pattern(pattern) => write!(f, "{externals}[{}].test({value})", pattern.index),
            Expr::Format(format) => write!(f, "format({}, {value})", json_string(format.as_str())),
            Expr::MinItems(limit) => write!(f, "{value}.length >= {limit}"),
            Expr::MaxItems(limit) => write!(f, "{value}.length <= {limit}"),
            Expr::UniqueItems => write!(f, "is_unique({value})"),
            Expr::Contains { schema, min, max } => {
                write!(
                    f,
                    "count({value}, ({item}) => {}) >= {min}",
                    self.nested(schema)
                )?;
                if let Some(max) = max {
                    write!(
                        f,
                        " && count({value}, ({item}) => {}) <= {max}",
                        self.nested(schema)
                    )?;
                }
                Ok(())
            }
            Expr::PrefixItems(schemas) => {
                f.write_str("(")?;
                for (idx, schema) in schemas.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(
                        f,
                        "({value}.length <= {idx} || (({item}) => {})({value}[{idx}]))",
                        self.nested(schema)
                    )?;
                }
                f.write_str(")")
            }
            Expr::Items { skip, schema } => write!(
                f,
                "{value}.slice({skip}).every(({item}) => {})",
                self.nested(schema)
            ),
            Expr::MinProperties(limit) => write!(f, "size({value}) >= {limit}"),
            Expr::MaxProperties(limit) => write!(f, "size({value}) <= {limit}"),
            Expr::PropertyCount(count) => write!(f, "size({value}) === {count}"),
            Expr::Required(names) => {
                f.write_str("(")?;
                for (idx, name) in names.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "{} in {value}", json_string(name))?;
                }
                f.write_str(")")
            }
            Expr::Properties { schemas, required } => {
                f.write_str("(")?;
                for (idx, (name, schema)) in schemas.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" && ")?;
                    }
                    let present = required.contains(name);
                    let name = json_string(name);
                    if present {
                        write!(
                            f,
                            "(({item}) => {})({value}[{name}])",
                            self.nested(schema)
                        )?;
                    } else {
                        write!(
                            f,
                            "(!({name} in {value}) || (({item}) => {})({value}[{name}]))",
                            self.nested(schema)
                        )?;
                    }
                }
                f.write_str(")")
            }
            Expr::PatternProperties(patterns) => {
                f.write_str("entries(")?;
                write!(f, "{value}).every(([key, {item}]) => ")?;
                f.write_str("(")?;
                for (idx, (pattern, schema)) in patterns.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(
                        f,
                        "(!{externals}[{}].test(key) || {})",
                        pattern.index,
                        self.nested(schema)
                    )?;
                }
                f.write_str("))")
            }
            Expr::AdditionalProperties {
                properties,
                patterns,
                schema,
            } => {
                write!(f, "entries({value}).every(([key, {item}]) => ")?;
                for name in properties {
                    write!(f, "key === {} || ", json_string(name))?;
                }
                for pattern in patterns {
                    write!(f, "{externals}[{}].test(key) || ", pattern.index)?;
                }
                write!(f, "{})", self.nested(schema))
            }
            Expr::PropertyNames(schema) => write!(
                f,
                "keys({value}).every(({item}) => {})",
                self.nested(schema)
            ),
            Expr::DependentRequired(dependencies) => {
                f.write_str("(")?;
                for (idx, (property, required)) in dependencies.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "(!({} in {value})", json_string(property))?;
                    for name in required {
                        write!(f, " || {} in {value}", json_string(name))?;
                    }
                    f.write_str(")")?;
                }
                f.write_str(")")
            }
            Expr::DependentSchemas(schemas) => {
                f.write_str("(")?;
                for (idx, (property, schema)) in schemas.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(
                        f,
                        "(!({} in {value}) || {})",
                        json_string(property),
                        self.same(schema)
                    )?;
                }
                f.write_str(")")
            }
            Expr::Reference(id) => write!(f, "{id}({value})"),
            Expr::If {
                condition,
                then,
                otherwise,
            } => {
                let branch = |branch: &Option<Box<Expr>>| {
                    branch
                        .as_deref()
                        .map_or_else(|| "true".to_string(), |expr| self.same(expr).to_string())
                };
                write!(
                    f,
                    "({} ? {} : {})",
                    self.same(condition),
                    branch(then),
                    branch(otherwise)
                )
            }
            Expr::Not(schema) => write!(f, "!{}", self.same(schema)),
            Expr::AllOf(branches) => {
                f.write_str("all_of(")?;
                self.join(f, branches, ", ")?;
                f.write_str(")")
            }
            Expr::AnyOf(branches) => {
                f.write_str("any_of(")?;
                self.join(f, branches, ", ")?;
                f.write_str(")")
            }
            Expr::OneOf(branches) => {
                f.write_str("one_of(")?;
                self.join(f, branches, ", ")?;
                f.write_str(")")
            }
            Expr::UnevaluatedItems(schema) => write!(
                f,
                "unevaluated_items({value}).every(({item}) => {})",
                self.nested(schema)
            ),
            Expr::UnevaluatedProperties(schema) => write!(
                f,
                "unevaluated_properties({value}).every(({item}) => {})",
                self.nested(schema)
            ),
            Expr::Refine(refinements) => {
                f.write_str("(")?;
                for (idx, refinement) in refinements.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "{externals}[{}]({value})", refinement.index)?;
                }
                f.write_str(")")
            }
            Expr::Standard(validator) => {
                write!(f, "{externals}[{}].validate({value}).ok", validator.index)
            }
            Expr::Unresolved(reason) | Expr::Unsatisfiable(reason) => {
                write!(f, "false /* {reason} */")
            }
        }
    }
}
