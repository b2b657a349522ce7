//! `if` / `then` / `else`.
//!
//! The condition runs on its own fork and selects the branch. When the selected branch passes,
//! the locations evaluated by both the condition (if it held) and the branch are merged.
use serde_json::{Map, Value};

use crate::{
    compiler::{BuildSession, Expr},
    context::{Context, ErrorContext, EvaluationContext},
    paths::{LazyLocation, Location},
    schema,
    stack::Stack,
};

pub(crate) fn check<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut EvaluationContext<'i>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let then_ = parent.get("then");
    let else_ = parent.get("else");
    if then_.is_none() && else_.is_none() && !ctx.tracking() {
        return true;
    }
    let mut condition = ctx.fork();
    let holds = schema::check(stack, &mut condition, schema, instance);
    let mut taken = ctx.fork();
    let valid = match if holds { then_ } else { else_ } {
        Some(branch) => schema::check(stack, &mut taken, branch, instance),
        None => true,
    };
    if valid {
        if holds {
            ctx.merge(condition);
        }
        ctx.merge(taken);
    }
    valid
}

pub(crate) fn error<'s, 'i>(
    stack: &mut Stack<'s, '_>,
    ctx: &mut ErrorContext<'i>,
    location: &Location,
    path: &LazyLocation<'_, '_>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
    instance: &'i Value,
) -> bool {
    let mut condition = ctx.fork();
    let holds = schema::error(
        stack,
        &mut condition,
        &location.join("if"),
        path,
        schema,
        instance,
    );
    let keyword = if holds { "then" } else { "else" };
    let Some(branch) = parent.get(keyword) else {
        if holds {
            ctx.merge(condition);
        }
        return true;
    };
    let mut taken = ctx.fork();
    let valid = schema::error(
        stack,
        &mut taken,
        &location.join(keyword),
        path,
        branch,
        instance,
    );
    if valid {
        if holds {
            ctx.merge(condition);
        }
        ctx.merge(taken);
    } else {
        ctx.append_errors(taken);
    }
    valid
}

pub(crate) fn build<'s>(
    session: &mut BuildSession<'s>,
    parent: &'s Map<String, Value>,
    schema: &'s Value,
) -> Expr {
    let then_ = parent.get("then");
    let else_ = parent.get("else");
    if then_.is_none() && else_.is_none() && !session.tracking() {
        return Expr::True;
    }
    let condition = Box::new(schema::build(session, schema));
    let then = then_.map(|branch| Box::new(schema::build(session, branch)));
    let otherwise = else_.map(|branch| Box::new(schema::build(session, branch)));
    Expr::If {
        condition,
        then,
        otherwise,
    }
}
