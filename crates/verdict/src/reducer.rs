//! The fork / evaluate / selectively-merge pattern behind `allOf`, `anyOf`, `oneOf` and `not`.
use crate::context::Context;

/// Counting rule deciding whether a composition passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    All,
    Any,
    One,
    Not,
}

impl Rule {
    #[inline]
    pub(crate) fn holds(self, passed: usize, total: usize) -> bool {
        match self {
            Rule::All => passed == total,
            Rule::Any => passed > 0,
            Rule::One => passed == 1,
            Rule::Not => passed != 1,
        }
    }
}

pub(crate) struct Reduction<C> {
    pub(crate) valid: bool,
    /// Indices of the branches that passed, in declaration order.
    pub(crate) passing: Vec<usize>,
    /// Contexts of the branches that failed, in declaration order.
    pub(crate) failures: Vec<C>,
}

/// Evaluate every branch on its own fork of `ctx`.
///
/// When the rule holds, the contexts of the passing branches are merged into `ctx`.
pub(crate) fn reduce<'a, 'i, C, B>(
    ctx: &mut C,
    branches: &'a [B],
    rule: Rule,
    mut evaluate: impl FnMut(usize, &'a B, &mut C) -> bool,
) -> Reduction<C>
where
    C: Context<'i>,
{
    let mut passing = Vec::new();
    let mut passed_contexts = Vec::new();
    let mut failures = Vec::new();
    for (idx, branch) in branches.iter().enumerate() {
        let mut fork = ctx.fork();
        if evaluate(idx, branch, &mut fork) {
            passing.push(idx);
            passed_contexts.push(fork);
        } else {
            failures.push(fork);
        }
    }
    let valid = rule.holds(passing.len(), branches.len());
    if valid {
        for fork in passed_contexts {
            ctx.merge(fork);
        }
    }
    Reduction {
        valid,
        passing,
        failures,
    }
}

/// Boolean verdict of a composition.
///
/// Without tracking this is a short-circuiting fold over `ctx` itself, no forks are created.
pub(crate) fn verdict<'a, 'i, C, B>(
    ctx: &mut C,
    branches: &'a [B],
    rule: Rule,
    mut evaluate: impl FnMut(usize, &'a B, &mut C) -> bool,
) -> bool
where
    C: Context<'i>,
{
    if ctx.tracking() {
        return reduce(ctx, branches, rule, evaluate).valid;
    }
    match rule {
        Rule::All => branches
            .iter()
            .enumerate()
            .all(|(idx, branch)| evaluate(idx, branch, ctx)),
        Rule::Any => branches
            .iter()
            .enumerate()
            .any(|(idx, branch)| evaluate(idx, branch, ctx)),
        Rule::One => {
            let mut passed = 0;
            for (idx, branch) in branches.iter().enumerate() {
                if evaluate(idx, branch, ctx) {
                    passed += 1;
                    if passed > 1 {
                        return false;
                    }
                }
            }
            passed == 1
        }
        Rule::Not => {
            let passed = branches
                .iter()
                .enumerate()
                .filter(|(idx, branch)| evaluate(*idx, *branch, ctx))
                .count();
            rule.holds(passed, branches.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, verdict, Rule};
    use crate::context::{Context, EvaluationContext};
    use test_case::test_case;

    // Each branch is (verdict, key it records)
    const BRANCHES: [(bool, &str); 3] = [(true, "a"), (false, "b"), (true, "c")];

    fn evaluate<'i>(_: usize, branch: &(bool, &'i str), ctx: &mut EvaluationContext<'i>) -> bool {
        ctx.add_key(branch.1);
        branch.0
    }

    #[test_case(Rule::All, 2, 3, false)]
    #[test_case(Rule::All, 3, 3, true)]
    #[test_case(Rule::Any, 1, 3, true)]
    #[test_case(Rule::Any, 0, 3, false)]
    #[test_case(Rule::One, 1, 2, true)]
    #[test_case(Rule::One, 2, 2, false)]
    #[test_case(Rule::Not, 0, 1, true)]
    #[test_case(Rule::Not, 1, 1, false)]
    fn rules(rule: Rule, passed: usize, total: usize, expected: bool) {
        assert_eq!(rule.holds(passed, total), expected);
    }

    #[test]
    fn merges_only_passing_branches() {
        let mut ctx = EvaluationContext::new(true);
        let reduction = reduce(&mut ctx, &BRANCHES, Rule::Any, evaluate);
        assert!(reduction.valid);
        assert_eq!(reduction.passing, vec![0, 2]);
        assert_eq!(reduction.failures.len(), 1);
        assert!(ctx.is_evaluated_key("a"));
        assert!(!ctx.is_evaluated_key("b"));
        assert!(ctx.is_evaluated_key("c"));
    }

    #[test]
    fn failed_reduction_merges_nothing() {
        let mut ctx = EvaluationContext::new(true);
        let reduction = reduce(&mut ctx, &BRANCHES, Rule::One, evaluate);
        assert!(!reduction.valid);
        assert!(!ctx.is_evaluated_key("a"));
    }

    #[test_case(Rule::All, false)]
    #[test_case(Rule::Any, true)]
    #[test_case(Rule::One, false)]
    #[test_case(Rule::Not, true)]
    fn fast_path_agrees(rule: Rule, expected: bool) {
        let branches = if rule == Rule::Not {
            &BRANCHES[1..2]
        } else {
            &BRANCHES[..]
        };
        let mut plain = EvaluationContext::new(false);
        let mut tracked = EvaluationContext::new(true);
        assert_eq!(verdict(&mut plain, branches, rule, evaluate), expected);
        assert_eq!(verdict(&mut tracked, branches, rule, evaluate), expected);
    }
}
