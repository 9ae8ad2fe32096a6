use tracing::debug;

use crate::{
    ast::{ForLoop, Instruction},
    error::{ArithmeticError, InvalidCodeErrorKind},
    interpreter::{
        evaluator::{
            core::{Context, EvalResult, Step},
            utils::{evaluate_constant, invalid},
        },
        value::{number::Number, operation::Operator},
    },
};

impl Context {
    /// Expands a `for` loop reached during evaluation.
    ///
    /// The bounds and step are lowered once, in the current frame, and only
    /// their numeric results are kept.
    ///
    /// # Returns
    /// The steps replacing the loop, see [`unroll`].
    pub fn expand_loop<'a>(&mut self, for_loop: &'a ForLoop) -> EvalResult<Vec<Step<'a>>> {
        let begin = self.lower(&for_loop.begin)?.result().clone();
        let end = self.lower(&for_loop.end)?.result().clone();
        let step = self.lower(&for_loop.step)?.result().clone();

        unroll(for_loop, &begin, &end, &step)
    }
}

/// Unrolls every loop with constant bounds found at the top of `content`.
///
/// Unrolled bodies are examined again, so constant loops nested directly in
/// them are unrolled too. Other instructions are left for evaluation.
///
/// # Example
/// ```
/// use std::path::{Path, PathBuf};
///
/// use malang::interpreter::{
///     evaluator::for_loop::unroll_constant_loops,
///     lexer::tokenize_source,
///     parser::core::parse_program,
/// };
///
/// let tokens = tokenize_source(PathBuf::from("a.mlg"),
///                              "for(i : 1 : 3) { for(2) { x = i } }".into(),
///                              Path::new("std_libs")).unwrap();
/// let root = parse_program(&tokens).unwrap();
/// // Three `i = index` bindings and six `x = i` assignments.
/// assert_eq!(unroll_constant_loops(&root.content).unwrap().len(), 9);
/// ```
pub fn unroll_constant_loops(content: &[Instruction]) -> EvalResult<Vec<Step<'_>>> {
    let mut pending: Vec<Step<'_>> = content.iter().rev().map(Step::Run).collect();
    let mut steps = Vec::with_capacity(pending.len());

    while let Some(step) = pending.pop() {
        match step {
            Step::Run(Instruction::ForLoop(for_loop)) if for_loop.has_constant_bounds() => {
                let begin = evaluate_constant(&for_loop.begin)?;
                let end = evaluate_constant(&for_loop.end)?;
                let step = evaluate_constant(&for_loop.step)?;
                pending.extend(unroll(for_loop, &begin, &end, &step)?.into_iter().rev());
            },
            step => steps.push(step),
        }
    }

    Ok(steps)
}

/// Replaces a loop by copies of its body.
///
/// Each iteration is the loop's body, preceded by a binding of the loop
/// variable to the index when the loop has one.
///
/// # Errors
/// `ZeroStep` when `step` is zero, before anything is unrolled.
pub fn unroll<'a>(for_loop: &'a ForLoop,
                  begin: &Number,
                  end: &Number,
                  step: &Number)
                  -> EvalResult<Vec<Step<'a>>> {
    if step.is_zero() {
        return Err(invalid(InvalidCodeErrorKind::ZeroStep, &for_loop.keyword));
    }

    let indices = loop_indices(begin, end, step).map_err(|e| invalid(e.into(), &for_loop.keyword))?;
    debug!(iterations = indices.len(), "unrolled for loop");

    let mut steps = Vec::with_capacity(indices.len() * (for_loop.body.len() + 1));
    for index in indices {
        if let Some(var) = &for_loop.var {
            steps.push(Step::Bind { var,
                                    value: index.into() });
        }
        steps.extend(for_loop.body.iter().map(Step::Run));
    }

    Ok(steps)
}

/// The indices a loop visits.
///
/// A positive step counts up from `begin` while the index stays at most
/// `end`. A negative step counts down from the larger bound while the index
/// stays at least the smaller one.
///
/// # Errors
/// Arithmetic failures while stepping.
pub fn loop_indices(begin: &Number,
                    end: &Number,
                    step: &Number)
                    -> Result<Vec<Number>, ArithmeticError> {
    let mut indices = Vec::new();

    if step.is_positive() {
        let mut index = begin.clone();
        while index <= *end {
            let next = Operator::Add.apply(&index, step)?;
            indices.push(index);
            index = next;
        }
    } else {
        let (high, low) = if begin >= end { (begin, end) } else { (end, begin) };
        let mut index = high.clone();
        while index >= *low {
            let next = Operator::Add.apply(&index, step)?;
            indices.push(index);
            index = next;
        }
    }

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn indices(begin: impl Into<Number>, end: impl Into<Number>, step: impl Into<Number>) -> Vec<Number> {
        loop_indices(&begin.into(), &end.into(), &step.into()).unwrap()
    }

    fn ints(values: &[i64]) -> Vec<Number> {
        values.iter().map(|&v| Number::from(v)).collect()
    }

    #[test]
    fn counting_up() {
        assert_eq!(indices(1, 5, 1), ints(&[1, 2, 3, 4, 5]));
        assert_eq!(indices(1, 6, 2), ints(&[1, 3, 5]));
        assert_eq!(indices(5, 1, 1), ints(&[]));
    }

    #[test]
    fn counting_down_starts_at_the_larger_bound() {
        assert_eq!(indices(10, 0, -3), ints(&[10, 7, 4, 1]));
        assert_eq!(indices(0, 10, -3), ints(&[10, 7, 4, 1]));
        assert_eq!(indices(3, 3, -1), ints(&[3]));
    }

    #[test]
    fn real_steps() {
        assert_eq!(indices(0, 1, 0.5), vec![Number::from(0), Number::from(0.5), Number::from(1)]);
        assert_eq!(indices(1.5, 3, 1), vec![Number::from(1.5), Number::from(2.5)]);
    }
}
