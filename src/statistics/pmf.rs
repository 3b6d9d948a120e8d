use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};

use crate::{
    broadcast::{broadcast_shapes, reduce_to_shape},
    error::{MultinomialError, Result},
    special::{ln_factorial, select, xlogy},
    tensor::Tensor,
};

/// Log of the multinomial probability mass function.
///
/// `x` holds per-category counts along its last axis and `p` the matching
/// category probabilities; the two broadcast against each other, and `n`
/// (the number of trials) broadcasts against their leading dimensions. The
/// result has shape `broadcast(n, broadcast(x, p)[..-1])`.
///
/// `x` and `n` must promote to an integer dtype, otherwise this returns
/// [`MultinomialError::InvalidArgumentType`]. Elements whose counts do not
/// sum to `n` evaluate to `-inf`. `p` is not checked to lie in `[0, 1]` or
/// to sum to one.
pub fn logpmf(
    x: impl Into<Tensor>,
    n: impl Into<Tensor>,
    p: impl Into<Tensor>,
) -> Result<ArrayD<f64>> {
    let inputs = Inputs::promote(x.into(), n.into(), p.into())?;
    Ok(inputs.evaluate()?.logprobs)
}

/// Multinomial probability mass function, `exp(logpmf(x, n, p))`.
pub fn pmf(
    x: impl Into<Tensor>,
    n: impl Into<Tensor>,
    p: impl Into<Tensor>,
) -> Result<ArrayD<f64>> {
    Ok(logpmf(x, n, p)?.mapv_into(f64::exp))
}

/// Gradient of `sum(logpmf(x, n, p))` with respect to `p`, shaped like `p`.
///
/// Each category contributes `x_i / p_i`, or 0 when `x_i == 0`. Elements
/// masked out by a count mismatch contribute nothing.
pub fn logpmf_grad_p(
    x: impl Into<Tensor>,
    n: impl Into<Tensor>,
    p: impl Into<Tensor>,
) -> Result<ArrayD<f64>> {
    let inputs = Inputs::promote(x.into(), n.into(), p.into())?;
    let evaluation = inputs.evaluate()?;

    let batch_ndim = evaluation.valid.ndim();
    let mut grid = evaluation.valid.shape().to_vec();
    grid.push(inputs.categories());

    let valid = evaluation.valid.insert_axis(Axis(batch_ndim));
    let valid = broadcast_to(&valid, &grid)?;
    let x = broadcast_to(&inputs.x, &grid)?;
    let p = broadcast_to(&inputs.p, &grid)?;

    let mut grad = ArrayD::<f64>::zeros(IxDyn(&grid));
    Zip::from(&mut grad)
        .and(&x)
        .and(&p)
        .and(&valid)
        .for_each(|g, &xi, &pi, &ok| *g = select(ok && xi != 0.0, xi / pi, 0.0));

    Ok(reduce_to_shape(grad, inputs.p.shape()))
}

/// [`logpmf`] for a single observation of plain counts.
///
/// `counts` and `probabilities` must have the same length, or one of them
/// length 1.
pub fn multinomial_ln_probability(n: u64, counts: &[u64], probabilities: &[f64]) -> Result<f64> {
    let out = logpmf(counts, n, probabilities)?;
    Ok(out.iter().copied().next().unwrap_or(f64::NEG_INFINITY))
}

/// [`pmf`] for a single observation of plain counts.
pub fn multinomial_probability(n: u64, counts: &[u64], probabilities: &[f64]) -> Result<f64> {
    Ok(multinomial_ln_probability(n, counts, probabilities)?.exp())
}

/// Arguments after the integer check and the cast to `f64`.
struct Inputs {
    x: ArrayD<f64>,
    n: ArrayD<f64>,
    p: ArrayD<f64>,
    /// Per-element sums of `x` over its own last axis, before broadcasting
    /// against `p`. Kept in integer space so large counts compare exactly.
    count_sums: ArrayD<i128>,
    trials: ArrayD<i128>,
    /// Broadcast shape of `x` and `p`; the last axis holds categories.
    full: Vec<usize>,
}

struct Evaluation {
    logprobs: ArrayD<f64>,
    /// Whether each element's counts sum to `n`.
    valid: ArrayD<bool>,
}

impl Inputs {
    fn promote(x: Tensor, n: Tensor, p: Tensor) -> Result<Self> {
        let type_error = || MultinomialError::InvalidArgumentType {
            x: x.dtype(),
            n: n.dtype(),
        };
        if !x.dtype().promote_numeric(n.dtype()).is_integer() {
            return Err(type_error());
        }
        let counts = x.to_i128().ok_or_else(type_error)?;
        let trials = n.to_i128().ok_or_else(type_error)?;

        let full = broadcast_shapes(x.shape(), p.shape())?;
        if full.is_empty() {
            return Err(MultinomialError::MissingCategoryAxis);
        }

        log::trace!(
            "multinomial: x {:?} {}, n {:?} {}, p {:?} {}",
            x.shape(),
            x.dtype(),
            n.shape(),
            n.dtype(),
            p.shape(),
            p.dtype()
        );

        let count_sums = match counts.ndim() {
            0 => counts,
            ndim => counts.sum_axis(Axis(ndim - 1)),
        };

        Ok(Self {
            x: x.to_f64(),
            n: n.to_f64(),
            p: p.to_f64(),
            count_sums,
            trials,
            full,
        })
    }

    fn categories(&self) -> usize {
        self.full[self.full.len() - 1]
    }

    fn evaluate(&self) -> Result<Evaluation> {
        let category_axis = Axis(self.full.len() - 1);
        let x = broadcast_to(&self.x, &self.full)?;
        let p = broadcast_to(&self.p, &self.full)?;

        let mut terms = ArrayD::<f64>::zeros(IxDyn(&self.full));
        Zip::from(&mut terms)
            .and(&x)
            .and(&p)
            .for_each(|t, &xi, &pi| *t = xlogy(xi, pi) - ln_factorial(xi));

        let term_sums = terms.sum_axis(category_axis);

        let shape = broadcast_shapes(self.n.shape(), term_sums.shape())?;
        let n = broadcast_to(&self.n, &shape)?;
        let term_sums = broadcast_to(&term_sums, &shape)?;
        let count_sums = broadcast_to(&self.count_sums, &shape)?;
        let trials = broadcast_to(&self.trials, &shape)?;

        let mut valid = ArrayD::from_elem(IxDyn(&shape), false);
        Zip::from(&mut valid)
            .and(&count_sums)
            .and(&trials)
            .for_each(|ok, &count, &total| *ok = count == total);

        let mut logprobs = ArrayD::<f64>::zeros(IxDyn(&shape));
        Zip::from(&mut logprobs)
            .and(&valid)
            .and(&n)
            .and(&term_sums)
            .for_each(|lp, &ok, &n, &terms| {
                *lp = select(ok, ln_factorial(n) + terms, f64::NEG_INFINITY);
            });

        let masked = valid.iter().filter(|ok| !**ok).count();
        if masked > 0 {
            log::debug!(
                "multinomial: {} of {} elements have counts that do not sum to n",
                masked,
                valid.len()
            );
        }

        Ok(Evaluation { logprobs, valid })
    }
}

fn broadcast_to<'a, A>(arr: &'a ArrayD<A>, shape: &[usize]) -> Result<ArrayViewD<'a, A>> {
    arr.broadcast(shape)
        .ok_or_else(|| MultinomialError::IncompatibleShapes {
            lhs: arr.shape().to_vec(),
            rhs: shape.to_vec(),
        })
}
