//! Reference kernels: the arithmetic contract of each cataloged operation.
//!
//! These are pure functions over scalars and dense row-major buffers. The
//! catalog itself never executes tensor programs; these kernels state, in
//! executable form, what a correct lowering rule, interpreter, or code
//! generator must compute for each operation. The crate's own tests and
//! external conformance suites run against them.
//!
//! Rounding in the fixed-point kernels is round-to-nearest, with the tie
//! break pinned to the hardware multiply-high-with-rounding primitive
//! these operations replicate: the doubling high multiply breaks ties
//! toward positive infinity, the rounding divide breaks ties away from
//! zero. The difference only shows on exact .5 results of negative
//! values; both kernels are bit-exact against the reference.

use crate::attr::{CompareFn, UnaryFn};
use crate::dtype::IntType;
use crate::shape::Shape;

/// Elementwise integer clamp: `min(clamp_max, max(x, clamp_min))`.
///
/// `clamp_min ≤ clamp_max` is a caller precondition; if violated, the
/// evaluation order above pins the result to `clamp_max`.
#[must_use]
pub fn clamp_int(x: i128, clamp_min: i128, clamp_max: i128) -> i128 {
    x.max(clamp_min).min(clamp_max)
}

/// Integer-to-integer conversion.
///
/// Widening is exact; narrowing saturates to the target range rather than
/// wrapping.
#[must_use]
pub fn convert_int(x: i128, to: IntType) -> i128 {
    let (min, max) = to.signed_range();
    x.clamp(min, max)
}

/// Integer-to-float conversion, rounding to the nearest representable
/// float with ties to even (IEEE default, the semantics of `as`).
#[must_use]
pub fn convert_int_to_float(x: i128) -> f64 {
    x as f64
}

/// Saturating rounding doubling high multiply.
///
/// Computes the full-width product `a * b`, doubles it, and takes the
/// high half of the doubled product with round-to-nearest, ties toward
/// positive infinity; equivalently, `round(a * b / 2^(width-1))`. The one
/// case whose true result exceeds the representable range, `a = b = min`,
/// saturates to `max`. Never wraps.
///
/// Callers must pass values representable in `ty`; the catalog verifies
/// this at instance construction.
#[must_use]
pub fn saturating_rounding_doubling_high_mul(a: i128, b: i128, ty: IntType) -> i128 {
    let (min, max) = ty.signed_range();
    if a == min && b == min {
        return max;
    }
    let shift = ty.width - 1;
    if shift == 0 {
        return a * b;
    }
    let prod = a * b;
    // Truncating division plus the asymmetric nudge is exactly
    // floor((prod + 2^(shift-1)) / 2^shift), the reference tie break.
    let nudge = if prod >= 0 {
        1i128 << (shift - 1)
    } else {
        1 - (1i128 << (shift - 1))
    };
    (prod + nudge) / (1i128 << shift)
}

/// Rounding arithmetic right shift: `round(x / 2^exponent)` with ties
/// away from zero.
///
/// `exponent` must already have passed the catalog's `0..=31` range
/// verification. `exponent = 0` is the identity.
#[must_use]
pub fn rounding_divide_by_pot(x: i128, exponent: u32) -> i128 {
    let mask = (1i128 << exponent) - 1;
    let remainder = x & mask;
    let threshold = (mask >> 1) + i128::from(x < 0);
    (x >> exponent) + i128::from(remainder > threshold)
}

/// Clamps a real value when both bounds are present.
#[must_use]
pub fn apply_clamp(x: f64, clamp: Option<(f64, f64)>) -> f64 {
    match clamp {
        Some((min, max)) => x.clamp(min, max),
        None => x,
    }
}

/// The four elementwise arithmetic functions of the real binary family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealBinaryFn {
    Add,
    Sub,
    Mul,
    Div,
}

impl RealBinaryFn {
    /// Applies the function to one element pair.
    #[must_use]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
        }
    }
}

/// Source index of a broadcast element.
fn broadcast_index(flat_idx: usize, out_shape: &Shape, src_shape: &Shape) -> usize {
    let out_dims = out_shape.dims();
    let src_dims = src_shape.dims();
    let out_rank = out_dims.len();
    let src_rank = src_dims.len();

    let out_strides = out_shape.contiguous_strides();
    let src_strides = src_shape.contiguous_strides();

    let mut remaining = flat_idx;
    let mut src_idx = 0;
    for i in 0..out_rank {
        let coord = remaining / out_strides[i];
        remaining %= out_strides[i];

        let src_dim_idx = i as isize - (out_rank as isize - src_rank as isize);
        if src_dim_idx >= 0 {
            let si = src_dim_idx as usize;
            if src_dims[si] > 1 {
                src_idx += coord * src_strides[si];
            }
            // A size-1 source dimension broadcasts; its coordinate maps to 0.
        }
    }
    src_idx
}

/// Elementwise binary evaluation with broadcasting, then the optional
/// clamp.
///
/// Returns `None` if the shapes are not broadcast-compatible or a buffer
/// does not match its shape.
#[must_use]
pub fn real_binary_ew(
    func: RealBinaryFn,
    lhs: &[f64],
    lhs_shape: &Shape,
    rhs: &[f64],
    rhs_shape: &Shape,
    clamp: Option<(f64, f64)>,
) -> Option<(Vec<f64>, Shape)> {
    if lhs.len() != lhs_shape.numel() || rhs.len() != rhs_shape.numel() {
        return None;
    }
    let out_shape = lhs_shape.broadcast_with(rhs_shape)?;
    let numel = out_shape.numel();
    let mut out = vec![0.0f64; numel];
    for (i, slot) in out.iter_mut().enumerate() {
        let a = lhs[broadcast_index(i, &out_shape, lhs_shape)];
        let b = rhs[broadcast_index(i, &out_shape, rhs_shape)];
        *slot = apply_clamp(func.apply(a, b), clamp);
    }
    Some((out, out_shape))
}

/// The bias variant: broadcast-adds `bias` to the binary result before
/// clamping.
#[must_use]
pub fn real_binary_ew_bias(
    func: RealBinaryFn,
    lhs: &[f64],
    lhs_shape: &Shape,
    rhs: &[f64],
    rhs_shape: &Shape,
    bias: &[f64],
    bias_shape: &Shape,
    clamp: Option<(f64, f64)>,
) -> Option<(Vec<f64>, Shape)> {
    let (mid, mid_shape) = real_binary_ew(func, lhs, lhs_shape, rhs, rhs_shape, None)?;
    real_binary_ew(RealBinaryFn::Add, &mid, &mid_shape, bias, bias_shape, clamp)
}

/// Elementwise unary evaluation, then the optional clamp.
#[must_use]
pub fn real_unary_ew(func: UnaryFn, data: &[f64], clamp: Option<(f64, f64)>) -> Vec<f64> {
    data.iter()
        .map(|&x| apply_clamp(func.apply(x), clamp))
        .collect()
}

/// Elementwise zero comparison.
#[must_use]
pub fn real_compare_zero_ew(func: CompareFn, data: &[f64]) -> Vec<bool> {
    data.iter().map(|&x| func.apply(x)).collect()
}

/// Batched matrix product `lhs × rhs`, then the optional clamp.
///
/// `lhs` is `[..., m, k]` (leading dimensions are batch dimensions) and
/// `rhs` is `[k, n]`; the result is `[..., m, n]`. Returns `None` if the
/// shapes do not contract or a buffer does not match its shape.
#[must_use]
pub fn real_matmul(
    lhs: &[f64],
    lhs_shape: &Shape,
    rhs: &[f64],
    rhs_shape: &Shape,
    clamp: Option<(f64, f64)>,
) -> Option<(Vec<f64>, Shape)> {
    if lhs.len() != lhs_shape.numel() || rhs.len() != rhs_shape.numel() {
        return None;
    }
    let out_shape = lhs_shape.matmul_with(rhs_shape)?;

    let rank = lhs_shape.rank();
    let m = lhs_shape.dims()[rank - 2];
    let k = lhs_shape.dims()[rank - 1];
    let n = rhs_shape.dims()[1];
    let batch: usize = lhs_shape.dims()[..rank - 2].iter().product();

    let mut out = vec![0.0f64; out_shape.numel()];
    for bi in 0..batch {
        let lhs_off = bi * m * k;
        let out_off = bi * m * n;
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0f64;
                for p in 0..k {
                    sum += lhs[lhs_off + i * k + p] * rhs[p * n + j];
                }
                out[out_off + i * n + j] = apply_clamp(sum, clamp);
            }
        }
    }
    Some((out, out_shape))
}

/// The bias variant: broadcast-adds `bias` of shape `[n]` over the batch
/// and row dimensions after the contraction, before the clamp.
#[must_use]
pub fn real_matmul_bias(
    lhs: &[f64],
    lhs_shape: &Shape,
    rhs: &[f64],
    rhs_shape: &Shape,
    bias: &[f64],
    clamp: Option<(f64, f64)>,
) -> Option<(Vec<f64>, Shape)> {
    let n = rhs_shape.dim(1)?;
    if bias.len() != n {
        return None;
    }
    let (mut out, out_shape) = real_matmul(lhs, lhs_shape, rhs, rhs_shape, None)?;
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = apply_clamp(*slot + bias[i % n], clamp);
    }
    Some((out, out_shape))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_int_identity_inside_bounds() {
        for x in -3..=8 {
            assert_eq!(clamp_int(x, -3, 8), x);
        }
    }

    #[test]
    fn test_clamp_int_spec_vector() {
        // int32 tensor [-5, 10, 130] with bounds [-3, 8] -> [-3, 8, 8].
        let out: Vec<i128> = [-5, 10, 130]
            .iter()
            .map(|&x| clamp_int(x, -3, 8))
            .collect();
        assert_eq!(out, [-3, 8, 8]);
    }

    #[test]
    fn test_clamp_int_bounds_hold() {
        for x in [-1000, -4, 0, 9, 1000] {
            let y = clamp_int(x, -3, 8);
            assert!((-3..=8).contains(&y));
        }
    }

    #[test]
    fn test_convert_int_widening_is_exact() {
        assert_eq!(convert_int(-128, IntType::I32), -128);
        assert_eq!(convert_int(127, IntType::I64), 127);
    }

    #[test]
    fn test_convert_int_narrowing_saturates() {
        assert_eq!(convert_int(300, IntType::I8), 127);
        assert_eq!(convert_int(-300, IntType::I8), -128);
        assert_eq!(convert_int(-1, IntType::U8), 0);
        assert_eq!(convert_int(256, IntType::U8), 255);
    }

    #[test]
    fn test_convert_int_to_float() {
        assert_eq!(convert_int_to_float(-5), -5.0);
        // 2^53 + 1 is not representable; nearest-even rounds down.
        assert_eq!(convert_int_to_float((1 << 53) + 1), 9_007_199_254_740_992.0);
    }

    #[test]
    fn test_srdhm_basic() {
        // For i32: round(a * b / 2^31).
        let ty = IntType::I32;
        assert_eq!(saturating_rounding_doubling_high_mul(0, 12345, ty), 0);
        assert_eq!(
            saturating_rounding_doubling_high_mul(1 << 30, 1 << 30, ty),
            1 << 29
        );
        assert_eq!(saturating_rounding_doubling_high_mul(1 << 30, 2, ty), 1);
        // i32::MAX * 2 / 2^31 = 2 - 2^-30, nearest is 2.
        assert_eq!(
            saturating_rounding_doubling_high_mul((1 << 31) - 1, 2, ty),
            2
        );
    }

    #[test]
    fn test_srdhm_saturates_min_times_min() {
        for ty in [IntType::I8, IntType::I16, IntType::I32] {
            let (min, max) = ty.signed_range();
            assert_eq!(saturating_rounding_doubling_high_mul(min, min, ty), max);
        }
    }

    #[test]
    fn test_srdhm_never_leaves_range() {
        let ty = IntType::I8;
        let (min, max) = ty.signed_range();
        for a in min..=max {
            for b in min..=max {
                let r = saturating_rounding_doubling_high_mul(a, b, ty);
                assert!(ty.contains(r), "SRDHM({a}, {b}) = {r} out of i8 range");
            }
        }
    }

    #[test]
    fn test_srdhm_tie_break_is_toward_positive_infinity() {
        let ty = IntType::I8;
        // a * b / 2^7 = 64 / 128 = 0.5: tie, toward +inf -> 1.
        assert_eq!(saturating_rounding_doubling_high_mul(8, 8, ty), 1);
        // -64 / 128 = -0.5: tie, toward +inf -> 0 (the reference primitive
        // is not symmetric on exact .5).
        assert_eq!(saturating_rounding_doubling_high_mul(-8, 8, ty), 0);
        // A clear majority case still rounds to nearest: -96/128 -> -1.
        assert_eq!(saturating_rounding_doubling_high_mul(-12, 8, ty), -1);
    }

    #[test]
    fn test_rdpot_exponent_zero_is_identity() {
        for x in [-1000, -1, 0, 1, 7, 1 << 20] {
            assert_eq!(rounding_divide_by_pot(x, 0), x);
        }
    }

    #[test]
    fn test_rdpot_rounds_to_nearest() {
        assert_eq!(rounding_divide_by_pot(4, 1), 2);
        assert_eq!(rounding_divide_by_pot(5, 1), 3); // 2.5 -> 3, away from zero
        assert_eq!(rounding_divide_by_pot(-5, 1), -3); // -2.5 -> -3
        assert_eq!(rounding_divide_by_pot(5, 2), 1); // 1.25 -> 1
        assert_eq!(rounding_divide_by_pot(7, 2), 2); // 1.75 -> 2
        assert_eq!(rounding_divide_by_pot(-7, 2), -2);
    }

    #[test]
    fn test_rdpot_matches_plain_division_on_exact_multiples() {
        for x in [-1024, -512, 0, 512, 1024] {
            assert_eq!(rounding_divide_by_pot(x, 4), x / 16);
        }
    }

    #[test]
    fn test_real_binary_ew() {
        let shape = Shape::new(&[3]);
        let (out, out_shape) = real_binary_ew(
            RealBinaryFn::Add,
            &[1.0, 2.0, 3.0],
            &shape,
            &[4.0, 5.0, 6.0],
            &shape,
            None,
        )
        .unwrap();
        assert_eq!(out, [5.0, 7.0, 9.0]);
        assert_eq!(out_shape, shape);

        let (out, _) = real_binary_ew(
            RealBinaryFn::Div,
            &[1.0, 9.0],
            &Shape::new(&[2]),
            &[2.0, 3.0],
            &Shape::new(&[2]),
            None,
        )
        .unwrap();
        assert_eq!(out, [0.5, 3.0]);
    }

    #[test]
    fn test_real_binary_ew_broadcast() {
        let (out, out_shape) = real_binary_ew(
            RealBinaryFn::Mul,
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &Shape::new(&[2, 3]),
            &[10.0, 20.0, 30.0],
            &Shape::new(&[3]),
            None,
        )
        .unwrap();
        assert_eq!(out_shape.dims(), &[2, 3]);
        assert_eq!(out, [10.0, 40.0, 90.0, 40.0, 100.0, 180.0]);
    }

    #[test]
    fn test_real_binary_ew_clamp() {
        let shape = Shape::new(&[3]);
        let (out, _) = real_binary_ew(
            RealBinaryFn::Sub,
            &[1.0, 5.0, -5.0],
            &shape,
            &[0.0, 0.0, 0.0],
            &shape,
            Some((-2.0, 2.0)),
        )
        .unwrap();
        assert_eq!(out, [1.0, 2.0, -2.0]);
    }

    #[test]
    fn test_real_binary_ew_shape_mismatch() {
        assert!(real_binary_ew(
            RealBinaryFn::Add,
            &[1.0, 2.0],
            &Shape::new(&[2]),
            &[1.0, 2.0, 3.0],
            &Shape::new(&[3]),
            None,
        )
        .is_none());
    }

    #[test]
    fn test_real_binary_ew_bias() {
        let shape = Shape::new(&[2, 2]);
        let (out, _) = real_binary_ew_bias(
            RealBinaryFn::Mul,
            &[1.0, 2.0, 3.0, 4.0],
            &shape,
            &[2.0, 2.0, 2.0, 2.0],
            &shape,
            &[0.5, -0.5],
            &Shape::new(&[2]),
            None,
        )
        .unwrap();
        assert_eq!(out, [2.5, 3.5, 6.5, 7.5]);
    }

    #[test]
    fn test_real_unary_ew_identity_no_clamp() {
        let data = [-2.5, 0.0, 7.0];
        assert_eq!(real_unary_ew(UnaryFn::Identity, &data, None), data);
    }

    #[test]
    fn test_real_unary_ew_with_clamp() {
        let out = real_unary_ew(UnaryFn::Square, &[1.0, 2.0, 3.0], Some((0.0, 5.0)));
        assert_eq!(out, [1.0, 4.0, 5.0]);
    }

    #[test]
    fn test_real_compare_zero_ew_spec_vector() {
        // [-2, 0, 3] under CMPGZ -> [false, false, true].
        assert_eq!(
            real_compare_zero_ew(CompareFn::Cmpgz, &[-2.0, 0.0, 3.0]),
            [false, false, true]
        );
    }

    #[test]
    fn test_real_matmul_2d() {
        let (out, out_shape) = real_matmul(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            &Shape::new(&[2, 3]),
            &[7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            &Shape::new(&[3, 2]),
            None,
        )
        .unwrap();
        assert_eq!(out_shape.dims(), &[2, 2]);
        assert_eq!(out, [58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_real_matmul_batched() {
        // [2, 1, 2] x [2, 1] -> [2, 1, 1]
        let (out, out_shape) = real_matmul(
            &[1.0, 2.0, 3.0, 4.0],
            &Shape::new(&[2, 1, 2]),
            &[10.0, 1.0],
            &Shape::new(&[2, 1]),
            None,
        )
        .unwrap();
        assert_eq!(out_shape.dims(), &[2, 1, 1]);
        assert_eq!(out, [12.0, 34.0]);
    }

    #[test]
    fn test_real_matmul_bias_equals_matmul_plus_broadcast() {
        let lhs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let lhs_shape = Shape::new(&[3, 2]);
        let rhs = [1.0, 0.5, -1.0, 2.0];
        let rhs_shape = Shape::new(&[2, 2]);
        let bias = [10.0, -10.0];

        let (plain, shape) = real_matmul(&lhs, &lhs_shape, &rhs, &rhs_shape, None).unwrap();
        let (biased, biased_shape) =
            real_matmul_bias(&lhs, &lhs_shape, &rhs, &rhs_shape, &bias, None).unwrap();
        assert_eq!(shape, biased_shape);
        for (i, (p, b)) in plain.iter().zip(&biased).enumerate() {
            assert_eq!(p + bias[i % 2], *b);
        }
    }

    #[test]
    fn test_real_matmul_contract_mismatch() {
        assert!(real_matmul(
            &[1.0, 2.0],
            &Shape::new(&[1, 2]),
            &[1.0, 2.0, 3.0],
            &Shape::new(&[3, 1]),
            None,
        )
        .is_none());
    }
}
