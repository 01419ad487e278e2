// numeric.rs
// Copyright 2025 Patrick Meade
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Gaussian helpers and the truncated-Gaussian correction terms.
//!
//! The error function is the Abramowitz-Stegun 7.1.26 rational
//! approximation (absolute error below 1.5e-7). It is used in place of a
//! platform `erf` so results are bit-identical everywhere.

use std::f64::consts::{PI, SQRT_2};

// Abramowitz-Stegun 7.1.26 coefficients
const ERF_A1: f64 = 0.254829592;
const ERF_A2: f64 = -0.284496736;
const ERF_A3: f64 = 1.421413741;
const ERF_A4: f64 = -1.453152027;
const ERF_A5: f64 = 1.061405429;
const ERF_P: f64 = 0.3275911;

/// Absolute error bound of the erf approximation. A tail mass smaller
/// than this carries no usable digits, so the correction functions switch
/// to their asymptotic forms below it.
const ERF_MAX_ERROR: f64 = 1.5e-7;

/// Draw windows at most this wide (half-width, in units of `c`) are
/// integrated directly. Their mass is too close to the erf error for the
/// cdf difference to resolve the `1 - width² / 12` shrink.
const NARROW_WINDOW_HALF_WIDTH: f64 = 0.5;

// 8-point Gauss-Legendre nodes and weights on [-1, 1], positive half
const GAUSS_NODES: [f64; 4] = [
    0.1834346424956498,
    0.5255324099163290,
    0.7966664774136267,
    0.9602898564975363,
];
const GAUSS_WEIGHTS: [f64; 4] = [
    0.3626837833783620,
    0.3137066458778873,
    0.2223810344533745,
    0.1012285362903763,
];

/// Complementary error function for `x >= 0`.
///
/// Kept separate from [`erf`] so the lower tail of [`normal_cdf`] does not
/// lose every significant digit to `1.0 - y` cancellation.
fn erfc_positive(x: f64) -> f64 {
    let t = 1.0 / (1.0 + ERF_P * x);
    let poly = ((((ERF_A5 * t + ERF_A4) * t + ERF_A3) * t + ERF_A2) * t + ERF_A1) * t;
    poly * (-x * x).exp()
}

/// Error function approximation.
pub fn erf(x: f64) -> f64 {
    let y = 1.0 - erfc_positive(x.abs());
    if x >= 0.0 { y } else { -y }
}

/// Standard normal probability density.
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Standard normal cumulative distribution, built on [`erf`]'s polynomial.
pub fn normal_cdf(x: f64) -> f64 {
    let z = x / SQRT_2;
    if z >= 0.0 {
        1.0 - 0.5 * erfc_positive(z)
    } else {
        0.5 * erfc_positive(-z)
    }
}

/// Inverse of the standard normal CDF.
///
/// Acklam's rational approximation followed by one Halley step against
/// [`normal_cdf`], so `normal_cdf(normal_ppf(p))` round-trips with this
/// crate's own CDF. Returns `±inf` at the ends of the domain and NaN for
/// inputs outside `[0, 1]`.
pub fn normal_ppf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549671010249219e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    let x = if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    };

    // one Halley refinement step
    let e = normal_cdf(x) - p;
    let u = e * (2.0 * PI).sqrt() * (0.5 * x * x).exp();
    x - u / (1.0 + 0.5 * x * u)
}

/// Draw margin in performance units for a given draw probability.
///
/// `Φ⁻¹((p + 1) / 2) · √2 · β`: the performance gap inside which two
/// players of equal skill are expected to draw with probability `p`.
pub fn draw_margin(draw_probability: f64, beta: f64) -> f64 {
    normal_ppf((draw_probability + 1.0) / 2.0) * SQRT_2 * beta
}

/// Mean shift for a decisive outcome, `φ(t) / Φ(t)`.
pub fn v_win(t: f64) -> f64 {
    let denom = normal_cdf(t);
    if denom < ERF_MAX_ERROR {
        // Mills ratio expansion
        return -t - 1.0 / t + 2.0 / t.powi(3);
    }
    normal_pdf(t) / denom
}

/// Variance shrink for a decisive outcome, `v · (v + t)`, in `[0, 1]`.
pub fn w_win(t: f64) -> f64 {
    let denom = normal_cdf(t);
    if denom < ERF_MAX_ERROR {
        return 1.0 - 1.0 / t.powi(2) + 6.0 / t.powi(4);
    }
    let v = normal_pdf(t) / denom;
    v * (v + t)
}

/// Mean and shrink of a standard normal truncated to `[a - width, a]`
/// deep in the lower tail, where it is close to `a` minus an exponential
/// with rate `-a` cut off at `width`.
fn lower_tail_window(a: f64, width: f64) -> (f64, f64) {
    let rate = -a;
    // 1/em1 goes to 0 rather than NaN once exp_m1 overflows
    let inv = 1.0 / (rate * width).exp_m1();
    let mean = 1.0 / rate - width * inv;
    let variance = 1.0 / (rate * rate) - width * width * (inv + inv * inv);
    (a - mean, 1.0 - variance)
}

/// Mean and shrink of a standard normal truncated to
/// `[center - half_width, center + half_width]`, by quadrature of the
/// density relative to its value at `center`.
fn narrow_window(center: f64, half_width: f64) -> (f64, f64) {
    let (mut mass, mut first, mut second) = (0.0, 0.0, 0.0);
    for (node, weight) in GAUSS_NODES.iter().zip(GAUSS_WEIGHTS) {
        let d = node * half_width;
        let damp = (-0.5 * d * d).exp();
        // offsets +d and -d, summed as a pair so v is exactly 0 at center 0
        let up = weight * damp * (-center * d).exp();
        let down = weight * damp * (center * d).exp();
        mass += up + down;
        first += (up - down) * d;
        second += (up + down) * d * d;
    }
    let offset = first / mass;
    let variance = second / mass - offset * offset;
    (center + offset, 1.0 - variance)
}

/// Mean shift for a draw, where `draw_margin` is measured in units of `c`.
///
/// Odd in `t`: the higher-rated side of a draw moves down.
pub fn v_draw(t: f64, draw_margin: f64) -> f64 {
    let abs_t = t.abs();
    let a = draw_margin - abs_t;
    let b = -draw_margin - abs_t;
    let v = if normal_cdf(a) < ERF_MAX_ERROR {
        lower_tail_window(a, 2.0 * draw_margin).0
    } else if draw_margin <= NARROW_WINDOW_HALF_WIDTH {
        narrow_window(-abs_t, draw_margin).0
    } else {
        (normal_pdf(b) - normal_pdf(a)) / (normal_cdf(a) - normal_cdf(b))
    };
    if t < 0.0 { -v } else { v }
}

/// Variance shrink for a draw, in `(0, 1)`.
pub fn w_draw(t: f64, draw_margin: f64) -> f64 {
    let abs_t = t.abs();
    let a = draw_margin - abs_t;
    let b = -draw_margin - abs_t;
    if normal_cdf(a) < ERF_MAX_ERROR {
        return lower_tail_window(a, 2.0 * draw_margin).1;
    }
    if draw_margin <= NARROW_WINDOW_HALF_WIDTH {
        return narrow_window(-abs_t, draw_margin).1;
    }
    let denom = normal_cdf(a) - normal_cdf(b);
    let v = v_draw(abs_t, draw_margin);
    v * v + (a * normal_pdf(a) - b * normal_pdf(b)) / denom
}

// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------------------------
