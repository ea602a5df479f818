//! Nonlinear WENO face reconstructions.
//!
//! Each scheme is written once as a left-biased reconstruction (upstream
//! side is `s[..3]`, used for positive face flux). The right-biased value is
//! the same function applied to the mirrored stencil. A zero flux returns the
//! mean of both biases.
//!
//! Smoothness indicators follow Jiang & Shu (1996). The Z variants use the
//! global indicator τ of Borges et al. (2008); the MZQ3 variant blends a
//! quadratic candidate with two linear ones in the manner of Zhu & Qiu.

use super::stencil::upwind_sign;

const EPS_JS: f64 = 1.0e-6;
const EPS_Z: f64 = 1.0e-40;

#[inline(always)]
fn mirrored(s: &[f64; 6]) -> [f64; 6] {
    [s[5], s[4], s[3], s[2], s[1], s[0]]
}

#[inline(always)]
fn biased(s: &[f64; 6], upw: f64, left: fn(&[f64; 6]) -> f64) -> f64 {
    let sgn = upwind_sign(upw);
    if sgn > 0.0 {
        left(s)
    } else if sgn < 0.0 {
        left(&mirrored(s))
    } else {
        0.5 * (left(s) + left(&mirrored(s)))
    }
}

// -----------------------------------------------------------------------------
// Fifth order
// -----------------------------------------------------------------------------

#[inline(always)]
fn candidates5(s: &[f64; 6]) -> ([f64; 3], [f64; 3]) {
    let (v1, v2, v3, v4, v5) = (s[0], s[1], s[2], s[3], s[4]);
    let q = [
        (2.0 * v1 - 7.0 * v2 + 11.0 * v3) / 6.0,
        (-v2 + 5.0 * v3 + 2.0 * v4) / 6.0,
        (2.0 * v3 + 5.0 * v4 - v5) / 6.0,
    ];
    let b = [
        13.0 / 12.0 * (v1 - 2.0 * v2 + v3).powi(2) + 0.25 * (v1 - 4.0 * v2 + 3.0 * v3).powi(2),
        13.0 / 12.0 * (v2 - 2.0 * v3 + v4).powi(2) + 0.25 * (v2 - v4).powi(2),
        13.0 / 12.0 * (v3 - 2.0 * v4 + v5).powi(2) + 0.25 * (3.0 * v3 - 4.0 * v4 + v5).powi(2),
    ];
    (q, b)
}

const D5: [f64; 3] = [0.1, 0.6, 0.3];

#[inline(always)]
fn combine3(q: &[f64; 3], a: &[f64; 3]) -> f64 {
    (a[0] * q[0] + a[1] * q[1] + a[2] * q[2]) / (a[0] + a[1] + a[2])
}

fn weno5_left(s: &[f64; 6]) -> f64 {
    let (q, b) = candidates5(s);
    let a = [
        D5[0] / (EPS_JS + b[0]).powi(2),
        D5[1] / (EPS_JS + b[1]).powi(2),
        D5[2] / (EPS_JS + b[2]).powi(2),
    ];
    combine3(&q, &a)
}

fn wenoz5_left(s: &[f64; 6]) -> f64 {
    let (q, b) = candidates5(s);
    let tau = (b[0] - b[2]).abs();
    let a = [
        D5[0] * (1.0 + tau / (b[0] + EPS_Z)),
        D5[1] * (1.0 + tau / (b[1] + EPS_Z)),
        D5[2] * (1.0 + tau / (b[2] + EPS_Z)),
    ];
    combine3(&q, &a)
}

// -----------------------------------------------------------------------------
// Third order
// -----------------------------------------------------------------------------

#[inline(always)]
fn candidates3(s: &[f64; 6]) -> ([f64; 2], [f64; 2]) {
    let (v1, v2, v3) = (s[1], s[2], s[3]);
    let q = [(-v1 + 3.0 * v2) / 2.0, (v2 + v3) / 2.0];
    let b = [(v2 - v1).powi(2), (v3 - v2).powi(2)];
    (q, b)
}

const D3: [f64; 2] = [1.0 / 3.0, 2.0 / 3.0];

fn weno3_left(s: &[f64; 6]) -> f64 {
    let (q, b) = candidates3(s);
    let a0 = D3[0] / (EPS_JS + b[0]).powi(2);
    let a1 = D3[1] / (EPS_JS + b[1]).powi(2);
    (a0 * q[0] + a1 * q[1]) / (a0 + a1)
}

fn wenoz3_left(s: &[f64; 6]) -> f64 {
    let (q, b) = candidates3(s);
    let tau = (b[1] - b[0]).abs();
    let a0 = D3[0] * (1.0 + tau / (b[0] + EPS_Z));
    let a1 = D3[1] * (1.0 + tau / (b[1] + EPS_Z));
    (a0 * q[0] + a1 * q[1]) / (a0 + a1)
}

const G_MZQ: [f64; 3] = [0.1, 0.1, 0.8];

fn wenomzq3_left(s: &[f64; 6]) -> f64 {
    let (v1, v2, v3) = (s[1], s[2], s[3]);
    let (ql, bl) = candidates3(s);
    let q2 = (-v1 + 5.0 * v2 + 2.0 * v3) / 6.0;
    let b2 = 13.0 / 12.0 * (v1 - 2.0 * v2 + v3).powi(2) + 0.25 * (v3 - v1).powi(2);

    let tau = 0.5 * ((b2 - bl[0]).abs() + (b2 - bl[1]).abs());
    let a0 = G_MZQ[0] * (1.0 + tau / (bl[0] + EPS_Z));
    let a1 = G_MZQ[1] * (1.0 + tau / (bl[1] + EPS_Z));
    let a2 = G_MZQ[2] * (1.0 + tau / (b2 + EPS_Z));
    let sum = a0 + a1 + a2;
    let (w0, w1, w2) = (a0 / sum, a1 / sum, a2 / sum);

    let central = (q2 - G_MZQ[0] * ql[0] - G_MZQ[1] * ql[1]) / G_MZQ[2];
    w2 * central + w0 * ql[0] + w1 * ql[1]
}

// -----------------------------------------------------------------------------
// Flux-biased entry points
// -----------------------------------------------------------------------------

/// Fifth-order WENO.
#[inline]
pub fn weno5(s: &[f64; 6], upw: f64) -> f64 {
    biased(s, upw, weno5_left)
}

/// Fifth-order WENO-Z.
#[inline]
pub fn wenoz5(s: &[f64; 6], upw: f64) -> f64 {
    biased(s, upw, wenoz5_left)
}

/// Third-order WENO.
#[inline]
pub fn weno3(s: &[f64; 6], upw: f64) -> f64 {
    biased(s, upw, weno3_left)
}

/// Third-order WENO-Z.
#[inline]
pub fn wenoz3(s: &[f64; 6], upw: f64) -> f64 {
    biased(s, upw, wenoz3_left)
}

/// Third-order WENO with quadratic central candidate.
#[inline]
pub fn wenomzq3(s: &[f64; 6], upw: f64) -> f64 {
    biased(s, upw, wenomzq3_left)
}
