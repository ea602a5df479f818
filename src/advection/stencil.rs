//! Linear face reconstructions.
//!
//! Every reconstruction works on a six-point stencil `s` around the face
//! between cells `s[2]` (left/low) and `s[3]` (right/high). Narrow schemes
//! only read the centre of the stencil; the unused entries may hold
//! anything. The second argument is the face mass flux, used by upwind
//! schemes to pick the upstream side.

/// Face reconstruction: `(stencil, face flux) -> face value`.
pub type FaceFn = fn(&[f64; 6], f64) -> f64;

/// Sign of the face flux, zero below machine epsilon.
#[inline(always)]
pub(crate) fn upwind_sign(upw: f64) -> f64 {
    if upw.abs() < f64::EPSILON {
        0.0
    } else {
        upw.signum()
    }
}

/// Second-order centred.
#[inline]
pub fn centered_2nd(s: &[f64; 6], _upw: f64) -> f64 {
    0.5 * (s[2] + s[3])
}

/// Fourth-order centred.
#[inline]
pub fn centered_4th(s: &[f64; 6], _upw: f64) -> f64 {
    (7.0 * (s[2] + s[3]) - (s[1] + s[4])) / 12.0
}

/// Sixth-order centred.
#[inline]
pub fn centered_6th(s: &[f64; 6], _upw: f64) -> f64 {
    (37.0 * (s[2] + s[3]) - 8.0 * (s[1] + s[4]) + (s[0] + s[5])) / 60.0
}

/// Third-order upwind: fourth-order centred plus flux-signed dissipation.
#[inline]
pub fn upwind_3rd(s: &[f64; 6], upw: f64) -> f64 {
    let sgn = upwind_sign(upw);
    centered_4th(s, upw) + sgn / 12.0 * ((s[4] - s[1]) - 3.0 * (s[3] - s[2]))
}

/// Fifth-order upwind: sixth-order centred plus flux-signed dissipation.
#[inline]
pub fn upwind_5th(s: &[f64; 6], upw: f64) -> f64 {
    let sgn = upwind_sign(upw);
    centered_6th(s, upw) - sgn / 60.0 * ((s[5] - s[0]) - 5.0 * (s[4] - s[1]) + 10.0 * (s[3] - s[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear() -> [f64; 6] {
        // q(x) = 2x + 1 at cell centres x = -2.5 .. 2.5; face at x = 0
        [-4.0, -2.0, 0.0, 2.0, 4.0, 6.0]
    }

    #[test]
    fn test_constant_preserved() {
        let s = [3.5; 6];
        for f in [centered_2nd, centered_4th, centered_6th, upwind_3rd, upwind_5th] {
            for upw in [-1.0, 0.0, 1.0] {
                assert!((f(&s, upw) - 3.5).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_linear_exact() {
        // Cell averages of a linear profile equal point values at centres
        let s = linear();
        let face = 0.5 * (s[2] + s[3]);
        for f in [centered_2nd, centered_4th, centered_6th, upwind_3rd, upwind_5th] {
            for upw in [-1.0, 1.0] {
                assert!((f(&s, upw) - face).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_upwind_3rd_classic_form() {
        let s = [0.0, 1.0, 4.0, 2.0, 8.0, 0.0];
        let pos = (-s[1] + 5.0 * s[2] + 2.0 * s[3]) / 6.0;
        let neg = (-s[4] + 5.0 * s[3] + 2.0 * s[2]) / 6.0;
        assert!((upwind_3rd(&s, 1.0) - pos).abs() < 1e-12);
        assert!((upwind_3rd(&s, -1.0) - neg).abs() < 1e-12);
        // Zero flux is the centred value
        assert_eq!(upwind_3rd(&s, 0.0), centered_4th(&s, 0.0));
    }

    #[test]
    fn test_upwind_5th_classic_form() {
        let s = [1.0, 3.0, -2.0, 5.0, 0.5, 7.0];
        let pos = (2.0 * s[0] - 13.0 * s[1] + 47.0 * s[2] + 27.0 * s[3] - 3.0 * s[4]) / 60.0;
        let neg = (2.0 * s[5] - 13.0 * s[4] + 47.0 * s[3] + 27.0 * s[2] - 3.0 * s[1]) / 60.0;
        assert!((upwind_5th(&s, 2.0) - pos).abs() < 1e-12);
        assert!((upwind_5th(&s, -2.0) - neg).abs() < 1e-12);
    }
}
