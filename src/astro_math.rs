//! # Angle and root-finding utilities
//!
//! Small numeric kernel shared by every solver layer: angle normalization,
//! the Gaussian proximity kernel used by the scoring layer, a bracketed
//! bisection root-finder, and a golden-section maximizer.
//!
//! The bisection solver is the engine behind the paran search: it refines a
//! sign-change bracket found by coarse latitude sampling. Non-convergence is
//! reported through the [`BisectionResult::converged`] flag, never as an
//! error; a bracket that fails to converge is an expected outcome when the
//! coarse sampling misjudged the shape of the function.

use crate::constants::Degree;

/// Inverse golden ratio, (√5 − 1)/2.
const INV_PHI: f64 = 0.618_033_988_749_894_8;

/// Normalize an angle to the range [0°, 360°).
#[inline]
pub fn normalize_degrees(angle: Degree) -> Degree {
    angle.rem_euclid(360.0)
}

/// Normalize an angle to the symmetric range (−180°, 180°].
///
/// Used wherever a *signed* angular difference is needed, e.g. hour angles
/// and the paran timing difference.
#[inline]
pub fn normalize_degrees_symmetric(angle: Degree) -> Degree {
    let a = angle.rem_euclid(360.0);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Gaussian decay kernel `exp(−(d − μ)² / 2σ²)`.
///
/// Arguments
/// ---------
/// * `distance`: measured distance.
/// * `mu`: center of the kernel.
/// * `sigma`: standard deviation; controls how fast the score decays.
///
/// Return
/// ------
/// * A value in (0, 1], equal to 1.0 when `distance == mu`.
#[inline]
pub fn gaussian(distance: f64, mu: f64, sigma: f64) -> f64 {
    let z = (distance - mu) / sigma;
    (-0.5 * z * z).exp()
}

/// Outcome of a bracketed bisection search.
///
/// `root` is the best estimate available when the search stopped:
/// * `Some(x)`, `converged: true`: the bracket shrank below tolerance.
/// * `Some(x)`, `converged: false`: the iteration budget ran out; `x` is
///   the midpoint of the final bracket.
/// * `None`, `converged: false`: the function became unevaluable inside
///   the bracket (sentinel from the callee, or a non-finite value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BisectionResult {
    pub root: Option<Degree>,
    pub converged: bool,
}

impl BisectionResult {
    fn failed() -> Self {
        BisectionResult {
            root: None,
            converged: false,
        }
    }
}

/// Bracketed bisection root search.
///
/// The caller guarantees that `f` changes sign over `[a, b]`; the search
/// halves the bracket up to `max_iter` times, stopping as soon as
/// `|b − a| < tol`. The callee may return `None` to signal that the
/// function is undefined at a midpoint (e.g. a circumpolar latitude);
/// the search then aborts with `converged: false` rather than guessing.
///
/// Arguments
/// ---------
/// * `f`: function to solve; `None` aborts the search.
/// * `a`, `b`: bracket endpoints (must be finite).
/// * `tol`: bracket width below which the search is converged.
/// * `max_iter`: halving budget; bisection gains one bit per step, so 50
///   iterations resolve any bracket far below 1e-4°.
///
/// Return
/// ------
/// * A [`BisectionResult`]; never panics, never returns NaN in `root`.
pub fn bisection_solve<F>(f: F, a: Degree, b: Degree, tol: f64, max_iter: usize) -> BisectionResult
where
    F: Fn(Degree) -> Option<f64>,
{
    if !a.is_finite() || !b.is_finite() || !tol.is_finite() {
        return BisectionResult::failed();
    }

    let (mut lo, mut hi) = (a, b);
    let mut f_lo = match f(lo) {
        Some(v) if v.is_finite() => v,
        _ => return BisectionResult::failed(),
    };

    for _ in 0..max_iter {
        if (hi - lo).abs() < tol {
            return BisectionResult {
                root: Some(0.5 * (lo + hi)),
                converged: true,
            };
        }

        let mid = 0.5 * (lo + hi);
        let f_mid = match f(mid) {
            Some(v) if v.is_finite() => v,
            _ => return BisectionResult::failed(),
        };

        if f_lo * f_mid <= 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }

    // Budget exhausted: report the midpoint but flag non-convergence.
    BisectionResult {
        root: Some(0.5 * (lo + hi)),
        converged: false,
    }
}

/// Golden-section search for a local maximum of a smooth unimodal function.
///
/// Appropriate for refining a single dominant peak inside a bracket; the
/// scoring layer uses it on sums of Gaussians, which are smooth and locally
/// unimodal. This is not a global optimizer.
///
/// Arguments
/// ---------
/// * `f`: function to maximize.
/// * `lo`, `hi`: bracket expected to contain one dominant peak.
/// * `tol`: bracket width below which the search stops.
/// * `max_iter`: iteration budget.
///
/// Return
/// ------
/// * Abscissa of the estimated maximum (midpoint of the final bracket).
pub fn golden_section_max<F>(f: F, lo: Degree, hi: Degree, tol: f64, max_iter: usize) -> Degree
where
    F: Fn(Degree) -> f64,
{
    let (mut lo, mut hi) = (lo.min(hi), lo.max(hi));

    let mut c = hi - (hi - lo) * INV_PHI;
    let mut d = lo + (hi - lo) * INV_PHI;
    let mut f_c = f(c);
    let mut f_d = f(d);

    for _ in 0..max_iter {
        if (hi - lo).abs() < tol {
            break;
        }
        if f_c > f_d {
            hi = d;
            d = c;
            f_d = f_c;
            c = hi - (hi - lo) * INV_PHI;
            f_c = f(c);
        } else {
            lo = c;
            c = d;
            f_c = f_d;
            d = lo + (hi - lo) * INV_PHI;
            f_d = f(d);
        }
    }

    0.5 * (lo + hi)
}
