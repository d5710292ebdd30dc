//! Orientation and incircle predicates.
//!
//! Two flavours are provided:
//!
//! - `*_fast`: plain floating-point determinants. Cheap, but the sign can be
//!   wrong for nearly degenerate input.
//! - [`orient2d`] / [`incircle`]: adaptive predicates. The floating-point
//!   determinant is accepted when it clears a forward error bound; otherwise
//!   the determinant is re-evaluated exactly with floating-point expansions
//!   and the sign of the exact value is returned.
//!
//! All predicates return a value whose sign carries the answer:
//!
//! - `orient2d(a, b, c) > 0` iff `c` lies to the left of the directed line `a -> b`
//!   (the triangle `a, b, c` is counter-clockwise).
//! - `incircle(a, b, c, d) > 0` iff `d` lies inside the circle through the
//!   counter-clockwise triangle `a, b, c`.

use nalgebra::Point2;

/// Half a unit in the last place of 1.0.
const EPSILON: f64 = f64::EPSILON * 0.5;

const CCW_ERRBOUND: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;
const ICC_ERRBOUND: f64 = (10.0 + 96.0 * EPSILON) * EPSILON;

/// Floating-point orientation determinant.
#[inline]
pub fn orient2d_fast(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (a.x - c.x) * (b.y - c.y) - (a.y - c.y) * (b.x - c.x)
}

/// Floating-point incircle determinant.
#[inline]
pub fn incircle_fast(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    alift * (bdx * cdy - cdx * bdy) + blift * (cdx * ady - adx * cdy) + clift * (adx * bdy - bdx * ady)
}

/// Adaptive orientation predicate.
///
/// The sign of the result is exact for all finite inputs.
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let detleft = (a.x - c.x) * (b.y - c.y);
    let detright = (a.y - c.y) * (b.x - c.x);
    let det = detleft - detright;

    let detsum = if detleft > 0.0 {
        if detright <= 0.0 {
            return det;
        }
        detleft + detright
    } else if detleft < 0.0 {
        if detright >= 0.0 {
            return det;
        }
        -detleft - detright
    } else {
        return det;
    };

    let errbound = CCW_ERRBOUND * detsum;
    if det >= errbound || -det >= errbound {
        return det;
    }

    orient2d_exact(a, b, c)
}

/// Adaptive incircle predicate.
///
/// The sign of the result is exact for all finite inputs.
pub fn incircle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    let adx = a.x - d.x;
    let ady = a.y - d.y;
    let bdx = b.x - d.x;
    let bdy = b.y - d.y;
    let cdx = c.x - d.x;
    let cdy = c.y - d.y;

    let bdxcdy = bdx * cdy;
    let cdxbdy = cdx * bdy;
    let cdxady = cdx * ady;
    let adxcdy = adx * cdy;
    let adxbdy = adx * bdy;
    let bdxady = bdx * ady;

    let alift = adx * adx + ady * ady;
    let blift = bdx * bdx + bdy * bdy;
    let clift = cdx * cdx + cdy * cdy;

    let det = alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);

    let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
        + (cdxady.abs() + adxcdy.abs()) * blift
        + (adxbdy.abs() + bdxady.abs()) * clift;
    let errbound = ICC_ERRBOUND * permanent;
    if det > errbound || -det > errbound {
        return det;
    }

    incircle_exact(a, b, c, d)
}

// ==================== Exact evaluation ====================
//
// Expansions are stored least significant component first. Components are
// non-overlapping and zero components are dropped, so the sign of an
// expansion is the sign of its last element.

#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    (s, err)
}

#[inline]
fn two_diff(a: f64, b: f64) -> (f64, f64) {
    two_sum(a, -b)
}

#[inline]
fn two_product(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    (p, f64::mul_add(a, b, -p))
}

fn diff_expansion(a: f64, b: f64) -> Vec<f64> {
    let (hi, lo) = two_diff(a, b);
    compress(vec![lo, hi])
}

fn compress(mut e: Vec<f64>) -> Vec<f64> {
    e.retain(|&x| x != 0.0);
    e
}

fn grow_expansion(e: &[f64], b: f64) -> Vec<f64> {
    let mut h = Vec::with_capacity(e.len() + 1);
    let mut q = b;
    for &component in e {
        let (sum, err) = two_sum(q, component);
        h.push(err);
        q = sum;
    }
    h.push(q);
    compress(h)
}

fn expansion_sum(e: &[f64], f: &[f64]) -> Vec<f64> {
    let mut h = e.to_vec();
    for &component in f {
        h = grow_expansion(&h, component);
    }
    h
}

fn scale_expansion(e: &[f64], b: f64) -> Vec<f64> {
    let mut h = Vec::with_capacity(2 * e.len());
    let Some((&first, rest)) = e.split_first() else {
        return h;
    };
    let (mut q, lo) = two_product(first, b);
    h.push(lo);
    for &component in rest {
        let (p_hi, p_lo) = two_product(component, b);
        let (sum, err) = two_sum(q, p_lo);
        h.push(err);
        let (sum2, err2) = two_sum(p_hi, sum);
        h.push(err2);
        q = sum2;
    }
    h.push(q);
    compress(h)
}

fn expansion_product(e: &[f64], f: &[f64]) -> Vec<f64> {
    f.iter()
        .fold(Vec::new(), |acc, &component| expansion_sum(&acc, &scale_expansion(e, component)))
}

fn negate(e: &[f64]) -> Vec<f64> {
    e.iter().map(|x| -x).collect()
}

/// Most significant component, which carries the sign of the expansion.
fn estimate(e: &[f64]) -> f64 {
    e.last().copied().unwrap_or(0.0)
}

fn orient2d_exact(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let acx = diff_expansion(a.x, c.x);
    let acy = diff_expansion(a.y, c.y);
    let bcx = diff_expansion(b.x, c.x);
    let bcy = diff_expansion(b.y, c.y);

    let left = expansion_product(&acx, &bcy);
    let right = expansion_product(&acy, &bcx);
    estimate(&expansion_sum(&left, &negate(&right)))
}

fn incircle_exact(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    let adx = diff_expansion(a.x, d.x);
    let ady = diff_expansion(a.y, d.y);
    let bdx = diff_expansion(b.x, d.x);
    let bdy = diff_expansion(b.y, d.y);
    let cdx = diff_expansion(c.x, d.x);
    let cdy = diff_expansion(c.y, d.y);

    let cross = |px: &[f64], py: &[f64], qx: &[f64], qy: &[f64]| {
        expansion_sum(&expansion_product(px, qy), &negate(&expansion_product(qx, py)))
    };
    let lift = |px: &[f64], py: &[f64]| {
        expansion_sum(&expansion_product(px, px), &expansion_product(py, py))
    };

    let bc = cross(&bdx, &bdy, &cdx, &cdy);
    let ca = cross(&cdx, &cdy, &adx, &ady);
    let ab = cross(&adx, &ady, &bdx, &bdy);

    let aterm = expansion_product(&lift(&adx, &ady), &bc);
    let bterm = expansion_product(&lift(&bdx, &bdy), &ca);
    let cterm = expansion_product(&lift(&cdx, &cdy), &ab);

    estimate(&expansion_sum(&expansion_sum(&aterm, &bterm), &cterm))
}
