//! Interpolating B-spline support: kernel weights and the recursive
//! prefilter that turns sample values into B-spline coefficients.
//!
//! The prefilter is the classic cascade of causal/anti-causal first-order
//! recursive filters (Unser et al., "B-spline signal processing"), one pass
//! per pole of the spline's z-transform. After filtering, evaluating the
//! B-spline kernel against the coefficients reproduces the original samples
//! exactly at the grid nodes.

/// Value of the centered B-spline of the given degree at `x`.
fn bspline(order: usize, x: f64) -> f64 {
    if order == 0 {
        let a = x.abs();
        return if a < 0.5 {
            1.0
        } else if a == 0.5 {
            0.5
        } else {
            0.0
        };
    }
    let n = order as f64;
    let half = (n + 1.0) / 2.0;
    if x.abs() >= half {
        return 0.0;
    }
    ((x + half) * bspline(order - 1, x + 0.5) + (half - x) * bspline(order - 1, x - 0.5)) / n
}

/// Kernel taps for evaluating a spline of the given order at coordinate `x`
/// over a lane of length `n`: pairs of (clamped source index, weight).
///
/// Indices beyond either end of the lane are clamped, which extends the
/// signal with its nearest value.
pub(super) fn interpolation_taps(x: f64, n: usize, order: usize) -> Vec<(usize, f64)> {
    if order == 0 {
        let j = (x + 0.5).floor().max(0.0) as usize;
        return vec![(j.min(n - 1), 1.0)];
    }
    let half = (order as f64 + 1.0) / 2.0;
    let lo = (x - half).ceil() as isize;
    let hi = (x + half).floor() as isize;
    let mut taps = Vec::with_capacity(order + 2);
    for j in lo..=hi {
        let weight = bspline(order, x - j as f64);
        if weight != 0.0 {
            let index = j.max(0).min(n as isize - 1) as usize;
            taps.push((index, weight));
        }
    }
    taps
}

/// Poles of the direct B-spline filter for orders 2 to 5.
fn poles(order: usize) -> Vec<f64> {
    match order {
        2 => vec![8f64.sqrt() - 3.0],
        3 => vec![3f64.sqrt() - 2.0],
        4 => vec![
            (664.0 - 438976f64.sqrt()).sqrt() + 304f64.sqrt() - 19.0,
            (664.0 + 438976f64.sqrt()).sqrt() - 304f64.sqrt() - 19.0,
        ],
        5 => vec![
            (67.5 - (17745.0f64 / 4.0).sqrt()).sqrt() + 26.25f64.sqrt() - 6.5,
            (67.5 + (17745.0f64 / 4.0).sqrt()).sqrt() - 26.25f64.sqrt() - 6.5,
        ],
        _ => Vec::new(),
    }
}

fn initial_causal(c: &[f64], z: f64) -> f64 {
    // mirror boundary; truncate the influence sum once it drops below tolerance
    let tolerance = 1e-10f64;
    let horizon = (tolerance.ln() / z.abs().ln()).ceil() as usize;
    let n = c.len();
    if horizon < n {
        let mut zn = z;
        let mut sum = c[0];
        for &v in &c[1..horizon] {
            sum += zn * v;
            zn *= z;
        }
        sum
    } else {
        let z_last = z.powi(n as i32 - 1);
        let iz = 1.0 / z;
        let mut sum = c[0] + z_last * c[n - 1];
        let mut z1 = z;
        let mut z2 = z_last * z_last * iz;
        for &v in &c[1..n - 1] {
            sum += (z1 + z2) * v;
            z1 *= z;
            z2 *= iz;
        }
        sum / (1.0 - z_last * z_last)
    }
}

fn initial_anticausal(c: &[f64], z: f64) -> f64 {
    let n = c.len();
    (z / (z * z - 1.0)) * (z * c[n - 2] + c[n - 1])
}

/// In-place conversion of a lane of samples into B-spline coefficients.
/// A no-op for orders below 2 (their kernels already interpolate) and for
/// lanes too short to filter.
pub(super) fn prefilter(c: &mut [f64], order: usize) {
    let poles = poles(order);
    if poles.is_empty() || c.len() < 2 {
        return;
    }
    let gain = poles
        .iter()
        .map(|z| (1.0 - z) * (1.0 - 1.0 / z))
        .product::<f64>();
    for v in c.iter_mut() {
        *v *= gain;
    }
    let n = c.len();
    for &z in &poles {
        c[0] = initial_causal(c, z);
        for i in 1..n {
            c[i] += z * c[i - 1];
        }
        c[n - 1] = initial_anticausal(c, z);
        for i in (0..n - 1).rev() {
            c[i] = z * (c[i + 1] - c[i]);
        }
    }
}
