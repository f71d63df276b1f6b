//! Linear interpolation on 1D tables and on (periodic) 3D grids.
//!
//! The 1D table either holds its end values or returns a fill value off
//! the table. The 3D interpolator works on a field sampled on three axes,
//! any of which may be periodic (poloidal and toroidal angles).

use ndarray::Array3;
use sdp_types::error::{SdpError, SdpResult};

/// Piecewise-linear table y(x) on a strictly increasing abscissa.
#[derive(Debug, Clone)]
pub struct LinearInterp1D {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl LinearInterp1D {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> SdpResult<Self> {
        if x.len() != y.len() {
            return Err(SdpError::ShapeMismatch {
                name: "table values".into(),
                expected: vec![x.len()],
                found: vec![y.len()],
            });
        }
        if x.len() < 2 {
            return Err(SdpError::DataFormat(
                "interpolation table needs at least 2 points".into(),
            ));
        }
        if x.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(SdpError::DataFormat(
                "interpolation abscissa must be strictly increasing".into(),
            ));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(SdpError::DataFormat(
                "interpolation table contains non-finite values".into(),
            ));
        }
        Ok(LinearInterp1D { x, y })
    }

    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    pub fn first(&self) -> f64 {
        self.y[0]
    }

    pub fn last(&self) -> f64 {
        self.y[self.y.len() - 1]
    }

    /// Interpolate, holding the end values outside the table. NaN in, NaN out.
    pub fn eval(&self, xq: f64) -> f64 {
        if xq.is_nan() {
            return f64::NAN;
        }
        if xq <= self.x_min() {
            return self.first();
        }
        if xq >= self.x_max() {
            return self.last();
        }
        // First index with x > xq; guaranteed in 1..len by the checks above
        let i1 = self.x.partition_point(|&v| v <= xq);
        let i0 = i1 - 1;
        let t = (xq - self.x[i0]) / (self.x[i1] - self.x[i0]);
        self.y[i0] + t * (self.y[i1] - self.y[i0])
    }

    /// Interpolate, returning `fill` outside the table.
    pub fn eval_or(&self, xq: f64, fill: f64) -> f64 {
        if xq < self.x_min() || xq > self.x_max() || xq.is_nan() {
            fill
        } else {
            self.eval(xq)
        }
    }
}

/// One axis of a sampled field.
#[derive(Debug, Clone)]
pub struct GridAxis {
    points: Vec<f64>,
    /// Period for angle-like axes. Periodic axes are uniform over one period.
    period: Option<f64>,
}

impl GridAxis {
    /// Monotone, bounded axis.
    pub fn bounded(points: Vec<f64>) -> SdpResult<Self> {
        if points.is_empty() {
            return Err(SdpError::DataFormat("grid axis is empty".into()));
        }
        if points.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(SdpError::DataFormat(
                "grid axis must be strictly increasing".into(),
            ));
        }
        Ok(GridAxis {
            points,
            period: None,
        })
    }

    /// `n` uniform samples over `[start, start + period)`.
    pub fn periodic(start: f64, period: f64, n: usize) -> SdpResult<Self> {
        if n == 0 || !(period.is_finite() && period > 0.0) {
            return Err(SdpError::DataFormat(format!(
                "periodic axis invalid: n={n}, period={period}"
            )));
        }
        let step = period / n as f64;
        Ok(GridAxis {
            points: (0..n).map(|i| start + step * i as f64).collect(),
            period: Some(period),
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Bracketing indices and weight of the upper one, or `None` when the
    /// value is off a bounded axis.
    pub fn locate(&self, v: f64) -> Option<(usize, usize, f64)> {
        if v.is_nan() {
            return None;
        }
        let n = self.points.len();
        match self.period {
            Some(period) => {
                let step = period / n as f64;
                let u = (v - self.points[0]).rem_euclid(period) / step;
                let i0 = (u.floor() as usize).min(n - 1);
                let t = (u - i0 as f64).clamp(0.0, 1.0);
                Some((i0, (i0 + 1) % n, t))
            }
            None => {
                let lo = self.points[0];
                let hi = self.points[n - 1];
                if n == 1 {
                    return ((v - lo).abs() <= 1e-12).then_some((0, 0, 0.0));
                }
                if v < lo || v > hi {
                    return None;
                }
                let i1 = self.points.partition_point(|&p| p <= v).clamp(1, n - 1);
                let i0 = i1 - 1;
                let t = ((v - self.points[i0]) / (self.points[i1] - self.points[i0])).clamp(0.0, 1.0);
                Some((i0, i1, t))
            }
        }
    }
}

/// Trilinear interpolation of `field[[i0, i1, i2]]` sampled on `axes`.
/// Returns `None` if the point falls off a bounded axis.
pub fn interp3d(field: &Array3<f64>, axes: [&GridAxis; 3], p: [f64; 3]) -> Option<f64> {
    let (a0, b0, t0) = axes[0].locate(p[0])?;
    let (a1, b1, t1) = axes[1].locate(p[1])?;
    let (a2, b2, t2) = axes[2].locate(p[2])?;

    // Collapse along the last axis first
    let lerp = |lo: f64, hi: f64, t: f64| lo + t * (hi - lo);
    let c00 = lerp(field[[a0, a1, a2]], field[[a0, a1, b2]], t2);
    let c01 = lerp(field[[a0, b1, a2]], field[[a0, b1, b2]], t2);
    let c10 = lerp(field[[b0, a1, a2]], field[[b0, a1, b2]], t2);
    let c11 = lerp(field[[b0, b1, a2]], field[[b0, b1, b2]], t2);

    let c0 = lerp(c00, c01, t1);
    let c1 = lerp(c10, c11, t1);
    Some(lerp(c0, c1, t0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_interp1d_exact_nodes() {
        let table = LinearInterp1D::new(vec![0.0, 0.5, 1.0], vec![3.0, 2.0, 0.0]).unwrap();
        assert!((table.eval(0.5) - 2.0).abs() < 1e-15);
        assert!((table.eval(1.0) - 0.0).abs() < 1e-15);
        assert!((table.eval(0.75) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_interp1d_outside() {
        let table = LinearInterp1D::new(vec![0.0, 1.0], vec![1.0, 5.0]).unwrap();
        assert_eq!(table.eval(-1.0), 1.0);
        assert_eq!(table.eval(2.0), 5.0);
        assert_eq!(table.eval_or(2.0, -9.0), -9.0);
        assert_eq!(table.eval_or(f64::NAN, 0.0), 0.0);
        assert!((table.eval_or(0.25, -9.0) - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_interp1d_nan_query() {
        let table = LinearInterp1D::new(vec![0.0, 0.5, 1.0], vec![3.0, 2.0, 0.0]).unwrap();
        assert!(table.eval(f64::NAN).is_nan());
        assert_eq!(table.eval(f64::INFINITY), 0.0);
        assert_eq!(table.eval(f64::NEG_INFINITY), 3.0);
    }

    #[test]
    fn test_interp1d_rejects_bad_tables() {
        assert!(LinearInterp1D::new(vec![0.0, 0.0], vec![1.0, 2.0]).is_err());
        assert!(LinearInterp1D::new(vec![0.0], vec![1.0]).is_err());
        assert!(LinearInterp1D::new(vec![0.0, 1.0], vec![1.0]).is_err());
        assert!(LinearInterp1D::new(vec![0.0, 1.0], vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_periodic_axis_wraps() {
        let axis = GridAxis::periodic(0.0, 2.0 * PI, 8).unwrap();
        let step = 2.0 * PI / 8.0;
        let (i0, i1, t) = axis.locate(7.5 * step).unwrap();
        assert_eq!((i0, i1), (7, 0));
        assert!((t - 0.5).abs() < 1e-12);
        let (i0, _, t) = axis.locate(-0.5 * step).unwrap();
        assert_eq!(i0, 7);
        assert!((t - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bounded_axis_outside() {
        let axis = GridAxis::bounded(vec![0.0, 0.5, 1.0]).unwrap();
        assert!(axis.locate(1.01).is_none());
        assert!(axis.locate(-0.01).is_none());
        let (i0, i1, t) = axis.locate(1.0).unwrap();
        assert_eq!((i0, i1), (1, 2));
        assert!((t - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_interp3d_linear_field() {
        let ax0 = GridAxis::bounded(vec![0.0, 1.0, 2.0]).unwrap();
        let ax1 = GridAxis::bounded(vec![0.0, 1.0]).unwrap();
        let ax2 = GridAxis::bounded(vec![0.0, 2.0, 4.0, 6.0]).unwrap();
        // f = i0 + 10 * i1 + 0.5 * x2, linear in every coordinate
        let field = Array3::from_shape_fn((3, 2, 4), |(i, j, k)| {
            i as f64 + 10.0 * j as f64 + 0.5 * (2.0 * k as f64)
        });
        let v = interp3d(&field, [&ax0, &ax1, &ax2], [1.5, 0.25, 3.0]).unwrap();
        assert!((v - (1.5 + 2.5 + 1.5)).abs() < 1e-12, "v = {v}");
        assert!(interp3d(&field, [&ax0, &ax1, &ax2], [2.5, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_interp3d_periodic_seam() {
        let zeta = GridAxis::periodic(0.0, 2.0 * PI, 4).unwrap();
        let theta = GridAxis::periodic(0.0, 2.0 * PI, 4).unwrap();
        let a = GridAxis::bounded(vec![0.0, 1.0]).unwrap();
        let field = Array3::from_shape_fn((4, 4, 2), |(_, j, _)| if j == 0 { 1.0 } else if j == 3 { 3.0 } else { 0.0 });
        // Halfway between theta index 3 and the wrapped index 0
        let v = interp3d(&field, [&zeta, &theta, &a], [0.1, 1.75 * PI, 0.5]).unwrap();
        assert!((v - 2.0).abs() < 1e-12, "v = {v}");
    }
}
