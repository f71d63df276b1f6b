//! Closed polygons in the poloidal (R, Z) plane.
//!
//! A flux surface sampled at N points is treated as a closed polygon; mesh
//! points are classified against it with an even-odd crossing test.

use sdp_types::error::{SdpError, SdpResult};

#[derive(Debug, Clone)]
pub struct Polygon {
    r: Vec<f64>,
    z: Vec<f64>,
    bbox: (f64, f64, f64, f64), // (r_min, r_max, z_min, z_max)
}

impl Polygon {
    /// Vertices in order; the closing edge back to the first vertex is implicit.
    pub fn new(r: Vec<f64>, z: Vec<f64>) -> SdpResult<Self> {
        if r.len() != z.len() {
            return Err(SdpError::ShapeMismatch {
                name: "polygon Z".into(),
                expected: vec![r.len()],
                found: vec![z.len()],
            });
        }
        if r.len() < 3 {
            return Err(SdpError::GridError(format!(
                "polygon needs at least 3 vertices, got {}",
                r.len()
            )));
        }
        let fold = |v: &[f64]| {
            v.iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                    (lo.min(x), hi.max(x))
                })
        };
        let (r_min, r_max) = fold(&r);
        let (z_min, z_max) = fold(&z);
        Ok(Polygon {
            r,
            z,
            bbox: (r_min, r_max, z_min, z_max),
        })
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn vertices(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.r.iter().copied().zip(self.z.iter().copied())
    }

    /// Even-odd containment test.
    pub fn contains(&self, r: f64, z: f64) -> bool {
        let (r_min, r_max, z_min, z_max) = self.bbox;
        if r < r_min || r > r_max || z < z_min || z > z_max {
            return false;
        }
        let n = self.r.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (ri, zi) = (self.r[i], self.z[i]);
            let (rj, zj) = (self.r[j], self.z[j]);
            if (zi > z) != (zj > z) {
                let r_cross = ri + (z - zi) * (rj - ri) / (zj - zi);
                if r < r_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Enclosed area (shoelace formula), positive for counter-clockwise order.
    pub fn signed_area(&self) -> f64 {
        let n = self.r.len();
        let mut acc = 0.0;
        for i in 0..n {
            let k = (i + 1) % n;
            acc += self.r[i] * self.z[k] - self.r[k] * self.z[i];
        }
        0.5 * acc
    }
}
