// ==============================================================================
// track.rs — PROCEDURAL CIRCUIT (CENTERLINE + BOUNDARY OFFSETS)
// ------------------------------------------------------------------------------
// Produces a closed loop on the ground plane (x, z) from a handful of params:
//
//     angle_i  = (i / n) * 2π
//     radius_i = base + A1 * sin(2 * angle_i) + A2 * cos(4 * angle_i)
//     p_i      = (cos(angle_i) * radius_i, sin(angle_i) * radius_i)
//
// The shape is fully deterministic. `TrackParams::randomized` only picks the
// two amplitudes from an RNG; the generator never touches randomness.
//
// Boundaries:
// - tangent_i = normalize(p[i+1] - p[i-1])   (indices wrap)
// - perp_i    = tangent rotated 90° so it points away from the loop interior
// - outer_i   = p_i + perp_i * half_width
// - inner_i   = p_i - perp_i * half_width
//
// Degenerate tangents (coincident neighbours) reuse the previous valid one.
// No self-intersection check is done: small point counts with large
// amplitudes can fold the inner boundary over itself.
// ==============================================================================

use std::f32::consts::TAU;
use std::fmt;

use rand::Rng;
use serde::Serialize;

pub const MIN_POINTS: usize = 3;

/// Default harmonic amplitudes `[A1, A2]`.
pub const DEFAULT_AMPLITUDES: [f32; 2] = [20.0, 10.0];

#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    InvalidParameter { name: &'static str, value: f64 },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::InvalidParameter { name, value } => {
                write!(f, "invalid track parameter `{name}`: {value}")
            }
        }
    }
}

impl std::error::Error for TrackError {}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackPoint {
    pub x: f32,
    pub z: f32,
}

impl TrackPoint {
    #[inline]
    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    #[inline]
    fn sub(self, o: TrackPoint) -> TrackPoint {
        TrackPoint::new(self.x - o.x, self.z - o.z)
    }

    #[inline]
    fn offset(self, dir: TrackPoint, s: f32) -> TrackPoint {
        TrackPoint::new(self.x + dir.x * s, self.z + dir.z * s)
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackParams {
    pub point_count: usize,
    pub base_radius: f32,
    pub amplitudes: [f32; 2],
    pub half_width: f32,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            point_count: 32,
            base_radius: 180.0,
            amplitudes: DEFAULT_AMPLITUDES,
            half_width: 12.0,
        }
    }
}

impl TrackParams {
    /// Same loop, but with both amplitudes drawn from `[0, 0.15 * base_radius]`.
    pub fn randomized<R: Rng>(rng: &mut R, point_count: usize, base_radius: f32, half_width: f32) -> Self {
        let max_amp = (base_radius * 0.15).max(0.0);
        let mut amp = || if max_amp > 0.0 { rng.gen_range(0.0..=max_amp) } else { 0.0 };
        let amplitudes = [amp(), amp()];

        Self { point_count, base_radius, amplitudes, half_width }
    }
}

/// Immutable once built; handed to the renderer at session start.
#[derive(Debug, Clone, Serialize)]
pub struct TrackGeometry {
    pub centerline: Vec<TrackPoint>,
    pub outer: Vec<TrackPoint>,
    pub inner: Vec<TrackPoint>,
    pub half_width: f32,
}

impl TrackGeometry {
    pub fn len(&self) -> usize {
        self.centerline.len()
    }

    /// Spawn pose: first centerline point plus the heading of its tangent
    /// (planar angle, `atan2(z, x)`).
    pub fn start_pose(&self) -> (TrackPoint, f32) {
        let n = self.centerline.len();
        let p = self.centerline[0];
        let t = self.centerline[1 % n].sub(self.centerline[n - 1]);
        let heading = if t.length() > 1e-6 { t.z.atan2(t.x) } else { 0.0 };
        (p, heading)
    }
}

/// Build the closed centerline and both boundaries.
pub fn generate(params: &TrackParams) -> Result<TrackGeometry, TrackError> {
    let TrackParams { point_count, base_radius, amplitudes, half_width } = *params;

    if point_count < MIN_POINTS {
        return Err(TrackError::InvalidParameter { name: "point_count", value: point_count as f64 });
    }
    if !(base_radius > 0.0) || !base_radius.is_finite() {
        return Err(TrackError::InvalidParameter { name: "base_radius", value: base_radius as f64 });
    }
    if !(half_width >= 0.0) || !half_width.is_finite() {
        return Err(TrackError::InvalidParameter { name: "half_width", value: half_width as f64 });
    }

    let [a1, a2] = amplitudes;
    let centerline: Vec<TrackPoint> = (0..point_count)
        .map(|i| {
            let angle = (i as f32 / point_count as f32) * TAU;
            let radius = base_radius + a1 * (2.0 * angle).sin() + a2 * (4.0 * angle).cos();
            TrackPoint::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect();

    let (outer, inner) = offset_boundaries(&centerline, half_width);

    Ok(TrackGeometry { centerline, outer, inner, half_width })
}

/// Central-difference tangent per point, rotated outward.
fn offset_boundaries(points: &[TrackPoint], half_width: f32) -> (Vec<TrackPoint>, Vec<TrackPoint>) {
    let n = points.len();
    let mut outer = Vec::with_capacity(n);
    let mut inner = Vec::with_capacity(n);

    // fallback until a valid tangent has been seen
    let mut last_tangent = TrackPoint::new(1.0, 0.0);

    for i in 0..n {
        let next = points[(i + 1) % n];
        let prev = points[(i + n - 1) % n];
        let d = next.sub(prev);
        let len = d.length();

        let tangent = if len > 1e-6 {
            TrackPoint::new(d.x / len, d.z / len)
        } else {
            last_tangent
        };
        last_tangent = tangent;

        // CCW loop: (t.z, -t.x) points away from the interior
        let perp = TrackPoint::new(tangent.z, -tangent.x);

        outer.push(points[i].offset(perp, half_width));
        inner.push(points[i].offset(perp, -half_width));
    }

    (outer, inner)
}
