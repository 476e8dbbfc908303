//! Lattice geometry and site indexing.

use crate::error::{LatticeError, Result};

/// Number of space-time dimensions.
pub const ND: usize = 4;

/// Temporal axis (the decay direction).
pub const T_DIR: usize = ND - 1;

/// Axis labels used in displacement and boost labels.
pub const AXIS_LABELS: [&str; ND] = ["x", "y", "z", "t"];

/// Label of a zero spatial displacement.
pub const NO_DISPLACEMENT: &str = "px0py0pz0";

/// Extents of a 4D lattice.
///
/// Sites are numbered lexicographically with `x` fastest and `t` slowest, so
/// the sites of one timeslice are contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    extents: [usize; ND],
}

impl Geometry {
    /// Create a geometry from `[Lx, Ly, Lz, Lt]`.
    pub fn new(extents: [usize; ND]) -> Result<Self> {
        if let Some(axis) = extents.iter().position(|&l| l == 0) {
            return Err(LatticeError::ZeroExtent { axis });
        }
        Ok(Self { extents })
    }

    /// Extents `[Lx, Ly, Lz, Lt]`.
    pub fn extents(&self) -> [usize; ND] {
        self.extents
    }

    /// Extent along one axis.
    pub fn extent(&self, axis: usize) -> usize {
        self.extents[axis]
    }

    /// Total number of sites.
    pub fn volume(&self) -> usize {
        self.extents.iter().product()
    }

    /// Number of sites in one timeslice.
    pub fn spatial_volume(&self) -> usize {
        self.extents[..T_DIR].iter().product()
    }

    /// Temporal extent.
    pub fn time_extent(&self) -> usize {
        self.extents[T_DIR]
    }

    /// Linear site index of a coordinate.
    pub fn site_index(&self, coords: [usize; ND]) -> usize {
        let mut index = 0;
        for axis in (0..ND).rev() {
            index = index * self.extents[axis] + coords[axis];
        }
        index
    }

    /// Coordinate of a linear site index.
    pub fn coords(&self, site: usize) -> [usize; ND] {
        let mut coords = [0; ND];
        let mut rest = site;
        for (axis, coord) in coords.iter_mut().enumerate() {
            *coord = rest % self.extents[axis];
            rest /= self.extents[axis];
        }
        coords
    }

    /// Timeslice of a site.
    pub fn timeslice(&self, site: usize) -> usize {
        site / self.spatial_volume()
    }

    /// Spatial stride of an axis within one timeslice.
    pub(crate) fn stride(&self, axis: usize) -> usize {
        self.extents[..axis].iter().product()
    }

    /// Minimal-image spatial separation `to - from`, each component wrapped
    /// into `(-L/2, L/2]`.
    pub fn spatial_separation(&self, from: [i64; ND], to: [i64; ND]) -> [i64; T_DIR] {
        let mut disp = [0i64; T_DIR];
        for (axis, d) in disp.iter_mut().enumerate() {
            let l = self.extents[axis] as i64;
            let mut v = (to[axis] - from[axis]).rem_euclid(l);
            if v > l / 2 {
                v -= l;
            }
            *d = v;
        }
        disp
    }

    /// Displacement label of `to` relative to `from`, e.g. `px0py2mz1`.
    pub fn displacement_label(&self, from: [i64; ND], to: [i64; ND]) -> String {
        direction_label(&self.spatial_separation(from, to))
    }
}

/// Format integer components as `p|m` + axis + magnitude, e.g. `px0py0pz0`.
pub fn direction_label(components: &[i64]) -> String {
    let mut label = String::new();
    for (axis, &v) in components.iter().enumerate().take(ND) {
        label.push(if v >= 0 { 'p' } else { 'm' });
        label.push_str(AXIS_LABELS[axis]);
        label.push_str(&v.unsigned_abs().to_string());
    }
    label
}
