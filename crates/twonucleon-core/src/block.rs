//! Half-baryon blocks.
//!
//! A block stores, on every lattice site, the tensor
//! `B[iS1][jS1][iC1][iS2][jS2][iC2][jC2]` with half-spin indices in `0..2`
//! and colour indices in `0..3`. The 432 entries of a site live in one
//! fixed-size array, so fields of blocks never allocate per site.

use std::fmt;
use std::ops::{Index, IndexMut};

use num_complex::Complex64;
use num_traits::Zero;
use twonucleon_lattice::{Geometry, LatticeField, SiteValue};

use crate::spin::NS_HALF;

/// Number of colours.
pub const NC: usize = 3;

/// Extents of the seven block indices, slowest first.
pub const BLOCK_DIMS: [usize; 7] = [NS_HALF, NS_HALF, NC, NS_HALF, NS_HALF, NC, NC];

/// Complex entries per site.
pub const BLOCK_LEN: usize = NS_HALF * NS_HALF * NC * NS_HALF * NS_HALF * NC * NC;

/// Sign label of a half-baryon block (`+1` source-side, `-1` sink-side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockSign {
    Plus,
    Minus,
}

impl BlockSign {
    pub fn value(self) -> i32 {
        match self {
            BlockSign::Plus => 1,
            BlockSign::Minus => -1,
        }
    }
}

impl fmt::Display for BlockSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.value())
    }
}

/// Position of one entry in a site block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockIndex([usize; 7]);

impl BlockIndex {
    /// Index from `[iS1, jS1, iC1, iS2, jS2, iC2, jC2]`, or `None` if any
    /// component is out of range.
    pub fn new(indices: [usize; 7]) -> Option<Self> {
        indices
            .iter()
            .zip(BLOCK_DIMS)
            .all(|(&i, dim)| i < dim)
            .then_some(Self(indices))
    }

    pub fn indices(&self) -> [usize; 7] {
        self.0
    }

    /// Row-major offset into a site block.
    pub fn offset(&self) -> usize {
        self.0
            .iter()
            .zip(BLOCK_DIMS)
            .fold(0, |acc, (&i, dim)| acc * dim + i)
    }

    /// Inverse of [`offset`](Self::offset).
    pub fn from_offset(mut offset: usize) -> Self {
        let mut indices = [0; 7];
        for (slot, dim) in indices.iter_mut().zip(BLOCK_DIMS).rev() {
            *slot = offset % dim;
            offset /= dim;
        }
        Self(indices)
    }
}

/// The 432 block entries of one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteBlock([Complex64; BLOCK_LEN]);

impl Default for SiteBlock {
    fn default() -> Self {
        Self([Complex64::zero(); BLOCK_LEN])
    }
}

impl SiteBlock {
    pub fn from_array(entries: [Complex64; BLOCK_LEN]) -> Self {
        Self(entries)
    }

    pub fn from_fn(mut f: impl FnMut(BlockIndex) -> Complex64) -> Self {
        let mut block = Self::default();
        for (offset, v) in block.0.iter_mut().enumerate() {
            *v = f(BlockIndex::from_offset(offset));
        }
        block
    }

    pub fn as_slice(&self) -> &[Complex64] {
        &self.0
    }
}

impl Index<BlockIndex> for SiteBlock {
    type Output = Complex64;

    fn index(&self, index: BlockIndex) -> &Complex64 {
        &self.0[index.offset()]
    }
}

impl IndexMut<BlockIndex> for SiteBlock {
    fn index_mut(&mut self, index: BlockIndex) -> &mut Complex64 {
        &mut self.0[index.offset()]
    }
}

impl SiteValue for SiteBlock {
    const COMPONENTS: usize = BLOCK_LEN;

    fn component(&self, c: usize) -> Complex64 {
        self.0[c]
    }

    fn component_mut(&mut self, c: usize) -> &mut Complex64 {
        &mut self.0[c]
    }

    fn add_scaled(&mut self, factor: Complex64, other: &Self) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += factor * b;
        }
    }
}

/// A lattice field of site blocks tagged with its block sign.
#[derive(Debug, Clone, PartialEq)]
pub struct BaryonBlock {
    sign: BlockSign,
    field: LatticeField<SiteBlock>,
}

impl BaryonBlock {
    /// All-zero block, the starting point of an accumulation.
    pub fn zeros(geometry: Geometry, sign: BlockSign) -> Self {
        Self {
            sign,
            field: LatticeField::zeros(geometry),
        }
    }

    pub fn from_field(sign: BlockSign, field: LatticeField<SiteBlock>) -> Self {
        Self { sign, field }
    }

    pub fn sign(&self) -> BlockSign {
        self.sign
    }

    pub fn geometry(&self) -> &Geometry {
        self.field.geometry()
    }

    pub fn field(&self) -> &LatticeField<SiteBlock> {
        &self.field
    }

    pub(crate) fn field_mut(&mut self) -> &mut LatticeField<SiteBlock> {
        &mut self.field
    }

    pub fn site(&self, site: usize) -> &SiteBlock {
        &self.field[site]
    }

    pub fn set_zero(&mut self) {
        self.field.set_zero();
    }
}
