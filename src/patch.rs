use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::index_space::{Index3, IndexSpace};




/**
 * A patch is a mapping from a rectangular index space to multi-component
 * field values, backed by a single row-major array of data with the
 * components of one location stored contiguously. The same type represents
 * cell-centered and face-centered data: a face patch for sweep axis `d` over
 * a box `b` lives on the index space `b.extend_upper(1, d)`, with each face
 * indexed by the cell on its upper side. The three face orientations are
 * distinct patches and are not interchangeable.
 *
 * Patches own their data. Scratch patches allocated inside a driver call are
 * dropped when the call returns; nothing is shared between concurrent calls.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Patch {
    num_fields: usize,
    space: IndexSpace,
    data: Vec<f64>,
}




// ============================================================================
impl Patch {


    /**
     * Generate a patch of zeros with the given number of fields, covering
     * the given index space.
     */
    pub fn zeros(num_fields: usize, space: IndexSpace) -> Self {
        let data = vec![0.0; space.len() * num_fields];
        Self { num_fields, space, data }
    }


    /**
     * Generate a patch covering the given space, with values defined from a
     * closure which writes the components for one index into a slice.
     */
    pub fn from_slice_function<F>(space: IndexSpace, num_fields: usize, f: F) -> Self
    where
        F: Fn(Index3, &mut [f64])
    {
        let mut patch = Self::zeros(num_fields, space);

        for index in patch.space.clone().iter() {
            f(index, patch.get_slice_mut(index))
        }
        patch
    }


    /**
     * Generate a patch with a single field defined from a scalar closure.
     */
    pub fn from_scalar_function<F>(space: IndexSpace, f: F) -> Self
    where
        F: Fn(Index3) -> f64
    {
        Self::from_slice_function(space, 1, |index, s| s[0] = f(index))
    }


    pub fn index_space(&self) -> &IndexSpace {
        &self.space
    }


    pub fn num_fields(&self) -> usize {
        self.num_fields
    }


    pub fn data(&self) -> &[f64] {
        &self.data
    }


    /**
     * Return one component of the field at the given index.
     */
    pub fn get(&self, index: Index3, field: usize) -> f64 {
        self.data[self.space.row_major_offset(index) * self.num_fields + field]
    }


    /**
     * Return the components of the field at the given index.
     */
    pub fn get_slice(&self, index: Index3) -> &[f64] {
        let n = self.space.row_major_offset(index) * self.num_fields;
        &self.data[n .. n + self.num_fields]
    }


    pub fn get_slice_mut(&mut self, index: Index3) -> &mut [f64] {
        let n = self.space.row_major_offset(index) * self.num_fields;
        &mut self.data[n .. n + self.num_fields]
    }


    pub fn fill(&mut self, value: f64) {
        for x in &mut self.data {
            *x = value
        }
    }


    /**
     * Return a parallel iterator over the mutable pencils of this patch. A
     * pencil is the contiguous run of data at fixed (i, j), covering the
     * whole k-range; the item is the (i, j) pair and that slice. Pencils are
     * disjoint, so a parallel-for over them performs only non-overlapping
     * writes and no locking is needed. Neighbor data must be read from other
     * (immutable) patches.
     */
    pub fn par_pencils_mut(&mut self) -> impl IndexedParallelIterator<Item = ((i64, i64), &mut [f64])> + '_ {
        let (i0, j0, _k0) = self.space.start();
        let (_l, m, _n) = self.space.dim();
        let chunk = self.pencil_len();

        self.data
            .par_chunks_mut(chunk)
            .enumerate()
            .map(move |(p, slice)| {
                let i = i0 + (p / m) as i64;
                let j = j0 + (p % m) as i64;
                ((i, j), slice)
            })
    }


    /**
     * The number of scalars in one pencil.
     */
    pub fn pencil_len(&self) -> usize {
        let (_l, _m, n) = self.space.dim();
        n * self.num_fields
    }
}
