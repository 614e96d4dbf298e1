use core::ops::Range;
use serde::{Deserialize, Serialize};




/**
 * A cell index in the discrete index space
 */
pub type Index3 = (i64, i64, i64);




/**
 * Identifier for a Cartesian axis
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    I,
    J,
    K,
}




// ============================================================================
impl Axis {

    /**
     * All three axes, in sweep order.
     */
    pub fn all() -> [Axis; 3] {
        [Axis::I, Axis::J, Axis::K]
    }


    /**
     * Return the unit offset along this axis.
     */
    pub fn unit(self) -> Index3 {
        match self {
            Axis::I => (1, 0, 0),
            Axis::J => (0, 1, 0),
            Axis::K => (0, 0, 1),
        }
    }


    /**
     * Return the index displaced by `delta` cells along this axis.
     */
    pub fn shift(self, index: Index3, delta: i64) -> Index3 {
        let (ei, ej, ek) = self.unit();
        (index.0 + delta * ei, index.1 + delta * ej, index.2 + delta * ek)
    }


    /**
     * Return the pair of axes tangential to this one. The ordering is fixed
     * so that stress-tensor components are assembled consistently: a face
     * normal to I has tangents (J, K), normal to J has (I, K), normal to K
     * has (I, J).
     */
    pub fn tangential(self) -> (Axis, Axis) {
        match self {
            Axis::I => (Axis::J, Axis::K),
            Axis::J => (Axis::I, Axis::K),
            Axis::K => (Axis::I, Axis::J),
        }
    }


    /**
     * Select the component of a per-axis tuple, e.g. the grid spacing.
     */
    pub fn pick(self, v: (f64, f64, f64)) -> f64 {
        match self {
            Axis::I => v.0,
            Axis::J => v.1,
            Axis::K => v.2,
        }
    }
}




/**
 * Represents a rectangular region in a 3D discrete index space. The index
 * type is signed 64-bit integer. Lower-dimensional problems are expressed
 * with degenerate (unit-extent) ranges on the unused axes.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexSpace {
    di: Range<i64>,
    dj: Range<i64>,
    dk: Range<i64>,
}




// ============================================================================
impl IndexSpace {


    pub fn new(di: Range<i64>, dj: Range<i64>, dk: Range<i64>) -> Self {

        assert!(
            di.start <= di.end && dj.start <= dj.end && dk.start <= dk.end,
            "index space has negative volume");

        Self { di, dj, dk }
    }


    /**
     * Return the number of indexes on each axis.
     */
    pub fn dim(&self) -> (usize, usize, usize) {
        ((self.di.end - self.di.start) as usize,
         (self.dj.end - self.dj.start) as usize,
         (self.dk.end - self.dk.start) as usize)
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        let (l, m, n) = self.dim();
        l * m * n
    }


    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /**
     * Return the minimum index (inclusive).
     */
    pub fn start(&self) -> Index3 {
        (self.di.start, self.dj.start, self.dk.start)
    }


    /**
     * Return the maximum index (exclusive).
     */
    pub fn end(&self) -> Index3 {
        (self.di.end, self.dj.end, self.dk.end)
    }


    /**
     * Determine whether this index space contains the given index.
     */
    pub fn contains(&self, index: Index3) -> bool {
        self.di.contains(&index.0) && self.dj.contains(&index.1) && self.dk.contains(&index.2)
    }


    /**
     * Determine whether another index space is a subset of this one.
     */
    pub fn contains_space(&self, other: &Self) -> bool {
        other.di.start >= self.di.start && other.di.end <= self.di.end &&
        other.dj.start >= self.dj.start && other.dj.end <= self.dj.end &&
        other.dk.start >= self.dk.start && other.dk.end <= self.dk.end
    }


    /**
     * Expand this index space by the given number of elements on each axis.
     */
    pub fn extend_all(&self, delta: i64) -> Self {
        Self::new(
            self.di.start - delta .. self.di.end + delta,
            self.dj.start - delta .. self.dj.end + delta,
            self.dk.start - delta .. self.dk.end + delta)
    }


    /**
     * Trim this index space by the given number of elements on each axis.
     */
    pub fn trim_all(&self, delta: i64) -> Self {
        self.extend_all(-delta)
    }


    /**
     * Expand this index space by the given number of elements on both ends
     * of one axis.
     */
    pub fn extend_axis(&self, delta: i64, axis: Axis) -> Self {
        match axis {
            Axis::I => Self::new(self.di.start - delta .. self.di.end + delta, self.dj.clone(), self.dk.clone()),
            Axis::J => Self::new(self.di.clone(), self.dj.start - delta .. self.dj.end + delta, self.dk.clone()),
            Axis::K => Self::new(self.di.clone(), self.dj.clone(), self.dk.start - delta .. self.dk.end + delta),
        }
    }


    /**
     * Increase just the upper extent of the given axis. The result of
     * `extend_upper(1, axis)` is the set of faces of this space with normals
     * along `axis`, indexed by the cell on their upper side.
     */
    pub fn extend_upper(&self, delta: i64, axis: Axis) -> Self {
        match axis {
            Axis::I => Self::new(self.di.start .. self.di.end + delta, self.dj.clone(), self.dk.clone()),
            Axis::J => Self::new(self.di.clone(), self.dj.start .. self.dj.end + delta, self.dk.clone()),
            Axis::K => Self::new(self.di.clone(), self.dj.clone(), self.dk.start .. self.dk.end + delta),
        }
    }


    /**
     * Shift this index space by the given number of elements along one axis.
     */
    pub fn translate(&self, delta: i64, axis: Axis) -> Self {
        let (ei, ej, ek) = axis.unit();
        Self::new(
            self.di.start + delta * ei .. self.di.end + delta * ei,
            self.dj.start + delta * ej .. self.dj.end + delta * ej,
            self.dk.start + delta * ek .. self.dk.end + delta * ek)
    }


    /**
     * Return the linear offset for the given index, in a row-major memory
     * buffer aligned with the start of this index space.
     */
    pub fn row_major_offset(&self, index: Index3) -> usize {
        let i = (index.0 - self.di.start) as usize;
        let j = (index.1 - self.dj.start) as usize;
        let k = (index.2 - self.dk.start) as usize;
        let (_l, m, n) = self.dim();
        (i * m + j) * n + k
    }


    /**
     * Return an iterator which traverses the index space in row-major order
     * (C-like; the final index increases fastest).
     */
    pub fn iter(&self) -> impl Iterator<Item = Index3> + '_ {
        self.di.clone().flat_map(move |i| {
            self.dj.clone().flat_map(move |j| {
                self.dk.clone().map(move |k| (i, j, k))
            })
        })
    }
}




// ============================================================================
impl From<(Range<i64>, Range<i64>, Range<i64>)> for IndexSpace {
    fn from(range: (Range<i64>, Range<i64>, Range<i64>)) -> Self {
        Self::new(range.0, range.1, range.2)
    }
}

impl From<IndexSpace> for (Range<i64>, Range<i64>, Range<i64>) {
    fn from(space: IndexSpace) -> Self {
        (space.di, space.dj, space.dk)
    }
}




/**
 * Less imposing factory function to construct an IndexSpace object.
 */
pub fn range3d(di: Range<i64>, dj: Range<i64>, dk: Range<i64>) -> IndexSpace {
    IndexSpace::new(di, dj, dk)
}




// ============================================================================
#[cfg(test)]
mod test {
    use super::{range3d, Axis};

    #[test]
    fn index_space_has_correct_dimensions() {
        let space = range3d(0..4, 0..5, 0..6);
        assert_eq!(space.dim(), (4, 5, 6));
        assert_eq!(space.len(), 120);
        assert_eq!(space.iter().count(), 120);
    }

    #[test]
    fn row_major_offset_matches_iteration_order() {
        let space = range3d(-2..3, 1..4, 0..2);
        for (n, index) in space.iter().enumerate() {
            assert_eq!(space.row_major_offset(index), n);
        }
    }

    #[test]
    fn extend_and_trim_are_inverse() {
        let space = range3d(0..8, 0..8, 0..8);
        assert_eq!(space.extend_all(2).trim_all(2), space);
    }

    #[test]
    fn face_space_gains_one_cell_on_the_sweep_axis() {
        let space = range3d(0..8, 0..8, 0..8);
        assert_eq!(space.extend_upper(1, Axis::J).dim(), (8, 9, 8));
    }

    #[test]
    fn tangential_axes_exclude_the_normal() {
        for axis in Axis::all().iter() {
            let (t1, t2) = axis.tangential();
            assert!(t1 != *axis && t2 != *axis && t1 != t2);
        }
    }

    #[test]
    fn shift_moves_along_the_given_axis_only() {
        assert_eq!(Axis::J.shift((3, 4, 5), -2), (3, 2, 5));
    }
}
