//! Non-owning strided matrix and vector views.
//!
//! A view borrows a slice and describes how a matrix (or vector) is laid out
//! inside it:
//!
//! ```text
//! col-major:  (i, j) -> j * outer_stride + i      outer_stride >= nrows
//! row-major:  (i, j) -> i * outer_stride + j      outer_stride >= ncols
//! ```
//!
//! Views never own memory. Element indices are a precondition: accessing
//! `(i, j)` outside `[0, nrows) × [0, ncols)` is a caller bug, caught by a
//! debug assertion or by the underlying slice bounds check.

use nalgebra::{DMatrix, DVector};

/// Memory order of a dense matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// Columns are contiguous (Fortran / nalgebra order).
    #[default]
    ColMajor,
    /// Rows are contiguous (C order).
    RowMajor,
}

impl Layout {
    /// The other layout.
    #[inline]
    pub fn transpose(self) -> Self {
        match self {
            Layout::ColMajor => Layout::RowMajor,
            Layout::RowMajor => Layout::ColMajor,
        }
    }

    #[inline(always)]
    fn offset(self, i: usize, j: usize, outer_stride: usize) -> usize {
        match self {
            Layout::ColMajor => j * outer_stride + i,
            Layout::RowMajor => i * outer_stride + j,
        }
    }

    /// Length of one contiguous lane (a column for col-major, a row for row-major).
    #[inline]
    fn minor_dim(self, nrows: usize, ncols: usize) -> usize {
        match self {
            Layout::ColMajor => nrows,
            Layout::RowMajor => ncols,
        }
    }

    #[inline]
    fn major_dim(self, nrows: usize, ncols: usize) -> usize {
        match self {
            Layout::ColMajor => ncols,
            Layout::RowMajor => nrows,
        }
    }
}

fn required_len(layout: Layout, nrows: usize, ncols: usize, outer_stride: usize) -> usize {
    if nrows == 0 || ncols == 0 {
        return 0;
    }
    (layout.major_dim(nrows, ncols) - 1) * outer_stride + layout.minor_dim(nrows, ncols)
}

fn check_matrix(len: usize, nrows: usize, ncols: usize, outer_stride: usize, layout: Layout) {
    let minor = layout.minor_dim(nrows, ncols);
    assert!(
        outer_stride >= minor,
        "outer stride {} is smaller than the minor dimension {} ({:?})",
        outer_stride,
        minor,
        layout,
    );
    let needed = required_len(layout, nrows, ncols, outer_stride);
    assert!(
        len >= needed,
        "buffer of length {} too short for a {}x{} {:?} view with stride {} (needs {})",
        len,
        nrows,
        ncols,
        layout,
        outer_stride,
        needed,
    );
}

fn check_vector(len: usize, n: usize, stride: usize) {
    assert!(stride >= 1, "vector stride must be at least 1");
    let needed = if n == 0 { 0 } else { (n - 1) * stride + 1 };
    assert!(
        len >= needed,
        "buffer of length {} too short for a vector of length {} with stride {}",
        len,
        n,
        stride,
    );
}

// ============================================================================
// Vector views
// ============================================================================

/// Read-only strided vector view.
#[derive(Debug)]
pub struct VectorView<'a, T> {
    data: &'a [T],
    len: usize,
    stride: usize,
}

impl<T> Clone for VectorView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for VectorView<'_, T> {}

impl<'a, T: Copy> VectorView<'a, T> {
    /// Contiguous view over the whole slice.
    pub fn from_slice(data: &'a [T]) -> Self {
        Self { data, len: data.len(), stride: 1 }
    }

    /// View of `len` elements spaced `stride` apart.
    pub fn from_slice_with_stride(data: &'a [T], len: usize, stride: usize) -> Self {
        check_vector(data.len(), len, stride);
        Self { data, len, stride }
    }

    /// View over an nalgebra column vector.
    pub fn from_dvector(v: &'a DVector<T>) -> Self
    where
        T: nalgebra::Scalar,
    {
        Self::from_slice(v.as_slice())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    pub fn get(&self, i: usize) -> T {
        debug_assert!(i < self.len, "index {} out of range for length {}", i, self.len);
        self.data[i * self.stride]
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        self.data.iter().step_by(self.stride).take(self.len).copied()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }
}

/// Mutable strided vector view.
#[derive(Debug)]
pub struct VectorViewMut<'a, T> {
    data: &'a mut [T],
    len: usize,
    stride: usize,
}

impl<'a, T: Copy> VectorViewMut<'a, T> {
    /// Contiguous view over the whole slice.
    pub fn from_slice(data: &'a mut [T]) -> Self {
        let len = data.len();
        Self { data, len, stride: 1 }
    }

    /// View of `len` elements spaced `stride` apart.
    pub fn from_slice_with_stride(data: &'a mut [T], len: usize, stride: usize) -> Self {
        check_vector(data.len(), len, stride);
        Self { data, len, stride }
    }

    /// View over an nalgebra column vector.
    pub fn from_dvector_mut(v: &'a mut DVector<T>) -> Self
    where
        T: nalgebra::Scalar,
    {
        Self::from_slice(v.as_mut_slice())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    pub fn get(&self, i: usize) -> T {
        debug_assert!(i < self.len, "index {} out of range for length {}", i, self.len);
        self.data[i * self.stride]
    }

    #[inline(always)]
    pub fn write(&mut self, i: usize, value: T) {
        debug_assert!(i < self.len, "index {} out of range for length {}", i, self.len);
        self.data[i * self.stride] = value;
    }

    /// Shared reborrow.
    pub fn rb(&self) -> VectorView<'_, T> {
        VectorView { data: &*self.data, len: self.len, stride: self.stride }
    }

    /// Mutable reborrow.
    pub fn rb_mut(&mut self) -> VectorViewMut<'_, T> {
        VectorViewMut { data: &mut *self.data, len: self.len, stride: self.stride }
    }

    pub fn into_const(self) -> VectorView<'a, T> {
        VectorView { data: self.data, len: self.len, stride: self.stride }
    }

    pub fn fill(&mut self, value: T) {
        for i in 0..self.len {
            self.write(i, value);
        }
    }

    pub fn copy_from(&mut self, src: VectorView<'_, T>) {
        assert_eq!(self.len, src.len(), "vector length mismatch in copy");
        for i in 0..self.len {
            self.write(i, src.get(i));
        }
    }
}

// ============================================================================
// Matrix views
// ============================================================================

/// Read-only strided matrix view.
#[derive(Debug)]
pub struct MatrixView<'a, T> {
    data: &'a [T],
    nrows: usize,
    ncols: usize,
    outer_stride: usize,
    layout: Layout,
}

impl<T> Clone for MatrixView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MatrixView<'_, T> {}

impl<'a, T: Copy> MatrixView<'a, T> {
    /// Packed view (outer stride equals the minor dimension).
    pub fn from_slice(data: &'a [T], nrows: usize, ncols: usize, layout: Layout) -> Self {
        let outer_stride = layout.minor_dim(nrows, ncols);
        Self::from_slice_with_stride(data, nrows, ncols, outer_stride, layout)
    }

    pub fn from_slice_with_stride(
        data: &'a [T],
        nrows: usize,
        ncols: usize,
        outer_stride: usize,
        layout: Layout,
    ) -> Self {
        check_matrix(data.len(), nrows, ncols, outer_stride, layout);
        Self { data, nrows, ncols, outer_stride, layout }
    }

    /// Column-major view over an nalgebra matrix.
    pub fn from_dmatrix(m: &'a DMatrix<T>) -> Self
    where
        T: nalgebra::Scalar,
    {
        Self::from_slice(m.as_slice(), m.nrows(), m.ncols(), Layout::ColMajor)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    pub fn outer_stride(&self) -> usize {
        self.outer_stride
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.nrows && j < self.ncols);
        self.data[self.layout.offset(i, j, self.outer_stride)]
    }

    /// Zero-copy view of the block starting at `(row, col)`.
    pub fn submatrix(self, row: usize, col: usize, nrows: usize, ncols: usize) -> Self {
        assert!(row + nrows <= self.nrows && col + ncols <= self.ncols, "submatrix out of range");
        let data = if nrows == 0 || ncols == 0 {
            &self.data[..0]
        } else {
            &self.data[self.layout.offset(row, col, self.outer_stride)..]
        };
        Self { data, nrows, ncols, outer_stride: self.outer_stride, layout: self.layout }
    }

    /// Zero-copy transpose: swaps the dimensions and the layout tag.
    pub fn transpose(self) -> Self {
        Self {
            data: self.data,
            nrows: self.ncols,
            ncols: self.nrows,
            outer_stride: self.outer_stride,
            layout: self.layout.transpose(),
        }
    }

    pub fn row(self, i: usize) -> VectorView<'a, T> {
        assert!(i < self.nrows, "row {} out of range", i);
        let stride = match self.layout {
            Layout::ColMajor => self.outer_stride.max(1),
            Layout::RowMajor => 1,
        };
        lane(self.data, self.layout.offset(i, 0, self.outer_stride), self.ncols, stride)
    }

    pub fn col(self, j: usize) -> VectorView<'a, T> {
        assert!(j < self.ncols, "column {} out of range", j);
        let stride = match self.layout {
            Layout::ColMajor => 1,
            Layout::RowMajor => self.outer_stride.max(1),
        };
        lane(self.data, self.layout.offset(0, j, self.outer_stride), self.nrows, stride)
    }

    pub fn diagonal(self) -> VectorView<'a, T> {
        let n = self.nrows.min(self.ncols);
        lane(self.data, 0, n, self.outer_stride + 1)
    }
}

fn lane<T: Copy>(data: &[T], start: usize, len: usize, stride: usize) -> VectorView<'_, T> {
    if len == 0 {
        return VectorView { data: &data[..0], len: 0, stride };
    }
    VectorView::from_slice_with_stride(&data[start..], len, stride)
}

/// Mutable strided matrix view.
#[derive(Debug)]
pub struct MatrixViewMut<'a, T> {
    data: &'a mut [T],
    nrows: usize,
    ncols: usize,
    outer_stride: usize,
    layout: Layout,
}

impl<'a, T: Copy> MatrixViewMut<'a, T> {
    /// Packed view (outer stride equals the minor dimension).
    pub fn from_slice(data: &'a mut [T], nrows: usize, ncols: usize, layout: Layout) -> Self {
        let outer_stride = layout.minor_dim(nrows, ncols);
        Self::from_slice_with_stride(data, nrows, ncols, outer_stride, layout)
    }

    pub fn from_slice_with_stride(
        data: &'a mut [T],
        nrows: usize,
        ncols: usize,
        outer_stride: usize,
        layout: Layout,
    ) -> Self {
        check_matrix(data.len(), nrows, ncols, outer_stride, layout);
        Self { data, nrows, ncols, outer_stride, layout }
    }

    /// Column-major view over an nalgebra matrix.
    pub fn from_dmatrix_mut(m: &'a mut DMatrix<T>) -> Self
    where
        T: nalgebra::Scalar,
    {
        let (nrows, ncols) = m.shape();
        Self::from_slice(m.as_mut_slice(), nrows, ncols, Layout::ColMajor)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    pub fn outer_stride(&self) -> usize {
        self.outer_stride
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.nrows && j < self.ncols);
        self.data[self.layout.offset(i, j, self.outer_stride)]
    }

    #[inline(always)]
    pub fn write(&mut self, i: usize, j: usize, value: T) {
        debug_assert!(i < self.nrows && j < self.ncols);
        self.data[self.layout.offset(i, j, self.outer_stride)] = value;
    }

    /// Shared reborrow.
    pub fn rb(&self) -> MatrixView<'_, T> {
        MatrixView {
            data: &*self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            outer_stride: self.outer_stride,
            layout: self.layout,
        }
    }

    /// Mutable reborrow.
    pub fn rb_mut(&mut self) -> MatrixViewMut<'_, T> {
        MatrixViewMut {
            data: &mut *self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            outer_stride: self.outer_stride,
            layout: self.layout,
        }
    }

    pub fn into_const(self) -> MatrixView<'a, T> {
        MatrixView {
            data: self.data,
            nrows: self.nrows,
            ncols: self.ncols,
            outer_stride: self.outer_stride,
            layout: self.layout,
        }
    }

    /// Zero-copy mutable view of the block starting at `(row, col)`.
    pub fn submatrix_mut(self, row: usize, col: usize, nrows: usize, ncols: usize) -> Self {
        assert!(row + nrows <= self.nrows && col + ncols <= self.ncols, "submatrix out of range");
        let outer_stride = self.outer_stride;
        let layout = self.layout;
        let data = self.data;
        let data = if nrows == 0 || ncols == 0 {
            &mut data[..0]
        } else {
            &mut data[layout.offset(row, col, outer_stride)..]
        };
        Self { data, nrows, ncols, outer_stride, layout }
    }

    /// Zero-copy transpose: swaps the dimensions and the layout tag.
    pub fn transpose_mut(self) -> Self {
        Self {
            data: self.data,
            nrows: self.ncols,
            ncols: self.nrows,
            outer_stride: self.outer_stride,
            layout: self.layout.transpose(),
        }
    }

    pub fn fill(&mut self, value: T) {
        for major in 0..self.layout.major_dim(self.nrows, self.ncols) {
            for minor in 0..self.layout.minor_dim(self.nrows, self.ncols) {
                self.data[major * self.outer_stride + minor] = value;
            }
        }
    }

    /// Copies the lower triangle (`i >= j`) of `src`, traversing in this view's
    /// memory order. The strictly upper part of `self` is left untouched.
    pub fn copy_lower_from(&mut self, src: MatrixView<'_, T>) {
        assert!(
            self.nrows == src.nrows() && self.ncols == src.ncols(),
            "shape mismatch in copy: {}x{} <- {}x{}",
            self.nrows,
            self.ncols,
            src.nrows(),
            src.ncols(),
        );
        match self.layout {
            Layout::ColMajor => {
                for j in 0..self.ncols {
                    for i in j..self.nrows {
                        self.write(i, j, src.get(i, j));
                    }
                }
            }
            Layout::RowMajor => {
                for i in 0..self.nrows {
                    for j in 0..self.ncols.min(i + 1) {
                        self.write(i, j, src.get(i, j));
                    }
                }
            }
        }
    }
}

// ============================================================================
// LDLT factor views
// ============================================================================

/// Read-only (L, D) pair.
#[derive(Debug)]
pub struct LdltView<'a, T> {
    l: MatrixView<'a, T>,
    d: VectorView<'a, T>,
}

impl<T> Clone for LdltView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LdltView<'_, T> {}

impl<'a, T: Copy> LdltView<'a, T> {
    pub fn new(l: MatrixView<'a, T>, d: VectorView<'a, T>) -> Self {
        check_ldlt_dims(l.nrows(), l.ncols(), d.len());
        Self { l, d }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.d.len()
    }

    /// Unit lower-triangular factor. Only the strictly lower part is meaningful.
    #[inline]
    pub fn l(&self) -> MatrixView<'a, T> {
        self.l
    }

    #[inline]
    pub fn d(&self) -> VectorView<'a, T> {
        self.d
    }
}

/// Mutable (L, D) destination of a factorization.
#[derive(Debug)]
pub struct LdltViewMut<'a, T> {
    l: MatrixViewMut<'a, T>,
    d: VectorViewMut<'a, T>,
}

impl<'a, T: Copy> LdltViewMut<'a, T> {
    pub fn new(l: MatrixViewMut<'a, T>, d: VectorViewMut<'a, T>) -> Self {
        check_ldlt_dims(l.nrows(), l.ncols(), d.len());
        Self { l, d }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.d.len()
    }

    pub fn rb(&self) -> LdltView<'_, T> {
        LdltView { l: self.l.rb(), d: self.d.rb() }
    }

    pub fn rb_mut(&mut self) -> LdltViewMut<'_, T> {
        LdltViewMut { l: self.l.rb_mut(), d: self.d.rb_mut() }
    }

    pub fn into_const(self) -> LdltView<'a, T> {
        LdltView { l: self.l.into_const(), d: self.d.into_const() }
    }

    pub fn into_parts(self) -> (MatrixViewMut<'a, T>, VectorViewMut<'a, T>) {
        (self.l, self.d)
    }
}

fn check_ldlt_dims(nrows: usize, ncols: usize, d_len: usize) {
    assert!(nrows == ncols, "L must be square, got {}x{}", nrows, ncols);
    assert!(
        d_len == nrows,
        "D has length {} but L is {}x{}",
        d_len,
        nrows,
        ncols,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    #[test]
    fn test_layout_offsets() {
        // 2x3 matrix [[1, 2, 3], [4, 5, 6]]
        let row_major = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let col_major = [1.0, 4.0, 2.0, 5.0, 3.0, 6.0];
        let r = MatrixView::from_slice(&row_major, 2, 3, Layout::RowMajor);
        let c = MatrixView::from_slice(&col_major, 2, 3, Layout::ColMajor);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(r.get(i, j), c.get(i, j));
            }
        }
        assert_eq!(r.outer_stride(), 3);
        assert_eq!(c.outer_stride(), 2);
    }

    #[test]
    fn test_padded_stride_and_submatrix() {
        // 3x3 col-major with an outer stride of 4 (one padding row).
        let data: Vec<f64> = (0..12).map(|x| x as f64).collect();
        let m = MatrixView::from_slice_with_stride(&data, 3, 3, 4, Layout::ColMajor);
        assert_eq!(m.get(2, 1), 6.0);

        let sub = m.submatrix(1, 1, 2, 2);
        assert_eq!(sub.get(0, 0), 5.0);
        assert_eq!(sub.get(1, 1), 10.0);

        let t = m.transpose();
        assert_eq!(t.layout(), Layout::RowMajor);
        assert_eq!(t.get(1, 2), m.get(2, 1));
    }

    #[test]
    fn test_lanes() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let m = MatrixView::from_slice(&data, 3, 3, Layout::RowMajor);
        assert_eq!(m.row(1).to_vec(), vec![4.0, 5.0, 6.0]);
        assert_eq!(m.col(2).to_vec(), vec![3.0, 6.0, 9.0]);
        assert_eq!(m.diagonal().to_vec(), vec![1.0, 5.0, 9.0]);
    }

    #[test]
    fn test_copy_lower_leaves_upper() {
        let src = [1.0, 2.0, 3.0, 4.0];
        let mut dst = [-1.0; 4];
        let s = MatrixView::from_slice(&src, 2, 2, Layout::RowMajor);
        let mut d = MatrixViewMut::from_slice(&mut dst, 2, 2, Layout::ColMajor);
        d.copy_lower_from(s);
        assert_eq!(d.get(0, 0), 1.0);
        assert_eq!(d.get(1, 0), 3.0);
        assert_eq!(d.get(1, 1), 4.0);
        assert_eq!(d.get(0, 1), -1.0);
    }

    #[test]
    fn test_empty_views() {
        let data: [f64; 0] = [];
        let m = MatrixView::from_slice(&data, 0, 0, Layout::ColMajor);
        assert_eq!(m.nrows(), 0);
        assert!(m.diagonal().is_empty());
    }

    #[test]
    #[should_panic(expected = "too short")]
    fn test_short_buffer_panics() {
        let data = [0.0; 3];
        let _ = MatrixView::from_slice(&data, 2, 2, Layout::ColMajor);
    }

    #[test]
    fn test_mutable_subviews_and_fill() {
        // 3x4 row-major, write through a transposed 2x2 block.
        let mut data = [0.0f64; 12];
        let mut m = MatrixViewMut::from_slice(&mut data, 3, 4, Layout::RowMajor);
        m.fill(1.0);
        let mut block = m.rb_mut().submatrix_mut(1, 2, 2, 2).transpose_mut();
        assert_eq!(block.layout(), Layout::ColMajor);
        assert_eq!((block.nrows(), block.ncols()), (2, 2));
        block.fill(0.0);
        block.write(1, 0, 7.0);
        assert!(m.rb().submatrix(1, 2, 2, 2).is_square());
        assert!(!m.rb().is_square());
        drop(m);
        // block (r, c) of the transpose is (1 + c, 2 + r) of the original
        assert_eq!(data, [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 7.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_strided_vector_copy() {
        let src = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let mut buf = [-1.0; 7];
        let mut v = VectorViewMut::from_slice_with_stride(&mut buf, 3, 3);
        v.copy_from(VectorView::from_dvector(&src));
        assert_eq!(v.rb().to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(buf, [1.0, -1.0, -1.0, 2.0, -1.0, -1.0, 3.0]);

        let mut dst = DVector::<f64>::zeros(3);
        let mut w = VectorViewMut::from_dvector_mut(&mut dst);
        w.fill(4.0);
        w.write(2, 5.0);
        assert_eq!(dst.as_slice(), &[4.0, 4.0, 5.0]);
    }

    #[test]
    fn test_ldlt_view_reborrows() {
        let mut l = [0.0f64; 4];
        let mut d = [0.0f64; 2];
        let mut ldl = LdltViewMut::new(
            MatrixViewMut::from_slice(&mut l, 2, 2, Layout::ColMajor),
            VectorViewMut::from_slice(&mut d),
        );
        {
            let (mut lm, mut dm) = ldl.rb_mut().into_parts();
            lm.write(1, 0, 0.5);
            dm.write(1, 2.0);
        }
        assert_eq!(ldl.rb().l().get(1, 0), 0.5);
        let frozen = ldl.into_const();
        assert_eq!(frozen.dim(), 2);
        assert_eq!(frozen.d().to_vec(), vec![0.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "D has length")]
    fn test_ldlt_dim_mismatch_panics() {
        let mut l = [0.0; 4];
        let mut d = [0.0; 3];
        let _ = LdltViewMut::new(
            MatrixViewMut::from_slice(&mut l, 2, 2, Layout::ColMajor),
            VectorViewMut::from_slice(&mut d),
        );
    }
}
