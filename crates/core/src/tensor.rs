use std::sync::Arc;

use ndarray::{ArrayViewD, CowArray, IxDyn, ShapeError};
use thiserror::Error;

use crate::fixed_dim::{compute_strides, FixedDimension, FixedDimensions};

/// Dense row-major `f32` tensor.
///
/// The buffer is reference counted, so cloning a `Tensor` never copies
/// the element data.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    dims: FixedDimensions,
    stride: FixedDimensions,
    data: Arc<Vec<f32>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TensorError {
    #[error("Shape {dims:?} requires {expected} elements but {actual} were given")]
    ElemCountMismatch {
        dims: FixedDimensions,
        expected: usize,
        actual: usize,
    },
}

impl Tensor {
    pub fn new(dims: FixedDimensions, data: Vec<f32>) -> Result<Self, TensorError> {
        let expected = dims.total_elems();
        if expected != data.len() {
            return Err(TensorError::ElemCountMismatch {
                dims,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            stride: compute_strides(&dims),
            data: Arc::new(data),
            dims,
        })
    }

    pub fn zeros(dims: FixedDimensions) -> Self {
        let total_elems = dims.total_elems();
        Self {
            stride: compute_strides(&dims),
            data: Arc::new(vec![0.0; total_elems]),
            dims,
        }
    }

    pub fn dims(&self) -> &FixedDimensions {
        &self.dims
    }

    pub fn strides(&self) -> &[FixedDimension] {
        self.stride.as_slice()
    }

    pub fn data(&self) -> &[f32] {
        self.data.as_slice()
    }

    /// Iterates over the slices along the leading axis. A tensor of
    /// shape `[N, C, ...]` yields `N` slices of `C * ...` elements.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        let num_rows = self.dims.first().copied().unwrap_or(1);
        let row_len = self.dims.row_len();
        (0..num_rows).map(move |i| &self.data[i * row_len..(i + 1) * row_len])
    }

    pub fn to_cow_array(&self) -> Result<CowArray<'_, f32, IxDyn>, ShapeError> {
        let view = ArrayViewD::from_shape(IxDyn(self.dims.as_slice()), self.data.as_slice())?;
        Ok(CowArray::from(view))
    }
}

impl From<ArrayViewD<'_, f32>> for Tensor {
    fn from(arr: ArrayViewD<'_, f32>) -> Self {
        let dims: FixedDimensions = arr.shape().into();
        // `iter` walks in logical order, so non-contiguous views are fine.
        let data = arr.iter().copied().collect::<Vec<_>>();
        Self {
            stride: compute_strides(&dims),
            data: Arc::new(data),
            dims,
        }
    }
}

impl From<&CowArray<'_, f32, IxDyn>> for Tensor {
    fn from(arr: &CowArray<f32, IxDyn>) -> Self {
        Self::from(arr.view())
    }
}

#[test]
fn create_tensors() {
    let t = Tensor::new(vec![2, 3].into(), vec![0., 1., 2., 3., 4., 5.]).unwrap();
    assert_eq!(t.dims().as_slice(), &[2, 3]);
    assert_eq!(t.strides(), &[3, 1]);
    assert_eq!(t.rows().nth(1).unwrap()[2], 5.);

    assert!(matches!(
        Tensor::new(vec![2, 3].into(), vec![0.; 5]),
        Err(TensorError::ElemCountMismatch {
            expected: 6,
            actual: 5,
            ..
        })
    ));
}

#[test]
fn test_zeros() {
    let t = Tensor::zeros(vec![4, 3, 2].into());
    assert_eq!(t.data().len(), 24);
    assert!(t.data().iter().all(|&x| x == 0.));
}

#[test]
fn test_rows() {
    let t = Tensor::new(vec![3, 2].into(), vec![0., 1., 2., 3., 4., 5.]).unwrap();
    let rows = t.rows().collect::<Vec<_>>();
    assert_eq!(rows, vec![&[0f32, 1.][..], &[2., 3.][..], &[4., 5.][..]]);
}

#[test]
fn test_cow_array_conversion() {
    let t = Tensor::new(vec![2, 2].into(), vec![1., 2., 3., 4.]).unwrap();
    let arr = t.to_cow_array().unwrap();
    assert_eq!(arr.shape(), &[2, 2]);
    let back = Tensor::from(&arr);
    assert_eq!(back, t);

    let transposed = arr.view().reversed_axes();
    let t = Tensor::from(transposed);
    assert_eq!(t.data(), &[1., 3., 2., 4.]);
}
