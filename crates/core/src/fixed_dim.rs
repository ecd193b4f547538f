use std::{
    ops::{Deref, Index},
    slice::SliceIndex,
};

pub type FixedDimension = usize;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct FixedDimensions(pub Vec<FixedDimension>);

impl std::fmt::Debug for FixedDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl FixedDimensions {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_elems(&self) -> usize {
        self.0.iter().product()
    }

    pub fn as_slice(&self) -> &[FixedDimension] {
        self.0.as_slice()
    }

    /// Number of elements in one slice along the leading axis.
    pub fn row_len(&self) -> usize {
        self.0.iter().skip(1).product()
    }

    pub fn strides(&self) -> Self {
        compute_strides(self)
    }
}

pub(crate) fn compute_strides(dims: &FixedDimensions) -> FixedDimensions {
    let mut strides = vec![];
    for i in 0..dims.len() {
        strides.push(dims[i + 1..].iter().product());
    }
    strides.into()
}

impl AsRef<FixedDimensions> for FixedDimensions {
    fn as_ref(&self) -> &FixedDimensions {
        self
    }
}

impl<I> Index<I> for FixedDimensions
where
    I: SliceIndex<[FixedDimension]>,
{
    type Output = <I as SliceIndex<[FixedDimension]>>::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.0[index]
    }
}

impl From<Vec<FixedDimension>> for FixedDimensions {
    fn from(v: Vec<FixedDimension>) -> FixedDimensions {
        FixedDimensions(v)
    }
}

impl From<&[FixedDimension]> for FixedDimensions {
    fn from(v: &[FixedDimension]) -> FixedDimensions {
        FixedDimensions(v.to_vec())
    }
}

impl Deref for FixedDimensions {
    type Target = Vec<usize>;
    fn deref(&self) -> &Vec<usize> {
        &self.0
    }
}

#[test]
fn total_elems() {
    assert_eq!(FixedDimensions(vec![8, 3, 224, 224]).total_elems(), 1204224)
}

#[test]
fn total_elems_scalar() {
    assert_eq!(FixedDimensions(vec![]).total_elems(), 1)
}

#[test]
fn row_len() {
    assert_eq!(FixedDimensions(vec![4, 1000]).row_len(), 1000);
    assert_eq!(FixedDimensions(vec![4, 10, 10]).row_len(), 100);
    assert_eq!(FixedDimensions(vec![4]).row_len(), 1);
}

#[test]
fn strides() {
    assert_eq!(
        FixedDimensions(vec![2, 3, 4, 5]).strides(),
        vec![60, 20, 5, 1].into()
    )
}
