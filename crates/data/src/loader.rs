use std::{
    ops::Range,
    path::{Path, PathBuf},
    time::Instant,
};

use imval_core::tensor::Tensor;
use rayon::{
    prelude::{IntoParallelRefIterator, ParallelIterator},
    ThreadPool, ThreadPoolBuilder,
};

use crate::{dataset::Dataset, transforms::EvalTransform, DataError};

/// One batch of preprocessed images and their labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// `[batch_size, 3, img_size, img_size]`
    pub input: Tensor,
    pub labels: Vec<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Splits a dataset into batches in dataset order. The last batch holds
/// the remainder and may be smaller.
pub struct Loader {
    dataset: Dataset,
    transform: EvalTransform,
    batch_size: usize,
    pool: Option<ThreadPool>,
}

impl Loader {
    /// `workers == 0` decodes on the calling thread.
    pub fn new(
        dataset: Dataset,
        transform: EvalTransform,
        batch_size: usize,
        workers: usize,
    ) -> Result<Self, DataError> {
        if batch_size == 0 {
            return Err(DataError::InvalidConfig("batch size must be positive".into()));
        }
        let pool = if workers > 0 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("imval-loader-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        log::debug!(
            "create loader: {} samples, batch size {batch_size}, {workers} workers",
            dataset.len()
        );
        Ok(Self {
            dataset,
            transform,
            batch_size,
            pool,
        })
    }

    /// Number of batches.
    pub fn len(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Batches<'_> {
        Batches {
            loader: self,
            next: 0,
        }
    }

    fn batch_range(&self, index: usize) -> Range<usize> {
        let start = index * self.batch_size;
        start..start.saturating_add(self.batch_size).min(self.dataset.len())
    }

    fn load_batch(&self, index: usize) -> Result<Batch, DataError> {
        let start = Instant::now();
        let samples = &self.dataset.samples()[self.batch_range(index)];
        let load = |(path, _): &(PathBuf, usize)| self.load_image(path);
        let images = match &self.pool {
            Some(pool) => pool.install(|| {
                samples
                    .par_iter()
                    .map(load)
                    .collect::<Result<Vec<_>, _>>()
            })?,
            None => samples.iter().map(load).collect::<Result<Vec<_>, _>>()?,
        };

        let size = self.transform.img_size() as usize;
        let mut data = Vec::with_capacity(images.len() * self.transform.output_len());
        for image in images {
            data.extend_from_slice(&image);
        }
        let input = Tensor::new(vec![samples.len(), 3, size, size].into(), data)?;
        let labels = samples.iter().map(|&(_, label)| label).collect();
        log::trace!("load batch {index}: finished in {:?}", start.elapsed());

        Ok(Batch { input, labels })
    }

    fn load_image(&self, path: &Path) -> Result<Vec<f32>, DataError> {
        let image = image::open(path).map_err(|source| DataError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        self.transform.apply(&image)
    }
}

/// Single-pass iterator over the batches of a [`Loader`].
pub struct Batches<'a> {
    loader: &'a Loader,
    next: usize,
}

impl Iterator for Batches<'_> {
    type Item = Result<Batch, DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.loader.len() {
            return None;
        }
        let batch = self.loader.load_batch(self.next);
        self.next += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.loader.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches<'_> {}

impl<'a> IntoIterator for &'a Loader {
    type Item = Result<Batch, DataError>;
    type IntoIter = Batches<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
