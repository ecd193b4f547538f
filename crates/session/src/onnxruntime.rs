use std::{sync::Arc, time::Instant};

use imval_core::{model::ModelSource, tensor::Tensor};
use ort::{
    Environment, ExecutionProvider, GraphOptimizationLevel, InMemorySession, SessionBuilder,
    Value,
};

use crate::{Session, SessionError};

pub struct OrtSessionBuilder<'a> {
    source: &'a ModelSource,
    intra_op_num_threads: usize,
    optimization_level: GraphOptimizationLevel,
}

/// Session backed by ONNX Runtime.
///
/// An in-memory model borrows its bytes from the `ModelSource`, which
/// therefore has to outlive the session.
pub struct OrtSession<'a> {
    inner: Inner<'a>,
    _env: Arc<Environment>,
}

enum Inner<'a> {
    File(ort::Session),
    Memory(InMemorySession<'a>),
}

impl<'a> OrtSessionBuilder<'a> {
    pub fn new(source: &'a ModelSource) -> Self {
        Self {
            source,
            intra_op_num_threads: 1,
            optimization_level: GraphOptimizationLevel::Level3,
        }
    }

    pub fn with_intra_op_num_threads(mut self, intra_op_num_threads: usize) -> Self {
        self.intra_op_num_threads = intra_op_num_threads;
        self
    }

    pub fn with_optimization_level(mut self, level: GraphOptimizationLevel) -> Self {
        self.optimization_level = level;
        self
    }

    pub fn build(self) -> Result<OrtSession<'a>, SessionError> {
        let start = Instant::now();
        let env = Environment::builder()
            .with_name("imval")
            .with_execution_providers(&[ExecutionProvider::CPU(Default::default())])
            .build()?
            .into_arc();
        let threads = i16::try_from(self.intra_op_num_threads.max(1)).unwrap_or(i16::MAX);
        let builder = SessionBuilder::new(&env)?
            .with_optimization_level(self.optimization_level)?
            .with_intra_threads(threads)?;
        let inner = match self.source {
            ModelSource::Path(path) => Inner::File(builder.with_model_from_file(path)?),
            ModelSource::Bytes { bytes, .. } => {
                Inner::Memory(builder.with_model_from_memory(bytes.as_slice())?)
            }
        };
        log::info!(
            "create session: model = {:?}, intra-op threads = {threads}, finished in {:?}",
            self.source.path(),
            start.elapsed()
        );
        Ok(OrtSession { inner, _env: env })
    }
}

impl OrtSession<'_> {
    fn session(&self) -> &ort::Session {
        match &self.inner {
            Inner::File(sess) => sess,
            Inner::Memory(sess) => &**sess,
        }
    }
}

impl Session for OrtSession<'_> {
    fn run(&self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>, SessionError> {
        let sess = self.session();
        let arrays = inputs
            .iter()
            .map(Tensor::to_cow_array)
            .collect::<Result<Vec<_>, _>>()?;
        let values = arrays
            .iter()
            .map(|arr| Value::from_array(sess.allocator(), arr))
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = sess.run(values)?;
        let mut tensors = Vec::with_capacity(outputs.len());
        for out in outputs.iter() {
            let out = out.try_extract::<f32>()?;
            tensors.push(Tensor::from(out.view().view()));
        }
        Ok(tensors)
    }
}

impl Drop for OrtSession<'_> {
    fn drop(&mut self) {
        log::debug!("release session");
    }
}
