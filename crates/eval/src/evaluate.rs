use std::{
    fmt,
    io::Write,
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use imval_data::{loader::Batch, DataError};
use imval_session::Session;

use crate::{accuracy::accuracy, meter::RunningAverage, EvalError};

/// Inference time accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    /// Number of inference calls, i.e. batches.
    pub total_predictions: usize,
    /// Time spent inside inference calls only.
    pub elapsed: Duration,
}

impl RunTotals {
    pub fn record(&mut self, elapsed: Duration) {
        self.total_predictions += 1;
        self.elapsed += elapsed;
    }

    pub fn average_latency_ms(&self) -> Result<f64, EvalError> {
        if self.total_predictions == 0 {
            return Err(EvalError::EmptyDataset);
        }
        Ok(self.elapsed.as_nanos() as f64 / self.total_predictions as f64 / 1_000_000.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub top1: f64,
    pub top5: f64,
    /// Mean inference time per batch.
    pub avg_latency_ms: f64,
    /// Mean wall-clock time per loop iteration, including loading.
    pub avg_batch_time: f64,
    pub batches: usize,
    pub samples: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            " * Prec@1 {:.3} ({:.3}) Prec@5 {:.3} ({:.3})",
            self.top1,
            100.0 - self.top1,
            self.top5,
            100.0 - self.top5
        )?;
        write!(f, "Average Latency: {} ms", self.avg_latency_ms)
    }
}

/// Drives a session over a sequence of batches, one inference call per
/// batch, and tracks accuracy and latency.
pub struct Evaluator<W> {
    print_freq: NonZeroUsize,
    out: W,
}

impl<W: Write> Evaluator<W> {
    /// Progress is written to `out` every `print_freq` batches, starting
    /// with the first one.
    pub fn new(print_freq: NonZeroUsize, out: W) -> Self {
        Self { print_freq, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn run<S, I>(&mut self, session: &S, batches: I) -> Result<Summary, EvalError>
    where
        S: Session + ?Sized,
        I: IntoIterator<Item = Result<Batch, DataError>>,
        I::IntoIter: ExactSizeIterator,
    {
        let batches = batches.into_iter();
        let num_batches = batches.len();

        let mut batch_time = RunningAverage::new();
        let mut top1 = RunningAverage::new();
        let mut top5 = RunningAverage::new();
        let mut totals = RunTotals::default();
        let mut end = Instant::now();

        for (i, batch) in batches.enumerate() {
            let Batch { input, labels } = batch?;
            let batch_size = labels.len();

            let start = Instant::now();
            let outputs = session.run(vec![input])?;
            totals.record(start.elapsed());
            let output = outputs.into_iter().next().ok_or(EvalError::NoOutput)?;

            let (prec1, prec5) = accuracy(&output, &labels)?;
            top1.update(prec1, batch_size);
            top5.update(prec5, batch_size);

            batch_time.update(end.elapsed().as_secs_f64(), 1);
            end = Instant::now();

            if i % self.print_freq.get() == 0 {
                writeln!(
                    self.out,
                    "{}",
                    progress_line(i, num_batches, batch_size, &batch_time, &top1, &top5)
                )?;
            }
        }

        let avg_latency_ms = totals.average_latency_ms()?;
        log::debug!(
            "evaluated {} batches, inference time {:?}",
            totals.total_predictions,
            totals.elapsed
        );

        Ok(Summary {
            top1: top1.average(),
            top5: top5.average(),
            avg_latency_ms,
            avg_batch_time: batch_time.average(),
            batches: totals.total_predictions,
            samples: top1.count(),
        })
    }
}

fn progress_line(
    index: usize,
    num_batches: usize,
    batch_size: usize,
    batch_time: &RunningAverage,
    top1: &RunningAverage,
    top5: &RunningAverage,
) -> String {
    let rate = batch_size as f64 / batch_time.average();
    let ms_per_sample = 1000.0 * batch_time.average() / batch_size as f64;
    format!(
        "Test: [{index}/{num_batches}]\t\
         Time {:.3} ({:.3}, {rate:.3}/s, {ms_per_sample:.3} ms/sample) \t\
         Prec@1 {:.3} ({:.3})\t\
         Prec@5 {:.3} ({:.3})",
        batch_time.value(),
        batch_time.average(),
        top1.value(),
        top1.average(),
        top5.value(),
        top5.average(),
    )
}
