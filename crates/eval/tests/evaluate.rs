use std::{cell::Cell, num::NonZeroUsize, thread, time::Duration};

use imval_core::tensor::Tensor;
use imval_data::{loader::Batch, DataError};
use imval_eval::{
    evaluate::{Evaluator, RunTotals, Summary},
    EvalError,
};
use imval_session::{Session, SessionError};

const NUM_CLASSES: usize = 10;

/// Reads each sample's label from its single input value and scores
/// classes so that the label lands at `rank` (0 = best).
struct Oracle {
    rank: usize,
    calls: Cell<usize>,
    delay: Duration,
}

impl Oracle {
    fn new(rank: usize) -> Self {
        Self {
            rank,
            calls: Cell::new(0),
            delay: Duration::ZERO,
        }
    }
}

impl Session for Oracle {
    fn run(&self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>, SessionError> {
        self.calls.set(self.calls.get() + 1);
        thread::sleep(self.delay);
        let mut data = vec![];
        for &x in inputs[0].data() {
            let label = x as usize;
            // Scores descend with distance from `label + rank`, wrapping around.
            let mut row = vec![0.0f32; NUM_CLASSES];
            for (i, score) in row.iter_mut().enumerate() {
                let pos = (i + NUM_CLASSES * 2 - label + self.rank) % NUM_CLASSES;
                *score = (NUM_CLASSES - pos) as f32;
            }
            data.extend(row);
        }
        Ok(vec![Tensor::new(
            vec![inputs[0].dims()[0], NUM_CLASSES].into(),
            data,
        )?])
    }
}

#[cfg(test)]
fn batch(labels: &[usize]) -> Result<Batch, DataError> {
    let data = labels.iter().map(|&l| l as f32).collect();
    Ok(Batch {
        input: Tensor::new(vec![labels.len(), 1].into(), data).unwrap(),
        labels: labels.to_vec(),
    })
}

#[cfg(test)]
fn evaluator(print_freq: usize) -> Evaluator<Vec<u8>> {
    Evaluator::new(NonZeroUsize::new(print_freq).unwrap(), vec![])
}

#[test]
fn oracle_ranks() {
    let out = Oracle::new(0).run(vec![batch(&[3]).unwrap().input]).unwrap();
    let row = out[0].data();
    let best = (0..NUM_CLASSES).max_by(|&a, &b| row[a].total_cmp(&row[b]));
    assert_eq!(best, Some(3));

    let out = Oracle::new(7).run(vec![batch(&[3]).unwrap().input]).unwrap();
    let row = out[0].data();
    let mut ranked = (0..NUM_CLASSES).collect::<Vec<_>>();
    ranked.sort_by(|&a, &b| row[b].total_cmp(&row[a]));
    assert_eq!(ranked.iter().position(|&c| c == 3), Some(7));
}

#[test]
fn all_correct() {
    let session = Oracle::new(0);
    let batches = vec![batch(&[0, 1, 2]), batch(&[3, 4, 5]), batch(&[9])];
    let summary = evaluator(1).run(&session, batches).unwrap();
    assert_eq!(summary.top1, 100.0);
    assert_eq!(summary.top5, 100.0);
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.samples, 7);
}

#[test]
fn all_wrong() {
    let session = Oracle::new(5);
    let batches = vec![batch(&[0, 1]), batch(&[8, 9])];
    let summary = evaluator(1).run(&session, batches).unwrap();
    assert_eq!(summary.top1, 0.0);
    assert_eq!(summary.top5, 0.0);
}

#[test]
fn top5_only() {
    let session = Oracle::new(4);
    let summary = evaluator(1).run(&session, vec![batch(&[2, 7])]).unwrap();
    assert_eq!(summary.top1, 0.0);
    assert_eq!(summary.top5, 100.0);
}

#[test]
fn predictions_count_batches_not_samples() {
    let session = Oracle::new(0);
    let batches = vec![batch(&[0; 4]), batch(&[1; 4]), batch(&[2; 2])];
    let summary = evaluator(100).run(&session, batches).unwrap();
    assert_eq!(summary.batches, 3);
    assert_eq!(summary.samples, 10);
    assert_eq!(session.calls.get(), 3);
}

#[test]
fn accuracy_is_weighted_by_batch_size() {
    struct Mixed(Cell<usize>);

    // First call answers correctly, later calls answer wrongly.
    impl Session for Mixed {
        fn run(&self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>, SessionError> {
            let call = self.0.get();
            self.0.set(call + 1);
            Oracle::new(if call == 0 { 0 } else { 9 }).run(inputs)
        }
    }

    let summary = evaluator(1)
        .run(&Mixed(Cell::new(0)), vec![batch(&[1, 2, 3]), batch(&[4])])
        .unwrap();
    assert_eq!(summary.top1, 75.0);
    assert_eq!(summary.top5, 75.0);
}

#[test]
fn empty_dataset() {
    let session = Oracle::new(0);
    let result = evaluator(1).run(&session, Vec::<Result<Batch, DataError>>::new());
    assert!(matches!(result, Err(EvalError::EmptyDataset)));
    assert_eq!(
        EvalError::EmptyDataset.to_string(),
        "empty dataset: no batches processed"
    );
    assert_eq!(session.calls.get(), 0);
}

#[test]
fn progress_every_batch() {
    let session = Oracle::new(0);
    let batches = vec![batch(&[0, 1]), batch(&[2, 3]), batch(&[4])];
    let mut eval = evaluator(1);
    eval.run(&session, batches).unwrap();
    let out = String::from_utf8(eval.into_inner()).unwrap();
    let lines = out.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Test: [0/3]\tTime "));
    assert!(lines[1].starts_with("Test: [1/3]"));
    assert!(lines[2].starts_with("Test: [2/3]"));
    assert!(lines[2].ends_with("Prec@1 100.000 (100.000)\tPrec@5 100.000 (100.000)"));
    assert!(lines[0].contains("ms/sample"));
}

#[test]
fn progress_frequency() {
    let session = Oracle::new(0);
    let batches = (0..5).map(|i| batch(&[i])).collect::<Vec<_>>();
    let mut eval = evaluator(2);
    eval.run(&session, batches).unwrap();
    let out = String::from_utf8(eval.into_inner()).unwrap();
    let indices = out
        .lines()
        .map(|l| l.split(']').next().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(indices, vec!["Test: [0/5", "Test: [2/5", "Test: [4/5"]);
}

#[test]
fn latency_excludes_loading() {
    let session = Oracle {
        delay: Duration::from_millis(10),
        ..Oracle::new(0)
    };
    let batches = (0..3).map(|i| {
        thread::sleep(Duration::from_millis(100));
        batch(&[i, i + 1])
    });
    let summary = evaluator(1).run(&session, batches).unwrap();
    assert_eq!(summary.batches, 3);
    assert!(summary.avg_latency_ms >= 10.0, "{}", summary.avg_latency_ms);
    assert!(summary.avg_latency_ms < 100.0, "{}", summary.avg_latency_ms);
    assert!(summary.avg_batch_time >= 0.11, "{}", summary.avg_batch_time);
}

#[test]
fn session_failure_aborts_run() {
    struct Failing;

    impl Session for Failing {
        fn run(&self, _: Vec<Tensor>) -> Result<Vec<Tensor>, SessionError> {
            Err(SessionError::Message("device lost".into()))
        }
    }

    let mut eval = evaluator(1);
    let result = eval.run(&Failing, vec![batch(&[0]), batch(&[1])]);
    assert!(matches!(
        result,
        Err(EvalError::Session(SessionError::Message(_)))
    ));
    assert!(eval.into_inner().is_empty());
}

#[test]
fn loader_failure_aborts_run() {
    let session = Oracle::new(0);
    let batches = vec![
        batch(&[0]),
        Err(DataError::NotFound("missing.png".into())),
        batch(&[1]),
    ];
    let result = evaluator(1).run(&session, batches);
    assert!(matches!(result, Err(EvalError::Data(DataError::NotFound(_)))));
    assert_eq!(session.calls.get(), 1);
}

#[test]
fn session_without_outputs() {
    struct Silent;

    impl Session for Silent {
        fn run(&self, _: Vec<Tensor>) -> Result<Vec<Tensor>, SessionError> {
            Ok(vec![])
        }
    }

    let result = evaluator(1).run(&Silent, vec![batch(&[0])]);
    assert!(matches!(result, Err(EvalError::NoOutput)));
}

#[test]
fn run_totals() {
    let mut totals = RunTotals::default();
    assert!(matches!(
        totals.average_latency_ms(),
        Err(EvalError::EmptyDataset)
    ));

    totals.record(Duration::from_millis(3));
    totals.record(Duration::from_millis(5));
    assert_eq!(totals.total_predictions, 2);
    assert_eq!(totals.elapsed, Duration::from_millis(8));
    assert_eq!(totals.average_latency_ms().unwrap(), 4.0);
}

#[test]
fn summary_report() {
    let summary = Summary {
        top1: 76.5,
        top5: 93.25,
        avg_latency_ms: 1.5,
        avg_batch_time: 0.25,
        batches: 2,
        samples: 512,
    };
    assert_eq!(
        summary.to_string(),
        " * Prec@1 76.500 (23.500) Prec@5 93.250 (6.750)\nAverage Latency: 1.5 ms"
    );
}
