use imval_core::tensor::Tensor;

use crate::EvalError;

/// Top-1 and top-5 accuracy of `output` (`[N, C]` class scores) against
/// `target` (`N` labels), as percentages.
pub fn accuracy(output: &Tensor, target: &[usize]) -> Result<(f64, f64), EvalError> {
    let precs = topk(output, target, &[1, 5])?;
    Ok((precs[0], precs[1]))
}

/// For each `k`, the percentage of samples whose label is among the `k`
/// highest scores of its row. `k` larger than the number of classes counts
/// every class.
///
/// Any axes after the first are flattened into the class axis.
pub fn topk(output: &Tensor, target: &[usize], ks: &[usize]) -> Result<Vec<f64>, EvalError> {
    let dims = output.dims();
    if dims.is_empty() {
        return Err(EvalError::InvalidOutput("scalar output".into()));
    }
    if dims[0] != target.len() {
        return Err(EvalError::ShapeMismatch {
            outputs: dims[0],
            labels: target.len(),
        });
    }
    if target.is_empty() {
        return Err(EvalError::InvalidOutput("empty batch".into()));
    }
    if dims.row_len() == 0 {
        return Err(EvalError::InvalidOutput("output has no classes".into()));
    }

    let max_k = ks.iter().copied().max().unwrap_or(0);
    let mut hits = vec![0usize; ks.len()];
    let mut ranked = Vec::with_capacity(dims.row_len());
    for (row, &label) in output.rows().zip(target.iter()) {
        ranked.clear();
        ranked.extend(0..row.len());
        // Stable, so equal scores keep ascending class order. NaN ranks first.
        ranked.sort_by(|&a, &b| row[b].total_cmp(&row[a]));
        ranked.truncate(max_k);
        for (k, hit) in ks.iter().zip(hits.iter_mut()) {
            if ranked.iter().take(*k).any(|&idx| idx == label) {
                *hit += 1;
            }
        }
    }

    Ok(hits
        .into_iter()
        .map(|c| 100.0 * c as f64 / target.len() as f64)
        .collect())
}
