use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row length must be valid.
    #[error("row length must be > 0")]
    InvalidRowStride(usize),

    /// The destination buffer is not made of whole rows.
    #[error("destination length {0} is not a multiple of the row stride {1}")]
    SizeMismatch(usize, usize),
}

/// Controls how row-wise operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool and hand out whole rows to the workers.
    ///
    /// Each worker owns a disjoint set of destination rows.
    #[default]
    ParallelRows,

    /// Use the global Rayon thread pool and schedule every element on its own.
    ///
    /// This maximizes parallelism but may have overhead for small operations.
    ParallelElements,

    /// Run sequentially on the current thread, row after row.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads, partitioned by rows.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

/// Fill a row-major buffer with the given strategy.
///
/// `op(row, col, span)` writes `span`, which starts at column `col` of `row`.
/// Row strategies pass `col == 0` and the whole row chunk, the element
/// strategy passes a single element. The buffer length must be a multiple of
/// `row_stride`.
pub fn execute_rows_with<T, F>(
    dst: &mut [T],
    strategy: ExecutionStrategy,
    row_stride: usize,
    op: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, usize, &mut [T]) + Sync + Send,
{
    if row_stride == 0 {
        return Err(ParallelError::InvalidRowStride(row_stride));
    }
    if dst.len() % row_stride != 0 {
        return Err(ParallelError::SizeMismatch(dst.len(), row_stride));
    }

    match strategy {
        ExecutionStrategy::Serial => {
            dst.chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(|(row, chunk)| op(row, 0, chunk));
        }
        ExecutionStrategy::ParallelRows => {
            dst.par_chunks_exact_mut(row_stride)
                .enumerate()
                .for_each(|(row, chunk)| op(row, 0, chunk));
        }
        ExecutionStrategy::ParallelElements => {
            dst.par_chunks_exact_mut(1)
                .enumerate()
                .for_each(|(idx, elem)| op(idx / row_stride, idx % row_stride, elem));
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                dst.par_chunks_exact_mut(row_stride)
                    .enumerate()
                    .for_each(|(row, chunk)| op(row, 0, chunk));
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_index(row: usize, col: usize, span: &mut [usize]) {
        span.iter_mut()
            .enumerate()
            .for_each(|(i, d)| *d = row * 10 + col + i);
    }

    #[test]
    fn test_execute_serial() {
        let mut dst = vec![0; 6];
        execute_rows_with(&mut dst, ExecutionStrategy::Serial, 3, fill_index).unwrap();
        assert_eq!(dst, vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn test_execute_parallel_rows() {
        let mut dst = vec![0; 6];
        execute_rows_with(&mut dst, ExecutionStrategy::ParallelRows, 3, fill_index)
            .unwrap();
        assert_eq!(dst, vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn test_execute_parallel_elements() {
        let mut dst = vec![0; 6];
        execute_rows_with(&mut dst, ExecutionStrategy::ParallelElements, 3, fill_index)
            .unwrap();
        assert_eq!(dst, vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn test_execute_fixed_success() {
        let mut dst = vec![0; 6];
        execute_rows_with(&mut dst, ExecutionStrategy::Fixed(2), 3, fill_index)
            .unwrap();
        assert_eq!(dst, vec![0, 1, 2, 10, 11, 12]);
    }

    #[test]
    fn test_execute_fixed_error() {
        let mut dst = vec![0; 4];
        let res = execute_rows_with(&mut dst, ExecutionStrategy::Fixed(0), 2, |_, _, _| {});
        assert!(matches!(res, Err(ParallelError::InvalidThreadCount(0))));
    }

    #[test]
    fn test_execute_invalid_row_stride() {
        let mut dst = vec![0; 4];
        let res = execute_rows_with(&mut dst, ExecutionStrategy::Serial, 0, |_, _, _| {});
        assert!(matches!(res, Err(ParallelError::InvalidRowStride(0))));
    }

    #[test]
    fn test_execute_partial_row() {
        let mut dst = vec![0; 5];
        let res = execute_rows_with(&mut dst, ExecutionStrategy::ParallelRows, 2, |_, _, _| {});
        assert_eq!(res, Err(ParallelError::SizeMismatch(5, 2)));
    }
}
