use crate::error::{Error, Result};
use crate::types::Execution;

/// Explicit execution context for the spatial stages.
///
/// `Sequential` carries no pool and runs closures on the caller's thread;
/// `Parallel` owns a dedicated rayon pool sized at construction. The context
/// is passed into the pipeline rather than configured as process-wide state,
/// so two pipelines with different policies can coexist in one process.
pub struct ExecutionContext {
    pool: Option<rayon::ThreadPool>,
}

impl ExecutionContext {
    pub fn new(execution: Execution) -> Result<Self> {
        match execution {
            Execution::Sequential => Ok(ExecutionContext { pool: None }),
            Execution::Parallel { threads } => {
                let mut builder = rayon::ThreadPoolBuilder::new();
                if threads > 0 {
                    builder = builder.num_threads(threads);
                }
                let pool = builder
                    .build()
                    .map_err(|e| Error::Processing(format!("failed to build thread pool: {e}")))?;
                Ok(ExecutionContext { pool: Some(pool) })
            }
        }
    }

    /// Whether closures passed to [`run`](Self::run) may use rayon parallel
    /// iterators.
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Run `op` inside the context's pool, or inline when sequential.
    pub fn run<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
