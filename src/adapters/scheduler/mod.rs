//! Scheduler adapter - durable deferred job execution.

mod job_runner;

pub use job_runner::{JobRunner, JobRunnerConfig};
