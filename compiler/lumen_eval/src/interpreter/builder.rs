//! `EvaluatorBuilder` for creating evaluators with non-default limits or
//! seeded streams.

use std::sync::Arc;

use lumen_types::{Project, StreamKind};
use tracing::warn;

use super::Evaluator;
use crate::streams::{coerce, StreamRegistry};
use crate::Value;

/// Limits for one evaluator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Steps allowed per pass before `StepLimit`.
    pub max_steps: usize,
    /// Frames allowed on the stack before `CallDepthLimit`.
    pub max_depth: usize,
    /// Snapshots kept for stepping backward; older ones are dropped.
    pub history_limit: usize,
    /// Values kept per stream.
    pub stream_history_limit: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_steps: 1_000_000,
            max_depth: 256,
            history_limit: 100_000,
            stream_history_limit: 1024,
        }
    }
}

/// Builder for [`Evaluator`].
pub struct EvaluatorBuilder {
    project: Arc<Project>,
    config: EvalConfig,
    initial: Vec<(StreamKind, Value)>,
}

impl EvaluatorBuilder {
    pub fn new(project: impl Into<Arc<Project>>) -> Self {
        EvaluatorBuilder {
            project: project.into(),
            config: EvalConfig::default(),
            initial: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Snapshots kept for [`Evaluator::step_back`]; zero disables it.
    #[must_use]
    pub fn history_limit(mut self, history_limit: usize) -> Self {
        self.config.history_limit = history_limit;
        self
    }

    #[must_use]
    pub fn stream_history_limit(mut self, limit: usize) -> Self {
        self.config.stream_history_limit = limit;
        self
    }

    /// Start `kind` at `value` instead of its usual initial value.
    #[must_use]
    pub fn initial(mut self, kind: StreamKind, value: Value) -> Self {
        self.initial.push((kind, value));
        self
    }

    pub fn build(self) -> Evaluator {
        let mut streams = StreamRegistry::new(self.config.stream_history_limit);
        for (kind, value) in self.initial {
            match coerce(kind, value) {
                Ok(value) => streams.seed(kind, value),
                Err(error) => warn!(%error, "ignoring initial stream value"),
            }
        }
        Evaluator::from_parts(self.config, self.project, streams)
    }
}
