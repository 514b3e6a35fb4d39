use crate::{
    error::GatherError,
    metrics::Accumulator,
};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
};

/// Trait for collecting one kind of input into an accumulator
pub trait Collector {
    /// Gather from every configured endpoint, delivering successful results to `acc`
    fn collect(
        &mut self,
        acc: Arc<dyn Accumulator>,
    ) -> Pin<Box<dyn Future<Output = Result<(), GatherError>> + Send + '_>>;

    /// One-line description of this input
    fn description(&self) -> &'static str;

    /// Example configuration section
    fn sample_config(&self) -> &'static str;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}
