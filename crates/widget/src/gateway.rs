//! Transport for submitted reports.
//!
//! There is no backend yet; [`SimulatedGateway`] models the round-trip
//! with a fixed delay so the "submitting" state is still exercised.

use crate::clock::Clock;
use crate::error::SubmissionError;
use crate::report::Report;
use std::time::Duration;
use tracing::debug;

/// Delivers a report to wherever reports are kept.
#[allow(async_fn_in_trait)]
pub trait ReportGateway {
    /// Sends `report`; the store is only updated when this succeeds.
    async fn submit(&self, report: &Report) -> Result<(), SubmissionError>;
}

/// Accepts every report after a fixed delay.
#[derive(Debug, Clone)]
pub struct SimulatedGateway<C> {
    clock: C,
    delay: Duration,
}

impl<C: Clock> SimulatedGateway<C> {
    /// Gateway that waits `delay` before acknowledging.
    pub fn new(clock: C, delay: Duration) -> Self {
        Self { clock, delay }
    }

    /// Configured round-trip delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<C: Clock> ReportGateway for SimulatedGateway<C> {
    async fn submit(&self, report: &Report) -> Result<(), SubmissionError> {
        debug!(report_id = %report.id(), delay_ms = self.delay.as_millis(), "Simulating submission");
        if !self.delay.is_zero() {
            self.clock.sleep(self.delay).await;
        }
        Ok(())
    }
}
