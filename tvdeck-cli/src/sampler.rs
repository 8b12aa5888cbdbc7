use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use tvdeck_core::telemetry::{LoadSource, TelemetryCollector, TelemetryPublisher};

/// Background task that samples system load once per interval and publishes
/// the result to the UI loop.
pub struct TelemetrySampler<S> {
    collector: TelemetryCollector<S>,
    publisher: TelemetryPublisher,
    interval: Duration,
}

impl<S: LoadSource> TelemetrySampler<S> {
    pub fn new(source: S, publisher: TelemetryPublisher, interval: Duration) -> Self {
        Self {
            collector: TelemetryCollector::new(source),
            publisher,
            interval,
        }
    }

    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // First tick fires immediately so the stats bar fills in at startup
                _ = interval.tick() => {
                    let snapshot = self.collector.sample();
                    if self.publisher.publish(snapshot) {
                        tracing::trace!(?snapshot, "telemetry changed");
                    }
                }

                changed = stop.changed() => {
                    // A dropped handle counts as a stop request too
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("telemetry sampler stopped");
    }
}

/// Owner's side of a running sampler.
pub struct SamplerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SamplerHandle {
    /// Signal the sampler and wait for its loop to exit.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "telemetry sampler task failed");
        }
    }
}

pub fn spawn_sampler<S>(source: S, publisher: TelemetryPublisher, interval: Duration) -> SamplerHandle
where
    S: LoadSource + Send + 'static,
{
    let (stop_tx, stop_rx) = watch::channel(false);
    let sampler = TelemetrySampler::new(source, publisher, interval);
    tracing::debug!(interval_ms = interval.as_millis() as u64, "starting telemetry sampler");
    let task = tokio::spawn(async move {
        sampler.run(stop_rx).await;
    });
    SamplerHandle {
        stop: stop_tx,
        task,
    }
}
