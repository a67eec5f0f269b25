//! Decoded video resolution sampling

use std::sync::Arc;
use std::time::Duration;

use peerview_core::VideoResolution;
use peerview_time::{RefreshClock, ScheduledTask};

use crate::{FieldWriter, LifecycleEvents, MonitorEvent, MonitorKind, PlaybackSink, ViewStateHub};

/// Polls the sink's decoded size while a video track is bound
pub struct ResolutionSampler {
    period: Duration,
    hub: ViewStateHub,
    events: LifecycleEvents,
    running: Option<(ScheduledTask, FieldWriter)>,
}

impl ResolutionSampler {
    pub fn new(period: Duration, hub: ViewStateHub, events: LifecycleEvents) -> Self {
        ResolutionSampler {
            period,
            hub,
            events,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start polling `sink`; the first sample is taken one period from now
    pub fn start(&mut self, sink: Arc<dyn PlaybackSink>) {
        if self.is_running() {
            self.stop();
        }

        let writer = self.hub.writer();
        let task_writer = writer.clone();
        let mut clock = RefreshClock::new(self.period);

        let task = ScheduledTask::spawn("resolution", async move {
            loop {
                clock.tick().await;
                let sampled = sink.decoded_size();
                let changed = task_writer.update(|state| {
                    if state.video_resolution == Some(sampled) {
                        return false;
                    }
                    state.video_resolution = Some(sampled);
                    true
                });
                if changed {
                    tracing::trace!(resolution = %sampled, "video resolution changed");
                }
            }
        });

        self.running = Some((task, writer));
        self.events.emit(MonitorEvent::Started(MonitorKind::Resolution));
    }

    /// Cancel polling and clear the resolution
    ///
    /// The clear is re-asserted on every call, even when nothing was running.
    pub fn stop(&mut self) {
        let clear = |state: &mut peerview_core::PeerViewState| state.video_resolution = None;
        match self.running.take() {
            Some((mut task, writer)) => {
                task.cancel();
                writer.retire(clear);
                self.events.emit(MonitorEvent::Stopped(MonitorKind::Resolution));
            }
            None => self.hub.force(clear),
        }
    }

    /// Last sampled resolution
    pub fn resolution(&self) -> Option<VideoResolution> {
        self.hub.snapshot().video_resolution
    }
}
