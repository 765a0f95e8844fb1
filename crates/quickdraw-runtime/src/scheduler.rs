use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// One scheduler tick: sequence number and time since the source started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub seq: u64,
    pub elapsed: Duration,
}

/// Something that paces a loop. `None` means the source is exhausted and
/// the loop should stop.
pub trait TickSource: Send {
    fn next_tick(&mut self) -> impl Future<Output = Option<Tick>> + Send;
}

/// Real-time ticks at a fixed rate. Missed ticks are skipped rather than
/// bunched up.
pub struct IntervalTicks {
    interval: Interval,
    started: Instant,
    seq: u64,
}

impl IntervalTicks {
    /// `rate_hz` must be finite and within `(0, MAX_TICK_RATE_HZ]`, as
    /// `RuntimeConfig::validate` checks.
    pub fn new(rate_hz: f32) -> Self {
        let mut interval = tokio::time::interval(Duration::from_secs_f32(1.0 / rate_hz));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            started: Instant::now(),
            seq: 0,
        }
    }
}

impl TickSource for IntervalTicks {
    async fn next_tick(&mut self) -> Option<Tick> {
        let at = self.interval.tick().await;
        let tick = Tick {
            seq: self.seq,
            elapsed: at.saturating_duration_since(self.started),
        };
        self.seq += 1;
        Some(tick)
    }
}

/// Ticks fed by hand, for deterministic tests and replays.
pub struct ManualTicks {
    rx: mpsc::UnboundedReceiver<Tick>,
}

/// Feeding side of [`ManualTicks`]. Dropping it ends the tick stream.
#[derive(Debug, Clone)]
pub struct ManualTickSender {
    tx: mpsc::UnboundedSender<Tick>,
    seq: u64,
}

impl ManualTicks {
    pub fn channel() -> (ManualTickSender, ManualTicks) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ManualTickSender { tx, seq: 0 }, ManualTicks { rx })
    }
}

impl ManualTickSender {
    /// Emit the next tick at `elapsed`. Returns false once the consumer is gone.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let tick = Tick {
            seq: self.seq,
            elapsed,
        };
        self.seq += 1;
        self.tx.send(tick).is_ok()
    }
}

impl TickSource for ManualTicks {
    async fn next_tick(&mut self) -> Option<Tick> {
        self.rx.recv().await
    }
}
