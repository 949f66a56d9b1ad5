//! Periodic composition of the slot board into the display string.
mod compose;
pub use compose::compose;

use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use sbar_model::BarLayout;

use crate::{display::SinkHandle, slots::SlotBoard};

pub(crate) struct Aggregator {
    board: SlotBoard,
    layout: BarLayout,
    sink: SinkHandle,
    tick: Duration,
}

impl Aggregator {
    pub(crate) fn new(board: SlotBoard, layout: BarLayout, sink: SinkHandle, tick: Duration) -> Self {
        Self {
            board,
            layout,
            sink,
            tick,
        }
    }

    /// Compose and display once per tick until `cancel` fires, then display the stopped text.
    pub(crate) async fn run(self, cancel: CancellationToken) {
        let mut ticker = time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(tick_ms = self.tick.as_millis() as u64, slots = self.board.len(), "aggregator started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let bar = self.board.with_slots(|slots| compose(slots, &self.layout));
                    self.sink.display(&bar);
                }
            }
        }

        self.sink.display(&self.layout.stopped_text);
        debug!("aggregator stopped");
    }
}
