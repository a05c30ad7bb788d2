use crate::{BarAggregator, BarOutcome, EngineError, EventQueue, PriceBar, SignalEngine};

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{Instrument, debug, info, info_span};

/// Why [`run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunExit {
    /// The feed yielded its last bar.
    FeedEnded,
    /// Shutdown was signalled. The engine is shut down.
    Shutdown,
}

/// Drives `engine` from `feed` until the feed ends or shutdown is
/// signalled, pushing every emitted event into `queue`.
///
/// Waiting for the next bar is the only suspension point and is raced
/// against `shutdown`; a bar is either processed completely or not at all.
/// Setting the watch value to `true`, or dropping its sender, requests
/// shutdown.
///
/// With a [`resample_factor`](crate::SignalConfig::resample_factor) above
/// one, feed bars are merged by a [`BarAggregator`] and the engine sees
/// only the merged bars.
///
/// The queue is not closed on return, so several runners can share it.
///
/// # Errors
///
/// Any error of [`SignalEngine::process`]. The engine is then halted.
pub async fn run<S>(
    engine: &mut SignalEngine,
    mut feed: S,
    queue: &EventQueue,
    mut shutdown: watch::Receiver<bool>,
) -> Result<RunExit, EngineError>
where
    S: Stream<Item = PriceBar> + Unpin,
{
    let mut aggregator = BarAggregator::new(engine.config().resample_factor());
    info!(
        config = %engine.config(),
        resample_factor = aggregator.factor(),
        "runner started"
    );

    let exit = loop {
        if *shutdown.borrow_and_update() {
            break RunExit::Shutdown;
        }

        let next = tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() {
                    debug!("shutdown sender dropped");
                    break RunExit::Shutdown;
                }
                continue;
            }
            bar = feed.next() => bar,
        };

        let Some(bar) = next else {
            break RunExit::FeedEnded;
        };
        let Some(bar) = aggregator.push(&bar) else {
            continue;
        };

        if let BarOutcome::Processed(events) = engine.process(&bar)? {
            for event in events {
                queue.push(event);
            }
        }
    };

    if exit == RunExit::Shutdown {
        engine.shutdown();
    }

    let stats = engine.stats();
    info!(
        ?exit,
        bars = stats.bars_accepted,
        dropped = stats.bars_dropped,
        events = stats.events_emitted,
        "runner stopped"
    );

    Ok(exit)
}

/// Spawns an independent runner task for one instrument. Log records of
/// the task carry the instrument name.
///
/// The task returns the engine along with the exit reason so its state can
/// be inspected or reused.
pub fn spawn_instrument<S>(
    instrument: impl Into<String>,
    mut engine: SignalEngine,
    feed: S,
    queue: Arc<EventQueue>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<(SignalEngine, Result<RunExit, EngineError>)>
where
    S: Stream<Item = PriceBar> + Unpin + Send + 'static,
{
    let instrument = instrument.into();
    let span = info_span!("instrument", name = %instrument);

    tokio::spawn(
        async move {
            let result = run(&mut engine, feed, &queue, shutdown).await;
            (engine, result)
        }
        .instrument(span),
    )
}
