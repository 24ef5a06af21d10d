/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Heartbeat emission and peer liveness.
//!
//! This module handles:
//! - Emitting one heartbeat per interval while established ([`HeartbeatScheduler`])
//! - Tracking inbound silence when a peer timeout is configured ([`PeerLiveness`])

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Emits a heartbeat on a fixed interval.
///
/// The scheduler is a pure producer. It pushes a copy of `beat` into the
/// connection's outbound queue every interval and knows nothing about the
/// peer. It stops as soon as its token is cancelled or the queue closes.
#[derive(Debug, Clone)]
pub struct HeartbeatScheduler<T> {
    interval: Duration,
    beat: T,
}

impl<T: Clone + Send + 'static> HeartbeatScheduler<T> {
    /// Creates a scheduler.
    ///
    /// # Arguments
    /// * `interval` - Time between heartbeats; the first one is sent one interval after start
    /// * `beat` - The item pushed on each tick, typically a pre-encoded frame
    #[must_use]
    pub const fn new(interval: Duration, beat: T) -> Self {
        Self { interval, beat }
    }

    /// Returns the heartbeat interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until cancelled. Returns the number of heartbeats queued.
    pub async fn run(self, tx: mpsc::Sender<T>, token: CancellationToken) -> u64 {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sent = 0u64;

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let queued = tokio::select! {
                biased;
                () = token.cancelled() => false,
                res = tx.send(self.beat.clone()) => res.is_ok(),
            };
            if !queued {
                break;
            }
            sent += 1;
            trace!(sent, "heartbeat queued");
        }

        sent
    }

    /// Spawns [`HeartbeatScheduler::run`] on the current runtime.
    pub fn spawn(self, tx: mpsc::Sender<T>, token: CancellationToken) -> JoinHandle<u64> {
        tokio::spawn(self.run(tx, token))
    }
}

/// Tracks when the peer was last heard from.
#[derive(Debug)]
pub struct PeerLiveness {
    timeout: Option<Duration>,
    last_received: Instant,
}

impl PeerLiveness {
    /// Creates a tracker. A `None` timeout never expires.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            last_received: Instant::now(),
        }
    }

    /// Records inbound traffic.
    #[inline]
    pub fn on_received(&mut self) {
        self.last_received = Instant::now();
    }

    /// Returns when the peer will be considered dead, if a timeout is set.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|timeout| self.last_received + timeout)
    }

    /// Returns true if the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.deadline().is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Returns the time since the last inbound frame.
    #[must_use]
    pub fn silence(&self) -> Duration {
        self.last_received.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_beat_after_one_interval() {
        let (tx, mut rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let start = Instant::now();
        let handle = HeartbeatScheduler::new(Duration::from_secs(1), "hb").spawn(tx, token.clone());

        assert_eq!(rx.recv().await, Some("hb"));
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert_eq!(rx.recv().await, Some("hb"));
        assert_eq!(start.elapsed(), Duration::from_secs(2));

        token.cancel();
        assert_eq!(handle.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_cancel() {
        let (tx, mut rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let handle = HeartbeatScheduler::new(Duration::from_secs(1), 7u8).spawn(tx, token.clone());

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        token.cancel();
        assert_eq!(handle.await.unwrap(), 3);

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(received, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_queue_closes() {
        let (tx, rx) = mpsc::channel::<u8>(1);
        drop(rx);
        let sent = HeartbeatScheduler::new(Duration::from_secs(1), 1u8)
            .run(tx, CancellationToken::new())
            .await;
        assert_eq!(sent, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_peer_liveness() {
        let mut liveness = PeerLiveness::new(Some(Duration::from_secs(3)));
        assert!(!liveness.is_expired());

        tokio::time::advance(Duration::from_secs(2)).await;
        liveness.on_received();
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!liveness.is_expired());
        assert_eq!(liveness.silence(), Duration::from_secs(2));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(liveness.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_liveness_never_expires() {
        let liveness = PeerLiveness::new(None);
        tokio::time::advance(Duration::from_secs(3_600)).await;
        assert!(liveness.deadline().is_none());
        assert!(!liveness.is_expired());
    }
}
