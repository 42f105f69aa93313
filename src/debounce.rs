//! Debounce scheduler
//!
//! Coalesces a burst of events on one logical channel into a single trailing
//! emission carrying the last value. The session uses it to turn every edit
//! into at most one analysis per quiet period.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};

/// Sending half of a debounced channel. Dropping it cancels any pending
/// emission.
pub struct DebounceInput<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> DebounceInput<T> {
    /// Post a new value. Restarts the quiet timer; the previous pending value
    /// is discarded. Returns false once the scheduler has shut down.
    pub fn send(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

/// Spawn a debouncer seeded with `initial`.
///
/// The initial value counts as an event: with no further input it is emitted
/// once after the first quiet period. Every event arriving before `quiet`
/// elapses replaces the pending value and restarts the timer, so a burst of
/// events separated by less than `quiet` produces exactly one emission, at
/// `last event + quiet`, carrying the last value. Dropping the input handle
/// or the output receiver while an emission is pending cancels it.
pub fn debounce<T: Send + 'static>(
    initial: T,
    quiet: Duration,
) -> (DebounceInput<T>, mpsc::UnboundedReceiver<T>) {
    let (in_tx, mut in_rx) = mpsc::unbounded_channel::<T>();
    let (out_tx, out_rx) = mpsc::unbounded_channel::<T>();

    tokio::spawn(async move {
        let mut pending = Some(initial);
        let mut deadline = Instant::now() + quiet;
        loop {
            tokio::select! {
                event = in_rx.recv() => match event {
                    Some(value) => {
                        pending = Some(value);
                        deadline = Instant::now() + quiet;
                    }
                    // Input dropped: the consuming context is gone, a pending
                    // emission must not fire.
                    None => return,
                },
                _ = sleep_until(deadline), if pending.is_some() => {
                    if let Some(value) = pending.take() {
                        if out_tx.send(value).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    });

    (DebounceInput { tx: in_tx }, out_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    const T: Duration = Duration::from_millis(1500);

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_into_one_emission_with_last_value() {
        let start = Instant::now();
        let (input, mut rx) = debounce(0u32, T);

        // Events at t = 0, 200, 400, 900.
        input.send(1);
        sleep(Duration::from_millis(200)).await;
        input.send(2);
        sleep(Duration::from_millis(200)).await;
        input.send(3);
        sleep(Duration::from_millis(500)).await;
        input.send(4);

        let value = rx.recv().await.expect("one emission");
        assert_eq!(value, 4);
        assert_eq!(start.elapsed(), Duration::from_millis(900) + T);
        assert!(rx.try_recv().is_err(), "exactly one emission for the burst");
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_inside_quiet_period_restarts_the_timer() {
        let start = Instant::now();
        let (input, mut rx) = debounce("a", T);

        sleep(Duration::from_millis(1400)).await;
        input.send("b");

        // Nothing at t = 1500: the t = 1400 event restarted the timer.
        sleep(Duration::from_millis(101)).await;
        assert!(rx.try_recv().is_err());

        let value = rx.recv().await.expect("emission");
        assert_eq!(value, "b");
        assert_eq!(start.elapsed(), Duration::from_millis(1400) + T);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_value_emits_after_first_quiet_period() {
        let start = Instant::now();
        let (_input, mut rx) = debounce(7u8, T);

        let value = rx.recv().await.expect("initial emission");
        assert_eq!(value, 7);
        assert_eq!(start.elapsed(), T);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_input_cancels_pending_emission() {
        let (input, mut rx) = debounce(7u8, T);
        sleep(Duration::from_millis(100)).await;
        drop(input);
        assert!(rx.recv().await.is_none(), "no emission after teardown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_after_an_emission_start_a_new_cycle() {
        let start = Instant::now();
        let (input, mut rx) = debounce(1u32, T);

        assert_eq!(rx.recv().await, Some(1));
        input.send(2);
        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(start.elapsed(), T + T);
    }
}
