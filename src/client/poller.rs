use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

/// A polling loop whose lifetime is bound to this handle. Dropping or
/// stopping the handle aborts the task, so a closed view can never leave a
/// timer running behind it.
pub struct PollHandle {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl PollHandle {
    /// Spawns a loop that awaits each poll before the next tick fires, so at
    /// most one request per resource is ever in flight.
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut poll: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poll().await;
            }
        });
        Self { name, handle }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stop(self) {
        // drop aborts
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        debug!("stopping {} poll loop", self.name);
        self.handle.abort();
    }
}
