//! Background sampling loop.
//!
//! A dedicated thread runs one `iostat` measurement per tick and publishes
//! the result to the [`StatsCache`]. Failed cycles are logged and leave the
//! cache as it was; stale data beats no data, and the next tick is the retry.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::collector::iostat::{IostatCollector, SampleError};
use crate::collector::traits::CommandRunner;
use crate::storage::cache::StatsCache;

/// Granularity at which the loop checks for a stop request while waiting.
const STOP_POLL: Duration = Duration::from_millis(100);

/// Runs measurements and writes successful ones to the cache.
pub struct Sampler<R: CommandRunner> {
    collector: IostatCollector<R>,
    cache: StatsCache,
}

impl<R: CommandRunner> Sampler<R> {
    pub fn new(collector: IostatCollector<R>, cache: StatsCache) -> Self {
        Self { collector, cache }
    }

    pub fn cache(&self) -> &StatsCache {
        &self.cache
    }

    /// Runs one cycle. Returns the number of devices published.
    ///
    /// On error the cache is untouched.
    pub fn sample_once(&self) -> Result<usize, SampleError> {
        let t0 = Instant::now();
        let devices = self.collector.collect()?;
        let count = devices.len();
        self.cache.write(devices, Instant::now(), Utc::now());
        debug!(
            devices = count,
            duration_ms = t0.elapsed().as_millis() as u64,
            "stats updated"
        );
        Ok(count)
    }

    /// Runs one cycle and logs the outcome at the level matching its cause.
    fn tick(&self) {
        match self.sample_once() {
            Ok(_) => {}
            Err(SampleError::Parse(e)) => warn!(error = %e, "couldn't load stats"),
            Err(SampleError::Extract(e)) => error!(error = %e, "invalid output from command"),
            Err(SampleError::Command(e)) => error!(error = %e, "command returned with error"),
        }
    }
}

impl<R: CommandRunner + 'static> Sampler<R> {
    /// Starts the loop on its own thread. The first cycle runs one
    /// `repeat_interval` after the start.
    ///
    /// Fails only if the thread cannot be created.
    pub fn spawn(self, repeat_interval: Duration) -> io::Result<SamplerHandle> {
        info!(
            program = self.collector.program(),
            args = ?self.collector.args(),
            repeat_secs = repeat_interval.as_secs_f64(),
            "running stats loader"
        );

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let thread = thread::Builder::new()
            .name("iostat-sampler".to_string())
            .spawn(move || self.run(repeat_interval, &flag))?;

        Ok(SamplerHandle { running, thread })
    }

    fn run(&self, repeat_interval: Duration, running: &AtomicBool) {
        let start = Instant::now();
        let mut ticks: u32 = 1;

        while running.load(Ordering::SeqCst) {
            let deadline = start + repeat_interval * ticks;
            if !sleep_until(deadline, running) {
                break;
            }

            self.tick();

            // Skip ticks missed while the command was running.
            let elapsed = start.elapsed();
            let due = (elapsed.as_nanos() / repeat_interval.as_nanos().max(1)) as u32;
            ticks = due.max(ticks) + 1;
        }

        debug!("stats loader stopped");
    }
}

/// Sleeps until `deadline` in short slices. Returns false if stopped first.
fn sleep_until(deadline: Instant, running: &AtomicBool) -> bool {
    loop {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep((deadline - now).min(STOP_POLL));
    }
}

/// Handle to a running sampler thread.
#[derive(Debug)]
pub struct SamplerHandle {
    running: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl SamplerHandle {
    /// Asks the loop to stop after the current cycle.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }

    /// Stops the loop and waits for the thread to exit.
    pub fn join(self) -> thread::Result<()> {
        self.stop();
        self.thread.join()
    }
}
