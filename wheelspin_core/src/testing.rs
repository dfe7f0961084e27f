//! Test fixtures: a hand-cranked clock and a clipboard that always refuses.

use crate::prng::Mulberry32;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wheelspin_env::{ClipboardSink, EnvError, WheelContext};

/// Context whose clock only moves when told to.
pub struct ManualContext {
    seed: u32,
    now: Mutex<Duration>,
    seeds: Mutex<Mulberry32>,
}

impl ManualContext {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            now: Mutex::new(Duration::ZERO),
            seeds: Mutex::new(Mulberry32::new(seed)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

#[async_trait]
impl WheelContext for ManualContext {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn system_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_704_067_200) + self.now()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }

    fn entropy_seed(&self) -> u32 {
        self.seeds.lock().unwrap().next_u32()
    }

    fn seed(&self) -> u64 {
        self.seed as u64
    }
}

/// Clipboard that refuses every write.
pub struct DenyingClipboard;

#[async_trait]
impl ClipboardSink for DenyingClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), EnvError> {
        Err(EnvError::denied("document not focused"))
    }
}
