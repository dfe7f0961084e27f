//! Live mode - spins a real entry file on the Tokio frame clock.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};
use wheelspin_core::{FrameOutcome, SessionError, SpinConfig, SpinTicket, WheelSession, WinnerRecord};
use wheelspin_env::{MemoryClipboard, SystemContext, WheelContext};

/// Interval between animation frames (60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("Failed to read entries: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What a live spin produced.
#[derive(Debug, Clone)]
pub struct LiveOutcome {
    pub winner: String,

    /// Frames applied before the wheel settled
    pub frames: u64,

    /// Wall time the spin took
    pub elapsed: Duration,

    /// Present when the winner was copied out
    pub record: Option<WinnerRecord>,

    /// Entries left on the wheel afterwards
    pub remaining: usize,
}

/// Paces frames with `ctx.sleep` until the spin identified by `ticket` resolves.
///
/// Returns the winner and the number of frames applied.
pub async fn drive_to_resolution<Ctx: WheelContext>(
    session: &mut WheelSession<Ctx>,
    ticket: SpinTicket,
    frame: Duration,
) -> Result<(String, u64), SessionError> {
    let ctx = Arc::clone(session.context());
    let mut frames = 0u64;
    loop {
        ctx.sleep(frame).await;
        frames += 1;
        if let FrameOutcome::Resolved(winner) = session.advance(ticket, ctx.now())? {
            return Ok((winner, frames));
        }
        if frames % 60 == 0 {
            debug!(frames, velocity = session.velocity(), "Spinning");
        }
    }
}

/// Runs one spin on an already-loaded session and optionally copies the winner.
pub async fn spin_session<Ctx: WheelContext>(
    session: &mut WheelSession<Ctx>,
    shuffle: bool,
    clipboard: Option<&MemoryClipboard>,
) -> Result<LiveOutcome, LiveError> {
    if shuffle {
        session.shuffle();
    }

    let started = session.context().now();
    let ticket = session.spin()?;
    let (winner, frames) = drive_to_resolution(session, ticket, FRAME_INTERVAL).await?;
    let elapsed = session.context().now().saturating_sub(started);

    let record = match clipboard {
        Some(sink) => Some(session.copy_winner(sink).await?),
        None => None,
    };

    Ok(LiveOutcome {
        winner,
        frames,
        elapsed,
        record,
        remaining: session.entries().len(),
    })
}

/// Loads `path`, spins it against the system clock and returns the result.
pub async fn spin_file(
    path: impl AsRef<Path>,
    config: SpinConfig,
    shuffle: bool,
    copy: bool,
) -> Result<LiveOutcome, LiveError> {
    let raw = tokio::fs::read_to_string(path.as_ref()).await?;

    let mut session = WheelSession::new(SystemContext::shared(), config);
    let loaded = session.load(&raw);
    info!(path = %path.as_ref().display(), entries = loaded, "Entries loaded");

    let clipboard = MemoryClipboard::new();
    let outcome = spin_session(&mut session, shuffle, copy.then_some(&clipboard)).await?;

    info!(
        winner = %outcome.winner,
        frames = outcome.frames,
        elapsed_ms = outcome.elapsed.as_millis() as u64,
        "Live spin finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;

    #[tokio::test]
    async fn test_drive_on_virtual_clock() {
        let ctx = SimContext::shared(42);
        let mut session = WheelSession::new(ctx.clone(), SpinConfig::default());
        session.load("red\ngreen\nblue\nyellow");

        let ticket = session.spin().unwrap();
        let (winner, frames) = drive_to_resolution(&mut session, ticket, FRAME_INTERVAL)
            .await
            .unwrap();

        assert_eq!(session.current_winner(), Some(winner.as_str()));
        // Settling takes between ~10.6s and ~14s under the default constants
        let secs = ctx.now().as_secs_f64();
        assert!(secs > 10.0 && secs < 15.0, "settled after {secs}s");
        assert!(frames > 600);
    }

    #[tokio::test]
    async fn test_spin_session_copies_winner() {
        let ctx = SimContext::shared(7);
        let mut session = WheelSession::new(ctx, SpinConfig::default());
        session.load("a\nb\nc");
        let clipboard = MemoryClipboard::new();

        let outcome = spin_session(&mut session, true, Some(&clipboard)).await.unwrap();

        let record = outcome.record.unwrap();
        assert_eq!(record.sequence, 1);
        assert_eq!(record.text, outcome.winner);
        assert_eq!(clipboard.contents().as_deref(), Some(outcome.winner.as_str()));
        assert_eq!(outcome.remaining, 2);
        assert!(!session.entries().contains(&outcome.winner));
    }

    #[tokio::test]
    async fn test_drive_rejects_superseded_ticket() {
        let ctx = SimContext::shared(3);
        let mut session = WheelSession::new(ctx, SpinConfig::default());
        session.load("a\nb");

        let ticket = session.spin().unwrap();
        session.teardown();
        let result = drive_to_resolution(&mut session, ticket, FRAME_INTERVAL).await;
        assert!(matches!(result, Err(SessionError::StaleFrame(_))));
    }

    #[tokio::test]
    async fn test_spin_file_missing() {
        let result = spin_file("/nonexistent/wheelspin/entries.txt", SpinConfig::default(), false, false).await;
        assert!(matches!(result, Err(LiveError::Io(_))));
    }

    #[tokio::test]
    async fn test_spin_file_blank_entries() {
        let path = std::env::temp_dir().join(format!("wheelspin-blank-{}.txt", std::process::id()));
        tokio::fs::write(&path, "\n   \n\n").await.unwrap();

        let result = spin_file(&path, SpinConfig::default(), true, true).await;
        let _ = tokio::fs::remove_file(&path).await;

        assert!(matches!(result, Err(LiveError::Session(SessionError::NoEntries))));
    }
}
