//! WheelSpin Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the selection
//! engine to run against the **Production** clock (tokio) or inside the
//! deterministic **Simulation** harness.
//!
//! # Core Concept
//!
//! Everything the engine cannot decide on its own is intercepted:
//! - Time (`now()`, `sleep()`, `system_time()`)
//! - Randomness (`entropy_seed()`)
//! - The copy destination (`ClipboardSink`)
//!
//! By deriving all entropy from a single 64-bit seed in simulation, any
//! odd spin becomes reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use wheelspin_env::WheelContext;
//!
//! async fn frame_loop<Ctx: WheelContext>(ctx: &Ctx, session: &mut WheelSession<Ctx>) {
//!     let ticket = session.spin()?;
//!     loop {
//!         ctx.sleep(Duration::from_millis(16)).await;
//!         if let FrameOutcome::Resolved(_) = session.advance(ticket, ctx.now())? {
//!             break;
//!         }
//!     }
//! }
//! ```

mod context;
mod clipboard;
mod types;
mod error;
mod tokio_impl;

pub use context::WheelContext;
pub use clipboard::{ClipboardSink, MemoryClipboard};
pub use types::SessionId;
pub use error::EnvError;
pub use tokio_impl::SystemContext;
