//! Synchronization module
//!
//! This module runs the listener side of the link: polling the transport,
//! reassembling `@TS` frames, applying them to the shared clock and echoing
//! them back. [`Bridge`] ties the listener and the reporting path together.
//!
//! # Examples
//!
//! ```no_run
//! use pothole_link::{Bridge, LinkConfig};
//!
//! #[tokio::main]
//! async fn main() -> pothole_link::Result<()> {
//!     let bridge = Bridge::open(&LinkConfig::default())?;
//!     let listener = bridge.spawn_listener();
//!
//!     bridge.report_detection(12.3, 1.7)?;
//!
//!     bridge.shutdown();
//!     listener.await.expect("listener panicked")?;
//!     Ok(())
//! }
//! ```

mod bridge;
mod listener;

pub use self::bridge::Bridge;
pub use self::listener::{Listener, ListenerConfig, ListenerExit};
