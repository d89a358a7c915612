//! Synchronized clock state
//!
//! The controller is the time authority. Every valid `@TS` frame it sends
//! overwrites the host's notion of "now" and flips the clock to synced;
//! reporters read that value to stamp outgoing pothole reports.
//!
//! ```
//! use pothole_link::time::SharedClock;
//!
//! let clock = SharedClock::new();
//! let state = clock.snapshot();
//! assert!(!state.synced);
//! assert_eq!(state.timestamp_ms, 0);
//! ```

mod clock;

pub use self::clock::SharedClock;
