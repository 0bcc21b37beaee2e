//! Time function calls and hand the duration to a callback.
//!
//! [`wrap`] times every call, [`sample`] only a random fraction of them. Both
//! have `_async` counterparts for functions that finish by invoking a trailing
//! [`Completion`] instead of returning. A [`Probe`] carries the shared
//! settings (rate, [`Resolution`], reporter) and adds context-taking wrappers.
//!
//! ```
//! use femur::{wrap_async, Completion};
//!
//! fn async_max((a, b): (i32, i32), done: Completion<i32>) {
//!     done(a.max(b));
//! }
//!
//! let mut max = wrap_async(async_max, |ms| println!("duration was: {ms}"));
//! max((4, 5), Box::new(|m: i32| assert_eq!(m, 5)));
//! ```

pub mod config;
pub mod probe;
pub mod sampling;
pub mod timer;

pub use config::ProbeConfig;
pub use probe::{Completion, Probe, Reporter, sample, sample_async, wrap, wrap_async};
pub use sampling::SampleGate;
pub use timer::{Resolution, Timer, TimerError};
