//! Function wrappers that time sampled calls and report the duration

use std::sync::Arc;

use tracing::{trace, warn};

use crate::config::ProbeConfig;
use crate::sampling::SampleGate;
use crate::timer::{Resolution, Timer};

/// Receives one duration per sampled call, in the probe's resolution.
pub type Reporter = Arc<dyn Fn(u128) + Send + Sync>;

/// Trailing completion callback of an asynchronous call.
///
/// The payload `T` is whatever the callee completes with; use a tuple when it
/// completes with several values.
pub type Completion<T> = Box<dyn FnOnce(T) + Send>;

/// Shared settings for a family of timed wrappers.
///
/// `wrap_sync*` wrappers report right after the wrapped function returns.
/// `wrap_async*` wrappers swap the caller's [`Completion`] for one that reports
/// first and then forwards to the caller's.
#[derive(Clone)]
pub struct Probe {
    gate: SampleGate,
    resolution: Resolution,
    report: Reporter,
}

impl Probe {
    /// Probe timing every call, reporting milliseconds to `report`
    pub fn new<D>(report: D) -> Self
    where
        D: Fn(u128) + Send + Sync + 'static,
    {
        Self::with_config(ProbeConfig::default(), report)
    }

    pub fn with_config<D>(config: ProbeConfig, report: D) -> Self
    where
        D: Fn(u128) + Send + Sync + 'static,
    {
        Self {
            gate: SampleGate::new(config.sample_rate),
            resolution: config.resolution,
            report: Arc::new(report),
        }
    }

    /// Set the probability that a call is timed
    #[must_use]
    pub fn rate(mut self, rate: f64) -> Self {
        self.gate = SampleGate::new(rate);
        self
    }

    /// Set the unit durations are reported in
    #[must_use]
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub const fn gate(&self) -> SampleGate {
        self.gate
    }

    pub const fn unit(&self) -> Resolution {
        self.resolution
    }
}

impl Probe {
    /// Wrap a synchronous function.
    ///
    /// If `func` panics the panic reaches the caller untouched and no
    /// duration is reported.
    pub fn wrap_sync<A, R, F>(&self, mut func: F) -> impl FnMut(A) -> R + use<A, R, F>
    where
        F: FnMut(A) -> R,
    {
        let mut timed = self.wrap_sync_in(None, move |_: &mut (), args| func(args));
        move |args| timed(&mut (), args)
    }

    /// Wrap a synchronous function that runs against a context.
    ///
    /// With `Some(context)` the bound context is used on every call, otherwise
    /// `func` receives the context handed to the wrapper by its caller.
    pub fn wrap_sync_in<C, A, R, F>(
        &self,
        mut context: Option<C>,
        mut func: F,
    ) -> impl FnMut(&mut C, A) -> R + use<C, A, R, F>
    where
        F: FnMut(&mut C, A) -> R,
    {
        let Self {
            gate,
            resolution,
            report,
        } = self.clone();

        move |caller: &mut C, args: A| {
            let ctx = context.as_mut().unwrap_or(caller);
            if !gate.admit() {
                trace!(rate = gate.rate(), "call not sampled");
                return func(ctx, args);
            }

            let timer = Timer::started();
            let result = func(ctx, args);
            report_elapsed(&timer, resolution, &report);
            result
        }
    }

    /// Wrap a function following the trailing-callback convention.
    ///
    /// The wrapper returns as soon as `func` does; the duration is reported
    /// when `func` invokes its completion, just before the caller's completion
    /// runs. A completion that is never invoked is never reported.
    pub fn wrap_async<A, T, R, F>(
        &self,
        mut func: F,
    ) -> impl FnMut(A, Completion<T>) -> R + use<A, T, R, F>
    where
        F: FnMut(A, Completion<T>) -> R,
        T: 'static,
    {
        let mut timed =
            self.wrap_async_in(None, move |_: &mut (), args, done| func(args, done));
        move |args, done| timed(&mut (), args, done)
    }

    /// Context-taking form of [`Probe::wrap_async`], see [`Probe::wrap_sync_in`].
    pub fn wrap_async_in<C, A, T, R, F>(
        &self,
        mut context: Option<C>,
        mut func: F,
    ) -> impl FnMut(&mut C, A, Completion<T>) -> R + use<C, A, T, R, F>
    where
        F: FnMut(&mut C, A, Completion<T>) -> R,
        T: 'static,
    {
        let Self {
            gate,
            resolution,
            report,
        } = self.clone();

        move |caller: &mut C, args: A, done: Completion<T>| {
            let ctx = context.as_mut().unwrap_or(caller);
            if !gate.admit() {
                trace!(rate = gate.rate(), "call not sampled");
                return func(ctx, args, done);
            }

            let timer = Timer::started();
            let report = Arc::clone(&report);
            let interposed: Completion<T> = Box::new(move |value| {
                report_elapsed(&timer, resolution, &report);
                done(value);
            });
            func(ctx, args, interposed)
        }
    }
}

fn report_elapsed(timer: &Timer, resolution: Resolution, report: &Reporter) {
    match timer.duration(resolution) {
        Ok(duration) => {
            trace!(duration, %resolution, "call timed");
            report(duration);
        }
        Err(err) => warn!(%err, "dropping duration report"),
    }
}

/// Time every call of a synchronous function.
///
/// ```
/// use femur::wrap;
///
/// let mut max = wrap(|(a, b): (i32, i32)| a.max(b), |ms| assert!(ms < 1_000));
/// assert_eq!(max((4, 5)), 5);
/// ```
pub fn wrap<A, R, F, D>(func: F, report: D) -> impl FnMut(A) -> R
where
    F: FnMut(A) -> R,
    D: Fn(u128) + Send + Sync + 'static,
{
    sample(1.0, func, report)
}

/// Time a random `rate` fraction of the calls of a synchronous function.
pub fn sample<A, R, F, D>(rate: f64, func: F, report: D) -> impl FnMut(A) -> R
where
    F: FnMut(A) -> R,
    D: Fn(u128) + Send + Sync + 'static,
{
    Probe::new(report).rate(rate).wrap_sync(func)
}

/// Time every call of a trailing-callback function.
pub fn wrap_async<A, T, R, F, D>(func: F, report: D) -> impl FnMut(A, Completion<T>) -> R
where
    F: FnMut(A, Completion<T>) -> R,
    T: 'static,
    D: Fn(u128) + Send + Sync + 'static,
{
    sample_async(1.0, func, report)
}

/// Time a random `rate` fraction of the calls of a trailing-callback function.
pub fn sample_async<A, T, R, F, D>(
    rate: f64,
    func: F,
    report: D,
) -> impl FnMut(A, Completion<T>) -> R
where
    F: FnMut(A, Completion<T>) -> R,
    T: 'static,
    D: Fn(u128) + Send + Sync + 'static,
{
    Probe::new(report).rate(rate).wrap_async(func)
}
