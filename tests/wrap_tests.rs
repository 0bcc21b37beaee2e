#![expect(clippy::unwrap_used, reason = "Unwrapping in tests is acceptable")]

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use femur::{Completion, Probe, Resolution, sample, sample_async, wrap, wrap_async};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Reporter that keeps every duration it receives
fn recorder() -> (Arc<Mutex<Vec<u128>>>, impl Fn(u128) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |duration| sink.lock().push(duration))
}

#[test]
fn times_a_synchronous_call() {
    init_tracing();
    let (seen, report) = recorder();
    let mut max = wrap(|(a, b): (i32, i32)| a.max(b), report);

    assert_eq!(max((4, 5)), 5);
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn times_a_call_without_arguments() {
    let (seen, report) = recorder();
    let mut five = wrap(|()| 5, report);

    assert_eq!(five(()), 5);
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn reports_the_time_spent_in_the_call() {
    let (seen, report) = recorder();
    let mut slow = wrap(
        |millis: u64| {
            thread::sleep(Duration::from_millis(millis));
            millis
        },
        report,
    );

    assert_eq!(slow(12), 12);
    assert!(seen.lock()[0] >= 12);
}

#[test]
fn times_a_call_with_a_completion() {
    init_tracing();
    let events = Arc::new(Mutex::new(Vec::new()));
    let on_duration = Arc::clone(&events);
    let on_done = Arc::clone(&events);

    let mut wrapped = wrap_async(
        |(): (), done: Completion<i32>| done(5),
        move |_| on_duration.lock().push("duration".to_string()),
    );
    wrapped(
        (),
        Box::new(move |five: i32| on_done.lock().push(format!("done {five}"))),
    );

    assert_eq!(*events.lock(), vec!["duration", "done 5"]);
}

#[test]
fn completion_payload_is_forwarded_unchanged() {
    let (seen, report) = recorder();
    let mut split = wrap_async(
        |line: String, done: Completion<(String, usize)>| {
            let len = line.len();
            done((line, len));
        },
        report,
    );

    let result = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&result);
    split(
        "femur".to_string(),
        Box::new(move |payload| *slot.lock() = Some(payload)),
    );

    assert_eq!(*result.lock(), Some(("femur".to_string(), 5)));
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn wrapper_returns_before_a_deferred_completion() {
    let (seen, report) = recorder();
    let events = Arc::new(Mutex::new(Vec::new()));
    let on_done = Arc::clone(&events);

    let mut deferred = wrap_async(
        |millis: u64, done: Completion<u64>| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(millis));
                done(millis);
            })
        },
        report,
    );

    let handle = deferred(
        15,
        Box::new(move |millis: u64| on_done.lock().push(millis)),
    );
    assert!(seen.lock().is_empty());

    handle.join().unwrap();
    assert_eq!(*events.lock(), vec![15]);
    let seen = seen.lock();
    assert_eq!(seen.len(), 1);
    assert!(seen[0] >= 15);
}

#[test]
fn completion_that_never_fires_is_never_reported() {
    let (seen, report) = recorder();
    let dropped = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&dropped);

    let mut stalled = wrap_async(
        move |(): (), _done: Completion<()>| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
        report,
    );
    stalled((), Box::new(|()| panic!("completion must not run")));

    assert_eq!(dropped.load(Ordering::SeqCst), 1);
    assert!(seen.lock().is_empty());
}

#[test]
fn zero_rate_never_reports() {
    let (seen, report) = recorder();
    let mut double = sample(0.0, |n: u32| n * 2, report);
    for n in 0..500 {
        assert_eq!(double(n), n * 2);
    }
    assert!(seen.lock().is_empty());

    let (seen, report) = recorder();
    let forwarded = Arc::new(AtomicUsize::new(0));
    let mut echo = sample_async(0.0, |n: u32, done: Completion<u32>| done(n), report);
    for n in 0..500 {
        let forwarded = Arc::clone(&forwarded);
        echo(
            n,
            Box::new(move |m: u32| {
                assert_eq!(m, n);
                forwarded.fetch_add(1, Ordering::SeqCst);
            }),
        );
    }
    assert_eq!(forwarded.load(Ordering::SeqCst), 500);
    assert!(seen.lock().is_empty());
}

#[test]
fn full_rate_reports_every_call() {
    let (seen, report) = recorder();
    let mut double = sample(1.0, |n: u32| n * 2, report);
    for n in 0..200 {
        assert_eq!(double(n), n * 2);
    }
    assert_eq!(seen.lock().len(), 200);
}

#[test]
fn partial_rate_reports_some_calls() {
    let (seen, report) = recorder();
    let mut noop = sample(0.5, |()| (), report);
    for _ in 0..2_000 {
        noop(());
    }
    let reported = seen.lock().len();
    assert!((700..1_300).contains(&reported), "reported {reported}");
}

#[test]
fn panics_propagate_without_a_report() {
    let (seen, report) = recorder();
    let mut explode = wrap(|code: i32| -> i32 { panic!("boom {code}") }, report);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| explode(7)));
    let payload = outcome.unwrap_err();
    assert_eq!(payload.downcast_ref::<String>().unwrap(), "boom 7");
    assert!(seen.lock().is_empty());
}

#[test]
fn probe_reports_in_its_resolution() {
    let (seen, report) = recorder();
    let probe = Probe::new(report).resolution(Resolution::Nanoseconds);
    let mut sleepy = probe.wrap_sync(|()| thread::sleep(Duration::from_millis(3)));
    sleepy(());

    assert!(seen.lock()[0] >= 3_000_000);
}

#[test]
fn probe_threads_a_bound_context_into_async_calls() {
    let (seen, report) = recorder();
    let probe = Probe::new(report);
    let mut tally = probe.wrap_async_in(
        Some(0_u32),
        |total: &mut u32, n: u32, done: Completion<u32>| {
            *total += n;
            done(*total);
        },
    );

    let totals = Arc::new(Mutex::new(Vec::new()));
    let mut unused = 100_u32;
    for n in 1..=3 {
        let totals = Arc::clone(&totals);
        tally(&mut unused, n, Box::new(move |t: u32| totals.lock().push(t)));
    }

    assert_eq!(*totals.lock(), vec![1, 3, 6]);
    assert_eq!(unused, 100);
    assert_eq!(seen.lock().len(), 3);
}
