//! Host-clock time driver for `embassy-time`.
//!
//! Ticks count real time since the first call to `now()`. A single scheduler
//! thread sleeps on a condvar until the earliest registered deadline and then
//! wakes every waker that is due.

use core::task::Waker;
use embassy_time_driver::{Driver, TICK_HZ, time_driver_impl};
use std::collections::BTreeMap;
use std::sync::{Condvar, Mutex, OnceLock};
use std::time::{Duration, Instant as StdInstant};

#[derive(Default)]
struct SchedulerState {
    // Map of tick deadline -> wakers waiting for it
    queue: BTreeMap<u64, Vec<Waker>>,
}

static ORIGIN: OnceLock<StdInstant> = OnceLock::new();
static SCHED: OnceLock<Mutex<SchedulerState>> = OnceLock::new();
static CV: OnceLock<Condvar> = OnceLock::new();
static SCHEDULER_STARTED: OnceLock<()> = OnceLock::new();

fn origin() -> StdInstant {
    *ORIGIN.get_or_init(StdInstant::now)
}

fn sched() -> &'static Mutex<SchedulerState> {
    SCHED.get_or_init(|| Mutex::new(SchedulerState::default()))
}

fn cv() -> &'static Condvar {
    CV.get_or_init(Condvar::new)
}

fn tick_hz() -> u64 {
    TICK_HZ as u64
}

fn real_to_ticks(r: StdInstant) -> u64 {
    let real_dt = r.saturating_duration_since(origin());
    let ticks = real_dt.as_nanos() * tick_hz() as u128 / 1_000_000_000u128;
    ticks.min(u64::MAX as u128) as u64
}

fn ticks_to_real(ticks: u64) -> StdInstant {
    let real_ns = (ticks as u128) * 1_000_000_000u128 / (tick_hz() as u128);
    // Clamp to avoid u128 -> u64 truncation on very long durations
    origin() + Duration::from_nanos(real_ns.min(u64::MAX as u128) as u64)
}

fn ensure_scheduler_thread() {
    SCHEDULER_STARTED.get_or_init(|| {
        if let Err(e) = std::thread::Builder::new().name("embassy-time-scheduler".into()).spawn(scheduler_thread) {
            log::error!("Failed to start embassy-time scheduler thread: {}", e);
        }
    });
}

fn scheduler_thread() {
    loop {
        let mut guard = sched().lock().unwrap_or_else(|e| e.into_inner());

        // Sleep until something is queued
        let next_at = loop {
            if let Some((&next_at, _)) = guard.queue.iter().next() {
                break next_at;
            }
            guard = cv().wait(guard).unwrap_or_else(|e| e.into_inner());
        };

        let real_target = ticks_to_real(next_at);
        let now_r = StdInstant::now();
        if real_target > now_r {
            // Woken early by a new (possibly earlier) deadline: re-evaluate from the top.
            let _ = cv().wait_timeout(guard, real_target - now_r).unwrap_or_else(|e| e.into_inner());
            continue;
        }

        // Drain all due wakers, then wake them outside the lock.
        let now_ticks = real_to_ticks(now_r);
        let pending = guard.queue.split_off(&(now_ticks.saturating_add(1)));
        let due = std::mem::replace(&mut guard.queue, pending);
        drop(guard);

        for w in due.into_values().flatten() {
            w.wake();
        }
    }
}

struct HostDriver;

impl Driver for HostDriver {
    fn now(&self) -> u64 {
        real_to_ticks(StdInstant::now())
    }

    fn schedule_wake(&self, at: u64, waker: &Waker) {
        ensure_scheduler_thread();
        let mut guard = sched().lock().unwrap_or_else(|e| e.into_inner());
        guard.queue.entry(at).or_default().push(waker.clone());
        drop(guard);
        cv().notify_all();
    }
}

// Register as the global time driver for embassy-time
time_driver_impl!(static DRIVER: HostDriver = HostDriver);
