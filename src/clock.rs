//! One-second round clock and the deferred continuation queue.
//!
//! Nothing here reads the wall clock. Callers feed `Duration` deltas, the
//! terminal loop from `Instant`, tests by hand.

use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockMode
{
    /// Unbounded, stops only when told to.
    CountUp,
    /// Stops by itself at zero and reports expiry.
    CountDown
    {
        from: u32,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClockUpdate
{
    pub ticks: u32,
    pub expired: bool,
}

#[derive(Clone, Debug)]
pub struct RoundClock
{
    mode: ClockMode,
    seconds: u32,
    running: bool,
    carry: Duration,
}

impl RoundClock
{
    pub fn count_up() -> Self
    {
        Self::with_mode(ClockMode::CountUp)
    }

    pub fn count_down(from: u32) -> Self
    {
        Self::with_mode(ClockMode::CountDown { from })
    }

    fn with_mode(mode: ClockMode) -> Self
    {
        let seconds = match mode {
            ClockMode::CountUp => 0,
            ClockMode::CountDown { from } => from,
        };
        Self {
            mode,
            seconds,
            running: false,
            carry: Duration::ZERO,
        }
    }

    /// (Re)starts from the beginning. A run in progress is stopped first so
    /// its partial second never leaks into the new one.
    pub fn start(&mut self)
    {
        if self.running {
            self.stop();
        }
        *self = Self::with_mode(self.mode);
        self.running = true;
    }

    pub fn stop(&mut self)
    {
        self.running = false;
        self.carry = Duration::ZERO;
    }

    pub fn advance(&mut self, dt: Duration) -> ClockUpdate
    {
        let mut update = ClockUpdate::default();
        if !self.running {
            return update;
        }

        self.carry += dt;
        while self.carry >= TICK {
            self.carry -= TICK;
            update.ticks += 1;
            match self.mode {
                ClockMode::CountUp => self.seconds = self.seconds.saturating_add(1),
                ClockMode::CountDown { .. } => {
                    self.seconds = self.seconds.saturating_sub(1);
                    if self.seconds == 0 {
                        self.stop();
                        update.expired = true;
                        break;
                    }
                }
            }
        }
        update
    }

    /// Elapsed seconds when counting up, remaining seconds when counting down.
    pub fn seconds(&self) -> u32
    {
        self.seconds
    }

    pub fn elapsed(&self) -> u32
    {
        match self.mode {
            ClockMode::CountUp => self.seconds,
            ClockMode::CountDown { from } => from.saturating_sub(self.seconds),
        }
    }

    pub fn is_running(&self) -> bool
    {
        self.running
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduled<A>
{
    pub due: Duration,
    pub generation: u64,
    pub action: A,
}

/// Continuations waiting for their delay to pass.
///
/// Each entry carries the round generation it was scheduled under; the
/// owner compares it against the live generation before acting.
#[derive(Clone, Debug)]
pub struct Deferred<A>
{
    now: Duration,
    queue: Vec<Scheduled<A>>,
}

impl<A> Default for Deferred<A>
{
    fn default() -> Self
    {
        Self {
            now: Duration::ZERO,
            queue: Vec::new(),
        }
    }
}

impl<A> Deferred<A>
{
    pub fn schedule(&mut self, delay: Duration, generation: u64, action: A)
    {
        self.queue.push(Scheduled {
            due: self.now + delay,
            generation,
            action,
        });
    }

    /// Moves time forward and hands back everything now due, earliest
    /// first, ties in scheduling order.
    pub fn advance(&mut self, dt: Duration) -> Vec<Scheduled<A>>
    {
        self.now += dt;
        let now = self.now;
        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|entry| entry.due <= now);
        self.queue = waiting;
        due.sort_by_key(|entry| entry.due);
        due
    }

    pub fn pending(&self) -> usize
    {
        self.queue.len()
    }

    pub fn now(&self) -> Duration
    {
        self.now
    }
}
