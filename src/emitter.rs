//! The emit loop.
//!
//! Each cycle walks the monitored gates in order, posts one fresh reading per
//! gate and prints one result line per request. Failures are printed and the
//! loop moves on; nothing is retried.

use crate::client::{TransmitError, Transport};
use crate::core::{CrowdReading, DensityGenerator};
use crate::gates::{monitored_gates, GateId};
use crate::stats::EmitterStats;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Status the ingest API answers with when it stored a reading.
pub const STATUS_CREATED: u16 = 201;

/// Line prefix for a delivered reading.
pub const SUCCESS_TOKEN: &str = "yes";

/// Line prefix for a reading that was not stored.
pub const FAILURE_TOKEN: &str = "no";

/// Granularity at which a sleeping emitter notices a stop request.
const STOP_POLL: Duration = Duration::from_millis(100);

/// Process exit status after a forced interrupt (128 + SIGINT).
pub const INTERRUPT_EXIT_CODE: i32 = 130;

/// What an interrupt asks of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Let the in-flight request finish, then leave the loop
    Stop,
    /// Already stopping; exit without waiting on the request
    Exit,
}

/// Record an interrupt against the loop's running flag.
///
/// The flag is only checked between requests, so a hung request can only be
/// escaped by a second interrupt.
pub fn interrupt(running: &AtomicBool) -> Interrupt {
    if running.swap(false, Ordering::SeqCst) {
        Interrupt::Stop
    } else {
        Interrupt::Exit
    }
}

/// What happened to one reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The endpoint answered 201
    Delivered,
    /// The endpoint answered with another status
    Rejected { status: u16 },
    /// No response at all
    Failed(TransmitError),
}

impl Outcome {
    /// Classify a transport result.
    pub fn from_response(response: Result<u16, TransmitError>) -> Self {
        match response {
            Ok(STATUS_CREATED) => Outcome::Delivered,
            Ok(status) => Outcome::Rejected { status },
            Err(e) => Outcome::Failed(e),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Delivered)
    }

    /// Token printed at the start of the result line.
    pub fn token(&self) -> &'static str {
        if self.is_success() {
            SUCCESS_TOKEN
        } else {
            FAILURE_TOKEN
        }
    }
}

/// A reading and what happened to it.
#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub reading: CrowdReading,
    pub outcome: Outcome,
}

impl GateOutcome {
    /// The stdout line for this request.
    pub fn line(&self) -> String {
        match &self.outcome {
            Outcome::Failed(e) => {
                format!("{} {} (failed to send: {e})", self.outcome.token(), self.reading)
            }
            _ => format!("{} {}", self.outcome.token(), self.reading),
        }
    }
}

/// Outcomes of one pass over the gates, in send order.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub outcomes: Vec<GateOutcome>,
}

impl CycleReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_success()).count()
    }

    pub fn rejected(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Rejected { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, Outcome::Failed(_)))
            .count()
    }
}

/// Loop settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Pause after each cycle
    pub interval: Duration,
    /// Stop after this many cycles; `None` runs until stopped
    pub max_cycles: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            interval: crate::config::DEFAULT_INTERVAL,
            max_cycles: None,
        }
    }
}

/// Posts synthetic readings for every monitored gate, forever.
pub struct Emitter<T: Transport> {
    transport: T,
    gates: Vec<GateId>,
    generator: DensityGenerator,
    running: Arc<AtomicBool>,
}

impl<T: Transport> Emitter<T> {
    /// Create an emitter over the monitored gates.
    pub fn new(transport: T, generator: DensityGenerator) -> Self {
        Self {
            transport,
            gates: monitored_gates(),
            generator,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag that keeps the loop alive; store `false` to stop it.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Gates posted each cycle, in order.
    pub fn gates(&self) -> &[GateId] {
        &self.gates
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Post one reading per gate and print one line per request to `out`.
    ///
    /// A stop request is honoured between gates, so the report may be short.
    pub fn send_data<W: Write>(&mut self, out: &mut W) -> CycleReport {
        let mut report = CycleReport {
            outcomes: Vec::with_capacity(self.gates.len()),
        };

        for &gate in &self.gates {
            if !self.is_running() {
                break;
            }

            let reading = CrowdReading::new(gate, self.generator.next_density());
            let outcome = Outcome::from_response(self.transport.post(&reading));
            if let Outcome::Rejected { status } = outcome {
                tracing::debug!(%gate, status, "reading rejected");
            }

            let result = GateOutcome { reading, outcome };
            if let Err(e) = writeln!(out, "{}", result.line()) {
                tracing::warn!(error = %e, "could not write result line");
            }
            report.outcomes.push(result);
        }

        if let Err(e) = out.flush() {
            tracing::warn!(error = %e, "could not flush output");
        }
        report
    }

    /// Run cycles until stopped or `options.max_cycles` is reached.
    pub fn run<W: Write>(&mut self, out: &mut W, options: &RunOptions, stats: &EmitterStats) {
        let mut cycles: u64 = 0;

        while self.is_running() {
            let report = self.send_data(out);
            stats.record_cycle(&report);
            cycles += 1;

            tracing::info!(
                cycle = cycles,
                delivered = report.delivered(),
                total = report.len(),
                "cycle complete"
            );

            if options.max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }
            self.sleep(options.interval);
        }
    }

    /// Sleep for `interval`, waking early if stopped.
    fn sleep(&self, interval: Duration) {
        let deadline = Instant::now() + interval;
        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(STOP_POLL));
        }
    }
}
