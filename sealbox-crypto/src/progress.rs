//! Throttled progress metering for streaming transfers.
//!
//! `ProgressMeter` accumulates moved bytes and emits a fraction to its sink
//! at most once per emission interval, so a fast transfer cannot stall the
//! UI with repaints. A zero total means the size is unknown and no fraction
//! is ever emitted; the caller shows an indeterminate indicator instead.

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// Receiver of fractional progress updates in `[0.0, 1.0]`.
pub trait ProgressSink {
    fn update(&mut self, fraction: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn update(&mut self, fraction: f64) {
        self(fraction)
    }
}

/// Byte accumulator with a wall-clock emission gate.
pub struct ProgressMeter<'a> {
    total: u64,
    transferred: u64,
    interval: Duration,
    last_emit: Instant,
    sink: &'a mut dyn ProgressSink,
}

impl<'a> ProgressMeter<'a> {
    /// Minimum time between two emitted updates.
    pub const EMIT_INTERVAL: Duration = Duration::from_millis(50);

    pub fn new(total: u64, sink: &'a mut dyn ProgressSink) -> Self {
        Self::with_interval(total, Self::EMIT_INTERVAL, sink)
    }

    /// Meter with a custom emission gate. A zero interval emits on every
    /// recorded move.
    pub fn with_interval(total: u64, interval: Duration, sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            total,
            transferred: 0,
            interval,
            last_emit: Instant::now(),
            sink,
        }
    }

    /// Bytes moved so far.
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Records `n` freshly moved bytes. Emits a fraction when the total is
    /// known and the gate has elapsed; the fraction is clamped to 1.0 in
    /// case the source grew after its size was taken.
    pub fn record(&mut self, n: usize) {
        self.transferred = self.transferred.saturating_add(n as u64);
        if self.total != 0 && self.last_emit.elapsed() >= self.interval {
            let fraction = (self.transferred as f64 / self.total as f64).min(1.0);
            self.sink.update(fraction);
            self.last_emit = Instant::now();
        }
    }
}

/// Write-side decorator: counts bytes accepted by the inner writer.
///
/// Errors from the inner writer pass through unchanged and uncounted.
pub struct MeteredWriter<'a, W> {
    inner: W,
    meter: ProgressMeter<'a>,
}

impl<'a, W: Write> MeteredWriter<'a, W> {
    pub fn new(inner: W, meter: ProgressMeter<'a>) -> Self {
        Self { inner, meter }
    }

    /// Unwraps the inner writer, dropping the meter.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for MeteredWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.meter.record(n);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Read-side decorator: counts bytes produced by the inner reader.
///
/// Errors from the inner reader pass through unchanged and uncounted.
pub struct MeteredReader<'a, R> {
    inner: R,
    meter: ProgressMeter<'a>,
}

impl<'a, R: Read> MeteredReader<'a, R> {
    pub fn new(inner: R, meter: ProgressMeter<'a>) -> Self {
        Self { inner, meter }
    }
}

impl<R: Read> Read for MeteredReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.meter.record(n);
        Ok(n)
    }
}
