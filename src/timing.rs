//! Wall-clock timing of a suite run.

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Runs `f` and returns its result along with how long it took.
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

/// Writes `Executed in <T.TT> seconds.`
pub fn report_elapsed<W: Write + ?Sized>(out: &mut W, elapsed: Duration) -> io::Result<()> {
    writeln!(out, "Executed in {:.2} seconds.", elapsed.as_secs_f64())
}
