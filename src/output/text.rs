//! Text report rendering.
//!
//! One line per completed path, sorted by path, followed by a summary of
//! still-open events. The summary is informational only; rendering never
//! closes anything.

use crate::aggregator::stopwatch::Stopwatch;
use std::io::{self, Write};

/// Render the report to a string
pub fn render_report(stopwatch: &Stopwatch) -> String {
    let resolution = stopwatch.resolution();
    let mut out = String::new();

    for record in stopwatch.records() {
        out.push_str(&record.render(resolution));
        out.push('\n');
    }

    match stopwatch.running() {
        0 => {}
        1 => {
            out.push_str(&format!(
                "(1 event is still running: {})\n",
                stopwatch.top_open_name().unwrap_or_default()
            ));
        }
        n => {
            out.push_str(&format!("({} events are still running)\n", n));
        }
    }

    out
}

/// Write the report to any sink
pub fn write_report<W: Write>(stopwatch: &Stopwatch, sink: &mut W) -> io::Result<()> {
    sink.write_all(render_report(stopwatch).as_bytes())
}
