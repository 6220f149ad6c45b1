//! Console and JSON output parsers, one per engine.
//!
//! Each parser returns measurements in output order; aligning them with the
//! batch's skip set happens in [`align_measurements`](super::align_measurements).

use super::Measurement;
use crate::error::OutputParseError;
use serde_json::Value;

const ISQL_ROWS: &str = "Rows. --";
const DONE_TIME: &str = "Done. Time: ";
const NATIVE_MATCHES: &str = "Number of matches (limit): ";

fn number<T: std::str::FromStr>(line: usize, value: &str) -> Result<T, OutputParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| OutputParseError::InvalidNumber {
            line,
            value: value.trim().to_string(),
        })
}

/// Text between `marker` and the following `unit`, e.g. `12` in `Time: 12 ms`
fn value_before<'a>(line: &'a str, marker: &str, unit: &str) -> Option<&'a str> {
    let start = line.find(marker)? + marker.len();
    let rest = &line[start..];
    let end = rest.find(unit).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Virtuoso isql: `12 Rows. -- 34 msec.` per statement
pub fn parse_isql_output(output: &str) -> Result<Vec<Measurement>, OutputParseError> {
    let mut measurements = Vec::new();
    for (index, line) in output.lines().enumerate() {
        let Some(at) = line.find(ISQL_ROWS) else {
            continue;
        };
        let line_no = index + 1;
        let rows = number(line_no, &line[..at])?;
        let elapsed = value_before(line, ISQL_ROWS, "msec").unwrap_or_default();
        measurements.push(Measurement::Measured {
            elapsed_ms: number(line_no, elapsed)?,
            rows,
        });
    }
    Ok(measurements)
}

/// RDF-3X: result rows followed by `Done. Time: 12 ms` per query.
///
/// The row count is the number of lines since the line after the previous
/// marker, minus one.
pub fn parse_rdf3x_output(output: &str) -> Result<Vec<Measurement>, OutputParseError> {
    let mut measurements = Vec::new();
    let mut block_start = 0usize;
    for (index, line) in output.lines().enumerate() {
        let Some(elapsed) = value_before(line, DONE_TIME, "ms") else {
            continue;
        };
        measurements.push(Measurement::Measured {
            elapsed_ms: number(index + 1, elapsed)?,
            rows: index.saturating_sub(block_start + 1) as u64,
        });
        block_start = index + 1;
    }
    Ok(measurements)
}

/// Native engine: `Number of matches (limit): 5` then `Done. Time: 12 ms`
/// per query.
///
/// Each time marker takes the last count seen since the previous marker. A
/// query whose count line is absent yields [`Measurement::Missing`] so later
/// counts stay with their own queries.
pub fn parse_native_output(output: &str) -> Result<Vec<Measurement>, OutputParseError> {
    let mut measurements = Vec::new();
    let mut count: Option<u64> = None;
    for (index, line) in output.lines().enumerate() {
        if let Some(matches) = value_before(line, NATIVE_MATCHES, "\n") {
            count = Some(number(index + 1, matches)?);
        }
        if let Some(elapsed) = value_before(line, DONE_TIME, "ms") {
            let elapsed_ms = number(index + 1, elapsed)?;
            measurements.push(match count.take() {
                Some(rows) => Measurement::Measured { elapsed_ms, rows },
                None => Measurement::Missing,
            });
        }
    }
    Ok(measurements)
}

/// Broccoli JSON: `result.time.total` and `result.res.instances.sent`.
///
/// Either field may be a JSON number or a string such as `"12ms"`.
pub fn parse_broccoli_response(body: &Value) -> Result<Measurement, OutputParseError> {
    let total = body
        .pointer("/result/time/total")
        .ok_or(OutputParseError::MissingField {
            field: "result.time.total",
        })?;
    let sent = body
        .pointer("/result/res/instances/sent")
        .ok_or(OutputParseError::MissingField {
            field: "result.res.instances.sent",
        })?;

    Ok(Measurement::Measured {
        elapsed_ms: json_number(total)?,
        rows: json_number(sent)?,
    })
}

fn json_number<T: std::str::FromStr>(value: &Value) -> Result<T, OutputParseError> {
    let text = match value {
        Value::String(text) => text.trim_end_matches("ms").to_string(),
        other => other.to_string(),
    };
    number(0, &text)
}
