//! Parsers for `iostat -xkd` output.
//!
//! Two steps: [`extract_device_table`] cuts the device rows of the last report
//! out of the raw command output, [`parse_device_table`] turns those rows into
//! a [`DeviceMap`].

use std::fmt;

use crate::storage::model::{DeviceMap, DeviceSample, METRIC_COLUMNS, METRIC_COUNT};

/// Tail of the `%util` header, the last column of every extended report.
pub const TABLE_MARKER: &str = "util";

/// Malformed device row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// 1-based line number within the parsed table.
    pub line: usize,
    /// The offending line, trimmed.
    pub content: String,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, content: &str, message: impl Into<String>) -> Self {
        Self {
            line,
            content: content.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wrong data format at line {}: {} ({})",
            self.line, self.message, self.content
        )
    }
}

impl std::error::Error for ParseError {}

/// The report header was not found in the command output.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractError {
    /// Size of the output that was searched.
    pub output_len: usize,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid output from command: no '{}' header in {} bytes",
            TABLE_MARKER, self.output_len
        )
    }
}

impl std::error::Error for ExtractError {}

/// Returns the device rows that follow the last report header.
///
/// `iostat -xkd <window> 2` prints two reports; the first covers the time
/// since boot. Searching for the marker from the end keeps only the second.
pub fn extract_device_table(output: &str) -> Result<&str, ExtractError> {
    let start = output.rfind(TABLE_MARKER).ok_or(ExtractError {
        output_len: output.len(),
    })?;
    Ok(output[start + TABLE_MARKER.len()..].trim())
}

/// Parses device rows: a name followed by exactly 13 numeric columns.
///
/// Blank lines are skipped. Any malformed row fails the whole parse. A
/// repeated device name replaces the earlier row.
pub fn parse_device_table(content: &str) -> Result<DeviceMap, ParseError> {
    let mut devices = DeviceMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let sample = parse_device_row(line).map_err(|msg| ParseError::new(idx + 1, line, msg))?;
        devices.insert(sample.device.clone(), sample);
    }

    Ok(devices)
}

fn parse_device_row(line: &str) -> Result<DeviceSample, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != METRIC_COUNT + 1 {
        return Err(format!(
            "expected {} fields, found {}",
            METRIC_COUNT + 1,
            parts.len()
        ));
    }

    let mut metrics = [0.0; METRIC_COUNT];
    for ((slot, token), column) in metrics.iter_mut().zip(&parts[1..]).zip(METRIC_COLUMNS) {
        *slot = parse_metric(token)
            .ok_or_else(|| format!("{}: '{}' is not a number", column, token))?;
    }

    Ok(DeviceSample::from_metrics(parts[0], metrics))
}

/// Parses one numeric column. Accepts a comma as the decimal separator.
fn parse_metric(token: &str) -> Option<f64> {
    let normalized = token.replace(',', ".");
    if normalized.is_empty()
        || !normalized
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'.')
    {
        return None;
    }
    normalized.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_DEVICES: &str = "\
sda               0.00     3.07    0.03    4.93     0.13  1505.33   606.23     0.49   99.65   12.00  100.24   4.48   2.23
dm-0               1.23     2.44    5.03    9.93     8.13  15.33   60.28     8.49   22.65   5.12  10.34   0.00   3.03
dm-1               8.23     8.44    8.03    8.93     8.88  18.33   80.28     8.89   32.65   8.12  0.00   0.00   0.00";

    const TWO_REPORTS: &str = "\
Linux 4.4.0-21-generic (host) \t05/10/2016 \t_x86_64_\t(4 CPU)

Device:         rrqm/s   wrqm/s     r/s     w/s    rkB/s    wkB/s avgrq-sz avgqu-sz   await r_await w_await  svctm  %util
sda               1.11     2.22    3.33    4.44     5.55    66.66    77.77     8.88   99.99  10.10   20.20   3.03   4.04

Device:         rrqm/s   wrqm/s     r/s     w/s    rkB/s    wkB/s avgrq-sz avgqu-sz   await r_await w_await  svctm  %util
sda               0.00     3.07    0.03    4.93     0.13  1505.33   606.23     0.49   99.65   12.00  100.24   4.48   2.23
dm-0              0.00     0.00    0.00    0.00     0.00     0.00     0.00     0.00    0.00    0.00    0.00   0.00   0.00

";

    #[test]
    fn test_parse_device_table() {
        let devices = parse_device_table(THREE_DEVICES).unwrap();

        assert_eq!(devices.len(), 3);
        assert_eq!(
            devices["sda"],
            DeviceSample::from_metrics(
                "sda",
                [
                    0.00, 3.07, 0.03, 4.93, 0.13, 1505.33, 606.23, 0.49, 99.65, 12.00, 100.24,
                    4.48, 2.23
                ]
            )
        );
        assert_eq!(devices["dm-0"].await_ms, 22.65);
        assert_eq!(devices["dm-1"].avgrq_sz, 80.28);
        assert_eq!(devices["dm-1"].util, 0.0);
    }

    #[test]
    fn test_parse_comma_decimals() {
        let content = "sdb 1,50 2,25 0 0 0 0 0 0 0 0 0 0 99,90";
        let devices = parse_device_table(content).unwrap();

        assert_eq!(devices["sdb"].rrqm_s, 1.5);
        assert_eq!(devices["sdb"].wrqm_s, 2.25);
        assert_eq!(devices["sdb"].util, 99.9);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_tabs() {
        let content = "\n   \nsda\t1 2 3 4 5 6 7 8 9 10 11 12 13  \n\n";
        let devices = parse_device_table(content).unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices["sda"].svctm, 12.0);
    }

    #[test]
    fn test_parse_empty_table() {
        assert!(parse_device_table("").unwrap().is_empty());
        assert!(parse_device_table(" \n \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_missing_field_fails() {
        let content = "\
sda 0.00 3.07 0.03 4.93 0.13 1505.33 606.23 0.49 99.65 12.00 100.24 4.48 2.23
sdb 3.07 0.03 4.93 0.13 1505.33 606.23 0.49 99.65 12.00 100.24 4.48 2.23";
        let err = parse_device_table(content).unwrap_err();

        assert_eq!(err.line, 2);
        assert!(err.content.starts_with("sdb"));
        assert!(err.message.contains("expected 14 fields, found 13"));
    }

    #[test]
    fn test_parse_extra_field_fails() {
        let content = "sda 1 2 3 4 5 6 7 8 9 10 11 12 13 14";
        assert!(parse_device_table(content).is_err());
    }

    #[test]
    fn test_parse_non_numeric_field_fails() {
        for bad in ["0.0.0", "abc", "-1", "inf", "1e3"] {
            let content = format!("sda {bad} 3.07 0.03 4.93 0.13 1505.33 606.23 0.49 99.65 12.00 100.24 4.48 2.23");
            let err = parse_device_table(&content).unwrap_err();
            assert_eq!(err.line, 1, "token {bad}");
            assert!(err.message.contains(bad), "token {bad}");
            assert!(err.message.starts_with("rrqm/s:"), "token {bad}");
        }

        let content = "sda 0.00 3.07 0.03 4.93 0.13 1505.33 606.23 0.49 99.65 12.00 100.24 4.48 x";
        let err = parse_device_table(content).unwrap_err();
        assert_eq!(err.message, "%util: 'x' is not a number");
    }

    #[test]
    fn test_parse_duplicate_device_last_wins() {
        let content = "\
sda 1 1 1 1 1 1 1 1 1 1 1 1 1
sda 2 2 2 2 2 2 2 2 2 2 2 2 2";
        let devices = parse_device_table(content).unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices["sda"].util, 2.0);
    }

    #[test]
    fn test_extract_keeps_last_report() {
        let table = extract_device_table(TWO_REPORTS).unwrap();

        assert!(table.starts_with("sda               0.00"));
        assert!(table.ends_with("0.00"));

        let devices = parse_device_table(table).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices["sda"].util, 2.23);
    }

    #[test]
    fn test_extract_without_marker() {
        let err = extract_device_table("iostat: command not found\n").unwrap_err();
        assert_eq!(err.output_len, 26);
        assert!(err.to_string().contains("util"));
    }

    #[test]
    fn test_extract_header_only() {
        let output = "Device: rrqm/s wrqm/s r/s w/s rkB/s wkB/s avgrq-sz avgqu-sz await r_await w_await svctm %util\n\n";
        assert_eq!(extract_device_table(output).unwrap(), "");
    }

    #[test]
    fn test_parse_error_display() {
        let err = parse_device_table("sda 1 2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong data format at line 1: expected 14 fields, found 3 (sda 1 2)"
        );
    }
}
