//! Per-device extended statistics as reported by `iostat -x`.
//!
//! Field order follows the column order of the report and is the order in
//! which metrics are exposed in the OID tree (columns 3..=15).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of numeric columns in one device row.
pub const METRIC_COUNT: usize = 13;

/// Column headers, in field order.
pub const METRIC_COLUMNS: [&str; METRIC_COUNT] = [
    "rrqm/s", "wrqm/s", "r/s", "w/s", "rkB/s", "wkB/s", "avgrq-sz", "avgqu-sz", "await",
    "r_await", "w_await", "svctm", "%util",
];

/// Device name -> sample. Ordered by name, which fixes the device index.
pub type DeviceMap = BTreeMap<String, DeviceSample>;

/// One device's metrics for one sampling interval.
///
/// Source: one row of the last report of `iostat -xkd`
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct DeviceSample {
    /// Device name (sda, dm-0, nvme0n1, ...)
    pub device: String,

    /// Read requests merged per second.
    /// Source: `rrqm/s`
    pub rrqm_s: f64,

    /// Write requests merged per second.
    /// Source: `wrqm/s`
    pub wrqm_s: f64,

    /// Read requests completed per second.
    /// Source: `r/s`
    pub r_s: f64,

    /// Write requests completed per second.
    /// Source: `w/s`
    pub w_s: f64,

    /// Kilobytes read per second.
    /// Source: `rkB/s`
    pub rkb_s: f64,

    /// Kilobytes written per second.
    /// Source: `wkB/s`
    pub wkb_s: f64,

    /// Average request size (sectors).
    /// Source: `avgrq-sz`
    pub avgrq_sz: f64,

    /// Average queue length.
    /// Source: `avgqu-sz`
    pub avgqu_sz: f64,

    /// Average time for I/O requests to be served (ms).
    /// Source: `await`
    pub await_ms: f64,

    /// Average read request time (ms).
    /// Source: `r_await`
    pub r_await: f64,

    /// Average write request time (ms).
    /// Source: `w_await`
    pub w_await: f64,

    /// Average service time (ms).
    /// Source: `svctm`
    pub svctm: f64,

    /// Bandwidth utilization (percent).
    /// Source: `%util`
    pub util: f64,
}

impl DeviceSample {
    /// Builds a sample from the 13 numeric columns in report order.
    pub fn from_metrics(device: impl Into<String>, m: [f64; METRIC_COUNT]) -> Self {
        let [
            rrqm_s,
            wrqm_s,
            r_s,
            w_s,
            rkb_s,
            wkb_s,
            avgrq_sz,
            avgqu_sz,
            await_ms,
            r_await,
            w_await,
            svctm,
            util,
        ] = m;
        Self {
            device: device.into(),
            rrqm_s,
            wrqm_s,
            r_s,
            w_s,
            rkb_s,
            wkb_s,
            avgrq_sz,
            avgqu_sz,
            await_ms,
            r_await,
            w_await,
            svctm,
            util,
        }
    }

    /// Returns the 13 numeric columns in report order.
    pub fn metrics(&self) -> [f64; METRIC_COUNT] {
        [
            self.rrqm_s,
            self.wrqm_s,
            self.r_s,
            self.w_s,
            self.rkb_s,
            self.wkb_s,
            self.avgrq_sz,
            self.avgqu_sz,
            self.await_ms,
            self.r_await,
            self.w_await,
            self.svctm,
            self.util,
        ]
    }
}
