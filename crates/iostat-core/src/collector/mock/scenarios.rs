//! Captured `iostat -xkd 5 2` outputs for testing.

/// Two reports from a host with `sda` and two device-mapper volumes.
///
/// The second report carries the values used throughout the tests:
/// `sda` utilization 2.23, `dm-0` 3.03, `dm-1` 0.00.
pub fn typical_output() -> &'static str {
    "\
Linux 4.4.0-21-generic (db01) \t05/10/2016 \t_x86_64_\t(4 CPU)

Device:         rrqm/s   wrqm/s     r/s     w/s    rkB/s    wkB/s avgrq-sz avgqu-sz   await r_await w_await  svctm  %util
sda               0.02     1.87    0.45    2.63    11.72    82.51    61.20     0.03    9.62    4.88   10.44   0.95   0.29
dm-0              0.00     0.00    0.41    4.31    11.24    82.19    39.63     0.06   12.80    5.14   13.53   0.60   0.28
dm-1              0.00     0.00    0.01    0.00     0.05     0.00     8.00     0.00    3.20    3.20    0.00   2.40   0.00

Device:         rrqm/s   wrqm/s     r/s     w/s    rkB/s    wkB/s avgrq-sz avgqu-sz   await r_await w_await  svctm  %util
sda               0.00     3.07    0.03    4.93     0.13  1505.33   606.23     0.49   99.65   12.00  100.24   4.48   2.23
dm-0              1.23     2.44    5.03    9.93     8.13    15.33    60.28     8.49   22.65    5.12   10.34   0.00   3.03
dm-1              8.23     8.44    8.03    8.93     8.88    18.33    80.28     8.89   32.65    8.12    0.00   0.00   0.00

"
}

/// Same host after `dm-1` was removed and `sdb` attached.
pub fn changed_devices_output() -> &'static str {
    "\
Linux 4.4.0-21-generic (db01) \t05/10/2016 \t_x86_64_\t(4 CPU)

Device:         rrqm/s   wrqm/s     r/s     w/s    rkB/s    wkB/s avgrq-sz avgqu-sz   await r_await w_await  svctm  %util
sda               0.02     1.87    0.45    2.63    11.72    82.51    61.20     0.03    9.62    4.88   10.44   0.95   0.29
dm-0              0.00     0.00    0.41    4.31    11.24    82.19    39.63     0.06   12.80    5.14   13.53   0.60   0.28
sdb               0.00     0.00    0.00    0.00     0.00     0.00     0.00     0.00    0.00    0.00    0.00   0.00   0.00

Device:         rrqm/s   wrqm/s     r/s     w/s    rkB/s    wkB/s avgrq-sz avgqu-sz   await r_await w_await  svctm  %util
sda               0,00     2,00    0,00    6,00     0,00    40,00    13,33     0,01    1,33    0,00    1,33   1,33   0,80
dm-0              0,00     0,00    0,00    8,00     0,00    40,00    10,00     0,02    2,00    0,00    2,00   1,00   0,80
sdb               0,00     0,00   12,50    0,00  1600,00     0,00   256,00     0,15   12,00   12,00    0,00   4,00   5,00

"
}

/// Output of sysstat 12, whose extended report has a different column set.
pub fn sysstat12_output() -> &'static str {
    "\
Linux 5.15.0-91-generic (db01) \t01/15/2024 \t_x86_64_\t(8 CPU)

Device            r/s     rkB/s   rrqm/s  %rrqm r_await rareq-sz     w/s     wkB/s   wrqm/s  %wrqm w_await wareq-sz aqu-sz  %util
sda              0.45     11.72     0.02   4.26    4.88    26.04    2.63     82.51     1.87  41.56   10.44    31.37   0.03   0.29

Device            r/s     rkB/s   rrqm/s  %rrqm r_await rareq-sz     w/s     wkB/s   wrqm/s  %wrqm w_await wareq-sz aqu-sz  %util
sda              0.03      0.13     0.00   0.00   12.00     4.33    4.93   1505.33     3.07  38.38  100.24   305.34   0.49   2.23

"
}
