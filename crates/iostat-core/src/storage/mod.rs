pub mod cache;
pub mod model;

pub use cache::{CachedStats, StatsCache};
pub use model::{DeviceMap, DeviceSample, METRIC_COLUMNS, METRIC_COUNT};
