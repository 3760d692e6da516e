//! Timestamped datapoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A value together with the time it was obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint<T> {
    pub value: T,
    pub timestamp: DateTime<Utc>,
}

impl<T> DataPoint<T> {
    pub fn new(value: T, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }

    /// Stamp a value with the current time
    pub fn now(value: T) -> Self {
        Self::new(value, datetime_now_utc())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DataPoint<U> {
        DataPoint {
            value: f(self.value),
            timestamp: self.timestamp,
        }
    }
}

/// `None` when a source could not produce a value
pub type OptionalDataPoint<T> = Option<DataPoint<T>>;

pub fn datetime_now_utc() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_map_keeps_timestamp() {
        let ts = Utc.with_ymd_and_hms(2022, 4, 21, 14, 43, 52).unwrap();
        let dp = DataPoint::new(2u64, ts).map(|v| v as f64 * 1.5);
        assert_eq!(dp.value, 3.0);
        assert_eq!(dp.timestamp, ts);
    }

    #[test]
    fn test_now_is_utc() {
        let before = Utc::now();
        let dp = DataPoint::now("x");
        assert!(dp.timestamp >= before);
    }
}
