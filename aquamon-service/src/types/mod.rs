mod threshold_alarm;

pub use threshold_alarm::{AlarmStatus, ThresholdAlarm};
