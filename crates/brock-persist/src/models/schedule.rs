use brock_types::TimeOfDay;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Check-in times picked for one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckinSchedule {
    pub date: NaiveDate,
    pub morning_time: NaiveTime,
    pub afternoon_time: NaiveTime,
    #[serde(default)]
    pub morning_sent: bool,
    #[serde(default)]
    pub afternoon_sent: bool,
}

impl CheckinSchedule {
    pub fn new(date: NaiveDate, morning_time: NaiveTime, afternoon_time: NaiveTime) -> Self {
        Self {
            date,
            morning_time,
            afternoon_time,
            morning_sent: false,
            afternoon_sent: false,
        }
    }

    pub fn time_for(&self, slot: TimeOfDay) -> NaiveTime {
        match slot {
            TimeOfDay::Morning => self.morning_time,
            TimeOfDay::Afternoon => self.afternoon_time,
        }
    }

    pub fn is_sent(&self, slot: TimeOfDay) -> bool {
        match slot {
            TimeOfDay::Morning => self.morning_sent,
            TimeOfDay::Afternoon => self.afternoon_sent,
        }
    }

    pub fn mark_sent(&mut self, slot: TimeOfDay) {
        match slot {
            TimeOfDay::Morning => self.morning_sent = true,
            TimeOfDay::Afternoon => self.afternoon_sent = true,
        }
    }
}
