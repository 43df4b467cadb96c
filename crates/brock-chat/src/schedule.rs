use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use brock_persist::{CheckinSchedule, PersistenceClient};
use brock_types::TimeOfDay;

use crate::error::Result;
use crate::proactive::{ProactiveGenerator, ProactiveMessage};

/// Minutes after midnight, 07:30 to 10:30
const MORNING_WINDOW: RangeInclusive<i64> = 450..=630;
/// Minutes after midnight, 15:00 to 20:00
const AFTERNOON_WINDOW: RangeInclusive<i64> = 900..=1200;

/// How long a slot stays due after its scheduled time
const DUE_WINDOW_MINUTES: i64 = 15;

/// Pick random check-in times for `date`, at minute resolution
pub fn generate_schedule(date: NaiveDate, rng: &mut impl Rng) -> CheckinSchedule {
    let morning = NaiveTime::MIN + Duration::minutes(rng.gen_range(MORNING_WINDOW));
    let afternoon = NaiveTime::MIN + Duration::minutes(rng.gen_range(AFTERNOON_WINDOW));
    CheckinSchedule::new(date, morning, afternoon)
}

/// Whether a slot scheduled at `scheduled` should fire at `now` (both local)
pub fn is_due(now: NaiveDateTime, scheduled: NaiveDateTime) -> bool {
    scheduled <= now && now < scheduled + Duration::minutes(DUE_WINDOW_MINUTES)
}

/// Fires proactive check-ins at each day's scheduled times.
///
/// Meant to be driven by an external timer calling [`tick`](Self::tick)
/// more often than the due window.
pub struct CheckinScheduler {
    store: Arc<dyn PersistenceClient>,
    generator: Arc<ProactiveGenerator>,
    offset: FixedOffset,
}

impl CheckinScheduler {
    pub fn new(
        store: Arc<dyn PersistenceClient>,
        generator: Arc<ProactiveGenerator>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            generator,
            offset,
        }
    }

    /// Calendar day of `now` in the configured offset
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// The schedule for `date`, created on first use
    pub async fn ensure_schedule(&self, date: NaiveDate) -> Result<CheckinSchedule> {
        if let Some(existing) = self.store.get_checkin_schedule(date).await? {
            return Ok(existing);
        }

        let schedule = generate_schedule(date, &mut rand::thread_rng());
        self.store.save_checkin_schedule(schedule.clone()).await?;
        info!(
            date = %date,
            morning = %schedule.morning_time,
            afternoon = %schedule.afternoon_time,
            "Created check-in schedule"
        );
        Ok(schedule)
    }

    /// Send every unsent slot that is due at `now`.
    ///
    /// A slot is marked sent only after its check-in was generated, so a
    /// failed slot is retried on the next tick while still due.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<Vec<ProactiveMessage>> {
        let local = now.with_timezone(&self.offset).naive_local();
        let date = local.date();
        let schedule = self.ensure_schedule(date).await?;
        let mut sent = Vec::new();

        for slot in [TimeOfDay::Morning, TimeOfDay::Afternoon] {
            if schedule.is_sent(slot) {
                continue;
            }
            let scheduled = date.and_time(schedule.time_for(slot));
            if !is_due(local, scheduled) {
                debug!(slot = %slot, scheduled = %scheduled, "Check-in not due");
                continue;
            }

            match self.generator.generate(slot).await {
                Ok(message) => {
                    self.store.mark_checkin_sent(date, slot).await?;
                    sent.push(message);
                }
                Err(e) => {
                    warn!(slot = %slot, error = %e, "Scheduled check-in failed");
                }
            }
        }

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_generated_times_stay_in_windows() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let schedule = generate_schedule(date, &mut rng);
            assert!(schedule.morning_time >= NaiveTime::from_hms_opt(7, 30, 0).unwrap());
            assert!(schedule.morning_time <= NaiveTime::from_hms_opt(10, 30, 0).unwrap());
            assert!(schedule.afternoon_time >= NaiveTime::from_hms_opt(15, 0, 0).unwrap());
            assert!(schedule.afternoon_time <= NaiveTime::from_hms_opt(20, 0, 0).unwrap());
            assert_eq!(schedule.morning_time.format("%S").to_string(), "00");
            assert!(!schedule.morning_sent && !schedule.afternoon_sent);
        }
    }

    #[test]
    fn test_due_window_is_half_open() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let scheduled = at(date, 8, 0);

        assert!(!is_due(at(date, 7, 59), scheduled));
        assert!(is_due(at(date, 8, 0), scheduled));
        assert!(is_due(at(date, 8, 14), scheduled));
        assert!(!is_due(at(date, 8, 15), scheduled));
    }
}
