use time::{macros::time, Date, OffsetDateTime, PrimitiveDateTime};

/// Source of "now" for date-stamping inserts and evaluating windows.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;

    fn today(&self) -> Date {
        self.now().date()
    }
}

/// Wall clock in the local offset, falling back to UTC when the offset
/// cannot be determined (e.g. multi-threaded processes on some platforms).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl FixedClock {
    /// Noon UTC on `date`.
    pub fn on(date: Date) -> Self {
        Self(PrimitiveDateTime::new(date, time!(12:00)).assume_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_fixed_clock_today() {
        let clock = FixedClock::on(date!(2024 - 03 - 07));
        assert_eq!(clock.today(), date!(2024 - 03 - 07));
        assert_eq!(clock.now().hour(), 12);
    }
}
