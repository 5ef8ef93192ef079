//! Month and day wheels editing one calendar date
//!
//! The month wheel counts months from January of the current year, so
//! scrolling past December lands on tick 12, which is normalised to month 0
//! of the next year. The day wheel counts days from the first of the month
//! and overflows into neighbouring months the same way. After every change
//! both wheels are rebased onto the normalised date so their ticks keep
//! meaning "month of year" and "day of month".

use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::wheel::{TickWheel, VisibleTick, WheelChange, WheelParams};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Which wheel of the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateField {
    Month,
    Day,
}

impl DateField {
    pub fn other(self) -> Self {
        match self {
            DateField::Month => DateField::Day,
            DateField::Day => DateField::Month,
        }
    }
}

/// Date with wheel-tick arithmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DateAnchor(NaiveDate);

impl DateAnchor {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Month of year, January is 0
    pub fn month_tick(&self) -> i64 {
        self.0.month0() as i64
    }

    /// Day of month, starting at 1
    pub fn day_tick(&self) -> i64 {
        self.0.day() as i64
    }

    /// Last moment of the day
    pub fn end_of_day(&self) -> NaiveDateTime {
        self.0.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default())
    }

    fn first_of_month(&self) -> NaiveDate {
        self.0.with_day(1).unwrap_or(self.0)
    }

    /// First of the month `tick` months from January of this year
    fn month_start(&self, tick: i64) -> Result<NaiveDate> {
        let january = NaiveDate::from_ymd_opt(self.0.year(), 1, 1)
            .ok_or_else(|| Error::invalid("month", format!("no January in {}", self.0.year())))?;
        let shifted = if tick >= 0 {
            january.checked_add_months(Months::new(tick as u32))
        } else {
            january.checked_sub_months(Months::new(tick.unsigned_abs() as u32))
        };
        shifted.ok_or_else(|| Error::invalid("month", format!("tick {} out of range", tick)))
    }

    /// Move to month `tick`, carrying into other years and clamping the day
    pub fn with_month_tick(&self, tick: i64) -> Result<Self> {
        let start = self.month_start(tick)?;
        let days_in_month = days_in_month(start);
        let day = self.0.day().min(days_in_month);
        let date = start
            .with_day(day)
            .ok_or_else(|| Error::invalid("month", format!("day {} out of range", day)))?;
        Ok(Self(date))
    }

    /// Move to day `tick` of this month; ticks past either end spill over
    pub fn with_day_tick(&self, tick: i64) -> Result<Self> {
        let first = self.first_of_month();
        let offset = tick - 1;
        let date = if offset >= 0 {
            first.checked_add_days(Days::new(offset as u64))
        } else {
            first.checked_sub_days(Days::new(offset.unsigned_abs()))
        };
        date.map(Self)
            .ok_or_else(|| Error::invalid("day", format!("tick {} out of range", tick)))
    }

    /// Month name, with the two-digit year on January
    pub fn month_label(&self, tick: i64) -> String {
        let name = MONTHS[tick.rem_euclid(12) as usize];
        if tick.rem_euclid(12) != 0 {
            return name.to_string();
        }
        let year = self.0.year() as i64 + tick.div_euclid(12);
        format!("{} '{:02}", name, year.rem_euclid(100))
    }

    /// Day of month that day `tick` lands on
    pub fn day_label(&self, tick: i64) -> String {
        self.with_day_tick(tick)
            .map(|d| d.day_tick().to_string())
            .unwrap_or_default()
    }
}

fn days_in_month(first: NaiveDate) -> u32 {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Month wheel and day wheel bound to one date
#[derive(Debug, Clone)]
pub struct DatePicker {
    date: DateAnchor,
    month: TickWheel,
    day: TickWheel,
}

impl DatePicker {
    pub fn new(date: DateAnchor, params: WheelParams) -> Result<Self> {
        Ok(Self {
            date,
            month: TickWheel::new(date.month_tick(), params)?,
            day: TickWheel::new(date.day_tick(), params)?,
        })
    }

    pub fn date(&self) -> DateAnchor {
        self.date
    }

    pub fn wheel(&self, field: DateField) -> &TickWheel {
        match field {
            DateField::Month => &self.month,
            DateField::Day => &self.day,
        }
    }

    /// Either wheel wants frames or is held
    pub fn is_active(&self) -> bool {
        [&self.month, &self.day]
            .iter()
            .any(|w| w.is_running() || w.is_dragging())
    }

    /// Run an input on one wheel and fold any tick change into the date
    ///
    /// Returns the new date if it changed.
    pub fn drive(
        &mut self,
        field: DateField,
        now: f64,
        input: impl FnOnce(&mut TickWheel) -> Option<WheelChange>,
    ) -> Result<Option<DateAnchor>> {
        let change = match field {
            DateField::Month => input(&mut self.month),
            DateField::Day => input(&mut self.day),
        };
        match change {
            Some(change) => self.apply(field, change, now).map(Some),
            None => Ok(None),
        }
    }

    /// Advance both wheel loops
    pub fn frame(&mut self, now: f64) -> Result<Option<DateAnchor>> {
        let month = self.drive(DateField::Month, now, |w| w.frame(now))?;
        let day = self.drive(DateField::Day, now, |w| w.frame(now))?;
        Ok(day.or(month))
    }

    /// Jump both wheels to `date`, gliding from where they are
    pub fn set_date(&mut self, date: DateAnchor, now: f64) {
        self.date = date;
        self.month.set_value(date.month_tick(), now);
        self.day.set_value(date.day_tick(), now);
    }

    fn apply(&mut self, field: DateField, change: WheelChange, now: f64) -> Result<DateAnchor> {
        let date = match field {
            DateField::Month => self.date.with_month_tick(change.to)?,
            DateField::Day => self.date.with_day_tick(change.to)?,
        };
        debug!(?field, from = %self.date.date(), to = %date.date(), "Date changed");
        self.date = date;
        self.month.rebase(date.month_tick(), now);
        self.day.rebase(date.day_tick(), now);
        Ok(date)
    }

    /// Labelled ticks for rendering
    pub fn visible_ticks(&self, field: DateField) -> Vec<VisibleTick> {
        match field {
            DateField::Month => self.month.visible_ticks_with(|t| self.date.month_label(t)),
            DateField::Day => self.day.visible_ticks_with(|t| self.date.day_label(t)),
        }
    }
}
