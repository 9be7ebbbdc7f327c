use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use shared_config::ScheduleSettings;

use crate::error::ScheduleError;

pub const DEFAULT_SLOT_GRANULARITY_MINUTES: i32 = 30;

// ==============================================================================
// TIME OF DAY
// ==============================================================================

/// Wall-clock time of day at minute precision, in local hospital time.
///
/// Every time value is converted into this type at the boundary so that
/// schedule comparisons never touch strings. It parses from and renders to
/// zero-padded 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive_time(self) -> NaiveTime {
        self.0
    }

    /// `None` once the result would pass midnight.
    pub fn checked_add_minutes(self, minutes: i64) -> Option<Self> {
        let (next, wrapped_secs) = self.0.overflowing_add_signed(Duration::minutes(minutes));
        (wrapped_secs == 0).then_some(Self(next))
    }

    /// Whole minutes from `earlier` to `self`, negative when `self` is earlier.
    pub fn minutes_since(self, earlier: TimeOfDay) -> i64 {
        self.0.signed_duration_since(earlier.0).num_minutes()
    }
}

fn hhmm_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("HH:MM pattern compiles")
    })
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidTimeFormat(s.to_string());

        // chrono alone accepts single-digit hours, so the pattern gates first
        if !hhmm_pattern().is_match(s) {
            return Err(invalid());
        }

        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn parse_optional_time(raw: Option<&str>) -> Result<Option<TimeOfDay>, ScheduleError> {
    raw.map(str::parse).transpose()
}

pub fn parse_weekday(name: &str) -> Result<Weekday, ScheduleError> {
    name.trim()
        .parse::<Weekday>()
        .map_err(|_| ScheduleError::InvalidSchedule(format!("unknown weekday '{}'", name)))
}

fn parse_weekdays(names: &[String]) -> Result<Vec<Weekday>, ScheduleError> {
    names.iter().map(|name| parse_weekday(name)).collect()
}

// ==============================================================================
// SCHEDULES
// ==============================================================================

/// Half-open `[start, end)` break inside the working day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl BreakWindow {
    pub fn contains(&self, time: TimeOfDay) -> bool {
        self.start <= time && time < self.end
    }

    pub fn fits_within(&self, work_start: TimeOfDay, work_end: TimeOfDay) -> bool {
        self.start >= work_start && self.end <= work_end
    }

    /// The part of this break inside `[work_start, work_end)`, if any.
    pub fn clip_to(&self, work_start: TimeOfDay, work_end: TimeOfDay) -> Option<BreakWindow> {
        let start = self.start.max(work_start);
        let end = self.end.min(work_end);
        (start < end).then_some(BreakWindow { start, end })
    }
}

/// A doctor's own recurring weekly schedule. Any field left out is filled
/// from [`ScheduleDefaults`] when the schedule is resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklySchedule {
    pub working_days: Option<Vec<Weekday>>,
    pub work_start: Option<TimeOfDay>,
    pub work_end: Option<TimeOfDay>,
    pub break_start: Option<TimeOfDay>,
    pub break_end: Option<TimeOfDay>,
    pub slot_granularity_minutes: Option<i32>,
}

/// The single home of every schedule default used by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleDefaults {
    pub working_days: Vec<Weekday>,
    pub work_start: TimeOfDay,
    pub work_end: TimeOfDay,
    pub break_window: Option<BreakWindow>,
    pub slot_granularity_minutes: i32,
}

fn on_the_hour(hour: u32) -> TimeOfDay {
    TimeOfDay(NaiveTime::default() + Duration::hours(i64::from(hour)))
}

impl Default for ScheduleDefaults {
    fn default() -> Self {
        Self {
            working_days: vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
            work_start: on_the_hour(9),
            work_end: on_the_hour(17),
            break_window: Some(BreakWindow {
                start: on_the_hour(12),
                end: on_the_hour(13),
            }),
            slot_granularity_minutes: DEFAULT_SLOT_GRANULARITY_MINUTES,
        }
    }
}

impl TryFrom<&ScheduleSettings> for ScheduleDefaults {
    type Error = ScheduleError;

    fn try_from(settings: &ScheduleSettings) -> Result<Self, Self::Error> {
        let break_window = match (
            parse_optional_time(settings.break_start.as_deref())?,
            parse_optional_time(settings.break_end.as_deref())?,
        ) {
            (Some(start), Some(end)) => Some(BreakWindow { start, end }),
            (None, None) => None,
            _ => {
                return Err(ScheduleError::InvalidSchedule(
                    "default break needs both a start and an end".to_string(),
                ))
            }
        };

        let defaults = Self {
            working_days: parse_weekdays(&settings.working_days)?,
            work_start: settings.work_start.parse()?,
            work_end: settings.work_end.parse()?,
            break_window,
            slot_granularity_minutes: settings.slot_granularity_minutes,
        };

        defaults.as_resolved().validate()?;
        Ok(defaults)
    }
}

impl ScheduleDefaults {
    pub fn as_resolved(&self) -> ResolvedSchedule {
        ResolvedSchedule {
            working_days: self.working_days.clone(),
            work_start: self.work_start,
            work_end: self.work_end,
            break_window: self.break_window,
            slot_granularity_minutes: self.slot_granularity_minutes,
        }
    }
}

/// A schedule with every field decided, ready for slot classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchedule {
    pub working_days: Vec<Weekday>,
    pub work_start: TimeOfDay,
    pub work_end: TimeOfDay,
    pub break_window: Option<BreakWindow>,
    pub slot_granularity_minutes: i32,
}

impl ResolvedSchedule {
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.work_start >= self.work_end {
            return Err(ScheduleError::InvalidSchedule(format!(
                "work start {} must be before work end {}",
                self.work_start, self.work_end
            )));
        }

        if self.slot_granularity_minutes <= 0 {
            return Err(ScheduleError::InvalidSchedule(format!(
                "slot granularity must be positive, got {}",
                self.slot_granularity_minutes
            )));
        }

        if let Some(window) = self.break_window {
            if window.start >= window.end {
                return Err(ScheduleError::InvalidSchedule(format!(
                    "break start {} must be before break end {}",
                    window.start, window.end
                )));
            }
            if !window.fits_within(self.work_start, self.work_end) {
                return Err(ScheduleError::InvalidSchedule(format!(
                    "break {}-{} falls outside working hours {}-{}",
                    window.start, window.end, self.work_start, self.work_end
                )));
            }
        }

        Ok(())
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.working_days.contains(&date.weekday())
    }

    pub fn within_working_hours(&self, time: TimeOfDay) -> bool {
        self.work_start <= time && time < self.work_end
    }

    pub fn in_break(&self, time: TimeOfDay) -> bool {
        self.break_window.is_some_and(|window| window.contains(time))
    }
}

// ==============================================================================
// LEAVE AND BOOKINGS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveStatus {
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

impl LeaveStatus {
    pub fn blocks_availability(self) -> bool {
        matches!(self, LeaveStatus::Approved)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
    pub date: NaiveDate,
    pub status: LeaveStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn occupies_slot(self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::NoShow)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookedAppointment {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub status: AppointmentStatus,
}

/// Everything the calculator needs to know about one doctor.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorSchedule {
    pub doctor_id: Uuid,
    pub schedule: Option<WeeklySchedule>,
    pub is_on_leave: bool,
    pub leave_records: Vec<LeaveRecord>,
}

impl DoctorSchedule {
    pub fn new(doctor_id: Uuid) -> Self {
        Self {
            doctor_id,
            schedule: None,
            is_on_leave: false,
            leave_records: Vec::new(),
        }
    }

    pub fn has_approved_leave_on(&self, date: NaiveDate) -> bool {
        self.leave_records
            .iter()
            .any(|record| record.date == date && record.status.blocks_availability())
    }
}

// ==============================================================================
// OUTPUT
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
    Break,
    NotWorkingDay,
    OutsideWorkingHours,
    OnLeave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub time: TimeOfDay,
    pub status: SlotStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilitySummary {
    pub total: usize,
    pub available: usize,
    pub booked: usize,
    pub on_break: usize,
    pub not_working_day: usize,
    pub outside_working_hours: usize,
    pub on_leave: usize,
    pub next_available: Option<TimeOfDay>,
}

/// One doctor row of the dashboard grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityGridRow {
    pub doctor_id: Uuid,
    pub slots: Vec<SlotAvailability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AvailabilitySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ==============================================================================
// REQUEST DTOs
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyScheduleRequest {
    pub working_days: Option<Vec<String>>,
    pub work_start: Option<String>,
    pub work_end: Option<String>,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    pub slot_granularity_minutes: Option<i32>,
}

impl TryFrom<WeeklyScheduleRequest> for WeeklySchedule {
    type Error = ScheduleError;

    fn try_from(request: WeeklyScheduleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            working_days: request.working_days.as_deref().map(parse_weekdays).transpose()?,
            work_start: parse_optional_time(request.work_start.as_deref())?,
            work_end: parse_optional_time(request.work_end.as_deref())?,
            break_start: parse_optional_time(request.break_start.as_deref())?,
            break_end: parse_optional_time(request.break_end.as_deref())?,
            slot_granularity_minutes: request.slot_granularity_minutes,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorScheduleRequest {
    pub doctor_id: Uuid,
    pub schedule: Option<WeeklyScheduleRequest>,
    #[serde(default)]
    pub is_on_leave: bool,
    #[serde(default)]
    pub leave_records: Vec<LeaveRecord>,
}

impl TryFrom<DoctorScheduleRequest> for DoctorSchedule {
    type Error = ScheduleError;

    fn try_from(request: DoctorScheduleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            doctor_id: request.doctor_id,
            schedule: request.schedule.map(WeeklySchedule::try_from).transpose()?,
            is_on_leave: request.is_on_leave,
            leave_records: request.leave_records,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedAppointmentRequest {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
}

impl TryFrom<BookedAppointmentRequest> for BookedAppointment {
    type Error = ScheduleError;

    fn try_from(request: BookedAppointmentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            doctor_id: request.doctor_id,
            date: request.date,
            time: request.time.parse()?,
            status: request.status,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub doctor: DoctorScheduleRequest,
    pub date: NaiveDate,
    #[serde(default)]
    pub booked_times: Vec<String>,
    #[serde(default)]
    pub appointments: Vec<BookedAppointmentRequest>,
    /// Narrows the doctor's global leave flag to this date when present.
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityGridRequest {
    pub doctors: Vec<DoctorScheduleRequest>,
    pub date: NaiveDate,
    #[serde(default)]
    pub appointments: Vec<BookedAppointmentRequest>,
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSlotsQuery {
    pub work_start: String,
    pub work_end: String,
    pub granularity_minutes: Option<i32>,
}

// ==============================================================================
// RESPONSE DTOs
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DoctorAvailabilityResponse {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<SlotAvailability>,
    pub summary: AvailabilitySummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityGridResponse {
    pub date: NaiveDate,
    pub rows: Vec<AvailabilityGridRow>,
    pub total_doctors: usize,
}
