use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::models::{
    AvailabilityGridRow, AvailabilitySummary, BookedAppointment, BreakWindow, DoctorSchedule,
    ResolvedSchedule, ScheduleDefaults, SlotAvailability, SlotStatus, TimeOfDay, WeeklySchedule,
    DEFAULT_SLOT_GRANULARITY_MINUTES,
};
use crate::services::slots::{generate_candidate_slots, CandidateSlots};

/// Classifies a doctor's candidate slots for one date.
///
/// The calculator never reads a clock. "Today" only matters for the doctor's
/// global leave flag and only when the caller sets it with
/// [`SlotAvailabilityCalculator::with_today`].
#[derive(Debug, Clone, Default)]
pub struct SlotAvailabilityCalculator {
    defaults: Option<ScheduleDefaults>,
    today: Option<NaiveDate>,
}

impl SlotAvailabilityCalculator {
    pub fn new(defaults: Option<ScheduleDefaults>) -> Self {
        Self {
            defaults,
            today: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn defaults(&self) -> Option<&ScheduleDefaults> {
        self.defaults.as_ref()
    }

    /// Fills the doctor's missing schedule fields from the defaults and
    /// validates the result.
    pub fn resolve_schedule(&self, doctor: &DoctorSchedule) -> Result<ResolvedSchedule, ScheduleError> {
        let defaults = self.defaults.as_ref();
        if doctor.schedule.is_none() && defaults.is_none() {
            return Err(ScheduleError::MissingSchedule(doctor.doctor_id));
        }

        let fallback = WeeklySchedule::default();
        let own = doctor.schedule.as_ref().unwrap_or(&fallback);
        let missing = || ScheduleError::MissingSchedule(doctor.doctor_id);

        let working_days = own
            .working_days
            .clone()
            .or_else(|| defaults.map(|d| d.working_days.clone()))
            .ok_or_else(missing)?;
        let work_start = own
            .work_start
            .or(defaults.map(|d| d.work_start))
            .ok_or_else(missing)?;
        let work_end = own
            .work_end
            .or(defaults.map(|d| d.work_end))
            .ok_or_else(missing)?;
        let slot_granularity_minutes = own
            .slot_granularity_minutes
            .or(defaults.map(|d| d.slot_granularity_minutes))
            .unwrap_or(DEFAULT_SLOT_GRANULARITY_MINUTES);

        let default_break = defaults.and_then(|d| d.break_window);
        let break_window = match (own.break_start, own.break_end) {
            (None, None) => default_break.and_then(|window| {
                let clipped = window.clip_to(work_start, work_end);
                if clipped.is_none() {
                    debug!(
                        "Dropping default break {}-{} outside hours {}-{} of doctor {}",
                        window.start, window.end, work_start, work_end, doctor.doctor_id
                    );
                }
                clipped
            }),
            (start, end) => {
                let start = start.or(default_break.map(|window| window.start));
                let end = end.or(default_break.map(|window| window.end));
                match (start, end) {
                    (Some(start), Some(end)) => Some(BreakWindow { start, end }),
                    _ => {
                        return Err(ScheduleError::InvalidSchedule(
                            "break window needs both break_start and break_end".to_string(),
                        ))
                    }
                }
            }
        };

        let resolved = ResolvedSchedule {
            working_days,
            work_start,
            work_end,
            break_window,
            slot_granularity_minutes,
        };
        resolved.validate()?;

        Ok(resolved)
    }

    pub fn candidate_slots(&self, schedule: &ResolvedSchedule) -> Result<CandidateSlots, ScheduleError> {
        generate_candidate_slots(
            schedule.work_start,
            schedule.work_end,
            schedule.slot_granularity_minutes,
        )
    }

    pub fn is_on_leave(&self, doctor: &DoctorSchedule, date: NaiveDate) -> bool {
        let flag_applies = doctor.is_on_leave && self.today.is_none_or(|today| today == date);
        flag_applies || doctor.has_approved_leave_on(date)
    }

    pub fn classify_slot(
        &self,
        doctor: &DoctorSchedule,
        date: NaiveDate,
        time: TimeOfDay,
        booked_times: &[TimeOfDay],
    ) -> Result<SlotStatus, ScheduleError> {
        let schedule = self.resolve_schedule(doctor)?;
        let on_leave = self.is_on_leave(doctor, date);
        Ok(classify(on_leave, &schedule, date, time, booked_times))
    }

    /// Every candidate slot of `date` with its status, in generation order.
    pub fn compute_availability(
        &self,
        doctor: &DoctorSchedule,
        date: NaiveDate,
        booked_times: &[TimeOfDay],
    ) -> Result<Vec<SlotAvailability>, ScheduleError> {
        let schedule = self.resolve_schedule(doctor)?;
        let candidates = self.candidate_slots(&schedule)?;
        let on_leave = self.is_on_leave(doctor, date);

        debug!(
            "Classifying {} slots for doctor {} on {}",
            candidates.len(),
            doctor.doctor_id,
            date
        );

        Ok(candidates
            .iter()
            .map(|time| SlotAvailability {
                time,
                status: classify(on_leave, &schedule, date, time, booked_times),
            })
            .collect())
    }

    pub fn compute_grid_row(
        &self,
        doctor: &DoctorSchedule,
        date: NaiveDate,
        appointments: &[BookedAppointment],
    ) -> AvailabilityGridRow {
        let booked = booked_times_for(doctor.doctor_id, date, appointments);

        match self.compute_availability(doctor, date, &booked) {
            Ok(slots) => AvailabilityGridRow {
                doctor_id: doctor.doctor_id,
                summary: Some(summarize(&slots)),
                slots,
                error: None,
            },
            Err(err) => error_row(doctor.doctor_id, &err),
        }
    }

    /// One row per doctor in input order. A doctor whose schedule cannot be
    /// resolved gets an error row and does not affect the others.
    pub fn compute_availability_grid(
        &self,
        doctors: &[DoctorSchedule],
        date: NaiveDate,
        appointments: &[BookedAppointment],
    ) -> Vec<AvailabilityGridRow> {
        doctors
            .iter()
            .map(|doctor| self.compute_grid_row(doctor, date, appointments))
            .collect()
    }
}

// First matching rule wins.
fn classify(
    on_leave: bool,
    schedule: &ResolvedSchedule,
    date: NaiveDate,
    time: TimeOfDay,
    booked_times: &[TimeOfDay],
) -> SlotStatus {
    if on_leave {
        SlotStatus::OnLeave
    } else if !schedule.is_working_day(date) {
        SlotStatus::NotWorkingDay
    } else if !schedule.within_working_hours(time) {
        SlotStatus::OutsideWorkingHours
    } else if schedule.in_break(time) {
        SlotStatus::Break
    } else if booked_times.contains(&time) {
        SlotStatus::Booked
    } else {
        SlotStatus::Available
    }
}

pub(crate) fn error_row(doctor_id: Uuid, err: &ScheduleError) -> AvailabilityGridRow {
    debug!("No availability for doctor {}: {}", doctor_id, err);
    AvailabilityGridRow {
        doctor_id,
        slots: Vec::new(),
        summary: None,
        error: Some(err.to_string()),
    }
}

/// Times of the appointments that still hold a slot for this doctor and date.
pub fn booked_times_for(
    doctor_id: Uuid,
    date: NaiveDate,
    appointments: &[BookedAppointment],
) -> Vec<TimeOfDay> {
    appointments
        .iter()
        .filter(|apt| apt.doctor_id == doctor_id && apt.date == date && apt.status.occupies_slot())
        .map(|apt| apt.time)
        .collect()
}

pub fn summarize(slots: &[SlotAvailability]) -> AvailabilitySummary {
    let mut summary = AvailabilitySummary {
        total: slots.len(),
        ..AvailabilitySummary::default()
    };

    for slot in slots {
        match slot.status {
            SlotStatus::Available => {
                summary.available += 1;
                if summary.next_available.is_none() {
                    summary.next_available = Some(slot.time);
                }
            }
            SlotStatus::Booked => summary.booked += 1,
            SlotStatus::Break => summary.on_break += 1,
            SlotStatus::NotWorkingDay => summary.not_working_day += 1,
            SlotStatus::OutsideWorkingHours => summary.outside_working_hours += 1,
            SlotStatus::OnLeave => summary.on_leave += 1,
        }
    }

    summary
}
