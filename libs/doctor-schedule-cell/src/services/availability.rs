use chrono::NaiveDate;
use tracing::debug;

use shared_config::AppConfig;

use crate::error::ScheduleError;
use crate::models::{
    AvailabilityGridRequest, AvailabilityGridResponse, AvailabilityRequest, BookedAppointment,
    BookedAppointmentRequest, CandidateSlotsQuery, DoctorAvailabilityResponse, DoctorSchedule,
    ScheduleDefaults, TimeOfDay, DEFAULT_SLOT_GRANULARITY_MINUTES,
};
use crate::services::calculator::{booked_times_for, error_row, summarize, SlotAvailabilityCalculator};
use crate::services::slots::generate_candidate_slots;

/// Request-level entry point: turns wire DTOs into calculator inputs.
pub struct AvailabilityService {
    calculator: SlotAvailabilityCalculator,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Result<Self, ScheduleError> {
        let defaults = config
            .schedule_defaults
            .as_ref()
            .map(ScheduleDefaults::try_from)
            .transpose()?;

        Ok(Self {
            calculator: SlotAvailabilityCalculator::new(defaults),
        })
    }

    pub fn defaults(&self) -> Option<&ScheduleDefaults> {
        self.calculator.defaults()
    }

    /// Candidate slot times for an ad-hoc work window.
    pub fn candidate_slots(&self, query: CandidateSlotsQuery) -> Result<Vec<TimeOfDay>, ScheduleError> {
        let work_start: TimeOfDay = query.work_start.parse()?;
        let work_end: TimeOfDay = query.work_end.parse()?;
        let granularity = query
            .granularity_minutes
            .or(self.defaults().map(|d| d.slot_granularity_minutes))
            .unwrap_or(DEFAULT_SLOT_GRANULARITY_MINUTES);

        let slots = generate_candidate_slots(work_start, work_end, granularity)?;
        Ok(slots.iter().collect())
    }

    pub fn get_doctor_availability(
        &self,
        request: AvailabilityRequest,
    ) -> Result<DoctorAvailabilityResponse, ScheduleError> {
        let doctor = DoctorSchedule::try_from(request.doctor)?;
        debug!("Computing availability for doctor {} on {}", doctor.doctor_id, request.date);

        let appointments = parse_appointments(request.appointments)?;
        let mut booked = request
            .booked_times
            .iter()
            .map(|raw| raw.parse())
            .collect::<Result<Vec<TimeOfDay>, _>>()?;
        booked.extend(booked_times_for(doctor.doctor_id, request.date, &appointments));

        let slots = self
            .calculator_for(request.today)
            .compute_availability(&doctor, request.date, &booked)?;

        Ok(DoctorAvailabilityResponse {
            doctor_id: doctor.doctor_id,
            date: request.date,
            summary: summarize(&slots),
            slots,
        })
    }

    pub fn get_availability_grid(
        &self,
        request: AvailabilityGridRequest,
    ) -> Result<AvailabilityGridResponse, ScheduleError> {
        debug!(
            "Computing availability grid for {} doctors on {}",
            request.doctors.len(),
            request.date
        );

        let appointments = parse_appointments(request.appointments)?;
        let calculator = self.calculator_for(request.today);

        let rows: Vec<_> = request
            .doctors
            .into_iter()
            .map(|doctor_request| {
                let doctor_id = doctor_request.doctor_id;
                match DoctorSchedule::try_from(doctor_request) {
                    Ok(doctor) => calculator.compute_grid_row(&doctor, request.date, &appointments),
                    Err(err) => error_row(doctor_id, &err),
                }
            })
            .collect();

        Ok(AvailabilityGridResponse {
            date: request.date,
            total_doctors: rows.len(),
            rows,
        })
    }

    fn calculator_for(&self, today: Option<NaiveDate>) -> SlotAvailabilityCalculator {
        match today {
            Some(today) => self.calculator.clone().with_today(today),
            None => self.calculator.clone(),
        }
    }
}

fn parse_appointments(
    requests: Vec<BookedAppointmentRequest>,
) -> Result<Vec<BookedAppointment>, ScheduleError> {
    requests.into_iter().map(BookedAppointment::try_from).collect()
}
