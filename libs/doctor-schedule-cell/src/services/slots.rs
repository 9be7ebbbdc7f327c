use crate::error::ScheduleError;
use crate::models::TimeOfDay;

/// The candidate slot times of one working day.
///
/// This is a plain description of the walk, not the walk itself: every call
/// to [`CandidateSlots::iter`] starts again from the first slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSlots {
    start: TimeOfDay,
    end: TimeOfDay,
    step_minutes: i64,
}

/// Builds the candidate slots from `work_start` (inclusive) to `work_end`
/// (exclusive), `granularity_minutes` apart.
pub fn generate_candidate_slots(
    work_start: TimeOfDay,
    work_end: TimeOfDay,
    granularity_minutes: i32,
) -> Result<CandidateSlots, ScheduleError> {
    if work_start >= work_end {
        return Err(ScheduleError::InvalidSchedule(format!(
            "work start {} must be before work end {}",
            work_start, work_end
        )));
    }

    if granularity_minutes <= 0 {
        return Err(ScheduleError::InvalidSchedule(format!(
            "slot granularity must be positive, got {}",
            granularity_minutes
        )));
    }

    Ok(CandidateSlots {
        start: work_start,
        end: work_end,
        step_minutes: i64::from(granularity_minutes),
    })
}

fn slots_between(from: TimeOfDay, end: TimeOfDay, step_minutes: i64) -> usize {
    let span = end.minutes_since(from);
    if span <= 0 {
        return 0;
    }
    usize::try_from((span + step_minutes - 1) / step_minutes).unwrap_or(0)
}

impl CandidateSlots {
    pub fn iter(&self) -> SlotIter {
        SlotIter {
            next: Some(self.start),
            end: self.end,
            step_minutes: self.step_minutes,
        }
    }

    pub fn len(&self) -> usize {
        slots_between(self.start, self.end, self.step_minutes)
    }

    // Construction guarantees start < end, so there is always a first slot.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl IntoIterator for CandidateSlots {
    type Item = TimeOfDay;
    type IntoIter = SlotIter;

    fn into_iter(self) -> SlotIter {
        self.iter()
    }
}

impl IntoIterator for &CandidateSlots {
    type Item = TimeOfDay;
    type IntoIter = SlotIter;

    fn into_iter(self) -> SlotIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct SlotIter {
    next: Option<TimeOfDay>,
    end: TimeOfDay,
    step_minutes: i64,
}

impl SlotIter {
    fn remaining(&self) -> usize {
        match self.next {
            Some(next) => slots_between(next, self.end, self.step_minutes),
            None => 0,
        }
    }
}

impl Iterator for SlotIter {
    type Item = TimeOfDay;

    fn next(&mut self) -> Option<TimeOfDay> {
        let current = self.next.filter(|time| *time < self.end)?;
        self.next = current.checked_add_minutes(self.step_minutes);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SlotIter {}

impl std::iter::FusedIterator for SlotIter {}
