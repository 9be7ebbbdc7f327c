pub mod slots;
pub mod calculator;
pub mod availability;

pub use slots::{generate_candidate_slots, CandidateSlots, SlotIter};
pub use calculator::{booked_times_for, summarize, SlotAvailabilityCalculator};
pub use availability::AvailabilityService;
