use crate::clock::ClockTime;
use crate::model::Institution;
use chrono::NaiveDate;
use std::collections::HashMap;

/// One bookable (institution, date, time) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey<'a> {
    pub institution_id: &'a str,
    pub date: NaiveDate,
    pub time: ClockTime,
}

impl<'a> SlotKey<'a> {
    pub fn new(institution_id: &'a str, date: NaiveDate, time: ClockTime) -> Self {
        Self { institution_id, date, time }
    }
}

/// Occupancy of every declared slot during one planning run.
///
/// Counts only go up; a run never evicts a placement.
#[derive(Debug)]
pub struct CapacityTracker<'a> {
    usage: HashMap<SlotKey<'a>, u32>,
    capacities: HashMap<&'a str, u32>,
}

impl<'a> CapacityTracker<'a> {
    pub fn new(institutions: &'a [Institution]) -> Self {
        let usage = institutions
            .iter()
            .flat_map(|institution| {
                institution
                    .slots()
                    .map(|(date, time)| (SlotKey::new(&institution.id, date, time), 0))
            })
            .collect();

        let capacities = institutions
            .iter()
            .map(|institution| (institution.id.as_str(), institution.capacity))
            .collect();

        Self { usage, capacities }
    }

    pub fn usage(&self, slot: &SlotKey<'_>) -> u32 {
        self.usage.get(slot).copied().unwrap_or(0)
    }

    /// Whether the slot was declared and still has room for one more class.
    pub fn has_room(&self, slot: &SlotKey<'_>) -> bool {
        let capacity = self.capacities.get(slot.institution_id).copied().unwrap_or(0);
        self.usage.contains_key(slot) && self.usage(slot) < capacity
    }

    /// Books one class into the slot and returns the new occupancy.
    pub fn commit(&mut self, slot: SlotKey<'a>) -> u32 {
        let count = self.usage.entry(slot).or_insert(0);
        *count += 1;
        *count
    }

    #[cfg(test)]
    pub fn total_booked(&self) -> u32 {
        self.usage.values().sum()
    }
}
