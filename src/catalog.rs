//! Resource catalog: the fixed tables and time slots of the restaurant
//!
//! Built once at startup (from configuration or the reference layout) and
//! never mutated afterwards.

use crate::error::{Result, TablebookError};
use crate::types::{Table, TimeSlot};
use chrono::{Duration, NaiveTime};
use std::collections::HashSet;

/// Immutable set of tables and schedulable slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    tables: Vec<Table>,
    time_slots: Vec<TimeSlot>,
}

impl Catalog {
    /// Create a validated catalog; tables are kept in ascending number order
    pub fn new(mut tables: Vec<Table>, time_slots: Vec<TimeSlot>) -> Result<Self> {
        if tables.is_empty() {
            return Err(config_error("catalog must contain at least one table"));
        }
        if time_slots.is_empty() {
            return Err(config_error("catalog must contain at least one time slot"));
        }

        let mut numbers = HashSet::new();
        for table in &tables {
            if table.number == 0 {
                return Err(config_error("table numbers start at 1"));
            }
            if table.capacity == 0 {
                return Err(config_error(format!(
                    "table {} must seat at least one person",
                    table.number
                )));
            }
            if !numbers.insert(table.number) {
                return Err(config_error(format!(
                    "duplicate table number {}",
                    table.number
                )));
            }
        }

        let mut seen = HashSet::new();
        for slot in &time_slots {
            if !seen.insert(slot.as_str()) {
                return Err(config_error(format!("duplicate time slot {}", slot)));
            }
        }

        tables.sort_by_key(|t| t.number);

        Ok(Self { tables, time_slots })
    }

    /// Reference layout: six tables, hourly slots from 11:00 to 21:00
    pub fn reference() -> Self {
        let tables = vec![
            Table::new(1, 2, Some("Window")),
            Table::new(2, 2, Some("Window")),
            Table::new(3, 4, Some("Main Hall")),
            Table::new(4, 4, Some("Main Hall")),
            Table::new(5, 6, Some("Private")),
            Table::new(6, 8, Some("Main Hall")),
        ];
        let time_slots = (11..=21)
            .map(|hour| TimeSlot::new(format!("{:02}:00", hour)))
            .collect();

        Self { tables, time_slots }
    }

    /// Build `HH:MM` slots from `opening` to `closing` (both inclusive)
    pub fn generate_slots(
        opening: &str,
        closing: &str,
        interval_minutes: u32,
    ) -> Result<Vec<TimeSlot>> {
        if interval_minutes == 0 {
            return Err(config_error("slot interval must be at least one minute"));
        }

        let open = parse_hh_mm(opening)?;
        let close = parse_hh_mm(closing)?;
        if close < open {
            return Err(config_error(format!(
                "closing time {} is before opening time {}",
                closing, opening
            )));
        }

        let step = Duration::minutes(i64::from(interval_minutes));
        let mut slots = Vec::new();
        let mut current = open;
        loop {
            slots.push(TimeSlot::new(current.format("%H:%M").to_string()));
            let (next, wrapped) = current.overflowing_add_signed(step);
            if wrapped != 0 || next > close {
                break;
            }
            current = next;
        }

        Ok(slots)
    }

    /// All tables in ascending number order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// All slots in schedule order
    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.time_slots
    }

    pub fn table(&self, number: u32) -> Option<&Table> {
        self.tables.iter().find(|t| t.number == number)
    }

    pub fn is_valid_slot(&self, slot: &str) -> bool {
        self.time_slots.iter().any(|s| s.as_str() == slot)
    }

    /// Largest capacity of any table
    pub fn max_capacity(&self) -> u32 {
        self.tables.iter().map(|t| t.capacity).max().unwrap_or(0)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::reference()
    }
}

fn parse_hh_mm(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|e| config_error(format!("invalid time '{}': {}", value, e)))
}

fn config_error(message: impl Into<String>) -> TablebookError {
    TablebookError::Config(config::ConfigError::Message(message.into()))
}
