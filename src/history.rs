//! Vaccination, grooming and booking tabs of the pet drawer

use chrono::NaiveDateTime;
use log::{info, warn};
use std::cmp::Ordering;
use std::sync::Arc;

use pawsport_api::PetCareApi;
use pawsport_domain::dates::{days_until_at, parse_iso};
use pawsport_domain::{
    compute_due_date, Booking, BookingStatus, Clock, Grooming, NewVaccination, PetId, Vaccination,
};

use crate::error::{Error, Result};
use crate::toasts::Toasts;

pub const VACCINATION_RECORDED_MESSAGE: &str = "Vaccination recorded";
pub const VACCINATION_FAILURE_FALLBACK: &str = "Failed to record vaccination";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Sort `items` by the date returned from `date_of`. Unparseable dates count
/// as the oldest.
pub fn sort_by_date<T, F>(items: &mut [T], direction: SortDirection, date_of: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| {
        let ord = compare_dates(date_of(a), date_of(b));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn compare_dates(a: &str, b: &str) -> Ordering {
    parse_iso(a).ok().cmp(&parse_iso(b).ok())
}

/// True iff `due` falls between today and `window_days` days ahead, inclusive.
pub fn is_due_soon(due: &str, now: NaiveDateTime, window_days: i64) -> bool {
    let today = now.date().and_time(chrono::NaiveTime::MIN);
    days_until_at(due, today).map_or(false, |days| (0..=window_days).contains(&days))
}

/// Visual treatment of a booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Success,
    Warning,
    Error,
}

impl From<BookingStatus> for BadgeVariant {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Confirmed => BadgeVariant::Success,
            BookingStatus::Pending => BadgeVariant::Warning,
            BookingStatus::Cancelled => BadgeVariant::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaccinationRow {
    pub record: Vaccination,
    pub due_soon: bool,
}

/// History reads and the add-vaccination form for one pet
pub struct PetHistory {
    pet_id: PetId,
    api: Arc<dyn PetCareApi>,
    toasts: Toasts,
    clock: Arc<dyn Clock>,
    due_soon_days: i64,
}

impl PetHistory {
    pub fn new(
        pet_id: PetId,
        api: Arc<dyn PetCareApi>,
        toasts: Toasts,
        clock: Arc<dyn Clock>,
        due_soon_days: i64,
    ) -> Self {
        Self {
            pet_id,
            api,
            toasts,
            clock,
            due_soon_days,
        }
    }

    pub fn pet_id(&self) -> PetId {
        self.pet_id
    }

    /// Vaccinations sorted by administered date. A failed read yields an empty list.
    pub async fn vaccinations(&self, direction: SortDirection) -> Vec<VaccinationRow> {
        let mut records = match self.api.list_vaccinations(self.pet_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load vaccinations for pet {}: {}", self.pet_id, e);
                return Vec::new();
            }
        };
        sort_by_date(&mut records, direction, |v| v.date.as_str());

        let now = self.clock.now();
        records
            .into_iter()
            .map(|record| VaccinationRow {
                due_soon: is_due_soon(&record.due, now, self.due_soon_days),
                record,
            })
            .collect()
    }

    pub async fn grooming(&self, direction: SortDirection) -> Vec<Grooming> {
        match self.api.list_grooming(self.pet_id).await {
            Ok(mut records) => {
                sort_by_date(&mut records, direction, |g| g.date.as_str());
                records
            }
            Err(e) => {
                warn!("Failed to load grooming history for pet {}: {}", self.pet_id, e);
                Vec::new()
            }
        }
    }

    /// Bookings, newest start first
    pub async fn bookings(&self) -> Vec<Booking> {
        match self.api.list_bookings(self.pet_id).await {
            Ok(mut records) => {
                sort_by_date(&mut records, SortDirection::Descending, |b| b.start.as_str());
                records
            }
            Err(e) => {
                warn!("Failed to load bookings for pet {}: {}", self.pet_id, e);
                Vec::new()
            }
        }
    }

    /// Record a vaccination given on `date`; due one year later.
    ///
    /// An empty vaccine name or an unparseable date is rejected before any
    /// request is made. On success the tab is re-read and returned newest
    /// first.
    pub async fn add_vaccination(&self, vaccine: &str, date: &str) -> Result<Vec<VaccinationRow>> {
        let vaccine = vaccine.trim();
        if vaccine.is_empty() {
            return Err(Error::invalid_input("Vaccine name is required"));
        }
        let due = compute_due_date(date)?;
        let body = NewVaccination {
            pet_id: self.pet_id,
            vaccine: vaccine.to_string(),
            date: date.to_string(),
            due,
        };

        match self.api.add_vaccination(&body).await {
            Ok(record) => {
                info!("Recorded {} for pet {}, due {}", record.vaccine, self.pet_id, record.due);
                self.toasts.success(VACCINATION_RECORDED_MESSAGE).await;
                Ok(self.vaccinations(SortDirection::Descending).await)
            }
            Err(e) => {
                warn!("Failed to record vaccination for pet {}: {}", self.pet_id, e);
                let message = e.message();
                let message = if message.trim().is_empty() {
                    VACCINATION_FAILURE_FALLBACK.to_string()
                } else {
                    message
                };
                self.toasts.error(message).await;
                Err(e.into())
            }
        }
    }
}
