use crate::config::SchedulerConfig;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    /// Provider the appointment is booked with; `None` means unassigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub patient_name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub is_selected: bool,
}

/// Backend-shaped query filter for the appointment list. A single
/// `appointment_date` beats the start/end window when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentFilter {
    pub user_ids: Vec<i64>,
    pub appointment_date: Option<NaiveDate>,
    pub date_start_time: Option<NaiveDate>,
    pub date_end_time: Option<NaiveDate>,
    pub no_assigned_provider: bool,
}

impl AppointmentFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        match appointment.user_id {
            None => {
                if !self.no_assigned_provider && !self.user_ids.is_empty() {
                    return false;
                }
            }
            Some(user_id) => {
                if !self.user_ids.is_empty() && !self.user_ids.contains(&user_id) {
                    return false;
                }
            }
        }
        if let Some(day) = self.appointment_date {
            return clamp_to_day(appointment, day).is_some();
        }
        if let Some(from) = self.date_start_time {
            if appointment.end.date() < from {
                return false;
            }
        }
        if let Some(to) = self.date_end_time {
            if appointment.start.date() > to {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewRange {
    Day,
    Week,
}

/// Inclusive day range; both endpoints are rendered.
pub fn date_range(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = from;
    while current <= to {
        days.push(current);
        let Some(next) = current.checked_add_days(Days::new(1)) else {
            break;
        };
        current = next;
    }
    days
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

pub fn view_days(anchor: NaiveDate, view: ViewRange) -> Vec<NaiveDate> {
    match view {
        ViewRange::Day => vec![anchor],
        ViewRange::Week => {
            let start = week_start(anchor);
            date_range(start, start + Days::new(6))
        }
    }
}

/// Column headers for the grid. Selected providers keep the filter's order;
/// the unassigned pseudo-provider is prepended when requested; no columns at
/// all still produce one blank placeholder so the grid keeps its shape.
pub fn provider_columns(
    providers: &[Provider],
    filter: &AppointmentFilter,
    config: &SchedulerConfig,
) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    if filter.no_assigned_provider {
        columns.push(config.unassigned_label.clone());
    }
    let selected: Vec<&Provider> = if filter.user_ids.is_empty() {
        providers.iter().collect()
    } else {
        filter
            .user_ids
            .iter()
            .filter_map(|id| providers.iter().find(|provider| provider.id == *id))
            .collect()
    };
    for provider in selected {
        if !columns.contains(&provider.name) {
            columns.push(provider.name.clone());
        }
    }
    if columns.is_empty() {
        columns.push(String::new());
    }
    columns
}

/// An appointment's visible span within one day column.
#[derive(Debug, Clone, PartialEq)]
pub struct DayEvent {
    pub appointment_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Clamps an appointment to one day. Spans ending on a later date are cut at
/// the following midnight; spans that leave no visible time on the day are
/// dropped.
pub fn clamp_to_day(appointment: &Appointment, day: NaiveDate) -> Option<DayEvent> {
    let day_start = day.and_time(NaiveTime::MIN);
    let day_end = day.checked_add_days(Days::new(1))?.and_time(NaiveTime::MIN);
    let start = appointment.start.max(day_start);
    let end = appointment.end.min(day_end);
    if start >= end {
        return None;
    }
    Some(DayEvent {
        appointment_id: appointment.id,
        start,
        end,
    })
}

#[derive(Debug, Clone)]
pub struct DayColumn {
    pub day: NaiveDate,
    pub events: Vec<DayEvent>,
}

#[derive(Debug, Clone)]
pub struct WeekGrid {
    pub providers: Vec<String>,
    pub hours: Vec<u32>,
    pub days: Vec<DayColumn>,
}

/// Builds the calendar grid for the view anchored at `anchor`: hour rows,
/// provider headers, and per-day event columns sorted by start time.
pub fn build_grid(
    anchor: NaiveDate,
    view: ViewRange,
    appointments: &[Appointment],
    providers: &[Provider],
    filter: &AppointmentFilter,
    config: &SchedulerConfig,
) -> WeekGrid {
    let visible: Vec<&Appointment> = appointments
        .iter()
        .filter(|appointment| filter.matches(appointment))
        .collect();

    let days = view_days(anchor, view)
        .into_iter()
        .map(|day| {
            let mut events: Vec<DayEvent> = visible
                .iter()
                .filter_map(|appointment| clamp_to_day(appointment, day))
                .collect();
            events.sort_by_key(|event| event.start);
            DayColumn { day, events }
        })
        .collect();

    WeekGrid {
        providers: provider_columns(providers, filter, config),
        hours: (0..config.hours_per_day).collect(),
        days,
    }
}
