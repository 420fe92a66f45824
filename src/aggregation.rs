//! Dashboard counts over rolling time windows.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Days, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{Ticket, TicketPriority, TicketStatus},
    error::DeskError,
};

/// Named rolling range used to bucket tickets for the dashboard chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    #[serde(rename = "daily")]
    Daily,
    #[default]
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "3month")]
    ThreeMonths,
    #[serde(rename = "6month")]
    SixMonths,
    #[serde(rename = "1year")]
    Year,
}

impl TimeWindow {
    /// Narrowest first
    pub const ALL: [TimeWindow; 6] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::Year,
    ];

    /// Earliest creation time included in this window.
    ///
    /// Month and year offsets are calendar aware; a day that does not exist in
    /// the target month clamps to that month's last day.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let cutoff = match self {
            Self::Daily => now.checked_sub_days(Days::new(1)),
            Self::Weekly => now.checked_sub_days(Days::new(7)),
            Self::Monthly => now.checked_sub_months(Months::new(1)),
            Self::ThreeMonths => now.checked_sub_months(Months::new(3)),
            Self::SixMonths => now.checked_sub_months(Months::new(6)),
            Self::Year => now.checked_sub_months(Months::new(12)),
        };
        cutoff.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::ThreeMonths => "3 Months",
            Self::SixMonths => "6 Months",
            Self::Year => "1 Year",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::ThreeMonths => "3month",
            Self::SixMonths => "6month",
            Self::Year => "1year",
        };
        write!(f, "{}", key)
    }
}

impl FromStr for TimeWindow {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "3month" => Ok(Self::ThreeMonths),
            "6month" => Ok(Self::SixMonths),
            "1year" => Ok(Self::Year),
            _ => Err(DeskError::InvalidTimeWindow(s.to_string())),
        }
    }
}

/// Ticket counts per status; absent statuses count zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub open: usize,
    pub ongoing: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn get(&self, status: TicketStatus) -> usize {
        match status {
            TicketStatus::Open => self.open,
            TicketStatus::Ongoing => self.ongoing,
            TicketStatus::Completed => self.completed,
        }
    }

    pub fn total(&self) -> usize {
        self.open + self.ongoing + self.completed
    }

    fn record(&mut self, status: TicketStatus) {
        match status {
            TicketStatus::Open => self.open += 1,
            TicketStatus::Ongoing => self.ongoing += 1,
            TicketStatus::Completed => self.completed += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl PriorityCounts {
    pub fn get(&self, priority: TicketPriority) -> usize {
        match priority {
            TicketPriority::Low => self.low,
            TicketPriority::Medium => self.medium,
            TicketPriority::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }

    fn record(&mut self, priority: TicketPriority) {
        match priority {
            TicketPriority::Low => self.low += 1,
            TicketPriority::Medium => self.medium += 1,
            TicketPriority::High => self.high += 1,
        }
    }
}

/// Tickets created at or after the window's cutoff
pub fn tickets_in_window(
    tickets: &[Ticket],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> impl Iterator<Item = &Ticket> {
    let cutoff = window.cutoff(now);
    tickets.iter().filter(move |t| t.created_at >= cutoff)
}

/// Counts tickets per status within `window` ending at `now`
pub fn aggregate_ticket_status(
    tickets: &[Ticket],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> StatusCounts {
    let counts = tickets_in_window(tickets, window, now).fold(
        StatusCounts::default(),
        |mut counts, ticket| {
            counts.record(ticket.status);
            counts
        },
    );

    tracing::debug!(
        %window,
        open = counts.open,
        ongoing = counts.ongoing,
        completed = counts.completed,
        "aggregated ticket status"
    );
    counts
}

/// [`aggregate_ticket_status`] against the current system time
pub fn aggregate_ticket_status_now(tickets: &[Ticket], window: TimeWindow) -> StatusCounts {
    aggregate_ticket_status(tickets, window, Utc::now())
}

pub fn aggregate_ticket_priority(
    tickets: &[Ticket],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> PriorityCounts {
    tickets_in_window(tickets, window, now).fold(PriorityCounts::default(), |mut counts, ticket| {
        counts.record(ticket.priority);
        counts
    })
}

/// All tickets with the given status, regardless of age
pub fn tickets_with_status(tickets: &[Ticket], status: TicketStatus) -> Vec<Ticket> {
    tickets
        .iter()
        .filter(|t| t.status == status)
        .cloned()
        .collect()
}
