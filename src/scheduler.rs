//! Consumption report scheduler.
//!
//! Decides when a consumption report is due. Two policies are supported:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Trigger Sources                          │
//! │                                                              │
//! │  ┌─────────────────────┐          ┌──────────────────────┐   │
//! │  │ SimulatedClock      │          │ ClockPort (real ms)  │   │
//! │  │ minute wraps to 0   │          │ now − last ≥ interval│   │
//! │  └──────────┬──────────┘          └──────────┬───────────┘   │
//! │             │ raise()                        │               │
//! │             ▼                                │               │
//! │      ┌─────────────┐                         │               │
//! │      │ReportTrigger│                         │               │
//! │      └──────┬──────┘                         │               │
//! │             │ take()                         │               │
//! │             ▼                                ▼               │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                ReportScheduler::poll()                 │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │                 NodeService::poll_report()                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The trigger is an edge flag: raising it twice before it is consumed
//! still yields a single report, and polling it repeatedly after it was
//! consumed yields nothing until the next boundary.

use log::info;

use crate::config::ReportPolicy;

// ═══════════════════════════════════════════════════════════════
//  Trigger
// ═══════════════════════════════════════════════════════════════

/// Edge flag set on an hour boundary, cleared when consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportTrigger {
    pending: bool,
}

impl ReportTrigger {
    pub fn raise(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the flag. Returns whether it was set.
    pub fn take(&mut self) -> bool {
        core::mem::take(&mut self.pending)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// A report that is due now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDue {
    /// Close the day (reset the daily accumulator) after this report.
    pub closes_day: bool,
}

pub struct ReportScheduler {
    policy: ReportPolicy,
    trigger: ReportTrigger,
    last_report_ms: u32,
    /// A simulated midnight passed since the last report.
    day_rollover_pending: bool,
}

impl ReportScheduler {
    pub fn new(policy: ReportPolicy, start_ms: u32) -> Self {
        match policy {
            ReportPolicy::SimulatedHour => info!("Scheduler: report on every simulated hour"),
            ReportPolicy::FixedInterval { interval_ms } => {
                info!("Scheduler: report every {} ms", interval_ms);
            }
        }
        Self {
            policy,
            trigger: ReportTrigger::default(),
            last_report_ms: start_ms,
            day_rollover_pending: false,
        }
    }

    pub fn policy(&self) -> ReportPolicy {
        self.policy
    }

    /// Record a simulated hour boundary.
    pub fn on_hour_rollover(&mut self, day_rollover: bool) {
        if day_rollover {
            self.day_rollover_pending = true;
        }
        if self.policy == ReportPolicy::SimulatedHour {
            self.trigger.raise();
        }
    }

    pub fn trigger(&self) -> ReportTrigger {
        self.trigger
    }

    /// Check whether a report is due and consume the boundary if so.
    pub fn poll(&mut self, now_ms: u32) -> Option<ReportDue> {
        let due = match self.policy {
            ReportPolicy::SimulatedHour => self.trigger.take(),
            ReportPolicy::FixedInterval { interval_ms } => {
                if now_ms.wrapping_sub(self.last_report_ms) >= interval_ms {
                    // Updated whether or not the report is delivered.
                    self.last_report_ms = now_ms;
                    true
                } else {
                    false
                }
            }
        };
        if !due {
            return None;
        }
        Some(ReportDue {
            closes_day: core::mem::take(&mut self.day_rollover_pending),
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
