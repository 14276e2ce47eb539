use chrono::NaiveDateTime;
use std::{fmt, time::{Duration, Instant}};
use tracing::{debug, info, warn};

use crate::{
    error::ValidationError,
    ticker::Ticker,
    time_model::{format_datetime_local, parse_datetime_local, RemainingTime, TimeWindow},
};

// ============================================================================
// Constants
// ============================================================================

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
/// Longest accepted field text, `YYYY-MM-DDTHH:MM:SS`.
const MAX_INPUT_LEN: usize = 19;

// ============================================================================
// Inputs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Start,
    End,
}

impl Field {
    pub fn next(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Start => "Start time",
            Self::End => "End time",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::End => "end",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    Insert(char),
    Backspace,
    Clear,
}

fn accepts_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | ':' | 'T' | ' ')
}

// ============================================================================
// State Machine
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TimerState {
    Idle,
    Running { window: TimeWindow, remaining: RemainingTime },
    Completed { window: TimeWindow, remaining: RemainingTime },
}

/// Owns the countdown: the two raw input fields, the view-state and the
/// periodic recompute schedule.
pub struct Controller {
    start_input: String,
    end_input: String,
    state: TimerState,
    ticker: Option<Ticker>,
    tick_period: Duration,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl Controller {
    pub fn new(tick_period: Duration) -> Self {
        Self {
            start_input: String::new(),
            end_input: String::new(),
            state: TimerState::Idle,
            ticker: None,
            tick_period,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, TimerState::Completed { .. })
    }

    /// Fields are frozen for as long as a countdown runs.
    pub fn is_locked(&self) -> bool {
        self.is_running()
    }

    pub fn remaining(&self) -> Option<&RemainingTime> {
        match &self.state {
            TimerState::Idle => None,
            TimerState::Running { remaining, .. } | TimerState::Completed { remaining, .. } => {
                Some(remaining)
            }
        }
    }

    pub fn progress(&self) -> f64 {
        self.remaining().map_or(0.0, RemainingTime::progress_percent)
    }

    pub fn input(&self, field: Field) -> &str {
        match field {
            Field::Start => &self.start_input,
            Field::End => &self.end_input,
        }
    }

    fn input_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Start => &mut self.start_input,
            Field::End => &mut self.end_input,
        }
    }

    /// Replaces a field's text wholesale. Rejected while locked.
    pub fn set_input(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.is_locked() {
            return false;
        }
        *self.input_mut(field) = value.into();
        true
    }

    pub fn edit(&mut self, field: Field, op: EditOp) -> bool {
        if self.is_locked() {
            return false;
        }

        let text = self.input_mut(field);
        match op {
            EditOp::Insert(c) => {
                if !accepts_char(c) || text.len() >= MAX_INPUT_LEN {
                    return false;
                }
                text.push(c);
            }
            EditOp::Backspace => {
                if text.pop().is_none() {
                    return false;
                }
            }
            EditOp::Clear => text.clear(),
        }
        true
    }

    /// Parses and checks the two fields.
    pub fn window(&self) -> Result<TimeWindow, ValidationError> {
        if self.start_input.trim().is_empty() || self.end_input.trim().is_empty() {
            return Err(ValidationError::MissingTime);
        }

        let parse = |field: Field| -> Result<NaiveDateTime, ValidationError> {
            let value = self.input(field);
            match parse_datetime_local(value) {
                Ok(Some(dt)) => Ok(dt),
                Ok(None) => Err(ValidationError::MissingTime),
                Err(_) => Err(ValidationError::InvalidTime {
                    field,
                    value: value.trim().to_string(),
                }),
            }
        };

        let window = TimeWindow { start: parse(Field::Start)?, end: parse(Field::End)? };
        if window.start >= window.end {
            return Err(ValidationError::EndNotAfterStart);
        }
        Ok(window)
    }

    /// Starts a countdown over the current fields, measured from `now`.
    ///
    /// A no-op while already running. On a validation failure nothing changes.
    pub fn start(&mut self, now: NaiveDateTime, instant: Instant) -> Result<(), ValidationError> {
        if self.is_running() {
            debug!("start ignored: countdown already running");
            return Ok(());
        }

        let window = self.window()?;
        let remaining = window.remaining_at(now);

        info!(
            start = %window.start,
            end = %window.end,
            remaining_secs = remaining.total_seconds_remaining,
            "countdown started"
        );
        self.state = TimerState::Running { window, remaining };
        self.ticker = Some(Ticker::start(self.tick_period, instant));
        Ok(())
    }

    /// Leaves Running (or dismisses Completed) and returns to Idle.
    pub fn stop(&mut self) -> bool {
        self.ticker = None;
        match self.state {
            TimerState::Idle => false,
            TimerState::Running { .. } => {
                info!("countdown stopped");
                self.state = TimerState::Idle;
                true
            }
            TimerState::Completed { .. } => {
                debug!("completion dismissed");
                self.state = TimerState::Idle;
                true
            }
        }
    }

    /// Recomputes the remaining time. Returns `true` when this tick ends the
    /// countdown.
    pub fn tick(&mut self, now: NaiveDateTime) -> bool {
        let TimerState::Running { window, .. } = self.state else {
            return false;
        };

        let remaining = window.remaining_at(now);
        debug!(remaining_secs = remaining.total_seconds_remaining, "tick");

        if remaining.is_elapsed() {
            info!(end = %window.end, "countdown completed");
            self.state = TimerState::Completed { window, remaining };
            self.ticker = None;
            return true;
        }

        self.state = TimerState::Running { window, remaining };
        false
    }

    /// Drives `tick` from the monotonic schedule.
    pub fn poll(&mut self, instant: Instant, now: NaiveDateTime) -> bool {
        let due = self.ticker.as_mut().is_some_and(|t| t.due(instant));
        if due { self.tick(now) } else { false }
    }

    pub fn until_next_tick(&self, instant: Instant) -> Option<Duration> {
        self.ticker.as_ref().map(|t| t.until_next(instant))
    }

    /// Fills the fields with a window of `hours` starting at `now`.
    ///
    /// `Ok(false)` while running. An end past chrono's date range is an
    /// error and leaves both fields untouched.
    pub fn quick_set(&mut self, hours: u32, now: NaiveDateTime) -> Result<bool, ValidationError> {
        if self.is_locked() {
            return Ok(false);
        }

        let Some(end) = chrono::TimeDelta::try_hours(i64::from(hours))
            .and_then(|d| now.checked_add_signed(d))
        else {
            warn!(hours, %now, "quick-set end out of range");
            return Err(ValidationError::WindowOutOfRange { hours });
        };
        self.start_input = format_datetime_local(&now);
        self.end_input = format_datetime_local(&end);
        info!(hours, start = %self.start_input, end = %self.end_input, "quick-set window");
        Ok(true)
    }
}
