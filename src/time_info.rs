//! Elapsed time and a wall or simulated clock on the input link.
//!
//! ```text
//! (<parent> ^time <t>)
//!   (<t> ^seconds 12 ^milliseconds 12034 ^steps 40 ^clock <c>)
//!   (<c> ^hour 8 ^minute 3 ^second 20 ^millisecond 0 ^epoch 1577865800)
//! ```
//!
//! `seconds` and `milliseconds` are real time since the last reset; `steps`
//! counts ticks. The clock either follows local wall time or, with
//! `sim_clock`, starts at a configured hour on 2020-01-01 (UTC) and moves a
//! fixed number of milliseconds per tick. `^milliseconds` and `^millisecond`
//! are only present with `include_ms`.
//!
//! A simulated clock can be set by the agent:
//!
//! ```text
//! (<out> ^set-time <st>) (<st> ^hour 14 ^minute 30 ^second 0)
//! ```

use std::time::Instant;

use chrono::Timelike;

use crate::config::ClockConfig;
use crate::connector::Connector;
use crate::error::WmResult;
use crate::sync::{SoarWme, WmInterface};
use crate::value::WmValue;
use crate::wm::query::WmQuery;
use crate::wm::{Handle, WorkingMemory};

/// Output command that sets the simulated clock.
pub const SET_TIME: &str = "set-time";

/// Unix time of 2020-01-01T00:00:00Z, the day a simulated clock runs on.
pub const SIM_EPOCH_DAY: i64 = 1_577_836_800;

/// Index of `^millisecond` in the clock WMEs.
const MILLISECOND: usize = 3;

/// A 24-hour clock with millisecond resolution and its Unix time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
    pub epoch: i64,
}

impl Clock {
    /// Simulated clock at `hour`:00:00 on [`SIM_EPOCH_DAY`].
    pub fn starting_at(hour: u32) -> Self {
        let hour = hour % 24;
        Self {
            hour,
            minute: 0,
            second: 0,
            millisecond: 0,
            epoch: SIM_EPOCH_DAY + i64::from(hour) * 3600,
        }
    }

    /// Simulated clock at the given time of day, if it is a valid one.
    pub fn at(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            hour,
            minute,
            second,
            millisecond: 0,
            epoch: SIM_EPOCH_DAY + i64::from(hour * 3600 + minute * 60 + second),
        })
    }

    /// Local wall time.
    pub fn now_local() -> Self {
        let now = chrono::Local::now();
        Self {
            hour: now.hour(),
            minute: now.minute(),
            second: now.second(),
            // Leap seconds report 1000..2000.
            millisecond: now.timestamp_subsec_millis().min(999),
            epoch: now.timestamp(),
        }
    }

    /// Move the clock forward, carrying into seconds, minutes and hours and
    /// wrapping at midnight. The epoch moves with every whole second.
    pub fn advance(&mut self, ms: u64) {
        let ms_total = u64::from(self.millisecond) + ms % 1000;
        self.millisecond = (ms_total % 1000) as u32;
        let seconds = ms / 1000 + ms_total / 1000;
        self.epoch = self
            .epoch
            .saturating_add(i64::try_from(seconds).unwrap_or(i64::MAX));

        let total = u64::from(self.second) + seconds;
        self.second = (total % 60) as u32;
        let total = u64::from(self.minute) + total / 60;
        self.minute = (total % 60) as u32;
        self.hour = ((u64::from(self.hour) + total / 60) % 24) as u32;
    }

    fn values(&self) -> [i64; 5] {
        [
            i64::from(self.hour),
            i64::from(self.minute),
            i64::from(self.second),
            i64::from(self.millisecond),
            self.epoch,
        ]
    }
}

/// Time information mirrored under a `^time` identifier.
#[derive(Debug)]
pub struct TimeInfo {
    config: ClockConfig,
    started: Instant,
    elapsed_ms: i64,
    step_count: i64,
    clock: Clock,

    time_id: Option<Handle>,
    seconds: SoarWme,
    milliseconds: SoarWme,
    steps: SoarWme,
    clock_wmes: [SoarWme; 5],
}

impl TimeInfo {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            clock: initial_clock(&config),
            config,
            started: Instant::now(),
            elapsed_ms: 0,
            step_count: 0,
            time_id: None,
            seconds: SoarWme::new("seconds", 0),
            milliseconds: SoarWme::new("milliseconds", 0),
            steps: SoarWme::new("steps", 0),
            clock_wmes: [
                SoarWme::new("hour", 0),
                SoarWme::new("minute", 0),
                SoarWme::new("second", 0),
                SoarWme::new("millisecond", 0),
                SoarWme::new("epoch", 0),
            ],
        }
    }

    /// Restart the clock, the step counter and the real-time timer.
    pub fn reset(&mut self) {
        self.clock = initial_clock(&self.config);
        self.step_count = 0;
        self.elapsed_ms = 0;
        self.started = Instant::now();
    }

    /// Count one step and move the clock.
    pub fn tick(&mut self) {
        self.step_count += 1;
        self.elapsed_ms = i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX);
        if self.config.sim_clock {
            self.clock.advance(self.config.step_ms);
        } else {
            self.clock = Clock::now_local();
        }
    }

    /// Replace a simulated clock. Returns `false`, leaving the clock alone,
    /// when it follows wall time.
    pub fn set_clock(&mut self, clock: Clock) -> bool {
        if !self.config.sim_clock {
            return false;
        }
        self.clock = clock;
        true
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn steps(&self) -> i64 {
        self.step_count
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Identifier of `^time` while attached.
    pub fn time_id(&self) -> Option<&Handle> {
        self.time_id.as_ref()
    }

    fn stage_values(&mut self) -> WmResult<()> {
        self.seconds.set_value(self.elapsed_ms / 1000)?;
        self.milliseconds.set_value(self.elapsed_ms)?;
        self.steps.set_value(self.step_count)?;
        for (wme, value) in self.clock_wmes.iter_mut().zip(self.clock.values()) {
            wme.set_value(value)?;
        }
        Ok(())
    }

    /// Clock WMEs that belong in working memory under this configuration.
    fn shown_clock_wmes(&mut self) -> impl Iterator<Item = &mut SoarWme> {
        let include_ms = self.config.include_ms;
        self.clock_wmes
            .iter_mut()
            .enumerate()
            .filter(move |(i, _)| include_ms || *i != MILLISECOND)
            .map(|(_, wme)| wme)
    }
}

fn initial_clock(config: &ClockConfig) -> Clock {
    if config.sim_clock {
        Clock::starting_at(config.start_hour)
    } else {
        Clock::now_local()
    }
}

impl Default for TimeInfo {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}

impl WmInterface for TimeInfo {
    fn is_added(&self) -> bool {
        self.time_id.is_some()
    }

    fn add_to_wm_impl(&mut self, wm: &mut dyn WorkingMemory, parent: &Handle) -> WmResult<()> {
        self.stage_values()?;
        let time_id = wm.create_id_wme(parent, "time")?;
        self.seconds.attach(wm, &time_id)?;
        if self.config.include_ms {
            self.milliseconds.attach(wm, &time_id)?;
        }
        self.steps.attach(wm, &time_id)?;

        let clock_id = wm.create_id_wme(&time_id, "clock")?;
        for wme in self.shown_clock_wmes() {
            wme.attach(wm, &clock_id)?;
        }
        self.time_id = Some(time_id);
        Ok(())
    }

    fn update_wm_impl(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        self.stage_values()?;
        self.seconds.sync(wm)?;
        self.milliseconds.sync(wm)?;
        self.steps.sync(wm)?;
        for wme in self.shown_clock_wmes() {
            wme.sync(wm)?;
        }
        Ok(())
    }

    fn remove_from_wm_impl(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        for wme in &mut self.clock_wmes {
            wme.detach(wm)?;
        }
        self.seconds.detach(wm)?;
        self.milliseconds.detach(wm)?;
        self.steps.detach(wm)?;
        if let Some(time_id) = self.time_id.take() {
            wm.destroy_wme(&time_id)?;
        }
        Ok(())
    }
}

/// Keeps `^time` on the input link, one tick per input phase, and handles
/// `set-time` commands.
#[derive(Debug, Default)]
pub struct TimeConnector {
    time: TimeInfo,
}

impl TimeConnector {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            time: TimeInfo::new(config),
        }
    }

    pub fn time(&self) -> &TimeInfo {
        &self.time
    }

    /// Read `^hour ^minute ^second` (missing fields are 0) and set the clock.
    ///
    /// Writes `^status complete`, also when a wall clock ignores the request.
    /// Fields outside a 24-hour day get `^status error` with `^error-info`.
    fn process_set_time(&mut self, wm: &mut dyn WorkingMemory, command: &Handle) -> WmResult<()> {
        let mut fields = [0i64; 3];
        for (field, attribute) in fields.iter_mut().zip(["hour", "minute", "second"]) {
            *field = wm.child_int(command, attribute)?.unwrap_or(0);
        }
        let [hour, minute, second] = fields.map(|f| u32::try_from(f).ok());
        let clock = match (hour, minute, second) {
            (Some(h), Some(m), Some(s)) => Clock::at(h, m, s),
            _ => None,
        };
        let Some(clock) = clock else {
            tracing::warn!(%command, ?fields, "set-time outside a 24-hour day");
            wm.create_value_wme(command, "status", &WmValue::from("error"))?;
            wm.create_value_wme(
                command,
                "error-info",
                &WmValue::from("set-time needs 0-23 hours, 0-59 minutes and seconds"),
            )?;
            return Ok(());
        };

        if self.time.set_clock(clock) {
            tracing::debug!(%command, hour = clock.hour, minute = clock.minute, second = clock.second, "clock set");
        } else {
            tracing::debug!(%command, "set-time ignored by a wall clock");
        }
        wm.create_value_wme(command, "status", &WmValue::from("complete"))?;
        Ok(())
    }
}

impl Connector for TimeConnector {
    fn name(&self) -> &str {
        "time"
    }

    fn output_commands(&self) -> Vec<String> {
        vec![SET_TIME.to_string()]
    }

    fn on_input_phase(&mut self, wm: &mut dyn WorkingMemory, input_link: &Handle) -> WmResult<()> {
        self.time.tick();
        if self.time.is_added() {
            self.time.sync(wm)
        } else {
            self.time.attach(wm, input_link)
        }
    }

    fn on_output_event(
        &mut self,
        wm: &mut dyn WorkingMemory,
        command: &str,
        root: &Handle,
    ) -> WmResult<()> {
        if command != SET_TIME {
            return Ok(());
        }
        self.process_set_time(wm, root)
    }

    fn on_init_soar(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        self.time.detach(wm)?;
        self.time.reset();
        Ok(())
    }
}
