// Redraw scheduler - Decides when the periodic redraw loop runs and when it ticks next
//
// The loop runs iff the face is visible and not in ambient mode. Every transition
// re-derives that predicate and reconciles the timer from scratch: cancel whatever
// is pending, then arm a fresh tick if the loop should run.

pub const INTERACTIVE_UPDATE_RATE_MS: u64 = 500;
pub const MUTE_UPDATE_RATE_MS: u64 = 60_000;

/// Identifies one armed tick. A tick whose token is no longer pending is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    pub token: TickToken,
    pub delay_ms: u64,
}

/// Timer work the owner must carry out after a transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerAction {
    pub cancel: Option<TickToken>,
    pub arm: Option<ScheduledTick>,
}

impl TimerAction {
    pub fn is_noop(&self) -> bool {
        self.cancel.is_none() && self.arm.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub redraw: bool,
    pub action: TimerAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRates {
    pub interactive_ms: u64,
    pub mute_ms: u64,
}

impl Default for UpdateRates {
    fn default() -> Self {
        Self {
            interactive_ms: INTERACTIVE_UPDATE_RATE_MS,
            mute_ms: MUTE_UPDATE_RATE_MS,
        }
    }
}

#[derive(Debug)]
pub struct RedrawScheduler {
    rates: UpdateRates,
    visible: bool,
    ambient: bool,
    mute: bool,
    pending: Option<TickToken>,
    next_token: u64,
    destroyed: bool,
}

impl RedrawScheduler {
    pub fn new(rates: UpdateRates) -> Self {
        Self {
            rates: UpdateRates {
                interactive_ms: rates.interactive_ms.max(1),
                mute_ms: rates.mute_ms.max(1),
            },
            visible: false,
            ambient: false,
            mute: false,
            pending: None,
            next_token: 0,
            destroyed: false,
        }
    }

    pub fn should_run(&self) -> bool {
        self.visible && !self.ambient && !self.destroyed
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn interval_ms(&self) -> u64 {
        if self.mute {
            self.rates.mute_ms
        } else {
            self.rates.interactive_ms
        }
    }

    pub fn set_visible(&mut self, visible: bool) -> TimerAction {
        self.visible = visible;
        self.reconcile()
    }

    pub fn set_ambient(&mut self, ambient: bool) -> TimerAction {
        self.ambient = ambient;
        self.reconcile()
    }

    /// Switches the tick interval. The new interval is used from the next tick on.
    pub fn set_mute(&mut self, mute: bool) -> TimerAction {
        self.mute = mute;
        self.reconcile()
    }

    pub fn on_tick(&mut self, token: TickToken, now_millis: i64) -> TickOutcome {
        if self.pending != Some(token) {
            return TickOutcome {
                redraw: false,
                action: TimerAction::default(),
            };
        }
        self.pending = None;

        let arm = if self.should_run() {
            let interval = self.interval_ms();
            let delay_ms = interval - (now_millis.rem_euclid(interval as i64) as u64);
            Some(self.arm(delay_ms))
        } else {
            None
        };
        TickOutcome {
            redraw: true,
            action: TimerAction { cancel: None, arm },
        }
    }

    /// Terminal: cancels the pending tick and refuses to arm another.
    pub fn destroy(&mut self) -> TimerAction {
        self.destroyed = true;
        TimerAction {
            cancel: self.pending.take(),
            arm: None,
        }
    }

    fn reconcile(&mut self) -> TimerAction {
        if self.destroyed {
            return TimerAction::default();
        }
        let cancel = self.pending.take();
        let arm = if self.should_run() {
            Some(self.arm(0))
        } else {
            None
        };
        TimerAction { cancel, arm }
    }

    fn arm(&mut self, delay_ms: u64) -> ScheduledTick {
        self.next_token += 1;
        let token = TickToken(self.next_token);
        self.pending = Some(token);
        ScheduledTick { token, delay_ms }
    }
}

impl Default for RedrawScheduler {
    fn default() -> Self {
        Self::new(UpdateRates::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Visible(bool),
        Ambient(bool),
        Mute(bool),
    }

    fn apply(scheduler: &mut RedrawScheduler, step: Step) -> TimerAction {
        match step {
            Step::Visible(v) => scheduler.set_visible(v),
            Step::Ambient(a) => scheduler.set_ambient(a),
            Step::Mute(m) => scheduler.set_mute(m),
        }
    }

    fn running_scheduler() -> (RedrawScheduler, TickToken) {
        let mut scheduler = RedrawScheduler::default();
        let tick = scheduler.set_visible(true).arm.unwrap();
        (scheduler, tick.token)
    }

    #[test]
    fn test_loop_runs_iff_visible_and_interactive() {
        let steps = [
            Step::Visible(true),
            Step::Visible(false),
            Step::Ambient(true),
            Step::Ambient(false),
            Step::Mute(true),
            Step::Mute(false),
        ];

        // Every sequence of four transitions drawn from the six above
        for n in 0..steps.len().pow(4) {
            let mut scheduler = RedrawScheduler::default();
            let mut visible = false;
            let mut ambient = false;
            let mut code = n;
            for _ in 0..4 {
                let step = steps[code % steps.len()];
                code /= steps.len();
                match step {
                    Step::Visible(v) => visible = v,
                    Step::Ambient(a) => ambient = a,
                    Step::Mute(_) => {}
                }

                let was_running = scheduler.is_running();
                let action = apply(&mut scheduler, step);

                assert_eq!(scheduler.is_running(), visible && !ambient, "sequence {}", n);
                assert_eq!(action.cancel.is_some(), was_running);
                assert_eq!(action.arm.is_some(), visible && !ambient);
                if let Some(tick) = action.arm {
                    assert_eq!(tick.delay_ms, 0);
                }
            }
        }
    }

    #[test]
    fn test_tick_phase_aligns_to_interval() {
        let (mut scheduler, token) = running_scheduler();

        let outcome = scheduler.on_tick(token, 10_120);
        assert!(outcome.redraw);
        let next = outcome.action.arm.unwrap();
        assert_eq!(next.delay_ms, 380);

        let outcome = scheduler.on_tick(next.token, 10_500);
        assert_eq!(outcome.action.arm.unwrap().delay_ms, 500);
    }

    #[test]
    fn test_mute_interval_applies_on_next_tick() {
        let (mut scheduler, token) = running_scheduler();
        let next = scheduler.on_tick(token, 1_200).action.arm.unwrap();
        assert_eq!(next.delay_ms, 300);

        let action = scheduler.set_mute(true);
        assert_eq!(action.cancel, Some(next.token));
        let rearmed = action.arm.unwrap();
        assert_eq!(rearmed.delay_ms, 0);

        // The already-fired tick is not revisited; the next one uses the minute interval.
        let outcome = scheduler.on_tick(rearmed.token, 61_250);
        assert!(outcome.redraw);
        assert_eq!(outcome.action.arm.unwrap().delay_ms, 58_750);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let (mut scheduler, first) = running_scheduler();
        let second = scheduler.set_ambient(false).arm.unwrap().token;

        let stale = scheduler.on_tick(first, 0);
        assert!(!stale.redraw);
        assert!(stale.action.is_noop());
        assert!(scheduler.is_running());

        assert!(scheduler.on_tick(second, 0).redraw);
    }

    #[test]
    fn test_tick_after_leaving_interactive_does_not_rearm() {
        let (mut scheduler, token) = running_scheduler();
        scheduler.set_ambient(true);

        let outcome = scheduler.on_tick(token, 0);
        assert!(!outcome.redraw);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_destroy_cancels_and_is_terminal() {
        let (mut scheduler, token) = running_scheduler();

        let action = scheduler.destroy();
        assert_eq!(action.cancel, Some(token));
        assert!(action.arm.is_none());

        assert!(scheduler.set_visible(true).is_noop());
        assert!(scheduler.set_ambient(false).is_noop());
        assert!(!scheduler.on_tick(token, 0).redraw);
        assert!(!scheduler.is_running());
        assert!(scheduler.is_destroyed());
    }

    #[test]
    fn test_negative_clock_still_yields_positive_delay() {
        let (mut scheduler, token) = running_scheduler();
        let next = scheduler.on_tick(token, -120).action.arm.unwrap();
        assert_eq!(next.delay_ms, 120);
    }
}
