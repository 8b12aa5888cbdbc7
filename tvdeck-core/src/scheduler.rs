//! Redraw scheduler
//!
//! The launcher's single-threaded control loop. Each [`Scheduler::tick`]
//! drains input, checks on the supervised child, looks for the three redraw
//! triggers (input, minute rollover, telemetry change) and repaints the whole
//! frame only when one of them fired. The caller sleeps for the returned
//! interval between ticks.

use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};

use crate::config::LauncherConfig;
use crate::model::{AppDescriptor, PowerAction, TelemetrySnapshot};
use crate::navigation::{Action, Key, LaunchTarget, NavigationState};
use crate::process::{ChildStatus, Supervisor};
use crate::telemetry::TelemetryFeed;

/// Idle time between ticks while the menu is visible
pub const IDLE_INTERVAL: Duration = Duration::from_millis(50);
/// Idle time between ticks while a launched app owns the display
pub const BUSY_INTERVAL: Duration = Duration::from_millis(200);

/// Input delivered by the front end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    /// Surface size changed; layout must be recomputed
    Resized,
    /// Window closed / terminal gone
    Closed,
}

/// Everything a full repaint needs.
pub struct View<'a> {
    pub nav: &'a NavigationState,
    pub telemetry: TelemetrySnapshot,
    pub now: NaiveDateTime,
}

/// The visible surface: input, drawing and visibility control.
pub trait Frontend {
    type Error;

    /// Next pending input event, without blocking.
    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;

    /// Repaint the entire frame.
    fn render(&mut self, view: &View<'_>) -> Result<(), Self::Error>;

    /// Show a modal confirmation over `view` and block until the user
    /// accepts (`true`) or cancels (`false`).
    fn confirm(&mut self, view: &View<'_>, action: PowerAction) -> Result<bool, Self::Error>;

    /// Cede the display to a launched program.
    fn hide(&mut self) -> Result<(), Self::Error>;

    /// Reclaim and raise the display after the program exits.
    fn show(&mut self) -> Result<(), Self::Error>;
}

/// Wall clock source
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local time from the system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Minutes since the epoch; the clock display changes only when this does.
fn minute_stamp(t: &NaiveDateTime) -> i64 {
    t.and_utc().timestamp().div_euclid(60)
}

/// Outcome of one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Sleep for this long, then tick again
    Idle(Duration),
    Quit,
}

enum Flow {
    Continue,
    Quit,
}

/// Commands the menu can run, copied out of the config at startup.
#[derive(Clone, Debug)]
pub struct Menu {
    pub apps: Vec<AppDescriptor>,
    pub settings_command: String,
    pub reboot_command: String,
    pub poweroff_command: String,
}

impl Menu {
    pub fn from_config(config: &LauncherConfig) -> Self {
        Self {
            apps: config.apps.clone(),
            settings_command: config.settings_command.clone(),
            reboot_command: config.reboot_command.clone(),
            poweroff_command: config.poweroff_command.clone(),
        }
    }

    fn launch_command(&self, target: LaunchTarget) -> Option<&str> {
        match target {
            LaunchTarget::App(i) => self.apps.get(i).map(|a| a.command.as_str()),
            LaunchTarget::Settings => Some(self.settings_command.as_str()),
        }
    }

    fn power_command(&self, action: PowerAction) -> &str {
        match action {
            PowerAction::Reboot => &self.reboot_command,
            PowerAction::PowerOff => &self.poweroff_command,
        }
    }
}

pub struct Scheduler<F, S, C> {
    frontend: F,
    supervisor: S,
    clock: C,
    telemetry: TelemetryFeed,
    menu: Menu,
    nav: NavigationState,
    last_minute: Option<i64>,
    app_running: bool,
}

impl<F, S, C> Scheduler<F, S, C>
where
    F: Frontend,
    S: Supervisor,
    C: Clock,
{
    pub fn new(menu: Menu, frontend: F, supervisor: S, clock: C, telemetry: TelemetryFeed) -> Self {
        let nav = NavigationState::new(menu.apps.len());
        Self {
            frontend,
            supervisor,
            clock,
            telemetry,
            menu,
            nav,
            last_minute: None,
            app_running: false,
        }
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn app_running(&self) -> bool {
        self.app_running
    }

    /// Give the front end back to the caller for teardown.
    pub fn into_frontend(self) -> F {
        self.frontend
    }

    /// Run one iteration of the control loop.
    pub fn tick(&mut self) -> Result<Tick, F::Error> {
        if let Flow::Quit = self.drain_input()? {
            return Ok(Tick::Quit);
        }

        if self.app_running {
            match self.supervisor.poll() {
                ChildStatus::Running => return Ok(Tick::Idle(BUSY_INTERVAL)),
                ChildStatus::Exited { code } => {
                    tracing::info!(?code, "launched app exited, reclaiming display");
                    self.reclaim_display()?;
                }
                ChildStatus::NotTracked => {
                    tracing::warn!("running app no longer tracked, reclaiming display");
                    self.reclaim_display()?;
                }
            }
        }

        let now = self.clock.now();
        let minute = minute_stamp(&now);
        if self.last_minute != Some(minute) {
            tracing::trace!(hour = now.hour(), minute = now.minute(), "minute rollover");
            self.last_minute = Some(minute);
            self.nav.mark_dirty();
        }

        if self.telemetry.take_changed() {
            self.nav.mark_dirty();
        }

        if self.nav.take_redraw() {
            let view = View {
                nav: &self.nav,
                telemetry: self.telemetry.latest(),
                now,
            };
            self.frontend.render(&view)?;
        }

        Ok(Tick::Idle(IDLE_INTERVAL))
    }

    fn reclaim_display(&mut self) -> Result<(), F::Error> {
        self.app_running = false;
        self.frontend.show()?;
        self.nav.mark_dirty();
        Ok(())
    }

    fn drain_input(&mut self) -> Result<Flow, F::Error> {
        while let Some(event) = self.frontend.poll_event()? {
            let key = match event {
                InputEvent::Closed => return Ok(Flow::Quit),
                InputEvent::Resized => {
                    self.nav.mark_dirty();
                    continue;
                }
                InputEvent::Key(key) => key,
            };

            match self.nav.handle(key) {
                Action::None => {}
                Action::Quit => return Ok(Flow::Quit),
                Action::Launch(target) => {
                    if self.launch(target)? {
                        // The menu is hidden now; leave the rest for later.
                        break;
                    }
                }
                Action::Confirm(action) => self.confirm_power(action)?,
            }
        }
        Ok(Flow::Continue)
    }

    /// Returns whether the display was handed to the new child.
    fn launch(&mut self, target: LaunchTarget) -> Result<bool, F::Error> {
        let Some(command) = self.menu.launch_command(target) else {
            return Ok(false);
        };

        match self.supervisor.launch(command) {
            Ok(pid) => {
                tracing::info!(command, ?pid, "launched");
                self.app_running = true;
                self.frontend.hide()?;
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "launch failed, staying on the menu");
                Ok(false)
            }
        }
    }

    fn confirm_power(&mut self, action: PowerAction) -> Result<(), F::Error> {
        let view = View {
            nav: &self.nav,
            telemetry: self.telemetry.latest(),
            now: self.clock.now(),
        };
        let accepted = self.frontend.confirm(&view, action)?;

        if accepted {
            let command = self.menu.power_command(action);
            tracing::info!(action = action.label(), command, "power action confirmed");
            if let Err(e) = self.supervisor.issue(command) {
                tracing::error!(error = %e, "power command failed");
            }
        } else {
            tracing::debug!(action = action.label(), "power action cancelled");
        }

        self.nav.mark_dirty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Icon;
    use crate::navigation::Focus;
    use crate::process::LaunchError;
    use crate::telemetry::{self, TelemetryPublisher};
    use chrono::NaiveDate;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct FakeFrontend {
        events: VecDeque<InputEvent>,
        renders: Vec<(usize, bool, TelemetrySnapshot)>,
        confirm_answer: bool,
        confirms: Vec<PowerAction>,
        hidden: bool,
        shows: usize,
    }

    impl Frontend for FakeFrontend {
        type Error = std::convert::Infallible;

        fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
            Ok(self.events.pop_front())
        }

        fn render(&mut self, view: &View<'_>) -> Result<(), Self::Error> {
            self.renders
                .push((view.nav.selected, view.nav.settings_selected(), view.telemetry));
            Ok(())
        }

        fn confirm(&mut self, _view: &View<'_>, action: PowerAction) -> Result<bool, Self::Error> {
            self.confirms.push(action);
            Ok(self.confirm_answer)
        }

        fn hide(&mut self) -> Result<(), Self::Error> {
            self.hidden = true;
            Ok(())
        }

        fn show(&mut self) -> Result<(), Self::Error> {
            self.hidden = false;
            self.shows += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeSupervisor {
        launched: Vec<String>,
        issued: Vec<String>,
        /// Polls that report Running before the child exits
        running_polls: usize,
        tracked: bool,
        fail_launch: bool,
        polls: usize,
    }

    impl Supervisor for FakeSupervisor {
        fn launch(&mut self, command: &str) -> Result<Option<u32>, LaunchError> {
            if self.fail_launch {
                return Err(LaunchError::SpawnFailed {
                    command: command.to_string(),
                    reason: "no such file".to_string(),
                });
            }
            self.launched.push(command.to_string());
            self.tracked = true;
            Ok(Some(4242))
        }

        fn poll(&mut self) -> ChildStatus {
            self.polls += 1;
            if !self.tracked {
                return ChildStatus::NotTracked;
            }
            if self.running_polls > 0 {
                self.running_polls -= 1;
                ChildStatus::Running
            } else {
                self.tracked = false;
                ChildStatus::Exited { code: Some(0) }
            }
        }

        fn issue(&mut self, command: &str) -> Result<(), LaunchError> {
            self.issued.push(command.to_string());
            Ok(())
        }
    }

    struct FakeClock {
        now: NaiveDateTime,
    }

    impl Clock for FakeClock {
        fn now(&self) -> NaiveDateTime {
            self.now
        }
    }

    fn time(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn menu() -> Menu {
        Menu {
            apps: vec![
                AppDescriptor::new("Kodi", "kodi", Icon::Tv),
                AppDescriptor::new("Stremio", "stremio", Icon::Play),
                AppDescriptor::new("IPTV", "iptv", Icon::Video),
                AppDescriptor::new("Tidal", "tidal-hifi", Icon::Music),
                AppDescriptor::new("Bluetooth", "blueman-manager", Icon::Bluetooth),
            ],
            settings_command: "settings".to_string(),
            reboot_command: "sudo reboot".to_string(),
            poweroff_command: "sudo poweroff".to_string(),
        }
    }

    fn scheduler() -> (
        Scheduler<FakeFrontend, FakeSupervisor, FakeClock>,
        TelemetryPublisher,
    ) {
        let (publisher, feed) = telemetry::channel();
        let scheduler = Scheduler::new(
            menu(),
            FakeFrontend::default(),
            FakeSupervisor::default(),
            FakeClock { now: time(10, 0, 0) },
            feed,
        );
        (scheduler, publisher)
    }

    fn press(s: &mut Scheduler<FakeFrontend, FakeSupervisor, FakeClock>, keys: &[Key]) {
        s.frontend.events.extend(keys.iter().map(|k| InputEvent::Key(*k)));
    }

    #[test]
    fn test_first_tick_paints() {
        let (mut s, _publisher) = scheduler();
        assert_eq!(s.tick().unwrap(), Tick::Idle(IDLE_INTERVAL));
        assert_eq!(s.frontend.renders.len(), 1);
    }

    #[test]
    fn test_idle_ticks_do_not_repaint() {
        let (mut s, _publisher) = scheduler();
        s.tick().unwrap();
        s.tick().unwrap();
        s.tick().unwrap();
        assert_eq!(s.frontend.renders.len(), 1);
        assert!(!s.navigation().needs_redraw);
    }

    #[test]
    fn test_minute_rollover_repaints_once() {
        let (mut s, _publisher) = scheduler();
        s.clock.now = time(10, 59, 0);
        s.tick().unwrap();
        assert_eq!(s.frontend.renders.len(), 1);

        s.clock.now = time(10, 59, 30);
        s.tick().unwrap();
        s.clock.now = time(10, 59, 59);
        s.tick().unwrap();
        assert_eq!(s.frontend.renders.len(), 1);

        s.clock.now = time(11, 0, 0);
        s.tick().unwrap();
        assert_eq!(s.frontend.renders.len(), 2);

        s.clock.now = time(11, 0, 20);
        s.tick().unwrap();
        assert_eq!(s.frontend.renders.len(), 2);
    }

    #[test]
    fn test_telemetry_change_repaints_once() {
        let (mut s, publisher) = scheduler();
        s.tick().unwrap();

        let snapshot = TelemetrySnapshot {
            cpu_percent: 12,
            mem_percent: 40,
            temp_celsius: 47,
            disk_percent: 63,
        };
        publisher.publish(TelemetrySnapshot { cpu_percent: 3, ..snapshot });
        publisher.publish(snapshot);
        s.tick().unwrap();
        s.tick().unwrap();

        assert_eq!(s.frontend.renders.len(), 2);
        assert_eq!(s.frontend.renders[1].2, snapshot);
    }

    #[test]
    fn test_every_key_repaints() {
        let (mut s, _publisher) = scheduler();
        s.tick().unwrap();

        // Down while the tiles have focus changes nothing but still repaints
        press(&mut s, &[Key::Down]);
        s.tick().unwrap();
        assert_eq!(s.frontend.renders.len(), 2);

        press(&mut s, &[Key::Right, Key::Right]);
        s.tick().unwrap();
        assert_eq!(s.frontend.renders.len(), 3);
        assert_eq!(s.frontend.renders[2].0, 2);
    }

    #[test]
    fn test_resize_repaints() {
        let (mut s, _publisher) = scheduler();
        s.tick().unwrap();
        s.frontend.events.push_back(InputEvent::Resized);
        s.tick().unwrap();
        assert_eq!(s.frontend.renders.len(), 2);
    }

    #[test]
    fn test_quit_and_close() {
        let (mut s, _publisher) = scheduler();
        press(&mut s, &[Key::Quit]);
        assert_eq!(s.tick().unwrap(), Tick::Quit);

        let (mut s, _publisher) = scheduler();
        s.frontend.events.push_back(InputEvent::Closed);
        assert_eq!(s.tick().unwrap(), Tick::Quit);
        assert!(s.frontend.renders.is_empty());
    }

    #[test]
    fn test_launch_hides_until_child_exits() {
        let (mut s, _publisher) = scheduler();
        s.tick().unwrap();
        s.supervisor.running_polls = 2;

        press(&mut s, &[Key::Right, Key::Confirm]);
        assert_eq!(s.tick().unwrap(), Tick::Idle(BUSY_INTERVAL));
        assert_eq!(s.supervisor.launched, vec!["stremio".to_string()]);
        assert!(s.frontend.hidden);
        assert!(s.app_running());
        let renders = s.frontend.renders.len();

        assert_eq!(s.tick().unwrap(), Tick::Idle(BUSY_INTERVAL));
        assert_eq!(s.frontend.renders.len(), renders);

        // Child exits: display reclaimed and repainted in the same tick
        assert_eq!(s.tick().unwrap(), Tick::Idle(IDLE_INTERVAL));
        assert!(!s.frontend.hidden);
        assert_eq!(s.frontend.shows, 1);
        assert!(!s.app_running());
        assert_eq!(s.frontend.renders.len(), renders + 1);

        // Nothing is polled once the child is gone
        let polls = s.supervisor.polls;
        s.tick().unwrap();
        assert_eq!(s.supervisor.polls, polls);
    }

    #[test]
    fn test_keys_after_launch_wait_for_return() {
        let (mut s, _publisher) = scheduler();
        s.supervisor.running_polls = 1;
        press(&mut s, &[Key::Confirm, Key::Right]);
        s.tick().unwrap();
        assert_eq!(s.navigation().selected, 0);
        assert_eq!(s.frontend.events.len(), 1);
    }

    #[test]
    fn test_settings_launch() {
        let (mut s, _publisher) = scheduler();
        press(&mut s, &[Key::Up, Key::Confirm]);
        s.tick().unwrap();
        assert_eq!(s.navigation().focus, Focus::Settings);
        assert_eq!(s.supervisor.launched, vec!["settings".to_string()]);
    }

    #[test]
    fn test_failed_launch_keeps_menu() {
        let (mut s, _publisher) = scheduler();
        s.tick().unwrap();
        s.supervisor.fail_launch = true;

        press(&mut s, &[Key::Confirm]);
        assert_eq!(s.tick().unwrap(), Tick::Idle(IDLE_INTERVAL));
        assert!(!s.app_running());
        assert!(!s.frontend.hidden);
        assert_eq!(s.supervisor.polls, 0);
        assert_eq!(s.frontend.renders.len(), 2);
    }

    #[test]
    fn test_power_command_needs_acceptance() {
        let (mut s, _publisher) = scheduler();
        s.tick().unwrap();

        press(&mut s, &[Key::Reboot]);
        s.tick().unwrap();
        assert_eq!(s.frontend.confirms, vec![PowerAction::Reboot]);
        assert!(s.supervisor.issued.is_empty());
        assert_eq!(s.frontend.renders.len(), 2);

        s.frontend.confirm_answer = true;
        press(&mut s, &[Key::PowerOff]);
        s.tick().unwrap();
        assert_eq!(s.supervisor.issued, vec!["sudo poweroff".to_string()]);
        assert_eq!(s.frontend.renders.len(), 3);
    }

    #[test]
    fn test_minute_stamp_crosses_midnight() {
        let before = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(minute_stamp(&after) - minute_stamp(&before), 1);
    }
}
