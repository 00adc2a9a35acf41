#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system responsible for emitting enemy spawn commands.
//!
//! Enemies of the active wave are released one at a time, each spawn waiting
//! for strictly more than the configured delay since the previous one. A wave
//! only ends once every one of its enemies has been spawned and the lane is
//! empty again.

use std::time::Duration;

use lane_defense_core::{Command, Event, WaveIndex, WavePlan};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_delay: Duration,
}

impl Config {
    /// Creates a new configuration using the provided delay between spawns.
    #[must_use]
    pub const fn new(spawn_delay: Duration) -> Self {
        Self { spawn_delay }
    }
}

/// Progress of the wave schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// No wave has been started yet.
    Pending,
    /// Enemies of the wave are still waiting to be released.
    Spawning {
        /// Wave currently being released.
        wave: WaveIndex,
        /// Number of enemies of the wave spawned so far.
        spawned: usize,
    },
    /// Every enemy of the wave is on the lane; waiting for it to clear.
    Active {
        /// Wave currently in play.
        wave: WaveIndex,
    },
    /// The final wave has been cleared.
    Complete,
}

/// Pure system that walks the wave plan and emits spawn commands.
#[derive(Debug)]
pub struct Spawning {
    plan: WavePlan,
    spawn_delay: Duration,
    last_spawn: Duration,
    phase: WavePhase,
}

impl Spawning {
    /// Creates a new spawning system for `plan` using the supplied configuration.
    #[must_use]
    pub fn new(plan: WavePlan, config: Config) -> Self {
        Self {
            plan,
            spawn_delay: config.spawn_delay,
            last_spawn: Duration::ZERO,
            phase: WavePhase::Pending,
        }
    }

    /// Current progress through the wave plan.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Reports whether the final wave has been cleared.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == WavePhase::Complete
    }

    /// Number of waves in the plan.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.plan.len()
    }

    /// Starts the first wave, spawning its first enemy immediately.
    ///
    /// Does nothing once the schedule has left the pending phase.
    pub fn start(&mut self, now: Duration, out: &mut Vec<Command>, out_events: &mut Vec<Event>) {
        if self.phase != WavePhase::Pending {
            return;
        }

        if self.plan.is_empty() {
            self.phase = WavePhase::Complete;
            out_events.push(Event::AllWavesComplete);
            return;
        }

        self.begin_wave(WaveIndex::new(0), now, out, out_events);
    }

    /// Consumes the tick's events and releases at most one pending enemy.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let Some(now) = latest_clock(events) else {
            return;
        };

        let WavePhase::Spawning { wave, spawned } = self.phase else {
            return;
        };

        if now.saturating_sub(self.last_spawn) > self.spawn_delay {
            self.spawn_next(wave, spawned, now, out);
        }
    }

    /// Advances the schedule once the active wave is fully spawned and no
    /// enemies remain alive.
    ///
    /// Starting the next wave spawns its first enemy immediately.
    pub fn check_progress(
        &mut self,
        now: Duration,
        live_enemies: usize,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        let WavePhase::Active { wave } = self.phase else {
            return;
        };

        if live_enemies > 0 {
            return;
        }

        out_events.push(Event::WaveCleared { wave });
        let next = wave.next();
        if (next.get() as usize) < self.plan.len() {
            self.begin_wave(next, now, out, out_events);
        } else {
            self.phase = WavePhase::Complete;
            out_events.push(Event::AllWavesComplete);
        }
    }

    fn begin_wave(
        &mut self,
        wave: WaveIndex,
        now: Duration,
        out: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        out_events.push(Event::WaveStarted { wave });
        self.spawn_next(wave, 0, now, out);
    }

    fn spawn_next(
        &mut self,
        wave: WaveIndex,
        spawned: usize,
        now: Duration,
        out: &mut Vec<Command>,
    ) {
        let Some(specs) = self.plan.wave(wave) else {
            self.phase = WavePhase::Active { wave };
            return;
        };

        if let Some(spec) = specs.get(spawned) {
            out.push(Command::SpawnEnemy {
                wave,
                spec: spec.clone(),
            });
            self.last_spawn = now;
        }

        let spawned = spawned + 1;
        self.phase = if spawned >= specs.len() {
            WavePhase::Active { wave }
        } else {
            WavePhase::Spawning { wave, spawned }
        };
    }
}

fn latest_clock(events: &[Event]) -> Option<Duration> {
    events.iter().rev().find_map(|event| match event {
        Event::TimeAdvanced { now, .. } => Some(*now),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan_completes_on_start() {
        let mut spawning = Spawning::new(
            WavePlan::new(Vec::new()),
            Config::new(Duration::from_secs(1)),
        );
        let mut commands = Vec::new();
        let mut events = Vec::new();
        spawning.start(Duration::ZERO, &mut commands, &mut events);

        assert!(commands.is_empty());
        assert_eq!(events, vec![Event::AllWavesComplete]);
        assert!(spawning.is_complete());
    }

    #[test]
    fn ignores_ticks_without_clock_events() {
        assert_eq!(latest_clock(&[Event::LevelFailed]), None);
    }
}
