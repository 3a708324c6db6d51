// Copyright © arrakis 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use agents::provider::AgentProvider;
use data::core::primitives::Phase;
use data::events::GameEvent;
use data::game_states::game_state::{GameState, Victory};
use enum_map::EnumMap;
use enumset::EnumSet;
use tracing::{debug, info, instrument, warn};
use utils::outcome::Value;
use utils::verify;

use crate::handler::{PhaseHandler, StepResult};
use crate::phases;

/// Maximum handler steps per phase before the manager declares the phase
/// stuck. Guards against ill-formed responses producing endless re-prompts.
pub const DEFAULT_STEP_CAP: usize = 100;

/// Options for [PhaseManager::run].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// When set, only these phases execute; others are skipped.
    pub only_phases: Option<EnumSet<Phase>>,
    /// Stop after this phase completes, leaving the game unfinished.
    pub stop_after: Option<Phase>,
    /// Assume the state is already set up and skip the setup phase.
    pub skip_setup: bool,
}

/// Terminal result of [PhaseManager::run].
#[derive(Debug)]
pub struct GameResult {
    pub state: GameState,
    /// Every event emitted over the run, in emission order.
    pub events: Vec<GameEvent>,
    pub winner: Option<Victory>,
}

type EventListener = Box<dyn FnMut(&GameEvent) + Send>;

/// Drives the outer loop: registers phase handlers, steps each phase's
/// sub-machine to completion, mediates all agent I/O, and emits events.
pub struct PhaseManager {
    handlers: EnumMap<Phase, Option<Box<dyn PhaseHandler>>>,
    provider: Box<dyn AgentProvider>,
    listeners: Vec<EventListener>,
    step_cap: usize,
    cancelled: Arc<AtomicBool>,
    event_log: Vec<GameEvent>,
}

impl PhaseManager {
    /// Creates a manager with every standard phase handler registered.
    pub fn new(provider: Box<dyn AgentProvider>) -> Self {
        let mut manager = Self {
            handlers: EnumMap::default(),
            provider,
            listeners: vec![],
            step_cap: DEFAULT_STEP_CAP,
            cancelled: Arc::new(AtomicBool::new(false)),
            event_log: vec![],
        };
        for handler in phases::standard_handlers() {
            manager.register(handler);
        }
        manager
    }

    /// Creates a manager with no handlers registered; every phase is
    /// skipped until handlers are added.
    pub fn empty(provider: Box<dyn AgentProvider>) -> Self {
        Self {
            handlers: EnumMap::default(),
            provider,
            listeners: vec![],
            step_cap: DEFAULT_STEP_CAP,
            cancelled: Arc::new(AtomicBool::new(false)),
            event_log: vec![],
        }
    }

    pub fn register(&mut self, handler: Box<dyn PhaseHandler>) {
        let phase = handler.phase();
        self.handlers[phase] = Some(handler);
    }

    /// Adds an event listener. Listeners are fixed before the run begins.
    pub fn with_listener(mut self, listener: impl FnMut(&GameEvent) + Send + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    /// A flag which, when set, stops the run after the current step.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Runs the game to termination: a victory, the turn limit, or
    /// cancellation.
    #[instrument(skip_all)]
    pub fn run(&mut self, mut state: GameState, options: RunOptions) -> Value<GameResult> {
        self.event_log.clear();

        if state.winner.is_none() && !state.setup_complete && !options.skip_setup {
            state = self.run_phase_checked(state, Phase::Setup, &options)?;
            if options.stop_after == Some(Phase::Setup) {
                return Ok(self.finish(state));
            }
        }

        'turns: while state.winner.is_none() && !self.is_cancelled() {
            let turn = state.turn;
            self.emit(&mut state, GameEvent::TurnStarted { turn });
            for phase in Phase::turn_phases() {
                if state.winner.is_some() || self.is_cancelled() {
                    break 'turns;
                }
                state = self.run_phase_checked(state, phase, &options)?;
                if options.stop_after == Some(phase) {
                    return Ok(self.finish(state));
                }
            }
            let turn = state.turn;
            self.emit(&mut state, GameEvent::TurnEnded { turn });

            if state.winner.is_some() {
                break;
            }
            if state.turn >= state.config.max_turns {
                let victory = rules::queries::victory::turn_limit_victory(&state);
                info!(?victory, "Turn limit reached");
                self.emit(&mut state, GameEvent::VictoryAchieved { victory: victory.clone() });
                state.winner = Some(victory);
                break;
            }
            state.turn += 1;
        }

        if let Some(victory) = &state.winner {
            let victory = victory.clone();
            debug!(?victory, "Game over");
        }
        let turn = state.turn;
        self.emit(&mut state, GameEvent::GameEnded { turn });
        Ok(self.finish(state))
    }

    /// Runs a single phase to completion.
    ///
    /// A no-op when the game already has a winner.
    #[instrument(skip(self, state))]
    pub fn run_phase(&mut self, state: GameState, phase: Phase) -> Value<GameState> {
        if state.winner.is_some() {
            return Ok(state);
        }
        let Some(handler) = self.handlers[phase].take() else {
            let mut state = state;
            let turn = state.turn;
            self.emit(&mut state, GameEvent::PhaseSkipped { phase, turn });
            return Ok(state);
        };
        let result = self.drive(handler.as_ref(), state, phase);
        self.handlers[phase] = Some(handler);
        result
    }

    fn run_phase_checked(
        &mut self,
        state: GameState,
        phase: Phase,
        options: &RunOptions,
    ) -> Value<GameState> {
        if let Some(only) = &options.only_phases {
            if !only.contains(phase) {
                let mut state = state;
                let turn = state.turn;
                self.emit(&mut state, GameEvent::PhaseSkipped { phase, turn });
                return Ok(state);
            }
        }
        self.run_phase(state, phase)
    }

    fn drive(
        &mut self,
        handler: &dyn PhaseHandler,
        mut state: GameState,
        phase: Phase,
    ) -> Value<GameState> {
        state.phase = phase;
        self.apply_ornithopter_overrides(&mut state);
        let turn = state.turn;
        self.emit(&mut state, GameEvent::PhaseStarted { phase, turn });

        let mut result = handler.initialize(state)?;
        self.emit_step(&mut result);
        self.check_invariants(&result.state)?;

        let mut steps = 0;
        while !result.phase_complete {
            steps += 1;
            verify!(
                steps <= self.step_cap,
                "Phase {phase} exceeded the step cap of {} steps",
                self.step_cap
            );

            let responses = if result.pending_requests.is_empty() {
                vec![]
            } else {
                self.provider.update_state(&result.state);
                self.provider
                    .get_responses(&result.pending_requests, result.simultaneous)?
            };

            result = handler.process_step(result.state, &responses)?;
            self.emit_step(&mut result);
            self.check_invariants(&result.state)?;
        }

        if let Some(next) = result.next_phase {
            debug!(?next, "Handler overrode the next phase");
        }
        let mut state = handler.cleanup(result.state)?;
        state.phase_state = data::game_states::phase_state::PhaseState::Idle;
        let turn = state.turn;
        self.emit(&mut state, GameEvent::PhaseEnded { phase, turn });
        Ok(state)
    }

    /// Checks engine invariants; a violation is surfaced as an [GameEvent::Error]
    /// and then propagated, halting the game.
    fn check_invariants(&mut self, state: &GameState) -> Value<()> {
        if let Err(report) = rules::invariants::check(state) {
            let event = GameEvent::Error { message: format!("{report:#}") };
            self.dispatch(&event);
            self.event_log.push(event);
            return Err(report);
        }
        Ok(())
    }

    fn apply_ornithopter_overrides(&mut self, state: &mut GameState) {
        let ids: Vec<_> = state.factions.ids().collect();
        for faction in ids {
            let Some(access) = self.provider.ornithopter_access_override(faction) else {
                continue;
            };
            match state
                .ornithopter_overrides
                .iter_mut()
                .find(|(f, _)| *f == faction)
            {
                Some(entry) => entry.1 = access,
                None => state.ornithopter_overrides.push((faction, access)),
            }
        }
    }

    fn emit_step(&mut self, result: &mut StepResult) {
        let events = std::mem::take(&mut result.events);
        for event in events {
            self.dispatch(&event);
            if let GameEvent::Error { message } = &event {
                warn!(%message, "Handler reported an error event");
            }
            self.event_log.push(event);
        }
    }

    fn emit(&mut self, _state: &mut GameState, event: GameEvent) {
        self.dispatch(&event);
        self.event_log.push(event);
    }

    fn dispatch(&mut self, event: &GameEvent) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn finish(&mut self, state: GameState) -> GameResult {
        let winner = state.winner.clone();
        GameResult { state, events: std::mem::take(&mut self.event_log), winner }
    }
}

/// Convenience entry point: runs a full game with the standard handlers.
pub fn run_game(
    state: GameState,
    provider: Box<dyn AgentProvider>,
    options: RunOptions,
) -> Value<GameResult> {
    PhaseManager::new(provider).run(state, options)
}
