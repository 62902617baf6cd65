//! Anomaly generator lifecycle and its per-tick driver.
//!
//! A generator is either [`Idle`](GeneratorPhase::Idle) or
//! [`Producing`](GeneratorPhase::Producing). A start request moves it to
//! Producing when it is powered, off cooldown, and can pay its material
//! cost. The driver ([`GeneratorSystem::on_tick`]) completes every run whose
//! end time has passed: it picks a spawn tile on the station grid, requests
//! the spawn, and returns the generator to Idle.
//!
//! All timers are absolute tick stamps. Pauses are compensated by shifting
//! them forward once per [`Unpaused`] report.

use riftworks_core::clock::{Clock, Unpaused};
use riftworks_core::event::EventBus;
use riftworks_core::fixed::{DEFAULT_TICKS_PER_SECOND, Ticks, seconds_to_ticks};
use riftworks_core::id::{EffectHandle, GeneratorId};
use riftworks_core::rng::RandomSource;
use riftworks_spatial::{PlacementSettings, find_placement_on_grid};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::env::{GeneratorEnv, GridLocator, MaterialStorage};
use crate::event::GeneratorEvent;
use crate::ui::GeneratorUiState;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Static configuration of one generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSpec {
    /// Material consumed to start a production run.
    pub required_material: String,
    pub material_per_production: u32,
    /// Ticks from start to completion.
    pub generation_length: Ticks,
    /// Ticks from start until the next run may begin.
    pub cooldown_length: Ticks,
    /// Prototype spawned on completion.
    pub spawner_prototype: String,
    /// Radio channel the completion announcement goes out on.
    pub broadcast_channel: String,
    pub announcement: String,
    /// Looping sound while producing.
    pub generating_sound: String,
    /// One-shot sound on completion.
    pub finished_sound: String,
}

impl Default for GeneratorSpec {
    fn default() -> Self {
        Self {
            required_material: "Plasma".to_string(),
            material_per_production: 1500,
            generation_length: seconds_to_ticks(8.0, DEFAULT_TICKS_PER_SECOND),
            cooldown_length: seconds_to_ticks(300.0, DEFAULT_TICKS_PER_SECOND),
            spawner_prototype: "RandomAnomalySpawner".to_string(),
            broadcast_channel: "Science".to_string(),
            announcement: "The anomaly generator has finished generating.".to_string(),
            generating_sound: "anomaly_generate".to_string(),
            finished_sound: "anomaly_generate_finished".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Generator state
// ---------------------------------------------------------------------------

/// Lifecycle phase of a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorPhase {
    Idle,
    Producing {
        /// Tick at or after which the run completes.
        end_time: Ticks,
        /// Looping effect started for this run.
        effect: EffectHandle,
    },
}

/// One generator's configuration and lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generator {
    spec: GeneratorSpec,
    phase: GeneratorPhase,
    cooldown_end: Ticks,
    /// Sequence of the last pause report applied.
    last_unpause: u64,
}

impl Generator {
    fn new(spec: GeneratorSpec) -> Self {
        Self {
            spec,
            phase: GeneratorPhase::Idle,
            cooldown_end: 0,
            last_unpause: 0,
        }
    }

    pub fn spec(&self) -> &GeneratorSpec {
        &self.spec
    }

    pub fn phase(&self) -> GeneratorPhase {
        self.phase
    }

    pub fn cooldown_end(&self) -> Ticks {
        self.cooldown_end
    }

    /// End of the current run, if producing.
    pub fn end_time(&self) -> Option<Ticks> {
        match self.phase {
            GeneratorPhase::Producing { end_time, .. } => Some(end_time),
            GeneratorPhase::Idle => None,
        }
    }

    pub fn is_producing(&self) -> bool {
        matches!(self.phase, GeneratorPhase::Producing { .. })
    }

    fn is_due(&self, now: Ticks) -> bool {
        self.end_time().is_some_and(|end| now >= end)
    }

    fn ui_state(&self, id: GeneratorId, materials: &dyn MaterialStorage) -> GeneratorUiState {
        GeneratorUiState {
            cooldown_end: self.cooldown_end,
            material_amount: materials.amount(id, &self.spec.required_material),
            material_per_production: self.spec.material_per_production,
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratorSystem
// ---------------------------------------------------------------------------

/// Owns every generator on the station and drives their lifecycles.
///
/// The clock and random source are injected at construction so hosts and
/// tests control time and placement draws.
#[derive(Debug)]
pub struct GeneratorSystem<C: Clock, R: RandomSource> {
    clock: C,
    rng: R,
    generators: SlotMap<GeneratorId, Generator>,
    events: EventBus<GeneratorEvent>,
    placement: PlacementSettings,
    next_effect: u64,
}

impl<C: Clock, R: RandomSource> GeneratorSystem<C, R> {
    pub fn new(clock: C, rng: R) -> Self {
        Self {
            clock,
            rng,
            generators: SlotMap::with_key(),
            events: EventBus::new(),
            placement: PlacementSettings::default(),
            next_effect: 0,
        }
    }

    pub fn with_placement(mut self, placement: PlacementSettings) -> Self {
        self.placement = placement;
        self
    }

    pub fn placement(&self) -> &PlacementSettings {
        &self.placement
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // -- Registry --

    /// Register a generator. It starts Idle and off cooldown.
    pub fn add_generator(&mut self, spec: GeneratorSpec) -> GeneratorId {
        let id = self.generators.insert(Generator::new(spec));
        tracing::debug!(generator = ?id, "generator added");
        id
    }

    /// Drop a generator. A run in progress ends without completing; its
    /// looping effect is stopped.
    pub fn remove_generator(&mut self, id: GeneratorId) -> Option<Generator> {
        let generator = self.generators.remove(id)?;
        if let GeneratorPhase::Producing { effect, .. } = generator.phase {
            self.events.emit(GeneratorEvent::EffectStopped {
                generator: id,
                effect,
            });
        }
        Some(generator)
    }

    pub fn generator(&self, id: GeneratorId) -> Option<&Generator> {
        self.generators.get(id)
    }

    pub fn generators(&self) -> impl Iterator<Item = (GeneratorId, &Generator)> {
        self.generators.iter()
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    // -- Events --

    pub fn events(&self) -> &EventBus<GeneratorEvent> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus<GeneratorEvent> {
        &mut self.events
    }

    /// Deliver pending events to subscribers and return them.
    pub fn deliver_events(&mut self) -> Vec<GeneratorEvent> {
        self.events.deliver()
    }

    // -- Lifecycle --

    /// Try to begin a production run. Returns false, changing nothing, if
    /// the generator is unknown, already producing, unpowered, on cooldown,
    /// or cannot pay its material cost.
    pub fn try_start(&mut self, id: GeneratorId, env: &mut GeneratorEnv<'_>) -> bool {
        let now = self.clock.now();
        let Some(generator) = self.generators.get_mut(id) else {
            tracing::debug!(generator = ?id, "start refused: unknown generator");
            return false;
        };
        if generator.is_producing() {
            tracing::debug!(generator = ?id, "start refused: already producing");
            return false;
        }
        if !env.power.is_powered(id) {
            tracing::debug!(generator = ?id, "start refused: unpowered");
            return false;
        }
        if now < generator.cooldown_end {
            tracing::debug!(generator = ?id, now, cooldown_end = generator.cooldown_end, "start refused: cooling down");
            return false;
        }
        let cost = -i64::from(generator.spec.material_per_production);
        if !env.materials.try_change_amount(id, &generator.spec.required_material, cost) {
            tracing::debug!(generator = ?id, material = %generator.spec.required_material, "start refused: not enough material");
            return false;
        }

        let effect = EffectHandle(self.next_effect);
        self.next_effect += 1;
        generator.phase = GeneratorPhase::Producing {
            end_time: now.saturating_add(generator.spec.generation_length),
            effect,
        };
        generator.cooldown_end = now.saturating_add(generator.spec.cooldown_length);

        self.events.emit(GeneratorEvent::EffectStarted {
            generator: id,
            effect,
            sound: generator.spec.generating_sound.clone(),
        });
        self.events.emit(GeneratorEvent::VisualChanged {
            generator: id,
            generating: true,
        });
        self.events.emit(GeneratorEvent::UiStateChanged {
            generator: id,
            state: generator.ui_state(id, &*env.materials),
        });
        tracing::debug!(generator = ?id, now, "production started");
        true
    }

    /// Complete every run whose end time has passed. Returns the generators
    /// that completed this tick, in no particular order.
    pub fn on_tick(&mut self, grids: &dyn GridLocator) -> Vec<GeneratorId> {
        let now = self.clock.now();
        let due: Vec<GeneratorId> = self
            .generators
            .iter()
            .filter(|(_, generator)| generator.is_due(now))
            .map(|(id, _)| id)
            .collect();

        due.into_iter()
            .filter(|&id| self.complete(id, grids))
            .collect()
    }

    /// Finish a run: stop the effect, place and request the spawn, and
    /// announce it. A generator with no spawn grid stays Producing and is
    /// retried next tick.
    fn complete(&mut self, id: GeneratorId, grids: &dyn GridLocator) -> bool {
        let Some(generator) = self.generators.get_mut(id) else {
            return false;
        };
        let GeneratorPhase::Producing { effect, .. } = generator.phase else {
            return false;
        };
        let Some((grid_id, grid)) = grids.spawn_grid(id) else {
            tracing::warn!(generator = ?id, "no spawn grid, deferring completion");
            return false;
        };

        generator.phase = GeneratorPhase::Idle;
        let spec = &generator.spec;
        self.events.emit(GeneratorEvent::EffectStopped {
            generator: id,
            effect,
        });

        let outcome = find_placement_on_grid(grid, &self.placement, &mut self.rng);
        let position = outcome.position();
        let message = format!("Anomaly {} was spawned at {}.", spec.spawner_prototype, position);
        tracing::info!(generator = ?id, fallback = outcome.is_fallback(), attempts = outcome.attempts(), "{message}");

        self.events.emit(GeneratorEvent::Audit {
            generator: id,
            message: message.clone(),
        });
        self.events.emit(GeneratorEvent::AdminAnnouncement { message });
        self.events.emit(GeneratorEvent::SpawnRequested {
            generator: id,
            prototype: spec.spawner_prototype.clone(),
            grid: grid_id,
            position,
            outcome,
        });
        self.events.emit(GeneratorEvent::VisualChanged {
            generator: id,
            generating: false,
        });
        self.events.emit(GeneratorEvent::CuePlayed {
            generator: id,
            sound: spec.finished_sound.clone(),
        });
        self.events.emit(GeneratorEvent::Broadcast {
            generator: id,
            channel: spec.broadcast_channel.clone(),
            message: spec.announcement.clone(),
        });
        true
    }

    // -- Pause --

    /// Shift a generator's timers forward by the paused duration. Each
    /// report sequence is applied at most once; returns false if ignored.
    pub fn on_unpaused(&mut self, id: GeneratorId, report: Unpaused) -> bool {
        let Some(generator) = self.generators.get_mut(id) else {
            return false;
        };
        if report.sequence <= generator.last_unpause {
            tracing::debug!(generator = ?id, sequence = report.sequence, "pause report already applied");
            return false;
        }
        generator.last_unpause = report.sequence;
        generator.cooldown_end = generator.cooldown_end.saturating_add(report.paused_for);
        if let GeneratorPhase::Producing { end_time, .. } = &mut generator.phase {
            *end_time = end_time.saturating_add(report.paused_for);
        }
        true
    }

    /// Apply a station-wide pause report to every generator.
    pub fn on_unpaused_all(&mut self, report: Unpaused) {
        let ids: Vec<GeneratorId> = self.generators.keys().collect();
        for id in ids {
            self.on_unpaused(id, report);
        }
    }

    // -- Glue --

    /// Ambient hum follows power.
    pub fn on_power_changed(&mut self, id: GeneratorId, powered: bool) {
        if self.generators.contains_key(id) {
            self.events.emit(GeneratorEvent::AmbienceChanged {
                generator: id,
                enabled: powered,
            });
        }
    }

    pub fn on_material_changed(&mut self, id: GeneratorId, materials: &dyn MaterialStorage) {
        self.push_ui_state(id, materials);
    }

    pub fn on_ui_opened(&mut self, id: GeneratorId, materials: &dyn MaterialStorage) {
        self.push_ui_state(id, materials);
    }

    /// Current UI snapshot for a generator.
    pub fn ui_state(&self, id: GeneratorId, materials: &dyn MaterialStorage) -> Option<GeneratorUiState> {
        self.generators
            .get(id)
            .map(|generator| generator.ui_state(id, materials))
    }

    fn push_ui_state(&mut self, id: GeneratorId, materials: &dyn MaterialStorage) {
        if let Some(state) = self.ui_state(id, materials) {
            self.events.emit(GeneratorEvent::UiStateChanged { generator: id, state });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MaterialStore, StationGrids};
    use crate::event::GeneratorEventKind;
    use riftworks_core::clock::{ManualClock, PauseTracker};
    use riftworks_core::event::Classify;
    use riftworks_core::rng::SimRng;
    use riftworks_core::test_utils::*;
    use riftworks_spatial::{GridPosition, LocalPosition, Occupant, TileGrid, TileRect};
    use slotmap::SecondaryMap;

    const START: Ticks = 1_000;

    fn test_spec() -> GeneratorSpec {
        GeneratorSpec {
            required_material: "plasma".to_string(),
            material_per_production: 100,
            generation_length: 50,
            cooldown_length: 200,
            ..GeneratorSpec::default()
        }
    }

    struct Fixture {
        clock: ManualClock,
        system: GeneratorSystem<ManualClock, SimRng>,
        materials: SecondaryMap<GeneratorId, MaterialStore>,
        grids: StationGrids,
        powered: bool,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = clock_at(START);
            let mut grids = StationGrids::new();
            grids.add_station_grid(TileGrid::filled(TileRect::new(-4, -4, 4, 4)));
            Self {
                system: GeneratorSystem::new(clock.clone(), seeded_rng()),
                clock,
                materials: SecondaryMap::new(),
                grids,
                powered: true,
            }
        }

        fn add(&mut self, spec: GeneratorSpec, plasma: u32) -> GeneratorId {
            let id = self.system.add_generator(spec);
            let mut store = MaterialStore::new();
            store.try_change_amount("plasma", i64::from(plasma));
            self.materials.insert(id, store);
            id
        }

        fn plasma(&self, id: GeneratorId) -> u32 {
            MaterialStorage::amount(&self.materials, id, "plasma")
        }

        fn try_start(&mut self, id: GeneratorId) -> bool {
            let powered = self.powered;
            let power = move |_: GeneratorId| powered;
            let mut env = GeneratorEnv {
                materials: &mut self.materials,
                power: &power,
                grids: &self.grids,
            };
            self.system.try_start(id, &mut env)
        }

        fn tick(&mut self) -> Vec<GeneratorId> {
            self.system.on_tick(&self.grids)
        }

        fn kinds(&mut self) -> Vec<GeneratorEventKind> {
            self.system.deliver_events().iter().map(|e| e.kind()).collect()
        }
    }

    // -- Starting --

    #[test]
    fn start_consumes_material_and_sets_timers() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 250);

        assert!(fx.try_start(id));
        let generator = fx.system.generator(id).unwrap();
        assert_eq!(generator.end_time(), Some(START + 50));
        assert_eq!(generator.cooldown_end(), START + 200);
        assert_eq!(fx.plasma(id), 150);
        assert_eq!(
            fx.kinds(),
            vec![
                GeneratorEventKind::EffectStarted,
                GeneratorEventKind::VisualChanged,
                GeneratorEventKind::UiStateChanged,
            ]
        );
    }

    #[test]
    fn start_pushes_post_deduction_ui_state() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 250);
        fx.try_start(id);
        let ui = fx.system.deliver_events().into_iter().find_map(|e| match e {
            GeneratorEvent::UiStateChanged { state, .. } => Some(state),
            _ => None,
        });
        assert_eq!(
            ui,
            Some(GeneratorUiState {
                cooldown_end: START + 200,
                material_amount: 150,
                material_per_production: 100,
            })
        );
    }

    #[test]
    fn insufficient_material_leaves_state_unchanged() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 99);
        let before = fx.system.generator(id).unwrap().clone();

        assert!(!fx.try_start(id));
        assert_eq!(fx.system.generator(id), Some(&before));
        assert_eq!(fx.plasma(id), 99);
        assert!(fx.kinds().is_empty());
    }

    #[test]
    fn unpowered_generator_does_not_start() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 500);
        fx.powered = false;
        assert!(!fx.try_start(id));
        assert_eq!(fx.plasma(id), 500);
        assert_eq!(fx.system.generator(id).unwrap().phase(), GeneratorPhase::Idle);
    }

    #[test]
    fn second_start_before_cooldown_is_refused() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 500);
        assert!(fx.try_start(id));
        assert!(!fx.try_start(id));
        assert_eq!(fx.plasma(id), 400);

        // Completed but still cooling down.
        fx.clock.advance(60);
        fx.tick();
        assert!(!fx.try_start(id));

        fx.clock.set(START + 200);
        assert!(fx.try_start(id));
        assert_eq!(fx.plasma(id), 300);
    }

    #[test]
    fn start_while_producing_is_refused_even_off_cooldown() {
        let mut fx = Fixture::new();
        let spec = GeneratorSpec {
            generation_length: 500,
            cooldown_length: 10,
            ..test_spec()
        };
        let id = fx.add(spec, 500);
        assert!(fx.try_start(id));
        fx.clock.advance(20);
        assert!(!fx.try_start(id));
        assert_eq!(fx.plasma(id), 400);
    }

    #[test]
    fn unknown_generator_does_not_start() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 500);
        fx.system.remove_generator(id);
        assert!(!fx.try_start(id));
    }

    #[test]
    fn effect_handles_are_unique_per_run() {
        let mut fx = Fixture::new();
        let a = fx.add(test_spec(), 500);
        let b = fx.add(test_spec(), 500);
        fx.try_start(a);
        fx.try_start(b);
        let effect = |id| match fx.system.generator(id).unwrap().phase() {
            GeneratorPhase::Producing { effect, .. } => effect,
            GeneratorPhase::Idle => panic!("not producing"),
        };
        assert_ne!(effect(a), effect(b));
    }

    // -- Completion --

    #[test]
    fn run_completes_at_end_time() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 500);
        fx.try_start(id);
        fx.kinds();

        fx.clock.advance(49);
        assert!(fx.tick().is_empty());
        assert!(fx.system.generator(id).unwrap().is_producing());

        fx.clock.advance(1);
        assert_eq!(fx.tick(), vec![id]);
        assert_eq!(fx.system.generator(id).unwrap().phase(), GeneratorPhase::Idle);
        assert_eq!(
            fx.kinds(),
            vec![
                GeneratorEventKind::EffectStopped,
                GeneratorEventKind::Audit,
                GeneratorEventKind::AdminAnnouncement,
                GeneratorEventKind::SpawnRequested,
                GeneratorEventKind::VisualChanged,
                GeneratorEventKind::CuePlayed,
                GeneratorEventKind::Broadcast,
            ]
        );

        // Idle generators are not completed again.
        fx.clock.advance(100);
        assert!(fx.tick().is_empty());
    }

    #[test]
    fn completion_spawns_inside_station_grid_and_stops_same_effect() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 500);
        fx.try_start(id);
        let GeneratorPhase::Producing { effect, .. } = fx.system.generator(id).unwrap().phase() else {
            panic!("not producing");
        };
        fx.system.deliver_events();
        fx.clock.advance(50);
        fx.tick();

        let events = fx.system.deliver_events();
        assert!(events.contains(&GeneratorEvent::EffectStopped { generator: id, effect }));
        let spawn = events.iter().find_map(|e| match e {
            GeneratorEvent::SpawnRequested { outcome, prototype, .. } => Some((*outcome, prototype.clone())),
            _ => None,
        });
        let (outcome, prototype) = spawn.unwrap();
        assert_eq!(prototype, "RandomAnomalySpawner");
        let tile = outcome.tile().unwrap();
        assert!(TileRect::new(-4, -4, 4, 4).contains(tile));
        assert!(events.contains(&GeneratorEvent::Broadcast {
            generator: id,
            channel: "Science".to_string(),
            message: "The anomaly generator has finished generating.".to_string(),
        }));
    }

    #[test]
    fn audit_names_prototype_and_position_even_on_fallback() {
        let mut fx = Fixture::new();
        // Replace the station with a fully walled grid.
        let rect = TileRect::new(0, 0, 2, 2);
        let origin = LocalPosition::new(fixed(5.5), fixed(-3.25));
        let mut walled = TileGrid::filled(rect).with_origin(origin);
        for tile in rect.tiles() {
            walled.anchor(tile, Occupant::wall()).unwrap();
        }
        fx.grids = StationGrids::new();
        fx.grids.add_station_grid(walled);

        let id = fx.add(test_spec(), 500);
        fx.try_start(id);
        fx.system.deliver_events();
        fx.clock.advance(50);
        fx.tick();

        let events = fx.system.deliver_events();
        let audit = events.iter().find_map(|e| match e {
            GeneratorEvent::Audit { message, .. } => Some(message.clone()),
            _ => None,
        });
        assert_eq!(audit.as_deref(), Some("Anomaly RandomAnomalySpawner was spawned at (5.5, -3.25)."));
        assert!(events.iter().any(|e| matches!(
            e,
            GeneratorEvent::SpawnRequested { position, outcome, .. }
                if *position == origin && outcome.is_fallback()
        )));
    }

    #[test]
    fn missing_spawn_grid_defers_completion() {
        let mut fx = Fixture::new();
        fx.grids = StationGrids::new();
        let id = fx.add(test_spec(), 500);
        fx.try_start(id);
        fx.system.deliver_events();
        fx.clock.advance(50);

        assert!(fx.tick().is_empty());
        assert!(fx.system.generator(id).unwrap().is_producing());
        assert!(fx.kinds().is_empty());

        // The generator's own grid becomes available.
        let own = fx.grids.add_grid(TileGrid::filled(TileRect::new(0, 0, 3, 3)));
        fx.grids.place_generator(id, own);
        assert_eq!(fx.tick(), vec![id]);
    }

    #[test]
    fn removed_generator_is_skipped_without_completion() {
        let mut fx = Fixture::new();
        let keep = fx.add(test_spec(), 500);
        let gone = fx.add(test_spec(), 500);
        fx.try_start(keep);
        fx.try_start(gone);
        fx.system.deliver_events();

        let removed = fx.system.remove_generator(gone).unwrap();
        assert!(removed.is_producing());
        assert_eq!(fx.kinds(), vec![GeneratorEventKind::EffectStopped]);

        fx.clock.advance(50);
        assert_eq!(fx.tick(), vec![keep]);
        let events = fx.system.deliver_events();
        assert!(events.iter().all(|e| e.generator() != Some(gone)));
    }

    #[test]
    fn simultaneous_expiries_all_complete() {
        let mut fx = Fixture::new();
        let ids: Vec<_> = (0..4).map(|_| fx.add(test_spec(), 500)).collect();
        for &id in &ids {
            fx.try_start(id);
        }
        fx.clock.advance(50);
        let mut done = fx.tick();
        done.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(done, expected);
    }

    // -- Pause compensation --

    #[test]
    fn pause_shifts_end_time_and_cooldown() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 500);
        fx.try_start(id);

        let mut tracker = PauseTracker::new();
        fx.clock.advance(10);
        tracker.pause(fx.clock.now());
        fx.clock.advance(100);
        let report = tracker.resume(fx.clock.now()).unwrap();
        assert!(fx.system.on_unpaused(id, report));

        let generator = fx.system.generator(id).unwrap();
        assert_eq!(generator.end_time(), Some(START + 150));
        assert_eq!(generator.cooldown_end(), START + 300);

        // Shifted start is START + 100; duration is 50.
        fx.clock.set(START + 100 + 49);
        assert!(fx.tick().is_empty());
        fx.clock.set(START + 100 + 50);
        assert_eq!(fx.tick(), vec![id]);
    }

    #[test]
    fn pause_report_is_applied_once() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 500);
        fx.try_start(id);
        let report = Unpaused {
            sequence: 1,
            paused_for: 30,
        };
        assert!(fx.system.on_unpaused(id, report));
        assert!(!fx.system.on_unpaused(id, report));
        assert_eq!(fx.system.generator(id).unwrap().end_time(), Some(START + 80));

        let stale = Unpaused {
            sequence: 0,
            paused_for: 30,
        };
        assert!(!fx.system.on_unpaused(id, stale));
    }

    #[test]
    fn idle_pause_shifts_only_cooldown() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 500);
        fx.try_start(id);
        fx.clock.advance(50);
        fx.tick();
        fx.system.on_unpaused_all(Unpaused {
            sequence: 1,
            paused_for: 40,
        });
        let generator = fx.system.generator(id).unwrap();
        assert_eq!(generator.end_time(), None);
        assert_eq!(generator.cooldown_end(), START + 240);
    }

    // -- Glue --

    #[test]
    fn power_change_toggles_ambience() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 0);
        fx.system.on_power_changed(id, false);
        assert_eq!(
            fx.system.deliver_events(),
            vec![GeneratorEvent::AmbienceChanged {
                generator: id,
                enabled: false,
            }]
        );
    }

    #[test]
    fn material_change_and_ui_open_push_state() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 40);
        fx.system.on_material_changed(id, &fx.materials);
        fx.system.on_ui_opened(id, &fx.materials);
        let expected = GeneratorUiState {
            cooldown_end: 0,
            material_amount: 40,
            material_per_production: 100,
        };
        assert_eq!(
            fx.system.deliver_events(),
            vec![
                GeneratorEvent::UiStateChanged {
                    generator: id,
                    state: expected,
                };
                2
            ]
        );
        assert_eq!(fx.system.ui_state(id, &fx.materials), Some(expected));
    }

    #[test]
    fn ui_state_of_unknown_generator_is_none() {
        let mut fx = Fixture::new();
        let id = fx.add(test_spec(), 40);
        fx.system.remove_generator(id);
        assert_eq!(fx.system.ui_state(id, &fx.materials), None);
    }

    #[test]
    fn suppressed_visuals_are_not_delivered() {
        let mut fx = Fixture::new();
        fx.system.events_mut().suppress(GeneratorEventKind::VisualChanged);
        let id = fx.add(test_spec(), 500);
        fx.try_start(id);
        assert!(!fx.kinds().contains(&GeneratorEventKind::VisualChanged));
    }

    #[test]
    fn placement_settings_flow_into_search() {
        let clock = clock_at(0);
        let settings = PlacementSettings {
            max_attempts: 1,
            ..PlacementSettings::default()
        };
        let mut system = GeneratorSystem::new(clock.clone(), ScriptedRng::tiles(&[(1, 1)])).with_placement(settings);
        let mut materials: SecondaryMap<GeneratorId, MaterialStore> = SecondaryMap::new();
        let mut grids = StationGrids::new();
        let mut grid = TileGrid::filled(TileRect::new(0, 0, 3, 3));
        grid.anchor(GridPosition::new(1, 1), Occupant::wall()).unwrap();
        grids.add_station_grid(grid);

        let id = system.add_generator(test_spec());
        let mut store = MaterialStore::new();
        store.try_change_amount("plasma", 100);
        materials.insert(id, store);

        let power = |_: GeneratorId| true;
        let mut env = GeneratorEnv {
            materials: &mut materials,
            power: &power,
            grids: &grids,
        };
        assert!(system.try_start(id, &mut env));
        clock.advance(50);
        system.on_tick(&grids);

        let outcome = system.deliver_events().into_iter().find_map(|e| match e {
            GeneratorEvent::SpawnRequested { outcome, .. } => Some(outcome),
            _ => None,
        });
        assert_eq!(outcome.map(|o| o.attempts()), Some(1));
        assert!(outcome.unwrap().is_fallback());
    }
}
