//! Notifications emitted by the generator system.
//!
//! Everything the host renders, plays, broadcasts or logs on behalf of a
//! generator arrives as a [`GeneratorEvent`]. Events are fire-and-forget:
//! nothing in the system waits on a reply.

use riftworks_core::event::Classify;
use riftworks_core::id::{EffectHandle, GeneratorId, GridId};
use riftworks_spatial::{LocalPosition, PlacementOutcome};
use serde::{Deserialize, Serialize};

use crate::ui::GeneratorUiState;

/// Events emitted by [`GeneratorSystem`](crate::generator::GeneratorSystem).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratorEvent {
    /// Fresh UI state for the generator's control panel.
    UiStateChanged {
        generator: GeneratorId,
        state: GeneratorUiState,
    },
    /// Start a looping effect; stop it when the matching `EffectStopped`
    /// arrives.
    EffectStarted {
        generator: GeneratorId,
        effect: EffectHandle,
        sound: String,
    },
    EffectStopped {
        generator: GeneratorId,
        effect: EffectHandle,
    },
    /// The generating visual flag changed.
    VisualChanged {
        generator: GeneratorId,
        generating: bool,
    },
    /// Play a one-shot sound at the generator.
    CuePlayed {
        generator: GeneratorId,
        sound: String,
    },
    /// Radio message on a named channel.
    Broadcast {
        generator: GeneratorId,
        channel: String,
        message: String,
    },
    /// Admin audit log record.
    Audit {
        generator: GeneratorId,
        message: String,
    },
    /// Announcement shown to admins only.
    AdminAnnouncement { message: String },
    /// Materialize `prototype` at `position` on `grid`.
    SpawnRequested {
        generator: GeneratorId,
        prototype: String,
        grid: GridId,
        position: LocalPosition,
        outcome: PlacementOutcome,
    },
    /// Ambient hum follows the power state.
    AmbienceChanged {
        generator: GeneratorId,
        enabled: bool,
    },
}

/// Discriminant of [`GeneratorEvent`], used for subscription and suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneratorEventKind {
    UiStateChanged,
    EffectStarted,
    EffectStopped,
    VisualChanged,
    CuePlayed,
    Broadcast,
    Audit,
    AdminAnnouncement,
    SpawnRequested,
    AmbienceChanged,
}

impl Classify for GeneratorEvent {
    type Kind = GeneratorEventKind;

    fn kind(&self) -> GeneratorEventKind {
        match self {
            GeneratorEvent::UiStateChanged { .. } => GeneratorEventKind::UiStateChanged,
            GeneratorEvent::EffectStarted { .. } => GeneratorEventKind::EffectStarted,
            GeneratorEvent::EffectStopped { .. } => GeneratorEventKind::EffectStopped,
            GeneratorEvent::VisualChanged { .. } => GeneratorEventKind::VisualChanged,
            GeneratorEvent::CuePlayed { .. } => GeneratorEventKind::CuePlayed,
            GeneratorEvent::Broadcast { .. } => GeneratorEventKind::Broadcast,
            GeneratorEvent::Audit { .. } => GeneratorEventKind::Audit,
            GeneratorEvent::AdminAnnouncement { .. } => GeneratorEventKind::AdminAnnouncement,
            GeneratorEvent::SpawnRequested { .. } => GeneratorEventKind::SpawnRequested,
            GeneratorEvent::AmbienceChanged { .. } => GeneratorEventKind::AmbienceChanged,
        }
    }
}

impl GeneratorEvent {
    /// The generator this event concerns, if any.
    pub fn generator(&self) -> Option<GeneratorId> {
        match self {
            GeneratorEvent::UiStateChanged { generator, .. }
            | GeneratorEvent::EffectStarted { generator, .. }
            | GeneratorEvent::EffectStopped { generator, .. }
            | GeneratorEvent::VisualChanged { generator, .. }
            | GeneratorEvent::CuePlayed { generator, .. }
            | GeneratorEvent::Broadcast { generator, .. }
            | GeneratorEvent::Audit { generator, .. }
            | GeneratorEvent::SpawnRequested { generator, .. }
            | GeneratorEvent::AmbienceChanged { generator, .. } => Some(*generator),
            GeneratorEvent::AdminAnnouncement { .. } => None,
        }
    }
}
