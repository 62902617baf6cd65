use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies an anomaly generator attached to the station.
    pub struct GeneratorId;

    /// Identifies a grid (the spatial container a generator lives on).
    pub struct GridId;
}

/// Opaque handle to a looping effect (audio stream, particle emitter) that
/// the host started on behalf of a generator. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectHandle(pub u64);
