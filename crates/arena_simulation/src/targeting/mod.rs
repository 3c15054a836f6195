//! Targeting module
//!
//! ECS ответственность:
//! - detector: TargetCandidates (range triggers + fallback scan)
//! - selector: CurrentTarget (sticky) + nearest-enemy политика + idle objective
//! - strategic: StrategicTargetRegistry (bounded FIFO objectives)

use bevy::prelude::*;

pub mod detector;
pub mod selector;
pub mod strategic;

// Re-export основных типов
pub use detector::{Detector, ForceRefreshTarget, RangeEvent, RangeTracking, TargetCandidates};
pub use selector::{nearest_enemy, select_current_target, CurrentTarget, NearestCandidate};
pub use strategic::{Objective, StrategicTargetRegistry};

use crate::schedule::{SimulationSet, SimulationTick, TickEventsAppExt};

/// Targeting Plugin
///
/// Порядок внутри тика:
/// 1. Detection: sync радиуса → poll триггеров → RangeEvent → prune
/// 2. Selection: sticky выбор → fallback scan (только без цели) → movement objective
/// 3. Lifecycle: погибшие strategic entity уходят из registry
pub struct TargetingPlugin;

impl Plugin for TargetingPlugin {
    fn build(&self, app: &mut App) {
        app.add_tick_event::<RangeEvent>()
            .add_tick_event::<ForceRefreshTarget>()
            .init_resource::<RangeTracking>();

        app.add_systems(
            SimulationTick,
            (
                (
                    detector::sync_detection_radius,
                    detector::poll_detection_ranges,
                    detector::apply_range_events,
                    detector::prune_candidates,
                )
                    .chain()
                    .in_set(SimulationSet::Detection),
                (
                    selector::select_targets,
                    detector::fallback_target_scan,
                    selector::update_movement_objectives,
                )
                    .chain()
                    .in_set(SimulationSet::Selection),
                strategic::forget_dead_objectives.in_set(SimulationSet::Lifecycle),
            ),
        );
    }
}
