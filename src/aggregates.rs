//! Run-wide accumulators for the driver loop.

use crate::activity::Activity;
use crate::detect::Emotion;
use std::collections::HashSet;

/// Accumulated results for one whole video run.
///
/// Created at run start, mutated once per frame by the driver, consumed
/// exactly once by the summary at run end. Activities are recorded on their
/// first occurrence only; the ordered list and the seen-set are kept in sync
/// by the single mutator.
#[derive(Debug, Default)]
pub struct RunAggregates {
    activities: Vec<Activity>,
    seen: HashSet<Activity>,
    emotions: Vec<Emotion>,
    anomaly_count: u64,
    total_frames: u64,
}

impl RunAggregates {
    /// Create empty aggregates
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an activity if it has not been seen this run.
    ///
    /// Returns `true` when the activity was newly recorded, which is the
    /// caller's cue to draw the first-occurrence overlay.
    pub fn record_activity(&mut self, activity: Activity) -> bool {
        if self.seen.insert(activity) {
            self.activities.push(activity);
            true
        } else {
            false
        }
    }

    /// Append the emotions accepted for one frame
    pub fn record_emotions(&mut self, emotions: &[Emotion]) {
        self.emotions.extend_from_slice(emotions);
    }

    /// Count one anomalous frame
    pub fn record_anomaly(&mut self) {
        self.anomaly_count += 1;
    }

    /// Count one analyzed frame
    pub fn record_frame(&mut self) {
        self.total_frames += 1;
    }

    /// First-seen activities, in order of first occurrence
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// All accepted emotions, across all frames
    pub fn emotions(&self) -> &[Emotion] {
        &self.emotions
    }

    /// Number of anomalous frames
    pub fn anomaly_count(&self) -> u64 {
        self.anomaly_count
    }

    /// Number of frames analyzed
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}
