//! Transition scheduling: duration clamping, overlap extension and curves.

use tracing::{debug, info, warn};

use super::models::{Curve, TimedClip, TransitionEnvelope, TransitionSpec};
use crate::core::captions::CaptionGroup;
use crate::core::render::RenderedCaption;
use crate::core::{TimeSec, TIME_EPSILON};

/// Computes on-screen windows and animation curves for a caption sequence
#[derive(Clone, Debug, Default)]
pub struct TransitionEngine {
    spec: TransitionSpec,
}

impl TransitionEngine {
    pub fn new(spec: TransitionSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &TransitionSpec {
        &self.spec
    }

    /// Computes one envelope per group, in order.
    ///
    /// Groups are expected in chronological order; each window only looks at
    /// the next group's raw start.
    pub fn envelopes(&self, groups: &[CaptionGroup]) -> Vec<TransitionEnvelope> {
        let mut yielded = 0usize;
        let envelopes: Vec<_> = groups
            .iter()
            .enumerate()
            .map(|(k, group)| {
                let next_start = groups.get(k + 1).map(|next| next.start);
                let (clamped_end, min_enforced) = self.clamp_end(group, next_start);
                if !min_enforced {
                    yielded += 1;
                }
                let effective_end = self.extend_end(clamped_end, next_start);
                let envelope = self.build_envelope(group.start, clamped_end, effective_end);
                debug!(
                    "Clip {} {:?}: [{:.3}, {:.3}] -> [{:.3}, {:.3}]",
                    k, group.text, group.start, group.end, envelope.effective_start, envelope.effective_end
                );
                envelope
            })
            .collect();

        info!(
            "Scheduled {} captions with {} transitions ({} kept short to avoid collisions)",
            envelopes.len(),
            self.spec.style,
            yielded
        );
        envelopes
    }

    /// Attaches envelopes to rendered captions
    pub fn apply(&self, rendered: Vec<RenderedCaption>) -> Vec<TimedClip> {
        let groups: Vec<CaptionGroup> = rendered.iter().map(|r| r.group.clone()).collect();
        let envelopes = self.envelopes(&groups);

        rendered
            .into_iter()
            .zip(envelopes)
            .enumerate()
            .map(|(index, (rendered, envelope))| TimedClip {
                index,
                rendered,
                envelope,
            })
            .collect()
    }

    /// Clamps the raw window to [min, max] duration.
    ///
    /// The start never moves. A short clip is stretched to the minimum only
    /// when that would not run into the next clip by more than the overlap;
    /// otherwise it keeps its raw end. Returns the end and whether the
    /// minimum was honored.
    fn clamp_end(&self, group: &CaptionGroup, next_start: Option<TimeSec>) -> (TimeSec, bool) {
        let spec = &self.spec;
        let start = group.start;
        let duration = group.end - start;

        if duration > spec.max_caption_duration {
            return (start + spec.max_caption_duration, true);
        }
        if duration >= spec.min_caption_duration {
            return (group.end, true);
        }

        let desired = start + spec.min_caption_duration;
        match next_start {
            Some(next) if desired - next > spec.overlap_duration + TIME_EPSILON => {
                warn!(
                    "Caption {:?} stays at {:.3}s, next caption starts at {:.3}s",
                    group.text, duration, next
                );
                (group.end, false)
            }
            _ => (desired, true),
        }
    }

    /// Overlap-style extension, capped so a clip never lingers more than
    /// the overlap past the next clip's start.
    fn extend_end(&self, clamped_end: TimeSec, next_start: Option<TimeSec>) -> TimeSec {
        if !self.spec.style.overlaps() {
            return clamped_end;
        }
        let overlap = self.spec.overlap_duration;
        let extended = clamped_end + overlap;
        match next_start {
            Some(next) => extended.min(next + overlap).max(clamped_end),
            None => extended,
        }
    }

    fn build_envelope(
        &self,
        start: TimeSec,
        clamped_end: TimeSec,
        end: TimeSec,
    ) -> TransitionEnvelope {
        let spec = &self.spec;
        let style = spec.style;
        let window = (end - start).max(0.0);
        let ramp = spec.fade_duration.min(window / 2.0);

        let ramped = |edge: f64, rest: f64| {
            Curve::from_points(&[
                (start, edge),
                (start + ramp, rest),
                (end - ramp, rest),
                (end, edge),
            ])
        };

        let opacity_curve = if style.fades() {
            ramped(0.0, 1.0)
        } else {
            Curve::constant(start, end, 1.0)
        };

        let position_curve = if style.slides() {
            let d = spec.slide_distance;
            Curve::from_points(&[
                (start, d),
                (start + ramp, 0.0),
                (end - ramp, 0.0),
                (end, -d),
            ])
        } else {
            Curve::constant(start, end, 0.0)
        };

        let scale_curve = if style.scales() {
            ramped(1.0 - (spec.scale_factor - 1.0), 1.0)
        } else {
            Curve::constant(start, end, 1.0)
        };

        TransitionEnvelope {
            effective_start: start,
            clamped_end,
            effective_end: end,
            ramp,
            opacity_curve,
            position_curve,
            scale_curve,
        }
    }
}
