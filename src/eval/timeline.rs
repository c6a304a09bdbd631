use crate::foundation::core::{FrameIndex, Point};
use crate::schema::validate::{MotionSegment, ResolvedObject, ValidScene};

/// Where an object is at one instant. Everything except the position is borrowed from the
/// validated object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderableState<'a> {
    pub object: &'a ResolvedObject,
    pub position: Point,
}

/// Interpolated state of `obj` at `t_secs`.
///
/// Pure in `(obj, t_secs)`: frames can be evaluated in any order, or concurrently, and always
/// reproduce the same bits. Before a segment starts the object holds its previous position;
/// once a segment ends it sits exactly on the segment's target.
pub fn state_at(obj: &ResolvedObject, t_secs: f64) -> RenderableState<'_> {
    let mut position = obj.position;
    for seg in &obj.motion {
        if t_secs < seg.start_secs {
            break;
        }
        position = segment_position(seg, t_secs);
    }
    RenderableState {
        object: obj,
        position,
    }
}

fn segment_position(seg: &MotionSegment, t_secs: f64) -> Point {
    // Clamped to nothing at the scene end: the target holds from its start.
    if seg.duration_secs <= 0.0 {
        return seg.to;
    }
    let p = ((t_secs - seg.start_secs) / seg.duration_secs).clamp(0.0, 1.0);
    if p >= 1.0 {
        return seg.to;
    }
    // Interpolate in eased-progress space, not in time.
    seg.from.lerp(seg.to, seg.ease.apply(p))
}

/// States of every object at `t_secs`, in paint order.
pub fn states_at(scene: &ValidScene, t_secs: f64) -> Vec<RenderableState<'_>> {
    scene
        .objects()
        .iter()
        .map(|obj| state_at(obj, t_secs))
        .collect()
}

/// States for a frame index (`t = index / fps`).
pub fn states_at_frame(scene: &ValidScene, frame: FrameIndex) -> Vec<RenderableState<'_>> {
    states_at(scene, frame.to_secs(scene.fps()))
}
