//! Pen tool path construction: anchors, handles, live preview.

use crate::shapes::{Path, PathSeg};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pressing this close to the first anchor closes the path.
pub const CLOSE_TOLERANCE: f64 = 8.0;

/// Anchor classification: corners join segments sharply, smooth anchors
/// carry symmetric bezier handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorKind {
    Corner,
    Smooth,
}

/// A single on-curve point with optional incoming/outgoing handles,
/// stored as offsets from the anchor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub point: Point,
    pub handle_in: Option<Vec2>,
    pub handle_out: Option<Vec2>,
    pub kind: AnchorKind,
}

impl AnchorPoint {
    pub fn corner(point: Point) -> Self {
        Self {
            point,
            handle_in: None,
            handle_out: None,
            kind: AnchorKind::Corner,
        }
    }
}

/// Outcome of a pen press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenPress {
    /// First anchor placed, drawing started.
    Started,
    /// Another anchor appended.
    Added,
    /// The press landed on the first anchor: the caller should finalize
    /// the path closed.
    CloseRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PenState {
    #[default]
    Idle,
    Drawing,
}

/// Incremental path builder driven by pointer events.
#[derive(Debug, Default)]
pub struct PenBuilder {
    state: PenState,
    anchors: Vec<AnchorPoint>,
    hover: Option<Point>,
}

impl PenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.state == PenState::Drawing
    }

    pub fn anchors(&self) -> &[AnchorPoint] {
        &self.anchors
    }

    /// Place an anchor. Pressing on the first anchor (with enough
    /// anchors down) requests a closed finalize instead.
    pub fn press(&mut self, point: Point) -> PenPress {
        if self.state == PenState::Idle {
            self.state = PenState::Drawing;
            self.anchors.push(AnchorPoint::corner(point));
            return PenPress::Started;
        }
        if self.anchors.len() >= 2
            && let Some(first) = self.anchors.first()
            && first.point.distance(point) <= CLOSE_TOLERANCE
        {
            return PenPress::CloseRequested;
        }
        self.anchors.push(AnchorPoint::corner(point));
        PenPress::Added
    }

    /// Drag out symmetric handles from the most recent anchor, turning
    /// it smooth. The outgoing handle follows the pointer; the incoming
    /// handle mirrors it.
    pub fn drag_handle(&mut self, point: Point) {
        if let Some(anchor) = self.anchors.last_mut() {
            let out = point - anchor.point;
            anchor.handle_out = Some(out);
            anchor.handle_in = Some(-out);
            anchor.kind = AnchorKind::Smooth;
        }
    }

    /// Track the pointer for the live preview segment.
    pub fn hover(&mut self, point: Point) {
        if self.state == PenState::Drawing {
            self.hover = Some(point);
        }
    }

    /// The segment from the last anchor to the hovered point, for
    /// rendering the rubber preview. None when idle or before any move.
    pub fn preview_segment(&self) -> Option<(Point, PathSeg)> {
        let anchor = self.anchors.last()?;
        let target = self.hover?;
        let seg = match anchor.handle_out {
            Some(out) => PathSeg::Cubic {
                c1: anchor.point + out,
                c2: target,
                to: target,
            },
            None => PathSeg::Line { to: target },
        };
        Some((anchor.point, seg))
    }

    /// Finish the path. Needs at least two anchors; consecutive anchors
    /// are joined by a cubic only when both facing handles exist,
    /// otherwise a straight segment. Closing appends the segment back to
    /// the first anchor and marks the path closed. Resets to idle.
    pub fn finalize(&mut self, closed: bool) -> Option<Path> {
        if self.anchors.len() < 2 {
            self.cancel();
            return None;
        }
        let anchors = std::mem::take(&mut self.anchors);
        self.state = PenState::Idle;
        self.hover = None;

        let mut segments = Vec::with_capacity(anchors.len());
        for pair in anchors.windows(2) {
            segments.push(join(&pair[0], &pair[1]));
        }
        if closed {
            let last = anchors.len() - 1;
            segments.push(join(&anchors[last], &anchors[0]));
        }
        Some(Path::new(anchors[0].point, segments, closed))
    }

    /// Abandon the path in progress.
    pub fn cancel(&mut self) {
        self.state = PenState::Idle;
        self.anchors.clear();
        self.hover = None;
    }
}

fn join(a: &AnchorPoint, b: &AnchorPoint) -> PathSeg {
    match (a.handle_out, b.handle_in) {
        (Some(out), Some(into)) => PathSeg::Cubic {
            c1: a.point + out,
            c2: b.point + into,
            to: b.point,
        },
        _ => PathSeg::Line { to: b.point },
    }
}
