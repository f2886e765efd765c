//! Alignment and distribution of selected objects.

use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::shapes::ShapeId;
use kurbo::{Affine, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// How a set of objects is aligned or distributed relative to the union
/// of their bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignMode {
    Left,
    Right,
    Top,
    Bottom,
    CenterH,
    CenterV,
    DistributeH,
    DistributeV,
}

/// Align or distribute the given top-level objects in place. Needs at
/// least two participants; the reference frame is the union of their
/// bounds, so the extremes stay put and the rest move.
pub fn align_shapes(document: &mut Document, ids: &[ShapeId], mode: AlignMode) -> EditorResult<()> {
    if ids.len() < 2 {
        return Err(EditorError::InvalidOperation(
            "alignment needs at least two objects",
        ));
    }
    let entries: Vec<(ShapeId, Rect)> = ids
        .iter()
        .filter_map(|&id| document.get_shape(id).map(|s| (id, s.bounds())))
        .collect();
    if entries.len() < 2 {
        return Err(EditorError::InvalidOperation(
            "alignment needs at least two objects",
        ));
    }
    let union = entries
        .iter()
        .skip(1)
        .fold(entries[0].1, |r, (_, b)| r.union(*b));

    match mode {
        AlignMode::DistributeH => distribute(document, entries, union, Axis::Horizontal),
        AlignMode::DistributeV => distribute(document, entries, union, Axis::Vertical),
        _ => {
            for (id, bounds) in entries {
                let delta = match mode {
                    AlignMode::Left => Vec2::new(union.x0 - bounds.x0, 0.0),
                    AlignMode::Right => Vec2::new(union.x1 - bounds.x1, 0.0),
                    AlignMode::Top => Vec2::new(0.0, union.y0 - bounds.y0),
                    AlignMode::Bottom => Vec2::new(0.0, union.y1 - bounds.y1),
                    AlignMode::CenterH => {
                        Vec2::new(union.center().x - bounds.center().x, 0.0)
                    }
                    AlignMode::CenterV => {
                        Vec2::new(0.0, union.center().y - bounds.center().y)
                    }
                    AlignMode::DistributeH | AlignMode::DistributeV => unreachable!(),
                };
                translate(document, id, delta);
            }
            Ok(())
        }
    }
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Equal-gap distribution: the first and last objects along the axis
/// stay fixed, the interior ones are laid out so every gap between
/// consecutive bounds is identical. Gaps may go negative when the
/// objects overflow the span.
fn distribute(
    document: &mut Document,
    mut entries: Vec<(ShapeId, Rect)>,
    union: Rect,
    axis: Axis,
) -> EditorResult<()> {
    let (span, size): (f64, fn(&Rect) -> f64) = match axis {
        Axis::Horizontal => (union.width(), |r| r.width()),
        Axis::Vertical => (union.height(), |r| r.height()),
    };
    entries.sort_by(|a, b| {
        let (ka, kb) = match axis {
            Axis::Horizontal => (a.1.x0, b.1.x0),
            Axis::Vertical => (a.1.y0, b.1.y0),
        };
        ka.total_cmp(&kb)
    });
    let total: f64 = entries.iter().map(|(_, b)| size(b)).sum();
    let gap = (span - total) / (entries.len() - 1) as f64;

    let mut cursor = match axis {
        Axis::Horizontal => union.x0,
        Axis::Vertical => union.y0,
    };
    for (id, bounds) in entries {
        let delta = match axis {
            Axis::Horizontal => Vec2::new(cursor - bounds.x0, 0.0),
            Axis::Vertical => Vec2::new(0.0, cursor - bounds.y0),
        };
        translate(document, id, delta);
        cursor += size(&bounds) + gap;
    }
    Ok(())
}

fn translate(document: &mut Document, id: ShapeId, delta: Vec2) {
    if delta.hypot2() < f64::EPSILON {
        return;
    }
    if let Some(shape) = document.get_shape_mut(id) {
        shape.transform(Affine::translate(delta));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Shape};
    use kurbo::Point;

    fn doc_with_rects(rects: &[(f64, f64, f64, f64)]) -> (Document, Vec<ShapeId>) {
        let mut doc = Document::new(800.0, 600.0);
        let ids = rects
            .iter()
            .map(|&(x, y, w, h)| {
                doc.add_shape(Shape::Rectangle(Rectangle::new(Point::new(x, y), w, h)))
            })
            .collect();
        (doc, ids)
    }

    #[test]
    fn test_align_left_snaps_to_union_edge() {
        let (mut doc, ids) =
            doc_with_rects(&[(10.0, 0.0, 20.0, 20.0), (30.0, 40.0, 20.0, 20.0), (50.0, 80.0, 20.0, 20.0)]);
        align_shapes(&mut doc, &ids, AlignMode::Left).unwrap();
        for id in &ids {
            assert!((doc.get_shape(*id).unwrap().bounds().x0 - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_align_bottom() {
        let (mut doc, ids) = doc_with_rects(&[(0.0, 0.0, 10.0, 10.0), (20.0, 50.0, 10.0, 30.0)]);
        align_shapes(&mut doc, &ids, AlignMode::Bottom).unwrap();
        for id in &ids {
            assert!((doc.get_shape(*id).unwrap().bounds().y1 - 80.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_align_center_h() {
        let (mut doc, ids) = doc_with_rects(&[(0.0, 0.0, 20.0, 10.0), (80.0, 20.0, 20.0, 10.0)]);
        align_shapes(&mut doc, &ids, AlignMode::CenterH).unwrap();
        for id in &ids {
            assert!((doc.get_shape(*id).unwrap().bounds().center().x - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distribute_h_equal_gaps() {
        // Union spans 0..100; sizes 10+10+10 leave 70, so gaps of 35
        let (mut doc, ids) = doc_with_rects(&[
            (0.0, 0.0, 10.0, 10.0),
            (20.0, 0.0, 10.0, 10.0),
            (90.0, 0.0, 10.0, 10.0),
        ]);
        align_shapes(&mut doc, &ids, AlignMode::DistributeH).unwrap();
        let xs: Vec<f64> = ids
            .iter()
            .map(|id| doc.get_shape(*id).unwrap().bounds().x0)
            .collect();
        assert!((xs[0] - 0.0).abs() < 1e-9);
        assert!((xs[1] - 45.0).abs() < 1e-9);
        assert!((xs[2] - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribute_extremes_stay_fixed() {
        let (mut doc, ids) = doc_with_rects(&[
            (0.0, 0.0, 10.0, 10.0),
            (12.0, 0.0, 10.0, 10.0),
            (30.0, 0.0, 10.0, 10.0),
            (200.0, 0.0, 10.0, 10.0),
        ]);
        align_shapes(&mut doc, &ids, AlignMode::DistributeH).unwrap();
        assert!((doc.get_shape(ids[0]).unwrap().bounds().x0 - 0.0).abs() < 1e-9);
        assert!((doc.get_shape(ids[3]).unwrap().bounds().x0 - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_object_is_invalid() {
        let (mut doc, ids) = doc_with_rects(&[(0.0, 0.0, 10.0, 10.0)]);
        let err = align_shapes(&mut doc, &ids, AlignMode::Left).unwrap_err();
        assert!(matches!(err, EditorError::InvalidOperation(_)));
    }
}
