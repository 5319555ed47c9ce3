use super::*;
use crate::foundation::core::rect_at;

fn cell(name: &str, x: f64, y: f64, merged: bool) -> Cell {
    Cell::new(
        name,
        rect_at(x, y, 2.0, 2.0),
        false,
        merged,
        Rgb::new(0.0, 1.0, 0.0),
    )
}

fn filled(n: usize) -> (GeometryBuffer, Vec<Cell>) {
    let mut buf = GeometryBuffer::with_capacity(n + 1);
    let mut cells = Vec::new();
    for i in 0..n {
        let mut c = cell(&format!("c{i}"), i as f64 * 3.0, 0.0, false);
        buf.push(&mut c).unwrap();
        cells.push(c);
    }
    (buf, cells)
}

#[test]
fn push_assigns_consecutive_slots_and_writes_outline() {
    let (buf, cells) = filled(3);
    assert_eq!(buf.active_count(), 3);
    for (i, c) in cells.iter().enumerate() {
        assert_eq!(c.slot(), Some(i));
        assert_eq!(buf.slot_rect(i).unwrap(), c.rect);
        assert_eq!(buf.slot_color(i).unwrap(), c.color);
    }

    let view = buf.view();
    let segs: Vec<_> = view.segments(0).collect();
    assert_eq!(segs.len(), 4);
    assert_eq!(segs[0], (Point::new(0.0, 0.0), Point::new(2.0, 0.0)));
    assert_eq!(segs[3], (Point::new(0.0, 2.0), Point::new(0.0, 0.0)));
}

#[test]
fn push_past_capacity_is_buffer_full() {
    let mut buf = GeometryBuffer::with_capacity(1);
    buf.push(&mut cell("a", 0.0, 0.0, false)).unwrap();
    let err = buf.push(&mut cell("b", 0.0, 0.0, false)).unwrap_err();
    assert!(matches!(err, ReplayError::BufferFull { capacity: 1 }));
    assert_eq!(buf.active_count(), 1);
}

#[test]
fn merged_cells_recede_behind_normal_cells() {
    let mut buf = GeometryBuffer::with_capacity(2);
    let mut normal = cell("n", 0.0, 0.0, false);
    let mut merged = cell("m", 0.0, 0.0, true);
    buf.push(&mut normal).unwrap();
    buf.push(&mut merged).unwrap();
    assert_eq!(merged.layer, Layer::Merged);
    assert!(buf.slot_z(1).unwrap() > buf.slot_z(0).unwrap());
    assert_eq!(buf.view().paint_order(), vec![1, 0]);
}

#[test]
fn swap_same_index_is_noop() {
    let (mut buf, _) = filled(3);
    let before = buf.view().vertices.to_vec();
    buf.swap(1, 1).unwrap();
    assert_eq!(buf.view().vertices, before.as_slice());
}

#[test]
fn swap_twice_restores_contents() {
    let (mut buf, cells) = filled(4);
    let verts = buf.view().vertices.to_vec();
    let colors = buf.view().colors.to_vec();

    buf.swap(0, 3).unwrap();
    assert_eq!(buf.slot_rect(0).unwrap(), cells[3].rect);
    assert_eq!(buf.slot_rect(3).unwrap(), cells[0].rect);

    buf.swap(0, 3).unwrap();
    assert_eq!(buf.view().vertices, verts.as_slice());
    assert_eq!(buf.view().colors, colors.as_slice());
}

#[test]
fn swap_and_pop_reject_bad_indices() {
    let (mut buf, _) = filled(2);
    assert!(matches!(buf.swap(0, 2), Err(ReplayError::Invariant(_))));

    let mut empty = GeometryBuffer::with_capacity(2);
    assert!(matches!(empty.pop(), Err(ReplayError::Invariant(_))));
}

#[test]
fn set_position_and_color_rewrite_in_place() {
    let (mut buf, mut cells) = filled(2);
    cells[1].rect = rect_at(10.0, 20.0, 2.0, 2.0);
    cells[1].color = Rgb::new(1.0, 0.0, 0.0);
    buf.set_position(&cells[1], -0.7).unwrap();
    buf.set_color(&cells[1]).unwrap();

    assert_eq!(buf.active_count(), 2);
    assert_eq!(buf.slot_rect(1).unwrap(), cells[1].rect);
    assert_eq!(buf.slot_z(1).unwrap(), -0.7);
    assert_eq!(buf.slot_color(1).unwrap(), Rgb::new(1.0, 0.0, 0.0));
    assert_eq!(buf.slot_rect(0).unwrap(), cells[0].rect);
}

#[test]
fn set_position_requires_resident_cell() {
    let mut buf = GeometryBuffer::with_capacity(2);
    let c = cell("loose", 0.0, 0.0, false);
    assert!(matches!(
        buf.set_position(&c, 0.0),
        Err(ReplayError::Invariant(_))
    ));
}

#[test]
fn flush_counts_uploads_and_exposes_live_slots_only() {
    let (mut buf, _) = filled(3);
    buf.pop().unwrap();
    buf.set_highlight(Some(rect_at(0.0, 0.0, 1.0, 1.0)));
    let view = buf.flush();
    assert_eq!(view.active, 2);
    assert_eq!(view.vertices.len(), 2 * SLOT_STRIDE);
    assert_eq!(view.colors.len(), 2 * SLOT_STRIDE);
    assert!(view.highlight.is_some());
    assert_eq!(buf.uploads(), 1);
}
