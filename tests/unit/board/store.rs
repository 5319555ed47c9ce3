use super::*;
use crate::foundation::core::rect_at;

const GREEN: Rgb = Rgb::new(0.0, 1.0, 0.0);

fn store_with(names: &[&str]) -> CellStore {
    let mut store = CellStore::with_capacity(CellStore::capacity_for(names.len()));
    for (i, name) in names.iter().enumerate() {
        let rect = rect_at(i as f64 * 10.0, 0.0, 2.0, 2.0);
        store
            .insert(Cell::new(*name, rect, false, false, GREEN))
            .unwrap();
    }
    store
}

#[test]
fn insert_rejects_duplicate_names() {
    let mut store = store_with(&["A"]);
    let err = store
        .insert(Cell::new("A", rect_at(0.0, 0.0, 1.0, 1.0), false, false, GREEN))
        .unwrap_err();
    assert!(matches!(err, ReplayError::DuplicateName(n) if n == "A"));
    assert_eq!(store.len(), 1);
    store.check_invariants().unwrap();
}

#[test]
fn unknown_names_are_reported() {
    let mut store = store_with(&["A"]);
    assert!(matches!(store.get("Z"), Err(ReplayError::UnknownName(_))));
    assert!(matches!(store.remove("Z"), Err(ReplayError::UnknownName(_))));
    assert!(matches!(
        store.move_to("Z", Point::ORIGIN),
        Err(ReplayError::UnknownName(_))
    ));
    assert!(matches!(
        store.restyle("Z", GREEN, Layer::Cell),
        Err(ReplayError::UnknownName(_))
    ));
}

#[test]
fn remove_swaps_last_slot_into_the_hole() {
    let mut store = store_with(&["A", "B", "C", "D"]);
    let removed = store.remove("B").unwrap();
    assert_eq!(removed.slot(), None);
    assert_eq!(store.len(), 3);
    assert_eq!(store.buffer().active_count(), 3);
    assert_eq!(store.name_at(1), Some("D"));
    assert_eq!(store.get("D").unwrap().slot(), Some(1));
    store.check_invariants().unwrap();
}

#[test]
fn remove_last_slot_and_double_remove() {
    let mut store = store_with(&["A", "B"]);
    store.remove("B").unwrap();
    store.check_invariants().unwrap();
    assert!(matches!(store.remove("B"), Err(ReplayError::UnknownName(_))));
    store.remove("A").unwrap();
    assert!(store.is_empty());
    assert!(store.buffer().is_empty());
    store.check_invariants().unwrap();
}

#[test]
fn failed_remove_leaves_tables_untouched() {
    let mut store = store_with(&["A", "B", "C"]);
    store.cells.get_mut("A").unwrap().slot = Some(7);

    let err = store.remove("A").unwrap_err();
    assert!(matches!(err, ReplayError::Invariant(_)), "{err}");
    assert!(store.contains("A"));
    assert_eq!(store.len(), 3);
    assert_eq!(store.buffer().active_count(), 3);
    assert_eq!(store.name_at(2), Some("C"));

    store.cells.get_mut("A").unwrap().slot = Some(0);
    store.check_invariants().unwrap();
    store.remove("A").unwrap();
    store.check_invariants().unwrap();
}

#[test]
fn move_to_updates_cell_and_slot() {
    let mut store = store_with(&["A", "B"]);
    let r = store.move_to("A", Point::new(3.0, 4.0)).unwrap();
    assert_eq!(r, rect_at(3.0, 4.0, 2.0, 2.0));
    assert_eq!(store.get("A").unwrap().rect, r);
    assert_eq!(store.buffer().slot_rect(0).unwrap(), r);
    store.check_invariants().unwrap();
}

#[test]
fn restyle_updates_color_and_depth() {
    let mut store = store_with(&["A"]);
    let red = Rgb::new(1.0, 0.0, 0.0);
    store.restyle("A", red, Layer::Conflict).unwrap();
    let a = store.get("A").unwrap();
    assert_eq!(a.color, red);
    assert_eq!(a.layer, Layer::Conflict);
    assert_eq!(store.buffer().slot_z(0).unwrap(), Layer::Conflict.z());
    store.check_invariants().unwrap();
}

#[test]
fn capacity_includes_slack() {
    assert_eq!(CellStore::capacity_for(5), 5 + CAPACITY_SLACK);
    let mut store = CellStore::with_capacity(1);
    store
        .insert(Cell::new("A", rect_at(0.0, 0.0, 1.0, 1.0), false, false, GREEN))
        .unwrap();
    let err = store
        .insert(Cell::new("B", rect_at(0.0, 0.0, 1.0, 1.0), false, false, GREEN))
        .unwrap_err();
    assert!(matches!(err, ReplayError::BufferFull { .. }));
    assert!(!store.contains("B"));
    store.check_invariants().unwrap();
}

#[test]
fn overlap_is_strict_and_symmetric() {
    let a = rect_at(0.0, 0.0, 2.0, 2.0);
    let inside = rect_at(1.0, 1.0, 2.0, 2.0);
    let edge = rect_at(2.0, 0.0, 2.0, 2.0);
    let corner = rect_at(2.0, 2.0, 1.0, 1.0);
    let far = rect_at(5.0, 5.0, 1.0, 1.0);

    assert!(overlaps(&a, &inside));
    assert!(overlaps(&inside, &a));
    assert!(!overlaps(&a, &edge));
    assert!(!overlaps(&edge, &a));
    assert!(!overlaps(&a, &corner));
    assert!(!overlaps(&a, &far));
    assert!(overlaps(&a, &a));
}

#[test]
fn snapshot_lists_resident_cells() {
    let mut store = store_with(&["A", "B", "C"]);
    store.remove("A").unwrap();
    let snap = store.geometry_snapshot();
    assert_eq!(
        snap.keys().cloned().collect::<Vec<_>>(),
        vec!["B".to_string(), "C".to_string()]
    );
}
