use super::*;
use crate::foundation::core::rect_at;

fn cell(name: &str, x: f64) -> CellRecord {
    CellRecord {
        name: name.to_string(),
        x,
        y: 0.0,
        width: 2.0,
        height: 2.0,
        fixed: false,
    }
}

fn layout(names: &[&str]) -> InitialLayout {
    let cells = names
        .iter()
        .enumerate()
        .map(|(i, n)| cell(n, i as f64 * 5.0))
        .collect();
    InitialLayout::new(Rect::new(0.0, 0.0, 100.0, 10.0), cells)
}

fn merge(inputs: &[&str], output: &str) -> MergeOp {
    MergeOp {
        inputs: inputs.iter().map(|s| s.to_string()).collect(),
        output: output.to_string(),
        x: 0.0,
        y: 0.0,
        width: 2.0,
        height: 2.0,
    }
}

fn mv(name: &str, x: f64) -> Displacement {
    Displacement {
        name: name.to_string(),
        x,
        y: 0.0,
    }
}

#[test]
fn zips_merges_with_post_records() {
    let initial = layout(&["A", "B", "C"]);
    let merges = [merge(&["A", "B"], "M")];
    let post = [PostLegalRecord::new(3.0, 0.0, vec![mv("C", 20.0)])];

    let deck = build_deck(&initial, &merges, &post).unwrap();
    assert_eq!(deck.len(), 1);
    let step = deck.get(0).unwrap();
    assert_eq!(step.index, 0);
    assert_eq!(step.removed.as_slice(), ["A".to_string(), "B".to_string()]);
    assert_eq!(step.merged_name(), "M");
    assert!(!step.merged.fixed);
    assert_eq!(step.nominal_rect(), rect_at(0.0, 0.0, 2.0, 2.0));
    assert_eq!(step.final_rect(), rect_at(3.0, 0.0, 2.0, 2.0));
    assert_eq!(step.displaced, vec![mv("C", 20.0)]);
    assert_eq!(deck.total_displacements(), 1);
}

#[test]
fn merged_cells_can_be_merged_again() {
    let initial = layout(&["A", "B", "C"]);
    let merges = [merge(&["A", "B"], "M1"), merge(&["M1", "C"], "M2")];
    let post = [
        PostLegalRecord::new(0.0, 0.0, vec![]),
        PostLegalRecord::new(0.0, 0.0, vec![]),
    ];
    let deck = build_deck(&initial, &merges, &post).unwrap();
    assert_eq!(deck.len(), 2);
    assert_eq!(deck.iter().map(|s| s.merged_name()).collect::<Vec<_>>(), ["M1", "M2"]);
}

#[test]
fn empty_inputs_produce_empty_deck() {
    let deck = build_deck(&layout(&["A"]), &[], &[]).unwrap();
    assert!(deck.is_empty());
}

#[test]
fn mismatched_lengths_are_malformed() {
    let initial = layout(&["A", "B"]);
    let merges = [merge(&["A", "B"], "M")];
    let err = build_deck(&initial, &merges, &[]).unwrap_err();
    assert!(err.is_input_error());
    assert!(err.to_string().contains("1 merge operations but 0"));
}

#[test]
fn truncated_record_is_malformed() {
    let initial = layout(&["A", "B", "C"]);
    let merges = [merge(&["A", "B"], "M")];
    let mut rec = PostLegalRecord::new(0.0, 0.0, vec![mv("C", 1.0)]);
    rec.declared_moves = 3;
    let err = build_deck(&initial, &merges, &[rec]).unwrap_err();
    assert!(err.to_string().contains("truncated"));
}

#[test]
fn unknown_or_already_removed_inputs_are_malformed() {
    let initial = layout(&["A", "B"]);
    let post = [PostLegalRecord::new(0.0, 0.0, vec![])];

    let err = build_deck(&initial, &[merge(&["A", "Z"], "M")], &post).unwrap_err();
    assert!(err.to_string().contains("'Z' is not live"));

    let err = build_deck(&initial, &[merge(&["A", "A"], "M")], &post).unwrap_err();
    assert!(err.to_string().contains("'A' is not live"));
}

#[test]
fn reused_merged_names_are_malformed() {
    let initial = layout(&["A", "B", "C", "D"]);
    let post = [
        PostLegalRecord::new(0.0, 0.0, vec![]),
        PostLegalRecord::new(0.0, 0.0, vec![]),
    ];

    // Collides with a live cell.
    let err = build_deck(&initial, &[merge(&["A"], "C")], &post[..1]).unwrap_err();
    assert!(err.to_string().contains("reuses"));

    // Collides with a cell retired by an earlier step.
    let merges = [merge(&["A", "B"], "M"), merge(&["C", "D"], "A")];
    let err = build_deck(&initial, &merges, &post).unwrap_err();
    assert!(err.to_string().contains("step 1"));
}

#[test]
fn displaced_cells_must_be_live_bystanders() {
    let initial = layout(&["A", "B", "C"]);
    let merges = [merge(&["A", "B"], "M")];

    for bad in ["A", "M", "nope"] {
        let post = [PostLegalRecord::new(0.0, 0.0, vec![mv(bad, 1.0)])];
        let err = build_deck(&initial, &merges, &post).unwrap_err();
        assert!(err.is_input_error(), "{bad}: {err}");
    }
}

#[test]
fn duplicate_displacement_is_malformed() {
    let initial = layout(&["A", "B", "C"]);
    let merges = [merge(&["A", "B"], "M")];
    let post = [PostLegalRecord::new(
        3.0,
        0.0,
        vec![mv("C", 10.0), mv("C", 20.0)],
    )];

    let err = build_deck(&initial, &merges, &post).unwrap_err();
    assert!(matches!(err, ReplayError::MalformedInput(_)), "{err}");
    assert!(err.to_string().contains("displaced twice"), "{err}");
}

#[test]
fn same_cell_may_move_in_separate_steps() {
    let initial = layout(&["A", "B", "C", "D"]);
    let merges = [merge(&["A"], "M1"), merge(&["B"], "M2")];
    let post = [
        PostLegalRecord::new(0.0, 0.0, vec![mv("C", 10.0)]),
        PostLegalRecord::new(0.0, 0.0, vec![mv("C", 20.0), mv("D", 30.0)]),
    ];
    assert_eq!(build_deck(&initial, &merges, &post).unwrap().len(), 2);
}

#[test]
fn duplicate_initial_cells_are_malformed() {
    let initial = layout(&["A", "A"]);
    assert!(build_deck(&initial, &[], &[]).is_err());
}

#[test]
fn degenerate_merged_size_is_malformed() {
    let initial = layout(&["A"]);
    let mut op = merge(&["A"], "M");
    op.width = 0.0;
    let post = [PostLegalRecord::new(0.0, 0.0, vec![])];
    assert!(build_deck(&initial, &[op], &post).is_err());
}

#[test]
fn deck_serializes_to_json() {
    let initial = layout(&["A", "B"]);
    let deck = build_deck(
        &initial,
        &[merge(&["A", "B"], "M")],
        &[PostLegalRecord::new(1.0, 2.0, vec![])],
    )
    .unwrap();
    let json = serde_json::to_value(&deck).unwrap();
    assert_eq!(json["steps"][0]["merged"]["name"], "M");
    assert_eq!(json["steps"][0]["removed"][1], "B");
}

#[test]
fn pretty_json_lists_every_step() {
    let initial = layout(&["A", "B", "C"]);
    let merges = [merge(&["A"], "M1"), merge(&["B", "C"], "M2")];
    let post = [
        PostLegalRecord::new(0.0, 0.0, vec![mv("B", 4.0)]),
        PostLegalRecord::new(0.0, 0.0, vec![]),
    ];
    let json = build_deck(&initial, &merges, &post)
        .unwrap()
        .to_json_pretty()
        .unwrap();
    let back: StepDeck = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), 2);
    assert_eq!(back.total_displacements(), 1);
}
