use super::*;
use crate::deck::build::build_deck;
use crate::deck::records::{CellRecord, Displacement, MergeOp, PostLegalRecord};
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Rect;

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

fn fixture() -> (InitialLayout, StepDeck) {
    let layout = InitialLayout::new(
        Rect::new(0.0, 0.0, 20.0, 10.0),
        vec![cell("A", 0.0), cell("B", 5.0), cell("C", 4.0)],
    );
    let merges = [MergeOp {
        inputs: vec!["A".into(), "B".into()],
        output: "M".into(),
        x: 0.0,
        y: 0.0,
        width: 2.0,
        height: 2.0,
    }];
    let post = [PostLegalRecord::new(
        3.0,
        0.0,
        vec![Displacement {
            name: "C".into(),
            x: 9.0,
            y: 0.0,
        }],
    )];
    let deck = build_deck(&layout, &merges, &post).unwrap();
    (layout, deck)
}

fn opts(mode: ReplayMode) -> ReplaySessionOpts {
    ReplaySessionOpts {
        height: 40,
        ..ReplaySessionOpts::new(mode)
    }
}

struct FailingSink;

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> ReplayResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> ReplayResult<()> {
        if idx.0 == 1 {
            return Err(ReplayError::encode("disk full"));
        }
        Ok(())
    }

    fn end(&mut self) -> ReplayResult<()> {
        Ok(())
    }
}

#[test]
fn coarse_run_emits_initial_frame_plus_one_per_step() {
    let (layout, deck) = fixture();
    let mut session = ReplaySession::new(&layout, deck, opts(ReplayMode::Coarse)).unwrap();
    let mut sink = InMemorySink::new();
    let stats = session.run(&mut sink).unwrap();

    assert_eq!(stats.frames, 2);
    assert_eq!(stats.steps, 1);
    assert!(sink.is_ended());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (80, 40));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1]);
    assert!(sink.frames().iter().all(|(_, f)| f.width == 80 && f.height == 40));
}

#[test]
fn detail_run_emits_one_frame_per_phase() {
    let (layout, deck) = fixture();
    let mut session = ReplaySession::new(&layout, deck, opts(ReplayMode::Detail)).unwrap();
    let mut sink = InMemorySink::new();
    let stats = session.run(&mut sink).unwrap();

    // Initial, REMOVE, MERGE, MOVE M, MOVE C, SHOWRESULT.
    assert_eq!(stats.frames, 6);
    assert_eq!(sink.frames().len(), 6);
    assert!((stats.duration_secs - 0.1).abs() < 1e-9);
    assert!(session.engine().is_finished());
}

#[test]
fn failing_sink_fails_the_run() {
    let (layout, deck) = fixture();
    let mut session = ReplaySession::new(&layout, deck, opts(ReplayMode::Detail)).unwrap();
    let err = session.run(&mut FailingSink).unwrap_err();
    assert!(err.to_string().contains("disk full"), "{err}");
}

#[test]
fn frame_at_replays_forward_only() {
    let (layout, deck) = fixture();
    let mut session = ReplaySession::new(&layout, deck, opts(ReplayMode::Detail)).unwrap();

    let f0 = session.frame_at(0).unwrap();
    let f2 = session.frame_at(2).unwrap();
    assert_ne!(f0, f2);
    assert!(session.frame_at(1).is_err());
    assert!(session.frame_at(99).is_err());
}

#[test]
fn frame_at_zero_matches_first_run_frame() {
    let (layout, deck) = fixture();
    let mut a = ReplaySession::new(&layout, deck.clone(), opts(ReplayMode::Coarse)).unwrap();
    let mut b = ReplaySession::new(&layout, deck, opts(ReplayMode::Coarse)).unwrap();
    let mut sink = InMemorySink::new();
    a.run(&mut sink).unwrap();
    assert_eq!(sink.frames()[0].1, b.frame_at(0).unwrap());
}

#[test]
fn highlight_color_follows_mode_palette() {
    let (layout, deck) = fixture();
    let session = ReplaySession::new(&layout, deck, opts(ReplayMode::Detail)).unwrap();
    assert_eq!(session.engine().palette().highlight, crate::Palette::DETAIL.highlight);
}
