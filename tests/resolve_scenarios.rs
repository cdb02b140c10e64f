//! Integration tests built from the literal input/output scenarios: a raw
//! line stream is parsed, resolved, and checked against the expected
//! architecture.

use hitres::hit_list::HitList;
use hitres::parsers::raw::{RawParser, RawVariant};
use hitres::parsers::HitSource;
use hitres::resolver::{naive_greedy_resolve, Resolver};
use hitres::specs::{FilterSpec, ScoreSpec, SegDuplHitPolicy, SegmentSpec};

fn resolve_raw(text: &str) -> hitres::ScoredArchitecture {
    let mut parser = RawParser::new(std::io::Cursor::new(text), RawVariant::Scores);
    let mut raws = Vec::new();
    while let Some(hit) = parser.next_hit().unwrap() {
        raws.push(hit.record);
    }
    let list = HitList::build(raws, &ScoreSpec::default(), &SegmentSpec::default(), &FilterSpec::default(), SegDuplHitPolicy::Prune);
    Resolver::resolve(&list)
}

fn labels_of(arch: &hitres::ScoredArchitecture) -> Vec<String> {
    let mut labels: Vec<String> = arch.hits().iter().map(|h| h.label.clone()).collect();
    labels.sort();
    labels
}

#[test]
fn s1_non_overlapping_pair() {
    let arch = resolve_raw("q a 10 1-10\nq b 5 20-30\n");
    assert_eq!(arch.score(), 15.0);
    assert_eq!(labels_of(&arch), vec!["a", "b"]);
}

#[test]
fn s2_overlap_tie_break_to_higher_score() {
    let arch = resolve_raw("q a 3 1-20\nq b 4 10-30\n");
    assert_eq!(arch.score(), 4.0);
    assert_eq!(labels_of(&arch), vec!["b"]);
}

#[test]
fn s3_discontiguous_with_interspersing() {
    let arch = resolve_raw("q a 10 1-20,60-80\nq b 7 30-50\n");
    assert_eq!(arch.score(), 17.0);
    assert_eq!(labels_of(&arch), vec!["a", "b"]);
}

#[test]
fn s4_discontiguous_vs_contiguous_conflict() {
    let arch = resolve_raw("q a 10 1-50\nq b 6 5-15\nq b2 5 20-30\n");
    assert_eq!(arch.score(), 11.0);
    assert_eq!(labels_of(&arch), vec!["b", "b2"]);
}

#[test]
fn s5_min_seg_length_filter_drops_short_segment() {
    let mut parser = RawParser::new(std::io::Cursor::new("q a 10 1-2,50-100\n"), RawVariant::Scores);
    let mut raws = Vec::new();
    while let Some(hit) = parser.next_hit().unwrap() {
        raws.push(hit.record);
    }
    let spec = SegmentSpec {
        min_seg_length: 5,
        overlap_trim_fraction: 0.0,
    };
    let list = HitList::build(raws, &ScoreSpec::default(), &spec, &FilterSpec::default(), SegDuplHitPolicy::Prune);
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].num_segments(), 1);
    let arch = Resolver::resolve(&list);
    assert_eq!(arch.hits()[0].segments, vec![(49, 100)]);
}

#[test]
fn s6_grouping_does_not_change_final_results() {
    use hitres::manager::Manager;
    use hitres::processors::HitsProcessor;
    use hitres::specs::{DomainType, ScoreKind};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        seen: Arc<Mutex<Vec<(String, f64)>>>,
    }
    impl HitsProcessor for Recorder {
        fn process_query(&mut self, query_id: &str, architecture: &hitres::ScoredArchitecture) -> hitres::Result<()> {
            self.seen.lock().unwrap().push((query_id.to_string(), architecture.score()));
            Ok(())
        }
    }

    let input = [
        ("q1", "a", 10.0, vec![(0u64, 10u64)]),
        ("q1", "b", 5.0, vec![(20, 30)]),
        ("q2", "c", 4.0, vec![(0, 20)]),
    ];

    let run = |grouped: bool| {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut mgr = Manager::new(
            vec![Box::new(Recorder { seen: seen.clone() })],
            FilterSpec::default(),
            ScoreSpec::default(),
            SegmentSpec::default(),
            grouped,
            false,
        );
        for (q, label, score, segs) in input.iter() {
            mgr.add_hit(q, segs.clone(), label.to_string(), *score, ScoreKind::Score, DomainType::Normal, None, None).unwrap();
        }
        mgr.process_all_outstanding().unwrap();
        let mut got = seen.lock().unwrap().clone();
        got.sort_by(|a, b| a.0.cmp(&b.0));
        got
    };

    assert_eq!(run(true), run(false));
}

#[test]
fn naive_greedy_never_beats_the_optimal_resolver() {
    let text = "q a 10 1-50\nq b 6 5-15\nq b2 5 20-30\n";
    let mut parser = RawParser::new(std::io::Cursor::new(text), RawVariant::Scores);
    let mut raws = Vec::new();
    while let Some(hit) = parser.next_hit().unwrap() {
        raws.push(hit.record);
    }
    let list = HitList::build(raws, &ScoreSpec::default(), &SegmentSpec::default(), &FilterSpec::default(), SegDuplHitPolicy::Prune);
    let optimal = Resolver::resolve(&list);
    let greedy = naive_greedy_resolve(&list);
    assert!(greedy.score() <= optimal.score());
}

#[test]
fn resolved_hits_are_pairwise_non_overlapping() {
    let text = "q a 10 1-20,60-80\nq b 7 30-50\nq c 3 15-35\n";
    let arch = resolve_raw(text);
    for i in 0..arch.hits().len() {
        for j in (i + 1)..arch.hits().len() {
            for &(s1, e1) in &arch.hits()[i].segments {
                for &(s2, e2) in &arch.hits()[j].segments {
                    assert!(e1 <= s2 || e2 <= s1, "hits {i} and {j} overlap");
                }
            }
        }
    }
}
