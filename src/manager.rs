//! The read-and-process manager (component I): groups incoming hits by
//! query, resolves each query's `HitList`, and fans the result out to every
//! configured processor.

use crossbeam_channel::Receiver;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{ResolveError, ResolverError};
use crate::hit_list::{HitList, RawHitRecord};
use crate::processors::HitsProcessor;
use crate::resolver::{naive_greedy_resolve, Resolver};
use crate::specs::{DomainType, FilterSpec, ScoreKind, ScoreSpec, SegDuplHitPolicy, SegmentSpec};

/// Minimum number of outstanding queries before batch-mode resolution uses
/// a rayon fan-out rather than resolving sequentially on the calling
/// thread. Per-query DP resolution is far more expensive than a single BED
/// interval, so this sits much lower than the teacher's interval-level
/// threshold.
pub const PARALLEL_QUERY_THRESHOLD: usize = 64;

/// The single-slot background worker, holding the processor list exclusively
/// while `Running` so a second concurrent handoff is impossible by
/// construction (the processors simply aren't there to hand to anyone else).
/// The spawned thread reports back over a rendezvous channel rather than a
/// bare `JoinHandle`, so `join_worker` can recv without caring whether the
/// thread has technically exited yet.
enum WorkerSlot {
    Idle(Vec<Box<dyn HitsProcessor>>),
    Running(Receiver<Result<Vec<Box<dyn HitsProcessor>>, ResolveError>>),
}

/// Groups incoming per-hit records by query id, resolves each query's
/// `HitList` and dispatches the result to every processor.
pub struct Manager {
    filter_spec: FilterSpec,
    score_spec: ScoreSpec,
    segment_spec: SegmentSpec,
    dup_policy: SegDuplHitPolicy,
    input_hits_are_grouped: bool,
    use_naive_greedy: bool,

    builders: FxHashMap<String, Vec<RawHitRecord>>,
    last_query_id: Option<String>,
    handed_off: FxHashSet<String>,
    worker: WorkerSlot,
}

impl Manager {
    pub fn new(
        processors: Vec<Box<dyn HitsProcessor>>,
        filter_spec: FilterSpec,
        score_spec: ScoreSpec,
        segment_spec: SegmentSpec,
        input_hits_are_grouped: bool,
        use_naive_greedy: bool,
    ) -> Self {
        let dup_policy = if processors.iter().any(|p| p.wants_preserve_duplicates()) {
            SegDuplHitPolicy::Preserve
        } else {
            SegDuplHitPolicy::Prune
        };
        Manager {
            filter_spec,
            score_spec,
            segment_spec,
            dup_policy,
            input_hits_are_grouped,
            use_naive_greedy,
            builders: FxHashMap::default(),
            last_query_id: None,
            handed_off: FxHashSet::default(),
            worker: WorkerSlot::Idle(processors),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_hit(
        &mut self,
        query_id: &str,
        segments: Vec<(u64, u64)>,
        label: String,
        raw_score: f64,
        score_kind: ScoreKind,
        domain_type: DomainType,
        cond_evalue: Option<f64>,
        indp_evalue: Option<f64>,
    ) -> Result<(), ResolveError> {
        if self.handed_off.contains(query_id) {
            return Err(ResolverError::DuplicateFinalise(query_id.to_string()).into());
        }
        if !self.filter_spec.accepts_query(query_id) {
            return Ok(());
        }

        if self.input_hits_are_grouped {
            if let Some(last) = self.last_query_id.clone() {
                if last != query_id {
                    if let Some(raws) = self.builders.remove(&last) {
                        self.handed_off.insert(last.clone());
                        self.spawn_async(last, raws)?;
                    }
                }
            }
        }

        self.last_query_id = Some(query_id.to_string());
        self.builders.entry(query_id.to_string()).or_default().push(RawHitRecord {
            label,
            raw_score,
            score_kind,
            domain_type,
            segments,
            cond_evalue,
            indp_evalue,
        });
        Ok(())
    }

    /// Waits for any outstanding async work, then processes every remaining
    /// query in sorted-by-query-id order (in parallel via rayon first, when
    /// running non-grouped with enough outstanding queries), finally
    /// signalling every processor's `finish`.
    pub fn process_all_outstanding(&mut self) -> Result<(), ResolveError> {
        self.join_worker()?;

        let mut ids: Vec<String> = self.builders.keys().cloned().collect();
        ids.sort();

        if !self.input_hits_are_grouped && ids.len() >= PARALLEL_QUERY_THRESHOLD {
            let score_spec = self.score_spec;
            let segment_spec = self.segment_spec;
            let filter_spec = self.filter_spec.clone();
            let dup_policy = self.dup_policy;
            let use_naive_greedy = self.use_naive_greedy;
            let builders = &self.builders;

            let resolved: Vec<(String, crate::scored_arch::ScoredArchitecture)> = ids
                .par_iter()
                .map(|qid| {
                    let list = HitList::build(
                        builders[qid].clone(),
                        &score_spec,
                        &segment_spec,
                        &filter_spec,
                        dup_policy,
                    );
                    let arch = if use_naive_greedy {
                        naive_greedy_resolve(&list)
                    } else {
                        Resolver::resolve(&list)
                    };
                    (qid.clone(), arch)
                })
                .collect();

            let processors = self.processors_mut();
            for (qid, arch) in &resolved {
                for p in processors.iter_mut() {
                    p.process_query(qid, arch)?;
                }
            }
        } else {
            for qid in &ids {
                let raws = self.builders.remove(qid).expect("id collected from builders keys");
                let list = HitList::build(raws, &self.score_spec, &self.segment_spec, &self.filter_spec, self.dup_policy);
                let arch = if self.use_naive_greedy {
                    naive_greedy_resolve(&list)
                } else {
                    Resolver::resolve(&list)
                };
                let processors = self.processors_mut();
                for p in processors.iter_mut() {
                    p.process_query(qid, &arch)?;
                }
            }
        }

        self.builders.clear();
        self.handed_off.clear();
        self.last_query_id = None;
        for p in self.processors_mut().iter_mut() {
            p.finish()?;
        }
        Ok(())
    }

    fn spawn_async(&mut self, query_id: String, raws: Vec<RawHitRecord>) -> Result<(), ResolveError> {
        self.join_worker()?;
        let processors = match std::mem::replace(&mut self.worker, WorkerSlot::Idle(Vec::new())) {
            WorkerSlot::Idle(p) => p,
            WorkerSlot::Running(_) => unreachable!("join_worker guarantees Idle"),
        };

        let score_spec = self.score_spec;
        let segment_spec = self.segment_spec;
        let filter_spec = self.filter_spec.clone();
        let dup_policy = self.dup_policy;
        let use_naive_greedy = self.use_naive_greedy;

        let (tx, rx) = crossbeam_channel::bounded(1);
        std::thread::spawn(move || {
            let mut processors = processors;
            let outcome = (|| -> Result<Vec<Box<dyn HitsProcessor>>, ResolveError> {
                let list = HitList::build(raws, &score_spec, &segment_spec, &filter_spec, dup_policy);
                let arch = if use_naive_greedy {
                    naive_greedy_resolve(&list)
                } else {
                    Resolver::resolve(&list)
                };
                for p in processors.iter_mut() {
                    p.process_query(&query_id, &arch)?;
                }
                Ok(processors)
            })();
            let _ = tx.send(outcome);
        });
        self.worker = WorkerSlot::Running(rx);
        Ok(())
    }

    fn join_worker(&mut self) -> Result<(), ResolveError> {
        if matches!(self.worker, WorkerSlot::Running(_)) {
            let prev = std::mem::replace(&mut self.worker, WorkerSlot::Idle(Vec::new()));
            if let WorkerSlot::Running(rx) = prev {
                let processors = rx
                    .recv()
                    .unwrap_or_else(|_| panic!("background resolution worker vanished without reporting"))?;
                self.worker = WorkerSlot::Idle(processors);
            }
        }
        Ok(())
    }

    fn processors_mut(&mut self) -> &mut Vec<Box<dyn HitsProcessor>> {
        match &mut self.worker {
            WorkerSlot::Idle(p) => p,
            WorkerSlot::Running(_) => panic!("processors_mut called while the worker is running"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError as Err_;
    use crate::scored_arch::ScoredArchitecture;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingProcessor {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl HitsProcessor for RecordingProcessor {
        fn process_query(&mut self, query_id: &str, _architecture: &ScoredArchitecture) -> Result<(), Err_> {
            self.seen.lock().unwrap().push(query_id.to_string());
            Ok(())
        }
    }

    fn add(mgr: &mut Manager, query: &str, label: &str, score: f64, segs: &[(u64, u64)]) {
        mgr.add_hit(
            query,
            segs.to_vec(),
            label.to_string(),
            score,
            ScoreKind::Score,
            DomainType::Normal,
            None,
            None,
        )
        .unwrap();
    }

    #[test]
    fn ungrouped_input_emits_all_queries_in_sorted_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let proc = RecordingProcessor { seen: seen.clone() };
        let mut mgr = Manager::new(
            vec![Box::new(proc)],
            FilterSpec::default(),
            ScoreSpec::default(),
            SegmentSpec::default(),
            false,
            false,
        );
        add(&mut mgr, "z_query", "a", 1.0, &[(0, 10)]);
        add(&mut mgr, "a_query", "a", 1.0, &[(0, 10)]);
        mgr.process_all_outstanding().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["a_query".to_string(), "z_query".to_string()]);
    }

    #[test]
    fn grouped_input_triggers_async_handoff_on_query_boundary() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let proc = RecordingProcessor { seen: seen.clone() };
        let mut mgr = Manager::new(
            vec![Box::new(proc)],
            FilterSpec::default(),
            ScoreSpec::default(),
            SegmentSpec::default(),
            true,
            false,
        );
        add(&mut mgr, "q1", "a", 1.0, &[(0, 10)]);
        add(&mut mgr, "q2", "a", 1.0, &[(0, 10)]);
        mgr.process_all_outstanding().unwrap();

        let mut got = seen.lock().unwrap().clone();
        got.sort();
        assert_eq!(got, vec!["q1".to_string(), "q2".to_string()]);
    }

    #[test]
    fn add_hit_after_handoff_is_a_fatal_error() {
        let mut mgr = Manager::new(
            vec![Box::new(RecordingProcessor::default())],
            FilterSpec::default(),
            ScoreSpec::default(),
            SegmentSpec::default(),
            true,
            false,
        );
        add(&mut mgr, "q1", "a", 1.0, &[(0, 10)]);
        add(&mut mgr, "q2", "a", 1.0, &[(0, 10)]); // closes q1, hands it off
        mgr.join_worker().unwrap();

        let err = mgr.add_hit(
            "q1",
            vec![(20, 30)],
            "b".to_string(),
            1.0,
            ScoreKind::Score,
            DomainType::Normal,
            None,
            None,
        );
        assert!(err.is_err());
    }

    #[test]
    fn query_allowlist_silently_drops_unlisted_queries() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let proc = RecordingProcessor { seen: seen.clone() };
        let mut filter = FilterSpec::default();
        let mut allow = rustc_hash::FxHashSet::default();
        allow.insert("ok".to_string());
        filter.query_allowlist = Some(allow);

        let mut mgr = Manager::new(vec![Box::new(proc)], filter, ScoreSpec::default(), SegmentSpec::default(), false, false);
        add(&mut mgr, "ok", "a", 1.0, &[(0, 10)]);
        add(&mut mgr, "dropped", "a", 1.0, &[(0, 10)]);
        mgr.process_all_outstanding().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["ok".to_string()]);
    }
}
