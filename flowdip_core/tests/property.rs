use flowdip_core::{BoundaryLocator, RangeClassifier, RawTrace, Tolerances, Trace, TraceStatus};
use proptest::prelude::*;

const LEVELS: [f64; 6] = [9.0, 9.0, 9.0, 3.0, 7.0, 11.5];

fn tolerances() -> Tolerances {
    Tolerances {
        threshold_time_s: 2.0,
        ..Tolerances::default()
    }
}

prop_compose! {
    // Piecewise-constant trace: runs of steady flow broken by dips and spikes.
    fn segmented_trace()(
        segments in prop::collection::vec((1usize..60, 0usize..LEVELS.len()), 1..20),
        dt in 0.05f64..0.5,
    ) -> RawTrace {
        let mut times = Vec::new();
        let mut flows = Vec::new();
        for (len, level) in segments {
            for _ in 0..len {
                let t = times.len() as f64 * dt;
                times.push(t);
                flows.push(LEVELS[level]);
            }
        }
        RawTrace::new(times, flows).unwrap()
    }
}

prop_compose! {
    fn in_band_trace()(
        flows in prop::collection::vec(7.3f64..10.7, 2..400),
        dt in 0.05f64..0.5,
    ) -> RawTrace {
        let times = (0..flows.len()).map(|i| i as f64 * dt).collect();
        RawTrace::new(times, flows).unwrap()
    }
}

proptest! {
    #[test]
    fn in_band_traces_have_no_dips(raw in in_band_trace()) {
        let tol = tolerances();
        let classifier = RangeClassifier::from(&tol);
        prop_assert!(raw.flows().iter().all(|&f| classifier.in_range(f)));

        let (_, stats) = BoundaryLocator::new(&tol).locate(&raw);
        prop_assert_eq!(stats.max_dip_time_s, 0.0);
        prop_assert!(stats.period_samples.is_empty());
        prop_assert!(stats.period_s.is_none());
    }

    #[test]
    fn boundary_search_is_idempotent(raw in segmented_trace()) {
        let locator = BoundaryLocator::new(&tolerances());
        let first = locator.locate(&raw);
        let second = locator.locate(&raw);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn folding_only_removes_points(raw in segmented_trace()) {
        let trace = Trace::analyze("p", raw, &tolerances()).unwrap();
        let (steady, _) = trace.steady_state_data();
        let (folded, _) = trace.graph_data();
        prop_assert!(folded.len() <= steady.len());
    }

    #[test]
    fn folded_times_lie_within_one_period(raw in segmented_trace()) {
        let trace = Trace::analyze("p", raw, &tolerances()).unwrap();
        if let Some(period) = trace.period() {
            let (folded, _) = trace.graph_data();
            prop_assert!(folded.iter().all(|&t| (0.0..period).contains(&t)));
        }
    }

    #[test]
    fn passed_requires_both_checks(raw in segmented_trace()) {
        let trace = Trace::analyze("p", raw, &tolerances()).unwrap();
        match trace.status() {
            TraceStatus::Analyzed(v) => {
                prop_assert_eq!(v.passed, v.dip_magnitude_ok && v.dip_time_ok);
                prop_assert_eq!(trace.passed(), v.passed);
            }
            TraceStatus::Unanalyzable(_) => prop_assert!(!trace.passed()),
        }
    }
}
