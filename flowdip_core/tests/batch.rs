mod support;

use flowdip_core::batch::{analyze_batch, analyze_run, effective_workers};
use flowdip_core::{AnalysisError, RunInput, Tolerances};
use rstest::rstest;
use support::trace_with_dips;

fn input(run: &str, expected_flow: f64) -> RunInput {
    let base = expected_flow;
    let (times, flows) = trace_with_dips(300, 0.1, base, &[(60, 5, base * 0.3), (150, 5, base * 0.3)]);
    RunInput {
        run: run.to_string(),
        label: Some(format!("series {run}")),
        times,
        flows,
        expected_flow,
    }
}

fn tolerances() -> Tolerances {
    Tolerances {
        threshold_time_s: 5.0,
        ..Tolerances::default()
    }
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(0)]
fn results_keep_input_order(#[case] workers: usize) {
    let inputs: Vec<RunInput> = (0..7)
        .map(|i| input(&i.to_string(), if i % 2 == 0 { 9.0 } else { 3.0 }))
        .collect();
    let results = analyze_batch(inputs, &tolerances(), workers);
    assert_eq!(results.len(), 7);
    for (i, r) in results.iter().enumerate() {
        let trace = r.as_ref().unwrap();
        assert_eq!(trace.name(), i.to_string());
        assert_eq!(trace.label(), Some(format!("series {i}")));
        let expected = if i % 2 == 0 { 9.0 } else { 3.0 };
        assert_eq!(trace.expected_flow(), expected);
    }
}

#[rstest]
fn bad_run_does_not_affect_others() {
    let mut broken = input("bad", 9.0);
    broken.flows.pop();
    let inputs = vec![input("a", 9.0), broken, input("c", 9.0)];

    let results = analyze_batch(inputs, &tolerances(), 2);
    assert!(results[0].is_ok());
    assert!(results[2].is_ok());
    let err = results[1].as_ref().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::LengthMismatch { times: 300, flows: 299 })
    ));
}

#[rstest]
fn batch_matches_single_run_analysis() {
    let single = analyze_run(input("x", 9.0), &tolerances()).unwrap();
    let batch = analyze_batch(vec![input("x", 9.0)], &tolerances(), 4);
    let from_batch = batch.into_iter().next().unwrap().unwrap();
    assert_eq!(single.status(), from_batch.status());
    assert_eq!(single.graph_data(), from_batch.graph_data());
}

#[rstest]
fn empty_batch_yields_nothing() {
    assert!(analyze_batch(Vec::new(), &tolerances(), 4).is_empty());
}

#[rstest]
#[case(4, 2, 2)]
#[case(1, 10, 1)]
#[case(3, 0, 1)]
fn worker_count_is_capped_by_jobs(#[case] requested: usize, #[case] jobs: usize, #[case] want: usize) {
    assert_eq!(effective_workers(requested, jobs), want);
}
