#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

use flowdip_core::{Tolerances, Trace};

#[derive(Arbitrary, Debug)]
struct Input {
    /// Positive time steps; raw times are their running sum.
    steps: Vec<u16>,
    flows: Vec<u8>,
    threshold_tenths: u8,
}

fuzz_target!(|input: Input| {
    let mut t = 0.0;
    let times: Vec<f64> = input
        .steps
        .iter()
        .map(|&s| {
            t += f64::from(s.max(1)) / 1000.0;
            t
        })
        .collect();
    let flows: Vec<f64> = input.flows.iter().map(|&f| f64::from(f) / 10.0).collect();
    let n = times.len().min(flows.len());

    let tolerances = Tolerances {
        threshold_time_s: f64::from(input.threshold_tenths.max(1)) / 10.0,
        ..Tolerances::default()
    };
    let Ok(trace) = Trace::from_series("fuzz", times[..n].to_vec(), flows[..n].to_vec(), &tolerances) else {
        return;
    };

    // Folded points always lie inside one period and the verdict is consistent.
    let folded = trace.folded();
    if let Some(p) = trace.period() {
        assert!(folded.times.iter().all(|&x| (0.0..p).contains(&x)));
    }
    if let Some(v) = trace.verdict() {
        assert_eq!(v.passed, v.dip_magnitude_ok && v.dip_time_ok);
    }
});
