//! Serialization contract for persisted snapshots.
//!
//! Downstream tooling (dashboards, the atlas report, audit pipelines)
//! parses these records by field name; this is the compatibility surface.

use peeksafe::{
    BernoulliMixtureE, ConfidenceSequence, EValue, HoeffdingCS, Side, StreamSpec,
};

#[test]
fn interval_serializes_every_contract_field() {
    let mut cs = HoeffdingCS::new(StreamSpec::bernoulli(0.05).unwrap()).unwrap();
    for _ in 0..5 {
        cs.update(1.0).unwrap();
    }
    let value = serde_json::to_value(cs.interval()).unwrap();
    for field in ["t", "estimate", "lo", "hi", "tier", "alpha", "diagnostics"] {
        assert!(value.get(field).is_some(), "interval missing {field}");
    }
    let diag = value.get("diagnostics").unwrap();
    for field in [
        "method",
        "clipped_count",
        "missing_count",
        "out_of_range_count",
        "drift_detected",
        "drift_score",
        "notes",
    ] {
        assert!(diag.get(field).is_some(), "diagnostics missing {field}");
    }
    assert_eq!(value["tier"], "guaranteed");
    assert_eq!(diag["method"], "hoeffding");
}

#[test]
fn evalue_serializes_every_contract_field() {
    let mut e =
        BernoulliMixtureE::new(StreamSpec::bernoulli(0.05).unwrap(), 0.5, Side::Ge).unwrap();
    for _ in 0..10 {
        e.update(1.0).unwrap();
    }
    let snapshot = e.evalue();
    let value = serde_json::to_value(&snapshot).unwrap();
    for field in ["t", "e", "decision", "tier", "alpha", "diagnostics"] {
        assert!(value.get(field).is_some(), "evalue missing {field}");
    }

    let back: EValue = serde_json::from_value(value).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn snapshots_outlive_the_instance() {
    let snapshot = {
        let mut cs = HoeffdingCS::new(StreamSpec::bernoulli(0.05).unwrap()).unwrap();
        cs.update(1.0).unwrap();
        cs.interval()
    };
    // The instance is gone; the snapshot stays readable and immutable.
    assert_eq!(snapshot.t, 1);
    assert_eq!(snapshot.estimate, 1.0);
}

#[test]
fn snapshot_reflects_exactly_the_applied_prefix() {
    let mut cs = HoeffdingCS::new(StreamSpec::bernoulli(0.05).unwrap()).unwrap();
    let mut snapshots = Vec::new();
    for i in 0..20 {
        cs.update(f64::from(u8::from(i % 2 == 0))).unwrap();
        snapshots.push(cs.interval());
    }
    for (k, iv) in snapshots.iter().enumerate() {
        assert_eq!(iv.t, k as u64 + 1);
        // The k-th snapshot is the mean of the first k+1 observations.
        let expected = (k / 2 + 1) as f64 / (k + 1) as f64;
        assert!((iv.estimate - expected).abs() < 1e-12, "k = {k}");
    }
}
