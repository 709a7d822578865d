use super::*;

#[test]
fn test_fraction_and_mean() {
    let r = MetricResult::fraction(MetricKind::Mmpmr, Some(0.3), 1, 4).unwrap();
    assert_eq!(r.value, 0.25);
    assert_eq!(r.sample_size, 4);

    let r = MetricResult::mean(MetricKind::Map, None, 1.5, 3).unwrap();
    assert_eq!(r.value, 0.5);
    assert_eq!(r.threshold, None);
}

#[test]
fn test_empty_sample_is_an_error() {
    assert_eq!(
        MetricResult::fraction(MetricKind::Fmr, Some(0.3), 0, 0),
        Err(MetricError::EmptyPopulation {
            metric: MetricKind::Fmr
        })
    );
    assert_eq!(
        MetricResult::mean(MetricKind::Rmmr, Some(0.3), 0.0, 0),
        Err(MetricError::EmptyPopulation {
            metric: MetricKind::Rmmr
        })
    );
}

#[test]
fn test_metric_names_serialize_upper_case() {
    assert_eq!(MetricKind::Mmpmr.to_string(), "MMPMR");
    assert_eq!(
        serde_json::to_string(&MetricKind::Fnmr).unwrap(),
        "\"FNMR\""
    );
}
