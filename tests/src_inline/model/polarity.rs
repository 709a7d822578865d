use super::*;

#[test]
fn test_dissimilarity_boundary_inclusive() {
    assert!(decide(0.30, 0.30, Polarity::Dissimilarity));
    assert!(decide(0.28, 0.30, Polarity::Dissimilarity));
    assert!(!decide(0.31, 0.30, Polarity::Dissimilarity));
}

#[test]
fn test_similarity_boundary_inclusive() {
    assert!(decide(0.70, 0.70, Polarity::Similarity));
    assert!(decide(0.95, 0.70, Polarity::Similarity));
    assert!(!decide(0.69, 0.70, Polarity::Similarity));
}

#[test]
fn test_nan_never_matches() {
    assert!(!decide(f64::NAN, 0.5, Polarity::Similarity));
    assert!(!decide(f64::NAN, 0.5, Polarity::Dissimilarity));
    assert!(!decide(0.5, f64::NAN, Polarity::Dissimilarity));
}

#[test]
fn test_infinite_scores() {
    assert!(decide(f64::NEG_INFINITY, 0.1, Polarity::Dissimilarity));
    assert!(!decide(f64::INFINITY, 0.1, Polarity::Dissimilarity));
    assert!(decide(f64::INFINITY, 0.1, Polarity::Similarity));
}

#[test]
fn test_best_prefers_match_side() {
    assert_eq!(Polarity::Dissimilarity.best(0.4, 0.2), 0.2);
    assert_eq!(Polarity::Similarity.best(0.4, 0.2), 0.4);
    assert_eq!(Polarity::Dissimilarity.best(f64::NAN, 0.2), 0.2);
    assert_eq!(Polarity::Similarity.best(0.2, f64::NAN), 0.2);
    assert!(Polarity::Similarity.best(f64::NAN, f64::NAN).is_nan());
}

#[test]
fn test_parse_polarity() {
    assert_eq!("similarity".parse::<Polarity>().unwrap(), Polarity::Similarity);
    assert_eq!(
        " Dissimilarity ".parse::<Polarity>().unwrap(),
        Polarity::Dissimilarity
    );
    for alias in ["sim", "dissim", "distance"] {
        assert_eq!(
            alias.parse::<Polarity>().unwrap_err(),
            ConfigError::InvalidPolarity(alias.to_string())
        );
    }
    let err = "cosine".parse::<Polarity>().unwrap_err();
    assert_eq!(err, ConfigError::InvalidPolarity("cosine".to_string()));
}
