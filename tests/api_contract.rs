mod common;

use anyhow::Result;

use coursedeck::assistant::{RecommendationOutcome, decode_recommendation};
use coursedeck::model::{RecommendationRequest, SearchParams};
use coursedeck::remote::CatalogClient;

fn params(limit: usize) -> SearchParams {
    SearchParams {
        major: None,
        geneds: None,
        q: None,
        limit,
    }
}

#[test]
fn search_windows_and_filters() -> Result<()> {
    let server = common::spawn_server()?;
    let client = CatalogClient::new(&server.base_url)?;

    // Default window: thirty results out of the full catalog.
    let page = client.search(&params(30))?;
    assert_eq!(page.results.len(), 30);
    assert_eq!(page.matches, 42);

    // A grown window returns more of the same match set.
    let page = client.search(&params(60))?;
    assert_eq!(page.results.len(), 42);
    assert_eq!(page.matches, 42);

    // Major narrows to one department.
    let page = client.search(&SearchParams {
        major: Some("MATH".to_string()),
        ..params(30)
    })?;
    assert_eq!(page.matches, 1);
    assert_eq!(page.results[0].course_code, "MATH 241");
    // Numeric credit hours decode to a label.
    assert_eq!(page.results[0].credit_label(), "4");

    // Multiple gen eds must all be present.
    let page = client.search(&SearchParams {
        geneds: Some("Quantitative Reasoning,Natural Sciences".to_string()),
        ..params(30)
    })?;
    assert_eq!(page.matches, 1);
    assert_eq!(page.results[0].course_code, "MATH 241");

    // Free text matches the description too.
    let page = client.search(&SearchParams {
        q: Some("writing".to_string()),
        ..params(30)
    })?;
    assert_eq!(page.matches, 1);
    assert_eq!(page.results[0].course_code, "ENGL 199");
    // Absent description falls back to the placeholder blurb.
    assert_eq!(
        page.results[0].blurb(),
        coursedeck::model::DESCRIPTION_PLACEHOLDER
    );

    Ok(())
}

#[test]
fn meta_lists_departments_and_geneds() -> Result<()> {
    let server = common::spawn_server()?;
    let client = CatalogClient::new(&server.base_url)?;

    let meta = client.meta()?;
    assert_eq!(meta.departments, ["CS", "ENGL", "MATH"]);
    assert!(
        meta.geneds
            .iter()
            .any(|g| g == "Quantitative Reasoning")
    );

    Ok(())
}

fn recommend_for(major: &str) -> RecommendationRequest {
    RecommendationRequest {
        major: major.to_string(),
        goals: "graduate on time".to_string(),
        priorities: vec!["Light workload".to_string()],
    }
}

#[test]
fn recommendation_decodes_both_shapes() -> Result<()> {
    let server = common::spawn_server()?;
    let client = CatalogClient::new(&server.base_url)?;

    // JSON-encoded string body.
    let value = client.recommend(&recommend_for("CS"))?;
    match decode_recommendation(&value) {
        RecommendationOutcome::Structured(advice) => {
            assert_eq!(advice.len(), 2);
            assert_eq!(advice[0].course, "CS 225");
            assert_eq!(advice[0].detail_path, "/course/CS%20225");
        }
        other => panic!("expected structured advice, got {other:?}"),
    }

    // Already-structured object body.
    let value = client.recommend(&recommend_for("MATH"))?;
    assert!(matches!(
        decode_recommendation(&value),
        RecommendationOutcome::Structured(_)
    ));

    // Anything else renders as plain text.
    let value = client.recommend(&recommend_for("UNDECIDED"))?;
    match decode_recommendation(&value) {
        RecommendationOutcome::Opaque(text) => assert!(text.contains("UNDECIDED")),
        other => panic!("expected opaque advice, got {other:?}"),
    }

    Ok(())
}

#[test]
fn recommendation_errors_prefer_the_server_message() -> Result<()> {
    let server = common::spawn_server()?;
    let client = CatalogClient::new(&server.base_url)?;

    let err = client
        .recommend(&recommend_for("FAIL"))
        .expect_err("500 with error body");
    assert_eq!(err.to_string(), "model quota exhausted");

    // No `error` field in the body: the generic message stands in.
    let err = client
        .recommend(&recommend_for("BROKEN"))
        .expect_err("502 without error body");
    assert_eq!(err.to_string(), "Failed to generate recommendation");

    Ok(())
}
