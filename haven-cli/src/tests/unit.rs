//! Focused unit tests covering CLI configuration and request parsing.

use super::helpers::{Workspace, request_json, write_utf8};
use super::*;
use crate::health::{HealthArgs, HealthConfig};
use crate::predict::{PredictArgs, PredictConfig, config_from_layers_for_test, load_predict_request};
use crate::prune::{PruneArgs, PruneConfig};
use camino::Utf8PathBuf;
use haven_core::LocationId;
use rstest::rstest;
use std::time::Duration;

#[rstest]
fn converting_predict_without_request_errors() {
    let err = PredictConfig::try_from(PredictArgs::default()).expect_err("missing request");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PREDICT_REQUEST);
            assert_eq!(env, ENV_PREDICT_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn converting_health_without_location_errors() {
    let err = HealthConfig::try_from(HealthArgs::default()).expect_err("missing location");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_HEALTH_LOCATION);
            assert_eq!(env, ENV_HEALTH_LOCATION);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn engine_defaults_apply_when_unset() {
    let config = PredictConfig::try_from(PredictArgs {
        request_path: Some(Utf8PathBuf::from("request.json")),
        ..PredictArgs::default()
    })
    .expect("config should build");
    assert_eq!(config.engine.catalog, Utf8PathBuf::from(DEFAULT_CATALOG));
    assert_eq!(config.engine.geodata.base_url, "http://localhost:8080");
    assert!(config.engine.geodata.api_key.is_none());
    assert!(config.radius_km.is_none());
}

#[rstest]
fn health_config_carries_overrides() {
    let config = HealthConfig::try_from(HealthArgs {
        location_id: Some(12),
        catalog: Some(Utf8PathBuf::from("/srv/haven/catalog.db")),
        geodata_base_url: Some("https://geodata.example".to_owned()),
        geodata_api_key: Some("secret".to_owned()),
        trend_days: None,
    })
    .expect("config should build");
    assert_eq!(config.location_id, LocationId(12));
    assert_eq!(config.trend_days, 7);
    assert_eq!(config.engine.geodata.base_url, "https://geodata.example");
    assert_eq!(config.engine.geodata.api_key.as_deref(), Some("secret"));
}

#[rstest]
#[case(None, None)]
#[case(Some(3), Some(Duration::from_secs(3 * 24 * 60 * 60)))]
fn prune_retention_converts_days(#[case] days: Option<u32>, #[case] expected: Option<Duration>) {
    let config = PruneConfig::from(PruneArgs {
        catalog: None,
        retention_days: days,
    });
    assert_eq!(config.retention, expected);
}

#[rstest]
fn validate_sources_reports_missing_request() {
    let workspace = Workspace::new();
    let config = PredictConfig::try_from(PredictArgs {
        request_path: Some(workspace.request.clone()),
        catalog: Some(workspace.catalog.clone()),
        ..PredictArgs::default()
    })
    .expect("config should build");
    let err = config.validate_sources().expect_err("request is absent");
    match err {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(field, ARG_PREDICT_REQUEST);
            assert_eq!(path, workspace.request);
        }
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_catalog_directory() {
    let workspace = Workspace::new();
    workspace.write_request(&request_json(None));
    let config = PredictConfig::try_from(PredictArgs {
        request_path: Some(workspace.request.clone()),
        catalog: Some(workspace.root.clone()),
        ..PredictArgs::default()
    })
    .expect("config should build");
    let err = config.validate_sources().expect_err("catalog is a directory");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_CATALOG),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_predict_request_decodes_flattened_state() {
    let workspace = Workspace::new();
    workspace.write_request(&request_json(Some(super::helpers::MEADOW)));
    let request = load_predict_request(&workspace.request).expect("request should decode");
    assert_eq!(request.state.mental("mood"), Some(5.0));
    assert_eq!(request.state.physical("heart_rate"), Some(80.0));
    assert_eq!(request.latitude, Some(super::helpers::MEADOW.y));
    assert!(request.radius_km.is_none());
}

#[rstest]
fn load_predict_request_rejects_invalid_json() {
    let workspace = Workspace::new();
    write_utf8(&workspace.request, b"{ not valid json");
    let err = load_predict_request(&workspace.request).expect_err("invalid json");
    match err {
        CliError::ParseRequest { path, .. } => assert_eq!(path, workspace.request),
        other => panic!("expected ParseRequest, found {other:?}"),
    }
}

#[rstest]
fn load_predict_request_reports_open_errors() {
    let workspace = Workspace::new();
    let err = load_predict_request(&workspace.request).expect_err("missing request");
    match err {
        CliError::OpenRequest { path, .. } => assert_eq!(path, workspace.request),
        other => panic!("expected OpenRequest, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "catalog": "/from-file/haven.db",
            "geodata_base_url": "http://from-file:8080",
            "radius_km": 5.0,
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": "/from-env/request.json",
        "catalog": "/from-env/haven.db",
    }));
    composer.push_cli(json!({ "radius_km": 12.5 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, Utf8PathBuf::from("/from-env/request.json"));
    assert_eq!(config.engine.catalog, Utf8PathBuf::from("/from-env/haven.db"));
    assert_eq!(config.engine.geodata.base_url, "http://from-file:8080");
    assert_eq!(config.radius_km, Some(12.5));
}
