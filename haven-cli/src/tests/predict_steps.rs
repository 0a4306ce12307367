//! Behaviour-driven step definitions driving the predict CLI scenarios.

use super::helpers::{MEADOW, StubServiceBuilder, Workspace, request_json, write_utf8};
use super::*;
use crate::predict::run_predict_with;
use haven_core::Prediction;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

struct PredictWorld {
    workspace: Workspace,
    include_request: RefCell<bool>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl PredictWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            include_request: RefCell::new(true),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["haven".to_owned(), "predict".to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.workspace.request.as_str().to_owned());
        }
        argv.extend([
            format!("--{ARG_CATALOG}"),
            self.workspace.catalog.as_str().to_owned(),
        ]);
        argv
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }

    fn prediction(&self) -> Prediction {
        let borrowed = self.result.borrow();
        borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect("expected success");
        serde_json::from_slice(&self.stdout.borrow()).expect("output should be prediction JSON")
    }
}

#[fixture]
fn world() -> PredictWorld {
    PredictWorld::new()
}

#[given("a mid-range predict request without coordinates")]
fn request_without_coordinates(#[from(world)] world: &PredictWorld) {
    world.workspace.write_request(&request_json(None));
}

#[given("a mid-range predict request beside the meadow")]
fn request_beside_meadow(#[from(world)] world: &PredictWorld) {
    world.workspace.write_request(&request_json(Some(MEADOW)));
}

#[given("the predict request contains invalid JSON")]
fn request_contains_invalid_json(#[from(world)] world: &PredictWorld) {
    write_utf8(&world.workspace.request, b"{ not valid json");
}

#[given("I omit the predict request path")]
fn omit_request_path(#[from(world)] world: &PredictWorld) {
    *world.include_request.borrow_mut() = false;
}

#[when("I run the predict command")]
fn run_predict_command(#[from(world)] world: &PredictWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Predict(args) => {
            let builder = StubServiceBuilder::new();
            let mut buffer = world.stdout.borrow_mut();
            run_predict_with(args, &builder, &mut *buffer)
        }
        Command::Health(_) | Command::Prune(_) => panic!("expected predict command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds with the fallback confidence")]
fn succeeds_with_fallback(#[from(world)] world: &PredictWorld) {
    let prediction = world.prediction();
    assert_eq!(prediction.confidence, 0.85);
    assert!(prediction.location_name.is_none());
}

#[then("the command succeeds and recommends the meadow")]
fn succeeds_with_meadow(#[from(world)] world: &PredictWorld) {
    let prediction = world.prediction();
    assert_eq!(prediction.location_name.as_deref(), Some("Port Meadow"));
    assert!(prediction.distance_km.is_some_and(|km| km < 1e-6));
}

#[then("the command fails because the request JSON is invalid")]
fn fails_invalid_json(#[from(world)] world: &PredictWorld) {
    match &*world.error() {
        CliError::ParseRequest { .. } => {}
        other => panic!("expected ParseRequest, found {other:?}"),
    }
}

#[then("the command fails because the request path is missing")]
fn fails_missing_request(#[from(world)] world: &PredictWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_PREDICT_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_predict_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/predict_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: PredictWorld) {
            let _ = world;
        }
    };
}

register_predict_scenario!(predict_without_coordinates, "predicting without coordinates");
register_predict_scenario!(predict_beside_meadow, "predicting beside a catalog location");
register_predict_scenario!(predict_invalid_json, "rejecting invalid JSON input");
register_predict_scenario!(predict_missing_request, "rejecting missing request paths");
