#![cfg(unix)]

use apollo_compiler::Schema;
use graphql_config::AnalysisSettings;
use graphql_context::{record_context_at, AnalysisClient, ContextError};
use graphql_extract::{ExtractConfig, Language, Position, Range, SourceCache};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SOURCE: &str = "module Fragment = %relay(`\n  fragment App_user on User {\n    bestFriend {\n      id\n    }\n  }\n`)\n\nlet make = (~user) => user.bestFriend\n";

/// A project directory with a fake analysis tool whose script body is `body`
fn create_project(body: &str) -> (TempDir, AnalysisClient, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let base_path = temp_dir.path();

    fs::write(base_path.join("bsconfig.json"), "{}").expect("Failed to write marker");
    fs::create_dir(base_path.join("src")).expect("Failed to create src");
    let file = base_path.join("src").join("App.res");
    fs::write(&file, SOURCE).expect("Failed to write source");

    let command = write_script(base_path, body);
    let client = AnalysisClient::new(&AnalysisSettings {
        command: command.display().to_string(),
        timeout_ms: 2000,
        project_marker: "bsconfig.json".to_string(),
    });

    (temp_dir, client, file)
}

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("analysis.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    let mut permissions = fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).expect("Failed to make script executable");
    path
}

fn hover_script(value: &str) -> String {
    format!("cat <<'JSON'\n{{\"contents\": {{\"kind\": \"markdown\", \"value\": {value}}}}}\nJSON")
}

#[tokio::test]
async fn test_hover_returns_markup_value() {
    let (_dir, client, file) = create_project(&hover_script(r#""```rescript\nstring\n```""#));

    let hover = client.hover(&file, Position::new(8, 30)).await.unwrap();
    assert_eq!(hover.as_deref(), Some("```rescript\nstring\n```"));
}

#[tokio::test]
async fn test_null_hover_is_none() {
    let (_dir, client, file) = create_project("echo null");

    let hover = client.hover(&file, Position::new(0, 0)).await.unwrap();
    assert!(hover.is_none());
}

#[tokio::test]
async fn test_arguments_are_passed_through() {
    // Echo the arguments back as the hover text
    let (_dir, client, file) =
        create_project(r#"printf '{"contents": "%s %s %s"}' "$1" "$3" "$4""#);

    let hover = client.hover(&file, Position::new(8, 30)).await.unwrap();
    assert_eq!(hover.as_deref(), Some("hover 8 30"));
}

#[tokio::test]
async fn test_type_definition_location() {
    let (_dir, client, file) = create_project(
        "cat <<'JSON'\n{\"uri\": \"file:///src/User.res\", \"range\": {\"start\": {\"line\": 2, \"character\": 4}, \"end\": {\"line\": 2, \"character\": 8}}}\nJSON",
    );

    let definition = client
        .type_definition(&file, Position::new(8, 30))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(definition.uri, "file:///src/User.res");
    assert_eq!(
        definition.range,
        Range::new(Position::new(2, 4), Position::new(2, 8))
    );
}

#[tokio::test]
async fn test_slow_tool_times_out() {
    let (_dir, client, file) = create_project("sleep 10");

    let result = client.hover(&file, Position::new(0, 0)).await;
    assert!(matches!(result, Err(ContextError::AnalysisTimeout(_))));
}

#[tokio::test]
async fn test_failing_tool_is_an_error() {
    let (_dir, client, file) = create_project("echo broken >&2\nexit 3");

    let result = client.hover(&file, Position::new(0, 0)).await;
    let Err(ContextError::Analysis(message)) = result else {
        panic!("expected an analysis error, got {result:?}");
    };
    assert!(message.contains("broken"));
}

#[tokio::test]
async fn test_invalid_json_is_an_error() {
    let (_dir, client, file) = create_project("echo not-json");

    let result = client.hover(&file, Position::new(0, 0)).await;
    assert!(matches!(result, Err(ContextError::Json(_))));
}

#[tokio::test]
async fn test_relative_file_path() {
    // Tests run from the package directory, so a project created inside it
    // can be named by a relative path
    let temp_dir = tempfile::Builder::new()
        .prefix("analysis-")
        .tempdir_in(".")
        .expect("Failed to create temp dir");
    let project = Path::new(".").join(temp_dir.path().file_name().unwrap());

    fs::write(project.join("bsconfig.json"), "{}").unwrap();
    fs::create_dir(project.join("src")).unwrap();
    fs::write(project.join("src").join("App.res"), SOURCE).unwrap();

    // Answers whether the file it was given exists from where it runs
    let command = write_script(
        &temp_dir.path().canonicalize().unwrap(),
        r#"if [ -e "$2" ]; then printf '{"contents": "found"}'; else printf '{"contents": "missing"}'; fi"#,
    );
    let client = AnalysisClient::new(&AnalysisSettings {
        command: command.display().to_string(),
        timeout_ms: 2000,
        project_marker: "bsconfig.json".to_string(),
    });

    let file = project.join("src").join("App.res");
    assert!(file.is_relative());
    let hover = client.hover(&file, Position::new(0, 0)).await.unwrap();
    assert_eq!(hover.as_deref(), Some("found"));
}

#[tokio::test]
async fn test_file_outside_project_is_none() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file = temp_dir.path().join("App.res");
    fs::write(&file, SOURCE).unwrap();
    // The marker is looked up by name, so a name nothing uses never matches
    let command = write_script(temp_dir.path(), "exit 1");
    let client = AnalysisClient::new(&AnalysisSettings {
        command: command.display().to_string(),
        timeout_ms: 2000,
        project_marker: "no-such-marker-4f1c.json".to_string(),
    });

    let hover = client.hover(&file, Position::new(0, 0)).await.unwrap();
    assert!(hover.is_none());
}

#[tokio::test]
async fn test_record_context_at_hover_position() {
    let (_dir, client, file) = create_project(&hover_script(
        r#""```rescript\nApp.App_user_graphql.Types.fragment_bestFriend\n```""#,
    ));
    let schema = Schema::parse(
        "type Query { viewer: User } type User { id: ID! bestFriend: User }",
        "schema.graphql",
    )
    .unwrap();
    let mut cache = SourceCache::new(Language::ReScript, &ExtractConfig::default()).unwrap();

    let resolved = record_context_at(
        &client,
        &mut cache,
        &file,
        SOURCE,
        Position::new(8, 30),
        &schema,
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(resolved.record.fragment_name, "App_user");
    assert_eq!(resolved.record.record_name, "fragment_bestFriend");
    assert_eq!(resolved.fragment.module_label(), "Fragment");
    assert_eq!(resolved.context.type_name(), "User");

    let range = resolved.host_range().unwrap();
    assert_eq!(range.start, Position::new(2, 4));
    assert_eq!(range.end.line, 4);
}

#[tokio::test]
async fn test_record_context_at_without_generated_type() {
    let (_dir, client, file) = create_project(&hover_script(r#""```rescript\nstring\n```""#));
    let schema = Schema::parse("type Query { id: ID }", "schema.graphql").unwrap();
    let mut cache = SourceCache::new(Language::ReScript, &ExtractConfig::default()).unwrap();

    let resolved = record_context_at(
        &client,
        &mut cache,
        &file,
        SOURCE,
        Position::new(8, 30),
        &schema,
    )
    .await
    .unwrap();
    assert!(resolved.is_none());
}
