//! Unit tests for session layering and output.

use std::sync::Arc;

use anyhow::{Result, anyhow, ensure};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use test_helpers::layers::LayerDir;

use super::Session;
use crate::error::StrataError;
use crate::format::{FormatRegistry, Json};

fn to_anyhow<T>(result: crate::StrataResult<T>) -> Result<T> {
    result.map_err(|err| anyhow!(err.to_string()))
}

#[fixture]
fn services() -> Session {
    let mut session = Session::new();
    for (index, doc) in [
        json!({"kind": "Service", "name": "web", "port": 80}),
        json!({"kind": "Deployment", "name": "web"}),
        json!({"kind": "Service", "name": "db", "port": 5432}),
    ]
    .into_iter()
    .enumerate()
    {
        session
            .apply_patch(index, doc)
            .expect("fixture patch should apply");
    }
    session
}

#[test]
fn positional_patches_pad_with_null() -> Result<()> {
    let mut session = Session::new();
    to_anyhow(session.apply_patch(2, json!({"a": 1})))?;
    ensure!(session.len() == 3, "unexpected length {}", session.len());
    ensure!(
        session.documents() == [json!(null), json!(null), json!({"a": 1})],
        "unexpected documents {:?}",
        session.documents()
    );
    Ok(())
}

#[test]
fn overflowing_indices_are_rejected() {
    let mut session = Session::new();
    let err = session.apply_patch(usize::MAX, json!({"a": 1})).unwrap_err();
    assert!(matches!(err, StrataError::InvalidIndex { .. }), "unexpected {err:?}");
    assert!(session.is_empty());
}

#[test]
fn failed_patches_leave_the_session_unchanged() -> Result<()> {
    let mut session = Session::new();
    to_anyhow(session.apply_patch(0, json!({"ports": [80]})))?;
    ensure!(session.apply_patch(0, json!({"ports": {"http": 80}})).is_err());
    ensure!(session.len() == 1, "session grew to {}", session.len());
    ensure!(
        to_anyhow(session.document(0))? == json!({"ports": [80]}),
        "document changed by a failed patch"
    );
    Ok(())
}

#[rstest]
fn match_patches_every_matching_document(mut services: Session) -> Result<()> {
    to_anyhow(services.apply_patch(0, json!({"$match": {"kind": "Service"}, "tls": true})))?;
    let tls: Vec<_> = services
        .documents()
        .iter()
        .map(|doc| doc.get("tls").cloned())
        .collect();
    ensure!(
        tls == [Some(json!(true)), None, Some(json!(true))],
        "unexpected tls flags {tls:?}"
    );
    Ok(())
}

#[rstest]
fn match_ignores_the_index(mut services: Session) -> Result<()> {
    to_anyhow(services.apply_patch(9, json!({"$match": {"name": "db"}, "port": 5433})))?;
    ensure!(services.len() == 3, "the session grew to {}", services.len());
    ensure!(
        to_anyhow(services.document(2))?.get("port") == Some(&json!(5433)),
        "db port not patched"
    );
    Ok(())
}

#[rstest]
fn unmatched_patterns_fail(mut services: Session) {
    let err = services
        .apply_patch(0, json!({"$match": {"kind": "Ingress"}, "x": 1}))
        .unwrap_err();
    assert!(matches!(err, StrataError::NoMatchFound { .. }), "unexpected {err:?}");
}

#[rstest]
fn null_match_is_positional(mut services: Session) -> Result<()> {
    to_anyhow(services.apply_patch(1, json!({"$match": null, "replicas": 2})))?;
    ensure!(
        to_anyhow(services.document(1))?
            == json!({"kind": "Deployment", "name": "web", "replicas": 2}),
        "unexpected document"
    );
    Ok(())
}

#[rstest]
fn merging_a_session_replays_positional_patches(services: Session) -> Result<()> {
    let patches = [json!({"port": 8080}), json!({"replicas": 3})];

    let mut merged = services.clone();
    let mut other = Session::new();
    for (index, patch) in patches.iter().enumerate() {
        to_anyhow(other.apply_patch(index, patch.clone()))?;
    }
    to_anyhow(merged.merge_session(&other))?;

    let mut replayed = services;
    for (index, patch) in patches.into_iter().enumerate() {
        to_anyhow(replayed.apply_patch(index, patch))?;
    }
    ensure!(
        merged.documents() == replayed.documents(),
        "merge_session diverged from sequential patches"
    );
    let provenance = to_anyhow(merged.document_ref(0))?.parents().len();
    ensure!(provenance == 1, "expected one recorded parent, got {provenance}");
    Ok(())
}

#[test]
fn accessors_reject_out_of_range_indices() {
    let session = Session::new();
    assert!(session.is_empty());
    let err = session.document(0).unwrap_err();
    assert_eq!(err.to_string(), "document index 0 out of range (session holds 0)");
}

#[test]
fn accessors_return_copies() -> Result<()> {
    let mut session = Session::new();
    to_anyhow(session.apply_patch(0, json!({"a": 1})))?;
    let mut copy = to_anyhow(session.document(0))?;
    if let Some(map) = copy.as_object_mut() {
        map.insert("a".to_owned(), json!(2));
    }
    ensure!(to_anyhow(session.document(0))? == json!({"a": 1}), "session tree was aliased");
    Ok(())
}

#[test]
fn patches_are_canonicalised() -> Result<()> {
    let mut session = Session::new();
    to_anyhow(session.apply_patch(0, json!({"n": 2.0})))?;
    ensure!(to_anyhow(session.document(0))? == json!({"n": 2}), "float survived");
    Ok(())
}

#[test]
fn layered_files_merge_oldest_first() -> Result<()> {
    let dir = LayerDir::new()?;
    dir.write("base.yaml", "name: web\nports: [80]\ndebug: true\n---\nkind: Extra\n")?;
    let leaf = dir.write(
        "app.yaml",
        "$parent: base.yaml\nports: [443]\ndebug: null\n",
    )?;
    let mut session = Session::new();
    to_anyhow(session.merge_file_layers(&leaf))?;
    ensure!(
        session.documents() == [json!({"name": "web", "ports": [80, 443]}), json!({"kind": "Extra"})],
        "unexpected documents {:?}",
        session.documents()
    );
    Ok(())
}

#[test]
fn merge_file_ignores_parents() -> Result<()> {
    let dir = LayerDir::new()?;
    dir.write("base.yaml", "name: web\n")?;
    let leaf = dir.write("app.yaml", "$parent: base.yaml\nport: 80\n")?;
    let mut session = Session::new();
    to_anyhow(session.merge_file(&leaf))?;
    ensure!(session.documents() == [json!({"port": 80})], "parent was merged");
    Ok(())
}

#[test]
fn merge_failures_name_file_and_document() -> Result<()> {
    let dir = LayerDir::new()?;
    dir.write("base.yaml", "a: 1\n---\nports: [80]\n")?;
    let leaf = dir.write("app.yaml", "$parent: base.yaml\n---\nports: {http: 80}\n")?;
    let mut session = Session::new();
    let err = session
        .merge_file_layers(&leaf)
        .err()
        .ok_or_else(|| anyhow!("expected a type mismatch"))?;
    ensure!(
        err.to_string() == format!("[{leaf}:doc1]: ports: cannot merge map into list"),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn outputs_follow_selection_and_processing() -> Result<()> {
    let mut session = Session::new();
    to_anyhow(session.apply_patch(
        0,
        json!({
            "image": "web:1",
            "svc": {"$output": true, "image": "$replace:image"},
            "job": {"$output": true, "cmd": ["run"]},
        }),
    ))?;
    to_anyhow(session.apply_patch(1, json!({"$output": false, "ignored": true})))?;
    to_anyhow(session.apply_patch(2, json!({"plain": 1})))?;

    let outputs = to_anyhow(session.output_documents())?;
    ensure!(
        outputs
            == [
                json!({"cmd": ["run"]}),
                json!({"image": "web:1"}),
                json!({"plain": 1})
            ],
        "unexpected outputs {outputs:?}"
    );
    ensure!(
        to_anyhow(session.outputs("json"))?
            == ["{\"cmd\":[\"run\"]}", "{\"image\":\"web:1\"}", "{\"plain\":1}"],
        "unexpected encoded outputs"
    );
    ensure!(to_anyhow(session.output_index(1, "json"))?.is_empty(), "omitted document emitted");
    Ok(())
}

#[test]
fn processing_failures_name_the_document() {
    let mut session = Session::new();
    session
        .apply_patch(0, json!({"a": "$merge:missing"}))
        .expect("patch should apply");
    let err = session.output_documents().unwrap_err();
    assert_eq!(err.to_string(), "[doc0]: a: $merge reference not found: missing");
}

#[test]
fn leftover_required_markers_fail_output() {
    let mut session = Session::new();
    session
        .apply_patch(0, json!({"image": "$required"}))
        .expect("patch should apply");
    let err = session.output("json").unwrap_err();
    assert_eq!(err.to_string(), "[doc0]: required value missing at image");
}

#[test]
fn writer_output_defaults_to_pretty_json() -> Result<()> {
    let mut session = Session::new();
    to_anyhow(session.apply_patch(0, json!({"a": 1})))?;
    let mut buffer = Vec::new();
    to_anyhow(session.output_to_writer(&mut buffer, ""))?;
    ensure!(buffer == b"{\n  \"a\": 1\n}\n", "unexpected output {buffer:?}");
    Ok(())
}

#[test]
fn file_output_infers_the_format() -> Result<()> {
    let dir = LayerDir::new()?;
    let mut session = Session::new();
    to_anyhow(session.apply_patch(0, json!({"a": 1})))?;
    let target = dir.path("out.yaml");
    to_anyhow(session.output_to_file(&target, ""))?;
    ensure!(dir.read("out.yaml")? == "a: 1\n", "unexpected file contents");
    Ok(())
}

#[cfg(unix)]
#[test]
fn file_output_is_world_readable() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = LayerDir::new()?;
    let mut session = Session::new();
    to_anyhow(session.apply_patch(0, json!({"a": 1})))?;
    let target = dir.path("out.json");
    to_anyhow(session.output_to_file(&target, ""))?;
    let mode = std::fs::metadata(&target)?.permissions().mode() & 0o777;
    ensure!(mode == 0o644, "unexpected mode {mode:o}");
    Ok(())
}

#[test]
fn failed_file_output_leaves_no_trace() -> Result<()> {
    let dir = LayerDir::new()?;
    dir.write("existing.json", "old")?;
    let mut session = Session::new();
    to_anyhow(session.apply_patch(0, json!({"a": "$merge:missing"})))?;

    ensure!(session.output_to_file(&dir.path("fresh.json"), "").is_err());
    ensure!(!dir.path("fresh.json").exists(), "output file created on failure");

    ensure!(session.output_to_file(&dir.path("existing.json"), "").is_err());
    ensure!(dir.read("existing.json")? == "old", "existing output truncated");

    let leftovers = std::fs::read_dir(dir.root())?.count();
    ensure!(leftovers == 1, "temporary files left behind: {leftovers}");
    Ok(())
}

#[test]
fn custom_registries_restrict_formats() -> Result<()> {
    let mut registry = FormatRegistry::empty();
    registry.register("json", Arc::new(Json));
    let mut session = Session::with_registry(Arc::new(registry));
    to_anyhow(session.apply_patch(0, json!({"a": 1})))?;
    let err = session.output("yaml").err();
    ensure!(
        matches!(err, Some(StrataError::UnknownFormat { .. })),
        "unexpected {err:?}"
    );
    let rendered: Value = serde_json::from_str(&to_anyhow(session.output("json"))?)?;
    ensure!(rendered == json!({"a": 1}), "unexpected {rendered}");
    Ok(())
}
