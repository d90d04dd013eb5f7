//! End-to-end layering scenarios across files, directives and diffs.

use anyhow::{Result, anyhow, ensure};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use strata::{Session, StrataError, intersect, merge, subtract};
use test_helpers::layers::LayerDir;

fn to_anyhow<T>(result: strata::StrataResult<T>) -> Result<T> {
    result.map_err(|err| anyhow!(err.to_string()))
}

const SERVICE_BASE: &str = concat!(
    "kind: Service\n",
    "metadata:\n",
    "  name: web\n",
    "spec:\n",
    "  ports: [80]\n",
    "---\n",
    "kind: Deployment\n",
    "metadata:\n",
    "  name: web\n",
    "spec:\n",
    "  replicas: 1\n",
    "  image: $required\n",
);

const PROD_OVERRIDE: &str = concat!(
    "$parent: base.yaml\n",
    "$match:\n",
    "  kind: Deployment\n",
    "spec:\n",
    "  replicas: 3\n",
    "  image: web:2\n",
);

#[fixture]
fn deployment() -> LayerDir {
    let dir = LayerDir::new().expect("create layer directory");
    dir.write("base.yaml", SERVICE_BASE).expect("write base layer");
    dir.write("prod.yaml", PROD_OVERRIDE).expect("write prod layer");
    dir
}

#[rstest]
fn match_patches_land_on_the_selected_document(deployment: LayerDir) -> Result<()> {
    let mut session = Session::new();
    to_anyhow(session.merge_file_layers(&deployment.path("prod.yaml")))?;
    let outputs = to_anyhow(session.output_documents())?;
    ensure!(
        outputs
            == [
                json!({"kind": "Service", "metadata": {"name": "web"}, "spec": {"ports": [80]}}),
                json!({
                    "kind": "Deployment",
                    "metadata": {"name": "web"},
                    "spec": {"replicas": 3, "image": "web:2"},
                }),
            ],
        "unexpected outputs {outputs:?}"
    );
    Ok(())
}

#[rstest]
fn base_layers_alone_still_need_their_required_values(deployment: LayerDir) -> Result<()> {
    let mut session = Session::new();
    to_anyhow(session.merge_file_layers(&deployment.path("base.yaml")))?;
    let err = session
        .output("yaml")
        .err()
        .ok_or_else(|| anyhow!("expected a missing required value"))?;
    ensure!(
        matches!(err.root_cause(), StrataError::RequiredValueMissing { .. }),
        "unexpected error {err}"
    );
    ensure!(
        err.to_string() == "[doc1]: required value missing at spec.image",
        "unexpected message {err}"
    );
    Ok(())
}

#[rstest]
fn layers_may_mix_formats_and_omit_extensions() -> Result<()> {
    let dir = LayerDir::new()?;
    dir.write("base.toml", "name = \"web\"\n[limits]\ncpu = 1.0\nmemory = \"1Gi\"\n")?;
    let leaf = dir.write(
        "app.json",
        r#"{"$parent": "base", "limits": {"cpu": 2, "memory": null}}"#,
    )?;
    let mut session = Session::new();
    to_anyhow(session.merge_file_layers(&leaf))?;
    ensure!(
        to_anyhow(session.document(0))? == json!({"name": "web", "limits": {"cpu": 2}}),
        "unexpected document {:?}",
        session.documents()
    );
    Ok(())
}

#[test]
fn selectors_reuse_other_documents_and_encode_results() -> Result<()> {
    let mut session = Session::new();
    to_anyhow(session.apply_patch(
        0,
        json!({"$output": false, "defaults": {"image": "web:1", "replicas": 1}}),
    ))?;
    to_anyhow(session.apply_patch(
        1,
        json!({
            "app": {"$merge": {"index": 0, "path": "defaults"}, "name": "web"},
            "config": {"$encode": "json", "debug": true},
            "args": ["--verbose", {"$encode": "json"}],
        }),
    ))?;
    let outputs = to_anyhow(session.output_documents())?;
    ensure!(
        outputs
            == [json!({
                "app": {"image": "web:1", "name": "web", "replicas": 1},
                "config": "{\"debug\":true}",
                "args": "[\"--verbose\"]",
            })],
        "unexpected outputs {outputs:?}"
    );
    Ok(())
}

#[test]
fn derived_layers_rebuild_the_original() -> Result<()> {
    let staging = json!({"name": "web", "image": "web:1", "env": {"A": "1", "B": "3"}});
    let prod = json!({"name": "web", "image": "web:2", "env": {"A": "1", "B": "2"}});

    let base = to_anyhow(intersect(prod.clone(), staging))?;
    ensure!(
        base == json!({"name": "web", "image": "$required", "env": {"A": "1", "B": "$required"}}),
        "unexpected base {base}"
    );
    let overlay = to_anyhow(subtract(prod.clone(), base.clone()))?;
    ensure!(
        overlay == json!({"image": "web:2", "env": {"B": "2"}}),
        "unexpected overlay {overlay}"
    );

    let mut session = Session::new();
    to_anyhow(session.apply_patch(0, base))?;
    to_anyhow(session.apply_patch(0, overlay))?;
    let rebuilt: Value = serde_json::from_str(&to_anyhow(session.output("json"))?)?;
    ensure!(rebuilt == prod, "rebuilt {rebuilt}");
    Ok(())
}

#[test]
fn patch_replace_discards_inherited_maps() -> Result<()> {
    let merged = to_anyhow(merge(
        json!({"resources": {"cpu": 1, "memory": "1Gi"}, "tags": ["a", "b"]}),
        json!({"resources": {"$patch": "replace", "cpu": 4}, "tags": [{"$patch": "replace"}, "c"]}),
    ))?;
    ensure!(
        merged == json!({"resources": {"cpu": 4}, "tags": ["b", "c"]}),
        "unexpected merge {merged}"
    );
    Ok(())
}
