//! Tests covering layer loading and `$parent` resolution.

use anyhow::{Result, anyhow, ensure};
use rstest::{fixture, rstest};
use serde_json::json;
use test_helpers::layers::LayerDir;

use super::{Parent, load_chain, load_layer, write_atomic};
use crate::document::Document;
use crate::error::StrataError;
use crate::format::FormatRegistry;

#[fixture]
fn registry() -> FormatRegistry {
    FormatRegistry::builtin()
}

fn to_anyhow<T>(result: crate::StrataResult<T>) -> Result<T> {
    result.map_err(|err| anyhow!(err.to_string()))
}

#[rstest]
fn declared_parent_is_relative_to_the_layer(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    let child = dir.write("env/prod.yaml", "$parent: ../base.yaml\nreplicas: 3\n")?;
    let layer = to_anyhow(load_layer(&child, &registry))?;
    ensure!(
        layer.parent() == &Parent::Path(dir.path("env/../base.yaml")),
        "unexpected parent {:?}",
        layer.parent()
    );
    let data: Vec<_> = layer.documents().iter().map(Document::data).collect();
    ensure!(data == [&json!({"replicas": 3})], "$parent leaked into {data:?}");
    Ok(())
}

#[rstest]
fn parent_false_ends_the_chain(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    dir.write("app.yaml", "name: web\n")?;
    let child = dir.write("app.prod.yaml", "$parent: false\nreplicas: 3\n")?;
    let layer = to_anyhow(load_layer(&child, &registry))?;
    ensure!(layer.parent() == &Parent::None, "dotted parent was implied");
    Ok(())
}

#[rstest]
fn parent_is_stripped_from_every_document(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    let path = dir.write(
        "multi.yaml",
        "$parent: false\na: 1\n---\n$parent: ignored.yaml\nb: 2\n",
    )?;
    let layer = to_anyhow(load_layer(&path, &registry))?;
    let data: Vec<_> = layer.documents().iter().map(Document::data).collect();
    ensure!(
        data == [&json!({"a": 1}), &json!({"b": 2})],
        "unexpected documents {data:?}"
    );
    Ok(())
}

#[rstest]
#[case("$parent: 3\n", "expected a path or false, found number")]
#[case("$parent: true\n", "expected a path or false, found bool")]
#[case("$parent: ''\n", "must be a non-empty path")]
fn malformed_parents_are_rejected(
    registry: FormatRegistry,
    #[case] contents: &str,
    #[case] fragment: &str,
) -> Result<()> {
    let dir = LayerDir::new()?;
    let path = dir.write("bad.yaml", contents)?;
    let err = load_layer(&path, &registry).map(|_| ()).err();
    let Some(StrataError::InvalidParent { message, .. }) = &err else {
        return Err(anyhow!("expected InvalidParent, got {err:?}"));
    };
    ensure!(message.contains(fragment), "unexpected message {message}");
    Ok(())
}

#[rstest]
fn implied_parent_prefers_any_existing_extension(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    let base = dir.write("app.toml", "name = \"web\"\n")?;
    let child = dir.write("app.prod.yaml", "replicas: 3\n")?;
    let layer = to_anyhow(load_layer(&child, &registry))?;
    ensure!(layer.parent() == &Parent::Path(base), "unexpected {:?}", layer.parent());
    Ok(())
}

#[rstest]
fn implied_parent_is_absent_without_a_base_file(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    let child = dir.write("app.prod.yaml", "replicas: 3\n")?;
    let layer = to_anyhow(load_layer(&child, &registry))?;
    ensure!(layer.parent() == &Parent::None, "unexpected {:?}", layer.parent());
    Ok(())
}

#[rstest]
fn chains_load_oldest_first(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    dir.write("base.json", "{\"name\": \"web\"}")?;
    dir.write("app.yaml", "$parent: base.json\nport: 80\n")?;
    let leaf = dir.write("app.prod.yaml", "port: 443\n")?;
    let chain = to_anyhow(load_chain(&leaf, &registry))?;
    let names: Vec<_> = chain
        .iter()
        .filter_map(|layer| layer.path().file_name())
        .collect();
    ensure!(
        names == ["base.json", "app.yaml", "app.prod.yaml"],
        "unexpected chain {names:?}"
    );
    Ok(())
}

#[rstest]
fn chains_resolve_parents_without_extensions(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    dir.write("base.toml", "name = \"web\"\n")?;
    let leaf = dir.write("app.yaml", "$parent: base\nport: 80\n")?;
    let chain = to_anyhow(load_chain(&leaf, &registry))?;
    ensure!(chain.len() == 2, "expected two layers, got {}", chain.len());
    Ok(())
}

#[rstest]
fn cycles_name_every_layer(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    let a = dir.write("a.yaml", "$parent: b.yaml\n")?;
    let b = dir.write("b.yaml", "$parent: a.yaml\n")?;
    let Err(StrataError::CyclicParent { cycle }) = load_chain(&a, &registry) else {
        return Err(anyhow!("expected a cycle"));
    };
    ensure!(cycle == format!("{a} -> {b} -> {a}"), "unexpected cycle {cycle}");
    Ok(())
}

#[rstest]
fn self_parenting_is_a_cycle(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    let a = dir.write("a.yaml", "$parent: a.yaml\nx: 1\n")?;
    let err = load_chain(&a, &registry).err();
    ensure!(
        matches!(err, Some(StrataError::CyclicParent { .. })),
        "unexpected {err:?}"
    );
    Ok(())
}

#[rstest]
fn missing_parents_name_the_referencing_layer(registry: FormatRegistry) -> Result<()> {
    let dir = LayerDir::new()?;
    let leaf = dir.write("app.yaml", "$parent: gone.yaml\n")?;
    let err = load_chain(&leaf, &registry)
        .err()
        .ok_or_else(|| anyhow!("expected a missing parent error"))?;
    let rendered = err.to_string();
    ensure!(
        rendered.contains("gone.yaml") && rendered.contains("referenced from"),
        "unexpected error {rendered}"
    );
    Ok(())
}

#[rstest]
#[case("broken.json", "{\"a\":")]
#[case("notes.txt", "a: 1\n")]
#[case("noext", "a: 1\n")]
fn unreadable_layers_are_file_errors(
    registry: FormatRegistry,
    #[case] name: &str,
    #[case] contents: &str,
) -> Result<()> {
    let dir = LayerDir::new()?;
    let path = dir.write(name, contents)?;
    let err = load_layer(&path, &registry).err();
    ensure!(
        matches!(err, Some(StrataError::File { .. })),
        "unexpected {err:?}"
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn written_files_are_world_readable() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let dir = LayerDir::new()?;
    let target = dir.path("out.json");
    write_atomic(&target, b"{}\n")?;
    let mode = std::fs::metadata(&target)?.permissions().mode() & 0o777;
    ensure!(mode == 0o644, "unexpected mode {mode:o}");
    Ok(())
}

#[cfg(unix)]
#[test]
fn replaced_files_keep_their_permissions() -> Result<()> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    let dir = LayerDir::new()?;
    let target = dir.write("out.yaml", "old: true\n")?;
    std::fs::set_permissions(&target, Permissions::from_mode(0o640))?;
    write_atomic(&target, b"new: true\n")?;
    ensure!(dir.read("out.yaml")? == "new: true\n", "contents not replaced");
    let mode = std::fs::metadata(&target)?.permissions().mode() & 0o777;
    ensure!(mode == 0o640, "unexpected mode {mode:o}");
    Ok(())
}
