use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

const CATALOG: &str = r#"[
    {
        "id": "p-100",
        "referencia": "7291",
        "ref": ["K7291 7291BP"],
        "oem": ["04465-0D020"],
        "posicion": "DELANTERA",
        "medidas": { "ancho": 100, "alto": "45" },
        "aplicaciones": [
            { "marca": "Toyota", "modelo": "Yaris", "año": "2008" },
            { "marca": "Toyota", "modelo": "Corolla", "año": "2015" }
        ]
    },
    {
        "id": "p-200",
        "referencia": "8120",
        "ref": ["K8120"],
        "fmsi": ["D1210"],
        "posicion": "AMBAS",
        "medidas": { "ancho": 120, "alto": 50 },
        "aplicaciones": [ { "marca": "Citroën", "modelo": "C3", "año": 2012 } ]
    },
    "corrupt entry"
]"#;

fn write_catalog(dir: &TempDir) -> Result<PathBuf> {
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, CATALOG)?;
    Ok(path)
}

fn pastillas(catalog: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("pastillas")?;
    cmd.env_remove("RUST_LOG");
    cmd.arg("--catalog").arg(catalog);
    Ok(cmd)
}

#[test]
fn lists_every_product_without_filters() -> Result<()> {
    let dir = TempDir::new()?;
    let catalog = write_catalog(&dir)?;

    pastillas(&catalog)?
        .assert()
        .success()
        .stdout(contains("Búsqueda general"))
        .stdout(contains("2 productos · 3 aplicaciones"))
        .stdout(contains("Toyota Yaris, +1 más"))
        .stderr(contains("skipping catalog entry 2"));
    Ok(())
}

#[test]
fn accent_insensitive_brand_filter() -> Result<()> {
    let dir = TempDir::new()?;
    let catalog = write_catalog(&dir)?;

    pastillas(&catalog)?
        .args(["--brand", "citroen"])
        .assert()
        .success()
        .stdout(contains("p-200").and(contains("p-100").not()))
        .stdout(contains("1 productos · 1 aplicaciones"));
    Ok(())
}

#[test]
fn json_output_reports_filters_and_results() -> Result<()> {
    let dir = TempDir::new()?;
    let catalog = write_catalog(&dir)?;

    let output = pastillas(&catalog)?
        .args(["--json", "--width", "98", "--position", "delantera"])
        .output()?;
    assert!(output.status.success());
    let document: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(document["resultCount"], 1);
    assert_eq!(document["products"][0]["id"], "p-100");
    assert_eq!(document["filters"]["width"], "98");
    assert_eq!(document["filters"]["selectedPositions"][0], "delantera");
    assert_eq!(document["summary"], "98x");
    Ok(())
}

#[test]
fn favorites_only_shows_marked_products() -> Result<()> {
    let dir = TempDir::new()?;
    let catalog = write_catalog(&dir)?;

    let output = pastillas(&catalog)?
        .args(["--json", "--favorite", "p-200", "--favorites-only"])
        .output()?;
    assert!(output.status.success());
    let document: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(document["favoritesCount"], 1);
    assert_eq!(document["products"][0]["favorito"], true);
    assert_eq!(document["resultCount"], 1);
    Ok(())
}

#[test]
fn config_tolerance_is_applied() -> Result<()> {
    let dir = TempDir::new()?;
    let catalog = write_catalog(&dir)?;
    let config = dir.path().join("engine.toml");
    std::fs::write(&config, "dimension_tolerance_mm = 0.5\n")?;

    pastillas(&catalog)?
        .arg("--config")
        .arg(&config)
        .args(["--width", "99"])
        .assert()
        .success()
        .stdout(contains("0 productos"));
    Ok(())
}

#[test]
fn missing_catalog_fails_with_context() -> Result<()> {
    let dir = TempDir::new()?;
    let missing = dir.path().join("nope.json");

    pastillas(&missing)?
        .assert()
        .failure()
        .stderr(contains("failed to load catalog"));
    Ok(())
}
