use crate::error::CatalogError;
use crate::error::Result;
use crate::model::Product;
use serde_json::Value;
use std::path::Path;
use tracing::debug;
use tracing::warn;

/// Products decoded from a catalog payload plus how many entries were
/// unusable.
#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub products: Vec<Product>,
    pub skipped: usize,
}

/// Decodes a catalog payload: either a bare JSON array of products or an
/// object wrapping one under `products`. Entries that cannot become a
/// product (not an object, no usable id) are skipped, never fatal.
pub fn parse_products(raw: &str) -> Result<CatalogLoad> {
    let value: Value = serde_json::from_str(raw)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("products") {
            Some(Value::Array(items)) => items,
            _ => return Err(CatalogError::UnexpectedShape),
        },
        _ => return Err(CatalogError::UnexpectedShape),
    };

    let mut load = CatalogLoad::default();
    for (position, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Product>(item) {
            Ok(product) => load.products.push(product),
            Err(err) => {
                warn!("skipping catalog entry {position}: {err}");
                load.skipped += 1;
            }
        }
    }
    debug!(
        loaded = load.products.len(),
        skipped = load.skipped,
        "parsed catalog"
    );
    Ok(load)
}

pub fn load_products(path: &Path) -> Result<CatalogLoad> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_products(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn bad_entries_are_skipped_individually() {
        let raw = r#"[
            { "id": "1", "referencia": "7291" },
            "not a product",
            { "referencia": "missing id" },
            { "id": 2, "aplicaciones": 5 }
        ]"#;
        let load = parse_products(raw).expect("catalog");
        let ids: Vec<&str> = load.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(load.skipped, 2);
    }

    #[test]
    fn wrapped_product_list_is_accepted() {
        let load = parse_products(r#"{ "products": [ { "id": "x" } ] }"#).expect("catalog");
        assert_eq!(load.products.len(), 1);
    }

    #[test]
    fn scalar_payload_is_rejected() {
        assert!(matches!(
            parse_products("42"),
            Err(CatalogError::UnexpectedShape)
        ));
        assert!(matches!(parse_products("{"), Err(CatalogError::Json(_))));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"[ { "id": "a" } ]"#).expect("write catalog");
        assert_eq!(load_products(&path).expect("load").products.len(), 1);
    }
}
