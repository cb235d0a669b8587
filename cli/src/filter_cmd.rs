use anyhow::Context;
use anyhow::Result;
use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use pastillas_search::EngineConfig;
use pastillas_search::FacetBucket;
use pastillas_search::FilterStore;
use pastillas_search::Position;
use pastillas_search::load_products;
use pastillas_search::summarize;
use serde_json::Value;
use serde_json::json;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Filter a brake-pad catalog by vehicle, position, cross reference and size.
#[derive(Debug, Parser)]
#[command(name = "pastillas", version)]
pub struct FilterArgs {
    /// Catalog file: a JSON array of products.
    #[arg(long = "catalog", value_name = "FILE")]
    pub catalog: PathBuf,

    /// Free-text query; every term must appear somewhere in the product.
    #[arg(long = "query", short = 'q')]
    pub query: Option<String>,

    #[arg(long = "brand")]
    pub brand: Option<String>,

    /// Matches both model and series.
    #[arg(long = "model")]
    pub model: Option<String>,

    /// Partial years match, e.g. `201` finds 2010 through 2019.
    #[arg(long = "year")]
    pub year: Option<String>,

    /// Installation position; repeat to require both.
    #[arg(long = "position", value_enum, action = ArgAction::Append)]
    pub positions: Vec<PositionArg>,

    #[arg(long = "oem")]
    pub oem: Option<String>,

    #[arg(long = "fmsi")]
    pub fmsi: Option<String>,

    /// Pad width in millimetres.
    #[arg(long = "width")]
    pub width: Option<String>,

    /// Pad height in millimetres.
    #[arg(long = "height")]
    pub height: Option<String>,

    /// Product id to treat as a favorite; repeatable.
    #[arg(long = "favorite", value_name = "ID", action = ArgAction::Append)]
    pub favorites: Vec<String>,

    #[arg(long = "favorites-only")]
    pub favorites_only: bool,

    /// Engine settings (TOML).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a JSON document instead of text.
    #[arg(long = "json")]
    pub json: bool,

    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
pub enum PositionArg {
    Delantera,
    Trasera,
}

impl From<PositionArg> for Position {
    fn from(value: PositionArg) -> Self {
        match value {
            PositionArg::Delantera => Position::Front,
            PositionArg::Trasera => Position::Rear,
        }
    }
}

pub fn run(args: &FilterArgs) -> Result<()> {
    let store = build_store(args)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let document = render_json(&store);
        serde_json::to_writer_pretty(&mut out, &document).context("failed to write JSON")?;
        writeln!(out)?;
    } else {
        write_text(&mut out, &store)?;
    }
    Ok(())
}

pub fn build_store(args: &FilterArgs) -> Result<FilterStore> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let catalog = load_products(&args.catalog)
        .with_context(|| format!("failed to load catalog {}", args.catalog.display()))?;
    info!(
        products = catalog.products.len(),
        skipped = catalog.skipped,
        "catalog loaded"
    );

    let mut store = FilterStore::new(config);
    store.set_products(catalog.products);
    store.set_favorites(args.favorites.iter().cloned());

    // Structured facets clear the query, so the query goes last to keep both.
    let setters: [(&Option<String>, fn(&mut FilterStore, &str) -> bool); 8] = [
        (&args.brand, FilterStore::set_selected_brand),
        (&args.model, FilterStore::set_selected_model),
        (&args.year, FilterStore::set_selected_year),
        (&args.oem, FilterStore::set_oem_reference),
        (&args.fmsi, FilterStore::set_fmsi_reference),
        (&args.width, FilterStore::set_width),
        (&args.height, FilterStore::set_height),
        (&args.query, FilterStore::set_search_query),
    ];
    for (value, setter) in setters {
        if let Some(value) = value {
            setter(&mut store, value);
        }
    }
    let positions: BTreeSet<PositionArg> = args.positions.iter().copied().collect();
    for position in positions {
        store.toggle_position(position.into());
    }
    if args.favorites_only {
        store.set_show_favorites_only(true);
    }
    Ok(store)
}

fn render_json(store: &FilterStore) -> Value {
    let products: Vec<Value> = store
        .filtered()
        .iter()
        .map(|product| {
            json!({
                "id": product.id,
                "referencia": product.reference,
                "ref": product.references,
                "aplicaciones": product.application_count(),
                "resumen": product.application_summary(),
                "favorito": store.is_favorite(&product.id),
            })
        })
        .collect();
    json!({
        "filters": store.filters(),
        "summary": summarize(store.filters()),
        "resultCount": store.result_count(),
        "totalApplications": store.total_applications(),
        "favoritesCount": store.favorites_count(),
        "facets": store.facet_options(),
        "products": products,
    })
}

fn write_text(out: &mut impl Write, store: &FilterStore) -> Result<()> {
    writeln!(out, "{}", summarize(store.filters()))?;
    writeln!(
        out,
        "{} productos · {} aplicaciones",
        store.result_count(),
        store.total_applications()
    )?;
    for product in store.filtered() {
        let reference = product.reference.as_deref().unwrap_or("-");
        let marker = if store.is_favorite(&product.id) { "*" } else { " " };
        writeln!(
            out,
            "{marker} {:<10} {reference:<14} {}",
            product.id,
            product.application_summary()
        )?;
    }
    let facets = store.facet_options();
    write_buckets(out, "Marcas", &facets.brands)?;
    write_buckets(out, "Modelos", &facets.models)?;
    write_buckets(out, "Años", &facets.years)?;
    Ok(())
}

fn write_buckets(out: &mut impl Write, label: &str, buckets: &[FacetBucket]) -> Result<()> {
    if buckets.is_empty() {
        return Ok(());
    }
    let rendered: Vec<String> = buckets
        .iter()
        .map(|bucket| format!("{} ({})", bucket.value, bucket.count))
        .collect();
    writeln!(out, "{label}: {}", rendered.join(", "))?;
    Ok(())
}
