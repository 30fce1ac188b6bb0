//! Terminal driver for admin-scaffold against a live API.
//!
//! Run from repo root: `cargo run -p admin-console -- <entity> [search]`
//! Without arguments it lists the configured entity ids.

use admin_scaffold::{
    builtin_catalog, load_from_path, resolve, ClientSettings, EntityCatalog, EntityListPage, HttpTransport,
    ListRender,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("admin_scaffold=info")),
        )
        .init();

    let settings = ClientSettings::from_env()?;
    let catalog = load_catalog(&settings).await?;

    let mut args = std::env::args().skip(1);
    let Some(entity) = args.next() else {
        println!("entities: {}", catalog.ids().collect::<Vec<_>>().join(", "));
        return Ok(());
    };
    let search = args.collect::<Vec<_>>().join(" ");
    let schema = catalog
        .entity(&entity)
        .ok_or_else(|| format!("unknown entity '{}'", entity))?;

    let transport = Arc::new(HttpTransport::from_settings(&settings));
    tracing::info!(base_url = %settings.base_url, entity = %entity, "admin console starting");
    let mut page = EntityListPage::new(schema, transport, &settings);
    page.mount().await;
    if !search.is_empty() {
        page.set_search(&search);
        page.settle().await;
    }

    for note in page.take_notifications() {
        eprintln!("{:?}: {}", note.severity, note.message);
    }
    match page.view() {
        ListRender::Empty { create_label } => {
            println!("No records. {}", create_label.unwrap_or_default());
        }
        ListRender::Table(table) => {
            let headers: Vec<&str> = table.headers.iter().map(|h| h.label.as_str()).collect();
            println!("{}", headers.join(" | "));
            for row in &table.rows {
                println!("{}", row.cells.join(" | "));
            }
            println!(
                "page {}/{} ({} records)",
                page.query().page() + 1,
                page.query().page_count(table.row_count),
                table.row_count
            );
        }
    }
    Ok(())
}

async fn load_catalog(settings: &ClientSettings) -> Result<EntityCatalog, Box<dyn std::error::Error>> {
    match &settings.catalog_path {
        Some(path) => Ok(resolve(&load_from_path(path).await?)?),
        None => Ok(builtin_catalog()?),
    }
}
