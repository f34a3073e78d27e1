//! Binary entry point: resolve settings, start logging, open the catalog
//! database and hand it to the TUI until the user exits.
use library_catalog::{run_app, telemetry, App, Catalog, Database, Settings};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    telemetry::init(&settings.log_path)?;
    info!(database = %settings.database_path.display(), "starting library catalog");

    let database = Database::open(&settings.database_path)?;
    let mut app = App::new(Box::new(Catalog::new(database)))?;
    let result = run_app(&mut app);

    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "library catalog exited with an error");
    }
    result
}
