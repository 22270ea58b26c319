use querylet::{Data, Embedded, Querylet};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

static QUERIES: Embedded = querylet::directory!("templates");

fn main() -> Result<(), querylet::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let querylet = Querylet::new(QUERIES);
    info!(templates = QUERIES.names().count(), "loaded embedded queries");

    let user = Data::from_json(json!({ "id": 42 }))?;
    println!("{}", querylet.compile("{{> object 'users.show' }}")?.call(user)?);

    let search = Data::from_json(json!({ "q": "tubby", "ids": [1, 2, 3], "limit": 20 }))?;
    println!("{}", querylet.render("users.search", search)?);

    Ok(())
}
