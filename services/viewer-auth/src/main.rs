//! Viewer Auth - dry-run entry point
//!
//! Reads one viewer-request event (JSON) from stdin, classifies it without
//! contacting any collaborator and prints the selected route on stdout.

use tracing::info;

use viewer_auth::observability::init_logging;
use viewer_auth::{AuthEdgeError, AuthEdgeLogger, Classifier, Config, ViewerRequestEvent};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AuthEdgeError> {
    let config = Config::from_env()?;
    init_logging(&config)?;

    let request = ViewerRequestEvent::read_from(tokio::io::stdin())
        .await?
        .into_request()?;
    info!(uri = %request.uri, "Classifying viewer request");

    let settings = config.routing_settings();
    let logger = AuthEdgeLogger::default();
    let classification = Classifier::new(&settings, &logger).classify(&request)?;

    println!("{}", serde_json::to_string_pretty(&classification.route)?);
    Ok(())
}
