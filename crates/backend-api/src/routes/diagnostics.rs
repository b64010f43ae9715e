use tracing::{debug, error, info, warn};

/// Emits one event per level so the active log filter can be checked.
#[utoipa::path(
    get,
    path = "/loggertest",
    tag = "Health",
    responses((status = 200, description = "Log lines written", body = String))
)]
pub async fn logger_test() -> &'static str {
    error!("error");
    debug!("debug test");
    info!("Informacion");
    warn!("Warning");

    "Test de logs"
}
