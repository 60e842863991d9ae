//! Query/response telemetry.
//!
//! One structured event per completed request on the `telemetry` target,
//! correlated by a per-request session id. No session state is kept.

use tracing::info;
use uuid::Uuid;

pub fn log_telemetry(session_id: Uuid, query: &str, response: &str) {
    info!(
        target: "telemetry",
        session = %session_id,
        query,
        response,
        "query completed"
    );
}
