//! Liveness and readiness probe handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | Liveness | `/healthz` | Is the process alive? Failure → restart. |
//! | Readiness | `/readyz` | Can it serve traffic? Failure → pulled from the load-balancer. |
//!
//! Override `readiness` with your own handler if traffic must be gated on
//! dependency availability (a data directory, a downstream service).

use crate::{Request, Response};

/// Liveness probe. Always `200 OK` with body `"ok"` — if the process can
/// respond to HTTP at all, it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe (default implementation): `200 OK`, body `"ready"`.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
