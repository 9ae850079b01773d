//! `GET /search`.

use kontakt_core::{HandlerResult, Reply, RequestContext, ValidatedRequest};

/// Echoes the validated query, defaults included.
pub async fn search(_ctx: RequestContext, req: ValidatedRequest) -> HandlerResult {
    Ok(Reply::json(req.into_query()))
}
