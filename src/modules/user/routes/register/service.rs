use super::types::response;
use crate::types::Context;
use std::sync::Arc;

// Registration is not implemented yet; the route answers with a static
// acknowledgement regardless of what was posted.
pub async fn service(_ctx: Arc<Context>) -> response::Response {
    Ok(response::Success::Acknowledged)
}
