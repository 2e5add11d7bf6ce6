use axum::{extract::Request, middleware::Next, response::Response};

/// Login of the viewing user, injected by the fronting auth layer.
pub const VIEWER_LOGIN_HEADER: &str = "x-viewer-login";

/// Identity context the gateway trusts from its auth proxy. Absent for
/// anonymous viewers; the list still renders, minus owner-only rows.
#[derive(Debug, Clone, Default)]
pub struct ViewerContext {
    pub login: Option<String>,
}

impl ViewerContext {
    pub fn is_owner(&self, owner: &str) -> bool {
        self.login
            .as_deref()
            .is_some_and(|login| login.eq_ignore_ascii_case(owner))
    }
}

pub async fn viewer_context_middleware(mut req: Request, next: Next) -> Response {
    let login = req
        .headers()
        .get(VIEWER_LOGIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string());

    req.extensions_mut().insert(ViewerContext { login });

    next.run(req).await
}
