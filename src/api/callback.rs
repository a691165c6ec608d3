use std::{collections::HashMap, time::Duration};

use axum::{Extension, extract::Query, response::Html};
use reqwest::Client;

use crate::{types::SharedAuthorization, warning, youtube::auth};

const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<SharedAuthorization>,
) -> Html<&'static str> {
    let pending = {
        let mut state = shared_state.lock().await;
        let Some(pending) = state.as_mut() else {
            return Html("<h4>No authorization in progress.</h4>");
        };

        if params.get("state").map(String::as_str) != Some(pending.csrf_state.as_str()) {
            warning!("Ignoring OAuth callback with unexpected state");
            return Html("<h4>Login failed.</h4><p>Unexpected state parameter.</p>");
        }

        if let Some(error) = params.get("error") {
            pending.error = Some(error.clone());
            return Html("<h4>Login failed.</h4><p>Authorization was not granted.</p>");
        }

        pending.clone()
    };

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    // The lock stays free during the exchange so the waiting side can time out.
    let exchanged = match Client::builder().timeout(EXCHANGE_TIMEOUT).build() {
        Ok(http) => auth::exchange_code(&http, &pending, code).await,
        Err(e) => Err(e.into()),
    };

    let mut state = shared_state.lock().await;
    let Some(pending) = state.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    match exchanged {
        Ok(token) => {
            pending.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            pending.error = Some(e.to_string());
            Html("<h4>Login failed.</h4>")
        }
    }
}
