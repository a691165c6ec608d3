use axum::{Extension, Router, routing::get};
use tokio::net::TcpListener;

use crate::{Res, api, types::SharedAuthorization};

/// Serves the OAuth redirect on an already bound loopback listener.
///
/// Runs until the task is aborted by the authorization flow.
pub async fn start_api_server(listener: TcpListener, state: SharedAuthorization) -> Res<()> {
    let app = Router::new().route("/", get(api::callback).layer(Extension(state)));

    axum::serve(listener, app).await?;
    Ok(())
}
