use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::{net::TcpListener, sync::Mutex};
use url::Url;

use crate::{
    Res,
    config::Config,
    info,
    server::start_api_server,
    types::{
        ClientSecrets, ClientSecretsFile, Credential, PendingAuthorization, SharedAuthorization,
        TokenErrorResponse, TokenResponse,
    },
    utils, warning,
};

/// Lifetime assumed when the token endpoint does not state one.
const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Source of fresh credentials.
#[allow(async_fn_in_trait)]
pub trait Authorizer {
    /// Runs the interactive authorization flow.
    async fn authorize(&self) -> Res<Credential>;

    /// Exchanges the refresh token of `credential` for a new access token.
    ///
    /// Returns `Ok(None)` when the provider no longer accepts the refresh
    /// token, in which case a new authorization is needed.
    async fn refresh(&self, credential: &Credential) -> Res<Option<Credential>>;
}

/// Google OAuth 2.0 for installed applications.
///
/// The interactive flow opens the user's browser on Google's consent page
/// and receives the authorization code on a temporary loopback server
/// (`http://127.0.0.1:<ephemeral port>/`). PKCE protects the code exchange
/// and a random `state` ties the callback to this run.
pub struct GoogleAuthorizer {
    client_secrets_path: PathBuf,
    scope: String,
    timeout: Duration,
    http: Client,
}

impl GoogleAuthorizer {
    pub fn new(config: &Config) -> Self {
        Self {
            client_secrets_path: config.client_secrets_path.clone(),
            scope: config.scope.clone(),
            timeout: config.auth_timeout,
            http: Client::new(),
        }
    }
}

impl Authorizer for GoogleAuthorizer {
    async fn authorize(&self) -> Res<Credential> {
        let client = read_client_secrets(&self.client_secrets_path).await?;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| format!("cannot bind loopback listener: {e}"))?;
        let addr = listener.local_addr()?;
        let redirect_uri = format!("http://{}:{}/", addr.ip(), addr.port());

        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);
        let csrf_state = utils::generate_csrf_state();

        let auth_url = authorization_url(
            &client,
            &redirect_uri,
            &self.scope,
            &code_challenge,
            &csrf_state,
        )?;

        let shared_state: SharedAuthorization =
            Arc::new(Mutex::new(Some(PendingAuthorization {
                code_verifier,
                csrf_state,
                redirect_uri,
                client,
                scope: self.scope.clone(),
                token: None,
                error: None,
            })));

        let server_state = Arc::clone(&shared_state);
        let server = tokio::spawn(async move {
            if let Err(e) = start_api_server(listener, server_state).await {
                warning!("Callback server stopped: {}", e);
            }
        });

        info!("Opening the browser to authorize access to your YouTube account");
        if webbrowser::open(auth_url.as_str()).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                auth_url
            )
        }

        let token = wait_for_token(shared_state, self.timeout).await;
        server.abort();
        token
    }

    async fn refresh(&self, credential: &Credential) -> Res<Option<Credential>> {
        let Some(refresh_token) = credential.refresh_token.as_deref() else {
            return Ok(None);
        };

        let reply = post_token_form(
            &self.http,
            &credential.token_uri,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &credential.client_id),
                ("client_secret", &credential.client_secret),
            ],
        )
        .await?;

        match reply {
            Ok(response) => {
                let mut token = build_credential(
                    response,
                    &credential.token_uri,
                    &credential.client_id,
                    &credential.client_secret,
                    &credential.scope,
                );
                // Google usually omits the refresh token on refresh.
                if token.refresh_token.is_none() {
                    token.refresh_token = credential.refresh_token.clone();
                }
                Ok(Some(token))
            }
            Err(rejection) if rejection.error == "invalid_grant" => Ok(None),
            Err(rejection) => Err(describe_rejection("token refresh", &rejection).into()),
        }
    }
}

/// Reads the OAuth client descriptor (`installed` or `web` entry).
pub async fn read_client_secrets(path: &Path) -> Res<ClientSecrets> {
    let content = async_fs::read_to_string(path)
        .await
        .map_err(|e| format!("cannot read OAuth client file {}: {}", path.display(), e))?;
    let file: ClientSecretsFile = serde_json::from_str(&content)
        .map_err(|e| format!("invalid OAuth client file {}: {}", path.display(), e))?;

    file.into_client().ok_or_else(|| {
        format!(
            "OAuth client file {} has neither an \"installed\" nor a \"web\" entry",
            path.display()
        )
        .into()
    })
}

/// Builds the consent page URL the user is sent to.
pub fn authorization_url(
    client: &ClientSecrets,
    redirect_uri: &str,
    scope: &str,
    code_challenge: &str,
    csrf_state: &str,
) -> Res<Url> {
    let url = Url::parse_with_params(
        &client.auth_uri,
        &[
            ("client_id", client.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri),
            ("scope", scope),
            ("state", csrf_state),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )?;
    Ok(url)
}

/// Exchanges the authorization code received by the callback for a credential.
pub async fn exchange_code(
    http: &Client,
    pending: &PendingAuthorization,
    code: &str,
) -> Res<Credential> {
    let client = &pending.client;
    let reply = post_token_form(
        http,
        &client.token_uri,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", &pending.code_verifier),
            ("redirect_uri", &pending.redirect_uri),
            ("client_id", &client.client_id),
            ("client_secret", &client.client_secret),
        ],
    )
    .await?;

    match reply {
        Ok(response) => Ok(build_credential(
            response,
            &client.token_uri,
            &client.client_id,
            &client.client_secret,
            &pending.scope,
        )),
        Err(rejection) => Err(describe_rejection("code exchange", &rejection).into()),
    }
}

/// Polls the shared state until the callback stored a token or an error.
async fn wait_for_token(shared_state: SharedAuthorization, max_wait: Duration) -> Res<Credential> {
    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for authorization in the browser...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let start = Instant::now();
    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(pending) = lock.as_ref() {
            if let Some(token) = &pending.token {
                pb.finish_and_clear();
                return Ok(token.clone());
            }
            if let Some(error) = &pending.error {
                pb.finish_and_clear();
                return Err(format!("authorization failed: {error}").into());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    pb.finish_and_clear();
    Err(format!(
        "authorization timed out after {} seconds",
        max_wait.as_secs()
    )
    .into())
}

/// Posts a form to the token endpoint.
///
/// The outer `Res` fails on transport errors and unreadable answers; the
/// inner `Result` separates a granted token from an OAuth error response.
async fn post_token_form(
    http: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Res<Result<TokenResponse, TokenErrorResponse>> {
    let res = http.post(token_uri).form(form).send().await?;
    let status = res.status();
    let body = res.text().await?;

    if status.is_success() {
        return Ok(Ok(serde_json::from_str(&body)?));
    }

    match serde_json::from_str::<TokenErrorResponse>(&body) {
        Ok(rejection) => Ok(Err(rejection)),
        Err(_) => Err(format!("token endpoint answered {status}: {body}").into()),
    }
}

fn build_credential(
    response: TokenResponse,
    token_uri: &str,
    client_id: &str,
    client_secret: &str,
    requested_scope: &str,
) -> Credential {
    Credential {
        access_token: response.access_token,
        refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
        scope: response
            .scope
            .unwrap_or_else(|| requested_scope.to_string()),
        expires_in: response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        obtained_at: Utc::now().timestamp().max(0) as u64,
        token_uri: token_uri.to_string(),
        client_id: client_id.to_string(),
        client_secret: client_secret.to_string(),
    }
}

fn describe_rejection(step: &str, rejection: &TokenErrorResponse) -> String {
    match &rejection.error_description {
        Some(description) => format!("{step} rejected: {} ({description})", rejection.error),
        None => format!("{step} rejected: {}", rejection.error),
    }
}
