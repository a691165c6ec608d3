use crate::{
    config::Config, error, management::TokenManager, success, youtube::auth::GoogleAuthorizer,
};

/// Makes sure a usable credential is cached, authorizing if needed.
pub async fn auth(config: &Config) {
    let authorizer = GoogleAuthorizer::new(config);
    match TokenManager::obtain(&config.token_path, &authorizer).await {
        Ok(_) => success!(
            "Authentication successful! Credential cached at {}",
            config.token_path.display()
        ),
        Err(e) => error!("Authentication failed. Err: {}", e),
    }
}
