use error_stack::ResultExt;
use google_sheets4::oauth2::{self, authenticator::Authenticator};
use thiserror::Error;
use tracing::instrument;

use crate::adapters::config::credentials::ServiceAccountCredentials;

use super::http_client::{HttpClient, HttpsConnector};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Service account key was rejected by the OAuth library")]
    InvalidKey,
    #[error("Could not create an authenticator")]
    AuthenticatorFailed,
}

pub type GoogleAuthenticator = Authenticator<HttpsConnector>;

#[instrument(skip(credentials, client), fields(client_email = credentials.client_email()))]
pub async fn auth(
    credentials: &ServiceAccountCredentials,
    client: HttpClient,
) -> error_stack::Result<GoogleAuthenticator, AuthError> {
    let secret: oauth2::ServiceAccountKey =
        oauth2::parse_service_account_key(credentials.json()).change_context(AuthError::InvalidKey)?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(AuthError::AuthenticatorFailed)
}
