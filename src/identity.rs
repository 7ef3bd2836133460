// src/identity.rs
//! The slice of the identity provider the job board needs: token issuance and profile lookup

use tracing::info;

use crate::core::ServiceClient;
use crate::error::{Error, Result};
use crate::types::response::{unwrap_object, AccountRole, LoginRequest, LoginResponse};
use crate::types::UserProfile;

const LOGIN_ENDPOINT: &str = "/auth/login";
const USER_ENDPOINT: &str = "/user";

pub struct IdentityClient {
    http: ServiceClient,
}

impl IdentityClient {
    pub fn new(http: ServiceClient) -> Self {
        Self { http }
    }

    /// Exchange credentials for a bearer token and store it in the session
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Option<AccountRole>,
    ) -> Result<Option<UserProfile>> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            user_type: role,
        };

        let mut response: LoginResponse = self.http.post_json(LOGIN_ENDPOINT, &request).await?;
        self.http.session().set_token(response.bearer()?);

        info!("Logged in as {}", email);
        Ok(response.user)
    }

    /// `GET /user` for the current bearer token
    pub async fn current_user(&self) -> Result<UserProfile> {
        if !self.http.session().is_authenticated() {
            return Err(Error::Auth {
                message: "Not logged in".to_string(),
            });
        }

        match self.http.get::<serde_json::Value>(USER_ENDPOINT, &[]).await {
            Ok(body) => {
                let body = unwrap_object(body, "user")?;
                serde_json::from_value(body).map_err(|e| Error::decode(e.to_string()))
            }
            Err(err) => {
                if matches!(err, Error::Auth { .. }) {
                    self.http.session().expire();
                }
                Err(err)
            }
        }
    }

    pub fn logout(&self) {
        self.http.session().clear();
        info!("Logged out");
    }
}
