use super::*;
use crate::prelude::AuthService;

impl AuthService for Service {
    // POST /api/auth/login
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        let data = self
            .client
            .post(self.api_url(consts::API_AUTH_LOGIN))
            .json(&LoginParam { username, password })
            .send()
            .await?
            .json::<PackInfo<LoginData>>()
            .await?
            .as_result()?;
        self.set_token(data.token.clone());
        tracing::info!(username, "logged in");
        Ok(data.token)
    }
}
