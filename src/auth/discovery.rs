use serde::Deserialize;

use super::error::AuthError;

/// Endpoints advertised by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OidcEndpoints {
    pub device_authorization_endpoint: String,
    pub token_endpoint: String,
}

pub(crate) fn well_known_url(issuer: &str) -> String {
    format!(
        "{}/.well-known/openid-configuration",
        issuer.trim_end_matches('/')
    )
}

/// Fetch `{issuer}/.well-known/openid-configuration`.
pub async fn discover(client: &reqwest::Client, issuer: &str) -> Result<OidcEndpoints, AuthError> {
    let url = well_known_url(issuer);
    tracing::debug!(%url, "fetching openid configuration");
    let resp = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await?;
    if !resp.status().is_success() {
        return Err(AuthError::Discovery {
            status: resp.status().as_u16(),
        });
    }
    let endpoints: OidcEndpoints = resp.json().await?;
    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_url_ignores_trailing_slash() {
        assert_eq!(
            well_known_url("https://auth.example.com/"),
            "https://auth.example.com/.well-known/openid-configuration"
        );
        assert_eq!(
            well_known_url("https://auth.example.com"),
            "https://auth.example.com/.well-known/openid-configuration"
        );
    }
}
