use std::fmt;
use std::str::FromStr;

use oauth2::basic::{BasicErrorResponseType, BasicTokenType};
use oauth2::{
    AuthUrl, Client, ClientId, ClientSecret, EmptyExtraTokenFields, EndpointNotSet, EndpointSet,
    RedirectUrl, RevocationErrorResponseType, Scope, StandardErrorResponse,
    StandardRevocableToken, StandardTokenIntrospectionResponse, StandardTokenResponse, TokenUrl,
};
use serde::Deserialize;

use crate::config::Config;

const USER_AGENT: &str = "Streamflix-API";

/// Fully configured `OAuth2` client type (auth URI, token URI, and redirect URI all set).
pub type ConfiguredClient = Client<
    StandardErrorResponse<BasicErrorResponseType>,
    StandardTokenResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardTokenIntrospectionResponse<EmptyExtraTokenFields, BasicTokenType>,
    StandardRevocableToken,
    StandardErrorResponse<RevocationErrorResponseType>,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Supported sign-in providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    GitHub,
}

impl Provider {
    /// Name stored in `account.provider` and used in URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GitHub => "github",
        }
    }

    /// Whether client credentials are present for this provider.
    #[must_use]
    pub fn is_configured(self, config: &Config) -> bool {
        match self {
            Self::Google => !config.google_client_id.is_empty(),
            Self::GitHub => !config.github_client_id.is_empty(),
        }
    }

    /// Scopes requested at the consent screen.
    #[must_use]
    pub fn scopes(self) -> Vec<Scope> {
        let names: &[&str] = match self {
            Self::Google => &["openid", "email", "profile"],
            Self::GitHub => &["user:email"],
        };
        names.iter().map(|s| Scope::new((*s).to_string())).collect()
    }

    /// Build the `OAuth2` client for this provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the OAuth URLs are malformed.
    pub fn client(self, config: &Config) -> anyhow::Result<ConfiguredClient> {
        match self {
            Self::Google => google_client(config),
            Self::GitHub => github_client(config),
        }
    }

    /// Fetch the signed-in user's profile with a provider access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the response is malformed.
    pub async fn fetch_profile(self, access_token: &str) -> anyhow::Result<OAuthProfile> {
        match self {
            Self::Google => {
                let info = fetch_google_userinfo(access_token).await?;
                Ok(OAuthProfile {
                    provider: self,
                    provider_account_id: info.sub,
                    email: info.email,
                    name: info.name,
                    image: info.picture,
                })
            }
            Self::GitHub => {
                let info = fetch_github_userinfo(access_token).await?;
                let email = match info.email {
                    Some(email) => email,
                    None => fetch_github_primary_email(access_token).await?,
                };
                Ok(OAuthProfile {
                    provider: self,
                    provider_account_id: info.id.to_string(),
                    email,
                    name: info.name.or(Some(info.login)),
                    image: info.avatar_url,
                })
            }
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "github" => Ok(Self::GitHub),
            other => Err(anyhow::anyhow!("Unsupported provider: {other}")),
        }
    }
}

/// Provider-neutral identity returned after a successful code exchange.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub provider: Provider,
    pub provider_account_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

fn google_client(config: &Config) -> anyhow::Result<ConfiguredClient> {
    let client = Client::new(ClientId::new(config.google_client_id.clone()))
        .set_client_secret(ClientSecret::new(config.google_client_secret.clone()))
        .set_auth_uri(AuthUrl::new(
            "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
        )?)
        .set_token_uri(TokenUrl::new(
            "https://oauth2.googleapis.com/token".to_string(),
        )?)
        .set_redirect_uri(RedirectUrl::new(config.google_redirect_uri.clone())?);
    Ok(client)
}

fn github_client(config: &Config) -> anyhow::Result<ConfiguredClient> {
    let client = Client::new(ClientId::new(config.github_client_id.clone()))
        .set_client_secret(ClientSecret::new(config.github_client_secret.clone()))
        .set_auth_uri(AuthUrl::new(
            "https://github.com/login/oauth/authorize".to_string(),
        )?)
        .set_token_uri(TokenUrl::new(
            "https://github.com/login/oauth/access_token".to_string(),
        )?)
        .set_redirect_uri(RedirectUrl::new(config.github_redirect_uri.clone())?);
    Ok(client)
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

async fn fetch_google_userinfo(access_token: &str) -> anyhow::Result<GoogleUserInfo> {
    let resp = reqwest::Client::new()
        .get("https://www.googleapis.com/oauth2/v3/userinfo")
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch Google userinfo: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!(
            "Google userinfo request failed ({status}): {body}"
        ));
    }

    resp.json::<GoogleUserInfo>()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse Google userinfo: {e}"))
}

#[derive(Debug, Deserialize)]
struct GitHubUserInfo {
    id: i64,
    login: String,
    email: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

fn github_get(url: &str, access_token: &str) -> reqwest::RequestBuilder {
    reqwest::Client::new()
        .get(url)
        .bearer_auth(access_token)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/vnd.github+json")
}

async fn fetch_github_userinfo(access_token: &str) -> anyhow::Result<GitHubUserInfo> {
    let resp = github_get("https://api.github.com/user", access_token)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch GitHub userinfo: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!(
            "GitHub userinfo request failed ({status}): {body}"
        ));
    }

    resp.json::<GitHubUserInfo>()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse GitHub userinfo: {e}"))
}

/// The primary verified address, for accounts that keep their email private.
async fn fetch_github_primary_email(access_token: &str) -> anyhow::Result<String> {
    let resp = github_get("https://api.github.com/user/emails", access_token)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch GitHub emails: {e}"))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!(
            "GitHub emails request failed ({status}): {body}"
        ));
    }

    let emails: Vec<GitHubEmail> = resp
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse GitHub emails: {e}"))?;

    emails
        .into_iter()
        .find(|e| e.primary && e.verified)
        .map(|e| e.email)
        .ok_or_else(|| anyhow::anyhow!("No primary verified email found on GitHub account"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for provider in [Provider::Google, Provider::GitHub] {
            assert_eq!(provider.as_str().parse::<Provider>().ok(), Some(provider));
        }
        assert!("facebook".parse::<Provider>().is_err());
    }

    #[test]
    fn github_only_asks_for_email_scope() {
        let scopes = Provider::GitHub.scopes();
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].as_str(), "user:email");
    }
}
