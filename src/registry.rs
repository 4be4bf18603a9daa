use crate::config::Settings;
use crate::constants::TOKEN_COOKIE;
use crate::error::{ModpkgError, ModpkgResult};
use crate::models::{ApiMessage, ModRecord, NewMod, SignIn, Version};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{
    header::{HeaderMap, HeaderValue, CACHE_CONTROL, COOKIE, PRAGMA},
    multipart::{Form, Part},
    Client, RequestBuilder, Response, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{path::Path, time::Duration};
use tracing::debug;

const USER_AGENT: &str = concat!("modpkg/", env!("CARGO_PKG_VERSION"));

/// Everything a [`RegistryClient`] needs to talk to one registry as one user.
#[derive(Debug, Clone)]
pub struct Session {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Session {
    pub fn from_settings(settings: &Settings, token: Option<String>) -> Self {
        Session {
            base_url: settings.registry.clone(),
            token,
            timeout: settings.timeout(),
            connect_timeout: settings.connect_timeout(),
        }
    }

    pub fn anonymous(base_url: impl Into<String>) -> Self {
        let defaults = Settings::default();
        Session {
            base_url: base_url.into(),
            token: None,
            timeout: defaults.timeout(),
            connect_timeout: defaults.connect_timeout(),
        }
    }
}

pub struct RegistryClient {
    base_url: String,
    base: Url,
    token: Option<HeaderValue>,
    client: Client,
}

impl RegistryClient {
    pub fn new(session: &Session) -> ModpkgResult<Self> {
        let base = Url::parse(&session.base_url).map_err(|e| {
            ModpkgError::Client(format!("invalid registry URL '{}': {e}", session.base_url))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        let token = session
            .token
            .as_ref()
            .map(|token| {
                let mut hv = HeaderValue::from_str(&format!("{TOKEN_COOKIE}={token}")).map_err(
                    |e| ModpkgError::Client(format!("stored token is not a valid header: {e}")),
                )?;
                hv.set_sensitive(true);
                Ok::<_, ModpkgError>(hv)
            })
            .transpose()?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(session.timeout)
            .connect_timeout(session.connect_timeout)
            .build()
            .map_err(|e| ModpkgError::Client(e.to_string()))?;

        Ok(RegistryClient {
            base_url: session.base_url.trim_end_matches('/').to_string(),
            base,
            token,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; anything else is joined onto the base URL.
    pub fn url_for(&self, path: &str) -> ModpkgResult<Url> {
        let raw = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        };
        Url::parse(&raw).map_err(|e| ModpkgError::Client(format!("invalid URL '{raw}': {e}")))
    }

    // ── Transport ───────────────────────────────────────

    /// The session cookie only ever goes to the registry's own origin, never to
    /// artifact hosts named by absolute download URLs.
    fn authorize(&self, url: &Url, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) if url.origin() == self.base.origin() => req.header(COOKIE, token.clone()),
            _ => req,
        }
    }

    async fn send(&self, url: &Url, req: RequestBuilder) -> ModpkgResult<Response> {
        debug!("→ {url}");
        let req = self.authorize(url, req);
        let resp = req.send().await.map_err(|e| request_error(url, e))?;
        let status = resp.status();
        debug!("← {status} {url}");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ModpkgError::RegistryResponse {
            url: url.to_string(),
            status: status.as_u16(),
            message: server_message(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(url: &Url, resp: Response) -> ModpkgResult<T> {
        let body = resp.bytes().await.map_err(|e| request_error(url, e))?;
        serde_json::from_slice(&body).map_err(|source| ModpkgError::MalformedResponse {
            url: url.to_string(),
            source,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ModpkgResult<T> {
        let url = self.url_for(path)?;
        let resp = self.send(&url, self.client.get(url.clone()).query(query)).await?;
        Self::decode(&url, resp).await
    }

    /// GET `path` and hand back the body as a stream of chunks.
    pub async fn get_stream(
        &self,
        path: &str,
    ) -> ModpkgResult<impl Stream<Item = ModpkgResult<Bytes>>> {
        let url = self.url_for(path)?;
        let resp = self.send(&url, self.client.get(url.clone())).await?;
        Ok(resp
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| request_error(&url, e))))
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ModpkgResult<T> {
        let url = self.url_for(path)?;
        let resp = self.send(&url, self.client.post(url.clone()).json(body)).await?;
        Self::decode(&url, resp).await
    }

    pub async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> ModpkgResult<T> {
        let url = self.url_for(path)?;
        let resp = self
            .send(&url, self.client.post(url.clone()).multipart(form))
            .await?;
        Self::decode(&url, resp).await
    }

    // ── Endpoints ───────────────────────────────────────

    pub async fn version(&self, version_slug: &str) -> ModpkgResult<Version> {
        self.get_json(&format!("/api/versions/{version_slug}"), &[])
            .await
    }

    pub async fn mod_by_slug(&self, mod_slug: &str) -> ModpkgResult<ModRecord> {
        self.get_json(&format!("/api/mods/{mod_slug}"), &[]).await
    }

    pub async fn versions_for_mod(&self, mod_id: &str) -> ModpkgResult<Vec<Version>> {
        self.get_json("/api/versions", &[("mod_id", mod_id)]).await
    }

    /// The signed-in user, or `None` when the session is anonymous or expired.
    pub async fn whoami(&self) -> ModpkgResult<Option<serde_json::Value>> {
        match self.get_json("/api/whoami", &[]).await {
            Ok(user) => Ok(user),
            Err(ModpkgError::RegistryResponse {
                status: 401 | 403, ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Exchange credentials for a session token (delivered as the `token` cookie).
    pub async fn sign_in(&self, username: &str, password: &str) -> ModpkgResult<String> {
        let url = self.url_for("/api/signin")?;
        let req = self
            .client
            .post(url.clone())
            .json(&SignIn { username, password });
        let resp = self.send(&url, req).await?;
        let token = resp
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .map(|c| c.value().to_string());
        token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ModpkgError::Auth("registry did not issue a session token".into()))
    }

    pub async fn create_mod(&self, listing: &NewMod) -> ModpkgResult<ApiMessage> {
        let url = self.url_for("/api/mods")?;
        let reply: ApiMessage = self.post_json("/api/mods", listing).await?;
        reply.into_result(url.as_str())
    }

    /// Publish a packaged archive as a new version.
    pub async fn upload_version(&self, archive: &Path) -> ModpkgResult<ApiMessage> {
        let data = tokio::fs::read(archive)
            .await
            .map_err(|e| ModpkgError::fs(archive, e))?;
        let file_name = archive
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "mod.zip".to_string());
        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/zip")
            .map_err(|e| ModpkgError::Client(e.to_string()))?;
        let url = self.url_for("/api/versions")?;
        let reply: ApiMessage = self
            .post_form("/api/versions", Form::new().part("mod", part))
            .await?;
        reply.into_result(url.as_str())
    }
}

fn request_error(url: &Url, err: reqwest::Error) -> ModpkgError {
    if err.is_builder() {
        ModpkgError::Client(err.to_string())
    } else {
        ModpkgError::RegistryUnreachable {
            url: url.to_string(),
            source: err,
        }
    }
}

/// Pull a human-readable message out of an error body.
fn server_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return Some(message.to_string());
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
