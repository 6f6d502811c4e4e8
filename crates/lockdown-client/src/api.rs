use async_trait::async_trait;
use lockdown_core::config::HttpConfig;
use lockdown_core::error::AppError;
use lockdown_core::models::{Page, Paging, Project, TemplateSearch, Visibility};
use lockdown_core::service::ProjectService;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Response of `api/projects/search`.
///
/// ```json
/// {
///     "paging": {"pageIndex": 1, "pageSize": 500, "total": 1200},
///     "components": [{"key": "...", "name": "...", "qualifier": "TRK", "visibility": "public"}]
/// }
/// ```
#[derive(Deserialize, Debug)]
struct ProjectSearchResponse {
    paging: Paging,
    #[serde(default)]
    components: Vec<Project>,
}

impl From<ProjectSearchResponse> for Page {
    fn from(resp: ProjectSearchResponse) -> Self {
        Page {
            paging: resp.paging,
            projects: resp.components,
        }
    }
}

/// HTTP client for the project-management service's web API.
///
/// Every request is sent to `<base URL>/api/...` with basic authentication,
/// using the token as username and an empty password.
///
/// # Examples
///
/// ```no_run
/// use lockdown_client::ApiClient;
/// use lockdown_core::{HttpConfig, ProjectService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("https://projects.example.com", "my-token", &HttpConfig::default())?;
/// let page = client.list_projects(500, 1).await?;
/// println!("{} projects in total", page.paging.total);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_url: Url,
    token: String,
    timeout_ms: u64,
}

impl ApiClient {
    /// Creates a client for the service at `base_url_str`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidUrl` if the URL is malformed.
    /// Returns `AppError::ClientError` if the HTTP client cannot be built.
    pub fn new(base_url_str: &str, token: &str, config: &HttpConfig) -> Result<Self, AppError> {
        let api_url = api_url(base_url_str)?;

        let client = Client::builder()
            .user_agent(concat!("Lockdown/", env!("CARGO_PKG_VERSION")))
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| AppError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            token: token.to_string(),
            timeout_ms: config.read_timeout.as_millis() as u64,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        self.api_url
            .join(path)
            .map_err(|e| AppError::InvalidUrl(e.to_string()))
    }

    fn map_transport(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::Timeout(self.timeout_ms)
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {}", e))
        } else {
            AppError::ClientError(e.to_string())
        }
    }

    /// Sends a GET and decodes the body. Any non-success status is an error.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        let resp = self
            .client
            .get(url.clone())
            .basic_auth(&self.token, Some(""))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let resp = ensure_success(resp, &url)?;
        resp.json()
            .await
            .map_err(|e| AppError::ClientError(format!("Failed to parse response: {}", e)))
    }

    /// Sends a form POST and returns the status, whatever it is.
    async fn post_form(&self, url: Url, form: &[(&str, &str)]) -> Result<u16, AppError> {
        let resp = self
            .client
            .post(url.clone())
            .basic_auth(&self.token, Some(""))
            .form(form)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!("POST {} answered HTTP {}: {}", url, status.as_u16(), body);
        }
        Ok(status.as_u16())
    }
}

#[async_trait]
impl ProjectService for ApiClient {
    async fn list_projects(&self, page_size: u32, page_index: u32) -> Result<Page, AppError> {
        let mut url = self.endpoint("projects/search")?;
        url.query_pairs_mut()
            .append_pair("ps", &page_size.to_string())
            .append_pair("p", &page_index.to_string());

        let resp: ProjectSearchResponse = self.get_json(url).await?;
        Ok(resp.into())
    }

    async fn search_templates(&self, query: &str) -> Result<TemplateSearch, AppError> {
        let mut url = self.endpoint("permissions/search_templates")?;
        url.query_pairs_mut().append_pair("q", query);

        self.get_json(url).await
    }

    async fn update_visibility(
        &self,
        project: &str,
        visibility: Visibility,
    ) -> Result<u16, AppError> {
        let url = self.endpoint("projects/update_visibility")?;
        self.post_form(
            url,
            &[("project", project), ("visibility", visibility.as_str())],
        )
        .await
    }

    async fn bulk_apply_template(
        &self,
        template_id: &str,
        projects: &[String],
    ) -> Result<u16, AppError> {
        let url = self.endpoint("permissions/bulk_apply_template")?;
        let joined = projects.join(",");
        self.post_form(url, &[("templateId", template_id), ("projects", joined.as_str())])
            .await
    }
}

/// Resolves `<base>/api/` from a base URL with or without a trailing slash.
fn api_url(base_url_str: &str) -> Result<Url, AppError> {
    let mut base = Url::parse(base_url_str)
        .map_err(|_| AppError::InvalidUrl(base_url_str.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(AppError::InvalidUrl(base_url_str.to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("api/")
        .map_err(|_| AppError::InvalidUrl(base_url_str.to_string()))
}

fn ensure_success(resp: Response, url: &Url) -> Result<Response, AppError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(AppError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}
