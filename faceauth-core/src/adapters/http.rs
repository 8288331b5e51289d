//! HTTP backend gateway
//!
//! Talks JSON to the face-authentication backend. One request per call;
//! no retries. Non-2xx responses become `GatewayError::Server` carrying the
//! server's own message.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use url::Url;

use crate::config::{ApiConfig, Endpoints, FaceLoginStyle};
use crate::domain::result::{Error, GatewayError, Result};
use crate::domain::User;
use crate::ports::{
    AuthGateway, Credentials, FaceLoginRequest, HealthStatus, LoginResponse, RegisterRequest,
};

const GENERIC_ERROR: &str = "Request failed";

/// Backend client
#[derive(Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    endpoints: Endpoints,
    image_field: String,
    face_login_style: FaceLoginStyle,
    error_message_fields: Vec<String>,
}

impl HttpGateway {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let base_url = api
            .parsed_base_url()
            .map_err(|e| Error::config(e.to_string()))?;

        let client = Client::builder()
            .timeout(api.request_timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            endpoints: api.endpoints.clone(),
            image_field: api.image_field.clone(),
            face_login_style: api.face_login_style,
            error_message_fields: api.error_message_fields.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join an endpoint path onto the base URL, keeping any base path prefix
    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn send(&self, request: RequestBuilder, url: &str) -> std::result::Result<Response, GatewayError> {
        let response = request.send().map_err(|e| self.map_request_error(e, url))?;
        tracing::debug!(url, status = response.status().as_u16(), "backend response");
        Ok(response)
    }

    fn post_json(&self, path: &str, body: &JsonValue) -> std::result::Result<JsonValue, GatewayError> {
        let url = self.url(path);
        let response = self.send(self.client.post(&url).json(body), &url)?;
        self.read_json(response)
    }

    fn get_json(&self, path: &str) -> std::result::Result<JsonValue, GatewayError> {
        let url = self.url(path);
        let response = self.send(self.client.get(&url), &url)?;
        self.read_json(response)
    }

    /// Parse the body and turn non-2xx statuses into server errors
    fn read_json(&self, response: Response) -> std::result::Result<JsonValue, GatewayError> {
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| GatewayError::Transport(format!("Failed to read response: {}", e)))?;
        let body: Option<JsonValue> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(|b| self.error_message(b))
                .unwrap_or_else(|| GENERIC_ERROR.to_string());
            tracing::warn!(status = status.as_u16(), %message, "backend rejected request");
            return Err(GatewayError::Server {
                status: status.as_u16(),
                message,
            });
        }

        body.ok_or_else(|| GatewayError::Decode("response body is not JSON".to_string()))
    }

    fn error_message(&self, body: &JsonValue) -> Option<String> {
        self.error_message_fields.iter().find_map(|field| match body.get(field) {
            Some(JsonValue::String(s)) if !s.is_empty() => Some(s.clone()),
            // FastAPI validation errors put a list under `detail`
            Some(JsonValue::Array(items)) => items
                .iter()
                .find_map(|i| i.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string),
            _ => None,
        })
    }

    fn map_request_error(&self, error: reqwest::Error, url: &str) -> GatewayError {
        if error.is_timeout() {
            GatewayError::Transport(format!("Request to {} timed out", url))
        } else if error.is_connect() {
            GatewayError::Transport(format!("Unable to connect to {}: {}", self.base_url, error))
        } else {
            GatewayError::Transport(format!("Request to {} failed: {}", url, error))
        }
    }
}

fn decode<T: DeserializeOwned>(value: JsonValue) -> std::result::Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Normalise the success shapes backends use for a user.
///
/// Accepts `{user: {...}}`, `{user_id, username}`, or a bare user record.
/// The id may be absent in the nested and bare shapes.
fn extract_user(body: &JsonValue) -> std::result::Result<User, GatewayError> {
    if let Some(user) = body.get("user").filter(|u| u.is_object()) {
        return decode(user.clone());
    }
    let username = body.get("username").and_then(|v| v.as_str());
    match (body.get("user_id").and_then(|v| v.as_i64()), username) {
        (Some(id), Some(username)) => Ok(User::new(id, username, "")),
        (None, Some(_)) => decode(body.clone()),
        _ => Err(GatewayError::Decode("no user in response".to_string())),
    }
}

fn extract_login(body: JsonValue) -> std::result::Result<LoginResponse, GatewayError> {
    let user = extract_user(&body)?;
    let message = body
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string);
    Ok(LoginResponse { user, message })
}

impl AuthGateway for HttpGateway {
    fn register(&self, request: &RegisterRequest) -> std::result::Result<User, GatewayError> {
        let mut body = Map::new();
        body.insert("username".into(), request.username.clone().into());
        body.insert("email".into(), request.email.clone().into());
        body.insert("password".into(), request.password.clone().into());
        body.insert(
            self.image_field.clone(),
            request.face_image.as_data_uri().into(),
        );

        let response = self.post_json(&self.endpoints.register, &JsonValue::Object(body))?;
        extract_user(&response)
    }

    fn login(&self, credentials: &Credentials) -> std::result::Result<LoginResponse, GatewayError> {
        let body = serde_json::json!({
            "username": credentials.username,
            "password": credentials.password,
        });
        let response = self.post_json(&self.endpoints.login, &body)?;
        extract_login(response)
    }

    fn face_login(&self, request: &FaceLoginRequest) -> std::result::Result<LoginResponse, GatewayError> {
        let mut body = Map::new();
        if self.face_login_style == FaceLoginStyle::UsernameAndImage {
            body.insert("username".into(), request.username.clone().into());
        }
        body.insert(
            self.image_field.clone(),
            request.face_image.as_data_uri().into(),
        );

        let response = self.post_json(&self.endpoints.face_login, &JsonValue::Object(body))?;
        extract_login(response)
    }

    fn get_user(&self, id: i64) -> std::result::Result<User, GatewayError> {
        let path = self.endpoints.user.replace("{id}", &id.to_string());
        let response = self.get_json(&path)?;
        extract_user(&response)
    }

    fn health(&self) -> std::result::Result<HealthStatus, GatewayError> {
        let response = self.get_json(&self.endpoints.health)?;
        decode(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::adapters::file_store::MemoryStore;
    use crate::adapters::mock_backend::{MockBackend, MockRoute};
    use crate::adapters::still_image::StillImageCamera;
    use crate::config::{CameraConfig, UiConfig};
    use crate::domain::{EncodedImage, Page, StatusMessage};
    use crate::ports::{Navigator, StatusView};
    use crate::services::{DashboardPage, LoginPage, PageEnv, SessionStore};

    #[derive(Default)]
    struct Pages {
        visited: Mutex<Vec<Page>>,
        statuses: Mutex<Vec<String>>,
    }

    impl Navigator for Pages {
        fn navigate(&self, page: Page, _delay: Duration) {
            self.visited.lock().unwrap().push(page);
        }
    }

    impl StatusView for Pages {
        fn render(&self, message: &StatusMessage) {
            self.statuses.lock().unwrap().push(message.text.clone());
        }

        fn clear(&self) {}
    }

    fn page_env(gateway: HttpGateway, pages: &Arc<Pages>) -> PageEnv {
        PageEnv {
            gateway: Arc::new(gateway),
            session: SessionStore::new(Arc::new(MemoryStore::new())),
            navigator: pages.clone(),
            status_view: pages.clone(),
            camera: Arc::new(StillImageCamera::new("unused.jpg")),
            camera_config: CameraConfig::default(),
            ui: UiConfig::default(),
        }
    }

    fn gateway_for(server: &MockBackend) -> HttpGateway {
        let api = ApiConfig {
            base_url: server.base_url(),
            ..ApiConfig::default()
        };
        HttpGateway::new(&api).unwrap()
    }

    fn image() -> EncodedImage {
        EncodedImage::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF, 0xD9])
    }

    #[test]
    fn test_login_success() {
        let server = MockBackend::start(vec![MockRoute::post(
            "/api/login",
            200,
            r#"{"message":"ok","user":{"id":1,"username":"alice","email":"a@x.com","is_active":true,"created_at":"2024-01-15T10:00:00"}}"#,
        )])
        .unwrap();
        let gateway = gateway_for(&server);

        let response = gateway
            .login(&Credentials {
                username: "alice".into(),
                password: "secret1".into(),
            })
            .unwrap();

        assert_eq!(response.user.username, "alice");
        assert_eq!(response.message.as_deref(), Some("ok"));

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body["username"], "alice");
        assert_eq!(requests[0].body["password"], "secret1");
    }

    #[test]
    fn test_login_user_without_id() {
        let server = MockBackend::start(vec![MockRoute::post(
            "/api/login",
            200,
            r#"{"user":{"username":"alice","email":"a@x.com"}}"#,
        )])
        .unwrap();
        let gateway = gateway_for(&server);

        let response = gateway
            .login(&Credentials {
                username: "alice".into(),
                password: "secret1".into(),
            })
            .unwrap();

        assert_eq!(response.user.id, None);
        assert_eq!(response.user.email, "a@x.com");
        assert_eq!(response.message, None);
    }

    #[test]
    fn test_user_without_id_signs_in_and_reaches_dashboard() {
        let server = MockBackend::start(vec![MockRoute::post(
            "/api/login",
            200,
            r#"{"user":{"username":"alice","email":"a@x.com"}}"#,
        )])
        .unwrap();
        let pages = Arc::new(Pages::default());
        let env = page_env(gateway_for(&server), &pages);

        let mut login = LoginPage::new(env.clone());
        let user = login.submit_password("alice", "secret1").unwrap();
        assert_eq!(user.id, None);
        assert_eq!(env.session.get_user().unwrap(), Some(user));
        assert_eq!(*pages.visited.lock().unwrap(), vec![Page::Dashboard]);

        let mut dashboard = DashboardPage::new(env);
        let view = dashboard.load().unwrap();
        assert_eq!(view.user_id, None);
        assert_eq!(view.username, "alice");

        // Nothing to look up, so no request goes out
        let err = dashboard.refresh().unwrap_err();
        assert!(matches!(err, Error::MissingUserId));
        assert_eq!(server.requests().len(), 1);
        assert_eq!(
            pages.statuses.lock().unwrap().last().cloned(),
            Some(err.to_string())
        );
        assert_eq!(*pages.visited.lock().unwrap(), vec![Page::Dashboard]);
    }

    #[test]
    fn test_server_error_uses_detail() {
        let server = MockBackend::start(vec![MockRoute::post(
            "/api/login",
            401,
            r#"{"detail":"bad credentials"}"#,
        )])
        .unwrap();
        let gateway = gateway_for(&server);

        let err = gateway
            .login(&Credentials {
                username: "alice".into(),
                password: "nope".into(),
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "bad credentials");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_server_error_falls_back_through_fields() {
        let server = MockBackend::start(vec![
            MockRoute::post("/api/register", 409, r#"{"error":"username taken"}"#),
            MockRoute::get("/api/users/9", 500, "<html>oops</html>"),
        ])
        .unwrap();
        let gateway = gateway_for(&server);

        let err = gateway
            .register(&RegisterRequest {
                username: "bob".into(),
                email: "b@x.com".into(),
                password: "secret1".into(),
                face_image: image(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "username taken");

        let err = gateway.get_user(9).unwrap_err();
        assert_eq!(err.to_string(), GENERIC_ERROR);
    }

    #[test]
    fn test_register_sends_configured_image_field() {
        let server = MockBackend::start(vec![MockRoute::post(
            "/api/register",
            201,
            r#"{"message":"created","user_id":5,"username":"bob"}"#,
        )])
        .unwrap();
        let api = ApiConfig {
            base_url: server.base_url(),
            image_field: "face_data".to_string(),
            ..ApiConfig::default()
        };
        let gateway = HttpGateway::new(&api).unwrap();

        let user = gateway
            .register(&RegisterRequest {
                username: "bob".into(),
                email: "b@x.com".into(),
                password: "secret1".into(),
                face_image: image(),
            })
            .unwrap();

        assert_eq!(user.id, Some(5));
        assert_eq!(user.username, "bob");
        let body = &server.requests()[0].body;
        assert!(body["face_data"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
        assert!(body.get("face_image").is_none());
    }

    #[test]
    fn test_face_login_image_only_style() {
        let server = MockBackend::start(vec![MockRoute::post(
            "/api/login",
            200,
            r#"{"message":"Welcome","user_id":3,"username":"carol"}"#,
        )])
        .unwrap();
        let mut api = ApiConfig {
            base_url: server.base_url(),
            face_login_style: FaceLoginStyle::ImageOnly,
            image_field: "face_data".to_string(),
            ..ApiConfig::default()
        };
        api.endpoints.face_login = "/api/login".to_string();
        let gateway = HttpGateway::new(&api).unwrap();

        let response = gateway
            .face_login(&FaceLoginRequest {
                username: "ignored".into(),
                face_image: image(),
            })
            .unwrap();

        assert_eq!(response.user.username, "carol");
        assert_eq!(response.message.as_deref(), Some("Welcome"));
        let body = &server.requests()[0].body;
        assert!(body.get("username").is_none());
        assert!(body.get("face_data").is_some());
    }

    #[test]
    fn test_get_user_and_health_with_base_path() {
        let server = MockBackend::start(vec![
            MockRoute::get("/v1/api/users/42", 200, r#"{"id":42,"username":"dave","email":"d@x.com"}"#),
            MockRoute::get("/v1/api/health", 200, r#"{"status":"healthy","database":"connected"}"#),
        ])
        .unwrap();
        let api = ApiConfig {
            base_url: format!("{}/v1/", server.base_url()),
            ..ApiConfig::default()
        };
        let gateway = HttpGateway::new(&api).unwrap();

        assert_eq!(gateway.get_user(42).unwrap().email, "d@x.com");
        let health = gateway.health().unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.database.as_deref(), Some("connected"));
    }

    #[test]
    fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let api = ApiConfig {
            base_url: format!("http://127.0.0.1:{}", port),
            ..ApiConfig::default()
        };
        let gateway = HttpGateway::new(&api).unwrap();

        let err = gateway.health().unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
