use crate::error::ApiError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API base, e.g. `/gares/filters`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves one request to the API and hands back the raw reply.
///
/// A transport only fails when no reply arrived at all; HTTP error statuses
/// are returned as replies because the API puts its envelope in those too.
pub trait Transport {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<RawResponse, ApiError>>;
}

/// `reqwest`-backed transport, usable natively and from wasm32.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: String,
}

impl HttpTransport {
    /// `base` must be absolute, e.g. `http://127.0.0.1:5000/api`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let url = format!("{}{}", self.base, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let transport_err = |err: reqwest::Error| ApiError::Transport {
            path: request.path.clone(),
            message: err.to_string(),
        };
        let response = builder.send().await.map_err(transport_err)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_err)?;
        Ok(RawResponse { status, body })
    }
}

#[derive(Clone, Debug)]
enum Reply {
    Respond(RawResponse),
    Fail(String),
}

/// Serves canned replies keyed by method and path, and records every request.
///
/// Backs the demo mode of the command-line client and the test suites.
/// Unknown routes answer 404.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    routes: Rc<RefCell<HashMap<(Method, String), Reply>>>,
    requests: Rc<RefCell<Vec<ApiRequest>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
        self.routes.borrow_mut().insert(
            (method, path.to_string()),
            Reply::Respond(RawResponse {
                status,
                body: body.into(),
            }),
        );
    }

    pub fn respond_json(&self, method: Method, path: &str, body: &serde_json::Value) {
        self.respond(method, path, 200, body.to_string());
    }

    pub fn fail(&self, method: Method, path: &str, message: &str) {
        self.routes
            .borrow_mut()
            .insert((method, path.to_string()), Reply::Fail(message.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for MemoryTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        let reply = self
            .routes
            .borrow()
            .get(&(request.method, request.path.clone()))
            .cloned();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(ApiError::Transport {
                path: request.path,
                message,
            }),
            None => Ok(RawResponse {
                status: 404,
                body: "Not Found".into(),
            }),
        }
    }
}
