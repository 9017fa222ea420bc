//! Normalized request/response descriptors for the tasks API.
//!
//! The handler only ever sees these shapes. `TaskRequest::from_lambda` and
//! `TaskResponse::into_response` are the only places that touch `lambda_http`
//! types.

use lambda_http::{
    http::StatusCode, request::RequestContext as LambdaRequestContext, Body, Error, Request,
    RequestExt, Response,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Headers carried by every response
pub const CORS_HEADERS: [(&str, &str); 2] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Cache-control"),
];

/// Claims set by the API Gateway Cognito authorizer (already verified upstream)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(flatten)]
    pub other: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Authorizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims: Option<Claims>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorizer: Option<Authorizer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub http_method: String,
    /// Route template, e.g. `/task/{id}/volunteer`
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub request_context: RequestContext,
}

impl TaskRequest {
    pub fn new(http_method: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            resource: resource.into(),
            ..Self::default()
        }
    }

    pub fn with_path_id(mut self, id: impl Into<String>) -> Self {
        self.path_parameters
            .get_or_insert_with(HashMap::new)
            .insert("id".to_string(), id.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_claims(mut self, sub: impl Into<String>, iss: impl Into<String>) -> Self {
        self.request_context.authorizer = Some(Authorizer {
            claims: Some(Claims {
                sub: Some(sub.into()),
                iss: Some(iss.into()),
                ..Claims::default()
            }),
        });
        self
    }

    /// Present and non-empty, the way the router tells `/task/{id}` from `/task`
    pub fn has_path_parameters(&self) -> bool {
        self.path_parameters.as_ref().is_some_and(|p| !p.is_empty())
    }

    pub fn path_id(&self) -> Option<&str> {
        self.path_parameters.as_ref()?.get("id").map(String::as_str)
    }

    /// Builds the descriptor from an API Gateway REST event.
    ///
    /// The route template and authorizer claims are read from the serialized
    /// request context. An unreadable context is treated as carrying no claims.
    pub fn from_lambda(event: &Request) -> Self {
        let context = match event.request_context_ref() {
            Some(LambdaRequestContext::ApiGatewayV1(ctx)) => serde_json::to_value(ctx).ok(),
            _ => None,
        };

        let resource = context
            .as_ref()
            .and_then(|c| c.get("resourcePath"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let request_context = context
            .map(|c| {
                serde_json::from_value::<RequestContext>(c).unwrap_or_else(|e| {
                    tracing::warn!("⚠️ Unreadable request context, treating as anonymous: {}", e);
                    RequestContext::default()
                })
            })
            .unwrap_or_default();

        let path_parameters = event.path_parameters_ref().map(|params| {
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        });

        let body = match event.body() {
            Body::Empty => None,
            Body::Text(text) => Some(text.clone()),
            Body::Binary(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        };

        Self {
            http_method: event.method().as_str().to_string(),
            resource,
            path_parameters,
            body,
            request_context,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResponse {
    pub status: StatusCode,
    pub body: Option<String>,
}

impl TaskResponse {
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status,
            body: Some(serde_json::to_string(value)?),
        })
    }

    /// Raw text body, not JSON-encoded
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        &CORS_HEADERS
    }

    pub fn into_response(self) -> Result<Response<Body>, Error> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in self.headers() {
            builder = builder.header(*name, *value);
        }
        let body = match self.body {
            Some(text) => Body::Text(text),
            None => Body::Empty,
        };
        Ok(builder.body(body).map_err(Box::new)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_api_gateway_shape() {
        let request: TaskRequest = serde_json::from_value(json!({
            "httpMethod": "PUT",
            "resource": "/task/{id}/volunteer",
            "pathParameters": {"id": "t-1"},
            "body": "{\"status\":\"Claimed\"}",
            "requestContext": {
                "authorizer": {
                    "claims": {
                        "sub": "bob-sub",
                        "iss": "https://cognito-idp.ap-southeast-2.amazonaws.com/ap-southeast-2_Pool",
                        "email_verified": "true"
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(request.path_id(), Some("t-1"));
        assert!(request.has_path_parameters());
        let claims = request.request_context.authorizer.unwrap().claims.unwrap();
        assert_eq!(claims.sub.as_deref(), Some("bob-sub"));
        assert_eq!(claims.other.get("email_verified"), Some(&json!("true")));
    }

    #[test]
    fn missing_context_pieces_default_to_absent() {
        let request: TaskRequest = serde_json::from_value(json!({
            "httpMethod": "GET",
            "pathParameters": null,
            "requestContext": {}
        }))
        .unwrap();

        assert!(!request.has_path_parameters());
        assert!(request.request_context.authorizer.is_none());
        assert_eq!(request.resource, "");
    }

    fn rest_event(authorizer: Option<Value>) -> Request {
        let mut context = json!({
            "accountId": "123456789012",
            "resourceId": "us4z18",
            "stage": "prod",
            "requestId": "41b45ea3-70b5-11e6-b7bd-69b5aaebc7d9",
            "identity": {"sourceIp": "192.168.100.1"},
            "resourcePath": "/task/{id}/volunteer",
            "httpMethod": "PUT",
            "apiId": "wt6mne2s9k"
        });
        if let Some(authorizer) = authorizer {
            context["authorizer"] = authorizer;
        }

        let event = json!({
            "resource": "/task/{id}/volunteer",
            "path": "/task/abc/volunteer",
            "httpMethod": "PUT",
            "headers": {"Host": "wt6mne2s9k.execute-api.ap-southeast-2.amazonaws.com"},
            "pathParameters": {"id": "abc"},
            "requestContext": context,
            "body": "{\"status\":\"Claimed\"}",
            "isBase64Encoded": false
        });
        lambda_http::request::from_str(&event.to_string()).unwrap()
    }

    #[test]
    fn converts_rest_event_with_cognito_claims() {
        let event = rest_event(Some(json!({
            "claims": {
                "sub": "bob-sub",
                "iss": "https://cognito-idp.ap-southeast-2.amazonaws.com/ap-southeast-2_Pool",
                "email": "bob@example.com"
            }
        })));

        let request = TaskRequest::from_lambda(&event);

        assert_eq!(request.http_method, "PUT");
        assert_eq!(request.resource, "/task/{id}/volunteer");
        assert_eq!(request.path_id(), Some("abc"));
        assert_eq!(request.body.as_deref(), Some(r#"{"status":"Claimed"}"#));
        let claims = request.request_context.authorizer.unwrap().claims.unwrap();
        assert_eq!(claims.sub.as_deref(), Some("bob-sub"));
        assert_eq!(
            claims.iss.as_deref(),
            Some("https://cognito-idp.ap-southeast-2.amazonaws.com/ap-southeast-2_Pool")
        );
        assert_eq!(claims.other.get("email"), Some(&json!("bob@example.com")));
    }

    #[test]
    fn rest_event_without_authorizer_is_anonymous() {
        let request = TaskRequest::from_lambda(&rest_event(None));

        assert_eq!(request.resource, "/task/{id}/volunteer");
        assert_eq!(request.path_id(), Some("abc"));
        assert!(request
            .request_context
            .authorizer
            .as_ref()
            .and_then(|a| a.claims.as_ref())
            .is_none());
    }

    #[test]
    fn empty_path_parameters_count_as_absent() {
        let mut request = TaskRequest::new("GET", "/task");
        request.path_parameters = Some(HashMap::new());
        assert!(!request.has_path_parameters());
        assert_eq!(request.path_id(), None);
    }

    #[test]
    fn response_carries_exactly_the_cors_headers() {
        let response = TaskResponse::text(StatusCode::UNAUTHORIZED, "unauthorized user")
            .into_response()
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().len(), 2);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers()["Access-Control-Allow-Headers"], "Cache-control");
        assert_eq!(response.body(), &Body::Text("unauthorized user".to_string()));
    }

    #[test]
    fn empty_response_has_no_body() {
        let response = TaskResponse::empty(StatusCode::NO_CONTENT).into_response().unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.body(), &Body::Empty);
    }
}
