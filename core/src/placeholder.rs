//! CRUD facade for a JSONPlaceholder-style posts/users API.

use serde_json::Value;

use crate::dispatcher::{Call, RequestDispatcher};
use crate::error::DispatchError;
use crate::transport::{Transport, UreqTransport};
use crate::types::{NewPost, PostUpdate};

pub const PLACEHOLDER_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Thin wrapper mapping post/user helpers onto fixed paths.
#[derive(Debug, Clone)]
pub struct PlaceholderApi<T = UreqTransport> {
    client: RequestDispatcher<T>,
}

impl PlaceholderApi<UreqTransport> {
    pub fn new() -> Self {
        Self::with_base_url(PLACEHOLDER_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: RequestDispatcher::new(base_url, None),
        }
    }
}

impl Default for PlaceholderApi<UreqTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> PlaceholderApi<T> {
    pub fn from_dispatcher(client: RequestDispatcher<T>) -> Self {
        Self { client }
    }

    /// The underlying dispatcher, for calls the facade does not cover.
    pub fn client(&self) -> &RequestDispatcher<T> {
        &self.client
    }

    /// All posts, or only those of `user_id`.
    pub fn get_posts(&self, user_id: Option<u64>) -> Result<Vec<Value>, DispatchError> {
        let mut call = Call::new();
        if let Some(user_id) = user_id {
            call = call.param("userId", user_id);
        }
        self.client.get("/posts", call).map(into_list)
    }

    pub fn get_post(&self, post_id: u64) -> Result<Value, DispatchError> {
        self.client.get(&format!("/posts/{post_id}"), Call::new())
    }

    pub fn create_post(&self, title: &str, body: &str, user_id: u64) -> Result<Value, DispatchError> {
        let payload = NewPost {
            title: title.to_string(),
            body: body.to_string(),
            user_id,
        };
        self.client.post("/posts", Call::new().json(&payload)?)
    }

    pub fn update_post(
        &self,
        post_id: u64,
        title: &str,
        body: &str,
        user_id: u64,
    ) -> Result<Value, DispatchError> {
        let payload = PostUpdate {
            id: post_id,
            title: title.to_string(),
            body: body.to_string(),
            user_id,
        };
        self.client
            .put(&format!("/posts/{post_id}"), Call::new().json(&payload)?)
    }

    pub fn delete_post(&self, post_id: u64) -> Result<Value, DispatchError> {
        self.client.delete(&format!("/posts/{post_id}"), Call::new())
    }

    pub fn get_users(&self) -> Result<Vec<Value>, DispatchError> {
        self.client.get("/users", Call::new()).map(into_list)
    }
}

/// List endpoints occasionally answer with a single object; wrap it so
/// callers always get a sequence.
fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::config::DispatcherConfig;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    struct Replay {
        body: &'static str,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Transport for Replay {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, DispatchError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: self.body.to_string(),
            })
        }
    }

    fn api(body: &'static str) -> PlaceholderApi<Replay> {
        let transport = Replay {
            body,
            seen: RefCell::new(Vec::new()),
        };
        PlaceholderApi::from_dispatcher(RequestDispatcher::with_transport(
            DispatcherConfig::new("http://h"),
            transport,
        ))
    }

    fn last_request(api: &PlaceholderApi<Replay>) -> HttpRequest {
        api.client().transport().seen.borrow().last().cloned().unwrap()
    }

    #[test]
    fn get_posts_filters_by_user() {
        let api = api("[]");
        assert!(api.get_posts(Some(1)).unwrap().is_empty());
        assert_eq!(last_request(&api).url, "http://h/posts?userId=1");

        api.get_posts(None).unwrap();
        assert_eq!(last_request(&api).url, "http://h/posts");
    }

    #[test]
    fn single_object_list_response_is_wrapped() {
        let api = api(r#"{"id": 1}"#);
        let posts = api.get_posts(None).unwrap();
        assert_eq!(posts, vec![json!({"id": 1})]);
        let users = api.get_users().unwrap();
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn create_and_update_send_expected_payloads() {
        let api = api(r#"{"id": 101}"#);
        api.create_post("Title", "Body", 1).unwrap();
        let req = last_request(&api);
        assert_eq!(req.method, HttpMethod::Post);
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"title": "Title", "body": "Body", "userId": 1}));

        api.update_post(5, "New", "Text", 2).unwrap();
        let req = last_request(&api);
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://h/posts/5");
        let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"id": 5, "title": "New", "body": "Text", "userId": 2}));
    }

    #[test]
    fn delete_has_no_body() {
        let api = api("");
        assert_eq!(api.delete_post(3).unwrap(), json!({}));
        let req = last_request(&api);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://h/posts/3");
        assert!(req.body.is_none());
    }
}
