use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// `appid` accepted by the weather endpoints.
pub const WEATHER_API_KEY: &str = "mock-weather-key";

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(3);

/// Length of the `data` string served by `/large`, above ureq's default
/// 10 MiB body limit.
pub const LARGE_BODY_BYTES: usize = 12 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

pub struct Store {
    posts: BTreeMap<u64, Post>,
    next_id: u64,
}

pub type Db = Arc<RwLock<Store>>;

/// Seeded with two users and three posts.
pub fn seed() -> Store {
    let posts = [
        (1, 1, "sunt aut facere repellat provident", "quia et suscipit"),
        (1, 2, "qui est esse", "est rerum tempore vitae"),
        (2, 3, "ea molestias quasi exercitationem", "et iusto sed quo iure"),
    ]
    .into_iter()
    .map(|(user_id, id, title, body)| {
        (
            id,
            Post {
                user_id,
                id,
                title: title.to_string(),
                body: body.to_string(),
            },
        )
    })
    .collect();
    Store { posts, next_id: 4 }
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "Leanne Graham".to_string(),
            email: "Sincere@april.biz".to_string(),
        },
        User {
            id: 2,
            name: "Ervin Howell".to_string(),
            email: "Shanna@melissa.tv".to_string(),
        },
    ]
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/users", get(list_users))
        .route("/data/2.5/weather", get(current_weather))
        .route("/data/2.5/forecast", get(forecast))
        .route("/echo", any(echo))
        .route("/empty", get(empty))
        .route("/malformed", get(malformed))
        .route("/status/{code}", any(status))
        .route("/slow", get(slow))
        .route("/large", get(large))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

#[derive(Deserialize)]
struct PostFilter {
    #[serde(rename = "userId")]
    user_id: Option<u64>,
}

async fn list_posts(State(db): State<Db>, Query(filter): Query<PostFilter>) -> Json<Vec<Post>> {
    let store = db.read().await;
    Json(
        store
            .posts
            .values()
            .filter(|p| filter.user_id.is_none_or(|uid| p.user_id == uid))
            .cloned()
            .collect(),
    )
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<CreatePost>,
) -> (StatusCode, Json<Post>) {
    let mut store = db.write().await;
    let post = Post {
        user_id: input.user_id,
        id: store.next_id,
        title: input.title,
        body: input.body,
    };
    store.next_id += 1;
    store.posts.insert(post.id, post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn get_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Post>, (StatusCode, Json<Value>)> {
    let store = db.read().await;
    store.posts.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdatePost>,
) -> Result<Json<Post>, (StatusCode, Json<Value>)> {
    let mut store = db.write().await;
    let post = store.posts.get_mut(&id).ok_or_else(not_found)?;
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(body) = input.body {
        post.body = body;
    }
    if let Some(user_id) = input.user_id {
        post.user_id = user_id;
    }
    Ok(Json(post.clone()))
}

async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut store = db.write().await;
    store
        .posts
        .remove(&id)
        .map(|_| Json(json!({})))
        .ok_or_else(not_found)
}

async fn list_users() -> Json<Vec<User>> {
    Json(users())
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({})))
}

#[derive(Deserialize)]
struct WeatherQuery {
    q: Option<String>,
    appid: Option<String>,
    units: Option<String>,
    cnt: Option<u32>,
}

fn check_key(query: &WeatherQuery) -> Result<(), (StatusCode, Json<Value>)> {
    if query.appid.as_deref() == Some(WEATHER_API_KEY) {
        return Ok(());
    }
    Err((
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "cod": 401,
            "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
        })),
    ))
}

fn temperature(units: Option<&str>) -> f64 {
    match units {
        Some("metric") => 11.5,
        Some("imperial") => 52.7,
        _ => 284.65,
    }
}

async fn current_weather(
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    check_key(&query)?;
    Ok(Json(json!({
        "name": query.q.as_deref().unwrap_or_default(),
        "main": { "temp": temperature(query.units.as_deref()), "humidity": 81 },
        "weather": [{ "main": "Clouds", "description": "overcast clouds" }],
        "cod": 200
    })))
}

async fn forecast(
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    check_key(&query)?;
    let cnt = query.cnt.unwrap_or(40);
    let temp = temperature(query.units.as_deref());
    let list: Vec<Value> = (0..cnt)
        .map(|i| json!({ "dt": 1_700_000_000u64 + u64::from(i) * 10_800, "main": { "temp": temp } }))
        .collect();
    Ok(Json(json!({
        "cod": "200",
        "cnt": cnt,
        "city": { "name": query.q.as_deref().unwrap_or_default() },
        "list": list
    })))
}

/// Reflects the request back as JSON.
async fn echo(
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let headers: BTreeMap<String, String> = headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": headers,
        "body": body,
    }))
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn malformed() -> &'static str {
    "<html>not json</html>"
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, format!("status {code}"))
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({ "slow": true }))
}

async fn large() -> Json<Value> {
    Json(json!({ "data": "x".repeat(LARGE_BODY_BYTES) }))
}
