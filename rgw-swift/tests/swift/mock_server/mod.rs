//! 进程内的Swift + Keystone + TempAuth mock，监听`127.0.0.1:0`
//!
//! 只实现测试用到的部分：用户元数据、container/object的增删查、temp url校验

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use md5::{Digest, Md5};
use percent_encoding::percent_decode_str;
use rgw_swift_common::helper::sign_hmac_sha1_hex;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const TOKEN: &str = "AUTH_tk_mock";
pub const ACCOUNT_PATH: &str = "/swift/v1/AUTH_test";

pub const KEYSTONE_USER: &str = "demo";
pub const KEYSTONE_PASSWORD: &str = "secret";
pub const TEMPAUTH_USER: &str = "test:tester";
pub const TEMPAUTH_KEY: &str = "testing";

#[derive(Default)]
struct MockObject {
    data: Bytes,
    meta: HashMap<String, String>,
}

#[derive(Default)]
struct MockContainer {
    meta: HashMap<String, String>,
    objects: BTreeMap<String, MockObject>,
}

pub struct MockState {
    pub base: String,
    pub auth_calls: AtomicUsize,
    pub swift_calls: AtomicUsize,
    account_meta: Mutex<HashMap<String, String>>,
    containers: Mutex<BTreeMap<String, MockContainer>>,
}

pub struct MockServer {
    pub state: Arc<MockState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(MockState {
            base: format!("http://127.0.0.1:{port}"),
            auth_calls: AtomicUsize::new(0),
            swift_calls: AtomicUsize::new(0),
            account_meta: Mutex::new(HashMap::new()),
            containers: Mutex::new(BTreeMap::new()),
        });

        let app = Router::new()
            .route("/v3/auth/tokens", post(keystone))
            .route("/auth/1.0", get(tempauth))
            .fallback(swift)
            .with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state }
    }

    pub fn base(&self) -> &str {
        &self.state.base
    }

    pub fn storage_url(&self) -> String {
        format!("{}{}", self.state.base, ACCOUNT_PATH)
    }

    pub fn auth_calls(&self) -> usize {
        self.state.auth_calls.load(Ordering::SeqCst)
    }

    pub fn swift_calls(&self) -> usize {
        self.state.swift_calls.load(Ordering::SeqCst)
    }
}

async fn keystone(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.auth_calls.fetch_add(1, Ordering::SeqCst);

    let user = &body["auth"]["identity"]["password"]["user"];
    if user["name"] != KEYSTONE_USER || user["password"] != KEYSTONE_PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            "The request you have made requires authentication.",
        )
            .into_response();
    }

    let expires_at = (OffsetDateTime::now_utc() + Duration::from_secs(3600))
        .format(&Rfc3339)
        .unwrap();
    let token = json!({
        "token": {
            "expires_at": expires_at,
            "catalog": [
                {
                    "type": "object-store",
                    "endpoints": [
                        { "interface": "internal", "region": "RegionOne", "url": "http://10.255.255.1/swift/v1/AUTH_test" },
                        { "interface": "public", "region": "RegionOne", "url": format!("{}{}", state.base, ACCOUNT_PATH) }
                    ]
                }
            ]
        }
    });

    let mut headers = HeaderMap::new();
    headers.insert("x-subject-token", HeaderValue::from_static(TOKEN));
    (StatusCode::CREATED, headers, Json(token)).into_response()
}

async fn tempauth(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.auth_calls.fetch_add(1, Ordering::SeqCst);

    let user = headers.get("x-auth-user").and_then(|v| v.to_str().ok());
    let key = headers.get("x-auth-key").and_then(|v| v.to_str().ok());
    if user != Some(TEMPAUTH_USER) || key != Some(TEMPAUTH_KEY) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut resp_headers = HeaderMap::new();
    resp_headers.insert(
        "x-storage-url",
        HeaderValue::from_str(&format!("{}{}", state.base, ACCOUNT_PATH)).unwrap(),
    );
    resp_headers.insert("x-auth-token", HeaderValue::from_static(TOKEN));
    resp_headers.insert("x-auth-token-expires", HeaderValue::from_static("3600"));
    (StatusCode::NO_CONTENT, resp_headers).into_response()
}

async fn swift(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.swift_calls.fetch_add(1, Ordering::SeqCst);

    let Some(rest) = uri.path().strip_prefix(ACCOUNT_PATH) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let rest = rest.strip_prefix('/').unwrap_or(rest);

    let token = headers.get("x-auth-token").and_then(|v| v.to_str().ok());
    if token.is_none() && method == Method::GET {
        if let Some(query) = uri.query() {
            return temp_url_get(&state, uri.path(), query);
        }
    }
    if token != Some(TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match rest.split_once('/') {
        None if rest.is_empty() => account(&state, &method, &headers),
        None => container(&state, &method, rest, &headers),
        Some((c, o)) => object(&state, &method, c, o, &headers, body),
    }
}

fn merge_meta(target: &mut HashMap<String, String>, headers: &HeaderMap, prefix: &str) {
    for (name, value) in headers {
        if !name.as_str().starts_with(prefix) {
            continue;
        }
        let value = std::str::from_utf8(value.as_bytes()).unwrap_or_default();
        if value.is_empty() {
            target.remove(name.as_str());
        } else {
            target.insert(name.as_str().to_owned(), value.to_owned());
        }
    }
}

fn to_header_map(meta: &HashMap<String, String>) -> HeaderMap {
    meta.iter()
        .map(|(k, v)| {
            (
                HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            )
        })
        .collect()
}

fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

fn account(state: &MockState, method: &Method, headers: &HeaderMap) -> Response {
    match *method {
        Method::HEAD => {
            let meta = state.account_meta.lock().unwrap();
            let mut h = to_header_map(&meta);
            let count = state.containers.lock().unwrap().len();
            h.insert("x-account-container-count", HeaderValue::from(count));
            (StatusCode::NO_CONTENT, h).into_response()
        }
        Method::POST => {
            let mut meta = state.account_meta.lock().unwrap();
            merge_meta(&mut meta, headers, "x-account-meta-");
            StatusCode::NO_CONTENT.into_response()
        }
        Method::GET => {
            let containers = state.containers.lock().unwrap();
            let list: Vec<Value> = containers
                .iter()
                .map(|(name, c)| {
                    json!({
                        "name": name,
                        "count": c.objects.len(),
                        "bytes": c.objects.values().map(|o| o.data.len()).sum::<usize>(),
                    })
                })
                .collect();
            Json(list).into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn container(state: &MockState, method: &Method, name: &str, headers: &HeaderMap) -> Response {
    let mut containers = state.containers.lock().unwrap();
    if *method == Method::PUT {
        let created = !containers.contains_key(name);
        let c = containers.entry(name.to_owned()).or_default();
        merge_meta(&mut c.meta, headers, "x-container-meta-");
        return if created {
            StatusCode::CREATED
        } else {
            StatusCode::ACCEPTED
        }
        .into_response();
    }

    let Some(c) = containers.get_mut(name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match *method {
        Method::HEAD => {
            let mut h = to_header_map(&c.meta);
            h.insert("x-container-object-count", HeaderValue::from(c.objects.len()));
            (StatusCode::NO_CONTENT, h).into_response()
        }
        Method::POST => {
            merge_meta(&mut c.meta, headers, "x-container-meta-");
            StatusCode::NO_CONTENT.into_response()
        }
        Method::GET => {
            let list: Vec<Value> = c
                .objects
                .iter()
                .map(|(key, o)| {
                    json!({
                        "name": percent_decode_str(key).decode_utf8_lossy(),
                        "hash": md5_hex(&o.data),
                        "bytes": o.data.len(),
                        "content_type": "application/octet-stream",
                        "last_modified": "2024-01-01T00:00:00.000000",
                    })
                })
                .collect();
            Json(list).into_response()
        }
        Method::DELETE => {
            if !c.objects.is_empty() {
                return StatusCode::CONFLICT.into_response();
            }
            containers.remove(name);
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn object(
    state: &MockState,
    method: &Method,
    container: &str,
    name: &str,
    headers: &HeaderMap,
    body: Bytes,
) -> Response {
    let mut containers = state.containers.lock().unwrap();
    let Some(c) = containers.get_mut(container) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if *method == Method::PUT {
        let etag = md5_hex(&body);
        if let Some(expected) = headers.get("etag").and_then(|v| v.to_str().ok()) {
            if expected != etag {
                return StatusCode::UNPROCESSABLE_ENTITY.into_response();
            }
        }
        let mut meta = HashMap::new();
        merge_meta(&mut meta, headers, "x-object-meta-");
        c.objects.insert(name.to_owned(), MockObject { data: body, meta });
        let mut h = HeaderMap::new();
        h.insert("etag", HeaderValue::from_str(&etag).unwrap());
        return (StatusCode::CREATED, h).into_response();
    }

    let Some(o) = c.objects.get_mut(name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match *method {
        Method::GET | Method::HEAD => {
            let mut h = to_header_map(&o.meta);
            h.insert("etag", HeaderValue::from_str(&md5_hex(&o.data)).unwrap());
            (StatusCode::OK, h, o.data.clone()).into_response()
        }
        Method::POST => {
            // object的POST替换全部元数据
            o.meta.clear();
            merge_meta(&mut o.meta, headers, "x-object-meta-");
            StatusCode::ACCEPTED.into_response()
        }
        Method::DELETE => {
            c.objects.remove(name);
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

/// 校验temp url的签名和过期时间，通过后返回object内容
fn temp_url_get(state: &MockState, raw_path: &str, query: &str) -> Response {
    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    let (Some(sig), Some(expires)) = (params.get("temp_url_sig"), params.get("temp_url_expires"))
    else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let Some(key) = state
        .account_meta
        .lock()
        .unwrap()
        .get("x-account-meta-temp-url-key")
        .cloned()
    else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let path = percent_decode_str(raw_path).decode_utf8_lossy().into_owned();
    let expected = sign_hmac_sha1_hex(&key, &format!("GET\n{expires}\n{path}"));
    let not_expired = expires
        .parse::<i64>()
        .is_ok_and(|e| e > OffsetDateTime::now_utc().unix_timestamp());
    if *sig != expected || !not_expired {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let Some((container, name)) = path
        .strip_prefix(ACCOUNT_PATH)
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|rest| rest.split_once('/'))
    else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let containers = state.containers.lock().unwrap();
    match containers.get(container).and_then(|c| c.objects.get(name)) {
        Some(o) => {
            let mut h = HeaderMap::new();
            if let Some(filename) = params.get("filename") {
                h.insert(
                    "content-disposition",
                    HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")).unwrap(),
                );
            }
            (StatusCode::OK, h, o.data.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
