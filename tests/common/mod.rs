#![allow(dead_code)]

use async_trait::async_trait;
use library_admin::api::{AdminApi, Payload, Resource};
use library_admin::config::AdminConfig;
use library_admin::lifecycle::DashboardSystem;
use library_admin::model::{AccountStatus, Role, UserProfile};
use list_sync::{FilterValue, ListQuery, QueryError};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory admin API with call counters and scripted failures.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    rows: HashMap<Resource, Vec<Value>>,
    profile: Option<Result<UserProfile, QueryError>>,
    fail_next: Option<QueryError>,
    latency: Duration,
    list_calls: HashMap<Resource, usize>,
    writes: usize,
    profile_calls: usize,
    logouts: usize,
    last_payload: Option<Value>,
    next_id: usize,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn seed(&self, resource: Resource, rows: Vec<Value>) {
        self.state().rows.insert(resource, rows);
    }

    pub fn set_profile(&self, profile: Result<UserProfile, QueryError>) {
        self.state().profile = Some(profile);
    }

    pub fn fail_next(&self, error: QueryError) {
        self.state().fail_next = Some(error);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = latency;
    }

    pub fn list_calls(&self, resource: Resource) -> usize {
        self.state().list_calls.get(&resource).copied().unwrap_or(0)
    }

    pub fn writes(&self) -> usize {
        self.state().writes
    }

    pub fn profile_calls(&self) -> usize {
        self.state().profile_calls
    }

    pub fn logouts(&self) -> usize {
        self.state().logouts
    }

    pub fn last_payload(&self) -> Option<Value> {
        self.state().last_payload.clone()
    }

    pub fn ids(&self, resource: Resource) -> Vec<String> {
        self.state()
            .rows
            .get(&resource)
            .map(|rows| rows.iter().map(|r| r["_id"].as_str().unwrap_or_default().to_string()).collect())
            .unwrap_or_default()
    }

    async fn delay(&self) {
        let latency = self.state().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn take_failure(&self) -> Result<(), QueryError> {
        match self.state().fail_next.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn label(row: &Value) -> String {
    ["title", "name", "username"]
        .iter()
        .find_map(|k| row[*k].as_str())
        .unwrap_or_default()
        .to_lowercase()
}

fn matches(row: &Value, query: &ListQuery) -> bool {
    if let Some(keyword) = &query.keyword {
        if !label(row).contains(&keyword.to_lowercase()) {
            return false;
        }
    }
    query.filters.iter().all(|(key, value)| match (key.as_str(), value) {
        ("categories", FilterValue::Many(ids)) => row["category"]
            .as_array()
            .map(|tags| tags.iter().any(|t| ids.iter().any(|id| t["_id"] == id.as_str())))
            .unwrap_or(false),
        (key, value) => value.values().iter().any(|v| row[key] == *v),
    })
}

fn payload_object(payload: Payload) -> Map<String, Value> {
    match payload {
        Payload::Json(Value::Object(map)) => map,
        Payload::Json(_) => Map::new(),
        Payload::Multipart { fields, cover } => {
            let mut map = Map::new();
            let mut categories = Vec::new();
            for (key, value) in fields {
                match key.as_str() {
                    "category[]" => categories.push(json!({ "_id": value, "name": value })),
                    "quantity" | "available" => {
                        map.insert(key, json!(value.parse::<u64>().unwrap_or(0)));
                    }
                    _ => {
                        map.insert(key, Value::String(value));
                    }
                }
            }
            map.insert("category".into(), Value::Array(categories));
            if let Some(cover) = cover {
                map.insert("cover".into(), json!(format!("https://cdn/{}", cover.file_name)));
            }
            map
        }
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn list(&self, resource: Resource, query: &ListQuery) -> Result<Value, QueryError> {
        *self.state().list_calls.entry(resource).or_default() += 1;
        self.delay().await;
        self.take_failure()?;

        let state = self.state();
        let rows: Vec<&Value> = state
            .rows
            .get(&resource)
            .map(|rows| rows.iter().filter(|r| matches(r, query)).collect())
            .unwrap_or_default();
        let start = (query.page as usize - 1) * query.limit as usize;
        let page: Vec<Value> = rows
            .iter()
            .skip(start)
            .take(query.limit as usize)
            .map(|r| (*r).clone())
            .collect();
        Ok(json!({
            "data": page,
            "total": rows.len(),
            "page": query.page,
            "limit": query.limit,
        }))
    }

    async fn get(&self, resource: Resource, id: &str) -> Result<Value, QueryError> {
        self.delay().await;
        self.take_failure()?;
        self.state()
            .rows
            .get(&resource)
            .and_then(|rows| rows.iter().find(|r| r["_id"] == id).cloned())
            .ok_or_else(|| QueryError::NotFound(format!("{resource}/{id}")))
    }

    async fn create(&self, resource: Resource, payload: Payload) -> Result<Value, QueryError> {
        self.take_failure()?;
        let mut object = payload_object(payload);
        let mut state = self.state();
        state.writes += 1;
        state.next_id += 1;
        object.insert("_id".into(), json!(format!("{}-new-{}", resource, state.next_id)));
        let row = Value::Object(object);
        state.last_payload = Some(row.clone());
        state.rows.entry(resource).or_default().insert(0, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: Payload,
    ) -> Result<Value, QueryError> {
        self.take_failure()?;
        let changes = payload_object(payload);
        let mut state = self.state();
        state.writes += 1;
        state.last_payload = Some(Value::Object(changes.clone()));
        let row = state
            .rows
            .get_mut(&resource)
            .and_then(|rows| rows.iter_mut().find(|r| r["_id"] == id))
            .ok_or_else(|| QueryError::NotFound(format!("{resource}/{id}")))?;
        if let Value::Object(map) = row {
            map.extend(changes);
        }
        Ok(row.clone())
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<(), QueryError> {
        self.take_failure()?;
        let mut state = self.state();
        state.writes += 1;
        let rows = state.rows.entry(resource).or_default();
        let before = rows.len();
        rows.retain(|r| r["_id"] != id);
        if rows.len() == before {
            return Err(QueryError::NotFound(format!("{resource}/{id}")));
        }
        Ok(())
    }

    async fn profile(&self) -> Result<UserProfile, QueryError> {
        let mut state = self.state();
        state.profile_calls += 1;
        state
            .profile
            .clone()
            .unwrap_or_else(|| Err(QueryError::Server { status: 401, body: "no session".into() }))
    }

    async fn logout(&self) -> Result<(), QueryError> {
        self.state().logouts += 1;
        Ok(())
    }
}

pub fn book(id: &str, title: &str, categories: &[&str]) -> Value {
    json!({
        "_id": id,
        "title": title,
        "description": "",
        "author": "Anon",
        "publishedDate": "2001-01-01",
        "quantity": 3,
        "available": 3,
        "category": categories
            .iter()
            .map(|c| json!({ "_id": c, "name": c }))
            .collect::<Vec<_>>(),
    })
}

pub fn category(id: &str, name: &str) -> Value {
    json!({ "_id": id, "name": name, "description": "", "bookCount": 0 })
}

pub fn transaction(id: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "user": { "_id": "u1", "username": "ana", "email": "ana@example.com" },
        "book": { "_id": "b1", "title": "Dune" },
        "borrowDate": "2025-02-01T00:00:00Z",
        "dueDate": "2025-02-15T00:00:00Z",
        "returnDate": null,
        "status": status,
    })
}

pub fn profile(role: Role, status: AccountStatus) -> UserProfile {
    UserProfile {
        id: "u1".into(),
        username: "ana".into(),
        email: "ana@example.com".into(),
        role,
        status,
        avatar: None,
        phone: None,
    }
}

pub fn start(api: &Arc<FakeApi>) -> DashboardSystem {
    DashboardSystem::with_api(api.clone(), AdminConfig::default())
}
