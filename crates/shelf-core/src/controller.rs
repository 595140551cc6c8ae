//! Request/response contract for one collection resource
//!
//! [`ResourceController`] maps the four resource operations (create, list,
//! get-one, delete-one) onto a [`RecordBackend`] and produces a
//! [`ResourceResponse`] that any transport can serialize. Addressing failures
//! become a `BadRequest` response; record validation and storage failures are
//! returned as [`ShelfError`] for the transport to map.

use crate::backend::RecordBackend;
use crate::error::{ShelfError, ShelfResult};
use serde::{Deserialize, Serialize};
use shelf_types::Record;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Message carried by every successful response
pub const OK_MESSAGE: &str = "ok!";
/// Message carried by every addressing failure
pub const OUT_OF_BOUND_MESSAGE: &str = "out of bound";

/// Outcome class of a resource operation, independent of wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Ok,
    Created,
    BadRequest,
}

impl ResponseStatus {
    /// Numeric HTTP status code
    pub fn code(self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::Created => 201,
            ResponseStatus::BadRequest => 400,
        }
    }
}

/// Either the whole collection or a single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Items {
    Many(Vec<Record>),
    One(Record),
}

/// JSON-shaped response body; absent fields are omitted when serialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_item: Option<Record>,
}

impl ResponseBody {
    /// `{"message": "ok!"}`
    pub fn ok() -> Self {
        Self { message: OK_MESSAGE.to_string(), items: None, removed_item: None }
    }

    /// `{"message": "out of bound"}`
    pub fn out_of_bound() -> Self {
        Self { message: OUT_OF_BOUND_MESSAGE.to_string(), items: None, removed_item: None }
    }

    /// Success body carrying `items`
    pub fn with_items(items: Items) -> Self {
        Self { items: Some(items), ..Self::ok() }
    }

    /// Success body carrying the deleted record as `removed_item`
    pub fn with_removed(record: Record) -> Self {
        Self { removed_item: Some(record), ..Self::ok() }
    }
}

/// Transport-independent result of one controller operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub status: ResponseStatus,
    pub body: ResponseBody,
}

impl ResourceResponse {
    fn new(status: ResponseStatus, body: ResponseBody) -> Self {
        Self { status, body }
    }

    fn out_of_bound() -> Self {
        Self::new(ResponseStatus::BadRequest, ResponseBody::out_of_bound())
    }
}

/// Parse an external position token.
///
/// Any integer parses, including negative ones; the backend decides whether
/// it is in bounds. Everything else is a [`ShelfError::MalformedPosition`].
pub fn parse_position(token: &str) -> ShelfResult<i64> {
    token.parse::<i64>().map_err(|_| ShelfError::malformed_position(token))
}

/// Controller for one named resource, owning its backend
#[derive(Debug, Clone)]
pub struct ResourceController {
    resource: String,
    backend: Arc<dyn RecordBackend>,
}

impl ResourceController {
    /// Create a controller serving `resource` from `backend`
    pub fn new(resource: impl Into<String>, backend: Arc<dyn RecordBackend>) -> Self {
        Self { resource: resource.into(), backend }
    }

    /// Resource name, the first path segment of its routes
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn backend(&self) -> &Arc<dyn RecordBackend> {
        &self.backend
    }

    /// Store `payload` and answer `Created` with `{"message": "ok!"}`.
    #[instrument(skip(self, payload), fields(resource = %self.resource))]
    pub async fn handle_create(&self, payload: Record) -> ShelfResult<ResourceResponse> {
        debug!(fields = payload.len(), "Inserting record");
        let address = self.backend.insert(payload).await.inspect_err(|err| {
            if err.is_invalid_record() {
                warn!(error = %err, kind = err.category(), "Rejected record");
            }
        })?;
        info!(address, "Record created");
        Ok(ResourceResponse::new(ResponseStatus::Created, ResponseBody::ok()))
    }

    /// Answer with every record in address order under `items`.
    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn handle_list(&self) -> ShelfResult<ResourceResponse> {
        let records = self.backend.list().await?;
        debug!(count = records.len(), "Listed records");
        Ok(ResourceResponse::new(ResponseStatus::Ok, ResponseBody::with_items(Items::Many(records))))
    }

    /// Answer with the record at `position` under `items`, or `BadRequest`
    /// with `"out of bound"` when the token does not address a record.
    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn handle_get(&self, position: &str) -> ShelfResult<ResourceResponse> {
        let result = match parse_position(position) {
            Ok(address) => self.backend.get(address).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(record) => Ok(ResourceResponse::new(
                ResponseStatus::Ok,
                ResponseBody::with_items(Items::One(record)),
            )),
            Err(err) if err.is_addressing() => {
                warn!(error = %err, kind = err.category(), "Rejected read");
                Ok(ResourceResponse::out_of_bound())
            }
            Err(err) => Err(err),
        }
    }

    /// Remove the record at `position` and return it as `removed_item`.
    ///
    /// Failed addressing answers `BadRequest` and leaves the collection
    /// untouched.
    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn handle_delete(&self, position: &str) -> ShelfResult<ResourceResponse> {
        let result = match parse_position(position) {
            Ok(address) => self.backend.remove(address).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(record) => {
                info!("Record removed");
                Ok(ResourceResponse::new(ResponseStatus::Ok, ResponseBody::with_removed(record)))
            }
            Err(err) if err.is_addressing() => {
                warn!(error = %err, kind = err.category(), "Rejected delete");
                Ok(ResourceResponse::out_of_bound())
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, SqliteBackend};
    use crate::schema::TableSchema;
    use serde_json::json;

    fn controller() -> ResourceController {
        ResourceController::new("list", Arc::new(MemoryBackend::new()))
    }

    fn named(name: &str) -> Record {
        Record::new().with_field("name", name)
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("0"), Ok(0));
        assert_eq!(parse_position("-1"), Ok(-1));
        assert_eq!(parse_position("abc"), Err(ShelfError::malformed_position("abc")));
        assert!(parse_position("1.5").is_err());
        assert!(parse_position("").is_err());
    }

    #[tokio::test]
    async fn test_get_on_empty_collection() {
        let response = controller().handle_get("0").await.unwrap();
        assert_eq!(response.status, ResponseStatus::BadRequest);
        assert_eq!(serde_json::to_value(&response.body).unwrap(), json!({"message": "out of bound"}));
    }

    #[tokio::test]
    async fn test_create_then_list_preserves_order() {
        let controller = controller();
        let created = controller.handle_create(named("Jon")).await.unwrap();
        assert_eq!(created.status, ResponseStatus::Created);
        assert_eq!(serde_json::to_value(&created.body).unwrap(), json!({"message": "ok!"}));
        controller.handle_create(named("Linda")).await.unwrap();

        let listed = controller.handle_list().await.unwrap();
        assert_eq!(listed.status, ResponseStatus::Ok);
        assert_eq!(
            serde_json::to_value(&listed.body).unwrap(),
            json!({"message": "ok!", "items": [{"name": "Jon"}, {"name": "Linda"}]})
        );
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record_and_shifts() {
        let controller = controller();
        controller.handle_create(named("Jon")).await.unwrap();
        controller.handle_create(named("Linda")).await.unwrap();

        let deleted = controller.handle_delete("0").await.unwrap();
        assert_eq!(deleted.status, ResponseStatus::Ok);
        assert_eq!(
            serde_json::to_value(&deleted.body).unwrap(),
            json!({"message": "ok!", "removed_item": {"name": "Jon"}})
        );

        let listed = controller.handle_list().await.unwrap();
        assert_eq!(listed.body.items, Some(Items::Many(vec![named("Linda")])));

        let got = controller.handle_get("0").await.unwrap();
        assert_eq!(
            serde_json::to_value(&got.body).unwrap(),
            json!({"message": "ok!", "items": {"name": "Linda"}})
        );
    }

    #[tokio::test]
    async fn test_negative_and_malformed_positions_are_out_of_bound() {
        let controller = controller();
        controller.handle_create(named("Jon")).await.unwrap();

        for token in ["-1", "1", "x", "0x1", "99999999999999999999"] {
            let got = controller.handle_get(token).await.unwrap();
            assert_eq!(got.status, ResponseStatus::BadRequest, "get {token}");
            assert_eq!(got.body, ResponseBody::out_of_bound());

            let deleted = controller.handle_delete(token).await.unwrap();
            assert_eq!(deleted.status, ResponseStatus::BadRequest, "delete {token}");
        }

        let listed = controller.handle_list().await.unwrap();
        assert_eq!(listed.body.items, Some(Items::Many(vec![named("Jon")])));
    }

    #[tokio::test]
    async fn test_large_integers_survive_create_then_get() {
        let controller = controller();
        let payload = json!({"n": 18_446_744_073_709_551_615_u64});
        let record: Record = serde_json::from_value(payload.clone()).unwrap();
        controller.handle_create(record).await.unwrap();

        let got = controller.handle_get("0").await.unwrap();
        assert_eq!(
            serde_json::to_value(&got.body).unwrap(),
            json!({"message": "ok!", "items": payload})
        );
    }

    #[tokio::test]
    async fn test_sqlite_controller_rejects_unknown_fields() {
        let backend =
            SqliteBackend::connect("sqlite::memory:", TableSchema::authors(), 1).await.unwrap();
        let controller = ResourceController::new("authors", Arc::new(backend));

        let err = controller.handle_create(named("Ana")).await.unwrap_err();
        assert!(err.is_invalid_record());

        let author = Record::new().with_field("Name", "Ana").with_field("Slug", "ana");
        controller.handle_create(author).await.unwrap();
        let got = controller.handle_get("1").await.unwrap();
        assert_eq!(got.status, ResponseStatus::Ok);
    }

    #[test]
    fn test_response_body_round_trips_through_json() {
        let body: ResponseBody =
            serde_json::from_value(json!({"message": "ok!", "items": [{"name": "Jon"}]})).unwrap();
        assert_eq!(body.items, Some(Items::Many(vec![named("Jon")])));

        let body: ResponseBody =
            serde_json::from_value(json!({"message": "ok!", "items": {"name": "Jon"}})).unwrap();
        assert_eq!(body.items, Some(Items::One(named("Jon"))));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ResponseStatus::Ok.code(), 200);
        assert_eq!(ResponseStatus::Created.code(), 201);
        assert_eq!(ResponseStatus::BadRequest.code(), 400);
    }
}
