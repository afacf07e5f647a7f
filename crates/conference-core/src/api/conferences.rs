//! Conferences API
//!
//! One method per endpoint of `/api/conferences`.

use super::{AlertHeaders, ApiError, ApiResponse, StatusCode};
use crate::config::{ApiConfig, UnknownIdStatus};
use crate::domain::conference::{
    Conference, ConferencePatch, ConferenceService, ReindexReport, Synced,
};
use crate::error::{Error, ErrorKind};

/// Entity name used in alert headers and errors
pub const ENTITY_NAME: &str = "conference";

/// Base path of the collection
pub const BASE_PATH: &str = "/api/conferences";

/// Result of a resource call
pub type ApiResult<T> = std::result::Result<ApiResponse<T>, ApiError>;

/// Which lookup produced a `NotFound`
#[derive(Debug, Clone, Copy)]
enum Lookup {
    /// Target of an update or partial update
    UpdateTarget,
    /// Plain fetch by id
    Fetch,
}

/// Conference resource over the sync coordinator
#[derive(Clone)]
pub struct ConferenceResource {
    service: ConferenceService,
    config: ApiConfig,
}

impl ConferenceResource {
    pub fn new(service: ConferenceService, config: ApiConfig) -> Self {
        Self { service, config }
    }

    pub fn service(&self) -> &ConferenceService {
        &self.service
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `POST /api/conferences`
    pub async fn create(&self, conference: Conference) -> ApiResult<Conference> {
        tracing::debug!(name = %conference.name, "REST request to save Conference");

        let synced = self
            .service
            .create(&conference)
            .await
            .map_err(|e| self.reject(e, Lookup::Fetch))?;
        let (stored, warning) = split(synced);
        let id = stored.id.unwrap_or_default();

        let headers = self.headers();
        Ok(ApiResponse::new(StatusCode::CREATED, Some(stored))
            .with_location(format!("{}/{}", BASE_PATH, id))
            .with_header_pair(headers.alert(ENTITY_NAME, "created"))
            .with_header_pair(headers.params(id))
            .with_index_warning(warning))
    }

    /// `PUT /api/conferences/{id}`
    pub async fn update(&self, id: i64, conference: Conference) -> ApiResult<Conference> {
        tracing::debug!(id, "REST request to update Conference");

        let synced = self
            .service
            .update(id, &conference)
            .await
            .map_err(|e| self.reject(e, Lookup::UpdateTarget))?;
        Ok(self.updated(id, synced))
    }

    /// `PATCH /api/conferences/{id}` with merge-patch semantics
    pub async fn partial_update(&self, id: i64, patch: ConferencePatch) -> ApiResult<Conference> {
        tracing::debug!(id, "REST request to partial update Conference partially");

        let synced = self
            .service
            .partial_update(id, &patch)
            .await
            .map_err(|e| self.reject(e, Lookup::UpdateTarget))?;
        Ok(self.updated(id, synced))
    }

    /// `GET /api/conferences`
    pub async fn list(&self) -> ApiResult<Vec<Conference>> {
        tracing::debug!("REST request to get all Conferences");

        let conferences = self
            .service
            .list()
            .await
            .map_err(|e| self.reject(e, Lookup::Fetch))?;
        Ok(ApiResponse::ok(conferences))
    }

    /// `GET /api/conferences/{id}`
    pub async fn get(&self, id: i64) -> ApiResult<Conference> {
        tracing::debug!(id, "REST request to get Conference");

        let conference = self
            .service
            .get(id)
            .await
            .map_err(|e| self.reject(e, Lookup::Fetch))?;
        Ok(ApiResponse::ok(conference))
    }

    /// `DELETE /api/conferences/{id}`
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        tracing::debug!(id, "REST request to delete Conference");

        let synced = self
            .service
            .delete(id)
            .await
            .map_err(|e| self.reject(e, Lookup::Fetch))?;
        let (_, warning) = split(synced);

        let headers = self.headers();
        Ok(ApiResponse::new(StatusCode::NO_CONTENT, None)
            .with_header_pair(headers.alert(ENTITY_NAME, "deleted"))
            .with_header_pair(headers.params(id))
            .with_index_warning(warning))
    }

    /// `GET /api/conferences/_search?query=...`
    pub async fn search(&self, query: &str) -> ApiResult<Vec<Conference>> {
        tracing::debug!(query, "REST request to search Conferences");

        let conferences = self
            .service
            .search_all(query)
            .await
            .map_err(|e| self.reject(e, Lookup::Fetch))?;
        Ok(ApiResponse::ok(conferences))
    }

    /// `POST /api/conferences/_reindex`
    pub async fn reindex(&self) -> ApiResult<ReindexReport> {
        tracing::debug!("REST request to reindex Conferences");

        let report = self
            .service
            .reindex()
            .await
            .map_err(|e| self.reject(e, Lookup::Fetch))?;
        Ok(ApiResponse::ok(report))
    }

    fn headers(&self) -> AlertHeaders<'_> {
        AlertHeaders::new(&self.config.application_name)
    }

    fn updated(&self, id: i64, synced: Synced<Conference>) -> ApiResponse<Conference> {
        let (stored, warning) = split(synced);
        let headers = self.headers();
        ApiResponse::ok(stored)
            .with_header_pair(headers.alert(ENTITY_NAME, "updated"))
            .with_header_pair(headers.params(id))
            .with_index_warning(warning)
    }

    fn reject(&self, error: Error, lookup: Lookup) -> ApiError {
        let (status, key) = match (error.kind(), lookup) {
            // Deleted after the update passed its existence check
            _ if matches!(error, Error::Vanished(_)) => (StatusCode::NOT_FOUND, error.error_key()),
            (ErrorKind::NotFound, Lookup::UpdateTarget) => {
                let status = match self.config.unknown_id_status {
                    UnknownIdStatus::BadRequest => StatusCode::BAD_REQUEST,
                    UnknownIdStatus::NotFound => StatusCode::NOT_FOUND,
                };
                (status, "idnotfound")
            }
            (ErrorKind::NotFound, Lookup::Fetch) => (StatusCode::NOT_FOUND, error.error_key()),
            (ErrorKind::Validation | ErrorKind::Query, _) => {
                (StatusCode::BAD_REQUEST, error.error_key())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(code = error.code(), error = %error, "Conference request failed");
        } else {
            tracing::debug!(
                code = error.code(),
                status = status.as_u16(),
                key,
                "Conference request rejected"
            );
        }

        ApiError {
            status,
            entity_name: ENTITY_NAME.to_string(),
            error_key: key.to_string(),
            message: error.to_string(),
            headers: vec![self.headers().error(key)],
        }
    }
}

fn split<T>(synced: Synced<T>) -> (T, Option<String>) {
    let warning = synced.index_error.as_ref().map(ToString::to_string);
    (synced.value, warning)
}

impl<T> ApiResponse<T> {
    fn with_header_pair(self, (name, value): (String, String)) -> Self {
        self.with_header(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::conference::{
        InMemoryConferenceRepository, InMemoryConferenceSearchIndex, VanishingConferenceRepository,
    };
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn resource_with(config: ApiConfig) -> (ConferenceResource, Arc<InMemoryConferenceSearchIndex>) {
        let index = Arc::new(InMemoryConferenceSearchIndex::new());
        let service = ConferenceService::new(
            Arc::new(InMemoryConferenceRepository::new()),
            index.clone(),
        );
        (ConferenceResource::new(service, config), index)
    }

    fn resource() -> ConferenceResource {
        resource_with(ApiConfig::default()).0
    }

    fn conference() -> Conference {
        Conference::new("AAAAAAAAAA", Utc.timestamp_millis_opt(0).unwrap())
    }

    #[tokio::test]
    async fn test_create_returns_201_with_location_and_alerts() {
        let resource = resource();

        let response = resource.create(conference()).await.unwrap();
        let id = response.body.as_ref().and_then(|c| c.id).unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.location, Some(format!("/api/conferences/{}", id)));
        assert_eq!(
            response.header("X-conferenceApp-alert"),
            Some("conferenceApp.conference.created")
        );
        assert_eq!(response.header("X-conferenceApp-params"), Some(id.to_string().as_str()));
        assert!(response.index_warning.is_none());
    }

    #[tokio::test]
    async fn test_create_with_id_is_bad_request() {
        let resource = resource();

        let err = resource.create(conference().with_id(1)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error_key, "idexists");
        assert_eq!(err.entity_name, "conference");
        assert_eq!(err.header("X-conferenceApp-error"), Some("error.idexists"));
    }

    #[tokio::test]
    async fn test_update_errors() {
        let resource = resource();
        let created = resource.create(conference()).await.unwrap().body.unwrap();
        let id = created.id.unwrap();

        let err = resource.update(id, conference()).await.unwrap_err();
        assert_eq!((err.status, err.error_key.as_str()), (StatusCode::BAD_REQUEST, "idnull"));

        let err = resource
            .update(id, conference().with_id(id + 1))
            .await
            .unwrap_err();
        assert_eq!((err.status, err.error_key.as_str()), (StatusCode::BAD_REQUEST, "idinvalid"));

        let err = resource
            .update(999, conference().with_id(999))
            .await
            .unwrap_err();
        assert_eq!((err.status, err.error_key.as_str()), (StatusCode::BAD_REQUEST, "idnotfound"));
    }

    #[tokio::test]
    async fn test_unknown_id_status_is_configurable() {
        let config = ApiConfig {
            unknown_id_status: UnknownIdStatus::NotFound,
            ..ApiConfig::default()
        };
        let (resource, _) = resource_with(config);

        let err = resource
            .partial_update(5, ConferencePatch::for_id(5).name("x"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.error_key, "idnotfound");
    }

    #[tokio::test]
    async fn test_update_and_patch_return_200() {
        let resource = resource();
        let created = resource.create(conference()).await.unwrap().body.unwrap();
        let id = created.id.unwrap();

        let renamed = Conference::new("BBBBBBBBBB", created.date).with_id(id);
        let response = resource.update(id, renamed.clone()).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Some(renamed));
        assert_eq!(
            response.header("X-conferenceApp-alert"),
            Some("conferenceApp.conference.updated")
        );

        let response = resource
            .partial_update(id, ConferencePatch::for_id(id))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.unwrap().name, "BBBBBBBBBB");
    }

    #[tokio::test]
    async fn test_get_unknown_is_404() {
        let err = resource().get(42).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.error_key, "notfound");
    }

    #[tokio::test]
    async fn test_delete_is_204_and_idempotent() {
        let resource = resource();
        let id = resource
            .create(conference())
            .await
            .unwrap()
            .body
            .and_then(|c| c.id)
            .unwrap();

        let first = resource.delete(id).await.unwrap();
        assert_eq!(first.status, StatusCode::NO_CONTENT);
        assert!(first.body.is_none());
        assert_eq!(
            first.header("X-conferenceApp-alert"),
            Some("conferenceApp.conference.deleted")
        );

        let second = resource.delete(id).await.unwrap();
        assert_eq!(second.status, StatusCode::NO_CONTENT);
        assert!(resource.search(&format!("id:{}", id)).await.unwrap().body.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_keeps_success_status() {
        let (resource, index) = resource_with(ApiConfig::default());
        index.fail_writes(true);

        let response = resource.create(conference()).await.unwrap();
        assert_eq!(response.status, StatusCode::CREATED);
        assert!(response.index_warning.is_some());

        let id = response.body.and_then(|c| c.id).unwrap();
        assert_eq!(resource.get(id).await.unwrap().status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let resource = resource();
        resource.create(conference()).await.unwrap();
        resource
            .create(Conference::new("RustConf", Utc.timestamp_millis_opt(0).unwrap()))
            .await
            .unwrap();

        assert_eq!(resource.list().await.unwrap().body.unwrap().len(), 2);

        let hits = resource.search("rustconf").await.unwrap().body.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "RustConf");
    }

    #[tokio::test]
    async fn test_custom_application_name() {
        let config = ApiConfig {
            application_name: "testApp".to_string(),
            ..ApiConfig::default()
        };
        let (resource, _) = resource_with(config);

        let response = resource.create(conference()).await.unwrap();
        assert_eq!(
            response.header("X-testApp-alert"),
            Some("testApp.conference.created")
        );
    }

    #[tokio::test]
    async fn test_patch_target_deleted_mid_update_is_404() {
        let service = ConferenceService::new(
            Arc::new(VanishingConferenceRepository),
            Arc::new(InMemoryConferenceSearchIndex::new()),
        );

        // The unknown-id setting only covers the existence check
        for unknown_id_status in [UnknownIdStatus::BadRequest, UnknownIdStatus::NotFound] {
            let config = ApiConfig {
                unknown_id_status,
                ..ApiConfig::default()
            };
            let resource = ConferenceResource::new(service.clone(), config);

            let err = resource
                .partial_update(1, ConferencePatch::for_id(1).name("x"))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::NOT_FOUND);
            assert_eq!(err.error_key, "notfound");
            assert_eq!(err.header("X-conferenceApp-error"), Some("error.notfound"));
        }
    }
}
