mod in_memory;
mod mongo;

pub use in_memory::InMemoryRepository;
pub use mongo::MongoRepository;

use async_trait::async_trait;
use mongodb::{
    bson::{oid::ObjectId, Document as BsonDocument},
    error::Error as MongoError,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Errors surfaced by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to convert to bson format")]
    BsonConversionError,
    #[error("generic: {0}")]
    Generic(String),
    #[error("missing identifier")]
    MissingIdentifier,
    #[error("target not found")]
    TargetNotFound,
}

impl From<MongoError> for RepositoryError {
    fn from(error: MongoError) -> Self {
        RepositoryError::Generic(error.to_string())
    }
}

/// An entity addressable by a MongoDB object id.
pub trait Identifiable {
    fn id(&self) -> Option<ObjectId>;
    fn set_id(&mut self, id: ObjectId);
}

/// Marker alias for the bounds every persisted entity must satisfy.
pub trait Entity:
    Identifiable + Unpin + Sized + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Entity for T where
    T: Identifiable + Unpin + Sized + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Storage-agnostic set of operations over a collection of entities.
///
/// Filters are plain bson documents. Backends must understand direct
/// equality, `{"$in": [..]}` and `{"$elemMatch": {"$eq": ..}}`, which is
/// all the connector's query paths rely on.
#[async_trait]
pub trait Repository<T: Entity>: Sync + Send {
    /// Retrieves all entities.
    async fn find_all(&self) -> Result<Vec<T>, RepositoryError>;

    /// Retrieves a single entity by its identifier.
    async fn find_one(&self, entity_id: ObjectId) -> Result<Option<T>, RepositoryError>;

    /// Retrieves a single entity by filter.
    async fn find_one_by(&self, filter: BsonDocument) -> Result<Option<T>, RepositoryError>;

    /// Retrieves all entities matching the filter, up to `limit` when given.
    async fn find_all_by(
        &self,
        filter: BsonDocument,
        limit: Option<i64>,
    ) -> Result<Vec<T>, RepositoryError>;

    /// Counts entities matching the filter.
    async fn count_by(&self, filter: BsonDocument) -> Result<usize, RepositoryError>;

    /// Stores a new entity, returning it with its assigned identifier.
    async fn store(&self, entity: T) -> Result<T, RepositoryError>;

    /// Updates an existing entity in place.
    async fn update(&self, entity: T) -> Result<T, RepositoryError>;

    /// Deletes a single entity by its identifier.
    async fn delete_one(&self, entity_id: ObjectId) -> Result<(), RepositoryError>;

    /// Deletes all entities matching the filter, returning the deleted count.
    async fn delete_all_by(&self, filter: BsonDocument) -> Result<usize, RepositoryError>;
}
