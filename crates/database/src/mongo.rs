use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document as BsonDocument},
    Collection, Cursor, Database,
};

use crate::{Entity, Repository, RepositoryError};

/// MongoDB-backed repository over a single collection.
pub struct MongoRepository<T: Entity> {
    collection: Collection<T>,
}

impl<T: Entity> MongoRepository<T> {
    pub fn from_db(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection(collection_name),
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MongoRepository<T> {
    async fn find_all(&self) -> Result<Vec<T>, RepositoryError> {
        let cursor = self.collection.find(doc! {}).await?;
        collect(cursor).await
    }

    async fn find_one(&self, entity_id: ObjectId) -> Result<Option<T>, RepositoryError> {
        self.find_one_by(doc! {"_id": entity_id}).await
    }

    async fn find_one_by(&self, filter: BsonDocument) -> Result<Option<T>, RepositoryError> {
        Ok(self.collection.find_one(filter).await?)
    }

    async fn find_all_by(
        &self,
        filter: BsonDocument,
        limit: Option<i64>,
    ) -> Result<Vec<T>, RepositoryError> {
        let cursor = match limit {
            Some(limit) => self.collection.find(filter).limit(limit).await?,
            None => self.collection.find(filter).await?,
        };
        collect(cursor).await
    }

    async fn count_by(&self, filter: BsonDocument) -> Result<usize, RepositoryError> {
        Ok(self.collection.count_documents(filter).await? as usize)
    }

    async fn store(&self, entity: T) -> Result<T, RepositoryError> {
        let mut entity = entity;
        let metadata = self.collection.insert_one(entity.clone()).await?;
        if let Bson::ObjectId(oid) = metadata.inserted_id {
            entity.set_id(oid);
        }
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepositoryError> {
        let id = entity.id().ok_or(RepositoryError::MissingIdentifier)?;
        let metadata = self
            .collection
            .replace_one(doc! {"_id": id}, entity.clone())
            .await?;
        if metadata.matched_count > 0 {
            Ok(entity)
        } else {
            Err(RepositoryError::TargetNotFound)
        }
    }

    async fn delete_one(&self, entity_id: ObjectId) -> Result<(), RepositoryError> {
        self.collection.delete_one(doc! {"_id": entity_id}).await?;
        Ok(())
    }

    async fn delete_all_by(&self, filter: BsonDocument) -> Result<usize, RepositoryError> {
        let metadata = self.collection.delete_many(filter).await?;
        Ok(metadata.deleted_count as usize)
    }
}

async fn collect<T: Entity>(mut cursor: Cursor<T>) -> Result<Vec<T>, RepositoryError> {
    let mut entities = Vec::new();
    while cursor.advance().await? {
        entities.push(cursor.deserialize_current()?);
    }
    Ok(entities)
}
