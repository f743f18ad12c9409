use async_trait::async_trait;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document as BsonDocument};
use std::sync::RwLock;

use crate::{Entity, Repository, RepositoryError};

/// In-memory repository used for `database.in_memory` deployments and tests.
///
/// Entities are matched against filters through their bson representation,
/// so the same filters work against MongoDB and this implementation.
pub struct InMemoryRepository<T> {
    entities: RwLock<Vec<T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::from(vec![])
    }

    pub fn from(entities: Vec<T>) -> Self {
        Self {
            entities: RwLock::new(entities),
        }
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn find_all(&self) -> Result<Vec<T>, RepositoryError> {
        Ok(self.entities.read().unwrap().clone())
    }

    async fn find_one(&self, entity_id: ObjectId) -> Result<Option<T>, RepositoryError> {
        self.find_one_by(doc! {"_id": entity_id}).await
    }

    async fn find_one_by(&self, filter: BsonDocument) -> Result<Option<T>, RepositoryError> {
        Ok(self
            .find_all_by(filter, Some(1))
            .await?
            .into_iter()
            .next())
    }

    async fn find_all_by(
        &self,
        filter: BsonDocument,
        limit: Option<i64>,
    ) -> Result<Vec<T>, RepositoryError> {
        if let Some(limit) = limit {
            if limit < 0 {
                return Ok(vec![]);
            }
        }

        let mut matched = vec![];
        for entity in self.entities.read().unwrap().iter() {
            if matches_filter(entity, &filter)? {
                matched.push(entity.clone());
            }
        }

        if let Some(limit) = limit {
            if limit != 0 {
                matched.truncate(limit as usize);
            }
        }

        Ok(matched)
    }

    async fn count_by(&self, filter: BsonDocument) -> Result<usize, RepositoryError> {
        Ok(self.find_all_by(filter, None).await?.len())
    }

    async fn store(&self, entity: T) -> Result<T, RepositoryError> {
        let mut entity = entity;
        if entity.id().is_none() {
            entity.set_id(ObjectId::new());
        }
        self.entities.write().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepositoryError> {
        if entity.id().is_none() {
            return Err(RepositoryError::MissingIdentifier);
        }

        let mut entities = self.entities.write().unwrap();
        if let Some(pos) = entities.iter().position(|e| e.id() == entity.id()) {
            entities[pos] = entity.clone();
            Ok(entity)
        } else {
            Err(RepositoryError::TargetNotFound)
        }
    }

    async fn delete_one(&self, entity_id: ObjectId) -> Result<(), RepositoryError> {
        let mut entities = self.entities.write().unwrap();
        if let Some(pos) = entities.iter().position(|e| e.id() == Some(entity_id)) {
            entities.remove(pos);
        }
        Ok(())
    }

    async fn delete_all_by(&self, filter: BsonDocument) -> Result<usize, RepositoryError> {
        let retained: Vec<bool> = {
            let entities = self.entities.read().unwrap();
            entities
                .iter()
                .map(|e| matches_filter(e, &filter).map(|m| !m))
                .collect::<Result<_, _>>()?
        };

        let mut entities = self.entities.write().unwrap();
        let before = entities.len();
        let mut keep = retained.into_iter();
        entities.retain(|_| keep.next().unwrap_or(true));
        Ok(before - entities.len())
    }
}

/// Evaluates a bson filter against an entity's bson representation.
///
/// Supported conditions: direct equality, `{"$in": [..]}` on scalar fields
/// and `{"$elemMatch": {"$eq": ..}}` on array fields. A scalar condition on
/// an array field matches on membership, mirroring MongoDB.
fn matches_filter<T: Entity>(entity: &T, filter: &BsonDocument) -> Result<bool, RepositoryError> {
    let doc = bson::to_document(entity).map_err(|_| RepositoryError::BsonConversionError)?;

    for (key, condition) in filter.iter() {
        let value = doc.get(key);

        let matched = match condition {
            Bson::Document(condition) => {
                if let Ok(candidates) = condition.get_array("$in") {
                    value.is_some_and(|v| candidates.contains(v))
                } else if let Ok(elem) = condition.get_document("$elemMatch") {
                    match (value, elem.get("$eq")) {
                        (Some(Bson::Array(items)), Some(target)) => items.contains(target),
                        _ => false,
                    }
                } else {
                    matches!(value, Some(Bson::Document(v)) if v == condition)
                }
            }
            condition => match value {
                Some(Bson::Array(items)) => items.contains(condition),
                other => other == Some(condition),
            },
        };

        if !matched {
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    use crate::Identifiable;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Record {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<ObjectId>,
        owner: String,
        tags: Vec<String>,
    }

    impl Identifiable for Record {
        fn id(&self) -> Option<ObjectId> {
            self.id
        }

        fn set_id(&mut self, id: ObjectId) {
            self.id = Some(id);
        }
    }

    fn sample(owner: &str, tags: &[&str]) -> Record {
        Record {
            id: None,
            owner: owner.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_store_assigns_identifier() {
        let repository = InMemoryRepository::new();
        let stored = repository.store(sample("alice", &[])).await.unwrap();
        assert!(stored.id.is_some());
    }

    #[tokio::test]
    async fn test_equality_and_membership_filters() {
        let repository = InMemoryRepository::from(vec![
            sample("alice", &["a", "b"]),
            sample("bob", &["c"]),
        ]);

        let found = repository
            .find_one_by(doc! {"owner": "bob"})
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.owner, "bob");

        // scalar condition on an array field matches on membership
        let found = repository.find_all_by(doc! {"tags": "b"}, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].owner, "alice");

        let found = repository
            .find_all_by(doc! {"tags": {"$elemMatch": {"$eq": "c"}}}, None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].owner, "bob");
    }

    #[tokio::test]
    async fn test_in_filter_and_delete_all_by() {
        let repository = InMemoryRepository::from(vec![
            sample("alice", &[]),
            sample("bob", &[]),
            sample("carol", &[]),
        ]);

        let count = repository
            .count_by(doc! {"owner": {"$in": ["alice", "carol", "dave"]}})
            .await
            .unwrap();
        assert_eq!(count, 2);

        let deleted = repository
            .delete_all_by(doc! {"owner": {"$in": ["alice", "carol", "dave"]}})
            .await
            .unwrap();
        assert_eq!(deleted, 2);

        // deleting again is a no-op
        let deleted = repository
            .delete_all_by(doc! {"owner": {"$in": ["alice", "carol", "dave"]}})
            .await
            .unwrap();
        assert_eq!(deleted, 0);

        assert_eq!(repository.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_requires_identifier() {
        let repository = InMemoryRepository::new();
        let err = repository.update(sample("alice", &[])).await.unwrap_err();
        assert!(matches!(err, RepositoryError::MissingIdentifier));
    }

    #[tokio::test]
    async fn test_negative_limit_yields_no_results() {
        let repository = InMemoryRepository::from(vec![sample("alice", &[])]);
        let found = repository.find_all_by(doc! {}, Some(-1)).await.unwrap();
        assert!(found.is_empty());
    }
}
