pub mod entity;

use database::{InMemoryRepository, MongoRepository, Repository, RepositoryError};
use didcomm::Attachment;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use serde_json::json;
use std::sync::Arc;

use entity::{BlockedDid, Mediatee, RoutedMessage};

/// The connector's persistence layer: mediatees, blocklist, outbox.
#[derive(Clone)]
pub struct AppStateRepository {
    pub mediatee_repository: Arc<dyn Repository<Mediatee>>,
    pub message_repository: Arc<dyn Repository<RoutedMessage>>,
    pub blocklist_repository: Arc<dyn Repository<BlockedDid>>,
}

impl AppStateRepository {
    pub fn mongo(db: &mongodb::Database) -> Self {
        Self {
            mediatee_repository: Arc::new(MongoRepository::from_db(db, "mediatees")),
            message_repository: Arc::new(MongoRepository::from_db(db, "messages")),
            blocklist_repository: Arc::new(MongoRepository::from_db(db, "blocked_dids")),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            mediatee_repository: Arc::new(InMemoryRepository::new()),
            message_repository: Arc::new(InMemoryRepository::new()),
            blocklist_repository: Arc::new(InMemoryRepository::new()),
        }
    }

    // --- Mediatees -------------------------------------------------------

    pub async fn mediatee(&self, remote_did: &str) -> Result<Option<Mediatee>, RepositoryError> {
        self.mediatee_repository
            .find_one_by(doc! {"remote_did": remote_did})
            .await
    }

    pub async fn is_mediated(&self, remote_did: &str) -> Result<bool, RepositoryError> {
        Ok(self.mediatee(remote_did).await?.is_some())
    }

    /// Lists mediatees, optionally restricted to a group. Pending
    /// invitations show up here too, until they are granted or expire.
    pub async fn mediatees(&self, group: Option<&str>) -> Result<Vec<Mediatee>, RepositoryError> {
        let filter = match group {
            Some(group) => doc! {"group": group},
            None => doc! {},
        };

        self.mediatee_repository.find_all_by(filter, None).await
    }

    pub async fn delete_mediatee(&self, remote_did: &str) -> Result<(), RepositoryError> {
        if let Some(mediatee) = self.mediatee(remote_did).await? {
            if let Some(id) = mediatee.id {
                self.mediatee_repository.delete_one(id).await?;
            }
        }
        Ok(())
    }

    // --- Blocklist -------------------------------------------------------

    pub async fn is_blocked(&self, remote_did: &str) -> Result<bool, RepositoryError> {
        Ok(self
            .blocklist_repository
            .find_one_by(doc! {"remote_did": remote_did})
            .await?
            .is_some())
    }

    pub async fn block(&self, remote_did: &str) -> Result<(), RepositoryError> {
        if !self.is_blocked(remote_did).await? {
            self.blocklist_repository
                .store(BlockedDid {
                    id: None,
                    remote_did: remote_did.to_string(),
                    added: Some(DateTime::now()),
                })
                .await?;
        }
        Ok(())
    }

    pub async fn unblock(&self, remote_did: &str) -> Result<(), RepositoryError> {
        self.blocklist_repository
            .delete_all_by(doc! {"remote_did": remote_did})
            .await?;
        Ok(())
    }

    // --- Recipient DIDs --------------------------------------------------

    pub async fn mediatee_by_recipient_did(
        &self,
        recipient_did: &str,
    ) -> Result<Option<Mediatee>, RepositoryError> {
        self.mediatee_repository
            .find_one_by(doc! {"recipient_dids": {"$elemMatch": {"$eq": recipient_did}}})
            .await
    }

    pub async fn is_recipient_did_registered(
        &self,
        recipient_did: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self.mediatee_by_recipient_did(recipient_did).await?.is_some())
    }

    /// Whether the recipient DID is registered under the given mediatee.
    pub async fn recipient_and_remote_did_belong_together(
        &self,
        recipient_did: &str,
        remote_did: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .mediatee_repository
            .find_one_by(doc! {
                "remote_did": remote_did,
                "recipient_dids": {"$elemMatch": {"$eq": recipient_did}},
            })
            .await?
            .is_some())
    }

    // --- Outbox ----------------------------------------------------------

    pub async fn add_message(
        &self,
        recipient_did: &str,
        attachment: &Attachment,
    ) -> Result<RoutedMessage, RepositoryError> {
        self.message_repository
            .store(RoutedMessage {
                id: None,
                recipient_did: recipient_did.to_string(),
                attachment: json!(attachment),
                added: Some(DateTime::now()),
            })
            .await
    }

    /// Returns up to `limit` parked attachments for the recipient. The
    /// attachment ids are rewritten to the outbox row ids so that a later
    /// `messages-received` can address them.
    pub async fn messages_for_recipient(
        &self,
        recipient_did: &str,
        limit: usize,
    ) -> Result<Vec<Attachment>, RepositoryError> {
        let rows = self
            .message_repository
            .find_all_by(doc! {"recipient_did": recipient_did}, Some(limit as i64))
            .await?;

        rows.into_iter()
            .map(|row| {
                let mut attachment: Attachment = serde_json::from_value(row.attachment)
                    .map_err(|_| RepositoryError::BsonConversionError)?;
                attachment.id = row.id.map(|id| id.to_hex());
                Ok(attachment)
            })
            .collect()
    }

    pub async fn messages_count_for_recipient(
        &self,
        recipient_did: &str,
    ) -> Result<usize, RepositoryError> {
        self.message_repository
            .count_by(doc! {"recipient_did": recipient_did})
            .await
    }

    /// Deletes outbox rows by id, returning how many actually existed.
    /// Acknowledging the same ids twice deletes nothing the second time.
    pub async fn delete_messages_by_ids(
        &self,
        message_ids: &[ObjectId],
    ) -> Result<usize, RepositoryError> {
        self.message_repository
            .delete_all_by(doc! {"_id": {"$in": message_ids.to_vec()}})
            .await
    }

    pub async fn remote_did_belongs_to_message(
        &self,
        remote_did: &str,
        message_id: ObjectId,
    ) -> Result<bool, RepositoryError> {
        let Some(row) = self.message_repository.find_one(message_id).await? else {
            return Ok(false);
        };

        self.recipient_and_remote_did_belong_together(&row.recipient_did, remote_did)
            .await
    }
}
