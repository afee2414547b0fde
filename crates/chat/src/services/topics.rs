use std::sync::Arc;

use agora_core::chat::{CreateTopic, Topic};
use agora_core::error::CoreResult;
use agora_core::roles::Principal;
use agora_core::store::{CategoryStore, TopicStore};
use agora_core::types::DbId;

use super::TitleChanges;
use crate::ws::Hub;

/// Topics belong to a category and to the user who opened them.
pub struct TopicService {
    topics: Arc<dyn TopicStore>,
    categories: Arc<dyn CategoryStore>,
    hub: Arc<Hub>,
}

impl TopicService {
    pub fn new(
        topics: Arc<dyn TopicStore>,
        categories: Arc<dyn CategoryStore>,
        hub: Arc<Hub>,
    ) -> Self {
        Self {
            topics,
            categories,
            hub,
        }
    }

    /// NotFound when the category does not exist.
    pub async fn list_by_category(&self, category_id: DbId) -> CoreResult<Vec<Topic>> {
        self.categories
            .get(category_id)
            .await
            .map_err(|e| e.context("topic.list: get category"))?;
        self.topics
            .list_by_category(category_id)
            .await
            .map_err(|e| e.context("topic.list"))
    }

    pub async fn get(&self, id: DbId) -> CoreResult<Topic> {
        self.topics.get(id).await.map_err(|e| e.context("topic.get"))
    }

    pub async fn create(
        &self,
        caller: Principal,
        category_id: DbId,
        title: String,
        description: String,
    ) -> CoreResult<Topic> {
        self.categories
            .get(category_id)
            .await
            .map_err(|e| e.context("topic.create: get category"))?;

        let topic = self
            .topics
            .create(CreateTopic {
                category_id,
                title,
                description,
                author_id: caller.user_id,
            })
            .await
            .map_err(|e| e.context("topic.create"))?;
        tracing::info!(topic_id = topic.id, category_id, user_id = caller.user_id, "Topic created");
        Ok(topic)
    }

    /// Author or admin.
    pub async fn update(
        &self,
        caller: Principal,
        id: DbId,
        changes: TitleChanges,
    ) -> CoreResult<Topic> {
        let mut topic = self.get(id).await?;
        caller.require_owner_or_admin(topic.author_id)?;

        if let Some(title) = changes.title {
            topic.title = title;
        }
        if let Some(description) = changes.description {
            topic.description = description;
        }
        let topic = self
            .topics
            .update(&topic)
            .await
            .map_err(|e| e.context("topic.update"))?;
        tracing::info!(topic_id = id, user_id = caller.user_id, "Topic updated");
        Ok(topic)
    }

    /// Author or admin. Messages of the topic go with it and its live
    /// subscribers are disconnected.
    pub async fn delete(&self, caller: Principal, id: DbId) -> CoreResult<()> {
        let topic = self.get(id).await?;
        caller.require_owner_or_admin(topic.author_id)?;
        self.topics
            .delete(id)
            .await
            .map_err(|e| e.context("topic.delete"))?;
        let disconnected = self.hub.close_topic(id).await;
        tracing::info!(topic_id = id, user_id = caller.user_id, disconnected, "Topic deleted");
        Ok(())
    }
}
