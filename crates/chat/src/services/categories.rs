use std::sync::Arc;

use agora_core::chat::{Category, CreateCategory};
use agora_core::error::CoreResult;
use agora_core::roles::Principal;
use agora_core::store::{CategoryStore, TopicStore};
use agora_core::types::DbId;

use super::TitleChanges;
use crate::ws::Hub;

/// Categories are readable by anyone and managed by admins.
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    topics: Arc<dyn TopicStore>,
    hub: Arc<Hub>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>, topics: Arc<dyn TopicStore>, hub: Arc<Hub>) -> Self {
        Self { store, topics, hub }
    }

    pub async fn list(&self) -> CoreResult<Vec<Category>> {
        self.store.list().await.map_err(|e| e.context("category.list"))
    }

    pub async fn get(&self, id: DbId) -> CoreResult<Category> {
        self.store.get(id).await.map_err(|e| e.context("category.get"))
    }

    pub async fn create(
        &self,
        caller: Principal,
        title: String,
        description: String,
    ) -> CoreResult<Category> {
        caller.require_admin()?;
        let category = self
            .store
            .create(CreateCategory { title, description })
            .await
            .map_err(|e| e.context("category.create"))?;
        tracing::info!(category_id = category.id, user_id = caller.user_id, "Category created");
        Ok(category)
    }

    pub async fn update(
        &self,
        caller: Principal,
        id: DbId,
        changes: TitleChanges,
    ) -> CoreResult<Category> {
        caller.require_admin()?;
        let mut category = self.get(id).await?;
        if let Some(title) = changes.title {
            category.title = title;
        }
        if let Some(description) = changes.description {
            category.description = description;
        }
        let category = self
            .store
            .update(&category)
            .await
            .map_err(|e| e.context("category.update"))?;
        tracing::info!(category_id = id, user_id = caller.user_id, "Category updated");
        Ok(category)
    }

    /// The store cascades to the category's topics and messages; live
    /// subscribers of those topics are disconnected.
    pub async fn delete(&self, caller: Principal, id: DbId) -> CoreResult<()> {
        caller.require_admin()?;
        let topics = self
            .topics
            .list_by_category(id)
            .await
            .map_err(|e| e.context("category.delete: list topics"))?;
        self.store
            .delete(id)
            .await
            .map_err(|e| e.context("category.delete"))?;

        let mut disconnected = 0;
        for topic in &topics {
            disconnected += self.hub.close_topic(topic.id).await;
        }
        tracing::info!(
            category_id = id,
            user_id = caller.user_id,
            topics = topics.len(),
            disconnected,
            "Category deleted"
        );
        Ok(())
    }
}
