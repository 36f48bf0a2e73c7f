use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Lesson,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn create(&self, lesson: Lesson) -> AppResult<Lesson>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>>;
    /// Unordered; callers sort.
    async fn find_all(&self) -> AppResult<Vec<Lesson>>;
    async fn update(&self, lesson: Lesson) -> AppResult<Lesson>;
    /// Returns false when nothing was deleted.
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn count(&self) -> AppResult<u64>;
}

pub struct MongoLessonRepository {
    collection: Collection<Lesson>,
}

impl MongoLessonRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("lessons");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for lessons collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let order_index = IndexModel::builder()
            .keys(doc! { "order": 1, "createdAt": -1 })
            .options(IndexOptions::builder().name("order".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(order_index).await?;

        log::info!("Successfully created indexes for lessons collection");
        Ok(())
    }
}

#[async_trait]
impl LessonRepository for MongoLessonRepository {
    async fn create(&self, lesson: Lesson) -> AppResult<Lesson> {
        self.collection.insert_one(&lesson).await?;
        Ok(lesson)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Lesson>> {
        let lesson = self.collection.find_one(doc! { "id": id }).await?;
        Ok(lesson)
    }

    async fn find_all(&self) -> AppResult<Vec<Lesson>> {
        let cursor = self.collection.find(doc! {}).await?;
        let lessons: Vec<Lesson> = cursor.try_collect().await?;
        Ok(lessons)
    }

    async fn update(&self, lesson: Lesson) -> AppResult<Lesson> {
        let result = self
            .collection
            .replace_one(doc! { "id": &lesson.id }, &lesson)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Lesson with id '{}' not found",
                lesson.id
            )));
        }
        Ok(lesson)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}
