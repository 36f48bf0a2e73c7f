use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::MediaFile};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn create(&self, file: MediaFile) -> AppResult<MediaFile>;
    async fn find_by_filename(&self, filename: &str) -> AppResult<Option<MediaFile>>;
    /// Newest first.
    async fn find_all(&self) -> AppResult<Vec<MediaFile>>;
    async fn delete_by_filename(&self, filename: &str) -> AppResult<bool>;
    async fn count(&self) -> AppResult<u64>;
}

pub struct MongoMediaRepository {
    collection: Collection<MediaFile>,
}

impl MongoMediaRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("media_files");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for media_files collection");

        let filename_index = IndexModel::builder()
            .keys(doc! { "filename": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("filename_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(filename_index).await?;

        log::info!("Successfully created indexes for media_files collection");
        Ok(())
    }
}

#[async_trait]
impl MediaRepository for MongoMediaRepository {
    async fn create(&self, file: MediaFile) -> AppResult<MediaFile> {
        self.collection.insert_one(&file).await?;
        Ok(file)
    }

    async fn find_by_filename(&self, filename: &str) -> AppResult<Option<MediaFile>> {
        let file = self
            .collection
            .find_one(doc! { "filename": filename })
            .await?;
        Ok(file)
    }

    async fn find_all(&self) -> AppResult<Vec<MediaFile>> {
        let files = self
            .collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(files)
    }

    async fn delete_by_filename(&self, filename: &str) -> AppResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "filename": filename })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}
