use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    fn download_url(&self, key: &str) -> String;
}

/// Blob store backed by a directory on local disk. Stored objects are
/// reachable over HTTP under `<public_base>/uploads/<key>`.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    public_base: String,
}

impl LocalStorage {
    pub async fn new(root: &str, public_base: &str) -> anyhow::Result<Self> {
        let root = PathBuf::from(root);
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload dir {}", root.display()))?;
        Ok(Self {
            root,
            public_base: public_base.trim_end_matches('/').to_string(),
        })
    }

    fn object_path(&self, key: &str) -> anyhow::Result<PathBuf> {
        // Keys are server-generated flat names; anything that could climb
        // out of the upload dir is rejected.
        anyhow::ensure!(
            !key.is_empty()
                && !key.contains('/')
                && !key.contains('\\')
                && key != "."
                && key != "..",
            "invalid storage key: {key}"
        );
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        let path = self.object_path(key)?;
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write object {}", path.display()))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.object_path(key)?;
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("delete object {}", path.display()))?;
        Ok(())
    }

    fn download_url(&self, key: &str) -> String {
        format!("{}/uploads/{}", self.public_base, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn temp_storage() -> LocalStorage {
        let dir = std::env::temp_dir().join(format!("audionotes-storage-{}", Uuid::new_v4()));
        LocalStorage::new(dir.to_str().unwrap(), "http://localhost:8080/")
            .await
            .expect("create storage")
    }

    #[tokio::test]
    async fn put_then_read_back_and_delete() {
        let storage = temp_storage().await;
        let key = "abc123_test.mp3";
        storage
            .put_object(key, Bytes::from_static(b"audio-bytes"), "audio/mpeg")
            .await
            .expect("put");

        let on_disk = tokio::fs::read(storage.root.join(key)).await.expect("read");
        assert_eq!(on_disk, b"audio-bytes");

        storage.delete_object(key).await.expect("delete");
        assert!(tokio::fs::metadata(storage.root.join(key)).await.is_err());
    }

    #[tokio::test]
    async fn rejects_traversal_keys() {
        let storage = temp_storage().await;
        let err = storage
            .put_object("../escape", Bytes::from_static(b"x"), "audio/mpeg")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid storage key"));
    }

    #[tokio::test]
    async fn download_url_has_no_double_slash() {
        let storage = temp_storage().await;
        let url = storage.download_url("k_file.wav");
        assert_eq!(url, "http://localhost:8080/uploads/k_file.wav");
    }
}
