use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;

use super::store::{CollectionPath, DocumentPath, DocumentStore, Query, StoreError};

/// Typed access to documents of one entity type
pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _phantom: PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    pub async fn get(&self, path: &DocumentPath) -> Result<Option<T>, StoreError> {
        match self.store.get(path).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn select_404(&self, path: &DocumentPath) -> Result<T, StoreError> {
        self.get(path)
            .await?
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    pub async fn exists(&self, path: &DocumentPath) -> Result<bool, StoreError> {
        Ok(self.store.get(path).await?.is_some())
    }

    /// Replace the document with `entity`.
    pub async fn set(&self, path: &DocumentPath, entity: &T) -> Result<(), StoreError> {
        self.store.set(path, serde_json::to_value(entity)?).await
    }

    /// Write the fields `entity` carries, leaving the rest of the stored document alone.
    pub async fn merge(&self, path: &DocumentPath, entity: &T) -> Result<(), StoreError> {
        let fields = to_fields(path, entity)?;
        self.store.merge(path, fields).await
    }

    /// Write individual fields of an existing document. `null` removes a field.
    pub async fn update_fields(&self, path: &DocumentPath, fields: Map<String, Value>) -> Result<(), StoreError> {
        self.store.update(path, fields).await
    }

    pub async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        self.store.delete(path).await
    }

    pub async fn select_any(&self, collection: &CollectionPath, query: &Query) -> Result<Vec<T>, StoreError> {
        self.store
            .query(collection, query)
            .await?
            .into_iter()
            .map(|value| serde_json::from_value(value).map_err(StoreError::from))
            .collect()
    }

    pub async fn select_one(&self, collection: &CollectionPath, query: &Query) -> Result<Option<T>, StoreError> {
        let query = query.clone().limit(1);
        Ok(self.select_any(collection, &query).await?.into_iter().next())
    }
}

/// Serialized top-level fields, without nulls so unset options are not written.
pub(crate) fn to_fields<T: Serialize>(path: &DocumentPath, entity: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        _ => Err(StoreError::NotAnObject(path.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryDocumentStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<String>,
        #[serde(default)]
        pinned: Option<bool>,
    }

    fn notes() -> CollectionPath {
        CollectionPath::root("notes")
    }

    #[tokio::test]
    async fn select_404_reports_missing_path() {
        let repo: Repository<Note> = Repository::new(Arc::new(MemoryDocumentStore::new()));
        let path = notes().doc("n1").unwrap();
        match repo.select_404(&path).await {
            Err(StoreError::NotFound(p)) => assert_eq!(p, "notes/n1"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn merge_keeps_fields_the_entity_leaves_unset() {
        let repo: Repository<Note> = Repository::new(Arc::new(MemoryDocumentStore::new()));
        let path = notes().doc("n1").unwrap();

        repo.set(
            &path,
            &Note {
                title: "Vet".into(),
                body: Some("Bring records".into()),
                pinned: Some(true),
            },
        )
        .await
        .unwrap();
        repo.merge(
            &path,
            &Note {
                title: "Vet visit".into(),
                body: None,
                pinned: None,
            },
        )
        .await
        .unwrap();

        let stored = repo.select_404(&path).await.unwrap();
        assert_eq!(stored.title, "Vet visit");
        assert_eq!(stored.body.as_deref(), Some("Bring records"));
        assert_eq!(stored.pinned, Some(true));
    }

    #[tokio::test]
    async fn select_one_returns_first_match() {
        let repo: Repository<Note> = Repository::new(Arc::new(MemoryDocumentStore::new()));
        for (id, title) in [("a", "Walk"), ("b", "Feed"), ("c", "Walk")] {
            repo.set(
                &notes().doc(id).unwrap(),
                &Note {
                    title: title.into(),
                    body: None,
                    pinned: None,
                },
            )
            .await
            .unwrap();
        }

        let found = repo
            .select_one(&notes(), &Query::new().where_eq("title", "Walk"))
            .await
            .unwrap();
        assert!(found.is_some());
        let missing = repo
            .select_one(&notes(), &Query::new().where_eq("title", "Groom"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
