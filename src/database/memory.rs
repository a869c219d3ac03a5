use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::store::{
    parse_time, strip_top_level_nulls, CollectionPath, DocumentPath, DocumentStore, Filter, Query,
    StoreError,
};

type Collection = BTreeMap<String, Map<String, Value>>;

/// In-process document store for development and tests. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<BTreeMap<CollectionPath, Collection>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_fields(target: &mut Map<String, Value>, fields: Map<String, Value>) {
    for (key, value) in fields {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
}

fn matches(document: &Map<String, Value>, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { field, value } => document.get(field) == Some(value),
        Filter::AtOrAfter { field, at } => document
            .get(field)
            .and_then(parse_time)
            .map_or(false, |t| t >= *at),
        Filter::AtOrBefore { field, at } => document
            .get(field)
            .and_then(parse_time)
            .map_or(false, |t| t <= *at),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(path.parent())
            .and_then(|c| c.get(path.id()))
            .map(|doc| Value::Object(doc.clone())))
    }

    async fn set(&self, path: &DocumentPath, document: Value) -> Result<(), StoreError> {
        let document = strip_top_level_nulls(path, document)?;
        let mut collections = self.collections.write().await;
        collections
            .entry(path.parent().clone())
            .or_default()
            .insert(path.id().to_string(), document);
        Ok(())
    }

    async fn merge(&self, path: &DocumentPath, fields: Map<String, Value>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .entry(path.parent().clone())
            .or_default()
            .entry(path.id().to_string())
            .or_default();
        apply_fields(document, fields);
        Ok(())
    }

    async fn update(&self, path: &DocumentPath, fields: Map<String, Value>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(path.parent())
            .and_then(|c| c.get_mut(path.id()))
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        apply_fields(document, fields);
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(collection) = collections.get_mut(path.parent()) {
            collection.remove(path.id());
        }
        Ok(())
    }

    async fn query(&self, collection: &CollectionPath, query: &Query) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let selected = documents
            .values()
            .filter(|doc| query.filters.iter().all(|f| matches(doc, f)));

        let mut results: Vec<&Map<String, Value>> = match &query.order_by {
            Some(order) => {
                let mut keyed: Vec<_> = selected
                    .filter_map(|doc| doc.get(&order.field).and_then(parse_time).map(|t| (t, doc)))
                    .collect();
                // Stable sort: equal timestamps stay in id order, as in the Postgres store
                keyed.sort_by(|(a, _), (b, _)| {
                    let ord = a.cmp(b);
                    if order.descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                });
                keyed.into_iter().map(|(_, doc)| doc).collect()
            }
            None => selected.collect(),
        };

        if let Some(limit) = query.limit {
            results.truncate(limit);
        }

        Ok(results.into_iter().map(|doc| Value::Object(doc.clone())).collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn tasks() -> CollectionPath {
        CollectionPath::root("users")
            .doc("u1")
            .unwrap()
            .collection("pets")
            .doc("p1")
            .unwrap()
            .collection("scheduledTasks")
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn set_replaces_and_merge_preserves() {
        let store = MemoryDocumentStore::new();
        let path = tasks().doc("t1").unwrap();

        store
            .set(&path, json!({"description": "Walk", "notes": "long route"}))
            .await
            .unwrap();
        store
            .merge(&path, object(json!({"status": "COMPLETED", "notes": null})))
            .await
            .unwrap();

        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc, json!({"description": "Walk", "status": "COMPLETED"}));

        store.set(&path, json!({"description": "Feed"})).await.unwrap();
        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc, json!({"description": "Feed"}));
    }

    #[tokio::test]
    async fn update_requires_existing_document() {
        let store = MemoryDocumentStore::new();
        let path = tasks().doc("missing").unwrap();
        let err = store
            .update(&path, object(json!({"status": "PENDING"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.get(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_rejects_non_objects() {
        let store = MemoryDocumentStore::new();
        let path = tasks().doc("t1").unwrap();
        assert!(matches!(
            store.set(&path, json!([1, 2])).await,
            Err(StoreError::NotAnObject(_))
        ));
    }

    #[tokio::test]
    async fn delete_does_not_cascade() {
        let store = MemoryDocumentStore::new();
        let pet = CollectionPath::root("users")
            .doc("u1")
            .unwrap()
            .collection("pets")
            .doc("p1")
            .unwrap();
        let task = tasks().doc("t1").unwrap();

        store.set(&pet, json!({"name": "Rex"})).await.unwrap();
        store.set(&task, json!({"description": "Walk"})).await.unwrap();
        store.delete(&pet).await.unwrap();
        store.delete(&pet).await.unwrap();

        assert!(store.get(&pet).await.unwrap().is_none());
        assert!(store.get(&task).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn query_filters_orders_and_limits() {
        let store = MemoryDocumentStore::new();
        let collection = tasks();
        let at = |h: u32| Utc.with_ymd_and_hms(2025, 4, 30, h, 0, 0).unwrap();

        for (id, hour, status) in [
            ("a", 12, "PENDING"),
            ("b", 8, "PENDING"),
            ("c", 10, "COMPLETED"),
            ("d", 18, "PENDING"),
        ] {
            store
                .set(
                    &collection.doc(id).unwrap(),
                    json!({"taskID": id, "status": status, "scheduledDateTime": at(hour).to_rfc3339()}),
                )
                .await
                .unwrap();
        }
        store
            .set(&collection.doc("e").unwrap(), json!({"taskID": "e", "status": "PENDING"}))
            .await
            .unwrap();

        let query = Query::new()
            .where_eq("status", "PENDING")
            .at_or_after("scheduledDateTime", at(9))
            .order_by_time("scheduledDateTime", false)
            .limit(5);
        let ids: Vec<_> = store
            .query(&collection, &query)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["taskID"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "d"]);

        let newest_first = Query::new().order_by_time("scheduledDateTime", true).limit(2);
        let ids: Vec<_> = store
            .query(&collection, &newest_first)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["taskID"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["d", "a"]);

        let everything = store.query(&collection, &Query::new()).await.unwrap();
        assert_eq!(everything.len(), 5);
    }

    #[tokio::test]
    async fn query_on_unknown_collection_is_empty() {
        let store = MemoryDocumentStore::new();
        assert!(store.query(&tasks(), &Query::new()).await.unwrap().is_empty());
    }
}
