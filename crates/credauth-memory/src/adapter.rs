// HashMap-backed storage adapter implementing the core Adapter trait.
//
// Records live in `HashMap<String, Vec<serde_json::Value>>` keyed by model
// name, behind a `tokio::sync::RwLock`. Data is lost on drop; the adapter is
// meant for tests and demos, not production storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use credauth_core::db::adapter::{
    Adapter, AdapterResult, Connector, FindManyQuery, Operator, SortDirection, WhereClause,
};

type Store = HashMap<String, Vec<serde_json::Value>>;

/// In-memory storage adapter.
#[derive(Debug, Clone, Default)]
pub struct MemoryAdapter {
    store: Arc<RwLock<Store>>,
}

impl MemoryAdapter {
    /// Create a new empty adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored for a model.
    pub async fn model_count(&self, model: &str) -> usize {
        self.store
            .read()
            .await
            .get(model)
            .map(|records| records.len())
            .unwrap_or(0)
    }

    /// Drop all stored records.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }
}

/// Check whether a record matches a set of WHERE clauses.
fn matches_where(record: &serde_json::Value, clauses: &[WhereClause]) -> bool {
    if clauses.is_empty() {
        return true;
    }

    let mut result = true;
    let mut pending_or = false;

    for clause in clauses {
        let field_val = record
            .get(&clause.field)
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        let clause_match = match clause.operator {
            Operator::Eq => field_val == clause.value,
            Operator::Ne => field_val != clause.value,
            Operator::In => match &clause.value {
                serde_json::Value::Array(candidates) => candidates.contains(&field_val),
                _ => false,
            },
        };

        if pending_or {
            result = result || clause_match;
        } else {
            result = result && clause_match;
        }

        pending_or = matches!(clause.connector, Some(Connector::Or));
    }

    result
}

fn compare_json(a: &serde_json::Value, b: &serde_json::Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (serde_json::Value::Number(an), serde_json::Value::Number(bn)) => {
            let af = an.as_f64().unwrap_or(0.0);
            let bf = bn.as_f64().unwrap_or(0.0);
            af.partial_cmp(&bf).unwrap_or(Ordering::Equal)
        }
        (serde_json::Value::String(a_s), serde_json::Value::String(b_s)) => a_s.cmp(b_s),
        _ => Ordering::Equal,
    }
}

/// Merge update data into an existing record (shallow overwrite).
fn merge_update(record: &mut serde_json::Value, data: &serde_json::Value) {
    if let (Some(rec_obj), Some(data_obj)) = (record.as_object_mut(), data.as_object()) {
        for (k, v) in data_obj {
            rec_obj.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn create(
        &self,
        model: &str,
        data: serde_json::Value,
    ) -> AdapterResult<serde_json::Value> {
        let mut record = data;

        // Auto-generate an id if the caller didn't supply one
        let needs_id = record.get("id").map(|v| v.is_null()).unwrap_or(true);
        if needs_id {
            if let Some(obj) = record.as_object_mut() {
                obj.insert(
                    "id".to_string(),
                    serde_json::Value::String(uuid::Uuid::new_v4().to_string()),
                );
            }
        }

        let mut store = self.store.write().await;
        store
            .entry(model.to_string())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn find_one(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<Option<serde_json::Value>> {
        let store = self.store.read().await;
        Ok(store.get(model).and_then(|records| {
            records
                .iter()
                .find(|r| matches_where(r, where_clauses))
                .cloned()
        }))
    }

    async fn find_many(
        &self,
        model: &str,
        query: FindManyQuery,
    ) -> AdapterResult<Vec<serde_json::Value>> {
        let store = self.store.read().await;
        let empty = Vec::new();
        let records = store.get(model).unwrap_or(&empty);

        let mut result: Vec<serde_json::Value> = records
            .iter()
            .filter(|r| matches_where(r, &query.where_clauses))
            .cloned()
            .collect();

        if let Some(sort) = &query.sort_by {
            result.sort_by(|a, b| {
                let ord = compare_json(
                    a.get(&sort.field).unwrap_or(&serde_json::Value::Null),
                    b.get(&sort.field).unwrap_or(&serde_json::Value::Null),
                );
                match sort.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        if let Some(offset) = query.offset {
            if (offset as usize) < result.len() {
                result = result.split_off(offset as usize);
            } else {
                result.clear();
            }
        }
        if let Some(limit) = query.limit {
            result.truncate(limit as usize);
        }

        Ok(result)
    }

    async fn count(&self, model: &str, where_clauses: &[WhereClause]) -> AdapterResult<i64> {
        let store = self.store.read().await;
        let count = store
            .get(model)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches_where(r, where_clauses))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as i64)
    }

    async fn update(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
        data: serde_json::Value,
    ) -> AdapterResult<Option<serde_json::Value>> {
        let mut store = self.store.write().await;
        if let Some(records) = store.get_mut(model) {
            if let Some(record) = records.iter_mut().find(|r| matches_where(r, where_clauses)) {
                merge_update(record, &data);
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, model: &str, where_clauses: &[WhereClause]) -> AdapterResult<()> {
        let mut store = self.store.write().await;
        if let Some(records) = store.get_mut(model) {
            if let Some(pos) = records.iter().position(|r| matches_where(r, where_clauses)) {
                records.remove(pos);
            }
        }
        Ok(())
    }

    async fn delete_many(
        &self,
        model: &str,
        where_clauses: &[WhereClause],
    ) -> AdapterResult<i64> {
        let mut store = self.store.write().await;
        if let Some(records) = store.get_mut(model) {
            let before = records.len();
            records.retain(|r| !matches_where(r, where_clauses));
            Ok((before - records.len()) as i64)
        } else {
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use credauth_core::db::adapter::SortBy;

    #[tokio::test]
    async fn create_and_find_one() {
        let adapter = MemoryAdapter::new();
        adapter
            .create(
                "user",
                serde_json::json!({"id": "u1", "name": "Alice", "email": "alice@test.com"}),
            )
            .await
            .unwrap();

        let found = adapter
            .find_one("user", &[WhereClause::eq("id", "u1")])
            .await
            .unwrap();
        assert_eq!(found.unwrap()["name"], "Alice");
    }

    #[tokio::test]
    async fn create_auto_id() {
        let adapter = MemoryAdapter::new();
        let created = adapter
            .create("user", serde_json::json!({"name": "Bob"}))
            .await
            .unwrap();
        assert!(created["id"].is_string());
    }

    #[tokio::test]
    async fn find_one_compound_where() {
        let adapter = MemoryAdapter::new();
        adapter
            .create(
                "account",
                serde_json::json!({"id": "a1", "userId": "u1", "providerId": "credential"}),
            )
            .await
            .unwrap();
        adapter
            .create(
                "account",
                serde_json::json!({"id": "a2", "userId": "u1", "providerId": "ldap"}),
            )
            .await
            .unwrap();

        let found = adapter
            .find_one(
                "account",
                &[
                    WhereClause::eq("userId", "u1").and(),
                    WhereClause::eq("providerId", "ldap"),
                ],
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["id"], "a2");
    }

    #[tokio::test]
    async fn update_merges_shallow() {
        let adapter = MemoryAdapter::new();
        adapter
            .create(
                "user",
                serde_json::json!({"id": "u1", "name": "Alice", "role": "member"}),
            )
            .await
            .unwrap();

        let updated = adapter
            .update(
                "user",
                &[WhereClause::eq("id", "u1")],
                serde_json::json!({"role": "admin"}),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["role"], "admin");
        assert_eq!(updated["name"], "Alice");
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let adapter = MemoryAdapter::new();
        let updated = adapter
            .update(
                "user",
                &[WhereClause::eq("id", "missing")],
                serde_json::json!({"name": "x"}),
            )
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn find_many_sort_limit_offset() {
        let adapter = MemoryAdapter::new();
        for name in ["Charlie", "Alice", "Bob"] {
            adapter
                .create("user", serde_json::json!({"name": name}))
                .await
                .unwrap();
        }

        let query = FindManyQuery {
            sort_by: Some(SortBy {
                field: "name".into(),
                direction: SortDirection::Asc,
            }),
            offset: Some(1),
            limit: Some(1),
            ..Default::default()
        };
        let result = adapter.find_many("user", query).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["name"], "Bob");
    }

    #[tokio::test]
    async fn operator_ne_and_in() {
        let adapter = MemoryAdapter::new();
        adapter
            .create("user", serde_json::json!({"id": "u1", "role": "admin"}))
            .await
            .unwrap();
        adapter
            .create("user", serde_json::json!({"id": "u2", "role": "member"}))
            .await
            .unwrap();

        let ne = WhereClause {
            field: "role".into(),
            value: serde_json::json!("admin"),
            operator: Operator::Ne,
            connector: None,
        };
        let result = adapter
            .find_many(
                "user",
                FindManyQuery {
                    where_clauses: vec![ne],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0]["id"], "u2");

        let is_in = WhereClause {
            field: "role".into(),
            value: serde_json::json!(["admin", "member"]),
            operator: Operator::In,
            connector: None,
        };
        let count = adapter.count("user", &[is_in]).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn delete_and_delete_many() {
        let adapter = MemoryAdapter::new();
        for i in 0..3 {
            adapter
                .create("session", serde_json::json!({"id": format!("s{i}"), "userId": "u1"}))
                .await
                .unwrap();
        }

        adapter
            .delete("session", &[WhereClause::eq("id", "s0")])
            .await
            .unwrap();
        assert_eq!(adapter.model_count("session").await, 2);

        let deleted = adapter
            .delete_many("session", &[WhereClause::eq("userId", "u1")])
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(adapter.model_count("session").await, 0);
    }
}
