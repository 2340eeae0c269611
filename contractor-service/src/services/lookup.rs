use crate::services::formula::Formula;
use crate::services::record_store::{Record, RecordStore, StoreError, TableRef};

/// First row of `table` whose `field` equals `value`, if any.
///
/// Duplicate matches are not an error: the store's natural order decides and
/// only the first row is returned.
pub async fn find_first(
    store: &dyn RecordStore,
    table: &TableRef,
    field: &str,
    value: &str,
) -> Result<Option<Record>, StoreError> {
    let formula = Formula::field_equals(field, value);
    let mut matches = store.query(table, Some(&formula)).await?;

    if matches.len() > 1 {
        tracing::warn!(
            table = %table,
            field = %field,
            matches = matches.len(),
            "Multiple rows match lookup; using the first"
        );
    }

    Ok(if matches.is_empty() {
        None
    } else {
        Some(matches.swap_remove(0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock::MockRecordStore;
    use serde_json::json;

    #[tokio::test]
    async fn returns_none_without_matches() {
        let store = MockRecordStore::new();
        let table = TableRef::new("app", "tbl");
        store.seed(&table, "rec1", json!({"Email": "someone@example.com"}));

        let found = find_first(&store, &table, "Email", "nobody@example.com")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn first_match_wins_on_duplicates() {
        let store = MockRecordStore::new();
        let table = TableRef::new("app", "tbl");
        store.seed(&table, "recA", json!({"Email": "dup@example.com"}));
        store.seed(&table, "recB", json!({"Email": "dup@example.com"}));

        let found = find_first(&store, &table, "Email", "dup@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "recA");
    }
}
