use std::sync::RwLock;

use super::{Filter, Record, Repository, RepositoryError, UpdateResult};

/// In-memory collection for tests/dev. Keeps insertion order.
#[derive(Debug)]
pub struct InMemoryRepository<R> {
    inner: RwLock<Vec<R>>,
}

impl<R> InMemoryRepository<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }
}

impl<R> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("in-memory repository lock poisoned".to_string())
}

fn matches<R: Record>(filter: &Filter, record: &R) -> Result<bool, RepositoryError> {
    let doc = serde_json::to_value(record)?;
    Ok(filter.matches(&doc))
}

impl<R: Record> InMemoryRepository<R> {
    fn update(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
        limit: Option<usize>,
    ) -> Result<UpdateResult, RepositoryError> {
        let mut records = self.inner.write().map_err(|_| poisoned())?;
        let mut result = UpdateResult::default();

        for record in records.iter_mut() {
            if limit.is_some_and(|l| result.matched as usize >= l) {
                break;
            }
            if !matches(filter, record)? {
                continue;
            }
            result.matched += 1;

            let mut updated = record.clone();
            mutation(&mut updated);
            if updated != *record {
                *record = updated;
                result.modified += 1;
            }
        }
        Ok(result)
    }
}

#[async_trait::async_trait]
impl<R: Record> Repository<R> for InMemoryRepository<R> {
    async fn find_one(&self, filter: &Filter) -> Result<Option<R>, RepositoryError> {
        let records = self.inner.read().map_err(|_| poisoned())?;
        for record in records.iter() {
            if matches(filter, record)? {
                return Ok(Some(record.clone()));
            }
        }
        Ok(None)
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<R>, RepositoryError> {
        let records = self.inner.read().map_err(|_| poisoned())?;
        let mut out = Vec::new();
        for record in records.iter() {
            if matches(filter, record)? {
                out.push(record.clone());
            }
        }
        Ok(out)
    }

    async fn update_one(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
    ) -> Result<UpdateResult, RepositoryError> {
        self.update(filter, mutation, Some(1))
    }

    async fn update_many(
        &self,
        filter: &Filter,
        mutation: &(dyn for<'m> Fn(&'m mut R) + Send + Sync),
    ) -> Result<UpdateResult, RepositoryError> {
        self.update(filter, mutation, None)
    }

    async fn insert_one(&self, record: R) -> Result<R, RepositoryError> {
        let mut records = self.inner.write().map_err(|_| poisoned())?;
        let key = record.key();
        if records.iter().any(|r| r.key() == key) {
            return Err(RepositoryError::Duplicate(format!(
                "{} {key} already exists",
                R::COLLECTION
            )));
        }
        records.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use storefront_core::StoreId;
    use storefront_promotions::{Coupon, CreateCoupon};

    fn coupon(store: StoreId, name: &str) -> Coupon {
        Coupon::issue(
            store,
            CreateCoupon {
                name: name.to_string(),
                expiration: Utc::now() + Duration::days(1),
                value: Decimal::from(10),
                percentage: true,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_then_find_by_field() {
        let repo = InMemoryRepository::new();
        let store = StoreId::new();
        repo.insert_one(coupon(store, "SPRING-10")).await.unwrap();
        repo.insert_one(coupon(StoreId::new(), "OTHER-10")).await.unwrap();

        let found = repo
            .find(&Filter::live().eq_id("store_id", store))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "SPRING-10");
    }

    #[tokio::test]
    async fn duplicate_key_is_rejected() {
        let repo = InMemoryRepository::new();
        let c = coupon(StoreId::new(), "SPRING-10");
        repo.insert_one(c.clone()).await.unwrap();
        assert!(matches!(
            repo.insert_one(c).await,
            Err(RepositoryError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn modified_counts_only_real_changes() {
        let repo = InMemoryRepository::new();
        let store = StoreId::new();
        repo.insert_one(coupon(store, "AAA-10")).await.unwrap();
        let mut off = coupon(store, "BBB-10");
        off.lifecycle.enabled = false;
        repo.insert_one(off).await.unwrap();

        let result = repo
            .update_many(&Filter::new().eq_id("store_id", store), &|c: &mut Coupon| {
                c.lifecycle.enabled = false
            })
            .await
            .unwrap();
        assert_eq!(result, UpdateResult { matched: 2, modified: 1 });
    }

    #[tokio::test]
    async fn update_one_stops_after_first_match() {
        let repo = InMemoryRepository::new();
        let store = StoreId::new();
        repo.insert_one(coupon(store, "AAA-10")).await.unwrap();
        repo.insert_one(coupon(store, "BBB-10")).await.unwrap();

        let result = repo
            .update_one(&Filter::new().eq_id("store_id", store), &|c: &mut Coupon| {
                c.lifecycle.active = false
            })
            .await
            .unwrap();
        assert_eq!(result, UpdateResult { matched: 1, modified: 1 });
        assert_eq!(repo.find(&Filter::active()).await.unwrap().len(), 1);
    }
}
