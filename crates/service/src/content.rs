use std::marker::PhantomData;
use std::sync::Arc;

use models::{Record, SalonInfo, SALON_KEY};

use crate::docstore::DocumentStore;
use crate::errors::ServiceError;

/// Record-level CRUD over one array document.
///
/// Every mutation goes through `DocumentStore::update`, so concurrent admin
/// edits to the same collection serialize on the storage version token and
/// no insert is lost. Id uniqueness is enforced inside the update closure,
/// i.e. against the exact document state the write commits on.
pub struct Collection<R: Record> {
    docs: Arc<DocumentStore>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Collection<R> {
    pub fn new(docs: Arc<DocumentStore>) -> Self {
        Self { docs, _record: PhantomData }
    }

    pub async fn list(&self) -> Result<Vec<R>, ServiceError> {
        self.docs.get(R::KEY).await
    }

    pub async fn find(&self, id: &str) -> Result<R, ServiceError> {
        let items = self.list().await?;
        items
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| ServiceError::not_found(&format!("record {id} in {}", R::KEY)))
    }

    /// Append a record, rejecting a duplicate id against the committed state.
    pub async fn insert(&self, record: R) -> Result<R, ServiceError> {
        let mut duplicate = false;
        let candidate = record.clone();
        self.docs
            .update::<Vec<R>, _>(R::KEY, |mut items| {
                duplicate = items.iter().any(|r| r.id() == candidate.id());
                if !duplicate {
                    items.push(candidate.clone());
                }
                items
            })
            .await?;
        if duplicate {
            return Err(ServiceError::Validation(format!(
                "duplicate record id {} in {}",
                record.id(),
                R::KEY
            )));
        }
        Ok(record)
    }

    /// Apply `f` to the record with the given id and return the updated copy.
    pub async fn modify<F>(&self, id: &str, mut f: F) -> Result<R, ServiceError>
    where
        F: FnMut(&mut R) + Send,
    {
        let mut found = false;
        let doc = self
            .docs
            .update::<Vec<R>, _>(R::KEY, |mut items| {
                found = false;
                if let Some(item) = items.iter_mut().find(|r| r.id() == id) {
                    f(item);
                    found = true;
                }
                items
            })
            .await?;
        if !found {
            return Err(ServiceError::not_found(&format!("record {id} in {}", R::KEY)));
        }
        doc.into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| ServiceError::not_found(&format!("record {id} in {}", R::KEY)))
    }

    pub async fn remove(&self, id: &str) -> Result<(), ServiceError> {
        let mut removed = false;
        self.docs
            .update::<Vec<R>, _>(R::KEY, |mut items| {
                let before = items.len();
                items.retain(|r| r.id() != id);
                removed = items.len() != before;
                items
            })
            .await?;
        if !removed {
            return Err(ServiceError::not_found(&format!("record {id} in {}", R::KEY)));
        }
        Ok(())
    }
}

/// The single-object salon profile document.
pub struct SalonDocument {
    docs: Arc<DocumentStore>,
}

impl SalonDocument {
    pub fn new(docs: Arc<DocumentStore>) -> Self {
        Self { docs }
    }

    pub async fn get(&self) -> Result<SalonInfo, ServiceError> {
        self.docs.get(SALON_KEY).await
    }

    /// Replace the profile wholesale. Routed through `update` so the write
    /// still lands on a known predecessor version.
    pub async fn replace(&self, info: SalonInfo) -> Result<SalonInfo, ServiceError> {
        self.docs
            .update::<SalonInfo, _>(SALON_KEY, move |_| info.clone())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstore::DocumentStoreConfig;
    use crate::storage::MemoryObjectStore;
    use models::{Stylist, StylistInput, StylistPatch};

    async fn seeded() -> Arc<DocumentStore> {
        let docs = DocumentStore::new(
            Arc::new(MemoryObjectStore::new()),
            DocumentStoreConfig {
                backoff_base: std::time::Duration::from_millis(1),
                backoff_max: std::time::Duration::from_millis(4),
                ..Default::default()
            },
        );
        docs.seed_if_absent(Stylist::KEY, &Vec::<Stylist>::new())
            .await
            .expect("seed");
        docs
    }

    fn input(name: &str) -> StylistInput {
        StylistInput {
            name: name.into(),
            role: "Stylist".into(),
            bio: String::new(),
            image_url: None,
            sort_order: 0,
        }
    }

    #[tokio::test]
    async fn insert_find_modify_remove() -> Result<(), anyhow::Error> {
        let stylists = Collection::<Stylist>::new(seeded().await);

        let created = stylists.insert(input("Aiko").into_record()).await?;
        assert_eq!(stylists.list().await?.len(), 1);

        let found = stylists.find(&created.id).await?;
        assert_eq!(found.name, "Aiko");

        let patch = StylistPatch { role: Some("Director".into()), ..Default::default() };
        let updated = stylists.modify(&created.id, |s| patch.apply(s)).await?;
        assert_eq!(updated.role, "Director");

        stylists.remove(&created.id).await?;
        assert!(stylists.list().await?.is_empty());
        assert!(matches!(
            stylists.find(&created.id).await,
            Err(ServiceError::NotFound(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() -> Result<(), anyhow::Error> {
        let stylists = Collection::<Stylist>::new(seeded().await);
        let rec = input("Aiko").into_record();
        stylists.insert(rec.clone()).await?;
        assert!(matches!(
            stylists.insert(rec).await,
            Err(ServiceError::Validation(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn modify_missing_record_is_not_found() -> Result<(), anyhow::Error> {
        let stylists = Collection::<Stylist>::new(seeded().await);
        let err = stylists.modify("missing", |_| {}).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = stylists.remove("missing").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn simultaneous_inserts_both_survive() -> Result<(), anyhow::Error> {
        let docs = seeded().await;
        let a = Collection::<Stylist>::new(docs.clone());
        let b = Collection::<Stylist>::new(docs.clone());

        let rec_a = input("A").into_record();
        let rec_b = input("B").into_record();
        let (ra, rb) = tokio::join!(a.insert(rec_a), b.insert(rec_b));
        ra?;
        rb?;

        docs.invalidate(Stylist::KEY);
        let all = a.list().await?;
        assert_eq!(all.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn salon_document_replace_round_trips() -> Result<(), anyhow::Error> {
        let docs = seeded().await;
        docs.seed_if_absent(SALON_KEY, &SalonInfo::default()).await?;
        let salon = SalonDocument::new(docs);

        let mut info = salon.get().await?;
        info.name = "Atelier K".into();
        let saved = salon.replace(info.clone()).await?;
        assert_eq!(saved, info);
        assert_eq!(salon.get().await?.name, "Atelier K");
        Ok(())
    }
}
