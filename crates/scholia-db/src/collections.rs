//! Collection operations: the document-collection algebra.
//!
//! A collection is a named, mutable set of papers. Names are unique
//! among currently active collections; overwriting parks the old
//! collection under a temporary name until the replacement is built, so
//! a failure never leaves the name unbound.

use rusqlite::{params, Connection, OptionalExtension};
use scholia_common::PaperKey;

use crate::error::{DbError, Result};
use crate::schema::ALL_PAPERS_COLLECTION;
use crate::store::MetadataStore;

fn collection_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT collection_id FROM collections WHERE name = ?1",
            [name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

fn rename_by_id(conn: &Connection, collection_id: i64, new_name: &str) -> Result<()> {
    conn.execute(
        "UPDATE collections SET name = ?1 WHERE collection_id = ?2",
        params![new_name, collection_id],
    )?;
    Ok(())
}

fn delete_by_id(conn: &Connection, collection_id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM paper_collection WHERE collection_id = ?1",
        [collection_id],
    )?;
    conn.execute(
        "DELETE FROM collections WHERE collection_id = ?1",
        [collection_id],
    )?;
    Ok(())
}

impl MetadataStore {
    pub fn get_collection_id(&self, name: &str) -> Result<Option<i64>> {
        collection_id_by_name(&self.conn, name)
    }

    pub fn get_collection_name(&self, collection_id: i64) -> Result<Option<String>> {
        let name = self
            .conn
            .query_row(
                "SELECT name FROM collections WHERE collection_id = ?1",
                [collection_id],
                |r| r.get(0),
            )
            .optional()?;
        Ok(name)
    }

    pub fn list_collections(&self) -> Result<Vec<(i64, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT collection_id, name FROM collections ORDER BY collection_id")?;
        let rows = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn missing_paper_ids(&self, paper_ids: &[String]) -> Result<Vec<String>> {
        let mut missing = Vec::new();
        for id in paper_ids {
            let found: Option<String> = self
                .conn
                .query_row(
                    "SELECT paper_id FROM papers WHERE paper_id = ?1",
                    [id],
                    |r| r.get(0),
                )
                .optional()?;
            if found.is_none() {
                missing.push(id.clone());
            }
        }
        Ok(missing)
    }

    /// Insert a collection row and its membership in one transaction, so
    /// a mid-build failure leaves no partially built collection.
    fn create_collection_core(&mut self, name: &str, paper_ids: &[String]) -> Result<i64> {
        let tx = self.conn.transaction()?;
        tx.execute("INSERT INTO collections (name) VALUES (?1)", [name])?;
        let collection_id = tx.last_insert_rowid();
        for paper_id in paper_ids {
            tx.execute(
                "INSERT OR IGNORE INTO paper_collection (paper_id, collection_id) VALUES (?1, ?2)",
                params![paper_id, collection_id],
            )?;
        }
        tx.commit()?;
        Ok(collection_id)
    }

    /// Create a named collection from paper IDs.
    ///
    /// All referenced papers are verified to exist before any row is
    /// written. A taken name fails with [`DbError::CollectionExists`]
    /// unless `overwrite` is set, in which case the old collection is
    /// parked under a temporary name, the replacement is built, and only
    /// then is the old one deleted; a build failure renames it back.
    pub fn create_collection(
        &mut self,
        name: &str,
        paper_ids: &[String],
        overwrite: bool,
    ) -> Result<i64> {
        tracing::debug!(name, papers = paper_ids.len(), overwrite, "creating collection");

        let missing = self.missing_paper_ids(paper_ids)?;
        if !missing.is_empty() {
            tracing::error!(name, ?missing, "cannot create collection, papers not found");
            return Err(DbError::PaperNotFound(missing.join(", ")));
        }

        let existing = collection_id_by_name(&self.conn, name)?;
        if let Some(existing_id) = existing {
            if !overwrite {
                return Err(DbError::CollectionExists(name.to_string()));
            }
            let tmp_name = format!("{name}_tmp");
            rename_by_id(&self.conn, existing_id, &tmp_name)?;
            match self.create_collection_core(name, paper_ids) {
                Ok(new_id) => {
                    delete_by_id(&self.conn, existing_id)?;
                    tracing::info!(name, collection_id = new_id, "collection overwritten");
                    Ok(new_id)
                }
                Err(e) => {
                    // Bind the name back to the previous collection.
                    rename_by_id(&self.conn, existing_id, name)?;
                    Err(e)
                }
            }
        } else {
            let id = self.create_collection_core(name, paper_ids)?;
            tracing::info!(name, collection_id = id, "collection created");
            Ok(id)
        }
    }

    /// Union of the member papers of at least two collections.
    pub fn merge_collections(
        &mut self,
        collection_ids: &[i64],
        new_name: &str,
        overwrite: bool,
    ) -> Result<i64> {
        if collection_ids.len() < 2 {
            return Err(DbError::MergeRequiresTwo { found: collection_ids.len() });
        }
        let mut resolvable = 0usize;
        let mut union: Vec<String> = Vec::new();
        for id in collection_ids {
            if self.get_collection_name(*id)?.is_none() {
                tracing::warn!(collection_id = id, "merge source not found, skipping");
                continue;
            }
            resolvable += 1;
            for paper_id in self.paper_ids_in_collection(*id)? {
                if !union.contains(&paper_id) {
                    union.push(paper_id);
                }
            }
        }
        if resolvable < 2 {
            return Err(DbError::MergeRequiresTwo { found: resolvable });
        }
        self.create_collection(new_name, &union, overwrite)
    }

    /// Copy of the membership only, under a new name. Papers are shared,
    /// not deep-copied.
    pub fn duplicate_collection(&mut self, collection_id: i64, new_name: &str) -> Result<i64> {
        if self.get_collection_name(collection_id)?.is_none() {
            return Err(DbError::CollectionNotFound(format!("ID '{collection_id}'")));
        }
        let paper_ids = self.paper_ids_in_collection(collection_id)?;
        self.create_collection(new_name, &paper_ids, false)
    }

    pub fn rename_collection(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let Some(id) = collection_id_by_name(&self.conn, old_name)? else {
            return Err(DbError::CollectionNotFound(format!("name '{old_name}'")));
        };
        if collection_id_by_name(&self.conn, new_name)?.is_some() {
            return Err(DbError::CollectionExists(new_name.to_string()));
        }
        rename_by_id(&self.conn, id, new_name)?;
        tracing::info!(old_name, new_name, "collection renamed");
        Ok(())
    }

    /// Remove the collection row and its membership. Papers are never
    /// cascade-deleted.
    pub fn delete_collection(&mut self, name: &str) -> Result<()> {
        let Some(id) = collection_id_by_name(&self.conn, name)? else {
            return Err(DbError::CollectionNotFound(format!("name '{name}'")));
        };
        delete_by_id(&self.conn, id)?;
        tracing::info!(name, "collection deleted");
        Ok(())
    }

    pub fn delete_collection_by_id(&mut self, collection_id: i64) -> Result<()> {
        if self.get_collection_name(collection_id)?.is_none() {
            return Err(DbError::CollectionNotFound(format!("ID '{collection_id}'")));
        }
        delete_by_id(&self.conn, collection_id)?;
        Ok(())
    }

    pub fn add_paper_to_collection(&mut self, key: &PaperKey, collection_id: i64) -> Result<()> {
        if !self.paper_exists(key)? {
            return Err(DbError::PaperNotFound(key.to_string()));
        }
        if self.get_collection_name(collection_id)?.is_none() {
            return Err(DbError::CollectionNotFound(format!("ID '{collection_id}'")));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO paper_collection (paper_id, collection_id) VALUES (?1, ?2)",
            params![key.to_string(), collection_id],
        )?;
        Ok(())
    }

    /// Remove papers from a collection's membership. Papers not in the
    /// collection are skipped with a warning; papers absent from the
    /// store are an error.
    pub fn remove_papers_from_collection(
        &mut self,
        keys: &[PaperKey],
        collection_name: &str,
    ) -> Result<()> {
        let Some(collection_id) = collection_id_by_name(&self.conn, collection_name)? else {
            return Err(DbError::CollectionNotFound(format!("name '{collection_name}'")));
        };
        for key in keys {
            if !self.paper_exists(key)? {
                return Err(DbError::PaperNotFound(key.to_string()));
            }
            let removed = self.conn.execute(
                "DELETE FROM paper_collection WHERE paper_id = ?1 AND collection_id = ?2",
                params![key.to_string(), collection_id],
            )?;
            if removed == 0 {
                tracing::warn!(paper_id = %key, collection_name, "paper not in collection");
            }
        }
        Ok(())
    }

    pub fn paper_ids_in_collection(&self, collection_id: i64) -> Result<Vec<String>> {
        if self.get_collection_name(collection_id)?.is_none() {
            return Err(DbError::CollectionNotFound(format!("ID '{collection_id}'")));
        }
        let mut stmt = self.conn.prepare(
            "SELECT paper_id FROM paper_collection WHERE collection_id = ?1 ORDER BY paper_id",
        )?;
        let ids = stmt
            .query_map([collection_id], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    pub fn file_paths_in_collection(&self, collection_id: i64) -> Result<Vec<String>> {
        let paper_ids = self.paper_ids_in_collection(collection_id)?;
        let mut paths = Vec::new();
        for id in paper_ids {
            let path: Option<String> = self
                .conn
                .query_row(
                    "SELECT file_path FROM papers WHERE paper_id = ?1",
                    [&id],
                    |r| r.get(0),
                )
                .optional()?
                .flatten();
            if let Some(p) = path {
                paths.push(p);
            }
        }
        Ok(paths)
    }

    /// The distinguished collection containing every paper. Lazily
    /// created on first access; membership is re-synced on each access
    /// so papers ingested since the last call are included.
    pub fn all_papers_collection(&mut self) -> Result<i64> {
        let id = match collection_id_by_name(&self.conn, ALL_PAPERS_COLLECTION)? {
            Some(id) => id,
            None => {
                tracing::debug!("'all papers' collection not found, creating it");
                let ids = self.all_paper_ids()?;
                self.create_collection(ALL_PAPERS_COLLECTION, &ids, false)?
            }
        };
        self.conn.execute(
            "INSERT OR IGNORE INTO paper_collection (paper_id, collection_id)
             SELECT paper_id, ?1 FROM papers",
            [id],
        )?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::papers::PaperMetadata;
    use chrono::NaiveDate;

    fn paper(key: &str, title: &str) -> PaperMetadata {
        PaperMetadata {
            key: key.parse().unwrap(),
            title: title.to_string(),
            authors: vec!["Ada Lovelace".to_string()],
            journal: "Nature".to_string(),
            publication_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            url: None,
            file_path: Some(format!("/papers/{title}.pdf")),
        }
    }

    fn store_with_papers(keys: &[&str]) -> MetadataStore {
        let mut store = MetadataStore::open_in_memory().unwrap();
        for (i, key) in keys.iter().enumerate() {
            store.add_paper(&paper(key, &format!("paper {i}"))).unwrap();
        }
        store
    }

    #[test]
    fn test_create_fails_on_taken_name_without_overwrite() {
        let mut store = store_with_papers(&["doi:10.1/a", "doi:10.1/b"]);
        store
            .create_collection("mine", &["doi:10.1/a".to_string()], false)
            .unwrap();
        let err = store
            .create_collection("mine", &["doi:10.1/b".to_string()], false)
            .unwrap_err();
        assert!(matches!(err, DbError::CollectionExists(_)));
    }

    #[test]
    fn test_overwrite_replaces_membership_and_old_id() {
        let mut store = store_with_papers(&["doi:10.1/a", "doi:10.1/b"]);
        let old_id = store
            .create_collection("mine", &["doi:10.1/a".to_string()], false)
            .unwrap();
        let new_id = store
            .create_collection("mine", &["doi:10.1/b".to_string()], true)
            .unwrap();

        assert_ne!(old_id, new_id);
        assert_eq!(store.get_collection_id("mine").unwrap(), Some(new_id));
        assert_eq!(
            store.paper_ids_in_collection(new_id).unwrap(),
            vec!["doi:10.1/b".to_string()]
        );
        // Old collection no longer resolves, not even under the temp name.
        assert!(store.get_collection_name(old_id).unwrap().is_none());
        assert!(store.get_collection_id("mine_tmp").unwrap().is_none());
    }

    #[test]
    fn test_failed_overwrite_restores_original_name() {
        let mut store = store_with_papers(&["doi:10.1/a"]);
        let old_id = store
            .create_collection("mine", &["doi:10.1/a".to_string()], false)
            .unwrap();

        // Missing paper makes the rebuild fail before any row is written.
        let err = store
            .create_collection("mine", &["doi:10.1/missing".to_string()], true)
            .unwrap_err();
        assert!(matches!(err, DbError::PaperNotFound(_)));
        assert_eq!(store.get_collection_id("mine").unwrap(), Some(old_id));
    }

    #[test]
    fn test_create_verifies_papers_before_creating_row() {
        let mut store = store_with_papers(&["doi:10.1/a"]);
        let err = store
            .create_collection(
                "mine",
                &["doi:10.1/a".to_string(), "doi:10.1/nope".to_string()],
                false,
            )
            .unwrap_err();
        assert!(matches!(err, DbError::PaperNotFound(_)));
        assert!(store.get_collection_id("mine").unwrap().is_none());
    }

    #[test]
    fn test_merge_unions_overlapping_papers() {
        let mut store = store_with_papers(&["doi:10.1/a", "doi:10.1/b", "doi:10.1/c"]);
        let c1 = store
            .create_collection("one", &["doi:10.1/a".to_string(), "doi:10.1/b".to_string()], false)
            .unwrap();
        let c2 = store
            .create_collection("two", &["doi:10.1/b".to_string(), "doi:10.1/c".to_string()], false)
            .unwrap();

        let merged = store.merge_collections(&[c1, c2], "both", false).unwrap();
        let mut ids = store.paper_ids_in_collection(merged).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["doi:10.1/a", "doi:10.1/b", "doi:10.1/c"]);
    }

    #[test]
    fn test_merge_requires_two_resolvable_collections() {
        let mut store = store_with_papers(&["doi:10.1/a"]);
        let c1 = store
            .create_collection("one", &["doi:10.1/a".to_string()], false)
            .unwrap();

        let err = store.merge_collections(&[c1], "merged", false).unwrap_err();
        assert!(matches!(err, DbError::MergeRequiresTwo { found: 1 }));

        // A dangling ID does not count as resolvable.
        let err = store.merge_collections(&[c1, 99], "merged", false).unwrap_err();
        assert!(matches!(err, DbError::MergeRequiresTwo { found: 1 }));
    }

    #[test]
    fn test_duplicate_copies_membership_only() {
        let mut store = store_with_papers(&["doi:10.1/a", "doi:10.1/b"]);
        let src = store
            .create_collection("src", &["doi:10.1/a".to_string(), "doi:10.1/b".to_string()], false)
            .unwrap();
        let copy = store.duplicate_collection(src, "copy").unwrap();

        assert_eq!(
            store.paper_ids_in_collection(copy).unwrap(),
            store.paper_ids_in_collection(src).unwrap()
        );
        assert_eq!(store.paper_count().unwrap(), 2);

        let err = store.duplicate_collection(src, "copy").unwrap_err();
        assert!(matches!(err, DbError::CollectionExists(_)));
    }

    #[test]
    fn test_rename_checks_both_names() {
        let mut store = store_with_papers(&["doi:10.1/a"]);
        store
            .create_collection("one", &["doi:10.1/a".to_string()], false)
            .unwrap();
        store
            .create_collection("two", &["doi:10.1/a".to_string()], false)
            .unwrap();

        assert!(matches!(
            store.rename_collection("missing", "x").unwrap_err(),
            DbError::CollectionNotFound(_)
        ));
        assert!(matches!(
            store.rename_collection("one", "two").unwrap_err(),
            DbError::CollectionExists(_)
        ));
        store.rename_collection("one", "renamed").unwrap();
        assert!(store.get_collection_id("renamed").unwrap().is_some());
    }

    #[test]
    fn test_delete_keeps_papers() {
        let mut store = store_with_papers(&["doi:10.1/a"]);
        store
            .create_collection("one", &["doi:10.1/a".to_string()], false)
            .unwrap();
        store.delete_collection("one").unwrap();
        assert!(store.get_collection_id("one").unwrap().is_none());
        assert_eq!(store.paper_count().unwrap(), 1);
    }

    #[test]
    fn test_all_papers_collection_lazy_and_synced() {
        let mut store = store_with_papers(&["doi:10.1/a"]);
        let id = store.all_papers_collection().unwrap();
        assert_eq!(
            store.paper_ids_in_collection(id).unwrap(),
            vec!["doi:10.1/a".to_string()]
        );

        // Papers added afterwards appear on next access.
        store.add_paper(&paper("doi:10.1/b", "late")).unwrap();
        let same_id = store.all_papers_collection().unwrap();
        assert_eq!(same_id, id);
        assert_eq!(store.paper_ids_in_collection(id).unwrap().len(), 2);
    }

    #[test]
    fn test_membership_add_and_remove() {
        let mut store = store_with_papers(&["doi:10.1/a", "doi:10.1/b"]);
        let id = store
            .create_collection("one", &["doi:10.1/a".to_string()], false)
            .unwrap();

        let key: PaperKey = "doi:10.1/b".parse().unwrap();
        store.add_paper_to_collection(&key, id).unwrap();
        assert_eq!(store.paper_ids_in_collection(id).unwrap().len(), 2);

        store.remove_papers_from_collection(&[key], "one").unwrap();
        assert_eq!(
            store.paper_ids_in_collection(id).unwrap(),
            vec!["doi:10.1/a".to_string()]
        );
    }
}
