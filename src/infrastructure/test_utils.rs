/// Test utilities for DuckDB-based tests
///
/// Every [`test_harness::TestStorage`] owns a fresh database file inside its own
/// temporary directory, so tests never see each other's rows.
///
/// ```rust,ignore
/// let test_storage = TestStorage::new();
/// let property = test_storage.create_sample_property()?;
/// ```
#[cfg(test)]
pub mod test_harness {
    use crate::domain::{NewProperty, PropertyListing};
    use crate::infrastructure::{BookingRepository, DuckDbStorage, HookRegistry};
    use anyhow::Result;
    use rust_decimal::Decimal;
    use std::path::PathBuf;
    use tempfile::TempDir;

    pub struct TestStorage {
        pub storage: DuckDbStorage,
        _temp_dir: TempDir, // Keep temp dir alive
    }

    impl TestStorage {
        pub fn new() -> Self {
            Self::with_hooks(HookRegistry::new())
        }

        pub fn with_hooks(hooks: HookRegistry) -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp directory");
            let db_path = temp_dir.path().join("test.db");

            let storage = DuckDbStorage::with_hooks(&db_path, hooks)
                .expect("Failed to initialize test DuckDB storage");

            Self {
                storage,
                _temp_dir: temp_dir,
            }
        }

        pub fn storage(&self) -> &DuckDbStorage {
            &self.storage
        }

        pub fn dir(&self) -> PathBuf {
            self._temp_dir.path().to_path_buf()
        }

        /// A property priced at 100 per night
        pub fn create_sample_property(&self) -> Result<PropertyListing> {
            self.storage
                .add_property(NewProperty::new("Sample Cabin", Decimal::ONE_HUNDRED))
        }
    }

    /// Run a test with fresh test storage
    pub fn with_test_storage<F, R>(test_fn: F) -> R
    where
        F: FnOnce(&TestStorage) -> R,
    {
        let test_storage = TestStorage::new();
        test_fn(&test_storage)
    }
}

#[cfg(test)]
mod tests {
    use super::test_harness::*;
    use crate::infrastructure::BookingRepository;

    #[test]
    fn test_harness_basic_functionality() {
        let test_storage = TestStorage::new();

        assert!(test_storage.storage().list_properties().unwrap().is_empty());

        let property = test_storage.create_sample_property().unwrap();
        let loaded = test_storage
            .storage()
            .load_property(property.id)
            .unwrap()
            .unwrap();
        assert_eq!(loaded.name, "Sample Cabin");
        assert!(test_storage.dir().join("test.db").exists());
    }

    #[test]
    fn test_harness_isolation() {
        let test_storage1 = TestStorage::new();
        let test_storage2 = TestStorage::new();

        test_storage1.create_sample_property().unwrap();

        with_test_storage(|_| ());
        assert!(test_storage2.storage().list_properties().unwrap().is_empty());
    }
}
