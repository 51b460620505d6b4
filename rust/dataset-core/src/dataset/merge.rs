// rust/dataset-core/src/dataset/merge.rs

use std::cell::RefCell;
use std::ops::Add;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;

use super::fold::FoldIndex;
use super::handle::Dataset;

impl Dataset {
    /// Concatenates `self` and `other` into a new, independent dataset.
    ///
    /// Records of `self` come first, then records of `other`, each in its
    /// original order. The fold index is rebuilt from the concatenated
    /// sequence and the name becomes `self.name-other.name`. Neither input
    /// is modified. The two datasets are not checked for a shared schema.
    ///
    /// The merged dataset keeps `self`'s data directory and rejection budget,
    /// and seeds its random source from `self`'s.
    pub fn combine(&self, other: &Dataset) -> Result<Dataset> {
        let mut records = Vec::with_capacity(self.records.len() + other.records.len());
        records.extend(self.records.iter().cloned());
        records.extend(other.records.iter().cloned());

        let folds = FoldIndex::build(&records)?;
        let name = format!("{}-{}", self.name, other.name);
        let seed: u64 = self.rng.borrow_mut().gen();

        tracing::info!(
            "Combined dataset {} contains {} examples",
            name,
            records.len()
        );

        Ok(Dataset {
            name,
            data_dir: self.data_dir.clone(),
            records,
            folds,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
            max_rejection_attempts: self.max_rejection_attempts,
        })
    }
}

impl<'a> Add<&'a Dataset> for &'a Dataset {
    type Output = Result<Dataset>;

    fn add(self, other: &'a Dataset) -> Result<Dataset> {
        self.combine(other)
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::{Dataset, DatasetOptions};
    use serde_json::Value;
    use std::sync::Arc;

    fn ids(ds: &Dataset, fold: &str) -> Vec<u64> {
        ds.fold(fold)
            .unwrap()
            .iter()
            .map(|r| r.get("id").and_then(Value::as_u64).unwrap())
            .collect()
    }

    #[test]
    fn test_combine_concatenates() {
        let a = Dataset::from_text(
            "mnist",
            "/a",
            "{\"id\": 0}\n{\"id\": 1, \"fold\": \"val\"}\n",
            DatasetOptions::default(),
        )
        .unwrap();
        let b = Dataset::from_text(
            "svhn",
            "/b",
            "{\"id\": 2}\n{\"id\": 3}\n{\"id\": 4, \"fold\": \"test\"}\n",
            DatasetOptions::default(),
        )
        .unwrap();

        let merged = a.combine(&b).unwrap();

        assert_eq!(merged.name(), "mnist-svhn");
        assert_eq!(merged.count(None).unwrap(), 5);
        assert_eq!(ids(&merged, "train"), vec![0, 2, 3]);
        assert_eq!(ids(&merged, "val"), vec![1]);
        assert_eq!(ids(&merged, "test"), vec![4]);
        assert_eq!(merged.data_dir(), a.data_dir());

        // Inputs are untouched.
        assert_eq!(a.count(None).unwrap(), 2);
        assert_eq!(b.count(None).unwrap(), 3);
        assert!(a.fold("test").is_err());
    }

    #[test]
    fn test_combine_shares_records() {
        let a = Dataset::from_text("a", "", "{\"id\": 0}\n", DatasetOptions::default()).unwrap();
        let b = Dataset::from_text("b", "", "{\"id\": 1}\n", DatasetOptions::default()).unwrap();

        let merged = (&a + &b).unwrap();
        assert!(Arc::ptr_eq(&merged.records()[0], &a.records()[0]));
        assert!(Arc::ptr_eq(&merged.records()[1], &b.records()[0]));
    }

    #[test]
    fn test_combine_rebuilds_fold_index() {
        let a = Dataset::from_text("a", "", "{\"id\": 0}\n", DatasetOptions::default()).unwrap();
        let b_train = Dataset::from_text(
            "b",
            "",
            "{\"id\": 1}\n{\"id\": 2}\n",
            DatasetOptions::default(),
        )
        .unwrap();
        // Same records as b_train, with id 2 moved to "val".
        let b_moved = Dataset::from_text(
            "b",
            "",
            "{\"id\": 1}\n{\"id\": 2, \"fold\": \"val\"}\n",
            DatasetOptions::default(),
        )
        .unwrap();

        let before = a.combine(&b_train).unwrap();
        let after = a.combine(&b_moved).unwrap();

        assert_eq!(ids(&before, "train"), vec![0, 1, 2]);
        assert!(before.fold("val").is_err());
        assert_eq!(ids(&after, "train"), vec![0, 1]);
        assert_eq!(ids(&after, "val"), vec![2]);
    }

    #[test]
    fn test_combine_chain_names() {
        let a = Dataset::from_text("a", "", "{}\n", DatasetOptions::default()).unwrap();
        let b = Dataset::from_text("b", "", "{}\n", DatasetOptions::default()).unwrap();
        let c = Dataset::from_text("c", "", "{}\n", DatasetOptions::default()).unwrap();

        let abc = a.combine(&b).unwrap().combine(&c).unwrap();
        assert_eq!(abc.name(), "a-b-c");
        assert_eq!(abc.count(Some("train")).unwrap(), 3);
    }
}
