//! Invariant values per object

use super::InvariantValue;
use crate::error::{ConjectureError, Result};

/// Largest number of objects in one dataset
pub const MAX_OBJECT_COUNT: usize = 100_000;
/// Largest number of invariants in one dataset
pub const MAX_INVARIANT_COUNT: usize = 1_000;

/// Check the header of a dataset: sizes within limits and a main invariant
/// (0-based) that exists.
pub fn check_dimensions(object_count: usize, invariant_count: usize, main: usize) -> Result<()> {
    if object_count == 0 {
        return Err(ConjectureError::invalid_dataset("no objects"));
    }
    if invariant_count == 0 {
        return Err(ConjectureError::invalid_dataset("no invariants"));
    }
    if object_count > MAX_OBJECT_COUNT {
        return Err(ConjectureError::invalid_dataset(format!(
            "{} objects exceed limit {}",
            object_count, MAX_OBJECT_COUNT
        )));
    }
    if invariant_count > MAX_INVARIANT_COUNT {
        return Err(ConjectureError::invalid_dataset(format!(
            "{} invariants exceed limit {}",
            invariant_count, MAX_INVARIANT_COUNT
        )));
    }
    if main >= invariant_count {
        return Err(ConjectureError::invalid_dataset(format!(
            "main invariant {} out of range 1..={}",
            main + 1,
            invariant_count
        )));
    }
    Ok(())
}

/// Objects with one value per invariant, stored object-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<V> {
    object_count: usize,
    invariant_count: usize,
    main: usize,
    names: Option<Vec<String>>,
    theory: Option<Vec<V>>,
    values: Vec<V>,
}

impl<V: InvariantValue> Dataset<V> {
    /// `main` is the 0-based index of the main invariant.
    pub fn new(
        object_count: usize,
        invariant_count: usize,
        main: usize,
        values: Vec<V>,
    ) -> Result<Self> {
        check_dimensions(object_count, invariant_count, main)?;
        if values.len() != object_count * invariant_count {
            return Err(ConjectureError::invalid_dataset(format!(
                "expected {} values for {} objects and {} invariants, got {}",
                object_count * invariant_count,
                object_count,
                invariant_count,
                values.len()
            )));
        }
        Ok(Self {
            object_count,
            invariant_count,
            main,
            names: None,
            theory: None,
            values,
        })
    }

    /// Attach display names, one per invariant.
    pub fn with_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.invariant_count {
            return Err(ConjectureError::invalid_dataset(format!(
                "expected {} invariant names, got {}",
                self.invariant_count,
                names.len()
            )));
        }
        self.names = Some(names);
        Ok(self)
    }

    /// Attach a known bound per object.
    pub fn with_theory(mut self, theory: Vec<V>) -> Result<Self> {
        if theory.len() != self.object_count {
            return Err(ConjectureError::invalid_dataset(format!(
                "expected {} known theory values, got {}",
                self.object_count,
                theory.len()
            )));
        }
        self.theory = Some(theory);
        Ok(self)
    }

    pub fn object_count(&self) -> usize {
        self.object_count
    }

    pub fn invariant_count(&self) -> usize {
        self.invariant_count
    }

    /// 0-based index of the main invariant.
    pub fn main_invariant(&self) -> usize {
        self.main
    }

    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    pub fn theory(&self) -> Option<&[V]> {
        self.theory.as_deref()
    }

    /// All invariant values of one object.
    #[inline]
    pub fn row(&self, object: usize) -> &[V] {
        let start = object * self.invariant_count;
        &self.values[start..start + self.invariant_count]
    }

    #[inline]
    pub fn value(&self, object: usize, invariant: usize) -> V {
        self.values[object * self.invariant_count + invariant]
    }

    #[inline]
    pub fn main_value(&self, object: usize) -> V {
        self.value(object, self.main)
    }

    pub fn main_values(&self) -> impl Iterator<Item = V> + '_ {
        (0..self.object_count).map(move |object| self.main_value(object))
    }

    /// Objects whose main invariant is known.
    pub fn decidable_objects(&self) -> usize {
        self.main_values().filter(|value| value.is_defined()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_main() {
        let dataset = Dataset::new(2, 3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, f64::NAN]).unwrap();
        assert_eq!(&dataset.row(1)[..2], &[4.0, 5.0]);
        assert!(dataset.row(1)[2].is_nan());
        assert_eq!(dataset.value(0, 1), 2.0);
        assert_eq!(dataset.main_value(0), 3.0);
        assert_eq!(dataset.decidable_objects(), 1);
    }

    #[test]
    fn test_shape_errors() {
        assert!(Dataset::<f64>::new(0, 2, 0, vec![]).is_err());
        assert!(Dataset::new(1, 2, 2, vec![1.0, 2.0]).is_err());
        assert!(check_dimensions(MAX_OBJECT_COUNT, MAX_INVARIANT_COUNT, 0).is_ok());
        assert!(check_dimensions(MAX_OBJECT_COUNT + 1, 2, 0).is_err());
        assert!(check_dimensions(1, MAX_INVARIANT_COUNT + 1, 0).is_err());

        let err = Dataset::new(2, 2, 0, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid dataset: expected 4 values for 2 objects and 2 invariants, got 3"
        );
    }

    #[test]
    fn test_names_and_theory_lengths() {
        let dataset = Dataset::new(1, 2, 0, vec![1.0, 2.0]).unwrap();
        assert!(dataset.clone().with_names(vec!["a".into()]).is_err());
        assert!(dataset.clone().with_theory(vec![1.0, 2.0]).is_err());

        let dataset = dataset
            .with_names(vec!["a".into(), "b".into()])
            .unwrap()
            .with_theory(vec![0.5])
            .unwrap();
        assert_eq!(dataset.names().unwrap()[1], "b");
        assert_eq!(dataset.theory(), Some(&[0.5][..]));
    }
}
