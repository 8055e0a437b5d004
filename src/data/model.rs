use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::observe::{Observers, Subscription};
use crate::units::Quantity;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("spectral axis has {axis} values but flux has {flux}")]
    LengthMismatch { axis: usize, flux: usize },

    #[error("spectral axis decreases at sample {index}")]
    NotMonotonic { index: usize },
}

// ---------------------------------------------------------------------------
// SpectrumData – length-matched (spectral axis, flux) pair
// ---------------------------------------------------------------------------

/// Paired spectral axis and flux. The two always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumData {
    spectral_axis: Quantity,
    flux: Quantity,
}

impl SpectrumData {
    pub fn new(spectral_axis: Quantity, flux: Quantity) -> Result<Self, DataError> {
        if spectral_axis.len() != flux.len() {
            return Err(DataError::LengthMismatch {
                axis: spectral_axis.len(),
                flux: flux.len(),
            });
        }
        Ok(SpectrumData {
            spectral_axis,
            flux,
        })
    }

    pub fn spectral_axis(&self) -> &Quantity {
        &self.spectral_axis
    }

    pub fn flux(&self) -> &Quantity {
        &self.flux
    }

    pub fn len(&self) -> usize {
        self.flux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flux.is_empty()
    }

    /// Samples `start..=end`.
    pub fn extract(&self, start: usize, end: usize) -> SpectrumData {
        SpectrumData {
            spectral_axis: self.spectral_axis.slice(start, end + 1),
            flux: self.flux.slice(start, end + 1),
        }
    }

    fn check_non_decreasing(&self) -> Result<(), DataError> {
        let axis = self.spectral_axis.values();
        match axis.windows(2).position(|w| w[1] < w[0]) {
            Some(i) => Err(DataError::NotMonotonic { index: i + 1 }),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// SpectrumRecord – one loaded spectrum with identity and change observers
// ---------------------------------------------------------------------------

/// Caller-supplied unique key of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordChange {
    Name,
    Data,
    /// Color, width or draw order of a series showing this record changed.
    Appearance,
}

/// Canonical stored spectrum. Shared as `Rc<SpectrumRecord>` between the
/// data collection and every plotted series that shows it.
#[derive(Debug)]
pub struct SpectrumRecord {
    identifier: RecordId,
    name: RefCell<String>,
    data: RefCell<Rc<SpectrumData>>,
    observers: Observers<RecordChange>,
}

impl SpectrumRecord {
    /// The spectral axis must be non-decreasing.
    pub fn new(identifier: RecordId, name: impl Into<String>, data: SpectrumData) -> Result<Self, DataError> {
        data.check_non_decreasing()?;
        Ok(SpectrumRecord {
            identifier,
            name: RefCell::new(name.into()),
            data: RefCell::new(Rc::new(data)),
            observers: Observers::default(),
        })
    }

    pub fn identifier(&self) -> RecordId {
        self.identifier
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.borrow_mut() = name.into();
        self.observers.emit(&RecordChange::Name);
    }

    /// Snapshot of the current data. Later `set_data` calls do not affect it.
    pub fn data(&self) -> Rc<SpectrumData> {
        Rc::clone(&self.data.borrow())
    }

    pub fn spectral_axis(&self) -> Quantity {
        self.data.borrow().spectral_axis().clone()
    }

    pub fn flux(&self) -> Quantity {
        self.data.borrow().flux().clone()
    }

    /// Replace axis and flux together. Rejected data leaves the record as is.
    pub fn set_data(&self, data: SpectrumData) -> Result<(), DataError> {
        data.check_non_decreasing()?;
        *self.data.borrow_mut() = Rc::new(data);
        self.observers.emit(&RecordChange::Data);
        Ok(())
    }

    /// Tell views of this record that a series' look changed.
    pub fn emit_appearance_changed(&self) {
        self.observers.emit(&RecordChange::Appearance);
    }

    pub fn on_change(&self, callback: impl Fn(&RecordChange) + 'static) -> Subscription {
        self.observers.subscribe(callback)
    }

    pub fn remove_observer(&self, subscription: Subscription) -> bool {
        self.observers.unsubscribe(subscription)
    }
}

// ---------------------------------------------------------------------------
// DataCollection – the application's loaded records
// ---------------------------------------------------------------------------

/// All loaded records in load order.
#[derive(Debug, Default)]
pub struct DataCollection {
    records: Vec<Rc<SpectrumRecord>>,
    next_id: u64,
}

impl DataCollection {
    /// Hand out an identifier no record in this collection uses.
    pub fn next_identifier(&mut self) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, record: SpectrumRecord) -> Rc<SpectrumRecord> {
        self.next_id = self.next_id.max(record.identifier().0 + 1);
        let record = Rc::new(record);
        self.records.push(Rc::clone(&record));
        record
    }

    pub fn get(&self, id: RecordId) -> Option<&Rc<SpectrumRecord>> {
        self.records.iter().find(|r| r.identifier() == id)
    }

    pub fn remove(&mut self, id: RecordId) -> Option<Rc<SpectrumRecord>> {
        let index = self.records.iter().position(|r| r.identifier() == id)?;
        Some(self.records.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<SpectrumRecord>> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::units::Unit;

    pub(crate) fn spectrum(axis: Vec<f64>, axis_unit: &str, flux: Vec<f64>, flux_unit: &str) -> SpectrumData {
        SpectrumData::new(
            Quantity::new(axis, Unit::parse(axis_unit).unwrap()),
            Quantity::new(flux, Unit::parse(flux_unit).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = SpectrumData::new(
            Quantity::new(vec![1.0, 2.0], Unit::dimensionless()),
            Quantity::new(vec![1.0], Unit::dimensionless()),
        );
        assert_eq!(err, Err(DataError::LengthMismatch { axis: 2, flux: 1 }));
    }

    #[test]
    fn test_record_requires_non_decreasing_axis() {
        let data = spectrum(vec![3.0, 2.0, 1.0], "nm", vec![1.0, 1.0, 1.0], "Jy");
        let err = SpectrumRecord::new(RecordId(0), "bad", data).unwrap_err();
        assert_eq!(err, DataError::NotMonotonic { index: 1 });
    }

    #[test]
    fn test_set_data_is_atomic_and_notifies() {
        let record = SpectrumRecord::new(
            RecordId(1),
            "a",
            spectrum(vec![1.0, 2.0], "nm", vec![5.0, 6.0], "Jy"),
        )
        .unwrap();
        let before = record.data();

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        record.on_change(move |c| sink.borrow_mut().push(*c));

        let rejected = spectrum(vec![2.0, 1.0], "nm", vec![0.0, 0.0], "Jy");
        assert!(record.set_data(rejected).is_err());
        assert_eq!(record.flux().values(), &[5.0, 6.0]);

        record
            .set_data(spectrum(vec![1.0, 2.0, 3.0], "nm", vec![7.0, 8.0, 9.0], "Jy"))
            .unwrap();
        assert_eq!(record.spectral_axis().len(), 3);
        assert_eq!(before.len(), 2);
        assert_eq!(*events.borrow(), vec![RecordChange::Data]);
    }

    #[test]
    fn test_collection_identifiers() {
        let mut collection = DataCollection::default();
        let id = collection.next_identifier();
        let data = spectrum(vec![1.0], "nm", vec![1.0], "Jy");
        collection.add(SpectrumRecord::new(id, "one", data.clone()).unwrap());
        collection.add(SpectrumRecord::new(RecordId(10), "ten", data).unwrap());
        assert_eq!(collection.next_identifier(), RecordId(11));
        assert_eq!(collection.get(RecordId(10)).map(|r| r.name()), Some("ten".to_string()));
        assert!(collection.remove(id).is_some());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_extract_is_inclusive() {
        let data = spectrum(vec![1.0, 2.0, 3.0, 4.0], "nm", vec![10.0, 20.0, 30.0, 40.0], "Jy");
        let sub = data.extract(1, 2);
        assert_eq!(sub.flux().values(), &[20.0, 30.0]);
        assert_eq!(sub.spectral_axis().values(), &[2.0, 3.0]);
    }
}
