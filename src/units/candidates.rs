use super::{find_equivalent_units, Equivalency, Quantity, Unit};

/// Combo-box entry that switches to free-text unit entry.
pub const CUSTOM_ENTRY: &str = "Custom";

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub unit: Unit,
}

/// Selectable units for one axis, each under a unique display title.
///
/// Built once when the unit dialog opens; the dialog hands a title back and
/// the list maps it to the unit it was generated from.
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    entries: Vec<Candidate>,
}

impl CandidateList {
    pub fn build(current: &Unit, equivalency: Equivalency, context: Option<&Quantity>) -> Self {
        let mut entries: Vec<Candidate> = Vec::new();
        for unit in find_equivalent_units(current, equivalency, context) {
            let mut title = unit.humanize();
            if entries.iter().any(|c| c.title == title) {
                title = unit.to_string();
            }
            if entries.iter().any(|c| c.title == title || c.unit == unit) {
                continue;
            }
            entries.push(Candidate { title, unit });
        }
        CandidateList { entries }
    }

    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    /// Titles in list order followed by [`CUSTOM_ENTRY`].
    pub fn titles(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|c| c.title.clone())
            .chain(std::iter::once(CUSTOM_ENTRY.to_string()))
            .collect()
    }

    pub fn lookup(&self, title: &str) -> Option<&Unit> {
        self.entries.iter().find(|c| c.title == title).map(|c| &c.unit)
    }

    pub fn title_of(&self, unit: &Unit) -> Option<&str> {
        self.entries
            .iter()
            .find(|c| &c.unit == unit)
            .map(|c| c.title.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> Quantity {
        Quantity::new(vec![400.0, 500.0, 600.0], Unit::parse("nm").unwrap())
    }

    #[test]
    fn test_titles_parse_back_to_their_units() {
        let lists = [
            CandidateList::build(&Unit::parse("nm").unwrap(), Equivalency::Spectral, None),
            CandidateList::build(&Unit::parse("Jy").unwrap(), Equivalency::SpectralDensity, Some(&axis())),
            CandidateList::build(
                &Unit::parse("erg / (s AA)").unwrap(),
                Equivalency::SpectralDensity,
                Some(&axis()),
            ),
        ];
        for list in &lists {
            assert!(!list.is_empty());
            for candidate in list.entries() {
                let parsed = Unit::parse(&candidate.title).unwrap();
                assert_eq!(parsed, candidate.unit, "title {}", candidate.title);
                assert_eq!(list.lookup(&candidate.title), Some(&candidate.unit));
            }
        }
    }

    #[test]
    fn test_current_unit_always_listed() {
        let odd = Unit::parse("1e-17 erg / (s cm2 AA)").unwrap();
        let list = CandidateList::build(&odd, Equivalency::SpectralDensity, Some(&axis()));
        assert_eq!(list.title_of(&odd), Some("1e-17 erg / (Angstrom cm2 s)"));
    }

    #[test]
    fn test_custom_entry_is_last() {
        let list = CandidateList::build(&Unit::parse("Hz").unwrap(), Equivalency::Spectral, None);
        let titles = list.titles();
        assert_eq!(titles.last().map(String::as_str), Some(CUSTOM_ENTRY));
        assert_eq!(titles.len(), list.len() + 1);
        assert!(titles.contains(&"Gigahertz".to_string()));
        assert!(list.lookup(CUSTOM_ENTRY).is_none());
    }
}
