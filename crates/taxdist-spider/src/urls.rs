use crate::codes::{TaxType, TAX_TYPES};
use chrono::{Datelike, NaiveDate};
use std::iter::FusedIterator;

/// First year the spider looks for distribution documents.
pub const START_YEAR: i32 = 2020;

/// Directory the state publishes monthly distribution PDFs under.
pub const DISTRIBUTION_URL: &str = "https://tax.utah.gov/salestax/distribute";

/// A predicted location of one month's distribution document for one tax type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateDocument {
    pub url: String,
    pub tax_type: &'static TaxType,
    pub year: i32,
    pub month: u32,
}

impl CandidateDocument {
    /// The final path segment of the url, also used as the local cache name.
    pub fn file_name(&self) -> String {
        file_name(self.year, self.month, self.tax_type)
    }
}

/// `{YY}{MM}ut_{id}.pdf`, e.g. `2403ut_ftr022.pdf` for March 2024.
pub fn file_name(year: i32, month: u32, tax_type: &TaxType) -> String {
    format!(
        "{yy:02}{month:02}ut_{id}.pdf",
        yy = year.rem_euclid(100),
        id = tax_type.id
    )
}

/// Every (year, month, tax type) between January of `start_year` and the
/// month containing the end date, inclusive.
///
/// The range is only a description; [`CandidateRange::iter`] lazily walks it
/// and can be called again to restart from the beginning.
#[derive(Clone, Debug)]
pub struct CandidateRange {
    base: String,
    start_year: i32,
    end_year: i32,
    end_month: u32,
    tax_types: Vec<&'static TaxType>,
}

impl CandidateRange {
    pub fn new(start_year: i32, end: NaiveDate) -> Self {
        Self {
            base: DISTRIBUTION_URL.to_string(),
            start_year,
            end_year: end.year(),
            end_month: end.month(),
            tax_types: TAX_TYPES.iter().collect(),
        }
    }

    /// Replace the directory the document urls are built under.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        let base: String = base.into();
        self.base = base.trim_end_matches('/').to_string();
        self
    }

    /// Leave out tax types whose identifier has never been seen published.
    pub fn confirmed_only(mut self) -> Self {
        self.tax_types.retain(|tax| tax.confirmed);
        self
    }

    /// Number of months covered, counting the end month in full.
    pub fn months(&self) -> usize {
        if self.start_year > self.end_year {
            return 0;
        }
        let years = i64::from(self.end_year) - i64::from(self.start_year);
        usize::try_from(years * 12 + i64::from(self.end_month)).unwrap_or(usize::MAX)
    }

    pub fn len(&self) -> usize {
        self.months().saturating_mul(self.tax_types.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Candidates<'_> {
        Candidates {
            range: self,
            year: self.start_year,
            month: 1,
            tax: 0,
            remaining: self.len(),
        }
    }
}

impl<'a> IntoIterator for &'a CandidateRange {
    type Item = CandidateDocument;
    type IntoIter = Candidates<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`CandidateRange`].
#[derive(Clone, Debug)]
pub struct Candidates<'a> {
    range: &'a CandidateRange,
    year: i32,
    month: u32,
    tax: usize,
    remaining: usize,
}

impl Iterator for Candidates<'_> {
    type Item = CandidateDocument;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let tax_type: &'static TaxType = self.range.tax_types[self.tax];
        let candidate = CandidateDocument {
            url: format!(
                "{}/{}",
                self.range.base,
                file_name(self.year, self.month, tax_type)
            ),
            tax_type,
            year: self.year,
            month: self.month,
        };

        // tax types within month, months within year
        self.tax += 1;
        if self.tax == self.range.tax_types.len() {
            self.tax = 0;
            self.month += 1;
            if self.month > 12 {
                self.month = 1;
                self.year += 1;
            }
        }
        self.remaining -= 1;

        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Candidates<'_> {}
impl FusedIterator for Candidates<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet as Set;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn file_name_layout() {
        let tax = &TAX_TYPES[1];
        assert_eq!(file_name(2024, 3, tax), "2403ut_ftr022.pdf");
        assert_eq!(file_name(2005, 11, tax), "0511ut_ftr022.pdf");
        assert_eq!(file_name(2000, 1, tax), "0001ut_ftr022.pdf");
    }

    #[test]
    fn one_candidate_per_month_and_tax_type() {
        let range = CandidateRange::new(2022, date(2024, 3, 15));
        let candidates: Vec<_> = range.iter().collect();

        assert_eq!(range.months(), 27);
        assert_eq!(candidates.len(), 27 * TAX_TYPES.len());
        assert_eq!(candidates.len(), range.len());

        let keys: Set<_> = candidates
            .iter()
            .map(|c| (c.year, c.month, c.tax_type.id))
            .collect();
        assert_eq!(keys.len(), candidates.len());
    }

    #[test]
    fn ordering_is_year_month_then_declared_tax_type() {
        let range = CandidateRange::new(2023, date(2024, 2, 1));
        let candidates: Vec<_> = range.iter().collect();

        let first = &candidates[0];
        assert_eq!((first.year, first.month), (2023, 1));
        assert_eq!(first.tax_type, &TAX_TYPES[0]);
        assert_eq!(candidates[4].tax_type, &TAX_TYPES[4]);
        assert_eq!((candidates[5].year, candidates[5].month), (2023, 2));

        let last = candidates.last().unwrap();
        assert_eq!((last.year, last.month), (2024, 2));
        assert_eq!(last.tax_type, &TAX_TYPES[4]);

        let order: Vec<_> = candidates.iter().map(|c| (c.year, c.month)).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn end_month_is_included_on_its_first_day() {
        let range = CandidateRange::new(2024, date(2024, 6, 1));
        let last = range.iter().last().unwrap();
        assert_eq!((last.year, last.month), (2024, 6));
    }

    #[test]
    fn restartable() {
        let range = CandidateRange::new(2024, date(2024, 2, 28));
        let once: Vec<_> = range.iter().collect();
        let twice: Vec<_> = (&range).into_iter().collect();
        assert_eq!(once, twice);
        assert_eq!(range.iter().len(), once.len());
    }

    #[test]
    fn start_after_end_is_empty() {
        let range = CandidateRange::new(2030, date(2024, 2, 28));
        assert!(range.is_empty());
        assert_eq!(range.iter().next(), None);
    }

    #[test]
    fn urls_join_base_and_file_name() {
        let range =
            CandidateRange::new(2024, date(2024, 1, 9)).with_base("http://localhost:8080/docs/");
        let first = range.iter().next().unwrap();
        assert_eq!(first.url, "http://localhost:8080/docs/2401ut_ftr021.pdf");
        assert!(first.url.ends_with(&first.file_name()));
    }

    #[test]
    fn unconfirmed_tax_types_can_be_left_out() {
        let range = CandidateRange::new(2024, date(2024, 2, 1)).confirmed_only();
        let ids: Vec<_> = range.iter().map(|c| c.tax_type.id).collect();

        assert_eq!(range.len(), 2 * 4);
        assert_eq!(&ids[..4], &["ftr022", "ftr023", "ftr031", "ftr035"]);
        assert!(!ids.contains(&"ftr021"));
    }

    #[test]
    fn extreme_years_do_not_overflow() {
        let range = CandidateRange::new(i32::MIN, date(2024, 2, 1));
        assert_eq!(range.months(), (2024 - i64::from(i32::MIN)) as usize * 12 + 2);
        assert_eq!(range.iter().next().map(|c| c.year), Some(i32::MIN));
    }

    #[test]
    fn file_names_are_injective_across_the_century() {
        let range = CandidateRange::new(2000, date(2099, 12, 31));
        let names: Set<String> = range.iter().map(|c| c.file_name()).collect();
        assert_eq!(names.len(), 100 * 12 * TAX_TYPES.len());
    }
}
