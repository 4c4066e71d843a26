/// A tax category and the identifier the state uses for it in file names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaxType {
    pub name: &'static str,
    pub id: &'static str,
    /// Whether the state is known to publish documents under `id`.
    pub confirmed: bool,
}

/// Every tax type the spider collects, in the order candidates are generated.
pub static TAX_TYPES: [TaxType; 5] = [
    TaxType {
        name: "Sales and Use",
        // unconfirmed: no published document uses this id yet, so every
        // predicted url for it may miss
        id: "ftr021",
        confirmed: false,
    },
    TaxType {
        name: "Transient Room",
        id: "ftr022",
        confirmed: true,
    },
    TaxType {
        name: "Tourism Transient Room",
        id: "ftr023",
        confirmed: true,
    },
    TaxType {
        name: "Restaurant",
        id: "ftr031",
        confirmed: true,
    },
    TaxType {
        name: "Resort Communities",
        id: "ftr035",
        confirmed: true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet as Set;

    #[test]
    fn identifiers_are_unique() {
        let ids: Set<&str> = TAX_TYPES.iter().map(|tax| tax.id).collect();
        assert_eq!(ids.len(), TAX_TYPES.len());
    }

    #[test]
    fn only_the_published_identifiers_are_confirmed() {
        let confirmed: Vec<&str> = TAX_TYPES
            .iter()
            .filter(|tax| tax.confirmed)
            .map(|tax| tax.id)
            .collect();
        assert_eq!(confirmed, vec!["ftr022", "ftr023", "ftr031", "ftr035"]);
    }

    #[test]
    fn names_are_unique() {
        let names: Set<&str> = TAX_TYPES.iter().map(|tax| tax.name).collect();
        assert_eq!(names.len(), TAX_TYPES.len());
    }
}
