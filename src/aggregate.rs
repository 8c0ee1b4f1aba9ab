//! Cross-page field aggregation
//!
//! Demographic fields come from pages without a code, the address from pages
//! with one. The first non-empty value in page order wins.

use serde::{Deserialize, Serialize};

use crate::constants::fields;
use crate::pipeline::PageResult;

/// Merged demographic fields for one card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicRecord {
    pub name: String,
    pub dob: String,
    pub gender: String,
    pub aadhaar: String,
    pub address: String,
}

impl DemographicRecord {
    /// Value by field key, `None` for unknown keys
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            fields::NAME => Some(&self.name),
            fields::DOB => Some(&self.dob),
            fields::GENDER => Some(&self.gender),
            fields::AADHAAR => Some(&self.aadhaar),
            fields::ADDRESS => Some(&self.address),
            _ => None,
        }
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            fields::NAME => Some(&mut self.name),
            fields::DOB => Some(&mut self.dob),
            fields::GENDER => Some(&mut self.gender),
            fields::AADHAAR => Some(&mut self.aadhaar),
            fields::ADDRESS => Some(&mut self.address),
            _ => None,
        }
    }
}

/// Merge page results, conventionally front then back
pub fn aggregate(pages: &[PageResult]) -> DemographicRecord {
    let mut record = DemographicRecord::default();

    for key in fields::DEMOGRAPHIC {
        if let Some(value) = first_value(pages, key, false) {
            if let Some(slot) = record.slot_mut(key) {
                *slot = value.to_string();
            }
        }
    }
    if let Some(address) = first_value(pages, fields::ADDRESS, true) {
        record.address = address.to_string();
    }
    record
}

fn first_value<'a>(pages: &'a [PageResult], key: &str, code_detected: bool) -> Option<&'a str> {
    pages
        .iter()
        .filter(|page| page.code_detected == code_detected)
        .map(|page| page.field(key))
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn page(code_detected: bool, fields: &[(&str, &str)]) -> PageResult {
        PageResult {
            quadrilateral_found: true,
            miss_reason: String::new(),
            code_detected,
            code_payload: String::new(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            regions_read: fields.iter().map(|(k, _)| k.to_string()).collect(),
            quadrilateral: None,
        }
    }

    #[test]
    fn test_front_back_merge() {
        let front = page(false, &[("name", "A")]);
        let back = page(true, &[("address", "X")]);

        let record = aggregate(&[front, back]);

        assert_eq!(
            record,
            DemographicRecord {
                name: "A".into(),
                dob: String::new(),
                gender: String::new(),
                aadhaar: String::new(),
                address: "X".into(),
            }
        );
    }

    #[test]
    fn test_order_independent_for_disjoint_pages() {
        let front = page(false, &[("name", "A"), ("dob", "01/01/1990")]);
        let back = page(true, &[("address", "X")]);

        assert_eq!(
            aggregate(&[front.clone(), back.clone()]),
            aggregate(&[back, front])
        );
    }

    #[test]
    fn test_code_page_fields_never_feed_demographics() {
        let back = page(true, &[("name", "WRONG"), ("address", "X")]);
        let front = page(false, &[("address", "ALSO WRONG"), ("gender", "F")]);

        let record = aggregate(&[back, front]);

        assert_eq!(record.name, "");
        assert_eq!(record.gender, "F");
        assert_eq!(record.address, "X");
    }

    #[test]
    fn test_first_non_empty_wins() {
        let pages = [
            page(false, &[("name", ""), ("aadhaar", "1111 2222 3333")]),
            page(false, &[("name", "B"), ("aadhaar", "9999")]),
            page(true, &[("address", "")]),
            page(true, &[("address", "Y")]),
        ];

        let record = aggregate(&pages);

        assert_eq!(record.name, "B");
        assert_eq!(record.aadhaar, "1111 2222 3333");
        assert_eq!(record.address, "Y");
    }

    #[test]
    fn test_no_pages_gives_empty_record() {
        assert_eq!(aggregate(&[]), DemographicRecord::default());
    }

    #[test]
    fn test_get_by_key() {
        let record = DemographicRecord {
            gender: "M".into(),
            ..Default::default()
        };
        assert_eq!(record.get("gender"), Some("M"));
        assert_eq!(record.get("phone"), None);
    }
}
