//! Classifier label mapping.
//!
//! The upstream classifier emits one of eleven codes (`LABEL_0` ..
//! `LABEL_10`). This module maps them to the human-readable issue names
//! the resolver works with. Unknown codes map to [`Category::Unknown`]
//! rather than failing.

use anyhow::{bail, Result};
use std::collections::HashSet;
use std::fmt;

/// Display text for labels outside the fixed mapping.
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    InformationBelongsToSomeoneElse,
    ImproperUseOfReport,
    InvestigationDidNotFixError,
    AccountInformationIncorrect,
    AccountStatusIncorrect,
    UnrecognizedInquiries,
    InvestigationOver30Days,
    DebtIsNotYours,
    NotNotifiedOfInvestigation,
    PersonalInformationIncorrect,
    Other,
    Unknown,
}

const MAPPING: [(&str, Category); 11] = [
    ("LABEL_0", Category::InformationBelongsToSomeoneElse),
    ("LABEL_1", Category::ImproperUseOfReport),
    ("LABEL_2", Category::InvestigationDidNotFixError),
    ("LABEL_3", Category::AccountInformationIncorrect),
    ("LABEL_4", Category::AccountStatusIncorrect),
    ("LABEL_5", Category::UnrecognizedInquiries),
    ("LABEL_6", Category::InvestigationOver30Days),
    ("LABEL_7", Category::DebtIsNotYours),
    ("LABEL_8", Category::NotNotifiedOfInvestigation),
    ("LABEL_9", Category::PersonalInformationIncorrect),
    ("LABEL_10", Category::Other),
];

impl Category {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        MAPPING
            .iter()
            .find(|(code, _)| *code == label)
            .map(|(_, cat)| *cat)
            .unwrap_or(Category::Unknown)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::InformationBelongsToSomeoneElse => "Information belongs to someone else",
            Category::ImproperUseOfReport => "Reporting company used your report improperly",
            Category::InvestigationDidNotFixError => {
                "Their investigation did not fix an error on your report"
            }
            Category::AccountInformationIncorrect => "Account information incorrect",
            Category::AccountStatusIncorrect => "Account status incorrect",
            Category::UnrecognizedInquiries => {
                "Credit inquiries on your report that you don't recognize"
            }
            Category::InvestigationOver30Days => "Investigation took more than 30 days",
            Category::DebtIsNotYours => "Debt is not yours",
            Category::NotNotifiedOfInvestigation => {
                "Was not notified of investigation status or results"
            }
            Category::PersonalInformationIncorrect => "Personal information incorrect",
            Category::Other => "Other",
            Category::Unknown => UNKNOWN_CATEGORY,
        }
    }

    /// The classifier code for this category, `None` for [`Category::Unknown`].
    pub fn label(&self) -> Option<&'static str> {
        MAPPING
            .iter()
            .find(|(_, cat)| cat == self)
            .map(|(code, _)| *code)
    }

    /// All known categories in label order.
    pub fn all() -> impl Iterator<Item = (&'static str, Category)> {
        MAPPING.iter().copied()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turn a CLI `--category` argument into the category text handed to the
/// resolver. `LABEL_n` codes are mapped; anything else is taken as an
/// already human-readable category and passed through.
pub fn resolve_category_arg(arg: &str) -> String {
    let trimmed = arg.trim();
    if trimmed.starts_with("LABEL_") {
        Category::from_label(trimmed).name().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Check that the mapping covers exactly `LABEL_0` through `LABEL_10`,
/// each once, with distinct categories.
pub fn validate_mapping() -> Result<()> {
    let codes: HashSet<&str> = MAPPING.iter().map(|(code, _)| *code).collect();
    let cats: HashSet<Category> = MAPPING.iter().map(|(_, cat)| *cat).collect();

    if codes.len() != MAPPING.len() || cats.len() != MAPPING.len() {
        bail!("category mapping contains duplicate entries");
    }
    for i in 0..MAPPING.len() {
        let expected = format!("LABEL_{}", i);
        if !codes.contains(expected.as_str()) {
            bail!("category mapping is missing {}", expected);
        }
    }
    if cats.contains(&Category::Unknown) {
        bail!("category mapping must not contain the unknown sentinel");
    }
    Ok(())
}
