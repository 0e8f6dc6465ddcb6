use std::{collections::HashMap, fmt, str::FromStr};

use once_cell::sync::Lazy;
use serde::{de::Deserializer, Deserialize, Serialize, Serializer};

/// Fixed spending categories shared by expense entry and budgeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    FoodAndDining,
    Transportation,
    Housing,
    Entertainment,
    Shopping,
    Utilities,
    Healthcare,
    Travel,
    Education,
    Groceries,
    Subscriptions,
    PersonalCare,
    GiftsAndDonations,
    Other,
}

static LABEL_INDEX: Lazy<HashMap<String, Category>> = Lazy::new(|| {
    Category::ALL
        .iter()
        .map(|category| (category.label().to_ascii_lowercase(), *category))
        .collect()
});

impl Category {
    /// Display order used by every picker and report.
    pub const ALL: [Category; 14] = [
        Category::FoodAndDining,
        Category::Transportation,
        Category::Housing,
        Category::Entertainment,
        Category::Shopping,
        Category::Utilities,
        Category::Healthcare,
        Category::Travel,
        Category::Education,
        Category::Groceries,
        Category::Subscriptions,
        Category::PersonalCare,
        Category::GiftsAndDonations,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Housing => "Housing",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Utilities => "Utilities",
            Category::Healthcare => "Healthcare",
            Category::Travel => "Travel",
            Category::Education => "Education",
            Category::Groceries => "Groceries",
            Category::Subscriptions => "Subscriptions",
            Category::PersonalCare => "Personal Care",
            Category::GiftsAndDonations => "Gifts & Donations",
            Category::Other => "Other",
        }
    }

    /// Case-insensitive lookup by display label.
    pub fn from_label(value: &str) -> Option<Category> {
        LABEL_INDEX.get(&value.trim().to_ascii_lowercase()).copied()
    }

    /// Lenient lookup used for drafts and stored data; unknown labels land in `Other`.
    pub fn from_label_or_other(value: &str) -> Category {
        Self::from_label(value).unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::from_label(value).ok_or_else(|| format!("unknown category `{}`", value.trim()))
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Category::from_label_or_other(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_resolve_case_insensitively() {
        assert_eq!(Category::from_label("groceries"), Some(Category::Groceries));
        assert_eq!(
            Category::from_label("  FOOD & dining "),
            Some(Category::FoodAndDining)
        );
        assert_eq!(Category::from_label("Pets"), None);
    }

    #[test]
    fn unknown_labels_deserialize_as_other() {
        let parsed: Category = serde_json::from_str("\"Pets\"").unwrap();
        assert_eq!(parsed, Category::Other);
        let json = serde_json::to_string(&Category::PersonalCare).unwrap();
        assert_eq!(json, "\"Personal Care\"");
    }

    #[test]
    fn display_order_ends_with_other() {
        assert_eq!(Category::ALL.first(), Some(&Category::FoodAndDining));
        assert_eq!(Category::ALL.last(), Some(&Category::Other));
    }
}
