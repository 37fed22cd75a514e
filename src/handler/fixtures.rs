//! Static, read-only example data used by the tutorial endpoints

use crate::params::PathEnum;

/// Records served by `/fake_names/`
pub const FAKE_NAMES: [&str; 4] = ["Sam", "Pam", "Dam", "Bam"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub item_id: i64,
    pub name: &'static str,
}

/// Items looked up by `/items_bought/...`
pub const CART_ITEMS: [CartItem; 3] = [
    CartItem { item_id: 1, name: "Bat" },
    CartItem { item_id: 2, name: "Ball" },
    CartItem { item_id: 3, name: "Football" },
];

/// Items filtered by `/items_with_list/`
pub const LIST_ITEMS: [&str; 5] = ["bat", "ball", "football", "tennis ball", "cricket bat"];

pub fn find_cart_item(item_id: i64) -> Option<&'static CartItem> {
    CART_ITEMS.iter().find(|item| item.item_id == item_id)
}

/// The four known identities accepted as `name_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdName {
    Praneeth,
    Rohit,
    Venu,
    Jyothi,
}

impl PathEnum for IdName {
    const LABELS: &'static [&'static str] = &["Praneeth", "Rohit", "Venu", "Jyothi"];

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "Praneeth" => Some(Self::Praneeth),
            "Rohit" => Some(Self::Rohit),
            "Venu" => Some(Self::Venu),
            "Jyothi" => Some(Self::Jyothi),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Praneeth => "Praneeth",
            Self::Rohit => "Rohit",
            Self::Venu => "Venu",
            Self::Jyothi => "Jyothi",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for label in IdName::LABELS {
            let name = IdName::from_label(label).unwrap();
            assert_eq!(name.label(), *label);
        }
        assert_eq!(IdName::from_label("praneeth"), None);
    }

    #[test]
    fn test_find_cart_item() {
        assert_eq!(find_cart_item(2).map(|i| i.name), Some("Ball"));
        assert_eq!(find_cart_item(4), None);
    }
}
