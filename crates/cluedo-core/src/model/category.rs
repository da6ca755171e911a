use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Category {
    Suspect = 0,
    Weapon = 1,
    Room = 2,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Suspect, Category::Weapon, Category::Room];

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Category::Suspect),
            1 => Some(Category::Weapon),
            2 => Some(Category::Room),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Plural label used for catalog files and table headers.
    pub const fn plural(self) -> &'static str {
        match self {
            Category::Suspect => "suspects",
            Category::Weapon => "weapons",
            Category::Room => "rooms",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Suspect => "suspect",
            Category::Weapon => "weapon",
            Category::Room => "room",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::Category;

    #[test]
    fn display_uses_singular_labels() {
        assert_eq!(Category::Suspect.to_string(), "suspect");
        assert_eq!(Category::Room.plural(), "rooms");
    }

    #[test]
    fn index_roundtrip() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(Category::from_index(i), Some(*category));
            assert_eq!(category.index(), i);
        }
        assert_eq!(Category::from_index(3), None);
    }
}
