use std::fmt;

use serde::{Deserialize, Serialize};

/// An entry of the permission catalog, e.g. `view` or `edit`.
///
/// Shares reference permissions by id only; the catalog is looked up to
/// reject ids that do not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub name: String,
}

impl Permission {
    pub const VIEW: i64 = 1;
    pub const EDIT: i64 = 2;

    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let p = Permission::new(2, "edit");
        assert_eq!(p.to_string(), "edit (2)");
    }
}
