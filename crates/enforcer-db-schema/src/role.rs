//! Key roles shared by hsm keys, policy keys and key data.

use enforcer_db_core::db_enum;

db_enum! {
    /// What a key signs.
    pub enum KeyRole {
        /// Key-signing key.
        Ksk = 1 => "KSK",
        /// Zone-signing key.
        Zsk = 2 => "ZSK",
        /// Combined signing key.
        Csk = 3 => "CSK",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enforcer_db_core::DbEnum;

    #[test]
    fn test_labels() {
        assert_eq!(KeyRole::Ksk.text(), Some("KSK"));
        assert_eq!(KeyRole::from_text("CSK"), Some(KeyRole::Csk));
        assert_eq!(KeyRole::from_text("csk"), None);
        assert_eq!(KeyRole::from_code(2), Some(KeyRole::Zsk));
        assert_eq!(KeyRole::Invalid.text(), None);
        assert_eq!(KeyRole::default().to_string(), "<invalid>");
    }
}
