//! Ion symbol tables.

/// System symbol: `$ion_symbol_table`.
pub const SID_ION_SYMBOL_TABLE: usize = 3;
/// System symbol: `imports`.
pub const SID_IMPORTS: usize = 6;
/// System symbol: `symbols`.
pub const SID_SYMBOLS: usize = 7;
/// System symbol: `max_id`.
pub const SID_MAX_ID: usize = 8;

/// First symbol id available to local tables.
const FIRST_USER_SID: usize = 10;

const SYSTEM_SYMBOLS: [&str; 10] = [
    "$0",
    "$ion",
    "$ion_1_0",
    "$ion_symbol_table",
    "name",
    "version",
    "imports",
    "symbols",
    "max_id",
    "$ion_shared_symbol_table",
];

/// Bidirectional symbol table: the system symbols plus locally-defined ones.
#[derive(Default)]
pub struct IonSymbols {
    user: Vec<String>,
}

impl IonSymbols {
    pub fn new() -> Self {
        Self { user: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.user.clear();
    }

    /// Registers a symbol, returning its id.
    pub fn add(&mut self, text: &str) -> usize {
        if let Some(sid) = self.lookup(text) {
            return sid;
        }
        self.user.push(text.to_owned());
        FIRST_USER_SID + self.user.len() - 1
    }

    /// Appends a symbol read from a local symbol table.
    pub fn import(&mut self, text: String) {
        self.user.push(text);
    }

    pub fn lookup(&self, text: &str) -> Option<usize> {
        if let Some(pos) = SYSTEM_SYMBOLS.iter().position(|&s| s == text) {
            return Some(pos);
        }
        self.user
            .iter()
            .position(|s| s == text)
            .map(|pos| FIRST_USER_SID + pos)
    }

    pub fn resolve(&self, sid: usize) -> Option<&str> {
        if sid < FIRST_USER_SID {
            return SYSTEM_SYMBOLS.get(sid).copied();
        }
        self.user.get(sid - FIRST_USER_SID).map(String::as_str)
    }

    pub fn has_user_symbols(&self) -> bool {
        !self.user.is_empty()
    }

    pub fn user_symbols(&self) -> &[String] {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_symbols_resolve() {
        let symbols = IonSymbols::new();
        assert_eq!(symbols.resolve(SID_ION_SYMBOL_TABLE), Some("$ion_symbol_table"));
        assert_eq!(symbols.resolve(SID_SYMBOLS), Some("symbols"));
    }

    #[test]
    fn user_symbols_start_at_ten() {
        let mut symbols = IonSymbols::new();
        assert_eq!(symbols.add("foo"), 10);
        assert_eq!(symbols.add("bar"), 11);
        assert_eq!(symbols.add("foo"), 10);
        assert_eq!(symbols.resolve(11), Some("bar"));
        assert_eq!(symbols.resolve(12), None);
    }
}
