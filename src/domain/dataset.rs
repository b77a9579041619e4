//! Source dataset identity and filename-to-symbol mapping.

/// One discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    /// Filename without directory, as reported by the dataset source.
    pub name: String,
    pub symbol: String,
}

impl DatasetFile {
    pub fn new(name: impl Into<String>, suffix: &str) -> Self {
        let name = name.into();
        let symbol = symbol_from_filename(&name, suffix);
        Self { name, symbol }
    }
}

/// `ko_us_d.csv` with marker `_us_d.csv` gives `KO`. Every occurrence of the
/// marker is removed, wherever it sits; a name without it is upper-cased as-is.
pub fn symbol_from_filename(name: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return name.to_uppercase();
    }
    name.replace(suffix, "").to_uppercase()
}
