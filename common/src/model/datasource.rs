use serde::{Deserialize, Serialize};

/// Format of a tabular data source, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSourceType {
    Csv,
    Spreadsheet,
}

impl DataSourceType {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// What the operator sees after a data source has been loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceSummary {
    pub file_name: String,
    pub source_type: DataSourceType,
    pub columns: Vec<String>,
    pub row_count: usize,
    /// Column selected for the To field after the load, if any.
    pub to_column: Option<String>,
}

/// What the operator sees after a template document has been loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub file_name: String,
    pub placeholders: Vec<String>,
}
