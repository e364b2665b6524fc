//! Column metadata and type information

use serde::{Deserialize, Serialize};

/// Type of a column, as inferred from its contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// No non-null value seen yet (inference only)
    Null,
    Boolean,
    Integer,
    Double,
    Date,
    Timestamp,
    String,
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Null
    }
}

impl DataType {
    /// Widen the type to accommodate another type
    pub fn widen(self, other: DataType) -> DataType {
        if self == other {
            return self;
        }

        match (self, other) {
            (DataType::Null, t) | (t, DataType::Null) => t,
            (DataType::Integer, DataType::Double) | (DataType::Double, DataType::Integer) => {
                DataType::Double
            }
            (DataType::Date, DataType::Timestamp) | (DataType::Timestamp, DataType::Date) => {
                DataType::Timestamp
            }
            _ => DataType::String,
        }
    }

    /// Resolve the inference-only `Null` state
    pub fn finalize(self) -> DataType {
        match self {
            DataType::Null => DataType::String,
            t => t,
        }
    }

    /// Type name as reported by `Dataset::dtypes`
    pub fn name(self) -> &'static str {
        match self {
            DataType::Null => "void",
            DataType::Boolean => "boolean",
            DataType::Integer => "bigint",
            DataType::Double => "double",
            DataType::Date => "date",
            DataType::Timestamp => "timestamp",
            DataType::String => "string",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name (from header, or `_c{index}`)
    pub name: String,
    pub data_type: DataType,
    /// Whether any null was seen in the column
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Ordered list of column fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Get column index by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Get field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
