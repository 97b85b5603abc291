// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::data_handler::column::ColumnBuilder;
use crate::data_handler::common::{
    DataHandlerError, DatasetId, DatasetMetadata, Result,
};
use crate::data_handler::dataframe::DataFrame;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
const MAX_FIELDS: usize = 10000;
const MAX_RECORDS: usize = 10_000_000;

/// Reads a JSON array of flat records into a [`DataFrame`].
///
/// Column order follows first appearance across the records; keys absent
/// from a record become nulls. Nested values are rejected.
#[derive(Debug)]
pub struct JsonReader {
    treat_empty_as_null: bool,
}
impl JsonReader {
    pub fn new() -> Self {
        Self {
            treat_empty_as_null: true,
        }
    }
    pub fn with_empty_as_null(mut self, enabled: bool) -> Self {
        self.treat_empty_as_null = enabled;
        self
    }
    pub fn read_file(&self, path: &Path, dataset_name: String) -> Result<DataFrame> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let root: Value = serde_json::from_reader(reader)
            .map_err(|e| DataHandlerError::JsonParseError(e.to_string()))?;
        let records = match root {
            Value::Array(records) => records,
            other => {
                return Err(DataHandlerError::JsonParseError(format!(
                    "Expected a top-level array of records, got {}",
                    json_type_name(&other)
                )))
            }
        };
        if records.len() > MAX_RECORDS {
            return Err(DataHandlerError::SizeLimit(format!(
                "Record count {} exceeds limit {MAX_RECORDS}",
                records.len()
            )));
        }
        let mut column_order: Vec<String> = Vec::new();
        let mut column_builders: HashMap<String, ColumnBuilder> = HashMap::new();
        for (record_num, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                DataHandlerError::JsonParseError(format!(
                    "Record {record_num}: expected an object, got {}",
                    json_type_name(record)
                ))
            })?;
            for key in object.keys() {
                if !column_builders.contains_key(key) {
                    if column_builders.len() >= MAX_FIELDS {
                        return Err(DataHandlerError::SizeLimit(format!(
                            "Field count exceeds limit {MAX_FIELDS}"
                        )));
                    }
                    let mut builder = ColumnBuilder::with_capacity(records.len());
                    for _ in 0..record_num {
                        builder.push(None)?;
                    }
                    column_order.push(key.clone());
                    column_builders.insert(key.clone(), builder);
                }
            }
            for name in &column_order {
                let builder = column_builders.get_mut(name).unwrap();
                let value = match object.get(name) {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => {
                        if self.treat_empty_as_null && s.trim().is_empty() {
                            None
                        } else {
                            Some(s.clone())
                        }
                    }
                    Some(Value::Number(n)) => Some(n.to_string()),
                    Some(Value::Bool(b)) => Some(b.to_string()),
                    Some(nested) => {
                        return Err(DataHandlerError::JsonParseError(format!(
                            "Record {record_num}, field '{name}': nested {} values are not supported",
                            json_type_name(nested)
                        )))
                    }
                };
                builder.push(value)?;
            }
        }
        let metadata = DatasetMetadata {
            id: DatasetId::new(),
            name: dataset_name,
            row_count: records.len(),
            column_count: column_order.len(),
            created_at: chrono::Utc::now(),
            source_path: Some(path.to_path_buf()),
        };
        let mut dataframe = DataFrame::new(metadata);
        for name in column_order {
            let column = column_builders.remove(&name).unwrap().build()?;
            dataframe.add_column(name, column)?;
        }
        tracing::debug!(
            rows = dataframe.row_count(),
            columns = dataframe.column_count(),
            path = %path.display(),
            "loaded JSON dataset"
        );
        Ok(dataframe)
    }
}
impl Default for JsonReader {
    fn default() -> Self {
        Self::new()
    }
}
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
#[derive(Debug)]
pub struct CsvWriter {
    delimiter: u8,
    quote_all: bool,
    quote_char: u8,
}
impl CsvWriter {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote_all: false,
            quote_char: b'"',
        }
    }
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
    pub fn with_quote_all(mut self, quote_all: bool) -> Self {
        self.quote_all = quote_all;
        self
    }
    pub fn write_file(&self, dataframe: &DataFrame, path: &Path) -> Result<()> {
        use crate::data_handler::column::ColumnData;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let delimiter_str = (self.delimiter as char).to_string();
        let header_line = dataframe.column_names().join(&delimiter_str);
        writeln!(writer, "{header_line}")?;
        for i in 0..dataframe.row_count() {
            let row_values: Vec<String> = dataframe
                .column_names()
                .iter()
                .map(|col_name| {
                    let value = dataframe
                        .get_column(col_name)
                        .and_then(|col| col.get_string(i))
                        .unwrap_or_default();
                    self.escape_field(&value)
                })
                .collect();
            writeln!(writer, "{}", row_values.join(&delimiter_str))?;
        }
        writer.flush()?;
        Ok(())
    }
    fn escape_field(&self, value: &str) -> String {
        let delimiter_char = self.delimiter as char;
        let quote_char = self.quote_char as char;
        if self.quote_all
            || value.contains(delimiter_char)
            || value.contains(quote_char)
            || value.contains('\n')
            || value.contains('\r')
        {
            let escaped = value.replace(quote_char, &format!("{quote_char}{quote_char}"));
            format!("{quote_char}{escaped}{quote_char}")
        } else {
            value.to_string()
        }
    }
}
impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}
