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

pub mod common;
pub mod column;
pub mod dataframe;
pub mod transformation;
pub mod io;
pub use common::{ColumnMetadata, DataHandlerError, DataType, DatasetId, DatasetMetadata, Result};
pub use column::{Column, ColumnBuilder, ColumnData};
pub use dataframe::{DataFrame, DataFrameView};
pub use io::{CsvWriter, JsonReader};
pub use transformation::{GroupCount, TransformationEngine};
pub fn load_json<P: AsRef<std::path::Path>>(path: P, name: String) -> Result<DataFrame> {
    let reader = JsonReader::new();
    reader.read_file(path.as_ref(), name)
}
pub fn export_csv<P: AsRef<std::path::Path>>(dataframe: &DataFrame, path: P) -> Result<()> {
    let writer = CsvWriter::new();
    writer.write_file(dataframe, path.as_ref())
}
