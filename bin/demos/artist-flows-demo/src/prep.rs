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

//! Caller-side cleaning of the artists dataset before any edge building:
//! column selection, decade derivation from the birth year, removal of
//! rows the grouping cannot use, and gender normalisation.

use skein::{Column, ColumnData, DataFrame, DataType, Result};

pub const NATIONALITY: &str = "Nationality";
pub const GENDER: &str = "Gender";
pub const DECADE: &str = "Decade";
const BEGIN_DATE: &str = "BeginDate";

/// Full preparation pipeline for the raw Artists.json frame.
pub fn prepare_artists(raw: &DataFrame) -> Result<DataFrame> {
    let selected = raw.select(&[
        NATIONALITY.to_string(),
        GENDER.to_string(),
        BEGIN_DATE.to_string(),
    ])?;
    let with_decade = derive_decade(&selected, BEGIN_DATE, DECADE)?;
    let usable = drop_unusable_rows(&with_decade)?;
    lowercase_column(&usable, GENDER)
}

/// Buckets an integer year column into decade labels: 1895 becomes
/// "1890". The year column is dropped from the result. A year of 0 marks
/// a missing birth date in the source data and is bucketed as "0", which
/// `drop_unusable_rows` removes.
pub fn derive_decade(df: &DataFrame, year_column: &str, decade_column: &str) -> Result<DataFrame> {
    let years = df
        .get_column(year_column)
        .ok_or_else(|| skein::data_handler::DataHandlerError::ColumnNotFound(
            year_column.to_string(),
        ))?;
    let decades: Vec<Option<String>> = (0..df.row_count())
        .map(|i| years.to_i64(i).map(|year| ((year / 10) * 10).to_string()))
        .collect();
    let mut result = DataFrame::empty(&format!("{}_decades", df.metadata.name));
    for name in df.column_names() {
        if name == year_column {
            continue;
        }
        if let Some(column) = df.get_column(name) {
            result.add_column(name.clone(), column.clone())?;
        }
    }
    result.add_column(
        decade_column.to_string(),
        Column::from_strings(&decades, DataType::String)?,
    )?;
    Ok(result)
}

/// Drops rows the edge builder cannot group: null nationality or gender,
/// and the "0" decade standing in for an unknown birth year.
pub fn drop_unusable_rows(df: &DataFrame) -> Result<DataFrame> {
    let nationality = column(df, NATIONALITY)?;
    let gender = column(df, GENDER)?;
    let decade = column(df, DECADE)?;
    let filtered = df.filter(|i| {
        nationality.get_string(i).is_some()
            && gender.get_string(i).is_some()
            && decade.get_string(i).is_some_and(|d| d != "0")
    })?;
    Ok(filtered)
}

/// Replaces a string column with its lowercase form, leaving column order
/// untouched.
pub fn lowercase_column(df: &DataFrame, name: &str) -> Result<DataFrame> {
    let target = column(df, name)?;
    let lowered: Vec<Option<String>> = (0..df.row_count())
        .map(|i| target.get_string(i).map(|s| s.to_lowercase()))
        .collect();
    let mut result = DataFrame::empty(&df.metadata.name);
    for col_name in df.column_names() {
        if col_name == name {
            result.add_column(
                col_name.clone(),
                Column::from_strings(&lowered, DataType::String)?,
            )?;
        } else if let Some(col) = df.get_column(col_name) {
            result.add_column(col_name.clone(), col.clone())?;
        }
    }
    Ok(result)
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.get_column(name).ok_or_else(|| {
        skein::data_handler::DataHandlerError::ColumnNotFound(name.to_string()).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        let mut df = DataFrame::empty("artists");
        let nationalities = [Some("American"), Some("French"), None, Some("Japanese")];
        let genders = [Some("Male"), Some("Female"), Some("Male"), Some("MALE")];
        let years = [Some("1930"), Some("1895"), Some("1950"), Some("0")];
        df.add_column(
            NATIONALITY.to_string(),
            Column::from_strings(
                &nationalities.map(|v| v.map(String::from)),
                DataType::String,
            )
            .unwrap(),
        )
        .unwrap();
        df.add_column(
            GENDER.to_string(),
            Column::from_strings(&genders.map(|v| v.map(String::from)), DataType::String).unwrap(),
        )
        .unwrap();
        df.add_column(
            BEGIN_DATE.to_string(),
            Column::from_strings(&years.map(|v| v.map(String::from)), DataType::Int64).unwrap(),
        )
        .unwrap();
        df.add_column(
            "DisplayName".to_string(),
            Column::from_strings(&[None, None, None, None], DataType::String).unwrap(),
        )
        .unwrap();
        df
    }

    #[test]
    fn decade_is_year_floored_to_ten() {
        let df = raw_frame();
        let selected = df
            .select(&[
                NATIONALITY.to_string(),
                GENDER.to_string(),
                BEGIN_DATE.to_string(),
            ])
            .unwrap();
        let with_decade = derive_decade(&selected, BEGIN_DATE, DECADE).unwrap();
        let decade = with_decade.get_column(DECADE).unwrap();
        assert_eq!(decade.get_string(0).as_deref(), Some("1930"));
        assert_eq!(decade.get_string(1).as_deref(), Some("1890"));
        assert_eq!(decade.get_string(3).as_deref(), Some("0"));
        assert!(with_decade.get_column(BEGIN_DATE).is_none());
    }

    #[test]
    fn preparation_drops_null_and_zero_decade_rows_and_lowers_gender() {
        let df = raw_frame();
        let prepared = prepare_artists(&df).unwrap();
        // Row 2 (null nationality) and row 3 (decade 0) are gone.
        assert_eq!(prepared.row_count(), 2);
        let gender = prepared.get_column(GENDER).unwrap();
        assert_eq!(gender.get_string(0).as_deref(), Some("male"));
        assert_eq!(gender.get_string(1).as_deref(), Some("female"));
        // Extra columns were dropped by the selection.
        assert!(prepared.get_column("DisplayName").is_none());
    }

    #[test]
    fn missing_year_column_fails_fast() {
        let df = raw_frame();
        assert!(derive_decade(&df, "EndDate", DECADE).is_err());
    }
}
