//! CSV reading and writing for reference tables

use crate::error::{Error, Result};
use crate::reconcile::RecordKind;
use crate::table::Table;

fn csv_error<K: RecordKind>(source: csv::Error) -> Error {
    Error::Csv {
        table: K::FILE_NAME.to_string(),
        source,
    }
}

/// Parse CSV bytes into a table
///
/// Columns are matched by header name. A key appearing twice is an error,
/// since tables are written key-unique.
pub fn parse_table<K: RecordKind>(content: &[u8]) -> Result<Table<K>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content);

    let mut table: Table<K> = Table::new();
    for result in csv_reader.deserialize::<K::Row>() {
        let row = result.map_err(csv_error::<K>)?;
        let (key, record) = K::split_row(row);

        if table.contains_key(&key) {
            return Err(Error::DuplicateKey {
                table: K::FILE_NAME.to_string(),
                key: key.to_string(),
            });
        }
        table.insert(key, record);
    }

    Ok(table)
}

/// Render a table as CSV with its fixed header
pub fn write_table<K: RecordKind>(table: &Table<K>) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(K::HEADER).map_err(csv_error::<K>)?;
    for row in table.to_rows() {
        writer.serialize(row).map_err(csv_error::<K>)?;
    }

    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}
