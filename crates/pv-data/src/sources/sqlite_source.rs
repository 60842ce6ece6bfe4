//! SQLite data source implementation

use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{
    ArrayBuilder, ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use rusqlite::{types::ValueRef, Connection};

use crate::config::StoreConfig;
use crate::DataError;

/// SQLite-backed record store
pub struct SqliteSource {
    path: PathBuf,
    table_name: String,
    schema: Arc<Schema>,
    row_count: usize,
}

impl SqliteSource {
    /// Open the store a configuration points at and detect its schema.
    pub async fn connect(config: &StoreConfig) -> Result<Self, DataError> {
        Self::open(config.database_path(), config.collection.clone()).await
    }

    /// Open a database file directly.
    pub async fn open(path: PathBuf, table_name: String) -> Result<Self, DataError> {
        if !path.is_file() {
            return Err(DataError::Sqlite(format!(
                "database file {} does not exist",
                path.display()
            )));
        }

        let conn = Connection::open(&path)
            .map_err(|e| DataError::Sqlite(format!("failed to open database: {}", e)))?;

        let schema = Self::detect_schema(&conn, &table_name)?;
        let row_count = Self::count_rows(&conn, &table_name)?;

        tracing::info!(
            "opened {} table '{}' ({} rows, {} columns)",
            path.display(),
            table_name,
            row_count,
            schema.fields().len()
        );

        Ok(Self {
            path,
            table_name,
            schema: Arc::new(schema),
            row_count,
        })
    }

    /// Detect schema from the table
    fn detect_schema(conn: &Connection, table_name: &str) -> Result<Schema, DataError> {
        let query = format!("PRAGMA table_info({})", table_name);
        let mut stmt = conn
            .prepare(&query)
            .map_err(|e| DataError::Sqlite(format!("failed to get table info: {}", e)))?;

        let mut fields = Vec::new();
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(1)?,   // column name
                    row.get::<_, String>(2)?,   // data type
                    row.get::<_, i32>(3)? == 0, // nullable
                ))
            })
            .map_err(|e| DataError::Sqlite(format!("failed to query table info: {}", e)))?;

        for row_result in rows {
            let (name, sqlite_type, nullable) = row_result
                .map_err(|e| DataError::Sqlite(format!("failed to read column info: {}", e)))?;

            let arrow_type = match sqlite_type.to_uppercase().as_str() {
                "INTEGER" => DataType::Int64,
                "REAL" | "FLOAT" | "DOUBLE" => DataType::Float64,
                "TEXT" | "VARCHAR" => DataType::Utf8,
                "BOOLEAN" => DataType::Boolean,
                _ => DataType::Utf8, // Default to string
            };

            fields.push(Field::new(&name, arrow_type, nullable));
        }

        if fields.is_empty() {
            return Err(DataError::Sqlite(format!(
                "table '{}' does not exist or has no columns",
                table_name
            )));
        }

        Ok(Schema::new(fields))
    }

    /// Count rows in the table
    fn count_rows(conn: &Connection, table_name: &str) -> Result<usize, DataError> {
        let query = format!("SELECT COUNT(*) FROM {}", table_name);
        let count: i64 = conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| DataError::Sqlite(format!("failed to count rows: {}", e)))?;
        Ok(count as usize)
    }

    /// Materialize the whole table as one batch.
    fn query_all(&self) -> Result<RecordBatch, DataError> {
        let conn = Connection::open(&self.path)
            .map_err(|e| DataError::Sqlite(format!("failed to open database: {}", e)))?;

        let query = format!("SELECT * FROM {}", self.table_name);
        let mut stmt = conn
            .prepare(&query)
            .map_err(|e| DataError::Sqlite(format!("failed to prepare query: {}", e)))?;

        // Initialize column builders
        let mut builders: Vec<Box<dyn ArrayBuilder>> = self
            .schema
            .fields()
            .iter()
            .map(|field| match field.data_type() {
                DataType::Int64 => Box::new(Int64Builder::new()) as Box<dyn ArrayBuilder>,
                DataType::Float64 => Box::new(Float64Builder::new()) as Box<dyn ArrayBuilder>,
                DataType::Boolean => Box::new(BooleanBuilder::new()) as Box<dyn ArrayBuilder>,
                _ => Box::new(StringBuilder::new()) as Box<dyn ArrayBuilder>,
            })
            .collect();

        let mut rows = stmt
            .query([])
            .map_err(|e| DataError::Sqlite(format!("failed to execute query: {}", e)))?;

        while let Some(row) = rows
            .next()
            .map_err(|e| DataError::Sqlite(format!("failed to fetch row: {}", e)))?
        {
            for (col_idx, field) in self.schema.fields().iter().enumerate() {
                let value = row
                    .get_ref(col_idx)
                    .map_err(|e| DataError::Sqlite(format!("failed to get column value: {}", e)))?;

                match (field.data_type(), &mut builders[col_idx]) {
                    (DataType::Int64, builder) => {
                        let builder = builder.as_any_mut().downcast_mut::<Int64Builder>().unwrap();
                        match value {
                            ValueRef::Integer(i) => builder.append_value(i),
                            _ => builder.append_null(),
                        }
                    }
                    (DataType::Float64, builder) => {
                        let builder = builder
                            .as_any_mut()
                            .downcast_mut::<Float64Builder>()
                            .unwrap();
                        match value {
                            ValueRef::Real(f) => builder.append_value(f),
                            ValueRef::Integer(i) => builder.append_value(i as f64),
                            _ => builder.append_null(),
                        }
                    }
                    (DataType::Boolean, builder) => {
                        let builder = builder
                            .as_any_mut()
                            .downcast_mut::<BooleanBuilder>()
                            .unwrap();
                        match value {
                            ValueRef::Integer(i) => builder.append_value(i != 0),
                            _ => builder.append_null(),
                        }
                    }
                    (_, builder) => {
                        let builder = builder.as_any_mut().downcast_mut::<StringBuilder>().unwrap();
                        match value {
                            ValueRef::Text(s) => {
                                let text = std::str::from_utf8(s).unwrap_or("");
                                builder.append_value(text);
                            }
                            ValueRef::Integer(i) => builder.append_value(i.to_string()),
                            ValueRef::Real(f) => builder.append_value(f.to_string()),
                            _ => builder.append_null(),
                        }
                    }
                }
            }
        }

        let arrays: Vec<ArrayRef> = builders
            .into_iter()
            .map(|mut builder| builder.finish())
            .collect();

        RecordBatch::try_new(self.schema.clone(), arrays).map_err(DataError::Arrow)
    }

    /// Total rows detected at connect time.
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

#[async_trait]
impl pv_core::data::DataSource for SqliteSource {
    async fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }

    async fn fetch_all(&self) -> anyhow::Result<RecordBatch> {
        self.query_all().map_err(|e| e.into())
    }

    fn source_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_projection_schema;
    use arrow::array::Array;
    use pv_core::data::DataSource;

    fn seeded_db(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pcaviz_{}_{}.db",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE pca_records (
                id INTEGER PRIMARY KEY,
                Xpca REAL,
                Ypca REAL,
                label TEXT
            );
            INSERT INTO pca_records (Xpca, Ypca, label) VALUES
                (0.5, -1.5, 'alpha'),
                (2.0, 3.0, 'beta'),
                (NULL, 1.0, 'gamma');",
        )
        .unwrap();

        path
    }

    #[tokio::test]
    async fn round_trips_a_seeded_table() {
        let path = seeded_db("roundtrip");
        let source = SqliteSource::open(path.clone(), "pca_records".to_string())
            .await
            .unwrap();

        assert_eq!(source.row_count(), 3);

        let batch = source.fetch_all().await.unwrap();
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.num_columns(), 4);
        validate_projection_schema(&batch).unwrap();

        let x = batch
            .column_by_name("Xpca")
            .unwrap()
            .as_any()
            .downcast_ref::<arrow::array::Float64Array>()
            .unwrap();
        assert_eq!(x.value(0), 0.5);
        assert!(x.is_null(2));

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_file_is_a_store_error() {
        let path = std::env::temp_dir().join("pcaviz_does_not_exist.db");
        let result = SqliteSource::open(path, "pca_records".to_string()).await;
        assert!(matches!(result, Err(DataError::Sqlite(_))));
    }

    #[tokio::test]
    async fn missing_table_is_a_store_error() {
        let path = seeded_db("missing_table");
        let result = SqliteSource::open(path.clone(), "no_such_table".to_string()).await;
        assert!(matches!(result, Err(DataError::Sqlite(_))));
        let _ = std::fs::remove_file(&path);
    }
}
