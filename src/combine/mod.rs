// src/combine/mod.rs
use anyhow::{bail, Context, Result};
use arrow::{
    array::{new_null_array, ArrayRef},
    compute::{cast, concat_batches},
    csv::WriterBuilder,
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use std::{fs::File, path::Path, sync::Arc};
use tracing::info;

/// Concatenate sample tables over the union of their columns.
///
/// Column sets need not align: a table missing one of the union's
/// columns contributes nulls there, and same-named columns whose
/// inferred types disagree across tables degrade to text. Rows keep
/// their per-table order, tables keep their argument order.
pub fn concat_tables(tables: &[RecordBatch]) -> Result<RecordBatch> {
    if tables.is_empty() {
        bail!("no sample tables to combine");
    }

    let schema = union_schema(tables);
    let aligned = tables
        .iter()
        .map(|t| align_to_schema(t, &schema))
        .collect::<Result<Vec<_>>>()?;
    concat_batches(&schema, &aligned).context("concatenating sample tables")
}

/// Union of all column sets, in first-seen order.
fn union_schema(tables: &[RecordBatch]) -> SchemaRef {
    let mut fields: Vec<Field> = Vec::new();
    for table in tables {
        for field in table.schema().fields() {
            match fields.iter_mut().find(|f| f.name() == field.name()) {
                Some(existing) => {
                    if existing.data_type() != field.data_type() {
                        *existing = Field::new(field.name(), DataType::Utf8, true);
                    }
                }
                None => fields.push(Field::new(field.name(), field.data_type().clone(), true)),
            }
        }
    }
    Arc::new(Schema::new(fields))
}

fn align_to_schema(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    for field in schema.fields() {
        match batch.schema().index_of(field.name()) {
            Ok(i) => {
                let column = batch.column(i);
                if column.data_type() == field.data_type() {
                    columns.push(column.clone());
                } else {
                    let casted = cast(column, field.data_type()).with_context(|| {
                        format!("casting column {} for concatenation", field.name())
                    })?;
                    columns.push(casted);
                }
            }
            Err(_) => columns.push(new_null_array(field.data_type(), batch.num_rows())),
        }
    }
    RecordBatch::try_new(schema.clone(), columns).context("aligning table to combined schema")
}

/// Write the combined table as CSV, overwriting any existing file at
/// `path`. The header row is the union of columns; nulls come out as
/// empty fields; no row-index column is written. The destination
/// directory must already exist.
pub fn write_csv<P: AsRef<Path>>(batch: &RecordBatch, path: P) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;

    let mut writer = WriterBuilder::new().with_header(true).build(file);
    writer
        .write(batch)
        .with_context(|| format!("writing combined table to {}", path.display()))?;

    info!(path = %path.display(), rows = batch.num_rows(), "wrote combined CSV");
    Ok(())
}
