//! Entity models for the ledger
//!
//! Each entity fixes its on-disk field order in its [`Record`] impl; the
//! store handles everything else. Ids are store-local and assigned on `add`;
//! the guid is stable across exports and cross-file links.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;
use crate::storage::{
    DecodeError, EncodeError, Migration, MigrationError, RawRecord, Record, RecordReader,
    RecordWriter,
};

/// Globally unique, stable identifier for a new entity
pub fn generate_guid() -> String {
    Uuid::new_v4().to_string()
}

/// Money owed to or by someone
///
/// On disk: `id:state:guid:creation_date:direction:name:amount:title`.
/// The `title` field was added in file version 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: u64,
    pub state: i32,
    pub guid: String,
    pub creation_date: NaiveDate,
    /// true when the money is owed to us, false when we owe it
    pub direction: bool,
    pub name: String,
    pub amount: Money,
    pub title: String,
}

impl Debt {
    /// New open debt, stamped with a fresh guid and today's date
    pub fn new(direction: bool, name: impl Into<String>, amount: Money) -> Self {
        Self {
            id: 0,
            state: 0,
            guid: generate_guid(),
            creation_date: Local::now().date_naive(),
            direction,
            name: name.into(),
            amount,
            title: String::new(),
        }
    }
}

impl Record for Debt {
    const FILE_VERSION: u32 = 4;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn write_fields(&self, writer: &mut RecordWriter) -> Result<(), EncodeError> {
        writer
            .write(&self.id)?
            .write(&self.state)?
            .write(&self.guid)?
            .write(&self.creation_date)?
            .write(&self.direction)?
            .write(&self.name)?
            .write(&self.amount)?
            .write(&self.title)?;
        Ok(())
    }

    fn read_fields(reader: &mut RecordReader) -> Result<Self, DecodeError> {
        Ok(Self {
            id: reader.read()?,
            state: reader.read()?,
            guid: reader.read()?,
            creation_date: reader.read()?,
            direction: reader.read()?,
            name: reader.read()?,
            amount: reader.read()?,
            title: reader.read()?,
        })
    }

    fn migrations() -> &'static [Migration] {
        const STEPS: &[Migration] = &[Migration {
            from: 3,
            run: migrate_debts_3_to_4,
        }];
        STEPS
    }
}

/// Version 3 debts had no title; default it to the empty string
fn migrate_debts_3_to_4(records: Vec<RawRecord>) -> Result<Vec<RawRecord>, MigrationError> {
    records
        .into_iter()
        .map(|mut record| {
            if record.len() != 7 {
                return Err(MigrationError::Step {
                    from: 3,
                    reason: format!("expected 7 fields, found {}", record.len()),
                });
            }
            record.push(String::new());
            Ok(record)
        })
        .collect()
}

/// A savings or spending objective
///
/// On disk: `id:guid:name:kind:source:op:amount:date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: u64,
    pub guid: String,
    pub name: String,
    /// `"monthly"` or `"yearly"`
    pub kind: String,
    /// Which figure the objective is measured against
    pub source: String,
    /// `"min"` or `"max"`
    pub op: String,
    pub amount: Money,
    pub date: NaiveDate,
}

impl Objective {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        source: impl Into<String>,
        op: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            id: 0,
            guid: generate_guid(),
            name: name.into(),
            kind: kind.into(),
            source: source.into(),
            op: op.into(),
            amount,
            date: Local::now().date_naive(),
        }
    }
}

impl Record for Objective {
    const FILE_VERSION: u32 = 1;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn write_fields(&self, writer: &mut RecordWriter) -> Result<(), EncodeError> {
        writer
            .write(&self.id)?
            .write(&self.guid)?
            .write(&self.name)?
            .write(&self.kind)?
            .write(&self.source)?
            .write(&self.op)?
            .write(&self.amount)?
            .write(&self.date)?;
        Ok(())
    }

    fn read_fields(reader: &mut RecordReader) -> Result<Self, DecodeError> {
        Ok(Self {
            id: reader.read()?,
            guid: reader.read()?,
            name: reader.read()?,
            kind: reader.read()?,
            source: reader.read()?,
            op: reader.read()?,
            amount: reader.read()?,
            date: reader.read()?,
        })
    }
}
