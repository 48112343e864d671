//! Object key layout for archived ledger files
//!
//! Ledgers are grouped into files of `ledgers_per_file` consecutive sequence
//! numbers, and files are optionally grouped into partition directories of
//! `files_per_partition` files each:
//!
//! - flat: `{file_start}-{file_end}{ext}` (or `{seq}{ext}` for one ledger per file)
//! - partitioned: `{partition_start}-{partition_end}/{file_start}-{file_end}{ext}`
//!
//! ```
//! use ledgerstore::schema::derive_key;
//!
//! let key = derive_key(200, 64, 10, ".xdr.gz").unwrap();
//! assert_eq!(key, "0-639/192-255.xdr.gz");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Invalid ledgers per file ({0}): must be at least 1")]
    InvalidLedgersPerFile(u32),

    #[error(
        "Partition too large: {ledgers_per_file} ledgers per file x {files_per_partition} files does not fit in u32"
    )]
    PartitionTooLarge {
        ledgers_per_file: u32,
        files_per_partition: u32,
    },
}

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Derive the object key for the file holding `sequence`.
pub fn derive_key(
    sequence: u32,
    ledgers_per_file: u32,
    files_per_partition: u32,
    file_suffix: &str,
) -> Result<String> {
    let mut key = String::new();

    if let Some(partition_size) = partition_size(ledgers_per_file, files_per_partition)? {
        let partition_start = (sequence / partition_size) * partition_size;
        let partition_end = partition_start + partition_size - 1;
        key.push_str(&format!("{}-{}/", partition_start, partition_end));
    }

    let file_start = (sequence / ledgers_per_file) * ledgers_per_file;
    let file_end = file_start + ledgers_per_file - 1;
    key.push_str(&file_start.to_string());

    if file_start != file_end {
        key.push_str(&format!("-{}", file_end));
    }
    key.push_str(file_suffix);

    Ok(key)
}

/// Ledgers per partition directory, `None` for a flat layout
fn partition_size(ledgers_per_file: u32, files_per_partition: u32) -> Result<Option<u32>> {
    if ledgers_per_file < 1 {
        return Err(SchemaError::InvalidLedgersPerFile(ledgers_per_file));
    }

    // 0 and 1 both mean a flat layout
    if files_per_partition <= 1 {
        return Ok(None);
    }

    ledgers_per_file
        .checked_mul(files_per_partition)
        .map(Some)
        .ok_or(SchemaError::PartitionTooLarge {
            ledgers_per_file,
            files_per_partition,
        })
}

/// Partitioning parameters for one archive
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DataStoreSchema {
    #[serde(default = "default_ledgers_per_file")]
    pub ledgers_per_file: u32,
    #[serde(default = "default_files_per_partition")]
    pub files_per_partition: u32,
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl Default for DataStoreSchema {
    fn default() -> Self {
        Self {
            ledgers_per_file: default_ledgers_per_file(),
            files_per_partition: default_files_per_partition(),
            file_extension: default_file_extension(),
        }
    }
}

fn default_ledgers_per_file() -> u32 {
    64
}

fn default_files_per_partition() -> u32 {
    10
}

fn default_file_extension() -> String {
    ".xdr.gz".to_string()
}

impl DataStoreSchema {
    pub fn validate(&self) -> Result<()> {
        partition_size(self.ledgers_per_file, self.files_per_partition)?;
        Ok(())
    }

    /// Object key of the file containing `sequence`
    pub fn object_key(&self, sequence: u32) -> Result<String> {
        derive_key(
            sequence,
            self.ledgers_per_file,
            self.files_per_partition,
            &self.file_extension,
        )
    }

    /// First sequence number stored in the same file as `sequence`
    pub fn file_start_boundary(&self, sequence: u32) -> Result<u32> {
        self.validate()?;
        Ok((sequence / self.ledgers_per_file) * self.ledgers_per_file)
    }

    /// Last sequence number stored in the same file as `sequence`
    pub fn file_end_boundary(&self, sequence: u32) -> Result<u32> {
        Ok(self.file_start_boundary(sequence)? + self.ledgers_per_file - 1)
    }
}
