//! Archive of pool operations
//!
//! One column per `OperationStat` field plus the two asset symbols, declared
//! up front. Re-archiving the same window is harmless: rows are keyed by
//! `(pool_tx_hash, wallet_tx_hash, operation_type)` and duplicates are skipped.

use super::{open_file, open_memory, DatabaseError};
use crate::apis::stonfi::Operation;
use crate::logger::{self, LogTag};
use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS operations (
        pool_tx_hash TEXT NOT NULL,
        wallet_tx_hash TEXT NOT NULL,
        operation_type TEXT NOT NULL,
        pool_address TEXT NOT NULL,
        router_address TEXT NOT NULL,
        wallet_address TEXT NOT NULL,
        destination_wallet_address TEXT NOT NULL,
        asset0_address TEXT NOT NULL,
        asset0_symbol TEXT NOT NULL,
        asset0_amount TEXT NOT NULL,
        asset0_delta TEXT NOT NULL,
        asset0_reserve TEXT NOT NULL,
        asset1_address TEXT NOT NULL,
        asset1_symbol TEXT NOT NULL,
        asset1_amount TEXT NOT NULL,
        asset1_delta TEXT NOT NULL,
        asset1_reserve TEXT NOT NULL,
        exit_code TEXT NOT NULL,
        success INTEGER NOT NULL,
        fee_asset_address TEXT,
        lp_fee_amount TEXT NOT NULL,
        lp_token_delta TEXT NOT NULL,
        lp_token_supply TEXT NOT NULL,
        protocol_fee_amount TEXT NOT NULL,
        referral_address TEXT,
        referral_fee_amount TEXT NOT NULL,
        pool_tx_lt INTEGER NOT NULL,
        pool_tx_timestamp TEXT NOT NULL,
        wallet_tx_lt INTEGER NOT NULL,
        wallet_tx_timestamp TEXT NOT NULL,
        PRIMARY KEY (pool_tx_hash, wallet_tx_hash, operation_type)
    );

    CREATE INDEX IF NOT EXISTS idx_operations_wallet
        ON operations(wallet_address, pool_tx_timestamp);
";

const COLUMNS: &str = "pool_tx_hash, wallet_tx_hash, operation_type, pool_address, router_address,
    wallet_address, destination_wallet_address,
    asset0_address, asset0_symbol, asset0_amount, asset0_delta, asset0_reserve,
    asset1_address, asset1_symbol, asset1_amount, asset1_delta, asset1_reserve,
    exit_code, success, fee_asset_address, lp_fee_amount, lp_token_delta, lp_token_supply,
    protocol_fee_amount, referral_address, referral_fee_amount,
    pool_tx_lt, pool_tx_timestamp, wallet_tx_lt, wallet_tx_timestamp";

/// A flattened operation row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedOperation {
    pub pool_tx_hash: String,
    pub wallet_tx_hash: String,
    pub operation_type: String,
    pub pool_address: String,
    pub router_address: String,
    pub wallet_address: String,
    pub destination_wallet_address: String,
    pub asset0_address: String,
    pub asset0_symbol: String,
    pub asset0_amount: String,
    pub asset0_delta: String,
    pub asset0_reserve: String,
    pub asset1_address: String,
    pub asset1_symbol: String,
    pub asset1_amount: String,
    pub asset1_delta: String,
    pub asset1_reserve: String,
    pub exit_code: String,
    pub success: bool,
    pub fee_asset_address: Option<String>,
    pub lp_fee_amount: String,
    pub lp_token_delta: String,
    pub lp_token_supply: String,
    pub protocol_fee_amount: String,
    pub referral_address: Option<String>,
    pub referral_fee_amount: String,
    pub pool_tx_lt: i64,
    pub pool_tx_timestamp: String,
    pub wallet_tx_lt: i64,
    pub wallet_tx_timestamp: String,
}

impl From<&Operation> for ArchivedOperation {
    fn from(op: &Operation) -> Self {
        let stat = &op.operation;
        Self {
            pool_tx_hash: stat.pool_tx_hash.clone(),
            wallet_tx_hash: stat.wallet_tx_hash.clone(),
            operation_type: stat.operation_type.clone(),
            pool_address: stat.pool_address.clone(),
            router_address: stat.router_address.clone(),
            wallet_address: stat.wallet_address.clone(),
            destination_wallet_address: stat.destination_wallet_address.clone(),
            asset0_address: stat.asset0_address.clone(),
            asset0_symbol: op.asset0_info.symbol.clone(),
            asset0_amount: stat.asset0_amount.clone(),
            asset0_delta: stat.asset0_delta.clone(),
            asset0_reserve: stat.asset0_reserve.clone(),
            asset1_address: stat.asset1_address.clone(),
            asset1_symbol: op.asset1_info.symbol.clone(),
            asset1_amount: stat.asset1_amount.clone(),
            asset1_delta: stat.asset1_delta.clone(),
            asset1_reserve: stat.asset1_reserve.clone(),
            exit_code: stat.exit_code.clone(),
            success: stat.success,
            fee_asset_address: stat.fee_asset_address.clone(),
            lp_fee_amount: stat.lp_fee_amount.clone(),
            lp_token_delta: stat.lp_token_delta.clone(),
            lp_token_supply: stat.lp_token_supply.clone(),
            protocol_fee_amount: stat.protocol_fee_amount.clone(),
            referral_address: stat.referral_address.clone(),
            referral_fee_amount: stat.referral_fee_amount.clone(),
            pool_tx_lt: stat.pool_tx_lt,
            pool_tx_timestamp: stat.pool_tx_timestamp.clone(),
            wallet_tx_lt: stat.wallet_tx_lt,
            wallet_tx_timestamp: stat.wallet_tx_timestamp.clone(),
        }
    }
}

impl ArchivedOperation {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            pool_tx_hash: row.get(0)?,
            wallet_tx_hash: row.get(1)?,
            operation_type: row.get(2)?,
            pool_address: row.get(3)?,
            router_address: row.get(4)?,
            wallet_address: row.get(5)?,
            destination_wallet_address: row.get(6)?,
            asset0_address: row.get(7)?,
            asset0_symbol: row.get(8)?,
            asset0_amount: row.get(9)?,
            asset0_delta: row.get(10)?,
            asset0_reserve: row.get(11)?,
            asset1_address: row.get(12)?,
            asset1_symbol: row.get(13)?,
            asset1_amount: row.get(14)?,
            asset1_delta: row.get(15)?,
            asset1_reserve: row.get(16)?,
            exit_code: row.get(17)?,
            success: row.get(18)?,
            fee_asset_address: row.get(19)?,
            lp_fee_amount: row.get(20)?,
            lp_token_delta: row.get(21)?,
            lp_token_supply: row.get(22)?,
            protocol_fee_amount: row.get(23)?,
            referral_address: row.get(24)?,
            referral_fee_amount: row.get(25)?,
            pool_tx_lt: row.get(26)?,
            pool_tx_timestamp: row.get(27)?,
            wallet_tx_lt: row.get(28)?,
            wallet_tx_timestamp: row.get(29)?,
        })
    }
}

pub struct OperationsArchive {
    conn: Mutex<Connection>,
}

impl OperationsArchive {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        Self::with_connection(open_file(path.as_ref())?)
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::with_connection(open_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert in one transaction; returns how many rows were new
    pub fn save_operations(&self, operations: &[Operation]) -> Result<usize, DatabaseError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let sql = format!(
                "INSERT OR IGNORE INTO operations ({}) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20,
                    ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30)",
                COLUMNS
            );
            let mut stmt = tx.prepare(&sql)?;
            for op in operations {
                let row = ArchivedOperation::from(op);
                inserted += stmt.execute(params![
                    row.pool_tx_hash,
                    row.wallet_tx_hash,
                    row.operation_type,
                    row.pool_address,
                    row.router_address,
                    row.wallet_address,
                    row.destination_wallet_address,
                    row.asset0_address,
                    row.asset0_symbol,
                    row.asset0_amount,
                    row.asset0_delta,
                    row.asset0_reserve,
                    row.asset1_address,
                    row.asset1_symbol,
                    row.asset1_amount,
                    row.asset1_delta,
                    row.asset1_reserve,
                    row.exit_code,
                    row.success,
                    row.fee_asset_address,
                    row.lp_fee_amount,
                    row.lp_token_delta,
                    row.lp_token_supply,
                    row.protocol_fee_amount,
                    row.referral_address,
                    row.referral_fee_amount,
                    row.pool_tx_lt,
                    row.pool_tx_timestamp,
                    row.wallet_tx_lt,
                    row.wallet_tx_timestamp,
                ])?;
            }
        }
        tx.commit()?;

        logger::debug(
            LogTag::Database,
            &format!(
                "Archived {} new operation(s) out of {}",
                inserted,
                operations.len()
            ),
        );
        Ok(inserted)
    }

    pub fn count(&self) -> Result<u64, DatabaseError> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM operations", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Oldest first
    pub fn list_for_wallet(&self, wallet: &str) -> Result<Vec<ArchivedOperation>, DatabaseError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM operations WHERE wallet_address = ?1
             ORDER BY pool_tx_timestamp, pool_tx_lt",
            COLUMNS
        ))?;
        let rows = stmt.query_map(params![wallet], ArchivedOperation::from_row)?;
        let operations = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(operations)
    }
}
