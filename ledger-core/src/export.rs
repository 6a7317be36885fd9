//! CSV export of the wallet log

use crate::types::WalletTransaction;
use crate::Result;
use canteen_model::BusinessCalendar;
use std::io;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write wallet log entries as CSV
///
/// Columns: `date_time, type, amount, description, order_id`. Timestamps are
/// rendered in the business timezone; entries keep the order given.
pub fn write_transactions_csv<W: io::Write>(
    writer: W,
    transactions: &[WalletTransaction],
    calendar: &BusinessCalendar,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["date_time", "type", "amount", "description", "order_id"])?;

    for txn in transactions {
        let local = calendar.local(txn.created_at);
        csv.write_record([
            local.format(DATE_FORMAT).to_string(),
            txn.kind.as_str().to_string(),
            txn.amount.to_string(),
            txn.description.clone(),
            txn.order_id.clone().unwrap_or_default(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
