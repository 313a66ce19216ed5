//! Sequential `BILL-NNN` numbering.

use super::errors::DomainError;

pub const BILL_PREFIX: &str = "BILL-";

/// Trailing run of ASCII digits, e.g. `INV-1712345` → `1712345`.
pub fn numeric_suffix(bill_no: &str) -> Option<u64> {
    let head = bill_no.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &bill_no[head.len()..];
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

pub fn format_bill_number(n: u64) -> String {
    format!("{BILL_PREFIX}{n:03}")
}

/// Read access to the stored bill numbers, as the numbering rule needs it.
pub trait BillNumberLedger {
    /// Bill number of the most recently created invoice.
    fn latest(&mut self) -> Result<Option<String>, DomainError>;
    fn is_taken(&mut self, bill_no: &str) -> Result<bool, DomainError>;
    fn all(&mut self) -> Result<Vec<String>, DomainError>;
}

/// Number to assign to the next invoice.
///
/// Continues from the suffix of the latest bill number. When that has no
/// usable suffix, or the number it leads to is already taken by an older
/// invoice, the highest suffix across all bill numbers wins instead. The
/// result is never a stored bill number.
pub fn next_bill_number<L>(ledger: &mut L) -> Result<String, DomainError>
where
    L: BillNumberLedger + ?Sized,
{
    let Some(latest) = ledger.latest()? else {
        return Ok(format_bill_number(1));
    };

    if let Some(n) = numeric_suffix(&latest).filter(|n| *n > 0) {
        let candidate = format_bill_number(n.saturating_add(1));
        if !ledger.is_taken(&candidate)? {
            return Ok(candidate);
        }
        log::debug!("{candidate} already used, numbering after the highest bill number");
    }

    let max = ledger
        .all()?
        .iter()
        .filter_map(|b| numeric_suffix(b))
        .max()
        .unwrap_or(0);
    Ok(format_bill_number(max.saturating_add(1)))
}
