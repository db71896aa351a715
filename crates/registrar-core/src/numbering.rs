//! Proforma numbering: `PROF-<YYYYMMDD>-<NNNN>`.
//!
//! The sequence is derived by counting the proformas already issued under
//! today's prefix and adding one. It is not a reserved counter; the store's
//! UNIQUE constraint on the number is what rejects a same-day collision.

use chrono::NaiveDate;

use crate::proforma::ProformaNumber;

pub const NUMBER_PREFIX: &str = "PROF";

/// The prefix shared by every number issued on `date`, e.g. `PROF-20240601-`.
pub fn day_prefix(date: NaiveDate) -> String {
  format!("{NUMBER_PREFIX}-{}-", date.format("%Y%m%d"))
}

/// The number following `issued_today` existing proformas on `date`.
pub fn next_number(date: NaiveDate, issued_today: u64) -> ProformaNumber {
  ProformaNumber::from(format!("{}{:04}", day_prefix(date), issued_today + 1))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn june_first() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() }

  #[test]
  fn prefix_is_date_partitioned() {
    assert_eq!(day_prefix(june_first()), "PROF-20240601-");
  }

  #[test]
  fn first_number_of_the_day() {
    assert_eq!(next_number(june_first(), 0).as_str(), "PROF-20240601-0001");
  }

  #[test]
  fn sequence_is_zero_padded() {
    assert_eq!(next_number(june_first(), 41).as_str(), "PROF-20240601-0042");
  }

  #[test]
  fn sequence_widens_past_four_digits() {
    assert_eq!(next_number(june_first(), 9999).as_str(), "PROF-20240601-10000");
  }
}
