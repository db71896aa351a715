//! Course price table.
//!
//! Loaded once at startup and handed to the [`crate::Registrar`]; nothing
//! reads prices from ambient state.

use std::collections::HashMap;

use rust_decimal::Decimal;

/// Maps a course name to the price of a proforma for that course.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
  prices: HashMap<String, Decimal>,
}

impl PriceTable {
  /// An empty table; every course prices at zero.
  pub fn empty() -> Self { Self { prices: HashMap::new() } }

  pub fn with_price(mut self, course: impl Into<String>, price: Decimal) -> Self {
    self.prices.insert(course.into(), money(price));
    self
  }

  /// Price for `course`. An unknown course is not an error; it costs 0.00.
  pub fn price_for(&self, course: &str) -> Decimal {
    self.prices.get(course).copied().unwrap_or_else(|| money(Decimal::ZERO))
  }

  pub fn len(&self) -> usize { self.prices.len() }

  pub fn is_empty(&self) -> bool { self.prices.is_empty() }
}

impl Default for PriceTable {
  fn default() -> Self {
    Self::empty()
      .with_price("Primer Curso", Decimal::new(30000, 2))
      .with_price("Segundo Curso", Decimal::new(34000, 2))
      .with_price("Tercer Curso", Decimal::new(45000, 2))
  }
}

impl<K: Into<String>> FromIterator<(K, Decimal)> for PriceTable {
  fn from_iter<I: IntoIterator<Item = (K, Decimal)>>(iter: I) -> Self {
    iter
      .into_iter()
      .fold(Self::empty(), |table, (course, price)| table.with_price(course, price))
  }
}

/// Normalise to two decimal places.
fn money(mut amount: Decimal) -> Decimal {
  amount.rescale(2);
  amount
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_table_prices() {
    let table = PriceTable::default();
    assert_eq!(table.price_for("Primer Curso").to_string(), "300.00");
    assert_eq!(table.price_for("Segundo Curso").to_string(), "340.00");
    assert_eq!(table.price_for("Tercer Curso").to_string(), "450.00");
  }

  #[test]
  fn unknown_course_is_free() {
    assert_eq!(PriceTable::default().price_for("Cuarto Curso").to_string(), "0.00");
  }

  #[test]
  fn collected_prices_are_rescaled() {
    let table: PriceTable = [("Taller", Decimal::new(125, 0))].into_iter().collect();
    assert_eq!(table.len(), 1);
    assert_eq!(table.price_for("Taller").to_string(), "125.00");
  }
}
