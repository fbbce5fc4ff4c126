//! # Dashboard Queries
//!
//! The home dashboard rollups: monthly sales series, top-customer and
//! top-product rankings, and the receivables headline totals.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::debug;

use facture_core::money::Amount;

use crate::error::DbResult;
use crate::row::parse_amount;

use super::stages::load_invoice_financials;
use super::{MonthlySales, RankedSales, ReceivableTotals, ReportQueries, OTHERS_LABEL, RANKING_SIZE};

/// Months shown in the sales series when the caller doesn't say
/// (current month plus the two before).
pub const SALES_SERIES_MONTHS: u32 = 3;

impl ReportQueries {
    /// Pre-tax sales per calendar month, ending at the month containing
    /// `now`, oldest first. `months` is the series length; `None` means
    /// [`SALES_SERIES_MONTHS`].
    ///
    /// An invoice counts toward the month it was *issued* in, whether or
    /// not it has been paid. Months with no invoices report zero.
    pub async fn monthly_sales(
        &self,
        currency: &str,
        months: Option<u32>,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<MonthlySales>> {
        let invoices = load_invoice_financials(&self.pool).await?;
        let months = months.unwrap_or(SALES_SERIES_MONTHS);

        let mut series: Vec<(NaiveDate, MonthlySales)> = Vec::new();
        for offset in (0..months).rev() {
            let month = month_start(now)
                .checked_sub_months(Months::new(offset))
                .unwrap_or_else(|| month_start(now));
            series.push((
                month,
                MonthlySales {
                    label: month.format("%b").to_string(),
                    total: Amount::zero(),
                },
            ));
        }

        for invoice in invoices.iter().filter(|i| i.currency == currency) {
            let issued = invoice.date_issued.date_naive();
            for (month, entry) in series.iter_mut() {
                if issued.year() == month.year() && issued.month() == month.month() {
                    entry.total += invoice.sales_total();
                }
            }
        }

        debug!(currency, months = series.len(), "Monthly sales computed");
        Ok(series.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Top customers by pre-tax sales, ties included, remainder as
    /// "Others".
    pub async fn sales_by_customer(&self, currency: &str) -> DbResult<Vec<RankedSales>> {
        let invoices = load_invoice_financials(&self.pool).await?;

        let mut groups: Vec<RankedSales> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for invoice in invoices.iter().filter(|i| i.currency == currency) {
            let entry = group_entry(&mut groups, &mut index, &invoice.customer);
            entry.total += invoice.sales_total();
        }

        Ok(rank_with_others(groups))
    }

    /// Top products by line revenue (quantity × unit price, before
    /// discount and tax), ties included, remainder as "Others".
    pub async fn sales_by_product(&self, currency: &str) -> DbResult<Vec<RankedSales>> {
        #[derive(FromRow)]
        struct LineRow {
            item_name: String,
            quantity: String,
            unit_price: String,
        }

        let rows = sqlx::query_as::<_, LineRow>(
            "SELECT it.item_name, it.quantity, it.unit_price
             FROM invoice_item it
             JOIN invoice i ON i.uuid = it.invoice_uuid
             WHERE i.currency = ?1",
        )
        .bind(currency)
        .fetch_all(&self.pool)
        .await?;

        let mut groups: Vec<RankedSales> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for row in rows {
            let line = Amount::new(parse_amount(&row.quantity))
                .mul_rounded(Amount::new(parse_amount(&row.unit_price)));
            let entry = group_entry(&mut groups, &mut index, &row.item_name);
            entry.total += line;
        }

        Ok(rank_with_others(groups))
    }

    /// The receivables headline figures, tax-inclusive, in the account
    /// currency.
    pub async fn totals(&self, currency: &str, now: DateTime<Utc>) -> DbResult<ReceivableTotals> {
        let invoices = load_invoice_financials(&self.pool).await?;

        let mut totals = ReceivableTotals {
            invoiced: Amount::zero(),
            received: Amount::zero(),
            owed: Amount::zero(),
            overdue: Amount::zero(),
        };

        for invoice in invoices.iter().filter(|i| i.currency == currency) {
            let total = invoice.total();
            totals.invoiced += total;
            if invoice.is_paid() {
                totals.received += total;
            } else {
                totals.owed += total;
                if invoice.is_overdue(now) {
                    totals.overdue += total;
                }
            }
        }

        Ok(totals)
    }
}

/// First day of the month containing `date`.
fn month_start(date: DateTime<Utc>) -> NaiveDate {
    let date = date.date_naive();
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Finds or creates the group for `name`, matching case-insensitively and
/// displaying the first spelling seen.
fn group_entry<'a>(
    groups: &'a mut Vec<RankedSales>,
    index: &mut HashMap<String, usize>,
    name: &str,
) -> &'a mut RankedSales {
    let key = name.to_lowercase();
    let position = match index.get(&key) {
        Some(position) => *position,
        None => {
            groups.push(RankedSales {
                name: name.to_string(),
                total: Amount::zero(),
            });
            index.insert(key, groups.len() - 1);
            groups.len() - 1
        }
    };
    &mut groups[position]
}

/// Orders groups by total (descending, name as tie-break) and cuts at
/// [`RANKING_SIZE`] with RANK semantics: ties at the boundary all stay
/// named. Whatever remains folds into one "Others" entry, omitted when
/// its sum is zero.
fn rank_with_others(mut groups: Vec<RankedSales>) -> Vec<RankedSales> {
    groups.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    let mut named: Vec<RankedSales> = Vec::new();
    let mut others = Amount::zero();
    let mut rank = 0usize;

    for (position, group) in groups.into_iter().enumerate() {
        let is_tie = named.last().is_some_and(|last| last.total == group.total);
        if !is_tie {
            rank = position + 1;
        }
        if rank <= RANKING_SIZE {
            named.push(group);
        } else {
            others += group.total;
        }
    }

    if !others.is_zero() {
        named.push(RankedSales {
            name: OTHERS_LABEL.to_string(),
            total: others,
        });
    }
    named
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, total: &str) -> RankedSales {
        RankedSales {
            name: name.to_string(),
            total: Amount::parse(total),
        }
    }

    #[test]
    fn test_rank_keeps_top_five_and_folds_rest() {
        let groups = (1..=7)
            .map(|i| group(&format!("c{i}"), &format!("{}", i * 10)))
            .collect();
        let ranked = rank_with_others(groups);

        assert_eq!(ranked.len(), 6);
        assert_eq!(ranked[0].name, "c7");
        assert_eq!(ranked[4].name, "c3");
        assert_eq!(ranked[5].name, OTHERS_LABEL);
        // c1 + c2
        assert_eq!(ranked[5].total, Amount::parse("30"));
    }

    #[test]
    fn test_rank_boundary_ties_all_stay_named() {
        let mut groups: Vec<_> = (1..=4)
            .map(|i| group(&format!("big{i}"), &format!("{}", 100 + i)))
            .collect();
        groups.push(group("tie-a", "50"));
        groups.push(group("tie-b", "50"));
        groups.push(group("small", "1"));

        let ranked = rank_with_others(groups);
        // Both rank-5 ties survive; only "small" folds away.
        assert_eq!(ranked.len(), 7);
        assert_eq!(ranked[4].name, "tie-a");
        assert_eq!(ranked[5].name, "tie-b");
        assert_eq!(ranked[6].name, OTHERS_LABEL);
        assert_eq!(ranked[6].total, Amount::parse("1"));
    }

    #[test]
    fn test_no_others_entry_when_remainder_is_zero() {
        let groups = vec![group("a", "10"), group("b", "5")];
        let ranked = rank_with_others(groups);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|g| g.name != OTHERS_LABEL));
    }
}
