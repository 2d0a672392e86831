//! Totals of the recorded earnings per currency.

use maud::{Markup, html};
use serde::Serialize;

use crate::{
    currency::{Currency, Money, format_currency},
    history::LocationRecord,
};

/// The sum of the amounts earned in each currency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CurrencyTotals {
    #[serde(rename = "BRL")]
    pub brl: f64,
    #[serde(rename = "USD")]
    pub usd: f64,
    #[serde(rename = "EUR")]
    pub eur: f64,
}

impl CurrencyTotals {
    pub fn add(&mut self, money: Money) {
        match money.currency {
            Currency::BRL => self.brl += money.amount,
            Currency::USD => self.usd += money.amount,
            Currency::EUR => self.eur += money.amount,
        }
    }

    pub fn get(&self, currency: Currency) -> f64 {
        match currency {
            Currency::BRL => self.brl,
            Currency::USD => self.usd,
            Currency::EUR => self.eur,
        }
    }
}

/// Sum the amounts of `records` per currency.
///
/// Amounts that cannot be read, are not positive or have an unknown currency
/// are skipped, so every total is non-negative.
pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a LocationRecord>) -> CurrencyTotals {
    records
        .into_iter()
        .filter_map(|record| record.total_earned.money())
        .fold(CurrencyTotals::default(), |mut totals, money| {
            totals.add(money);
            totals
        })
}

/// Cards with the total for each currency.
///
/// With `hide_non_positive`, currencies whose total rounds to zero or less are left out.
pub fn totals_view(totals: &CurrencyTotals, title: &str, hide_non_positive: bool) -> Markup {
    let shown = Currency::ALL
        .into_iter()
        .map(|currency| (currency, totals.get(currency)))
        .filter(|(_, total)| !hide_non_positive || Money::new(*total, Currency::BRL).amount > 0.0)
        .collect::<Vec<_>>();

    html! {
        section class="w-full max-w-md mb-6"
        {
            h2 class="text-lg font-semibold mb-2" { (title) }

            div class="grid grid-cols-3 gap-2"
            {
                @for (currency, total) in shown {
                    div
                        class="rounded-lg bg-white dark:bg-gray-800 shadow p-3 text-center"
                        data-currency=(currency.code())
                    {
                        p class="text-xs text-gray-500 dark:text-gray-400" { (currency.code()) }
                        p class="text-lg font-bold" { (format_currency(total, currency)) }
                    }
                }
            }
        }
    }
}
