use std::collections::HashMap;

/// Review count and mean rate for one product.
///
/// Every review counts towards `count`, threaded replies included. Only
/// reviews carrying a rate contribute to the average, which is `0.0` when
/// no rated review exists.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    count: i64,
    rated: i64,
    total: i64,
}

impl RatingSummary {
    pub fn from_rates<I>(rates: I) -> Self
    where
        I: IntoIterator<Item = Option<i16>>,
    {
        let mut summary = Self::default();
        for rate in rates {
            summary.push(rate);
        }
        summary
    }

    pub fn push(&mut self, rate: Option<i16>) {
        self.count += 1;
        if let Some(rate) = rate {
            self.rated += 1;
            self.total += i64::from(rate);
        }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    /// Mean rate rounded to one decimal place.
    pub fn average(&self) -> f64 {
        if self.rated == 0 {
            return 0.0;
        }
        let mean = self.total as f64 / self.rated as f64;
        (mean * 10.0).round() / 10.0
    }
}

/// Folds `(product_id, rate)` rows into per-product summaries.
pub fn summarize_by_product<I>(rows: I) -> HashMap<i32, RatingSummary>
where
    I: IntoIterator<Item = (i32, Option<i16>)>,
{
    let mut out: HashMap<i32, RatingSummary> = HashMap::new();
    for (product_id, rate) in rows {
        out.entry(product_id).or_default().push(rate);
    }
    out
}
