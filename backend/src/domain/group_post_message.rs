//! Text of the published group post.
//!
//! The layout is fixed because existing posts on restaurant pages use it:
//!
//! ```text
//! <template>
//!
//! <title> - <price>.<cents><symbol>
//! ...
//! ```

use std::fmt;

use super::offer::Offer;

/// Default currency symbol appended to prices.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";

/// Currency symbol appended to every price line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencySymbol(String);

impl CurrencySymbol {
    /// Wrap a configured symbol. Surrounding whitespace is kept so
    /// deployments can choose `"3.50 €"` style output.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Borrow the symbol.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for CurrencySymbol {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

impl fmt::Display for CurrencySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compose the post body: template, blank line, then one line per offer in
/// the given order.
///
/// # Examples
/// ```
/// use backend::domain::{CurrencySymbol, compose_group_post_message};
///
/// let message = compose_group_post_message("Today:", &[], &CurrencySymbol::default());
/// assert_eq!(message, "Today:\n\n");
/// ```
pub fn compose_group_post_message(
    template: &str,
    offers: &[Offer],
    currency: &CurrencySymbol,
) -> String {
    let lines = offers
        .iter()
        .map(|offer| {
            format!(
                "{} - {}{}",
                offer.title,
                offer.price.to_two_decimals(),
                currency
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{template}\n\n{lines}")
}
