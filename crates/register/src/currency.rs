//! Currency selection.
//!
//! Changing the currency is an explicit transition: the controller assigns
//! the new value and applies the [`UiEffects`] returned by
//! [`on_currency_changed`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currencies a product can be listed in, in segment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Korean won, whole units only
    #[default]
    Krw,
    /// US dollar, cents allowed
    Usd,
}

impl Currency {
    /// All currencies in segment order.
    pub const ALL: [Currency; 2] = [Currency::Krw, Currency::Usd];

    /// Currency at a segmented-control index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Segmented-control index.
    pub fn index(&self) -> usize {
        match self {
            Currency::Krw => 0,
            Currency::Usd => 1,
        }
    }

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Krw => "KRW",
            Currency::Usd => "USD",
        }
    }

    /// Whether amounts may have a fractional part.
    pub fn allows_fraction(&self) -> bool {
        matches!(self, Currency::Usd)
    }

    /// Keyboard used for amounts in this currency.
    pub fn keyboard(&self) -> KeyboardKind {
        if self.allows_fraction() {
            KeyboardKind::DecimalPad
        } else {
            KeyboardKind::NumberPad
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown currency '{}', expected KRW or USD", s))
    }
}

/// On-screen keyboard for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardKind {
    /// Digits only
    NumberPad,
    /// Digits and a decimal separator
    DecimalPad,
}

/// What the screen must do after a currency change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UiEffects {
    /// Keyboard for the price field
    pub price_keyboard: KeyboardKind,
    /// Keyboard for the discounted price field
    pub discount_keyboard: KeyboardKind,
    /// Clear both amount fields (amounts typed in the old currency are meaningless)
    pub clear_amounts: bool,
}

/// Effects of switching from `old` to `new`.
///
/// Re-selecting the current currency keeps whatever the user typed.
pub fn on_currency_changed(old: Currency, new: Currency) -> UiEffects {
    let keyboard = new.keyboard();
    UiEffects {
        price_keyboard: keyboard,
        discount_keyboard: keyboard,
        clear_amounts: old != new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_index() {
        assert_eq!(Currency::from_index(0), Some(Currency::Krw));
        assert_eq!(Currency::from_index(1), Some(Currency::Usd));
        assert_eq!(Currency::from_index(2), None);
        assert_eq!(Currency::Usd.index(), 1);
    }

    #[test]
    fn test_switch_to_usd_uses_decimal_pad_and_clears() {
        let effects = on_currency_changed(Currency::Krw, Currency::Usd);
        assert_eq!(effects.price_keyboard, KeyboardKind::DecimalPad);
        assert_eq!(effects.discount_keyboard, KeyboardKind::DecimalPad);
        assert!(effects.clear_amounts);
    }

    #[test]
    fn test_switch_back_to_krw() {
        let effects = on_currency_changed(Currency::Usd, Currency::Krw);
        assert_eq!(effects.price_keyboard, KeyboardKind::NumberPad);
        assert!(effects.clear_amounts);
    }

    #[test]
    fn test_reselect_keeps_amounts() {
        let effects = on_currency_changed(Currency::Usd, Currency::Usd);
        assert_eq!(effects.price_keyboard, KeyboardKind::DecimalPad);
        assert!(!effects.clear_amounts);
    }

    #[test]
    fn test_parse_code() {
        assert_eq!("usd".parse::<Currency>(), Ok(Currency::Usd));
        assert_eq!(" KRW ".parse::<Currency>(), Ok(Currency::Krw));
        assert!("EUR".parse::<Currency>().is_err());
    }

    #[test]
    fn test_serializes_as_code() {
        assert_eq!(serde_json::to_string(&Currency::Krw).unwrap(), "\"KRW\"");
        assert_eq!(Currency::Usd.to_string(), "USD");
    }
}
