//! 지원 법정화폐 목록.
//!
//! 법정화폐 캐시의 식별자는 이 닫힌 열거형으로 제한됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! fiat_currencies {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// 지원 법정화폐 (ISO 4217 코드).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum FiatCurrency {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl FiatCurrency {
            /// 지원하는 모든 법정화폐.
            pub const ALL: &'static [FiatCurrency] = &[$(FiatCurrency::$variant),+];

            /// ISO 4217 통화 코드.
            pub fn code(&self) -> &'static str {
                match self {
                    $(FiatCurrency::$variant => stringify!($variant),)+
                }
            }

            /// 통화 이름 (영문).
            pub fn name(&self) -> &'static str {
                match self {
                    $(FiatCurrency::$variant => $name,)+
                }
            }
        }

        impl FromStr for FiatCurrency {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $(stringify!($variant) => Ok(FiatCurrency::$variant),)+
                    _ => Err(CoreError::UnsupportedFiat(s.to_string())),
                }
            }
        }
    };
}

fiat_currencies! {
    USD => "US Dollar",
    EUR => "Euro",
    GBP => "British Pound",
    JPY => "Japanese Yen",
    CNY => "Chinese Yuan",
    KRW => "South Korean Won",
    AUD => "Australian Dollar",
    CAD => "Canadian Dollar",
    CHF => "Swiss Franc",
    HKD => "Hong Kong Dollar",
    SGD => "Singapore Dollar",
    NZD => "New Zealand Dollar",
    INR => "Indian Rupee",
    IDR => "Indonesian Rupiah",
    THB => "Thai Baht",
    PHP => "Philippine Peso",
    MYR => "Malaysian Ringgit",
    TWD => "New Taiwan Dollar",
    VND => "Vietnamese Dong",
    BRL => "Brazilian Real",
    MXN => "Mexican Peso",
    ARS => "Argentine Peso",
    CLP => "Chilean Peso",
    COP => "Colombian Peso",
    ZAR => "South African Rand",
    TRY => "Turkish Lira",
    ILS => "Israeli New Shekel",
    AED => "UAE Dirham",
    SAR => "Saudi Riyal",
    SEK => "Swedish Krona",
    NOK => "Norwegian Krone",
    DKK => "Danish Krone",
    PLN => "Polish Zloty",
    CZK => "Czech Koruna",
    HUF => "Hungarian Forint",
}

impl FiatCurrency {
    /// 기준 통화 (모든 환율은 USD 대비로 표현).
    pub const BASE: FiatCurrency = FiatCurrency::USD;
}

impl fmt::Display for FiatCurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
