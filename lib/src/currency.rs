// Copyright (c) 2023-2024 IOTA Stiftung

//! Currency parameterization for the Stardust family
//!
//! Network id, address prefix, coin type and device application mode are
//! derived from the wallet's currency identifier through one closed table;
//! unknown identifiers are a configuration error, never a silent default.

use core::str::FromStr;

use ledger_stardust_apdu::account::AppMode;

/// Unmapped currency identifier
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
#[error("unsupported currency identifier: '{0}'")]
pub struct UnknownCurrency(pub String);

/// Currencies supported by the Stardust application
#[derive(Copy, Clone, PartialEq, Eq, Debug, strum::Display)]
pub enum Currency {
    #[strum(serialize = "iota")]
    Iota,
    #[strum(serialize = "shimmer")]
    Shimmer,
    #[strum(serialize = "shimmer_testnet")]
    ShimmerTestnet,
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "iota" => Ok(Currency::Iota),
            "shimmer" => Ok(Currency::Shimmer),
            "shimmer_testnet" => Ok(Currency::ShimmerTestnet),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

/// Static per-currency protocol parameters
#[derive(Clone, PartialEq, Debug)]
pub struct CurrencyConfig {
    /// Network id committed into every transaction essence, the first
    /// 8 bytes of the BLAKE2b-256 hash of the network name
    pub network_id: u64,

    /// Bech32 human-readable prefix for addresses
    pub bech32_hrp: &'static str,

    /// SLIP-44 coin type
    pub coin_type: u32,

    /// Application mode sent with SetAccount
    pub app_mode: AppMode,
}

const IOTA: CurrencyConfig = CurrencyConfig {
    network_id: 9374574019616453254,
    bech32_hrp: "iota",
    coin_type: 4218,
    app_mode: AppMode::IotaStardust,
};

const SHIMMER: CurrencyConfig = CurrencyConfig {
    network_id: 14364762045254553490,
    bech32_hrp: "smr",
    coin_type: 4219,
    app_mode: AppMode::Shimmer,
};

const SHIMMER_TESTNET: CurrencyConfig = CurrencyConfig {
    network_id: 8342982141227064571,
    bech32_hrp: "rms",
    coin_type: 1,
    app_mode: AppMode::Shimmer,
};

impl Currency {
    /// Fetch the protocol parameters for this currency
    pub fn config(&self) -> &'static CurrencyConfig {
        match self {
            Currency::Iota => &IOTA,
            Currency::Shimmer => &SHIMMER,
            Currency::ShimmerTestnet => &SHIMMER_TESTNET,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn currency_from_identifier() {
        assert_eq!("iota".parse::<Currency>().unwrap(), Currency::Iota);
        assert_eq!("shimmer".parse::<Currency>().unwrap(), Currency::Shimmer);
        assert_eq!(
            "shimmer_testnet".parse::<Currency>().unwrap(),
            Currency::ShimmerTestnet
        );
    }

    #[test]
    fn unknown_identifier_rejected() {
        assert_eq!(
            "dogecoin".parse::<Currency>(),
            Err(UnknownCurrency("dogecoin".to_string()))
        );
    }

    #[test]
    fn network_parameters() {
        assert_eq!(Currency::Iota.config().network_id, 9374574019616453254);
        assert_eq!(Currency::Shimmer.config().network_id, 14364762045254553490);
        assert_eq!(Currency::Shimmer.config().bech32_hrp, "smr");
        assert_eq!(Currency::ShimmerTestnet.config().bech32_hrp, "rms");
        assert_eq!(Currency::Iota.config().app_mode, AppMode::IotaStardust);
    }

    #[test]
    fn identifier_round_trip() {
        for c in [Currency::Iota, Currency::Shimmer, Currency::ShimmerTestnet] {
            assert_eq!(c.to_string().parse::<Currency>().unwrap(), c);
        }
    }
}
