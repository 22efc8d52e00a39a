//! CoinGecko 코인 ID와 자산 식별자 간 변환.

use std::collections::HashMap;

use market_core::AssetId;
use tracing::{debug, trace};

use super::coingecko::CoinListEntry;

/// (CoinGecko id, 자산 식별자) 기본 매핑.
const NATIVE_ASSETS: &[(&str, &str)] = &[
    ("bitcoin", "bip122:000000000019d6689c085ae165831e93/slip44:0"),
    ("bitcoin-cash", "bip122:000000000000000000651ef99cb9fcbe/slip44:145"),
    ("litecoin", "bip122:12a765e31ffd4059bada1e25190f6e98/slip44:2"),
    ("dogecoin", "bip122:00000000001a91e3dace36e2be3bf030/slip44:3"),
    ("ethereum", "eip155:1/slip44:60"),
    ("avalanche-2", "eip155:43114/slip44:60"),
    ("binancecoin", "eip155:56/slip44:60"),
    ("matic-network", "eip155:137/slip44:60"),
    ("cosmos", "cosmos:cosmoshub-4/slip44:118"),
    ("osmosis", "cosmos:osmosis-1/slip44:118"),
    ("thorchain", "cosmos:thorchain-mainnet-v1/slip44:931"),
];

/// 이더리움 메인넷 주요 토큰 (CoinGecko id, 컨트랙트 주소).
const ETHEREUM_TOKENS: &[(&str, &str)] = &[
    ("usd-coin", "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
    ("tether", "0xdac17f958d2ee523a2206206994597c13d831ec7"),
    ("dai", "0x6b175474e89094c44da98b954eedeac495271d0f"),
    ("wrapped-bitcoin", "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599"),
    ("chainlink", "0x514910771af9ca656af840dff83e8264ecf986ca"),
    ("uniswap", "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984"),
    ("shapeshift-fox-token", "0xc770eefad204b5180df6a14ee197d99d808ee52d"),
];

/// CoinGecko 플랫폼 이름 → (체인 식별자, 토큰 네임스페이스).
const PLATFORMS: &[(&str, &str, &str)] = &[
    ("ethereum", "eip155:1", "erc20"),
    ("optimistic-ethereum", "eip155:10", "erc20"),
    ("binance-smart-chain", "eip155:56", "bep20"),
    ("polygon-pos", "eip155:137", "erc20"),
    ("avalanche", "eip155:43114", "erc20"),
];

/// 자산 식별자를 CoinGecko 요청 형태로 바꾼 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoinGeckoRef {
    /// `/coins/{id}`
    Coin(String),
    /// `/coins/{platform}/contract/{address}`
    Contract { platform: String, address: String },
}

/// CoinGecko id ↔ 자산 식별자 어댑터.
#[derive(Debug, Clone)]
pub struct AssetIdAdapter {
    by_coin_id: HashMap<String, AssetId>,
    by_asset_id: HashMap<AssetId, String>,
}

impl Default for AssetIdAdapter {
    fn default() -> Self {
        let mut adapter = Self::empty();
        for (coin_id, asset_id) in NATIVE_ASSETS {
            if let Ok(asset_id) = asset_id.parse() {
                adapter.register(coin_id, asset_id);
            }
        }
        for (coin_id, address) in ETHEREUM_TOKENS {
            if let Ok(asset_id) = AssetId::from_parts("eip155", "1", "erc20", address) {
                adapter.register(coin_id, asset_id);
            }
        }
        adapter
    }
}

impl AssetIdAdapter {
    /// 매핑이 없는 어댑터.
    pub fn empty() -> Self {
        Self {
            by_coin_id: HashMap::new(),
            by_asset_id: HashMap::new(),
        }
    }

    /// 매핑을 추가합니다. 같은 키가 있으면 덮어씁니다.
    pub fn register(&mut self, coin_id: &str, asset_id: AssetId) {
        self.by_asset_id.insert(asset_id.clone(), coin_id.to_string());
        self.by_coin_id.insert(coin_id.to_string(), asset_id);
    }

    /// `/coins/list` 결과로 매핑을 보강합니다.
    ///
    /// 이미 등록된 id는 건너뛰고, 나머지는 `PLATFORMS` 순서상 첫 번째로 주소가 있는
    /// 플랫폼의 토큰 컨트랙트로 등록합니다. 지원 플랫폼이 없는 코인은 등록되지 않습니다.
    /// 새로 등록된 항목 수를 반환합니다.
    pub fn register_coin_list(&mut self, coins: &[CoinListEntry]) -> usize {
        let mut added = 0;
        for coin in coins {
            if self.by_coin_id.contains_key(&coin.id) {
                continue;
            }
            let contract = PLATFORMS.iter().find_map(|(platform, chain_id, namespace)| {
                let address = coin.platforms.get(*platform)?.as_deref()?.trim();
                if address.is_empty() {
                    return None;
                }
                let (chain_ns, chain_ref) = chain_id.split_once(':')?;
                AssetId::from_parts(chain_ns, chain_ref, namespace, address).ok()
            });
            if let Some(asset_id) = contract {
                // 같은 컨트랙트를 가리키는 기존 매핑은 유지
                if self.by_asset_id.contains_key(&asset_id) {
                    continue;
                }
                self.register(&coin.id, asset_id);
                added += 1;
            }
        }
        debug!(listed = coins.len(), added, total = self.len(), "coin list registered");
        added
    }

    pub fn len(&self) -> usize {
        self.by_coin_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_coin_id.is_empty()
    }

    /// CoinGecko id → 자산 식별자.
    pub fn to_asset_id(&self, coin_id: &str) -> Option<AssetId> {
        let found = self.by_coin_id.get(coin_id).cloned();
        if found.is_none() {
            trace!(coin_id, "unmapped coingecko id");
        }
        found
    }

    /// 자산 식별자 → CoinGecko 요청 형태.
    ///
    /// 등록된 매핑이 우선이며, 없으면 알려진 플랫폼의 토큰 컨트랙트 형태로 변환합니다.
    pub fn to_coingecko(&self, asset_id: &AssetId) -> Option<CoinGeckoRef> {
        if let Some(coin_id) = self.by_asset_id.get(asset_id) {
            return Some(CoinGeckoRef::Coin(coin_id.clone()));
        }
        if !asset_id.is_token() {
            return None;
        }

        PLATFORMS
            .iter()
            .find(|(_, chain_id, namespace)| {
                *chain_id == asset_id.chain_id() && *namespace == asset_id.asset_namespace()
            })
            .map(|(platform, _, _)| CoinGeckoRef::Contract {
                platform: platform.to_string(),
                address: asset_id.asset_reference().to_string(),
            })
    }
}
