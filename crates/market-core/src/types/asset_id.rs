//! 체인 네임스페이스 기반 자산 식별자.
//!
//! 형식: `{chain_namespace}:{chain_reference}/{asset_namespace}:{asset_reference}`
//!
//! 예시:
//! - `eip155:1/slip44:60` - 이더리움 메인넷 ETH
//! - `bip122:000000000019d6689c085ae165831e93/slip44:0` - 비트코인
//! - `eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48` - USDC (ERC-20)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 자산 식별자.
///
/// 생성 시점에 형식을 검증하므로 존재하는 모든 `AssetId`는 유효합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    /// 구성 요소로부터 자산 식별자를 생성합니다.
    pub fn from_parts(
        chain_namespace: &str,
        chain_reference: &str,
        asset_namespace: &str,
        asset_reference: &str,
    ) -> Result<Self, CoreError> {
        format!(
            "{}:{}/{}:{}",
            chain_namespace, chain_reference, asset_namespace, asset_reference
        )
        .parse()
    }

    /// 체인 식별자 (`eip155:1`).
    pub fn chain_id(&self) -> &str {
        self.split().0
    }

    /// 체인 네임스페이스 (`eip155`).
    pub fn chain_namespace(&self) -> &str {
        self.chain_id().split(':').next().unwrap_or_default()
    }

    /// 체인 참조 (`1`).
    pub fn chain_reference(&self) -> &str {
        self.chain_id().split(':').nth(1).unwrap_or_default()
    }

    /// 자산 네임스페이스 (`slip44`, `erc20` 등).
    pub fn asset_namespace(&self) -> &str {
        self.split().1.split(':').next().unwrap_or_default()
    }

    /// 자산 참조 (`60`, 컨트랙트 주소 등).
    pub fn asset_reference(&self) -> &str {
        self.split().1.split(':').nth(1).unwrap_or_default()
    }

    /// 토큰 컨트랙트 주소 형태의 자산인지 확인합니다.
    pub fn is_token(&self) -> bool {
        matches!(self.asset_namespace(), "erc20" | "bep20" | "erc721")
    }

    /// 문자열 표현.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn split(&self) -> (&str, &str) {
        self.0.split_once('/').unwrap_or((self.0.as_str(), ""))
    }
}

fn is_valid_namespace(s: &str) -> bool {
    (3..=8).contains(&s.len())
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn is_valid_reference(s: &str, max_len: usize) -> bool {
    (1..=max_len).contains(&s.len())
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '%')
}

impl FromStr for AssetId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidAssetId(s.to_string());

        let (chain, asset) = s.split_once('/').ok_or_else(invalid)?;
        let (chain_ns, chain_ref) = chain.split_once(':').ok_or_else(invalid)?;
        let (asset_ns, asset_ref) = asset.split_once(':').ok_or_else(invalid)?;

        if !is_valid_namespace(chain_ns)
            || !is_valid_reference(chain_ref, 32)
            || !is_valid_namespace(asset_ns)
            || !is_valid_reference(asset_ref, 128)
        {
            return Err(invalid());
        }

        // EVM 주소는 대소문자를 구분하지 않으므로 소문자로 정규화
        let asset_ref = if chain_ns == "eip155" {
            asset_ref.to_lowercase()
        } else {
            asset_ref.to_string()
        };

        Ok(Self(format!(
            "{}:{}/{}:{}",
            chain_ns, chain_ref, asset_ns, asset_ref
        )))
    }
}

impl TryFrom<String> for AssetId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AssetId> for String {
    fn from(value: AssetId) -> Self {
        value.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
