//! Version registry: maps a protocol version to the deployed contract set
//! the hasher, builder and planner need.
//!
//! Pure lookup. Confirming that a deployment actually exists on a given
//! chain is the RPC collaborator's job; when no registry entry covers a
//! chain, callers fall back to the deterministic CREATE2 formula below.

use std::collections::HashMap;

use alloy_primitives::{address, keccak256, Address, B256, U256};

use crate::types::SafeVersion;

/// Deployed contract set for one protocol version.
///
/// Canonical deployments share the same address across chains, so the
/// default table is keyed by version only; per-chain overrides exist for
/// forks and private networks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionContracts {
    /// Verifier singleton the proxies delegate to.
    pub singleton: Address,
    /// L2 variant (event-emitting), where the version ships one.
    pub l2_singleton: Option<Address>,
    /// Batching helper (DelegateCall).
    pub multi_send: Address,
    /// Call-only batching helper, where the version ships one.
    pub multi_send_call_only: Option<Address>,
    /// Proxy factory used for counterfactual deployment.
    pub proxy_factory: Option<Address>,
    /// On-chain sign-message helper.
    pub sign_message_lib: Option<Address>,
    /// Compatibility fallback handler.
    pub fallback_handler: Option<Address>,
}

impl VersionContracts {
    /// The batching helper the builder should target: call-only when the
    /// version ships one, the plain helper otherwise.
    pub fn batch_target(&self) -> Address {
        self.multi_send_call_only.unwrap_or(self.multi_send)
    }
}

fn canonical(version: SafeVersion) -> VersionContracts {
    match version {
        SafeVersion::V1_1_1 => VersionContracts {
            singleton: address!("34CfAC646f301356fAa8B21e94227e3583Fe3F5F"),
            l2_singleton: None,
            multi_send: address!("8D29bE29923b68abfDD21e541b9374737B49cdAD"),
            multi_send_call_only: None,
            proxy_factory: Some(address!("76E2cFc1F5Fa8F6a5b3fC4c8F4788F0116861F9B")),
            sign_message_lib: None,
            fallback_handler: Some(address!("d5D82B6aDDc9027B22dCA772Aa68D5d74cdBdF44")),
        },
        SafeVersion::V1_2_0 => VersionContracts {
            singleton: address!("6851D6fDFAfD08c0295C392436245E5bc78B0185"),
            l2_singleton: None,
            multi_send: address!("8D29bE29923b68abfDD21e541b9374737B49cdAD"),
            multi_send_call_only: None,
            proxy_factory: Some(address!("76E2cFc1F5Fa8F6a5b3fC4c8F4788F0116861F9B")),
            sign_message_lib: None,
            fallback_handler: Some(address!("d5D82B6aDDc9027B22dCA772Aa68D5d74cdBdF44")),
        },
        SafeVersion::V1_3_0 => VersionContracts {
            singleton: address!("d9Db270c1B5E3Bd161E8c8503c55cEABeE709552"),
            l2_singleton: Some(address!("3E5c63644E683549055b9Be8653de26E0B4CD36E")),
            multi_send: address!("A238CBeb142c10Ef7Ad8442C6D1f9E89e07e7761"),
            multi_send_call_only: Some(address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D")),
            proxy_factory: Some(address!("a6B71E26C5e0845f74c812102Ca7114b6a896AB2")),
            sign_message_lib: Some(address!("A65387F16B013cf2Af4605Ad8aA5ec25a2cbA3a2")),
            fallback_handler: Some(address!("f48f2B2d2a534e402487b3ee7C18c33Aec0Fe5e4")),
        },
        SafeVersion::V1_4_1 => VersionContracts {
            singleton: address!("41675C099F32341bf84BFc5382aF534df5C7461a"),
            l2_singleton: Some(address!("29fcB43b46531BcA003ddC8FCB67FFE91900C762")),
            multi_send: address!("38869bf66a61cF6bDB996A6aE40D5853Fd43B526"),
            multi_send_call_only: Some(address!("9641d764fc13c8B624c04430C7356C1C7C8102e2")),
            proxy_factory: Some(address!("4e1DCf7AD4e460CfD30791CCC4F9c8a4f820ec67")),
            sign_message_lib: Some(address!("d53cd0aB83D845Ac265BE939c57F53AD838012c9")),
            fallback_handler: Some(address!("fd0732Dc9E303f09fCEf3a7388Ad10A83459Ec99")),
        },
    }
}

/// Registry of deployed contract sets, with injectable per-chain overrides
/// so test suites can substitute deterministic fixtures.
#[derive(Clone, Debug, Default)]
pub struct VersionRegistry {
    overrides: HashMap<(u64, SafeVersion), VersionContracts>,
}

impl VersionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract set for a specific chain, shadowing the canonical
    /// deployment for that `(chain, version)` pair.
    pub fn with_override(
        mut self,
        chain_id: u64,
        version: SafeVersion,
        contracts: VersionContracts,
    ) -> Self {
        self.overrides.insert((chain_id, version), contracts);
        self
    }

    /// The contract set for a version on a chain.
    ///
    /// `SafeVersion` is a closed set, so lookup itself cannot fail; tags
    /// outside the set are rejected earlier, when parsing the version string.
    pub fn contracts(&self, version: SafeVersion, chain_id: u64) -> VersionContracts {
        self.overrides
            .get(&(chain_id, version))
            .copied()
            .unwrap_or_else(|| canonical(version))
    }
}

/// Raw CREATE2 address formula:
/// `keccak256(0xff || deployer || salt || initCodeHash)[12..]`.
pub fn create2_address(deployer: Address, salt: B256, init_code_hash: B256) -> Address {
    let mut buf = Vec::with_capacity(1 + 20 + 32 + 32);
    buf.push(0xff);
    buf.extend_from_slice(deployer.as_slice());
    buf.extend_from_slice(salt.as_slice());
    buf.extend_from_slice(init_code_hash.as_slice());
    Address::from_slice(&keccak256(&buf)[12..])
}

/// Counterfactual verifier proxy address, as the proxy factory derives it:
/// salt is `keccak256(keccak256(initializer) || saltNonce)` and the init
/// code is the factory's proxy creation code with the singleton appended as
/// a constructor argument word.
pub fn predict_safe_address(
    factory: Address,
    proxy_creation_code: &[u8],
    singleton: Address,
    initializer: &[u8],
    salt_nonce: U256,
) -> Address {
    let mut salt_buf = Vec::with_capacity(32 + 32);
    salt_buf.extend_from_slice(keccak256(initializer).as_slice());
    salt_buf.extend_from_slice(&salt_nonce.to_be_bytes::<32>());
    let salt = keccak256(&salt_buf);

    let mut init_code = Vec::with_capacity(proxy_creation_code.len() + 32);
    init_code.extend_from_slice(proxy_creation_code);
    let mut singleton_word = [0u8; 32];
    singleton_word[12..32].copy_from_slice(singleton.as_slice());
    init_code.extend_from_slice(&singleton_word);

    create2_address(factory, salt, keccak256(&init_code))
}
