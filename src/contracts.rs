//! Solidity ABI surfaces of the on-chain collaborators.
//!
//! Declared once so call-shape expectations stay explicit; encoding and
//! return decoding go through `alloy-sol-types`.

use alloy_sol_types::sol;

sol! {
    /// Verifier contract (per protocol version; the shape below is stable
    /// across the supported range).
    interface ISafe {
        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address payable refundReceiver,
            bytes memory signatures
        ) external payable returns (bool success);

        function nonce() external view returns (uint256 nonce);

        function getThreshold() external view returns (uint256 threshold);

        function getOwners() external view returns (address[] memory owners);

        /// EIP-1271 delegated signature check.
        function isValidSignature(bytes32 hash, bytes memory signature)
            external
            view
            returns (bytes4 magicValue);

        /// Records on-chain approval of a hash by the sender.
        function approveHash(bytes32 hashToApprove) external;

        function approvedHashes(address owner, bytes32 hash)
            external
            view
            returns (uint256 approved);
    }

    /// Batching helper, invoked via DelegateCall. Payload layout:
    /// `operation(1) || to(20) || value(32) || dataLength(32) || data`, concatenated.
    interface IMultiSend {
        function multiSend(bytes memory transactions) external payable;
    }
}

/// EIP-1271 magic value returned by a contract account for a valid signature.
pub const EIP1271_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];
