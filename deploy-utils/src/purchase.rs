//! Signing of off-chain purchase authorizations, checked on-chain by the
//! bouncer that mints purchased catalysts & gems

use alloy::{
    primitives::{eip191_hash_message, keccak256, Address, Bytes, B256, U256},
    signers::{local::PrivateKeySigner, Signature, SignerSync},
    sol_types::SolValue,
};

use crate::errors::UtilsError;

/// The length of a signature: `r || s || v`
const SIGNATURE_LENGTH: usize = 65;

/// A purchase of catalysts & gems authorized by the backend
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PurchaseAuthorization {
    /// The buyer
    pub buyer: Address,
    /// The ids of the purchased catalysts
    pub catalyst_ids: Vec<U256>,
    /// The quantity of each purchased catalyst
    pub catalyst_quantities: Vec<U256>,
    /// The ids of the purchased gems
    pub gem_ids: Vec<U256>,
    /// The quantity of each purchased gem
    pub gem_quantities: Vec<U256>,
    /// The buyer's purchase nonce
    pub nonce: U256,
}

impl PurchaseAuthorization {
    /// The digest signed by the backend:
    /// EIP-191(keccak256(abi.encode(buyer, catalystIds, catalystQuantities, gemIds, gemQuantities, nonce)))
    pub fn digest(&self) -> B256 {
        let encoded = (
            self.buyer,
            self.catalyst_ids.clone(),
            self.catalyst_quantities.clone(),
            self.gem_ids.clone(),
            self.gem_quantities.clone(),
            self.nonce,
        )
            .abi_encode_params();

        eip191_hash_message(keccak256(encoded))
    }
}

/// Sign a purchase authorization
pub fn sign_purchase(
    purchase: &PurchaseAuthorization,
    signer: &PrivateKeySigner,
) -> Result<Bytes, UtilsError> {
    let signature = signer
        .sign_hash_sync(&purchase.digest())
        .map_err(|e| UtilsError::Signature(e.to_string()))?;

    Ok(signature.as_bytes().to_vec().into())
}

/// Recover the account that signed a purchase authorization
pub fn verify_purchase(
    purchase: &PurchaseAuthorization,
    signature: &[u8],
) -> Result<Address, UtilsError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(UtilsError::Signature(format!(
            "expected {SIGNATURE_LENGTH} bytes, got {}",
            signature.len()
        )));
    }

    // Normalize legacy & EIP-155 style recovery ids
    let parity = match signature[SIGNATURE_LENGTH - 1] {
        27 | 0 => false,
        28 | 1 => true,
        v => return Err(UtilsError::Signature(format!("invalid recovery id {v}"))),
    };
    let signature = Signature::from_bytes_and_parity(&signature[..SIGNATURE_LENGTH - 1], parity);

    signature
        .recover_address_from_prehash(&purchase.digest())
        .map_err(|e| UtilsError::Signature(e.to_string()))
}
