//! Packing of asset token ids.
//!
//! From the high bits down, an asset id holds the creator's address, a flag
//! marking non-fungible assets, the id of the pack the asset was minted in,
//! the number of fungible types in that pack and the asset's index within it.
//! The 40 bits between the pack id and the fungible type count are reserved
//! for the collection index of non-fungible assets and always zero here.

use alloy::primitives::{Address, U256};

use crate::errors::UtilsError;

/// The bit offset of the creator address
const CREATOR_OFFSET: usize = 96;
/// The bit offset of the non-fungible flag
const IS_NFT_OFFSET: usize = 95;
/// The bit offset of the pack id
const PACK_ID_OFFSET: usize = 63;
/// The bit offset of the number of fungible types in the pack
const NUM_FTS_OFFSET: usize = 11;

/// The largest number of fungible types in a pack
pub const MAX_NUM_FTS: u16 = (1 << 12) - 1;
/// The largest index within a pack
pub const MAX_PACK_INDEX: u16 = (1 << 11) - 1;

/// The fields packed into an asset id
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssetId {
    /// The creator of the asset
    pub creator: Address,
    /// Whether the asset is non-fungible
    pub is_nft: bool,
    /// The pack the asset was minted in
    pub pack_id: u32,
    /// The number of fungible types in the pack
    pub num_fts: u16,
    /// The asset's index within the pack
    pub pack_index: u16,
}

/// Pack the fields of an asset id into a token id
pub fn pack_asset_id(id: &AssetId) -> Result<U256, UtilsError> {
    if id.num_fts > MAX_NUM_FTS {
        return Err(UtilsError::FieldOverflow { field: "num_fts", max: MAX_NUM_FTS as u64 });
    }
    if id.pack_index > MAX_PACK_INDEX {
        return Err(UtilsError::FieldOverflow {
            field: "pack_index",
            max: MAX_PACK_INDEX as u64,
        });
    }

    let creator = U256::from_be_slice(id.creator.as_slice()) << CREATOR_OFFSET;
    let is_nft = U256::from(id.is_nft as u8) << IS_NFT_OFFSET;
    let pack_id = U256::from(id.pack_id) << PACK_ID_OFFSET;
    let num_fts = U256::from(id.num_fts) << NUM_FTS_OFFSET;

    Ok(creator | is_nft | pack_id | num_fts | U256::from(id.pack_index))
}

/// Unpack a token id into the fields of an asset id
pub fn unpack_asset_id(token_id: U256) -> AssetId {
    let bytes = (token_id >> CREATOR_OFFSET).to_be_bytes::<32>();
    let creator = Address::from_slice(&bytes[32 - 20..]);

    AssetId {
        creator,
        is_nft: token_id.bit(IS_NFT_OFFSET),
        pack_id: field(token_id, PACK_ID_OFFSET, 32) as u32,
        num_fts: field(token_id, NUM_FTS_OFFSET, 12) as u16,
        pack_index: field(token_id, 0, 11) as u16,
    }
}

/// Extract `width` bits starting at `offset`
fn field(value: U256, offset: usize, width: usize) -> u64 {
    let mask = (U256::from(1) << width) - U256::from(1);
    ((value >> offset) & mask).to::<u64>()
}
