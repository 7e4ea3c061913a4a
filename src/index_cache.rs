use std::io::{Read, Seek, SeekFrom};
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::deserializer::Deserializer;
use crate::errors::{MapRenderError, Result};
use crate::header::SubFileParameter;

const INDEX_ENTRIES_PER_BLOCK: usize = 128;
const SIZE_OF_INDEX_BLOCK: usize =
    INDEX_ENTRIES_PER_BLOCK * SubFileParameter::BYTES_PER_INDEX_ENTRY as usize;

#[derive(Debug, PartialEq, Eq, Hash)]
struct IndexCacheEntryKey {
    sub_file_parameter: SubFileParameter,
    index_block_number: i64,
}

/// LRU over raw index blocks of the sub-file indexes, so consecutive block
/// lookups do not hit the disk again.
pub struct IndexCache<R: Read + Seek> {
    map: LruCache<IndexCacheEntryKey, Vec<u8>>,
    file_channel: R,
}

impl<R: Read + Seek> IndexCache<R> {
    pub fn new(file_channel: R, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            map: LruCache::new(capacity),
            file_channel,
        }
    }

    pub fn destroy(&mut self) {
        self.map.clear();
    }

    /// Returns the five-byte index entry for `block_number`: the water bit
    /// plus the block's offset into the sub-file.
    pub fn get_index_entry(
        &mut self,
        sub_file_parameter: &SubFileParameter,
        block_number: i64,
    ) -> Result<i64> {
        if block_number >= sub_file_parameter.number_of_blocks {
            return Err(MapRenderError::malformed(format!(
                "invalid block number: {}",
                block_number
            )));
        }

        let index_block_number = block_number / INDEX_ENTRIES_PER_BLOCK as i64;
        let key = IndexCacheEntryKey {
            sub_file_parameter: sub_file_parameter.clone(),
            index_block_number,
        };

        if !self.map.contains(&key) {
            let index_block_position = sub_file_parameter.index_start_address
                + index_block_number * SIZE_OF_INDEX_BLOCK as i64;
            let remaining_index_size =
                (sub_file_parameter.index_end_address - index_block_position).max(0) as usize;
            let index_block_size = SIZE_OF_INDEX_BLOCK.min(remaining_index_size);
            if index_block_size == 0 {
                return Err(MapRenderError::malformed("invalid index block size"));
            }

            let mut index_block = vec![0u8; index_block_size];
            self.file_channel
                .seek(SeekFrom::Start(index_block_position as u64))?;
            self.file_channel.read_exact(&mut index_block)?;

            self.map.put(
                IndexCacheEntryKey {
                    sub_file_parameter: sub_file_parameter.clone(),
                    index_block_number,
                },
                index_block,
            );
        }

        let index_block = self
            .map
            .get(&key)
            .ok_or_else(|| MapRenderError::malformed("index block vanished from cache"))?;

        let index_entry_in_block = (block_number % INDEX_ENTRIES_PER_BLOCK as i64) as usize;
        let address_in_index_block =
            index_entry_in_block * SubFileParameter::BYTES_PER_INDEX_ENTRY as usize;
        if address_in_index_block + SubFileParameter::BYTES_PER_INDEX_ENTRY as usize
            > index_block.len()
        {
            return Err(MapRenderError::malformed(format!(
                "index entry out of range: {}",
                block_number
            )));
        }

        Ok(Deserializer::get_five_bytes_long(
            index_block,
            address_in_index_block,
        ))
    }
}
