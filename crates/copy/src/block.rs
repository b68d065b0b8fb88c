//! Input block layout (§4.5 step 1): a block is a morsel of the file
//! reader. The original streams CSV/Parquet/NPY readers and counts lines
//! per block as it goes; this crate has no streaming reader of its own, so
//! blocks are planned over an already-parsed row list by splitting it into
//! fixed-size morsels — the layout's purpose (independently schedulable
//! units for the batch-populate tasks in §5) is preserved, the streaming
//! mechanism is not.

pub const DEFAULT_BLOCK_SIZE: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start_row: usize,
    pub row_count: usize,
}

impl Block {
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// Splits `total_rows` into blocks of at most `block_size` rows each. A
/// block with zero rows is never produced, but a zero-row input produces
/// zero blocks (§4.5's "empty blocks... are permitted" covers an
/// in-flight reader racing EOF, not this planning step).
pub fn plan_blocks(total_rows: usize, block_size: usize) -> Vec<Block> {
    let block_size = block_size.max(1);
    let mut blocks = Vec::with_capacity(total_rows.div_ceil(block_size));
    let mut start = 0;
    while start < total_rows {
        let row_count = block_size.min(total_rows - start);
        blocks.push(Block { start_row: start, row_count });
        start += row_count;
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evenly_divisible_input_produces_full_blocks() {
        let blocks = plan_blocks(10, 5);
        assert_eq!(blocks, vec![Block { start_row: 0, row_count: 5 }, Block { start_row: 5, row_count: 5 }]);
    }

    #[test]
    fn remainder_produces_a_short_final_block() {
        let blocks = plan_blocks(11, 5);
        assert_eq!(blocks.last(), Some(&Block { start_row: 10, row_count: 1 }));
    }

    #[test]
    fn empty_input_produces_no_blocks() {
        assert!(plan_blocks(0, 5).is_empty());
    }
}
