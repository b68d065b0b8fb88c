//! Shadow paging (§4.6, GLOSSARY): a temporary copy of a modified page
//! lets commit/rollback be atomic without touching the live file until
//! checkpoint. Pages are identified by a `u64` page id; a page not present
//! in the shadow overlay reads through to the backing file.

use crate::error::Result;
use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom, Write};

pub const PAGE_SIZE: usize = 4096;

#[derive(Debug, Default)]
pub struct ShadowPageFile {
    pages: BTreeMap<u64, Vec<u8>>,
}

impl ShadowPageFile {
    pub fn new() -> Self {
        ShadowPageFile::default()
    }

    /// Stages a page write; nothing reaches the backing file until `checkpoint`.
    pub fn write_page(&mut self, page_id: u64, data: Vec<u8>) {
        debug_assert!(data.len() <= PAGE_SIZE);
        self.pages.insert(page_id, data);
    }

    /// Reads a page, preferring the shadow copy if this transaction has
    /// already staged a write to it.
    pub fn read_page(&self, page_id: u64, backing: &mut (impl Read + Seek)) -> Result<Vec<u8>> {
        if let Some(page) = self.pages.get(&page_id) {
            return Ok(page.clone());
        }
        let mut buf = vec![0u8; PAGE_SIZE];
        backing.seek(SeekFrom::Start(page_id * PAGE_SIZE as u64))?;
        let read = backing.read(&mut buf)?;
        buf.truncate(read);
        Ok(buf)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn staged_page_count(&self) -> usize {
        self.pages.len()
    }

    /// Applies every staged page to the live file and clears the overlay;
    /// called once `prepareCommit`'s WAL `CommitRecord` has been `fsync`'d.
    pub fn checkpoint(&mut self, backing: &mut (impl Write + Seek)) -> Result<()> {
        for (page_id, data) in self.pages.iter() {
            backing.seek(SeekFrom::Start(page_id * PAGE_SIZE as u64))?;
            backing.write_all(data)?;
        }
        backing.flush()?;
        self.pages.clear();
        Ok(())
    }

    /// Discards every staged page without touching the backing file — the
    /// live file was never modified, so rollback is free.
    pub fn rollback(&mut self) {
        self.pages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn unwritten_pages_read_through_to_backing_storage() {
        let mut backing = Cursor::new(vec![7u8; PAGE_SIZE * 2]);
        let shadow = ShadowPageFile::new();
        let page = shadow.read_page(1, &mut backing).unwrap();
        assert_eq!(page, vec![7u8; PAGE_SIZE]);
    }

    #[test]
    fn staged_write_shadows_the_backing_page_until_checkpoint() {
        let mut backing = Cursor::new(vec![0u8; PAGE_SIZE]);
        let mut shadow = ShadowPageFile::new();
        shadow.write_page(0, vec![9u8; PAGE_SIZE]);
        assert_eq!(shadow.read_page(0, &mut backing).unwrap(), vec![9u8; PAGE_SIZE]);
        assert_eq!(backing.get_ref(), &vec![0u8; PAGE_SIZE]);

        shadow.checkpoint(&mut backing).unwrap();
        assert!(shadow.is_empty());
        assert_eq!(backing.get_ref(), &vec![9u8; PAGE_SIZE]);
    }

    #[test]
    fn rollback_discards_staged_pages_without_touching_backing_storage() {
        let mut backing = Cursor::new(vec![0u8; PAGE_SIZE]);
        let mut shadow = ShadowPageFile::new();
        shadow.write_page(0, vec![5u8; PAGE_SIZE]);
        shadow.rollback();
        assert!(shadow.is_empty());
        assert_eq!(backing.get_ref(), &vec![0u8; PAGE_SIZE]);
    }
}
