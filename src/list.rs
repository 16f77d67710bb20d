use crate::error::ContainerError;
use crate::raw::Region;

const DEFAULT_BLOCK_SIZE: usize = 512;
/// Every record starts with its payload length as a native endian u32.
const PREFIX: usize = size_of::<u32>();

/// Variable length records packed back to back in one contiguous allocation.
///
/// Think of a linked list whose items all live in the same memory block: each
/// record is a u32 length prefix followed by that many payload bytes, the
/// next record starts where the previous one ends, and there is no index on
/// top. Lookup by position walks the chain from the front, O(index) by
/// design.
///
/// Appending may relocate the whole region. Head and tail are kept as
/// offsets from the region base, so they stay valid across relocation; any
/// borrow into the list taken before an append is not, which is why
/// [`RecordList::append`] takes `&mut self` and the borrow checker refuses
/// to let a [`RecordView::Borrowed`] live across it (see [`Record::view`]).
#[derive(Debug)]
pub struct RecordList {
    /// allocation granularity in bytes
    block_size: usize,
    /// bytes consumed by records
    used: usize,
    /// offset of the first record, None while the list is empty
    head: Option<usize>,
    /// offset of the most recently appended record
    tail: Option<usize>,
    region: Region,
}

impl RecordList {
    /// An empty list growing in `block_size` byte steps; 0 picks the default
    /// of 512. Nothing is allocated until the first record arrives.
    pub fn new(block_size: usize) -> Self {
        let block_size = if block_size == 0 {
            DEFAULT_BLOCK_SIZE
        } else {
            block_size
        };
        Self {
            block_size,
            used: 0,
            head: None,
            tail: None,
            region: Region::new(),
        }
    }

    /// A list seeded with one record.
    pub fn with_record(payload: &[u8], block_size: usize) -> Result<Self, ContainerError> {
        let mut list = Self::new(block_size);
        list.append(payload)?;
        Ok(list)
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Bytes consumed by stored records, prefixes included.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    /// Bytes currently allocated, always a multiple of the block size.
    pub fn allocated_bytes(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Number of stored records. The list keeps no count, so this walks the
    /// chain.
    pub fn len(&self) -> usize {
        self.records().count()
    }

    fn payload_len_at(&self, offset: usize) -> usize {
        let raw = &self.region.as_slice()[offset..offset + PREFIX];
        u32::from_ne_bytes(raw.try_into().unwrap()) as usize
    }

    fn next_offset(&self, offset: usize) -> Option<usize> {
        let tail = self.tail?;
        if offset >= tail {
            return None;
        }
        Some(offset + PREFIX + self.payload_len_at(offset))
    }

    /// Appends one record and returns its byte offset. The offset stays
    /// valid for the lifetime of the list, across any relocation.
    ///
    /// If the append fails, the list is exactly as it was before the call:
    /// the region grow happens before any accounting field is touched.
    pub fn append(&mut self, payload: &[u8]) -> Result<usize, ContainerError> {
        if payload.is_empty() {
            return Err(ContainerError::EmptyPayload);
        }
        let prefix = u32::try_from(payload.len()).map_err(|_| ContainerError::PayloadTooLarge {
            bytes: payload.len(),
        })?;

        let needed = PREFIX + payload.len();
        let free = self.region.len() - self.used;
        if free < needed {
            let grow_by = (needed - free).div_ceil(self.block_size) * self.block_size;
            self.region.resize(self.region.len() + grow_by)?;
        }

        let offset = self.used;
        let buf = self.region.as_mut_slice();
        buf[offset..offset + PREFIX].copy_from_slice(&prefix.to_ne_bytes());
        buf[offset + PREFIX..offset + needed].copy_from_slice(payload);

        if self.head.is_none() {
            self.head = Some(offset);
        }
        self.tail = Some(offset);
        self.used += needed;
        Ok(offset)
    }

    /// Record at position `index` in append order, walking from the front.
    /// `None` when the list is empty or `index` is past the last record.
    pub fn get(&self, index: usize) -> Option<Record<'_>> {
        let mut offset = self.head?;
        for _ in 0..index {
            offset = self.next_offset(offset)?;
        }
        Some(Record { list: self, offset })
    }

    /// Iterates the records front to back.
    pub fn records(&self) -> Records<'_> {
        Records {
            list: self,
            offset: self.head,
        }
    }
}

/// A located record in a [`RecordList`].
///
/// The payload slice is recomputed from the region base on every access,
/// never cached, so a `Record` is always coherent with the list it borrows.
#[derive(Clone, Copy)]
pub struct Record<'a> {
    list: &'a RecordList,
    offset: usize,
}

impl<'a> Record<'a> {
    /// Byte offset of this record from the region base.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.list.payload_len_at(self.offset)
    }

    /// Always false: empty payloads are rejected at append time.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn payload(&self) -> &'a [u8] {
        let start = self.offset + PREFIX;
        &self.list.region.as_slice()[start..start + self.len()]
    }

    /// Borrows the record bytes straight out of list storage, no copy.
    ///
    /// The view pins the list: appending while it is alive does not
    /// compile, which is the point, since the append may relocate the bytes
    /// the view refers to. Take a [`Record::view_persistent`] to keep the
    /// bytes across mutations.
    ///
    /// ```compile_fail
    /// use contmem_rs::list::RecordList;
    ///
    /// let mut list = RecordList::with_record(b"ABCD", 4).unwrap();
    /// let view = list.get(0).unwrap().view();
    /// list.append(b"EFG").unwrap(); // ERROR: list is borrowed by `view`
    /// assert_eq!(&*view, b"ABCD");
    /// ```
    pub fn view(&self) -> RecordView<'a> {
        RecordView::Borrowed(self.payload())
    }

    /// Copies the record bytes into an owned buffer: one allocation and one
    /// copy, but the view is independent of whatever happens to the list
    /// afterwards, including dropping it.
    pub fn view_persistent(&self) -> RecordView<'static> {
        RecordView::Owned(self.payload().to_vec().into_boxed_slice())
    }
}

/// Front to back iterator over the records of a [`RecordList`].
pub struct Records<'a> {
    list: &'a RecordList,
    offset: Option<usize>,
}

impl<'a> Iterator for Records<'a> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset?;
        self.offset = self.list.next_offset(offset);
        Some(Record {
            list: self.list,
            offset,
        })
    }
}

/// Record bytes, either borrowed from list storage or owned outright.
///
/// Dropping the view releases the owned buffer; the borrowed variant owns
/// nothing.
pub enum RecordView<'a> {
    /// Zero copy reference into the list's current storage, tied to the
    /// list's borrow.
    Borrowed(&'a [u8]),
    /// A private copy, stable across later list mutations.
    Owned(Box<[u8]>),
}

impl RecordView<'_> {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Borrowed(b) => b,
            Self::Owned(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Detaches the view from the list, copying if it was borrowed.
    pub fn into_owned(self) -> RecordView<'static> {
        match self {
            Self::Borrowed(b) => RecordView::Owned(b.to_vec().into_boxed_slice()),
            Self::Owned(b) => RecordView::Owned(b),
        }
    }
}

impl std::ops::Deref for RecordView<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.bytes()
    }
}
