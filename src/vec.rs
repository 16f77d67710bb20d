use crate::error::ContainerError;
use crate::raw::Region;

const DEFAULT_GROWTH_UNIT: usize = 8;

/// A growable vector of fixed size byte items in one contiguous allocation.
///
/// The item size (stride) is picked at creation and never changes. Capacity
/// grows and shrinks in whole `growth_unit` blocks, so pushing and popping
/// near a block boundary does not thrash the allocator. Slots past `len` are
/// kept zero-filled.
#[derive(Debug)]
pub struct StrideVec {
    stride: usize,
    len: usize,
    capacity: usize,
    growth_unit: usize,
    region: Region,
}

impl StrideVec {
    /// An empty vector of `stride` byte items. Nothing is allocated until
    /// the first item arrives.
    pub fn new(stride: usize) -> Result<Self, ContainerError> {
        Self::with_growth_unit(stride, DEFAULT_GROWTH_UNIT)
    }

    /// Like [`StrideVec::new`] with an explicit allocation granularity in
    /// items.
    pub fn with_growth_unit(stride: usize, growth_unit: usize) -> Result<Self, ContainerError> {
        if stride == 0 {
            return Err(ContainerError::ZeroStride);
        }
        if growth_unit == 0 {
            return Err(ContainerError::ZeroGrowthUnit);
        }
        Ok(Self {
            stride,
            len: 0,
            capacity: 0,
            growth_unit,
            region: Region::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of item slots currently backed by the allocation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    fn grow_to(&mut self, item_count: usize) -> Result<(), ContainerError> {
        let bytes = item_count
            .checked_mul(self.stride)
            .ok_or(ContainerError::AllocFailed { bytes: usize::MAX })?;
        self.region.resize(bytes)?;
        self.capacity = item_count;
        Ok(())
    }

    /// Ensures the vector can hold `min_count` items without further
    /// allocation.
    ///
    /// `min_count == 0` is the ensure-one-free-slot fast path used by push:
    /// it grows by exactly one `growth_unit` block, and only when no free
    /// slot exists. Any other `min_count` is rounded up to the next multiple
    /// of the growth unit before growing; a count the vector already covers
    /// is a no-op.
    pub fn reserve(&mut self, min_count: usize) -> Result<(), ContainerError> {
        if min_count == 0 {
            if self.capacity > self.len {
                return Ok(());
            }
            return self.grow_to(self.capacity + self.growth_unit);
        }

        if min_count <= self.capacity {
            return Ok(());
        }
        let rounded = min_count
            .div_ceil(self.growth_unit)
            .checked_mul(self.growth_unit)
            .ok_or(ContainerError::AllocFailed { bytes: usize::MAX })?;
        self.grow_to(rounded)
    }

    fn slot(&self, index: usize) -> &[u8] {
        &self.region.as_slice()[index * self.stride..(index + 1) * self.stride]
    }

    fn slot_mut(&mut self, index: usize) -> &mut [u8] {
        let stride = self.stride;
        &mut self.region.as_mut_slice()[index * stride..(index + 1) * stride]
    }

    /// Copies `item` into the slot after the last one and returns the placed
    /// slot. `item` must be exactly one stride long. On failure nothing
    /// changes.
    pub fn push(&mut self, item: &[u8]) -> Result<&mut [u8], ContainerError> {
        if item.len() != self.stride {
            return Err(ContainerError::StrideMismatch {
                expected: self.stride,
                got: item.len(),
            });
        }
        self.reserve(self.len + 1)?;

        let index = self.len;
        self.len += 1;
        let slot = self.slot_mut(index);
        slot.copy_from_slice(item);
        Ok(slot)
    }

    /// Claims the slot after the last one and hands it out zero-filled for
    /// the caller to populate in place, skipping the copy that push does.
    pub fn emplace(&mut self) -> Result<&mut [u8], ContainerError> {
        self.reserve(self.len + 1)?;
        let index = self.len;
        self.len += 1;
        Ok(self.slot_mut(index))
    }

    /// Removes the last item, zero-filling its slot. Capacity stays as is;
    /// call [`StrideVec::shrink`] to give memory back.
    pub fn pop(&mut self) {
        if self.len == 0 {
            return;
        }
        self.len -= 1;
        let index = self.len;
        self.slot_mut(index).fill(0);
    }

    /// Removes all items, zero-filling the live range. Capacity unchanged.
    pub fn clear(&mut self) {
        let live = self.len * self.stride;
        self.region.as_mut_slice()[..live].fill(0);
        self.len = 0;
    }

    /// Releases capacity beyond `len` rounded up to a growth unit multiple.
    /// An empty vector frees its allocation entirely. Live item bytes are
    /// never touched.
    pub fn shrink(&mut self) -> Result<(), ContainerError> {
        let target = self.len.div_ceil(self.growth_unit) * self.growth_unit;
        if self.capacity <= target {
            return Ok(());
        }
        self.region.resize(target * self.stride)?;
        self.capacity = target;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len {
            return None;
        }
        Some(self.slot(index))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= self.len {
            return None;
        }
        Some(self.slot_mut(index))
    }

    /// Overwrites the item at `index` and returns the written slot. `None`
    /// when the index is past the end or `item` is not one stride long.
    pub fn set(&mut self, index: usize, item: &[u8]) -> Option<&mut [u8]> {
        if index >= self.len || item.len() != self.stride {
            return None;
        }
        let slot = self.slot_mut(index);
        slot.copy_from_slice(item);
        Some(slot)
    }
}

impl std::ops::Index<usize> for StrideVec {
    type Output = [u8];

    fn index(&self, index: usize) -> &Self::Output {
        if index >= self.len {
            panic!(
                "index {} out of bounds for StrideVec of length {}",
                index, self.len
            );
        }
        self.slot(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_u32(v: &mut StrideVec, n: u32) {
        v.push(&n.to_ne_bytes()).unwrap();
    }

    fn get_u32(v: &StrideVec, index: usize) -> u32 {
        u32::from_ne_bytes(v.get(index).unwrap().try_into().unwrap())
    }

    #[test]
    fn create_validates_stride() {
        assert!(StrideVec::new(4).is_ok());
        assert_eq!(StrideVec::new(0).unwrap_err(), ContainerError::ZeroStride);
        assert_eq!(
            StrideVec::with_growth_unit(4, 0).unwrap_err(),
            ContainerError::ZeroGrowthUnit
        );
    }

    #[test]
    fn create_allocates_nothing() {
        let v = StrideVec::new(4).unwrap();
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 0);
    }

    #[test]
    fn growth_in_unit_blocks() {
        let mut v = StrideVec::new(4).unwrap();
        for n in 0..8u32 {
            push_u32(&mut v, n);
        }
        assert_eq!(v.len(), 8);
        assert_eq!(v.capacity(), 8);

        // the ninth push crosses the block boundary
        let placed = v.push(&9u32.to_ne_bytes()).unwrap();
        assert_eq!(u32::from_ne_bytes(placed[..].try_into().unwrap()), 9);
        assert_eq!(v.len(), 9);
        assert_eq!(v.capacity(), 16);
    }

    #[test]
    fn push_survives_relocation() {
        let mut v = StrideVec::new(4).unwrap();
        for n in 0..100u32 {
            push_u32(&mut v, n * 7);
        }
        for n in 0..100u32 {
            assert_eq!(get_u32(&v, n as usize), n * 7);
        }
    }

    #[test]
    fn push_rejects_wrong_stride() {
        let mut v = StrideVec::new(4).unwrap();
        push_u32(&mut v, 1);
        assert_eq!(
            v.push(b"toolong").unwrap_err(),
            ContainerError::StrideMismatch {
                expected: 4,
                got: 7
            }
        );
        // failed push left nothing behind
        assert_eq!(v.len(), 1);
        assert_eq!(v.capacity(), 8);
    }

    #[test]
    fn emplace_hands_out_zeroed_slot() {
        let mut v = StrideVec::new(8).unwrap();
        {
            let slot = v.emplace().unwrap();
            assert_eq!(slot, &[0u8; 8]);
            slot.copy_from_slice(b"12345678");
        }
        assert_eq!(v.len(), 1);
        assert_eq!(v.get(0).unwrap(), b"12345678");
    }

    #[test]
    fn pop_zero_fills_and_keeps_capacity() {
        let mut v = StrideVec::new(4).unwrap();
        push_u32(&mut v, 0xAABBCCDD);
        push_u32(&mut v, 0x11223344);
        v.pop();
        assert_eq!(v.len(), 1);
        assert_eq!(v.capacity(), 8);
        // the vacated slot reads back zeroed via emplace
        assert_eq!(v.emplace().unwrap(), &[0u8; 4]);
    }

    #[test]
    fn pop_on_empty_is_noop() {
        let mut v = StrideVec::new(4).unwrap();
        v.pop();
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 0);
    }

    #[test]
    fn clear_blanks_live_range() {
        let mut v = StrideVec::new(4).unwrap();
        for n in 0..5u32 {
            push_u32(&mut v, n + 1);
        }
        v.clear();
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 8);
        for i in 0..5 {
            assert_eq!(v.emplace().unwrap(), &[0u8; 4], "slot {i} not blanked");
        }
    }

    #[test]
    fn shrink_to_fit_and_to_zero() {
        let mut v = StrideVec::new(4).unwrap();
        for n in 0..20u32 {
            push_u32(&mut v, n);
        }
        assert_eq!(v.len(), 20);
        assert_eq!(v.capacity(), 24);

        // nothing above the rounded length, shrink is a no-op
        v.shrink().unwrap();
        assert_eq!(v.capacity(), 24);

        for _ in 0..20 {
            v.pop();
        }
        assert_eq!(v.len(), 0);
        assert_eq!(v.capacity(), 24);

        v.shrink().unwrap();
        assert_eq!(v.capacity(), 0);
    }

    #[test]
    fn shrink_keeps_live_items() {
        let mut v = StrideVec::new(4).unwrap();
        for n in 0..20u32 {
            push_u32(&mut v, n * 3);
        }
        for _ in 0..15 {
            v.pop();
        }
        v.shrink().unwrap();
        assert_eq!(v.capacity(), 8);
        for n in 0..5u32 {
            assert_eq!(get_u32(&v, n as usize), n * 3);
        }
    }

    #[test]
    fn reserve_is_idempotent() {
        let mut v = StrideVec::new(4).unwrap();
        v.reserve(10).unwrap();
        assert_eq!(v.capacity(), 16);
        v.reserve(10).unwrap();
        v.reserve(16).unwrap();
        v.reserve(3).unwrap();
        assert_eq!(v.capacity(), 16);
    }

    #[test]
    fn reserve_zero_ensures_one_free_slot() {
        let mut v = StrideVec::new(4).unwrap();
        v.reserve(0).unwrap();
        assert_eq!(v.capacity(), 8);
        // a free slot exists, so this must not grow
        v.reserve(0).unwrap();
        assert_eq!(v.capacity(), 8);

        for n in 0..8u32 {
            push_u32(&mut v, n);
        }
        v.reserve(0).unwrap();
        assert_eq!(v.capacity(), 16);
    }

    #[test]
    fn reserve_overflowing_request_fails_cleanly() {
        let mut v = StrideVec::new(4).unwrap();
        push_u32(&mut v, 7);

        // a count this large overflows the byte size computation, which
        // must surface as a failed allocation instead of a panic
        assert!(matches!(
            v.reserve(usize::MAX).unwrap_err(),
            ContainerError::AllocFailed { .. }
        ));
        assert_eq!(v.len(), 1);
        assert_eq!(v.capacity(), 8);
        assert_eq!(get_u32(&v, 0), 7);
    }

    #[test]
    fn get_and_set_bounds_checked() {
        let mut v = StrideVec::new(4).unwrap();
        assert!(v.get(0).is_none());
        assert!(v.set(0, &[0; 4]).is_none());

        push_u32(&mut v, 5);
        push_u32(&mut v, 6);
        assert!(v.get(2).is_none());
        assert!(v.set(2, &[0; 4]).is_none());
        assert!(v.set(1, b"abc").is_none()); // wrong stride

        let written = v.set(1, &42u32.to_ne_bytes()).unwrap();
        assert_eq!(u32::from_ne_bytes(written[..].try_into().unwrap()), 42);
        assert_eq!(get_u32(&v, 1), 42);
        assert_eq!(get_u32(&v, 0), 5);
    }

    #[test]
    fn index_trait_returns_correct_values() {
        let mut v = StrideVec::new(4).unwrap();
        for n in 0..10u32 {
            push_u32(&mut v, n * 2);
        }
        assert_eq!(u32::from_ne_bytes(v[3].try_into().unwrap()), 6);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_panics_on_invalid() {
        let mut v = StrideVec::new(4).unwrap();
        push_u32(&mut v, 1);
        let _ = &v[1];
    }
}
