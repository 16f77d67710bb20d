use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::ContainerError;

/// One contiguous heap allocation of raw bytes, exclusively owned.
///
/// Resizing goes through `realloc`, so the base address may change on every
/// grow or shrink. Nothing here caches derived addresses: slices are built
/// from the base pointer on each access, callers hold offsets instead of
/// pointers.
#[derive(Debug)]
pub struct Region {
    ptr: Option<NonNull<u8>>,
    len: usize,
}

impl Region {
    pub const fn new() -> Self {
        Self { ptr: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        match self.ptr {
            Some(p) => unsafe { std::slice::from_raw_parts(p.as_ptr(), self.len) },
            None => &[],
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self.ptr {
            Some(p) => unsafe { std::slice::from_raw_parts_mut(p.as_ptr(), self.len) },
            None => &mut [],
        }
    }

    /// Base address of the allocation, null while empty. Only good for
    /// identity checks; any address derived from it is stale after the next
    /// `resize`.
    pub fn base_addr(&self) -> usize {
        self.ptr.map_or(0, |p| p.as_ptr() as usize)
    }

    /// Resizes the region to exactly `new_len` bytes. Grown tail bytes are
    /// zero-filled, surviving bytes are preserved verbatim. `new_len == 0`
    /// frees the allocation entirely. On failure the region is untouched.
    pub fn resize(&mut self, new_len: usize) -> Result<(), ContainerError> {
        #[cfg(feature = "trace")]
        eprintln!("[Region] resize {} -> {}", self.len, new_len);

        if new_len == self.len {
            return Ok(());
        }

        if new_len == 0 {
            self.free();
            return Ok(());
        }

        let new_layout = Layout::from_size_align(new_len, 1)
            .map_err(|_| ContainerError::AllocFailed { bytes: new_len })?;

        let raw = match self.ptr {
            None => unsafe { alloc::alloc_zeroed(new_layout) },
            Some(p) => {
                let old_layout = Layout::from_size_align(self.len, 1)
                    .map_err(|_| ContainerError::AllocFailed { bytes: new_len })?;
                unsafe { alloc::realloc(p.as_ptr(), old_layout, new_len) }
            }
        };

        let Some(ptr) = NonNull::new(raw) else {
            return Err(ContainerError::AllocFailed { bytes: new_len });
        };

        // realloc does not zero the grown tail.
        if self.ptr.is_some() && new_len > self.len {
            unsafe {
                std::ptr::write_bytes(ptr.as_ptr().add(self.len), 0, new_len - self.len);
            }
        }

        self.ptr = Some(ptr);
        self.len = new_len;
        Ok(())
    }

    pub fn free(&mut self) {
        if let Some(p) = self.ptr.take() {
            #[cfg(feature = "trace")]
            eprintln!("[Region] free {} bytes", self.len);
            // self.len was the size this pointer was last allocated with
            let layout = unsafe { Layout::from_size_align_unchecked(self.len, 1) };
            unsafe { alloc::dealloc(p.as_ptr(), layout) };
            self.len = 0;
        }
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        self.free();
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}
