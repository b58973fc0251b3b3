use crate::error::{Error, Result};

/// A byte buffer that holds a mutable or immutable byte slice.
#[derive(Debug)]
pub enum Buffer<'a> {
    Immutable(&'a [u8]),
    Mutable(&'a mut [u8]),
}

impl<'a> Buffer<'a> {
    /// Wrap a writable `packet` of the named packet type if it holds at least `minimum` bytes.
    pub fn mutable(name: &str, packet: &'a mut [u8], minimum: usize) -> Result<Self> {
        check_len(name, packet.len(), minimum)?;
        Ok(Self::Mutable(packet))
    }

    /// Wrap a readonly `packet` of the named packet type if it holds at least `minimum` bytes.
    pub fn immutable(name: &str, packet: &'a [u8], minimum: usize) -> Result<Self> {
        check_len(name, packet.len(), minimum)?;
        Ok(Self::Immutable(packet))
    }
}

impl Buffer<'_> {
    /// Access the buffer as an immutable slice of bytes.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Immutable(packet) => packet,
            Buffer::Mutable(packet) => packet,
        }
    }

    /// Access the buffer as a mutable slice of bytes.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        match self {
            Buffer::Immutable(_) => panic!("write operation called on readonly buffer"),
            Buffer::Mutable(packet) => packet,
        }
    }

    /// Get N bytes from the packet at a given byte offset.
    pub fn get_bytes<const N: usize>(&self, offset: usize) -> [u8; N] {
        core::array::from_fn(|i| self.read(offset + i))
    }

    /// Set N bytes in the packet at a given offset.
    pub fn set_bytes<const N: usize>(&mut self, offset: usize, bytes: [u8; N]) {
        self.as_slice_mut()[offset..offset + N].copy_from_slice(&bytes);
    }

    pub fn read(&self, offset: usize) -> u8 {
        self.as_slice()[offset]
    }

    pub fn write(&mut self, offset: usize) -> &mut u8 {
        &mut self.as_slice_mut()[offset]
    }
}

fn check_len(name: &str, len: usize, minimum: usize) -> Result<()> {
    if len >= minimum {
        Ok(())
    } else {
        Err(Error::InsufficientPacketBuffer(
            String::from(name),
            minimum,
            len,
        ))
    }
}
