//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// The CPU reaches memory and peripherals only through this trait. Every call
/// is a real bus access: implementations may have side effects (a port read
/// can clear a latch), so the CPU never repeats or elides one. Address
/// decoding and any bounds handling belong to the implementation.
pub trait Bus {
    /// Read a byte from the given memory address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given memory address.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte from the given I/O port.
    ///
    /// The Z80 drives all 16 address lines during I/O, so `port` carries the
    /// upper byte too (B for `(C)` forms, A for `(n)` forms).
    fn port_in(&mut self, port: u16) -> u8;

    /// Write a byte to the given I/O port.
    fn port_out(&mut self, port: u16, value: u8);

    /// Read a little-endian word as two byte reads, low byte first.
    fn read_word(&mut self, address: u16) -> u16 {
        let lo = self.read(address);
        let hi = self.read(address.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Write a little-endian word as two byte writes, low byte first.
    fn write_word(&mut self, address: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write(address, lo);
        self.write(address.wrapping_add(1), hi);
    }
}

/// Flat 64K RAM with a 64K input-port table.
///
/// Port reads return whatever was placed in the table with
/// [`set_port`](Self::set_port). Port writes are appended to a log so tests
/// can check both values and ordering.
pub struct SimpleBus {
    memory: Vec<u8>,
    ports: Vec<u8>,
    port_writes: Vec<(u16, u8)>,
}

impl SimpleBus {
    /// Create a bus with zeroed memory and every port reading 0xFF.
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x1_0000],
            ports: vec![0xFF; 0x1_0000],
            port_writes: Vec::new(),
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at 64K.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.memory[usize::from(addr)] = byte;
            addr = addr.wrapping_add(1);
        }
    }

    /// Peek memory without going through the bus.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    /// Set the value a later `port_in(port)` returns.
    pub fn set_port(&mut self, port: u16, value: u8) {
        self.ports[usize::from(port)] = value;
    }

    /// All port writes so far, oldest first.
    #[must_use]
    pub fn port_writes(&self) -> &[(u16, u8)] {
        &self.port_writes
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }

    fn port_in(&mut self, port: u16) -> u8 {
        self.ports[usize::from(port)]
    }

    fn port_out(&mut self, port: u16, value: u8) {
        self.port_writes.push((port, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_little_endian() {
        let mut bus = SimpleBus::new();
        bus.write_word(0x1000, 0xBEEF);
        assert_eq!(bus.peek(0x1000), 0xEF);
        assert_eq!(bus.peek(0x1001), 0xBE);
        assert_eq!(bus.read_word(0x1000), 0xBEEF);
    }

    #[test]
    fn word_access_wraps_at_top_of_memory() {
        let mut bus = SimpleBus::new();
        bus.write_word(0xFFFF, 0x1234);
        assert_eq!(bus.peek(0xFFFF), 0x34);
        assert_eq!(bus.peek(0x0000), 0x12);
    }

    #[test]
    fn load_wraps() {
        let mut bus = SimpleBus::new();
        bus.load(0xFFFE, &[1, 2, 3]);
        assert_eq!(bus.peek(0xFFFE), 1);
        assert_eq!(bus.peek(0xFFFF), 2);
        assert_eq!(bus.peek(0x0000), 3);
    }

    #[test]
    fn ports_default_high_and_log_writes() {
        let mut bus = SimpleBus::new();
        assert_eq!(bus.port_in(0x12FE), 0xFF);
        bus.set_port(0x12FE, 0x5A);
        assert_eq!(bus.port_in(0x12FE), 0x5A);

        bus.port_out(0x0001, 0xAA);
        bus.port_out(0x0002, 0xBB);
        assert_eq!(bus.port_writes(), &[(0x0001, 0xAA), (0x0002, 0xBB)]);
    }
}
