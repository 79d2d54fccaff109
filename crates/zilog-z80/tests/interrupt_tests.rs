//! Interrupt acceptance and entry.

use emu_core::{Bus, Cpu, SimpleBus};
use zilog_z80::{AccurateZ80, FastZ80};

/// CPU with interrupts enabled, SP at 8000h and `program` at 0.
fn enabled(program: &[u8], im: u8) -> (FastZ80, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, program);
    let mut cpu = FastZ80::new();
    let regs = cpu.regs_mut();
    regs.sp = 0x8000;
    regs.iff1 = true;
    regs.iff2 = true;
    regs.im = im;
    (cpu, bus)
}

fn stacked_return(bus: &mut SimpleBus) -> u16 {
    bus.read_word(0x7FFE)
}

#[derive(Debug, PartialEq, Eq)]
enum Access {
    Read(u16),
    Write(u16, u8),
}

/// Memory bus that logs every access in order.
struct RecordingBus {
    inner: SimpleBus,
    log: Vec<Access>,
}

impl Bus for RecordingBus {
    fn read(&mut self, address: u16) -> u8 {
        self.log.push(Access::Read(address));
        self.inner.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.log.push(Access::Write(address, value));
        self.inner.write(address, value);
    }

    fn port_in(&mut self, port: u16) -> u8 {
        self.inner.port_in(port)
    }

    fn port_out(&mut self, port: u16, value: u8) {
        self.inner.port_out(port, value);
    }
}

#[test]
fn test_im1_restarts_at_38h() {
    let (mut cpu, mut bus) = enabled(&[0x00, 0x00], 1);
    cpu.step(&mut bus);

    assert_eq!(cpu.irq(&mut bus, 0xFF), Some(13));
    assert_eq!(cpu.pc(), 0x0038);
    assert_eq!(cpu.regs().wz, 0x0038);
    assert!(!cpu.regs().iff1 && !cpu.regs().iff2);
    assert_eq!(stacked_return(&mut bus), 0x0001);
}

#[test]
fn test_im2_reads_vector_table() {
    let (mut cpu, mut bus) = enabled(&[0x00], 2);
    cpu.regs_mut().i = 0x40;
    bus.write_word(0x4010, 0x1234);

    assert_eq!(cpu.irq(&mut bus, 0x10), Some(19));
    assert_eq!(cpu.pc(), 0x1234);
    assert_eq!(cpu.regs().wz, 0x1234);
    assert_eq!(stacked_return(&mut bus), 0x0000);
}

#[test]
fn test_im2_pushes_before_reading_vector() {
    // The stack sits on top of the vector table, so the vector read sees
    // the return address just pushed.
    let mut bus = RecordingBus { inner: SimpleBus::new(), log: Vec::new() };
    bus.inner.write_word(0x8000, 0x9000);
    let mut cpu = FastZ80::new();
    let regs = cpu.regs_mut();
    regs.pc = 0x0005;
    regs.sp = 0x8002;
    regs.i = 0x80;
    regs.iff1 = true;
    regs.im = 2;

    assert_eq!(cpu.irq(&mut bus, 0x00), Some(19));
    assert_eq!(
        bus.log,
        [
            Access::Write(0x8001, 0x00),
            Access::Write(0x8000, 0x05),
            Access::Read(0x8000),
            Access::Read(0x8001),
        ]
    );
    assert_eq!(cpu.pc(), 0x0005);
    assert_eq!(cpu.regs().wz, 0x0005);
    assert_eq!(cpu.regs().sp, 0x8000);
}

#[test]
fn test_im0_runs_rst_from_data_bus() {
    let (mut cpu, mut bus) = enabled(&[0x00], 0);
    assert_eq!(cpu.irq(&mut bus, 0xEF), Some(13)); // RST 28h
    assert_eq!(cpu.pc(), 0x0028);

    let (mut cpu, mut bus) = enabled(&[0x00], 0);
    assert_eq!(cpu.irq(&mut bus, 0x00), Some(13));
    assert_eq!(cpu.pc(), 0x0038, "anything else falls back to RST 38h");
}

#[test]
fn test_irq_refused_while_disabled_or_deferred() {
    let (mut cpu, mut bus) = enabled(&[0xFB, 0x00], 1);
    cpu.regs_mut().iff1 = false;
    assert_eq!(cpu.irq(&mut bus, 0xFF), None);

    // EI; the instruction after it must run first
    cpu.step(&mut bus);
    assert_eq!(cpu.irq(&mut bus, 0xFF), None);
    cpu.step(&mut bus);
    assert_eq!(cpu.irq(&mut bus, 0xFF), Some(13));
}

#[test]
fn test_irq_bumps_refresh_once() {
    let (mut cpu, mut bus) = enabled(&[0x00], 1);
    let r = cpu.regs().r;

    cpu.irq(&mut bus, 0xFF);
    assert_eq!(cpu.regs().r, r + 1);
}

#[test]
fn test_nmi_saves_iff1_and_retn_restores_it() {
    let (mut cpu, mut bus) = enabled(&[0x00, 0x00], 1);
    bus.load(0x0066, &[0xED, 0x45]); // RETN
    cpu.step(&mut bus);

    assert_eq!(cpu.nmi(&mut bus), Some(11));
    assert_eq!(cpu.pc(), 0x0066);
    assert!(!cpu.regs().iff1);
    assert!(cpu.regs().iff2);
    assert_eq!(cpu.irq(&mut bus, 0xFF), None, "maskable interrupts held off");

    assert_eq!(cpu.step(&mut bus), 14);
    assert_eq!(cpu.pc(), 0x0001);
    assert!(cpu.regs().iff1);
}

#[test]
fn test_nmi_ignores_disabled_interrupts() {
    let (mut cpu, mut bus) = enabled(&[0x00], 1);
    cpu.regs_mut().iff1 = false;
    cpu.regs_mut().iff2 = false;

    assert_eq!(cpu.nmi(&mut bus), Some(11));
    assert_eq!(cpu.pc(), 0x0066);
}

#[test]
fn test_reti_restores_iff1() {
    let (mut cpu, mut bus) = enabled(&[0x00], 1);
    bus.load(0x0038, &[0xED, 0x4D]); // RETI

    cpu.irq(&mut bus, 0xFF);
    cpu.regs_mut().iff2 = true;
    assert_eq!(cpu.step(&mut bus), 14);
    assert_eq!(cpu.pc(), 0x0000);
    assert!(cpu.regs().iff1);
}

#[test]
fn test_interrupt_releases_halt() {
    let (mut cpu, mut bus) = enabled(&[0x00, 0x76], 1);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert!(cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0001);

    assert_eq!(cpu.irq(&mut bus, 0xFF), Some(13));
    assert!(!cpu.is_halted());
    assert_eq!(stacked_return(&mut bus), 0x0002, "returns past the HALT");
}

#[test]
fn test_accurate_mode_waits_for_instruction_boundary() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xCD, 0x10, 0x00]); // CALL 0010h
    let mut cpu = AccurateZ80::new();
    cpu.set_sp(0x8000);

    cpu.step(&mut bus);
    assert_eq!(cpu.nmi(&mut bus), None);
    while !cpu.at_instruction_boundary() {
        cpu.step(&mut bus);
    }

    assert_eq!(cpu.nmi(&mut bus), Some(4));
    let mut rest = 0;
    while !cpu.at_instruction_boundary() {
        rest += cpu.step(&mut bus);
    }
    assert_eq!(4 + rest, 11);
    assert_eq!(cpu.pc(), 0x0066);
}
