//! T-state accounting in both timing modes.

use emu_core::{Bus, Cpu, SimpleBus};
use zilog_z80::{AccurateZ80, FastZ80, Phase, SF, XF, YF, ZF};

fn boot(program: &[u8]) -> (FastZ80, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, program);
    (FastZ80::new(), bus)
}

/// Step an accurate CPU through one whole instruction, collecting each step.
fn accurate_steps(cpu: &mut AccurateZ80, bus: &mut SimpleBus) -> Vec<u32> {
    let mut steps = vec![cpu.step(bus)];
    while !cpu.at_instruction_boundary() {
        steps.push(cpu.step(bus));
    }
    steps
}

#[test]
fn test_ldir_charges_taken_cost_while_repeating() {
    let (mut cpu, mut bus) = boot(&[0xED, 0xB0, 0x76]); // LDIR
    bus.load(0x5000, &[1, 2, 3]);
    let regs = cpu.regs_mut();
    regs.set_hl(0x5000);
    regs.set_de(0x6000);
    regs.set_bc(3);

    assert_eq!(cpu.step(&mut bus), 21);
    assert_eq!(cpu.pc(), 0x0000, "rewound onto the ED prefix");
    assert_eq!(cpu.regs().wz, 0x0001);
    assert_eq!(cpu.step(&mut bus), 21);
    assert_eq!(cpu.step(&mut bus), 16);
    assert_eq!(cpu.pc(), 0x0002);

    assert_eq!(cpu.regs().bc(), 0);
    assert_eq!(cpu.regs().hl(), 0x5003);
    assert_eq!(cpu.regs().de(), 0x6003);
    assert_eq!(cpu.regs().f & 0x04, 0, "P/V clear once BC reaches zero");
    assert_eq!([bus.peek(0x6000), bus.peek(0x6001), bus.peek(0x6002)], [1, 2, 3]);
}

#[test]
fn test_djnz_not_taken_when_b_reaches_zero() {
    let (mut cpu, mut bus) = boot(&[0x10, 0x05]); // DJNZ +5
    cpu.regs_mut().b = 1;

    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.regs().b, 0);
    assert_eq!(cpu.pc(), 0x0002, "PC past the displacement");
}

#[test]
fn test_djnz_taken_while_b_nonzero() {
    let (mut cpu, mut bus) = boot(&[0x10, 0x05]); // DJNZ +5
    cpu.regs_mut().b = 2;

    assert_eq!(cpu.step(&mut bus), 13);
    assert_eq!(cpu.regs().b, 1);
    assert_eq!(cpu.pc(), 0x0007);
    assert_eq!(cpu.regs().wz, 0x0007);
}

#[test]
fn test_conditional_costs() {
    // JR NZ,+0 / CALL NZ,0010h / RET NZ with Z set, then Z clear
    for (z_set, jr, call, ret) in [(true, 7, 10, 5), (false, 12, 17, 11)] {
        let (mut cpu, mut bus) = boot(&[0x20, 0x00, 0xC4, 0x10, 0x00]);
        bus.load(0x0010, &[0xC0]);
        cpu.set_sp(0x8000);
        cpu.regs_mut().f = if z_set { ZF } else { 0 };

        assert_eq!(cpu.step(&mut bus), jr, "JR NZ");
        assert_eq!(cpu.step(&mut bus), call, "CALL NZ");
        if !z_set {
            assert_eq!(cpu.step(&mut bus), ret, "RET NZ");
            assert_eq!(cpu.pc(), 0x0005);
        }
    }
}

#[test]
fn test_bit_indexed_takes_xy_from_address() {
    // BIT 7,(IX+10h) with IX+d = 8000h and the byte 80h
    let (mut cpu, mut bus) = boot(&[0xDD, 0xCB, 0x10, 0x7E]);
    bus.write(0x8000, 0x80);
    cpu.regs_mut().ix = 0x7FF0;
    cpu.regs_mut().f = 0;

    assert_eq!(cpu.step(&mut bus), 20);
    assert_eq!(cpu.regs().wz, 0x8000);
    let f = cpu.regs().f;
    assert_eq!(f & ZF, 0);
    assert_eq!(f & SF, SF);
    assert_eq!(f & (YF | XF), 0x80 & (YF | XF));

    // A zero byte at 2800h: X/Y still follow the address, not the byte
    let (mut cpu, mut bus) = boot(&[0xDD, 0xCB, 0x00, 0x46]); // BIT 0,(IX+0)
    cpu.regs_mut().ix = 0x2800;

    cpu.step(&mut bus);
    assert_eq!(cpu.regs().f & (ZF | YF | XF), ZF | YF | XF);
}

#[test]
fn test_ei_deferral_is_single_shot() {
    let (mut cpu, mut bus) = boot(&[0xFB, 0xF3, 0x76]); // EI; DI

    cpu.step(&mut bus);
    assert!(cpu.regs().iff1 && cpu.regs().iff2);
    assert!(cpu.irq_deferred());
    assert!(!cpu.can_accept_irq());

    cpu.step(&mut bus);
    assert!(!cpu.irq_deferred());
    assert!(!cpu.regs().iff1 && !cpu.regs().iff2);
}

#[test]
fn test_ei_then_nop_opens_the_window() {
    let (mut cpu, mut bus) = boot(&[0xFB, 0x00, 0x76]); // EI; NOP

    cpu.step(&mut bus);
    assert!(!cpu.can_accept_irq());
    cpu.step(&mut bus);
    assert!(cpu.can_accept_irq());
}

#[test]
fn test_index_prefix_adds_four() {
    let (mut cpu, mut bus) = boot(&[0xDD, 0x00, 0xDD, 0x34, 0x01]); // DD NOP; INC (IX+1)

    assert_eq!(cpu.step(&mut bus), 8);
    assert_eq!(cpu.step(&mut bus), 23);
}

#[test]
fn test_accurate_call_reports_bus_cycles() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xCD, 0x10, 0x00]); // CALL 0010h
    let mut cpu = AccurateZ80::new();
    cpu.set_sp(0x8000);

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.phase(), Phase::Executing { remaining: 3 });
    assert!(!cpu.at_instruction_boundary());
    assert_eq!(cpu.pc(), 0x0010, "side effects land on the first step");

    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.step(&mut bus), 4);
    assert_eq!(cpu.step(&mut bus), 5);
    assert_eq!(cpu.phase(), Phase::Done);
    assert_eq!(cpu.total_ticks().get(), 17);
}

#[test]
fn test_accurate_chained_prefix_leads_with_a_short_step() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xDD, 0xFD, 0x21, 0x34, 0x12]); // DD FD LD IY,1234h
    let mut cpu = AccurateZ80::new();

    assert_eq!(accurate_steps(&mut cpu, &mut bus).iter().sum::<u32>(), 18);
    assert_eq!(cpu.regs().iy, 0x1234);
}

#[test]
fn test_accurate_and_fast_agree_on_a_program() {
    #[rustfmt::skip]
    let program: &[(u16, &[u8])] = &[
        (0x0000, &[
            0x31, 0x00, 0x80,       // LD SP, 0x8000
            0xDD, 0x21, 0x00, 0x50, // LD IX, 0x5000
            0x06, 0x03,             // LD B, 3
            0x10, 0xFE,             // DJNZ $
            0xCD, 0x20, 0x00,       // CALL 0x0020
            0x76,                   // HALT
        ]),
        (0x0020, &[
            0xDD, 0xCB, 0x02, 0xC6, // SET 0, (IX+2)
            0x21, 0x00, 0x50,       // LD HL, 0x5000
            0x11, 0x00, 0x60,       // LD DE, 0x6000
            0x01, 0x04, 0x00,       // LD BC, 4
            0xED, 0xB0,             // LDIR
            0xC0,                   // RET NZ (Z still set from power-on)
            0xC9,                   // RET
        ]),
    ];

    let mut fast_bus = SimpleBus::new();
    let mut accurate_bus = SimpleBus::new();
    for (addr, bytes) in program {
        fast_bus.load(*addr, bytes);
        accurate_bus.load(*addr, bytes);
    }

    let mut fast = FastZ80::new();
    let mut fast_steps = 0;
    while !fast.is_halted() {
        fast.step(&mut fast_bus);
        fast_steps += 1;
    }

    let mut accurate = AccurateZ80::new();
    let mut instructions = 0;
    while !(accurate.is_halted() && accurate.at_instruction_boundary()) {
        let steps = accurate_steps(&mut accurate, &mut accurate_bus);
        assert!(steps[..steps.len() - 1].iter().all(|&t| t == 4));
        instructions += 1;
    }

    assert_eq!(instructions, fast_steps);
    assert_eq!(accurate.total_ticks(), fast.total_ticks());
    assert_eq!(accurate.regs(), fast.regs());
    assert_eq!(accurate_bus.peek(0x6002), 0x01);
}

#[test]
fn test_run_for_overshoots_by_at_most_one_instruction() {
    let (mut cpu, mut bus) = boot(&[0x00; 16]);

    assert_eq!(cpu.run_for(&mut bus, 10), 12);
    assert_eq!(cpu.pc(), 0x0003);
    assert_eq!(cpu.total_ticks().get(), 12);
}
