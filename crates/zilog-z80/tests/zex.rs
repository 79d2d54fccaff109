//! Minimal CP/M harness for ZEXDOC/ZEXALL.
//!
//! CP/M memory layout:
//! - 0x0000: Warm boot (we put a HALT here)
//! - 0x0005: BDOS entry (a RET; console calls are serviced before it runs)
//! - 0x0006-0x0007: Top of TPA (programs read this for stack init)
//! - 0x0100: Program load address (TPA start)

use std::io::Write;

use emu_core::{Cpu, SimpleBus};
use zilog_z80::FastZ80;

fn bdos(cpu: &FastZ80, bus: &SimpleBus, output: &mut String) {
    let regs = cpu.regs();
    match regs.c {
        // Print character in E
        2 => output.push(char::from(regs.e)),
        // Print string at DE until '$'
        9 => {
            let mut addr = regs.de();
            loop {
                let ch = bus.peek(addr);
                if ch == b'$' {
                    break;
                }
                output.push(char::from(ch));
                addr = addr.wrapping_add(1);
            }
        }
        func => eprintln!("\nUnknown BDOS function: {func}"),
    }
}

fn run_zex(binary: &[u8]) -> bool {
    let mut bus = SimpleBus::new();
    bus.load(0x0100, binary);
    bus.load(0x0000, &[0x76]); // HALT
    bus.load(0x0005, &[0xC9]); // RET
    bus.load(0x0006, &[0x00, 0xFE]); // 0xFE00

    let mut cpu = FastZ80::new();
    cpu.set_pc(0x0100);

    let mut output = String::new();
    let mut instructions: u64 = 0;

    loop {
        if cpu.is_halted() {
            eprintln!("HALT at instruction {instructions}");
            break;
        }

        if cpu.pc() == 0x0005 && cpu.at_instruction_boundary() {
            let before = output.len();
            bdos(&cpu, &bus, &mut output);
            eprint!("{}", &output[before..]);
            std::io::stderr().flush().unwrap();
        }

        cpu.step(&mut bus);
        if cpu.at_instruction_boundary() {
            instructions += 1;
            if instructions % 10_000_000 == 0 {
                eprintln!("[{instructions} instructions]");
            }
        }
    }

    eprintln!("\nTotal: {instructions} instructions, {}", cpu.total_ticks());

    // ZEXDOC/ZEXALL print "ERROR" on a failing group
    !output.contains("ERROR")
}

#[test]
#[ignore = "requires tests/data/zexdoc.com"]
fn zexdoc() {
    let binary = std::fs::read("tests/data/zexdoc.com").expect("tests/data/zexdoc.com not found");
    assert!(run_zex(&binary), "ZEXDOC failed");
}

#[test]
#[ignore = "requires tests/data/zexall.com"]
fn zexall() {
    let binary = std::fs::read("tests/data/zexall.com").expect("tests/data/zexall.com not found");
    assert!(run_zex(&binary), "ZEXALL failed");
}
