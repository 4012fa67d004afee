//! The $4016/$4017 controller shift-register interface.
//!
//! Controller *input* is out of scope for this core (spec §1): there is no
//! keyboard or gamepad backend here. What the core does own is the shape of
//! the pull interface spec §6 reserves — a button-state latch the host
//! writes via [`Nes::set_controller`](super::nes::Nes::set_controller) and a
//! shift register the CPU reads one bit at a time from $4016/$4017, exactly
//! as real hardware does, so a program polling controllers sees realistic
//! bus behavior rather than open-bus garbage.

use super::bus::{BusDevice, BusPeekResult};

/// One controller port's button-state latch and read shift register.
#[derive(Default)]
struct Port {
    /// The button bitfield last provided by the host via `set_state`.
    latched: u8,
    /// The in-progress shift register; reloaded from `latched` while strobe
    /// is held high.
    shift: u8,
}

/// Both controller ports, gated by a shared strobe line driven from $4016.
pub struct Controller {
    ports: [Port; 2],
    strobe: bool,
}

impl Controller {
    pub fn new() -> Controller {
        Controller {
            ports: [Port::default(), Port::default()],
            strobe: false,
        }
    }

    /// Set the button bitfield for a port, as provided by the host.
    pub fn set_state(&mut self, port: usize, state: u8) {
        self.ports[port].latched = state;
        if self.strobe {
            self.ports[port].shift = state;
        }
    }

    /// Read one bit from a port's shift register, advancing it unless
    /// strobe is held high (in which case every read returns bit 0).
    pub fn read_port(&mut self, port: usize) -> u8 {
        let p = &mut self.ports[port];
        if self.strobe {
            p.shift = p.latched;
        }
        let bit = p.shift & 0x01;
        p.shift = (p.shift >> 1) | 0x80;
        bit
    }

    /// Handle a write to $4016: bit 0 is the shared strobe line. While
    /// strobe is 1, both ports continuously reload from their latches.
    pub fn write_strobe(&mut self, value: u8) {
        let was_strobed = self.strobe;
        self.strobe = value & 0x01 != 0;
        if self.strobe {
            for p in &mut self.ports {
                p.shift = p.latched;
            }
        } else if was_strobed {
            for p in &mut self.ports {
                p.shift = p.latched;
            }
        }
    }
}

impl BusDevice for Controller {
    /// `addr` is 0 for $4016 (port 0) or 1 for $4017 (port 1), per
    /// `cpu_memory_map::Device::Controller`.
    fn read(&mut self, addr: u16, last_bus_value: u8) -> u8 {
        let bit = self.read_port(addr as usize);
        (last_bus_value & 0xE0) | bit
    }

    fn peek(&self, _addr: u16) -> BusPeekResult {
        // Reading a shift register mutates it; there's no side-effect-free
        // peek.
        BusPeekResult::MutableRead
    }

    fn write(&mut self, addr: u16, value: u8) {
        if addr == 0 {
            self.write_strobe(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifts_out_buttons_lsb_first() {
        let mut ctl = Controller::new();
        ctl.set_state(0, 0b0000_0101);
        ctl.write_strobe(1);
        ctl.write_strobe(0);
        assert_eq!(ctl.read_port(0) & 1, 1);
        assert_eq!(ctl.read_port(0) & 1, 0);
        assert_eq!(ctl.read_port(0) & 1, 1);
    }

    #[test]
    fn strobe_high_always_returns_first_button() {
        let mut ctl = Controller::new();
        ctl.set_state(0, 0b0000_0001);
        ctl.write_strobe(1);
        assert_eq!(ctl.read_port(0) & 1, 1);
        assert_eq!(ctl.read_port(0) & 1, 1);
    }
}
