use bit_field::BitField;
use volatile_register::RW;

pub const PWM_BASE: usize = 0x4005_0000;
pub const SLICE_STRIDE: usize = 0x14;

pub const IO_BANK0_BASE: usize = 0x4001_4000;
pub const PADS_BANK0_BASE: usize = 0x4001_C000;

/// `FUNCSEL` value routing a GPIO to its PWM slice.
pub const GPIO_FUNC_PWM: u32 = 4;

#[repr(C)]
pub struct PwmSlice {
    pub csr: RW<u32>,
    /// 8.4 fractional clock divider.
    pub div: RW<u32>,
    pub ctr: RW<u32>,
    /// Channel A in the low halfword, B in the high.
    pub cc: RW<u32>,
    pub top: RW<u32>,
}

impl PwmSlice {
    pub unsafe fn new(slice: u8) -> &'static PwmSlice {
        unsafe { &*((PWM_BASE + slice as usize * SLICE_STRIDE) as *const PwmSlice) }
    }

    /// Address the transfer engine writes duty codes to.
    pub fn cc_addr(slice: u8) -> u32 {
        (PWM_BASE + slice as usize * SLICE_STRIDE + 0x0C) as u32
    }

    /// Runs the counter from 0 to `wrap` with integer divider `div`.
    pub fn configure(&self, div: u8, wrap: u16) {
        let mut div_int = 0u32;
        div_int.set_bits(4..12, div as u32);

        unsafe {
            self.csr.write(0);
            self.div.write(div_int);
            self.top.write(wrap as u32);
            self.ctr.write(0);
            self.csr.modify(|mut csr| *csr.set_bit(0, true));
        }
    }
}

/// Slice driven by `pin`. Even pins are channel A, odd pins channel B.
#[inline(always)]
pub fn pin_to_slice(pin: u8) -> u8 {
    (pin >> 1) & 7
}

/// Hands `pin` to the PWM block with its input enabled and output driver on.
pub fn set_pin_function_pwm(pin: u8) {
    let pad = (PADS_BANK0_BASE + 4 + pin as usize * 4) as *mut u32;
    let ctrl = (IO_BANK0_BASE + 4 + pin as usize * 8) as *mut u32;
    unsafe {
        let mut value = pad.read_volatile();
        value.set_bit(6, true); // IE
        value.set_bit(7, false); // OD
        pad.write_volatile(value);

        ctrl.write_volatile(GPIO_FUNC_PWM);
    }
}
