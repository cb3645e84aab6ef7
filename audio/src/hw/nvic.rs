use bit_field::BitField;
use spin::Mutex;
use volatile_register::RW;

use crate::driver::Priority;

pub const NVIC_BASE: usize = 0xE000_E100;

/// First of the six spare IRQs software can raise on its own.
pub const FIRST_USER_IRQ: u8 = 26;
pub const NUM_USER_IRQS: u8 = 6;

/// Cortex-M0+: only the top two priority bits exist.
pub const HIGHEST_PRIORITY: u8 = 0x00;
pub const LOWEST_PRIORITY: u8 = 0xC0;

#[repr(C)]
pub struct Nvic {
    pub iser: RW<u32>,
    _reserved0: [u32; 31],
    pub icer: RW<u32>,
    _reserved1: [u32; 31],
    pub ispr: RW<u32>,
    _reserved2: [u32; 31],
    pub icpr: RW<u32>,
    _reserved3: [u32; 95],
    /// Byte priorities, four IRQs per word. Word access only on M0+.
    pub ipr: [RW<u32>; 8],
}

impl Nvic {
    pub unsafe fn new() -> &'static Nvic {
        unsafe { &*(NVIC_BASE as *const Nvic) }
    }

    pub fn set_priority(&self, irq: u8, priority: Priority) {
        let level = match priority {
            Priority::Highest => HIGHEST_PRIORITY,
            Priority::Lowest => LOWEST_PRIORITY,
        };
        let shift = (irq as usize % 4) * 8;
        unsafe {
            self.ipr[irq as usize / 4].modify(|mut w| *w.set_bits(shift..shift + 8, level as u32));
        }
    }

    pub fn enable(&self, irq: u8) {
        unsafe {
            self.icpr.write(1 << irq);
            self.iser.write(1 << irq);
        }
    }

    pub fn set_pending(&self, irq: u8) {
        unsafe { self.ispr.write(1 << irq) };
    }

    pub fn clear_pending(&self, irq: u8) {
        unsafe { self.icpr.write(1 << irq) };
    }
}

static CLAIMED: Mutex<u8> = Mutex::new(0);

pub fn claim_user_irq() -> Option<u8> {
    let mut claimed = CLAIMED.lock();
    let slot = (0..NUM_USER_IRQS).find(|&n| !claimed.get_bit(n as usize))?;
    claimed.set_bit(slot as usize, true);
    Some(FIRST_USER_IRQ + slot)
}

#[cfg(test)]
pub(crate) fn release_user_irq(irq: u8) {
    CLAIMED.lock().set_bit((irq - FIRST_USER_IRQ) as usize, false);
}
