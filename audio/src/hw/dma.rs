use bit_field::BitField;
use bitflags::bitflags;
use spin::Mutex;
use volatile_register::RW;

pub const DMA_BASE: usize = 0x5000_0000;
pub const DMA_IRQ_BASE: usize = DMA_BASE + 0x400;
pub const CHANNEL_STRIDE: usize = 0x40;
pub const NUM_CHANNELS: u8 = 12;

/// `DREQ_PWM_WRAP0`; slice `n` is `DREQ_PWM_WRAP0 + n`.
pub const DREQ_PWM_WRAP0: u8 = 24;

/// NVIC line raised by any channel enabled in `INTE1`.
pub const DMA_IRQ_1: u8 = 12;

#[repr(C)]
pub struct DmaChannel {
    pub read_addr: RW<u32>,
    pub write_addr: RW<u32>,
    pub trans_count: RW<u32>,
    pub ctrl_trig: RW<u32>,
    pub al1_ctrl: RW<u32>,
    pub al1_read_addr: RW<u32>,
    pub al1_write_addr: RW<u32>,
    pub al1_trans_count_trig: RW<u32>,
    pub al2_ctrl: RW<u32>,
    pub al2_trans_count: RW<u32>,
    pub al2_read_addr: RW<u32>,
    pub al2_write_addr_trig: RW<u32>,
    pub al3_ctrl: RW<u32>,
    pub al3_write_addr: RW<u32>,
    pub al3_trans_count: RW<u32>,
    pub al3_read_addr_trig: RW<u32>,
}

impl DmaChannel {
    pub unsafe fn new(channel: u8) -> &'static DmaChannel {
        unsafe { &*((DMA_BASE + channel as usize * CHANNEL_STRIDE) as *const DmaChannel) }
    }
}

#[repr(C)]
pub struct DmaIrq {
    pub intr: RW<u32>,
    pub inte0: RW<u32>,
    pub intf0: RW<u32>,
    pub ints0: RW<u32>,
    _reserved: u32,
    pub inte1: RW<u32>,
    pub intf1: RW<u32>,
    /// Write 1 to clear.
    pub ints1: RW<u32>,
}

impl DmaIrq {
    pub unsafe fn new() -> &'static DmaIrq {
        unsafe { &*(DMA_IRQ_BASE as *const DmaIrq) }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DmaCtrl: u32 {
        const EN              = 1 << 0;
        const HIGH_PRIORITY   = 1 << 1;
        /// DATA_SIZE = 1: halfword transfers.
        const SIZE_HALFWORD   = 1 << 2;
        const INCR_READ       = 1 << 4;
        const INCR_WRITE      = 1 << 5;
        const RING_SEL        = 1 << 10;
        const IRQ_QUIET       = 1 << 21;
        const BSWAP           = 1 << 22;
        const SNIFF_EN        = 1 << 23;
        const BUSY            = 1 << 24;
    }
}

const CHAIN_TO: core::ops::Range<usize> = 11..15;
const TREQ_SEL: core::ops::Range<usize> = 15..21;

/// Control word for a channel that copies halfwords from an incrementing
/// source to a fixed register, paced by `dreq`.
///
/// Chaining a channel to itself disables chaining.
pub fn output_ctrl(channel: u8, dreq: u8) -> u32 {
    let mut ctrl = (DmaCtrl::EN | DmaCtrl::SIZE_HALFWORD | DmaCtrl::INCR_READ).bits();
    ctrl.set_bits(CHAIN_TO, channel as u32);
    ctrl.set_bits(TREQ_SEL, dreq as u32);
    ctrl
}

static CLAIMED: Mutex<u16> = Mutex::new(0);

/// Reserves the lowest free channel.
pub fn claim_unused_channel() -> Option<u8> {
    let mut claimed = CLAIMED.lock();
    let channel = (0..NUM_CHANNELS).find(|&ch| !claimed.get_bit(ch as usize))?;
    claimed.set_bit(channel as usize, true);
    Some(channel)
}

#[cfg(test)]
pub(crate) fn release_channel(channel: u8) {
    CLAIMED.lock().set_bit(channel as usize, false);
}
